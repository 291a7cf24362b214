pub mod telegram;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::error::DeliverError;

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines how notifications leave the relay. Implementing it allows
/// different chat services to be used as delivery channels.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Send a plain-text message to a chat.
    ///
    /// The chat identifier is opaque to the relay; it is taken from configuration as-is.
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), DeliverError>;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
