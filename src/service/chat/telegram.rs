//! Telegram Bot API integration for the relay.
//!
//! Messages are sent as plain text through `sendMessage`. The bot token is part
//! of the request path, so request URLs are never logged.

use std::{borrow::Cow, sync::Arc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::base::{
    config::Config,
    error::DeliverError,
    types::Res,
};

use super::{ChatClient, GenericChatClient};

/// Longest text Telegram accepts in a single message.
pub const MAX_MESSAGE_CHARS: usize = 4096;

// Extra methods on `ChatClient` applied by the telegram implementation.

impl ChatClient {
    /// Creates a new Telegram chat client.
    pub fn telegram(config: &Config) -> Res<Self> {
        let client = TelegramChatClient::new(config)?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Wire types.

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

// Helpers.

/// Shortens `text` to at most `limit` characters, marking the cut with an ellipsis.
pub fn truncate_message(text: &str, limit: usize) -> Cow<'_, str> {
    if text.chars().count() <= limit {
        return Cow::Borrowed(text);
    }

    let mut truncated: String = text.chars().take(limit.saturating_sub(1)).collect();
    truncated.push('…');

    Cow::Owned(truncated)
}

// Specific implementations.

/// Telegram chat client implementation.
#[derive(Clone)]
pub struct TelegramChatClient {
    client: reqwest::Client,
    endpoint: String,
}

impl TelegramChatClient {
    /// Create a new Telegram chat client.
    #[instrument(name = "TelegramChatClient::new", skip_all)]
    pub fn new(config: &Config) -> Res<Self> {
        let client = reqwest::Client::builder().timeout(config.http_timeout()).build()?;
        let endpoint = format!("{}/bot{}/sendMessage", config.telegram_api_url, config.telegram_bot_token);

        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl GenericChatClient for TelegramChatClient {
    #[instrument(skip(self, text))]
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), DeliverError> {
        let text = truncate_message(text, MAX_MESSAGE_CHARS);
        if let Cow::Owned(_) = text {
            warn!("Message exceeds {} characters and was truncated", MAX_MESSAGE_CHARS);
        }

        let request = SendMessageRequest {
            chat_id,
            text: &text,
            disable_web_page_preview: true,
        };

        // `without_url` keeps the bot token out of transport errors.
        let response = self.client.post(&self.endpoint).json(&request).send().await.map_err(|e| e.without_url())?;

        let status = response.status();
        let body = response.text().await.map_err(|e| e.without_url())?;
        let parsed = serde_json::from_str::<ApiResponse>(&body).ok();

        match parsed {
            Some(ApiResponse { ok: true, .. }) if status.is_success() => {
                debug!("Telegram accepted the message");
                Ok(())
            }
            Some(ApiResponse { description, .. }) => Err(DeliverError::Rejected {
                status: status.as_u16(),
                description: description.unwrap_or_else(|| "no description".to_string()),
            }),
            None => Err(DeliverError::Rejected {
                status: status.as_u16(),
                description: body.chars().take(200).collect(),
            }),
        }
    }
}

// Tests.
