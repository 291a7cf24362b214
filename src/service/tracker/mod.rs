pub mod redmine;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::{error::FetchError, types::Issue};

// Traits.

/// Generic issue tracker trait that clients must implement.
///
/// The tracker is polled for a full snapshot of the configured project;
/// it offers no push feed and no per-issue deltas.
#[async_trait]
pub trait GenericTrackerClient: Send + Sync + 'static {
    /// Fetch every issue of the tracked project, including journal entries when available.
    ///
    /// Fails rather than returning a partial list. Callers must treat an error
    /// as "no information this cycle", never as "the project has no issues".
    async fn fetch_issues(&self) -> Result<Vec<Issue>, FetchError>;
}

// Structs.

/// Tracker client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct TrackerClient {
    inner: Arc<dyn GenericTrackerClient>,
}

impl Deref for TrackerClient {
    type Target = dyn GenericTrackerClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl TrackerClient {
    pub fn new(inner: Arc<dyn GenericTrackerClient>) -> Self {
        Self { inner }
    }
}
