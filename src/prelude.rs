pub use crate::base::{
    config::Config,
    error::{ConfigError, DeliverError, FetchError},
    types::{ChangeEvent, Destination, Err, Issue, IssueSnapshot, Res, Void},
};
pub use anyhow::anyhow;
pub use tracing::{debug, error, info, instrument, warn};
