//! Delivery of one cycle's change events.

use crate::{prelude::*, service::chat::ChatClient};

use super::format::format_event;

/// Format and send every event in order, one at a time.
///
/// A failed delivery is logged and skipped; it never aborts the remaining events.
/// Returns the number of events delivered.
#[instrument(skip_all, fields(events = events.len()))]
pub async fn dispatch_events(events: Vec<ChangeEvent>, config: &Config, chat: &ChatClient) -> usize {
    let mut delivered = 0;

    for event in events {
        let issue_id = event.issue().id;
        let notification = format_event(&event, config);
        let chat_id = config.chat_id(notification.destination);

        info!(issue_id, kind = event.kind(), destination = ?notification.destination, "Sending notification ...");
        debug!("Notification text:\n{}", notification.text);

        match chat.send_message(chat_id, &notification.text).await {
            Ok(()) => delivered += 1,
            Err(err) => error!(issue_id, kind = event.kind(), "Failed to deliver notification: {}", err),
        }
    }

    delivered
}
