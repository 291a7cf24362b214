#![cfg(test)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use mockall::mock;
use tokio::sync::oneshot;
use redmine_relay::{
    base::{
        config::{Config, ConfigInner},
        error::{DeliverError, FetchError},
        types::{Issue, IssueSnapshot, Journal},
    },
    runtime::{CycleOutcome, PollState, Runtime},
    service::{
        chat::{ChatClient, GenericChatClient},
        tracker::{GenericTrackerClient, TrackerClient},
    },
};

// Mocks.

mock! {
    pub Tracker {}

    #[async_trait]
    impl GenericTrackerClient for Tracker {
        async fn fetch_issues(&self) -> Result<Vec<Issue>, FetchError>;
    }
}

mock! {
    pub Chat {}

    #[async_trait]
    impl GenericChatClient for Chat {
        async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), DeliverError>;
    }
}

type FetchScript = Arc<Mutex<VecDeque<Result<Vec<Issue>, FetchError>>>>;
type SentLog = Arc<Mutex<Vec<(String, String)>>>;

/// Tracker mock that replays the given fetch results, one per call.
fn get_mock_tracker(script: Vec<Result<Vec<Issue>, FetchError>>) -> MockTracker {
    let script: FetchScript = Arc::new(Mutex::new(script.into()));
    let mut mock = MockTracker::new();

    mock.expect_fetch_issues()
        .returning(move || script.lock().unwrap().pop_front().expect("fetch called more often than scripted"));

    mock
}

/// Chat mock that records every message; messages containing `fail_marker` are rejected.
fn get_mock_chat(sent: SentLog, fail_marker: Option<&'static str>) -> MockChat {
    let mut mock = MockChat::new();

    mock.expect_send_message().returning(move |chat_id, text| {
        if let Some(marker) = fail_marker
            && text.contains(marker)
        {
            return Err(DeliverError::Rejected {
                status: 400,
                description: "Bad Request: chat not found".to_string(),
            });
        }

        sent.lock().unwrap().push((chat_id.to_string(), text.to_string()));
        Ok(())
    });

    mock
}

fn create_test_config() -> Config {
    Config::from_inner(ConfigInner {
        redmine_url: "https://tracker.example.com".to_string(),
        redmine_api_key: "key".to_string(),
        redmine_project_id: "ops".to_string(),
        telegram_bot_token: "123:abc".to_string(),
        telegram_team_chat_id: "team-chat".to_string(),
        telegram_general_chat_id: "general-chat".to_string(),
        team_assignee_marker: "Team X".to_string(),
        poll_interval_secs: 10,
        http_timeout_secs: 5,
        redmine_page_size: 100,
        telegram_api_url: "https://api.telegram.org".to_string(),
        display_utc_offset_minutes: 0,
    })
    .expect("valid test config")
}

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
}

fn issue(id: u64, updated_hour: u32, assignee: &str, journals: Vec<Journal>) -> Issue {
    Issue {
        id,
        subject: format!("Issue {id}"),
        priority: "Normal".to_string(),
        assignee: assignee.to_string(),
        status: "New".to_string(),
        created_on: Some("2024-05-01T00:00:00Z".to_string()),
        updated_on: at(updated_hour),
        due_date: None,
        journals,
    }
}

fn fetch_failure() -> FetchError {
    FetchError::Status {
        status: 503,
        body: "maintenance".to_string(),
    }
}

/// Helper function to setup a runtime over the mocks.
fn setup_runtime(script: Vec<Result<Vec<Issue>, FetchError>>, sent: SentLog, fail_marker: Option<&'static str>) -> Runtime {
    let tracker = TrackerClient::new(Arc::new(get_mock_tracker(script)));
    let chat = ChatClient::new(Arc::new(get_mock_chat(sent, fail_marker)));

    Runtime::with_clients(create_test_config(), tracker, chat)
}

#[tokio::test]
async fn test_priming_sends_nothing() {
    let sent = SentLog::default();
    let mut runtime = setup_runtime(
        vec![Ok(vec![issue(1, 1, "Alice", vec![]), issue(2, 1, "Team X Team X", vec![])])],
        sent.clone(),
        None,
    );

    assert_eq!(runtime.state(), &PollState::Priming);
    assert_eq!(runtime.step().await, CycleOutcome::Primed { issues: 2 });

    assert!(sent.lock().unwrap().is_empty());
    assert_eq!(runtime.snapshot().unwrap().ids().collect::<Vec<_>>(), vec![1, 2]);
}

#[tokio::test]
async fn test_end_to_end_scenario() {
    let sent = SentLog::default();
    let journals = vec![
        Journal {
            author: "Alice".to_string(),
            notes: Some("Older note".to_string()),
        },
        Journal {
            author: "Bob".to_string(),
            notes: Some("Replaced the toner".to_string()),
        },
    ];
    let mut runtime = setup_runtime(
        vec![
            Ok(vec![issue(42, 1, "Alice", vec![])]),
            Ok(vec![issue(42, 1, "Alice", vec![]), issue(43, 2, "Alice", vec![])]),
            Ok(vec![issue(42, 3, "Alice", journals), issue(43, 2, "Alice", vec![])]),
        ],
        sent.clone(),
        None,
    );

    // Priming.
    assert_eq!(runtime.step().await, CycleOutcome::Primed { issues: 1 });
    assert_eq!(runtime.snapshot(), Some(&IssueSnapshot::from_iter([(42, at(1))])));
    assert!(sent.lock().unwrap().is_empty());

    // A new issue appears.
    assert_eq!(runtime.step().await, CycleOutcome::Polled { events: 1, delivered: 1 });
    assert_eq!(runtime.snapshot(), Some(&IssueSnapshot::from_iter([(42, at(1)), (43, at(2))])));
    {
        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].1.starts_with("🆕 New issue #43"));
    }

    // An existing issue is updated.
    assert_eq!(runtime.step().await, CycleOutcome::Polled { events: 1, delivered: 1 });
    assert_eq!(runtime.snapshot(), Some(&IssueSnapshot::from_iter([(42, at(3)), (43, at(2))])));

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 2);

    let (chat_id, text) = &sent[1];
    assert_eq!(chat_id, "general-chat");
    assert!(text.starts_with("🔄 Issue updated #42"));
    assert!(text.contains("✍️ Author: Bob"));
    assert!(text.contains("📄 Note: Replaced the toner"));
    assert!(!text.contains("Older note"));
    assert!(text.ends_with("🔗 Link: https://tracker.example.com/issues/42"));
}

#[tokio::test]
async fn test_fetch_failure_keeps_snapshot() {
    let sent = SentLog::default();
    let mut runtime = setup_runtime(
        vec![
            Ok(vec![issue(1, 1, "Alice", vec![])]),
            Err(fetch_failure()),
            Ok(vec![issue(1, 2, "Alice", vec![])]),
        ],
        sent.clone(),
        None,
    );

    runtime.step().await;
    let before = runtime.snapshot().cloned();

    assert_eq!(runtime.step().await, CycleOutcome::Skipped);
    assert_eq!(runtime.snapshot().cloned(), before);
    assert!(sent.lock().unwrap().is_empty());

    // The next successful cycle diffs against the snapshot from before the failure.
    assert_eq!(runtime.step().await, CycleOutcome::Polled { events: 1, delivered: 1 });
}

#[tokio::test]
async fn test_failed_priming_is_retried_without_notifications() {
    let sent = SentLog::default();
    let mut runtime = setup_runtime(
        vec![Err(fetch_failure()), Ok(vec![issue(1, 1, "Alice", vec![]), issue(2, 1, "Alice", vec![])])],
        sent.clone(),
        None,
    );

    assert_eq!(runtime.step().await, CycleOutcome::Skipped);
    assert_eq!(runtime.state(), &PollState::Priming);

    assert_eq!(runtime.step().await, CycleOutcome::Primed { issues: 2 });
    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_delivery_failure_does_not_abort_cycle() {
    let sent = SentLog::default();
    let mut runtime = setup_runtime(
        vec![
            Ok(vec![]),
            Ok(vec![issue(43, 1, "Alice", vec![]), issue(44, 1, "Alice", vec![])]),
        ],
        sent.clone(),
        Some("#43"),
    );

    runtime.step().await;

    assert_eq!(runtime.step().await, CycleOutcome::Polled { events: 2, delivered: 1 });

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.contains("#44"));

    // The failed event is not retried; its issue is recorded as seen.
    assert!(runtime.snapshot().unwrap().contains(43));
}

#[tokio::test]
async fn test_notifications_route_by_assignee() {
    let sent = SentLog::default();
    let mut runtime = setup_runtime(
        vec![
            Ok(vec![]),
            Ok(vec![
                issue(1, 1, "Team X Team X", vec![]),
                issue(2, 1, "Unassigned", vec![]),
                issue(3, 1, "Alice", vec![]),
            ]),
        ],
        sent.clone(),
        None,
    );

    runtime.step().await;
    runtime.step().await;

    let chats: Vec<String> = sent.lock().unwrap().iter().map(|(chat_id, _)| chat_id.clone()).collect();
    assert_eq!(chats, vec!["team-chat", "general-chat", "general-chat"]);
}

#[tokio::test]
async fn test_removed_issue_is_dropped_silently() {
    let sent = SentLog::default();
    let mut runtime = setup_runtime(
        vec![Ok(vec![issue(1, 1, "Alice", vec![]), issue(2, 1, "Alice", vec![])]), Ok(vec![issue(2, 1, "Alice", vec![])])],
        sent.clone(),
        None,
    );

    runtime.step().await;

    assert_eq!(runtime.step().await, CycleOutcome::Polled { events: 0, delivered: 0 });
    assert_eq!(runtime.snapshot().unwrap().ids().collect::<Vec<_>>(), vec![2]);
    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_interrupt_during_cycle_stops_before_next_cycle() {
    let (interrupt_tx, interrupt_rx) = oneshot::channel::<()>();
    let interrupt_tx = Arc::new(Mutex::new(Some(interrupt_tx)));

    // The interrupt lands while the first fetch is in flight; a second fetch would fail the expectation.
    let mut tracker = MockTracker::new();
    tracker.expect_fetch_issues().times(1).returning(move || {
        if let Some(tx) = interrupt_tx.lock().unwrap().take() {
            let _ = tx.send(());
        }
        Ok(vec![issue(1, 1, "Alice", vec![])])
    });

    let runtime = Runtime::with_clients(
        create_test_config(),
        TrackerClient::new(Arc::new(tracker)),
        ChatClient::new(Arc::new(get_mock_chat(SentLog::default(), None))),
    );

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        runtime.run_until(async move {
            let _ = interrupt_rx.await;
        }),
    )
    .await;

    assert!(matches!(result, Ok(Ok(()))));
}
