//! Runtime services and the polling state machine.

use tracing::{info, instrument, warn};

use crate::{
    base::{
        config::Config,
        types::{IssueSnapshot, Res, Void},
    },
    interaction::{detect::detect, notify::dispatch_events},
    service::{chat::ChatClient, tracker::TrackerClient},
};

/// State of the poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    /// No snapshot yet; the next successful fetch seeds it without notifying.
    Priming,
    /// Steady state, holding the snapshot from the last successful cycle.
    Polling(IssueSnapshot),
}

/// What a single step of the poll loop did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The initial snapshot was taken from `issues` issues.
    Primed { issues: usize },
    /// A steady-state cycle found `events` changes and delivered `delivered` of them.
    Polled { events: usize, delivered: usize },
    /// The fetch failed; nothing changed.
    Skipped,
}

/// Runtime service context.
///
/// Owns the held snapshot; cycles run strictly one after another, so the
/// snapshot is never shared.
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The tracker client instance.
    pub tracker: TrackerClient,
    /// The chat client instance.
    pub chat: ChatClient,
    state: PollState,
}

impl Runtime {
    /// Create a new runtime instance backed by Redmine and Telegram.
    #[instrument(skip_all)]
    pub fn new(config: Config) -> Res<Self> {
        let tracker = TrackerClient::redmine(&config)?;
        let chat = ChatClient::telegram(&config)?;

        Ok(Self::with_clients(config, tracker, chat))
    }

    /// Create a runtime around existing clients, starting in `Priming`.
    pub fn with_clients(config: Config, tracker: TrackerClient, chat: ChatClient) -> Self {
        Self {
            config,
            tracker,
            chat,
            state: PollState::Priming,
        }
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// The held snapshot, once priming has succeeded.
    pub fn snapshot(&self) -> Option<&IssueSnapshot> {
        match &self.state {
            PollState::Priming => None,
            PollState::Polling(snapshot) => Some(snapshot),
        }
    }

    /// Run one cycle of the state machine.
    ///
    /// A failed fetch leaves the state untouched, whether priming or polling.
    #[instrument(skip(self))]
    pub async fn step(&mut self) -> CycleOutcome {
        let issues = match self.tracker.fetch_issues().await {
            Ok(issues) => issues,
            Err(err) => {
                warn!("Skipping cycle, could not fetch issues: {}", err);
                return CycleOutcome::Skipped;
            }
        };

        match &self.state {
            PollState::Priming => {
                let snapshot = IssueSnapshot::from_issues(&issues);
                info!("Primed snapshot with {} issues", snapshot.len());

                self.state = PollState::Polling(snapshot);

                CycleOutcome::Primed { issues: issues.len() }
            }
            PollState::Polling(snapshot) => {
                let (events, next) = detect(snapshot, issues);
                let events_count = events.len();

                if events_count > 0 {
                    info!("Detected {} changed issues", events_count);
                }

                let delivered = dispatch_events(events, &self.config, &self.chat).await;
                self.state = PollState::Polling(next);

                CycleOutcome::Polled {
                    events: events_count,
                    delivered,
                }
            }
        }
    }

    /// Poll until SIGINT, waiting the configured interval after every cycle.
    ///
    /// The handler is installed before the first cycle, so an interrupt that
    /// arrives mid-cycle is kept and stops the loop once that cycle finishes.
    pub async fn start(self) -> Void {
        #[cfg(unix)]
        {
            let mut interrupt = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?;
            self.run_until(async move {
                interrupt.recv().await;
            })
            .await
        }

        #[cfg(not(unix))]
        {
            let interrupt = tokio::signal::ctrl_c();
            self.run_until(async move {
                if let Err(err) = interrupt.await {
                    warn!("Could not listen for interrupts: {}", err);
                    std::future::pending::<()>().await;
                }
            })
            .await
        }
    }

    /// Poll until `shutdown` resolves.
    ///
    /// `shutdown` is only acted on between cycles, so in-flight requests finish.
    pub async fn run_until(mut self, shutdown: impl Future<Output = ()>) -> Void {
        tokio::pin!(shutdown);

        let interval = self.config.poll_interval();

        info!("Polling project `{}` every {:?} ...", self.config.redmine_project_id, interval);

        loop {
            self.step().await;

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Interrupted, stopping ...");
                    return Ok(());
                }
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }
}
