use crate::cycle::Collector;
use serde::Serialize;
use squad_core::CancellationToken;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectorState {
    Idle,
    Collecting,
    Stopped,
}

/// Drives one collection cycle per tick, starting immediately.
///
/// Cycles run inline in the ticking task, so they never overlap. Ticks that
/// fall due while a cycle is still running collapse into a single tick.
pub struct Scheduler {
    collector: Collector,
    interval: Duration,
    state: watch::Sender<CollectorState>,
}

impl Scheduler {
    pub fn new(collector: Collector, interval: Duration) -> Self {
        let (state, _) = watch::channel(CollectorState::Idle);
        Self {
            collector,
            interval,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<CollectorState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> CollectorState {
        *self.state.borrow()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs until `cancel` fires. An in-flight cycle is abandoned on cancellation.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(
            "Starting collection scheduler for {} servers every {:?}",
            self.collector.registry().len(),
            self.interval
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            self.state.send_replace(CollectorState::Collecting);
            let report = self.collector.run_cycle(&cancel).await;
            self.state.send_replace(CollectorState::Idle);

            if report.cancelled {
                break;
            }
        }

        self.state.send_replace(CollectorState::Stopped);
        info!("Collection scheduler stopped");
    }

    pub fn spawn(self, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move { self.run(cancel).await })
    }
}
