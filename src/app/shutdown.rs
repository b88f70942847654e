//! Confirm-gated stop on Ctrl-C.
//!
//! The first Ctrl-C during a batch only asks for confirmation; a second one
//! within the confirmation window stops the batch. The current site always
//! finishes.

use std::sync::Arc;
use std::time::Duration;

use log::warn;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::run::BatchOrchestrator;

/// What a Ctrl-C press should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopDecision {
    AskConfirmation,
    Stop,
}

/// Tracks whether a stop request is waiting for confirmation.
#[derive(Debug, Clone)]
pub struct StopConfirmation {
    window: Duration,
    armed_at: Option<Instant>,
}

impl StopConfirmation {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            armed_at: None,
        }
    }

    /// Registers a press at `now`.
    pub fn press(&mut self, now: Instant) -> StopDecision {
        match self.armed_at {
            Some(armed) if now.duration_since(armed) <= self.window => {
                self.armed_at = None;
                StopDecision::Stop
            }
            _ => {
                self.armed_at = Some(now);
                StopDecision::AskConfirmation
            }
        }
    }
}

/// Spawns the Ctrl-C watcher for a running batch.
pub fn spawn_stop_handler(orchestrator: Arc<BatchOrchestrator>, window: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut confirmation = StopConfirmation::new(window);
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Ctrl-C handler unavailable: {e}");
                return;
            }
            if !orchestrator.affordances().stop_enabled {
                continue;
            }
            match confirmation.press(Instant::now()) {
                StopDecision::AskConfirmation => warn!(
                    "Stop the batch? Press Ctrl-C again within {}s to confirm",
                    window.as_secs()
                ),
                StopDecision::Stop => {
                    orchestrator.stop();
                }
            }
        }
    })
}

/// Stops the Ctrl-C watcher once the batch is over.
pub fn shutdown_gracefully(stop_handler: JoinHandle<()>) {
    stop_handler.abort();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_press_within_window_stops() {
        let start = Instant::now();
        let mut confirmation = StopConfirmation::new(Duration::from_secs(5));
        assert_eq!(confirmation.press(start), StopDecision::AskConfirmation);
        assert_eq!(
            confirmation.press(start + Duration::from_secs(2)),
            StopDecision::Stop
        );
        // Confirmation is consumed by the stop
        assert_eq!(
            confirmation.press(start + Duration::from_secs(3)),
            StopDecision::AskConfirmation
        );
    }

    #[test]
    fn test_press_after_window_asks_again() {
        let start = Instant::now();
        let mut confirmation = StopConfirmation::new(Duration::from_secs(5));
        confirmation.press(start);
        assert_eq!(
            confirmation.press(start + Duration::from_secs(6)),
            StopDecision::AskConfirmation
        );
        assert_eq!(
            confirmation.press(start + Duration::from_secs(7)),
            StopDecision::Stop
        );
    }
}
