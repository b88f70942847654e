//! Batch orchestration.
//!
//! [`BatchOrchestrator`] drives a [`SiteProcessor`] over a site list, one site
//! at a time, pacing consecutive sites and honouring a stop request at each
//! checkpoint. A completed run produces a [`BatchReport`] that is stored in
//! the report history; a cancelled run produces nothing.

mod finalize;
mod progress;
mod state;

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::activity_log::ActivityLog;
use crate::config::INTER_SITE_DELAY;
use crate::credential::CredentialSession;
use crate::error_handling::{BatchError, PreconditionError};
use crate::models::{BatchReport, SiteList, SiteResult, VersionPolicy};
use crate::site::SiteProcessor;
use crate::storage::ReportStore;

use finalize::finalize_batch;
use progress::invoke_progress_callback;
use state::BatchRunState;

pub use progress::{ProgressCallback, ProgressEvent};
pub use state::{Affordances, BatchState};

/// How a run that passed its preconditions ended.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// Every site was processed; the report has been handed to the store.
    Completed(BatchReport),
    /// The operator stopped the run. Partial results are discarded.
    Cancelled { sites_completed: usize },
}

#[derive(Debug)]
struct RunControl {
    state: BatchState,
    cancel: Option<CancellationToken>,
}

/// Sequential multi-site batch runner.
pub struct BatchOrchestrator {
    processor: Arc<dyn SiteProcessor>,
    store: Arc<dyn ReportStore>,
    activity: Arc<ActivityLog>,
    inter_site_delay: Duration,
    progress: ProgressCallback,
    control: Mutex<RunControl>,
}

/// Resets the running flag on every exit path, including a dropped run future.
struct RunGuard<'a> {
    orchestrator: &'a BatchOrchestrator,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let mut control = self.orchestrator.lock_control();
        control.cancel = None;
        if control.state.is_running() {
            control.state = BatchState::Cancelled;
        }
    }
}

impl BatchOrchestrator {
    pub fn new(
        processor: Arc<dyn SiteProcessor>,
        store: Arc<dyn ReportStore>,
        activity: Arc<ActivityLog>,
    ) -> Self {
        Self {
            processor,
            store,
            activity,
            inter_site_delay: INTER_SITE_DELAY,
            progress: None,
            control: Mutex::new(RunControl {
                state: BatchState::Idle,
                cancel: None,
            }),
        }
    }

    /// Sets the pause between consecutive sites.
    pub fn with_inter_site_delay(mut self, delay: Duration) -> Self {
        self.inter_site_delay = delay;
        self
    }

    pub fn with_progress_callback(
        mut self,
        callback: impl Fn(&ProgressEvent) + Send + Sync + 'static,
    ) -> Self {
        self.progress = Some(Arc::new(callback));
        self
    }

    fn lock_control(&self) -> MutexGuard<'_, RunControl> {
        self.control.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: BatchState) {
        self.lock_control().state = state;
    }

    pub fn state(&self) -> BatchState {
        self.lock_control().state
    }

    pub fn is_processing(&self) -> bool {
        self.state().is_running()
    }

    /// Operator actions available in the current state.
    pub fn affordances(&self) -> Affordances {
        Affordances::from(self.state())
    }

    /// Requests cancellation of the running batch.
    ///
    /// Returns false when no batch is running. The current site finishes; the
    /// loop stops before the next one.
    pub fn stop(&self) -> bool {
        let control = self.lock_control();
        match (&control.cancel, control.state) {
            (Some(cancel), BatchState::Running) => {
                if !cancel.is_cancelled() {
                    cancel.cancel();
                    self.activity
                        .warning("Stop requested, finishing the current site");
                }
                true
            }
            _ => false,
        }
    }

    /// Enters `Running` unless a batch is already running.
    fn begin(&self) -> Result<CancellationToken, PreconditionError> {
        let mut control = self.lock_control();
        if control.state.is_running() {
            return Err(PreconditionError::AlreadyRunning);
        }
        let cancel = CancellationToken::new();
        control.state = BatchState::Running;
        control.cancel = Some(cancel.clone());
        Ok(cancel)
    }

    /// Runs the batch over `sites` with `policy`.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Precondition`] before any site is touched when the
    /// credential is missing, the list is empty or a batch is already running,
    /// and [`BatchError::ProcessorFault`] when the site processor panics.
    /// Site and library failures are never errors; they are part of the report.
    pub async fn run_batch(
        &self,
        sites: &SiteList,
        policy: &VersionPolicy,
        credential: Option<&CredentialSession>,
    ) -> Result<BatchOutcome, BatchError> {
        let credential = credential.ok_or(PreconditionError::MissingCredential)?;
        if sites.is_empty() {
            return Err(PreconditionError::EmptySiteList.into());
        }
        let cancel = self.begin()?;
        let _guard = RunGuard { orchestrator: self };

        let total = sites.len();
        self.activity.info(format!(
            "Starting batch: {total} site(s), policy {policy}"
        ));

        let mut run = BatchRunState::new(cancel, total);
        for (index, site) in sites.iter().enumerate() {
            if run.is_cancelled() {
                return Ok(self.cancelled(&run));
            }
            run.index = index;

            invoke_progress_callback(&self.progress, &ProgressEvent::new(index, total, site));
            self.activity
                .info(format!("[{}/{}] Processing site {}", index + 1, total, site));

            let processed = AssertUnwindSafe(self.processor.process_site(site, credential, policy))
                .catch_unwind()
                .await;
            let result = match processed {
                Ok(result) => result,
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    self.set_state(BatchState::Failed);
                    self.activity
                        .error(format!("Batch aborted on {site}: {message}"));
                    return Err(BatchError::ProcessorFault {
                        site: site.to_string(),
                        message,
                    });
                }
            };
            self.record_outcome(&result);
            run.results.push(result);

            if index + 1 < total {
                if run.is_cancelled() {
                    return Ok(self.cancelled(&run));
                }
                if !self.inter_site_delay.is_zero() {
                    self.activity.info(format!(
                        "Waiting {}s before the next site",
                        self.inter_site_delay.as_secs_f64()
                    ));
                }
                tokio::select! {
                    biased;
                    _ = run.cancel.cancelled() => return Ok(self.cancelled(&run)),
                    _ = tokio::time::sleep(self.inter_site_delay) => {}
                }
            }
        }

        // A stop raised during the last site still cancels the run
        if run.is_cancelled() {
            return Ok(self.cancelled(&run));
        }

        self.set_state(BatchState::Completed);
        let report = finalize_batch(
            self.store.as_ref(),
            &self.activity,
            policy,
            std::mem::take(&mut run.results),
        )
        .await;
        Ok(BatchOutcome::Completed(report))
    }

    fn record_outcome(&self, result: &SiteResult) {
        if result.succeeded() {
            self.activity.success(format!(
                "Site {}: {}/{} libraries configured",
                result.site(),
                result.libraries_configured(),
                result.libraries_total()
            ));
        } else {
            self.activity.error(format!(
                "Site {}: {}",
                result.site(),
                result.error().unwrap_or("failed")
            ));
        }
    }

    fn cancelled(&self, run: &BatchRunState) -> BatchOutcome {
        self.set_state(BatchState::Cancelled);
        let sites_completed = run.results.len();
        log::debug!("Cancelled at site index {}", run.index);
        self.activity.warning(format!(
            "Batch cancelled after {sites_completed} site(s); partial results discarded"
        ));
        BatchOutcome::Cancelled { sites_completed }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "site processor panicked".to_string()
    }
}
