use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::generation::orchestrator::GenerationService;
use crate::generation::{GenerationError, SentenceOracle, SentenceRepository, VocabularyStore};

/// Every 4 hours, on the hour.
pub const DEFAULT_SCHEDULE: &str = "0 0 */4 * * *";

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] tokio_cron_scheduler::JobSchedulerError),
}

/// Periodic trigger for the sentence-generation pipeline. The timer and any
/// manual/administrative caller share one entry point, `trigger_generation`,
/// guarded by an atomic flag: at most one cycle runs at a time and a
/// concurrent trigger is silently skipped, never queued.
pub struct GenerationScheduler<S, O, R> {
    service: Arc<GenerationService<S, O, R>>,
    schedule: String,
    timer: Mutex<Option<JobScheduler>>,
    running: AtomicBool,
}

impl<S, O, R> GenerationScheduler<S, O, R>
where
    S: VocabularyStore + 'static,
    O: SentenceOracle + 'static,
    R: SentenceRepository + 'static,
{
    pub fn new(service: GenerationService<S, O, R>, schedule: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            service: Arc::new(service),
            schedule: schedule.into(),
            timer: Mutex::new(None),
            running: AtomicBool::new(false),
        })
    }

    /// Installs the fixed-cadence timer. Idempotent: starting an already
    /// active scheduler logs and returns.
    pub async fn start(self: &Arc<Self>) -> Result<(), WorkerError> {
        let mut timer = self.timer.lock().await;
        if timer.is_some() {
            info!("Generation scheduler already active, skipping start");
            return Ok(());
        }

        let scheduler = JobScheduler::new().await?;

        let this = Arc::clone(self);
        let job = Job::new_async(self.schedule.as_str(), move |_uuid, _lock| {
            let this = Arc::clone(&this);
            Box::pin(async move {
                if let Err(e) = this.trigger_generation().await {
                    error!(error = %e, "Scheduled sentence generation failed");
                }
            })
        })?;

        scheduler.add(job).await?;
        scheduler.start().await?;

        info!(schedule = %self.schedule, "Sentence generation scheduler started");
        *timer = Some(scheduler);
        Ok(())
    }

    /// Cancels the timer. Idempotent when already stopped. An in-flight
    /// cycle is not cancelled; it runs to completion.
    pub async fn stop(&self) {
        let mut timer = self.timer.lock().await;
        match timer.take() {
            Some(mut scheduler) => {
                if let Err(e) = scheduler.shutdown().await {
                    warn!(error = %e, "Error shutting down generation scheduler");
                }
                info!("Sentence generation scheduler stopped");
            }
            None => {
                info!("Generation scheduler already stopped");
            }
        }
    }

    /// Runs one full generation cycle unless one is already in flight, in
    /// which case the call returns Ok immediately without doing anything.
    /// Errors from the cycle are logged and re-raised to the caller.
    pub async fn trigger_generation(&self) -> Result<(), GenerationError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            info!("Generation cycle already in progress, skipping trigger");
            return Ok(());
        }

        let started = Instant::now();
        info!("Sentence generation cycle triggered");

        let result = self.service.run_all().await;
        self.running.store(false, Ordering::SeqCst);

        let duration_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(()) => info!(duration_ms, "Sentence generation cycle completed"),
            Err(e) => error!(duration_ms, error = %e, "Sentence generation cycle failed"),
        }

        result
    }

    /// Whether a generation cycle is currently in flight.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Whether the periodic timer is installed.
    pub async fn is_scheduler_active(&self) -> bool {
        self.timer.lock().await.is_some()
    }
}
