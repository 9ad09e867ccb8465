//! Periodic sampling trigger
//!
//! A single tokio task per running period reads one sample, runs it through
//! the pipeline and drives the activity output. Ticks never overlap: the task
//! finishes one tick before waiting for the next, and late ticks are delayed
//! rather than bunched.

use crate::source::SharedSource;
use ecg_core::SampleRate;
use ecg_processing::{ActivityOutput, SharedPipeline};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info};

/// Scheduler state machine: `Stopped` -> `Running(period)` -> `Stopped`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running { rate: SampleRate, period: Duration },
}

/// Handle to the spawned sampling task
struct RunningTask {
    rate: SampleRate,
    period: Duration,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Everything one tick needs, cloned into the sampling task
#[derive(Clone)]
struct TickContext {
    source: SharedSource,
    pipeline: SharedPipeline,
    output: Arc<dyn ActivityOutput>,
    ticks: Arc<AtomicU64>,
}

impl TickContext {
    async fn run(&self) {
        let raw = self.source.lock().await.read();

        let active = {
            let mut pipeline = self.pipeline.lock().await;
            pipeline.tick(raw);
            pipeline.is_active()
        };

        self.output.set_active(active);
        self.ticks.fetch_add(1, Ordering::AcqRel);
    }
}

/// Drives `SampleSource::read` -> `AcquisitionPipeline::tick` at a fixed period.
///
/// The period is taken from an already validated [`SampleRate`]; the scheduler
/// performs no bounds checking of its own. Rate validation belongs to the
/// configuration layer.
pub struct SampleScheduler {
    context: TickContext,
    running: Option<RunningTask>,
}

impl SampleScheduler {
    pub fn new(
        source: SharedSource,
        pipeline: SharedPipeline,
        output: Arc<dyn ActivityOutput>,
    ) -> Self {
        Self {
            context: TickContext {
                source,
                pipeline,
                output,
                ticks: Arc::new(AtomicU64::new(0)),
            },
            running: None,
        }
    }

    /// Begin sampling at `rate`. Starting a running scheduler restarts it.
    pub async fn start(&mut self, rate: SampleRate) {
        if self.running.is_some() {
            self.halt().await;
        }

        let period = rate.period();
        self.context.source.lock().await.on_rate_change(rate);

        let (shutdown, mut shutdown_rx) = oneshot::channel();
        let context = self.context.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => context.run().await,
                }
            }
        });

        info!(rate = %rate, period_ms = period.as_millis() as u64, "Sampling started");
        self.running = Some(RunningTask {
            rate,
            period,
            shutdown,
            handle,
        });
    }

    /// Stop sampling and turn the activity output off.
    ///
    /// When this returns the sampling task has exited, so no further tick
    /// runs. Calling it on a stopped scheduler is a no-op.
    pub async fn stop(&mut self) {
        if self.running.is_none() {
            return;
        }
        self.halt().await;
        self.context.output.set_active(false);
    }

    /// Restart at a new rate; there is no smooth transition
    pub async fn reconfigure(&mut self, rate: SampleRate) {
        debug!(rate = %rate, "Reconfiguring sample rate");
        self.halt().await;
        self.start(rate).await;
        info!("Sample rate configured: {}", rate);
    }

    async fn halt(&mut self) {
        let Some(task) = self.running.take() else {
            return;
        };

        // The task may already be gone if it panicked
        let _ = task.shutdown.send(());
        match task.handle.await {
            Ok(()) => info!(rate = %task.rate, "Sampling stopped"),
            Err(e) => error!("Sampling task ended abnormally: {}", e),
        }
    }

    pub fn state(&self) -> SchedulerState {
        match &self.running {
            Some(task) => SchedulerState::Running {
                rate: task.rate,
                period: task.period,
            },
            None => SchedulerState::Stopped,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Rate of the current run, if any
    pub fn rate(&self) -> Option<SampleRate> {
        self.running.as_ref().map(|task| task.rate)
    }

    /// Ticks completed since construction
    pub fn ticks(&self) -> u64 {
        self.context.ticks.load(Ordering::Acquire)
    }

    pub fn pipeline(&self) -> SharedPipeline {
        self.context.pipeline.clone()
    }

    pub fn source(&self) -> SharedSource {
        self.context.source.clone()
    }
}

impl Drop for SampleScheduler {
    fn drop(&mut self) {
        if let Some(task) = self.running.take() {
            task.handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{shared, ScriptedSource};
    use ecg_processing::{AcquisitionPipeline, SharedActivity};
    use tokio::time::sleep;

    fn scheduler_with(samples: Vec<i32>) -> (SampleScheduler, SharedActivity) {
        let output = SharedActivity::new();
        let scheduler = SampleScheduler::new(
            shared(ScriptedSource::new(samples)),
            AcquisitionPipeline::default().shared(),
            Arc::new(output.clone()),
        );
        (scheduler, output)
    }

    fn rate(hz: u32) -> SampleRate {
        SampleRate::new(hz).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_follow_period() {
        let (mut scheduler, _) = scheduler_with(vec![2048]);
        assert_eq!(scheduler.state(), SchedulerState::Stopped);

        scheduler.start(rate(100)).await;
        assert_eq!(
            scheduler.state(),
            SchedulerState::Running {
                rate: rate(100),
                period: Duration::from_millis(10)
            }
        );

        sleep(Duration::from_millis(105)).await;
        let ticks = scheduler.ticks();
        assert!((10..=12).contains(&ticks), "unexpected tick count {}", ticks);

        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_final_and_idempotent() {
        let (mut scheduler, _) = scheduler_with(vec![2048]);
        scheduler.start(rate(500)).await;
        sleep(Duration::from_millis(50)).await;

        scheduler.stop().await;
        let ticks = scheduler.ticks();
        assert!(ticks > 0);

        sleep(Duration::from_millis(100)).await;
        assert_eq!(scheduler.ticks(), ticks);

        scheduler.stop().await;
        scheduler.stop().await;
        assert_eq!(scheduler.ticks(), ticks);
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconfigure_changes_period() {
        let (mut scheduler, _) = scheduler_with(vec![2048]);
        scheduler.start(rate(10)).await;
        sleep(Duration::from_millis(1000)).await;
        let slow = scheduler.ticks();
        assert!((9..=12).contains(&slow), "unexpected tick count {}", slow);

        scheduler.reconfigure(rate(500)).await;
        assert_eq!(scheduler.rate(), Some(rate(500)));

        sleep(Duration::from_millis(100)).await;
        let fast = scheduler.ticks() - slow;
        assert!((45..=52).contains(&fast), "unexpected tick count {}", fast);

        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_samples_reach_pipeline_in_order() {
        let (mut scheduler, _) = scheduler_with(vec![10, 20, 30, 40, 50]);
        scheduler.start(rate(200)).await;
        sleep(Duration::from_millis(100)).await;
        scheduler.stop().await;

        let ticks = scheduler.ticks() as usize;
        let pipeline = scheduler.pipeline();
        let pipeline = pipeline.lock().await;
        let bank = pipeline.bank();

        assert_eq!(bank.raw().len(), ticks);
        assert_eq!(bank.exponential().len(), ticks);
        assert_eq!(bank.average().len(), ticks - 4);
        assert_eq!(&bank.raw().to_vec()[..5], &[10, 20, 30, 40, 50]);
        assert!(bank.average().iter().all(|&mean| mean == 30.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_activity_output_follows_signal_and_clears_on_stop() {
        let (mut scheduler, output) = scheduler_with(vec![1000, 3000]);
        scheduler.start(rate(100)).await;
        sleep(Duration::from_millis(205)).await;
        assert!(output.is_active());

        scheduler.stop().await;
        assert!(!output.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_while_running_restarts() {
        let (mut scheduler, _) = scheduler_with(vec![2048]);
        scheduler.start(rate(100)).await;
        scheduler.start(rate(50)).await;
        assert_eq!(scheduler.rate(), Some(rate(50)));
        assert!(scheduler.is_running());
        scheduler.stop().await;
        assert!(!scheduler.is_running());
    }
}
