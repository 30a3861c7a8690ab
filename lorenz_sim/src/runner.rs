//! Playback runner - startup routine and tick loop.

use crate::error::SimResult;

use lorenz_core::{generate, FrameUpdate, LorenzConfig, PlaybackConfig, PlaybackDriver, PlaybackStore, Trajectory};
use lorenz_env::{Interval, PlaybackContext};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Builds the trajectory once, before any tick is processed.
///
/// Validates the config, integrates, and hands back a shared read-only
/// trajectory. Any failure here is fatal for the run.
pub fn startup(config: &LorenzConfig) -> SimResult<Arc<Trajectory>> {
    config.validate()?;

    info!(
        "Integrating Lorenz system (sigma={}, rho={}, beta={:.4}) from {:?} over [{}, {}] at {} samples",
        config.system.sigma,
        config.system.rho,
        config.system.beta,
        config.initial_state,
        config.t_span[0],
        config.t_span[1],
        config.samples
    );

    let trajectory = generate(
        &config.system,
        config.initial_state(),
        config.t_span(),
        &config.sample_times(),
        &config.solver,
    )?;

    Ok(Arc::new(trajectory))
}

/// Consumer of playback output (chart, exporter, visualizer, ...).
pub trait FrameSink {
    /// Called once before the first tick with the initial display state.
    fn on_start(&mut self, _store: &PlaybackStore) {}

    /// Called after every tick; `at` is clock time since playback started.
    fn on_frame(&mut self, frame: &FrameUpdate, at: Duration);

    /// Called once after the last tick.
    fn on_finish(&mut self, _summary: &PlaybackSummary) {}
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn on_frame(&mut self, _frame: &FrameUpdate, _at: Duration) {}
}

/// Collects frames in memory.
impl FrameSink for Vec<FrameUpdate> {
    fn on_frame(&mut self, frame: &FrameUpdate, _at: Duration) {
        self.push(frame.clone());
    }
}

/// Feeds both sinks, first then second.
impl<A: FrameSink, B: FrameSink> FrameSink for (A, B) {
    fn on_start(&mut self, store: &PlaybackStore) {
        self.0.on_start(store);
        self.1.on_start(store);
    }

    fn on_frame(&mut self, frame: &FrameUpdate, at: Duration) {
        self.0.on_frame(frame, at);
        self.1.on_frame(frame, at);
    }

    fn on_finish(&mut self, summary: &PlaybackSummary) {
        self.0.on_finish(summary);
        self.1.on_finish(summary);
    }
}

/// Absent sinks are skipped.
impl<S: FrameSink> FrameSink for Option<S> {
    fn on_start(&mut self, store: &PlaybackStore) {
        if let Some(sink) = self {
            sink.on_start(store);
        }
    }

    fn on_frame(&mut self, frame: &FrameUpdate, at: Duration) {
        if let Some(sink) = self {
            sink.on_frame(frame, at);
        }
    }

    fn on_finish(&mut self, summary: &PlaybackSummary) {
        if let Some(sink) = self {
            sink.on_finish(summary);
        }
    }
}

impl<S: FrameSink + ?Sized> FrameSink for Box<S> {
    fn on_start(&mut self, store: &PlaybackStore) {
        (**self).on_start(store);
    }

    fn on_frame(&mut self, frame: &FrameUpdate, at: Duration) {
        (**self).on_frame(frame, at);
    }

    fn on_finish(&mut self, summary: &PlaybackSummary) {
        (**self).on_finish(summary);
    }
}

/// Dashboard feed; a closed dashboard just stops receiving.
#[cfg(feature = "dashboard")]
impl FrameSink for crossbeam::channel::Sender<FrameUpdate> {
    fn on_frame(&mut self, frame: &FrameUpdate, _at: Duration) {
        if self.send(frame.clone()).is_err() {
            debug!("dashboard closed, dropping tick {}", frame.tick);
        }
    }
}

/// Results from a playback run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSummary {
    /// Ticks executed
    pub ticks: u64,

    /// Cursor after the last tick
    pub final_cursor: usize,

    /// Times the cursor wrapped back to 0
    pub cycles: u64,

    /// Windows shorter than the configured width
    pub short_windows: u64,

    /// Clock time spent in playback (ms)
    pub elapsed_ms: f64,

    /// Whether the clock was virtual
    pub virtual_clock: bool,
}

/// Drives the playback driver from a bounded interval.
pub struct PlaybackRunner {
    trajectory: Arc<Trajectory>,
    config: PlaybackConfig,
}

impl PlaybackRunner {
    /// Creates a runner over an already generated trajectory.
    pub fn new(trajectory: Arc<Trajectory>, config: PlaybackConfig) -> Self {
        Self { trajectory, config }
    }

    /// Sets the number of ticks.
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.config.max_ticks = max_ticks;
        self
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Runs playback to completion.
    ///
    /// Ticks are processed strictly one after another: the cursor from tick
    /// `k` is stored before the interval is awaited for tick `k + 1`.
    pub async fn run<C, S>(&self, ctx: &C, sink: &mut S) -> SimResult<PlaybackSummary>
    where
        C: PlaybackContext + ?Sized,
        S: FrameSink + ?Sized,
    {
        self.config.validate()?;
        let mut driver = PlaybackDriver::new(
            Arc::clone(&self.trajectory),
            self.config.window,
            self.config.max_points,
        )?;
        let mut interval = Interval::new(self.config.interval(), self.config.max_ticks)?;

        info!(
            "Starting playback: {} ticks every {:?}, window={}, trace cap={}, clock={}",
            self.config.max_ticks,
            interval.period(),
            self.config.window,
            self.config.max_points,
            if ctx.is_virtual() { "virtual" } else { "realtime" }
        );

        sink.on_start(&driver.store());
        let start = ctx.now();

        while let Some(count) = interval.tick(ctx).await {
            let frame = driver.advance()?;
            debug_assert_eq!(frame.tick, count);

            if count % 50 == 0 {
                debug!(
                    "  tick={} | cursor={} | window={:?}",
                    count, frame.cursor, frame.window.range
                );
            }

            sink.on_frame(&frame, ctx.now().saturating_sub(start));
        }

        let summary = PlaybackSummary {
            ticks: driver.ticks(),
            final_cursor: driver.cursor(),
            cycles: driver.cycles(),
            short_windows: driver.short_windows(),
            elapsed_ms: ctx.now().saturating_sub(start).as_nanos() as f64 / 1e6,
            virtual_clock: ctx.is_virtual(),
        };
        sink.on_finish(&summary);

        info!(
            "Playback finished: {} ticks, cursor={}, cycles={}, {:.1} ms",
            summary.ticks, summary.final_cursor, summary.cycles, summary.elapsed_ms
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SimContext;
    use crate::error::SimError;
    use lorenz_core::LorenzError;
    use nalgebra::Vector3;
    use std::num::NonZeroUsize;

    fn ramp(n: usize) -> Arc<Trajectory> {
        Arc::new(Trajectory::from_points(
            (0..n).map(|i| Vector3::new(i as f64, 0.5 * i as f64, 1.0)).collect(),
        ))
    }

    fn playback(window: usize, max_ticks: u64) -> PlaybackConfig {
        PlaybackConfig {
            window: NonZeroUsize::new(window).unwrap(),
            max_ticks,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_runs_exact_tick_count_on_virtual_clock() {
        let ctx = SimContext::new();
        let runner = PlaybackRunner::new(ramp(23), playback(10, 7));
        let mut frames: Vec<FrameUpdate> = Vec::new();

        let summary = runner.run(&ctx, &mut frames).await.unwrap();

        assert_eq!(frames.len(), 7);
        assert_eq!(summary.ticks, 7);
        assert_eq!(summary.cycles, 2);
        assert_eq!(summary.short_windows, 2);
        assert_eq!(summary.final_cursor, 10);
        assert!(summary.virtual_clock);

        // 7 ticks at 25 ms each on a virtual clock
        assert_eq!(ctx.now(), Duration::from_millis(175));
        assert_eq!(summary.elapsed_ms, 175.0);
    }

    #[tokio::test]
    async fn test_frames_thread_the_cursor() {
        let ctx = SimContext::new();
        let runner = PlaybackRunner::new(ramp(23), playback(10, 4));
        let mut frames: Vec<FrameUpdate> = Vec::new();
        runner.run(&ctx, &mut frames).await.unwrap();

        let ranges: Vec<_> = frames.iter().map(|f| f.window.range.clone()).collect();
        assert_eq!(ranges, vec![0..10, 10..20, 20..23, 0..10]);
        let cursors: Vec<_> = frames.iter().map(|f| f.cursor).collect();
        assert_eq!(cursors, vec![10, 20, 0, 10]);
    }

    #[tokio::test]
    async fn test_empty_trajectory_is_fatal() {
        let ctx = SimContext::new();
        let runner = PlaybackRunner::new(Arc::new(Trajectory::from_points(Vec::new())), playback(10, 3));

        let err = runner.run(&ctx, &mut NullSink).await.unwrap_err();
        assert!(matches!(err, SimError::Lorenz(LorenzError::EmptyTrajectory)));
    }

    #[tokio::test]
    async fn test_zero_ticks_runs_nothing() {
        let ctx = SimContext::new();
        let runner = PlaybackRunner::new(ramp(5), playback(2, 10)).with_max_ticks(0);
        let mut frames: Vec<FrameUpdate> = Vec::new();

        let summary = runner.run(&ctx, &mut frames).await.unwrap();
        assert!(frames.is_empty());
        assert_eq!(summary.final_cursor, 0);
    }

    #[tokio::test]
    async fn test_pair_sink_feeds_both() {
        let ctx = SimContext::new();
        let runner = PlaybackRunner::new(ramp(8), playback(3, 5));
        let mut sinks: (Vec<FrameUpdate>, Vec<FrameUpdate>) = (Vec::new(), Vec::new());

        runner.run(&ctx, &mut sinks).await.unwrap();
        assert_eq!(sinks.0, sinks.1);
        assert_eq!(sinks.0.len(), 5);
    }

    #[tokio::test]
    async fn test_missing_sink_is_skipped() {
        let ctx = SimContext::new();
        let runner = PlaybackRunner::new(ramp(8), playback(3, 2));
        let mut sinks: (Option<Vec<FrameUpdate>>, Option<Vec<FrameUpdate>>) = (None, Some(Vec::new()));

        runner.run(&ctx, &mut sinks).await.unwrap();
        assert!(sinks.0.is_none());
        assert_eq!(sinks.1.map(|f| f.len()), Some(2));
    }

    #[tokio::test]
    async fn test_huge_interval_on_virtual_clock_completes() {
        let ctx = SimContext::new();
        let config = PlaybackConfig {
            interval_ms: 100_000_000_000,
            ..playback(10, 400)
        };
        let runner = PlaybackRunner::new(ramp(23), config);

        let summary = runner.run(&ctx, &mut NullSink).await.unwrap();
        assert_eq!(summary.ticks, 400);
        assert_eq!(ctx.time_ns(), u64::MAX);
        assert!(summary.elapsed_ms > 0.0);
    }

    #[test]
    fn test_startup_rejects_invalid_config() {
        let mut config = LorenzConfig::default();
        config.samples = 0;
        assert!(matches!(
            startup(&config),
            Err(SimError::Lorenz(LorenzError::InvalidConfig(_)))
        ));
    }

    #[test]
    fn test_startup_builds_requested_length() {
        let mut config = LorenzConfig::default();
        config.t_span = [0.0, 5.0];
        config.samples = 250;
        let trajectory = startup(&config).unwrap();
        assert_eq!(trajectory.len(), 250);
        assert!(trajectory.is_finite());
    }
}
