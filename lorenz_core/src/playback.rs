//! Windowed playback over a precomputed trajectory.
//!
//! Playback keeps a single cursor into the trajectory. Each tick emits the
//! contiguous window `[cursor, min(cursor + W, N))` as parallel x/y sequences
//! and moves the cursor to `end mod N`. A window that reaches the end of the
//! trajectory is short rather than wrapping mid-window; the wrap only shows up
//! in the next cursor.

use crate::error::{LorenzError, LorenzResult};
use crate::trajectory::Trajectory;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::ops::Range;
use std::sync::Arc;

/// Default number of points emitted per tick.
pub const DEFAULT_WINDOW: usize = 10;

/// Default cap on the number of points kept in the displayed trace.
pub const DEFAULT_MAX_POINTS: usize = 500;

/// Contiguous slice of the trajectory projected onto the x/y plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayWindow {
    /// Trajectory indices covered by this window
    pub range: Range<usize>,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

impl DisplayWindow {
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Iterates `(x, y)` pairs in trajectory order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.xs.iter().copied().zip(self.ys.iter().copied())
    }
}

/// Emits the window starting at `cursor` and returns it with the next cursor.
///
/// `cursor` is reduced modulo the trajectory length first, so out-of-range
/// input is tolerated. Fails with [`LorenzError::EmptyTrajectory`] when the
/// trajectory has no points.
pub fn tick(
    trajectory: &Trajectory,
    cursor: usize,
    width: NonZeroUsize,
) -> LorenzResult<(DisplayWindow, usize)> {
    let n = trajectory.len();
    if n == 0 {
        return Err(LorenzError::EmptyTrajectory);
    }

    let offset = cursor % n;
    let end = offset.saturating_add(width.get()).min(n);
    let slice = &trajectory.points()[offset..end];

    let window = DisplayWindow {
        range: offset..end,
        xs: slice.iter().map(|p| p.x).collect(),
        ys: slice.iter().map(|p| p.y).collect(),
    };

    Ok((window, end % n))
}

/// Initial state handed to the display: full projection and a zero cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackStore {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub cursor: usize,
}

impl PlaybackStore {
    pub fn new(trajectory: &Trajectory) -> Self {
        Self {
            x: trajectory.xs(),
            y: trajectory.ys(),
            cursor: 0,
        }
    }
}

/// Rendering update produced on every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameUpdate {
    /// 1-based tick count
    pub tick: u64,
    /// Points to append to the displayed trace
    pub window: DisplayWindow,
    /// Maximum number of points the display should retain
    pub max_points: usize,
    /// Cursor the caller must persist for the next tick
    pub cursor: usize,
}

/// Stateful wrapper around [`tick`].
///
/// Owns the only cursor, so there is exactly one writer. Counts emitted ticks
/// and completed passes over the trajectory.
#[derive(Debug, Clone)]
pub struct PlaybackDriver {
    trajectory: Arc<Trajectory>,
    width: NonZeroUsize,
    max_points: usize,
    cursor: usize,
    ticks: u64,
    cycles: u64,
    short_windows: u64,
}

impl PlaybackDriver {
    /// Creates a driver at cursor 0.
    ///
    /// Fails with [`LorenzError::EmptyTrajectory`] for a zero-length trajectory.
    pub fn new(trajectory: Arc<Trajectory>, width: NonZeroUsize, max_points: usize) -> LorenzResult<Self> {
        if trajectory.is_empty() {
            return Err(LorenzError::EmptyTrajectory);
        }
        Ok(Self {
            trajectory,
            width,
            max_points,
            cursor: 0,
            ticks: 0,
            cycles: 0,
            short_windows: 0,
        })
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Number of times the cursor wrapped back to 0.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Number of windows shorter than the configured width.
    pub fn short_windows(&self) -> u64 {
        self.short_windows
    }

    pub fn width(&self) -> NonZeroUsize {
        self.width
    }

    pub fn trajectory(&self) -> &Arc<Trajectory> {
        &self.trajectory
    }

    /// Initial display state.
    pub fn store(&self) -> PlaybackStore {
        PlaybackStore::new(&self.trajectory)
    }

    /// Emits the next frame and advances the cursor.
    pub fn advance(&mut self) -> LorenzResult<FrameUpdate> {
        let (window, next) = tick(&self.trajectory, self.cursor, self.width)?;

        self.ticks += 1;
        if window.len() < self.width.get() {
            self.short_windows += 1;
        }
        if next == 0 {
            self.cycles += 1;
        }
        self.cursor = next;

        Ok(FrameUpdate {
            tick: self.ticks,
            window,
            max_points: self.max_points,
            cursor: next,
        })
    }
}

/// Rolling display trace with FIFO eviction.
///
/// Mirrors what the display keeps on screen: every window is appended, and
/// once more than `capacity` points are held the oldest ones are dropped.
#[derive(Debug, Clone)]
pub struct TraceBuffer {
    points: VecDeque<(f64, f64)>,
    capacity: usize,
}

impl TraceBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Changes the cap, evicting the oldest points if needed.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.evict();
    }

    /// Appends a window and evicts the oldest points beyond capacity.
    pub fn extend(&mut self, window: &DisplayWindow) {
        self.points.extend(window.points());
        self.evict();
    }

    fn evict(&mut self) {
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    /// Oldest-first view of the retained points.
    pub fn points(&self) -> impl Iterator<Item = &(f64, f64)> {
        self.points.iter()
    }

    /// Retained points as a contiguous vector (chart widgets want slices).
    pub fn to_vec(&self) -> Vec<(f64, f64)> {
        self.points.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn ramp(n: usize) -> Trajectory {
        Trajectory::from_points(
            (0..n)
                .map(|i| Vector3::new(i as f64, -(i as f64), 100.0 + i as f64))
                .collect(),
        )
    }

    fn w(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_window_length_law() {
        let traj = ramp(23);

        let (win, next) = tick(&traj, 0, w(10)).unwrap();
        assert_eq!(win.range, 0..10);
        assert_eq!(win.len(), 10);
        assert_eq!(next, 10);

        let (win, next) = tick(&traj, next, w(10)).unwrap();
        assert_eq!(win.range, 10..20);
        assert_eq!(next, 20);

        let (win, next) = tick(&traj, next, w(10)).unwrap();
        assert_eq!(win.range, 20..23);
        assert_eq!(win.len(), 3);
        assert_eq!(next, 0);
    }

    #[test]
    fn test_window_projects_x_and_y() {
        let (win, _) = tick(&ramp(5), 1, w(2)).unwrap();
        assert_eq!(win.xs, vec![1.0, 2.0]);
        assert_eq!(win.ys, vec![-1.0, -2.0]);
        assert_eq!(win.points().collect::<Vec<_>>(), vec![(1.0, -1.0), (2.0, -2.0)]);
    }

    #[test]
    fn test_out_of_range_cursor_is_normalized() {
        let traj = ramp(23);
        let (win, next) = tick(&traj, 23 * 4 + 5, w(10)).unwrap();
        assert_eq!(win.range, 5..15);
        assert_eq!(next, 15);

        let (win, next) = tick(&traj, usize::MAX, w(10)).unwrap();
        let offset = usize::MAX % 23;
        assert_eq!(win.range.start, offset);
        assert!(next < 23);
    }

    #[test]
    fn test_empty_trajectory_rejected() {
        let empty = Trajectory::from_points(Vec::new());
        let err = tick(&empty, 0, w(10)).unwrap_err();
        assert!(matches!(err, LorenzError::EmptyTrajectory));

        let err = PlaybackDriver::new(Arc::new(empty), w(10), 500).unwrap_err();
        assert!(matches!(err, LorenzError::EmptyTrajectory));
    }

    #[test]
    fn test_window_wider_than_trajectory() {
        let (win, next) = tick(&ramp(3), 0, w(10)).unwrap();
        assert_eq!(win.range, 0..3);
        assert_eq!(next, 0);
    }

    #[test]
    fn test_single_point_trajectory() {
        let traj = ramp(1);
        for _ in 0..3 {
            let (win, next) = tick(&traj, 0, w(10)).unwrap();
            assert_eq!(win.len(), 1);
            assert_eq!(next, 0);
        }
    }

    #[test]
    fn test_driver_counts_cycles_and_short_windows() {
        let mut driver = PlaybackDriver::new(Arc::new(ramp(23)), w(10), 500).unwrap();

        let frames: Vec<FrameUpdate> = (0..6).map(|_| driver.advance().unwrap()).collect();

        assert_eq!(frames[0].tick, 1);
        assert_eq!(frames[2].window.len(), 3);
        assert_eq!(frames[2].cursor, 0);
        assert_eq!(frames[3].window.range, 0..10);
        assert_eq!(frames[5].max_points, 500);

        assert_eq!(driver.ticks(), 6);
        assert_eq!(driver.cycles(), 2);
        assert_eq!(driver.short_windows(), 2);
        assert_eq!(driver.cursor(), 0);
    }

    #[test]
    fn test_driver_store_is_full_projection() {
        let driver = PlaybackDriver::new(Arc::new(ramp(4)), w(2), 10).unwrap();
        let store = driver.store();
        assert_eq!(store.x, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(store.y, vec![0.0, -1.0, -2.0, -3.0]);
        assert_eq!(store.cursor, 0);
    }

    #[test]
    fn test_trace_buffer_fifo_eviction() {
        let traj = ramp(50);
        let mut trace = TraceBuffer::new(25);

        let mut cursor = 0;
        for _ in 0..3 {
            let (win, next) = tick(&traj, cursor, w(10)).unwrap();
            trace.extend(&win);
            cursor = next;
        }

        assert_eq!(trace.len(), 25);
        let kept: Vec<f64> = trace.points().map(|(x, _)| *x).collect();
        assert_eq!(kept.first(), Some(&5.0));
        assert_eq!(kept.last(), Some(&29.0));
    }

    #[test]
    fn test_trace_buffer_under_capacity() {
        let (win, _) = tick(&ramp(5), 0, w(3)).unwrap();
        let mut trace = TraceBuffer::new(500);
        trace.extend(&win);
        assert_eq!(trace.to_vec(), vec![(0.0, 0.0), (1.0, -1.0), (2.0, -2.0)]);

        trace.set_capacity(2);
        assert_eq!(trace.to_vec(), vec![(1.0, -1.0), (2.0, -2.0)]);

        trace.clear();
        assert!(trace.is_empty());
    }
}
