//! Lorenz TUI Dashboard Module
//! ============================
//!
//! Terminal chart of the rolling playback trace.
//! Uses Ratatui for rendering and Crossbeam for frame delivery.
//!
//! Enable with the `dashboard` feature flag.
//!
//! Features:
//! - x/y projection of the trace as a Braille line chart on fixed axes
//! - Header with tick count, cursor, trace size and the trajectory's x/y extent
//! - Trace capped at the frame's `max_points` with FIFO eviction

use std::io;
use std::time::Duration;

use crossbeam::channel::{Receiver, TryRecvError};
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame, Terminal,
};

use crate::config::PlaybackConfig;
use crate::playback::{FrameUpdate, TraceBuffer};
use crate::trajectory::Trajectory;

// =============================================================================
// TRACE DASHBOARD
// =============================================================================

/// TUI dashboard that draws frames as they arrive.
pub struct TraceDashboard {
    rx: Receiver<FrameUpdate>,
    trace: TraceBuffer,
    x_range: [f64; 2],
    y_range: [f64; 2],
    max_ticks: u64,
    /// Trajectory coverage as ([x_min, x_max], [y_min, y_max])
    extent: Option<([f64; 2], [f64; 2])>,
    last_tick: u64,
    cursor: usize,
    finished: bool,
}

impl TraceDashboard {
    /// Create a dashboard fed by `rx`.
    pub fn new(rx: Receiver<FrameUpdate>, config: &PlaybackConfig) -> Self {
        Self {
            rx,
            trace: TraceBuffer::new(config.max_points),
            x_range: config.x_range,
            y_range: config.y_range,
            max_ticks: config.max_ticks,
            extent: None,
            last_tick: 0,
            cursor: 0,
            finished: false,
        }
    }

    /// Report the x/y extent of the trajectory being played back.
    pub fn with_extent(mut self, trajectory: &Trajectory) -> Self {
        self.extent = trajectory
            .bounds()
            .map(|(lo, hi)| ([lo.x, hi.x], [lo.y, hi.y]));
        self
    }

    /// Header text for the trajectory extent, if known.
    pub fn extent_label(&self) -> Option<String> {
        self.extent.map(|(x, y)| {
            format!(
                "x [{:.1}, {:.1}]  y [{:.1}, {:.1}]",
                x[0], x[1], y[0], y[1]
            )
        })
    }

    /// Apply one frame to the trace.
    pub fn apply(&mut self, frame: &FrameUpdate) {
        if frame.max_points != self.trace.capacity() {
            self.trace.set_capacity(frame.max_points);
        }
        self.trace.extend(&frame.window);
        self.last_tick = frame.tick;
        self.cursor = frame.cursor;
    }

    /// Drain all pending frames without blocking.
    pub fn drain(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(frame) => self.apply(&frame),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.finished = true;
                    break;
                }
            }
        }
    }

    pub fn trace(&self) -> &TraceBuffer {
        &self.trace
    }

    pub fn last_tick(&self) -> u64 {
        self.last_tick
    }

    /// Run the TUI main loop (blocks until 'q' pressed)
    pub fn run(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        loop {
            self.drain();

            terminal.draw(|f| self.ui(f))?;

            // Handle input (non-blocking with 20ms timeout)
            if event::poll(Duration::from_millis(20))? {
                if let Event::Key(key) = event::read()? {
                    if key.code == KeyCode::Char('q') || key.code == KeyCode::Esc {
                        break;
                    }
                }
            }
        }

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        Ok(())
    }

    /// Render the UI
    fn ui(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(10),   // Chart
                Constraint::Length(1), // Footer
            ])
            .split(f.area());

        // === HEADER ===
        let status = if self.finished {
            Span::styled("done", Style::default().fg(Color::Green))
        } else {
            Span::styled("playing", Style::default().fg(Color::Yellow))
        };
        let mut spans = vec![
            Span::styled("Lorenz System", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  |  "),
            Span::styled(
                format!("tick {}/{}", self.last_tick, self.max_ticks),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw("  |  "),
            Span::raw(format!("cursor {}", self.cursor)),
            Span::raw("  |  "),
            Span::raw(format!("trace {}/{}", self.trace.len(), self.trace.capacity())),
            Span::raw("  |  "),
            status,
        ];
        if let Some(extent) = self.extent_label() {
            spans.push(Span::raw("  |  "));
            spans.push(Span::styled(extent, Style::default().fg(Color::Magenta)));
        }
        let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::BOTTOM));
        f.render_widget(header, chunks[0]);

        // === CHART ===
        let points = self.trace.to_vec();
        let dataset = Dataset::default()
            .name("x/y")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&points);

        let chart = Chart::new(vec![dataset])
            .block(Block::default().title("Trajectory (x, y)").borders(Borders::ALL))
            .x_axis(
                Axis::default()
                    .title("x")
                    .style(Style::default().fg(Color::Gray))
                    .bounds(self.x_range)
                    .labels(axis_labels(self.x_range)),
            )
            .y_axis(
                Axis::default()
                    .title("y")
                    .style(Style::default().fg(Color::Gray))
                    .bounds(self.y_range)
                    .labels(axis_labels(self.y_range)),
            );
        f.render_widget(chart, chunks[1]);

        // === FOOTER ===
        let footer = Paragraph::new("Press 'q' to quit").style(Style::default().fg(Color::DarkGray));
        f.render_widget(footer, chunks[2]);
    }
}

fn axis_labels(range: [f64; 2]) -> Vec<Span<'static>> {
    let mid = (range[0] + range[1]) / 2.0;
    vec![
        Span::raw(format!("{:.0}", range[0])),
        Span::raw(format!("{:.0}", mid)),
        Span::raw(format!("{:.0}", range[1])),
    ]
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::DisplayWindow;

    fn frame(tick: u64, start: usize, len: usize, max_points: usize) -> FrameUpdate {
        let xs: Vec<f64> = (start..start + len).map(|i| i as f64).collect();
        FrameUpdate {
            tick,
            window: DisplayWindow {
                range: start..start + len,
                ys: xs.clone(),
                xs,
            },
            max_points,
            cursor: start + len,
        }
    }

    #[test]
    fn test_drain_applies_frames_in_order() {
        let (tx, rx) = crossbeam::channel::unbounded();
        let mut dashboard = TraceDashboard::new(rx, &PlaybackConfig::default());

        tx.send(frame(1, 0, 10, 500)).unwrap();
        tx.send(frame(2, 10, 10, 500)).unwrap();
        dashboard.drain();

        assert_eq!(dashboard.last_tick(), 2);
        assert_eq!(dashboard.trace().len(), 20);
        assert!(!dashboard.finished);

        drop(tx);
        dashboard.drain();
        assert!(dashboard.finished);
    }

    #[test]
    fn test_header_reports_trajectory_extent() {
        use nalgebra::Vector3;

        let (_tx, rx) = crossbeam::channel::unbounded();
        let dashboard = TraceDashboard::new(rx, &PlaybackConfig::default());
        assert_eq!(dashboard.extent_label(), None);

        let trajectory = Trajectory::from_points(vec![
            Vector3::new(-3.0, 2.0, 0.0),
            Vector3::new(4.5, -1.5, 9.0),
            Vector3::new(1.0, 7.0, 2.0),
        ]);
        let dashboard = dashboard.with_extent(&trajectory);
        assert_eq!(
            dashboard.extent_label().as_deref(),
            Some("x [-3.0, 4.5]  y [-1.5, 7.0]")
        );
    }

    #[test]
    fn test_trace_respects_frame_cap() {
        let (_tx, rx) = crossbeam::channel::unbounded();
        let mut dashboard = TraceDashboard::new(rx, &PlaybackConfig::default());

        dashboard.apply(&frame(1, 0, 10, 15));
        dashboard.apply(&frame(2, 10, 10, 15));

        assert_eq!(dashboard.trace().capacity(), 15);
        assert_eq!(dashboard.trace().len(), 15);
        assert_eq!(dashboard.trace().points().next(), Some(&(5.0, 5.0)));
    }
}
