//! TUI interface — ratatui panels: play field, readout, log pane, status bar.
//!
//! The App struct holds the instrument session and drives the event loop.
//! The mouse plays the field like a pair of hands: vertical position sets
//! pitch, horizontal position sets volume.

pub mod keybindings;
pub mod log_pane;

pub use keybindings::{map_key, Action};
pub use log_pane::{LogRing, SharedLog, TuiLogger};

use std::io;
use std::time::Duration;

use crossterm::event::{
    self, Event as CrosstermEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use log::Level;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine, Points};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};
use ratatui::Frame;

use crate::audio::AudioSink;
use crate::control::{control_channel, ControlEvent, ControlReceiver, ControlSender, GestureUpdate};
use crate::instrument::RangeSpan;
use crate::osc::{OscConfig, OscListener};
use crate::theremin::{Readout, Theremin};

/// The main TUI application state.
pub struct App<S: AudioSink> {
    pub theremin: Theremin<S>,
    pub should_quit: bool,
    /// Pitch control position, `[0, 1]`.
    pub pitch: f32,
    /// Volume control position, `[0, 1]`.
    pub volume: f32,
    log: SharedLog,
    control_rx: ControlReceiver,
    control_tx: ControlSender,
    // Kept alive to maintain the OSC listener thread; messages flow via control_rx.
    osc_listener: Option<OscListener>,
    /// Inner area of the play field from the last draw, for mouse mapping.
    field: Rect,
}

impl<S: AudioSink> App<S> {
    pub fn new(theremin: Theremin<S>, log: SharedLog) -> Self {
        let (control_tx, control_rx) = control_channel();
        let readout = theremin.readout();
        Self {
            theremin,
            should_quit: false,
            pitch: readout.pitch_position,
            volume: readout.amplitude,
            log,
            control_rx,
            control_tx,
            osc_listener: None,
            field: Rect::default(),
        }
    }

    /// Start the OSC listener, feeding this app's control channel.
    pub fn attach_osc(&mut self, config: &OscConfig) {
        match OscListener::start(config, self.control_tx.clone()) {
            Ok(listener) => self.osc_listener = Some(listener),
            Err(e) => log::error!("OSC listener on port {} failed: {e}", config.listen_port),
        }
    }

    /// Sender for other producers (gesture trackers, tests).
    pub fn control_sender(&self) -> ControlSender {
        self.control_tx.clone()
    }

    pub fn readout(&self) -> Readout {
        self.theremin.readout()
    }

    /// Process an action.
    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::TogglePlayback => self.apply(ControlEvent::StartStop),
            Action::ToggleQuantize => self.apply(ControlEvent::ToggleQuantize),
            Action::ToggleHandedness => self.apply(ControlEvent::ToggleHandedness),
            Action::NextKey => {
                let key = self.theremin.controller().key().next();
                self.apply(ControlEvent::SelectKey(key.name().to_string()));
                self.send_controls();
            }
            Action::PrevKey => {
                let key = self.theremin.controller().key().prev();
                self.apply(ControlEvent::SelectKey(key.name().to_string()));
                self.send_controls();
            }
            Action::ToggleRange => {
                let span = match self.theremin.controller().range_span() {
                    RangeSpan::OneOctave => RangeSpan::TwoOctaves,
                    RangeSpan::TwoOctaves => RangeSpan::OneOctave,
                };
                self.theremin.controller_mut().set_range_span(span);
                self.send_controls();
            }
            Action::NudgePitch(delta) => {
                self.pitch = (self.pitch + delta).clamp(0.0, 1.0);
                self.send_controls();
            }
            Action::NudgeVolume(delta) => {
                self.volume = (self.volume + delta).clamp(0.0, 1.0);
                self.send_controls();
            }
        }
    }

    /// Play the field with the mouse: press or drag the left button.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if !matches!(
            mouse.kind,
            MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left)
        ) {
            return;
        }
        let field = self.field;
        if !field.contains(Position::new(mouse.column, mouse.row)) {
            return;
        }
        let span_x = field.width.saturating_sub(1).max(1) as f32;
        let span_y = field.height.saturating_sub(1).max(1) as f32;
        self.volume = ((mouse.column - field.x) as f32 / span_x).clamp(0.0, 1.0);
        self.pitch = (1.0 - (mouse.row - field.y) as f32 / span_y).clamp(0.0, 1.0);
        self.send_controls();
    }

    /// Apply events from OSC and other producers.
    pub fn process_control_events(&mut self) {
        for event in self.control_rx.drain() {
            self.apply(event);
        }
    }

    fn send_controls(&mut self) {
        let update =
            GestureUpdate::from_controls(self.pitch, self.volume, self.theremin.handedness());
        self.apply(ControlEvent::Gesture(update));
    }

    fn apply(&mut self, event: ControlEvent) {
        if let Err(e) = self.theremin.apply(event) {
            log::warn!("{e}");
        }
        if let Some(update) = self.theremin.last_gesture() {
            (self.pitch, self.volume) = update.assign(self.theremin.handedness());
        }
    }

    /// Draw the UI.
    pub fn draw(&mut self, frame: &mut Frame) {
        let readout = self.theremin.readout();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(8),    // Field + readout
                Constraint::Length(7), // Log pane
                Constraint::Length(1), // Status bar
            ])
            .split(frame.area());

        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(chunks[0]);

        self.draw_field(frame, top[0], &readout);
        self.draw_readout(frame, top[1], &readout);
        self.draw_log(frame, chunks[1]);
        self.draw_status(frame, chunks[2], &readout);
    }

    fn draw_field(&mut self, frame: &mut Frame, area: Rect, readout: &Readout) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Field (↕ pitch  ↔ volume) ");
        self.field = block.inner(area);

        let guides = readout.guides(1.0);
        let cursor = [(self.volume as f64, readout.pitch_position as f64)];
        let cursor_color = if readout.playing {
            Color::Green
        } else {
            Color::DarkGray
        };

        let canvas = Canvas::default()
            .block(block)
            .marker(Marker::Braille)
            .x_bounds([0.0, 1.0])
            .y_bounds([0.0, 1.0])
            .paint(move |ctx| {
                for y in &guides {
                    ctx.draw(&CanvasLine {
                        x1: 0.0,
                        y1: *y as f64,
                        x2: 1.0,
                        y2: *y as f64,
                        color: Color::DarkGray,
                    });
                }
                ctx.layer();
                ctx.draw(&Points {
                    coords: &cursor,
                    color: cursor_color,
                });
            });
        frame.render_widget(canvas, area);
    }

    fn draw_readout(&self, frame: &mut Frame, area: Rect, readout: &Readout) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(6), Constraint::Length(3)])
            .split(area);

        let label = Style::default().fg(Color::DarkGray);
        let value = Style::default().add_modifier(Modifier::BOLD);
        let cents = readout
            .cents
            .map(|c| format!(" ({c:+.0}¢)"))
            .unwrap_or_default();

        let lines = vec![
            Line::from(vec![
                Span::styled("Pitch  ", label),
                Span::styled(format!("{:.2} Hz", readout.frequency), value),
            ]),
            Line::from(vec![
                Span::styled("Note   ", label),
                Span::styled(readout.note_label(), value),
                Span::raw(cents),
            ]),
            Line::from(vec![
                Span::styled("Key    ", label),
                Span::styled(readout.key.name(), value),
                Span::raw(format!(
                    "  {:.2}–{:.2} Hz",
                    readout.min_frequency, readout.max_frequency
                )),
            ]),
            Line::from(vec![
                Span::styled("Range  ", label),
                Span::raw(format!("{} oct", readout.range.octaves())),
            ]),
            Line::from(vec![
                Span::styled("Quant  ", label),
                Span::raw(if readout.quantize { "on" } else { "off" }),
            ]),
            Line::from(vec![
                Span::styled("Hands  ", label),
                Span::raw(readout.handedness.label()),
            ]),
        ];
        let paragraph =
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Readout "));
        frame.render_widget(paragraph, rows[0]);

        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(" Volume "))
            .gauge_style(Style::default().fg(Color::Cyan))
            .ratio(readout.amplitude.clamp(0.0, 1.0) as f64);
        frame.render_widget(gauge, rows[1]);
    }

    fn draw_log(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title(" Log ");
        let visible = block.inner(area).height as usize;
        let lines: Vec<Line> = match self.log.lock() {
            Ok(ring) => ring
                .recent(visible)
                .into_iter()
                .map(|entry| {
                    let color = match entry.level {
                        Level::Error => Color::Red,
                        Level::Warn => Color::Yellow,
                        Level::Info => Color::Reset,
                        Level::Debug | Level::Trace => Color::DarkGray,
                    };
                    Line::from(Span::styled(
                        entry.message.clone(),
                        Style::default().fg(color),
                    ))
                })
                .collect(),
            Err(_) => Vec::new(),
        };
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect, readout: &Readout) {
        let (label, color) = if readout.playing {
            (" PLAY ", Color::Green)
        } else {
            (" STOP ", Color::Red)
        };
        let osc_indicator = if self.osc_listener.is_some() {
            Span::styled(" OSC ", Style::default().fg(Color::Green))
        } else {
            Span::raw("")
        };
        let line = Line::from(vec![
            Span::styled(
                label,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            osc_indicator,
            Span::styled(
                format!(" {} ", keybindings::hint()),
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    /// Run the TUI event loop.
    pub fn run(
        &mut self,
        terminal: &mut ratatui::Terminal<impl ratatui::backend::Backend>,
    ) -> io::Result<()> {
        while !self.should_quit {
            terminal
                .draw(|frame| self.draw(frame))
                .map_err(|e| io::Error::other(e.to_string()))?;

            if event::poll(Duration::from_millis(10))? {
                match event::read()? {
                    CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                        if let Some(action) = map_key(key) {
                            self.handle_action(action);
                        }
                    }
                    CrosstermEvent::Mouse(mouse) => self.handle_mouse(mouse),
                    _ => {}
                }
            }

            self.process_control_events();
        }
        self.theremin.controller_mut().stop();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::OfflineSink;
    use crate::instrument::Key;
    use crate::theremin::SessionSettings;

    fn app() -> App<OfflineSink> {
        let settings = SessionSettings {
            key: Key::A,
            ..SessionSettings::default()
        };
        App::new(
            Theremin::new(OfflineSink::new(44100), &settings),
            SharedLog::default(),
        )
    }

    #[test]
    fn starts_at_root_with_configured_volume() {
        let app = app();
        assert_eq!(app.pitch, 0.0);
        assert_eq!(app.volume, 0.25);
        assert!(!app.should_quit);
    }

    #[test]
    fn nudges_move_controls() {
        let mut app = app();
        app.handle_action(Action::NudgePitch(0.5));
        app.handle_action(Action::NudgeVolume(-1.0));
        let readout = app.readout();
        assert!((readout.frequency - 880.0).abs() < 0.01);
        assert_eq!(readout.amplitude, 0.0);
    }

    #[test]
    fn key_cycle_wraps() {
        let mut app = app();
        app.handle_action(Action::NextKey);
        assert_eq!(app.readout().key, Key::ASharp);
        app.handle_action(Action::NextKey);
        app.handle_action(Action::NextKey);
        assert_eq!(app.readout().key, Key::C);
        app.handle_action(Action::PrevKey);
        assert_eq!(app.readout().key, Key::B);
    }

    #[test]
    fn toggle_range_changes_span() {
        let mut app = app();
        app.handle_action(Action::ToggleRange);
        let readout = app.readout();
        assert_eq!(readout.range, RangeSpan::OneOctave);
        assert_eq!(readout.max_frequency, 880.0);
    }

    #[test]
    fn external_events_are_applied() {
        let mut app = app();
        let tx = app.control_sender();
        tx.send(ControlEvent::Gesture(GestureUpdate::new(0.8, 1.0)))
            .unwrap();
        tx.send(ControlEvent::Start).unwrap();
        app.process_control_events();

        let readout = app.readout();
        assert!(readout.playing);
        assert_eq!(readout.frequency, 1760.0);
        assert_eq!(app.pitch, 1.0);
        assert_eq!(app.volume, 0.8);
    }

    #[test]
    fn quit_action() {
        let mut app = app();
        app.handle_action(Action::Quit);
        assert!(app.should_quit);
    }
}
