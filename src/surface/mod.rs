//! Input adapters
//!
//! The terminal control surface shows every control as a fader plus the
//! tempo readout, and turns key presses into control events. The headless
//! adapter reads the same events from text lines.

mod fader;
pub mod headless;
mod keys;

pub use fader::{fraction, Fader};
pub use keys::{key_action, Action};

use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

use crate::control::{ParamId, Snapshot};
use crate::engine::EngineHandle;

const HELP: &str = "←/→ delay  ↑/↓ fb  [/] vol  t tap  2 x2  s/x dub  a/z air  b/n ben  Esc clear  Tab/-/= select+nudge  q quit";

/// Surface state that lives outside the engine
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceState {
    selected: usize,
}

impl SurfaceState {
    pub fn new() -> Self {
        Self { selected: 0 }
    }

    pub fn selected(&self) -> ParamId {
        ParamId::ALL[self.selected % ParamId::ALL.len()]
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % ParamId::ALL.len();
    }

    pub fn select_prev(&mut self) {
        let n = ParamId::ALL.len();
        self.selected = (self.selected + n - 1) % n;
    }
}

impl Default for SurfaceState {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the terminal surface until the operator quits or the engine stops
pub fn run_surface(handle: &EngineHandle) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, handle);

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, handle: &EngineHandle) -> Result<()> {
    let start = Instant::now();
    let mut state = SurfaceState::new();

    while handle.is_running() {
        let snapshot = handle.snapshot();
        terminal.draw(|f| draw_ui(f, &snapshot, &state))?;

        // Redraw at roughly 30 fps while idle
        if !event::poll(Duration::from_millis(33))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };

        match key_action(key, state.selected(), start.elapsed().as_secs_f64()) {
            Some(Action::Event(event)) => {
                if !handle.send(event) {
                    break;
                }
            }
            Some(Action::SelectNext) => state.select_next(),
            Some(Action::SelectPrev) => state.select_prev(),
            Some(Action::Quit) => {
                handle.stop();
                break;
            }
            None => {}
        }
    }

    Ok(())
}

fn draw_ui(f: &mut Frame, snapshot: &Snapshot, state: &SurfaceState) {
    let area = f.area();

    // Layout: tempo on top, faders, key help at bottom
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                                  // Tempo
            Constraint::Length(snapshot.params.len() as u16 + 2),   // Faders
            Constraint::Length(3),                                  // Help
            Constraint::Min(0),
        ])
        .split(area);

    draw_tempo(f, chunks[0], snapshot);
    draw_faders(f, chunks[1], snapshot, state);
    draw_help(f, chunks[2]);
}

fn draw_tempo(f: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let tempo = &snapshot.tempo;
    let bpm = match tempo.bpm() {
        Some(bpm) => format!("{:5.1} bpm", bpm),
        None => "— bpm".to_string(),
    };
    let double_color = if tempo.doubled { Color::Yellow } else { Color::DarkGray };

    let text = Line::from(vec![
        Span::raw("  Tap: "),
        Span::styled(format!("{:<12}", tempo.hint_text()), Style::default().fg(Color::Cyan)),
        Span::raw("  BPM: "),
        Span::styled(bpm, Style::default().fg(Color::Green)),
        Span::raw("  "),
        Span::styled("x2", Style::default().fg(double_color)),
    ]);

    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(" Delay "));

    f.render_widget(paragraph, area);
}

fn draw_faders(f: &mut Frame, area: Rect, snapshot: &Snapshot, state: &SurfaceState) {
    let block = Block::default().borders(Borders::ALL).title(" Controls ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let selected = state.selected();
    for (i, view) in snapshot.params.iter().enumerate() {
        let y = inner.y + i as u16;
        if y >= inner.y + inner.height {
            break;
        }
        let row = Rect::new(inner.x, y, inner.width, 1);
        let fader = Fader::new(view)
            .style(Style::default().fg(Color::Cyan))
            .selected(view.id == selected);
        f.render_widget(fader, row);
    }
}

fn draw_help(f: &mut Frame, area: Rect) {
    let paragraph = Paragraph::new(Line::from(HELP))
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(paragraph, area);
}
