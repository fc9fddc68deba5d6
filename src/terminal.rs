//! Crossterm front end: a [`Display`] drawing one row per control plus a
//! status line, and a [`KeySource`] reading raw key presses.

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue};
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;
use termite_core::{ControlView, Display, Key, KeySource, SoundEngine};

const HEADER: &str = "termite  up/down select  left/right adjust  m learn  c clear  F1 quit";
const FIRST_ROW: u16 = 2;

/// Screen rows for control names: the seeded layout first, then any name
/// drawn later in order of appearance.
#[derive(Debug, Default)]
struct Rows {
    names: Vec<Arc<str>>,
}

impl Rows {
    fn seeded<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    fn row_of(&mut self, name: &Arc<str>) -> u16 {
        let index = match self.names.iter().position(|n| n == name) {
            Some(index) => index,
            None => {
                self.names.push(Arc::clone(name));
                self.names.len() - 1
            }
        };
        FIRST_ROW + index as u16
    }
}

fn control_line(view: &ControlView) -> String {
    format!(
        "{:<12} {:>10.4}  [{} .. {}]",
        view.name, view.value, view.min, view.max
    )
}

fn status_line(view: &ControlView, learn_armed: bool) -> String {
    let binding = match view.midi_learn {
        Some(cc) => format!("cc {cc:>3}"),
        None => "cc  --".to_string(),
    };
    let learn = if learn_armed { "  LEARN: move a controller" } else { "" };
    format!("{}  {}{}", view.name, binding, learn)
}

/// Draws controls on stdout, one row per name in `layout` order, with the
/// status line below them.
pub struct TerminalDisplay {
    rows: Mutex<Rows>,
    status_row: u16,
}

impl TerminalDisplay {
    /// `layout` should list the navigable controls followed by the pitch-bend
    /// control.
    pub fn new<I, S>(layout: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        let rows = Rows::seeded(layout);
        let status_row = FIRST_ROW + rows.names.len() as u16 + 1;
        Self {
            rows: Mutex::new(rows),
            status_row,
        }
    }

    /// Row names in an engine's navigation order, pitch bend last.
    pub fn for_engine<E: SoundEngine>(engine: &E) -> Self {
        let controls = engine.controls().into_iter().map(|spec| spec.name);
        Self::new(controls.chain(std::iter::once(engine.pitch_bend().name)))
    }

    fn draw_line(&self, row: u16, text: &str, highlighted: bool) {
        let mut stdout = io::stdout().lock();
        let result = (|| {
            queue!(stdout, cursor::MoveTo(0, row), Clear(ClearType::CurrentLine))?;
            if highlighted {
                queue!(stdout, SetAttribute(Attribute::Reverse))?;
            }
            queue!(stdout, Print(text), SetAttribute(Attribute::Reset))?;
            stdout.flush()
        })();
        if let Err(err) = result {
            tracing::debug!("Terminal draw failed: {}", err);
        }
    }
}

impl Display for TerminalDisplay {
    fn draw_control(&self, control: &ControlView, highlighted: bool) {
        let row = self.rows.lock().row_of(&control.name);
        self.draw_line(row, &control_line(control), highlighted);
    }

    fn draw_control_status(&self, control: &ControlView, learn_armed: bool) {
        self.draw_line(self.status_row, &status_line(control, learn_armed), false);
    }
}

/// Raw mode plus alternate screen for as long as it lives.
pub struct TerminalGuard;

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide, cursor::MoveTo(0, 0), Print(HEADER))?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), cursor::Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Blocking key presses from the terminal. F1 and Ctrl-C exit.
#[derive(Debug, Default)]
pub struct TerminalKeys;

impl TerminalKeys {
    pub fn new() -> Self {
        Self
    }
}

fn map_key(code: KeyCode, modifiers: KeyModifiers) -> Key {
    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Key::Exit,
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::F(1) => Key::Exit,
        _ => Key::Other,
    }
}

impl KeySource for TerminalKeys {
    fn read_key(&mut self) -> Option<Key> {
        loop {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    return Some(map_key(key.code, key.modifiers));
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!("Keyboard input closed: {}", err);
                    return None;
                }
            }
        }
    }
}
