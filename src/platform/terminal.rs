//! Runs the overlay inside a terminal: frames are drawn with truecolor
//! half-block characters, keys come from crossterm.

use std::fmt::Write as _;
use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::{cursor, execute, terminal};
use tracing::debug;

use crate::display::{Display, EventSource, InputEvent, Key, KeyRepeat};
use crate::render::Surface;

pub struct TerminalDisplay {
    screen: Surface,
    scale: u32,
    out: io::Stdout,
}

impl TerminalDisplay {
    /// Switches the terminal to raw mode on the alternate screen.
    pub fn open(width: u32, height: u32, scale: u32) -> Result<Self> {
        let mut out = io::stdout();
        terminal::enable_raw_mode().context("enable raw mode")?;
        execute!(out, terminal::EnterAlternateScreen, cursor::Hide)
            .context("enter alternate screen")?;
        Ok(Self {
            screen: Surface::filled(width, height, crate::render::rgb(0, 0, 0)),
            scale: scale.max(1),
            out,
        })
    }

    /// The host draws its own frames here, then calls [`Self::flush`].
    pub fn screen_mut(&mut self) -> &mut Surface {
        &mut self.screen
    }

    pub fn flush(&mut self) -> Result<()> {
        let ansi = frame_to_ansi(&self.screen, self.scale);
        self.out.write_all(ansi.as_bytes()).context("write frame")?;
        self.out.flush().context("flush frame")
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        restore_terminal();
    }
}

/// Leaves the alternate screen and raw mode. Also needed before the
/// process exits without unwinding.
pub fn restore_terminal() {
    let _ = execute!(io::stdout(), terminal::LeaveAlternateScreen, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

impl Display for TerminalDisplay {
    fn size(&self) -> (u32, u32) {
        self.screen.size()
    }

    fn capture(&self) -> Result<Surface> {
        Ok(self.screen.clone())
    }

    fn present(&mut self, frame: &Surface) -> Result<()> {
        self.screen.copy_from(frame)?;
        self.flush()
    }
}

/// Encodes `frame` as rows of `▄` cells, two pixel rows per text row,
/// sampling every `scale`-th pixel.
pub fn frame_to_ansi(frame: &Surface, scale: u32) -> String {
    let scale = scale.max(1);
    let cols = frame.width() / scale;
    let rows = frame.height() / scale;
    let mut out = String::with_capacity((cols as usize * 40 + 16) * (rows as usize / 2 + 1));
    out.push_str("\x1b[1;1H");
    for row in (0..rows).step_by(2) {
        for col in 0..cols {
            let top = frame.pixel(col * scale, row * scale);
            let bottom = frame.pixel(col * scale, ((row + 1).min(rows - 1)) * scale);
            let _ = write!(
                out,
                "\x1b[48;2;{};{};{}m\x1b[38;2;{};{};{}m▄",
                top[0], top[1], top[2], bottom[0], bottom[1], bottom[2]
            );
        }
        out.push_str("\x1b[m\r\n");
    }
    out
}

/// Keyboard events from the controlling terminal.
pub struct TerminalEvents {
    repeat: KeyRepeat,
}

impl TerminalEvents {
    pub fn new() -> Self {
        Self {
            repeat: KeyRepeat::DISABLED,
        }
    }
}

impl Default for TerminalEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for TerminalEvents {
    fn poll_event(&mut self) -> Result<Option<InputEvent>> {
        while event::poll(Duration::ZERO).context("poll terminal events")? {
            if let Event::Key(key) = event::read().context("read terminal event")? {
                if let Some(ev) = map_key(key) {
                    return Ok(Some(ev));
                }
            }
        }
        Ok(None)
    }

    fn key_repeat(&self) -> KeyRepeat {
        self.repeat
    }

    fn set_key_repeat(&mut self, repeat: KeyRepeat) -> Result<()> {
        // Terminals repeat keys on their own; remember the value for restore.
        debug!(?repeat, "key repeat");
        self.repeat = repeat;
        Ok(())
    }
}

fn map_key(key: KeyEvent) -> Option<InputEvent> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(InputEvent::Quit);
    }
    let key = match key.code {
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Enter => Key::Return,
        KeyCode::Esc => Key::Escape,
        KeyCode::Char(c) => Key::Char(c.to_ascii_lowercase()),
        _ => return None,
    };
    Some(InputEvent::KeyDown(key))
}
