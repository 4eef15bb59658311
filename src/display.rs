//! What the host application hands to the overlay: a live screen and a
//! source of input events.

use anyhow::Result;

use crate::render::Surface;

/// The live screen owned by the host.
pub trait Display {
    fn size(&self) -> (u32, u32);
    /// Copy of the pixels currently shown.
    fn capture(&self) -> Result<Surface>;
    /// Replaces the shown pixels with `frame` and flips.
    fn present(&mut self, frame: &Surface) -> Result<()>;
}

/// Physical keys the overlay reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Return,
    Escape,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Window closed / quit requested by the system.
    Quit,
    KeyDown(Key),
}

/// Key auto-repeat timing, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRepeat {
    pub delay_ms: u32,
    pub interval_ms: u32,
}

impl KeyRepeat {
    pub const DEFAULT: Self = Self {
        delay_ms: 500,
        interval_ms: 30,
    };
    pub const DISABLED: Self = Self {
        delay_ms: 0,
        interval_ms: 0,
    };
}

pub trait EventSource {
    /// Next pending event, `Ok(None)` when the queue is drained.
    fn poll_event(&mut self) -> Result<Option<InputEvent>>;
    fn key_repeat(&self) -> KeyRepeat;
    fn set_key_repeat(&mut self, repeat: KeyRepeat) -> Result<()>;
}

/// In-memory display, used for offline rendering and tests.
#[derive(Debug, Clone)]
pub struct HeadlessDisplay {
    screen: Surface,
    presented: usize,
}

impl HeadlessDisplay {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_screen(Surface::filled(width, height, crate::render::rgb(0, 0, 0)))
    }

    pub fn with_screen(screen: Surface) -> Self {
        Self {
            screen,
            presented: 0,
        }
    }

    pub fn screen(&self) -> &Surface {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut Surface {
        &mut self.screen
    }

    /// Number of frames presented so far.
    pub fn presented(&self) -> usize {
        self.presented
    }
}

impl Display for HeadlessDisplay {
    fn size(&self) -> (u32, u32) {
        self.screen.size()
    }

    fn capture(&self) -> Result<Surface> {
        Ok(self.screen.clone())
    }

    fn present(&mut self, frame: &Surface) -> Result<()> {
        self.screen.copy_from(frame)?;
        self.presented += 1;
        Ok(())
    }
}
