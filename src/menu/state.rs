use crate::platform::Level;

/// Used when the system value cannot be read.
pub const DEFAULT_PERCENTAGE: u8 = 50;
pub const STEP_CHANGE_VOLUME: u8 = 10;
pub const STEP_CHANGE_BRIGHTNESS: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AspectRatio {
    #[default]
    Stretched,
    Scaled,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 2] = [AspectRatio::Stretched, AspectRatio::Scaled];

    pub fn name(self) -> &'static str {
        match self {
            AspectRatio::Stretched => "STRETCHED",
            AspectRatio::Scaled => "SCALED",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|r| *r == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let i = self.index();
        Self::ALL[if i == 0 { Self::ALL.len() - 1 } else { i - 1 }]
    }
}

/// Values the overlay adjusts. Percentages stay within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    volume: u8,
    brightness: u8,
    pub aspect_ratio: AspectRatio,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            volume: DEFAULT_PERCENTAGE,
            brightness: DEFAULT_PERCENTAGE,
            aspect_ratio: AspectRatio::default(),
        }
    }
}

impl Settings {
    pub fn level(&self, level: Level) -> u8 {
        match level {
            Level::Volume => self.volume,
            Level::Brightness => self.brightness,
        }
    }

    pub fn set_level(&mut self, level: Level, value: u8) {
        let value = value.min(100);
        match level {
            Level::Volume => self.volume = value,
            Level::Brightness => self.brightness = value,
        }
    }

    pub fn step(level: Level) -> u8 {
        match level {
            Level::Volume => STEP_CHANGE_VOLUME,
            Level::Brightness => STEP_CHANGE_BRIGHTNESS,
        }
    }

    /// Lowers `level` by one step, stopping at 0. Returns the new value.
    pub fn decrease(&mut self, level: Level) -> u8 {
        let step = Self::step(level);
        let cur = self.level(level);
        let next = if cur < step { 0 } else { cur - step };
        self.set_level(level, next);
        next
    }

    /// Raises `level` by one step, stopping at 100. Returns the new value.
    pub fn increase(&mut self, level: Level) -> u8 {
        let step = Self::step(level);
        let cur = self.level(level);
        let next = if cur > 100 - step { 100 } else { cur + step };
        self.set_level(level, next);
        next
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    /// Next zone slides in from the bottom.
    Down,
    /// Previous zone slides in from the top.
    Up,
}

/// Zone selection, transition animation and confirmation state.
///
/// `scroll` is the signed pixel offset of the running transition; it never
/// exceeds one zone height in magnitude and is zero when idle.
#[derive(Debug, Clone)]
pub struct Navigator {
    zone_count: usize,
    current: usize,
    previous: usize,
    scroll: i32,
    pending: Option<ScrollDirection>,
    confirmation: bool,
}

impl Navigator {
    pub fn new(zone_count: usize) -> Self {
        Self {
            zone_count,
            current: 0,
            previous: 0,
            scroll: 0,
            pending: None,
            confirmation: false,
        }
    }

    /// Resets the transient state at the start of an overlay session; the
    /// selected zone carries over from the previous session.
    pub fn begin_session(&mut self) {
        self.previous = self.current;
        self.scroll = 0;
        self.pending = None;
        self.confirmation = false;
    }

    pub fn zone_count(&self) -> usize {
        self.zone_count
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn previous(&self) -> usize {
        self.previous
    }

    pub fn scroll(&self) -> i32 {
        self.scroll
    }

    pub fn is_idle(&self) -> bool {
        self.scroll == 0
    }

    pub fn confirmation(&self) -> bool {
        self.confirmation
    }

    pub fn select(&mut self, index: usize) {
        if index < self.zone_count {
            self.current = index;
            self.previous = index;
        }
    }

    pub fn move_down(&mut self) {
        if self.zone_count == 0 {
            return;
        }
        self.current = (self.current + 1) % self.zone_count;
        self.pending = Some(ScrollDirection::Down);
        self.confirmation = false;
    }

    pub fn move_up(&mut self) {
        if self.zone_count == 0 {
            return;
        }
        self.current = if self.current == 0 {
            self.zone_count - 1
        } else {
            self.current - 1
        };
        self.pending = Some(ScrollDirection::Up);
        self.confirmation = false;
    }

    pub fn arm_confirmation(&mut self) {
        self.confirmation = true;
    }

    /// Clears a pending confirmation, returning whether one was set.
    pub fn clear_confirmation(&mut self) -> bool {
        std::mem::replace(&mut self.confirmation, false)
    }

    /// Advances a running or armed transition by one frame. Returns true
    /// when the frame needs redrawing.
    pub fn advance_scroll(&mut self, zone_height: u32, speed: u32) -> bool {
        let height = zone_height as i32;
        let speed = speed as i32;
        let mut changed = false;

        if self.scroll > 0 || self.pending == Some(ScrollDirection::Down) {
            self.scroll += speed.min(height - self.scroll);
            self.pending = None;
            changed = true;
        } else if self.scroll < 0 || self.pending == Some(ScrollDirection::Up) {
            self.scroll -= speed.min(height + self.scroll);
            self.pending = None;
            changed = true;
        }

        if self.scroll >= height || self.scroll <= -height {
            self.previous = self.current;
            self.scroll = 0;
            changed = true;
        }
        changed
    }
}
