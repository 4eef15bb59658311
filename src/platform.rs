use anyhow::Result;

use crate::config::Config;

/// System settings adjusted as a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Volume,
    Brightness,
}

impl Level {
    pub fn name(self) -> &'static str {
        match self {
            Level::Volume => "volume",
            Level::Brightness => "brightness",
        }
    }
}

/// Input keymaps the console firmware can switch between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keymap {
    /// Plain key mapping used while the overlay is open.
    Default,
    /// The mapping the game was using before the overlay opened.
    Resume,
}

#[derive(Debug, Clone)]
pub struct DoctorReport {
    pub ok: bool,
    pub message: String,
}

/// Every side effect the overlay has on the host system.
pub trait Backend {
    fn read_level(&self, level: Level) -> Result<u8>;
    fn apply_level(&self, level: Level, value: u8) -> Result<()>;
    /// On-screen notification shown by the firmware after the overlay closes.
    fn notify(&self, seconds: u32, message: &str) -> Result<()>;
    fn set_audio_amp(&self, enabled: bool) -> Result<()>;
    fn load_keymap(&self, keymap: Keymap) -> Result<()>;
    /// Replaces the current process with the powerdown command. Only returns on failure.
    fn powerdown(&self) -> Result<()>;
    fn exit_process(&self, code: i32);
    fn doctor(&self) -> Result<DoctorReport>;
}

pub mod shell;
pub mod terminal;

pub fn backend(config: &Config) -> Result<Box<dyn Backend>> {
    Ok(Box::new(shell::ShellBackend::new(config.commands.clone())))
}
