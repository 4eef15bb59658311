//! The pause overlay: zones, navigation state and the blocking loops.

pub mod assets;
pub mod commands;
pub mod controller;
pub mod resume;
pub mod state;
pub mod zone;

pub use controller::{MenuController, MenuOutcome};
pub use resume::{ResumeOption, ResumePrompt};
pub use zone::ZoneKind;
