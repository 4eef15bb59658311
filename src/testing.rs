//! In-crate fakes for driving the menu loops without a console.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;
use std::rc::Rc;

use anyhow::{anyhow, Result};

use crate::config::{AssetPaths, Config, FontSpec};
use crate::display::{EventSource, InputEvent, Key, KeyRepeat};
use crate::platform::{Backend, DoctorReport, Keymap, Level};
use crate::signal::StopToken;

pub type CallLog = Rc<RefCell<Vec<String>>>;

/// Config pointing at assets that do not exist, running at 1000 fps.
pub fn test_config() -> Config {
    let dir = Path::new("/nonexistent/menu_resources");
    let font = |name: &str, size| FontSpec {
        path: dir.join(name),
        size,
    };
    let mut cfg = Config {
        assets: AssetPaths {
            title_font: font("bold.ttf", 22),
            info_font: font("bold.ttf", 16),
            small_info_font: font("regular.ttf", 13),
            background: dir.join("zone_bg.png"),
            arrow_top: dir.join("arrow_top.png"),
            arrow_bottom: dir.join("arrow_bottom.png"),
        },
        ..Config::default()
    };
    cfg.timing.fps = 1000;
    cfg
}

/// Records every side effect as a line of text.
pub struct RecordingBackend {
    pub log: CallLog,
    /// `None` makes the read fail.
    pub volume: Option<u8>,
    pub brightness: Option<u8>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            log: CallLog::default(),
            volume: Some(50),
            brightness: Some(50),
        }
    }

    fn push(&self, line: String) {
        self.log.borrow_mut().push(line);
    }
}

impl Backend for RecordingBackend {
    fn read_level(&self, level: Level) -> Result<u8> {
        self.push(format!("read {}", level.name()));
        let value = match level {
            Level::Volume => self.volume,
            Level::Brightness => self.brightness,
        };
        value.ok_or_else(|| anyhow!("{} get: command not found", level.name()))
    }

    fn apply_level(&self, level: Level, value: u8) -> Result<()> {
        self.push(format!("set {} {value}", level.name()));
        Ok(())
    }

    fn notify(&self, seconds: u32, message: &str) -> Result<()> {
        self.push(format!("notif {seconds} {message}"));
        Ok(())
    }

    fn set_audio_amp(&self, enabled: bool) -> Result<()> {
        self.push(format!("amp {}", if enabled { "on" } else { "off" }));
        Ok(())
    }

    fn load_keymap(&self, keymap: Keymap) -> Result<()> {
        let name = match keymap {
            Keymap::Default => "default",
            Keymap::Resume => "resume",
        };
        self.push(format!("keymap {name}"));
        Ok(())
    }

    fn powerdown(&self) -> Result<()> {
        self.push("powerdown".to_string());
        Err(anyhow!("exec powerdown: no such file"))
    }

    fn exit_process(&self, code: i32) {
        self.push(format!("exit {code}"));
    }

    fn doctor(&self) -> Result<DoctorReport> {
        Ok(DoctorReport {
            ok: true,
            message: "recording backend".to_string(),
        })
    }
}

/// Replays events in batches: each batch is drained by one loop iteration.
/// Once every batch is consumed it either closes the menu with Escape or
/// trips a stop token.
pub struct ScriptedEvents {
    batches: VecDeque<VecDeque<InputEvent>>,
    repeat: KeyRepeat,
    pub repeat_log: Vec<KeyRepeat>,
    stop_when_done: Option<StopToken>,
}

impl ScriptedEvents {
    pub fn new(batches: Vec<Vec<InputEvent>>) -> Self {
        Self {
            batches: batches.into_iter().map(VecDeque::from).collect(),
            repeat: KeyRepeat {
                delay_ms: 250,
                interval_ms: 40,
            },
            repeat_log: Vec::new(),
            stop_when_done: None,
        }
    }

    /// One key per batch.
    pub fn keys(keys: &[Key]) -> Self {
        Self::new(keys.iter().map(|k| vec![InputEvent::KeyDown(*k)]).collect())
    }

    pub fn stop_when_done(mut self, token: StopToken) -> Self {
        self.stop_when_done = Some(token);
        self
    }

    pub fn is_drained(&self) -> bool {
        self.batches.is_empty()
    }
}

impl EventSource for ScriptedEvents {
    fn poll_event(&mut self) -> Result<Option<InputEvent>> {
        let Some(batch) = self.batches.front_mut() else {
            return Ok(match &self.stop_when_done {
                Some(token) => {
                    token.request_stop();
                    None
                }
                None => Some(InputEvent::KeyDown(Key::Escape)),
            });
        };
        match batch.pop_front() {
            Some(event) => Ok(Some(event)),
            None => {
                self.batches.pop_front();
                Ok(None)
            }
        }
    }

    fn key_repeat(&self) -> KeyRepeat {
        self.repeat
    }

    fn set_key_repeat(&mut self, repeat: KeyRepeat) -> Result<()> {
        self.repeat = repeat;
        self.repeat_log.push(repeat);
        Ok(())
    }
}
