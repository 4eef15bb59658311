use std::{env, fs, path::Path, path::PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::menu::zone::ZoneKind;

const RESOURCES_DIR: &str = "/usr/games/menu_resources";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub assets: AssetPaths,
    pub commands: ShellCommands,
    pub timing: Timing,

    /// Zone names in display order. Unknown names are skipped with a warning.
    pub zones: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontSpec {
    pub path: PathBuf,
    pub size: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    pub title_font: FontSpec,
    pub info_font: FontSpec,
    pub small_info_font: FontSpec,
    pub background: PathBuf,
    pub arrow_top: PathBuf,
    pub arrow_bottom: PathBuf,
}

impl Default for AssetPaths {
    fn default() -> Self {
        let res = Path::new(RESOURCES_DIR);
        Self {
            title_font: FontSpec {
                path: res.join("OpenSans-Bold.ttf"),
                size: 22,
            },
            info_font: FontSpec {
                path: res.join("OpenSans-Bold.ttf"),
                size: 16,
            },
            small_info_font: FontSpec {
                path: res.join("OpenSans-Regular.ttf"),
                size: 13,
            },
            background: res.join("zone_bg.png"),
            arrow_top: res.join("arrow_top.png"),
            arrow_bottom: res.join("arrow_bottom.png"),
        }
    }
}

/// Command templates; `*_set` commands get the value appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellCommands {
    pub volume_get: String,
    pub volume_set: String,
    pub brightness_get: String,
    pub brightness_set: String,
    pub notif_set: String,
    pub audio_amp_on: String,
    pub audio_amp_off: String,
    pub powerdown: String,
    pub keymap_default: String,
    pub keymap_resume: String,
}

impl Default for ShellCommands {
    fn default() -> Self {
        Self {
            volume_get: "volume get".to_string(),
            volume_set: "volume set".to_string(),
            brightness_get: "brightness get".to_string(),
            brightness_set: "brightness set".to_string(),
            notif_set: "notif set".to_string(),
            audio_amp_on: "audio_amp on".to_string(),
            audio_amp_off: "audio_amp off".to_string(),
            powerdown: "powerdown".to_string(),
            keymap_default: "keymap default".to_string(),
            keymap_resume: "keymap resume".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    pub fps: u32,
    pub scroll_speed_px: u32,
    pub notification_seconds: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            fps: 50,
            scroll_speed_px: 30,
            notification_seconds: 2,
        }
    }
}

impl Config {
    /// The shipped menu: everything but Powerdown.
    pub fn default_zones() -> Vec<String> {
        [
            ZoneKind::Volume,
            ZoneKind::Brightness,
            ZoneKind::Save,
            ZoneKind::Load,
            ZoneKind::AspectRatio,
            ZoneKind::Exit,
        ]
        .iter()
        .map(|k| k.key().to_string())
        .collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.timing.fps == 0 {
            bail!("timing.fps must be greater than zero");
        }
        if self.timing.scroll_speed_px == 0 {
            bail!("timing.scroll_speed_px must be greater than zero");
        }
        if self.zone_kinds().is_empty() {
            bail!("no usable menu zones configured");
        }
        Ok(())
    }

    /// Configured zones in order, or the default set when none are listed.
    pub fn zone_kinds(&self) -> Vec<ZoneKind> {
        let names = if self.zones.is_empty() {
            Self::default_zones()
        } else {
            self.zones.clone()
        };
        names
            .iter()
            .filter_map(|name| match name.parse::<ZoneKind>() {
                Ok(kind) => Some(kind),
                Err(_) => {
                    warn!(zone = %name, "unknown menu zone, skipping");
                    None
                }
            })
            .collect()
    }
}

pub fn load_optional() -> Result<Option<Config>> {
    let Some(path) = resolve_config_path() else {
        return Ok(None);
    };
    if !path.exists() {
        return Ok(None);
    }
    load_from(&path).map(Some)
}

pub fn load_from(path: &Path) -> Result<Config> {
    let bytes = fs::read(path).with_context(|| format!("reading config {}", path.display()))?;
    let cfg: Config =
        serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))?;
    Ok(cfg)
}

pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(p) = env::var("FUNKEY_MENU_CONFIG") {
        if !p.trim().is_empty() {
            return Some(PathBuf::from(p));
        }
    }

    let local = PathBuf::from("funkey-menu.json");
    if local.exists() {
        return Some(local);
    }

    if let Some(home) = env::var_os("HOME") {
        return Some(PathBuf::from(home).join(".config").join("funkey-menu").join("config.json"));
    }

    None
}

pub fn ensure_config_file_exists() -> Result<PathBuf> {
    let Some(path) = resolve_config_path() else {
        return Err(anyhow!(
            "No config path available (set FUNKEY_MENU_CONFIG or ensure HOME is present)"
        ));
    };
    write_template(&path)?;
    Ok(path)
}

/// Writes the default config to `path` unless a file is already there.
pub fn write_template(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create config dir {}", parent.display()))?;
        }
    }

    if !path.exists() {
        let template = Config {
            zones: Config::default_zones(),
            ..Config::default()
        };
        let mut s = serde_json::to_string_pretty(&template).context("serialize config template")?;
        s.push('\n');
        fs::write(path, s.as_bytes()).with_context(|| format!("write {}", path.display()))?;
    }
    Ok(())
}
