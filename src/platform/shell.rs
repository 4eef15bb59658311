use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::debug;

use super::{DoctorReport, Keymap, Level};
use crate::config::ShellCommands;

/// Runs each system command through `sh -c`, one process per call.
pub struct ShellBackend {
    commands: ShellCommands,
}

impl ShellBackend {
    pub fn new(commands: ShellCommands) -> Self {
        Self { commands }
    }

    fn output(&self, cmd: &str) -> Result<std::process::Output> {
        debug!(%cmd, "running shell command");
        Command::new("sh")
            .arg("-c")
            .arg(cmd)
            .output()
            .with_context(|| format!("running `{cmd}`"))
    }

    fn run(&self, cmd: &str) -> Result<String> {
        let out = self.output(cmd)?;
        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            bail!("`{cmd}` failed (exit={}): {}", out.status, stderr.trim());
        }
        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }

    fn ensure_sh_present(&self) -> Result<()> {
        let status = Command::new("sh")
            .arg("-c")
            .arg("true")
            .status()
            .context("checking for sh")?;
        if !status.success() {
            bail!("`sh -c true` did not succeed");
        }
        Ok(())
    }
}

impl super::Backend for ShellBackend {
    fn read_level(&self, level: Level) -> Result<u8> {
        let cmd = match level {
            Level::Volume => &self.commands.volume_get,
            Level::Brightness => &self.commands.brightness_get,
        };
        // Only the printed value matters; the exit status is not checked.
        let out = self.output(cmd)?;
        if !out.status.success() {
            debug!(%cmd, status = %out.status, "query exited with failure");
        }
        let raw = String::from_utf8_lossy(&out.stdout);
        parse_level(&raw).with_context(|| {
            format!("unexpected output {:?} from `{cmd}`", raw.trim_end())
        })
    }

    fn apply_level(&self, level: Level, value: u8) -> Result<()> {
        let template = match level {
            Level::Volume => &self.commands.volume_set,
            Level::Brightness => &self.commands.brightness_set,
        };
        self.run(&format!("{template} {value}"))?;
        Ok(())
    }

    fn notify(&self, seconds: u32, message: &str) -> Result<()> {
        let cmd = format!(
            "{} {seconds} {}",
            self.commands.notif_set,
            shell_quote(message)
        );
        self.run(&cmd)?;
        Ok(())
    }

    fn set_audio_amp(&self, enabled: bool) -> Result<()> {
        let cmd = if enabled {
            &self.commands.audio_amp_on
        } else {
            &self.commands.audio_amp_off
        };
        self.run(cmd)?;
        Ok(())
    }

    fn load_keymap(&self, keymap: Keymap) -> Result<()> {
        let cmd = match keymap {
            Keymap::Default => &self.commands.keymap_default,
            Keymap::Resume => &self.commands.keymap_resume,
        };
        self.run(cmd)?;
        Ok(())
    }

    #[cfg(unix)]
    fn powerdown(&self) -> Result<()> {
        use std::os::unix::process::CommandExt;

        let mut parts = self.commands.powerdown.split_whitespace();
        let Some(program) = parts.next() else {
            bail!("powerdown command is empty");
        };
        // exec only returns on failure.
        let err = Command::new(program).args(parts).exec();
        Err(err).with_context(|| format!("exec `{}`", self.commands.powerdown))
    }

    #[cfg(not(unix))]
    fn powerdown(&self) -> Result<()> {
        bail!("powerdown is only supported on unix targets");
    }

    fn exit_process(&self, code: i32) {
        std::process::exit(code);
    }

    fn doctor(&self) -> Result<DoctorReport> {
        if let Err(e) = self.ensure_sh_present() {
            return Ok(DoctorReport {
                ok: false,
                message: format!("Cannot run shell commands: {e:#}"),
            });
        }

        let mut ok = true;
        let mut messages = vec!["sh: OK".to_string()];
        for level in [Level::Volume, Level::Brightness] {
            match self.read_level(level) {
                Ok(v) => messages.push(format!("{}: {v}%", level.name())),
                Err(e) => {
                    ok = false;
                    messages.push(format!("{}: {e:#}", level.name()));
                }
            }
        }
        Ok(DoctorReport {
            ok,
            message: messages.join("\n"),
        })
    }
}

/// Parses a percentage the way the firmware scripts print it: the output
/// must start with a decimal digit, the leading digit run is the value.
pub fn parse_level(raw: &str) -> Result<u8> {
    let digits: String = raw.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        bail!("output does not start with a digit");
    }
    let value: u64 = digits.parse().context("value out of range")?;
    Ok(value.min(100) as u8)
}

/// Single-quotes `s` for `sh`.
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}
