//! Prompt shown at game start when a quick save is available.

use tracing::{debug, error, info};

use super::assets::{FontRole, MenuAssets};
use super::commands::{decode, MenuCommand};
use super::zone::{draw_arrows, draw_centered_text, PADDING_Y_FROM_CENTER};
use crate::display::{Display, EventSource, KeyRepeat};
use crate::frame::FrameLimiter;
use crate::platform::Backend;
use crate::render::{rgb, Surface};
use crate::signal::StopToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResumeOption {
    #[default]
    Resume,
    Reset,
}

impl ResumeOption {
    pub const ALL: [ResumeOption; 2] = [ResumeOption::Resume, ResumeOption::Reset];

    pub fn label(self) -> &'static str {
        match self {
            ResumeOption::Resume => "RESUME GAME",
            ResumeOption::Reset => "RESET GAME",
        }
    }

    fn step(self, forward: bool) -> Self {
        let i = Self::ALL.iter().position(|o| *o == self).unwrap_or(0);
        let n = Self::ALL.len();
        Self::ALL[if forward { (i + 1) % n } else { (i + n - 1) % n }]
    }
}

pub struct ResumePrompt<'a> {
    backend: &'a dyn Backend,
    assets: &'a MenuAssets,
    fps: u32,
    stop: StopToken,
}

impl<'a> ResumePrompt<'a> {
    pub fn new(backend: &'a dyn Backend, assets: &'a MenuAssets, fps: u32, stop: StopToken) -> Self {
        Self {
            backend,
            assets,
            fps,
            stop,
        }
    }

    /// Blocks until an option is confirmed with two Accept presses or the
    /// stop token fires, in which case the highlighted option is returned.
    /// Escape does not leave this prompt.
    pub fn run(&self, display: &mut dyn Display, events: &mut dyn EventSource) -> ResumeOption {
        info!("entering resume prompt");
        if let Err(e) = self.backend.set_audio_amp(false) {
            error!("could not switch audio amp: {e:#}");
        }
        let saved_repeat = events.key_repeat();
        if let Err(e) = events.set_key_repeat(KeyRepeat::DEFAULT) {
            error!("could not set key repeat: {e:#}");
        }

        let (w, h) = display.size();
        let mut background = Surface::filled(w, h, rgb(0, 0, 0));
        background.blit(&self.assets.background_or_placeholder(w, h), None, 0, 0);
        draw_arrows(
            &mut background,
            self.assets.arrow_top.as_ref(),
            self.assets.arrow_bottom.as_ref(),
        );

        let mut option = ResumeOption::default();
        let mut confirmation = false;
        let mut refresh = true;
        let mut stop = false;
        let mut limiter = FrameLimiter::new(self.fps);

        while !stop && !self.stop.is_stop_requested() {
            loop {
                let event = match events.poll_event() {
                    Ok(Some(event)) => event,
                    Ok(None) => break,
                    Err(e) => {
                        error!("could not read input: {e:#}");
                        break;
                    }
                };
                match decode(&event) {
                    Some(MenuCommand::Quit) => {
                        self.backend.exit_process(0);
                        stop = true;
                    }
                    Some(MenuCommand::Back) => {
                        refresh |= std::mem::replace(&mut confirmation, false);
                    }
                    Some(cmd @ (MenuCommand::Up | MenuCommand::Down)) => {
                        option = option.step(cmd == MenuCommand::Down);
                        debug!(option = option.label(), "resume option");
                        confirmation = false;
                        refresh = true;
                    }
                    Some(MenuCommand::Accept) if confirmation => {
                        debug!(option = option.label(), "confirmed");
                        stop = true;
                    }
                    Some(MenuCommand::Accept) => {
                        confirmation = true;
                        refresh = true;
                    }
                    _ => {}
                }
                if stop {
                    break;
                }
            }

            limiter.wait();

            if refresh && !stop {
                let mut frame = background.clone();
                if let Some(font) = self.assets.fonts.get(FontRole::Title) {
                    draw_centered_text(&mut frame, font, option.label(), (w, h), 0);
                }
                if confirmation {
                    if let Some(font) = self.assets.fonts.get(FontRole::Info) {
                        let offset = 2 * PADDING_Y_FROM_CENTER;
                        draw_centered_text(&mut frame, font, "Are you sure ?", (w, h), offset);
                    }
                }
                if let Err(e) = display.present(&frame) {
                    error!("could not present resume prompt: {e:#}");
                }
                refresh = false;
            }
        }

        if let Err(e) = events.set_key_repeat(saved_repeat) {
            error!("could not restore key repeat: {e:#}");
        }
        if let Err(e) = self.backend.set_audio_amp(true) {
            error!("could not switch audio amp: {e:#}");
        }
        info!(option = option.label(), "leaving resume prompt");
        option
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{HeadlessDisplay, InputEvent, Key};
    use crate::testing::{RecordingBackend, ScriptedEvents};

    fn run(keys: Vec<Vec<InputEvent>>) -> (ResumeOption, Vec<String>, HeadlessDisplay) {
        let backend = RecordingBackend::new();
        let assets = MenuAssets::default();
        let mut display = HeadlessDisplay::new(240, 240);
        let mut events = ScriptedEvents::new(keys);
        let option = ResumePrompt::new(&backend, &assets, 1000, StopToken::new())
            .run(&mut display, &mut events);
        let log = backend.log.borrow().clone();
        (option, log, display)
    }

    fn key(k: Key) -> Vec<InputEvent> {
        vec![InputEvent::KeyDown(k)]
    }

    #[test]
    fn options_wrap() {
        assert_eq!(ResumeOption::Resume.step(true), ResumeOption::Reset);
        assert_eq!(ResumeOption::Reset.step(true), ResumeOption::Resume);
        assert_eq!(ResumeOption::Resume.step(false), ResumeOption::Reset);
    }

    #[test]
    fn escape_is_ignored_and_two_accepts_choose() {
        let (option, log, display) = run(vec![
            key(Key::Escape),
            key(Key::Down),
            key(Key::Return),
            key(Key::Return),
        ]);
        assert_eq!(option, ResumeOption::Reset);
        assert_eq!(log, ["amp off", "amp on"]);
        assert!(display.presented() >= 1);
    }

    #[test]
    fn moving_drops_the_confirmation() {
        let (option, _, _) = run(vec![
            key(Key::Return),
            key(Key::Up),
            key(Key::Char('b')),
            key(Key::Return),
            key(Key::Return),
        ]);
        assert_eq!(option, ResumeOption::Reset);
    }

    #[test]
    fn stop_token_ends_the_prompt_with_current_option() {
        let backend = RecordingBackend::new();
        let assets = MenuAssets::default();
        let mut display = HeadlessDisplay::new(240, 240);
        let stop = StopToken::new();
        let mut events = ScriptedEvents::keys(&[Key::Down]).stop_when_done(stop.clone());

        let option = ResumePrompt::new(&backend, &assets, 1000, stop.clone())
            .run(&mut display, &mut events);
        assert_eq!(option, ResumeOption::Reset);
        assert!(stop.is_stop_requested());
        assert_eq!(*backend.log.borrow(), ["amp off", "amp on"]);
        assert_eq!(events.repeat_log.last(), Some(&KeyRepeat { delay_ms: 250, interval_ms: 40 }));
    }

    #[test]
    fn stop_requested_before_entry_returns_at_once() {
        let backend = RecordingBackend::new();
        let assets = MenuAssets::default();
        let mut display = HeadlessDisplay::new(240, 240);
        let stop = StopToken::new();
        stop.request_stop();
        let mut events = ScriptedEvents::new(Vec::new()).stop_when_done(stop.clone());

        let option = ResumePrompt::new(&backend, &assets, 1000, stop).run(&mut display, &mut events);
        assert_eq!(option, ResumeOption::Resume);
        assert_eq!(*backend.log.borrow(), ["amp off", "amp on"]);
    }

    #[test]
    fn window_close_exits() {
        let (_, log, _) = run(vec![vec![InputEvent::Quit]]);
        assert!(log.contains(&"exit 0".to_string()));
    }
}
