//! The in-game overlay: owns the zones and the session state, renders
//! frames onto the host display and runs the blocking interaction loop.
//!
//! Host contract: build the controller once with [`MenuController::init`]
//! after the display exists, call [`MenuController::run`] whenever the menu
//! key is pressed, and [`MenuController::teardown`] before exiting.

use tracing::{debug, error, info, warn};

use super::assets::{FontRole, MenuAssets};
use super::commands::{decode, MenuCommand};
use super::resume::ResumePrompt;
use super::state::{Navigator, Settings, DEFAULT_PERCENTAGE};
use super::zone::{draw_arrows, MenuZone, ZoneContext, ZoneKind};
use crate::config::{Config, Timing};
use crate::display::{Display, EventSource, KeyRepeat};
use crate::frame::FrameLimiter;
use crate::platform::{Backend, Keymap, Level};
use crate::render::{Rect, Surface};
use crate::signal::StopToken;

/// How an overlay session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOutcome {
    /// Back to the game with nothing else to do.
    Closed,
    /// The host should write a save state into `slot`.
    SaveRequested { slot: u8 },
    /// The host should load `slot`, or the auto save when `None`.
    LoadRequested { slot: Option<u8> },
    /// Exit confirmed; the process has been asked to exit.
    Exited,
    /// Window closed; the process has been asked to exit.
    Quit,
    /// Powerdown could not be started; the process has been asked to exit.
    PowerdownFailed,
}

pub struct MenuController {
    backend: Box<dyn Backend>,
    assets: MenuAssets,
    zones: Vec<MenuZone>,
    width: u32,
    height: u32,
    backup: Surface,
    draw: Surface,
    settings: Settings,
    nav: Navigator,
    stop: StopToken,
    timing: Timing,
    save_slot: u8,
    quick_load_slot: bool,
    saved_key_repeat: Option<KeyRepeat>,
}

impl MenuController {
    /// Loads the assets, allocates the off-screen surfaces at the display
    /// size and builds the configured zones in order.
    pub fn init(
        config: &Config,
        display: &dyn Display,
        backend: Box<dyn Backend>,
        stop: StopToken,
    ) -> Self {
        info!("init menu");
        let assets = MenuAssets::load(&config.assets);
        let missing = assets.missing();
        if !missing.is_empty() {
            warn!(?missing, "menu resources missing, affected draws will be skipped");
        }

        let (width, height) = display.size();
        let mut controller = Self {
            backend,
            assets,
            zones: Vec::new(),
            width,
            height,
            backup: Surface::new(width, height),
            draw: Surface::new(width, height),
            settings: Settings::default(),
            nav: Navigator::new(0),
            stop,
            timing: config.timing.clone(),
            save_slot: 0,
            quick_load_slot: false,
            saved_key_repeat: None,
        };
        for kind in config.zone_kinds() {
            controller.add_zone(kind);
        }
        controller
    }

    /// Appends a zone built from the background template.
    pub fn add_zone(&mut self, kind: ZoneKind) {
        let template = self.assets.background_or_placeholder(self.width, self.height);
        let title = self.assets.fonts.get(FontRole::Title);
        self.zones
            .push(MenuZone::build(kind, &template, title, (self.width, self.height)));

        let selected = self.nav.current();
        self.nav = Navigator::new(self.zones.len());
        self.nav.select(selected);
    }

    /// Releases every resource. Safe to call more than once.
    pub fn teardown(&mut self) {
        debug!("deinit menu");
        self.assets.release();
        self.zones.clear();
        self.backup = Surface::new(0, 0);
        self.draw = Surface::new(0, 0);
        self.nav = Navigator::new(0);
    }

    pub fn zones(&self) -> &[MenuZone] {
        &self.zones
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    pub fn select_zone(&mut self, index: usize) {
        self.nav.select(index);
    }

    /// Index of the first zone of `kind`.
    pub fn zone_index(&self, kind: ZoneKind) -> Option<usize> {
        self.zones.iter().position(|z| z.kind() == kind)
    }

    pub fn resume_prompt(&self) -> ResumePrompt<'_> {
        ResumePrompt::new(
            self.backend.as_ref(),
            &self.assets,
            self.timing.fps,
            self.stop.clone(),
        )
    }

    /// Reads volume and brightness from the system, falling back to 50%.
    pub fn read_levels(&mut self) {
        for level in [Level::Volume, Level::Brightness] {
            let value = match self.backend.read_level(level) {
                Ok(v) => v,
                Err(e) => {
                    error!(
                        "could not read {}, using {DEFAULT_PERCENTAGE}%: {e:#}",
                        level.name()
                    );
                    DEFAULT_PERCENTAGE
                }
            };
            debug!(level = level.name(), value, "session value");
            self.settings.set_level(level, value);
        }
    }

    /// Refreshes the adjustable values and switches the host to the
    /// default key repeat, remembering the previous timing.
    pub fn load_session_values(&mut self, events: &mut dyn EventSource) {
        self.read_levels();
        self.saved_key_repeat = Some(events.key_repeat());
        if let Err(e) = events.set_key_repeat(KeyRepeat::DEFAULT) {
            error!("could not set key repeat: {e:#}");
        }
    }

    /// Keeps a copy of what the game is showing; every frame starts from it.
    pub fn snapshot_screen(&mut self, display: &dyn Display) {
        let copied = display
            .capture()
            .and_then(|screen| self.backup.copy_from(&screen));
        if let Err(e) = copied {
            error!("could not copy screen: {e:#}");
        }
    }

    /// Composes one frame into the draw surface and presents it.
    pub fn refresh_screen(&mut self, display: &mut dyn Display, action_in_progress: bool) {
        if self.zones.is_empty() {
            return;
        }
        if let Err(e) = self.draw.copy_from(&self.backup) {
            error!("could not restore screen: {e:#}");
        }

        let (w, h) = (self.width, self.height);
        let scroll = self.nav.scroll();
        let previous = &self.zones[self.nav.previous()];
        let current = &self.zones[self.nav.current()];

        self.draw
            .blit(previous.background(), Some(Rect::new(0, scroll, w, h)), 0, 0);
        if scroll > 0 {
            self.draw
                .blit(current.background(), Some(Rect::new(0, 0, w, h)), 0, h as i32 - scroll);
        } else if scroll < 0 {
            self.draw
                .blit(current.background(), Some(Rect::new(0, h as i32 + scroll, w, h)), 0, 0);
        } else {
            let ctx = ZoneContext {
                settings: &self.settings,
                confirmation: self.nav.confirmation(),
                action_in_progress,
                save_slot: self.save_slot,
                quick_load_slot: self.quick_load_slot,
            };
            current.render_dynamic(&mut self.draw, &self.assets.fonts, &ctx, (w, h));
            draw_arrows(
                &mut self.draw,
                self.assets.arrow_top.as_ref(),
                self.assets.arrow_bottom.as_ref(),
            );
        }

        if let Err(e) = display.present(&self.draw) {
            error!("could not present menu frame: {e:#}");
        }
    }

    /// Renders the selected zone once without entering the loop.
    pub fn preview(&mut self, display: &mut dyn Display, index: usize, confirmation: bool) {
        self.read_levels();
        self.nav.select(index);
        self.nav.begin_session();
        if confirmation {
            self.nav.arm_confirmation();
        }
        self.snapshot_screen(display);
        self.refresh_screen(display, false);
    }

    /// Blocks until the overlay is closed, a confirmed action ends it or the
    /// stop token fires.
    pub fn run(&mut self, display: &mut dyn Display, events: &mut dyn EventSource) -> MenuOutcome {
        if self.zones.is_empty() {
            warn!("no menu zones, nothing to show");
            return MenuOutcome::Closed;
        }
        info!("entering menu");
        self.stop.reset();
        self.nav.begin_session();

        self.set_keymap(Keymap::Default);
        self.load_session_values(events);
        self.snapshot_screen(display);
        self.set_amp(false);

        let mut limiter = FrameLimiter::new(self.timing.fps);
        let mut refresh = true;
        let mut outcome = MenuOutcome::Closed;

        while !self.stop.is_stop_requested() {
            if self.nav.is_idle() {
                loop {
                    let event = match events.poll_event() {
                        Ok(Some(event)) => event,
                        Ok(None) => break,
                        Err(e) => {
                            error!("could not read input: {e:#}");
                            break;
                        }
                    };
                    let Some(cmd) = decode(&event) else {
                        continue;
                    };
                    if let Some(done) = self.handle_command(cmd, display, &mut refresh) {
                        outcome = done;
                        self.stop.request_stop();
                        break;
                    }
                }
                if self.stop.is_stop_requested() {
                    break;
                }
            }

            if self
                .nav
                .advance_scroll(self.height, self.timing.scroll_speed_px)
            {
                refresh = true;
            }

            limiter.wait();

            if refresh {
                self.refresh_screen(display, false);
                refresh = false;
            }
        }

        self.set_keymap(Keymap::Resume);
        if let Some(repeat) = self.saved_key_repeat.take() {
            if let Err(e) = events.set_key_repeat(repeat) {
                error!("could not restore key repeat: {e:#}");
            }
        }
        self.set_amp(true);
        info!(?outcome, "leaving menu");
        outcome
    }

    fn handle_command(
        &mut self,
        cmd: MenuCommand,
        display: &mut dyn Display,
        refresh: &mut bool,
    ) -> Option<MenuOutcome> {
        let kind = self.zones[self.nav.current()].kind();
        match cmd {
            MenuCommand::Quit => {
                self.backend.exit_process(0);
                return Some(MenuOutcome::Quit);
            }
            MenuCommand::Close => return Some(MenuOutcome::Closed),
            MenuCommand::Back => {
                if self.nav.clear_confirmation() {
                    *refresh = true;
                }
            }
            MenuCommand::Down => {
                debug!("DOWN");
                self.nav.move_down();
                *refresh = true;
            }
            MenuCommand::Up => {
                debug!("UP");
                self.nav.move_up();
                *refresh = true;
            }
            MenuCommand::Left | MenuCommand::Right => {
                let up = cmd == MenuCommand::Right;
                self.adjust(kind, up);
                *refresh = true;
            }
            MenuCommand::Accept => {
                if !kind.requires_confirmation() {
                    return None;
                }
                if !self.nav.confirmation() {
                    debug!(zone = kind.key(), "asking confirmation");
                    self.nav.arm_confirmation();
                    *refresh = true;
                    return None;
                }
                return Some(self.perform(kind, display));
            }
        }
        None
    }

    /// Left/Right on the current zone.
    fn adjust(&mut self, kind: ZoneKind, up: bool) {
        if let Some(level) = kind.level() {
            let value = if up {
                self.settings.increase(level)
            } else {
                self.settings.decrease(level)
            };
            debug!("{} {}", level.name(), if up { "UP" } else { "DOWN" });
            if let Err(e) = self.backend.apply_level(level, value) {
                error!("could not apply {} {value}: {e:#}", level.name());
            }
            return;
        }
        match kind {
            ZoneKind::AspectRatio => {
                let ratio = self.settings.aspect_ratio;
                self.settings.aspect_ratio = if up { ratio.next() } else { ratio.prev() };
                debug!(aspect_ratio = self.settings.aspect_ratio.name(), "aspect ratio");
            }
            // Slot selection is fixed.
            ZoneKind::Save | ZoneKind::Load => debug!(zone = kind.key(), "slot unchanged"),
            _ => {}
        }
    }

    /// Second Accept on a zone that asked for confirmation.
    fn perform(&mut self, kind: ZoneKind, display: &mut dyn Display) -> MenuOutcome {
        info!(zone = kind.key(), "confirmed");
        match kind {
            ZoneKind::Save => {
                self.refresh_screen(display, true);
                self.notify(&format!("SAVED IN SLOT {}", self.save_slot + 1));
                MenuOutcome::SaveRequested {
                    slot: self.save_slot,
                }
            }
            ZoneKind::Load => {
                self.refresh_screen(display, true);
                if self.quick_load_slot {
                    self.notify("LOADED FROM AUTO SAVE");
                    MenuOutcome::LoadRequested { slot: None }
                } else {
                    self.notify(&format!("LOADED FROM SLOT {}", self.save_slot + 1));
                    MenuOutcome::LoadRequested {
                        slot: Some(self.save_slot),
                    }
                }
            }
            ZoneKind::Powerdown => {
                if let Err(e) = self.backend.powerdown() {
                    error!("failed to run powerdown: {e:#}");
                }
                self.backend.exit_process(0);
                MenuOutcome::PowerdownFailed
            }
            _ => {
                self.backend.exit_process(0);
                MenuOutcome::Exited
            }
        }
    }

    fn notify(&self, message: &str) {
        if let Err(e) = self
            .backend
            .notify(self.timing.notification_seconds, message)
        {
            error!("could not send notification: {e:#}");
        }
    }

    fn set_amp(&self, enabled: bool) {
        if let Err(e) = self.backend.set_audio_amp(enabled) {
            error!("could not switch audio amp: {e:#}");
        }
    }

    fn set_keymap(&self, keymap: Keymap) {
        if let Err(e) = self.backend.load_keymap(keymap) {
            error!(?keymap, "could not load keymap: {e:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{HeadlessDisplay, InputEvent, Key};
    use crate::render::rgb;
    use crate::testing::{test_config, CallLog, RecordingBackend, ScriptedEvents};

    fn controller_with(backend: RecordingBackend) -> (MenuController, HeadlessDisplay, CallLog) {
        let log = backend.log.clone();
        let display = HeadlessDisplay::new(240, 240);
        let menu = MenuController::init(&test_config(), &display, Box::new(backend), StopToken::new());
        (menu, display, log)
    }

    fn controller() -> (MenuController, HeadlessDisplay, CallLog) {
        controller_with(RecordingBackend::new())
    }

    fn calls(log: &CallLog, prefix: &str) -> Vec<String> {
        log.borrow()
            .iter()
            .filter(|l| l.starts_with(prefix))
            .cloned()
            .collect()
    }

    #[test]
    fn init_builds_default_zones_in_order() {
        let (menu, _, _) = controller();
        let kinds: Vec<_> = menu.zones().iter().map(MenuZone::kind).collect();
        assert_eq!(
            kinds,
            [
                ZoneKind::Volume,
                ZoneKind::Brightness,
                ZoneKind::Save,
                ZoneKind::Load,
                ZoneKind::AspectRatio,
                ZoneKind::Exit,
            ]
        );
        assert_eq!(menu.navigator().zone_count(), 6);
    }

    #[test]
    fn volume_left_three_times() {
        let (mut menu, mut display, log) = controller();
        let mut events = ScriptedEvents::keys(&[Key::Left, Key::Left, Key::Left]);
        let outcome = menu.run(&mut display, &mut events);

        assert_eq!(outcome, MenuOutcome::Closed);
        assert_eq!(menu.settings().level(Level::Volume), 20);
        assert_eq!(
            calls(&log, "set volume"),
            ["set volume 40", "set volume 30", "set volume 20"]
        );
    }

    #[test]
    fn six_downs_wrap_to_the_first_zone() {
        let (mut menu, mut display, _) = controller();
        let mut events = ScriptedEvents::keys(&[Key::Down; 6]);
        menu.run(&mut display, &mut events);

        assert!(events.is_drained());
        assert_eq!(menu.navigator().current(), 0);
        assert_eq!(menu.navigator().previous(), 0);
        assert!(menu.navigator().is_idle());
    }

    #[test]
    fn up_from_first_zone_wraps_to_last() {
        let (mut menu, mut display, _) = controller();
        let mut events = ScriptedEvents::keys(&[Key::Char('u')]);
        menu.run(&mut display, &mut events);
        assert_eq!(menu.navigator().current(), 5);
    }

    #[test]
    fn exit_needs_two_accepts() {
        let (mut menu, mut display, log) = controller();
        let exit = menu.zone_index(ZoneKind::Exit).unwrap();
        menu.select_zone(exit);

        let mut events = ScriptedEvents::keys(&[Key::Return]);
        assert_eq!(menu.run(&mut display, &mut events), MenuOutcome::Closed);
        assert!(calls(&log, "exit").is_empty());

        let mut events = ScriptedEvents::keys(&[Key::Return, Key::Return]);
        assert_eq!(menu.run(&mut display, &mut events), MenuOutcome::Exited);
        assert_eq!(calls(&log, "exit"), ["exit 0"]);
    }

    #[test]
    fn back_between_accepts_cancels_the_action() {
        let (mut menu, mut display, log) = controller();
        menu.select_zone(menu.zone_index(ZoneKind::Save).unwrap());

        let mut events = ScriptedEvents::keys(&[Key::Char('a'), Key::Char('b'), Key::Char('a')]);
        assert_eq!(menu.run(&mut display, &mut events), MenuOutcome::Closed);
        assert!(calls(&log, "notif").is_empty());
        assert!(menu.navigator().confirmation());
    }

    #[test]
    fn confirmed_save_notifies_and_reports_slot() {
        let (mut menu, mut display, log) = controller();
        menu.select_zone(menu.zone_index(ZoneKind::Save).unwrap());

        let mut events = ScriptedEvents::keys(&[Key::Return, Key::Return]);
        let outcome = menu.run(&mut display, &mut events);
        assert_eq!(outcome, MenuOutcome::SaveRequested { slot: 0 });
        assert_eq!(calls(&log, "notif"), ["notif 2 SAVED IN SLOT 1"]);
    }

    #[test]
    fn confirmed_load_notifies() {
        let (mut menu, mut display, log) = controller();
        menu.select_zone(menu.zone_index(ZoneKind::Load).unwrap());

        let mut events = ScriptedEvents::new(vec![vec![
            InputEvent::KeyDown(Key::Return),
            InputEvent::KeyDown(Key::Return),
        ]]);
        let outcome = menu.run(&mut display, &mut events);
        assert_eq!(outcome, MenuOutcome::LoadRequested { slot: Some(0) });
        assert_eq!(calls(&log, "notif"), ["notif 2 LOADED FROM SLOT 1"]);
    }

    #[test]
    fn failed_powerdown_exits() {
        let mut backend = RecordingBackend::new();
        backend.volume = Some(70);
        let (mut menu, mut display, log) = controller_with(backend);
        menu.add_zone(ZoneKind::Powerdown);
        menu.select_zone(menu.zone_index(ZoneKind::Powerdown).unwrap());

        let mut events = ScriptedEvents::keys(&[Key::Return, Key::Return]);
        assert_eq!(menu.run(&mut display, &mut events), MenuOutcome::PowerdownFailed);
        let log = log.borrow();
        let at = log.iter().position(|l| l == "powerdown").unwrap();
        assert_eq!(log[at + 1], "exit 0");
    }

    #[test]
    fn quit_event_exits_the_process() {
        let (mut menu, mut display, log) = controller();
        let mut events = ScriptedEvents::new(vec![vec![InputEvent::Quit]]);
        assert_eq!(menu.run(&mut display, &mut events), MenuOutcome::Quit);
        assert_eq!(calls(&log, "exit"), ["exit 0"]);
    }

    #[test]
    fn unreadable_levels_fall_back_to_half() {
        let mut backend = RecordingBackend::new();
        backend.volume = None;
        backend.brightness = Some(80);
        let (mut menu, mut display, _) = controller_with(backend);
        menu.run(&mut display, &mut ScriptedEvents::keys(&[]));
        assert_eq!(menu.settings().level(Level::Volume), 50);
        assert_eq!(menu.settings().level(Level::Brightness), 80);
    }

    #[test]
    fn session_restores_host_state() {
        let (mut menu, mut display, log) = controller();
        let mut events = ScriptedEvents::keys(&[Key::Right]);
        menu.run(&mut display, &mut events);

        let log = log.borrow();
        let pos = |line: &str| log.iter().position(|l| l == line).unwrap();
        assert!(pos("keymap default") < pos("read volume"));
        assert!(pos("read brightness") < pos("amp off"));
        assert!(pos("amp off") < pos("set volume 60"));
        assert!(pos("set volume 60") < pos("keymap resume"));
        assert!(pos("keymap resume") < pos("amp on"));

        let original = KeyRepeat {
            delay_ms: 250,
            interval_ms: 40,
        };
        assert_eq!(events.repeat_log, [KeyRepeat::DEFAULT, original]);
    }

    #[test]
    fn stop_token_ends_the_loop() {
        let stop = StopToken::new();
        let backend = RecordingBackend::new();
        let log = backend.log.clone();
        let mut display = HeadlessDisplay::new(240, 240);
        let mut menu = MenuController::init(&test_config(), &display, Box::new(backend), stop.clone());

        let mut events = ScriptedEvents::keys(&[Key::Down]).stop_when_done(stop.clone());
        assert_eq!(menu.run(&mut display, &mut events), MenuOutcome::Closed);
        assert!(stop.is_stop_requested());
        assert_eq!(log.borrow().last().map(String::as_str), Some("amp on"));
    }

    #[test]
    fn frames_keep_the_game_outside_the_square() {
        let (mut menu, _, _) = controller();
        let game = rgb(0, 200, 0);
        let mut display = HeadlessDisplay::with_screen(Surface::filled(240, 240, game));
        menu.preview(&mut display, 0, false);

        assert_eq!(display.presented(), 1);
        assert_eq!(display.screen().pixel(5, 5), game);
        // Placeholder square and the empty volume bar drawn at 50%.
        assert_eq!(display.screen().pixel(31, 51), crate::render::WHITE_MAIN);
        assert_eq!(display.screen().pixel(70, 128), crate::render::GRAY_MAIN);
    }

    #[test]
    fn mid_scroll_frames_show_both_zones() {
        let (mut menu, mut display, _) = controller();
        menu.snapshot_screen(&display);
        menu.nav.move_down();
        menu.nav.advance_scroll(240, 30);
        menu.refresh_screen(&mut display, false);

        // Outgoing Volume zone shifted up by 30px.
        assert_eq!(display.screen().pixel(70, 98), crate::render::GRAY_MAIN);
        assert_eq!(display.screen().pixel(70, 128), crate::render::WHITE_MAIN);
    }

    #[test]
    fn teardown_is_repeatable() {
        let (mut menu, mut display, _) = controller();
        menu.teardown();
        menu.teardown();
        assert!(menu.zones().is_empty());
        assert_eq!(
            menu.run(&mut display, &mut ScriptedEvents::keys(&[])),
            MenuOutcome::Closed
        );
    }
}
