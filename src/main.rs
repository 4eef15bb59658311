use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use funkey_menu::config::{self, Config};
use funkey_menu::display::{EventSource, HeadlessDisplay, InputEvent, Key};
use funkey_menu::menu::assets::MenuAssets;
use funkey_menu::menu::{MenuController, MenuOutcome, ZoneKind};
use funkey_menu::platform::{self, terminal, Backend, DoctorReport, Keymap, Level};
use funkey_menu::render::{rgb, Rect, Surface};
use funkey_menu::signal::{self, StopToken};

const SCREEN_WIDTH: u32 = 240;
const SCREEN_HEIGHT: u32 = 240;

#[derive(Parser, Debug)]
#[command(name = "funkey-menu", version, about = "In-game pause menu for FunKey-style handhelds")]
struct Cli {
    /// Append logs to this file instead of stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Runs a stand-in game in the terminal; q or Esc opens the menu.
    Run {
        /// Screen pixels per terminal cell.
        #[arg(long, default_value_t = 2)]
        scale: u32,
        /// Ask "RESUME GAME" / "RESET GAME" before starting, as after a quick save.
        #[arg(long)]
        resume_prompt: bool,
    },
    /// Renders one menu zone over a stand-in game frame and writes a PNG.
    Render {
        #[arg(long, value_enum)]
        zone: ZoneKind,
        /// Draw the "Are you sure ?" state.
        #[arg(long)]
        confirm: bool,
        #[arg(long, default_value = "menu.png")]
        out: PathBuf,
    },
    /// Checks menu resources and the system commands.
    Doctor,
    /// Prints the config path that would be used (if any).
    ConfigPath,
    /// Writes a default config file if none exists and prints its path.
    InitConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    match cli.command {
        Command::Run {
            scale,
            resume_prompt,
        } => run_host(&load_config()?, scale, resume_prompt)?,
        Command::Render { zone, confirm, out } => {
            let cfg = load_config()?;
            let mut display = HeadlessDisplay::new(SCREEN_WIDTH, SCREEN_HEIGHT);
            draw_game_frame(display.screen_mut());

            let backend = platform::backend(&cfg)?;
            let mut menu = MenuController::init(&cfg, &display, backend, StopToken::new());
            let index = match menu.zone_index(zone) {
                Some(i) => i,
                None => {
                    menu.add_zone(zone);
                    menu.zones().len() - 1
                }
            };
            menu.preview(&mut display, index, confirm);
            menu.teardown();

            display
                .screen()
                .save_png(&out)
                .with_context(|| format!("write {}", out.display()))?;
            println!("{}", out.display());
        }
        Command::Doctor => {
            let cfg = load_config()?;
            let assets = MenuAssets::load(&cfg.assets);
            for name in assets.missing() {
                println!("missing resource: {name}");
            }
            let backend = platform::backend(&cfg)?;
            let notes = backend.doctor().context("doctor")?;
            if !notes.ok {
                bail!(notes.message);
            }
            println!("{}", notes.message);
        }
        Command::ConfigPath => {
            if let Some(path) = config::resolve_config_path() {
                println!("{}", path.display());
            }
        }
        Command::InitConfig => {
            let path = config::ensure_config_file_exists()?;
            println!("{}", path.display());
        }
    }

    Ok(())
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("funkey_menu=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn load_config() -> Result<Config> {
    let cfg = config::load_optional()?.unwrap_or_default();
    cfg.validate()?;
    Ok(cfg)
}

/// What the game would be showing: a green square on black.
fn draw_game_frame(screen: &mut Surface) {
    screen.fill_rect(None, rgb(0, 0, 0));
    screen.fill_rect(Some(Rect::new(70, 70, 100, 100)), rgb(0, 160, 0));
}

fn run_host(cfg: &Config, scale: u32, resume_prompt: bool) -> Result<()> {
    let stop = StopToken::new();
    signal::install_sigusr1(&stop)?;

    let backend = HostBackend(platform::backend(cfg)?);
    let mut display = terminal::TerminalDisplay::open(SCREEN_WIDTH, SCREEN_HEIGHT, scale)?;
    let mut events = terminal::TerminalEvents::new();
    let mut menu = MenuController::init(cfg, &display, Box::new(backend), stop);

    if resume_prompt {
        let choice = menu.resume_prompt().run(&mut display, &mut events);
        info!(option = choice.label(), "resume prompt answered");
    }

    draw_game_frame(display.screen_mut());
    display.flush()?;
    info!("game running, q or Esc opens the menu, Ctrl-C quits");

    loop {
        if signal::quick_save_requested() {
            info!("quick save requested, leaving");
            break;
        }
        match events.poll_event()? {
            Some(InputEvent::Quit) => break,
            Some(InputEvent::KeyDown(Key::Escape | Key::Char('q'))) => {
                match menu.run(&mut display, &mut events) {
                    MenuOutcome::Closed => {}
                    MenuOutcome::SaveRequested { slot } => info!(slot, "save state requested"),
                    MenuOutcome::LoadRequested { slot } => info!(?slot, "load state requested"),
                    MenuOutcome::Exited | MenuOutcome::Quit | MenuOutcome::PowerdownFailed => break,
                }
                draw_game_frame(display.screen_mut());
                display.flush()?;
            }
            Some(_) => {}
            None => thread::sleep(Duration::from_millis(20)),
        }
    }

    menu.teardown();
    Ok(())
}

/// Puts the terminal back before anything that ends the process without
/// unwinding.
struct HostBackend(Box<dyn Backend>);

impl Backend for HostBackend {
    fn read_level(&self, level: Level) -> Result<u8> {
        self.0.read_level(level)
    }

    fn apply_level(&self, level: Level, value: u8) -> Result<()> {
        self.0.apply_level(level, value)
    }

    fn notify(&self, seconds: u32, message: &str) -> Result<()> {
        self.0.notify(seconds, message)
    }

    fn set_audio_amp(&self, enabled: bool) -> Result<()> {
        self.0.set_audio_amp(enabled)
    }

    fn load_keymap(&self, keymap: Keymap) -> Result<()> {
        self.0.load_keymap(keymap)
    }

    fn powerdown(&self) -> Result<()> {
        terminal::restore_terminal();
        self.0.powerdown()
    }

    fn exit_process(&self, code: i32) {
        terminal::restore_terminal();
        self.0.exit_process(code)
    }

    fn doctor(&self) -> Result<DoctorReport> {
        self.0.doctor()
    }
}
