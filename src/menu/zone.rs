use std::str::FromStr;

use anyhow::{anyhow, Error};
use tracing::debug;

use super::assets::{FontRole, Fonts};
use super::state::Settings;
use crate::platform::Level;
use crate::render::progress::draw_progress_bar;
use crate::render::text::Font;
use crate::render::{Color, Surface, GRAY_MAIN};

pub const TEXT_COLOR: Color = GRAY_MAIN;
/// Vertical distance between the zone centre and its title/info lines.
pub const PADDING_Y_FROM_CENTER: i32 = 18;
pub const PROGRESS_BAR_WIDTH: u16 = 100;
pub const PROGRESS_BAR_HEIGHT: u16 = 20;
/// Size of the light square in the zone background.
pub const BG_SQUARE_WIDTH: u32 = 180;
pub const BG_SQUARE_HEIGHT: u32 = 140;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum ZoneKind {
    Volume,
    Brightness,
    Save,
    Load,
    AspectRatio,
    Exit,
    Powerdown,
}

impl ZoneKind {
    pub const ALL: [ZoneKind; 7] = [
        ZoneKind::Volume,
        ZoneKind::Brightness,
        ZoneKind::Save,
        ZoneKind::Load,
        ZoneKind::AspectRatio,
        ZoneKind::Exit,
        ZoneKind::Powerdown,
    ];

    /// Name used in config files.
    pub fn key(self) -> &'static str {
        match self {
            ZoneKind::Volume => "volume",
            ZoneKind::Brightness => "brightness",
            ZoneKind::Save => "save",
            ZoneKind::Load => "load",
            ZoneKind::AspectRatio => "aspect_ratio",
            ZoneKind::Exit => "exit",
            ZoneKind::Powerdown => "powerdown",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ZoneKind::Volume => "VOLUME",
            ZoneKind::Brightness => "BRIGHTNESS",
            ZoneKind::Save => "SAVE",
            ZoneKind::Load => "LOAD",
            ZoneKind::AspectRatio => "ASPECT RATIO",
            ZoneKind::Exit => "EXIT GAME",
            ZoneKind::Powerdown => "POWERDOWN",
        }
    }

    /// Title offset from the zone centre; zones with two info lines push it higher.
    pub fn title_offset(self) -> i32 {
        match self {
            ZoneKind::Volume | ZoneKind::Brightness | ZoneKind::AspectRatio => {
                -PADDING_Y_FROM_CENTER
            }
            ZoneKind::Save | ZoneKind::Load => -2 * PADDING_Y_FROM_CENTER,
            ZoneKind::Exit | ZoneKind::Powerdown => 0,
        }
    }

    pub fn level(self) -> Option<Level> {
        match self {
            ZoneKind::Volume => Some(Level::Volume),
            ZoneKind::Brightness => Some(Level::Brightness),
            _ => None,
        }
    }

    /// Zones whose action needs a second Accept press.
    pub fn requires_confirmation(self) -> bool {
        matches!(
            self,
            ZoneKind::Save | ZoneKind::Load | ZoneKind::Exit | ZoneKind::Powerdown
        )
    }

    /// Text drawn over the zone when no transition is running.
    pub fn dynamic_lines(self, ctx: &ZoneContext<'_>) -> Vec<TextLine> {
        let pad = PADDING_Y_FROM_CENTER;
        let prompt = |ctx: &ZoneContext<'_>, busy: &str| {
            if ctx.action_in_progress {
                Some(busy.to_string())
            } else if ctx.confirmation {
                Some("Are you sure ?".to_string())
            } else {
                None
            }
        };

        match self {
            ZoneKind::Volume | ZoneKind::Brightness => Vec::new(),
            ZoneKind::Save => {
                let status = prompt(ctx, "Saving...").unwrap_or_else(|| "Free".to_string());
                vec![
                    TextLine::info(format!("IN SLOT   < {} >", ctx.save_slot + 1), 0),
                    TextLine::info(status, 2 * pad),
                ]
            }
            ZoneKind::Load => {
                let slot = if ctx.quick_load_slot {
                    "FROM AUTO SAVE".to_string()
                } else {
                    format!("FROM SLOT   < {} >", ctx.save_slot + 1)
                };
                let mut lines = vec![TextLine::info(slot, 0)];
                match prompt(ctx, "Loading...") {
                    Some(status) => lines.push(TextLine::info(status, 2 * pad)),
                    None if ctx.quick_load_slot => {}
                    None => lines.push(TextLine::info("Free".to_string(), 2 * pad)),
                }
                lines
            }
            ZoneKind::AspectRatio => vec![TextLine::info(
                format!("<   {}   >", ctx.settings.aspect_ratio.name()),
                pad,
            )],
            ZoneKind::Exit | ZoneKind::Powerdown => {
                if ctx.confirmation {
                    vec![TextLine::info("Are you sure ?".to_string(), 2 * pad)]
                } else {
                    Vec::new()
                }
            }
        }
    }
}

impl FromStr for ZoneKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|k| k.key() == wanted)
            .ok_or_else(|| anyhow!("unknown menu zone '{s}'"))
    }
}

/// What the per-frame content of a zone depends on.
#[derive(Debug, Clone, Copy)]
pub struct ZoneContext<'a> {
    pub settings: &'a Settings,
    pub confirmation: bool,
    pub action_in_progress: bool,
    pub save_slot: u8,
    pub quick_load_slot: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    pub text: String,
    pub font: FontRole,
    /// Offset of the line centre from the zone centre.
    pub offset_y: i32,
}

impl TextLine {
    fn info(text: String, offset_y: i32) -> Self {
        Self {
            text,
            font: FontRole::Info,
            offset_y,
        }
    }
}

/// Horizontal position centring an item of `item_w` inside a zone of
/// `zone_w` on a surface of `surface_w`.
pub fn centered_x(surface_w: u32, zone_w: u32, item_w: u32) -> i32 {
    (surface_w as i32 - zone_w as i32) / 2 + (zone_w as i32 - item_w as i32) / 2
}

/// Vertical position of an item of `item_h` whose centre sits `offset`
/// pixels below the zone centre.
pub fn centered_y(surface_h: u32, zone_h: u32, item_h: u32, offset: i32) -> i32 {
    surface_h as i32 - zone_h as i32 / 2 - item_h as i32 / 2 + offset
}

pub(super) fn draw_centered_text(
    target: &mut Surface,
    font: &Font,
    text: &str,
    zone: (u32, u32),
    offset_y: i32,
) {
    let rendered = font.render(text, TEXT_COLOR);
    let x = centered_x(target.width(), zone.0, rendered.width());
    let y = centered_y(target.height(), zone.1, rendered.height(), offset_y);
    target.blit(&rendered, None, x, y);
}

/// Draws the navigation arrows above and below the background square.
pub(super) fn draw_arrows(target: &mut Surface, top: Option<&Surface>, bottom: Option<&Surface>) {
    let (w, h) = (target.width() as i32, target.height() as i32);
    let margin = (h - BG_SQUARE_HEIGHT as i32) / 4;
    if let Some(arrow) = top {
        let x = (w - arrow.width() as i32) / 2;
        target.blit(arrow, None, x, margin - arrow.height() as i32 / 2);
    }
    if let Some(arrow) = bottom {
        let x = (w - arrow.width() as i32) / 2;
        target.blit(arrow, None, x, h - margin - arrow.height() as i32 / 2);
    }
}

/// One page of the overlay with its pre-rendered background.
#[derive(Debug, Clone)]
pub struct MenuZone {
    kind: ZoneKind,
    background: Surface,
    bar_origin: Option<(u16, u16)>,
}

impl MenuZone {
    /// Copies `template` and bakes the static title (and an empty progress
    /// bar for level zones) into it.
    pub fn build(kind: ZoneKind, template: &Surface, title_font: Option<&Font>, zone: (u32, u32)) -> Self {
        debug!(zone = kind.key(), "init menu zone");
        let mut background = template.clone();

        match title_font {
            Some(font) => {
                draw_centered_text(&mut background, font, kind.title(), zone, kind.title_offset())
            }
            None => debug!(zone = kind.key(), "no title font, skipping title"),
        }

        let bar_origin = kind.level().map(|level| {
            let x = centered_x(background.width(), zone.0, u32::from(PROGRESS_BAR_WIDTH));
            let y = centered_y(
                background.height(),
                zone.1,
                u32::from(PROGRESS_BAR_HEIGHT),
                PADDING_Y_FROM_CENTER,
            );
            let origin = (x.max(0) as u16, y.max(0) as u16);
            draw_progress_bar(
                &mut background,
                origin.0,
                origin.1,
                PROGRESS_BAR_WIDTH,
                PROGRESS_BAR_HEIGHT,
                0,
                bar_count(level),
            );
            origin
        });

        Self {
            kind,
            background,
            bar_origin,
        }
    }

    pub fn kind(&self) -> ZoneKind {
        self.kind
    }

    pub fn background(&self) -> &Surface {
        &self.background
    }

    pub fn bar_origin(&self) -> Option<(u16, u16)> {
        self.bar_origin
    }

    /// Draws the live part of the zone (bar value, slot/confirmation text,
    /// aspect ratio label) onto `target`.
    pub fn render_dynamic(
        &self,
        target: &mut Surface,
        fonts: &Fonts,
        ctx: &ZoneContext<'_>,
        zone: (u32, u32),
    ) {
        if let (Some(level), Some((x, y))) = (self.kind.level(), self.bar_origin) {
            draw_progress_bar(
                target,
                x,
                y,
                PROGRESS_BAR_WIDTH,
                PROGRESS_BAR_HEIGHT,
                ctx.settings.level(level),
                bar_count(level),
            );
        }

        for line in self.kind.dynamic_lines(ctx) {
            match fonts.get(line.font) {
                Some(font) => draw_centered_text(target, font, &line.text, zone, line.offset_y),
                None => debug!(text = %line.text, "font missing, skipping line"),
            }
        }
    }
}

/// One bar per adjustment step.
fn bar_count(level: Level) -> u16 {
    u16::from(100 / Settings::step(level))
}
