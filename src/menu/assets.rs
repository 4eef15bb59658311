use std::path::Path;

use tracing::error;

use crate::config::{AssetPaths, FontSpec};
use crate::render::text::Font;
use crate::render::{Rect, Surface, WHITE_MAIN};

use super::zone::{BG_SQUARE_HEIGHT, BG_SQUARE_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontRole {
    Title,
    Info,
    SmallInfo,
}

#[derive(Debug, Default)]
pub struct Fonts {
    title: Option<Font>,
    info: Option<Font>,
    small_info: Option<Font>,
}

impl Fonts {
    pub fn get(&self, role: FontRole) -> Option<&Font> {
        match role {
            FontRole::Title => self.title.as_ref(),
            FontRole::Info => self.info.as_ref(),
            FontRole::SmallInfo => self.small_info.as_ref(),
        }
    }
}

/// Fonts and images read at init. A resource that fails to load stays
/// `None` and the draws that need it are skipped.
#[derive(Debug, Default)]
pub struct MenuAssets {
    pub fonts: Fonts,
    pub background: Option<Surface>,
    pub arrow_top: Option<Surface>,
    pub arrow_bottom: Option<Surface>,
}

impl MenuAssets {
    pub fn load(paths: &AssetPaths) -> Self {
        Self {
            fonts: Fonts {
                title: load_font(&paths.title_font),
                info: load_font(&paths.info_font),
                small_info: load_font(&paths.small_info_font),
            },
            background: load_image(&paths.background),
            arrow_top: load_image(&paths.arrow_top),
            arrow_bottom: load_image(&paths.arrow_bottom),
        }
    }

    /// Names of the resources that failed to load.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        for (name, present) in [
            ("title font", self.fonts.title.is_some()),
            ("info font", self.fonts.info.is_some()),
            ("small info font", self.fonts.small_info.is_some()),
            ("background", self.background.is_some()),
            ("top arrow", self.arrow_top.is_some()),
            ("bottom arrow", self.arrow_bottom.is_some()),
        ] {
            if !present {
                out.push(name);
            }
        }
        out
    }

    /// Zone background template, or a generated stand-in when the image is
    /// missing: a light square on a transparent screen-sized canvas.
    pub fn background_or_placeholder(&self, width: u32, height: u32) -> Surface {
        if let Some(bg) = &self.background {
            return bg.clone();
        }
        let mut placeholder = Surface::new(width, height);
        let x = (width as i32 - BG_SQUARE_WIDTH as i32) / 2;
        let y = (height as i32 - BG_SQUARE_HEIGHT as i32) / 2;
        placeholder.fill_rect(
            Some(Rect::new(x, y, BG_SQUARE_WIDTH, BG_SQUARE_HEIGHT)),
            WHITE_MAIN,
        );
        placeholder
    }

    /// Drops every resource.
    pub fn release(&mut self) {
        *self = Self::default();
    }
}

fn load_font(spec: &FontSpec) -> Option<Font> {
    match Font::load(&spec.path, spec.size) {
        Ok(font) => Some(font),
        Err(e) => {
            error!("could not open menu font: {e:#}");
            None
        }
    }
}

fn load_image(path: &Path) -> Option<Surface> {
    match Surface::load(path) {
        Ok(img) => Some(img),
        Err(e) => {
            error!("could not load menu image: {e:#}");
            None
        }
    }
}
