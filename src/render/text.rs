use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use rusttype::{point, Scale};

use super::{Color, Surface};

/// A TrueType face opened at a fixed pixel size.
pub struct Font {
    face: rusttype::Font<'static>,
    scale: Scale,
}

impl std::fmt::Debug for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Font").field("scale", &self.scale.y).finish()
    }
}

impl Font {
    pub fn load(path: &Path, size: u16) -> Result<Self> {
        let data = fs::read(path).with_context(|| format!("reading font {}", path.display()))?;
        Self::from_bytes(data, size).with_context(|| format!("parsing font {}", path.display()))
    }

    pub fn from_bytes(data: Vec<u8>, size: u16) -> Result<Self> {
        let face = rusttype::Font::try_from_vec(data)
            .ok_or_else(|| anyhow!("not a TrueType/OpenType font"))?;
        Ok(Self {
            face,
            scale: Scale::uniform(f32::from(size)),
        })
    }

    /// Line height in pixels.
    pub fn height(&self) -> u32 {
        let v = self.face.v_metrics(self.scale);
        (v.ascent - v.descent).ceil().max(0.0) as u32
    }

    /// Advance width of `text` in pixels.
    pub fn text_width(&self, text: &str) -> u32 {
        let ascent = self.face.v_metrics(self.scale).ascent;
        self.face
            .layout(text, self.scale, point(0.0, ascent))
            .last()
            .map(|g| {
                let end = g.position().x + g.unpositioned().h_metrics().advance_width;
                end.ceil().max(0.0) as u32
            })
            .unwrap_or(0)
    }

    /// Renders `text` anti-aliased onto a tightly sized transparent surface.
    pub fn render(&self, text: &str, color: Color) -> Surface {
        let ascent = self.face.v_metrics(self.scale).ascent;
        let mut out = Surface::new(self.text_width(text), self.height());
        for glyph in self.face.layout(text, self.scale, point(0.0, ascent)) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let px = bb.min.x + gx as i32;
                let py = bb.min.y + gy as i32;
                if px < 0 || py < 0 {
                    return;
                }
                let (px, py) = (px as u32, py as u32);
                if px >= out.width() || py >= out.height() {
                    return;
                }
                let alpha = (coverage.clamp(0.0, 1.0) * 255.0) as u8;
                // Overlapping glyph edges keep the stronger coverage.
                let alpha = alpha.max(out.pixel(px, py)[3]);
                let mut c = color;
                c[3] = alpha;
                out.put_pixel(px, py, c);
            });
        }
        out
    }
}
