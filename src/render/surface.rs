use std::path::Path;

use anyhow::{bail, Context, Result};
use image::{Rgba, RgbaImage};

pub type Color = Rgba<u8>;

pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
    Rgba([r, g, b, 255])
}

pub const TRANSPARENT: Color = Rgba([0, 0, 0, 0]);

/// Signed-origin rectangle. Origins may fall outside a surface; every
/// operation clips against the surface bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
}

/// Owned RGBA pixel buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    /// Fully transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, TRANSPARENT),
        }
    }

    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, color),
        }
    }

    pub fn from_image(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let img = image::open(path).with_context(|| format!("loading image {}", path.display()))?;
        Ok(Self::from_image(img.to_rgba8()))
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.pixels
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("writing {}", path.display()))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        *self.pixels.get_pixel(x, y)
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, color: Color) {
        if x < self.width() && y < self.height() {
            self.pixels.put_pixel(x, y, color);
        }
    }

    /// Overwrites a rectangle (or the whole surface) with `color`, no blending.
    pub fn fill_rect(&mut self, rect: Option<Rect>, color: Color) {
        let rect = rect.unwrap_or(Rect::new(0, 0, self.width(), self.height()));
        let Some((x0, y0, x1, y1)) = self.clip(rect) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                self.pixels.put_pixel(x, y, color);
            }
        }
    }

    /// Blends `src` (or the `src_rect` part of it) onto this surface with its
    /// top-left corner at `(x, y)`.
    ///
    /// Clipping follows the classic SDL rules: a source rectangle that
    /// starts above/left of the source moves the destination by the same
    /// amount, and the copied area is then clipped to both surfaces.
    pub fn blit(&mut self, src: &Surface, src_rect: Option<Rect>, x: i32, y: i32) {
        let (mut sx, mut sy, mut w, mut h) = match src_rect {
            Some(r) => (i64::from(r.x), i64::from(r.y), i64::from(r.w), i64::from(r.h)),
            None => (0, 0, i64::from(src.width()), i64::from(src.height())),
        };
        let (mut dx, mut dy) = (i64::from(x), i64::from(y));

        if sx < 0 {
            w += sx;
            dx -= sx;
            sx = 0;
        }
        w = w.min(i64::from(src.width()) - sx);
        if sy < 0 {
            h += sy;
            dy -= sy;
            sy = 0;
        }
        h = h.min(i64::from(src.height()) - sy);

        if dx < 0 {
            w += dx;
            sx -= dx;
            dx = 0;
        }
        w = w.min(i64::from(self.width()) - dx);
        if dy < 0 {
            h += dy;
            sy -= dy;
            dy = 0;
        }
        h = h.min(i64::from(self.height()) - dy);

        if w <= 0 || h <= 0 {
            return;
        }

        for row in 0..h {
            for col in 0..w {
                let s = src.pixel((sx + col) as u32, (sy + row) as u32);
                let (tx, ty) = ((dx + col) as u32, (dy + row) as u32);
                let d = self.pixel(tx, ty);
                self.pixels.put_pixel(tx, ty, blend_over(s, d));
            }
        }
    }

    /// Verbatim pixel copy; both surfaces must share dimensions.
    pub fn copy_from(&mut self, other: &Surface) -> Result<()> {
        if self.size() != other.size() {
            bail!(
                "surface size mismatch: {}x{} <- {}x{}",
                self.width(),
                self.height(),
                other.width(),
                other.height()
            );
        }
        self.pixels.copy_from_slice(other.pixels.as_raw());
        Ok(())
    }

    fn clip(&self, rect: Rect) -> Option<(u32, u32, u32, u32)> {
        let x0 = i64::from(rect.x).max(0);
        let y0 = i64::from(rect.y).max(0);
        let x1 = (i64::from(rect.x) + i64::from(rect.w)).min(i64::from(self.width()));
        let y1 = (i64::from(rect.y) + i64::from(rect.h)).min(i64::from(self.height()));
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }
}

fn blend_over(src: Color, dst: Color) -> Color {
    let sa = u32::from(src[3]);
    if sa == 255 {
        return src;
    }
    if sa == 0 {
        return dst;
    }
    let inv = 255 - sa;
    let mix = |s: u8, d: u8| ((u32::from(s) * sa + u32::from(d) * inv) / 255) as u8;
    let da = u32::from(dst[3]);
    Rgba([
        mix(src[0], dst[0]),
        mix(src[1], dst[1]),
        mix(src[2], dst[2]),
        (sa + da * inv / 255) as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = rgb(255, 0, 0);
    const BLUE: Color = rgb(0, 0, 255);

    #[test]
    fn fill_rect_clips_to_bounds() {
        let mut s = Surface::new(4, 4);
        s.fill_rect(Some(Rect::new(-2, 2, 10, 10)), RED);
        assert_eq!(s.pixel(0, 2), RED);
        assert_eq!(s.pixel(3, 3), RED);
        assert_eq!(s.pixel(0, 1), TRANSPARENT);
    }

    #[test]
    fn blit_with_positive_source_offset_shifts_content_up() {
        let mut src = Surface::filled(4, 4, BLUE);
        src.fill_rect(Some(Rect::new(0, 3, 4, 1)), RED);
        let mut dst = Surface::filled(4, 4, rgb(0, 0, 0));
        dst.blit(&src, Some(Rect::new(0, 2, 4, 4)), 0, 0);
        assert_eq!(dst.pixel(0, 0), BLUE);
        assert_eq!(dst.pixel(0, 1), RED);
        assert_eq!(dst.pixel(0, 2), rgb(0, 0, 0));
    }

    #[test]
    fn blit_with_negative_source_offset_moves_destination_down() {
        let src = Surface::filled(4, 4, BLUE);
        let mut dst = Surface::filled(4, 4, rgb(0, 0, 0));
        dst.blit(&src, Some(Rect::new(0, -3, 4, 4)), 0, 0);
        assert_eq!(dst.pixel(0, 2), rgb(0, 0, 0));
        assert_eq!(dst.pixel(0, 3), BLUE);
    }

    #[test]
    fn blit_blends_translucent_pixels() {
        let src = Surface::filled(1, 1, Rgba([255, 255, 255, 0]));
        let mut dst = Surface::filled(1, 1, RED);
        dst.blit(&src, None, 0, 0);
        assert_eq!(dst.pixel(0, 0), RED);

        let half = Surface::filled(1, 1, Rgba([0, 0, 255, 128]));
        dst.blit(&half, None, 0, 0);
        let p = dst.pixel(0, 0);
        assert_eq!(p[3], 255);
        assert!(p[0] > 100 && p[0] < 140);
        assert!(p[2] > 100 && p[2] < 140);
    }

    #[test]
    fn copy_from_rejects_mismatched_sizes() {
        let mut a = Surface::new(2, 2);
        assert!(a.copy_from(&Surface::new(3, 2)).is_err());
        a.copy_from(&Surface::filled(2, 2, RED)).unwrap();
        assert_eq!(a.pixel(1, 1), RED);
    }
}
