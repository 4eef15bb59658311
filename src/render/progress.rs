use super::{Rect, Surface, GRAY_MAIN, WHITE_MAIN};

/// Outline thickness of an empty bar, in pixels.
pub const LINE_WIDTH: u16 = 1;
/// Bar width is `PADDING_BARS_RATIO` times the gap between two bars.
pub const PADDING_BARS_RATIO: u16 = 3;

/// Pixel layout of a segmented progress bar after all clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarLayout {
    pub x: u16,
    pub y: u16,
    pub height: u16,
    pub bar_count: u16,
    pub full_bars: u16,
    pub bar_width: u16,
    pub bar_padding: u16,
}

impl BarLayout {
    /// Computes the layout of `bar_count` bars in a `width` x `height` box at
    /// `(x, y)` on a `surface_w` x `surface_h` surface.
    ///
    /// The clamp order and the truncating integer arithmetic are part of the
    /// rendered result; do not reorder them. Returns `None` when nothing fits.
    pub fn compute(
        surface_w: u32,
        surface_h: u32,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        percentage: u8,
        bar_count: u16,
    ) -> Option<Self> {
        if surface_w == 0 || surface_h == 0 {
            return None;
        }
        let line = i64::from(LINE_WIDTH);
        let ratio = i64::from(PADDING_BARS_RATIO);
        let sw = i64::from(surface_w);
        let sh = i64::from(surface_h);

        let percentage = i64::from(percentage.min(100));
        let x = i64::from(x).min(sw - 1);
        let y = i64::from(y).min(sh - 1);
        let mut width = i64::from(width).max(line * 2 + 1);
        width = width.min(sw - x - 1);
        let mut height = i64::from(height).max(line * 2 + 1);
        height = height.min(sh - y - 1);

        let max_bars = (width * ratio / (line * 2 + 1) + 1) / (ratio + 1);
        let bar_count = i64::from(bar_count).min(max_bars);
        if bar_count <= 0 || height <= 0 {
            return None;
        }
        let bar_width = (width / bar_count) * ratio / (ratio + 1) + 1;
        let bar_padding = bar_width / ratio;
        let full_bars = bar_count * percentage / 100;

        Some(Self {
            x: x as u16,
            y: y as u16,
            height: height as u16,
            bar_count: bar_count as u16,
            full_bars: full_bars as u16,
            bar_width: bar_width as u16,
            bar_padding: bar_padding as u16,
        })
    }

    fn bar_rect(&self, index: u16) -> Rect {
        let step = i32::from(self.bar_width) + i32::from(self.bar_padding);
        Rect::new(
            i32::from(self.x) + i32::from(index) * step,
            i32::from(self.y),
            u32::from(self.bar_width),
            u32::from(self.height),
        )
    }

    /// Solid rectangles for the filled part of the bar.
    pub fn full_rects(&self) -> impl Iterator<Item = Rect> + '_ {
        (0..self.full_bars).map(move |i| self.bar_rect(i))
    }

    /// Outer and inset rectangles for each empty bar.
    pub fn empty_rects(&self) -> impl Iterator<Item = (Rect, Rect)> + '_ {
        let line = i32::from(LINE_WIDTH);
        (self.full_bars..self.bar_count).map(move |i| {
            let outer = self.bar_rect(i);
            let inner = Rect::new(
                outer.x + line,
                outer.y + line,
                outer.w.saturating_sub(2 * LINE_WIDTH as u32),
                outer.h.saturating_sub(2 * LINE_WIDTH as u32),
            );
            (outer, inner)
        })
    }
}

/// Draws a segmented progress bar onto `surface` and returns the layout used.
pub fn draw_progress_bar(
    surface: &mut Surface,
    x: u16,
    y: u16,
    width: u16,
    height: u16,
    percentage: u8,
    bar_count: u16,
) -> Option<BarLayout> {
    let layout = BarLayout::compute(
        surface.width(),
        surface.height(),
        x,
        y,
        width,
        height,
        percentage,
        bar_count,
    )?;
    for rect in layout.full_rects() {
        surface.fill_rect(Some(rect), GRAY_MAIN);
    }
    for (outer, inner) in layout.empty_rects() {
        surface.fill_rect(Some(outer), GRAY_MAIN);
        surface.fill_rect(Some(inner), WHITE_MAIN);
    }
    Some(layout)
}
