//! Software raster primitives the overlay draws with.

pub mod progress;
pub mod surface;
pub mod text;

pub use surface::{rgb, Color, Rect, Surface};

/// Foreground gray used for titles, full bars and bar outlines.
pub const GRAY_MAIN: Color = rgb(85, 85, 85);
/// Light fill used inside empty progress bars.
pub const WHITE_MAIN: Color = rgb(236, 236, 236);
