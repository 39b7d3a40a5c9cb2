//! Fixed line styles for each metric.
//!
//! Styles are not user-configurable so panels look the same across runs.

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const GREEN: Rgb = Rgb(0, 255, 0);
    pub const BLACK: Rgb = Rgb(0, 0, 0);
}

/// Color and stroke width of a line series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesStyle {
    pub color: Rgb,
    /// Stroke width in points.
    pub width: u32,
}

impl SeriesStyle {
    pub const fn new(color: Rgb, width: u32) -> Self {
        Self { color, width }
    }
}

/// Line styles for every series the panel builders produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub resident: SeriesStyle,
    pub virtual_memory: SeriesStyle,
    pub io_read: SeriesStyle,
    pub io_write: SeriesStyle,
    pub cpu: SeriesStyle,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            resident: SeriesStyle::new(Rgb::RED, 1),
            virtual_memory: SeriesStyle::new(Rgb::GREEN, 1),
            io_read: SeriesStyle::new(Rgb::RED, 1),
            io_write: SeriesStyle::new(Rgb::GREEN, 1),
            cpu: SeriesStyle::new(Rgb::BLACK, 1),
        }
    }
}
