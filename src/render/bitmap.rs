//! Raster canvas backed by `plotters` and encoded as PNG.

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use plotters::coord::Shift;
use plotters::prelude::*;

use super::{Canvas, CanvasFactory, Cell};
use crate::error::{Error, Result};
use crate::plot::{PlotPanel, Rgb};

const FONT_FAMILY: &str = "sans-serif";
const LEGEND_LINE_LENGTH: i32 = 20;

/// Allocates white RGB canvases.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitmapCanvasFactory;

impl CanvasFactory for BitmapCanvasFactory {
    type Canvas = BitmapCanvas;

    fn allocate(&self, width: u32, height: u32) -> Result<BitmapCanvas> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(3))
            .ok_or_else(|| Error::InvalidDimension {
                input: format!("{width}x{height}"),
                reason: "canvas too large".to_string(),
            })?;

        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(len)
            .map_err(|_| Error::InvalidDimension {
                input: format!("{width}x{height}"),
                reason: "canvas too large".to_string(),
            })?;
        buffer.resize(len, 255);

        Ok(BitmapCanvas {
            width,
            height,
            buffer,
        })
    }
}

/// An in-memory RGB raster.
#[derive(Debug)]
pub struct BitmapCanvas {
    width: u32,
    height: u32,
    buffer: Vec<u8>,
}

impl BitmapCanvas {
    /// Raw RGB pixel data, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.buffer
    }
}

impl Canvas for BitmapCanvas {
    fn draw_panel(&mut self, cell: &Cell, panel: &PlotPanel) -> Result<()> {
        let root =
            BitMapBackend::with_buffer(&mut self.buffer, (self.width, self.height)).into_drawing_area();
        let area = root
            .clone()
            .shrink((cell.x, cell.y), (cell.width, cell.height));

        draw_chart(&area, panel, cell.height).map_err(|e| Error::Draw(e.to_string()))?;
        root.present().map_err(|e| Error::Draw(e.to_string()))
    }

    fn encode(&mut self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(&self.buffer, self.width, self.height, ColorType::Rgb8)
            .map_err(|e| Error::Draw(e.to_string()))?;
        Ok(bytes)
    }
}

fn draw_chart<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &PlotPanel,
    cell_height: u32,
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    // Scale text with the cell so small images stay legible.
    let title_size = (cell_height / 14).clamp(9, 24);
    let label_size = (cell_height / 18).clamp(8, 16);

    let (x_min, x_max) = panel.x_range();
    let (y_min, y_max) = panel.y_range();

    let mut chart = ChartBuilder::on(area)
        .caption(&panel.title, (FONT_FAMILY, title_size).into_font())
        .margin(label_size)
        .x_label_area_size(label_size * 3)
        .y_label_area_size(label_size * 5)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    let mut mesh = chart.configure_mesh();
    mesh.x_desc(panel.x_label.as_str())
        .y_desc(panel.y_label.as_str())
        .label_style((FONT_FAMILY, label_size).into_font());
    if !panel.grid {
        mesh.disable_mesh();
    }
    mesh.draw()?;

    for series in &panel.series {
        let Rgb(r, g, b) = series.style.color;
        let style = RGBColor(r, g, b).stroke_width(series.style.width);
        chart
            .draw_series(LineSeries::new(series.points.iter().copied(), style))?
            .label(series.name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + LEGEND_LINE_LENGTH, y)], style));
    }

    chart
        .configure_series_labels()
        .label_font((FONT_FAMILY, label_size).into_font())
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::{PlotSeries, Theme};
    use image::GenericImageView;

    #[test]
    fn test_allocate_is_white() {
        let canvas = BitmapCanvasFactory.allocate(4, 3).unwrap();
        assert_eq!(canvas.pixels().len(), 4 * 3 * 3);
        assert!(canvas.pixels().iter().all(|&p| p == 255));
    }

    #[test]
    fn test_allocate_too_large() {
        // Overflows the byte count.
        let err = BitmapCanvasFactory.allocate(u32::MAX, u32::MAX).unwrap_err();
        assert!(matches!(err, Error::InvalidDimension { .. }));

        // Fits a usize but exceeds what any allocation may request.
        let err = BitmapCanvasFactory.allocate(u32::MAX, u32::MAX / 4).unwrap_err();
        assert!(matches!(err, Error::InvalidDimension { .. }));
    }

    #[test]
    fn test_draw_panel_stays_inside_cell() {
        let (width, height) = (240, 360);
        let cell = Cell {
            row: 1,
            x: 0,
            y: 120,
            width,
            height: 120,
        };
        let mut panel = PlotPanel::new("IO Plot of PID 1", "t (s)", "op");
        let theme = Theme::default();
        panel.add_series(PlotSeries::new("IO Read", theme.io_read, vec![(0.0, 0.0), (1.0, 5.0), (2.0, 9.0)]));
        panel.add_series(PlotSeries::new("IO Write", theme.io_write, vec![(0.0, 0.0), (1.0, 2.0), (2.0, 3.0)]));

        let mut canvas = BitmapCanvasFactory.allocate(width, height).unwrap();
        match canvas.draw_panel(&cell, &panel) {
            Ok(()) => {}
            // No usable fonts on this host.
            Err(Error::Draw(reason)) => {
                eprintln!("skipping: {reason}");
                return;
            }
            Err(other) => panic!("unexpected error: {other:?}"),
        }

        let row_bytes = width as usize * 3;
        let (top, bottom) = (cell.y as usize, (cell.y + cell.height) as usize);
        let pixels = canvas.pixels();

        let inside = &pixels[top * row_bytes..bottom * row_bytes];
        assert!(inside.iter().any(|&p| p != 255));

        let above = &pixels[..top * row_bytes];
        let below = &pixels[bottom * row_bytes..];
        assert!(above.iter().chain(below).all(|&p| p == 255));
    }

    #[test]
    fn test_encode_png() {
        let mut canvas = BitmapCanvasFactory.allocate(16, 8).unwrap();
        let bytes = canvas.encode().unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
    }
}
