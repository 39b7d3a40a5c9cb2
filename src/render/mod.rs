//! Composite image rendering.
//!
//! Panels are laid out in a single column, one row per panel, on a canvas of
//! the configured size. The canvas is encoded once and written to disk.
//!
//! ```text
//! ┌──────────────────────┐
//! │ Memory     (row 0)   │
//! ├──────────────────────┤
//! │ IO         (row 1)   │
//! ├──────────────────────┤
//! │ CPU        (row 2)   │
//! └──────────────────────┘
//! ```

mod bitmap;

pub use bitmap::{BitmapCanvas, BitmapCanvasFactory};

use std::path::Path;

use tracing::{debug, info};

use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::plot::PlotPanel;

/// A rectangular region of the canvas, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub row: usize,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// A drawing surface for plot panels.
pub trait Canvas {
    /// Draw `panel` inside `cell`.
    fn draw_panel(&mut self, cell: &Cell, panel: &PlotPanel) -> Result<()>;

    /// Encode the canvas as image file bytes.
    fn encode(&mut self) -> Result<Vec<u8>>;
}

/// Allocates canvases of a given pixel size.
pub trait CanvasFactory {
    type Canvas: Canvas;

    fn allocate(&self, width: u32, height: u32) -> Result<Self::Canvas>;
}

/// Split a canvas into `rows` full-width cells, top to bottom.
///
/// Leftover pixels go to the last row so the cells tile the canvas exactly.
pub fn grid_cells(width: u32, height: u32, rows: usize) -> Result<Vec<Cell>> {
    if rows == 0 {
        return Err(Error::EmptyGrid("no rows to lay out".to_string()));
    }

    let row_count = u32::try_from(rows).unwrap_or(u32::MAX);
    let row_height = height / row_count;
    if width == 0 || row_height == 0 {
        return Err(Error::InvalidDimension {
            input: format!("{width}x{height}"),
            reason: format!("too small for {rows} rows"),
        });
    }

    let cells = (0..row_count)
        .map(|row| {
            let y = row * row_height;
            let cell_height = if row + 1 == row_count {
                height - y
            } else {
                row_height
            };
            Cell {
                row: row as usize,
                x: 0,
                y,
                width,
                height: cell_height,
            }
        })
        .collect();
    Ok(cells)
}

/// Lays out panels and writes the composite image.
///
/// # Example
///
/// ```no_run
/// use std::path::PathBuf;
/// use pinfoplot::{parse_length, RenderConfig, Renderer};
///
/// let config = RenderConfig::new(
///     parse_length("10cm")?,
///     parse_length("8cm")?,
///     96.0,
///     PathBuf::from("pinfo.png"),
/// )?;
/// let renderer = Renderer::new(config);
/// # let panels: Vec<pinfoplot::PlotPanel> = Vec::new();
/// renderer.render(&panels)?;
/// # Ok::<(), pinfoplot::Error>(())
/// ```
#[derive(Debug)]
pub struct Renderer<F = BitmapCanvasFactory> {
    config: RenderConfig,
    factory: F,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self::with_factory(config, BitmapCanvasFactory)
    }
}

impl<F: CanvasFactory> Renderer<F> {
    pub fn with_factory(config: RenderConfig, factory: F) -> Self {
        Self { config, factory }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render all panels into one image at the configured output path.
    pub fn render(&self, panels: &[PlotPanel]) -> Result<()> {
        self.render_to(panels, &self.config.output)
    }

    /// Render a single panel, filling the whole canvas, to `path`.
    pub fn render_single(&self, panel: &PlotPanel, path: &Path) -> Result<()> {
        self.render_to(std::slice::from_ref(panel), path)
    }

    fn render_to(&self, panels: &[PlotPanel], path: &Path) -> Result<()> {
        if panels.is_empty() {
            return Err(Error::EmptyGrid("no panels to render".to_string()));
        }
        if let Some(panel) = panels.iter().find(|p| p.series.is_empty()) {
            return Err(Error::EmptyGrid(format!("panel {:?} has no series", panel.title)));
        }

        let (width, height) = self.config.pixel_size()?;
        let cells = grid_cells(width, height, panels.len())?;

        let mut canvas = self.factory.allocate(width, height)?;
        for (cell, panel) in cells.iter().zip(panels) {
            debug!(row = cell.row, title = %panel.title, "drawing panel");
            canvas.draw_panel(cell, panel)?;
        }

        let bytes = canvas.encode()?;
        write_image(path, &bytes)?;
        info!(
            path = %path.display(),
            width,
            height,
            panels = panels.len(),
            "wrote image"
        );
        Ok(())
    }
}

/// Create or truncate `path` and write the encoded image.
fn write_image(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Length;
    use crate::plot::{PlotSeries, Theme};
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::rc::Rc;
    use tempfile::tempdir;

    type Log = Rc<RefCell<Vec<(Cell, String)>>>;

    struct RecordingFactory {
        log: Log,
    }

    struct RecordingCanvas {
        log: Log,
    }

    impl CanvasFactory for RecordingFactory {
        type Canvas = RecordingCanvas;

        fn allocate(&self, _width: u32, _height: u32) -> Result<RecordingCanvas> {
            Ok(RecordingCanvas {
                log: Rc::clone(&self.log),
            })
        }
    }

    impl Canvas for RecordingCanvas {
        fn draw_panel(&mut self, cell: &Cell, panel: &PlotPanel) -> Result<()> {
            self.log.borrow_mut().push((*cell, panel.title.clone()));
            Ok(())
        }

        fn encode(&mut self) -> Result<Vec<u8>> {
            let titles: Vec<String> = self.log.borrow().iter().map(|(_, t)| t.clone()).collect();
            Ok(titles.join("\n").into_bytes())
        }
    }

    fn panel(title: &str) -> PlotPanel {
        let mut panel = PlotPanel::new(title, "t (s)", "v");
        panel.add_series(PlotSeries::new("s", Theme::default().cpu, vec![(0.0, 1.0), (1.0, 2.0)]));
        panel
    }

    fn renderer(output: PathBuf) -> (Renderer<RecordingFactory>, Log) {
        let log = Log::default();
        let config = RenderConfig::new(
            Length::from_inches(3.0),
            Length::from_inches(3.0),
            100.0,
            output,
        )
        .unwrap();
        let factory = RecordingFactory {
            log: Rc::clone(&log),
        };
        (Renderer::with_factory(config, factory), log)
    }

    #[test]
    fn test_grid_cells_tile_canvas() {
        let cells = grid_cells(300, 301, 3).unwrap();
        assert_eq!(cells.len(), 3);
        assert_eq!((cells[0].y, cells[0].height), (0, 100));
        assert_eq!((cells[1].y, cells[1].height), (100, 100));
        assert_eq!((cells[2].y, cells[2].height), (200, 101));
        assert!(cells.iter().all(|c| c.x == 0 && c.width == 300));
    }

    #[test]
    fn test_grid_cells_errors() {
        assert!(matches!(grid_cells(100, 100, 0), Err(Error::EmptyGrid(_))));
        assert!(matches!(grid_cells(100, 2, 3), Err(Error::InvalidDimension { .. })));
    }

    #[test]
    fn test_render_draws_in_order() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.png");
        let (renderer, log) = renderer(output.clone());

        renderer.render(&[panel("memory"), panel("io"), panel("cpu")]).unwrap();

        let log = log.borrow();
        let titles: Vec<&str> = log.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(titles, vec!["memory", "io", "cpu"]);
        assert!(log.windows(2).all(|w| w[0].0.y < w[1].0.y));
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "memory\nio\ncpu");
    }

    #[test]
    fn test_render_truncates_existing_file() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.png");
        std::fs::write(&output, "x".repeat(4096)).unwrap();

        let (renderer, _) = renderer(output.clone());
        renderer.render(&[panel("only")]).unwrap();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "only");
    }

    #[test]
    fn test_render_rejects_empty_grid() {
        let dir = tempdir().unwrap();
        let (renderer, log) = renderer(dir.path().join("out.png"));

        assert!(matches!(renderer.render(&[]), Err(Error::EmptyGrid(_))));

        let empty_row = PlotPanel::new("empty", "x", "y");
        let err = renderer.render(&[panel("memory"), empty_row]).unwrap_err();
        assert!(matches!(err, Error::EmptyGrid(_)));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_render_write_error() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("missing").join("out.png");
        let (renderer, _) = renderer(output.clone());

        match renderer.render(&[panel("memory")]) {
            Err(Error::Write { path, .. }) => assert_eq!(path, output),
            other => panic!("expected write error, got {other:?}"),
        }
    }

    #[test]
    fn test_render_single() {
        let dir = tempdir().unwrap();
        let (renderer, log) = renderer(dir.path().join("unused.png"));
        let single = dir.path().join("cpu.png");

        renderer.render_single(&panel("cpu"), &single).unwrap();

        let log = log.borrow();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].0.height, 300);
        assert!(single.exists());
    }
}
