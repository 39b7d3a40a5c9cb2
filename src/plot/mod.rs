//! Plot panels built from sampling runs.
//!
//! A [`PlotPanel`] is a backend-independent description of one chart: title,
//! axis labels and the line series to draw. The renderer turns panels into
//! pixels; nothing in this module touches a drawing library.

mod panels;
mod theme;

pub use panels::{build_panels, cpu_panel, io_panel, memory_panel};
pub use theme::{Rgb, SeriesStyle, Theme};

/// A named, styled line of `(elapsed seconds, value)` points.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSeries {
    pub name: String,
    pub style: SeriesStyle,
    pub points: Vec<(f64, f64)>,
}

impl PlotSeries {
    pub fn new(name: impl Into<String>, style: SeriesStyle, points: Vec<(f64, f64)>) -> Self {
        Self {
            name: name.into(),
            style,
            points,
        }
    }
}

/// A titled chart with axis labels, an optional grid and a legend.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotPanel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub grid: bool,
    pub series: Vec<PlotSeries>,
}

impl PlotPanel {
    pub fn new(title: impl Into<String>, x_label: &str, y_label: &str) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            grid: true,
            series: Vec::new(),
        }
    }

    /// Add a series; it is registered in the legend under its name.
    pub fn add_series(&mut self, series: PlotSeries) {
        self.series.push(series);
    }

    /// Whether the panel has at least one point to draw.
    pub fn has_data(&self) -> bool {
        self.series.iter().any(|s| !s.points.is_empty())
    }

    /// X axis bounds over all series.
    pub fn x_range(&self) -> (f64, f64) {
        widen(self.bounds(|&(x, _)| x))
    }

    /// Y axis bounds over all series.
    pub fn y_range(&self) -> (f64, f64) {
        widen(self.bounds(|&(_, y)| y))
    }

    fn bounds(&self, axis: impl Fn(&(f64, f64)) -> f64) -> Option<(f64, f64)> {
        self.series
            .iter()
            .flat_map(|s| s.points.iter())
            .map(axis)
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Make sure a range has non-zero width so a flat line is still drawable.
fn widen(bounds: Option<(f64, f64)>) -> (f64, f64) {
    match bounds {
        None => (0.0, 1.0),
        Some((lo, hi)) if hi > lo => (lo, hi),
        Some((v, _)) if v == 0.0 => (0.0, 1.0),
        Some((v, _)) => {
            let pad = v.abs() * 0.05;
            (v - pad, v + pad)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel_with(points: Vec<(f64, f64)>) -> PlotPanel {
        let mut panel = PlotPanel::new("test", "x", "y");
        panel.add_series(PlotSeries::new("s", Theme::default().cpu, points));
        panel
    }

    #[test]
    fn test_ranges() {
        let panel = panel_with(vec![(0.0, 5.0), (1.5, -2.0), (3.0, 10.0)]);
        assert_eq!(panel.x_range(), (0.0, 3.0));
        assert_eq!(panel.y_range(), (-2.0, 10.0));
    }

    #[test]
    fn test_flat_series_is_widened() {
        let panel = panel_with(vec![(0.0, 100.0), (1.0, 100.0)]);
        assert_eq!(panel.y_range(), (95.0, 105.0));

        let zero = panel_with(vec![(0.0, 0.0), (1.0, 0.0)]);
        assert_eq!(zero.y_range(), (0.0, 1.0));
    }

    #[test]
    fn test_empty_panel() {
        let panel = PlotPanel::new("empty", "x", "y");
        assert!(!panel.has_data());
        assert_eq!(panel.x_range(), (0.0, 1.0));
    }
}
