//! Memory, I/O and CPU panel builders.

use super::{PlotPanel, PlotSeries, Theme};
use crate::data::{Sample, SamplingRun};
use crate::error::{Error, Result};

const TIME_LABEL: &str = "t (s)";

/// Build the memory, I/O and CPU panels, in that order.
pub fn build_panels(run: &SamplingRun) -> Result<Vec<PlotPanel>> {
    Ok(vec![memory_panel(run)?, io_panel(run)?, cpu_panel(run)?])
}

/// Resident and virtual memory in KB.
pub fn memory_panel(run: &SamplingRun) -> Result<PlotPanel> {
    let samples = non_empty(run, "memory")?;
    let theme = Theme::default();

    let mut panel = PlotPanel::new(format!("Memory Plot of PID {}", run.pid()), TIME_LABEL, "KB");
    panel.add_series(PlotSeries::new(
        "RSS",
        theme.resident,
        points(samples, |s| s.resident_kb as f64),
    ));
    panel.add_series(PlotSeries::new(
        "VMS",
        theme.virtual_memory,
        points(samples, |s| s.virtual_kb as f64),
    ));
    Ok(panel)
}

/// Cumulative read and write operation counts.
pub fn io_panel(run: &SamplingRun) -> Result<PlotPanel> {
    let samples = non_empty(run, "IO")?;
    let theme = Theme::default();

    let mut panel = PlotPanel::new(format!("IO Plot of PID {}", run.pid()), TIME_LABEL, "op");
    panel.add_series(PlotSeries::new(
        "IO Read",
        theme.io_read,
        points(samples, |s| s.read_ops as f64),
    ));
    panel.add_series(PlotSeries::new(
        "IO Write",
        theme.io_write,
        points(samples, |s| s.write_ops as f64),
    ));
    Ok(panel)
}

/// CPU utilization in percent.
pub fn cpu_panel(run: &SamplingRun) -> Result<PlotPanel> {
    let samples = non_empty(run, "CPU")?;
    let theme = Theme::default();

    let mut panel = PlotPanel::new(format!("CPU Plot of PID {}", run.pid()), TIME_LABEL, "%");
    panel.add_series(PlotSeries::new("CPU", theme.cpu, points(samples, Sample::cpu_percent)));
    Ok(panel)
}

fn non_empty<'a>(run: &'a SamplingRun, panel: &'static str) -> Result<&'a [Sample]> {
    if run.is_empty() {
        return Err(Error::EmptyPlot { panel });
    }
    Ok(run.samples())
}

fn points(samples: &[Sample], value: impl Fn(&Sample) -> f64) -> Vec<(f64, f64)> {
    samples
        .iter()
        .map(|s| (s.elapsed.as_secs_f64(), value(s)))
        .collect()
}
