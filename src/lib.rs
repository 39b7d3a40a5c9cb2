//! # pinfoplot
//!
//! Sample a running process's memory, I/O and CPU usage at a fixed interval
//! and plot the collected time series to a single image.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                                                                  │
//! │  ┌─────────┐   ┌─────────┐   ┌─────────────┐   ┌─────────┐       │
//! │  │ source  │──▶│ sampler │──▶│    plot     │──▶│ render  │──▶ PNG│
//! │  │(metrics)│   │ (loop)  │   │  (panels)   │   │ (grid)  │       │
//! │  └─────────┘   └─────────┘   └─────────────┘   └─────────┘       │
//! │       ▲             │                                            │
//! │       │             ▼                                            │
//! │  SystemProvider  SamplingRun                                     │
//! │  ScriptedProvider                                                │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: Metric provider abstraction ([`MetricsProvider`] trait) with a
//!   live OS implementation and a scripted one for tests
//! - **[`sampler`]**: The polling loop producing a [`SamplingRun`]
//! - **[`plot`]**: Memory, I/O and CPU [`PlotPanel`]s built from a run
//! - **[`render`]**: Single-column grid layout, rasterization and file output
//! - **[`config`]**: Layered settings and the validated [`SamplerConfig`] / [`RenderConfig`]
//! - **[`data`]**: Samples, runs, and duration/length parsing
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Sample pid 1234 for 10s every 50ms and write pinfo.png
//! pinfoplot -p 1234
//!
//! # Sample until the process exits, larger image
//! pinfoplot -p 1234 -d 0 -i 200ms -w 20cm -h 15cm -o run.png
//! ```
//!
//! ### As a library
//!
//! ```
//! use std::time::Duration;
//! use pinfoplot::{build_panels, Sampler, SamplerConfig, ScriptedProvider};
//!
//! let config = SamplerConfig::new(1, Duration::ZERO, Duration::from_millis(1))?;
//! let mut sampler = Sampler::new(ScriptedProvider::counting(5, 10, 3));
//! let run = sampler.run(&config)?;
//!
//! let panels = build_panels(&run)?;
//! assert_eq!(panels.len(), 3);
//! # Ok::<(), pinfoplot::Error>(())
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod plot;
pub mod render;
pub mod sampler;
pub mod source;

// Re-export main types for convenience
pub use config::{RenderConfig, SamplerConfig, Settings};
pub use data::{parse_length, Length, RunSummary, Sample, SamplingRun};
pub use error::{Error, Result};
pub use plot::{build_panels, cpu_panel, io_panel, memory_panel, PlotPanel, PlotSeries};
pub use render::{BitmapCanvasFactory, Canvas, CanvasFactory, Cell, Renderer};
pub use sampler::{Clock, Sampler, SystemClock};
pub use source::{MetricsProvider, ProcessMetrics, ScriptedProvider, SystemProvider};
