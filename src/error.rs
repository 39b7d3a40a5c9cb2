//! Error types for sampling and rendering.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::source::{Metric, MetricError};

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that abort a sampling or rendering run.
///
/// Every variant is terminal: the pipeline never retries and never produces
/// partial output.
#[derive(Debug, Error)]
pub enum Error {
    /// The sampling interval was zero.
    #[error("sampling interval must be greater than zero")]
    InvalidInterval,

    /// The window is too short to take at least two samples.
    #[error(
        "need at least 2 samples, got {samples} from duration {duration:?} and interval {interval:?}; \
         the interval is too long or the duration too short"
    )]
    InsufficientSamples {
        duration: Duration,
        interval: Duration,
        samples: u128,
    },

    /// The target process does not exist or cannot be opened.
    #[error("process {pid} not found: {reason}")]
    ProcessNotFound { pid: u32, reason: String },

    /// Polling a metric failed mid-run.
    #[error("failed to query {metric} of process {pid}: {source}")]
    MetricQuery {
        pid: u32,
        metric: Metric,
        #[source]
        source: MetricError,
    },

    /// A panel was requested from a run with no samples.
    #[error("cannot build {panel} plot: run contains no samples")]
    EmptyPlot { panel: &'static str },

    /// No panels to lay out, or a panel with nothing to draw.
    #[error("cannot render an empty grid: {0}")]
    EmptyGrid(String),

    /// An image dimension could not be parsed or is not positive.
    #[error("invalid image dimension {input:?}: {reason}")]
    InvalidDimension { input: String, reason: String },

    /// The plotting backend failed to draw or encode.
    #[error("failed to draw plot: {0}")]
    Draw(String),

    /// Writing the image to disk failed.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be loaded or is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}
