//! Run configuration.
//!
//! Settings are layered: built-in defaults, an optional config file,
//! `PINFOPLOT_*` environment variables, then command-line flags. The merged
//! [`Settings`] are validated into the value objects the sampler and
//! renderer take: [`SamplerConfig`] and [`RenderConfig`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::duration::parse_duration;
use crate::data::{parse_length, Length, DEFAULT_DPI};
use crate::error::{Error, Result};
use crate::sampler::expected_samples;

/// Prefix for environment variable overrides (e.g. `PINFOPLOT_INTERVAL=100ms`).
pub const ENV_PREFIX: &str = "PINFOPLOT";

/// Raw, unvalidated settings as read from file, environment and flags.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Target process id; non-positive means unset.
    pub pid: i64,
    /// Sampling window, "0" samples until the process exits.
    pub duration: String,
    pub interval: String,
    pub width: String,
    pub height: String,
    pub dpi: f64,
    pub output: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pid: -1,
            duration: "10s".to_string(),
            interval: "50ms".to_string(),
            width: "10cm".to_string(),
            height: "8cm".to_string(),
            dpi: DEFAULT_DPI,
            output: PathBuf::from("pinfo.png"),
        }
    }
}

impl Settings {
    /// Load settings from an optional file and the environment.
    ///
    /// Keys missing from every source keep their defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Validate the sampling part of the settings.
    pub fn sampler_config(&self) -> Result<SamplerConfig> {
        let pid = u32::try_from(self.pid)
            .ok()
            .filter(|pid| *pid > 0)
            .ok_or_else(|| Error::Config(format!("invalid pid: {}", self.pid)))?;
        let duration = parse_duration(&self.duration)
            .map_err(|e| Error::Config(format!("duration: {e}")))?;
        let interval = parse_duration(&self.interval)
            .map_err(|e| Error::Config(format!("interval: {e}")))?;
        SamplerConfig::new(pid, duration, interval)
    }

    /// Validate the rendering part of the settings.
    pub fn render_config(&self) -> Result<RenderConfig> {
        RenderConfig::new(
            parse_length(&self.width)?,
            parse_length(&self.height)?,
            self.dpi,
            self.output.clone(),
        )
    }
}

/// What to sample and how often.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerConfig {
    pub pid: u32,
    /// Total sampling window; zero means until the process exits.
    pub duration: Duration,
    pub interval: Duration,
}

impl SamplerConfig {
    /// Build a config, rejecting windows too short for two samples.
    pub fn new(pid: u32, duration: Duration, interval: Duration) -> Result<Self> {
        expected_samples(duration, interval)?;
        Ok(Self {
            pid,
            duration,
            interval,
        })
    }

    /// Whether sampling continues until the process exits.
    pub fn until_exit(&self) -> bool {
        self.duration.is_zero()
    }
}

/// Output image size, resolution and location.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub width: Length,
    pub height: Length,
    pub dpi: f64,
    pub output: PathBuf,
}

impl RenderConfig {
    pub fn new(width: Length, height: Length, dpi: f64, output: PathBuf) -> Result<Self> {
        if !dpi.is_finite() || dpi <= 0.0 {
            return Err(Error::InvalidDimension {
                input: dpi.to_string(),
                reason: "dpi must be positive".to_string(),
            });
        }
        Ok(Self {
            width,
            height,
            dpi,
            output,
        })
    }

    /// Canvas size in pixels.
    pub fn pixel_size(&self) -> Result<(u32, u32)> {
        Ok((self.width.to_pixels(self.dpi)?, self.height.to_pixels(self.dpi)?))
    }
}
