//! Process metric sources.
//!
//! This module provides a trait-based abstraction over the operating system's
//! per-process accounting so the sampler can run against a live process or
//! against a scripted one in tests.

mod scripted;
mod system;

pub use scripted::{Frame, ScriptedProcess, ScriptedProvider};
pub use system::{SystemProcess, SystemProvider};

use std::fmt;

use thiserror::Error;

/// Memory usage of a process, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryInfo {
    /// Resident set size.
    pub rss: u64,
    /// Virtual memory size.
    pub vms: u64,
}

/// Cumulative I/O operation counts of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IoCounters {
    pub read_ops: u64,
    pub write_ops: u64,
}

/// The metric a query was reading when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Liveness,
    Memory,
    Io,
    Cpu,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::Liveness => "liveness",
            Metric::Memory => "memory info",
            Metric::Io => "I/O counters",
            Metric::Cpu => "CPU percent",
        };
        f.write_str(name)
    }
}

/// Errors reported by a metrics provider.
#[derive(Debug, Error)]
pub enum MetricError {
    /// The process has exited or never existed.
    #[error("process {0} is gone")]
    Gone(u32),

    /// The caller lacks permission to inspect the process.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// The metric is not available on this platform.
    #[error("not supported on this platform: {0}")]
    Unsupported(&'static str),

    /// The OS returned data that could not be parsed.
    #[error("malformed data: {0}")]
    Malformed(String),

    /// Reading OS accounting files failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure injected by a scripted provider.
    #[error("{0}")]
    Scripted(String),
}

/// Opens handles to processes by identifier.
///
/// # Example
///
/// ```no_run
/// use pinfoplot::source::{MetricsProvider, ProcessMetrics, SystemProvider};
///
/// let mut provider = SystemProvider::new();
/// let mut process = provider.attach(std::process::id()).unwrap();
/// if process.is_running().unwrap() {
///     println!("rss = {} bytes", process.memory_info().unwrap().rss);
/// }
/// ```
pub trait MetricsProvider {
    type Process: ProcessMetrics;

    /// Resolve a handle to the process with the given identifier.
    fn attach(&mut self, pid: u32) -> Result<Self::Process, MetricError>;
}

/// Per-process metric queries.
///
/// Any query may fail if the process has disappeared or access is denied.
pub trait ProcessMetrics {
    /// Check whether the process is still alive.
    fn is_running(&mut self) -> Result<bool, MetricError>;

    /// Current resident and virtual memory size.
    fn memory_info(&mut self) -> Result<MemoryInfo, MetricError>;

    /// Cumulative read and write operation counts.
    fn io_counters(&mut self) -> Result<IoCounters, MetricError>;

    /// CPU utilization in percent, where 100 is one fully busy core.
    fn cpu_percent(&mut self) -> Result<f64, MetricError>;
}
