//! Scripted metric source.
//!
//! Replays a fixed sequence of readings, one [`Frame`] per sample. Useful
//! for tests and demos that need deterministic sampling without a real
//! process.

use std::cell::Cell;
use std::rc::Rc;

use super::{IoCounters, MemoryInfo, Metric, MetricError, MetricsProvider, ProcessMetrics};

/// Readings for one sample. A `None` field fails that query.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub memory: Option<MemoryInfo>,
    pub io: Option<IoCounters>,
    pub cpu_percent: Option<f64>,
    /// Fail the liveness check made just before this frame is sampled.
    pub liveness_fails: bool,
}

impl Frame {
    /// A frame where every query succeeds.
    pub fn new(memory: MemoryInfo, io: IoCounters, cpu_percent: f64) -> Self {
        Self {
            memory: Some(memory),
            io: Some(io),
            cpu_percent: Some(cpu_percent),
            liveness_fails: false,
        }
    }

    /// A frame where the given metric query fails.
    pub fn failing(metric: Metric) -> Self {
        let mut frame = Self::new(MemoryInfo::default(), IoCounters::default(), 0.0);
        match metric {
            Metric::Memory => frame.memory = None,
            Metric::Io => frame.io = None,
            Metric::Cpu => frame.cpu_percent = None,
            Metric::Liveness => frame.liveness_fails = true,
        }
        frame
    }
}

/// A provider that hands out a [`ScriptedProcess`] replaying its frames.
///
/// # Example
///
/// ```
/// use pinfoplot::source::{Frame, IoCounters, MemoryInfo, MetricsProvider, ScriptedProvider};
///
/// let frame = Frame::new(MemoryInfo { rss: 4096, vms: 8192 }, IoCounters::default(), 12.5);
/// let mut provider = ScriptedProvider::new(vec![frame; 3]);
/// assert!(provider.attach(1).is_ok());
/// assert_eq!(provider.calls(), 1);
/// ```
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    frames: Vec<Frame>,
    attach: AttachOutcome,
    calls: Rc<Cell<usize>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum AttachOutcome {
    #[default]
    Succeeds,
    Missing,
    Denied,
}

impl ScriptedProvider {
    /// A process that lives for exactly `frames.len()` samples.
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            attach: AttachOutcome::Succeeds,
            calls: Rc::default(),
        }
    }

    /// A process whose cumulative counters grow by fixed steps each sample.
    pub fn counting(samples: usize, read_step: u64, write_step: u64) -> Self {
        let frames = (0..samples as u64)
            .map(|i| {
                Frame::new(
                    MemoryInfo {
                        rss: (1024 + i * 16) * 1024,
                        vms: (4096 + i * 32) * 1024,
                    },
                    IoCounters {
                        read_ops: i * read_step,
                        write_ops: i * write_step,
                    },
                    (i % 4) as f64 * 25.0,
                )
            })
            .collect();
        Self::new(frames)
    }

    /// A provider for which every attach fails.
    pub fn missing() -> Self {
        Self {
            attach: AttachOutcome::Missing,
            ..Self::default()
        }
    }

    /// A provider whose process exists but cannot be inspected.
    pub fn denied() -> Self {
        Self {
            attach: AttachOutcome::Denied,
            ..Self::default()
        }
    }

    /// Total calls made against this provider and its processes.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl MetricsProvider for ScriptedProvider {
    type Process = ScriptedProcess;

    fn attach(&mut self, pid: u32) -> Result<ScriptedProcess, MetricError> {
        self.calls.set(self.calls.get() + 1);
        match self.attach {
            AttachOutcome::Succeeds => {}
            AttachOutcome::Missing => return Err(MetricError::Gone(pid)),
            AttachOutcome::Denied => {
                return Err(MetricError::AccessDenied(format!("/proc/{pid}/io")));
            }
        }
        Ok(ScriptedProcess {
            frames: self.frames.clone(),
            cursor: 0,
            calls: Rc::clone(&self.calls),
        })
    }
}

/// A process replaying scripted frames.
///
/// The process reports itself running while unconsumed frames remain. A
/// frame is consumed by the CPU query, the last reading of each sample.
#[derive(Debug)]
pub struct ScriptedProcess {
    frames: Vec<Frame>,
    cursor: usize,
    calls: Rc<Cell<usize>>,
}

impl ScriptedProcess {
    fn frame(&self) -> Result<&Frame, MetricError> {
        self.calls.set(self.calls.get() + 1);
        self.frames
            .get(self.cursor)
            .ok_or_else(|| MetricError::Scripted("script exhausted".to_string()))
    }
}

impl ProcessMetrics for ScriptedProcess {
    fn is_running(&mut self) -> Result<bool, MetricError> {
        self.calls.set(self.calls.get() + 1);
        match self.frames.get(self.cursor) {
            Some(frame) if frame.liveness_fails => {
                Err(MetricError::Scripted("liveness query failed".to_string()))
            }
            Some(_) => Ok(true),
            None => Ok(false),
        }
    }

    fn memory_info(&mut self) -> Result<MemoryInfo, MetricError> {
        self.frame()?
            .memory
            .ok_or_else(|| MetricError::Scripted("memory query failed".to_string()))
    }

    fn io_counters(&mut self) -> Result<IoCounters, MetricError> {
        self.frame()?
            .io
            .ok_or_else(|| MetricError::Scripted("I/O query failed".to_string()))
    }

    fn cpu_percent(&mut self) -> Result<f64, MetricError> {
        let cpu = self
            .frame()?
            .cpu_percent
            .ok_or_else(|| MetricError::Scripted("CPU query failed".to_string()))?;
        self.cursor += 1;
        Ok(cpu)
    }
}
