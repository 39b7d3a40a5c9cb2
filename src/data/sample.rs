//! Samples and sampling runs.

use std::time::{Duration, SystemTime};

/// Upper bound on the samples reserved up front; longer runs grow on push.
const MAX_RESERVED_SAMPLES: usize = 4096;

/// One measurement of the target process.
///
/// All three metric families are captured together; a sample never holds a
/// partial reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Time since sampling began.
    pub elapsed: Duration,
    /// Resident set size in KB.
    pub resident_kb: u64,
    /// Virtual memory size in KB.
    pub virtual_kb: u64,
    /// Cumulative read operations.
    pub read_ops: u64,
    /// Cumulative write operations.
    pub write_ops: u64,
    /// CPU utilization as a fraction (1.0 = one core fully busy).
    pub cpu_fraction: f64,
}

impl Sample {
    /// CPU utilization as a percentage.
    pub fn cpu_percent(&self) -> f64 {
        self.cpu_fraction * 100.0
    }
}

/// The result of one sampling invocation.
#[derive(Debug, Clone)]
pub struct SamplingRun {
    pid: u32,
    interval: Duration,
    started_at: SystemTime,
    samples: Vec<Sample>,
}

impl SamplingRun {
    pub(crate) fn new(pid: u32, interval: Duration, started_at: SystemTime, capacity: usize) -> Self {
        Self {
            pid,
            interval,
            started_at,
            samples: Vec::with_capacity(capacity.min(MAX_RESERVED_SAMPLES)),
        }
    }

    /// Build a run from already collected samples.
    ///
    /// Samples are sorted by elapsed time so the sequence stays ordered.
    pub fn from_samples(
        pid: u32,
        interval: Duration,
        started_at: SystemTime,
        mut samples: Vec<Sample>,
    ) -> Self {
        samples.sort_by_key(|s| s.elapsed);
        Self {
            pid,
            interval,
            started_at,
            samples,
        }
    }

    pub(crate) fn push(&mut self, sample: Sample) {
        debug_assert!(self.samples.last().is_none_or(|last| last.elapsed <= sample.elapsed));
        self.samples.push(sample);
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Nominal sampling interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wall-clock time at which sampling started.
    pub fn started_at(&self) -> SystemTime {
        self.started_at
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Aggregate statistics over the run, or `None` if it has no samples.
    pub fn summary(&self) -> Option<RunSummary> {
        let first = self.samples.first()?;
        let last = self.samples.last()?;

        let peak_resident_kb = self.samples.iter().map(|s| s.resident_kb).max().unwrap_or(0);
        let peak_virtual_kb = self.samples.iter().map(|s| s.virtual_kb).max().unwrap_or(0);
        let cpu_total: f64 = self.samples.iter().map(Sample::cpu_percent).sum();
        let peak_cpu_percent = self
            .samples
            .iter()
            .map(Sample::cpu_percent)
            .fold(0.0, f64::max);

        Some(RunSummary {
            samples: self.samples.len(),
            span: last.elapsed.saturating_sub(first.elapsed),
            peak_resident_kb,
            peak_virtual_kb,
            mean_cpu_percent: cpu_total / self.samples.len() as f64,
            peak_cpu_percent,
            read_ops: last.read_ops.saturating_sub(first.read_ops),
            write_ops: last.write_ops.saturating_sub(first.write_ops),
        })
    }
}

/// Aggregate statistics over a [`SamplingRun`].
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub samples: usize,
    /// Elapsed time between the first and last sample.
    pub span: Duration,
    pub peak_resident_kb: u64,
    pub peak_virtual_kb: u64,
    pub mean_cpu_percent: f64,
    pub peak_cpu_percent: f64,
    /// Read operations performed during the run.
    pub read_ops: u64,
    /// Write operations performed during the run.
    pub write_ops: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_hint_is_bounded() {
        let run = SamplingRun::new(1, Duration::from_micros(1), SystemTime::now(), usize::MAX);
        assert!(run.samples.capacity() <= MAX_RESERVED_SAMPLES);
        assert!(run.is_empty());
    }

    fn sample(ms: u64, rss: u64, reads: u64, writes: u64, cpu: f64) -> Sample {
        Sample {
            elapsed: Duration::from_millis(ms),
            resident_kb: rss,
            virtual_kb: rss * 4,
            read_ops: reads,
            write_ops: writes,
            cpu_fraction: cpu,
        }
    }

    #[test]
    fn test_from_samples_orders_by_elapsed() {
        let run = SamplingRun::from_samples(
            7,
            Duration::from_millis(100),
            SystemTime::UNIX_EPOCH,
            vec![sample(200, 1, 0, 0, 0.0), sample(0, 1, 0, 0, 0.0), sample(100, 1, 0, 0, 0.0)],
        );
        let elapsed: Vec<u64> = run.samples().iter().map(|s| s.elapsed.as_millis() as u64).collect();
        assert_eq!(elapsed, vec![0, 100, 200]);
    }

    #[test]
    fn test_summary_empty_run() {
        let run = SamplingRun::new(1, Duration::from_millis(50), SystemTime::UNIX_EPOCH, 0);
        assert!(run.is_empty());
        assert!(run.summary().is_none());
    }

    #[test]
    fn test_summary() {
        let run = SamplingRun::from_samples(
            42,
            Duration::from_millis(100),
            SystemTime::UNIX_EPOCH,
            vec![
                sample(0, 100, 10, 2, 0.5),
                sample(100, 300, 15, 4, 1.5),
                sample(200, 200, 30, 9, 1.0),
            ],
        );
        let summary = run.summary().unwrap();
        assert_eq!(summary.samples, 3);
        assert_eq!(summary.span, Duration::from_millis(200));
        assert_eq!(summary.peak_resident_kb, 300);
        assert_eq!(summary.peak_virtual_kb, 1200);
        assert!((summary.mean_cpu_percent - 100.0).abs() < 1e-9);
        assert!((summary.peak_cpu_percent - 150.0).abs() < 1e-9);
        assert_eq!(summary.read_ops, 20);
        assert_eq!(summary.write_ops, 7);
    }
}
