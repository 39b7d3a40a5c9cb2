//! Fixed-cadence sampling of a single process.

use std::time::{Duration, Instant, SystemTime};

use tracing::{debug, info, trace};

use crate::config::SamplerConfig;
use crate::data::duration::format_duration;
use crate::data::{Sample, SamplingRun};
use crate::error::{Error, Result};
use crate::source::{Metric, MetricError, MetricsProvider, ProcessMetrics};

/// Minimum number of samples a bounded window must allow.
pub const MIN_SAMPLES: u128 = 2;

/// Time source for the sampling loop.
pub trait Clock {
    fn now(&self) -> Instant;

    /// Block the calling thread for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Wall-clock time and real thread sleeps.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Polls a process at a fixed interval and collects a [`SamplingRun`].
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use pinfoplot::{Sampler, SamplerConfig, SystemProvider};
///
/// let config = SamplerConfig::new(1234, Duration::from_secs(10), Duration::from_millis(50))?;
/// let mut sampler = Sampler::new(SystemProvider::new());
/// let run = sampler.run(&config)?;
/// println!("collected {} samples", run.len());
/// # Ok::<(), pinfoplot::Error>(())
/// ```
#[derive(Debug)]
pub struct Sampler<P, C = SystemClock> {
    provider: P,
    clock: C,
}

impl<P: MetricsProvider> Sampler<P> {
    pub fn new(provider: P) -> Self {
        Self::with_clock(provider, SystemClock)
    }
}

impl<P: MetricsProvider, C: Clock> Sampler<P, C> {
    pub fn with_clock(provider: P, clock: C) -> Self {
        Self { provider, clock }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Sample the configured process until the window closes or it exits.
    ///
    /// A zero `duration` samples until the process exits. Any failed query
    /// aborts the run and discards the samples collected so far.
    pub fn run(&mut self, config: &SamplerConfig) -> Result<SamplingRun> {
        let SamplerConfig {
            pid,
            duration,
            interval,
        } = *config;

        let expected = expected_samples(duration, interval)?;

        let mut process = self
            .provider
            .attach(pid)
            .map_err(|e| Error::ProcessNotFound {
                pid,
                reason: e.to_string(),
            })?;

        let mut running = process.is_running().map_err(|e| Error::ProcessNotFound {
            pid,
            reason: e.to_string(),
        })?;
        if !running {
            return Err(Error::ProcessNotFound {
                pid,
                reason: "process is not running".to_string(),
            });
        }

        let start = self.clock.now();
        let mut run = SamplingRun::new(pid, interval, SystemTime::now(), expected);

        if duration.is_zero() {
            info!(pid, interval = %format_duration(interval), "sampling until process exits");
        } else {
            info!(
                pid,
                duration = %format_duration(duration),
                interval = %format_duration(interval),
                "sampling process"
            );
        }

        let mut elapsed = self.clock.now().saturating_duration_since(start);
        while running && (duration.is_zero() || elapsed <= duration) {
            let sample = take_sample(&mut process, pid, elapsed)?;
            trace!(pid, elapsed = ?sample.elapsed, ?sample, "sampled");
            run.push(sample);

            self.clock.sleep(interval);

            running = process.is_running().map_err(|source| Error::MetricQuery {
                pid,
                metric: Metric::Liveness,
                source,
            })?;
            elapsed = self.clock.now().saturating_duration_since(start);
        }

        if running {
            debug!(pid, samples = run.len(), "sampling window closed");
        } else {
            info!(pid, samples = run.len(), "process exited, sampling stopped");
        }

        Ok(run)
    }
}

/// Number of samples a bounded window allows, used as a capacity hint.
///
/// Fails if the interval is zero or the window allows fewer than
/// [`MIN_SAMPLES`]. A zero duration is unbounded and always accepted.
pub fn expected_samples(duration: Duration, interval: Duration) -> Result<usize> {
    if interval.is_zero() {
        return Err(Error::InvalidInterval);
    }
    if duration.is_zero() {
        return Ok(0);
    }

    let samples = duration.as_nanos() / interval.as_nanos();
    if samples < MIN_SAMPLES {
        return Err(Error::InsufficientSamples {
            duration,
            interval,
            samples,
        });
    }
    Ok(usize::try_from(samples).unwrap_or(usize::MAX))
}

/// Query all three metric families. A sample is all or nothing.
fn take_sample<M: ProcessMetrics>(process: &mut M, pid: u32, elapsed: Duration) -> Result<Sample> {
    let query = move |metric: Metric| {
        move |source: MetricError| Error::MetricQuery {
            pid,
            metric,
            source,
        }
    };

    let memory = process.memory_info().map_err(query(Metric::Memory))?;
    let io = process.io_counters().map_err(query(Metric::Io))?;
    let cpu = process.cpu_percent().map_err(query(Metric::Cpu))?;

    Ok(Sample {
        elapsed,
        resident_kb: memory.rss / 1024,
        virtual_kb: memory.vms / 1024,
        read_ops: io.read_ops,
        write_ops: io.write_ops,
        cpu_fraction: cpu / 100.0,
    })
}
