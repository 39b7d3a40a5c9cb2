//! Live process metrics from the operating system.
//!
//! Memory, CPU and liveness come from `sysinfo`. Operation counts come from
//! `/proc/<pid>/io`, which only Linux provides.

use sysinfo::{Pid, Process, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System};
use tracing::{debug, trace};

use super::{IoCounters, MemoryInfo, MetricError, MetricsProvider, ProcessMetrics};

/// Provider backed by the host operating system.
#[derive(Debug, Default)]
pub struct SystemProvider;

impl SystemProvider {
    pub fn new() -> Self {
        Self
    }
}

impl MetricsProvider for SystemProvider {
    type Process = SystemProcess;

    fn attach(&mut self, pid: u32) -> Result<SystemProcess, MetricError> {
        let mut process = SystemProcess {
            pid,
            sys_pid: Pid::from_u32(pid),
            system: System::new(),
        };

        if !process.refresh() {
            return Err(MetricError::Gone(pid));
        }
        check_access(read_io_counters(pid))?;

        debug!(pid, "attached to process");
        Ok(process)
    }
}

/// Handle to a live process.
///
/// Memory and CPU readings reflect the state captured by the most recent
/// [`is_running`](ProcessMetrics::is_running) call, so CPU usage is averaged
/// over the time between two liveness checks.
#[derive(Debug)]
pub struct SystemProcess {
    pid: u32,
    sys_pid: Pid,
    system: System,
}

impl SystemProcess {
    /// Refresh the cached process state. Returns false if the process is gone.
    fn refresh(&mut self) -> bool {
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[self.sys_pid]),
            true,
            ProcessRefreshKind::nothing().with_memory().with_cpu(),
        );
        self.system.process(self.sys_pid).is_some()
    }

    fn process(&self) -> Result<&Process, MetricError> {
        self.system
            .process(self.sys_pid)
            .ok_or(MetricError::Gone(self.pid))
    }
}

impl ProcessMetrics for SystemProcess {
    fn is_running(&mut self) -> Result<bool, MetricError> {
        if !self.refresh() {
            return Ok(false);
        }
        let status = self.process()?.status();
        trace!(pid = self.pid, ?status, "refreshed process");
        Ok(!matches!(status, ProcessStatus::Zombie | ProcessStatus::Dead))
    }

    fn memory_info(&mut self) -> Result<MemoryInfo, MetricError> {
        let process = self.process()?;
        Ok(MemoryInfo {
            rss: process.memory(),
            vms: process.virtual_memory(),
        })
    }

    fn io_counters(&mut self) -> Result<IoCounters, MetricError> {
        read_io_counters(self.pid)
    }

    fn cpu_percent(&mut self) -> Result<f64, MetricError> {
        Ok(f64::from(self.process()?.cpu_usage()))
    }
}

/// Fail attach if the process is visible but its counters are not readable.
///
/// Other I/O errors, including `Unsupported`, surface on the first sample.
fn check_access(probe: Result<IoCounters, MetricError>) -> Result<(), MetricError> {
    match probe {
        Err(err @ (MetricError::AccessDenied(_) | MetricError::Gone(_))) => Err(err),
        _ => Ok(()),
    }
}

#[cfg(target_os = "linux")]
fn read_io_counters(pid: u32) -> Result<IoCounters, MetricError> {
    use std::io::ErrorKind;

    let path = format!("/proc/{pid}/io");
    let content = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => MetricError::Gone(pid),
        ErrorKind::PermissionDenied => MetricError::AccessDenied(path.clone()),
        _ => MetricError::Io(e),
    })?;
    parse_proc_io(&content)
}

#[cfg(not(target_os = "linux"))]
fn read_io_counters(_pid: u32) -> Result<IoCounters, MetricError> {
    Err(MetricError::Unsupported("per-process I/O operation counts"))
}

/// Parse the `syscr`/`syscw` fields of a `/proc/<pid>/io` file.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_proc_io(content: &str) -> Result<IoCounters, MetricError> {
    let mut read_ops = None;
    let mut write_ops = None;

    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let slot = match key.trim() {
            "syscr" => &mut read_ops,
            "syscw" => &mut write_ops,
            _ => continue,
        };
        let parsed = value
            .trim()
            .parse::<u64>()
            .map_err(|e| MetricError::Malformed(format!("{}: {}", key.trim(), e)))?;
        *slot = Some(parsed);
    }

    match (read_ops, write_ops) {
        (Some(read_ops), Some(write_ops)) => Ok(IoCounters {
            read_ops,
            write_ops,
        }),
        _ => Err(MetricError::Malformed(
            "missing syscr/syscw in /proc io file".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROC_IO: &str = "rchar: 323934931\n\
                           wchar: 323929600\n\
                           syscr: 632687\n\
                           syscw: 632675\n\
                           read_bytes: 0\n\
                           write_bytes: 323932160\n\
                           cancelled_write_bytes: 0\n";

    #[test]
    fn test_parse_proc_io() {
        let counters = parse_proc_io(PROC_IO).unwrap();
        assert_eq!(counters.read_ops, 632687);
        assert_eq!(counters.write_ops, 632675);
    }

    #[test]
    fn test_parse_proc_io_missing_fields() {
        let err = parse_proc_io("rchar: 1\nwchar: 2\n").unwrap_err();
        assert!(matches!(err, MetricError::Malformed(_)));
    }

    #[test]
    fn test_parse_proc_io_bad_number() {
        let err = parse_proc_io("syscr: lots\nsyscw: 1\n").unwrap_err();
        assert!(matches!(err, MetricError::Malformed(_)));
    }

    #[test]
    fn test_check_access() {
        let denied = check_access(Err(MetricError::AccessDenied("/proc/1/io".to_string())));
        assert!(matches!(denied, Err(MetricError::AccessDenied(_))));
        assert!(matches!(check_access(Err(MetricError::Gone(5))), Err(MetricError::Gone(5))));

        assert!(check_access(Ok(IoCounters::default())).is_ok());
        assert!(check_access(Err(MetricError::Unsupported("io"))).is_ok());
        assert!(check_access(Err(MetricError::Malformed("x".to_string()))).is_ok());
    }

    #[test]
    fn test_attach_to_self() {
        let mut provider = SystemProvider::new();
        let mut process = provider.attach(std::process::id()).unwrap();
        assert!(process.is_running().unwrap());
        let memory = process.memory_info().unwrap();
        assert!(memory.rss > 0);
        assert!(memory.vms >= memory.rss);
        assert!(process.cpu_percent().unwrap() >= 0.0);
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_io_counters_of_self() {
        let mut provider = SystemProvider::new();
        let mut process = provider.attach(std::process::id()).unwrap();
        assert!(process.io_counters().is_ok());
    }

    #[test]
    fn test_attach_missing_process() {
        let mut provider = SystemProvider::new();
        // Above the kernel's default pid_max.
        let err = provider.attach(u32::MAX - 1).unwrap_err();
        assert!(matches!(err, MetricError::Gone(_)));
    }
}
