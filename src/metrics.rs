//! System telemetry consumed by the `cpu`, `mem` and `ps` commands.

use std::time::Duration;

use sysinfo::System;

/// Snapshot of virtual memory usage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryUsage {
    pub percent: f32,
    pub used_bytes: u64,
    pub total_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
}

/// Source of CPU, memory and process figures.
pub trait SystemMetrics {
    /// CPU utilization in percent (0-100), sampled over a short fixed interval.
    fn cpu_percent(&mut self) -> f32;

    fn virtual_memory(&mut self) -> MemoryUsage;

    /// Running processes; the order is whatever the source yields.
    fn process_list(&mut self) -> Vec<ProcessInfo>;
}

/// Interval between the two CPU samples.
pub const CPU_SAMPLE_INTERVAL: Duration = Duration::from_millis(200);

/// [`SystemMetrics`] backed by the `sysinfo` crate.
pub struct SysinfoMetrics {
    sys: System,
}

impl SysinfoMetrics {
    pub fn new() -> Self {
        Self { sys: System::new() }
    }
}

impl Default for SysinfoMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemMetrics for SysinfoMetrics {
    fn cpu_percent(&mut self) -> f32 {
        self.sys.refresh_cpu();
        std::thread::sleep(CPU_SAMPLE_INTERVAL.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL));
        self.sys.refresh_cpu();
        self.sys.global_cpu_info().cpu_usage()
    }

    fn virtual_memory(&mut self) -> MemoryUsage {
        self.sys.refresh_memory();
        let total_bytes = self.sys.total_memory();
        let used_bytes = self.sys.used_memory();
        let percent = if total_bytes == 0 {
            0.0
        } else {
            (used_bytes as f64 / total_bytes as f64 * 100.0) as f32
        };
        MemoryUsage {
            percent,
            used_bytes,
            total_bytes,
        }
    }

    fn process_list(&mut self) -> Vec<ProcessInfo> {
        self.sys.refresh_processes();
        let mut processes: Vec<ProcessInfo> = self
            .sys
            .processes()
            .iter()
            .map(|(pid, process)| ProcessInfo {
                pid: pid.as_u32(),
                name: process.name().to_string(),
            })
            .collect();
        // HashMap order changes between refreshes; pid order at least repeats.
        processes.sort_by_key(|p| p.pid);
        processes
    }
}
