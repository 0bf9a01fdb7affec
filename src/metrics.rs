//! # System Metrics
//!
//! CPU and memory utilisation come from `sysinfo`. Disk usage comes from
//! statvfs(3) on the configured mount point and excludes root-reserved blocks
//! from the total, matching `df`. The temperature is read from a sysfs thermal
//! zone file holding millidegrees Celsius.
//!
//! CPU usage is a delta between two refreshes, so the first reading after
//! construction covers the time since [`SysinfoMetrics::new`].

use crate::providers::{ProviderError, SystemMetrics};
use std::fs;
use std::path::{Path, PathBuf};
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

/// sysinfo-backed implementation of [`SystemMetrics`]
pub struct SysinfoMetrics {
    system: System,
    disk_mount_point: PathBuf,
    thermal_path: PathBuf,
}

impl SysinfoMetrics {
    pub fn new(disk_mount_point: PathBuf, thermal_path: PathBuf) -> Self {
        let system = System::new_with_specifics(
            RefreshKind::new()
                .with_cpu(CpuRefreshKind::new().with_cpu_usage())
                .with_memory(MemoryRefreshKind::new().with_ram()),
        );
        Self {
            system,
            disk_mount_point,
            thermal_path,
        }
    }
}

impl SystemMetrics for SysinfoMetrics {
    fn cpu_percent(&mut self) -> Result<f64, ProviderError> {
        self.system.refresh_cpu_usage();
        if self.system.cpus().is_empty() {
            return Err(ProviderError::Unavailable("cpu usage".to_string()));
        }
        Ok(f64::from(self.system.global_cpu_usage()))
    }

    fn memory_percent(&mut self) -> Result<f64, ProviderError> {
        self.system.refresh_memory();
        used_percent(self.system.used_memory(), self.system.total_memory())
            .ok_or_else(|| ProviderError::Unavailable("memory usage".to_string()))
    }

    fn disk_percent(&mut self) -> Result<f64, ProviderError> {
        let usage = filesystem_usage(&self.disk_mount_point)?;
        usage.used_percent().ok_or_else(|| {
            ProviderError::Unavailable(format!(
                "disk usage for {}",
                self.disk_mount_point.display()
            ))
        })
    }

    fn temperature_celsius(&mut self) -> Result<f64, ProviderError> {
        read_thermal_zone(&self.thermal_path)
    }
}

fn used_percent(used: u64, total: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some(used as f64 / total as f64 * 100.0)
}

/// Block counts of one filesystem, in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilesystemUsage {
    pub total: u64,
    pub free: u64,
    /// Free space available to unprivileged users
    pub available: u64,
}

impl FilesystemUsage {
    /// `used / (used + available)` with `used = total - free`, so blocks
    /// reserved for root count neither as used nor as available
    pub fn used_percent(&self) -> Option<f64> {
        let used = self.total.saturating_sub(self.free);
        used_percent(used, used.saturating_add(self.available))
    }
}

#[cfg(unix)]
fn filesystem_usage(mount_point: &Path) -> Result<FilesystemUsage, ProviderError> {
    let stats = nix::sys::statvfs::statvfs(mount_point).map_err(|errno| ProviderError::Io {
        what: "disk usage",
        source: errno.into(),
    })?;
    let fragment = stats.fragment_size() as u64;
    Ok(FilesystemUsage {
        total: (stats.blocks() as u64).saturating_mul(fragment),
        free: (stats.blocks_free() as u64).saturating_mul(fragment),
        available: (stats.blocks_available() as u64).saturating_mul(fragment),
    })
}

#[cfg(not(unix))]
fn filesystem_usage(mount_point: &Path) -> Result<FilesystemUsage, ProviderError> {
    Err(ProviderError::Unavailable(format!(
        "disk usage for {}",
        mount_point.display()
    )))
}

/// Read a sysfs thermal zone file and convert millidegrees to degrees Celsius
pub fn read_thermal_zone(path: &Path) -> Result<f64, ProviderError> {
    let raw = fs::read_to_string(path).map_err(|source| ProviderError::Io {
        what: "temperature",
        source,
    })?;
    parse_millidegrees(&raw)
}

/// Parse a raw thermal reading such as `"48312\n"` into `48.312`
pub fn parse_millidegrees(raw: &str) -> Result<f64, ProviderError> {
    let millidegrees: f64 = raw.trim().parse().map_err(|_| ProviderError::Parse {
        what: "temperature",
        raw: raw.to_string(),
    })?;
    Ok(millidegrees / 1000.0)
}
