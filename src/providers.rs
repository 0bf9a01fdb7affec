//! # Metric & Identity Providers
//!
//! Narrow capability traits for everything the renderer reads from the outside
//! world. The display manager only ever sees these traits, bundled in
//! [`Providers`], so production sources ([`crate::network`], [`crate::metrics`],
//! [`SystemClock`]) and the deterministic ones in `fakes` are
//! interchangeable.
//!
//! ## Failure Model
//! - **Network identity** never fails: absence is reported as a fallback string
//!   such as `"No eth0"`
//! - **Numeric metrics** return [`ProviderError`], which the renderer propagates
//!
//! Every call runs synchronously on the render path and must return promptly.

use chrono::{DateTime, Local};
use std::io;
use thiserror::Error;

/// Errors from numeric metric providers.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Reading the underlying source failed
    #[error("failed to read {what}: {source}")]
    Io {
        what: &'static str,
        #[source]
        source: io::Error,
    },

    /// The source returned something that is not a number
    #[error("failed to parse {what} from {raw:?}")]
    Parse { what: &'static str, raw: String },

    /// The system does not expose this metric
    #[error("{0} unavailable")]
    Unavailable(String),
}

/// Looks up the IPv4 address bound to a network interface.
pub trait NetworkChecker {
    /// First IPv4 address of `interface` in dotted-decimal form, or a fallback
    /// string (`"No <interface>"`, `"No IPv4"`, `"No IP"`) describing why there is none.
    fn ipv4_address(&self, interface: &str) -> String;
}

/// Live system utilisation readings.
pub trait SystemMetrics {
    /// Global CPU utilisation in percent (0-100)
    fn cpu_percent(&mut self) -> Result<f64, ProviderError>;

    /// Used memory in percent (0-100)
    fn memory_percent(&mut self) -> Result<f64, ProviderError>;

    /// Used space on the monitored filesystem in percent (0-100)
    fn disk_percent(&mut self) -> Result<f64, ProviderError>;

    /// SoC temperature in degrees Celsius
    fn temperature_celsius(&mut self) -> Result<f64, ProviderError>;
}

/// Source of the current local time.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

/// Wall clock backed by the operating system
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// The full set of capabilities the renderer and display manager depend on
pub struct Providers {
    pub network: Box<dyn NetworkChecker>,
    pub metrics: Box<dyn SystemMetrics>,
    pub clock: Box<dyn Clock>,
}

impl Providers {
    pub fn new(
        network: Box<dyn NetworkChecker>,
        metrics: Box<dyn SystemMetrics>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            network,
            metrics,
            clock,
        }
    }

    /// Production providers: getifaddrs, sysinfo/sysfs metrics and the system clock
    pub fn system(sources: &crate::config::SourceConfig) -> Self {
        Self::new(
            Box::new(crate::network::InterfaceAddrChecker),
            Box::new(crate::metrics::SysinfoMetrics::new(
                sources.disk_mount_point.clone(),
                sources.thermal_path.clone(),
            )),
            Box::new(SystemClock),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_close_to_now() {
        let before = Local::now();
        let reading = SystemClock.now();
        let after = Local::now();
        assert!(before <= reading && reading <= after);
    }

    #[test]
    fn test_provider_error_messages() {
        let err = ProviderError::Parse {
            what: "temperature",
            raw: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "failed to parse temperature from \"abc\"");

        let err = ProviderError::Unavailable("disk usage for /data".to_string());
        assert_eq!(err.to_string(), "disk usage for /data unavailable");
    }
}
