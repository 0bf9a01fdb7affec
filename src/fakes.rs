//! Deterministic providers and a recording output device.
//!
//! These stand in for the network, metrics, clock and OLED panel so the
//! renderer and display manager can be exercised without hardware. Handles are
//! cheap to clone and share state, so a test can keep one copy while the
//! manager owns another.

use crate::device::{DeviceError, DisplayDevice};
use crate::framebuffer::FrameBuffer;
use crate::network::select_ipv4;
use crate::providers::{Clock, NetworkChecker, ProviderError, SystemMetrics};
use chrono::{DateTime, Local};
use embedded_graphics::{prelude::Point, primitives::Rectangle};
use std::cell::{Cell, RefCell};
use std::net::Ipv4Addr;
use std::rc::Rc;

/// Clock that reports a settable instant
#[derive(Clone, Debug)]
pub struct FixedClock {
    now: Rc<Cell<DateTime<Local>>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            now: Rc::new(Cell::new(now)),
        }
    }

    /// Move every clone of this clock to `now`
    pub fn set(&self, now: DateTime<Local>) {
        self.now.set(now);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.now.get()
    }
}

/// Network checker over a fixed interface table
#[derive(Clone, Debug, Default)]
pub struct StaticNetwork {
    interfaces: Vec<(String, Option<Ipv4Addr>)>,
}

impl StaticNetwork {
    /// One interface with one address. An `address` that is not dotted-decimal
    /// IPv4 leaves the interface without one.
    pub fn with_address(interface: &str, address: &str) -> Self {
        Self::default().interface(interface, address.parse().ok())
    }

    /// Add an interface, with or without an IPv4 address
    pub fn interface(mut self, name: &str, address: Option<Ipv4Addr>) -> Self {
        self.interfaces.push((name.to_string(), address));
        self
    }
}

impl NetworkChecker for StaticNetwork {
    fn ipv4_address(&self, interface: &str) -> String {
        select_ipv4(
            interface,
            self.interfaces.iter().map(|(name, address)| (name.as_str(), *address)),
        )
    }
}

/// Metrics with fixed values; `None` makes that metric fail
#[derive(Clone, Debug, Default)]
pub struct ScriptedMetrics {
    pub cpu: Option<f64>,
    pub memory: Option<f64>,
    pub disk: Option<f64>,
    pub temperature: Option<f64>,
}

impl ScriptedMetrics {
    /// Every metric fails
    pub fn failing() -> Self {
        Self::default()
    }

    /// Every metric succeeds with a plausible reading
    pub fn healthy() -> Self {
        Self {
            cpu: Some(12.5),
            memory: Some(41.0),
            disk: Some(63.2),
            temperature: Some(47.8),
        }
    }

    fn reading(value: Option<f64>, what: &str) -> Result<f64, ProviderError> {
        value.ok_or_else(|| ProviderError::Unavailable(format!("scripted {}", what)))
    }
}

impl SystemMetrics for ScriptedMetrics {
    fn cpu_percent(&mut self) -> Result<f64, ProviderError> {
        Self::reading(self.cpu, "cpu usage")
    }

    fn memory_percent(&mut self) -> Result<f64, ProviderError> {
        Self::reading(self.memory, "memory usage")
    }

    fn disk_percent(&mut self) -> Result<f64, ProviderError> {
        Self::reading(self.disk, "disk usage")
    }

    fn temperature_celsius(&mut self) -> Result<f64, ProviderError> {
        Self::reading(self.temperature, "temperature")
    }
}

/// One command received by a [`RecordingDevice`]
#[derive(Clone, Debug, PartialEq)]
pub enum DeviceCall {
    SetContrast(u8),
    SetInverted(bool),
    DrawFrame {
        bounds: Rectangle,
        origin: Point,
        frame: FrameBuffer,
    },
    Shutdown,
}

/// Output device that records every command it accepts
#[derive(Clone, Debug, Default)]
pub struct RecordingDevice {
    calls: Rc<RefCell<Vec<DeviceCall>>>,
    draw_attempts: Rc<Cell<usize>>,
    fail_on_draw: Option<usize>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the `n`th `draw_frame` call (1-based) with a bus error
    pub fn failing_on_draw(n: usize) -> Self {
        Self {
            fail_on_draw: Some(n),
            ..Self::default()
        }
    }

    /// Snapshot of accepted commands, oldest first
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.calls.borrow().clone()
    }

    /// Frames accepted so far, oldest first
    pub fn frames(&self) -> Vec<FrameBuffer> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                DeviceCall::DrawFrame { frame, .. } => Some(frame.clone()),
                _ => None,
            })
            .collect()
    }

    /// Values passed to `set_inverted`, oldest first
    pub fn inversions(&self) -> Vec<bool> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                DeviceCall::SetInverted(inverted) => Some(*inverted),
                _ => None,
            })
            .collect()
    }

    /// Values passed to `set_contrast`, oldest first
    pub fn contrasts(&self) -> Vec<u8> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                DeviceCall::SetContrast(level) => Some(*level),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: DeviceCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl DisplayDevice for RecordingDevice {
    fn set_contrast(&mut self, level: u8) -> Result<(), DeviceError> {
        self.record(DeviceCall::SetContrast(level));
        Ok(())
    }

    fn set_inverted(&mut self, inverted: bool) -> Result<(), DeviceError> {
        self.record(DeviceCall::SetInverted(inverted));
        Ok(())
    }

    fn draw_frame(
        &mut self,
        bounds: Rectangle,
        frame: &FrameBuffer,
        origin: Point,
    ) -> Result<(), DeviceError> {
        let attempt = self.draw_attempts.get() + 1;
        self.draw_attempts.set(attempt);
        if self.fail_on_draw == Some(attempt) {
            return Err(DeviceError::Bus(format!("scripted failure on draw {}", attempt)));
        }
        self.record(DeviceCall::DrawFrame {
            bounds,
            origin,
            frame: frame.clone(),
        });
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), DeviceError> {
        self.record(DeviceCall::Shutdown);
        Ok(())
    }
}
