//! # Scenario Tests
//!
//! Whole-pipeline checks: configuration text in, device commands out. All
//! providers and the panel are the deterministic fakes.

use crate::drawing::add_label;
use crate::fakes::{DeviceCall, FixedClock, RecordingDevice, ScriptedMetrics, StaticNetwork};
use crate::renderer::render_component;
use crate::{
    Config, DisplayManager, FrameBuffer, ManagerError, Providers, RenderError, Tick,
    BRIGHT_CONTRAST, DISPLAY_HEIGHT, DISPLAY_WIDTH,
};
use chrono::{DateTime, Local, TimeZone};
use embedded_graphics::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

const STATUS_CONFIG: &str = r#"
screen_duration = 5
invert_duration = 0
day_start_hour = 7
night_start_hour = 18
network_interface = "eth0"

[[screens]]
name = "status"

[[screens.components]]
type = "time"
x = 5
y = 12
time_format = "%H:%M:%S"

[[screens.components]]
type = "ip"
x = 5
y = 30
label = "IP"
"#;

fn noon() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 5, 20, 12, 34, 56).unwrap()
}

fn providers(network: StaticNetwork, metrics: ScriptedMetrics) -> Providers {
    Providers::new(
        Box::new(network),
        Box::new(metrics),
        Box::new(FixedClock::new(noon())),
    )
}

fn single_screen(components: &str) -> Config {
    Config::from_toml_str(&format!(
        r#"
screen_duration = 5
day_start_hour = 7
night_start_hour = 18
network_interface = "eth0"

[[screens]]
name = "only"
{components}
"#
    ))
    .unwrap()
}

/// A time and an IP component land in separate regions of one flushed frame.
#[test]
fn time_and_ip_render_into_one_frame() {
    let config = Config::from_toml_str(STATUS_CONFIG).unwrap();
    let device = RecordingDevice::new();
    let network = StaticNetwork::with_address("eth0", "192.168.1.100");
    let mut manager = DisplayManager::new(
        config.clone(),
        providers(network.clone(), ScriptedMetrics::default()),
        device.clone(),
    )
    .unwrap();

    manager.handle(Tick::Update).unwrap();

    let frames = device.frames();
    assert_eq!(frames.len(), 1, "expected exactly one flush");

    // Each component on its own, for comparison with the composed frame
    let mut regions = Vec::new();
    let mut lit = 0;
    for component in &config.screens[0].components {
        let mut alone = FrameBuffer::new(DISPLAY_WIDTH, DISPLAY_HEIGHT);
        let mut providers = providers(network.clone(), ScriptedMetrics::default());
        render_component(&mut alone, component, "eth0", &mut providers).unwrap();
        lit += alone.lit_pixels();
        regions.push(alone.lit_region().expect("component drew nothing"));
    }

    let time_bottom = regions[0].bottom_right().unwrap().y;
    assert!(
        time_bottom < regions[1].top_left.y,
        "time region {:?} overlaps ip region {:?}",
        regions[0],
        regions[1]
    );
    assert_eq!(frames[0].lit_pixels(), lit);

    let mut expected = FrameBuffer::new(DISPLAY_WIDTH, DISPLAY_HEIGHT);
    add_label(&mut expected, 5, 12, "12:34:56").unwrap();
    add_label(&mut expected, 5, 30, "IP: 192.168.1.100").unwrap();
    assert_eq!(frames[0], expected);
}

/// Unrecognised component types load fine and leave the frame blank.
#[test]
fn unknown_component_type_draws_nothing() {
    let config = single_screen(
        r#"
[[screens.components]]
type = "weather"
x = 5
y = 20
label = "Rain"
"#,
    );
    let device = RecordingDevice::new();
    let mut manager = DisplayManager::new(
        config,
        providers(StaticNetwork::default(), ScriptedMetrics::failing()),
        device.clone(),
    )
    .unwrap();

    manager.handle(Tick::Update).unwrap();

    let frames = device.frames();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].lit_pixels(), 0);
}

/// A failing CPU reading aborts the frame before anything is sent.
#[test]
fn cpu_failure_sends_no_frame() {
    let config = single_screen(
        r#"
[[screens.components]]
type = "time"
x = 0
y = 12

[[screens.components]]
type = "cpu"
x = 0
y = 30
label = "CPU"
show_bar = true
bar_width = 100
"#,
    );
    let device = RecordingDevice::new();
    let mut manager = DisplayManager::new(
        config,
        providers(StaticNetwork::default(), ScriptedMetrics::failing()),
        device.clone(),
    )
    .unwrap();

    let err = manager.handle(Tick::Update).unwrap_err();

    assert!(matches!(err, ManagerError::Render(RenderError::Component { .. })));
    assert!(err.to_string().contains("cpu"));
    assert!(device.calls().is_empty());
}

/// An interface without an IPv4 address shows the fallback marker.
#[test]
fn ip_fallback_marker_is_shown() {
    let config = single_screen(
        r#"
[[screens.components]]
type = "ip"
x = 5
y = 30
label = "IP"
"#,
    );
    let device = RecordingDevice::new();
    let network = StaticNetwork::default().interface("eth0", None);
    let mut manager = DisplayManager::new(
        config,
        providers(network, ScriptedMetrics::default()),
        device.clone(),
    )
    .unwrap();

    manager.handle(Tick::Update).unwrap();

    let mut expected = FrameBuffer::new(DISPLAY_WIDTH, DISPLAY_HEIGHT);
    add_label(&mut expected, 5, 30, "IP: No IPv4").unwrap();
    assert_eq!(device.frames(), vec![expected]);
}

/// A configuration file on disk drives brightness, rendering and shutdown.
#[test]
fn config_file_end_to_end() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(STATUS_CONFIG.as_bytes()).unwrap();
    let config = Config::load_from_path(file.path()).unwrap();

    let device = RecordingDevice::new();
    let mut manager = DisplayManager::new(
        config,
        providers(
            StaticNetwork::with_address("eth0", "10.0.0.2"),
            ScriptedMetrics::healthy(),
        ),
        device.clone(),
    )
    .unwrap();

    manager.handle(Tick::Brightness).unwrap();
    manager.handle(Tick::Update).unwrap();
    manager.handle(Tick::ScreenSwitch).unwrap();
    manager.shutdown().unwrap();

    let calls = device.calls();
    assert_eq!(calls.len(), 4);
    assert_eq!(calls[0], DeviceCall::SetContrast(BRIGHT_CONTRAST));
    assert!(matches!(calls[1], DeviceCall::DrawFrame { origin, .. } if origin == Point::zero()));
    assert!(matches!(calls[2], DeviceCall::DrawFrame { .. }));
    assert_eq!(calls[3], DeviceCall::Shutdown);
    // One screen: switching wraps back to it
    assert_eq!(manager.current_screen(), 0);
}

/// Broken configuration never reaches the display.
#[test]
fn invalid_config_file_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    let contents = STATUS_CONFIG.replace("screen_duration = 5", "screen_duration = 0");
    file.write_all(contents.as_bytes()).unwrap();
    assert!(Config::load_from_path(file.path()).is_err());
}
