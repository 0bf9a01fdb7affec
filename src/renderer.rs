//! # Component Rendering
//!
//! Maps one configured [`Component`] to primitive draw calls. Dispatch is a
//! single exhaustive `match` over [`ComponentKind`]:
//!
//! | Kind          | Text                        | Bar fraction     |
//! |---------------|-----------------------------|------------------|
//! | `time`        | `[label: ]<formatted now>`  | none             |
//! | `ip`          | `<label>: <address>`        | none             |
//! | `cpu`         | `<label>: <value>%`         | `value / 100`    |
//! | `memory`      | `<label>: <value>%`         | `value / 100`    |
//! | `disk`        | `<label>: <value>%`         | `value / 100`    |
//! | `temperature` | `<label>: <value> C`        | `celsius / 100`  |
//! | unknown       | nothing                     | none             |
//!
//! Values are printed with one decimal place. Bars are drawn only when
//! `show_bar` is set, at `(x, y + 5)` with height [`BAR_HEIGHT`].

use crate::config::{Component, ComponentKind};
use crate::drawing::{add_label, draw_bar};
use crate::providers::{ProviderError, Providers};
use crate::{BAR_HEIGHT, BAR_OFFSET_Y};
use core::convert::Infallible;
use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};
use std::fmt::Write;
use thiserror::Error;

/// Errors that abort rendering of a single component.
#[derive(Error, Debug)]
pub enum RenderError {
    /// A provider could not supply the component's value
    #[error("error rendering {kind} component: {source}")]
    Component {
        kind: ComponentKind,
        #[source]
        source: ProviderError,
    },

    /// The time pattern contains an unsupported specifier
    #[error("invalid time format {0:?}")]
    TimeFormat(String),
}

/// Draw `component` onto `target`, fetching its value from `providers`.
///
/// `network_interface` is the interface the `ip` kind reports on.
pub fn render_component<D>(
    target: &mut D,
    component: &Component,
    network_interface: &str,
    providers: &mut Providers,
) -> Result<(), RenderError>
where
    D: DrawTarget<Color = BinaryColor, Error = Infallible>,
{
    let (x, y) = (component.x, component.y);
    let label = component.label.as_str();

    match component.kind {
        ComponentKind::Time => {
            let format = component.time_format();
            let mut text = String::new();
            if !label.is_empty() {
                text.push_str(label);
                text.push_str(": ");
            }
            write!(text, "{}", providers.clock.now().format(format))
                .map_err(|_| RenderError::TimeFormat(format.to_string()))?;
            draw_text(target, x, y, &text);
        }

        ComponentKind::Ip => {
            let address = providers.network.ipv4_address(network_interface);
            draw_text(target, x, y, &format!("{}: {}", label, address));
        }

        ComponentKind::Cpu => {
            let percent = fetch(component.kind, providers.metrics.cpu_percent())?;
            let text = format!("{}: {:.1}%", label, percent);
            draw_gauge(target, component, &text, percent / 100.0);
        }

        ComponentKind::Memory => {
            let percent = fetch(component.kind, providers.metrics.memory_percent())?;
            let text = format!("{}: {:.1}%", label, percent);
            draw_gauge(target, component, &text, percent / 100.0);
        }

        ComponentKind::Disk => {
            let percent = fetch(component.kind, providers.metrics.disk_percent())?;
            let text = format!("{}: {:.1}%", label, percent);
            draw_gauge(target, component, &text, percent / 100.0);
        }

        ComponentKind::Temperature => {
            let celsius = fetch(component.kind, providers.metrics.temperature_celsius())?;
            // Fill fraction is celsius/100, not a utilisation percentage
            let text = format!("{}: {:.1} C", label, celsius);
            draw_gauge(target, component, &text, celsius / 100.0);
        }

        ComponentKind::Unknown => {}
    }

    Ok(())
}

fn fetch(kind: ComponentKind, value: Result<f64, ProviderError>) -> Result<f64, RenderError> {
    value.map_err(|source| RenderError::Component { kind, source })
}

fn draw_text<D>(target: &mut D, x: i32, y: i32, text: &str)
where
    D: DrawTarget<Color = BinaryColor, Error = Infallible>,
{
    add_label(target, x, y, text).ok();
}

fn draw_gauge<D>(target: &mut D, component: &Component, text: &str, fraction: f64)
where
    D: DrawTarget<Color = BinaryColor, Error = Infallible>,
{
    draw_text(target, component.x, component.y, text);
    if component.show_bar {
        draw_bar(
            target,
            component.x,
            component.y.saturating_add(BAR_OFFSET_Y),
            component.bar_width,
            BAR_HEIGHT,
            fraction,
        )
        .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{FixedClock, ScriptedMetrics, StaticNetwork};
    use crate::framebuffer::FrameBuffer;
    use crate::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
    use chrono::{Local, TimeZone};
    use embedded_graphics::primitives::Rectangle;

    fn providers(metrics: ScriptedMetrics) -> Providers {
        let noon = Local.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        Providers::new(
            Box::new(StaticNetwork::with_address("eth0", "192.168.1.100")),
            Box::new(metrics),
            Box::new(FixedClock::new(noon)),
        )
    }

    fn component(kind: ComponentKind) -> Component {
        Component {
            kind,
            x: 5,
            y: 20,
            label: "L".to_string(),
            show_bar: false,
            bar_width: 0,
            time_format: None,
        }
    }

    fn rendered(component: &Component, metrics: ScriptedMetrics) -> FrameBuffer {
        let mut buffer = FrameBuffer::new(DISPLAY_WIDTH, DISPLAY_HEIGHT);
        let mut providers = providers(metrics);
        render_component(&mut buffer, component, "eth0", &mut providers).unwrap();
        buffer
    }

    /// Reference rendering of a plain text label
    fn label_only(text: &str) -> FrameBuffer {
        let mut buffer = FrameBuffer::new(DISPLAY_WIDTH, DISPLAY_HEIGHT);
        add_label(&mut buffer, 5, 20, text).unwrap();
        buffer
    }

    #[test]
    fn test_time_uses_label_prefix_and_format() {
        let mut time = component(ComponentKind::Time);
        time.label = "Now".to_string();
        time.time_format = Some("%H:%M".to_string());
        assert_eq!(rendered(&time, ScriptedMetrics::default()), label_only("Now: 12:00"));
    }

    #[test]
    fn test_time_without_label_has_no_prefix() {
        let mut time = component(ComponentKind::Time);
        time.label.clear();
        assert_eq!(rendered(&time, ScriptedMetrics::default()), label_only("12:00:00"));
    }

    #[test]
    fn test_invalid_time_format_is_an_error() {
        let mut time = component(ComponentKind::Time);
        time.time_format = Some("%H:%".to_string());
        let mut buffer = FrameBuffer::new(DISPLAY_WIDTH, DISPLAY_HEIGHT);
        let mut providers = providers(ScriptedMetrics::default());
        let result = render_component(&mut buffer, &time, "eth0", &mut providers);
        assert!(matches!(result, Err(RenderError::TimeFormat(_))));
    }

    #[test]
    fn test_ip_label() {
        let mut ip = component(ComponentKind::Ip);
        ip.label = "IP".to_string();
        assert_eq!(rendered(&ip, ScriptedMetrics::default()), label_only("IP: 192.168.1.100"));
    }

    #[test]
    fn test_ip_fallback_is_rendered() {
        let mut ip = component(ComponentKind::Ip);
        ip.label = "IP".to_string();
        let mut buffer = FrameBuffer::new(DISPLAY_WIDTH, DISPLAY_HEIGHT);
        let mut providers = providers(ScriptedMetrics::default());
        render_component(&mut buffer, &ip, "wlan0", &mut providers).unwrap();
        assert_eq!(buffer, label_only("IP: No wlan0"));
    }

    #[test]
    fn test_gauge_text_formats() {
        let metrics = ScriptedMetrics {
            cpu: Some(12.34),
            memory: Some(50.0),
            disk: Some(99.96),
            temperature: Some(48.312),
        };
        let cases = [
            (ComponentKind::Cpu, "L: 12.3%"),
            (ComponentKind::Memory, "L: 50.0%"),
            (ComponentKind::Disk, "L: 100.0%"),
            (ComponentKind::Temperature, "L: 48.3 C"),
        ];
        for (kind, text) in cases {
            assert_eq!(rendered(&component(kind), metrics.clone()), label_only(text), "{kind}");
        }
    }

    #[test]
    fn test_gauge_bar_below_label() {
        let metrics = ScriptedMetrics {
            cpu: Some(50.0),
            ..ScriptedMetrics::default()
        };
        let mut cpu = component(ComponentKind::Cpu);
        cpu.show_bar = true;
        cpu.bar_width = 50;
        let buffer = rendered(&cpu, metrics);

        let mut expected = label_only("L: 50.0%");
        draw_bar(&mut expected, 5, 25, 50, BAR_HEIGHT, 0.5).unwrap();
        assert_eq!(buffer, expected);
    }

    #[test]
    fn test_temperature_bar_uses_celsius_over_100() {
        let metrics = ScriptedMetrics {
            temperature: Some(40.0),
            ..ScriptedMetrics::default()
        };
        let mut temperature = component(ComponentKind::Temperature);
        temperature.show_bar = true;
        temperature.bar_width = 52;
        let buffer = rendered(&temperature, metrics);

        // 50 interior columns * 0.4 = 20 filled columns starting at x=6
        let bar_interior = Rectangle::new(Point::new(6, 26), Size::new(51, 6));
        assert_eq!(buffer.lit_pixels_in(&bar_interior), 20 * 6);
    }

    #[test]
    fn test_huge_bar_width_is_clipped() {
        let metrics = ScriptedMetrics {
            cpu: Some(50.0),
            ..ScriptedMetrics::default()
        };
        let mut cpu = component(ComponentKind::Cpu);
        cpu.show_bar = true;
        cpu.bar_width = i32::MAX;
        let buffer = rendered(&cpu, metrics);

        // Bar rows 26..=31 are filled from x=6 to the panel edge
        let bar_interior = Rectangle::new(Point::new(6, 26), Size::new(122, 6));
        assert_eq!(buffer.lit_pixels_in(&bar_interior), 122 * 6);
    }

    #[test]
    fn test_unknown_kind_draws_nothing() {
        let unknown = component(ComponentKind::Unknown);
        let buffer = rendered(&unknown, ScriptedMetrics::failing());
        assert_eq!(buffer.lit_pixels(), 0);
    }

    #[test]
    fn test_provider_failure_is_labeled() {
        let mut buffer = FrameBuffer::new(DISPLAY_WIDTH, DISPLAY_HEIGHT);
        let mut providers = providers(ScriptedMetrics::failing());

        for kind in [
            ComponentKind::Cpu,
            ComponentKind::Memory,
            ComponentKind::Disk,
            ComponentKind::Temperature,
        ] {
            let err = render_component(&mut buffer, &component(kind), "eth0", &mut providers)
                .unwrap_err();
            assert!(matches!(err, RenderError::Component { kind: k, .. } if k == kind));
            assert!(err.to_string().starts_with(&format!("error rendering {kind} component")));
        }
        assert_eq!(buffer.lit_pixels(), 0);
    }
}
