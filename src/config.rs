//! # Configuration Management
//!
//! This module handles loading, parsing and validating the screen layout from a
//! TOML file (`config.toml` by default). The file is read once at startup and
//! never written back. Any problem with it is fatal.

use chrono::format::{Item, StrftimeItems};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Time pattern used when a `time` component does not set `time_format`
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S";

/// Errors raised while loading or validating the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File missing or unreadable
    #[error("error reading config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML syntax or schema mismatch
    #[error("error parsing config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Rotation needs at least one screen
    #[error("config must declare at least one screen")]
    NoScreens,

    #[error("screen_duration must be greater than zero")]
    ZeroScreenDuration,

    #[error("{field} must be an hour between 0 and 23, got {value}")]
    HourOutOfRange { field: &'static str, value: u32 },

    #[error("screen {screen:?} has an invalid time_format {format:?}")]
    InvalidTimeFormat { screen: String, format: String },

    /// Component position or bar width outside the drawable coordinate range
    #[error(
        "screen {screen:?}: component {field} {value} is outside {}..={}",
        i16::MIN,
        i16::MAX
    )]
    GeometryOutOfRange {
        screen: String,
        field: &'static str,
        value: i32,
    },
}

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Seconds between screen switches
    pub screen_duration: u64,
    /// Seconds between invert toggles, 0 to disable
    #[serde(default)]
    pub invert_duration: u64,
    /// Hour (0-23) at which the display switches to bright mode
    pub day_start_hour: u32,
    /// Hour (0-23) at which the display switches to dim mode
    pub night_start_hour: u32,
    /// Interface whose IPv4 address the `ip` component shows
    pub network_interface: String,
    /// Output hardware settings
    #[serde(default)]
    pub display: DisplayConfig,
    /// Where metric providers read from
    #[serde(default)]
    pub sources: SourceConfig,
    /// Screens in rotation order
    pub screens: Vec<Screen>,
}

/// I2C wiring of the OLED panel
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// I2C bus device node
    #[serde(default = "default_i2c_bus")]
    pub i2c_bus: String,
    /// 7-bit I2C address of the SSD1306 controller
    #[serde(default = "default_i2c_address")]
    pub i2c_address: u8,
}

/// Data source locations for the metric providers
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Mount point reported by `disk` components
    #[serde(default = "default_disk_mount_point")]
    pub disk_mount_point: PathBuf,
    /// Sysfs file holding the temperature in millidegrees Celsius
    #[serde(default = "default_thermal_path")]
    pub thermal_path: PathBuf,
}

/// A single virtual screen
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Screen {
    /// Only used in log messages
    pub name: String,
    /// Drawn in order; later components paint over earlier ones
    #[serde(default)]
    pub components: Vec<Component>,
}

/// One labeled value or gauge at a fixed position
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Component {
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    pub x: i32,
    pub y: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(default)]
    pub show_bar: bool,
    #[serde(default)]
    pub bar_width: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_format: Option<String>,
}

/// Kinds of component the renderer knows how to draw.
///
/// Any other `type` string in the file becomes [`ComponentKind::Unknown`],
/// which renders nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Time,
    Ip,
    Cpu,
    Memory,
    Disk,
    Temperature,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComponentKind::Time => "time",
            ComponentKind::Ip => "ip",
            ComponentKind::Cpu => "cpu",
            ComponentKind::Memory => "memory",
            ComponentKind::Disk => "disk",
            ComponentKind::Temperature => "temperature",
            ComponentKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

impl Component {
    /// The strftime pattern for a `time` component, falling back to 24-hour `HH:MM:SS`
    pub fn time_format(&self) -> &str {
        match self.time_format.as_deref() {
            Some(format) if !format.is_empty() => format,
            _ => DEFAULT_TIME_FORMAT,
        }
    }
}

fn default_i2c_bus() -> String {
    "/dev/i2c-1".to_string()
}

fn default_i2c_address() -> u8 {
    0x3C
}

fn default_disk_mount_point() -> PathBuf {
    PathBuf::from("/")
}

fn default_thermal_path() -> PathBuf {
    PathBuf::from("/sys/class/thermal/thermal_zone0/temp")
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            i2c_bus: default_i2c_bus(),
            i2c_address: default_i2c_address(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            disk_mount_point: default_disk_mount_point(),
            thermal_path: default_thermal_path(),
        }
    }
}

/// True when every item of `format` is a recognised strftime specifier or literal
pub fn is_valid_time_format(format: &str) -> bool {
    StrftimeItems::new(format).all(|item| !matches!(item, Item::Error))
}

impl Config {
    /// Load and validate configuration from the specified path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        info!(
            "Loaded configuration from {} with {} screen(s)",
            path.display(),
            config.screens.len()
        );
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the scheduler relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.screens.is_empty() {
            return Err(ConfigError::NoScreens);
        }
        if self.screen_duration == 0 {
            return Err(ConfigError::ZeroScreenDuration);
        }
        for (field, value) in [
            ("day_start_hour", self.day_start_hour),
            ("night_start_hour", self.night_start_hour),
        ] {
            if value > 23 {
                return Err(ConfigError::HourOutOfRange { field, value });
            }
        }

        for screen in &self.screens {
            for component in &screen.components {
                for (field, value) in [
                    ("x", component.x),
                    ("y", component.y),
                    ("bar_width", component.bar_width),
                ] {
                    if i16::try_from(value).is_err() {
                        return Err(ConfigError::GeometryOutOfRange {
                            screen: screen.name.clone(),
                            field,
                            value,
                        });
                    }
                }
                match component.kind {
                    ComponentKind::Time if !is_valid_time_format(component.time_format()) => {
                        return Err(ConfigError::InvalidTimeFormat {
                            screen: screen.name.clone(),
                            format: component.time_format().to_string(),
                        });
                    }
                    ComponentKind::Unknown => {
                        warn!(
                            "Screen {:?}: unknown component type at ({}, {}) will not be drawn",
                            screen.name, component.x, component.y
                        );
                    }
                    _ => {}
                }
            }
        }

        Ok(())
    }
}
