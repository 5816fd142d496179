//! Form state for the settings and source editors.
//!
//! Fields hold raw text exactly as typed. Moving values between a form and a
//! [`Settings`] or [`Source`] happens only through the functions here, so the
//! validation rules do not depend on the terminal widgets.

use crate::settings::{
    ConnectionType, DEFAULT_TIMEOUT, MAX_TIMEOUT, MIN_TIMEOUT, Settings, Source,
};
use std::net::Ipv4Addr;
use thiserror::Error;

/// Selector position that hides cameras from other networks.
pub const FILTERED_CAMERAS: usize = 0;
/// Selector position that shows every known camera.
pub const ALL_CAMERAS: usize = 1;

pub const SHOW_CAMERAS_OPTIONS: [&str; 2] = ["Filtered cameras", "All cameras"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutBounds {
    pub min: i64,
    pub max: i64,
    pub default: i64,
}

impl Default for TimeoutBounds {
    fn default() -> Self {
        Self {
            min: MIN_TIMEOUT,
            max: MAX_TIMEOUT,
            default: DEFAULT_TIMEOUT,
        }
    }
}

impl TimeoutBounds {
    #[must_use]
    pub const fn contains(&self, value: i64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    #[error("Please enter a camera name.")]
    NoCameraName,
    #[error("The scan timeout must be between {min} and {max} milliseconds.")]
    BadTimeout { min: i64, max: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("'{0}' is not a valid host name or address.")]
    BadAddress(String),
    #[error("'{0}' is not a multicast address (224.0.0.0 to 239.255.255.255).")]
    BadMulticastAddress(String),
    #[error("The port must be between 1 and 65535.")]
    BadPort,
    #[error("The {field} must be a whole number of 0 or more.")]
    BadNumber { field: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SettingsForm {
    pub camera_name: String,
    pub show_cameras: usize,
    pub scan_timeout: String,
}

impl SettingsForm {
    #[must_use]
    pub fn load(settings: &Settings) -> Self {
        Self {
            camera_name: settings.camera_name.clone(),
            show_cameras: if settings.show_all_cameras {
                ALL_CAMERAS
            } else {
                FILTERED_CAMERAS
            },
            scan_timeout: settings.scan_timeout.to_string(),
        }
    }

    #[must_use]
    pub const fn show_all_cameras(&self) -> bool {
        self.show_cameras == ALL_CAMERAS
    }

    pub fn toggle_show_cameras(&mut self) {
        self.show_cameras = if self.show_all_cameras() {
            FILTERED_CAMERAS
        } else {
            ALL_CAMERAS
        };
    }

    /// Reads the form into `settings` for a save. Checks run in field order
    /// and stop at the first failure; fields read before the failure stay
    /// written into `settings`.
    pub fn save_into(
        &self,
        settings: &mut Settings,
        bounds: TimeoutBounds,
    ) -> Result<(), SaveError> {
        settings.camera_name = self.camera_name.trim().to_owned();
        if settings.camera_name.is_empty() {
            return Err(SaveError::NoCameraName);
        }

        let timeout = self.scan_timeout.trim();
        settings.scan_timeout = if timeout.is_empty() {
            bounds.max.saturating_add(1)
        } else {
            timeout
                .parse::<i64>()
                .unwrap_or_else(|_| bounds.max.saturating_add(1))
        };
        if !bounds.contains(settings.scan_timeout) {
            return Err(SaveError::BadTimeout {
                min: bounds.min,
                max: bounds.max,
            });
        }

        settings.show_all_cameras = self.show_all_cameras();
        Ok(())
    }

    /// Best-effort copy of the form into `settings`; never fails.
    ///
    /// An empty timeout becomes `bounds.default` and nothing is range
    /// checked, unlike [`SettingsForm::save_into`].
    pub fn snapshot_into(&self, settings: &mut Settings, bounds: TimeoutBounds) {
        settings.camera_name = self.camera_name.trim().to_owned();
        settings.show_all_cameras = self.show_all_cameras();
        let timeout = self.scan_timeout.trim();
        if timeout.is_empty() {
            settings.scan_timeout = bounds.default;
        } else if let Ok(value) = timeout.parse::<i64>() {
            settings.scan_timeout = value;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceForm {
    pub connection_type: ConnectionType,
    pub address: String,
    pub port: String,
    pub width: String,
    pub height: String,
    pub fps: String,
    pub bitrate: String,
}

impl SourceForm {
    #[must_use]
    pub fn load(source: &Source) -> Self {
        Self {
            connection_type: source.connection_type,
            address: source.address.clone(),
            port: source.port.to_string(),
            width: optional_number_text(source.width),
            height: optional_number_text(source.height),
            fps: optional_number_text(source.fps),
            bitrate: optional_number_text(source.bitrate),
        }
    }

    /// Builds the edited source. The connection type always comes from the
    /// source the form was loaded from.
    pub fn extract(&self) -> Result<Source, SourceError> {
        let address = self.address.trim().to_owned();
        match self.connection_type {
            ConnectionType::RawMulticast => {
                let is_multicast = address
                    .parse::<Ipv4Addr>()
                    .is_ok_and(|ip| ip.is_multicast());
                if !is_multicast {
                    return Err(SourceError::BadMulticastAddress(address));
                }
            }
            ConnectionType::RawTcpIp | ConnectionType::RawHttp => {
                if !address.is_empty() && url::Host::parse(&address).is_err() {
                    return Err(SourceError::BadAddress(address));
                }
            }
        }

        let port = match self.port.trim().parse::<u16>() {
            Ok(port) if port > 0 => port,
            _ => return Err(SourceError::BadPort),
        };

        Ok(Source {
            connection_type: self.connection_type,
            address,
            port,
            width: parse_optional_number(&self.width, "width")?,
            height: parse_optional_number(&self.height, "height")?,
            fps: parse_optional_number(&self.fps, "frame rate")?,
            bitrate: parse_optional_number(&self.bitrate, "bitrate")?,
        })
    }
}

fn optional_number_text(value: u32) -> String {
    if value == 0 {
        String::new()
    } else {
        value.to_string()
    }
}

fn parse_optional_number(value: &str, field: &'static str) -> Result<u32, SourceError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(0);
    }
    value
        .parse::<u32>()
        .map_err(|_| SourceError::BadNumber { field })
}
