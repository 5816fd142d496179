use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Smallest accepted camera scan timeout, in milliseconds.
pub const MIN_TIMEOUT: i64 = 100;
/// Largest accepted camera scan timeout, in milliseconds.
pub const MAX_TIMEOUT: i64 = 5000;
/// Scan timeout used when nothing else is known.
pub const DEFAULT_TIMEOUT: i64 = 500;

pub const DEFAULT_CAMERA_NAME: &str = "Camera";
pub const DEFAULT_TCP_IP_PORT: u16 = 5001;
pub const DEFAULT_HTTP_PORT: u16 = 8000;
pub const DEFAULT_MULTICAST_ADDRESS: &str = "239.255.0.1";
pub const DEFAULT_MULTICAST_PORT: u16 = 5001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionType {
    RawTcpIp,
    RawHttp,
    RawMulticast,
}

impl ConnectionType {
    pub const ALL: [Self; 3] = [Self::RawTcpIp, Self::RawHttp, Self::RawMulticast];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::RawTcpIp => "TCP/IP",
            Self::RawHttp => "HTTP",
            Self::RawMulticast => "Multicast",
        }
    }

    const fn scheme(self) -> &'static str {
        match self {
            Self::RawTcpIp => "tcp",
            Self::RawHttp => "http",
            Self::RawMulticast => "udp",
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RawTcpIp => "RawTcpIp",
            Self::RawHttp => "RawHttp",
            Self::RawMulticast => "RawMulticast",
        };
        f.write_str(name)
    }
}

/// One network endpoint a camera stream can be read from.
///
/// Numeric stream parameters use 0 for "whatever the camera sends".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub connection_type: ConnectionType,
    #[serde(default)]
    pub address: String,
    pub port: u16,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub fps: u32,
    #[serde(default)]
    pub bitrate: u32,
}

impl Source {
    #[must_use]
    pub fn new(connection_type: ConnectionType) -> Self {
        let (address, port) = match connection_type {
            ConnectionType::RawTcpIp => (String::new(), DEFAULT_TCP_IP_PORT),
            ConnectionType::RawHttp => (String::new(), DEFAULT_HTTP_PORT),
            ConnectionType::RawMulticast => {
                (DEFAULT_MULTICAST_ADDRESS.to_owned(), DEFAULT_MULTICAST_PORT)
            }
        };
        Self {
            connection_type,
            address,
            port,
            width: 0,
            height: 0,
            fps: 0,
            bitrate: 0,
        }
    }

    /// Endpoint URL for this source. `fallback_host` stands in for an empty
    /// address, which means "the camera's own address".
    #[must_use]
    pub fn endpoint_url(&self, fallback_host: &str) -> Option<Url> {
        let host = if self.address.trim().is_empty() {
            fallback_host
        } else {
            self.address.trim()
        };
        let raw = match self.connection_type {
            ConnectionType::RawMulticast => format!("udp://@{host}:{}", self.port),
            other => format!("{}://{host}:{}", other.scheme(), self.port),
        };
        Url::parse(&raw).ok()
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: address={:?} port={} size={}x{} fps={} bitrate={}",
            self.connection_type,
            self.address,
            self.port,
            self.width,
            self.height,
            self.fps,
            self.bitrate
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_camera_name")]
    pub camera_name: String,
    #[serde(default)]
    pub show_all_cameras: bool,
    #[serde(default = "default_scan_timeout")]
    pub scan_timeout: i64,
    #[serde(default = "default_tcp_ip_source")]
    pub raw_tcp_ip_source: Source,
    #[serde(default = "default_http_source")]
    pub raw_http_source: Source,
    #[serde(default = "default_multicast_source")]
    pub raw_multicast_source: Source,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            camera_name: DEFAULT_CAMERA_NAME.to_owned(),
            show_all_cameras: false,
            scan_timeout: DEFAULT_TIMEOUT,
            raw_tcp_ip_source: default_tcp_ip_source(),
            raw_http_source: default_http_source(),
            raw_multicast_source: default_multicast_source(),
        }
    }
}

impl Settings {
    #[must_use]
    pub fn source(&self, connection_type: ConnectionType) -> &Source {
        match connection_type {
            ConnectionType::RawTcpIp => &self.raw_tcp_ip_source,
            ConnectionType::RawHttp => &self.raw_http_source,
            ConnectionType::RawMulticast => &self.raw_multicast_source,
        }
    }

    /// Switches `source` into the slot named by its own connection type.
    pub fn replace_source(&mut self, source: Source) {
        let slot = match source.connection_type {
            ConnectionType::RawTcpIp => &mut self.raw_tcp_ip_source,
            ConnectionType::RawHttp => &mut self.raw_http_source,
            ConnectionType::RawMulticast => &mut self.raw_multicast_source,
        };
        *slot = source;
    }

    /// Puts each slot back under its own connection type. Files edited by hand
    /// can carry a mismatched tag; the slot position wins.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.raw_tcp_ip_source.connection_type = ConnectionType::RawTcpIp;
        self.raw_http_source.connection_type = ConnectionType::RawHttp;
        self.raw_multicast_source.connection_type = ConnectionType::RawMulticast;
        self
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cameraName={:?} showAllCameras={} scanTimeout={} [{}] [{}] [{}]",
            self.camera_name,
            self.show_all_cameras,
            self.scan_timeout,
            self.raw_tcp_ip_source,
            self.raw_http_source,
            self.raw_multicast_source
        )
    }
}

fn default_camera_name() -> String {
    DEFAULT_CAMERA_NAME.to_owned()
}

const fn default_scan_timeout() -> i64 {
    DEFAULT_TIMEOUT
}

fn default_tcp_ip_source() -> Source {
    Source::new(ConnectionType::RawTcpIp)
}

fn default_http_source() -> Source {
    Source::new(ConnectionType::RawHttp)
}

fn default_multicast_source() -> Source {
    Source::new(ConnectionType::RawMulticast)
}

#[cfg(test)]
mod tests {
    use super::{ConnectionType, DEFAULT_TIMEOUT, Settings, Source};

    #[test]
    fn defaults_hold_one_source_per_connection_type() {
        let settings = Settings::default();
        for connection_type in ConnectionType::ALL {
            assert_eq!(settings.source(connection_type).connection_type, connection_type);
        }
        assert_eq!(settings.scan_timeout, DEFAULT_TIMEOUT);
        assert!(!settings.show_all_cameras);
    }

    #[test]
    fn replace_source_only_touches_matching_slot() {
        let mut settings = Settings::default();
        let before = settings.clone();
        let mut edited = Source::new(ConnectionType::RawHttp);
        edited.address = "10.0.0.7".to_owned();
        edited.port = 8080;

        settings.replace_source(edited.clone());

        assert_eq!(settings.raw_http_source, edited);
        assert_eq!(settings.raw_tcp_ip_source, before.raw_tcp_ip_source);
        assert_eq!(settings.raw_multicast_source, before.raw_multicast_source);
    }

    #[test]
    fn json_uses_camel_case_keys_and_fills_missing_fields() {
        let parsed: Settings =
            serde_json::from_str(r#"{"cameraName":"Porch","showAllCameras":true}"#)
                .expect("settings should parse");
        assert_eq!(parsed.camera_name, "Porch");
        assert!(parsed.show_all_cameras);
        assert_eq!(parsed.scan_timeout, DEFAULT_TIMEOUT);
        assert_eq!(parsed.raw_multicast_source, Source::new(ConnectionType::RawMulticast));

        let encoded = serde_json::to_string(&parsed).expect("settings should encode");
        assert!(encoded.contains("\"rawTcpIpSource\""));
        assert!(encoded.contains("\"connectionType\":\"RawHttp\""));
    }

    #[test]
    fn empty_object_parses_as_defaults() {
        let parsed: Settings = serde_json::from_str("{}").expect("settings should parse");
        assert_eq!(parsed, Settings::default());
    }

    #[test]
    fn unknown_connection_type_is_rejected() {
        let raw = r#"{"connectionType":"RawRtsp","port":554}"#;
        assert!(serde_json::from_str::<Source>(raw).is_err());
    }

    #[test]
    fn normalized_restores_slot_tags() {
        let mut settings = Settings::default();
        settings.raw_http_source.connection_type = ConnectionType::RawTcpIp;
        let settings = settings.normalized();
        assert_eq!(settings.raw_http_source.connection_type, ConnectionType::RawHttp);
    }

    #[test]
    fn endpoint_url_uses_fallback_host_for_empty_address() {
        let source = Source::new(ConnectionType::RawTcpIp);
        let url = source.endpoint_url("raspberrypi.local").expect("valid url");
        assert_eq!(url.as_str(), "tcp://raspberrypi.local:5001");

        let multicast = Source::new(ConnectionType::RawMulticast);
        let url = multicast.endpoint_url("unused").expect("valid url");
        assert_eq!(url.scheme(), "udp");
        assert_eq!(url.port(), Some(5001));
    }
}
