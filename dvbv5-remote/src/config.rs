//! Configuration loading for dvbv5-remote.
//!
//! Searches for configuration in the following order:
//! 1. `dvbv5-remote.ini` (or the file named by `DVBV5_REMOTE_CONFIG`)
//! 2. Environment variables (`DVBV5_REMOTE_*`)
//! 3. Default values

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, error, info};

use dvbv5_protocol::RING_BUFFER_SIZE;

/// Default INI file name, looked up in the current directory.
pub const INI_FILE_NAME: &str = "dvbv5-remote.ini";

const DEFAULT_ADDR: &str = "127.0.0.1:12345";
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub server_addr: String,
    pub connect_timeout: Duration,
    /// Deadline for a single request; `None` waits until response or disconnect.
    pub call_timeout: Option<Duration>,
    /// Per-handle ring buffer capacity in bytes.
    pub ring_buffer_size: usize,
    pub tcp_nodelay: bool,
    /// Mirror connection lifecycle logs to this file.
    pub log_file: Option<PathBuf>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            server_addr: DEFAULT_ADDR.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            call_timeout: None,
            ring_buffer_size: RING_BUFFER_SIZE,
            tcp_nodelay: true,
            log_file: None,
        }
    }
}

impl ConnectionConfig {
    pub fn new(server_addr: impl Into<String>) -> Self {
        Self {
            server_addr: server_addr.into(),
            ..Default::default()
        }
    }
}

/// Load configuration from the INI file, else the environment.
pub fn load_config() -> ConnectionConfig {
    if let Some(ini_path) = find_ini_file() {
        info!("Loading configuration from {:?}", ini_path);
        if let Some(config) = load_from_ini(&ini_path) {
            return config;
        }
    }

    load_from_env()
}

fn find_ini_file() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("DVBV5_REMOTE_CONFIG") {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    let ini_path = std::env::current_dir().ok()?.join(INI_FILE_NAME);
    ini_path.exists().then_some(ini_path)
}

/// Simple INI section parser.
fn parse_ini(content: &str) -> HashMap<String, HashMap<String, String>> {
    let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
    let mut current_section = String::new();

    for line in content.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            current_section = line[1..line.len() - 1].trim().to_string();
            sections.entry(current_section.clone()).or_default();
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            sections
                .entry(current_section.clone())
                .or_default()
                .insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    sections
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Milliseconds; 0 disables the call deadline.
fn parse_call_timeout(value: &str) -> Option<Option<Duration>> {
    let ms: u64 = value.parse().ok()?;
    Some((ms > 0).then(|| Duration::from_millis(ms)))
}

/// Build a config from `[Server]` keys, falling back to defaults.
fn config_from_section(section: &HashMap<String, String>) -> ConnectionConfig {
    let defaults = ConnectionConfig::default();

    let server_addr = section
        .get("Address")
        .or_else(|| section.get("Server"))
        .cloned()
        .unwrap_or(defaults.server_addr);

    let connect_timeout = section
        .get("ConnectTimeout")
        .and_then(|s| s.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(defaults.connect_timeout);

    let call_timeout = section
        .get("CallTimeout")
        .and_then(|s| parse_call_timeout(s))
        .unwrap_or(defaults.call_timeout);

    let ring_buffer_size = section
        .get("RingBufferSize")
        .and_then(|s| s.parse().ok())
        .unwrap_or(defaults.ring_buffer_size);

    let tcp_nodelay = section
        .get("NoDelay")
        .and_then(|s| parse_bool(s))
        .unwrap_or(defaults.tcp_nodelay);

    let log_file = section
        .get("LogFile")
        .filter(|s| !s.is_empty())
        .map(PathBuf::from);

    ConnectionConfig {
        server_addr,
        connect_timeout,
        call_timeout,
        ring_buffer_size,
        tcp_nodelay,
        log_file,
    }
}

/// Load configuration from an INI file.
pub fn load_from_ini(path: &Path) -> Option<ConnectionConfig> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to read INI file: {}", e);
            return None;
        }
    };

    let sections = parse_ini(&content);
    let config = config_from_section(sections.get("Server")?);
    debug!("Configuration loaded: server={}", config.server_addr);
    Some(config)
}

/// Load configuration from environment variables.
pub fn load_from_env() -> ConnectionConfig {
    let mut section = HashMap::new();
    for (var, key) in [
        ("DVBV5_REMOTE_SERVER", "Address"),
        ("DVBV5_REMOTE_CONNECT_TIMEOUT", "ConnectTimeout"),
        ("DVBV5_REMOTE_CALL_TIMEOUT", "CallTimeout"),
        ("DVBV5_REMOTE_RING_BUFFER_SIZE", "RingBufferSize"),
        ("DVBV5_REMOTE_NODELAY", "NoDelay"),
        ("DVBV5_REMOTE_LOG_FILE", "LogFile"),
    ] {
        if let Ok(value) = std::env::var(var) {
            section.insert(key.to_string(), value);
        }
    }

    let config = config_from_section(&section);
    debug!("Using environment/default config: server={}", config.server_addr);
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_env() {
        let config = load_from_env();
        assert!(!config.server_addr.is_empty());
    }

    #[test]
    fn test_parse_ini() {
        let content = r#"
; Comment
[Server]
Address = 192.168.1.1:12345
CallTimeout = 2500

[Other]
Key = Value
"#;
        let sections = parse_ini(content);

        assert!(sections.contains_key("Server"));
        let server = sections.get("Server").unwrap();
        assert_eq!(server.get("Address").unwrap(), "192.168.1.1:12345");
        assert_eq!(server.get("CallTimeout").unwrap(), "2500");
    }

    #[test]
    fn test_config_from_section() {
        let sections = parse_ini(
            "[Server]\nAddress=10.0.0.5:12345\nConnectTimeout=3000\nCallTimeout=0\nNoDelay=off\nLogFile=remote.log\n",
        );
        let config = config_from_section(sections.get("Server").unwrap());

        assert_eq!(config.server_addr, "10.0.0.5:12345");
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.call_timeout, None);
        assert!(!config.tcp_nodelay);
        assert_eq!(config.log_file, Some(PathBuf::from("remote.log")));
        assert_eq!(config.ring_buffer_size, RING_BUFFER_SIZE);
    }

    #[test]
    fn test_bad_values_fall_back() {
        let sections = parse_ini("[Server]\nCallTimeout=soon\nNoDelay=maybe\n");
        let config = config_from_section(sections.get("Server").unwrap());
        assert_eq!(config, ConnectionConfig::default());
    }

    #[test]
    fn test_load_from_missing_ini() {
        assert!(load_from_ini(Path::new("/nonexistent/dvbv5-remote.ini")).is_none());
    }
}
