//! `network.conf` loading and environment-tunable defaults.
//!
//! `network.conf` failures are fatal (`AgentError::Config`); the tunables in
//! [`StoreTunables`] and [`SinkTunables`] follow this codebase's established
//! `env::var(...).ok().and_then(|v| v.parse().ok()).unwrap_or(default)` shape
//! so they can be nudged in the field without a rebuild.

use std::path::Path;

use serde::Deserialize;

use crate::error::AgentError;

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    pub hostname: String,
    pub port: u16,
}

impl NetworkConfig {
    pub fn load(path: &Path) -> Result<Self, AgentError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AgentError::Config(format!("reading {}: {e}", path.display())))?;
        serde_json::from_str(&text)
            .map_err(|e| AgentError::Config(format!("parsing {}: {e}", path.display())))
    }

    pub fn base_url(&self) -> String {
        format!("https://{}:{}", self.hostname, self.port)
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Fingerprint store reportability thresholds (§4.2).
#[derive(Debug, Clone, Copy)]
pub struct StoreTunables {
    /// BTBR/BTLE-Adv: minimum observed duration (seconds) before a fingerprint reports.
    pub seen_for: i64,
    /// BTLE: minimum packet count before a fingerprint reports.
    pub seen_threshold: u64,
}

impl Default for StoreTunables {
    fn default() -> Self {
        Self {
            seen_for: env_or("BT_SEEN_FOR_SECS", 60),
            seen_threshold: env_or("BT_SEEN_THRESHOLD", 5),
        }
    }
}

/// HTTP sink back-off tunables (§4.5).
#[derive(Debug, Clone, Copy)]
pub struct SinkTunables {
    pub fail_threshold: u32,
    pub delay_secs: u64,
    /// Development default: disable TLS certificate verification.
    pub tls_insecure: bool,
}

impl Default for SinkTunables {
    fn default() -> Self {
        Self {
            fail_threshold: env_or("BT_SINK_FAIL_THRESHOLD", 5),
            delay_secs: env_or("BT_SINK_DELAY_SECS", 10),
            tls_insecure: env_or("BT_SINK_TLS_INSECURE", true),
        }
    }
}

/// Location reporter interval (§4.6).
#[derive(Debug, Clone, Copy)]
pub struct LocationTunables {
    pub interval_secs: u64,
}

impl Default for LocationTunables {
    fn default() -> Self {
        Self {
            interval_secs: env_or("BT_LOCATION_INTERVAL_SECS", 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_path(label: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!(
            "network-conf-test-{label}-{}-{}.json",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ))
    }

    #[test]
    fn loads_valid_config() {
        let path = unique_path("valid");
        std::fs::write(&path, r#"{"hostname": "ingest.example", "port": 8443}"#).unwrap();
        let cfg = NetworkConfig::load(&path).unwrap();
        assert_eq!(cfg.hostname, "ingest.example");
        assert_eq!(cfg.port, 8443);
        assert_eq!(cfg.base_url(), "https://ingest.example:8443");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn malformed_json_is_fatal_config_error() {
        let path = unique_path("malformed");
        std::fs::write(&path, "not json").unwrap();
        let err = NetworkConfig::load(&path).unwrap_err();
        assert!(matches!(err, AgentError::Config(_)));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_is_fatal_config_error() {
        let err = NetworkConfig::load(Path::new("/nonexistent/network.conf")).unwrap_err();
        assert!(matches!(err, AgentError::Config(_)));
    }
}
