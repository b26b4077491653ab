//! Server configuration loaded from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::utils::{ConverterError, ConverterResult};

pub const ENV_BIND_ADDR: &str = "CONVERTER_BIND_ADDR";
pub const ENV_STORAGE_ROOT: &str = "CONVERTER_STORAGE_ROOT";
pub const ENV_RETENTION_SECS: &str = "CONVERTER_RETENTION_SECS";
pub const ENV_WORKERS: &str = "CONVERTER_WORKERS";
pub const ENV_MAX_UPLOAD_MB: &str = "CONVERTER_MAX_UPLOAD_MB";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_RETENTION: Duration = Duration::from_secs(60 * 60);
const DEFAULT_MAX_UPLOAD_MB: usize = 256;

/// Runtime settings for the converter service.
///
/// `storage_root` is the single authority for where batch directories live;
/// the allocator, the download containment check and the startup sweep all
/// read it from here.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub storage_root: PathBuf,
    /// How long a batch directory survives before deletion
    pub retention: Duration,
    /// Maximum number of files converted at the same time
    pub workers: usize,
    /// Request body limit for uploads
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            storage_root: default_storage_root(),
            retention: DEFAULT_RETENTION,
            workers: default_workers(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> ConverterResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Unset or blank keys fall back to defaults; malformed values are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConverterResult<Self> {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = value(ENV_BIND_ADDR)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConverterError::config(format!("{ENV_BIND_ADDR}: {e}")))?;

        let storage_root = value(ENV_STORAGE_ROOT)
            .map(PathBuf::from)
            .unwrap_or_else(default_storage_root);

        let retention = match value(ENV_RETENTION_SECS) {
            Some(raw) => Duration::from_secs(parse_positive(ENV_RETENTION_SECS, &raw)? as u64),
            None => DEFAULT_RETENTION,
        };

        let workers = match value(ENV_WORKERS) {
            Some(raw) => parse_positive(ENV_WORKERS, &raw)?,
            None => default_workers(),
        };

        let max_upload_mb = match value(ENV_MAX_UPLOAD_MB) {
            Some(raw) => parse_positive(ENV_MAX_UPLOAD_MB, &raw)?,
            None => DEFAULT_MAX_UPLOAD_MB,
        };

        Ok(Self {
            bind_addr,
            storage_root,
            retention,
            workers,
            max_upload_bytes: max_upload_mb.saturating_mul(1024 * 1024),
        })
    }
}

fn parse_positive(key: &str, raw: &str) -> ConverterResult<usize> {
    match raw.parse::<usize>() {
        Ok(0) => Err(ConverterError::config(format!("{key} must be greater than 0"))),
        Ok(n) => Ok(n),
        Err(e) => Err(ConverterError::config(format!("{key}: {e}"))),
    }
}

fn default_storage_root() -> PathBuf {
    std::env::temp_dir().join("image-converter")
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() -> anyhow::Result<()> {
        let config = ServerConfig::from_lookup(lookup(&[]))?;
        assert_eq!(config.bind_addr, SocketAddr::from(([127, 0, 0, 1], 3000)));
        assert_eq!(config.retention, Duration::from_secs(3600));
        assert_eq!(config.max_upload_bytes, 256 * 1024 * 1024);
        assert!(config.workers >= 1);
        assert!(config.storage_root.ends_with("image-converter"));
        Ok(())
    }

    #[test]
    fn overrides_are_parsed() -> anyhow::Result<()> {
        let config = ServerConfig::from_lookup(lookup(&[
            (ENV_BIND_ADDR, "0.0.0.0:8080"),
            (ENV_STORAGE_ROOT, "/var/lib/converter"),
            (ENV_RETENTION_SECS, "120"),
            (ENV_WORKERS, "3"),
            (ENV_MAX_UPLOAD_MB, " 16 "),
        ]))?;
        assert_eq!(config.bind_addr, SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert_eq!(config.storage_root, PathBuf::from("/var/lib/converter"));
        assert_eq!(config.retention, Duration::from_secs(120));
        assert_eq!(config.workers, 3);
        assert_eq!(config.max_upload_bytes, 16 * 1024 * 1024);
        Ok(())
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(ServerConfig::from_lookup(lookup(&[(ENV_WORKERS, "0")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[(ENV_RETENTION_SECS, "soon")])).is_err());
        assert!(matches!(
            ServerConfig::from_lookup(lookup(&[(ENV_BIND_ADDR, "nowhere")])),
            Err(ConverterError::Config(_))
        ));
    }
}
