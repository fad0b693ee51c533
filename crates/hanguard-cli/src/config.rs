//! Gateway configuration file.
//!
//! A single JSON document, read once at startup:
//!
//! ```json
//! {
//!     "serial_port": "/dev/ttyUSB0",
//!     "database_path": "/var/lib/hanguard/hanguard.db",
//!     "allow_seconds": 3,
//!     "hello_interval_secs": 600
//! }
//! ```
//!
//! Only the serial port and database path are mandatory; the timing fields
//! fall back to the bus defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use hanguard_core::constants::{DEFAULT_ALLOW_SECONDS, HELLO_INTERVAL_SECS};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Serial device the door bus hangs off, e.g. `/dev/ttyUSB0`.
    pub serial_port: String,

    /// SQLite rights store.
    pub database_path: PathBuf,

    /// Door-open duration sent with a grant.
    #[serde(default = "default_allow_seconds")]
    pub allow_seconds: u8,

    /// Seconds between broadcast hellos.
    #[serde(default = "default_hello_interval")]
    pub hello_interval_secs: u64,
}

fn default_allow_seconds() -> u8 {
    DEFAULT_ALLOW_SECONDS
}

fn default_hello_interval() -> u64 {
    HELLO_INTERVAL_SECS
}

impl GatewayConfig {
    /// Load and validate a config file.
    ///
    /// # Errors
    /// Fails if the file cannot be read, is not valid JSON for this schema,
    /// or carries out-of-range timing values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: GatewayConfig = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.allow_seconds > 0,
            "allow_seconds must be at least 1 (0 would grant and instantly re-lock)"
        );
        anyhow::ensure!(
            self.hello_interval_secs > 0,
            "hello_interval_secs must be at least 1"
        );
        Ok(())
    }
}
