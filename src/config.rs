//! Daemon configuration.
//!
//! All tunable parameters for the relay controller and forwarder.
//! Loaded from a JSON file at startup; the bearer token may live in a
//! separate plaintext file so the config itself can stay world-readable.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Core daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    // --- Safety policy ---
    /// Channels that must be present and fresh for the relay to be on.
    pub required_channels: BTreeSet<u32>,
    /// Minimum temperature (bridge units) on every required channel.
    pub control_threshold: i32,
    /// A reading older than this is treated as sensor silence.
    pub stale_horizon_hours: u32,

    // --- Occupancy ---
    /// Motion-triggered override window length.
    pub occupancy_hours: u32,

    // --- Forwarding ---
    /// Collector endpoint for the PUT of each reading.
    pub endpoint_url: String,
    /// Bearer token; usually supplied via the token file instead.
    pub auth_token: Option<String>,
    /// Upper bound on one delivery attempt.
    pub send_timeout_secs: u64,

    // --- Timing ---
    /// Periodic re-evaluation tick so staleness is noticed without traffic.
    /// 0 disables the tick.
    pub reevaluate_interval_secs: u64,

    // --- Storage ---
    /// Directory holding the reading log, snapshot, cursor and occupancy files.
    pub data_dir: PathBuf,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            required_channels: BTreeSet::from([1, 2]),
            control_threshold: 355,
            stale_horizon_hours: 3,
            occupancy_hours: 24,
            endpoint_url: "http://127.0.0.1:8080/readings".to_string(),
            auth_token: None,
            send_timeout_secs: 10,
            reevaluate_interval_secs: 300,
            data_dir: PathBuf::from("/var/lib/thermoguard"),
        }
    }
}

impl RelayConfig {
    /// Load from a JSON file, then overlay the sibling `token` file (if any)
    /// onto `auth_token`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&raw)?;
        config.validate().map_err(anyhow::Error::msg)?;

        let token_path = path.with_file_name("token");
        if let Ok(token) = fs::read_to_string(&token_path) {
            let token = token.trim();
            if !token.is_empty() {
                config.auth_token = Some(token.to_string());
            }
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if self.required_channels.is_empty() {
            return Err("required_channels must not be empty");
        }
        if self.stale_horizon_hours == 0 {
            return Err("stale_horizon_hours must be at least 1");
        }
        if self.occupancy_hours == 0 {
            return Err("occupancy_hours must be at least 1");
        }
        if self.send_timeout_secs == 0 {
            return Err("send_timeout_secs must be at least 1");
        }
        if self.endpoint_url.is_empty() {
            return Err("endpoint_url must not be empty");
        }
        Ok(())
    }

    // --- Durable file locations ---

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("readings.jsonl")
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join("latest.jsonl")
    }

    pub fn cursor_path(&self) -> PathBuf {
        self.data_dir.join("forward.cursor")
    }

    pub fn occupancy_path(&self) -> PathBuf {
        self.data_dir.join("occupied.expiry")
    }
}
