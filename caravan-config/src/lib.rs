use std::collections::HashSet;
use std::time::Duration;

use caravan_roster::{Bus, BusId};
use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

#[derive(Deserialize, Clone, Debug)]
pub struct SheetConfig {
    /// Google Sheets document id the roster is synchronized from.
    pub sheet_id: String,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

impl SheetConfig {
    /// CSV export endpoint for the configured sheet.
    pub fn export_url(&self) -> String {
        format!(
            "https://docs.google.com/spreadsheets/d/{}/gviz/tq?tqx=out:csv",
            self.sheet_id
        )
    }

    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Sync policy knobs. Scheduling itself is the host's job; the service
/// only ever refreshes when asked.
#[derive(Deserialize, Clone, Debug)]
pub struct SyncConfig {
    #[serde(default = "default_true")]
    pub auto_sync: bool,
    #[serde(default = "default_sync_interval")]
    pub interval_minutes: u32,
    #[serde(default = "default_true")]
    pub notify_controllers: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            auto_sync: true,
            interval_minutes: default_sync_interval(),
            notify_controllers: true,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct BusConfig {
    pub id: u32,
    pub name: String,
    pub capacity: u32,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub sheet: SheetConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default = "default_buses")]
    pub buses: Vec<BusConfig>,
}

impl Config {
    /// The configured fleet as roster buses. Bus ids must be positive and
    /// unique; the fleet is fixed for the lifetime of a session.
    pub fn fleet(&self) -> Result<Vec<Bus>, ConfigError> {
        let mut seen = HashSet::new();
        self.buses
            .iter()
            .map(|bus| {
                if bus.id == 0 {
                    return Err(ConfigError::InvalidFleet(format!(
                        "bus \"{}\" has id 0; ids must be positive",
                        bus.name
                    )));
                }
                if !seen.insert(bus.id) {
                    return Err(ConfigError::InvalidFleet(format!(
                        "duplicate bus id {}",
                        bus.id
                    )));
                }
                Ok(Bus {
                    id: BusId(bus.id),
                    name: bus.name.clone(),
                    capacity: bus.capacity,
                })
            })
            .collect()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Figment(#[from] figment::Error),
    #[error("invalid bus fleet: {0}")]
    InvalidFleet(String),
}

pub fn get_config() -> Result<Config, ConfigError> {
    Ok(Figment::new()
        .merge(Toml::file("caravan.toml"))
        .merge(Env::prefixed("CARAVAN_"))
        .extract()?)
}

const fn default_true() -> bool {
    true
}

const fn default_fetch_timeout() -> u64 {
    30
}

const fn default_sync_interval() -> u32 {
    30
}

fn default_buses() -> Vec<BusConfig> {
    (1..=4)
        .map(|id| BusConfig {
            id,
            name: format!("Bus {id}"),
            capacity: 50,
        })
        .collect()
}
