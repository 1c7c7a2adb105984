use serde::{Deserialize, Serialize};

use self::gateway::GatewayConfig;
use self::storage::StorageConfig;
use self::ui::UiConfig;

pub mod gateway;
pub mod storage;
pub mod ui;

#[derive(Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub storage: StorageConfig,
    pub ui: UiConfig,
}

impl Config {
    /// Build a config from the environment, falling back to code defaults.
    pub fn new() -> Self {
        Config {
            gateway: GatewayConfig::new(),
            storage: StorageConfig::new(),
            ui: UiConfig::new(),
        }
    }
}
