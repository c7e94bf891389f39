use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub simulation: SimulationConfig,
    pub creature: CreatureConfig,
    pub persistence: PersistenceConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Wall-clock time between two live ticks.
    pub tick_interval_ms: u64,
    /// Game days (ticks) that pass per real hour while the process is down.
    pub game_days_per_real_hour: f64,
    pub snapshot_interval_ticks: u64,
    pub action_bar_slots: usize,
    /// How many recent event messages the session keeps for the view.
    pub event_log_len: usize,
}

/// What to create when no save file exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatureConfig {
    pub species: String,
    pub name: String,
    /// JSON species catalog; the built-in catalog is used when unset.
    pub catalog_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    pub enabled: bool,
    pub save_path: String,
    pub autosave_interval_seconds: u64,
    pub keep_backups: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub enabled: bool,
    pub address: String,
    pub port: u16,
    pub update_rate_hz: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig {
                tick_interval_ms: 7_200_000, // one game day every two hours
                game_days_per_real_hour: 0.5,
                snapshot_interval_ticks: 1,
                action_bar_slots: 4,
                event_log_len: 32,
            },
            creature: CreatureConfig {
                species: "cat".to_string(),
                name: "Tama".to_string(),
                catalog_path: None,
            },
            persistence: PersistenceConfig {
                enabled: true,
                save_path: "data/creature.save".to_string(),
                autosave_interval_seconds: 300,
                keep_backups: 5,
            },
            server: ServerConfig {
                enabled: true,
                address: "127.0.0.1".to_string(),
                port: 8080,
                update_rate_hz: 2,
            },
        }
    }
}

impl Config {
    pub fn load_from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
