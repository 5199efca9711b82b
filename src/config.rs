use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaceTradersConfig {
    pub api: ApiConfig,
    pub timing: TimingConfig,
    pub engine: EngineConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Root of the v2 REST API
    pub base_url: String,
    /// Page size used when walking paginated lists (ships, waypoints)
    pub page_limit: u32,
    /// Append raw request/response pairs to this file when set
    pub request_log_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Sleep between ticks when no ship reported a ready time
    pub default_interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Surveys with a mineral fraction below this trigger a fresh survey (0.0 to 1.0)
    pub survey_quality_threshold: f64,
    /// Extraction stops once cargo occupancy reaches this fraction (0.0 to 1.0)
    pub cargo_fill_limit: f64,
    /// Cached surveys expiring sooner than this are always replaced
    pub survey_freshness_floor_seconds: i64,
    /// Materials never sold as surplus
    pub protected_materials: Vec<String>,
    /// Mount prefix that marks a ship as survey-capable
    pub surveyor_mount_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Ship/contract assignment state
    pub assignments_path: String,
    /// File holding the agent bearer token
    pub token_path: String,
}

impl Default for SpaceTradersConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: crate::API_BASE_URL.to_string(),
                page_limit: 20,
                request_log_path: None,
            },
            timing: TimingConfig {
                default_interval_seconds: 10,
            },
            engine: EngineConfig {
                survey_quality_threshold: 0.2,
                cargo_fill_limit: 0.85,
                survey_freshness_floor_seconds: 120,
                protected_materials: vec!["ANTIMATTER".to_string()],
                surveyor_mount_prefix: "MOUNT_SURVEYOR".to_string(),
            },
            storage: StorageConfig {
                assignments_path: "storage/assignments.json".to_string(),
                token_path: crate::AGENT_TOKEN_FILE.to_string(),
            },
        }
    }
}

impl TimingConfig {
    pub fn default_interval(&self) -> Duration {
        Duration::from_secs(self.default_interval_seconds)
    }
}

impl EngineConfig {
    pub fn survey_freshness_floor(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.survey_freshness_floor_seconds)
    }

    pub fn is_protected(&self, trade_symbol: &str) -> bool {
        self.protected_materials.iter().any(|m| m == trade_symbol)
    }
}

impl SpaceTradersConfig {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load_or_create(config_path: &str) -> Result<Self, ConfigError> {
        if Path::new(config_path).exists() {
            info!("📋 Loading configuration from {}", config_path);
            let config_str = fs::read_to_string(config_path)?;
            let config: SpaceTradersConfig = toml::from_str(&config_str)?;
            config.validate()?;
            Ok(config)
        } else {
            info!("📋 Creating default configuration at {}", config_path);
            let config = SpaceTradersConfig::default();
            config.save(config_path)?;
            info!("💡 Edit {} to customize engine behavior", config_path);
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self, config_path: &str) -> Result<(), ConfigError> {
        if let Some(parent) = Path::new(config_path).parent() {
            fs::create_dir_all(parent)?;
        }

        let config_str = toml::to_string_pretty(self)?;
        fs::write(config_path, config_str)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.engine.survey_quality_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ConfigError::Invalid(
                "survey_quality_threshold must be in (0.0, 1.0]".to_string(),
            ));
        }
        let fill = self.engine.cargo_fill_limit;
        if !(fill > 0.0 && fill <= 1.0) {
            return Err(ConfigError::Invalid("cargo_fill_limit must be in (0.0, 1.0]".to_string()));
        }
        if self.engine.survey_freshness_floor_seconds < 0 {
            return Err(ConfigError::Invalid(
                "survey_freshness_floor_seconds must not be negative".to_string(),
            ));
        }
        if self.timing.default_interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "default_interval_seconds must be greater than 0".to_string(),
            ));
        }
        if self.api.page_limit == 0 {
            return Err(ConfigError::Invalid("page_limit must be greater than 0".to_string()));
        }
        Ok(())
    }

    pub fn print_summary(&self) {
        info!("📋 Configuration Summary:");
        info!("   🔍 Survey quality threshold: {:.0}%", self.engine.survey_quality_threshold * 100.0);
        info!("   📦 Cargo fill limit: {:.0}%", self.engine.cargo_fill_limit * 100.0);
        info!("   ⏰ Default tick interval: {}s", self.timing.default_interval_seconds);
        info!("   💾 Assignments: {}", self.storage.assignments_path);
    }
}
