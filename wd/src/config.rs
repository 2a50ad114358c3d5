//! WasteDesk configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::auth::StaticCredentials;
use crate::lifecycle::DEFAULT_RECENT_LIMIT;
use crate::schedule::ScheduleSettings;

/// Longest default rotation a config may ask for
pub const MAX_SCHEDULE_DAYS: u32 = 366;

/// Main WasteDesk configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where records are kept
    pub storage: StorageConfig,

    /// Default rotation shape
    pub schedule: ScheduleConfig,

    /// Login credentials
    pub auth: AuthConfig,

    /// Request workflow
    pub lifecycle: LifecycleConfig,
}

impl Config {
    /// Reject settings that would produce an impossible schedule
    pub fn validate(&self) -> Result<()> {
        let schedule = &self.schedule;
        if schedule.days == 0 {
            return Err(eyre::eyre!("schedule.days must be at least 1"));
        }
        if schedule.days > MAX_SCHEDULE_DAYS {
            return Err(eyre::eyre!(
                "schedule.days must be {} or less, got {}",
                MAX_SCHEDULE_DAYS,
                schedule.days
            ));
        }
        if schedule.end_hour > 24 {
            return Err(eyre::eyre!("schedule.end-hour must be 24 or less, got {}", schedule.end_hour));
        }
        if schedule.start_hour >= schedule.end_hour {
            return Err(eyre::eyre!(
                "schedule.start-hour ({}) must be before schedule.end-hour ({})",
                schedule.start_hour,
                schedule.end_hour
            ));
        }
        if schedule.slot_minutes == 0 || 60 % schedule.slot_minutes != 0 {
            return Err(eyre::eyre!(
                "schedule.slot-minutes must divide 60, got {}",
                schedule.slot_minutes
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Project-local: .wastedesk.yml
        let local_config = PathBuf::from(".wastedesk.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // User: ~/.config/wastedesk/wastedesk.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("wastedesk").join("wastedesk.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding one JSON document per collection
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("wastedesk")
                .join("store"),
        }
    }
}

/// Default rotation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Days covered by the generated rotation
    pub days: u32,

    /// Earliest slot hour (inclusive)
    #[serde(rename = "start-hour")]
    pub start_hour: u32,

    /// Latest slot hour (exclusive)
    #[serde(rename = "end-hour")]
    pub end_hour: u32,

    #[serde(rename = "slot-minutes")]
    pub slot_minutes: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        let settings = ScheduleSettings::default();
        Self {
            days: settings.days,
            start_hour: settings.start_hour,
            end_hour: settings.end_hour,
            slot_minutes: settings.slot_minutes,
        }
    }
}

impl ScheduleConfig {
    pub fn settings(&self) -> ScheduleSettings {
        ScheduleSettings {
            days: self.days,
            start_hour: self.start_hour,
            end_hour: self.end_hour,
            slot_minutes: self.slot_minutes,
        }
    }
}

/// Credential configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    #[serde(rename = "admin-username")]
    pub admin_username: String,

    #[serde(rename = "admin-password")]
    pub admin_password: String,

    /// Name shown after admin login
    #[serde(rename = "admin-name")]
    pub admin_name: String,

    /// Password shared by every collector
    #[serde(rename = "collector-password")]
    pub collector_password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        let credentials = StaticCredentials::default();
        Self {
            admin_username: credentials.admin_username,
            admin_password: credentials.admin_password,
            admin_name: credentials.admin_name,
            collector_password: credentials.collector_password,
        }
    }
}

impl AuthConfig {
    pub fn credentials(&self) -> StaticCredentials {
        StaticCredentials {
            admin_username: self.admin_username.clone(),
            admin_password: self.admin_password.clone(),
            admin_name: self.admin_name.clone(),
            collector_password: self.collector_password.clone(),
        }
    }
}

/// Request workflow configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Only allow moves listed in the transition table
    #[serde(rename = "strict-transitions")]
    pub strict_transitions: bool,

    /// Rows shown by `request list`
    #[serde(rename = "recent-limit")]
    pub recent_limit: usize,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            strict_transitions: false,
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}
