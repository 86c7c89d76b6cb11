//! Configuration file support for Recall.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/recall/config.toml`.
//! The `[deck]` sections are the per-deck scheduling tunables; they are
//! treated as read-only for the duration of a scheduling call.

use crate::{Error, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default interval ladder for the FixedBox strategy, in days.
/// The first rung is sub-day (10 minutes) and routes to the learning queue.
static DEFAULT_LADDER: Lazy<Vec<f64>> = Lazy::new(|| {
    vec![
        10.0 / MINUTES_PER_DAY,
        1.0,
        2.0,
        4.0,
        8.0,
        16.0,
        32.0,
        64.0,
    ]
});

pub(crate) const MINUTES_PER_DAY: f64 = 1440.0;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub deck: DeckConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Per-deck scheduler tunables
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct DeckConfig {
    /// Declared strategy name. Unknown or absent names resolve to the
    /// Classical strategy (documented policy, not an error).
    #[serde(default)]
    pub strategy: String,

    #[serde(default)]
    pub learning: LearningConfig,

    #[serde(default)]
    pub review: ReviewConfig,

    #[serde(default)]
    pub lapse: LapseConfig,

    #[serde(default)]
    pub retention: RetentionConfig,

    #[serde(default)]
    pub boxes: BoxConfig,
}

/// Learning-phase parameters (Classical strategy)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LearningConfig {
    /// Step delays in minutes
    #[serde(default = "default_learning_steps")]
    pub steps_mins: Vec<i64>,

    /// Interval granted when graduating with Good, in days
    #[serde(default = "default_graduating_interval")]
    pub graduating_interval: i64,

    /// Interval granted when graduating with Easy, in days
    #[serde(default = "default_easy_interval")]
    pub easy_interval: i64,

    /// Ease factor assigned when a card enters learning, in permille
    #[serde(default = "default_initial_ease")]
    pub initial_ease: i64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            steps_mins: default_learning_steps(),
            graduating_interval: default_graduating_interval(),
            easy_interval: default_easy_interval(),
            initial_ease: default_initial_ease(),
        }
    }
}

/// Review-phase parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Global multiplier applied to every computed review interval
    #[serde(default = "default_interval_factor")]
    pub interval_factor: f64,

    /// Hard cap on granted intervals, in days
    #[serde(default = "default_max_interval")]
    pub max_interval: i64,

    /// Fuzz bound as a fraction of the computed interval
    #[serde(default = "default_fuzz_fraction")]
    pub fuzz_fraction: f64,

    /// Interval multiplier for Hard answers
    #[serde(default = "default_hard_interval_factor")]
    pub hard_interval_factor: f64,

    /// Extra interval multiplier for Easy answers
    #[serde(default = "default_easy_interval_factor")]
    pub easy_interval_factor: f64,

    /// Ease decrease on Hard, in permille
    #[serde(default = "default_hard_ease_penalty")]
    pub hard_ease_penalty: i64,

    /// Ease increase on Easy, in permille
    #[serde(default = "default_easy_ease_bonus")]
    pub easy_ease_bonus: i64,

    /// Floor for the ease factor, in permille
    #[serde(default = "default_min_ease")]
    pub min_ease: i64,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            interval_factor: default_interval_factor(),
            max_interval: default_max_interval(),
            fuzz_fraction: default_fuzz_fraction(),
            hard_interval_factor: default_hard_interval_factor(),
            easy_interval_factor: default_easy_interval_factor(),
            hard_ease_penalty: default_hard_ease_penalty(),
            easy_ease_bonus: default_easy_ease_bonus(),
            min_ease: default_min_ease(),
        }
    }
}

/// Lapse-phase parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LapseConfig {
    /// Relearning step delays in minutes
    #[serde(default = "default_lapse_steps")]
    pub steps_mins: Vec<i64>,

    /// Interval-shrink multiplier applied to the pre-lapse interval
    #[serde(default = "default_lapse_multiplier")]
    pub interval_multiplier: f64,

    /// Minimum post-lapse interval, in days
    #[serde(default = "default_lapse_min_interval")]
    pub min_interval: i64,

    /// Ease decrease on lapse, in permille
    #[serde(default = "default_lapse_ease_penalty")]
    pub ease_penalty: i64,
}

impl Default for LapseConfig {
    fn default() -> Self {
        Self {
            steps_mins: default_lapse_steps(),
            interval_multiplier: default_lapse_multiplier(),
            min_interval: default_lapse_min_interval(),
            ease_penalty: default_lapse_ease_penalty(),
        }
    }
}

/// RetentionModel strategy parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Target recall probability when converting stability to an interval
    #[serde(default = "default_target_retention")]
    pub target_retention: f64,

    /// Weight vector override. Fixed default constants are used when absent
    /// or when an index is missing.
    #[serde(default)]
    pub weights: Option<Vec<f64>>,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            target_retention: default_target_retention(),
            weights: None,
        }
    }
}

/// FixedBox strategy parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BoxConfig {
    /// Interval ladder in days; sub-day entries route to the learning queue
    #[serde(default = "default_ladder")]
    pub ladder_days: Vec<f64>,

    /// Boxes to drop on Again. Zero means reset to box 0.
    #[serde(default)]
    pub drop_boxes: u32,
}

impl Default for BoxConfig {
    fn default() -> Self {
        Self {
            ladder_days: default_ladder(),
            drop_boxes: 0,
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("recall")
}

fn default_learning_steps() -> Vec<i64> {
    vec![1, 10]
}

fn default_graduating_interval() -> i64 {
    1
}

fn default_easy_interval() -> i64 {
    4
}

fn default_initial_ease() -> i64 {
    2500
}

fn default_interval_factor() -> f64 {
    1.0
}

fn default_max_interval() -> i64 {
    36500
}

fn default_fuzz_fraction() -> f64 {
    0.05
}

fn default_hard_interval_factor() -> f64 {
    1.2
}

fn default_easy_interval_factor() -> f64 {
    1.3
}

fn default_hard_ease_penalty() -> i64 {
    150
}

fn default_easy_ease_bonus() -> i64 {
    150
}

fn default_min_ease() -> i64 {
    1300
}

fn default_lapse_steps() -> Vec<i64> {
    vec![10]
}

fn default_lapse_multiplier() -> f64 {
    0.5
}

fn default_lapse_min_interval() -> i64 {
    1
}

fn default_lapse_ease_penalty() -> i64 {
    200
}

fn default_target_retention() -> f64 {
    0.9
}

fn default_ladder() -> Vec<f64> {
    DEFAULT_LADDER.clone()
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("recall").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
