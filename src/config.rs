//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs. The
//! model parameter groups (`[home_field]`, `[situational]`, `[risk]`, ...)
//! live at the top level of the file and are all required: a missing key
//! fails the load, which is fatal at startup.
//!
//! Secrets (API keys) are referenced by env-var name in the config and
//! resolved at runtime via `std::env::var`.
//!
//! The model parameters are shared as an immutable `Arc<ModelConfig>`
//! snapshot. A reload validates a complete replacement and swaps the
//! `Arc`; readers never observe a partially updated parameter set.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fs;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub providers: ProvidersConfig,
    #[serde(flatten)]
    pub model: ModelConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub enabled: bool,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProvidersConfig {
    pub odds_api_key_env: String,
    pub cfbd_api_key_env: String,
    /// Book to prefer when selecting a quote (substring of key or title).
    #[serde(default)]
    pub preferred_book: Option<String>,
    /// Acceptable books in priority order, used when no preferred book matches.
    #[serde(default)]
    pub allowed_books: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Derive bye-week flags from the schedule when the caller gives none.
    #[serde(default)]
    pub detect_byes: bool,
}

fn default_timeout_secs() -> u64 {
    30
}

// ---------------------------------------------------------------------------
// Model parameters
// ---------------------------------------------------------------------------

/// Parameter set consumed by every adjustment and decision function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub home_field: HomeFieldConfig,
    pub situational: SituationalConfig,
    pub matchups: MatchupsConfig,
    pub explosiveness: ExplosivenessConfig,
    pub weather: WeatherConfig,
    pub injuries: InjuriesConfig,
    pub risk: RiskConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeFieldConfig {
    pub base_hfa_pts: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SituationalConfig {
    pub bye_week_bonus_pts: f64,
    pub trap_game_penalty_pts_low: f64,
    pub trap_game_penalty_pts_high: f64,
    pub b2b_road_penalty_pts: f64,
    pub longhaul_altitude_penalty_pts: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupsConfig {
    /// Cap on the combined matchup nudge; each signal is capped at half.
    pub max_nudge_pts: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplosivenessConfig {
    pub use_big_plays: bool,
    pub boost_pts_extreme: f64,
    pub boost_pts_moderate: f64,
    pub penalty_pts_def_leaky: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Weather only moves the total when this is set.
    pub trigger_only: bool,
    pub wind_threshold_mph: f64,
    pub wind_total_adjust_low: f64,
    pub wind_total_adjust_high: f64,
    pub precip_total_adjust_low: f64,
    pub precip_total_adjust_high: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjuriesConfig {
    pub qb1_out_pts: f64,
    pub qb1_limited_pts: f64,
    pub qb2_good_addback_pts: f64,
    pub rb1_out_pts: f64,
    pub wr1_out_pts: f64,
    pub ol_top_out_pts: f64,
    pub important_starter_out_pts: f64,
    pub cluster_same_unit_threshold: u32,
    pub cluster_same_unit_bonus_pts: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    pub unit_rules: UnitRules,
    pub big_edge_spread_pts: f64,
    pub big_edge_total_pts: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRules {
    pub big: BigUnitRule,
    pub small: SmallUnitRule,
}

/// Units staked once an edge reaches `risk.big_edge_*_pts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BigUnitRule {
    pub units: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmallUnitRule {
    pub units: u32,
    pub spread_edge_min: f64,
    pub total_edge_min: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            home_field: HomeFieldConfig { base_hfa_pts: 2.5 },
            situational: SituationalConfig {
                bye_week_bonus_pts: 1.0,
                trap_game_penalty_pts_low: 0.5,
                trap_game_penalty_pts_high: 1.5,
                b2b_road_penalty_pts: 1.0,
                longhaul_altitude_penalty_pts: 1.0,
            },
            matchups: MatchupsConfig { max_nudge_pts: 2.0 },
            explosiveness: ExplosivenessConfig {
                use_big_plays: true,
                boost_pts_extreme: 1.5,
                boost_pts_moderate: 0.75,
                penalty_pts_def_leaky: 0.5,
            },
            weather: WeatherConfig {
                trigger_only: true,
                wind_threshold_mph: 15.0,
                wind_total_adjust_low: -1.0,
                wind_total_adjust_high: -3.0,
                precip_total_adjust_low: -1.0,
                precip_total_adjust_high: -2.5,
            },
            injuries: InjuriesConfig {
                qb1_out_pts: 6.0,
                qb1_limited_pts: 2.5,
                qb2_good_addback_pts: 2.0,
                rb1_out_pts: 0.75,
                wr1_out_pts: 0.75,
                ol_top_out_pts: 0.75,
                important_starter_out_pts: 0.5,
                cluster_same_unit_threshold: 3,
                cluster_same_unit_bonus_pts: 1.5,
            },
            risk: RiskConfig {
                unit_rules: UnitRules {
                    big: BigUnitRule { units: 2 },
                    small: SmallUnitRule {
                        units: 1,
                        spread_edge_min: 2.0,
                        total_edge_min: 3.0,
                    },
                },
                big_edge_spread_pts: 4.0,
                big_edge_total_pts: 6.0,
            },
        }
    }
}

/// A parameter set that deserialized but is not usable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be a finite number")]
    NotFinite(&'static str),

    #[error("matchups.max_nudge_pts must not be negative (got {0})")]
    NegativeNudgeCap(f64),

    #[error("injuries.cluster_same_unit_threshold must be at least 1")]
    ZeroClusterThreshold,

    #[error("{big} ({big_value}) is below {small} ({small_value})")]
    ThresholdOrder {
        big: &'static str,
        big_value: f64,
        small: &'static str,
        small_value: f64,
    },
}

impl ModelConfig {
    /// Every numeric parameter with its dotted key.
    fn numeric_params(&self) -> [(&'static str, f64); 27] {
        let s = &self.situational;
        let e = &self.explosiveness;
        let w = &self.weather;
        let i = &self.injuries;
        let r = &self.risk;
        [
            ("home_field.base_hfa_pts", self.home_field.base_hfa_pts),
            ("situational.bye_week_bonus_pts", s.bye_week_bonus_pts),
            ("situational.trap_game_penalty_pts_low", s.trap_game_penalty_pts_low),
            ("situational.trap_game_penalty_pts_high", s.trap_game_penalty_pts_high),
            ("situational.b2b_road_penalty_pts", s.b2b_road_penalty_pts),
            ("situational.longhaul_altitude_penalty_pts", s.longhaul_altitude_penalty_pts),
            ("matchups.max_nudge_pts", self.matchups.max_nudge_pts),
            ("explosiveness.boost_pts_extreme", e.boost_pts_extreme),
            ("explosiveness.boost_pts_moderate", e.boost_pts_moderate),
            ("explosiveness.penalty_pts_def_leaky", e.penalty_pts_def_leaky),
            ("weather.wind_threshold_mph", w.wind_threshold_mph),
            ("weather.wind_total_adjust_low", w.wind_total_adjust_low),
            ("weather.wind_total_adjust_high", w.wind_total_adjust_high),
            ("weather.precip_total_adjust_low", w.precip_total_adjust_low),
            ("weather.precip_total_adjust_high", w.precip_total_adjust_high),
            ("injuries.qb1_out_pts", i.qb1_out_pts),
            ("injuries.qb1_limited_pts", i.qb1_limited_pts),
            ("injuries.qb2_good_addback_pts", i.qb2_good_addback_pts),
            ("injuries.rb1_out_pts", i.rb1_out_pts),
            ("injuries.wr1_out_pts", i.wr1_out_pts),
            ("injuries.ol_top_out_pts", i.ol_top_out_pts),
            ("injuries.important_starter_out_pts", i.important_starter_out_pts),
            ("injuries.cluster_same_unit_bonus_pts", i.cluster_same_unit_bonus_pts),
            ("risk.unit_rules.small.spread_edge_min", r.unit_rules.small.spread_edge_min),
            ("risk.unit_rules.small.total_edge_min", r.unit_rules.small.total_edge_min),
            ("risk.big_edge_spread_pts", r.big_edge_spread_pts),
            ("risk.big_edge_total_pts", r.big_edge_total_pts),
        ]
    }

    /// Check invariants that deserialization alone can't express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in self.numeric_params() {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite(key));
            }
        }
        if self.matchups.max_nudge_pts < 0.0 {
            return Err(ConfigError::NegativeNudgeCap(self.matchups.max_nudge_pts));
        }
        if self.injuries.cluster_same_unit_threshold == 0 {
            return Err(ConfigError::ZeroClusterThreshold);
        }

        let risk = &self.risk;
        if risk.big_edge_spread_pts < risk.unit_rules.small.spread_edge_min {
            return Err(ConfigError::ThresholdOrder {
                big: "risk.big_edge_spread_pts",
                big_value: risk.big_edge_spread_pts,
                small: "risk.unit_rules.small.spread_edge_min",
                small_value: risk.unit_rules.small.spread_edge_min,
            });
        }
        if risk.big_edge_total_pts < risk.unit_rules.small.total_edge_min {
            return Err(ConfigError::ThresholdOrder {
                big: "risk.big_edge_total_pts",
                big_value: risk.big_edge_total_pts,
                small: "risk.unit_rules.small.total_edge_min",
                small_value: risk.unit_rules.small.total_edge_min,
            });
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to load config file: {path}"))
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig =
            toml::from_str(contents).context("Failed to parse config TOML")?;
        config
            .model
            .validate()
            .context("Invalid model parameters")?;
        Ok(config)
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }

    /// Resolve a secret referenced by env-var name.
    pub fn resolve_secret(env_name: &str) -> Result<SecretString> {
        Self::resolve_env(env_name).map(SecretString::new)
    }
}

// ---------------------------------------------------------------------------
// Shared snapshot
// ---------------------------------------------------------------------------

/// Process-wide handle to the current model parameters.
///
/// Cloning the handle is cheap; every clone sees the same snapshot.
#[derive(Debug, Clone)]
pub struct SharedConfig {
    current: Arc<RwLock<Arc<ModelConfig>>>,
}

impl SharedConfig {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(config))),
        }
    }

    /// The snapshot to use for one request.
    pub async fn snapshot(&self) -> Arc<ModelConfig> {
        self.current.read().await.clone()
    }

    /// Validate `config` and swap it in. On error the old snapshot stays.
    pub async fn replace(&self, config: ModelConfig) -> Result<(), ConfigError> {
        config.validate()?;
        *self.current.write().await = Arc::new(config);
        Ok(())
    }
}
