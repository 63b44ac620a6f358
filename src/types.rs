//! Shared types for the cfb-edge engine.
//!
//! Market payloads mirror the odds provider's JSON shape so they can be
//! deserialized directly. Per-request inputs (injuries, situational flags,
//! matchup and weather signals) are lenient: every field is optional and
//! malformed values fall back to a neutral default instead of failing the
//! request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::data::coerce::{lenient_count, lenient_f64, lenient_flag};

/// Market keys used by the odds provider.
pub const MARKET_SPREADS: &str = "spreads";
pub const MARKET_TOTALS: &str = "totals";
pub const MARKET_H2H: &str = "h2h";

// ---------------------------------------------------------------------------
// Market data
// ---------------------------------------------------------------------------

/// One scheduled matchup with every bookmaker's quote for it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub home_team: String,
    #[serde(default)]
    pub away_team: String,
    #[serde(default)]
    pub commence_time: Option<DateTime<Utc>>,
    #[serde(default, rename = "bookmakers")]
    pub quotes: Vec<Quote>,
}

/// One bookmaker's set of market offerings for one event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default)]
    pub markets: Vec<BookMarket>,
}

impl Quote {
    /// Identifier and display title joined, as used for book matching.
    pub fn label(&self) -> String {
        format!("{} {}", self.key, self.title)
    }

    /// Look up a market by key (`spreads`, `totals`, `h2h`).
    pub fn market(&self, key: &str) -> Option<&BookMarket> {
        self.markets.iter().find(|m| m.key == key)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookMarket {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    #[serde(default)]
    pub name: String,
    /// Spread or total points. Absent on moneyline outcomes.
    #[serde(default)]
    pub point: Option<f64>,
    /// American odds.
    #[serde(default)]
    pub price: Option<f64>,
}

// ---------------------------------------------------------------------------
// Picks
// ---------------------------------------------------------------------------

/// The side an edge points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pick {
    Home,
    Away,
    Over,
    Under,
}

impl fmt::Display for Pick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pick::Home => write!(f, "HOME"),
            Pick::Away => write!(f, "AWAY"),
            Pick::Over => write!(f, "OVER"),
            Pick::Under => write!(f, "UNDER"),
        }
    }
}

// ---------------------------------------------------------------------------
// Situational inputs
// ---------------------------------------------------------------------------

/// Trap-game severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrapRisk {
    Low,
    High,
}

impl FromStr for TrapRisk {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(TrapRisk::Low),
            "high" => Ok(TrapRisk::High),
            other => Err(format!("Unknown trap risk: {other}")),
        }
    }
}

impl fmt::Display for TrapRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrapRisk::Low => write!(f, "low"),
            TrapRisk::High => write!(f, "high"),
        }
    }
}

/// Unknown or non-string trap levels are treated as "no trap".
fn lenient_trap<'de, D>(deserializer: D) -> Result<Option<TrapRisk>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_str().and_then(|s| s.parse().ok()))
}

/// Boolean/enum flags describing each side's schedule spot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SituationalFlags {
    #[serde(default, deserialize_with = "lenient_flag")]
    pub home_bye: bool,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub away_bye: bool,
    #[serde(default, deserialize_with = "lenient_trap")]
    pub home_trap: Option<TrapRisk>,
    #[serde(default, deserialize_with = "lenient_trap")]
    pub away_trap: Option<TrapRisk>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub home_b2b_road: bool,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub away_b2b_road: bool,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub home_longhaul_altitude: bool,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub away_longhaul_altitude: bool,
}

/// Per-team injury report. Counts are numbers of players out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InjuryReport {
    #[serde(default, deserialize_with = "lenient_flag")]
    pub qb1_out: bool,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub qb1_limited: bool,
    /// Backup QB is a capable starter; reduces the QB penalty.
    #[serde(default, deserialize_with = "lenient_flag")]
    pub qb2_good: bool,
    #[serde(default, deserialize_with = "lenient_count")]
    pub rb1_out: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub wr1_out: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub ol_top_out: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub important_starters_out: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub ol_out_count: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub db_out_count: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub wr_out_count: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub dl_out_count: u32,
}

impl InjuryReport {
    /// Out counts for each position group checked for clustering.
    pub fn unit_out_counts(&self) -> [u32; 4] {
        [
            self.ol_out_count,
            self.db_out_count,
            self.wr_out_count,
            self.dl_out_count,
        ]
    }
}

/// Matchup efficiency signals, positive favouring the home side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchupSignals {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rush_adv: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub pass_adv: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub finish_adv: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub havoc_adv: f64,
}

impl MatchupSignals {
    pub fn values(&self) -> [f64; 4] {
        [self.rush_adv, self.pass_adv, self.finish_adv, self.havoc_adv]
    }
}

/// Big-play signals, expressed relative to the favored team.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExplosivenessSignals {
    #[serde(default, deserialize_with = "lenient_flag")]
    pub favored_top_offense: bool,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub opponent_leaky_defense: bool,
    /// Use the extreme boost tier instead of the moderate one.
    #[serde(default, deserialize_with = "lenient_flag")]
    pub extreme: bool,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub favored_leaky_defense: bool,
}

/// Game-time weather forecast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherConditions {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub wind_mph: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub precip_mm: f64,
}

// ---------------------------------------------------------------------------
// Model state
// ---------------------------------------------------------------------------

/// Running scalars threaded through the adjustment pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelState {
    /// Home-minus-away expected margin.
    pub model_line: f64,
    /// Expected combined points.
    pub model_total: f64,
}

// ---------------------------------------------------------------------------
// Team ratings and schedule
// ---------------------------------------------------------------------------

/// A team's power rating from the ratings provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRating {
    pub team: String,
    pub rating: Option<f64>,
}

/// A game on a team's schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledGame {
    pub home_team: String,
    pub away_team: String,
    pub start_date: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors surfaced to callers of the game analyst and HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum EdgeError {
    #[error("Data provider error ({data_source}): {message}")]
    DataProvider { data_source: String, message: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
