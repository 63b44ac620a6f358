//! Point adjustments applied to the running model line and total.
//!
//! Each stage is a pure function of the current value, its structured
//! input and the config snapshot. Absent inputs mean no effect. Stages are
//! applied in a fixed order by [`super::analyze`]; later clamps see the
//! already-adjusted value.
//!
//! Sign convention: the line is home-minus-away, so anything that hurts
//! the home team lowers it and anything that hurts the away team raises it.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::config::ModelConfig;
use crate::types::{
    ExplosivenessSignals, InjuryReport, MatchupSignals, ModelState, SituationalFlags, TrapRisk,
    WeatherConditions,
};

/// Flat prior for the combined score, absent team-specific scoring data.
pub const BASELINE_TOTAL_PTS: f64 = 52.0;

/// Each matchup signal contributes a quarter of its (clamped) value.
const MATCHUP_SIGNAL_WEIGHT: f64 = 0.25;

/// Wind this far above the threshold reaches the second tier.
const WIND_SECOND_TIER_MPH: f64 = 5.0;
const PRECIP_FIRST_TIER_MM: f64 = 1.0;
const PRECIP_SECOND_TIER_MM: f64 = 3.0;
/// Share of the high/low gap added at the second weather tier.
const SECOND_TIER_SHARE: f64 = 0.6;

/// Pipeline stages, in application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    HomeField,
    Situational,
    Matchup,
    Explosiveness,
    Injuries,
    Weather,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::HomeField => "home_field",
            Stage::Situational => "situational",
            Stage::Matchup => "matchup",
            Stage::Explosiveness => "explosiveness",
            Stage::Injuries => "injuries",
            Stage::Weather => "weather",
        };
        write!(f, "{name}")
    }
}

/// Points one stage moved the line (or, for weather, the total).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub stage: Stage,
    pub delta: f64,
}

/// Starting point: rating gap plus home field, flat total.
pub fn baseline(ratings_delta: f64, cfg: &ModelConfig) -> ModelState {
    ModelState {
        model_line: ratings_delta + cfg.home_field.base_hfa_pts,
        model_total: BASELINE_TOTAL_PTS,
    }
}

fn clamp(n: f64, lo: f64, hi: f64) -> f64 {
    n.min(hi).max(lo)
}

// ---------------------------------------------------------------------------
// Line stages
// ---------------------------------------------------------------------------

pub fn apply_situational(line: f64, flags: Option<&SituationalFlags>, cfg: &ModelConfig) -> f64 {
    let Some(s) = flags else {
        return line;
    };
    let w = &cfg.situational;
    let trap_pts = |risk: Option<TrapRisk>| match risk {
        Some(TrapRisk::Low) => w.trap_game_penalty_pts_low,
        Some(TrapRisk::High) => w.trap_game_penalty_pts_high,
        None => 0.0,
    };

    let mut delta = 0.0;
    if s.home_bye {
        delta += w.bye_week_bonus_pts;
    }
    if s.away_bye {
        delta -= w.bye_week_bonus_pts;
    }
    delta -= trap_pts(s.home_trap);
    delta += trap_pts(s.away_trap);
    if s.home_b2b_road {
        delta -= w.b2b_road_penalty_pts;
    }
    if s.away_b2b_road {
        delta += w.b2b_road_penalty_pts;
    }
    if s.home_longhaul_altitude {
        delta -= w.longhaul_altitude_penalty_pts;
    }
    if s.away_longhaul_altitude {
        delta += w.longhaul_altitude_penalty_pts;
    }

    debug!(delta, "Situational adjustment");
    line + delta
}

/// Combined matchup nudge, always within `[-max_nudge_pts, max_nudge_pts]`.
pub fn matchup_delta(signals: &MatchupSignals, max_nudge_pts: f64) -> f64 {
    let max = max_nudge_pts.max(0.0);
    let half = max / 2.0;
    let delta: f64 = signals
        .values()
        .iter()
        .map(|v| if v.is_finite() { *v } else { 0.0 })
        .map(|v| clamp(v, -half, half) * MATCHUP_SIGNAL_WEIGHT)
        .sum();
    clamp(delta, -max, max)
}

pub fn apply_matchup_efficiency(
    line: f64,
    signals: Option<&MatchupSignals>,
    cfg: &ModelConfig,
) -> f64 {
    let Some(signals) = signals else {
        return line;
    };
    let delta = matchup_delta(signals, cfg.matchups.max_nudge_pts);
    debug!(delta, "Matchup efficiency adjustment");
    line + delta
}

/// Big-play adjustment, applied in the favored team's direction.
///
/// The favored team is the home side when the running line is `>= 0`.
pub fn apply_explosiveness(
    line: f64,
    signals: Option<&ExplosivenessSignals>,
    cfg: &ModelConfig,
) -> f64 {
    let e = &cfg.explosiveness;
    if !e.use_big_plays {
        return line;
    }
    let Some(x) = signals else {
        return line;
    };

    let mut delta = 0.0;
    if x.favored_top_offense && x.opponent_leaky_defense {
        delta += if x.extreme {
            e.boost_pts_extreme
        } else {
            e.boost_pts_moderate
        };
    }
    if x.favored_leaky_defense {
        delta -= e.penalty_pts_def_leaky;
    }

    let home_favored = line >= 0.0;
    let signed = if home_favored { delta } else { -delta };
    debug!(delta = signed, home_favored, "Explosiveness adjustment");
    line + signed
}

/// Penalty points for one team's injury report.
pub fn injury_penalty(report: Option<&InjuryReport>, cfg: &ModelConfig) -> f64 {
    let Some(team) = report else {
        return 0.0;
    };
    let w = &cfg.injuries;

    let mut pts = 0.0;
    if team.qb1_out {
        pts += w.qb1_out_pts;
    }
    if team.qb1_limited {
        pts += w.qb1_limited_pts;
    }
    if team.qb2_good {
        pts -= w.qb2_good_addback_pts;
    }
    pts += f64::from(team.rb1_out) * w.rb1_out_pts;
    pts += f64::from(team.wr1_out) * w.wr1_out_pts;
    pts += f64::from(team.ol_top_out) * w.ol_top_out_pts;
    pts += f64::from(team.important_starters_out) * w.important_starter_out_pts;

    let clusters = team
        .unit_out_counts()
        .iter()
        .filter(|&&outs| outs >= w.cluster_same_unit_threshold)
        .count();
    pts += clusters as f64 * w.cluster_same_unit_bonus_pts;
    pts
}

pub fn apply_injuries(
    line: f64,
    home: Option<&InjuryReport>,
    away: Option<&InjuryReport>,
    cfg: &ModelConfig,
) -> f64 {
    let home_penalty = injury_penalty(home, cfg);
    let away_penalty = injury_penalty(away, cfg);
    debug!(home_penalty, away_penalty, "Injury adjustment");
    line - (home_penalty - away_penalty)
}

// ---------------------------------------------------------------------------
// Total stage
// ---------------------------------------------------------------------------

/// Downward total adjustment for wind and rain. Two tiers each; the second
/// tier adds a share of the gap between the high and low constants.
pub fn weather_adjustment(weather: &WeatherConditions, cfg: &ModelConfig) -> f64 {
    let w = &cfg.weather;
    let mut adj = 0.0;

    if weather.wind_mph >= w.wind_threshold_mph {
        adj += w.wind_total_adjust_low;
        if weather.wind_mph >= w.wind_threshold_mph + WIND_SECOND_TIER_MPH {
            adj += (w.wind_total_adjust_high - w.wind_total_adjust_low) * SECOND_TIER_SHARE;
        }
    }
    if weather.precip_mm >= PRECIP_FIRST_TIER_MM {
        adj += w.precip_total_adjust_low;
        if weather.precip_mm >= PRECIP_SECOND_TIER_MM {
            adj += (w.precip_total_adjust_high - w.precip_total_adjust_low) * SECOND_TIER_SHARE;
        }
    }
    adj
}

pub fn apply_weather(total: f64, weather: Option<&WeatherConditions>, cfg: &ModelConfig) -> f64 {
    if !cfg.weather.trigger_only {
        return total;
    }
    let Some(weather) = weather else {
        return total;
    };
    let adj = weather_adjustment(weather, cfg);
    debug!(
        adj,
        wind_mph = weather.wind_mph,
        precip_mm = weather.precip_mm,
        "Weather total adjustment"
    );
    total + adj
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
