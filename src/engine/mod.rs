//! Core engine: baseline → adjustments → edges → decisions.
//!
//! [`analyze`] is pure: given one game's inputs and a config snapshot it
//! always produces the same result and never fails. Missing inputs
//! resolve to neutral values (no adjustment, `None` market fields).
//! [`analyst::GameAnalyst`] wraps it with the provider fetches.

pub mod adjustments;
pub mod analyst;
pub mod book;
pub mod names;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::ModelConfig;
use crate::data::coerce::lenient_opt_f64;
use crate::strategy::edge::Edge;
use crate::strategy::staking::MarketKind;
use crate::strategy::{decide, Decisions};
use crate::types::{
    ExplosivenessSignals, InjuryReport, MatchupSignals, Quote, SituationalFlags,
    WeatherConditions,
};
use adjustments::{Adjustment, Stage};
use book::MarketLines;
use rust_decimal::Decimal;

/// Everything known about one game at analysis time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub home: String,
    pub away: String,
    /// Home rating minus away rating. Absent ratings count as no gap.
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub ratings_delta: Option<f64>,
    /// Selected bookmaker quote, if any.
    #[serde(default)]
    pub quote: Option<Quote>,
    #[serde(default)]
    pub injuries_home: Option<InjuryReport>,
    #[serde(default)]
    pub injuries_away: Option<InjuryReport>,
    #[serde(default)]
    pub situational: Option<SituationalFlags>,
    #[serde(default)]
    pub matchup: Option<MatchupSignals>,
    #[serde(default)]
    pub explosiveness: Option<ExplosivenessSignals>,
    #[serde(default)]
    pub weather: Option<WeatherConditions>,
}

/// Model numbers for one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOutput {
    pub ratings_delta: f64,
    pub model_line: f64,
    pub model_total: f64,
    pub spread_edge_pts: Option<Decimal>,
    pub total_edge_pts: Option<Decimal>,
    /// Non-zero stage contributions, in application order.
    pub adjustments: Vec<Adjustment>,
}

/// Result of analysing one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub home: String,
    pub away: String,
    pub lines: MarketLines,
    pub model: ModelOutput,
    pub decisions: Decisions,
}

/// Run the full line-adjustment and decision pipeline for one game.
pub fn analyze(input: &AnalysisInput, cfg: &ModelConfig) -> Analysis {
    let ratings_delta = match input.ratings_delta {
        Some(delta) => delta,
        None => {
            warn!(home = %input.home, away = %input.away, "No ratings delta, assuming even teams");
            0.0
        }
    };

    let mut trace = Vec::new();
    let mut record = |stage: Stage, before: f64, after: f64| {
        let delta = after - before;
        if delta != 0.0 {
            trace.push(Adjustment { stage, delta });
        }
        after
    };

    let state = adjustments::baseline(ratings_delta, cfg);
    let line = record(Stage::HomeField, ratings_delta, state.model_line);
    let line = record(
        Stage::Situational,
        line,
        adjustments::apply_situational(line, input.situational.as_ref(), cfg),
    );
    let line = record(
        Stage::Matchup,
        line,
        adjustments::apply_matchup_efficiency(line, input.matchup.as_ref(), cfg),
    );
    let line = record(
        Stage::Explosiveness,
        line,
        adjustments::apply_explosiveness(line, input.explosiveness.as_ref(), cfg),
    );
    let model_line = record(
        Stage::Injuries,
        line,
        adjustments::apply_injuries(
            line,
            input.injuries_home.as_ref(),
            input.injuries_away.as_ref(),
            cfg,
        ),
    );
    let model_total = record(
        Stage::Weather,
        state.model_total,
        adjustments::apply_weather(state.model_total, input.weather.as_ref(), cfg),
    );

    let lines = MarketLines::from_quote(input.quote.as_ref(), &input.home, &input.away);
    let spread_edge = Edge::compute(MarketKind::Spread, model_line, lines.market_line);
    let total_edge = Edge::compute(MarketKind::Total, model_total, lines.total_points);
    let decisions = decide(spread_edge.as_ref(), total_edge.as_ref(), cfg);

    info!(
        home = %input.home,
        away = %input.away,
        book = ?lines.book,
        model_line = format!("{model_line:.2}"),
        model_total = format!("{model_total:.2}"),
        market_line = ?lines.market_line,
        market_total = ?lines.total_points,
        spread_edge = ?spread_edge.map(|e| e.pts),
        total_edge = ?total_edge.map(|e| e.pts),
        "Game analysed"
    );

    Analysis {
        home: input.home.clone(),
        away: input.away.clone(),
        lines,
        model: ModelOutput {
            ratings_delta,
            model_line,
            model_total,
            spread_edge_pts: spread_edge.map(|e| e.pts),
            total_edge_pts: total_edge.map(|e| e.pts),
            adjustments: trace,
        },
        decisions,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
