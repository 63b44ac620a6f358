//! Strategy engine: edges in, staking decisions out.
//!
//! Spread and total decisions come from the same two-tier threshold
//! lookup. The moneyline recommendation is a fixed heuristic overlay on
//! the spread edge, not a priced decision.

pub mod edge;
pub mod staking;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ModelConfig;
use crate::types::Pick;
use edge::Edge;
use staking::{staking_units, MarketKind};

/// Spread edge (home perspective) below which the road dog moneyline is
/// flagged. Compared against the unrounded edge.
pub const DOG_ML_SPREAD_EDGE_TRIGGER: f64 = -2.0;
pub const DOG_ML_UNITS: u32 = 1;
pub const DOG_ML_NOTE: &str = "Dog ML sprinkle (heuristic)";

/// A staked spread or total recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketDecision {
    pub units: u32,
    pub edge_pts: Decimal,
    pub pick: Pick,
}

/// Moneyline overlay recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoneylineDecision {
    pub units: u32,
    pub pick: Pick,
    pub note: String,
}

/// Per-market recommendations. `None` means no bet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Decisions {
    pub spread: Option<MarketDecision>,
    pub total: Option<MarketDecision>,
    pub moneyline: Option<MoneylineDecision>,
}

impl Decisions {
    pub fn is_empty(&self) -> bool {
        self.spread.is_none() && self.total.is_none() && self.moneyline.is_none()
    }
}

/// Turn an edge into a staked decision, or `None` below the small threshold.
pub fn market_decision(edge: &Edge, cfg: &ModelConfig) -> Option<MarketDecision> {
    let units = staking_units(edge.pts_f64(), edge.kind, cfg);
    if units == 0 {
        debug!(market = %edge.kind, edge_pts = %edge.pts, "Edge below staking threshold");
        return None;
    }
    Some(MarketDecision {
        units,
        edge_pts: edge.pts,
        pick: edge.pick(),
    })
}

/// Map spread and total edges to the decision set.
pub fn decide(spread: Option<&Edge>, total: Option<&Edge>, cfg: &ModelConfig) -> Decisions {
    let spread_decision = spread.and_then(|e| market_decision(e, cfg));
    let total_decision = total.and_then(|e| market_decision(e, cfg));

    let moneyline = spread
        .filter(|e| e.raw_pts() < DOG_ML_SPREAD_EDGE_TRIGGER)
        .map(|_| MoneylineDecision {
            units: DOG_ML_UNITS,
            pick: Pick::Away,
            note: DOG_ML_NOTE.to_string(),
        });

    let decisions = Decisions {
        spread: spread_decision,
        total: total_decision,
        moneyline,
    };

    if !decisions.is_empty() {
        info!(
            spread = ?decisions.spread.as_ref().map(|d| (d.pick, d.units)),
            total = ?decisions.total.as_ref().map(|d| (d.pick, d.units)),
            moneyline = decisions.moneyline.is_some(),
            "Staking decisions"
        );
    }
    decisions
}

/// Convenience wrapper over raw edge values, for callers that already have
/// point edges rather than [`Edge`]s.
pub fn decide_from_points(
    spread_edge_pts: Option<f64>,
    total_edge_pts: Option<f64>,
    cfg: &ModelConfig,
) -> Decisions {
    let spread = spread_edge_pts.and_then(|pts| Edge::compute(MarketKind::Spread, pts, Some(0.0)));
    let total = total_edge_pts.and_then(|pts| Edge::compute(MarketKind::Total, pts, Some(0.0)));
    decide(spread.as_ref(), total.as_ref(), cfg)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
