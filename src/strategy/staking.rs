//! Staking units from edge size.
//!
//! Two tiers per market kind: a "small" edge earns the small unit count,
//! a "big" edge the big one, anything under the small threshold nothing.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ModelConfig;

/// Markets priced by edge thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketKind {
    Spread,
    Total,
}

impl fmt::Display for MarketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketKind::Spread => write!(f, "spread"),
            MarketKind::Total => write!(f, "total"),
        }
    }
}

/// (big threshold, small threshold) in points for a market kind.
pub fn thresholds(kind: MarketKind, cfg: &ModelConfig) -> (f64, f64) {
    let risk = &cfg.risk;
    match kind {
        MarketKind::Spread => (risk.big_edge_spread_pts, risk.unit_rules.small.spread_edge_min),
        MarketKind::Total => (risk.big_edge_total_pts, risk.unit_rules.small.total_edge_min),
    }
}

/// Units to stake on an edge of `edge_pts` (sign ignored). Zero means no bet.
pub fn staking_units(edge_pts: f64, kind: MarketKind, cfg: &ModelConfig) -> u32 {
    if !edge_pts.is_finite() {
        return 0;
    }
    let edge = edge_pts.abs();
    let (big, small) = thresholds(kind, cfg);
    let rules = &cfg.risk.unit_rules;
    if edge >= big {
        rules.big.units
    } else if edge >= small {
        rules.small.units
    } else {
        0
    }
}
