//! Edge computation.
//!
//! An edge is the model value minus the market value, in points, rounded
//! to two decimals. Positive spread edges favor the home side, positive
//! total edges favor the over.

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use super::staking::MarketKind;
use crate::types::Pick;

/// Model-vs-market gap for one market.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub kind: MarketKind,
    pub model_value: f64,
    pub market_value: f64,
    /// Signed edge, rounded to 2 decimals.
    pub pts: Decimal,
}

impl Edge {
    /// Compare a model value to the market. `None` when there is no market
    /// number to compare against.
    pub fn compute(kind: MarketKind, model_value: f64, market_value: Option<f64>) -> Option<Self> {
        let market_value = market_value.filter(|v| v.is_finite())?;
        let pts = round_pts(model_value - market_value)?;
        Some(Self {
            kind,
            model_value,
            market_value,
            pts,
        })
    }

    /// The side the edge points to.
    pub fn pick(&self) -> Pick {
        let positive = self.pts >= Decimal::ZERO;
        match (self.kind, positive) {
            (MarketKind::Spread, true) => Pick::Home,
            (MarketKind::Spread, false) => Pick::Away,
            (MarketKind::Total, true) => Pick::Over,
            (MarketKind::Total, false) => Pick::Under,
        }
    }

    /// Signed edge before rounding.
    pub fn raw_pts(&self) -> f64 {
        self.model_value - self.market_value
    }

    pub fn pts_f64(&self) -> f64 {
        self.pts.to_f64().unwrap_or(0.0)
    }
}

/// Round a point value to 2 decimals. `None` for non-finite input.
pub fn round_pts(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value).map(|d| d.round_dp(2).normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_spread_edge_signed() {
        let e = Edge::compute(MarketKind::Spread, 5.0, Some(2.5)).unwrap();
        assert_eq!(e.pts, dec!(2.5));
        assert_eq!(e.pick(), Pick::Home);

        let e = Edge::compute(MarketKind::Spread, -1.0, Some(3.0)).unwrap();
        assert_eq!(e.pts, dec!(-4));
        assert_eq!(e.pick(), Pick::Away);
    }

    #[test]
    fn test_total_edge_pick() {
        let e = Edge::compute(MarketKind::Total, 49.8, Some(54.5)).unwrap();
        assert_eq!(e.pts, dec!(-4.7));
        assert_eq!(e.pick(), Pick::Under);
        let e = Edge::compute(MarketKind::Total, 52.0, Some(47.5)).unwrap();
        assert_eq!(e.pick(), Pick::Over);
    }

    #[test]
    fn test_rounding_two_decimals() {
        assert_eq!(round_pts(1.23456), Some(dec!(1.23)));
        assert_eq!(round_pts(-0.0049), Some(dec!(0)));
        assert_eq!(round_pts(2.1999999999999957), Some(dec!(2.2)));
        assert_eq!(round_pts(f64::NAN), None);
    }

    #[test]
    fn test_missing_market_has_no_edge() {
        assert!(Edge::compute(MarketKind::Spread, 5.0, None).is_none());
        assert!(Edge::compute(MarketKind::Total, 52.0, Some(f64::INFINITY)).is_none());
    }

    #[test]
    fn test_pts_f64() {
        let e = Edge::compute(MarketKind::Spread, 7.25, Some(3.0)).unwrap();
        assert_eq!(e.pts_f64(), 4.25);
    }
}
