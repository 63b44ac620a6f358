//! Book-line selection.
//!
//! Picks one bookmaker quote out of everything offered for an event and
//! reads the home spread, total and moneyline prices from it. Matching is a
//! plain case-insensitive substring policy on the book's key and title.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::names::best_match;
use crate::types::{MarketEvent, Outcome, Quote, MARKET_H2H, MARKET_SPREADS, MARKET_TOTALS};

/// Choose the representative quote for an event.
///
/// Policy, in order:
/// 1. no quotes → `None`;
/// 2. the first quote whose key/title contains `preferred`;
/// 3. the first quote (in source order) that contains any of `allowed`;
/// 4. the quote with the most markets, first one winning ties.
///
/// Blank keywords are ignored.
pub fn select_book_line<'a>(
    event: &'a MarketEvent,
    preferred: Option<&str>,
    allowed: &[String],
) -> Option<&'a Quote> {
    if event.quotes.is_empty() {
        return None;
    }

    if let Some(keyword) = preferred.map(str::trim).filter(|k| !k.is_empty()) {
        let keyword = keyword.to_lowercase();
        if let Some(quote) = event
            .quotes
            .iter()
            .find(|q| q.label().to_lowercase().contains(&keyword))
        {
            debug!(book = %quote.key, "Selected preferred book");
            return Some(quote);
        }
    }

    let allowed: Vec<String> = allowed
        .iter()
        .map(|b| b.trim().to_lowercase())
        .filter(|b| !b.is_empty())
        .collect();
    if !allowed.is_empty() {
        for quote in &event.quotes {
            let label = quote.label().to_lowercase();
            if allowed.iter().any(|book| label.contains(book.as_str())) {
                debug!(book = %quote.key, "Selected allowed book");
                return Some(quote);
            }
        }
    }

    let fallback = event.quotes.iter().reduce(|best, q| {
        if q.markets.len() > best.markets.len() {
            q
        } else {
            best
        }
    });
    if let Some(quote) = fallback {
        debug!(
            book = %quote.key,
            markets = quote.markets.len(),
            "Selected fallback book with most markets"
        );
    }
    fallback
}

/// Market numbers read from the selected quote. Every field is `None` when
/// the quote (or the relevant market) is absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketLines {
    pub book: Option<String>,
    /// Spread points as quoted for the home team (negative = home favored).
    pub spread_home_point: Option<f64>,
    pub spread_home_price: Option<f64>,
    /// Market's expected home-minus-away margin, comparable to the model line.
    pub market_line: Option<f64>,
    pub total_points: Option<f64>,
    pub total_over_price: Option<f64>,
    pub moneyline_home: Option<f64>,
    pub moneyline_away: Option<f64>,
}

impl MarketLines {
    pub fn from_quote(quote: Option<&Quote>, home: &str, away: &str) -> Self {
        let Some(quote) = quote else {
            return Self::default();
        };

        let mut lines = MarketLines {
            book: Some(quote.key.clone()).filter(|k| !k.is_empty()),
            ..Self::default()
        };

        if let Some(spreads) = quote.market(MARKET_SPREADS) {
            if let Some(home_outcome) = find_outcome(&spreads.outcomes, home, away) {
                lines.spread_home_point = home_outcome.point;
                lines.spread_home_price = home_outcome.price;
            } else if let Some(away_outcome) = find_outcome(&spreads.outcomes, away, home) {
                // Only the away side is listed; the home spread mirrors it.
                lines.spread_home_point = away_outcome.point.map(|p| 0.0 - p);
            }
            lines.market_line = lines.spread_home_point.map(|p| 0.0 - p);
        }

        if let Some(totals) = quote.market(MARKET_TOTALS) {
            let over = totals
                .outcomes
                .iter()
                .find(|o| o.name.eq_ignore_ascii_case("over"))
                .or_else(|| totals.outcomes.iter().find(|o| o.point.is_some()));
            if let Some(over) = over {
                lines.total_points = over.point;
                lines.total_over_price = over.price;
            }
        }

        if let Some(h2h) = quote.market(MARKET_H2H) {
            lines.moneyline_home = find_outcome(&h2h.outcomes, home, away).and_then(|o| o.price);
            lines.moneyline_away = find_outcome(&h2h.outcomes, away, home).and_then(|o| o.price);
        }

        lines
    }
}

/// Outcome for `team`, never one that names `opponent` more closely.
fn find_outcome<'a>(outcomes: &'a [Outcome], team: &str, opponent: &str) -> Option<&'a Outcome> {
    best_match(outcomes, |o| o.name.as_str(), team, Some(opponent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BookMarket;

    fn outcome(name: &str, point: Option<f64>, price: f64) -> Outcome {
        Outcome {
            name: name.to_string(),
            point,
            price: Some(price),
        }
    }

    fn quote(key: &str, title: &str, market_keys: &[&str]) -> Quote {
        Quote {
            key: key.to_string(),
            title: title.to_string(),
            last_update: None,
            markets: market_keys
                .iter()
                .map(|k| BookMarket {
                    key: k.to_string(),
                    outcomes: Vec::new(),
                })
                .collect(),
        }
    }

    fn event(quotes: Vec<Quote>) -> MarketEvent {
        MarketEvent {
            id: "evt".into(),
            home_team: "Ohio State Buckeyes".into(),
            away_team: "Texas Longhorns".into(),
            commence_time: None,
            quotes,
        }
    }

    fn full_quote() -> Quote {
        Quote {
            key: "draftkings".into(),
            title: "DraftKings".into(),
            last_update: None,
            markets: vec![
                BookMarket {
                    key: MARKET_SPREADS.into(),
                    outcomes: vec![
                        outcome("Ohio State Buckeyes", Some(-3.5), -110.0),
                        outcome("Texas Longhorns", Some(3.5), -110.0),
                    ],
                },
                BookMarket {
                    key: MARKET_TOTALS.into(),
                    outcomes: vec![
                        outcome("Under", Some(47.5), -105.0),
                        outcome("Over", Some(47.5), -115.0),
                    ],
                },
                BookMarket {
                    key: MARKET_H2H.into(),
                    outcomes: vec![
                        outcome("Ohio State Buckeyes", None, -165.0),
                        outcome("Texas Longhorns", None, 140.0),
                    ],
                },
            ],
        }
    }

    #[test]
    fn test_no_quotes_selects_nothing() {
        let e = event(Vec::new());
        assert!(select_book_line(&e, Some("draftkings"), &[]).is_none());
    }

    #[test]
    fn test_preferred_keyword_case_insensitive() {
        let e = event(vec![
            quote("fanduel", "FanDuel", &["h2h"]),
            quote("draftkings", "DraftKings", &["h2h"]),
        ]);
        let q = select_book_line(&e, Some("DRAFT"), &[]).unwrap();
        assert_eq!(q.key, "draftkings");
    }

    #[test]
    fn test_preferred_matches_title() {
        let e = event(vec![
            quote("book_a", "Caesars Sportsbook", &["h2h"]),
            quote("book_b", "BetMGM", &["h2h"]),
        ]);
        let q = select_book_line(&e, Some("mgm"), &[]).unwrap();
        assert_eq!(q.key, "book_b");
    }

    #[test]
    fn test_allowed_books_follow_quote_order() {
        let e = event(vec![
            quote("bovada", "Bovada", &["h2h", "spreads", "totals"]),
            quote("betmgm", "BetMGM", &["h2h"]),
            quote("fanduel", "FanDuel", &["h2h"]),
        ]);
        // fanduel is listed first, but betmgm appears first in the quotes.
        let allowed = vec!["fanduel".to_string(), "betmgm".to_string()];
        let q = select_book_line(&e, None, &allowed).unwrap();
        assert_eq!(q.key, "betmgm");
    }

    #[test]
    fn test_unmatched_preferred_falls_through_to_allowed() {
        let e = event(vec![
            quote("bovada", "Bovada", &["h2h"]),
            quote("fanduel", "FanDuel", &["h2h"]),
        ]);
        let allowed = vec!["fanduel".to_string()];
        let q = select_book_line(&e, Some("pinnacle"), &allowed).unwrap();
        assert_eq!(q.key, "fanduel");
    }

    #[test]
    fn test_fallback_to_most_markets() {
        let e = event(vec![
            quote("a", "A", &["h2h"]),
            quote("b", "B", &["h2h", "spreads", "totals"]),
            quote("c", "C", &["h2h", "spreads"]),
        ]);
        let allowed = vec!["nomatch".to_string()];
        let q = select_book_line(&e, None, &allowed).unwrap();
        assert_eq!(q.key, "b");
    }

    #[test]
    fn test_fallback_tie_keeps_first() {
        let e = event(vec![
            quote("a", "A", &["h2h"]),
            quote("b", "B", &["h2h", "spreads"]),
            quote("c", "C", &["h2h", "totals"]),
        ]);
        let q = select_book_line(&e, None, &[]).unwrap();
        assert_eq!(q.key, "b");
    }

    #[test]
    fn test_blank_keywords_ignored() {
        let e = event(vec![
            quote("a", "A", &["h2h"]),
            quote("b", "B", &["h2h", "spreads"]),
        ]);
        let allowed = vec!["  ".to_string()];
        let q = select_book_line(&e, Some(""), &allowed).unwrap();
        assert_eq!(q.key, "b");
    }

    #[test]
    fn test_lines_from_full_quote() {
        let q = full_quote();
        let lines = MarketLines::from_quote(Some(&q), "Ohio State", "Texas");
        assert_eq!(lines.book.as_deref(), Some("draftkings"));
        assert_eq!(lines.spread_home_point, Some(-3.5));
        assert_eq!(lines.spread_home_price, Some(-110.0));
        assert_eq!(lines.market_line, Some(3.5));
        assert_eq!(lines.total_points, Some(47.5));
        assert_eq!(lines.total_over_price, Some(-115.0));
        assert_eq!(lines.moneyline_home, Some(-165.0));
        assert_eq!(lines.moneyline_away, Some(140.0));
    }

    #[test]
    fn test_lines_absent_without_quote() {
        let lines = MarketLines::from_quote(None, "Ohio State", "Texas");
        assert_eq!(lines, MarketLines::default());
        assert!(lines.market_line.is_none());
        assert!(lines.total_points.is_none());
    }

    #[test]
    fn test_lines_missing_markets_stay_none() {
        let q = quote("a", "A", &["h2h"]);
        let lines = MarketLines::from_quote(Some(&q), "Ohio State", "Texas");
        assert!(lines.spread_home_point.is_none());
        assert!(lines.market_line.is_none());
        assert!(lines.total_points.is_none());
        assert!(lines.moneyline_home.is_none());
    }

    #[test]
    fn test_spread_mirrors_away_outcome() {
        let q = Quote {
            key: "x".into(),
            title: "X".into(),
            last_update: None,
            markets: vec![BookMarket {
                key: MARKET_SPREADS.into(),
                outcomes: vec![outcome("Texas Longhorns", Some(3.5), -110.0)],
            }],
        };
        let lines = MarketLines::from_quote(Some(&q), "Ohio State", "Texas");
        assert_eq!(lines.spread_home_point, Some(-3.5));
        assert_eq!(lines.market_line, Some(3.5));
        assert!(lines.spread_home_price.is_none());
    }

    #[test]
    fn test_pick_em_line_is_positive_zero() {
        let q = Quote {
            key: "x".into(),
            title: "X".into(),
            last_update: None,
            markets: vec![BookMarket {
                key: MARKET_SPREADS.into(),
                outcomes: vec![outcome("Ohio State Buckeyes", Some(0.0), -110.0)],
            }],
        };
        let lines = MarketLines::from_quote(Some(&q), "Ohio State", "Texas");
        let line = lines.market_line.unwrap();
        assert_eq!(line, 0.0);
        assert!(line.is_sign_positive());
    }

    #[test]
    fn test_same_prefix_rivals_read_correct_side() {
        let q = Quote {
            key: "fanduel".into(),
            title: "FanDuel".into(),
            last_update: None,
            markets: vec![
                BookMarket {
                    key: MARKET_SPREADS.into(),
                    outcomes: vec![
                        outcome("Michigan State Spartans", Some(3.5), -110.0),
                        outcome("Michigan Wolverines", Some(-3.5), -110.0),
                    ],
                },
                BookMarket {
                    key: MARKET_H2H.into(),
                    outcomes: vec![
                        outcome("Michigan State Spartans", None, 150.0),
                        outcome("Michigan Wolverines", None, -180.0),
                    ],
                },
            ],
        };

        let lines = MarketLines::from_quote(Some(&q), "Michigan", "Michigan State");
        assert_eq!(lines.spread_home_point, Some(-3.5));
        assert_eq!(lines.market_line, Some(3.5));
        assert_eq!(lines.moneyline_home, Some(-180.0));
        assert_eq!(lines.moneyline_away, Some(150.0));

        let flipped = MarketLines::from_quote(Some(&q), "Michigan State", "Michigan");
        assert_eq!(flipped.spread_home_point, Some(3.5));
        assert_eq!(flipped.market_line, Some(-3.5));
        assert_eq!(flipped.moneyline_home, Some(150.0));
    }
}
