//! In-memory providers for integration testing.
//!
//! Deterministic `OddsSource` and `RatingsSource` implementations backed
//! by fixed data. Either can be switched into a failing mode from test
//! code, and both count their calls.

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::{Arc, Mutex};

use cfb_edge::data::{OddsSource, RatingsSource};
use cfb_edge::types::*;

pub fn kickoff() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 29, 17, 0, 0).unwrap()
}

fn outcome(name: &str, point: Option<f64>, price: f64) -> Outcome {
    Outcome {
        name: name.to_string(),
        point,
        price: Some(price),
    }
}

/// A full three-market quote with the home side at `home_point`.
pub fn full_quote(key: &str, title: &str, home: &str, away: &str, home_point: f64, total: f64) -> Quote {
    Quote {
        key: key.to_string(),
        title: title.to_string(),
        last_update: None,
        markets: vec![
            BookMarket {
                key: MARKET_H2H.to_string(),
                outcomes: vec![outcome(home, None, -150.0), outcome(away, None, 130.0)],
            },
            BookMarket {
                key: MARKET_SPREADS.to_string(),
                outcomes: vec![
                    outcome(home, Some(home_point), -110.0),
                    outcome(away, Some(-home_point), -110.0),
                ],
            },
            BookMarket {
                key: MARKET_TOTALS.to_string(),
                outcomes: vec![
                    outcome("Over", Some(total), -110.0),
                    outcome("Under", Some(total), -110.0),
                ],
            },
        ],
    }
}

/// Two listed games: a rivalry game with two books and an undercard with one.
pub fn default_events() -> Vec<MarketEvent> {
    let (home, away) = ("Michigan Wolverines", "Ohio State Buckeyes");
    vec![
        MarketEvent {
            id: "evt-rivalry".to_string(),
            home_team: home.to_string(),
            away_team: away.to_string(),
            commence_time: Some(kickoff()),
            quotes: vec![
                full_quote("fanduel", "FanDuel", home, away, 7.0, 44.5),
                full_quote("draftkings", "DraftKings", home, away, 6.5, 45.0),
            ],
        },
        MarketEvent {
            id: "evt-undercard".to_string(),
            home_team: "Texas A&M Aggies".to_string(),
            away_team: "Texas Longhorns".to_string(),
            commence_time: Some(kickoff() + Duration::hours(3)),
            quotes: vec![full_quote(
                "betmgm",
                "BetMGM",
                "Texas A&M Aggies",
                "Texas Longhorns",
                2.5,
                48.5,
            )],
        },
    ]
}

pub fn default_ratings() -> Vec<TeamRating> {
    vec![
        TeamRating { team: "Michigan".to_string(), rating: Some(12.0) },
        TeamRating { team: "Ohio State".to_string(), rating: Some(24.0) },
        TeamRating { team: "Texas A&M".to_string(), rating: Some(15.5) },
        TeamRating { team: "Texas".to_string(), rating: Some(18.0) },
        TeamRating { team: "Unranked U".to_string(), rating: None },
    ]
}

// ---------------------------------------------------------------------------
// Odds
// ---------------------------------------------------------------------------

pub struct InMemoryOdds {
    events: Vec<MarketEvent>,
    force_error: Arc<Mutex<Option<String>>>,
    calls: Arc<Mutex<u32>>,
}

impl InMemoryOdds {
    pub fn new(events: Vec<MarketEvent>) -> Self {
        Self {
            events,
            force_error: Arc::new(Mutex::new(None)),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl OddsSource for InMemoryOdds {
    async fn fetch_events(&self) -> Result<Vec<MarketEvent>> {
        *self.calls.lock().unwrap() += 1;
        if let Some(err) = self.force_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{err}"));
        }
        Ok(self.events.clone())
    }

    fn name(&self) -> &'static str {
        "in-memory-odds"
    }
}

// ---------------------------------------------------------------------------
// Ratings and schedules
// ---------------------------------------------------------------------------

pub struct InMemoryRatings {
    ratings: Vec<TeamRating>,
    /// Days between each team's previous game and `kickoff()`.
    rest_days: Vec<(String, i64)>,
    force_error: Arc<Mutex<Option<String>>>,
    seasons_requested: Arc<Mutex<Vec<i32>>>,
}

impl InMemoryRatings {
    pub fn new(ratings: Vec<TeamRating>) -> Self {
        Self {
            ratings,
            rest_days: Vec::new(),
            force_error: Arc::new(Mutex::new(None)),
            seasons_requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_rest(mut self, team: &str, days: i64) -> Self {
        self.rest_days.push((team.to_string(), days));
        self
    }

    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn seasons_requested(&self) -> Vec<i32> {
        self.seasons_requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl RatingsSource for InMemoryRatings {
    async fn fetch_ratings(&self, year: i32) -> Result<Vec<TeamRating>> {
        self.seasons_requested.lock().unwrap().push(year);
        if let Some(err) = self.force_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{err}"));
        }
        Ok(self.ratings.clone())
    }

    async fn fetch_team_games(&self, _year: i32, team: &str) -> Result<Vec<ScheduledGame>> {
        let rest = self
            .rest_days
            .iter()
            .find(|(t, _)| t == team)
            .map(|(_, days)| *days)
            .unwrap_or(7);
        Ok(vec![
            ScheduledGame {
                home_team: team.to_string(),
                away_team: "Previous Opponent".to_string(),
                start_date: Some(kickoff() - Duration::days(rest)),
            },
            ScheduledGame {
                home_team: team.to_string(),
                away_team: "Today's Opponent".to_string(),
                start_date: Some(kickoff()),
            },
        ])
    }

    fn name(&self) -> &'static str {
        "in-memory-ratings"
    }
}
