//! Data providers.
//!
//! Defines the odds and ratings source traits and the HTTP clients that
//! implement them. The engine only ever sees the completed results; a
//! failed fetch degrades to "no data" in the game analyst.

pub mod cfbd;
pub mod coerce;
pub mod odds;
pub mod schedule;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{MarketEvent, ScheduledGame, TeamRating};

/// Bookmaker odds for upcoming games.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OddsSource: Send + Sync {
    /// All currently listed events with their bookmaker quotes.
    async fn fetch_events(&self) -> Result<Vec<MarketEvent>>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}

/// Team power ratings and schedules.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RatingsSource: Send + Sync {
    /// Ratings for every rated team in a season.
    async fn fetch_ratings(&self, year: i32) -> Result<Vec<TeamRating>>;

    /// One team's games (regular and postseason) for a season.
    async fn fetch_team_games(&self, year: i32, team: &str) -> Result<Vec<ScheduledGame>>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}
