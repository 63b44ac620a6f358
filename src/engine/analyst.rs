//! Game analyst: provider fetches wrapped around the pure engine.
//!
//! Odds and ratings are fetched concurrently. Either may fail on its own:
//! the analysis then proceeds without market lines or without a ratings
//! gap. Only when both providers fail is the request an error.

use chrono::{DateTime, Utc};
use futures::future::join;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::book::select_book_line;
use super::names::{best_match, match_len, same_team};
use super::{analyze, Analysis, AnalysisInput};
use crate::config::{ProvidersConfig, SharedConfig};
use crate::data::schedule::{detect_bye, previous_game_date, season_for};
use crate::data::{OddsSource, RatingsSource};
use crate::types::{
    EdgeError, ExplosivenessSignals, InjuryReport, MarketEvent, MatchupSignals, SituationalFlags,
    TeamRating, WeatherConditions,
};

/// A game to analyse, identified by team names. Market data and ratings
/// are fetched; the remaining signals come from the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameRequest {
    pub home: String,
    pub away: String,
    /// Ratings season. Defaults to the season in progress.
    #[serde(default)]
    pub season: Option<i32>,
    /// Overrides the configured preferred book for this request.
    #[serde(default)]
    pub book: Option<String>,
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

/// Analysis plus the provider context it was built from.
#[derive(Debug, Clone, Serialize)]
pub struct GameAnalysis {
    pub event_id: Option<String>,
    pub commence_time: Option<DateTime<Utc>>,
    pub season: i32,
    pub home_rating: Option<f64>,
    pub away_rating: Option<f64>,
    #[serde(flatten)]
    pub analysis: Analysis,
}

/// Which bookmaker quote to read lines from.
#[derive(Debug, Clone, Default)]
pub struct BookPolicy {
    pub preferred: Option<String>,
    pub allowed: Vec<String>,
}

impl From<&ProvidersConfig> for BookPolicy {
    fn from(providers: &ProvidersConfig) -> Self {
        Self {
            preferred: providers.preferred_book.clone(),
            allowed: providers.allowed_books.clone(),
        }
    }
}

#[derive(Clone)]
pub struct GameAnalyst {
    odds: Arc<dyn OddsSource>,
    ratings: Arc<dyn RatingsSource>,
    config: SharedConfig,
    policy: BookPolicy,
    detect_byes: bool,
}

impl GameAnalyst {
    pub fn new(
        odds: Arc<dyn OddsSource>,
        ratings: Arc<dyn RatingsSource>,
        config: SharedConfig,
        policy: BookPolicy,
    ) -> Self {
        Self {
            odds,
            ratings,
            config,
            policy,
            detect_byes: false,
        }
    }

    /// Derive bye-week flags from team schedules.
    pub fn with_bye_detection(mut self, enabled: bool) -> Self {
        self.detect_byes = enabled;
        self
    }

    pub async fn analyze_game(&self, req: &GameRequest) -> Result<GameAnalysis, EdgeError> {
        let home = req.home.trim();
        let away = req.away.trim();
        if home.is_empty() || away.is_empty() {
            return Err(EdgeError::InvalidRequest(
                "home and away team names are required".into(),
            ));
        }

        let season = req.season.unwrap_or_else(|| season_for(Utc::now()));
        let cfg = self.config.snapshot().await;

        let (odds_res, ratings_res) =
            join(self.odds.fetch_events(), self.ratings.fetch_ratings(season)).await;

        let (events, ratings) = match (odds_res, ratings_res) {
            (Err(odds_err), Err(ratings_err)) => {
                return Err(EdgeError::DataProvider {
                    data_source: format!("{}+{}", self.odds.name(), self.ratings.name()),
                    message: format!("{odds_err:#}; {ratings_err:#}"),
                });
            }
            (odds_res, ratings_res) => {
                let events = odds_res.unwrap_or_else(|e| {
                    warn!(source = self.odds.name(), error = %format!("{e:#}"), "Odds unavailable, continuing without market lines");
                    Vec::new()
                });
                let ratings = ratings_res.unwrap_or_else(|e| {
                    warn!(source = self.ratings.name(), error = %format!("{e:#}"), "Ratings unavailable, assuming even teams");
                    Vec::new()
                });
                (events, ratings)
            }
        };

        let event = find_event(&events, home, away);
        if event.is_none() && !events.is_empty() {
            warn!(home = %home, away = %away, events = events.len(), "No listed event for matchup");
        }

        let preferred = req.book.as_deref().or(self.policy.preferred.as_deref());
        let quote = event
            .and_then(|e| select_book_line(e, preferred, &self.policy.allowed))
            .cloned();

        let home_rating = find_rating(&ratings, home, away);
        let away_rating = find_rating(&ratings, away, home);
        let ratings_delta = match (home_rating, away_rating) {
            (Some(h), Some(a)) => Some(h - a),
            _ => None,
        };

        let commence_time = event.and_then(|e| e.commence_time);
        let mut situational = req.situational.clone();
        if self.detect_byes {
            if let Some(kickoff) = commence_time {
                let (home_bye, away_bye) = self.bye_flags(season, home, away, kickoff).await;
                let flags = situational.get_or_insert_with(SituationalFlags::default);
                flags.home_bye |= home_bye;
                flags.away_bye |= away_bye;
            }
        }

        let input = AnalysisInput {
            home: home.to_string(),
            away: away.to_string(),
            ratings_delta,
            quote,
            injuries_home: req.injuries_home.clone(),
            injuries_away: req.injuries_away.clone(),
            situational,
            matchup: req.matchup.clone(),
            explosiveness: req.explosiveness.clone(),
            weather: req.weather.clone(),
        };
        let analysis = analyze(&input, &cfg);

        info!(
            home = %home,
            away = %away,
            season,
            event_id = ?event.map(|e| e.id.as_str()),
            home_rating = ?home_rating,
            away_rating = ?away_rating,
            "Game analysis complete"
        );

        Ok(GameAnalysis {
            event_id: event.map(|e| e.id.clone()),
            commence_time,
            season,
            home_rating,
            away_rating,
            analysis,
        })
    }

    /// Bye flags for both teams. A failed schedule fetch means no bye.
    async fn bye_flags(
        &self,
        season: i32,
        home: &str,
        away: &str,
        kickoff: DateTime<Utc>,
    ) -> (bool, bool) {
        let (home_games, away_games) = join(
            self.ratings.fetch_team_games(season, home),
            self.ratings.fetch_team_games(season, away),
        )
        .await;

        let flag = |team: &str, games: anyhow::Result<Vec<_>>| match games {
            Ok(games) => {
                let prev = previous_game_date(&games, kickoff);
                let bye = detect_bye(prev, kickoff);
                debug!(team = %team, previous = ?prev, bye, "Bye check");
                bye
            }
            Err(e) => {
                warn!(team = %team, error = %format!("{e:#}"), "Schedule unavailable, skipping bye check");
                false
            }
        };
        (flag(home, home_games), flag(away, away_games))
    }
}

/// Exact normalized match first, then the mascot-suffix match whose names
/// overlap the request most.
pub fn find_event<'a>(events: &'a [MarketEvent], home: &str, away: &str) -> Option<&'a MarketEvent> {
    events
        .iter()
        .find(|e| same_team(&e.home_team, home) && same_team(&e.away_team, away))
        .or_else(|| {
            events
                .iter()
                .filter_map(|e| {
                    let score = match_len(&e.home_team, home)? + match_len(&e.away_team, away)?;
                    Some((score, e))
                })
                .reduce(|best, next| if next.0 > best.0 { next } else { best })
                .map(|(_, e)| e)
        })
}

/// Rating for `team`. Loose matches prefer the longest school name, so
/// "Ohio State Buckeyes" resolves to Ohio State rather than Ohio.
pub fn find_rating(ratings: &[TeamRating], team: &str, opponent: &str) -> Option<f64> {
    best_match(ratings, |r| r.team.as_str(), team, Some(opponent)).and_then(|r| r.rating)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
