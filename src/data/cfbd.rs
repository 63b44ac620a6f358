//! CollegeFootballData (CFBD) client.
//!
//! API: `https://api.collegefootballdata.com/`
//! Auth: `Authorization: Bearer <key>`. Requests go out unauthenticated
//! when no key is configured; the API then rejects them and the caller
//! degrades to neutral ratings.
//!
//! Field names changed from snake_case to camelCase between API versions,
//! so game records accept both.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use super::coerce::lenient_opt_f64;
use super::schedule::parse_iso_date;
use super::RatingsSource;
use crate::types::{ScheduledGame, TeamRating};

const BASE_URL: &str = "https://api.collegefootballdata.com";

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SpRating {
    #[serde(default)]
    pub team: String,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CfbdGame {
    #[serde(default, alias = "homeTeam")]
    pub home_team: String,
    #[serde(default, alias = "awayTeam")]
    pub away_team: String,
    #[serde(default, alias = "startDate")]
    pub start_date: Option<String>,
}

impl From<SpRating> for TeamRating {
    fn from(r: SpRating) -> Self {
        TeamRating {
            team: r.team,
            rating: r.rating,
        }
    }
}

impl From<CfbdGame> for ScheduledGame {
    fn from(g: CfbdGame) -> Self {
        ScheduledGame {
            start_date: g.start_date.as_deref().and_then(parse_iso_date),
            home_team: g.home_team,
            away_team: g.away_team,
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct CfbdClient {
    http: Client,
    api_key: Option<SecretString>,
    base_url: String,
}

impl CfbdClient {
    pub fn new(api_key: Option<SecretString>, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("cfb-edge/0.1.0")
            .build()
            .context("Failed to build CFBD HTTP client")?;
        Ok(Self {
            http,
            api_key,
            base_url: BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => req.bearer_auth(key.expose_secret()),
            None => req,
        }
    }

    fn sp_ratings_url(&self, year: i32) -> String {
        format!("{}/ratings/sp?year={year}", self.base_url)
    }

    fn team_games_url(&self, year: i32, team: &str) -> String {
        format!(
            "{}/games?year={year}&team={}&seasonType=both",
            self.base_url,
            urlencoding::encode(team),
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        debug!(url = %url, "Fetching CFBD {what}");

        let resp = self
            .authorized(self.http.get(url))
            .send()
            .await
            .with_context(|| format!("CFBD {what} request failed"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("CFBD API error {status}: {body}");
        }

        resp.json()
            .await
            .with_context(|| format!("Failed to parse CFBD {what} response"))
    }

    /// SP+ ratings for every rated team in a season.
    pub async fn get_sp_ratings(&self, year: i32) -> Result<Vec<SpRating>> {
        let ratings: Vec<SpRating> = self
            .get_json(&self.sp_ratings_url(year), "SP+ ratings")
            .await?;
        info!(year, teams = ratings.len(), "Fetched SP+ ratings");
        Ok(ratings)
    }

    /// Regular and postseason games for one team.
    pub async fn get_games_for_team(&self, year: i32, team: &str) -> Result<Vec<CfbdGame>> {
        let games: Vec<CfbdGame> = self
            .get_json(&self.team_games_url(year, team), "games")
            .await?;
        debug!(year, team = %team, games = games.len(), "Fetched team schedule");
        Ok(games)
    }
}

#[async_trait]
impl RatingsSource for CfbdClient {
    async fn fetch_ratings(&self, year: i32) -> Result<Vec<TeamRating>> {
        let ratings = self.get_sp_ratings(year).await?;
        Ok(ratings.into_iter().map(TeamRating::from).collect())
    }

    async fn fetch_team_games(&self, year: i32, team: &str) -> Result<Vec<ScheduledGame>> {
        let games = self.get_games_for_team(year, team).await?;
        Ok(games.into_iter().map(ScheduledGame::from).collect())
    }

    fn name(&self) -> &'static str {
        "cfbd"
    }
}
