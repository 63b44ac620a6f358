//! The Odds API client.
//!
//! API: `https://api.the-odds-api.com/v4/sports/americanfootball_ncaaf/odds`
//! Auth: `apiKey` query parameter. Every call costs quota; the remaining
//! balance is reported in the `x-requests-remaining` header.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, info};

use super::OddsSource;
use crate::types::{MarketEvent, MARKET_H2H, MARKET_SPREADS, MARKET_TOTALS};

const BASE_URL: &str = "https://api.the-odds-api.com/v4";
const SPORT_KEY: &str = "americanfootball_ncaaf";

pub struct OddsApiClient {
    http: Client,
    api_key: SecretString,
    base_url: String,
}

impl OddsApiClient {
    pub fn new(api_key: SecretString, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("cfb-edge/0.1.0")
            .build()
            .context("Failed to build odds HTTP client")?;
        Ok(Self {
            http,
            api_key,
            base_url: BASE_URL.to_string(),
        })
    }

    /// Point the client at a different host (staging or a local fake).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn odds_url(&self) -> String {
        format!(
            "{}/sports/{SPORT_KEY}/odds?regions=us&markets={MARKET_H2H},{MARKET_SPREADS},{MARKET_TOTALS}&oddsFormat=american&dateFormat=iso&apiKey={}",
            self.base_url,
            urlencoding::encode(self.api_key.expose_secret()),
        )
    }

    /// Fetch every listed NCAAF event with US bookmaker quotes.
    pub async fn get_odds(&self) -> Result<Vec<MarketEvent>> {
        debug!(sport = SPORT_KEY, "Fetching odds");

        let resp = self
            .http
            .get(self.odds_url())
            .send()
            .await
            .context("Odds API request failed")?;

        if let Some(remaining) = resp
            .headers()
            .get("x-requests-remaining")
            .and_then(|v| v.to_str().ok())
        {
            debug!(remaining = %remaining, "Odds API quota");
        }

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Odds API error {status}: {body}");
        }

        let events: Vec<MarketEvent> = resp
            .json()
            .await
            .context("Failed to parse Odds API response")?;

        info!(events = events.len(), "Fetched odds");
        Ok(events)
    }
}

#[async_trait]
impl OddsSource for OddsApiClient {
    async fn fetch_events(&self) -> Result<Vec<MarketEvent>> {
        self.get_odds().await
    }

    fn name(&self) -> &'static str {
        "the-odds-api"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OddsApiClient {
        OddsApiClient::new(SecretString::new("k3y/+".to_string()), 5).unwrap()
    }

    #[test]
    fn test_odds_url_requests_all_markets() {
        let url = client().odds_url();
        assert!(url.starts_with(
            "https://api.the-odds-api.com/v4/sports/americanfootball_ncaaf/odds?"
        ));
        assert!(url.contains("regions=us"));
        assert!(url.contains("markets=h2h,spreads,totals"));
        assert!(url.contains("oddsFormat=american"));
        assert!(url.contains("dateFormat=iso"));
        assert!(url.ends_with("apiKey=k3y%2F%2B"));
    }

    #[test]
    fn test_base_url_override() {
        let url = client().with_base_url("http://127.0.0.1:9999/").odds_url();
        assert!(url.starts_with("http://127.0.0.1:9999/sports/americanfootball_ncaaf/odds?"));
    }

    #[test]
    fn test_parse_odds_payload() {
        let json = r#"[{
            "id": "e1",
            "sport_key": "americanfootball_ncaaf",
            "commence_time": "2025-11-29T17:00:00Z",
            "home_team": "Michigan Wolverines",
            "away_team": "Ohio State Buckeyes",
            "bookmakers": [{
                "key": "fanduel",
                "title": "FanDuel",
                "last_update": "2025-11-28T12:00:00Z",
                "markets": [
                    {"key": "h2h", "outcomes": [
                        {"name": "Michigan Wolverines", "price": 240},
                        {"name": "Ohio State Buckeyes", "price": -300}
                    ]},
                    {"key": "spreads", "outcomes": [
                        {"name": "Michigan Wolverines", "price": -110, "point": 7.5},
                        {"name": "Ohio State Buckeyes", "price": -110, "point": -7.5}
                    ]}
                ]
            }]
        }]"#;
        let events: Vec<MarketEvent> = serde_json::from_str(json).unwrap();
        assert_eq!(events.len(), 1);
        let quote = &events[0].quotes[0];
        assert_eq!(quote.label(), "fanduel FanDuel");
        assert!(quote.market(MARKET_TOTALS).is_none());
        let spreads = quote.market(MARKET_SPREADS).unwrap();
        assert_eq!(spreads.outcomes[0].point, Some(7.5));
    }
}
