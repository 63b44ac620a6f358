//! cfb-edge: college football line-adjustment and staking engine
//!
//! Entry point. Loads configuration, initialises structured logging,
//! builds the provider clients and serves the HTTP API until Ctrl-C.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use cfb_edge::config::{self, AppConfig, SharedConfig};
use cfb_edge::data::cfbd::CfbdClient;
use cfb_edge::data::odds::OddsApiClient;
use cfb_edge::engine::analyst::{BookPolicy, GameAnalyst};
use cfb_edge::server::{self, routes::ServerState};

const BANNER: &str = r#"
  ___ ___ ___     ___ ___   ___ ___
 / __| __| _ )___| __|   \ / __| __|
| (__| _|| _ \___| _|| |) | (_ | _|
 \___|_| |___/   |___|___/ \___|___|

  College football line adjustments and staking
  v0.1.0
"#;

const CONFIG_PATH_ENV: &str = "CFB_EDGE_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path =
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config.toml".to_string());
    let cfg = config::AppConfig::load(&config_path)?;

    init_logging();

    println!("{BANNER}");
    info!(
        config = %config_path,
        hfa = cfg.model.home_field.base_hfa_pts,
        preferred_book = ?cfg.providers.preferred_book,
        detect_byes = cfg.providers.detect_byes,
        "cfb-edge starting up"
    );

    let shared = SharedConfig::new(cfg.model.clone());
    let analyst = build_analyst(&cfg, shared.clone())?;

    if !cfg.server.enabled {
        warn!("API server disabled in config, nothing to run");
        return Ok(());
    }

    let state = Arc::new(ServerState::new(shared, analyst));
    let handle = server::spawn_server(state, cfg.server.port).await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");
    handle.abort();
    Ok(())
}

/// Build the game analyst from configured provider keys.
///
/// Without an odds key there is nothing to price against, so the
/// game endpoint is disabled. A missing CFBD key only costs the ratings.
fn build_analyst(cfg: &AppConfig, shared: SharedConfig) -> Result<Option<GameAnalyst>> {
    let providers = &cfg.providers;

    let odds_key = match AppConfig::resolve_secret(&providers.odds_api_key_env) {
        Ok(key) => key,
        Err(e) => {
            warn!(error = %e, "No odds API key, game analysis disabled");
            return Ok(None);
        }
    };
    let cfbd_key = AppConfig::resolve_secret(&providers.cfbd_api_key_env).ok();
    if cfbd_key.is_none() {
        warn!(
            env = %providers.cfbd_api_key_env,
            "No CFBD API key, ratings requests will be unauthenticated"
        );
    }

    let odds = OddsApiClient::new(odds_key, providers.timeout_secs)?;
    let ratings = CfbdClient::new(cfbd_key, providers.timeout_secs)?;

    Ok(Some(
        GameAnalyst::new(
            Arc::new(odds),
            Arc::new(ratings),
            shared,
            BookPolicy::from(providers),
        )
        .with_bye_detection(providers.detect_byes),
    ))
}

fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("cfb_edge=info"));

    let json_logging = std::env::var("CFB_EDGE_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
