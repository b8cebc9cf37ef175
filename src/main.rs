mod api;
mod config;
mod error;
mod league;
mod render;
mod scorer;
mod store;
mod submit;
mod types;

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::routes::{router, ApiState};
use crate::config::Config;
use crate::error::Result;
use crate::league::League;
use crate::store::{Backend, RecordCache, RecordStore};

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // --- League: roster + run table ---
    let league = match &cfg.league_file {
        Some(path) => League::from_file(path)?,
        None => {
            info!("LEAGUE_FILE not set, using the built-in league");
            League::builtin()
        }
    };
    info!(
        "League {:?}: {} teams, {} players, runs FT={} PT={} H={}",
        league.name,
        league.teams().len(),
        league.players().count(),
        league.runs().full_time,
        league.runs().part_time,
        league.runs().hourly,
    );

    // --- Record store ---
    let backend = Backend::from_config(&cfg).await?;
    match backend.load_all().await {
        Ok(records) => info!("Startup read: {} sale records", records.len()),
        Err(e) => warn!("Startup read from {} failed, the board will show no data until it recovers: {e}", backend.kind()),
    }

    if cfg.admin_password.is_none() {
        warn!("ADMIN_PASSWORD not set; the submit form is open to anyone who can reach the page.");
    }

    // --- HTTP server ---
    let cache = Arc::new(RecordCache::new(cfg.cache_ttl));
    let api_state = ApiState::new(
        Arc::new(league),
        Arc::new(backend),
        cache,
        cfg.admin_password.clone(),
    );
    let app = router(api_state);
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Scoreboard listening on http://{bind_addr} (cache ttl {}s)", cfg.cache_ttl.as_secs());

    axum::serve(listener, app).await?;

    Ok(())
}
