use tracing::info;
use tracing_subscriber::EnvFilter;

use super::config::{ConfigError, GameConfig};

pub(crate) struct AppWiring {
    pub(crate) config: GameConfig,
}

pub(crate) fn build_app() -> Result<AppWiring, ConfigError> {
    init_tracing();
    info!("=== Brawl Startup ===");

    let config = GameConfig::from_env()?;
    info!(
        scene = config.scene_id.as_str(),
        seed = config.seed,
        players = config.players,
        ticks = config.ticks,
        tps = config.tps,
        "config_loaded"
    );
    Ok(AppWiring { config })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
