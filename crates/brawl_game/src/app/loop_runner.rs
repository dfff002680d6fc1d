use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use brawl_engine::{
    load_scene, resolve_app_paths, seeded_rng, Character, DuelEligibility, FsAssetStore,
    LoadError, NpcBrain, Scene, SceneError, StartupError,
};
use thiserror::Error;
use tracing::{debug, error, info};

use super::bootstrap::AppWiring;
use super::config::GameConfig;
use super::controllers::{FacingDuelRule, ScriptError, ScriptedInput, WanderBrain};

#[derive(Debug, Error)]
pub(crate) enum GameError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("failed to load scene: {0}")]
    Load(#[from] LoadError),
    #[error("failed to assign players: {0}")]
    Scene(#[from] SceneError),
    #[error("invalid input script: {0}")]
    Script(#[from] ScriptError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SessionSummary {
    pub(crate) ticks: u64,
    /// Ticks that ended with at least one eligible duel.
    pub(crate) duel_ticks: u64,
    pub(crate) peak_duels: usize,
    pub(crate) interactions: u64,
}

pub(crate) fn run(app: AppWiring) -> ExitCode {
    match run_session(&app.config) {
        Ok(summary) => {
            info!(
                ticks = summary.ticks,
                duel_ticks = summary.duel_ticks,
                peak_duels = summary.peak_duels,
                interactions = summary.interactions,
                "session_finished"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "startup_failed");
            ExitCode::FAILURE
        }
    }
}

fn run_session(config: &GameConfig) -> Result<SessionSummary, GameError> {
    let paths = resolve_app_paths()?;
    info!(
        root = %paths.root.display(),
        scenes_dir = %paths.scenes_dir.display(),
        "startup"
    );
    let mut assets = FsAssetStore::new(&paths.root);
    let mut rng = seeded_rng(config.seed);
    let mut scene = load_scene(&paths, &config.scene_id, &mut assets, &mut rng)?;
    setup_roles(&mut scene, config)?;
    Ok(drive(&mut scene, config, &FacingDuelRule::default()))
}

/// Humans take the first `config.players` characters; everyone else wanders.
pub(crate) fn setup_roles(scene: &mut Scene, config: &GameConfig) -> Result<(), GameError> {
    for index in 0..config.players {
        let device = match (index, config.input_script.as_deref()) {
            (0, Some(script)) => ScriptedInput::parse(script)?,
            _ => ScriptedInput::idle(),
        };
        scene.assign_player(index, Box::new(device))?;
    }

    let seed = config.seed;
    scene.create_npcs(|character: &Character| -> Box<dyn NpcBrain> {
        Box::new(WanderBrain::for_character(seed, character))
    });
    Ok(())
}

/// Fixed-step driver. With `tps == 0` ticks run back to back.
pub(crate) fn drive(
    scene: &mut Scene,
    config: &GameConfig,
    duels: &dyn DuelEligibility,
) -> SessionSummary {
    let fixed_dt = (config.tps > 0).then(|| Duration::from_secs_f64(1.0 / f64::from(config.tps)));
    let log_every = u64::from(config.tps.max(1));
    let mut summary = SessionSummary::default();
    let mut next_deadline = Instant::now();

    for _ in 0..config.ticks {
        scene.advance_tick(duels);

        let duels_now = scene.possible_duels().len();
        summary.ticks += 1;
        if duels_now > 0 {
            summary.duel_ticks += 1;
        }
        summary.peak_duels = summary.peak_duels.max(duels_now);

        let interactions = scene
            .players()
            .iter()
            .map(|player| player.last_interaction())
            .chain(scene.npcs().iter().map(|npc| npc.last_interaction()))
            .flatten();
        for action in interactions {
            debug!(tick = scene.tick(), action = action.as_str(), "zone_used");
            summary.interactions += 1;
        }

        if scene.tick() % log_every == 0 {
            info!(
                scene = scene.name(),
                tick = scene.tick(),
                duels = duels_now,
                "tick_summary"
            );
        }

        if let Some(dt) = fixed_dt {
            next_deadline += dt;
            let now = Instant::now();
            if next_deadline > now {
                thread::sleep(next_deadline - now);
            } else {
                next_deadline = now;
            }
        }
    }

    summary
}
