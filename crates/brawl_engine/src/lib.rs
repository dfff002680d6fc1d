use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
mod asset_keys;
pub mod content;
pub mod geometry;

pub use app::{
    apply_intent, Advanceable, Character, CharacterId, Direction, DuelEligibility, DuelPair,
    IdleBrain, InputAction, InputDevice, InputSnapshot, Intent, InteractionZone, NoDuels, Npc,
    NpcBrain, Player, Prop, Role, Scene, SceneElement, SceneError, SceneWorld, UnknownDirection,
    ZoneAction, CHARACTER_FOOTPRINT_PX, WALK_SPEED_PX_PER_TICK,
};
pub use asset_keys::{validate_asset_key, AssetKeyError};
pub use content::{
    build_scene, load_scene, parse_descriptor, scene_descriptor_path, seeded_rng, AssetError,
    AssetResolver, ElementDescriptor, FsAssetStore, ImageKey, LoadError, PlaceholderAssets,
    SceneDescriptor, SceneRng, SpriteSheetKey,
};
pub use geometry::{boxes_overlap, point_in_rect, Rect, Vec2};

pub const ROOT_ENV_VAR: &str = "BRAWL_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub scenes_dir: PathBuf,
}

impl AppPaths {
    /// Layout below a known game root: descriptors live in
    /// `resources/scenes`, and descriptor file references are root-relative.
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let scenes_dir = root.join("resources").join("scenes");
        Self { root, scenes_dir }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error(
        "BRAWL_ROOT is set but does not point to a valid game root: {path}\n\
A valid root contains resources/, or Cargo.toml together with crates/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect game root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing resources/, or Cargo.toml together with crates/.\n\
Set {env_var} explicitly, for example:\n\
Bash/zsh: export {env_var}=\"/path/to/brawl\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    resolve_root().map(AppPaths::from_root)
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let normalized = normalize_path(&PathBuf::from(value));
            if is_root_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot { path: normalized })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            exe_dir
                .ancestors()
                .find(|candidate| is_root_marker(candidate))
                .map(normalize_path)
                .ok_or_else(|| StartupError::RootNotFound {
                    start_dir: normalize_path(&exe_dir),
                    env_var: ROOT_ENV_VAR,
                })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn is_root_marker(path: &Path) -> bool {
    let has_resources = path.join("resources").is_dir();
    let workspace = path.join("Cargo.toml").is_file() && path.join("crates").is_dir();

    has_resources || workspace
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
