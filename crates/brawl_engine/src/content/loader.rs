use std::fs;
use std::io;
use std::path::PathBuf;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, info};

use crate::app::{
    Character, CharacterIdAllocator, Direction, Prop, Scene, SceneElement, SceneWorld,
};
use crate::asset_keys::{validate_asset_key, AssetKeyError};
use crate::geometry::Rect;
use crate::AppPaths;

use super::assets::{AssetError, AssetResolver};
use super::descriptor::{
    check_spawn_points, parse_descriptor, ElementDescriptor, SceneDescriptor,
};

/// Generator used for load-time placement. Same seed, same layout.
pub type SceneRng = ChaCha8Rng;

pub fn seeded_rng(seed: u64) -> SceneRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Anything that stops a scene from loading. A failed load never yields a
/// partially populated scene.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid scene id '{scene_id}': {source}")]
    InvalidSceneId {
        scene_id: String,
        #[source]
        source: AssetKeyError,
    },
    #[error("failed to read scene descriptor {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed scene descriptor at {path}: {message}")]
    Parse { path: String, message: String },
    #[error("elements[{index}] has unrecognized type '{tag}'; expected 'prop' or 'character'")]
    UnrecognizedElementType { index: usize, tag: String },
    #[error("{path} is missing required field '{field}'")]
    MissingField { path: String, field: &'static str },
    #[error("invalid value at {path}: {message}")]
    InvalidValue { path: String, message: String },
    #[error("malformed rectangle at {path}: {rect:?}")]
    MalformedRect { path: String, rect: Rect },
    #[error(
        "spawn pool exhausted: {required} characters need a spawn point but only {available} exist"
    )]
    ExhaustedSpawnPool { required: usize, available: usize },
    #[error("invalid asset reference at {path}: {source}")]
    InvalidAssetKey {
        path: String,
        #[source]
        source: AssetKeyError,
    },
    #[error(transparent)]
    Asset(#[from] AssetError),
}

pub fn scene_descriptor_path(paths: &AppPaths, scene_id: &str) -> Result<PathBuf, LoadError> {
    validate_asset_key(scene_id).map_err(|source| LoadError::InvalidSceneId {
        scene_id: scene_id.to_string(),
        source,
    })?;
    Ok(paths.scenes_dir.join(format!("{scene_id}.json")))
}

/// Reads `<scenes_dir>/<scene_id>.json` and places its content.
pub fn load_scene<R>(
    paths: &AppPaths,
    scene_id: &str,
    assets: &mut dyn AssetResolver,
    rng: &mut R,
) -> Result<Scene, LoadError>
where
    R: Rng + ?Sized,
{
    let path = scene_descriptor_path(paths, scene_id)?;
    debug!(scene_id, path = %path.display(), "scene_descriptor_read");
    let raw = fs::read_to_string(&path).map_err(|source| LoadError::Io {
        path: path.clone(),
        source,
    })?;
    let descriptor = parse_descriptor(&raw)?;
    build_scene(descriptor, assets, rng)
}

/// Places every element of `descriptor`. The spawn pool is shuffled once and
/// then consumed in order, one point per character; facing is a coin flip
/// between left and right. `rng` is the only randomness involved.
pub fn build_scene<R>(
    descriptor: SceneDescriptor,
    assets: &mut dyn AssetResolver,
    rng: &mut R,
) -> Result<Scene, LoadError>
where
    R: Rng + ?Sized,
{
    let required = descriptor.character_count();
    let available = descriptor.spawn_points.len();
    if required > available {
        return Err(LoadError::ExhaustedSpawnPool {
            required,
            available,
        });
    }

    check_spawn_points(&descriptor.spawn_points)?;

    let mut spawn_points = descriptor.spawn_points;
    spawn_points.shuffle(rng);
    let mut spawn_points = spawn_points.into_iter();

    let mut ids = CharacterIdAllocator::default();
    let mut elements = Vec::with_capacity(descriptor.elements.len());
    let mut prop_count = 0usize;
    for element in descriptor.elements {
        match element {
            ElementDescriptor::Prop {
                file,
                position,
                center,
                collision_box,
            } => {
                let image = assets.resolve_image(&file)?;
                elements.push(SceneElement::Prop(Prop {
                    image,
                    position,
                    center,
                    collision_box,
                }));
                prop_count += 1;
            }
            ElementDescriptor::Character { file } => {
                let position = spawn_points.next().ok_or(LoadError::ExhaustedSpawnPool {
                    required,
                    available,
                })?;
                let sprite_sheet = assets.resolve_sprite_sheet(&file)?;
                let direction = if rng.gen_bool(0.5) {
                    Direction::Left
                } else {
                    Direction::Right
                };
                let id = ids.allocate();
                debug!(
                    character = id.0,
                    file = file.as_str(),
                    x = position.x,
                    y = position.y,
                    facing = direction.as_token(),
                    "character_placed"
                );
                elements.push(SceneElement::Character(Character::new(
                    id,
                    position,
                    direction,
                    sprite_sheet,
                )));
            }
        }
    }

    info!(
        scene = descriptor.name.as_str(),
        props = prop_count,
        characters = required,
        no_go_zones = descriptor.no_go_zones.len(),
        interaction_zones = descriptor.interaction_zones.len(),
        unused_spawn_points = spawn_points.len(),
        "scene_loaded"
    );

    Ok(Scene::new(SceneWorld::new(
        descriptor.name,
        elements,
        descriptor.no_go_zones,
        descriptor.interaction_zones,
    )))
}
