mod assets;
mod descriptor;
mod loader;

pub use assets::{
    AssetError, AssetResolver, FsAssetStore, ImageKey, PlaceholderAssets, SpriteSheetKey,
    COLOR_KEY,
};
pub use descriptor::{
    parse_descriptor, ElementDescriptor, SceneDescriptor, ELEMENT_TYPE_CHARACTER,
    ELEMENT_TYPE_PROP,
};
pub use loader::{
    build_scene, load_scene, scene_descriptor_path, seeded_rng, LoadError, SceneRng,
};
