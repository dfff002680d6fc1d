use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use image::RgbaImage;
use thiserror::Error;
use tracing::debug;

/// Handle to a decoded prop image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageKey(pub u32);

/// Handle to a character's animation data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteSheetKey(pub u32);

/// Pixels of exactly this color become fully transparent.
pub const COLOR_KEY: [u8; 3] = [0, 255, 0];

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read asset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to parse sprite sheet {path}: {source}")]
    SheetParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Turns descriptor file references into render-side handles. Repeated
/// references to one file should yield the same key.
pub trait AssetResolver {
    fn resolve_image(&mut self, file: &str) -> Result<ImageKey, AssetError>;
    fn resolve_sprite_sheet(&mut self, file: &str) -> Result<SpriteSheetKey, AssetError>;
}

/// Hands out keys without touching the filesystem. Used by headless runs and
/// tests where nothing is drawn.
#[derive(Debug, Default)]
pub struct PlaceholderAssets {
    images: HashMap<String, ImageKey>,
    sheets: HashMap<String, SpriteSheetKey>,
}

impl PlaceholderAssets {
    pub fn image_files(&self) -> usize {
        self.images.len()
    }

    pub fn sprite_sheet_files(&self) -> usize {
        self.sheets.len()
    }
}

impl AssetResolver for PlaceholderAssets {
    fn resolve_image(&mut self, file: &str) -> Result<ImageKey, AssetError> {
        let next = ImageKey(self.images.len() as u32);
        Ok(*self.images.entry(file.to_string()).or_insert(next))
    }

    fn resolve_sprite_sheet(&mut self, file: &str) -> Result<SpriteSheetKey, AssetError> {
        let next = SpriteSheetKey(self.sheets.len() as u32);
        Ok(*self.sheets.entry(file.to_string()).or_insert(next))
    }
}

/// Loads assets from files relative to the project root and keeps them
/// decoded for the renderer.
#[derive(Debug)]
pub struct FsAssetStore {
    root: PathBuf,
    images: Vec<RgbaImage>,
    image_keys: HashMap<String, ImageKey>,
    sheets: Vec<serde_json::Value>,
    sheet_keys: HashMap<String, SpriteSheetKey>,
}

impl FsAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            images: Vec::new(),
            image_keys: HashMap::new(),
            sheets: Vec::new(),
            sheet_keys: HashMap::new(),
        }
    }

    pub fn image(&self, key: ImageKey) -> Option<&RgbaImage> {
        self.images.get(key.0 as usize)
    }

    pub fn sprite_sheet(&self, key: SpriteSheetKey) -> Option<&serde_json::Value> {
        self.sheets.get(key.0 as usize)
    }

    fn read(&self, file: &str) -> Result<(PathBuf, Vec<u8>), AssetError> {
        let path = self.root.join(file);
        let bytes = fs::read(&path).map_err(|source| AssetError::Io {
            path: path.clone(),
            source,
        })?;
        Ok((path, bytes))
    }
}

impl AssetResolver for FsAssetStore {
    fn resolve_image(&mut self, file: &str) -> Result<ImageKey, AssetError> {
        if let Some(key) = self.image_keys.get(file) {
            return Ok(*key);
        }
        let (path, bytes) = self.read(file)?;
        let mut image = image::load_from_memory(&bytes)
            .map_err(|source| AssetError::Decode {
                path: path.clone(),
                source,
            })?
            .to_rgba8();
        apply_color_key(&mut image);

        let key = ImageKey(self.images.len() as u32);
        debug!(
            file,
            width = image.width(),
            height = image.height(),
            "image_loaded"
        );
        self.images.push(image);
        self.image_keys.insert(file.to_string(), key);
        Ok(key)
    }

    fn resolve_sprite_sheet(&mut self, file: &str) -> Result<SpriteSheetKey, AssetError> {
        if let Some(key) = self.sheet_keys.get(file) {
            return Ok(*key);
        }
        let (path, bytes) = self.read(file)?;
        let sheet = serde_json::from_slice::<serde_json::Value>(&bytes)
            .map_err(|source| AssetError::SheetParse { path, source })?;

        let key = SpriteSheetKey(self.sheets.len() as u32);
        debug!(file, "sprite_sheet_loaded");
        self.sheets.push(sheet);
        self.sheet_keys.insert(file.to_string(), key);
        Ok(key)
    }
}

fn apply_color_key(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        if pixel.0[..3] == COLOR_KEY {
            pixel.0[3] = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn placeholder_assets_reuse_keys_per_file() {
        let mut assets = PlaceholderAssets::default();
        let bar = assets.resolve_image("sets/bar.png").expect("bar");
        let table = assets.resolve_image("sets/table.png").expect("table");
        assert_ne!(bar, table);
        assert_eq!(assets.resolve_image("sets/bar.png").expect("bar again"), bar);
        assert_eq!(assets.image_files(), 2);
    }

    #[test]
    fn fs_store_keys_out_green_and_caches() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut source = RgbaImage::new(2, 1);
        source.put_pixel(0, 0, Rgba([0, 255, 0, 255]));
        source.put_pixel(1, 0, Rgba([200, 10, 10, 255]));
        fs::create_dir_all(dir.path().join("sets")).expect("mkdir");
        source
            .save(dir.path().join("sets/stool.png"))
            .expect("write png");

        let mut store = FsAssetStore::new(dir.path());
        let key = store.resolve_image("sets/stool.png").expect("decode");
        let image = store.image(key).expect("stored");
        assert_eq!(image.get_pixel(0, 0).0[3], 0);
        assert_eq!(image.get_pixel(1, 0).0, [200, 10, 10, 255]);
        assert_eq!(store.resolve_image("sets/stool.png").expect("cached"), key);
    }

    #[test]
    fn fs_store_parses_sprite_sheet_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("gunner.json"), r#"{"frames": [1, 2]}"#).expect("write");
        let mut store = FsAssetStore::new(dir.path());
        let key = store.resolve_sprite_sheet("gunner.json").expect("sheet");
        assert_eq!(store.sprite_sheet(key).expect("stored")["frames"][1], 2);
    }

    #[test]
    fn fs_store_reports_missing_and_corrupt_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("broken.png"), b"not a png").expect("write");
        fs::write(dir.path().join("broken.json"), b"{").expect("write");
        let mut store = FsAssetStore::new(dir.path());

        assert!(matches!(
            store.resolve_image("missing.png"),
            Err(AssetError::Io { .. })
        ));
        assert!(matches!(
            store.resolve_image("broken.png"),
            Err(AssetError::Decode { .. })
        ));
        assert!(matches!(
            store.resolve_sprite_sheet("broken.json"),
            Err(AssetError::SheetParse { .. })
        ));
    }
}
