//! Persistent asset storage.
//!
//! Clips and controllers are stored as JSON documents keyed by
//! [`AssetPath`]. Two backends ship with the crate: an in-memory store used by
//! tests and headless tooling, and a directory-backed store.

use std::fs;
use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::clip::Clip;
use crate::controller::AnimatorController;
use crate::error::{EmoteError, Result};
use crate::ids::AssetPath;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Asset {
    Clip(Clip),
    Controller(AnimatorController),
}

impl Asset {
    pub fn kind(&self) -> &'static str {
        match self {
            Asset::Clip(_) => "clip",
            Asset::Controller(_) => "controller",
        }
    }
}

pub trait AssetStore {
    fn exists(&self, path: &AssetPath) -> bool;

    /// Creates or overwrites the asset at `path`.
    fn write_asset(&mut self, path: &AssetPath, asset: Asset) -> Result<()>;

    fn load_asset(&self, path: &AssetPath) -> Result<Option<Asset>>;

    /// Makes pending writes durable.
    fn save(&mut self) -> Result<()>;

    /// Re-indexes the store so readers observe new assets.
    fn refresh(&mut self) -> Result<()>;

    fn unique_path(&self, desired: &AssetPath) -> AssetPath {
        generate_unique_path(desired, |p| self.exists(p))
    }

    /// Writes a new asset at the first free path derived from `desired`.
    fn create_asset(&mut self, desired: &AssetPath, asset: Asset) -> Result<AssetPath> {
        let path = self.unique_path(desired);
        trace!("create {} at {path}", asset.kind());
        self.write_asset(&path, asset)?;
        Ok(path)
    }

    fn copy_asset(&mut self, from: &AssetPath, to: &AssetPath) -> Result<AssetPath> {
        let asset = self
            .load_asset(from)?
            .ok_or_else(|| EmoteError::AssetNotFound(from.clone()))?;
        self.create_asset(to, asset)
    }

    fn load_clip(&self, path: &AssetPath) -> Result<Clip> {
        match self.load_asset(path)? {
            Some(Asset::Clip(clip)) => Ok(clip),
            Some(_) => Err(EmoteError::WrongAssetKind {
                path: path.clone(),
                expected: "clip",
            }),
            None => Err(EmoteError::AssetNotFound(path.clone())),
        }
    }

    fn load_controller(&self, path: &AssetPath) -> Result<AnimatorController> {
        match self.load_asset(path)? {
            Some(Asset::Controller(controller)) => Ok(controller),
            Some(_) => Err(EmoteError::WrongAssetKind {
                path: path.clone(),
                expected: "controller",
            }),
            None => Err(EmoteError::AssetNotFound(path.clone())),
        }
    }
}

/// First of `desired`, `name 1.ext`, `name 2.ext`, ... that is not taken.
pub fn generate_unique_path(desired: &AssetPath, exists: impl Fn(&AssetPath) -> bool) -> AssetPath {
    if !exists(desired) {
        return desired.clone();
    }
    let folder = desired.folder();
    let stem = desired.file_stem();
    let ext = desired.extension();
    let mut n = 1u32;
    loop {
        let candidate = AssetPath::new(format!("{folder}{stem} {n}{ext}"));
        if !exists(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Volatile store backed by a hash map.
#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    assets: HashMap<AssetPath, Asset>,
    read_only: bool,
    saves: usize,
    refreshes: usize,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects every subsequent write.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn paths(&self) -> Vec<AssetPath> {
        let mut paths: Vec<AssetPath> = self.assets.keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn save_count(&self) -> usize {
        self.saves
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes
    }
}

impl AssetStore for MemoryAssetStore {
    fn exists(&self, path: &AssetPath) -> bool {
        self.assets.contains_key(path)
    }

    fn write_asset(&mut self, path: &AssetPath, asset: Asset) -> Result<()> {
        if self.read_only {
            return Err(EmoteError::Storage(format!("store is read-only: {path}")));
        }
        self.assets.insert(path.clone(), asset);
        Ok(())
    }

    fn load_asset(&self, path: &AssetPath) -> Result<Option<Asset>> {
        Ok(self.assets.get(path).cloned())
    }

    fn save(&mut self) -> Result<()> {
        self.saves += 1;
        Ok(())
    }

    fn refresh(&mut self) -> Result<()> {
        self.refreshes += 1;
        Ok(())
    }
}

/// Store rooted at a directory; each asset is one pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct FsAssetStore {
    root: PathBuf,
}

impl FsAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_path(&self, path: &AssetPath) -> PathBuf {
        path.as_str()
            .split(['/', '\\'])
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |acc, part| acc.join(part))
    }
}

impl AssetStore for FsAssetStore {
    fn exists(&self, path: &AssetPath) -> bool {
        self.file_path(path).is_file()
    }

    fn write_asset(&mut self, path: &AssetPath, asset: Asset) -> Result<()> {
        let file = self.file_path(path);
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(&asset)?;
        fs::write(&file, text)?;
        debug!("wrote {} to {}", asset.kind(), file.display());
        Ok(())
    }

    fn load_asset(&self, path: &AssetPath) -> Result<Option<Asset>> {
        let file = self.file_path(path);
        if !file.is_file() {
            return Ok(None);
        }
        let text = fs::read_to_string(&file)?;
        Ok(Some(serde_json::from_str(&text)?))
    }

    // Writes are synchronous; nothing to flush.
    fn save(&mut self) -> Result<()> {
        Ok(())
    }

    fn refresh(&mut self) -> Result<()> {
        Ok(())
    }
}
