use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    scenes: HashMap<String, String>,
    clips: HashMap<String, AssetEntry>,
    controllers: HashMap<String, AssetEntry>,
    configs: HashMap<String, String>,
}

/// A fixture file plus the store path it is mounted at in tests.
#[derive(Debug, Deserialize)]
struct AssetEntry {
    file: String,
    asset_path: String,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

fn sorted_keys<T>(map: &HashMap<String, T>) -> Vec<String> {
    let mut keys: Vec<String> = map.keys().cloned().collect();
    keys.sort();
    keys
}

/// Character scenes (node trees with renderers and a descriptor).
pub mod scenes {
    use super::*;

    pub fn keys() -> Vec<String> {
        sorted_keys(&MANIFEST.scenes)
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.scenes, "scene", name)?;
        read_to_string(rel)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.scenes, "scene", name)?;
        super::load_json(rel)
    }
}

/// Keyframe clips.
pub mod clips {
    use super::*;

    pub fn keys() -> Vec<String> {
        sorted_keys(&MANIFEST.clips)
    }

    pub fn json(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.clips, "clip", name)?;
        read_to_string(&entry.file)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let entry = lookup(&MANIFEST.clips, "clip", name)?;
        super::load_json(&entry.file)
    }

    /// Store path the clip is expected at (e.g. `Assets/Face/smile.anim`).
    pub fn asset_path(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.clips, "clip", name)?;
        Ok(entry.asset_path.clone())
    }
}

/// Animation state-machine controllers.
pub mod controllers {
    use super::*;

    pub fn keys() -> Vec<String> {
        sorted_keys(&MANIFEST.controllers)
    }

    pub fn json(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.controllers, "controller", name)?;
        read_to_string(&entry.file)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let entry = lookup(&MANIFEST.controllers, "controller", name)?;
        super::load_json(&entry.file)
    }

    pub fn asset_path(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.controllers, "controller", name)?;
        Ok(entry.asset_path.clone())
    }
}

/// Editor settings documents.
pub mod configs {
    use super::*;

    pub fn keys() -> Vec<String> {
        sorted_keys(&MANIFEST.configs)
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.configs, "config", name)?;
        read_to_string(rel)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let rel = lookup(&MANIFEST.configs, "config", name)?;
        Ok(resolve_path(rel))
    }
}
