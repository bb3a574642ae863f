#![allow(dead_code)]

use emote_core::{
    AnimatorController, Asset, AssetPath, AssetStore, Clip, Config, MemoryAssetStore, NodeId,
    Scene, SceneHandle, Session,
};
use emote_test_fixtures::{clips, controllers, scenes};

pub fn approx(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

pub fn scene(name: &str) -> (SceneHandle, NodeId) {
    let json = scenes::json(name).expect("scene fixture");
    let (scene, root) = Scene::from_json(&json).expect("scene parses");
    (scene.into_handle(), root)
}

/// Store holding every clip and controller fixture at its asset path.
pub fn store() -> MemoryAssetStore {
    store_without(&[])
}

/// Like [`store`], minus the named controller fixtures.
pub fn store_without(skipped_controllers: &[&str]) -> MemoryAssetStore {
    let mut store = MemoryAssetStore::new();
    for key in controllers::keys() {
        if skipped_controllers.contains(&key.as_str()) {
            continue;
        }
        let controller: AnimatorController = controllers::load(&key).expect("controller fixture");
        let path = AssetPath::new(controllers::asset_path(&key).expect("controller path"));
        store
            .write_asset(&path, Asset::Controller(controller))
            .expect("mount controller");
    }
    for key in clips::keys() {
        let clip: Clip = clips::load(&key).expect("clip fixture");
        let path = AssetPath::new(clips::asset_path(&key).expect("clip path"));
        store.write_asset(&path, Asset::Clip(clip)).expect("mount clip");
    }
    store
}

pub fn session(name: &str, store: &MemoryAssetStore) -> Session {
    let (scene, root) = scene(name);
    Session::open(scene, root, store, Config::default()).expect("session opens")
}

pub fn fx_path() -> AssetPath {
    AssetPath::new(controllers::asset_path("fx").expect("fx path"))
}

pub fn gesture_path() -> AssetPath {
    AssetPath::new(controllers::asset_path("gesture").expect("gesture path"))
}

pub fn template_path() -> AssetPath {
    AssetPath::new(controllers::asset_path("template").expect("template path"))
}
