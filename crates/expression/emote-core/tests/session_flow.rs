mod common;

use common::{approx, fx_path, gesture_path, session, store, store_without, template_path};
use emote_core::{
    Advisory, AssetPath, AssetStore, EmoteError, LipSyncStyle, Motion, SortType, StateMachine,
    VISEMES,
};
use emote_test_fixtures::clips;

const BODY: usize = 0;
const MOUTH: usize = 1;
const SMILE: usize = 0;
const BLINK: usize = 1;
const AA: usize = 0;

fn contains(s: &emote_core::Session) -> Vec<bool> {
    s.working()
        .inventory
        .iter()
        .flat_map(|m| m.targets.iter().map(|t| t.is_contains))
        .collect()
}

#[test]
fn open_scans_the_fixture_avatar() {
    let st = store();
    let s = session("two-mesh-avatar", &st);
    let a = s.working();

    assert_eq!(a.fx_controller, Some(fx_path()));
    assert_eq!(a.gesture_controller, Some(gesture_path()));
    assert_eq!(a.target_fx_layer_index, 1);
    assert_eq!(s.save_folder(), "Assets/Avatar/");
    assert_eq!(s.clip_name(), "faceAnim");

    let names: Vec<&str> = a.inventory.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Body", "Mouth"]);
    assert!(a.inventory.mesh(MOUTH).unwrap().is_face);
    assert_eq!(a.baseline.len(), 3);
    assert!(a.baseline.iter().all(|e| e.path.is_empty() && e.value == 0.0));

    assert!(a.inventory.mesh(MOUTH).unwrap().targets[AA].is_exclusion);
    assert!(!a.inventory.mesh(BODY).unwrap().targets[SMILE].is_exclusion);

    assert_eq!(a.metadata.triangle_count, 1700);
    assert_eq!(a.metadata.triangle_count_inactive, 100);
    assert_eq!(a.metadata.materials, vec!["Skin", "Cloth", "Hair", "Felt"]);
    assert_eq!(a.metadata.lip_sync_style, LipSyncStyle::VisemeBlendShape);
    assert_eq!(a.metadata.lip_sync_shape_key_names.as_ref().map(Vec::len), Some(VISEMES.len()));
    assert_eq!(a.metadata.avatar_id, "avtr_00000000-0000-0000-0000-000000000001");
    assert!(approx(a.metadata.eye_position[1], 1.25, 1e-6));

    assert_eq!(a.eyelid_blend_shape_names[0].as_deref(), Some("Blink"));
    assert_eq!(a.eyelid_blend_shape_names[1], None);
    assert_eq!(a.eyelid_blend_shape_names[2].as_deref(), Some("Smile"));
}

#[test]
fn states_and_hand_pose_follow_the_selected_state() {
    let st = store();
    let mut s = session("two-mesh-avatar", &st);

    assert_eq!(s.state_names(&st).unwrap(), vec!["Fist", "Idle", "Victory"]);
    assert_eq!(s.advisories(&st).unwrap(), vec![Advisory::HandStateNotFound]);
    assert_eq!(s.hand_pose(&st).unwrap(), None);

    s.select_state(2);
    assert!(s.advisories(&st).unwrap().is_empty());
    assert_eq!(
        s.hand_pose(&st).unwrap(),
        Some(AssetPath::new(clips::asset_path("hand-fist").unwrap()))
    );
}

#[test]
fn bake_writes_only_authored_targets_and_binds_both_hands() {
    let mut st = store();
    let mut s = session("two-mesh-avatar", &st);

    s.reset_to_default();
    assert_eq!(contains(&s), vec![true, true, true]);

    assert!(s.set_contains(BODY, SMILE, false));
    assert!(s.set_weight(BODY, SMILE, 80.0));
    s.set_clip_name("happy");
    s.select_state(2);

    let path = s.bake(&mut st).unwrap();
    assert_eq!(path.as_str(), "Assets/Avatar/happy.anim");

    let clip = st.load_clip(&path).unwrap();
    assert_eq!(clip.name, "happy");
    assert_eq!(clip.len(), 1);
    let entry = &clip.entries()[0];
    assert_eq!(entry.binding.path, "Body");
    assert_eq!(entry.binding.property, "blendShape.Blink");
    assert_eq!(entry.curve.len(), 2);
    assert!(entry.curve.keys.iter().all(|k| k.value == 0.0));
    assert!(approx(entry.curve.keys[1].time, 1.0 / 60.0, 1e-6));

    let fx = st.load_controller(&fx_path()).unwrap();
    assert_eq!(fx.motion(1, "Victory"), Some(Motion::Clip(path.clone())));
    assert_eq!(fx.motion(2, "Victory"), Some(Motion::Clip(path.clone())));
    assert_eq!(
        fx.motion(1, "Fist").and_then(|m| m.clip().cloned()).map(|p| p.to_string()),
        Some("Assets/Proxy/proxy_hands_fist.anim".to_string())
    );

    // The preview never leaks: the live pose is back at baseline.
    assert_eq!(s.working().weight(BODY, SMILE), Some(0.0));
    assert_eq!(s.committed().weight(BODY, SMILE), Some(0.0));
}

#[test]
fn bake_without_mirroring_leaves_the_other_hand_alone() {
    let mut st = store();
    let mut s = session("two-mesh-avatar", &st);
    s.set_left_and_right(false);
    s.select_state(2);
    let path = s.bake(&mut st).unwrap();

    assert_eq!(path.as_str(), "Assets/Avatar/faceAnim.anim");
    let fx = st.load_controller(&fx_path()).unwrap();
    assert_eq!(fx.motion(1, "Victory"), Some(Motion::Clip(path)));
    assert_eq!(fx.motion(2, "Victory"), Some(Motion::None));
}

#[test]
fn repeated_bakes_never_overwrite() {
    let mut st = store();
    let mut s = session("two-mesh-avatar", &st);
    s.set_clip_name("same");
    let first = s.bake(&mut st).unwrap();
    s.set_clip_name("same");
    let second = s.bake(&mut st).unwrap();
    assert_eq!(first.as_str(), "Assets/Avatar/same.anim");
    assert_eq!(second.as_str(), "Assets/Avatar/same 1.anim");
}

#[test]
fn failed_bake_propagates_and_keeps_the_live_pose() {
    let mut st = store();
    let mut s = session("two-mesh-avatar", &st);
    s.reset_to_default();
    s.set_weight(BODY, SMILE, 80.0);
    st.set_read_only(true);

    let err = s.bake(&mut st).unwrap_err();
    assert!(err.is_persistence());
    assert!(matches!(err, EmoteError::Storage(_)));
    assert_eq!(s.working().weight(BODY, SMILE), Some(80.0));
    assert_eq!(contains(&s), vec![true, true, true]);
}

#[test]
fn edit_state_loads_the_bound_clip() {
    let st = store();
    let mut s = session("two-mesh-avatar", &st);

    assert!(s.edit_state(&st, 2).unwrap());
    assert_eq!(s.clip_name(), "smile");
    assert_eq!(s.selected_state(), 2);
    assert_eq!(contains(&s), vec![true, false, true]);
    assert_eq!(s.working().weight(BODY, SMILE), Some(80.0));
    assert_eq!(s.working().weight(MOUTH, AA), Some(30.0));

    // Proxy clip, empty slot, unknown index.
    assert!(!s.edit_state(&st, 0).unwrap());
    assert!(!s.edit_state(&st, 1).unwrap());
    assert!(!s.edit_state(&st, 9).unwrap());
    assert_eq!(s.clip_name(), "smile");
}

#[test]
fn loaded_snapshot_applies_only_selected_entries() {
    let st = store();
    let mut s = session("two-mesh-avatar", &st);
    let path = AssetPath::new(clips::asset_path("smile").unwrap());

    let mut entries = s.load_snapshot(&st, &path).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].path, "Armature/Hips/Head/Mouth");
    assert_eq!(entries[1].target_name, "vrc.v_aa");
    entries[1].selected = false;

    s.apply_loaded(&entries);
    assert_eq!(contains(&s), vec![true, false, false]);
    assert_eq!(s.working().weight(BODY, SMILE), Some(80.0));
    assert_eq!(s.working().weight(MOUTH, AA), Some(0.0));
    assert_eq!(s.clip_name(), "");

    let missing = s.load_snapshot(&st, &AssetPath::new("Assets/none.anim"));
    assert!(matches!(missing, Err(EmoteError::AssetNotFound(_))));
}

#[test]
fn apply_replaces_the_previous_pose_entirely() {
    let st = store();
    let mut s = session("two-mesh-avatar", &st);
    assert!(s.edit_state(&st, 2).unwrap());

    let blink = vec![emote_core::PoseSnapshotEntry::new("", "Blink", 40.0)];
    s.apply_loaded(&blink);
    assert_eq!(contains(&s), vec![false, true, false]);
    assert_eq!(s.working().weight(BODY, SMILE), Some(0.0));
    assert_eq!(s.working().weight(BODY, BLINK), Some(40.0));
    assert_eq!(s.working().weight(MOUTH, AA), Some(0.0));
}

#[test]
fn set_to_default_promotes_the_live_pose_on_both_models() {
    let st = store();
    let mut s = session("two-mesh-avatar", &st);
    s.set_weight(BODY, SMILE, 55.0);
    s.set_to_default();
    assert_eq!(s.working().baseline[0].value, 55.0);
    assert_eq!(s.committed().baseline[0].value, 55.0);

    s.set_weight(BODY, SMILE, 10.0);
    s.reset_to_default();
    assert_eq!(s.working().weight(BODY, SMILE), Some(55.0));
    assert_eq!(s.committed().weight(BODY, SMILE), Some(55.0));
}

#[test]
fn min_max_and_reset_all_values() {
    let st = store();
    let mut s = session("two-mesh-avatar", &st);
    assert!(s.set_max_value(BODY, BLINK));
    assert_eq!(s.working().weight(BODY, BLINK), Some(100.0));
    assert!(s.set_min_value(BODY, BLINK));
    assert_eq!(s.working().weight(BODY, BLINK), Some(-20.0));

    s.set_weight(BODY, SMILE, 70.0);
    s.set_weight(BODY, BLINK, 70.0);
    assert!(s.set_contains(BODY, BLINK, true));
    s.reset_all_values();
    assert_eq!(s.working().weight(BODY, SMILE), Some(70.0));
    assert_eq!(s.working().weight(BODY, BLINK), Some(-20.0));
    assert!(!s.set_max_value(7, 0));
}

#[test]
fn exclusion_edits_reclassify_both_models() {
    let st = store();
    let mut s = session("two-mesh-avatar", &st);
    let excluded = |s: &emote_core::Session| -> Vec<bool> {
        s.committed()
            .inventory
            .iter()
            .flat_map(|m| m.targets.iter().map(|t| t.is_exclusion))
            .collect()
    };
    assert_eq!(excluded(&s), vec![false, false, true]);

    s.add_exclusion("Sm");
    assert_eq!(excluded(&s), vec![true, false, true]);
    let last = s.config().exclusions.len() - 1;
    assert_eq!(s.remove_exclusion(last).as_deref(), Some("Sm"));
    assert_eq!(excluded(&s), vec![false, false, true]);

    assert!(s.edit_exclusion(0, "Bl"));
    assert_eq!(excluded(&s), vec![false, true, false]);

    s.set_exclusions(vec![String::new()]);
    assert_eq!(excluded(&s), vec![true, true, true]);
    s.set_exclusions(Vec::new());
    assert_eq!(excluded(&s), vec![false, false, false]);
}

#[test]
fn bulk_toggle_and_display_order() {
    let st = store();
    let mut s = session("two-mesh-avatar", &st);
    assert!(s.set_contains_all(BODY, true));
    assert!(s.working().inventory.mesh(BODY).unwrap().all_contained());
    assert!(!s.set_contains_all(5, true));

    let unsorted: Vec<String> = s.visible_targets(BODY).iter().map(|t| t.name.clone()).collect();
    assert_eq!(unsorted, vec!["Smile", "Blink"]);
    s.set_sort_type(SortType::AToZ);
    let sorted: Vec<String> = s.visible_targets(BODY).iter().map(|t| t.name.clone()).collect();
    assert_eq!(sorted, vec!["Blink", "Smile"]);
    assert!(s.visible_targets(MOUTH).is_empty());
}

#[test]
fn partial_configuration_is_remediated_from_a_template() {
    let mut st = store();
    let mut s = session("bare-avatar", &st);
    assert_eq!(s.advisories(&st).unwrap(), vec![Advisory::NoFxController]);
    assert_eq!(s.save_folder(), "Assets/");

    let fx = s.create_fx_controller(&mut st, &template_path()).unwrap();
    assert_eq!(fx.as_str(), "Assets/Bare_fx.controller");
    assert_eq!(s.working().fx_controller, Some(fx.clone()));
    assert_eq!(s.committed().fx_controller, Some(fx));
    assert_eq!(s.working().target_fx_layer_index, 1);
    assert_eq!(s.advisories(&st).unwrap(), vec![Advisory::NoGestureController]);

    let gesture = s.create_gesture_controller(&mut st, &template_path()).unwrap();
    assert_eq!(gesture.as_str(), "Assets/Bare_gesture.controller");
    assert!(s.advisories(&st).unwrap().is_empty());

    let pose = AssetPath::new(clips::asset_path("hand-fist").unwrap());
    assert!(s.set_hand_pose(&mut st, Some(pose.clone())).unwrap());
    assert_eq!(s.hand_pose(&st).unwrap(), Some(pose));
    let template = st.load_controller(&template_path()).unwrap();
    assert_eq!(template.motion(1, "Fist"), Some(Motion::None));
}

#[test]
fn dangling_gesture_reference_opens_as_unbound() {
    let mut st = store_without(&["gesture"]);
    assert!(!st.exists(&gesture_path()));
    let mut s = session("two-mesh-avatar", &st);
    assert_eq!(s.working().fx_controller, Some(fx_path()));
    assert_eq!(s.working().gesture_controller, None);
    assert_eq!(s.advisories(&st).unwrap(), vec![Advisory::NoGestureController]);
    assert_eq!(s.hand_pose(&st).unwrap(), None);

    let gesture = s.create_gesture_controller(&mut st, &template_path()).unwrap();
    assert_eq!(gesture.as_str(), "Assets/Avatar/Avatar_gesture.controller");
    assert_eq!(s.working().gesture_controller, Some(gesture));
    assert!(s.advisories(&st).unwrap().is_empty());
}

#[test]
fn bake_without_controller_only_creates_the_clip() {
    let mut st = store();
    let mut s = session("bare-avatar", &st);
    s.set_contains_all(0, true);
    s.set_weight(0, 0, 25.0);

    let path = s.bake(&mut st).unwrap();
    assert_eq!(path.as_str(), "Assets/faceAnim.anim");
    // Exclusion prefixes are case-sensitive: "VRC.v_PP" stays authored.
    let clip = st.load_clip(&path).unwrap();
    let properties: Vec<&str> = clip.bindings().map(|b| b.property.as_str()).collect();
    assert_eq!(properties, vec!["blendShape.Joy", "blendShape.VRC.v_PP"]);
    assert_eq!(clip.entries()[0].curve.keys[0].value, 25.0);
}

#[test]
fn viseme_auto_mapping_updates_the_descriptor() {
    let st = store();
    let mut s = session("bare-avatar", &st);
    assert_eq!(s.working().face_mesh, None);

    s.set_lip_sync_to_viseme(&st).unwrap();
    let face = s.scene().borrow().find("Face");
    assert_eq!(s.working().face_mesh, face);
    assert_eq!(s.committed().face_mesh, face);
    let names = s.working().metadata.lip_sync_shape_key_names.clone().unwrap();
    assert_eq!(names[0], "vrc.v_sil");
    assert_eq!(names[1], "VRC.v_PP");
    assert_eq!(names[2], "");
}

#[test]
fn save_folder_choice_survives_a_bake() {
    let mut st = store();
    let mut s = session("two-mesh-avatar", &st);
    s.set_save_folder("Assets/Faces");
    let path = s.bake(&mut st).unwrap();
    assert_eq!(path.as_str(), "Assets/Faces/faceAnim.anim");
    assert_eq!(s.save_folder(), "Assets/Faces");
    s.set_save_folder("");
    assert_eq!(s.save_folder(), "Assets/Avatar/");
}

#[test]
fn dispose_restores_the_baseline() {
    let st = store();
    let mut s = session("two-mesh-avatar", &st);
    let scene = s.scene().clone();
    let body = scene.borrow().find("Body").unwrap();
    s.set_weight(BODY, SMILE, 90.0);
    s.dispose();
    assert_eq!(scene.borrow().weight(body, SMILE), Some(0.0));
}
