//! Keyframe clip asset: named, ordered collection of curves, each bound to a
//! (node path, property) pair.

use serde::{Deserialize, Serialize};

use emote_api_core::{Curve, CurveBinding};

use crate::error::Result;

/// Nominal sample rate of authored clips.
pub const SAMPLE_RATE: f32 = 60.0;
/// A held pose spans exactly one nominal frame.
pub const HELD_POSE_DURATION: f32 = 1.0 / SAMPLE_RATE;
/// Extension of persisted clips.
pub const CLIP_EXTENSION: &str = ".anim";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveEntry {
    #[serde(flatten)]
    pub binding: CurveBinding,
    pub curve: Curve,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub name: String,
    #[serde(default)]
    bindings: Vec<CurveEntry>,
}

impl Clip {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bindings: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn entries(&self) -> &[CurveEntry] {
        &self.bindings
    }

    pub fn bindings(&self) -> impl Iterator<Item = &CurveBinding> {
        self.bindings.iter().map(|e| &e.binding)
    }

    pub fn curve(&self, binding: &CurveBinding) -> Option<&Curve> {
        self.bindings
            .iter()
            .find(|e| &e.binding == binding)
            .map(|e| &e.curve)
    }

    /// Insert or overwrite the curve at `binding`. An overwritten binding
    /// keeps its position.
    pub fn set_curve(&mut self, binding: CurveBinding, curve: Curve) {
        match self.bindings.iter_mut().find(|e| e.binding == binding) {
            Some(entry) => entry.curve = curve,
            None => self.bindings.push(CurveEntry { binding, curve }),
        }
    }

    pub fn remove_curve(&mut self, binding: &CurveBinding) -> Option<Curve> {
        let idx = self.bindings.iter().position(|e| &e.binding == binding)?;
        Some(self.bindings.remove(idx).curve)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_curve_upserts_in_place() {
        let mut clip = Clip::new("c");
        let a = CurveBinding::blend_shape("Body", "A");
        let b = CurveBinding::blend_shape("Body", "B");
        clip.set_curve(a.clone(), Curve::held(1.0, HELD_POSE_DURATION));
        clip.set_curve(b.clone(), Curve::held(2.0, HELD_POSE_DURATION));
        clip.set_curve(a.clone(), Curve::held(3.0, HELD_POSE_DURATION));
        assert_eq!(clip.len(), 2);
        assert_eq!(clip.bindings().cloned().collect::<Vec<_>>(), vec![a.clone(), b]);
        assert_eq!(clip.curve(&a).and_then(|c| c.evaluate(0.0)), Some(3.0));
        assert!(clip.remove_curve(&a).is_some());
        assert!(clip.remove_curve(&a).is_none());
    }

    #[test]
    fn serialized_bindings_are_flat() {
        let mut clip = Clip::new("smile");
        clip.set_curve(CurveBinding::blend_shape("Body", "Smile"), Curve::held(80.0, 0.5));
        let value: serde_json::Value = serde_json::from_str(&clip.to_json().unwrap()).unwrap();
        assert_eq!(value["bindings"][0]["path"], "Body");
        assert_eq!(value["bindings"][0]["property"], "blendShape.Smile");
        assert_eq!(value["bindings"][0]["curve"]["keys"][1]["time"], 0.5);
        assert_eq!(Clip::from_json(&clip.to_json().unwrap()).unwrap(), clip);
    }
}
