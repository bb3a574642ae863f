//! Cross-clip key transplantation.

use crate::clip::Clip;

/// Copy every (path, property, curve) binding of `source` into
/// `destination`, overwriting bindings at the same (path, property).
/// Destination bindings without a counterpart in `source` are kept.
pub fn copy_bindings(source: &Clip, destination: &mut Clip) {
    for entry in source.entries() {
        destination.set_curve(entry.binding.clone(), entry.curve.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emote_api_core::{Curve, CurveBinding};

    #[test]
    fn union_with_overwrite() {
        let shared = CurveBinding::blend_shape("Body", "Smile");
        let only_dst = CurveBinding::new("Armature/Hand.L", "m_LocalRotation.x");
        let only_src = CurveBinding::new("Armature/Hand.R", "m_LocalRotation.x");

        let mut src = Clip::new("hand");
        src.set_curve(shared.clone(), Curve::held(100.0, 1.0));
        src.set_curve(only_src.clone(), Curve::held(0.5, 1.0));

        let mut dst = Clip::new("face");
        dst.set_curve(shared.clone(), Curve::held(10.0, 1.0));
        dst.set_curve(only_dst.clone(), Curve::held(0.25, 1.0));

        copy_bindings(&src, &mut dst);

        assert_eq!(dst.len(), 3);
        assert_eq!(dst.curve(&shared), src.curve(&shared));
        assert_eq!(dst.curve(&only_src), src.curve(&only_src));
        assert_eq!(dst.curve(&only_dst), Some(&Curve::held(0.25, 1.0)));
        assert_eq!(dst.name, "face");
    }

    #[test]
    fn empty_source_changes_nothing() {
        let mut dst = Clip::new("face");
        dst.set_curve(CurveBinding::blend_shape("Body", "A"), Curve::held(1.0, 1.0));
        let before = dst.clone();
        copy_bindings(&Clip::new("empty"), &mut dst);
        assert_eq!(dst, before);
    }
}
