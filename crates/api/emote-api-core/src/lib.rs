//! emote-api-core: curve binding addressing and keyframe curves (engine-agnostic)
//!
//! A keyframe clip is a set of curves, each addressed by a [`CurveBinding`]:
//! a root-relative node path plus a property string such as
//! `"blendShape.Smile"`. The property family is the first `.`-delimited
//! segment of the property string (see [`PropertyPath`]).

pub mod binding;
pub mod curve;

pub use binding::{BindingError, CurveBinding, PropertyPath, BLEND_SHAPE_NAMESPACE};
pub use curve::{Curve, Keyframe};
