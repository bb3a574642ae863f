//! Curve binding addressing.
//!
//! Grammar for property strings:
//!   namespace.name
//! - the first `.` separates the property family (`namespace`) from the rest
//! - the rest (`name`) is kept verbatim and may itself contain dots
//!   Examples:
//!   "blendShape.Smile"     -> namespace="blendShape", name="Smile"
//!   "blendShape.vrc.v_aa"  -> namespace="blendShape", name="vrc.v_aa"
//!   "m_IsActive"           -> namespace="m_IsActive", name=""

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Property family of morph-target weight curves.
pub const BLEND_SHAPE_NAMESPACE: &str = "blendShape";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("empty property string")]
    EmptyProperty,
    #[error("empty property namespace in '{0}'")]
    EmptyNamespace(String),
}

/// Parsed form of a binding's property string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    pub namespace: String,
    pub name: String,
}

impl PropertyPath {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Property path for the weight of the morph target `name`.
    pub fn blend_shape(name: impl Into<String>) -> Self {
        Self::new(BLEND_SHAPE_NAMESPACE, name)
    }

    pub fn parse(s: &str) -> Result<Self, BindingError> {
        if s.is_empty() {
            return Err(BindingError::EmptyProperty);
        }
        let (namespace, name) = match s.split_once('.') {
            Some((ns, rest)) => (ns, rest),
            None => (s, ""),
        };
        if namespace.is_empty() {
            return Err(BindingError::EmptyNamespace(s.to_string()));
        }
        Ok(Self::new(namespace, name))
    }

    pub fn is_blend_shape(&self) -> bool {
        self.namespace == BLEND_SHAPE_NAMESPACE
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            f.write_str(&self.namespace)
        } else {
            write!(f, "{}.{}", self.namespace, self.name)
        }
    }
}

impl FromStr for PropertyPath {
    type Err = BindingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PropertyPath::parse(s)
    }
}

/// Address of one curve inside a clip: node path relative to the clip's
/// playback root plus the animated property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurveBinding {
    /// Slash-delimited node path relative to the playback root (may be empty).
    pub path: String,
    pub property: String,
}

impl CurveBinding {
    pub fn new(path: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            property: property.into(),
        }
    }

    /// Binding for the weight of morph target `name` on the node at `path`.
    pub fn blend_shape(path: impl Into<String>, name: &str) -> Self {
        Self::new(path, PropertyPath::blend_shape(name).to_string())
    }

    pub fn property_path(&self) -> Result<PropertyPath, BindingError> {
        PropertyPath::parse(&self.property)
    }

    /// Morph-target name when this binding addresses a blend-shape weight.
    pub fn blend_shape_name(&self) -> Option<String> {
        self.property_path()
            .ok()
            .filter(PropertyPath::is_blend_shape)
            .map(|p| p.name)
    }
}

impl fmt::Display for CurveBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_blend_shape_property() {
        let p = PropertyPath::parse("blendShape.Smile").unwrap();
        assert_eq!(p.namespace, "blendShape");
        assert_eq!(p.name, "Smile");
        assert!(p.is_blend_shape());
        assert_eq!(p.to_string(), "blendShape.Smile");
    }

    #[test]
    fn dotted_names_keep_their_dots() {
        let p = PropertyPath::parse("blendShape.vrc.v_aa").unwrap();
        assert_eq!(p.namespace, "blendShape");
        assert_eq!(p.name, "vrc.v_aa");
    }

    #[test]
    fn property_without_dot_is_all_namespace() {
        let p = PropertyPath::parse("m_IsActive").unwrap();
        assert_eq!(p.namespace, "m_IsActive");
        assert!(p.name.is_empty());
        assert_eq!(p.to_string(), "m_IsActive");
    }

    #[test]
    fn parse_rejects_empty() {
        assert_eq!(PropertyPath::parse(""), Err(BindingError::EmptyProperty));
        assert!(matches!(
            PropertyPath::parse(".Smile"),
            Err(BindingError::EmptyNamespace(_))
        ));
    }

    #[test]
    fn blend_shape_name_requires_exact_namespace() {
        let b = CurveBinding::blend_shape("Body", "vrc.v_aa");
        assert_eq!(b.property, "blendShape.vrc.v_aa");
        assert_eq!(b.blend_shape_name().as_deref(), Some("vrc.v_aa"));

        let other = CurveBinding::new("Body", "blendShapeX.Smile");
        assert_eq!(other.blend_shape_name(), None);

        let material = CurveBinding::new("Body", "material._Color.r");
        assert_eq!(material.property_path().unwrap().namespace, "material");
        assert_eq!(material.blend_shape_name(), None);

        assert_eq!(CurveBinding::new("Body", "").blend_shape_name(), None);
    }
}
