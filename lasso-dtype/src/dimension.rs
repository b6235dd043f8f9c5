use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::{Field, PType};

/// A single named, typed field of a point record.
///
/// Dimensions carry an optional fixed-point scale and offset. Stored values are never
/// scaled; consumers that want real-world values apply [`Dimension::apply_scaling`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimension {
    field: Field,
    ptype: PType,
    scale: f64,
    offset: f64,
    description: Option<Arc<str>>,
}

impl Dimension {
    /// Create a new unscaled [`Dimension`].
    pub fn new(field: impl Into<Field>, ptype: PType) -> Self {
        Self {
            field: field.into(),
            ptype,
            scale: 1.0,
            offset: 0.0,
            description: None,
        }
    }

    /// Attach a fixed-point scale and offset to this dimension.
    pub fn with_scaling(mut self, scale: f64, offset: f64) -> Self {
        self.scale = scale;
        self.offset = offset;
        self
    }

    /// Attach a human-readable description to this dimension.
    pub fn with_description(mut self, description: impl Into<Arc<str>>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The semantic identifier of the dimension.
    pub fn field(&self) -> &Field {
        &self.field
    }

    /// The primitive type values of this dimension are stored as.
    pub fn ptype(&self) -> PType {
        self.ptype
    }

    /// The number of bytes this dimension occupies in a point record.
    pub fn byte_width(&self) -> usize {
        self.ptype.byte_width()
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether a non-trivial scale or offset is attached.
    pub fn is_scaled(&self) -> bool {
        self.scale != 1.0 || self.offset != 0.0
    }

    /// Convert a raw stored value into its real-world value.
    pub fn apply_scaling(&self, raw: f64) -> f64 {
        raw * self.scale + self.offset
    }

    /// Convert a real-world value back into the raw value that would be stored.
    pub fn remove_scaling(&self, value: f64) -> f64 {
        (value - self.offset) / self.scale
    }

    /// Replace the scale and offset in place.
    pub fn set_scaling(&mut self, scale: f64, offset: f64) {
        self.scale = scale;
        self.offset = offset;
    }
}

impl Display for Dimension {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.field, self.ptype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_roundtrip() {
        let x = Dimension::new(Field::X, PType::I32).with_scaling(0.25, 100.0);
        assert!(x.is_scaled());
        assert_eq!(x.apply_scaling(250.0), 162.5);
        assert_eq!(x.remove_scaling(162.5), 250.0);
        assert_eq!(x.byte_width(), 4);
    }

    #[test]
    fn display() {
        let d = Dimension::new("Reflectance", PType::F32);
        assert_eq!(d.to_string(), "Reflectance:f32");
        assert!(!d.is_scaled());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_roundtrip() {
        let d = Dimension::new(Field::Custom("Amplitude".into()), PType::U16)
            .with_scaling(0.5, 0.0)
            .with_description("echo amplitude");
        let json = serde_json::to_string(&d).unwrap();
        let back: Dimension = serde_json::from_str(&json).unwrap();
        assert_eq!(d, back);
    }
}
