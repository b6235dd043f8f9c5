use std::fmt::{Display, Formatter};
use std::sync::{Arc, OnceLock};

use itertools::Itertools;
use lasso_error::{LassoResult, lasso_bail, lasso_err};

use crate::{Dimension, Field, SchemaLayout};

/// An ordered collection of [`Dimension`]s, unique by [`Field`].
///
/// Insertion order is significant: it defines both the enumeration order of the dimensions
/// and the order in which they are packed by [`SchemaLayout`]. The layout is computed lazily
/// and cached until the schema is next modified.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    dimensions: Vec<Dimension>,
    layout: OnceLock<Arc<SchemaLayout>>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a schema from an ordered sequence of dimensions.
    pub fn try_from_dimensions(dimensions: impl IntoIterator<Item = Dimension>) -> LassoResult<Self> {
        let mut schema = Self::new();
        for dimension in dimensions {
            schema.add_dimension(dimension)?;
        }
        Ok(schema)
    }

    /// Append a dimension, returning its index.
    ///
    /// Fails if a dimension with the same field identifier or name is already present.
    pub fn add_dimension(&mut self, dimension: Dimension) -> LassoResult<usize> {
        let name = dimension.field().name();
        if self.dimensions.iter().any(|d| d.field().name() == name) {
            lasso_bail!(DuplicateField: dimension.field());
        }
        self.dimensions.push(dimension);
        self.layout.take();
        Ok(self.dimensions.len() - 1)
    }

    /// Set the fixed-point scale and offset of an existing dimension.
    pub fn set_scaling(&mut self, field: &Field, scale: f64, offset: f64) -> LassoResult<()> {
        self.dimension_mut(field)
            .ok_or_else(|| lasso_err!("Unknown dimension: {field}"))?
            .set_scaling(scale, offset);
        Ok(())
    }

    /// Mutable access to a dimension, for the adapter that owns this schema.
    ///
    /// Drops the cached layout, since the caller may change anything about the dimension.
    pub fn dimension_mut(&mut self, field: &Field) -> Option<&mut Dimension> {
        self.layout.take();
        self.dimensions.iter_mut().find(|d| d.field() == field)
    }

    pub fn dimension(&self, field: &Field) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.field() == field)
    }

    pub fn dimension_index(&self, field: &Field) -> Option<usize> {
        self.dimensions.iter().position(|d| d.field() == field)
    }

    /// Get the dimension at the given position, failing if the index is out of bounds.
    pub fn dimension_at(&self, index: usize) -> LassoResult<&Dimension> {
        self.dimensions
            .get(index)
            .ok_or_else(|| lasso_err!(OutOfBounds: index, 0, self.dimensions.len()))
    }

    pub fn contains(&self, field: &Field) -> bool {
        self.dimension_index(field).is_some()
    }

    /// The dimensions in insertion order.
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// The physical layout of this schema.
    pub fn layout(&self) -> Arc<SchemaLayout> {
        self.layout
            .get_or_init(|| Arc::new(SchemaLayout::new(self)))
            .clone()
    }

    /// The size in bytes of a single point record.
    pub fn byte_size(&self) -> usize {
        self.layout().byte_size()
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.dimensions == other.dimensions
    }
}

impl Display for Schema {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self.dimensions.iter().format(", "))
    }
}

#[cfg(test)]
mod tests {
    use lasso_error::LassoError;

    use super::*;
    use crate::PType;

    fn xyz() -> Schema {
        Schema::try_from_dimensions([
            Dimension::new(Field::X, PType::I32),
            Dimension::new(Field::Y, PType::I32),
            Dimension::new(Field::Z, PType::I32),
        ])
        .unwrap()
    }

    #[test]
    fn preserves_insertion_order() {
        let mut schema = xyz();
        assert_eq!(schema.add_dimension(Dimension::new(Field::Time, PType::F64)).unwrap(), 3);
        assert_eq!(
            schema.dimensions().iter().map(|d| d.field().clone()).collect_vec(),
            vec![Field::X, Field::Y, Field::Z, Field::Time]
        );
        assert_eq!(schema.to_string(), "{X:i32, Y:i32, Z:i32, Time:f64}");
    }

    #[test]
    fn rejects_duplicate_fields() {
        let mut schema = xyz();
        let err = schema
            .add_dimension(Dimension::new(Field::Y, PType::F64))
            .unwrap_err();
        assert!(matches!(err, LassoError::DuplicateField(..)));
        assert_eq!(schema.len(), 3);
    }

    #[test]
    fn custom_field_cannot_shadow_well_known_name() {
        let mut schema = xyz();
        assert_eq!(Dimension::new("X", PType::F64).field(), &Field::X);
        assert!(matches!(
            schema.add_dimension(Dimension::new("X", PType::F64)).unwrap_err(),
            LassoError::DuplicateField(..)
        ));
        assert!(matches!(
            schema
                .add_dimension(Dimension::new(Field::Custom("Z".into()), PType::F64))
                .unwrap_err(),
            LassoError::DuplicateField(..)
        ));
        assert_eq!(schema.to_string(), "{X:i32, Y:i32, Z:i32}");
    }

    #[test]
    fn lookup() {
        let schema = xyz();
        assert_eq!(schema.dimension_index(&Field::Z), Some(2));
        assert_eq!(schema.dimension(&Field::Y).unwrap().ptype(), PType::I32);
        assert!(schema.dimension(&Field::Intensity).is_none());
        assert!(schema.dimension_at(3).is_err());
    }

    #[test]
    fn layout_is_recomputed_after_mutation() {
        let mut schema = xyz();
        let before = schema.layout();
        assert!(Arc::ptr_eq(&before, &schema.layout()));
        assert_eq!(before.byte_size(), 12);

        schema
            .add_dimension(Dimension::new(Field::Intensity, PType::U16))
            .unwrap();
        let after = schema.layout();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(after.byte_size(), 14);
    }

    #[test]
    fn scaling_updates_dimension() {
        let mut schema = xyz();
        schema.set_scaling(&Field::X, 0.01, 5.0).unwrap();
        let x = schema.dimension(&Field::X).unwrap();
        assert_eq!(x.scale(), 0.01);
        assert_eq!(x.offset(), 5.0);
        assert!(schema.set_scaling(&Field::Time, 1.0, 0.0).is_err());
    }
}
