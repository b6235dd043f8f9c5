use std::ops::Range;
use std::sync::Arc;

use lasso_error::{LassoResult, lasso_err};

use crate::{Dimension, Schema};

/// A shared reference to a [`SchemaLayout`].
pub type SchemaLayoutRef = Arc<SchemaLayout>;

/// The physical byte packing of a [`Schema`].
///
/// Dimensions are packed densely in schema order: the first dimension starts at offset zero
/// and every following dimension starts where the previous one ends.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaLayout {
    dimensions: Arc<[Dimension]>,
    offsets: Arc<[usize]>,
    byte_size: usize,
}

impl SchemaLayout {
    pub fn new(schema: &Schema) -> Self {
        let mut offsets = Vec::with_capacity(schema.len());
        let mut byte_size = 0;
        for dimension in schema.dimensions() {
            offsets.push(byte_size);
            byte_size += dimension.byte_width();
        }

        Self {
            dimensions: schema.dimensions().into(),
            offsets: offsets.into(),
            byte_size,
        }
    }

    /// The size in bytes of a single point record.
    pub fn byte_size(&self) -> usize {
        self.byte_size
    }

    /// The byte offset of the dimension at `index` within a point record.
    pub fn offset(&self, index: usize) -> LassoResult<usize> {
        self.offsets
            .get(index)
            .copied()
            .ok_or_else(|| lasso_err!(OutOfBounds: index, 0, self.offsets.len()))
    }

    /// The byte range of the dimension at `index` within a point record.
    pub fn range(&self, index: usize) -> LassoResult<Range<usize>> {
        let start = self.offset(index)?;
        Ok(start..start + self.dimensions[index].byte_width())
    }

    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    pub fn dimension(&self, index: usize) -> LassoResult<&Dimension> {
        self.dimensions
            .get(index)
            .ok_or_else(|| lasso_err!(OutOfBounds: index, 0, self.dimensions.len()))
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Whether records laid out by `other` can be read through this layout without copying.
    ///
    /// Field identifiers and scaling may differ, but every position must hold the same
    /// primitive type.
    pub fn is_compatible(&self, other: &SchemaLayout) -> bool {
        self.byte_size == other.byte_size
            && self.dimensions.len() == other.dimensions.len()
            && self
                .dimensions
                .iter()
                .zip(other.dimensions.iter())
                .all(|(a, b)| a.ptype() == b.ptype())
    }
}
