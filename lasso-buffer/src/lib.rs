//! Point buffers for Lasso.
//!
//! A [`PointData`] is a fixed-capacity array of point records stored contiguously in a
//! single zero-initialized allocation. Records are addressed through a [`SchemaLayout`](lasso_dtype::SchemaLayout):
//! the bytes of dimension `d` of point `p` live at `p * layout.byte_size() + layout.offset(d)`.
//!
//! Values are stored exactly as their dimension's primitive type. No scaling is applied here;
//! see [`lasso_dtype::Dimension::apply_scaling`].

use std::ops::Range;
use std::sync::Arc;

use bytes::BytesMut;
use lasso_dtype::{
    Dimension, NativePType, PType, PValue, Schema, SchemaLayoutRef, match_each_native_ptype,
};
use lasso_error::{LassoExpect, LassoResult, lasso_bail, lasso_err};

/// A fixed-capacity buffer of point records.
#[derive(Debug, Clone)]
pub struct PointData {
    layout: SchemaLayoutRef,
    capacity: usize,
    len: usize,
    bytes: BytesMut,
}

impl PointData {
    /// Allocate a zeroed buffer able to hold `capacity` records of the given layout.
    ///
    /// # Panics
    ///
    /// Panics if the buffer size does not fit in a `usize`, see [`PointData::try_new`].
    pub fn new(layout: SchemaLayoutRef, capacity: usize) -> Self {
        Self::try_new(layout, capacity).lasso_expect("point buffer size overflows usize")
    }

    /// Allocate a zeroed buffer able to hold `capacity` records of the given layout.
    ///
    /// Fails if the byte size of `capacity` records overflows a `usize`.
    pub fn try_new(layout: SchemaLayoutRef, capacity: usize) -> LassoResult<Self> {
        let size = capacity.checked_mul(layout.byte_size()).ok_or_else(|| {
            lasso_err!(
                "{} records of {} bytes overflow a point buffer",
                capacity,
                layout.byte_size()
            )
        })?;
        Ok(Self {
            layout,
            capacity,
            len: 0,
            bytes: BytesMut::zeroed(size),
        })
    }

    /// Allocate a buffer for the (cached) layout of `schema`.
    ///
    /// # Panics
    ///
    /// Panics if the buffer size does not fit in a `usize`.
    pub fn for_schema(schema: &Schema, capacity: usize) -> Self {
        Self::new(schema.layout(), capacity)
    }

    /// Fallible version of [`PointData::for_schema`].
    pub fn try_for_schema(schema: &Schema, capacity: usize) -> LassoResult<Self> {
        Self::try_new(schema.layout(), capacity)
    }

    pub fn layout(&self) -> &SchemaLayoutRef {
        &self.layout
    }

    /// The dimensions of the records in this buffer, in layout order.
    pub fn dimensions(&self) -> &[Dimension] {
        self.layout.dimensions()
    }

    /// The number of records this buffer can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of records that hold valid data, as reported by whoever filled the buffer.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Mark the first `len` records as valid.
    pub fn set_len(&mut self, len: usize) -> LassoResult<()> {
        if len > self.capacity {
            lasso_bail!(OutOfBounds: len, 0, self.capacity);
        }
        self.len = len;
        Ok(())
    }

    /// The raw bytes of all records, including those beyond [`PointData::len`].
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn record_range(&self, point: usize) -> LassoResult<Range<usize>> {
        if point >= self.capacity {
            lasso_bail!(OutOfBounds: point, 0, self.capacity);
        }
        let start = point * self.layout.byte_size();
        Ok(start..start + self.layout.byte_size())
    }

    fn field_range(&self, point: usize, dimension: usize) -> LassoResult<(Range<usize>, PType)> {
        let record = self.record_range(point)?;
        let field = self.layout.range(dimension)?;
        let ptype = self.layout.dimension(dimension)?.ptype();
        Ok((record.start + field.start..record.start + field.end, ptype))
    }

    /// The raw bytes of a single record.
    pub fn point_bytes(&self, point: usize) -> LassoResult<&[u8]> {
        let range = self.record_range(point)?;
        Ok(&self.bytes[range])
    }

    /// Read a dimension value whose native type is known statically.
    ///
    /// Fails if `T` does not match the primitive type of the dimension.
    pub fn get_field<T: NativePType>(&self, point: usize, dimension: usize) -> LassoResult<T> {
        let (range, ptype) = self.field_range(point, dimension)?;
        if ptype != T::PTYPE {
            lasso_bail!(MismatchedTypes: ptype, T::PTYPE);
        }
        Ok(T::read_le(&self.bytes[range]))
    }

    /// Write a dimension value whose native type is known statically.
    ///
    /// Fails if `T` does not match the primitive type of the dimension.
    pub fn set_field<T: NativePType>(
        &mut self,
        point: usize,
        dimension: usize,
        value: T,
    ) -> LassoResult<()> {
        let (range, ptype) = self.field_range(point, dimension)?;
        if ptype != T::PTYPE {
            lasso_bail!(MismatchedTypes: ptype, T::PTYPE);
        }
        value.write_le(&mut self.bytes[range]);
        Ok(())
    }

    /// Read a dimension value as a runtime-typed [`PValue`].
    pub fn get_value(&self, point: usize, dimension: usize) -> LassoResult<PValue> {
        let (range, ptype) = self.field_range(point, dimension)?;
        let raw = &self.bytes[range];
        Ok(match_each_native_ptype!(ptype, |$T| {
            PValue::from(<$T>::read_le(raw))
        }))
    }

    /// Write a runtime-typed value, converting it to the dimension's primitive type.
    ///
    /// Fails without modifying the buffer if the value cannot be represented by that type.
    pub fn set_value(&mut self, point: usize, dimension: usize, value: PValue) -> LassoResult<()> {
        let (range, ptype) = self.field_range(point, dimension)?;
        let raw = &mut self.bytes[range];
        match_each_native_ptype!(ptype, |$T| {
            let native: $T = value.as_primitive::<$T>()?;
            native.write_le(raw);
        });
        Ok(())
    }

    /// Copy record `src_point` of `src` into record `dst_point` of this buffer.
    ///
    /// Both buffers must share a compatible layout.
    pub fn copy_point_from(
        &mut self,
        dst_point: usize,
        src: &PointData,
        src_point: usize,
    ) -> LassoResult<()> {
        if !Arc::ptr_eq(&self.layout, &src.layout) && !self.layout.is_compatible(&src.layout) {
            lasso_bail!(
                MismatchedTypes: format!("{} byte records", self.layout.byte_size()),
                format!("{} byte records", src.layout.byte_size())
            );
        }
        let src_range = src.record_range(src_point)?;
        let dst_range = self.record_range(dst_point)?;
        self.bytes[dst_range].copy_from_slice(&src.bytes[src_range]);
        Ok(())
    }

    /// View the same bytes through a different, compatible layout without copying.
    pub fn reinterpret(self, layout: SchemaLayoutRef) -> LassoResult<Self> {
        if !self.layout.is_compatible(&layout) {
            return Err(lasso_err!(
                "layout with {} dimensions is not compatible with {} dimensions",
                layout.len(),
                self.layout.len()
            ));
        }
        Ok(Self { layout, ..self })
    }
}
