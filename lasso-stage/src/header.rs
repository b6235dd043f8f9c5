use lasso_dtype::Schema;
use lasso_error::{LassoResult, lasso_err};

use crate::{Bounds, VariableLengthRecord};

/// What a stage reports about its points before any of them are read.
///
/// Built once by the stage that owns it, then only handed out by shared reference.
#[derive(Debug, Clone, Default)]
pub struct StageHeader {
    num_points: u64,
    bounds: Bounds<f64>,
    schema: Schema,
    metadata_records: Vec<VariableLengthRecord>,
}

impl StageHeader {
    pub fn new(schema: Schema, num_points: u64, bounds: Bounds<f64>) -> Self {
        Self {
            num_points,
            bounds,
            schema,
            metadata_records: Vec::new(),
        }
    }

    pub fn num_points(&self) -> u64 {
        self.num_points
    }

    pub fn set_num_points(&mut self, num_points: u64) {
        self.num_points = num_points;
    }

    pub fn bounds(&self) -> &Bounds<f64> {
        &self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Bounds<f64>) {
        self.bounds = bounds;
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Mutable access to the schema, for the stage populating it.
    pub fn schema_mut(&mut self) -> &mut Schema {
        &mut self.schema
    }

    pub fn metadata_records(&self) -> &[VariableLengthRecord] {
        &self.metadata_records
    }

    pub fn metadata_record_count(&self) -> usize {
        self.metadata_records.len()
    }

    pub fn metadata_record(&self, index: usize) -> LassoResult<&VariableLengthRecord> {
        self.metadata_records
            .get(index)
            .ok_or_else(|| lasso_err!(OutOfBounds: index, 0, self.metadata_records.len()))
    }

    pub fn push_metadata_record(&mut self, record: VariableLengthRecord) {
        self.metadata_records.push(record);
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    #[test]
    fn metadata_records_are_indexed() {
        let mut header = StageHeader::new(Schema::new(), 3, Bounds::default());
        header.push_metadata_record(VariableLengthRecord::new(0, b"a", 1, b"", Bytes::new(), 0));
        header.push_metadata_record(VariableLengthRecord::new(0, b"b", 2, b"", Bytes::new(), 0));

        assert_eq!(header.metadata_record_count(), 2);
        assert_eq!(header.metadata_record(1).unwrap().record_id(), 2);
        assert!(header.metadata_record(2).is_err());
        assert_eq!(header.num_points(), 3);
    }
}
