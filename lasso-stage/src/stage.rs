use lasso_dtype::Schema;
use lasso_error::LassoResult;

use crate::{Bounds, RandomIterator, SequentialIterator, StageHeader, VariableLengthRecord};

/// A boxed [`SequentialIterator`] borrowing its stage.
pub type SequentialIteratorRef<'a> = Box<dyn SequentialIterator + 'a>;
/// A boxed [`RandomIterator`] borrowing its stage.
pub type RandomIteratorRef<'a> = Box<dyn RandomIterator + 'a>;

/// A source of points in a pipeline: a reader, or a filter over another stage.
///
/// Everything a stage reports lives in its [`StageHeader`], which is populated once when the
/// stage is opened. Points are only reachable through the iterators it creates.
pub trait Stage {
    /// A stable, dotted identifier such as `drivers.las.reader`.
    fn name(&self) -> &str;

    /// A human-readable name.
    fn description(&self) -> &str;

    fn header(&self) -> &StageHeader;

    fn num_points(&self) -> u64 {
        self.header().num_points()
    }

    fn bounds(&self) -> &Bounds<f64> {
        self.header().bounds()
    }

    fn schema(&self) -> &Schema {
        self.header().schema()
    }

    fn metadata_record_count(&self) -> usize {
        self.header().metadata_record_count()
    }

    fn metadata_record(&self, index: usize) -> LassoResult<&VariableLengthRecord> {
        self.header().metadata_record(index)
    }

    fn create_sequential_iterator(&self) -> LassoResult<SequentialIteratorRef<'_>>;

    fn create_random_iterator(&self) -> LassoResult<RandomIteratorRef<'_>>;
}
