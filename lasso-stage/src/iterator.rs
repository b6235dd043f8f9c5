use lasso_buffer::PointData;
use lasso_dtype::Schema;
use lasso_error::{LassoResult, lasso_bail};

/// The capabilities shared by every iterator over the points of a stage.
pub trait StageIterator {
    /// The index of the next point to be read.
    fn index(&self) -> u64;

    /// The total number of points the iterator can reach.
    fn num_points(&self) -> u64;

    fn at_end(&self) -> bool {
        self.index() >= self.num_points()
    }

    /// Read up to `max_count` points into `data`, starting at its first record.
    ///
    /// Reads `min(max_count, data.capacity(), remaining)` points, sets the valid length of
    /// `data` to that count, advances the cursor past them and returns the count.
    fn read(&mut self, data: &mut PointData, max_count: usize) -> LassoResult<usize>;
}

/// A forward-only iterator starting at the first point. Once at the end every read
/// returns zero; it cannot be rewound.
pub trait SequentialIterator: StageIterator {
    /// Advance past up to `count` points without reading them, returning how many were skipped.
    fn skip(&mut self, count: u64) -> LassoResult<u64>;
}

/// An iterator that can be repositioned anywhere in the stage.
pub trait RandomIterator: StageIterator {
    /// Move the cursor to `position`, returning it.
    ///
    /// Seeking exactly to the end is allowed; anything beyond fails.
    fn seek(&mut self, position: u64) -> LassoResult<u64>;
}

/// A position within a fixed number of points, shared by the iterator implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    index: u64,
    num_points: u64,
}

impl Cursor {
    pub fn new(num_points: u64) -> Self {
        Self {
            index: 0,
            num_points,
        }
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn num_points(&self) -> u64 {
        self.num_points
    }

    pub fn remaining(&self) -> u64 {
        self.num_points.saturating_sub(self.index)
    }

    pub fn at_end(&self) -> bool {
        self.index >= self.num_points
    }

    /// The number of points the next read into `data` should produce.
    pub fn batch_len(&self, data: &PointData, max_count: usize) -> usize {
        let remaining = usize::try_from(self.remaining()).unwrap_or(usize::MAX);
        max_count.min(data.capacity()).min(remaining)
    }

    pub fn advance(&mut self, count: usize) {
        self.index = self.index.saturating_add(count as u64).min(self.num_points);
    }

    pub fn skip(&mut self, count: u64) -> u64 {
        let skipped = count.min(self.remaining());
        self.index += skipped;
        skipped
    }

    pub fn seek(&mut self, position: u64) -> LassoResult<u64> {
        if position > self.num_points {
            lasso_bail!(
                OutOfBounds: usize::try_from(position).unwrap_or(usize::MAX),
                0,
                usize::try_from(self.num_points).unwrap_or(usize::MAX)
            );
        }
        self.index = position;
        Ok(position)
    }
}

/// Check that `data` can hold the records of `schema` without reinterpretation.
pub fn check_layout(schema: &Schema, data: &PointData) -> LassoResult<()> {
    let layout = schema.layout();
    if !layout.is_compatible(data.layout()) {
        lasso_bail!(MismatchedTypes: schema, format!("{} byte records", data.layout().byte_size()));
    }
    Ok(())
}
