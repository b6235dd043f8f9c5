//! A synthetic reader producing points without touching any file.

use lasso_buffer::PointData;
use lasso_dtype::{Dimension, Field, PType, Schema};
use lasso_error::{LassoResult, lasso_bail};

use crate::{
    Bounds, Cursor, RandomIterator, RandomIteratorRef, SequentialIterator, SequentialIteratorRef,
    Stage, StageHeader, StageIterator, check_layout,
};

/// How a [`FauxReader`] places its points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FauxMode {
    /// Every point sits at the minimum corner of the bounds.
    #[default]
    Constant,
    /// Points move evenly from the minimum to the maximum corner.
    Ramp,
}

/// Options for a [`FauxReader`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FauxReaderOptions {
    num_points: u64,
    bounds: Bounds<f64>,
    mode: FauxMode,
    with_time: bool,
}

impl FauxReaderOptions {
    pub fn new(num_points: u64, bounds: Bounds<f64>) -> Self {
        Self {
            num_points,
            bounds,
            mode: FauxMode::default(),
            with_time: false,
        }
    }

    pub fn with_mode(mut self, mode: FauxMode) -> Self {
        self.mode = mode;
        self
    }

    /// Add a `Time` dimension holding the index of each point.
    pub fn with_time(mut self, with_time: bool) -> Self {
        self.with_time = with_time;
        self
    }
}

/// A [`Stage`] that generates its points from [`FauxReaderOptions`].
///
/// Points have `X`, `Y` and `Z` as `f64`, plus `Time` as `u64` when requested.
#[derive(Debug)]
pub struct FauxReader {
    header: StageHeader,
    mode: FauxMode,
    time: Option<usize>,
}

impl FauxReader {
    pub fn try_new(options: FauxReaderOptions) -> LassoResult<Self> {
        if !options.bounds.is_valid() {
            lasso_bail!("FauxReader bounds are inverted: {}", options.bounds);
        }

        let mut schema = Schema::try_from_dimensions([
            Dimension::new(Field::X, PType::F64),
            Dimension::new(Field::Y, PType::F64),
            Dimension::new(Field::Z, PType::F64),
        ])?;
        let time = options
            .with_time
            .then(|| schema.add_dimension(Dimension::new(Field::Time, PType::U64)))
            .transpose()?;

        log::debug!(
            "Opened faux reader with {} points in {}",
            options.num_points,
            options.bounds
        );

        Ok(Self {
            header: StageHeader::new(schema, options.num_points, options.bounds),
            mode: options.mode,
            time,
        })
    }

    /// The coordinates of the point at `index`.
    pub fn point(&self, index: u64) -> [f64; 3] {
        let bounds = self.header.bounds();
        let (min, max) = (bounds.min(), bounds.max());
        match self.mode {
            FauxMode::Constant => min,
            FauxMode::Ramp => {
                let last = self.header.num_points().saturating_sub(1);
                if last == 0 {
                    return min;
                }
                [0, 1, 2]
                    .map(|axis| min[axis] + (max[axis] - min[axis]) * index as f64 / last as f64)
            }
        }
    }

    fn fill(&self, data: &mut PointData, start: u64, count: usize) -> LassoResult<()> {
        for (i, index) in (start..start + count as u64).enumerate() {
            let [x, y, z] = self.point(index);
            data.set_field(i, 0, x)?;
            data.set_field(i, 1, y)?;
            data.set_field(i, 2, z)?;
            if let Some(time) = self.time {
                data.set_field(i, time, index)?;
            }
        }
        Ok(())
    }
}

impl Stage for FauxReader {
    fn name(&self) -> &str {
        "drivers.faux.reader"
    }

    fn description(&self) -> &str {
        "Faux Reader"
    }

    fn header(&self) -> &StageHeader {
        &self.header
    }

    fn create_sequential_iterator(&self) -> LassoResult<SequentialIteratorRef<'_>> {
        Ok(Box::new(FauxIterator::new(self)))
    }

    fn create_random_iterator(&self) -> LassoResult<RandomIteratorRef<'_>> {
        Ok(Box::new(FauxIterator::new(self)))
    }
}

/// Iterates a [`FauxReader`], either sequentially or at random.
pub struct FauxIterator<'a> {
    reader: &'a FauxReader,
    cursor: Cursor,
}

impl<'a> FauxIterator<'a> {
    pub fn new(reader: &'a FauxReader) -> Self {
        Self {
            reader,
            cursor: Cursor::new(reader.num_points()),
        }
    }
}

impl StageIterator for FauxIterator<'_> {
    fn index(&self) -> u64 {
        self.cursor.index()
    }

    fn num_points(&self) -> u64 {
        self.cursor.num_points()
    }

    fn read(&mut self, data: &mut PointData, max_count: usize) -> LassoResult<usize> {
        check_layout(self.reader.schema(), data)?;
        let count = self.cursor.batch_len(data, max_count);
        self.reader.fill(data, self.cursor.index(), count)?;
        data.set_len(count)?;
        self.cursor.advance(count);
        Ok(count)
    }
}

impl SequentialIterator for FauxIterator<'_> {
    fn skip(&mut self, count: u64) -> LassoResult<u64> {
        Ok(self.cursor.skip(count))
    }
}

impl RandomIterator for FauxIterator<'_> {
    fn seek(&mut self, position: u64) -> LassoResult<u64> {
        self.cursor.seek(position)
    }
}
