use lasso_buffer::PointData;
use lasso_error::{LassoResult, lasso_bail};
use lasso_stage::{
    Cursor, RandomIterator, SequentialIterator, Stage, StageIterator, check_layout,
};

use crate::support::PointWriter;
use crate::{ExternalReader, LasReader};

/// The state shared by both LAS iterators: a private external reader and a cursor.
struct LasCursor<'a> {
    reader: &'a LasReader,
    external: Box<dyn ExternalReader>,
    writer: PointWriter,
    cursor: Cursor,
}

impl<'a> LasCursor<'a> {
    fn try_new(reader: &'a LasReader) -> LassoResult<Self> {
        Ok(Self {
            reader,
            external: reader.open_external()?,
            writer: PointWriter::try_new(reader.schema())?,
            cursor: Cursor::new(reader.num_points()),
        })
    }

    fn read(&mut self, data: &mut PointData, max_count: usize) -> LassoResult<usize> {
        check_layout(self.reader.schema(), data)?;
        let count = self.cursor.batch_len(data, max_count);

        if let Err(err) = self.read_points(data, count) {
            // a failed batch yields no points and leaves the external reader at the cursor
            data.set_len(0)?;
            if let Err(rewind) = self.external.seek(self.cursor.index()) {
                log::warn!(
                    "Failed to rewind {} to point {}: {}",
                    self.reader.file_name().display(),
                    self.cursor.index(),
                    rewind
                );
            }
            return Err(err);
        }

        data.set_len(count)?;
        self.cursor.advance(count);
        Ok(count)
    }

    fn read_points(&mut self, data: &mut PointData, count: usize) -> LassoResult<()> {
        for i in 0..count {
            let Some(point) = self.external.read_point()? else {
                lasso_bail!(
                    "{} ended at point {} of {}",
                    self.reader.file_name().display(),
                    self.cursor.index() + i as u64,
                    self.cursor.num_points()
                );
            };
            self.writer.write(data, i, &point)?;
        }
        Ok(())
    }

    fn seek(&mut self, position: u64) -> LassoResult<u64> {
        let mut cursor = self.cursor;
        cursor.seek(position)?;
        self.external.seek(position)?;
        self.cursor = cursor;
        Ok(position)
    }
}

/// Reads a [`LasReader`] from its first point to its last.
pub struct LasSequentialIterator<'a>(LasCursor<'a>);

impl<'a> LasSequentialIterator<'a> {
    pub fn try_new(reader: &'a LasReader) -> LassoResult<Self> {
        LasCursor::try_new(reader).map(Self)
    }
}

impl StageIterator for LasSequentialIterator<'_> {
    fn index(&self) -> u64 {
        self.0.cursor.index()
    }

    fn num_points(&self) -> u64 {
        self.0.cursor.num_points()
    }

    fn read(&mut self, data: &mut PointData, max_count: usize) -> LassoResult<usize> {
        self.0.read(data, max_count)
    }
}

impl SequentialIterator for LasSequentialIterator<'_> {
    fn skip(&mut self, count: u64) -> LassoResult<u64> {
        let skipped = count.min(self.0.cursor.remaining());
        self.0.seek(self.0.cursor.index() + skipped)?;
        Ok(skipped)
    }
}

/// Reads a [`LasReader`] from any position.
pub struct LasRandomIterator<'a>(LasCursor<'a>);

impl<'a> LasRandomIterator<'a> {
    pub fn try_new(reader: &'a LasReader) -> LassoResult<Self> {
        LasCursor::try_new(reader).map(Self)
    }
}

impl StageIterator for LasRandomIterator<'_> {
    fn index(&self) -> u64 {
        self.0.cursor.index()
    }

    fn num_points(&self) -> u64 {
        self.0.cursor.num_points()
    }

    fn read(&mut self, data: &mut PointData, max_count: usize) -> LassoResult<usize> {
        self.0.read(data, max_count)
    }
}

impl RandomIterator for LasRandomIterator<'_> {
    fn seek(&mut self, position: u64) -> LassoResult<u64> {
        self.0.seek(position)
    }
}
