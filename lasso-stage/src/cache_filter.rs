use std::cell::RefCell;

use lasso_buffer::PointData;
use lasso_cache::BlockCache;
use lasso_error::{LassoResult, lasso_bail, lasso_err};
use lasso_metrics::LassoMetrics;

use crate::{
    Cursor, RandomIterator, RandomIteratorRef, SequentialIterator, SequentialIteratorRef, Stage,
    StageHeader, StageIterator, check_layout,
};

/// Options for a [`CacheFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheFilterOptions {
    block_size: usize,
    max_cache_blocks: usize,
}

impl Default for CacheFilterOptions {
    fn default() -> Self {
        Self {
            block_size: 1024,
            max_cache_blocks: 16,
        }
    }
}

impl CacheFilterOptions {
    /// The number of points materialized together and cached under one key.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// The maximum number of blocks held at once.
    pub fn with_max_cache_blocks(mut self, max_cache_blocks: usize) -> Self {
        self.max_cache_blocks = max_cache_blocks;
        self
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn max_cache_blocks(&self) -> usize {
        self.max_cache_blocks
    }
}

/// A pass-through [`Stage`] that keeps recently read blocks of its upstream stage in memory.
///
/// Block `b` holds points `b * block_size .. (b + 1) * block_size`. Iterators over this stage
/// only ask the upstream stage for a block that is not already cached.
pub struct CacheFilter {
    upstream: Box<dyn Stage>,
    options: CacheFilterOptions,
    cache: RefCell<BlockCache<u64, PointData>>,
    metrics: LassoMetrics,
}

impl CacheFilter {
    pub fn try_new(
        upstream: Box<dyn Stage>,
        options: CacheFilterOptions,
        metrics: LassoMetrics,
    ) -> LassoResult<Self> {
        if options.block_size == 0 {
            lasso_bail!("CacheFilter block size must be positive");
        }
        let cache = BlockCache::try_new(options.max_cache_blocks, &metrics, "blocks")?;
        Ok(Self {
            upstream,
            options,
            cache: RefCell::new(cache),
            metrics,
        })
    }

    pub fn upstream(&self) -> &dyn Stage {
        self.upstream.as_ref()
    }

    pub fn options(&self) -> &CacheFilterOptions {
        &self.options
    }

    pub fn metrics(&self) -> &LassoMetrics {
        &self.metrics
    }

    /// The block indices currently cached, most recently used first.
    pub fn cache_keys(&self) -> Vec<u64> {
        self.cache.borrow().keys()
    }

    fn materialize(&self, block: u64) -> LassoResult<PointData> {
        let block_size = self.options.block_size;
        let start = block * block_size as u64;
        let mut iter = self.upstream.create_random_iterator()?;
        iter.seek(start)?;

        // the last block of a source is only as large as the points it holds
        let remaining = self.upstream.num_points().saturating_sub(start);
        let len = usize::try_from(remaining).map_or(block_size, |r| r.min(block_size));
        let mut data = PointData::try_for_schema(self.upstream.schema(), len)?;
        let count = iter.read(&mut data, len)?;
        log::debug!(
            "Materialized block {} ({} points) from {}",
            block,
            count,
            self.upstream.name()
        );
        Ok(data)
    }

    /// Copy up to `count` points starting at `position` into `data`, beginning at record
    /// `written`, block by block. Returns the number of points copied.
    fn copy_out(
        &self,
        data: &mut PointData,
        position: u64,
        written: usize,
        count: usize,
    ) -> LassoResult<usize> {
        let block_size = self.options.block_size as u64;
        let block = position / block_size;
        let first = usize::try_from(position % block_size)
            .map_err(|_| lasso_err!("point {} is not addressable in memory", position))?;

        let mut cache = self.cache.borrow_mut();
        let cached = cache.get_or_try_insert_with(block, || self.materialize(block))?;
        let take = cached.len().saturating_sub(first).min(count);
        for i in 0..take {
            data.copy_point_from(written + i, cached, first + i)?;
        }
        Ok(take)
    }
}

impl Stage for CacheFilter {
    fn name(&self) -> &str {
        "filters.cache"
    }

    fn description(&self) -> &str {
        "Cache Filter"
    }

    fn header(&self) -> &StageHeader {
        self.upstream.header()
    }

    fn create_sequential_iterator(&self) -> LassoResult<SequentialIteratorRef<'_>> {
        Ok(Box::new(CacheFilterIterator::new(self)))
    }

    fn create_random_iterator(&self) -> LassoResult<RandomIteratorRef<'_>> {
        Ok(Box::new(CacheFilterIterator::new(self)))
    }
}

/// Iterates a [`CacheFilter`], serving points from its block cache.
pub struct CacheFilterIterator<'a> {
    filter: &'a CacheFilter,
    cursor: Cursor,
}

impl<'a> CacheFilterIterator<'a> {
    pub fn new(filter: &'a CacheFilter) -> Self {
        Self {
            filter,
            cursor: Cursor::new(filter.num_points()),
        }
    }
}

impl StageIterator for CacheFilterIterator<'_> {
    fn index(&self) -> u64 {
        self.cursor.index()
    }

    fn num_points(&self) -> u64 {
        self.cursor.num_points()
    }

    fn read(&mut self, data: &mut PointData, max_count: usize) -> LassoResult<usize> {
        check_layout(self.filter.schema(), data)?;
        let count = self.cursor.batch_len(data, max_count);

        if let Err(err) = self.copy_batch(data, count) {
            data.set_len(0)?;
            return Err(err);
        }
        data.set_len(count)?;
        self.cursor.advance(count);
        Ok(count)
    }
}

impl CacheFilterIterator<'_> {
    /// Fill the first `count` records of `data` without moving the cursor.
    fn copy_batch(&self, data: &mut PointData, count: usize) -> LassoResult<()> {
        let mut written = 0;
        while written < count {
            let position = self.cursor.index() + written as u64;
            let copied = self
                .filter
                .copy_out(data, position, written, count - written)?;
            if copied == 0 {
                lasso_bail!(
                    "upstream {} returned a short block at point {}",
                    self.filter.upstream.name(),
                    position
                );
            }
            written += copied;
        }
        Ok(())
    }
}

impl SequentialIterator for CacheFilterIterator<'_> {
    fn skip(&mut self, count: u64) -> LassoResult<u64> {
        Ok(self.cursor.skip(count))
    }
}

impl RandomIterator for CacheFilterIterator<'_> {
    fn seek(&mut self, position: u64) -> LassoResult<u64> {
        self.cursor.seek(position)
    }
}
