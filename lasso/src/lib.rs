//! Lasso, a point cloud data engine.
//!
//! Sources are [`stage::Stage`]s that describe their points with a [`dtype::Schema`] and
//! serve them through sequential and random iterators into [`buffer::PointData`] buffers.
//! A [`stage::CacheFilter`] keeps recently read blocks of any stage in a bounded
//! [`cache::BlockCache`].

pub use {
    lasso_buffer as buffer, lasso_cache as cache, lasso_dtype as dtype, lasso_error as error,
    lasso_metrics as metrics, lasso_stage as stage,
};

pub mod drivers {
    #[cfg(feature = "las")]
    pub use lasso_las as las;
}
