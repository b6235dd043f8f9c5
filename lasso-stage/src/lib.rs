//! Pipeline stages for Lasso.
//!
//! A [`Stage`] reports a [`StageHeader`] and hands out [`SequentialIterator`]s and
//! [`RandomIterator`]s that fill [`PointData`](lasso_buffer::PointData) buffers. Readers such
//! as [`FauxReader`] produce points; filters such as [`CacheFilter`] wrap another stage.

pub use bounds::*;
pub use cache_filter::*;
pub use faux::*;
pub use header::*;
pub use iterator::*;
pub use stage::*;
pub use vlr::*;

mod bounds;
mod cache_filter;
mod faux;
mod header;
mod iterator;
mod stage;
mod vlr;
