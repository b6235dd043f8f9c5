//! The LAS driver for Lasso.
//!
//! [`LasReader`] normalizes the header of a LAS source, as reported by an external parsing
//! library behind [`ReaderFactory`], into a Lasso [`StageHeader`](lasso_stage::StageHeader):
//! point count, bounds, a [`Schema`](lasso_dtype::Schema) chosen by the [`PointFormat`], and
//! the source's variable length records.

pub use external::*;
pub use format::*;
pub use iterator::*;
pub use memory::*;
pub use reader::*;

mod external;
mod format;
mod iterator;
mod memory;
mod reader;
pub mod support;
