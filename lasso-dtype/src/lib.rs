//! The point record type system for Lasso.
//!
//! A [`Schema`] is the logical description of a point record: an ordered list of
//! [`Dimension`]s, each a named field with a primitive [`PType`]. A [`SchemaLayout`] is the
//! physical packing of that schema into bytes, which point buffers use to address fields.

pub use dimension::*;
pub use field::*;
pub use layout::*;
pub use ptype::*;
pub use pvalue::*;
pub use schema::*;

mod dimension;
mod field;
mod layout;
mod ptype;
mod pvalue;
mod schema;
