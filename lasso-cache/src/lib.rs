//! Bounded caches for Lasso.
//!
//! [`LruCache`] is a get-or-insert, least-recently-used index over cheap, non-owning values.
//! [`BlockCache`] pairs one with an [`Arena`] so that materialized blocks have a single owner
//! that disposes of them on eviction.

pub use arena::*;
pub use block::*;
pub use lru::*;

mod arena;
mod block;
mod lru;
