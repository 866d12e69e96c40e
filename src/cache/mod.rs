//! Query cache for server data.
//!
//! This module provides a key-addressed cache that:
//! - Serves fresh entries without touching the network
//! - Deduplicates concurrent fetches of the same key
//! - Marks keys stale when a mutation declares them affected
//! - Never expires entries on a timer

mod keys;
mod layer;
mod traits;

pub use keys::{MutationKind, QueryKey};
pub use layer::QueryCache;
pub use traits::{CacheResult, CacheSource};
