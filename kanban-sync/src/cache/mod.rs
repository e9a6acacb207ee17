//! Client-side query cache
//!
//! Views of authority state are held under [`CacheKey`]s: one per entity and one
//! per parent-scoped list. The Mutation Coordinator and the Synchronization Client
//! share a single [`QueryCache`] and address it with the same keys.

mod entry;
mod key;
mod refetch;
mod store;

pub use entry::{CacheEntry, EntryStatus};
pub use key::CacheKey;
pub use refetch::Refetcher;
pub use store::{QueryCache, Snapshot};
