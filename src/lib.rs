//! vlist - A windowed virtualization cache over paginated data sources
//!
//! This crate exposes a logically large, randomly indexable sequence whose
//! items live in an expensive paginated store. Only a small window of pages
//! is kept in memory; pages are fetched on first access, prefetched in the
//! direction of travel and dropped once they sit idle.
//!
//! # Architecture
//!
//! - **Cache** (`cache`): the windowed collection and its helpers
//!   - `VirtualizingCollection`: index reads, read-ahead, idle eviction
//!   - `ManualClock` / `SystemClock`: touch-time sources for idle eviction
//!   - `SharedCollection`: thread-safe handle around one collection
//!   - `ErasedList`: `dyn Any` view for untyped binding layers
//!
//! - **Providers** (`provider`): the paginated data-source contract
//!   - `DataProvider`: count, offset fetch, keyset fetch after/before a key
//!   - `UserProvider` / `UserSearchProvider`: all users, or users whose
//!     name contains a search term
//!
//! - **Storage** (`storage`): an in-memory user table answering ordered
//!   range and keyset queries
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use vlist::cache::VirtualizingCollection;
//! use vlist::provider::UserProvider;
//! use vlist::storage::UserTable;
//!
//! let table = Arc::new(UserTable::generate(1_000));
//! let mut users = VirtualizingCollection::with_page_size(UserProvider::new(table), 100).unwrap();
//!
//! assert_eq!(users.len().unwrap(), 1_000);
//!
//! // Reading index 210 fetches page 2; its predecessor is prefetched too
//! let user = users.get(210).unwrap().unwrap();
//! assert_eq!(user.id, 211);
//! assert_eq!(users.tracked_page_count(), 2);
//! ```

pub mod cache;
pub mod common;
pub mod provider;
pub mod storage;

// Re-export commonly used types at the crate root
pub use common::{CacheConfig, Key, PageIndex, PageItem, Result, VlistError};
