//! Translation cache backed by `SQLite`.

mod sqlite;

pub use sqlite::{CacheKey, CacheManager};
