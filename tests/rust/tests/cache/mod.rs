//! Descriptor cache integration tests
//!
//! Single-flight loading under concurrency, eviction, and resolvers handed
//! out from the cache.

mod concurrency;
