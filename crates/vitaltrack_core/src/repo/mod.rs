//! Repository layer: key-value blob persistence.
//!
//! # Responsibility
//! - Define the persistence substrate contract consumed by the event store.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `set` replaces the whole blob in one step; readers never observe a
//!   partially written value.

pub mod blob_repo;
