//! Core use-case services.
//!
//! # Responsibility
//! - Own the canonical in-memory store and its persistence round-trip.
//! - Provide export/import flows over the store.
//! - Keep front-end layers decoupled from storage details.

pub mod event_store;
pub mod transfer;
