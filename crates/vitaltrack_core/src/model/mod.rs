//! Domain model for meal/symptom event logging.
//!
//! # Responsibility
//! - Define canonical records persisted by the event store.
//! - Keep one document shape for persistence, export and import.
//!
//! # Invariants
//! - Record ids are unique per collection, never across collections.
//! - Persisted records carry no derived fields; stats and correlations are
//!   always recomputed.
//!
//! # See also
//! - [`document`] for import decoding and per-record rejection.
//! - [`crate::service::event_store`] for how records are created and persisted.

pub mod document;
pub mod meal;
pub mod record;
pub mod settings;
pub mod store_data;
pub mod symptom;
pub mod validation;
