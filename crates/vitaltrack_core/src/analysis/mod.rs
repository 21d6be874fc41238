//! Read-only analysis over store contents.
//!
//! # Responsibility
//! - Derive dashboard counters, trend series and symptom/meal correlations.
//!
//! # Invariants
//! - Every function here is pure: same store contents in, same result out.
//! - Nothing in this module mutates or persists store data.
//! - Results never depend on storage order.

pub mod correlation;
pub mod stats;
pub mod trends;
