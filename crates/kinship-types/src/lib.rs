//! Kinship Types
//!
//! This crate defines the closed vocabulary and the value types shared by the
//! kinship workspace (currently `kinship-core` and `kinship-cli`). Keeping the
//! predicate set here lets the loader, the closure stages and the cardinality
//! policy agree on one definition of what a recognised predicate is.

#![deny(missing_docs)]

mod types;
pub use types::{
    CARDINALITY_MARKER, CardinalityAssertion, Gender, ParsePredicateError, Predicate, Triple,
};
