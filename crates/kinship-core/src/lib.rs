//! Core functionality for the kinship knowledge-base completer.
//!
//! Loads entity–predicate–entity facts about people, closes them under a
//! fixed set of kinship rules and derives closed-world cardinality
//! assertions for every person.
//!
//! ```
//! use kinship_core::{KinshipEngine, Predicate};
//!
//! let input = "Q1\tP40\tQ2\nQ1\tP40\tQ3\nQ1\tP21\tQ6581097\n";
//! let mut engine = KinshipEngine::default();
//! engine.load_reader(input.as_bytes(), "inline").unwrap();
//! engine.close().unwrap();
//!
//! let store = engine.knowledge_base().store();
//! assert!(store.contains("Q2", Predicate::Father, "Q1"));
//! assert!(store.contains("Q3", Predicate::Sibling, "Q2"));
//! ```

/// Closed-world cardinality policy and emission
pub mod cardinality;
/// Deterministic closure stages and their pipeline
pub mod closure;
/// Wire-format and tuning constants
pub mod constants;
/// End-to-end batch engine
pub mod engine;
/// Error types
pub mod error;
/// Interned, per-predicate indexed fact storage
pub mod fact_store;
/// Fact store plus the person registry
pub mod knowledge_base;
/// Line-oriented fact loading and filtering
pub mod loader;
/// Output of completed facts and cardinalities
pub mod writer;

pub use cardinality::{CardinalityEmitter, CardinalityPolicy, CardinalityStrategy, Witness};
pub use closure::{ClosurePipeline, ClosureStage, StageId, StageReport};
pub use engine::{KinshipEngine, RunReport};
pub use error::{KinshipError, KinshipResult};
pub use fact_store::{NodeId, PredicateCounts, TripleStore};
pub use knowledge_base::{KnowledgeBase, PersonRegistry};
pub use loader::{FactLoader, FilterStats, LoadStats, LoaderOptions};

pub use kinship_types::{CARDINALITY_MARKER, CardinalityAssertion, Gender, Predicate, Triple};
