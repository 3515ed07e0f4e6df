//! Closure of the kinship relations
//!
//! Closure is a single deterministic pass of four stages rather than a
//! fixpoint iteration. Each stage reads predicates finalised by earlier stages
//! and writes a predicate that no later stage rewrites:
//!
//! ```text
//! 1 parents-from-children   P40 + gender   ─► P22 / P25
//! 2 children-from-parents   P22 + P25      ─► P40
//! 3 siblings-from-children  P40            ─► P3373
//! 4 symmetric-closure       P3373, P26     ─► P3373, P26
//! ```
//!
//! Stages declare the stage they depend on; [`ClosurePipeline`] derives the
//! execution order from those declarations and refuses to run a stage before
//! its dependency has completed.

mod pipeline;
mod stages;

pub use pipeline::ClosurePipeline;
pub use stages::{ChildrenFromParents, ParentsFromChildren, SiblingsFromChildren, SymmetricClosure};

use crate::error::KinshipResult;
use crate::knowledge_base::KnowledgeBase;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Names of the closure stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageId {
    ParentsFromChildren,
    ChildrenFromParents,
    SiblingsFromChildren,
    SymmetricClosure,
}

impl StageId {
    pub fn name(self) -> &'static str {
        match self {
            StageId::ParentsFromChildren => "parents-from-children",
            StageId::ChildrenFromParents => "children-from-parents",
            StageId::SiblingsFromChildren => "siblings-from-children",
            StageId::SymmetricClosure => "symmetric-closure",
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// One inference rule of the closure pass.
///
/// `apply` must only add facts and must be idempotent: running it twice in a
/// row inserts nothing the second time.
pub trait ClosureStage {
    fn id(&self) -> StageId;

    /// The stage whose complete output this stage reads, if any.
    fn depends_on(&self) -> Option<StageId>;

    /// Short description for operator output.
    fn describe(&self) -> &'static str;

    /// Applies the rule, returning how many new facts were inserted.
    fn apply(&self, kb: &mut KnowledgeBase) -> KinshipResult<usize>;
}

/// Outcome of one executed stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: StageId,
    pub inserted: usize,
    pub facts_after: usize,
    pub duration_ms: u64,
}
