//! Ordered execution of closure stages

use super::stages::{
    ChildrenFromParents, ParentsFromChildren, SiblingsFromChildren, SymmetricClosure,
};
use super::{ClosureStage, StageId, StageReport};
use crate::error::{KinshipError, KinshipResult};
use crate::knowledge_base::KnowledgeBase;
use ahash::AHashSet;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Runs closure stages in dependency order
pub struct ClosurePipeline {
    stages: Vec<Box<dyn ClosureStage>>,
}

impl Default for ClosurePipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl ClosurePipeline {
    /// An empty pipeline; stages are added with [`ClosurePipeline::with_stage`].
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// The four kinship stages.
    pub fn standard() -> Self {
        Self::new()
            .with_stage(ParentsFromChildren)
            .with_stage(ChildrenFromParents)
            .with_stage(SiblingsFromChildren)
            .with_stage(SymmetricClosure)
    }

    pub fn with_stage(mut self, stage: impl ClosureStage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn stages(&self) -> impl Iterator<Item = &dyn ClosureStage> {
        self.stages.iter().map(|stage| stage.as_ref())
    }

    fn stage(&self, id: StageId) -> KinshipResult<&dyn ClosureStage> {
        self.stages().find(|stage| stage.id() == id).ok_or_else(|| {
            KinshipError::pipeline_stage(id.name(), "stage not found after dependency resolution")
        })
    }

    /// Resolves stage dependencies into an execution order.
    ///
    /// # Errors
    /// Duplicate stages, dependencies on stages missing from the pipeline and
    /// circular dependencies are all [`KinshipError::Pipeline`] errors.
    pub fn execution_order(&self) -> KinshipResult<Vec<StageId>> {
        let mut seen = AHashSet::new();
        for stage in self.stages() {
            if !seen.insert(stage.id()) {
                return Err(KinshipError::pipeline_stage(
                    stage.id().name(),
                    "duplicate stage",
                ));
            }
        }
        for stage in self.stages() {
            if let Some(dep) = stage.depends_on() {
                if !seen.contains(&dep) {
                    return Err(KinshipError::pipeline_stage(
                        stage.id().name(),
                        format!("depends on {dep}, which is not part of the pipeline"),
                    ));
                }
            }
        }

        let mut resolved: Vec<StageId> = Vec::with_capacity(self.stages.len());
        let mut pending: Vec<&dyn ClosureStage> = self.stages().collect();

        while !pending.is_empty() {
            let before = pending.len();
            pending.retain(|stage| {
                let ready = stage.depends_on().is_none_or(|dep| resolved.contains(&dep));
                if ready {
                    resolved.push(stage.id());
                }
                !ready
            });

            if pending.len() == before {
                let unresolved: Vec<StageId> = pending.iter().map(|stage| stage.id()).collect();
                warn!(
                    unresolved_stages = ?unresolved,
                    "Circular dependency detected in closure stages"
                );
                return Err(KinshipError::pipeline(format!(
                    "circular dependency detected in closure stages: {unresolved:?}"
                )));
            }
        }

        Ok(resolved)
    }

    /// Applies one stage after checking that its dependency has completed.
    #[instrument(skip(self, kb, completed))]
    pub fn run_stage(
        &self,
        id: StageId,
        kb: &mut KnowledgeBase,
        completed: &[StageId],
    ) -> KinshipResult<StageReport> {
        let stage = self.stage(id)?;
        if let Some(dep) = stage.depends_on() {
            if !completed.contains(&dep) {
                return Err(KinshipError::pipeline_stage(
                    id.name(),
                    format!("cannot run before {dep} has completed"),
                ));
            }
        }

        let start = Instant::now();
        let inserted = stage.apply(kb)?;
        let report = StageReport {
            stage: id,
            inserted,
            facts_after: kb.store().len(),
            duration_ms: elapsed_ms(start.elapsed()),
        };

        info!(
            stage = %report.stage,
            inserted = report.inserted,
            facts_after = report.facts_after,
            execution_time_ms = report.duration_ms,
            "Closure stage completed"
        );
        Ok(report)
    }

    /// Runs every stage once, in dependency order.
    #[instrument(skip_all)]
    pub fn run(&self, kb: &mut KnowledgeBase) -> KinshipResult<Vec<StageReport>> {
        let order = self.execution_order()?;
        info!(stages = order.len(), facts = kb.store().len(), "Starting closure pass");

        let mut completed = Vec::with_capacity(order.len());
        let mut reports = Vec::with_capacity(order.len());
        for id in order {
            reports.push(self.run_stage(id, kb, &completed)?);
            completed.push(id);
        }

        info!(
            facts = kb.store().len(),
            inferred = reports.iter().map(|r| r.inserted).sum::<usize>(),
            "Closure pass completed"
        );
        Ok(reports)
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn elapsed_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
