use crate::cardinality::{CardinalityEmitter, CardinalityPolicy};
use crate::closure::{ClosurePipeline, StageReport};
use crate::error::{IoResultExt, KinshipResult};
use crate::fact_store::PredicateCounts;
use crate::knowledge_base::KnowledgeBase;
use crate::loader::{FactLoader, LoadStats, LoaderOptions};
use crate::writer;
use chrono::{DateTime, Utc};
use kinship_types::CardinalityAssertion;
use serde::Serialize;
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::{info, instrument};

/// Summary of one batch run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub load: LoadStats,
    pub stages: Vec<StageReport>,
    pub fact_counts: PredicateCounts,
    pub people: usize,
    pub cardinalities: usize,
}

impl RunReport {
    /// Writes the report as pretty JSON.
    pub fn write_json(&self, path: &Path) -> KinshipResult<()> {
        let mut out = writer::create_output(path)?;
        serde_json::to_writer_pretty(&mut out, self)?;
        out.flush().with_path(path)
    }
}

/// Main engine: load → close → emit → write
pub struct KinshipEngine {
    kb: KnowledgeBase,
    loader: FactLoader,
    pipeline: ClosurePipeline,
    policy: CardinalityPolicy,
}

impl Default for KinshipEngine {
    fn default() -> Self {
        Self::new(LoaderOptions::default())
    }
}

impl KinshipEngine {
    /// Create an engine with the standard closure pipeline and cardinality policy
    #[instrument(skip(options))]
    pub fn new(options: LoaderOptions) -> Self {
        info!(prefixes = options.namespace_prefixes.len(), "Creating kinship engine");
        Self {
            kb: KnowledgeBase::new(),
            loader: FactLoader::new(options),
            pipeline: ClosurePipeline::standard(),
            policy: CardinalityPolicy::standard(),
        }
    }

    pub fn with_pipeline(mut self, pipeline: ClosurePipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_policy(mut self, policy: CardinalityPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn pipeline(&self) -> &ClosurePipeline {
        &self.pipeline
    }

    pub fn policy(&self) -> &CardinalityPolicy {
        &self.policy
    }

    pub fn loader(&self) -> &FactLoader {
        &self.loader
    }

    /// Load facts from an already opened reader
    pub fn load_reader<R: BufRead>(&mut self, reader: R, source: &str) -> KinshipResult<LoadStats> {
        self.loader.load(reader, source, &mut self.kb)
    }

    /// Load facts from a plain or gzip-compressed file
    pub fn load_path(&mut self, path: &Path) -> KinshipResult<LoadStats> {
        self.loader.load_path(path, &mut self.kb)
    }

    /// Run the closure pipeline over everything loaded so far
    pub fn close(&mut self) -> KinshipResult<Vec<StageReport>> {
        self.pipeline.run(&mut self.kb)
    }

    /// Derive cardinality assertions from the current store
    pub fn cardinalities(&self) -> Vec<CardinalityAssertion> {
        CardinalityEmitter::new(&self.kb, &self.policy).emit()
    }

    /// Write the completed fact set; returns per-predicate counts
    pub fn write_facts(&self, path: &Path) -> KinshipResult<PredicateCounts> {
        let counts = writer::write_facts_to(self.kb.store(), path)?;
        for (predicate, count) in &counts {
            info!(
                predicate = predicate.code(),
                role = predicate.role(),
                facts = count,
                "Facts written"
            );
        }
        Ok(counts)
    }

    pub fn write_cardinalities(
        &self,
        assertions: &[CardinalityAssertion],
        path: &Path,
    ) -> KinshipResult<usize> {
        writer::write_cardinalities_to(assertions, path)
    }

    /// Complete batch run over `input`
    #[instrument(skip(self))]
    pub fn run(
        &mut self,
        input: &Path,
        facts_out: &Path,
        cardinalities_out: &Path,
    ) -> KinshipResult<RunReport> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let start_time = Utc::now();
        info!(run_id = %run_id, "Starting kinship run");

        let load = self.load_path(input)?;
        let stages = self.close()?;
        let assertions = self.cardinalities();
        let fact_counts = self.write_facts(facts_out)?;
        let cardinalities = self.write_cardinalities(&assertions, cardinalities_out)?;

        let report = RunReport {
            run_id,
            start_time,
            end_time: Utc::now(),
            load,
            stages,
            fact_counts,
            people: self.kb.persons().len(),
            cardinalities,
        };
        info!(
            run_id = %report.run_id,
            facts = self.kb.store().len(),
            cardinalities = report.cardinalities,
            "Kinship run completed"
        );
        Ok(report)
    }
}
