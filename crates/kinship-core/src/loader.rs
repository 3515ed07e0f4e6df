//! Fact loading: decoding, normalisation and classification
//!
//! The loader turns a raw dump into normalised [`Triple`]s lazily, one line
//! at a time, and classifies each triple into the knowledge base:
//!
//! ```text
//! file ─► gunzip? ─► lines ─► trim/split ─► normalise ─► classify
//!                               │                          │
//!                               └─ malformed: warn + skip  ├─ relational ─► store + registry
//!                                                          ├─ P570 ─► dead set + registry
//!                                                          ├─ P21  ─► gender map
//!                                                          └─ other ─► ignored
//! ```

use crate::constants::{loader as defaults, wire};
use crate::error::{IoResultExt, KinshipError, KinshipResult};
use crate::knowledge_base::KnowledgeBase;
use flate2::bufread::MultiGzDecoder;
use kinship_types::{Gender, Predicate, Triple};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Loader settings, embedded in the CLI configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderOptions {
    /// Long-form namespaces stripped from every field
    pub namespace_prefixes: Vec<String>,
    /// Malformed lines reported individually before only being counted
    pub max_malformed_reports: usize,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            namespace_prefixes: defaults::DEFAULT_NAMESPACE_PREFIXES
                .iter()
                .map(|p| (*p).to_string())
                .collect(),
            max_malformed_reports: defaults::DEFAULT_MAX_MALFORMED_REPORTS,
        }
    }
}

/// Counters for one pass over the input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadStats {
    pub lines: usize,
    pub blank: usize,
    pub malformed: usize,
    pub relational: usize,
    pub death_dates: usize,
    pub genders: usize,
    pub unrecognised_genders: usize,
    pub ignored: usize,
}

impl LoadStats {
    /// Lines that normalised into a triple.
    pub fn triples(&self) -> usize {
        self.lines - self.blank - self.malformed
    }
}

/// Result of normalising one raw line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Blank,
    Malformed { fields: usize },
    Triple(Triple),
}

/// Trims brackets and whitespace from a field and strips every known namespace.
pub fn normalize_field(field: &str, prefixes: &[String]) -> String {
    let mut value = field.trim_matches(wire::FIELD_TRIM).to_string();
    for prefix in prefixes {
        if value.contains(prefix.as_str()) {
            value = value.replace(prefix.as_str(), "");
        }
    }
    value
}

/// Normalises a raw line into a triple, or says why it cannot be one.
pub fn normalize_line(line: &str, prefixes: &[String]) -> LineOutcome {
    let trimmed = line.trim_matches(wire::LINE_TRIM);
    if trimmed.is_empty() {
        return LineOutcome::Blank;
    }
    let fields: Vec<&str> = trimmed.split(wire::FIELD_DELIMITER).collect();
    match fields.as_slice() {
        [s, p, o] => LineOutcome::Triple(Triple::new(
            normalize_field(s, prefixes),
            normalize_field(p, prefixes),
            normalize_field(o, prefixes),
        )),
        other => LineOutcome::Malformed {
            fields: other.len(),
        },
    }
}

/// Wraps a buffered reader, transparently decoding gzip when the stream
/// starts with the gzip magic bytes.
pub fn decode_reader<'a, R: BufRead + 'a>(mut reader: R) -> std::io::Result<Box<dyn BufRead + 'a>> {
    let is_gzip = reader.fill_buf()?.starts_with(&wire::GZIP_MAGIC);
    if is_gzip {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}

/// Opens an input dump, compressed or not.
pub fn open_input(path: &Path) -> KinshipResult<Box<dyn BufRead>> {
    let file = File::open(path).with_path(path)?;
    decode_reader(BufReader::new(file)).with_path(path)
}

/// Lazy, single-pass sequence of normalised triples.
///
/// Malformed lines are reported and skipped; read failures end the sequence
/// with an error.
pub struct TripleReader<'o, R> {
    reader: R,
    source: PathBuf,
    options: &'o LoaderOptions,
    buffer: String,
    stats: LoadStats,
    finished: bool,
}

impl<'o, R: BufRead> TripleReader<'o, R> {
    pub fn new(reader: R, source: impl Into<PathBuf>, options: &'o LoaderOptions) -> Self {
        Self {
            reader,
            source: source.into(),
            options,
            buffer: String::new(),
            stats: LoadStats::default(),
            finished: false,
        }
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> LoadStats {
        self.stats
    }

    fn report_malformed(&self, fields: usize) {
        let max = self.options.max_malformed_reports;
        match MalformedReport::for_count(self.stats.malformed, max) {
            MalformedReport::Line => warn!(
                source = %self.source.display(),
                line = self.stats.lines,
                fields,
                content = self.buffer.trim_end(),
                "Skipping malformed fact line"
            ),
            MalformedReport::LimitReached => warn!(
                source = %self.source.display(),
                limit = max,
                "Further malformed lines are counted but not reported"
            ),
            MalformedReport::Silent => {}
        }
    }
}

/// What to log for the n-th malformed line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MalformedReport {
    Line,
    LimitReached,
    Silent,
}

impl MalformedReport {
    /// `count` is 1-based: the number of malformed lines seen so far.
    fn for_count(count: usize, max: usize) -> Self {
        if count <= max {
            Self::Line
        } else if count == max + 1 {
            Self::LimitReached
        } else {
            Self::Silent
        }
    }
}

impl<R: BufRead> Iterator for TripleReader<'_, R> {
    type Item = KinshipResult<Triple>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            self.buffer.clear();
            match self.reader.read_line(&mut self.buffer) {
                Ok(0) => self.finished = true,
                Ok(_) => {
                    self.stats.lines += 1;
                    match normalize_line(&self.buffer, &self.options.namespace_prefixes) {
                        LineOutcome::Triple(triple) => return Some(Ok(triple)),
                        LineOutcome::Blank => self.stats.blank += 1,
                        LineOutcome::Malformed { fields } => {
                            self.stats.malformed += 1;
                            self.report_malformed(fields);
                        }
                    }
                }
                Err(source) => {
                    self.finished = true;
                    return Some(Err(KinshipError::io(&self.source, source)));
                }
            }
        }
        None
    }
}

/// How a normalised triple was used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Relational(Predicate),
    DeathDate,
    Gender(Gender),
    UnrecognisedGender,
    Ignored,
}

/// Populates a knowledge base from a fact dump
#[derive(Debug, Clone, Default)]
pub struct FactLoader {
    options: LoaderOptions,
}

impl FactLoader {
    pub fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// Files one triple into the knowledge base.
    pub fn classify(triple: &Triple, kb: &mut KnowledgeBase) -> KinshipResult<Classification> {
        let Some(predicate) = triple.recognised_predicate() else {
            return Ok(Classification::Ignored);
        };
        match predicate {
            Predicate::DateOfDeath => {
                kb.add_death_date(&triple.subject);
                Ok(Classification::DeathDate)
            }
            Predicate::Gender => match Gender::from_code(&triple.object) {
                Some(gender) => {
                    kb.set_gender(&triple.subject, gender);
                    Ok(Classification::Gender(gender))
                }
                None => {
                    kb.clear_gender(&triple.subject);
                    Ok(Classification::UnrecognisedGender)
                }
            },
            relational => {
                kb.add_relation(&triple.subject, relational, &triple.object)?;
                Ok(Classification::Relational(relational))
            }
        }
    }

    /// Loads every triple of `reader` into `kb`.
    #[instrument(skip_all, fields(source = %source.as_ref().display()))]
    pub fn load<R: BufRead>(
        &self,
        reader: R,
        source: impl AsRef<Path>,
        kb: &mut KnowledgeBase,
    ) -> KinshipResult<LoadStats> {
        let mut triples = TripleReader::new(reader, source.as_ref(), &self.options);
        let mut stats = LoadStats::default();
        for triple in triples.by_ref() {
            match Self::classify(&triple?, kb)? {
                Classification::Relational(_) => stats.relational += 1,
                Classification::DeathDate => stats.death_dates += 1,
                Classification::Gender(_) => stats.genders += 1,
                Classification::UnrecognisedGender => stats.unrecognised_genders += 1,
                Classification::Ignored => stats.ignored += 1,
            }
        }
        let read = triples.stats();
        stats.lines = read.lines;
        stats.blank = read.blank;
        stats.malformed = read.malformed;

        if stats.malformed > 0 {
            warn!(malformed = stats.malformed, "Malformed fact lines were skipped");
        }
        info!(
            lines = stats.lines,
            relational = stats.relational,
            death_dates = stats.death_dates,
            genders = stats.genders,
            ignored = stats.ignored,
            people = kb.persons().len(),
            "Loaded facts"
        );
        Ok(stats)
    }

    /// Opens `path` (gzip or plain) and loads it into `kb`.
    pub fn load_path(&self, path: &Path, kb: &mut KnowledgeBase) -> KinshipResult<LoadStats> {
        let reader = open_input(path)?;
        self.load(reader, path, kb)
    }

    /// Filter-only mode: copies the triples whose predicate is relational to
    /// `out` without building a store.
    #[instrument(skip_all, fields(source = %source.as_ref().display()))]
    pub fn filter<R: BufRead, W: Write>(
        &self,
        reader: R,
        source: impl AsRef<Path>,
        mut out: W,
        destination: &Path,
    ) -> KinshipResult<FilterStats> {
        let mut triples = TripleReader::new(reader, source.as_ref(), &self.options);
        let mut kept = 0;
        for triple in triples.by_ref() {
            let triple = triple?;
            if triple.recognised_predicate().is_some_and(Predicate::is_relational) {
                writeln!(out, "{triple}").with_path(destination)?;
                kept += 1;
            }
        }
        out.flush().with_path(destination)?;

        let read = triples.stats();
        let stats = FilterStats {
            lines: read.lines,
            malformed: read.malformed,
            kept,
        };
        debug!(?stats, "Filter pass finished");
        info!(kept = stats.kept, lines = stats.lines, "Filtered relational facts");
        Ok(stats)
    }
}

/// Counters for a filter-only pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterStats {
    pub lines: usize,
    pub malformed: usize,
    pub kept: usize,
}
