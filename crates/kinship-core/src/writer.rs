//! Line-oriented output of completed facts and cardinality assertions

use crate::constants::output::WRITE_BUFFER_BYTES;
use crate::error::{IoResultExt, KinshipResult};
use crate::fact_store::{PredicateCounts, TripleStore};
use kinship_types::{CardinalityAssertion, Predicate};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Creates (or truncates) an output file behind a buffered writer.
pub fn create_output(path: &Path) -> KinshipResult<BufWriter<File>> {
    let file = File::create(path).with_path(path)?;
    Ok(BufWriter::with_capacity(WRITE_BUFFER_BYTES, file))
}

/// Writes every stored fact as `s\tp\to`, predicates in vocabulary order and
/// subjects/objects in first-seen order.
///
/// Returns the number of facts written per predicate.
pub fn write_facts<W: Write>(store: &TripleStore, mut out: W) -> io::Result<PredicateCounts> {
    let mut counts = PredicateCounts::new();
    for predicate in Predicate::RELATIONAL {
        let relation = store.relation(predicate);
        let mut written = 0;
        for subject in relation.sorted_subjects() {
            let s = store.node_name(subject);
            for object in relation.objects(subject).sorted() {
                writeln!(out, "{s}\t{predicate}\t{}", store.node_name(object))?;
                written += 1;
            }
        }
        counts.insert(predicate, written);
    }
    out.flush()?;
    Ok(counts)
}

/// Writes one assertion per line; returns how many were written.
pub fn write_cardinalities<W: Write>(
    assertions: &[CardinalityAssertion],
    mut out: W,
) -> io::Result<usize> {
    for assertion in assertions {
        writeln!(out, "{assertion}")?;
    }
    out.flush()?;
    Ok(assertions.len())
}

/// [`write_facts`] into a file.
pub fn write_facts_to(store: &TripleStore, path: &Path) -> KinshipResult<PredicateCounts> {
    let out = create_output(path)?;
    write_facts(store, out).with_path(path)
}

/// [`write_cardinalities`] into a file.
pub fn write_cardinalities_to(
    assertions: &[CardinalityAssertion],
    path: &Path,
) -> KinshipResult<usize> {
    let out = create_output(path)?;
    write_cardinalities(assertions, out).with_path(path)
}
