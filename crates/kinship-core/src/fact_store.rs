//! Indexed triple storage
//!
//! Identifiers are interned once into dense [`NodeId`]s and every relational
//! predicate owns its own subject → object-set index. Closure stages work on
//! node ids only; string lookups are provided for the loader, the writer and
//! tests.

use crate::error::{KinshipError, KinshipResult};
use ahash::{AHashMap, AHashSet};
use kinship_types::Predicate;
use std::collections::BTreeMap;

/// Dense identifier of an interned subject or object
pub type NodeId = u32;

/// Per-predicate fact counts, ordered by predicate
pub type PredicateCounts = BTreeMap<Predicate, usize>;

/// Arena of interned identifiers.
///
/// Ids are handed out in first-seen order starting at 0, so sorting ids
/// reproduces input order.
#[derive(Debug, Default, Clone)]
pub struct NodeArena {
    names: Vec<Box<str>>,
    ids: AHashMap<Box<str>, NodeId>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of `name`, interning it on first sight.
    ///
    /// # Panics
    /// If more than `u32::MAX` distinct identifiers are interned.
    pub fn intern(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = NodeId::try_from(self.names.len())
            .expect("node arena exceeded u32::MAX entries");
        let boxed: Box<str> = name.into();
        self.names.push(boxed.clone());
        self.ids.insert(boxed, id);
        id
    }

    /// Looks an identifier up without interning it.
    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.ids.get(name).copied()
    }

    /// The identifier behind `id`.
    ///
    /// # Panics
    /// If `id` was not handed out by this arena.
    pub fn name(&self, id: NodeId) -> &str {
        &self.names[id as usize]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Read-only view of the objects related to one subject.
///
/// Absent subjects yield an empty view, so callers never need to check for
/// key presence first.
#[derive(Debug, Clone, Copy)]
pub struct Objects<'a> {
    set: Option<&'a AHashSet<NodeId>>,
}

impl<'a> Objects<'a> {
    pub fn len(&self) -> usize {
        self.set.map_or(0, |set| set.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, object: NodeId) -> bool {
        self.set.is_some_and(|set| set.contains(&object))
    }

    /// Objects in unspecified order.
    pub fn iter(self) -> impl Iterator<Item = NodeId> + 'a {
        self.set.into_iter().flat_map(|set| set.iter().copied())
    }

    /// Objects in first-seen order.
    pub fn sorted(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.iter().collect();
        ids.sort_unstable();
        ids
    }
}

/// Subject → object-set index of a single predicate.
#[derive(Debug, Default, Clone)]
pub struct RelationIndex {
    subjects: AHashMap<NodeId, AHashSet<NodeId>>,
    fact_count: usize,
}

impl RelationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `(subject, object)`; returns `false` if it was already present.
    pub fn insert(&mut self, subject: NodeId, object: NodeId) -> bool {
        let added = self.subjects.entry(subject).or_default().insert(object);
        if added {
            self.fact_count += 1;
        }
        added
    }

    pub fn contains(&self, subject: NodeId, object: NodeId) -> bool {
        self.subjects.get(&subject).is_some_and(|objects| objects.contains(&object))
    }

    pub fn objects(&self, subject: NodeId) -> Objects<'_> {
        Objects {
            set: self.subjects.get(&subject),
        }
    }

    pub fn contains_subject(&self, subject: NodeId) -> bool {
        self.subjects.contains_key(&subject)
    }

    /// Subjects with their objects, in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, Objects<'_>)> + '_ {
        self.subjects
            .iter()
            .map(|(&subject, set)| (subject, Objects { set: Some(set) }))
    }

    /// Subjects in first-seen order.
    pub fn sorted_subjects(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.subjects.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of distinct subjects holding at least one object.
    pub fn subject_count(&self) -> usize {
        self.subjects.len()
    }

    /// Number of `(subject, object)` pairs.
    pub fn fact_count(&self) -> usize {
        self.fact_count
    }

    pub fn is_empty(&self) -> bool {
        self.fact_count == 0
    }
}

/// In-memory fact store indexed by predicate, then subject.
///
/// # Architecture
/// - **Node arena**: every subject and object string is interned once; indexes
///   hold 4-byte ids instead of strings.
/// - **Relation indexes**: one [`RelationIndex`] per relational predicate, laid
///   out densely by [`Predicate::relational_index`].
///
/// # Invariants
/// - A fact is stored at most once; inserting it again is a no-op.
/// - Facts are never removed or altered.
/// - Auxiliary predicates (gender, date of death) are never stored here.
///
/// # Performance Characteristics
/// - **Insert / contains**: O(1) amortised, independent of fan-out
/// - **Objects of (p, s)**: O(1) to obtain the view
/// - **Iteration over a predicate**: O(subjects + facts)
///
/// # Usage Example
/// ```rust
/// use kinship_core::fact_store::TripleStore;
/// use kinship_types::Predicate;
///
/// let mut store = TripleStore::new();
/// assert!(store.insert("Q1", Predicate::Child, "Q2").unwrap());
/// assert!(!store.insert("Q1", Predicate::Child, "Q2").unwrap());
///
/// assert!(store.contains("Q1", Predicate::Child, "Q2"));
/// assert_eq!(store.objects_of(Predicate::Child, "Q1").len(), 1);
/// assert!(store.objects_of(Predicate::Spouse, "Q1").is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct TripleStore {
    nodes: NodeArena,
    relations: Vec<RelationIndex>,
    empty: RelationIndex,
}

impl Default for TripleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TripleStore {
    /// Creates an empty store with one index per relational predicate.
    pub fn new() -> Self {
        Self {
            nodes: NodeArena::new(),
            relations: vec![RelationIndex::new(); Predicate::RELATIONAL.len()],
            empty: RelationIndex::new(),
        }
    }

    fn slot(predicate: Predicate, operation: &str) -> KinshipResult<usize> {
        predicate.relational_index().ok_or_else(|| {
            KinshipError::fact_store(
                operation,
                format!(
                    "{} ({}) is not a relational predicate",
                    predicate.code(),
                    predicate.role()
                ),
            )
        })
    }

    /// Interns an identifier, returning its node id.
    pub fn intern(&mut self, name: &str) -> NodeId {
        self.nodes.intern(name)
    }

    /// Node id of an identifier already seen by the store.
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.nodes.get(name)
    }

    /// Identifier behind a node id minted by this store.
    pub fn node_name(&self, id: NodeId) -> &str {
        self.nodes.name(id)
    }

    pub fn nodes(&self) -> &NodeArena {
        &self.nodes
    }

    /// Inserts `(subject, predicate, object)`; returns whether the fact was new.
    ///
    /// # Errors
    /// [`KinshipError::FactStore`] if `predicate` is auxiliary.
    pub fn insert(
        &mut self,
        subject: &str,
        predicate: Predicate,
        object: &str,
    ) -> KinshipResult<bool> {
        let slot = Self::slot(predicate, "insert")?;
        let s = self.nodes.intern(subject);
        let o = self.nodes.intern(object);
        Ok(self.relations[slot].insert(s, o))
    }

    /// Id-based variant of [`TripleStore::insert`].
    pub fn insert_ids(
        &mut self,
        subject: NodeId,
        predicate: Predicate,
        object: NodeId,
    ) -> KinshipResult<bool> {
        let slot = Self::slot(predicate, "insert")?;
        Ok(self.relations[slot].insert(subject, object))
    }

    /// Membership test that never interns.
    pub fn contains(&self, subject: &str, predicate: Predicate, object: &str) -> bool {
        match (self.nodes.get(subject), self.nodes.get(object)) {
            (Some(s), Some(o)) => self.relation(predicate).contains(s, o),
            _ => false,
        }
    }

    pub fn contains_ids(&self, subject: NodeId, predicate: Predicate, object: NodeId) -> bool {
        self.relation(predicate).contains(subject, object)
    }

    /// Objects for `(predicate, subject)`, empty when either is unknown.
    pub fn objects_of(&self, predicate: Predicate, subject: &str) -> Objects<'_> {
        self.nodes
            .get(subject)
            .map_or(Objects { set: None }, |s| self.relation(predicate).objects(s))
    }

    /// The subject → objects index of `predicate`, empty for auxiliary
    /// predicates or predicates without facts.
    pub fn subjects_of(&self, predicate: Predicate) -> &RelationIndex {
        self.relation(predicate)
    }

    pub fn relation(&self, predicate: Predicate) -> &RelationIndex {
        predicate.relational_index().map_or(&self.empty, |slot| &self.relations[slot])
    }

    /// Mutable index of a relational predicate.
    pub fn relation_mut(&mut self, predicate: Predicate) -> KinshipResult<&mut RelationIndex> {
        let slot = Self::slot(predicate, "relation_mut")?;
        Ok(&mut self.relations[slot])
    }

    /// Borrows the index of `read` immutably and the index of `write` mutably.
    ///
    /// This is how a closure stage iterates one finalised predicate while
    /// inserting into another within the same pass.
    ///
    /// # Errors
    /// [`KinshipError::FactStore`] if either predicate is auxiliary or both
    /// name the same predicate.
    pub fn split_mut(
        &mut self,
        read: Predicate,
        write: Predicate,
    ) -> KinshipResult<(&RelationIndex, &mut RelationIndex)> {
        let r = Self::slot(read, "split_mut")?;
        let w = Self::slot(write, "split_mut")?;
        if r == w {
            return Err(KinshipError::fact_store(
                "split_mut",
                format!("cannot read and write {} in the same borrow", read.code()),
            ));
        }
        if r < w {
            let (low, high) = self.relations.split_at_mut(w);
            Ok((&low[r], &mut high[0]))
        } else {
            let (low, high) = self.relations.split_at_mut(r);
            Ok((&high[0], &mut low[w]))
        }
    }

    /// Facts stored under `predicate`.
    pub fn count(&self, predicate: Predicate) -> usize {
        self.relation(predicate).fact_count()
    }

    /// Fact counts for every relational predicate, including empty ones.
    pub fn predicate_counts(&self) -> PredicateCounts {
        Predicate::RELATIONAL.into_iter().map(|p| (p, self.count(p))).collect()
    }

    /// Total number of facts across all predicates.
    pub fn len(&self) -> usize {
        self.relations.iter().map(RelationIndex::fact_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_idempotent() {
        let mut store = TripleStore::new();
        assert!(store.insert("Q1", Predicate::Spouse, "Q2").unwrap());
        assert!(!store.insert("Q1", Predicate::Spouse, "Q2").unwrap());
        assert_eq!(store.len(), 1);
        assert_eq!(store.count(Predicate::Spouse), 1);
        assert_eq!(store.subjects_of(Predicate::Spouse).subject_count(), 1);
    }

    #[test]
    fn auxiliary_predicates_are_rejected() {
        let mut store = TripleStore::new();
        let err = store.insert("Q1", Predicate::Gender, "Q6581097").unwrap_err();
        assert_eq!(err.category(), "fact_store");
        assert!(store.is_empty());
        assert!(store.subjects_of(Predicate::DateOfDeath).is_empty());
    }

    #[test]
    fn lookups_tolerate_absent_keys() {
        let mut store = TripleStore::new();
        store.insert("Q1", Predicate::Child, "Q2").unwrap();
        assert!(store.objects_of(Predicate::Child, "Q404").is_empty());
        assert!(store.objects_of(Predicate::Sibling, "Q1").is_empty());
        assert!(!store.contains("Q404", Predicate::Child, "Q2"));
        assert!(store.subjects_of(Predicate::Stepparent).is_empty());
        // lookups never intern
        assert_eq!(store.nodes().len(), 2);
    }

    #[test]
    fn node_ids_follow_first_seen_order() {
        let mut store = TripleStore::new();
        store.insert("Q9", Predicate::Child, "Q3").unwrap();
        store.insert("Q9", Predicate::Child, "Q1").unwrap();
        let q9 = store.node_id("Q9").unwrap();
        let names: Vec<&str> = store
            .relation(Predicate::Child)
            .objects(q9)
            .sorted()
            .into_iter()
            .map(|id| store.node_name(id))
            .collect();
        assert_eq!(names, vec!["Q3", "Q1"]);
    }

    #[test]
    fn split_mut_borrows_two_predicates() {
        let mut store = TripleStore::new();
        store.insert("P", Predicate::Child, "C").unwrap();
        let (p, c) = (store.node_id("P").unwrap(), store.node_id("C").unwrap());
        {
            let (children, fathers) = store
                .split_mut(Predicate::Child, Predicate::Father)
                .unwrap();
            for (parent, kids) in children.iter() {
                for kid in kids.iter() {
                    fathers.insert(kid, parent);
                }
            }
        }
        assert!(store.contains_ids(c, Predicate::Father, p));

        // reversed slot order takes the other branch
        let (fathers, children) = store
            .split_mut(Predicate::Father, Predicate::Child)
            .unwrap();
        assert_eq!(fathers.fact_count(), 1);
        assert_eq!(children.fact_count(), 1);
    }

    #[test]
    fn split_mut_rejects_same_predicate() {
        let mut store = TripleStore::new();
        assert!(store.split_mut(Predicate::Sibling, Predicate::Sibling).is_err());
        assert!(store.split_mut(Predicate::Gender, Predicate::Sibling).is_err());
    }

    #[test]
    fn predicate_counts_cover_every_relational_predicate() {
        let mut store = TripleStore::new();
        store.insert("A", Predicate::Birthplace, "Q90").unwrap();
        let counts = store.predicate_counts();
        assert_eq!(counts.len(), Predicate::RELATIONAL.len());
        assert_eq!(counts[&Predicate::Birthplace], 1);
        assert_eq!(counts[&Predicate::Citizenship], 0);
    }
}
