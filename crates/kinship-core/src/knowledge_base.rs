//! Fact store plus the per-person side tables the loader builds
//!
//! The person registry, gender map and dead set are filled while loading and
//! only read afterwards. Closure stages mutate the store through
//! [`KnowledgeBase::split_mut`], which hands out the registry read-only.

use crate::error::KinshipResult;
use crate::fact_store::{NodeId, TripleStore};
use ahash::AHashMap;
use kinship_types::{Gender, Predicate};
use std::collections::BTreeSet;

/// Person registry, gender map and dead set.
#[derive(Debug, Default, Clone)]
pub struct PersonRegistry {
    people: BTreeSet<NodeId>,
    genders: AHashMap<NodeId, Gender>,
    dead: BTreeSet<NodeId>,
}

impl PersonRegistry {
    pub fn contains(&self, person: NodeId) -> bool {
        self.people.contains(&person)
    }

    /// Registered people in first-seen order.
    pub fn people(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.people.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    /// Recognised gender of `person`, if any.
    pub fn gender_of(&self, person: NodeId) -> Option<Gender> {
        self.genders.get(&person).copied()
    }

    pub fn is_dead(&self, person: NodeId) -> bool {
        self.dead.contains(&person)
    }

    pub fn gender_count(&self) -> usize {
        self.genders.len()
    }

    pub fn dead_count(&self) -> usize {
        self.dead.len()
    }
}

/// The complete in-memory state of one run.
#[derive(Debug, Default, Clone)]
pub struct KnowledgeBase {
    store: TripleStore,
    persons: PersonRegistry,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &TripleStore {
        &self.store
    }

    pub fn persons(&self) -> &PersonRegistry {
        &self.persons
    }

    /// Mutable store with the registry frozen alongside it.
    pub fn split_mut(&mut self) -> (&mut TripleStore, &PersonRegistry) {
        (&mut self.store, &self.persons)
    }

    /// Records a relational fact and registers its subject as a person.
    ///
    /// Returns whether the fact was new.
    pub fn add_relation(
        &mut self,
        subject: &str,
        predicate: Predicate,
        object: &str,
    ) -> KinshipResult<bool> {
        let inserted = self.store.insert(subject, predicate, object)?;
        let s = self.store.intern(subject);
        self.persons.people.insert(s);
        Ok(inserted)
    }

    /// Records that `subject` has a date of death.
    pub fn add_death_date(&mut self, subject: &str) {
        let s = self.store.intern(subject);
        self.persons.people.insert(s);
        self.persons.dead.insert(s);
    }

    /// Records the gender of `subject`; a later call overwrites an earlier one.
    ///
    /// Gender alone does not register a person.
    pub fn set_gender(&mut self, subject: &str, gender: Gender) {
        let s = self.store.intern(subject);
        self.persons.genders.insert(s, gender);
    }

    /// Forgets the gender of `subject`; an unrecognised code overwrites a
    /// recognised one.
    pub fn clear_gender(&mut self, subject: &str) {
        if let Some(s) = self.store.node_id(subject) {
            self.persons.genders.remove(&s);
        }
    }

    /// Gender of a subject by identifier.
    pub fn gender_of(&self, subject: &str) -> Option<Gender> {
        self.store.node_id(subject).and_then(|s| self.persons.gender_of(s))
    }

    /// Whether `subject` is in the person registry.
    pub fn is_person(&self, subject: &str) -> bool {
        self.store.node_id(subject).is_some_and(|s| self.persons.contains(s))
    }

    pub fn is_dead(&self, subject: &str) -> bool {
        self.store.node_id(subject).is_some_and(|s| self.persons.is_dead(s))
    }
}
