//! Closed-world cardinality derivation
//!
//! After closure, every tracked `(subject, predicate)` pair receives an
//! assumed-exact object count. How the count is derived is decided by a
//! declarative [`CardinalityPolicy`]; the emitter itself has no knowledge of
//! individual predicates.
//!
//! The standard policy treats father, mother and birthplace as mandatory:
//! every registered person gets a count of 1 even when nothing was observed.
//! Downstream consumers should read these as labels, not verified facts.

use crate::error::{KinshipError, KinshipResult};
use crate::knowledge_base::KnowledgeBase;
use kinship_types::{CardinalityAssertion, Predicate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Evidence that makes a conditional predicate count as present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Witness {
    /// The subject has a recorded date of death
    DateOfDeath,
}

/// How the count for a predicate is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "strategy")]
pub enum CardinalityStrategy {
    /// Exactly one for every registered person
    MandatoryOne,
    /// Exactly one for a registered person with a fact under the predicate or
    /// the given witness; nothing otherwise
    OneIfRecorded { witness: Witness },
    /// The observed object count, for every subject with at least one object
    Observed,
}

impl CardinalityStrategy {
    pub fn describe(&self) -> &'static str {
        match self {
            CardinalityStrategy::MandatoryOne => "exactly 1 for every person",
            CardinalityStrategy::OneIfRecorded {
                witness: Witness::DateOfDeath,
            } => "exactly 1 if recorded or a death date exists",
            CardinalityStrategy::Observed => "observed object count",
        }
    }
}

/// Predicate → strategy table, in emission order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardinalityPolicy {
    entries: Vec<(Predicate, CardinalityStrategy)>,
}

impl Default for CardinalityPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

impl CardinalityPolicy {
    /// A policy that emits nothing.
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// The kinship policy. Citizenship is deliberately untracked.
    pub fn standard() -> Self {
        use CardinalityStrategy::*;
        Self {
            entries: vec![
                (Predicate::Father, MandatoryOne),
                (Predicate::Mother, MandatoryOne),
                (Predicate::Birthplace, MandatoryOne),
                (
                    Predicate::Deathplace,
                    OneIfRecorded {
                        witness: Witness::DateOfDeath,
                    },
                ),
                (Predicate::Spouse, Observed),
                (Predicate::Child, Observed),
                (Predicate::Sibling, Observed),
                (Predicate::Stepparent, Observed),
            ],
        }
    }

    /// Sets the strategy for `predicate`, replacing an existing entry in place
    /// or appending a new one.
    ///
    /// # Errors
    /// [`KinshipError::Configuration`] for auxiliary predicates.
    pub fn with_strategy(
        mut self,
        predicate: Predicate,
        strategy: CardinalityStrategy,
    ) -> KinshipResult<Self> {
        if !predicate.is_relational() {
            return Err(KinshipError::configuration(
                "cardinality_policy",
                format!("{} is auxiliary and has no cardinality", predicate.code()),
            ));
        }
        match self.entries.iter_mut().find(|(p, _)| *p == predicate) {
            Some(entry) => entry.1 = strategy,
            None => self.entries.push((predicate, strategy)),
        }
        Ok(self)
    }

    /// Stops tracking `predicate`.
    pub fn without(mut self, predicate: Predicate) -> Self {
        self.entries.retain(|(p, _)| *p != predicate);
        self
    }

    pub fn strategy_for(&self, predicate: Predicate) -> Option<CardinalityStrategy> {
        self.entries.iter().find(|(p, _)| *p == predicate).map(|(_, s)| *s)
    }

    pub fn entries(&self) -> &[(Predicate, CardinalityStrategy)] {
        &self.entries
    }
}

/// Applies a policy to a closed knowledge base
pub struct CardinalityEmitter<'a> {
    kb: &'a KnowledgeBase,
    policy: &'a CardinalityPolicy,
}

impl<'a> CardinalityEmitter<'a> {
    pub fn new(kb: &'a KnowledgeBase, policy: &'a CardinalityPolicy) -> Self {
        Self { kb, policy }
    }

    /// Assertions for one policy entry.
    pub fn emit_predicate(
        &self,
        predicate: Predicate,
        strategy: CardinalityStrategy,
    ) -> Vec<CardinalityAssertion> {
        let store = self.kb.store();
        let persons = self.kb.persons();
        let relation = store.relation(predicate);
        let assertion = |subject, count| CardinalityAssertion {
            subject: store.node_name(subject).to_string(),
            predicate,
            count,
        };

        match strategy {
            CardinalityStrategy::MandatoryOne => {
                persons.people().map(|person| assertion(person, 1)).collect()
            }
            CardinalityStrategy::OneIfRecorded { witness } => persons
                .people()
                .filter(|&person| {
                    relation.contains_subject(person)
                        || match witness {
                            Witness::DateOfDeath => persons.is_dead(person),
                        }
                })
                .map(|person| assertion(person, 1))
                .collect(),
            CardinalityStrategy::Observed => relation
                .sorted_subjects()
                .into_iter()
                .map(|subject| assertion(subject, relation.objects(subject).len()))
                .collect(),
        }
    }

    /// Assertions for every policy entry, in policy order.
    #[instrument(skip_all)]
    pub fn emit(&self) -> Vec<CardinalityAssertion> {
        let mut assertions = Vec::new();
        for &(predicate, strategy) in self.policy.entries() {
            let emitted = self.emit_predicate(predicate, strategy);
            debug!(
                predicate = predicate.code(),
                ?strategy,
                emitted = emitted.len(),
                "Cardinalities derived"
            );
            assertions.extend(emitted);
        }
        info!(
            assertions = assertions.len(),
            people = self.kb.persons().len(),
            "Cardinality emission completed"
        );
        assertions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_policy_classification() {
        let policy = CardinalityPolicy::standard();
        assert_eq!(
            policy.strategy_for(Predicate::Father),
            Some(CardinalityStrategy::MandatoryOne)
        );
        assert_eq!(
            policy.strategy_for(Predicate::Deathplace),
            Some(CardinalityStrategy::OneIfRecorded {
                witness: Witness::DateOfDeath
            })
        );
        assert_eq!(
            policy.strategy_for(Predicate::Stepparent),
            Some(CardinalityStrategy::Observed)
        );
        assert_eq!(policy.strategy_for(Predicate::Citizenship), None);
    }

    #[test]
    fn policy_is_editable_as_data() {
        let policy = CardinalityPolicy::standard()
            .with_strategy(Predicate::Citizenship, CardinalityStrategy::Observed)
            .unwrap()
            .without(Predicate::Birthplace);
        assert_eq!(
            policy.strategy_for(Predicate::Citizenship),
            Some(CardinalityStrategy::Observed)
        );
        assert_eq!(policy.strategy_for(Predicate::Birthplace), None);
        assert!(
            CardinalityPolicy::empty()
                .with_strategy(Predicate::Gender, CardinalityStrategy::MandatoryOne)
                .is_err()
        );
    }

    #[test]
    fn deathplace_needs_fact_or_death_date() {
        let mut kb = KnowledgeBase::new();
        kb.add_relation("A", Predicate::Deathplace, "Q64").unwrap();
        kb.add_death_date("B");
        kb.add_relation("C", Predicate::Birthplace, "Q90").unwrap();

        let policy = CardinalityPolicy::empty();
        let emitted = CardinalityEmitter::new(&kb, &policy).emit_predicate(
            Predicate::Deathplace,
            CardinalityStrategy::OneIfRecorded {
                witness: Witness::DateOfDeath,
            },
        );
        let subjects: Vec<&str> = emitted.iter().map(|a| a.subject.as_str()).collect();
        assert_eq!(subjects, vec!["A", "B"]);
        assert!(emitted.iter().all(|a| a.count == 1));
    }

    #[test]
    fn empty_policy_emits_nothing() {
        let mut kb = KnowledgeBase::new();
        kb.add_relation("A", Predicate::Spouse, "B").unwrap();
        let policy = CardinalityPolicy::empty();
        assert!(CardinalityEmitter::new(&kb, &policy).emit().is_empty());
    }
}
