use super::{ClosureStage, StageId};
use crate::error::KinshipResult;
use crate::fact_store::NodeId;
use crate::knowledge_base::KnowledgeBase;
use kinship_types::{Gender, Predicate};
use tracing::debug;

/// A gendered parent listing children becomes their father or mother.
///
/// Parents without a recognised gender produce nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParentsFromChildren;

impl ClosureStage for ParentsFromChildren {
    fn id(&self) -> StageId {
        StageId::ParentsFromChildren
    }

    fn depends_on(&self) -> Option<StageId> {
        None
    }

    fn describe(&self) -> &'static str {
        "(p, P40, c) and gender(p) => (c, P22, p) or (c, P25, p)"
    }

    fn apply(&self, kb: &mut KnowledgeBase) -> KinshipResult<usize> {
        let (store, persons) = kb.split_mut();
        let mut inserted = 0;
        for gender in [Gender::Male, Gender::Female] {
            let (children, parents) =
                store.split_mut(Predicate::Child, gender.parent_predicate())?;
            for (parent, kids) in children.iter() {
                if persons.gender_of(parent) != Some(gender) {
                    continue;
                }
                for child in kids.iter() {
                    if parents.insert(child, parent) {
                        inserted += 1;
                    }
                }
            }
            debug!(gender = ?gender, inserted, "Parent facts inferred");
        }
        Ok(inserted)
    }
}

/// Every father-of / mother-of fact yields the matching child-of fact.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChildrenFromParents;

impl ClosureStage for ChildrenFromParents {
    fn id(&self) -> StageId {
        StageId::ChildrenFromParents
    }

    fn depends_on(&self) -> Option<StageId> {
        Some(StageId::ParentsFromChildren)
    }

    fn describe(&self) -> &'static str {
        "(c, P22|P25, p) => (p, P40, c)"
    }

    fn apply(&self, kb: &mut KnowledgeBase) -> KinshipResult<usize> {
        let (store, _) = kb.split_mut();
        let mut inserted = 0;
        for predicate in [Predicate::Father, Predicate::Mother] {
            let (parents, children) = store.split_mut(predicate, Predicate::Child)?;
            for (child, parent_set) in parents.iter() {
                for parent in parent_set.iter() {
                    if children.insert(parent, child) {
                        inserted += 1;
                    }
                }
            }
        }
        Ok(inserted)
    }
}

/// Children sharing a parent are siblings, in both directions.
///
/// Quadratic in the number of children per parent. Full and half siblings are
/// not distinguished.
#[derive(Debug, Clone, Copy, Default)]
pub struct SiblingsFromChildren;

impl ClosureStage for SiblingsFromChildren {
    fn id(&self) -> StageId {
        StageId::SiblingsFromChildren
    }

    fn depends_on(&self) -> Option<StageId> {
        Some(StageId::ChildrenFromParents)
    }

    fn describe(&self) -> &'static str {
        "(p, P40, a) and (p, P40, b) and a != b => (a, P3373, b)"
    }

    fn apply(&self, kb: &mut KnowledgeBase) -> KinshipResult<usize> {
        let (store, _) = kb.split_mut();
        let (children, siblings) = store.split_mut(Predicate::Child, Predicate::Sibling)?;
        let mut inserted = 0;
        for (_, kids) in children.iter() {
            if kids.len() < 2 {
                continue;
            }
            for a in kids.iter() {
                for b in kids.iter() {
                    if a != b && siblings.insert(a, b) {
                        inserted += 1;
                    }
                }
            }
        }
        Ok(inserted)
    }
}

/// Makes every symmetric predicate total in both directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymmetricClosure;

impl ClosureStage for SymmetricClosure {
    fn id(&self) -> StageId {
        StageId::SymmetricClosure
    }

    fn depends_on(&self) -> Option<StageId> {
        Some(StageId::SiblingsFromChildren)
    }

    fn describe(&self) -> &'static str {
        "(s, P3373|P26, o) => (o, P3373|P26, s)"
    }

    fn apply(&self, kb: &mut KnowledgeBase) -> KinshipResult<usize> {
        let (store, _) = kb.split_mut();
        let mut inserted = 0;
        for predicate in Predicate::SYMMETRIC {
            // reads and writes the same index, so collect first
            let relation = store.relation(predicate);
            let missing: Vec<(NodeId, NodeId)> = relation
                .iter()
                .flat_map(|(s, objects)| objects.iter().map(move |o| (o, s)))
                .filter(|&(o, s)| !relation.contains(o, s))
                .collect();

            let relation = store.relation_mut(predicate)?;
            for (s, o) in missing {
                if relation.insert(s, o) {
                    inserted += 1;
                }
            }
            debug!(predicate = predicate.code(), inserted, "Symmetric facts added");
        }
        Ok(inserted)
    }
}
