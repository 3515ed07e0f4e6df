//! Property tests for the fact store and the closure pass

use kinship_core::{ClosurePipeline, Gender, KnowledgeBase, Predicate, TripleStore};
use proptest::prelude::*;

const PEOPLE: usize = 12;

fn person(i: usize) -> String {
    format!("Q{i}")
}

fn relation() -> impl Strategy<Value = Predicate> {
    prop_oneof![
        Just(Predicate::Father),
        Just(Predicate::Mother),
        Just(Predicate::Spouse),
        Just(Predicate::Child),
        Just(Predicate::Sibling),
        Just(Predicate::Stepparent),
    ]
}

fn facts() -> impl Strategy<Value = Vec<(usize, Predicate, usize)>> {
    prop::collection::vec((0..PEOPLE, relation(), 0..PEOPLE), 0..60)
}

fn genders() -> impl Strategy<Value = Vec<(usize, Option<Gender>)>> {
    prop::collection::vec(
        (
            0..PEOPLE,
            prop_oneof![
                Just(None),
                Just(Some(Gender::Male)),
                Just(Some(Gender::Female))
            ],
        ),
        0..PEOPLE,
    )
}

fn closed(
    facts: &[(usize, Predicate, usize)],
    genders: &[(usize, Option<Gender>)],
) -> KnowledgeBase {
    let mut kb = KnowledgeBase::new();
    for &(s, p, o) in facts {
        kb.add_relation(&person(s), p, &person(o)).unwrap();
    }
    for &(s, gender) in genders {
        if let Some(gender) = gender {
            kb.set_gender(&person(s), gender);
        }
    }
    ClosurePipeline::standard().run(&mut kb).unwrap();
    kb
}

proptest! {
    #[test]
    fn insert_is_idempotent(facts in facts()) {
        let mut store = TripleStore::new();
        for &(s, p, o) in &facts {
            store.insert(&person(s), p, &person(o)).unwrap();
        }
        let len = store.len();
        for &(s, p, o) in &facts {
            prop_assert!(!store.insert(&person(s), p, &person(o)).unwrap());
        }
        prop_assert_eq!(store.len(), len);
    }

    #[test]
    fn symmetric_predicates_are_reciprocal_after_closure(facts in facts(), genders in genders()) {
        let kb = closed(&facts, &genders);
        let store = kb.store();
        for predicate in Predicate::SYMMETRIC {
            for (s, objects) in store.relation(predicate).iter() {
                for o in objects.iter() {
                    prop_assert!(store.contains_ids(o, predicate, s), "{predicate} not reciprocal");
                }
            }
        }
    }

    #[test]
    fn parents_and_children_agree_after_closure(facts in facts(), genders in genders()) {
        let kb = closed(&facts, &genders);
        let store = kb.store();
        for predicate in [Predicate::Father, Predicate::Mother] {
            for (child, parents) in store.relation(predicate).iter() {
                for parent in parents.iter() {
                    prop_assert!(store.contains_ids(parent, Predicate::Child, child));
                }
            }
        }
    }

    #[test]
    fn closure_only_adds_facts(facts in facts(), genders in genders()) {
        let kb = closed(&facts, &genders);
        for &(s, p, o) in &facts {
            prop_assert!(kb.store().contains(&person(s), p, &person(o)));
        }
    }

    #[test]
    fn second_closure_pass_without_genders_inserts_nothing(facts in facts()) {
        let mut kb = closed(&facts, &[]);
        let reports = ClosurePipeline::standard().run(&mut kb).unwrap();
        prop_assert!(reports.iter().all(|r| r.inserted == 0));
    }
}
