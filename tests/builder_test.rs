//! Tests for ForestBuilder resolution: ordering, self references, duplicates and cycles

use forestry::application::{Entry, Key};
use forestry::domain::{CyclePolicy, DomainError, ForestBuilder, Priority, Shape};
use rstest::rstest;

fn key(n: i64) -> Key {
    Key::Int(n)
}

// ============================================================
// Ordering
// ============================================================

#[test]
fn given_scrambled_input_when_resolved_then_siblings_keep_input_order() {
    let forest = ForestBuilder::new(vec![
        Entry::numbered(5, Some(1), "c"),
        Entry::numbered(3, Some(1), "a"),
        Entry::numbered(1, None, "root"),
        Entry::numbered(4, Some(1), "b"),
    ])
    .resolve()
    .unwrap();

    assert_eq!(
        forest.linked(Shape::Linear).labels(),
        vec!["root", "c", "a", "b"]
    );
}

#[test]
fn given_roots_after_children_when_resolved_then_roots_keep_input_order() {
    let forest = ForestBuilder::new(vec![
        Entry::numbered(11, Some(10), "Y.1"),
        Entry::numbered(20, None, "Z"),
        Entry::numbered(10, None, "Y"),
        Entry::numbered(31, Some(30), "orphan-b"),
        Entry::numbered(41, Some(40), "orphan-a"),
    ])
    .resolve()
    .unwrap();

    assert_eq!(forest.linked(Shape::Tree).labels(), vec!["Z", "Y"]);
    assert_eq!(
        forest.both(Shape::Linear, Priority::UnlinkedFirst).labels(),
        vec!["orphan-b", "orphan-a", "Z", "Y", "Y.1"]
    );
}

#[test]
fn given_builder_with_pushed_records_when_resolved_then_same_as_constructed() {
    let mut builder = ForestBuilder::default();
    assert!(builder.is_empty());
    builder.push(Entry::numbered(1, None, "A"));
    builder.push(Entry::numbered(2, Some(1), "A.1"));
    assert_eq!(builder.len(), 2);
    assert_eq!(builder.records()[1].title.as_deref(), Some("A.1"));

    let forest = builder.resolve().unwrap();
    assert_eq!(forest.linked(Shape::Linear).labels(), vec!["A", "A.1"]);
}

// ============================================================
// Self references and missing parents
// ============================================================

#[test]
fn given_self_parent_with_children_when_resolved_then_children_hang_unlinked() {
    let forest = ForestBuilder::new(vec![
        Entry::numbered(1, Some(1), "self"),
        Entry::numbered(2, Some(1), "child"),
    ])
    .resolve()
    .unwrap();

    let top = forest.get(&key(1)).unwrap();
    let child = forest.get(&key(2)).unwrap();

    assert!(top.is_base());
    assert!(!top.is_linked());
    assert_eq!(child.parent(), Some(top));
    assert_eq!(child.base(), top);
    assert!(child.root().is_none());
    assert_eq!(forest.unlinked(Shape::Tree).labels(), vec!["self"]);
}

#[test]
fn given_two_disjoint_orphan_chains_when_resolved_then_each_is_a_base() {
    let forest = ForestBuilder::new(vec![
        Entry::numbered(220, Some(210), "4"),
        Entry::numbered(230, Some(220), "4.I"),
        Entry::numbered(260, Some(250), "5"),
        Entry::numbered(270, Some(260), "5.I"),
    ])
    .resolve()
    .unwrap();

    let bases = forest.unlinked(Shape::Tree);
    assert_eq!(bases.labels(), vec!["4", "5"]);
    for base in bases.iter() {
        assert_eq!(base.descendants(None, false).len(), 1);
    }
    assert!(forest.linked(Shape::Linear).is_empty());
}

// ============================================================
// Duplicates
// ============================================================

#[test]
fn given_duplicate_ids_when_resolving_then_fails() {
    let result = ForestBuilder::new(vec![
        Entry::numbered(1, None, "first"),
        Entry::numbered(1, Some(2), "second"),
    ])
    .resolve();

    assert_eq!(
        result.err(),
        Some(DomainError::DuplicateIdentifier("1".into()))
    );
}

// ============================================================
// Cycles
// ============================================================

#[test]
fn given_two_cycle_when_rejecting_then_reports_members() {
    let result = ForestBuilder::new(vec![
        Entry::numbered(1, Some(2), "X"),
        Entry::numbered(2, Some(1), "Y"),
        Entry::numbered(3, None, "R"),
    ])
    .resolve();

    let err = result.err().expect("cycle is rejected");
    assert_eq!(
        err,
        DomainError::CyclicReference {
            cycle: vec!["1".into(), "2".into()]
        }
    );
    assert_eq!(err.to_string(), "cyclic parent reference: 1 -> 2 -> 1");
}

#[test]
fn given_cycle_reached_through_tail_when_rejecting_then_reports_only_loop() {
    let result = ForestBuilder::new(vec![
        Entry::new(Key::from("tail"), Some(Key::from("a")), "tail"),
        Entry::new(Key::from("a"), Some(Key::from("b")), "a"),
        Entry::new(Key::from("b"), Some(Key::from("c")), "b"),
        Entry::new(Key::from("c"), Some(Key::from("a")), "c"),
    ])
    .resolve();

    assert_eq!(
        result.err(),
        Some(DomainError::CyclicReference {
            cycle: vec!["a".into(), "b".into(), "c".into()]
        })
    );
}

#[test]
fn given_two_cycle_when_unlinking_then_earliest_member_becomes_base() {
    let forest = ForestBuilder::new(vec![
        Entry::numbered(1, Some(2), "X"),
        Entry::numbered(2, Some(1), "Y"),
        Entry::numbered(3, Some(2), "Z"),
        Entry::numbered(4, None, "R"),
    ])
    .with_cycle_policy(CyclePolicy::Unlink)
    .resolve()
    .unwrap();

    let x = forest.get(&key(1)).unwrap();
    let y = forest.get(&key(2)).unwrap();
    let z = forest.get(&key(3)).unwrap();

    assert!(x.parent().is_none());
    assert!(x.is_base());
    assert!(!x.is_linked());
    assert_eq!(y.parent(), Some(x));
    assert_eq!(z.parent(), Some(y));
    assert_eq!(z.base(), x);
    assert_eq!(z.distance_to_base(), 2);

    assert_eq!(forest.linked(Shape::Tree).labels(), vec!["R"]);
    assert_eq!(forest.unlinked(Shape::Linear).labels(), vec!["X", "Y", "Z"]);
}

#[rstest]
#[case(CyclePolicy::Reject, true)]
#[case(CyclePolicy::Unlink, false)]
fn given_disjoint_cycles_when_resolving_then_policy_decides(
    #[case] policy: CyclePolicy,
    #[case] fails: bool,
) {
    let result = ForestBuilder::new(vec![
        Entry::numbered(1, Some(2), "a"),
        Entry::numbered(2, Some(1), "b"),
        Entry::numbered(3, Some(4), "c"),
        Entry::numbered(4, Some(3), "d"),
    ])
    .with_cycle_policy(policy)
    .resolve();

    assert_eq!(result.is_err(), fails);
    if let Ok(forest) = result {
        assert_eq!(forest.unlinked(Shape::Tree).labels(), vec!["a", "c"]);
        assert_eq!(forest.len(), 4);
    }
}

#[test]
fn given_self_parent_when_rejecting_cycles_then_still_resolves() {
    let forest = ForestBuilder::new(vec![Entry::numbered(1, Some(1), "self")])
        .with_cycle_policy(CyclePolicy::Reject)
        .resolve();

    assert!(forest.is_ok());
}
