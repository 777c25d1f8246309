use std::collections::BTreeSet;

use bplus_tree_set::{BPlusTreeSet, Error, MIN_BRANCHING_FACTOR};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 2_000;

/// Values drawn from a narrow range so inserts and removes collide often.
fn value_strategy() -> impl Strategy<Value = i32> {
    -500i32..500i32
}

fn branching_factor_strategy() -> impl Strategy<Value = usize> {
    MIN_BRANCHING_FACTOR..=12
}

fn set_with(bf: usize, values: impl IntoIterator<Item = i32>) -> BPlusTreeSet<i32> {
    let mut set = BPlusTreeSet::with_branching_factor(bf).unwrap();
    set.extend(values);
    set
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum SetOp {
    Insert(i32),
    Remove(i32),
    Contains(i32),
    First,
    Last,
    Clear,
}

fn set_op_strategy() -> impl Strategy<Value = SetOp> {
    prop_oneof![
        60 => value_strategy().prop_map(SetOp::Insert),
        40 => value_strategy().prop_map(SetOp::Remove),
        20 => value_strategy().prop_map(SetOp::Contains),
        10 => Just(SetOp::First),
        10 => Just(SetOp::Last),
        // Rare, so the tree gets a chance to grow again afterwards.
        1 => Just(SetOp::Clear),
    ]
}

// ─── Core operations ─────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random sequence of operations on both BPlusTreeSet and BTreeSet and asserts identical results at
    /// every step.
    #[test]
    fn set_ops_match_btreeset(
        bf in branching_factor_strategy(),
        ops in proptest::collection::vec(set_op_strategy(), TEST_SIZE),
    ) {
        let mut bp_set: BPlusTreeSet<i32> = BPlusTreeSet::with_branching_factor(bf).unwrap();
        let mut bt_set: BTreeSet<i32> = BTreeSet::new();

        for op in &ops {
            match op {
                SetOp::Insert(v) => {
                    prop_assert_eq!(bp_set.insert(*v), bt_set.insert(*v), "insert({})", v);
                }
                SetOp::Remove(v) => {
                    prop_assert_eq!(bp_set.remove(v), bt_set.remove(v), "remove({})", v);
                }
                SetOp::Contains(v) => {
                    prop_assert_eq!(bp_set.contains(v), bt_set.contains(v), "contains({})", v);
                }
                SetOp::First => {
                    prop_assert_eq!(bp_set.first(), bt_set.first(), "first()");
                }
                SetOp::Last => {
                    prop_assert_eq!(bp_set.last(), bt_set.last(), "last()");
                }
                SetOp::Clear => {
                    bp_set.clear();
                    bt_set.clear();
                }
            }
            prop_assert_eq!(bp_set.len(), bt_set.len(), "len() after {:?}", op);
            prop_assert_eq!(bp_set.is_empty(), bt_set.is_empty(), "is_empty() after {:?}", op);
        }

        prop_assert!(bp_set.iter().eq(bt_set.iter()), "iter() mismatch");
        prop_assert!(bp_set.iter().rev().eq(bt_set.iter().rev()), "iter().rev() mismatch");
    }

    /// Inserting keys in any order then removing them in any order returns the tree to a single empty leaf.
    #[test]
    fn round_trip_returns_to_empty_leaf(
        bf in branching_factor_strategy(),
        keys in Just((1..=300).collect::<Vec<i32>>()).prop_shuffle(),
        removal in Just((1..=300).collect::<Vec<i32>>()).prop_shuffle(),
    ) {
        let mut set = set_with(bf, keys);
        prop_assert_eq!(set.len(), 300);
        for key in &removal {
            prop_assert!(set.remove(key), "remove({})", key);
            prop_assert!(!set.contains(key), "contains({}) after remove", key);
        }
        prop_assert!(set.is_empty());
        prop_assert_eq!(set.first(), None);
        prop_assert_eq!(set.last(), None);
        prop_assert_eq!(set.to_string(), "[]\n");
    }

    /// Adding a key that is already present changes nothing, down to the rendered structure.
    #[test]
    fn insert_is_idempotent(
        bf in branching_factor_strategy(),
        values in proptest::collection::vec(value_strategy(), 1..400),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut set = set_with(bf, values.iter().copied());
        let before = set.to_string();
        let len = set.len();
        let existing = *pick.get(&values);

        prop_assert!(!set.insert(existing));
        prop_assert!(set.contains(&existing));
        prop_assert_eq!(set.len(), len);
        prop_assert_eq!(set.to_string(), before);
    }

    /// Removing an absent key reports false and leaves the structure untouched.
    #[test]
    fn removing_absent_key_changes_nothing(
        bf in branching_factor_strategy(),
        values in proptest::collection::vec(value_strategy(), 0..400),
        absent in 500i32..1_000,
    ) {
        let mut set = set_with(bf, values);
        let before = set.to_string();
        let len = set.len();

        prop_assert!(!set.remove(&absent));
        prop_assert_eq!(set.len(), len);
        prop_assert_eq!(set.to_string(), before);
    }

    /// Alternates between both ends of the iterator and checks that every element is yielded exactly once.
    #[test]
    fn iter_is_double_ended_and_exact(
        bf in branching_factor_strategy(),
        values in proptest::collection::vec(value_strategy(), 1..600),
        pattern in proptest::collection::vec(any::<bool>(), 600),
    ) {
        let set = set_with(bf, values.iter().copied());
        let expected: Vec<i32> = values.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();

        let mut iter = set.iter();
        prop_assert_eq!(iter.len(), expected.len());
        let mut from_front = Vec::new();
        let mut from_back = Vec::new();
        for take_front in pattern.iter().cycle().take(expected.len()) {
            if *take_front {
                from_front.push(*iter.next().unwrap());
            } else {
                from_back.push(*iter.next_back().unwrap());
            }
            prop_assert_eq!(iter.len(), expected.len() - from_front.len() - from_back.len());
        }
        prop_assert_eq!(iter.next(), None);
        prop_assert_eq!(iter.next_back(), None);

        from_back.reverse();
        from_front.extend(from_back);
        prop_assert_eq!(from_front, expected);
    }
}

// ─── Construction and queries ────────────────────────────────────────────────

#[test]
fn branching_factor_below_three_is_rejected() {
    for bf in [0, 1, 2] {
        let err = BPlusTreeSet::<i32>::with_branching_factor(bf).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidConfig {
                branching_factor: bf
            }
        );
        assert_eq!(err.to_string(), format!("invalid branching factor {bf}: must be at least 3"));
    }
}

#[test]
fn default_set_uses_branching_factor_three() {
    assert_eq!(BPlusTreeSet::<i32>::new().branching_factor(), 3);
    assert_eq!(BPlusTreeSet::<i32>::default().branching_factor(), 3);
}

#[test]
fn first_and_last_track_extremes() {
    let mut set: BPlusTreeSet<i32> = BPlusTreeSet::new();
    assert_eq!(set.first(), None);
    assert_eq!(set.last(), None);

    set.extend([5, 1, 3]);
    assert_eq!(set.first(), Some(&1));
    assert_eq!(set.last(), Some(&5));

    set.remove(&1);
    set.remove(&5);
    assert_eq!(set.first(), Some(&3));
    assert_eq!(set.last(), Some(&3));
}

#[test]
fn reference_sequence_keeps_every_distinct_value() {
    let sequence = [36, 92, 93, 63, 69, 38, 44, 60, 23, 45, 36, 25, 31, 94, 29, 91, 9, 9, 80, 65, 23];
    let mut set = BPlusTreeSet::new();
    let added = sequence.iter().filter(|&&value| set.insert(value)).count();

    let expected: Vec<i32> = sequence.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
    assert_eq!(added, 18);
    assert_eq!(set.len(), 18);
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), expected);
    assert!(expected.iter().all(|value| set.contains(value)));
    assert!(!set.contains(&0));
}

#[test]
fn clear_resets_to_empty_leaf() {
    let mut set = set_with(4, 0..100);
    set.clear();
    assert!(set.is_empty());
    assert_eq!(set.len(), 0);
    assert_eq!(set.render(""), "[]\n");

    set.insert(7);
    assert_eq!(set.render(""), "[7]\n");
}

#[test]
fn borrowed_lookups() {
    let set: BPlusTreeSet<String> = ["pear", "apple", "fig"].into_iter().map(String::from).collect();
    assert!(set.contains("fig"));
    assert_eq!(set.get("apple").map(String::as_str), Some("apple"));
    assert_eq!(set.get("kiwi"), None);
}

// ─── Rendering snapshots (bf = 3) ────────────────────────────────────────────

#[test]
fn render_after_growing_two_levels() {
    let set = set_with(3, 1..=5);
    assert_eq!(
        set.render(""),
        "\
[3]
├─[2]
│  ├─[1]
│  └─[2]
└─[4]
   ├─[3]
   └─[4, 5]
"
    );
}

#[test]
fn render_with_prefix_on_every_line() {
    let set = set_with(3, 1..=3);
    assert_eq!(set.render("| "), "| [2]\n| ├─[1]\n| └─[2, 3]\n");
}

#[test]
fn leaf_borrow_from_right_updates_separator() {
    let mut set = set_with(3, [1, 2, 3]);
    assert!(set.remove(&1));
    assert_eq!(set.to_string(), "[3]\n├─[2]\n└─[3]\n");
}

#[test]
fn leaf_borrow_from_left_updates_separator() {
    let mut set = set_with(3, [1, 2, 3, 0]);
    assert!(set.remove(&3));
    assert!(set.remove(&2));
    assert_eq!(set.to_string(), "[1]\n├─[0]\n└─[1]\n");
}

#[test]
fn cascading_merge_shrinks_root() {
    let mut set = set_with(3, 1..=5);
    assert!(set.remove(&1));
    assert_eq!(
        set.to_string(),
        "\
[3, 4]
├─[2]
├─[3]
└─[4, 5]
"
    );
    assert_eq!(set.iter().rev().copied().collect::<Vec<_>>(), [5, 4, 3, 2]);
}

#[test]
fn merge_with_left_sibling_when_last_child() {
    let mut set = set_with(3, 1..=5);
    assert!(set.remove(&5));
    assert!(set.remove(&4));
    assert_eq!(
        set.to_string(),
        "\
[2, 3]
├─[1]
├─[2]
└─[3]
"
    );
    assert_eq!(set.last(), Some(&3));
    assert_eq!(set.iter().rev().copied().collect::<Vec<_>>(), [3, 2, 1]);
}

#[test]
fn internal_rotation_from_right_sibling() {
    let mut set = set_with(3, 1..=6);
    assert!(set.remove(&1));
    assert_eq!(
        set.to_string(),
        "\
[4]
├─[3]
│  ├─[2]
│  └─[3]
└─[5]
   ├─[4]
   └─[5, 6]
"
    );
}

#[test]
fn internal_rotation_from_left_sibling() {
    let mut set = set_with(3, [1, 2, 3, 4, 5, 0, -1]);
    assert!(set.remove(&5));
    assert!(set.remove(&4));
    assert_eq!(
        set.to_string(),
        "\
[2]
├─[0]
│  ├─[-1]
│  └─[0, 1]
└─[3]
   ├─[2]
   └─[3]
"
    );
}

// ─── Trait impls ─────────────────────────────────────────────────────────────

#[test]
fn collect_extend_and_compare() {
    let mut a: BPlusTreeSet<i32> = (1..=10).rev().collect();
    let b = BPlusTreeSet::from([1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
    assert_eq!(a, b);

    a.extend(&[11, 12]);
    assert_ne!(a, b);
    assert!(b < a);
    assert_eq!(format!("{:?}", BPlusTreeSet::from([2, 1])), "{1, 2}");
}

#[test]
fn iterating_by_reference() {
    let set = set_with(5, (0..50).map(|n| n * 2));
    let mut total = 0;
    for value in &set {
        total += value;
    }
    assert_eq!(total, (0..50).map(|n| n * 2).sum::<i32>());
    assert_eq!(set.iter().max(), Some(&98));
    assert_eq!(set.iter().min(), Some(&0));
    assert_eq!(set.iter().last(), Some(&98));
    assert_eq!(set.iter().count(), 50);
}
