//! Operation model shared by the property tests and the fuzz target.
//!
//! [`run_multiset_equivalence`] applies a sequence of operations to a
//! [`CountdownTree`] and to a sorted `Vec` standing in for a multiset, and
//! checks after every step that both agree, that the tree is structurally
//! sound, and that the countdown fires when it should.
extern crate std;

use std::{prelude::v1::*, vec::Vec};

use arbitrary::Arbitrary;
use proptest::strategy::{Just, Strategy};

use crate::CountdownTree;

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum ItemValue {
    /// A key already in the tree, if there is one.
    Index(usize),
    Random(u32),
}

proptest::prop_compose! {
    fn index_strategy()(
        index in 0usize..1000,
    ) -> ItemValue {
        ItemValue::Index(index)
    }
}

proptest::prop_compose! {
    fn random_strategy()(
        random in 0u32..1000,
    ) -> ItemValue {
        ItemValue::Random(random)
    }
}

fn value_strategy() -> impl Strategy<Value = ItemValue> {
    proptest::prop_oneof![index_strategy(), random_strategy()]
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum Op {
    Insert(ItemValue),
    Remove(ItemValue),
    Contains(ItemValue),
    First,
    Last,
    Rebalance,
}

impl Op {
    fn finalize(self, sorted: &[u32]) -> FinalOp {
        fn get_value(v: &[u32], i: ItemValue) -> u32 {
            match i {
                ItemValue::Index(idx) => {
                    if v.is_empty() {
                        idx as u32
                    } else {
                        v[idx % v.len()]
                    }
                }
                ItemValue::Random(v) => v,
            }
        }

        match self {
            Op::Insert(item) => FinalOp::Insert(get_value(sorted, item)),
            Op::Remove(item) => FinalOp::Remove(get_value(sorted, item)),
            Op::Contains(item) => FinalOp::Contains(get_value(sorted, item)),
            Op::First => FinalOp::First,
            Op::Last => FinalOp::Last,
            Op::Rebalance => FinalOp::Rebalance,
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum FinalOp {
    Insert(u32),
    Remove(u32),
    Contains(u32),
    First,
    Last,
    Rebalance,
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        4 => value_strategy().prop_map(Op::Insert),
        3 => value_strategy().prop_map(Op::Remove),
        2 => value_strategy().prop_map(Op::Contains),
        1 => Just(Op::First),
        1 => Just(Op::Last),
        1 => Just(Op::Rebalance),
    ]
}

pub fn run_multiset_equivalence(ops: Vec<Op>) {
    let mut sorted = Vec::with_capacity(ops.len());
    let mut tree = CountdownTree::new();
    let min_period = tree.config().min_period.get();
    let mut countdown = tree.countdown();

    for (op_id, op) in ops.into_iter().enumerate() {
        let final_op = op.finalize(&sorted);
        let mut mutated = true;

        match final_op {
            FinalOp::Insert(value) => {
                // Equal keys sort after the ones already present.
                let idx = sorted.partition_point(|&v| v <= value);
                sorted.insert(idx, value);

                tree.insert(value);
            }

            FinalOp::Remove(value) => {
                let from_model = sorted
                    .binary_search(&value)
                    .ok()
                    .map(|idx| sorted.remove(idx));
                let from_tree = tree.remove(&value);

                assert_eq!(from_model, from_tree, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Contains(value) => {
                mutated = false;

                let from_model = sorted.binary_search(&value).is_ok();
                let from_tree = tree.contains(&value);

                assert_eq!(from_model, from_tree, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::First => {
                mutated = false;
                assert_eq!(sorted.first(), tree.first(), "FinalOp #{op_id}");
            }

            FinalOp::Last => {
                mutated = false;
                assert_eq!(sorted.last(), tree.last(), "FinalOp #{op_id}");
            }

            FinalOp::Rebalance => {
                mutated = false;
                tree.rebalance();
                tree.assert_balanced();
                countdown = tree.countdown();
            }
        }

        if mutated {
            countdown -= 1;

            if countdown == 0 {
                // The pass must have fired on this very operation.
                tree.assert_balanced();
                countdown = tree.height().max(min_period);
            }
        }

        tree.assert_invariants();
        assert_eq!(countdown, tree.countdown(), "FinalOp #{op_id}: {final_op:?}");
        assert_eq!(sorted.len(), tree.len());
        assert!(sorted.iter().eq(tree.iter()), "FinalOp #{op_id}: {final_op:?}");
    }
}
