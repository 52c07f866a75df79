#![forbid(unsafe_code)]

use pm_core::naming::branch_sort_key;
use pm_core::status::StatusFlags;
use pm_core::tree::ProofTree;
use pm_core::{IdGenerator, NodeId, NodeStatus, ProofNodeType, ProofNodeX, ProofStatus};
use proptest::prelude::*;

fn status_strategy() -> impl Strategy<Value = NodeStatus> {
    prop_oneof![
        Just(NodeStatus::Active),
        Just(NodeStatus::Visited),
        Just(NodeStatus::NotVisited),
        Just(NodeStatus::Pending),
        Just(NodeStatus::Complete),
        Just(NodeStatus::NotComplete),
    ]
}

#[derive(Clone, Debug)]
enum Op {
    /// Append a branch with this number under the node picked by the index.
    Branch(usize, u16),
    /// Append a command under the node picked by the index.
    Command(usize),
    /// Remove the node picked by the index.
    Remove(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<usize>(), 0u16..40).prop_map(|(at, n)| Op::Branch(at, n)),
        any::<usize>().prop_map(Op::Command),
        any::<usize>().prop_map(Op::Remove),
    ]
}

fn elem(id: &str, node_type: ProofNodeType, branch: String) -> ProofNodeX {
    ProofNodeX {
        id: NodeId::try_new(id).unwrap(),
        name: if node_type == ProofNodeType::ProofBranch {
            format!("({branch})")
        } else {
            "(grind)".to_string()
        },
        branch,
        node_type,
        rules: vec![],
        parent: None,
    }
}

proptest! {
    #[test]
    fn flags_stay_exclusive(statuses in proptest::collection::vec(status_strategy(), 0..40)) {
        let mut flags = StatusFlags::default();
        for status in statuses {
            flags.apply(status);
            let exclusive = [flags.active, flags.visited, flags.pending]
                .iter()
                .filter(|flag| **flag)
                .count();
            prop_assert!(exclusive <= 1);
            if status == NodeStatus::NotVisited {
                prop_assert!(!flags.complete);
            }
        }
    }

    #[test]
    fn children_sorted_and_index_consistent(ops in proptest::collection::vec(op_strategy(), 1..60)) {
        let mut tree = ProofTree::new(
            NodeId::try_new("root").unwrap(),
            "foo1",
            ProofStatus::Untried,
            IdGenerator::new("p"),
        );
        let mut removed: Vec<NodeId> = Vec::new();
        for (n, op) in ops.into_iter().enumerate() {
            let keys = tree.walk();
            match op {
                Op::Branch(at, number) => {
                    let parent = keys[at % keys.len()];
                    let prefix = tree.get(parent).unwrap().branch_id().to_string();
                    let branch = if prefix.is_empty() {
                        number.to_string()
                    } else {
                        format!("{prefix}.{number}")
                    };
                    tree.graft_x(parent, &elem(&format!("n{n}"), ProofNodeType::ProofBranch, branch));
                }
                Op::Command(at) => {
                    let parent = keys[at % keys.len()];
                    tree.graft_x(parent, &elem(&format!("n{n}"), ProofNodeType::ProofCommand, String::new()));
                }
                Op::Remove(at) => {
                    let key = keys[at % keys.len()];
                    if let Some(gone) = tree.remove(key) {
                        removed.extend(gone.ids());
                    }
                }
            }

            for key in tree.walk() {
                let item = tree.get(key).unwrap();
                let orders: Vec<u64> = item
                    .children()
                    .iter()
                    .map(|child| branch_sort_key(tree.get(*child).unwrap().branch_id()))
                    .collect();
                prop_assert!(orders.windows(2).all(|pair| pair[0] <= pair[1]));
                prop_assert_eq!(tree.index().get(item.id()), Some(key));
            }
            prop_assert_eq!(tree.index().len(), tree.len());
            for id in &removed {
                prop_assert!(tree.find(id).is_none());
            }
        }
    }
}
