use super::*;

fn id(value: &str) -> NodeId {
    NodeId::try_new(value).unwrap()
}

fn cmd(node_id: &str, name: &str, branch: &str, rules: Vec<ProofNodeX>) -> ProofNodeX {
    ProofNodeX {
        id: id(node_id),
        branch: branch.to_string(),
        name: name.to_string(),
        node_type: ProofNodeType::ProofCommand,
        rules,
        parent: None,
    }
}

fn branch(node_id: &str, branch_id: &str, rules: Vec<ProofNodeX>) -> ProofNodeX {
    ProofNodeX {
        id: id(node_id),
        branch: branch_id.to_string(),
        name: format!("({branch_id})"),
        node_type: ProofNodeType::ProofBranch,
        rules,
        parent: None,
    }
}

fn empty_tree() -> ProofTree {
    ProofTree::new(
        id("root"),
        "foo1",
        ProofStatus::Untried,
        IdGenerator::new("t"),
    )
}

fn names(tree: &ProofTree, key: NodeKey) -> Vec<String> {
    tree.get(key)
        .unwrap()
        .children()
        .iter()
        .map(|child| tree.get(*child).unwrap().name().to_string())
        .collect()
}

#[test]
fn graft_normalizes_names_and_sorts_branches() {
    let mut tree = empty_tree();
    let root = tree.root();
    tree.graft_x(root, &cmd("c1", "skosimp*", "", vec![]));
    tree.graft_x(root, &branch("b10", "10", vec![]));
    tree.graft_x(root, &branch("b2", "2", vec![]));
    assert_eq!(names(&tree, root), vec!["(skosimp*)", "(2)", "(10)"]);
}

#[test]
fn root_typed_values_are_spliced() {
    let mut tree = empty_tree();
    let root = tree.root();
    let wrapper = ProofNodeX {
        id: id("other-root"),
        branch: String::new(),
        name: "foo1".to_string(),
        node_type: ProofNodeType::Root,
        rules: vec![cmd("a", "(assert)", "", vec![]), cmd("g", "(grind)", "", vec![])],
        parent: None,
    };
    let added = tree.graft_x(root, &wrapper);
    assert_eq!(added.len(), 2);
    assert!(!tree.contains_id(&id("other-root")));
    assert_eq!(names(&tree, root), vec!["(assert)", "(grind)"]);
}

#[test]
fn grafting_an_existing_id_is_skipped() {
    let mut tree = empty_tree();
    let root = tree.root();
    tree.graft_x(root, &cmd("a", "(assert)", "", vec![]));
    let again = tree.graft_x(root, &cmd("a", "(assert)", "", vec![]));
    assert!(again.is_empty());
    assert_eq!(tree.len(), 2);
}

#[test]
fn insert_splices_at_position() {
    let mut tree = empty_tree();
    let root = tree.root();
    tree.graft_x(root, &cmd("a", "(assert)", "", vec![]));
    tree.graft_x(root, &cmd("g", "(grind)", "", vec![]));
    tree.insert_x(root, 1, &[cmd("s", "(split)", "", vec![])]);
    assert_eq!(names(&tree, root), vec!["(assert)", "(split)", "(grind)"]);
    tree.insert_x(root, 99, &[cmd("z", "(ground)", "", vec![])]);
    assert_eq!(names(&tree, root).last().unwrap(), "(ground)");
}

#[test]
fn remove_purges_subtree_from_index() {
    let mut tree = empty_tree();
    let root = tree.root();
    tree.graft_x(
        root,
        &cmd(
            "case",
            "(case)",
            "",
            vec![
                branch("b1", "1", vec![cmd("x", "(grind)", "1", vec![])]),
                branch("b2", "2", vec![]),
            ],
        ),
    );
    let b1 = tree.find(&id("b1")).unwrap();
    let case = tree.find(&id("case")).unwrap();
    let removed = tree.remove(b1).unwrap();
    assert_eq!(removed.ids().len(), 2);
    assert!(tree.find(&id("x")).is_none());
    assert!(tree.index().get(&id("x")).is_none());
    assert_eq!(tree.get(case).unwrap().children().len(), 1);

    let b2 = tree.find(&id("b2")).unwrap();
    tree.remove(b2);
    assert_eq!(tree.get(case).unwrap().expansion(), Expansion::None);
    assert!(tree.remove(b2).is_none());
}

#[test]
fn root_keeps_expansion_when_emptied() {
    let mut tree = empty_tree();
    let root = tree.root();
    tree.graft_x(root, &cmd("a", "(assert)", "", vec![]));
    assert_eq!(tree.clear_children(root).len(), 1);
    assert_eq!(tree.root_item().expansion(), Expansion::Expanded);
    assert!(tree.remove(root).is_none());
}

#[test]
fn stale_cache_falls_back_to_walk_and_is_memoized() {
    let mut tree = empty_tree();
    let root = tree.root();
    tree.graft_x(root, &cmd("a", "(assert)", "", vec![]));
    tree.index.clear();
    assert!(tree.find(&id("a")).is_some());
    assert!(tree.index().is_empty());
    tree.resolve(&id("a"));
    assert_eq!(tree.index().len(), 1);
}

#[test]
fn membership_follows_the_index() {
    let mut tree = empty_tree();
    let root = tree.root();
    tree.graft_x(root, &cmd("a", "(assert)", "", vec![]));
    assert!(tree.contains_id(&id("a")));
    assert!(tree.graft_x(root, &cmd("a", "(grind)", "", vec![])).is_empty());

    let a = tree.find(&id("a")).unwrap();
    tree.remove(a);
    assert!(!tree.contains_id(&id("a")));
    assert_eq!(tree.graft_x(root, &cmd("a", "(grind)", "", vec![])).len(), 1);
    assert_eq!(tree.index().len(), tree.len());
}

#[test]
fn root_status_rules() {
    let mut tree = empty_tree();
    let root = tree.root();
    assert!(!tree.update_status(root, NodeStatus::Visited));
    assert!(!tree.root_item().status().visited);
    tree.update_status(root, NodeStatus::Pending);
    assert_eq!(tree.root_info().proof_status, ProofStatus::Unfinished);
    assert_eq!(tree.root_info().initial_proof_status, ProofStatus::Untried);
    tree.qed();
    assert!(tree.root_item().status().visited);
    assert_eq!(tree.root_info().proof_status, ProofStatus::Proved);
}

#[test]
fn structures_round_trip_names_and_order() {
    let proof = ProofNodeX {
        id: id("r"),
        branch: String::new(),
        name: "foo1".to_string(),
        node_type: ProofNodeType::Root,
        rules: vec![
            cmd("s", "(skosimp*)", "", vec![]),
            cmd(
                "c",
                "(case \"x!1 > 0\")",
                "",
                vec![branch("b1", "1", vec![]), branch("b2", "2", vec![])],
            ),
        ],
        parent: None,
    };
    let tree = ProofTree::from_proof_x("foo1", &proof, ProofStatus::Untried, IdGenerator::new("t"));
    let back = tree.node_x_structure(tree.root()).unwrap();
    assert_eq!(back.id, proof.id);
    assert_eq!(back.parent.as_ref(), Some(&proof.id));
    assert_eq!(back.rules.len(), 2);
    assert_eq!(back.rules[1].rules[1].name, "(2)");
    assert_eq!(back.rules[1].parent.as_ref().map(NodeId::as_str), Some("r"));
    assert_eq!(
        tree.print_proof_commands(tree.root()),
        "(skosimp*)(case \"x!1 > 0\")"
    );
}

#[test]
fn proof_node_grafts_with_fresh_ids() {
    let stored = ProofNode {
        branch: String::new(),
        name: "foo1".to_string(),
        node_type: ProofNodeType::Root,
        rules: vec![ProofNode {
            branch: String::new(),
            name: "grind".to_string(),
            node_type: ProofNodeType::ProofCommand,
            rules: vec![],
        }],
    };
    let tree = ProofTree::from_proof_node(
        "foo1",
        Some(&stored),
        ProofStatus::Proved,
        IdGenerator::new("t"),
    );
    assert_eq!(tree.len(), 2);
    assert_eq!(tree.node_structure(tree.root()).unwrap().rules[0].name, "(grind)");
}

#[test]
fn collapse_ignores_leaves() {
    let mut tree = empty_tree();
    let root = tree.root();
    let added = tree.graft_x(root, &cmd("a", "(assert)", "", vec![]));
    assert!(!tree.collapse(added[0]));
    assert!(tree.collapse(root));
    assert!(tree.expand(root));
}
