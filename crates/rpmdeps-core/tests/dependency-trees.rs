use std::collections::BTreeSet;

use rpmdeps::DepGraph;
use rpmdeps::depgraph::DepTree;
use rpmdeps::depgraph::NodeIdGen;
use rpmdeps::depgraph::condense;
use rpmdeps::depgraph::make_dependency_trees;
use rpmdeps::depgraph::tree_from_dag;

fn diamond_graph() -> DepGraph {
	DepGraph::from_requires_map(&rpmdeps_test_utils::requires_map(&[
		("top", &["left", "right"]),
		("left", &["shared"]),
		("right", &["shared"]),
		("shared", &["deep"]),
		("deep", &[]),
	]))
}

fn tree_ids(tree: &DepTree) -> Vec<String> {
	let mut ids = Vec::new();
	tree.for_each(&mut |node| ids.push(node.id.clone()));
	ids
}

fn tree_names(tree: &DepTree) -> BTreeSet<String> {
	let mut names = BTreeSet::new();
	tree.for_each(&mut |node| {
		names.insert(node.name.clone());
	});
	names
}

#[test]
fn each_root_gets_an_independent_tree() {
	let dag = condense(&DepGraph::from_requires_map(&rpmdeps_test_utils::forked_requires_map()));

	let roots: Vec<&str> = dag.list_root_nodes().into_iter().map(|n| dag.node_name(n)).collect();
	assert_eq!(roots, vec!["X", "Z"]);

	let mut ids = NodeIdGen::new();
	let tx = tree_from_dag(&dag, "X", &mut ids).expect("tree for X");
	let tz = tree_from_dag(&dag, "Z", &mut ids).expect("tree for Z");

	assert_eq!(tx.name, "X");
	assert_eq!(tx.children.len(), 1);
	assert_eq!(tx.children[0].name, "Y");

	/* Calls do not share visited state, Z sees Y expanded too, not cloned. */
	assert_eq!(tz.children.len(), 1);
	assert_eq!(tz.children[0].id, "Y");
	assert!(tz.children[0].children.is_empty());
}

#[test]
fn shared_child_is_cloned_within_one_tree() {
	let dag = condense(&diamond_graph());
	let tree = tree_from_dag(&dag, "top", &mut NodeIdGen::new()).expect("tree for top");

	assert_eq!(tree.children.len(), 2);
	let left = &tree.children[0];
	let right = &tree.children[1];
	assert_eq!(left.name, "left");
	assert_eq!(right.name, "right");

	/* First visit expands shared in place, the second parent gets a clone. */
	let expanded = &left.children[0];
	assert_eq!(expanded.id, "shared");
	assert_eq!(expanded.children.len(), 1);
	assert_eq!(expanded.children[0].name, "deep");

	let clone = &right.children[0];
	assert_eq!(clone.name, "shared");
	assert_ne!(clone.id, "shared");
	assert!(clone.children.is_empty(), "clones must not re-expand their successors");

	assert_eq!(tree.size(), 6);
}

#[test]
fn node_ids_are_unique_within_a_tree() {
	let dag = condense(&diamond_graph());
	let tree = tree_from_dag(&dag, "top", &mut NodeIdGen::new()).expect("tree for top");

	let ids = tree_ids(&tree);
	let unique: BTreeSet<&String> = ids.iter().collect();
	assert_eq!(ids.len(), unique.len(), "duplicate tree node id: {:?}", ids);
}

#[test]
fn tree_reaches_everything_reachable_from_its_root() {
	let dag = condense(&DepGraph::from_requires_map(&rpmdeps_test_utils::base_system_requires_map()));
	let tree = tree_from_dag(&dag, "rpm", &mut NodeIdGen::new()).expect("tree for rpm");

	let expected: BTreeSet<String> = ["rpm", "bash", "glibc", "popt", "zlib"]
		.into_iter()
		.map(String::from)
		.collect();
	assert_eq!(tree_names(&tree), expected);
}

#[test]
fn trees_serialize_as_name_plus_children() {
	let dag = condense(&DepGraph::from_requires_map(&rpmdeps_test_utils::forked_requires_map()));
	let tree = tree_from_dag(&dag, "X", &mut NodeIdGen::new()).expect("tree for X");

	let value = serde_json::to_value(&tree).expect("tree should serialize");
	assert_eq!(
		value,
		serde_json::json!({
			"name": "X",
			"children": [
				{ "name": "Y", "children": [] },
			],
		})
	);
}

#[test]
fn unknown_root_is_an_error() {
	let dag = condense(&DepGraph::from_requires_map(&rpmdeps_test_utils::forked_requires_map()));

	match tree_from_dag(&dag, "ghost", &mut NodeIdGen::new()) {
		Err(rpmdeps::Error::UnknownPackage(name)) => assert_eq!(name, "ghost"),
		other => panic!("expected unknown package error, got {:?}", other.map(|t| t.name)),
	}
}

#[test]
#[should_panic(expected = "cyclic graph")]
fn tree_from_cyclic_graph_panics() {
	let g = DepGraph::from_requires_map(&rpmdeps_test_utils::three_cycle_requires_map());
	let _ = tree_from_dag(&g, "A", &mut NodeIdGen::new());
}

#[test]
fn forest_builds_one_tree_per_root() {
	let db = rpmdeps_test_utils::base_system_rpmdb();
	let trees = make_dependency_trees(&db, rpmdeps::Direction::Requires);

	let root_names: Vec<&str> = trees.iter().map(|t| t.name.as_str()).collect();
	assert_eq!(root_names, vec!["basesystem", "coreutils", "dbus|systemd", "rpm"]);

	for tree in &trees {
		let ids = tree_ids(tree);
		let unique: BTreeSet<&String> = ids.iter().collect();
		assert_eq!(ids.len(), unique.len(), "duplicate id inside tree {}", tree.name);
	}
}

#[test]
fn tree_materializes_every_reachable_edge() {
	let dag = condense(&DepGraph::from_requires_map(&rpmdeps_test_utils::base_system_requires_map()));
	let tree = tree_from_dag(&dag, "rpm", &mut NodeIdGen::new()).expect("tree for rpm");

	let mut pairs: BTreeSet<(String, String)> = BTreeSet::new();
	tree.for_each(&mut |node| {
		for child in &node.children {
			pairs.insert((node.name.clone(), child.name.clone()));
		}
	});

	/* Every edge leaving a node reachable from rpm shows up as a parent
	 * and child pair, through an expansion or a clone. */
	let expected: BTreeSet<(String, String)> = [
		("rpm", "bash"),
		("rpm", "glibc"),
		("rpm", "popt"),
		("rpm", "zlib"),
		("bash", "glibc"),
		("popt", "glibc"),
		("zlib", "glibc"),
	]
	.into_iter()
	.map(|(p, c)| (p.to_string(), c.to_string()))
	.collect();
	assert_eq!(pairs, expected);

	/* Five expanded nodes plus one glibc clone per extra parent. */
	assert_eq!(tree.size(), 8);
	let mut clones = 0;
	tree.for_each(&mut |node| {
		if node.id != node.name {
			clones += 1;
		}
	});
	assert_eq!(clones, 3);
}
