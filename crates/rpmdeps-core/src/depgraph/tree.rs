//! Tree views of an acyclic dependency graph.

use std::collections::HashMap;
use std::collections::HashSet;

use petgraph::stable_graph::NodeIndex;

use crate::rpmdb::Direction;
use crate::rpmdb::RpmDb;
use super::DepGraph;
use super::condense;

/// Mints unique ids for cloned tree nodes.
///
/// A package reachable through two different parents appears twice in a
/// tree, the second occurrence gets its id from this allocator. Sharing one
/// allocator across [`tree_from_dag`] calls keeps ids unique over a whole
/// forest.
#[derive(Debug, Default)]
pub struct NodeIdGen {
	next: u64,
}

impl NodeIdGen {
	pub fn new() -> Self {
		Self::default()
	}

	/// `<name>#<n>`. The suffix only disambiguates, consumers wanting the
	/// package should read the node's `name` instead.
	fn clone_id(&mut self, name: &str) -> String {
		let id = format!("{}#{}", name, self.next);
		self.next += 1;
		id
	}
}

/// One node of a materialized dependency tree.
///
/// Serializes to the `{"name": ..., "children": [...]}` shape hierarchical
/// layouts consume. `id` is process local bookkeeping and stays off the wire.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DepTree {
	#[serde(skip)]
	pub id: String,
	pub name: String,
	pub children: Vec<DepTree>,
}

impl DepTree {
	/// Total node count including clones.
	pub fn size(&self) -> usize {
		1 + self.children.iter().map(DepTree::size).sum::<usize>()
	}

	/// Calls `f` on every node in depth first order.
	pub fn for_each(&self, f: &mut impl FnMut(&DepTree)) {
		f(self);
		for child in &self.children {
			child.for_each(f);
		}
	}
}

/* How a node hangs off its parent: expanded in place or as a childless
 * clone of a node expanded elsewhere in the same tree. */
enum Child {
	Expand(NodeIndex),
	Clone(NodeIndex),
}

/// Materializes the tree of everything reachable from `root` in `graph`.
///
/// The graph is walked breadth first. The first visit of a node expands it
/// in place, any later visit through another parent attaches a childless
/// clone with a fresh id from `ids` instead. Children are sorted by name.
/// Every call starts from an empty visited set, trees for different roots
/// are fully independent.
///
/// # Parameters
/// - `graph` - an acyclic dependency graph, see [`condense()`].
/// - `root` - name of the node to start from.
/// - `ids` - allocator for clone ids, shared across calls for forest wide uniqueness.
///
/// # Errors
/// - [`crate::Error::UnknownPackage`] when `root` is not a node of `graph`.
///
/// # Panics
/// - If `graph` contains a cycle. Condense first.
pub fn tree_from_dag(graph: &DepGraph, root: &str, ids: &mut NodeIdGen) -> crate::Result<DepTree> {
	assert!(graph.is_dag(), "tree requested from a cyclic graph");
	let root_ix = graph
		.get_node_index(root)
		.ok_or_else(|| crate::Error::UnknownPackage(root.to_string()))?;

	let mut visited: HashSet<NodeIndex> = HashSet::from([root_ix]);
	let mut frontier: Vec<NodeIndex> = vec![root_ix];
	let mut children: HashMap<NodeIndex, Vec<Child>> = HashMap::new();

	while !frontier.is_empty() {
		let mut next_frontier = Vec::new();
		for &p in &frontier {
			let mut successors: Vec<NodeIndex> = graph.successors(p).collect();
			successors.sort_by_key(|&s| graph.node_name(s));
			for s in successors {
				if visited.insert(s) {
					children.entry(p).or_default().push(Child::Expand(s));
					next_frontier.push(s);
				} else {
					log::trace!(
						"Attaching clone of {} under {}",
						graph.node_name(s),
						graph.node_name(p)
					);
					children.entry(p).or_default().push(Child::Clone(s));
				}
			}
		}
		frontier = next_frontier;
	}

	Ok(assemble(graph, root_ix, &children, ids))
}

fn assemble(
	graph: &DepGraph,
	node: NodeIndex,
	children: &HashMap<NodeIndex, Vec<Child>>,
	ids: &mut NodeIdGen,
) -> DepTree {
	let name = graph.node_name(node).to_string();
	let mut tree = DepTree {
		id: name.clone(),
		name,
		children: Vec::new(),
	};
	if let Some(kids) = children.get(&node) {
		for kid in kids {
			match kid {
				Child::Expand(c) => tree.children.push(assemble(graph, *c, children, ids)),
				Child::Clone(c) => {
					let name = graph.node_name(*c);
					tree.children.push(DepTree {
						id: ids.clone_id(name),
						name: name.to_string(),
						children: Vec::new(),
					});
				}
			}
		}
	}
	tree
}

/// Builds the dependency graph for `direction`, condenses it and
/// materializes one tree per root node, in root name order.
pub fn make_dependency_trees(db: &RpmDb, direction: Direction) -> Vec<DepTree> {
	let graph = DepGraph::from_requires_map(db.requires_map(direction));
	let dag = condense(&graph);
	let mut ids = NodeIdGen::new();
	dag.list_root_nodes()
		.into_iter()
		.map(|r| {
			tree_from_dag(&dag, dag.node_name(r), &mut ids)
				.expect("root listed but absent from its own graph")
		})
		.collect()
}
