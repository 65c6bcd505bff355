//! Package dependency graphs and their analysis.
//!
//! # Usage
//! 1. Load dependency facts into an [`RpmDb`](crate::rpmdb::RpmDb).
//! 1. Build the raw directed graph with [`DepGraph::from_requires_map`].
//! 1. Collapse dependency cycles with [`condense()`] to get a guaranteed DAG.
//! 1. Materialize per-root tree views with [`tree_from_dag`] or
//!    [`make_dependency_trees`].

use std::collections::BTreeSet;
use std::collections::BTreeMap;
use std::collections::HashMap;

use petgraph::prelude::*;
use petgraph::visit::EdgeRef;
use petgraph::visit::IntoEdgeReferences;

mod cycles;
pub use cycles::simple_cycles;

mod condense;
pub use condense::condense;
pub use condense::remove_self_loops;
pub use condense::condense_components;
pub use condense::condense_residual_cycles;

mod tree;
pub use tree::DepTree;
pub use tree::NodeIdGen;
pub use tree::tree_from_dag;
pub use tree::make_dependency_trees;

mod cache;
pub use cache::GraphCache;

/// How a degenerate node came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergeOrigin {
	/// Merged from a strongly connected component.
	StronglyConnected,
	/// Merged from a simple cycle surviving the component pass.
	SimpleCycle,
}

/// A synthetic node standing in for a group of mutually dependent packages.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DegenerateNode {
	/// Sorted member names joined with the separator of [`MergeOrigin`].
	pub name: String,
	/// The package names merged into this node, sorted.
	pub members: Vec<String>,
	pub origin: MergeOrigin,
}

/// A node of the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeData {
	/// A package known to the queried database.
	Package(String),
	/// Stand-in for packages merged during condensation.
	Degenerate(DegenerateNode),
}

impl NodeData {
	/// The name consumers see, for degenerate nodes the joined member names.
	pub fn name(&self) -> &str {
		match self {
			NodeData::Package(name) => name,
			NodeData::Degenerate(d) => &d.name,
		}
	}
}

impl std::fmt::Display for NodeData {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.name())
	}
}

/// A directed graph of package dependencies.
///
/// Wraps a petgraph [`StableDiGraph`] together with a name index so node
/// lookups stay cheap and duplicate edges can be rejected on insertion.
/// An edge `a -> b` reads as "a depends on b" for whatever relation the
/// source map encoded.
#[derive(Debug, Clone, Default)]
pub struct DepGraph {
	graph: StableDiGraph<NodeData, ()>,
	index: HashMap<String, NodeIndex>,
}

impl DepGraph {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a graph from a relation map: one node per name, one edge per
	/// `(package, relation)` pair. Duplicate pairs collapse into one edge.
	pub fn from_requires_map(map: &BTreeMap<String, Vec<String>>) -> Self {
		let mut g = Self::new();
		for (name, relations) in map {
			let from = g.get_or_add_node(name);
			for r in relations {
				let to = g.get_or_add_node(r);
				g.add_dependency(from, to);
			}
		}
		log::debug!("Built dependency graph with {} nodes and {} edges", g.node_count(), g.edge_count());
		g
	}

	pub fn get_node_index(&self, name: &str) -> Option<NodeIndex> {
		self.index.get(name).copied()
	}

	/// Returns the index of the existing node or a fresh package node with `name`.
	pub fn get_or_add_node(&mut self, name: &str) -> NodeIndex {
		match self.index.get(name) {
			Some(i) => *i,
			None => {
				let i = self.graph.add_node(NodeData::Package(name.to_string()));
				self.index.insert(name.to_string(), i);
				i
			}
		}
	}

	/// Adds the edge `from -> to` unless it already exists.
	/// Returns whether an edge was added.
	pub fn add_dependency(&mut self, from: NodeIndex, to: NodeIndex) -> bool {
		if self.graph.find_edge(from, to).is_some() {
			return false;
		}
		self.graph.add_edge(from, to, ());
		true
	}

	fn add_degenerate(&mut self, node: DegenerateNode) -> NodeIndex {
		let name = node.name.clone();
		let i = self.graph.add_node(NodeData::Degenerate(node));
		self.index.insert(name, i);
		i
	}

	/// Removes a node along with its edges, keeping the name index in sync.
	fn remove_node(&mut self, i: NodeIndex) -> Option<NodeData> {
		let data = self.graph.remove_node(i)?;
		self.index.remove(data.name());
		Some(data)
	}

	pub fn graph(&self) -> &StableDiGraph<NodeData, ()> {
		&self.graph
	}

	/// # Panics
	/// - If `i` is not a node of this graph.
	pub fn node_name(&self, i: NodeIndex) -> &str {
		self.graph.node_weight(i).expect("node index out of graph").name()
	}

	pub fn node_count(&self) -> usize {
		self.graph.node_count()
	}

	pub fn edge_count(&self) -> usize {
		self.graph.edge_count()
	}

	/// All node names in sorted order.
	pub fn node_names(&self) -> Vec<&str> {
		let mut names: Vec<&str> = self.graph.node_weights().map(NodeData::name).collect();
		names.sort_unstable();
		names
	}

	pub fn successors(&self, i: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
		self.graph.neighbors_directed(i, Outgoing)
	}

	pub fn predecessors(&self, i: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
		self.graph.neighbors_directed(i, Incoming)
	}

	/// Nodes without incoming edges but with at least one outgoing edge,
	/// sorted by name. These are the packages nothing else depends on.
	pub fn list_root_nodes(&self) -> Vec<NodeIndex> {
		self.sorted_by_name(self.graph.node_indices().filter(|&n| {
			self.predecessors(n).next().is_none() && self.successors(n).next().is_some()
		}))
	}

	/// Nodes without any edges at all, sorted by name.
	pub fn list_standalone_nodes(&self) -> Vec<NodeIndex> {
		self.sorted_by_name(self.graph.node_indices().filter(|&n| {
			self.predecessors(n).next().is_none() && self.successors(n).next().is_none()
		}))
	}

	fn sorted_by_name(&self, nodes: impl Iterator<Item = NodeIndex>) -> Vec<NodeIndex> {
		let mut nodes: Vec<NodeIndex> = nodes.collect();
		nodes.sort_by_key(|&n| self.node_name(n));
		nodes
	}

	pub fn is_dag(&self) -> bool {
		!petgraph::algo::is_cyclic_directed(&self.graph)
	}

	/// Graphviz rendering, nodes labelled through [`NodeData`]'s `Display`.
	pub fn to_dot(&self) -> String {
		/* The dot writer wants Display on edge weights too, which () lacks. */
		let labelled = self.graph.map(|_, n| n, |_, _| "");
		format!(
			"{}",
			petgraph::dot::Dot::with_config(&labelled, &[petgraph::dot::Config::EdgeNoLabel])
		)
	}

	/// Name based dump of the graph for force directed layouts.
	pub fn to_graph_dump(&self) -> GraphDump {
		let nodes = self
			.node_names()
			.into_iter()
			.map(|name| GraphDumpNode { name: name.to_string() })
			.collect();
		let mut links: Vec<GraphDumpLink> = self
			.graph
			.edge_references()
			.map(|e| GraphDumpLink {
				source: self.node_name(e.source()).to_string(),
				target: self.node_name(e.target()).to_string(),
			})
			.collect();
		links.sort_by(|a, b| (&a.source, &a.target).cmp(&(&b.source, &b.target)));
		GraphDump { nodes, links }
	}

	/// The union of `members` of every degenerate node, sorted.
	pub fn degenerate_members(&self) -> Vec<&str> {
		let mut members: BTreeSet<&str> = BTreeSet::new();
		for data in self.graph.node_weights() {
			if let NodeData::Degenerate(d) = data {
				members.extend(d.members.iter().map(String::as_str));
			}
		}
		members.into_iter().collect()
	}
}

/// Serializable graph dump, a plain node list plus name to name links.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct GraphDump {
	pub nodes: Vec<GraphDumpNode>,
	pub links: Vec<GraphDumpLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct GraphDumpNode {
	pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct GraphDumpLink {
	pub source: String,
	pub target: String,
}
