//! Degenerating cyclic structures into single nodes.

use std::collections::BTreeSet;

use petgraph::prelude::*;

use super::DegenerateNode;
use super::DepGraph;
use super::MergeOrigin;
use super::cycles::simple_cycles;

impl MergeOrigin {
	/// Separator used when joining member names, distinct per origin so a
	/// node name records which pass produced it.
	pub fn separator(self) -> &'static str {
		match self {
			MergeOrigin::StronglyConnected => "|",
			MergeOrigin::SimpleCycle => ",",
		}
	}
}

/// Collapses every dependency cycle of `graph` into a single degenerate node.
///
/// Returns a new graph, the input stays untouched so cached graphs survive.
/// The passes run in order:
/// 1. [`remove_self_loops`] drops edges from a node to itself.
/// 1. [`condense_components`] merges every strongly connected component of
///    two or more nodes.
/// 1. [`condense_residual_cycles`] sweeps up simple cycles that might still
///    remain. After the component pass this should find nothing, the sweep
///    exists as a safety net.
///
/// # Panics
/// - If the merged graph still contains a self loop, a multi node component
///   or a simple cycle. Condensation itself would be broken and no caller
///   could trust the output, so this is not a recoverable error.
pub fn condense(graph: &DepGraph) -> DepGraph {
	let mut g = graph.clone();

	remove_self_loops(&mut g);
	condense_components(&mut g);
	condense_residual_cycles(&mut g);

	assert!(g.self_loops().is_empty(), "self loops survived condensation");
	assert!(
		g.strongly_connected_components().iter().all(|c| c.len() == 1),
		"a strongly connected component survived condensation"
	);
	assert!(simple_cycles(&g).is_empty(), "a simple cycle survived condensation");
	assert!(g.is_dag(), "condensed graph is not a DAG");

	g
}

/// Removes every edge pointing from a node back to itself.
pub fn remove_self_loops(g: &mut DepGraph) {
	for n in g.self_loops() {
		if let Some(edge) = g.graph.find_edge(n, n) {
			g.graph.remove_edge(edge);
			log::debug!("Removed self loop on {}", g.node_name(n));
		}
	}
}

/// Merges every strongly connected component of two or more nodes into a
/// degenerate node named by its sorted members joined with `|`.
pub fn condense_components(g: &mut DepGraph) {
	let components: Vec<Vec<NodeIndex>> = g
		.strongly_connected_components()
		.into_iter()
		.filter(|c| c.len() > 1)
		.collect();
	for members in components {
		merge_members(g, &members, MergeOrigin::StronglyConnected);
	}
}

/// Merges simple cycles left after [`condense_components`], named by their
/// sorted members joined with `,`. Re-scans after every merge until no cycle
/// of two or more nodes remains.
///
/// # Panics
/// - If a cycle of length one turns up. Self loops must be stripped before
///   condensation, finding one here means an earlier pass is broken.
pub fn condense_residual_cycles(g: &mut DepGraph) {
	loop {
		let cycles = simple_cycles(g);
		let Some(cycle) = cycles.into_iter().next() else {
			break;
		};
		if cycle.len() == 1 {
			panic!(
				"self cycle on {} reached the residual sweep, self loops must be removed first",
				g.node_name(cycle[0])
			);
		}
		log::debug!("Residual simple cycle of {} nodes, merging", cycle.len());
		merge_members(g, &cycle, MergeOrigin::SimpleCycle);
	}
}

/* Replaces `members` with one degenerate node carrying their name union.
 * Edges inside the group vanish with the member nodes, boundary edges are
 * rewired to the new node with duplicates collapsed. */
fn merge_members(g: &mut DepGraph, members: &[NodeIndex], origin: MergeOrigin) -> NodeIndex {
	let member_set: BTreeSet<NodeIndex> = members.iter().copied().collect();
	let mut names: Vec<String> = members.iter().map(|&m| g.node_name(m).to_string()).collect();
	names.sort();
	let name = names.join(origin.separator());

	/* Boundary edges have to be collected before any node is removed. */
	let mut incoming: BTreeSet<NodeIndex> = BTreeSet::new();
	let mut outgoing: BTreeSet<NodeIndex> = BTreeSet::new();
	for &m in members {
		incoming.extend(g.predecessors(m).filter(|p| !member_set.contains(p)));
		outgoing.extend(g.successors(m).filter(|s| !member_set.contains(s)));
	}

	for &m in members {
		g.remove_node(m);
	}
	let merged = g.add_degenerate(DegenerateNode {
		name,
		members: names,
		origin,
	});
	for p in incoming {
		g.add_dependency(p, merged);
	}
	for s in outgoing {
		g.add_dependency(merged, s);
	}

	log::debug!(
		"Merged {} mutually dependent nodes into {}",
		member_set.len(),
		g.node_name(merged)
	);
	merged
}
