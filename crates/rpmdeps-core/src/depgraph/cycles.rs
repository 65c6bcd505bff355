//! Cycle discovery: self loops, strongly connected components and elementary cycles.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use petgraph::prelude::*;
use petgraph::algo::tarjan_scc;

use super::DepGraph;

impl DepGraph {
	/// Nodes carrying an edge to themselves, sorted by name.
	pub fn self_loops(&self) -> Vec<NodeIndex> {
		let loops = self
			.graph()
			.node_indices()
			.filter(|&n| self.graph().find_edge(n, n).is_some());
		self.sorted_by_name(loops)
	}

	/// Strongly connected components of the graph.
	///
	/// Members are sorted by name and components by their first member, so
	/// the result is stable for a given graph.
	pub fn strongly_connected_components(&self) -> Vec<Vec<NodeIndex>> {
		let mut components = tarjan_scc(self.graph());
		for component in &mut components {
			component.sort_by_key(|&n| self.node_name(n));
		}
		components.sort_by_key(|c| self.node_name(c[0]));
		components
	}
}

/// All elementary cycles of the graph, found with Johnson's algorithm.
///
/// A cycle is reported as the nodes along it in edge order, without repeating
/// the first node at the end. Self loops come out as single element cycles.
/// Every elementary cycle is reported exactly once, however many nodes it
/// shares with other cycles.
pub fn simple_cycles(g: &DepGraph) -> Vec<Vec<NodeIndex>> {
	/* Neighbor sets we can strip self loops from up front, Johnson's
	 * algorithm proper only handles cycles of length two and up. */
	let mut adjacency: BTreeMap<NodeIndex, BTreeSet<NodeIndex>> = g
		.graph()
		.node_indices()
		.map(|n| (n, g.successors(n).collect()))
		.collect();

	let mut cycles: Vec<Vec<NodeIndex>> = Vec::new();
	for (&n, neighbors) in &mut adjacency {
		if neighbors.remove(&n) {
			cycles.push(vec![n]);
		}
	}

	let mut queue: Vec<BTreeSet<NodeIndex>> = g
		.strongly_connected_components()
		.into_iter()
		.filter(|c| c.len() > 1)
		.map(|c| c.into_iter().collect())
		.collect();

	while let Some(scc_nodes) = queue.pop() {
		let Some(&start) = scc_nodes.iter().next() else { continue };

		/* Depth first search collecting every cycle through `start` inside
		 * this component. `blocked_by` records which nodes must be unblocked
		 * when one of their successors turns out to lie on a cycle. */
		let mut path: Vec<NodeIndex> = vec![start];
		let mut blocked: BTreeSet<NodeIndex> = BTreeSet::from([start]);
		let mut closed: BTreeSet<NodeIndex> = BTreeSet::new();
		let mut blocked_by: BTreeMap<NodeIndex, BTreeSet<NodeIndex>> = BTreeMap::new();
		let mut stack: Vec<(NodeIndex, Vec<NodeIndex>)> =
			vec![(start, in_component(&adjacency, &scc_nodes, start))];

		while !stack.is_empty() {
			let (this, next) = {
				let frame = stack.last_mut().expect("search stack emptied mid-iteration");
				(frame.0, frame.1.pop())
			};
			match next {
				Some(next) if next == start => {
					cycles.push(path.clone());
					closed.extend(path.iter().copied());
				}
				Some(next) if !blocked.contains(&next) => {
					path.push(next);
					closed.remove(&next);
					blocked.insert(next);
					let neighbors = in_component(&adjacency, &scc_nodes, next);
					stack.push((next, neighbors));
					continue;
				}
				/* A blocked neighbor cannot lead back to `start`, skip it. */
				Some(_) | None => {}
			}

			let exhausted = stack.last().map_or(false, |f| f.1.is_empty());
			if exhausted {
				stack.pop();
				path.pop();
				if closed.contains(&this) {
					unblock(this, &mut blocked, &mut blocked_by);
				} else {
					for neighbor in in_component(&adjacency, &scc_nodes, this) {
						blocked_by.entry(neighbor).or_default().insert(this);
					}
				}
			}
		}

		/* Every cycle through `start` is recorded, recurse into what remains. */
		let mut remaining = scc_nodes;
		remaining.remove(&start);
		for component in sccs_restricted(g, &remaining) {
			if component.len() > 1 {
				queue.push(component.into_iter().collect());
			}
		}
	}

	cycles
}

fn in_component(
	adjacency: &BTreeMap<NodeIndex, BTreeSet<NodeIndex>>,
	component: &BTreeSet<NodeIndex>,
	node: NodeIndex,
) -> Vec<NodeIndex> {
	adjacency
		.get(&node)
		.map(|neighbors| {
			neighbors
				.iter()
				.copied()
				.filter(|n| component.contains(n))
				.collect()
		})
		.unwrap_or_default()
}

fn unblock(
	node: NodeIndex,
	blocked: &mut BTreeSet<NodeIndex>,
	blocked_by: &mut BTreeMap<NodeIndex, BTreeSet<NodeIndex>>,
) {
	let mut pending = vec![node];
	while let Some(n) = pending.pop() {
		if blocked.remove(&n) {
			if let Some(dependants) = blocked_by.get_mut(&n) {
				pending.extend(dependants.iter().copied());
				dependants.clear();
			}
		}
	}
}

/* Strongly connected components of the graph restricted to `keep`. A stable
 * graph keeps its indices across removals, so the returned components are
 * valid in the full graph too. */
fn sccs_restricted(g: &DepGraph, keep: &BTreeSet<NodeIndex>) -> Vec<Vec<NodeIndex>> {
	let mut sub = g.graph().clone();
	sub.retain_nodes(|_, n| keep.contains(&n));
	tarjan_scc(&sub)
}
