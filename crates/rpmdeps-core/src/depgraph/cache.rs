//! Memoized graph construction.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::rpmdb::Direction;
use crate::rpmdb::RpmDb;
use super::DepGraph;

/// Remembers built graphs per database root and direction so repeated
/// analyses skip reconstruction.
///
/// Entries hand out clones, condensation and the other passes always work
/// on their own copy and never mutate a cached graph. In-memory databases
/// all share the empty root path, keep one cache per database in that case.
#[derive(Debug, Default)]
pub struct GraphCache {
	graphs: HashMap<(PathBuf, Direction), DepGraph>,
	hits: usize,
	misses: usize,
}

impl GraphCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns a copy of the graph for `db` and `direction`, building it on
	/// first use.
	pub fn get_or_build(&mut self, db: &RpmDb, direction: Direction) -> DepGraph {
		let key = (db.root().to_path_buf(), direction);
		if let Some(g) = self.graphs.get(&key) {
			self.hits += 1;
			log::trace!("Graph cache hit for {} ({:?})", key.0.display(), direction);
			return g.clone();
		}
		self.misses += 1;
		let g = DepGraph::from_requires_map(db.requires_map(direction));
		self.graphs.insert(key, g.clone());
		g
	}

	/// Drops every cached graph. Hit and miss counters keep counting.
	pub fn clear(&mut self) {
		self.graphs.clear();
	}

	pub fn len(&self) -> usize {
		self.graphs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.graphs.is_empty()
	}

	pub fn hits(&self) -> usize {
		self.hits
	}

	pub fn misses(&self) -> usize {
		self.misses
	}
}
