//! Working out the blast radius of removing packages.

use std::collections::BTreeSet;

use crate::rpmdb::Direction;
use crate::rpmdb::RpmDb;

/// Package names and glob patterns that must never end up in a removal set.
///
/// Entries containing `*` are treated as glob patterns matching whole names,
/// anything else matches literally.
#[derive(Debug, Clone, Default)]
pub struct ExcludeSet {
	names: BTreeSet<String>,
	patterns: Vec<regex::Regex>,
}

impl ExcludeSet {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_names(names: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
		let mut set = Self::new();
		for name in names {
			set.add(name.as_ref());
		}
		set
	}

	pub fn add(&mut self, entry: &str) {
		if entry.contains('*') {
			let pattern = format!(
				"^{}$",
				entry.split('*').map(regex::escape).collect::<Vec<_>>().join(".*")
			);
			self.patterns.push(
				regex::Regex::new(&pattern).expect("escaped glob pattern always compiles"),
			);
		} else {
			self.names.insert(entry.to_string());
		}
	}

	pub fn contains(&self, name: &str) -> bool {
		self.names.contains(name) || self.patterns.iter().any(|p| p.is_match(name))
	}

	pub fn is_empty(&self) -> bool {
		self.names.is_empty() && self.patterns.is_empty()
	}
}

/// The full set of packages dragged out by removing `requested`.
///
/// Breadth first closure over the relation `direction` selects:
/// [`Direction::Requires`] follows what the frontier packages require, like
/// an autoremove, [`Direction::RequiredBy`] follows what requires them, the
/// packages a removal would break. Excluded packages are never entered nor
/// followed. Names unknown to `db` are kept but expand to nothing, request
/// lists are allowed to be older or newer than the database.
///
/// The result is sorted and includes the requested packages themselves.
pub fn compute_removed(
	db: &RpmDb,
	requested: impl IntoIterator<Item = impl AsRef<str>>,
	excludes: &ExcludeSet,
	direction: Direction,
) -> Vec<String> {
	let mut removed: BTreeSet<String> = BTreeSet::new();
	let mut frontier: Vec<String> = Vec::new();
	for name in requested {
		let name = name.as_ref();
		if excludes.contains(name) {
			log::info!("Requested package {} is excluded from removal", name);
			continue;
		}
		if !db.is_installed(name) {
			log::warn!("Requested package {} is not installed", name);
		}
		if removed.insert(name.to_string()) {
			frontier.push(name.to_string());
		}
	}

	while let Some(p) = frontier.pop() {
		for dep in db.related_of(&p, direction) {
			if excludes.contains(dep) {
				log::trace!("Not following {} -> {}, excluded", p, dep);
				continue;
			}
			if removed.insert(dep.clone()) {
				frontier.push(dep.clone());
			}
		}
	}

	removed.into_iter().collect()
}

/// Packages with at most `limit` requires plus required-by relations after
/// dropping excluded names, sorted. Candidates safe to remove in isolation.
///
/// Relations to excluded packages still count, the exclusion only filters
/// which packages are reported.
pub fn list_standalones(db: &RpmDb, limit: usize, excludes: &ExcludeSet) -> Vec<String> {
	db.package_names()
		.filter(|n| !excludes.contains(n))
		.filter(|n| db.requires_of(n).len() + db.required_by_of(n).len() <= limit)
		.map(String::from)
		.collect()
}

/// Packages nothing else requires, sorted. Removing one can never break
/// another installed package.
pub fn list_leaves(db: &RpmDb) -> Vec<String> {
	db.package_names()
		.filter(|n| db.required_by_of(n).is_empty())
		.map(String::from)
		.collect()
}
