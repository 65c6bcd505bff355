//! Dependency facts extracted from an RPM database.
//!
//! Talking to rpm itself is left to external tooling. This module consumes an
//! offline JSON dump of the facts, see [`DUMP_FILE_NAME`] for the expected
//! location and [`RpmDb::load_from_root`] for the accepted shapes.

use std::collections::BTreeMap;

/// File name of the dependency dump expected under an RPM database root.
pub const DUMP_FILE_NAME: &str = "rpm-requires.json";

/// Which way dependency facts point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Direction {
	/// Package to the packages it requires.
	Requires,
	/// Package to the packages requiring it.
	RequiredBy,
}

/// NEVRA style record for one installed package.
///
/// Only the identity fields are interpreted. Anything else found in a dump
/// record lands in `extras` untouched so dumps from richer tools survive a
/// round trip.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PackageMeta {
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub epoch: Option<u32>,
	pub version: String,
	pub release: String,
	pub arch: String,
	#[serde(flatten)]
	pub extras: BTreeMap<String, serde_json::Value>,
}

impl std::fmt::Display for PackageMeta {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self.epoch {
			Some(e) => write!(f, "{}-{}:{}-{}.{}", self.name, e, self.version, self.release, self.arch),
			None => write!(f, "{}-{}-{}.{}", self.name, self.version, self.release, self.arch),
		}
	}
}

/* Accepted dump shapes: either a bare name -> requirements map or a wrapper
 * object carrying the map alongside optional package records. */
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum DumpFile {
	Full {
		requires: BTreeMap<String, Vec<String>>,
		#[serde(default)]
		packages: Vec<PackageMeta>,
	},
	Bare(BTreeMap<String, Vec<String>>),
}

/// Dependency facts for the packages installed under one RPM database root.
///
/// Requirement lists are kept in both directions so reverse queries cost the
/// same as forward ones. Every package named anywhere in the facts has an
/// entry in both maps, packages nothing is known about simply map to empty
/// lists.
#[derive(Debug, Clone, Default)]
pub struct RpmDb {
	root: std::path::PathBuf,
	requires: BTreeMap<String, Vec<String>>,
	required_by: BTreeMap<String, Vec<String>>,
	packages: BTreeMap<String, PackageMeta>,
}

impl RpmDb {
	/// Builds a database from an in-memory requirements map.
	///
	/// Names appearing only on the right hand side are registered as packages
	/// with no requirements of their own. Requirement lists are sorted and
	/// deduplicated.
	pub fn from_requires_map(map: BTreeMap<String, Vec<String>>) -> Self {
		let mut requires: BTreeMap<String, Vec<String>> = BTreeMap::new();
		for (name, mut relations) in map {
			relations.sort();
			relations.dedup();
			requires.insert(name, relations);
		}

		let missing: Vec<String> = requires
			.values()
			.flatten()
			.filter(|r| !requires.contains_key(*r))
			.cloned()
			.collect();
		if !missing.is_empty() {
			log::warn!("Registering {} packages only named as requirements", missing.len());
			for name in missing {
				requires.entry(name).or_default();
			}
		}

		let required_by = invert(&requires);
		Self {
			root: std::path::PathBuf::new(),
			requires,
			required_by,
			packages: BTreeMap::new(),
		}
	}

	/// Reads the dependency dump for `root`.
	///
	/// # Parameters
	/// - `root` - the dump file itself or a directory holding [`DUMP_FILE_NAME`].
	///
	/// # Errors
	/// - [`crate::Error::DumpNotFound`] when no dump exists under `root`.
	/// - [`crate::Error::SerdeJSON`] when the dump does not parse.
	pub fn load_from_root(root: impl AsRef<std::path::Path>) -> crate::Result<Self> {
		let root = root.as_ref();
		let dump_path = if root.is_file() {
			root.to_path_buf()
		} else {
			root.join(DUMP_FILE_NAME)
		};
		if !dump_path.is_file() {
			return Err(crate::Error::DumpNotFound(dump_path));
		}

		let file = std::fs::File::open(&dump_path)?;
		let dump: DumpFile = serde_json::from_reader(std::io::BufReader::new(file))?;
		let (map, records) = match dump {
			DumpFile::Full { requires, packages } => (requires, packages),
			DumpFile::Bare(requires) => (requires, Vec::new()),
		};

		let mut db = Self::from_requires_map(map);
		db.root = root.to_path_buf();
		for record in records {
			/* A record for a package absent from the map still counts as installed. */
			db.requires.entry(record.name.clone()).or_default();
			db.required_by.entry(record.name.clone()).or_default();
			db.packages.insert(record.name.clone(), record);
		}

		log::info!(
			"Loaded dependency facts for {} packages from {}",
			db.requires.len(),
			dump_path.display()
		);
		Ok(db)
	}

	/// The root this database was loaded from, empty for in-memory databases.
	pub fn root(&self) -> &std::path::Path {
		&self.root
	}

	pub fn is_installed(&self, name: &str) -> bool {
		self.requires.contains_key(name)
	}

	/// Packages `name` requires, empty when `name` is unknown.
	pub fn requires_of(&self, name: &str) -> &[String] {
		self.requires.get(name).map(Vec::as_slice).unwrap_or(&[])
	}

	/// Packages requiring `name`, empty when `name` is unknown.
	pub fn required_by_of(&self, name: &str) -> &[String] {
		self.required_by.get(name).map(Vec::as_slice).unwrap_or(&[])
	}

	/// [`Self::requires_of`] or [`Self::required_by_of`] depending on `direction`.
	pub fn related_of(&self, name: &str, direction: Direction) -> &[String] {
		match direction {
			Direction::Requires => self.requires_of(name),
			Direction::RequiredBy => self.required_by_of(name),
		}
	}

	/// The full relation map for `direction`, keyed by package name.
	pub fn requires_map(&self, direction: Direction) -> &BTreeMap<String, Vec<String>> {
		match direction {
			Direction::Requires => &self.requires,
			Direction::RequiredBy => &self.required_by,
		}
	}

	/// All installed package names in sorted order.
	pub fn package_names(&self) -> impl Iterator<Item = &str> {
		self.requires.keys().map(String::as_str)
	}

	pub fn package_meta(&self, name: &str) -> Option<&PackageMeta> {
		self.packages.get(name)
	}

	pub fn len(&self) -> usize {
		self.requires.len()
	}

	pub fn is_empty(&self) -> bool {
		self.requires.is_empty()
	}
}

/* Every key of the input appears in the output even when nothing requires it,
 * so both maps always agree on the package universe. */
fn invert(map: &BTreeMap<String, Vec<String>>) -> BTreeMap<String, Vec<String>> {
	let mut inverted: BTreeMap<String, Vec<String>> = map.keys().map(|k| (k.clone(), Vec::new())).collect();
	for (name, relations) in map {
		for r in relations {
			inverted.entry(r.clone()).or_default().push(name.clone());
		}
	}
	for relations in inverted.values_mut() {
		relations.sort();
		relations.dedup();
	}
	inverted
}
