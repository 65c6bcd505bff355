//! Canned dependency fixtures for exercising the analysis crates.
//!
//! functions in this module should use results and not use any panics to avoid confusion in callers

use std::collections::BTreeMap;
use std::io::Write;

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
	#[error("IO error: {0}")]
	IO(#[from] std::io::Error),
	#[error("JSON error: {0}")]
	SerdeJSON(#[from] serde_json::Error),
}

/// Builds an owned requirements map from borrowed entries.
pub fn requires_map(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
	entries
		.iter()
		.map(|(name, relations)| {
			(
				(*name).to_string(),
				relations.iter().map(|r| (*r).to_string()).collect(),
			)
		})
		.collect()
}

/// X and Z both require Y, W stands alone.
pub fn forked_requires_map() -> BTreeMap<String, Vec<String>> {
	requires_map(&[("W", &[]), ("X", &["Y"]), ("Y", &[]), ("Z", &["Y"])])
}

/// The bare three package cycle.
pub fn three_cycle_requires_map() -> BTreeMap<String, Vec<String>> {
	requires_map(&[("A", &["B"]), ("B", &["C"]), ("C", &["A"])])
}

/// A three package cycle with a dependant outside it and a requirement
/// leading out of it.
pub fn cycle_with_neighbors_requires_map() -> BTreeMap<String, Vec<String>> {
	requires_map(&[
		("A", &["B"]),
		("B", &["C"]),
		("C", &["A", "F"]),
		("D", &["A"]),
		("F", &[]),
	])
}

/// Shaped like a minimal installed system, including the systemd and dbus
/// loop real databases have.
pub fn base_system_requires_map() -> BTreeMap<String, Vec<String>> {
	requires_map(&[
		("basesystem", &["filesystem", "setup"]),
		("bash", &["glibc"]),
		("coreutils", &["glibc", "openssl-libs"]),
		("dbus", &["glibc", "systemd"]),
		("filesystem", &[]),
		("glibc", &[]),
		("openssl-libs", &["glibc"]),
		("popt", &["glibc"]),
		("rpm", &["bash", "glibc", "popt", "zlib"]),
		("setup", &[]),
		("systemd", &["dbus", "glibc", "zlib"]),
		("zlib", &["glibc"]),
	])
}

/// An [`RpmDb`](rpmdeps::RpmDb) over [`base_system_requires_map`].
pub fn base_system_rpmdb() -> rpmdeps::RpmDb {
	rpmdeps::RpmDb::from_requires_map(base_system_requires_map())
}

/// NEVRA record with noarch defaults.
pub fn meta(name: &str, version: &str) -> rpmdeps::rpmdb::PackageMeta {
	rpmdeps::rpmdb::PackageMeta {
		name: name.to_string(),
		epoch: None,
		version: version.to_string(),
		release: "1".to_string(),
		arch: "noarch".to_string(),
		extras: BTreeMap::new(),
	}
}

/// Writes `map` as a bare dependency dump under `dir`.
///
/// # Parameters
/// - `dir` - directory standing in for an RPM database root.
pub fn write_dump(
	dir: impl AsRef<std::path::Path>,
	map: &BTreeMap<String, Vec<String>>,
) -> Result<std::path::PathBuf, FixtureError> {
	let path = dir.as_ref().join(rpmdeps::rpmdb::DUMP_FILE_NAME);
	let mut f = std::fs::File::create(&path)?;
	f.write_all(serde_json::to_string_pretty(map)?.as_bytes())?;
	Ok(path)
}

/// Writes a wrapper dump carrying package records next to the map.
pub fn write_full_dump(
	dir: impl AsRef<std::path::Path>,
	map: &BTreeMap<String, Vec<String>>,
	packages: &[rpmdeps::rpmdb::PackageMeta],
) -> Result<std::path::PathBuf, FixtureError> {
	let path = dir.as_ref().join(rpmdeps::rpmdb::DUMP_FILE_NAME);
	let dump = serde_json::json!({ "requires": map, "packages": packages });
	let mut f = std::fs::File::create(&path)?;
	f.write_all(serde_json::to_string_pretty(&dump)?.as_bytes())?;
	Ok(path)
}

/// Fresh temporary directory standing in for an RPM database root.
pub fn temp_root() -> Result<tempfile::TempDir, FixtureError> {
	Ok(tempfile::tempdir()?)
}
