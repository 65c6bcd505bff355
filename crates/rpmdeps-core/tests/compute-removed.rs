use rpmdeps::Direction;
use rpmdeps::RpmDb;
use rpmdeps::removal::ExcludeSet;
use rpmdeps::removal::compute_removed;
use rpmdeps::removal::list_leaves;
use rpmdeps::removal::list_standalones;

#[test]
fn removal_follows_requirements_transitively() {
	let db = rpmdeps_test_utils::base_system_rpmdb();
	let removed = compute_removed(&db, ["rpm"], &ExcludeSet::new(), Direction::Requires);

	assert_eq!(removed, vec!["bash", "glibc", "popt", "rpm", "zlib"]);
}

#[test]
fn reversed_removal_follows_dependants() {
	let db = rpmdeps_test_utils::base_system_rpmdb();
	let removed = compute_removed(&db, ["glibc"], &ExcludeSet::new(), Direction::RequiredBy);

	/* Everything but the three packages living without glibc. */
	assert_eq!(
		removed,
		vec![
			"bash",
			"coreutils",
			"dbus",
			"glibc",
			"openssl-libs",
			"popt",
			"rpm",
			"systemd",
			"zlib",
		]
	);
}

#[test]
fn excluded_dependency_is_not_removed() {
	let db = RpmDb::from_requires_map(rpmdeps_test_utils::requires_map(&[("A", &["B"]), ("B", &[])]));
	let removed = compute_removed(&db, ["A"], &ExcludeSet::from_names(["B"]), Direction::Requires);

	assert_eq!(removed, vec!["A"]);
}

#[test]
fn excluded_requested_package_is_dropped_entirely() {
	let db = rpmdeps_test_utils::base_system_rpmdb();
	let removed = compute_removed(&db, ["rpm"], &ExcludeSet::from_names(["rpm"]), Direction::Requires);

	assert!(removed.is_empty(), "nothing should be removed, got {:?}", removed);
}

#[test]
fn exclusion_cuts_the_closure_not_just_the_output() {
	/* Excluding b must also keep its own requirement c out of reach. */
	let db = RpmDb::from_requires_map(rpmdeps_test_utils::requires_map(&[
		("a", &["b"]),
		("b", &["c"]),
		("c", &[]),
	]));
	let removed = compute_removed(&db, ["a"], &ExcludeSet::from_names(["b"]), Direction::Requires);

	assert_eq!(removed, vec!["a"]);
}

#[test]
fn glob_excludes_match_whole_names() {
	let db = rpmdeps_test_utils::base_system_rpmdb();
	let removed = compute_removed(&db, ["coreutils"], &ExcludeSet::from_names(["open*"]), Direction::Requires);

	assert_eq!(removed, vec!["coreutils", "glibc"]);

	/* The pattern is anchored, an inner match is not enough. */
	let excludes = ExcludeSet::from_names(["penssl*"]);
	let removed = compute_removed(&db, ["coreutils"], &excludes, Direction::Requires);
	assert!(removed.contains(&"openssl-libs".to_string()));
}

#[test]
fn removal_is_idempotent() {
	let db = rpmdeps_test_utils::base_system_rpmdb();
	let excludes = ExcludeSet::from_names(["glibc"]);

	let removed = compute_removed(&db, ["systemd"], &excludes, Direction::Requires);
	let again = compute_removed(&db, &removed, &excludes, Direction::Requires);
	assert_eq!(removed, again);
}

#[test]
fn unknown_requested_package_expands_to_nothing() {
	let db = rpmdeps_test_utils::base_system_rpmdb();
	let removed = compute_removed(&db, ["ghost"], &ExcludeSet::new(), Direction::Requires);

	assert_eq!(removed, vec!["ghost"]);
}

#[test]
fn standalones_respect_the_relation_limit() {
	let db = RpmDb::from_requires_map(rpmdeps_test_utils::forked_requires_map());

	assert_eq!(list_standalones(&db, 0, &ExcludeSet::new()), vec!["W"]);
	assert_eq!(list_standalones(&db, 1, &ExcludeSet::new()), vec!["W", "X", "Z"]);
	assert_eq!(list_standalones(&db, 2, &ExcludeSet::new()), vec!["W", "X", "Y", "Z"]);
}

#[test]
fn standalones_at_limit_zero_match_graph_standalone_nodes() {
	let db = RpmDb::from_requires_map(rpmdeps_test_utils::forked_requires_map());
	let g = rpmdeps::DepGraph::from_requires_map(db.requires_map(Direction::Requires));

	let from_graph: Vec<&str> = g.list_standalone_nodes().into_iter().map(|n| g.node_name(n)).collect();
	let from_db = list_standalones(&db, 0, &ExcludeSet::new());
	assert_eq!(from_db, from_graph);
}

#[test]
fn standalone_exclusion_filters_candidates_only() {
	let db = RpmDb::from_requires_map(rpmdeps_test_utils::forked_requires_map());
	let standalones = list_standalones(&db, 1, &ExcludeSet::from_names(["X"]));

	/* Y still counts its relation to the excluded X, so it stays over the limit. */
	assert_eq!(standalones, vec!["W", "Z"]);
}

#[test]
fn leaves_are_the_packages_nothing_requires() {
	let db = rpmdeps_test_utils::base_system_rpmdb();
	assert_eq!(list_leaves(&db), vec!["basesystem", "coreutils", "rpm"]);

	let forked = RpmDb::from_requires_map(rpmdeps_test_utils::forked_requires_map());
	assert_eq!(list_leaves(&forked), vec!["W", "X", "Z"]);
}
