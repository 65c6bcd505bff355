const USAGE_BRIEF: &str = "rpmdeps <depgraph|remove|standalones|leaves> [packages..]";

fn main() {
	let mut opts;

	/* Parse console input */
	let parsed_options = {
		let args: Vec<String> = std::env::args().collect();

		opts = getopts::Options::new();
		opts.optflag("h", "help", "Show help");
		opts.optflag("v", "verbose", "Increased verbosity");
		opts.optopt("R", "root", "RPM database root or dependency dump path", "PATH");
		opts.optmulti("x", "excludes", "Exclude a package name or glob, @FILE reads one entry per line", "NAME");
		opts.optopt("o", "output", "Write to FILE instead of stdout", "FILE");
		opts.optopt("f", "format", "Output format: plain, json, dot or graph-json", "FORMAT");
		opts.optflag("", "reversed", "Follow required-by instead of requires relations");
		opts.optopt("n", "limit", "Relation count limit for standalones", "N");
		opts.parsing_style(getopts::ParsingStyle::FloatingFrees);

		let parsed_options = match opts.parse(&args[1..]) {
			Ok(m) => m,
			Err(e) => {
				println!("Unable to parse options: {}", e);
				return;
			}
		};

		if parsed_options.opt_present("h") {
			eprintln!("{}", opts.usage(USAGE_BRIEF));
			return;
		}

		parsed_options
	};

	if parsed_options.opt_present("v") {
		env_logger::Builder::from_default_env()
			.filter_level(log::LevelFilter::Debug)
			.init();
	} else {
		env_logger::init();
	}

	let config = rpmdeps::Config::load_from_disk().unwrap_or_else(|e| {
		log::warn!("Failed to read config file: {}", e);
		log::warn!("Using default config.");
		rpmdeps::Config::default()
	});

	if parsed_options.free.is_empty() {
		eprintln!("{}", opts.usage(USAGE_BRIEF));
		std::process::exit(2);
	}

	let command = parsed_options.free[0].as_str();
	let result = match command {
		"depgraph" => run_depgraph(&config, &parsed_options),
		"remove" | "erase" => run_remove(&config, &parsed_options),
		"standalones" => run_standalones(&config, &parsed_options),
		"leaves" => run_leaves(&config, &parsed_options),
		other => Err(Error::UnknownCommand(other.to_string())),
	};

	if let Err(e) = result {
		log::error!("{} failed: {}", command, e);
		std::process::exit(1);
	}
}

fn run_depgraph(config: &rpmdeps::Config, parsed: &getopts::Matches) -> Result<(), Error> {
	let db = open_db(config, parsed)?;
	let direction = direction_of(parsed);

	let output = match format_of(parsed, "json").as_str() {
		"json" => {
			let trees = rpmdeps::depgraph::make_dependency_trees(&db, direction);
			log::info!("Materialized {} dependency trees", trees.len());
			serde_json::to_string_pretty(&trees)?
		}
		"dot" => condensed_graph(&db, direction).to_dot(),
		"graph-json" => serde_json::to_string_pretty(&condensed_graph(&db, direction).to_graph_dump())?,
		other => return Err(Error::UnknownFormat(other.to_string())),
	};
	write_output(parsed, &output)
}

fn run_remove(config: &rpmdeps::Config, parsed: &getopts::Matches) -> Result<(), Error> {
	let packages = &parsed.free[1..];
	if packages.is_empty() {
		return Err(Error::MissingArgument("at least one package to remove"));
	}

	let db = open_db(config, parsed)?;
	let excludes = build_excludes(config, parsed)?;
	let removed = rpmdeps::removal::compute_removed(&db, packages, &excludes, direction_of(parsed));
	log::info!("{} packages to remove for {} requested", removed.len(), packages.len());

	let output = match format_of(parsed, "plain").as_str() {
		/* Show full NEVRAs where the dump carried package records. */
		"plain" => removed
			.iter()
			.map(|name| match db.package_meta(name) {
				Some(meta) => meta.to_string(),
				None => name.clone(),
			})
			.collect::<Vec<_>>()
			.join("\n"),
		"json" => serde_json::to_string_pretty(&serde_json::json!({
			"requested": packages,
			"removed": removed,
		}))?,
		other => return Err(Error::UnknownFormat(other.to_string())),
	};
	write_output(parsed, &output)
}

fn run_standalones(config: &rpmdeps::Config, parsed: &getopts::Matches) -> Result<(), Error> {
	let limit = match parsed.opt_str("n") {
		Some(n) => n
			.parse::<usize>()
			.map_err(|_| Error::InvalidArgument(format!("limit must be a number, got {}", n)))?,
		None => 0,
	};

	let db = open_db(config, parsed)?;
	let excludes = build_excludes(config, parsed)?;
	let standalones = rpmdeps::removal::list_standalones(&db, limit, &excludes);

	let output = match format_of(parsed, "plain").as_str() {
		"plain" => standalones.join("\n"),
		"json" => serde_json::to_string_pretty(&standalones)?,
		other => return Err(Error::UnknownFormat(other.to_string())),
	};
	write_output(parsed, &output)
}

fn run_leaves(config: &rpmdeps::Config, parsed: &getopts::Matches) -> Result<(), Error> {
	let db = open_db(config, parsed)?;
	let leaves = rpmdeps::removal::list_leaves(&db);

	let output = match format_of(parsed, "plain").as_str() {
		"plain" => leaves.join("\n"),
		"json" => serde_json::to_string_pretty(&leaves)?,
		other => return Err(Error::UnknownFormat(other.to_string())),
	};
	write_output(parsed, &output)
}

fn open_db(config: &rpmdeps::Config, parsed: &getopts::Matches) -> Result<rpmdeps::RpmDb, Error> {
	let root = parsed
		.opt_str("R")
		.map(std::path::PathBuf::from)
		.unwrap_or_else(|| config.root().to_path_buf());
	Ok(rpmdeps::RpmDb::load_from_root(root)?)
}

fn condensed_graph(db: &rpmdeps::RpmDb, direction: rpmdeps::Direction) -> rpmdeps::DepGraph {
	rpmdeps::depgraph::condense(&rpmdeps::DepGraph::from_requires_map(db.requires_map(direction)))
}

fn direction_of(parsed: &getopts::Matches) -> rpmdeps::Direction {
	if parsed.opt_present("reversed") {
		rpmdeps::Direction::RequiredBy
	} else {
		rpmdeps::Direction::Requires
	}
}

fn format_of(parsed: &getopts::Matches, default: &str) -> String {
	parsed.opt_str("f").unwrap_or_else(|| default.to_string())
}

/* Exclude sets merge the configured protected packages with -x entries,
 * @FILE entries are read one per line with # comments. */
fn build_excludes(config: &rpmdeps::Config, parsed: &getopts::Matches) -> Result<rpmdeps::removal::ExcludeSet, Error> {
	let mut excludes = rpmdeps::removal::ExcludeSet::from_names(config.protected());
	for entry in parsed.opt_strs("x") {
		if let Some(path) = entry.strip_prefix('@') {
			for line in std::fs::read_to_string(path)?.lines() {
				let line = line.trim();
				if line.is_empty() || line.starts_with('#') {
					continue;
				}
				excludes.add(line);
			}
		} else {
			excludes.add(&entry);
		}
	}
	Ok(excludes)
}

fn write_output(parsed: &getopts::Matches, data: &str) -> Result<(), Error> {
	match parsed.opt_str("o") {
		Some(path) => {
			std::fs::write(&path, format!("{}\n", data))?;
			log::info!("Wrote {}", path);
		}
		None => println!("{}", data),
	}
	Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("rpmdeps error: {0}")]
	RpmDeps(#[from] rpmdeps::Error),
	#[error("IO error: {0}")]
	IO(#[from] std::io::Error),
	#[error("JSON error: {0}")]
	SerdeJSON(#[from] serde_json::Error),
	#[error("missing argument: {0}")]
	MissingArgument(&'static str),
	#[error("invalid argument: {0}")]
	InvalidArgument(String),
	#[error("unknown command: {0}")]
	UnknownCommand(String),
	#[error("unknown output format: {0}")]
	UnknownFormat(String),
}
