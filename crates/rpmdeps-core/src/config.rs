//! Tool configuration.

/// Options controlling the default behavior of the analysis commands.
///
/// Stored as JSON in the user's configuration directory. A missing file is
/// not an error, callers fall back to [`Config::default`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Config {
	/// RPM database root used when a command is not given one explicitly.
	root: std::path::PathBuf,
	/// Packages kept out of every removal computation, like yum's protected packages.
	protected: Vec<String>,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			root: std::path::PathBuf::from("/"),
			protected: Vec::new(),
		}
	}
}

impl Config {
	pub fn root(&self) -> &std::path::Path {
		&self.root
	}
	pub fn set_root(&mut self, root: std::path::PathBuf) {
		self.root = root;
	}

	pub fn protected(&self) -> &[String] {
		&self.protected
	}
	pub fn add_protected(&mut self, name: impl Into<String>) {
		self.protected.push(name.into());
	}

	fn config_file_path() -> std::path::PathBuf {
		#[cfg(target_os = "windows")]
		let path = std::path::PathBuf::from(std::env::var("APPDATA").expect("APPDATA missing."));

		#[cfg(not(target_os = "windows"))]
		let path = if let Ok(e) = std::env::var("XDG_CONFIG_HOME") {
			std::path::PathBuf::from(e)
		} else {
			std::path::PathBuf::from(std::env::var("HOME").expect("HOME environment variable not set.")).join(".config")
		};

		path.join("rpmdeps").join("config.json")
	}

	/// Reads the configuration from the user's configuration directory.
	///
	/// # Errors
	/// - [`crate::Error::IO`] when the file is missing or unreadable.
	/// - [`crate::Error::SerdeJSON`] when it does not parse.
	pub fn load_from_disk() -> crate::Result<Config> {
		let path = Self::config_file_path();
		let data = std::fs::read_to_string(&path)?;
		let config = serde_json::from_str(&data)?;
		log::debug!("Loaded configuration from {}", path.display());
		Ok(config)
	}

	/// Writes the configuration to the user's configuration directory.
	pub fn save_to_disk(&self) -> crate::Result<()> {
		let path = Self::config_file_path();
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
		log::debug!("Saved configuration to {}", path.display());
		Ok(())
	}
}
