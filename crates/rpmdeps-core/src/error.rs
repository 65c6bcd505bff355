//! Library error type.

pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
	#[error("IO error: {0}")]
	IO(#[from] std::io::Error),
	#[error("JSON error: {0}")]
	SerdeJSON(#[from] serde_json::Error),
	#[error("no dependency dump found at {}", .0.display())]
	DumpNotFound(std::path::PathBuf),
	#[error("unknown package: {0}")]
	UnknownPackage(String),
}
