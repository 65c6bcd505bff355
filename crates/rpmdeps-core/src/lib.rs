pub mod error;
pub use error::Result;
pub use error::Error;

pub mod config;
pub use config::Config;

pub mod rpmdb;
pub use rpmdb::RpmDb;
pub use rpmdb::Direction;

pub mod depgraph;
pub use depgraph::DepGraph;

pub mod removal;
