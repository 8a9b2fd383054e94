//! Configuration loading.
//!
//! Unlike the TOML-file configuration common elsewhere in this codebase's
//! lineage, this worker is configured entirely from environment variables
//! (§6), since it runs as one compute-tier process in a larger pipeline
//! rather than as a standalone CLI tool pointed at a project directory.

pub mod schema;

pub use schema::ExecutorConfig;
