//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module reads the TOML configuration file, falls back to
//! defaults when the file does not exist yet, and can write a config back
//! to disk (used to generate a starter file).

pub mod config;
