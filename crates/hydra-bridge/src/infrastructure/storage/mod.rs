//! Storage infrastructure: the bridge's TOML configuration file.
//!
//! The `config` sub-module reads the file from the platform config
//! directory, falls back to defaults on first run, and writes operator
//! changes (peer nicknames) back to disk.

pub mod config;
