//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module reads the TOML config of the `keyhook` binary from
//! the platform config directory (or an explicit path), fills in defaults
//! when the file does not exist yet, and writes it back on request.

pub mod config;
