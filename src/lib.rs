// ABOUTME: Library module for mysql-superdump
// ABOUTME: Exports the dump engine, MySQL source and config for the binary and tests

pub mod commands;
pub mod config;
pub mod dump;
pub mod error;
pub mod mysql;
pub mod output;
pub mod source;
pub mod table_rules;
pub mod utils;

pub use config::DumpConfig;
pub use dump::{DumpSummary, Dumper};
pub use error::{DumpError, SourceError};
