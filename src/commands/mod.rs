// ABOUTME: Command implementations behind the CLI
// ABOUTME: Exports the dump command and its options

pub mod dump;

pub use dump::{dump, DumpOptions};
