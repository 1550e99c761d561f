//! Subcommand implementations.

mod snapshot;

pub use snapshot::command_snapshot;
