//! Subcommand implementations.

pub mod completion;
pub mod default_dir;
pub mod extract;
