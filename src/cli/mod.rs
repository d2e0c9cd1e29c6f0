//! CLI surface: argument parsing and command implementations
//!
//! The binary is the hosting-environment adapter: it loads the static
//! manifest and drives the manager's install/activate lifecycle; the manager
//! itself has no user-facing commands.

pub mod args;
pub mod commands;

pub use args::{Cli, Commands};
