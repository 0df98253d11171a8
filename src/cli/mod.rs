//! Line-oriented shell driving the asset controllers.

pub mod commands;
pub mod core;
pub mod fields;
pub mod io;
pub mod output;
mod shell;

pub use self::core::{CliError, CliMode, CommandError, ShellContext};
pub use shell::run_cli;
