//! CLI support for the `jasper-export` binary
//!
//! - Argument parsing structures
//! - Report parameter parsing

pub mod args;
pub mod params;

pub use args::{get_log_level, Cli, Commands, DbArgs};
pub use params::{load_param_file, merge_params, parse_cli_params};
