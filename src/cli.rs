//! Command-line boundary: argument schema, per-action validation, and the
//! `--env_vars` environment bootstrap.

pub mod args;
pub mod env_vars;

pub use args::{validate_for_action, Action, CliArgs};
pub use env_vars::export_env_vars;
