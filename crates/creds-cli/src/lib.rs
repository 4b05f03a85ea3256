//! # creds-cli
//!
//! Command-line front end for the creds credential store.

mod cli;
mod commands;

pub use cli::{Cli, Command};
pub use commands::run;
