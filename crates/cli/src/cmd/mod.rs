//! CLI command implementations

pub mod add_repo;
pub mod check;
pub mod config;
pub mod run;
