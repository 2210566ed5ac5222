//! autocommit command line
//!
//! Library half of the `autocommit` binary, exposed for integration tests.

pub mod cmd;
pub mod locks;
pub mod logging;
pub mod system_config;
