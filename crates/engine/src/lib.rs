//! Commit-trigger engine
//!
//! This crate provides:
//! - Per-repository configuration and validation
//! - The batch/idle coalescer state machine
//! - The per-repository scheduler (single decision loop)
//! - The orchestrator running one isolated worker per repository
//! - The watch source and commit backend interfaces

pub mod backend;
pub mod coalescer;
pub mod config;
pub mod orchestrator;
pub mod scheduler;
pub mod source;

// Re-exports
pub use backend::{CommitBackend, CommitError};
pub use coalescer::{Coalescer, FlushCause, RunState};
pub use config::{Config, ConfigError, RepoConfig};
pub use orchestrator::{Orchestrator, WorkerError, WorkerOutcome};
pub use scheduler::{RepoScheduler, SchedulerExit, SchedulerInput, SchedulerReport};
pub use source::{WatchError, WatchSource, WatchStream};
