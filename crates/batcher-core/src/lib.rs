//! Submission pipeline for the transaction batcher.
//!
//! The retrying submitter turns one task into a submitted transaction, the
//! executor runs batches of tasks through a bounded worker pool and confirms
//! what was submitted, and the driver walks every wallet pair through the
//! campaign stages.

use batcher_account::AccountError;
use thiserror::Error;

pub mod driver;
pub mod executor;
pub mod stages;
pub mod submitter;

#[cfg(test)]
pub(crate) mod test_support;

pub use driver::{Driver, RunSummary, StageOutcome, StageTally};
pub use executor::Executor;
pub use stages::Stage;
pub use submitter::{RetryPolicy, Submitter};

/// Errors that can occur while running a batch.
#[derive(Debug, Error)]
pub enum ExecutorError {
	/// The pool or retry policy is unusable.
	#[error("Configuration error: {0}")]
	Config(String),
}

/// Errors that abort a run before any task is submitted.
#[derive(Debug, Error)]
pub enum DriverError {
	/// Wallet files are missing, malformed or disagree with each other.
	#[error("Wallet error: {0}")]
	Wallet(#[from] AccountError),
	/// The executor could not be built.
	#[error("Executor error: {0}")]
	Executor(#[from] ExecutorError),
}
