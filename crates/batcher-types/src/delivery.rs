//! Submission and confirmation types.
//!
//! A task moves through `pending → attempts → {submitted | exhausted}` and,
//! once submitted, through `confirmation_attempted → {confirmed | failed}`.
//! These types carry the end state of each leg back to the caller.

use crate::rpc::JsonRpcResponse;
use crate::task::TaskId;
use alloy_primitives::{Address, B256};

/// Ledger-confirmed outcome of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
	/// The hash of the transaction.
	pub tx_hash: B256,
	/// The block number where the transaction was included.
	pub block_number: u64,
	/// Whether the transaction executed successfully.
	pub success: bool,
}

/// Result of running a task through the retrying submitter.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
	/// The node accepted the transaction on attempt `attempts`.
	Submitted {
		response: JsonRpcResponse,
		attempts: u32,
	},
	/// Every attempt failed.
	Exhausted { attempts: u32, last_error: String },
}

impl SubmissionOutcome {
	/// Number of attempts made, including the successful one.
	pub fn attempts(&self) -> u32 {
		match self {
			SubmissionOutcome::Submitted { attempts, .. } => *attempts,
			SubmissionOutcome::Exhausted { attempts, .. } => *attempts,
		}
	}

	pub fn is_submitted(&self) -> bool {
		matches!(self, SubmissionOutcome::Submitted { .. })
	}

	pub fn response(&self) -> Option<&JsonRpcResponse> {
		match self {
			SubmissionOutcome::Submitted { response, .. } => Some(response),
			SubmissionOutcome::Exhausted { .. } => None,
		}
	}
}

/// Confirmation state of a task after its submission leg finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
	/// A receipt was retrieved.
	Confirmed(Receipt),
	/// The receipt could not be retrieved.
	Failed(String),
	/// The submission response did not carry a usable hash.
	NoHash(String),
	/// Submission was exhausted, nothing to confirm.
	Skipped,
}

impl Confirmation {
	pub fn receipt(&self) -> Option<&Receipt> {
		match self {
			Confirmation::Confirmed(receipt) => Some(receipt),
			_ => None,
		}
	}
}

/// Everything the executor knows about one task once it is done.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskResult {
	pub id: TaskId,
	pub label: String,
	pub account: Address,
	pub destination: Address,
	pub outcome: SubmissionOutcome,
	pub confirmation: Confirmation,
}

impl TaskResult {
	/// Hash of the submitted transaction, if the submission produced one.
	pub fn tx_hash(&self) -> Option<B256> {
		self.outcome.response().and_then(|r| r.tx_hash().ok())
	}
}
