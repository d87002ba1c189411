//! Bounded task executor.
//!
//! Runs a batch of tasks with at most `max_workers` submissions in flight.
//! Once a worker has its outcome it releases the permit and, if the node
//! returned a well-formed hash, waits for the receipt exactly once.

use crate::submitter::Submitter;
use crate::ExecutorError;
use alloy_primitives::Address;
use batcher_account::AccountInterface;
use batcher_delivery::RpcGateway;
use batcher_types::{truncate_id, Confirmation, SubmissionOutcome, Task, TaskId, TaskResult};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::Instrument;

/// Worker pool in front of a [`Submitter`].
pub struct Executor {
	submitter: Arc<Submitter>,
	gateway: Arc<dyn RpcGateway>,
	max_workers: usize,
}

impl Executor {
	pub fn new(
		submitter: Arc<Submitter>,
		gateway: Arc<dyn RpcGateway>,
		max_workers: usize,
	) -> Result<Self, ExecutorError> {
		if max_workers == 0 {
			return Err(ExecutorError::Config(
				"max_workers must be at least 1".into(),
			));
		}
		Ok(Self {
			submitter,
			gateway,
			max_workers,
		})
	}

	/// Submits and confirms every task, returning results in completion order.
	///
	/// Per-task failures end up in the returned [`TaskResult`]s. A worker that
	/// panics is logged and contributes no result.
	pub async fn execute_batch(
		&self,
		tasks: Vec<(Task, Arc<dyn AccountInterface>)>,
	) -> Vec<TaskResult> {
		let semaphore = Arc::new(Semaphore::new(self.max_workers));
		let mut workers = JoinSet::new();
		let total = tasks.len();

		for (index, (task, account)) in tasks.into_iter().enumerate() {
			let id = TaskId(index);
			let semaphore = semaphore.clone();
			let submitter = self.submitter.clone();
			let gateway = self.gateway.clone();

			let worker = async move {
				let outcome = match semaphore.acquire_owned().await {
					Ok(_permit) => submitter.submit_with_retry(&task, account.as_ref()).await,
					Err(e) => {
						tracing::error!(task_id = %id, "Failed to acquire semaphore permit: {}", e);
						SubmissionOutcome::Exhausted {
							attempts: 0,
							last_error: e.to_string(),
						}
					}
				};

				let account = account.address();
				let confirmation = confirm(gateway.as_ref(), id, account, task.to, &outcome).await;

				TaskResult {
					id,
					label: task.label,
					account,
					destination: task.to,
					outcome,
					confirmation,
				}
			};
			workers.spawn(worker.in_current_span());
		}

		let mut results = Vec::with_capacity(total);
		while let Some(joined) = workers.join_next().await {
			match joined {
				Ok(result) => results.push(result),
				Err(e) if e.is_panic() => tracing::error!("Task worker panicked: {}", e),
				Err(e) => tracing::error!("Task worker failed: {}", e),
			}
		}

		tracing::debug!(
			submitted = results.iter().filter(|r| r.outcome.is_submitted()).count(),
			total,
			"Batch finished"
		);
		results
	}
}

async fn confirm(
	gateway: &dyn RpcGateway,
	id: TaskId,
	account: Address,
	destination: Address,
	outcome: &SubmissionOutcome,
) -> Confirmation {
	let response = match outcome {
		SubmissionOutcome::Submitted { response, .. } => response,
		SubmissionOutcome::Exhausted {
			attempts,
			last_error,
		} => {
			tracing::warn!(
				task_id = %id,
				account = %account,
				destination = %destination,
				attempts,
				error = %last_error,
				"Task exhausted, skipping confirmation"
			);
			return Confirmation::Skipped;
		}
	};

	let tx_hash = match response.tx_hash() {
		Ok(hash) => hash,
		Err(reason) => {
			tracing::warn!(
				task_id = %id,
				account = %account,
				destination = %destination,
				reason = %reason,
				"No transaction hash to confirm"
			);
			return Confirmation::NoHash(reason);
		}
	};

	match gateway.wait_for_receipt(tx_hash).await {
		Ok(receipt) => {
			tracing::info!(
				task_id = %id,
				account = %account,
				destination = %destination,
				tx_hash = %truncate_id(&tx_hash.to_string()),
				block_number = receipt.block_number,
				success = receipt.success,
				"Transaction confirmed"
			);
			Confirmation::Confirmed(receipt)
		}
		Err(e) => {
			tracing::warn!(
				task_id = %id,
				account = %account,
				destination = %destination,
				tx_hash = %truncate_id(&tx_hash.to_string()),
				error = %e,
				"Failed to retrieve receipt"
			);
			Confirmation::Failed(e.to_string())
		}
	}
}
