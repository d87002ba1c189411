//! Retrying submitter.
//!
//! One attempt is lease nonce → build → sign → send. Any failure in that
//! chain, including a node answer that carries an `error` member or no
//! `result`, counts as a failed attempt. Attempts are separated by an
//! exponential backoff with jitter and capped at `max_attempts`; running out
//! produces an [`SubmissionOutcome::Exhausted`] rather than an error.

use backoff::backoff::Backoff;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use batcher_account::AccountInterface;
use batcher_config::ExecutorConfig;
use batcher_delivery::{DeliveryError, NonceManager, RpcGateway, TransactionBuilder};
use batcher_types::{truncate_id, JsonRpcResponse, SubmissionOutcome, Task};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// How many times to try a task and how long to wait in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
	pub max_attempts: u32,
	pub initial_backoff: Duration,
	pub max_backoff: Duration,
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self::from(&ExecutorConfig::default())
	}
}

impl From<&ExecutorConfig> for RetryPolicy {
	fn from(config: &ExecutorConfig) -> Self {
		Self {
			max_attempts: config.max_attempts,
			initial_backoff: config.initial_backoff(),
			max_backoff: config.max_backoff(),
		}
	}
}

impl RetryPolicy {
	/// Fresh backoff schedule for one task.
	fn schedule(&self) -> ExponentialBackoff {
		ExponentialBackoffBuilder::new()
			.with_initial_interval(self.initial_backoff)
			.with_multiplier(2.0)
			.with_randomization_factor(0.5)
			.with_max_interval(self.max_backoff)
			.with_max_elapsed_time(None)
			.build()
	}
}

/// Submits tasks with bounded retries.
pub struct Submitter {
	builder: TransactionBuilder,
	gateway: Arc<dyn RpcGateway>,
	nonces: Arc<NonceManager>,
	policy: RetryPolicy,
}

impl Submitter {
	pub fn new(gateway: Arc<dyn RpcGateway>, chain_id: u64, policy: RetryPolicy) -> Self {
		Self {
			builder: TransactionBuilder::new(gateway.clone(), chain_id),
			gateway,
			nonces: Arc::new(NonceManager::new()),
			policy,
		}
	}

	/// Runs `task` for `account` until it is accepted or attempts run out.
	#[instrument(skip_all, fields(task = %task.label, account = %truncate_id(&account.address().to_string())))]
	pub async fn submit_with_retry(
		&self,
		task: &Task,
		account: &dyn AccountInterface,
	) -> SubmissionOutcome {
		let mut schedule = self.policy.schedule();
		let mut last_error = String::from("no attempt made");

		for attempt in 1..=self.policy.max_attempts {
			match self.attempt(task, account).await {
				Ok(response) => {
					tracing::info!(
						account = %account.address(),
						destination = %task.to,
						attempt,
						tx_hash = %truncate_id(response.result_str().unwrap_or_default()),
						"Transaction submitted"
					);
					return SubmissionOutcome::Submitted {
						response,
						attempts: attempt,
					};
				}
				Err(e) => {
					tracing::warn!(
						account = %account.address(),
						destination = %task.to,
						attempt,
						max_attempts = self.policy.max_attempts,
						error = %e,
						"Submission attempt failed"
					);
					last_error = e.to_string();
				}
			}

			if attempt < self.policy.max_attempts {
				let delay = schedule
					.next_backoff()
					.unwrap_or(self.policy.max_backoff)
					.min(self.policy.max_backoff);
				tokio::time::sleep(delay).await;
			}
		}

		tracing::error!(
			account = %account.address(),
			destination = %task.to,
			attempts = self.policy.max_attempts,
			error = %last_error,
			"Submission exhausted"
		);
		SubmissionOutcome::Exhausted {
			attempts: self.policy.max_attempts,
			last_error,
		}
	}

	/// A single build → sign → send pass under the account's nonce lease.
	async fn attempt(
		&self,
		task: &Task,
		account: &dyn AccountInterface,
	) -> Result<JsonRpcResponse, DeliveryError> {
		let mut lease = self.nonces.lease(account.address()).await;

		let overrides = task.overrides();
		let pinned_nonce = overrides.nonce.is_some();
		let mut record = self
			.builder
			.build_record(account, task.to, &task.value, &task.gas_limit, overrides)
			.await?;
		if !pinned_nonce {
			record.nonce = lease.assign(record.nonce);
		}

		let raw = self.builder.sign(account, &record).await?;
		let response = self.gateway.send_raw_transaction(&raw).await?;

		if let Some(error) = &response.error {
			return Err(error.clone().into());
		}
		if response.result.is_none() {
			return Err(DeliveryError::Parse(
				"eth_sendRawTransaction returned no result".into(),
			));
		}

		lease.commit(record.nonce);
		Ok(response)
	}
}
