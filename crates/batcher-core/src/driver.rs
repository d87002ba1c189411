//! Campaign driver.
//!
//! Loads the wallet pairs and walks each one through claim, transfer, burn
//! and attack, one single-task batch per stage. Wallet problems abort the
//! run before anything touches the network; per-stage failures are logged
//! and tallied, and the pair moves on to its next stage.

use crate::executor::Executor;
use crate::stages::Stage;
use crate::submitter::{RetryPolicy, Submitter};
use crate::DriverError;
use batcher_account::{load_wallet_pairs, WalletPair};
use batcher_config::{CampaignConfig, Config, WalletsConfig};
use batcher_delivery::RpcGateway;
use batcher_types::{truncate_id, Confirmation, Receipt, TaskResult};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::instrument;

/// How a single stage ended for one wallet pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
	/// Mined with a success status.
	Succeeded,
	/// Mined but reverted.
	Reverted,
	/// Never submitted, or no receipt could be obtained.
	Failed,
}

/// Per-stage counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageTally {
	pub succeeded: usize,
	pub reverted: usize,
	pub failed: usize,
}

/// Aggregate result of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
	pub wallets: usize,
	pub stages: BTreeMap<Stage, StageTally>,
}

impl RunSummary {
	pub fn record(&mut self, stage: Stage, outcome: StageOutcome) {
		let tally = self.stages.entry(stage).or_default();
		match outcome {
			StageOutcome::Succeeded => tally.succeeded += 1,
			StageOutcome::Reverted => tally.reverted += 1,
			StageOutcome::Failed => tally.failed += 1,
		}
	}

	pub fn tally(&self, stage: Stage) -> StageTally {
		self.stages.get(&stage).copied().unwrap_or_default()
	}

	fn log(&self) {
		for (stage, tally) in &self.stages {
			tracing::info!(
				stage = %stage,
				succeeded = tally.succeeded,
				reverted = tally.reverted,
				failed = tally.failed,
				"Stage summary"
			);
		}
		tracing::info!(wallets = self.wallets, "Run complete");
	}
}

/// Runs the campaign for every wallet pair.
pub struct Driver {
	executor: Executor,
	gateway: Arc<dyn RpcGateway>,
	wallets: WalletsConfig,
	campaign: CampaignConfig,
}

impl Driver {
	pub fn new(config: &Config, gateway: Arc<dyn RpcGateway>) -> Result<Self, DriverError> {
		let submitter = Arc::new(Submitter::new(
			gateway.clone(),
			config.network.chain_id,
			RetryPolicy::from(&config.executor),
		));
		let executor = Executor::new(submitter, gateway.clone(), config.executor.max_workers)?;

		Ok(Self {
			executor,
			gateway,
			wallets: config.wallets.clone(),
			campaign: config.campaign.clone(),
		})
	}

	/// Loads wallets, then runs every stage for every pair in order.
	pub async fn run(&self) -> Result<RunSummary, DriverError> {
		let pairs = load_wallet_pairs(&self.wallets.source, &self.wallets.destination).await?;

		let mut summary = RunSummary {
			wallets: pairs.len(),
			..Default::default()
		};

		for (index, pair) in pairs.iter().enumerate() {
			tracing::info!(
				wallet = index + 1,
				total = pairs.len(),
				account = %pair.account.address(),
				destination = %pair.recipient,
				"Starting wallet"
			);
			for stage in Stage::ALL {
				let outcome = self.run_stage(stage, pair).await;
				summary.record(stage, outcome);
			}
		}

		summary.log();
		Ok(summary)
	}

	#[instrument(skip_all, fields(stage = %stage, account = %truncate_id(&pair.account.address().to_string())))]
	async fn run_stage(&self, stage: Stage, pair: &WalletPair) -> StageOutcome {
		let account = pair.account.address();
		let task = stage.task(&self.campaign, account, pair.recipient);

		let mut results = self
			.executor
			.execute_batch(vec![(task, pair.account.clone())])
			.await;
		let Some(result) = results.pop() else {
			tracing::error!(
				account = %account,
				destination = %pair.recipient,
				"Stage produced no result"
			);
			return StageOutcome::Failed;
		};

		let receipt = match &result.confirmation {
			Confirmation::Confirmed(receipt) => Some(receipt.clone()),
			Confirmation::Skipped => None,
			Confirmation::NoHash(_) | Confirmation::Failed(_) => self.await_receipt(&result).await,
		};

		match receipt {
			Some(receipt) if receipt.success => {
				tracing::info!(
					account = %account,
					destination = %pair.recipient,
					tx_hash = %truncate_id(&receipt.tx_hash.to_string()),
					"Stage succeeded"
				);
				StageOutcome::Succeeded
			}
			Some(receipt) => {
				tracing::warn!(
					account = %account,
					destination = %pair.recipient,
					tx_hash = %truncate_id(&receipt.tx_hash.to_string()),
					"Stage reverted"
				);
				StageOutcome::Reverted
			}
			None => {
				tracing::warn!(
					account = %account,
					destination = %pair.recipient,
					attempts = result.outcome.attempts(),
					"Stage not confirmed"
				);
				StageOutcome::Failed
			}
		}
	}

	/// One more receipt wait for a submitted task the executor could not confirm.
	async fn await_receipt(&self, result: &TaskResult) -> Option<Receipt> {
		let tx_hash = result.tx_hash()?;
		match self.gateway.wait_for_receipt(tx_hash).await {
			Ok(receipt) => Some(receipt),
			Err(e) => {
				tracing::warn!(
					account = %result.account,
					destination = %result.destination,
					tx_hash = %truncate_id(&tx_hash.to_string()),
					error = %e,
					"Receipt still unavailable"
				);
				None
			}
		}
	}
}
