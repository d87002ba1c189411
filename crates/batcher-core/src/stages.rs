//! Campaign stages and their call data.
//!
//! Every wallet pair walks claim → transfer → burn → attack against the
//! same contract.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};
use batcher_config::CampaignConfig;
use batcher_types::Task;
use std::fmt;

sol! {
	/// ERC-1155 single-token transfer.
	function safeTransferFrom(address from, address to, uint256 id, uint256 amount, bytes data);
	/// ERC-1155 burnable extension.
	function burn(address account, uint256 id, uint256 value);
}

/// `claim()` selector.
const CLAIM_SELECTOR: [u8; 4] = [0xbe, 0x89, 0x5e, 0xce];
/// Selector of the two-address `attack` entry point.
const ATTACK_SELECTOR: [u8; 4] = [0xd0, 0x18, 0xdb, 0x3e];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
	Claim,
	Transfer,
	Burn,
	Attack,
}

impl Stage {
	/// Stages in the order each wallet pair runs them.
	pub const ALL: [Stage; 4] = [Stage::Claim, Stage::Transfer, Stage::Burn, Stage::Attack];

	pub fn name(&self) -> &'static str {
		match self {
			Stage::Claim => "claim",
			Stage::Transfer => "transfer",
			Stage::Burn => "burn",
			Stage::Attack => "attack",
		}
	}

	/// ABI-encoded call data for `owner` with `recipient` as counterparty.
	pub fn call_data(&self, campaign: &CampaignConfig, owner: Address, recipient: Address) -> Bytes {
		match self {
			Stage::Claim => Bytes::from_static(&CLAIM_SELECTOR),
			Stage::Transfer => safeTransferFromCall {
				from: owner,
				to: recipient,
				id: U256::from(campaign.transfer_token_id),
				amount: U256::from(1),
				data: Bytes::from_static(&[0x00]),
			}
			.abi_encode()
			.into(),
			Stage::Burn => burnCall {
				account: owner,
				id: U256::from(campaign.burn_token_id),
				value: U256::from(1),
			}
			.abi_encode()
			.into(),
			Stage::Attack => {
				let mut data = Vec::with_capacity(4 + 64);
				data.extend_from_slice(&ATTACK_SELECTOR);
				data.extend_from_slice(owner.into_word().as_slice());
				data.extend_from_slice(recipient.into_word().as_slice());
				data.into()
			}
		}
	}

	/// Builds the task this stage submits for one wallet pair.
	pub fn task(&self, campaign: &CampaignConfig, owner: Address, recipient: Address) -> Task {
		Task::new(
			self.name(),
			campaign.contract,
			campaign.value,
			campaign.gas_limit,
			self.call_data(campaign, owner, recipient),
		)
	}
}

impl fmt::Display for Stage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}
