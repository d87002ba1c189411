//! Per-signer nonce coordination.
//!
//! Each account gets its own async mutex. A [`NonceLease`] holds that
//! mutex for the whole build → sign → submit sequence, so two tasks for
//! the same signer never read the same on-chain count concurrently. The
//! lease also remembers the last nonce it saw accepted, which covers the
//! window where a submitted transaction is not yet reflected in the
//! `latest` transaction count.

use alloy_primitives::Address;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Hands out exclusive per-account nonce leases.
#[derive(Default)]
pub struct NonceManager {
	accounts: DashMap<Address, Arc<Mutex<Option<u64>>>>,
}

impl NonceManager {
	pub fn new() -> Self {
		Self::default()
	}

	/// Waits until no other task holds a lease for `address`.
	pub async fn lease(&self, address: Address) -> NonceLease {
		let slot = Arc::clone(self.accounts.entry(address).or_default().value());
		NonceLease {
			last_committed: slot.lock_owned().await,
		}
	}
}

/// Exclusive right to submit for one account until dropped.
pub struct NonceLease {
	last_committed: OwnedMutexGuard<Option<u64>>,
}

impl NonceLease {
	/// Picks the nonce to sign with given the freshly fetched on-chain count.
	pub fn assign(&self, fetched: u64) -> u64 {
		match *self.last_committed {
			Some(last) => fetched.max(last + 1),
			None => fetched,
		}
	}

	/// Records that `nonce` was accepted by the node.
	pub fn commit(&mut self, nonce: u64) {
		let next = match *self.last_committed {
			Some(last) => last.max(nonce),
			None => nonce,
		};
		*self.last_committed = Some(next);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;

	#[tokio::test]
	async fn test_assign_uses_fetched_until_commit() {
		let manager = NonceManager::new();
		let address = Address::repeat_byte(1);

		let mut lease = manager.lease(address).await;
		assert_eq!(lease.assign(3), 3);
		lease.commit(3);
		drop(lease);

		// The node still reports 3 while the first transaction is pending.
		let lease = manager.lease(address).await;
		assert_eq!(lease.assign(3), 4);
		// A higher on-chain count always wins.
		assert_eq!(lease.assign(10), 10);
	}

	#[tokio::test]
	async fn test_uncommitted_lease_does_not_advance() {
		let manager = NonceManager::new();
		let address = Address::repeat_byte(2);

		let lease = manager.lease(address).await;
		assert_eq!(lease.assign(5), 5);
		drop(lease);

		let lease = manager.lease(address).await;
		assert_eq!(lease.assign(5), 5);
	}

	#[tokio::test]
	async fn test_same_account_leases_are_exclusive() {
		let manager = Arc::new(NonceManager::new());
		let address = Address::repeat_byte(3);

		let mut held = manager.lease(address).await;
		let contender = {
			let manager = Arc::clone(&manager);
			tokio::spawn(async move { manager.lease(address).await.assign(0) })
		};

		tokio::time::sleep(Duration::from_millis(20)).await;
		assert!(!contender.is_finished());

		held.commit(4);
		drop(held);
		assert_eq!(contender.await.unwrap(), 5);
	}

	#[tokio::test]
	async fn test_distinct_accounts_do_not_block() {
		let manager = NonceManager::new();
		let _first = manager.lease(Address::repeat_byte(4)).await;
		let second = tokio::time::timeout(
			Duration::from_millis(50),
			manager.lease(Address::repeat_byte(5)),
		)
		.await;
		assert!(second.is_ok());
	}
}
