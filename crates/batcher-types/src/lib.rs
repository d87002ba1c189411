//! Common types for the transaction batcher.
//!
//! Shared data model used by every batcher crate: tasks and their
//! quantities, JSON-RPC envelopes, transaction records, submission outcomes
//! and receipts.

/// Submission outcomes, confirmations and receipts.
pub mod delivery;
/// Hex-or-integer quantity normalization.
pub mod quantity;
/// JSON-RPC 2.0 request and response envelopes.
pub mod rpc;
/// Zeroizing string for private keys.
pub mod secret_string;
/// Tasks and the transaction records built from them.
pub mod task;
/// String formatting helpers.
pub mod utils;

pub use delivery::*;
pub use quantity::{Quantity, QuantityError};
pub use rpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use secret_string::SecretString;
pub use task::*;
pub use utils::{truncate_id, without_0x_prefix};
