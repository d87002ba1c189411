//! Utility helpers shared across the batcher crates.

pub mod formatting;

pub use formatting::{truncate_id, without_0x_prefix};
