//! String formatting utilities.
//!
//! Hex prefix stripping and identifier truncation for log output.

/// Truncates a hash or address for log fields.
///
/// Keeps the first 10 characters (`0x` plus 8 hex digits) followed by "..".
pub fn truncate_id(id: &str) -> String {
	match id.char_indices().nth(10) {
		Some((end, _)) => format!("{}..", &id[..end]),
		None => id.to_string(),
	}
}

/// Removes a "0x" or "0X" prefix from a hex string if present.
pub fn without_0x_prefix(hex_str: &str) -> &str {
	hex_str
		.strip_prefix("0x")
		.or_else(|| hex_str.strip_prefix("0X"))
		.unwrap_or(hex_str)
}
