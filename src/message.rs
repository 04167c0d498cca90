/// Value stored as the recovered address when signer recovery fails.
/// Never a valid hex address, so it cannot be mistaken for a result.
pub const RECOVERY_FAILED: &str = "FAILED!";

/// Canonical hex form of a plaintext message: `0x` followed by the
/// lowercase hex of its UTF-8 bytes.  The empty string encodes to `0x`.
pub fn encode_message(raw_text: &str) -> String {
	format!("0x{}", hex::encode(raw_text.as_bytes()))
}

/// Address equality ignoring checksum casing.
pub fn same_address(a: &str, b: &str) -> bool {
	a.eq_ignore_ascii_case(b)
}
