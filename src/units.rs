use alloy_primitives::utils::{format_units, parse_units, ParseUnits};
use alloy_primitives::U256;
use anyhow::{anyhow, bail, Result};

/// Convert a display amount (`"5"`, `"0.25"`) to the token's minor unit.
/// Only strictly positive amounts are accepted.
pub fn to_minor(display: &str, decimals: u8) -> Result<U256> {
	let display = display.trim();
	if display.starts_with('-') {
		bail!("amount must be positive, got {display}");
	}
	let parsed = parse_units(display, decimals)
		.map_err(|e| anyhow!("invalid amount {display:?}: {e}"))?;
	let value = match parsed {
		ParseUnits::U256(v) => v,
		ParseUnits::I256(_) => bail!("amount must be positive, got {display}"),
	};
	if value.is_zero() {
		bail!("amount must be positive, got {display}");
	}
	Ok(value)
}

/// Convert a raw minor-unit balance to its display form, without trailing
/// fractional zeros (`10`, `2.5`).
pub fn to_display(raw: U256, decimals: u8) -> Result<String> {
	let full = format_units(raw, decimals).map_err(|e| anyhow!("cannot format balance: {e}"))?;
	Ok(trim_fraction(&full).to_owned())
}

fn trim_fraction(s: &str) -> &str {
	if s.contains('.') {
		s.trim_end_matches('0').trim_end_matches('.')
	} else {
		s
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ether(n: u64) -> U256 {
		U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
	}

	#[test]
	fn whole_amount_scales_by_decimals() {
		assert_eq!(to_minor("5", 18).unwrap(), ether(5));
		assert_eq!(to_minor(" 5 ", 18).unwrap(), ether(5));
		assert_eq!(to_minor("3", 0).unwrap(), U256::from(3u64));
	}

	#[test]
	fn fractional_amount_scales_by_decimals() {
		assert_eq!(to_minor("0.5", 2).unwrap(), U256::from(50u64));
		assert_eq!(to_minor("1.25", 6).unwrap(), U256::from(1_250_000u64));
	}

	#[test]
	fn non_positive_or_garbage_amounts_are_rejected() {
		assert!(to_minor("0", 18).is_err());
		assert!(to_minor("-1", 18).is_err());
		assert!(to_minor("five", 18).is_err());
		assert!(to_minor("", 18).is_err());
	}

	#[test]
	fn display_drops_trailing_zeros() {
		assert_eq!(to_display(ether(10), 18).unwrap(), "10");
		assert_eq!(to_display(ether(5) / U256::from(2u64), 18).unwrap(), "2.5");
		assert_eq!(to_display(U256::ZERO, 18).unwrap(), "0");
		assert_eq!(to_display(U256::from(7u64), 0).unwrap(), "7");
	}
}
