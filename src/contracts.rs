use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolCall};
use anyhow::{anyhow, Result};
use tracing::info;

use crate::rpc::RpcClient;

sol! {
	/// The slice of the ERC-20 interface the session drives.
	interface IERC20 {
		function balanceOf(address account) external view returns (uint256);
		function transfer(address to, uint256 amount) external returns (bool);
	}
}

/// Handle to a deployed token contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenHandle {
	/// Contract address (0x-prefixed, 42 chars).
	pub address: String,
	/// Number of decimals between the minor and display unit.
	pub decimals: u8,
}

impl TokenHandle {
	pub fn new(address: impl Into<String>, decimals: u8) -> Self {
		Self {
			address: address.into(),
			decimals,
		}
	}
}

/// Confirm a contract is deployed at `address` before handing out a handle.
pub async fn resolve_deployed(rpc: &RpcClient, address: &str, decimals: u8) -> Result<TokenHandle> {
	parse_address(address)?;
	let code = rpc.code_at(address).await?;
	if code.is_empty() {
		anyhow::bail!("no contract deployed at {address}");
	}
	info!(address, decimals, "token contract resolved");
	Ok(TokenHandle::new(address, decimals))
}

// -- Call data builders --

pub fn balance_of_calldata(account: &str) -> Result<Vec<u8>> {
	let account = parse_address(account)?;
	Ok(IERC20::balanceOfCall { account }.abi_encode())
}

pub fn decode_balance_of(data: &[u8]) -> Result<U256> {
	let ret = IERC20::balanceOfCall::abi_decode_returns(data, true)
		.map_err(|e| anyhow!("malformed balanceOf result: {e}"))?;
	Ok(ret._0)
}

pub fn transfer_calldata(receiver: &str, amount: U256) -> Result<Vec<u8>> {
	let to = parse_address(receiver)?;
	Ok(IERC20::transferCall { to, amount }.abi_encode())
}

fn parse_address(s: &str) -> Result<Address> {
	s.parse()
		.map_err(|e| anyhow!("invalid address {s:?}: {e}"))
}

#[cfg(test)]
mod tests {
	use super::*;

	const HOLDER: &str = "0x90f8bf6a479f320ead074411a4b0e7944ea8c9c1";

	#[test]
	fn balance_of_uses_erc20_selector() {
		let data = balance_of_calldata(HOLDER).unwrap();
		assert_eq!(&data[..4], &[0x70, 0xa0, 0x82, 0x31]);
		assert_eq!(data.len(), 4 + 32);
		assert_eq!(hex::encode(&data[16..36]), &HOLDER[2..]);
	}

	#[test]
	fn transfer_uses_erc20_selector() {
		let data = transfer_calldata(HOLDER, U256::from(5u64)).unwrap();
		assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
		assert_eq!(data.len(), 4 + 64);
		assert_eq!(data[67], 5);
	}

	#[test]
	fn balance_result_decodes_word() {
		let mut word = [0u8; 32];
		word[31] = 42;
		assert_eq!(decode_balance_of(&word).unwrap(), U256::from(42u64));
		assert!(decode_balance_of(&[0u8; 3]).is_err());
	}

	#[test]
	fn rejects_malformed_addresses() {
		assert!(balance_of_calldata("0x1234").is_err());
		assert!(transfer_calldata("not-an-address", U256::ZERO).is_err());
	}
}
