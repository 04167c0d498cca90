pub mod json_rpc;
pub mod mock;

use alloy_primitives::U256;
use anyhow::Result;

use crate::contracts::TokenHandle;

/// A transfer call as it is handed to the wallet: amount already in the
/// token's minor unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferCall {
	pub receiver: String,
	pub amount: U256,
	pub from: String,
}

/// The wallet provider the session drives.  Holds no keys locally; every
/// call is an opaque remote request with its own latency and failure modes.
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
	/// Ordered list of accounts the wallet currently exposes.
	async fn list_accounts(&self) -> Result<Vec<String>>;

	/// Raw `balanceOf` for `account`, in minor units.
	async fn token_balance(&self, token: &TokenHandle, account: &str) -> Result<U256>;

	/// Submit a token transfer and report the success indicator.
	async fn submit_transfer(&self, token: &TokenHandle, call: &TransferCall) -> Result<bool>;

	/// Ask `signer` to personal-sign the hex-encoded `message`.
	async fn sign_message(&self, message: &str, signer: &str) -> Result<String>;

	/// Recover the address that produced `signature` over `message`.
	async fn recover_signer(&self, message: &str, signature: &str) -> Result<String>;
}
