use std::time::Duration;

use alloy_primitives::U256;
use anyhow::{anyhow, Result};
use serde_json::Value;
use tracing::{debug, info};

use super::{Provider, TransferCall};
use crate::contracts::{self, TokenHandle};
use crate::rpc::RpcClient;

/// How long to wait for a submitted transfer to be mined.
#[derive(Debug, Clone, Copy)]
pub struct ReceiptPolling {
	pub interval: Duration,
	pub attempts: u32,
}

impl Default for ReceiptPolling {
	fn default() -> Self {
		Self {
			interval: Duration::from_millis(500),
			attempts: 60,
		}
	}
}

/// Drives a wallet that exposes the standard Ethereum JSON-RPC surface
/// (an injected browser wallet bridge, or a dev node with unlocked
/// accounts).  Keys never leave the wallet.
pub struct JsonRpcProvider {
	rpc: RpcClient,
	receipts: ReceiptPolling,
}

impl JsonRpcProvider {
	pub fn new(rpc: RpcClient, receipts: ReceiptPolling) -> Self {
		Self { rpc, receipts }
	}

	pub fn rpc(&self) -> &RpcClient {
		&self.rpc
	}

	/// Poll for the receipt of `tx_hash` and report whether it succeeded.
	async fn wait_for_receipt(&self, tx_hash: &str) -> Result<bool> {
		for attempt in 1..=self.receipts.attempts {
			if let Some(receipt) = self.rpc.transaction_receipt(tx_hash).await? {
				let ok = receipt_succeeded(&receipt);
				info!(tx_hash, ok, attempt, "transfer mined");
				return Ok(ok);
			}
			debug!(tx_hash, attempt, "receipt pending");
			tokio::time::sleep(self.receipts.interval).await;
		}
		Err(anyhow!(
			"no receipt for {tx_hash} after {} attempts",
			self.receipts.attempts
		))
	}
}

#[async_trait::async_trait]
impl Provider for JsonRpcProvider {
	async fn list_accounts(&self) -> Result<Vec<String>> {
		self.rpc.accounts().await
	}

	async fn token_balance(&self, token: &TokenHandle, account: &str) -> Result<U256> {
		let data = contracts::balance_of_calldata(account)?;
		let ret = self.rpc.call(&token.address, &data).await?;
		contracts::decode_balance_of(&ret)
	}

	async fn submit_transfer(&self, token: &TokenHandle, call: &TransferCall) -> Result<bool> {
		let data = contracts::transfer_calldata(&call.receiver, call.amount)?;
		let tx_hash = self
			.rpc
			.send_transaction(&call.from, &token.address, &data)
			.await?;
		info!(%tx_hash, "transfer submitted");
		self.wait_for_receipt(&tx_hash).await
	}

	async fn sign_message(&self, message: &str, signer: &str) -> Result<String> {
		self.rpc.personal_sign(message, signer).await
	}

	async fn recover_signer(&self, message: &str, signature: &str) -> Result<String> {
		self.rpc.personal_ec_recover(message, signature).await
	}
}

/// A receipt succeeded when its `status` field is `0x1`.
fn receipt_succeeded(receipt: &Value) -> bool {
	receipt
		.get("status")
		.and_then(Value::as_str)
		.map(|s| s == "0x1")
		.unwrap_or(false)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn receipt_status_decides_success() {
		assert!(receipt_succeeded(&serde_json::json!({ "status": "0x1" })));
		assert!(!receipt_succeeded(&serde_json::json!({ "status": "0x0" })));
		assert!(!receipt_succeeded(&serde_json::json!({})));
	}
}
