use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

/// Thin JSON-RPC client for an Ethereum node or wallet endpoint.
///
/// Requests go out as raw JSON so the account-management methods
/// (`personal_sign`, `personal_ecRecover`) that typed clients often omit
/// are reachable the same way as the standard `eth_*` calls.
pub struct RpcClient {
	url: String,
	http: reqwest::Client,
	next_id: AtomicU64,
}

impl RpcClient {
	pub fn new(url: &str) -> Self {
		Self {
			url: url.to_owned(),
			http: reqwest::Client::new(),
			next_id: AtomicU64::new(1),
		}
	}

	/// Send one request and decode its `result` field.
	pub async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		let body = json!({
			"id": id,
			"jsonrpc": "2.0",
			"method": method,
			"params": params,
		});
		debug!(method, id, "json-rpc request");

		let resp: Value = self.http.post(&self.url).json(&body).send().await?.json().await?;

		if let Some(err) = resp.get("error") {
			return Err(anyhow!("{method} RPC error: {err}"));
		}
		let result = resp
			.get("result")
			.cloned()
			.ok_or_else(|| anyhow!("{method} RPC response has no result"))?;
		Ok(serde_json::from_value(result)?)
	}

	// -- Standard RPC helpers --

	pub async fn accounts(&self) -> Result<Vec<String>> {
		self.request("eth_accounts", json!([])).await
	}

	/// Read-only contract call against the latest block.
	pub async fn call(&self, to: &str, data: &[u8]) -> Result<Vec<u8>> {
		let raw: String = self
			.request(
				"eth_call",
				json!([{ "to": to, "data": to_hex(data) }, "latest"]),
			)
			.await?;
		from_hex(&raw)
	}

	pub async fn code_at(&self, address: &str) -> Result<Vec<u8>> {
		let raw: String = self
			.request("eth_getCode", json!([address, "latest"]))
			.await?;
		from_hex(&raw)
	}

	/// Hand an unsigned transaction to the wallet for signing and broadcast.
	/// Returns the transaction hash.
	pub async fn send_transaction(&self, from: &str, to: &str, data: &[u8]) -> Result<String> {
		self.request(
			"eth_sendTransaction",
			json!([{ "from": from, "to": to, "data": to_hex(data) }]),
		)
		.await
	}

	/// Receipt for a mined transaction, `None` while still pending.
	pub async fn transaction_receipt(&self, tx_hash: &str) -> Result<Option<Value>> {
		self.request("eth_getTransactionReceipt", json!([tx_hash]))
			.await
	}

	// -- Account-management helpers --

	pub async fn personal_sign(&self, message: &str, signer: &str) -> Result<String> {
		self.request("personal_sign", json!([message, signer]))
			.await
	}

	pub async fn personal_ec_recover(&self, message: &str, signature: &str) -> Result<String> {
		self.request("personal_ecRecover", json!([message, signature]))
			.await
	}
}

// -- Private helpers --

fn to_hex(data: &[u8]) -> String {
	format!("0x{}", hex::encode(data))
}

fn from_hex(raw: &str) -> Result<Vec<u8>> {
	let clean = raw.strip_prefix("0x").unwrap_or(raw);
	hex::decode(clean).map_err(|e| anyhow!("invalid hex in RPC result: {e}"))
}
