//! Integration tests that hit a local development node with unlocked
//! accounts (anvil, ganache) at `http://127.0.0.1:8545`.
//!
//! These are marked `#[ignore]` by default because they require a running
//! node. Run them explicitly with:
//!
//!   cargo test --test integration -- --ignored

use meta_sender::message::encode_message;
use meta_sender::provider::json_rpc::{JsonRpcProvider, ReceiptPolling};
use meta_sender::provider::Provider;
use meta_sender::rpc::RpcClient;

const DEV_RPC: &str = "http://127.0.0.1:8545";

fn provider() -> JsonRpcProvider {
	JsonRpcProvider::new(RpcClient::new(DEV_RPC), ReceiptPolling::default())
}

#[tokio::test]
#[ignore]
async fn dev_node_exposes_accounts() {
	let accounts = provider()
		.list_accounts()
		.await
		.expect("eth_accounts failed");
	assert!(!accounts.is_empty(), "dev node should expose unlocked accounts");
}

#[tokio::test]
#[ignore]
async fn personal_sign_recovers_to_signer() {
	let provider = provider();
	let accounts = provider.list_accounts().await.expect("eth_accounts failed");
	let signer = &accounts[0];
	let msg = encode_message("These are the terms and conditions");

	let sig = provider
		.sign_message(&msg, signer)
		.await
		.expect("personal_sign failed");
	let recovered = provider
		.recover_signer(&msg, &sig)
		.await
		.expect("personal_ecRecover failed");

	assert!(recovered.eq_ignore_ascii_case(signer));
}
