pub mod accounts;
pub mod attest;
pub mod balance;
pub mod settings;
pub mod transfer;

use std::sync::Arc;

use anyhow::Result;
use tracing::warn;

use crate::cli::Cli;
use crate::config::Config;
use crate::contracts;
use crate::provider::json_rpc::JsonRpcProvider;
use crate::rpc::RpcClient;
use crate::session::Session;

/// Resolve the RPC URL from CLI flag or config.
pub fn resolve_rpc(cli: &Cli, config: &Config) -> String {
	cli.rpc_url
		.clone()
		.unwrap_or_else(|| config.network.rpc_url.clone())
}

/// Token address and decimals from CLI flags + config, if any is set.
pub fn resolve_token(cli: &Cli, config: &Config) -> Option<(String, u8)> {
	let address = cli.token.clone().or_else(|| config.token.address.clone())?;
	let decimals = cli.decimals.unwrap_or(config.token.decimals);
	Some((address, decimals))
}

/// Connect to the wallet, attach the token if one is configured, and run
/// the initial account poll.
pub async fn open_session(cli: &Cli, config: &Config) -> Result<Session> {
	let rpc_url = resolve_rpc(cli, config);
	let provider = Arc::new(JsonRpcProvider::new(
		RpcClient::new(&rpc_url),
		config.receipt_polling(),
	));

	let token = match resolve_token(cli, config) {
		Some((address, decimals)) => {
			match contracts::resolve_deployed(provider.rpc(), &address, decimals).await {
				Ok(token) => Some(token),
				Err(e) => {
					warn!(error = %e, "token contract unavailable");
					None
				}
			}
		}
		None => None,
	};

	let session = Session::new(provider);
	if let Some(token) = token {
		session.attach_token(token).await;
	}
	if let Err(e) = session.start().await {
		println!("{}", session.status().await);
		return Err(e.into());
	}
	Ok(session)
}
