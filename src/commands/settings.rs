use anyhow::Result;

use crate::cli::ConfigCommand;
use crate::config::Config;

pub fn run(cmd: &ConfigCommand) -> Result<()> {
	match cmd {
		ConfigCommand::Show => show(),
		ConfigCommand::SetRpc { url } => set_rpc(url),
		ConfigCommand::SetToken { address, decimals } => set_token(address, *decimals),
	}
}

fn show() -> Result<()> {
	let config = Config::load()?;

	let token = config.token.address.as_deref().unwrap_or("not set");

	println!("Config ({})", Config::path()?.display());
	println!("  RPC:       {}", config.network.rpc_url);
	println!("  Token:     {token}");
	println!("  Decimals:  {}", config.token.decimals);
	println!("  Poll:      {}s", config.tracker.poll_interval_secs);
	println!(
		"  Receipts:  {} x {}ms",
		config.transfer.receipt_attempts, config.transfer.receipt_poll_interval_ms
	);
	Ok(())
}

fn set_rpc(url: &str) -> Result<()> {
	let mut config = Config::load()?;
	config.network.rpc_url = url.to_owned();
	config.save()?;
	println!("RPC endpoint set to: {url}");
	Ok(())
}

fn set_token(address: &str, decimals: u8) -> Result<()> {
	let mut config = Config::load()?;
	config.token.address = Some(address.to_owned());
	config.token.decimals = decimals;
	config.save()?;
	println!("Token set to: {address} ({decimals} decimals)");
	Ok(())
}
