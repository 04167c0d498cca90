use anyhow::Result;

use crate::cli::Cli;
use crate::commands::open_session;
use crate::config::Config;

pub async fn list(cli: &Cli) -> Result<()> {
	let config = Config::load()?;
	let session = open_session(cli, &config).await?;
	let state = session.accounts().await;

	let active = state.active().unwrap_or("none");
	for account in state.accounts().unwrap_or_default() {
		let marker = if account == active { "*" } else { " " };
		println!("{marker} {account}");
	}
	println!("Active: {active}");
	Ok(())
}

/// Poll on the configured interval and print each published change.
pub async fn watch(cli: &Cli) -> Result<()> {
	let config = Config::load()?;
	let session = open_session(cli, &config).await?;
	if let Some(active) = session.active_account().await {
		println!("Active: {active}");
	}

	let mut changes = session.subscribe();
	let handle = session.watch_accounts(config.poll_interval());
	println!("Watching for account changes (Ctrl-C to stop)...");

	loop {
		tokio::select! {
			_ = tokio::signal::ctrl_c() => break,
			changed = changes.recv() => match changed {
				Ok(accounts) => {
					let active = accounts.first().map(String::as_str).unwrap_or("none");
					println!("Accounts changed ({}), active: {active}", accounts.len());
				}
				Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
					println!("Missed {n} account update(s).");
				}
				Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
			},
		}
	}

	handle.abort();
	Ok(())
}
