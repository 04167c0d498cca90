use anyhow::Result;

use crate::cli::Cli;
use crate::commands::{balance::print_view, open_session};
use crate::config::Config;
use crate::transfer::{TransferOutcome, TransferRequest};

pub async fn run(cli: &Cli, to: &str, amount: &str) -> Result<()> {
	let config = Config::load()?;
	let session = open_session(cli, &config).await?;

	println!("Sending {amount} to {to}...");
	let result = session
		.transfer(TransferRequest {
			amount: amount.to_owned(),
			receiver: to.to_owned(),
		})
		.await;

	println!("{}", session.status().await);
	match result? {
		TransferOutcome::Completed { balance: Some(view) } => print_view(&view),
		TransferOutcome::Completed { balance: None } => {}
		TransferOutcome::Rejected => anyhow::bail!("transfer was not accepted"),
	}
	Ok(())
}
