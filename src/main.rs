use anyhow::Result;
use clap::Parser;

use meta_sender::cli::{Cli, Command};
use meta_sender::{commands, logging};

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();
	logging::init(cli.verbose);

	match &cli.command {
		Command::Accounts => commands::accounts::list(&cli).await,
		Command::Watch => commands::accounts::watch(&cli).await,
		Command::Balance { account } => commands::balance::run(&cli, account.as_deref()).await,
		Command::Transfer { to, amount } => commands::transfer::run(&cli, to, amount).await,
		Command::Sign { text } => commands::attest::sign(&cli, text).await,
		Command::Verify {
			message,
			signature,
			from,
		} => commands::attest::verify(&cli, message, signature, from.as_deref()).await,
		Command::Config { command } => commands::settings::run(command),
	}
}
