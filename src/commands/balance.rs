use anyhow::Result;

use crate::balance::BalanceView;
use crate::cli::Cli;
use crate::commands::open_session;
use crate::config::Config;

pub async fn run(cli: &Cli, account: Option<&str>) -> Result<()> {
	let config = Config::load()?;
	let session = open_session(cli, &config).await?;

	let result = match account {
		Some(addr) => session.select_account(addr).await,
		None => session.refresh_balance().await,
	};
	match result {
		Ok(view) => {
			print_view(&view);
			Ok(())
		}
		Err(e) => {
			println!("{}", session.status().await);
			Err(e.into())
		}
	}
}

pub fn print_view(view: &BalanceView) {
	println!("Contract: {}", view.contract_address);
	println!("Account:  {}", view.account);
	println!("Balance:  {}", view.balance);
}
