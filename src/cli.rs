use clap::{Parser, Subcommand};

use crate::attestation::DEFAULT_RAW_TEXT;

#[derive(Parser)]
#[command(
	name = "meta-sender",
	about = "Send tokens and attest messages through an external Ethereum wallet.",
	version
)]
pub struct Cli {
	/// Override the wallet JSON-RPC endpoint.
	#[arg(long, global = true)]
	pub rpc_url: Option<String>,

	/// Override the token contract address.
	#[arg(long, global = true)]
	pub token: Option<String>,

	/// Override the token's decimals.
	#[arg(long, global = true)]
	pub decimals: Option<u8>,

	/// Log at debug level (RUST_LOG takes precedence).
	#[arg(short, long, global = true)]
	pub verbose: bool,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
	/// Show the accounts the wallet exposes.
	Accounts,

	/// Print every account change until interrupted.
	Watch,

	/// Show the token balance of the active (or given) account.
	Balance {
		/// Account to switch to before querying.
		#[arg(long)]
		account: Option<String>,
	},

	/// Transfer tokens from the active account.
	Transfer {
		/// Receiver address.
		#[arg(long)]
		to: String,

		/// Amount in display units.
		#[arg(long)]
		amount: String,
	},

	/// Sign a message with the active account and verify the signature.
	Sign {
		/// Plaintext to attest.
		#[arg(default_value = DEFAULT_RAW_TEXT)]
		text: String,
	},

	/// Verify an existing signature.
	Verify {
		/// Hex-encoded message (0x-prefixed).
		#[arg(long)]
		message: String,

		/// Signature to check.
		#[arg(long)]
		signature: String,

		/// Claimed signer; defaults to the active account.
		#[arg(long)]
		from: Option<String>,
	},

	/// Inspect or update the config file.
	Config {
		#[command(subcommand)]
		command: ConfigCommand,
	},
}

// -- Config subcommands --

#[derive(Subcommand)]
pub enum ConfigCommand {
	/// Show current configuration.
	Show,

	/// Set the default RPC endpoint.
	SetRpc {
		url: String,
	},

	/// Set the default token contract.
	SetToken {
		address: String,

		/// Token decimals.
		#[arg(long, default_value = "18")]
		decimals: u8,
	},
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sign_defaults_to_the_attestation_text() {
		let cli = Cli::try_parse_from(["meta-sender", "sign"]).unwrap();
		match cli.command {
			Command::Sign { text } => assert_eq!(text, DEFAULT_RAW_TEXT),
			_ => panic!("expected sign"),
		}
	}

	#[test]
	fn global_overrides_parse_after_subcommand() {
		let cli = Cli::try_parse_from([
			"meta-sender",
			"transfer",
			"--to",
			"0x70997970c51812dc3a010c7d01b50e0d17dc79c8",
			"--amount",
			"5",
			"--decimals",
			"6",
		])
		.unwrap();
		assert_eq!(cli.decimals, Some(6));
		assert!(matches!(cli.command, Command::Transfer { .. }));
	}
}
