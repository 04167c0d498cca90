use anyhow::Result;

use crate::attestation::SignatureAttestation;
use crate::cli::Cli;
use crate::commands::open_session;
use crate::config::Config;

/// Sign `text` with the active account, then recover and compare.
pub async fn sign(cli: &Cli, text: &str) -> Result<()> {
	let config = Config::load()?;
	let session = open_session(cli, &config).await?;

	session.set_message(text).await;
	println!("Requesting signature from the wallet...");
	let result = session.sign_message().await;
	print_attestation(&session.attestation().await);
	result?;
	Ok(())
}

pub async fn verify(cli: &Cli, message: &str, signature: &str, from: Option<&str>) -> Result<()> {
	let config = Config::load()?;
	let session = open_session(cli, &config).await?;

	session.set_signed_message(message, signature).await;
	let result = session.verify_signature(from).await;
	print_attestation(&session.attestation().await);
	result?;
	Ok(())
}

fn print_attestation(a: &SignatureAttestation) {
	println!("Attestation");
	println!("  Text:      {}", a.raw_text);
	println!("  Message:   {}", a.hex_encoded_msg);
	println!("  Signature: {}", a.sig);
	println!("  Recovered: {}", a.recovered_address);
	println!("  Matched:   {}", a.address_matched);
	println!("  State:     {:?}", a.state);
}
