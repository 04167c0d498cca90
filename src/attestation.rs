//! Sign, encode, submit and recover: the attestation workflow.
//!
//! One [`SignatureAttestation`] is in flight at a time.  Starting a new
//! cycle bumps the cycle number and clears the derived fields; results that
//! arrive for an older cycle are dropped.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{Result, SessionError};
use crate::message::{self, RECOVERY_FAILED};
use crate::provider::Provider;

/// Text attested when the caller sets none.
pub const DEFAULT_RAW_TEXT: &str = "These are the terms and conditions";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttestationState {
	#[default]
	Idle,
	Encoding,
	AwaitingSignature,
	/// Terminal: the signer declined or the provider failed.
	SigningFailed,
	Signed,
	AwaitingRecovery,
	Verified,
	RecoveryFailed,
}

/// A message, its signature, and the outcome of checking who signed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureAttestation {
	pub raw_text: String,
	pub hex_encoded_msg: String,
	pub sig: String,
	/// Recovered signer, or [`RECOVERY_FAILED`].
	pub recovered_address: String,
	pub address_matched: bool,
	pub state: AttestationState,
	cycle: u64,
}

impl Default for SignatureAttestation {
	fn default() -> Self {
		Self {
			raw_text: DEFAULT_RAW_TEXT.into(),
			hex_encoded_msg: String::new(),
			sig: String::new(),
			recovered_address: String::new(),
			address_matched: false,
			state: AttestationState::Idle,
			cycle: 0,
		}
	}
}

impl SignatureAttestation {
	fn start_cycle(&mut self) -> u64 {
		self.cycle += 1;
		self.recovered_address.clear();
		self.address_matched = false;
		self.cycle
	}
}

pub struct Attestor {
	provider: Arc<dyn Provider>,
	record: RwLock<SignatureAttestation>,
}

impl Attestor {
	pub fn new(provider: Arc<dyn Provider>) -> Self {
		Self {
			provider,
			record: RwLock::new(SignatureAttestation::default()),
		}
	}

	pub async fn attestation(&self) -> SignatureAttestation {
		self.record.read().await.clone()
	}

	pub async fn set_raw_text(&self, text: impl Into<String>) {
		self.record.write().await.raw_text = text.into();
	}

	pub async fn set_hex_encoded_msg(&self, msg: impl Into<String>) {
		self.record.write().await.hex_encoded_msg = msg.into();
	}

	pub async fn set_signature(&self, sig: impl Into<String>) {
		self.record.write().await.sig = sig.into();
	}

	/// Check the stored message and signature against `sender`.
	pub async fn verify(&self, sender: &str) -> Result<SignatureAttestation> {
		let (cycle, msg, sig) = {
			let mut record = self.record.write().await;
			let cycle = record.start_cycle();
			record.state = AttestationState::AwaitingRecovery;
			(cycle, record.hex_encoded_msg.clone(), record.sig.clone())
		};
		self.recover(cycle, &msg, &sig, sender).await
	}

	/// Encode the raw text, have `signer` sign it, then verify the result.
	///
	/// Recovery only starts once signing has resolved successfully.
	pub async fn sign_and_verify(&self, signer: &str) -> Result<SignatureAttestation> {
		let (cycle, msg) = {
			let mut record = self.record.write().await;
			let cycle = record.start_cycle();
			record.state = AttestationState::Encoding;
			let msg = message::encode_message(&record.raw_text);
			record.hex_encoded_msg.clear();
			record.sig.clear();
			record.state = AttestationState::AwaitingSignature;
			(cycle, msg)
		};

		debug!(signer, %msg, "sending personal sign request");
		let sig = match self.provider.sign_message(&msg, signer).await {
			Ok(sig) => sig,
			Err(e) => {
				warn!(error = %e, "signing failed");
				self.update(cycle, |r| r.state = AttestationState::SigningFailed)
					.await;
				return Err(SessionError::Signing(e.to_string()));
			}
		};
		info!(%sig, "message signed");

		let current = self
			.update(cycle, |r| {
				r.hex_encoded_msg = msg.clone();
				r.sig = sig.clone();
				r.state = AttestationState::Signed;
			})
			.await;
		if !current {
			return Err(SessionError::Superseded);
		}

		self.update(cycle, |r| r.state = AttestationState::AwaitingRecovery)
			.await;
		self.recover(cycle, &msg, &sig, signer).await
	}

	async fn recover(
		&self,
		cycle: u64,
		msg: &str,
		sig: &str,
		sender: &str,
	) -> Result<SignatureAttestation> {
		match self.provider.recover_signer(msg, sig).await {
			Ok(recovered) => {
				let matched = message::same_address(&recovered, sender);
				if matched {
					info!(%recovered, sender, "recovered the message signer");
				} else {
					warn!(%recovered, sender, "recovered signer does not match");
				}
				let current = self
					.update(cycle, |r| {
						r.recovered_address = recovered;
						r.address_matched = matched;
						r.state = AttestationState::Verified;
					})
					.await;
				if !current {
					return Err(SessionError::Superseded);
				}
				Ok(self.attestation().await)
			}
			Err(e) => {
				warn!(error = %e, "failed to recover the message signer");
				let current = self
					.update(cycle, |r| {
						r.recovered_address = RECOVERY_FAILED.into();
						r.address_matched = false;
						r.state = AttestationState::RecoveryFailed;
					})
					.await;
				if !current {
					return Err(SessionError::Superseded);
				}
				Err(SessionError::Recovery(e.to_string()))
			}
		}
	}

	/// Apply `f` if `cycle` is still the one in flight.
	async fn update(&self, cycle: u64, f: impl FnOnce(&mut SignatureAttestation)) -> bool {
		let mut record = self.record.write().await;
		if record.cycle != cycle {
			debug!(cycle, current = record.cycle, "dropping result of superseded cycle");
			return false;
		}
		f(&mut *record);
		true
	}
}
