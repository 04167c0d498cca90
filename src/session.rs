use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tracing::info;

use crate::accounts::{AccountTracker, ActiveAccountState, PollOutcome};
use crate::attestation::{Attestor, SignatureAttestation};
use crate::balance::{BalanceLoader, BalanceView};
use crate::contracts::TokenHandle;
use crate::error::{Result, SessionError};
use crate::provider::Provider;
use crate::status::{self, StatusBoard};
use crate::transfer::{TransferOrchestrator, TransferOutcome, TransferRequest};

/// One wallet session: the active account, the token it holds, the last
/// transfer status and the attestation in flight.  All state lives in
/// memory and ends with the session.
pub struct Session {
	tracker: Arc<AccountTracker>,
	balances: Arc<BalanceLoader>,
	transfers: TransferOrchestrator,
	attestor: Attestor,
	status: StatusBoard,
	token: RwLock<Option<TokenHandle>>,
}

impl Session {
	pub fn new(provider: Arc<dyn Provider>) -> Self {
		let status = StatusBoard::new();
		let tracker = Arc::new(AccountTracker::new(provider.clone(), status.clone()));
		let balances = Arc::new(BalanceLoader::new(provider.clone(), status.clone()));
		let transfers = TransferOrchestrator::new(provider.clone(), balances.clone(), status.clone());
		let attestor = Attestor::new(provider);
		Self {
			tracker,
			balances,
			transfers,
			attestor,
			status,
			token: RwLock::new(None),
		}
	}

	/// Initial poll, then a balance refresh if a token is attached.
	pub async fn start(&self) -> Result<PollOutcome> {
		let outcome = self.tracker.poll().await?;
		if self.token().await.is_some() {
			// Failure is already on the status line.
			let _ = self.refresh_balance().await;
		}
		Ok(outcome)
	}

	pub async fn attach_token(&self, token: TokenHandle) {
		info!(address = %token.address, "token attached");
		*self.token.write().await = Some(token);
	}

	pub async fn token(&self) -> Option<TokenHandle> {
		self.token.read().await.clone()
	}

	// -- Accounts --

	pub async fn poll_accounts(&self) -> Result<PollOutcome> {
		self.tracker.poll().await
	}

	pub fn subscribe(&self) -> broadcast::Receiver<Vec<String>> {
		self.tracker.subscribe()
	}

	pub fn watch_accounts(&self, interval: Duration) -> JoinHandle<()> {
		self.tracker.clone().watch(interval)
	}

	pub async fn accounts(&self) -> ActiveAccountState {
		self.tracker.state().await
	}

	pub async fn active_account(&self) -> Option<String> {
		self.tracker.active().await
	}

	/// Switch to another known account and load its balance.
	pub async fn select_account(&self, address: &str) -> Result<BalanceView> {
		self.tracker.select(address).await?;
		self.refresh_balance().await
	}

	// -- Balance --

	pub async fn refresh_balance(&self) -> Result<BalanceView> {
		let (account, token) = match (self.active_account().await, self.token().await) {
			(Some(account), Some(token)) => (account, token),
			(None, _) => return self.not_ready(status::NO_ACTIVE_ACCOUNT, "no active account").await,
			(_, None) => {
				return self
					.not_ready(status::BALANCE_ERROR, "token contract is not loaded")
					.await
			}
		};
		self.balances.refresh(&account, &token).await
	}

	pub async fn balance(&self) -> BalanceView {
		self.balances.view().await
	}

	// -- Transfer --

	pub async fn transfer(&self, request: TransferRequest) -> Result<TransferOutcome> {
		let token = self.token().await;
		let sender = self.active_account().await;
		self.transfers
			.send(token.as_ref(), sender.as_deref(), request)
			.await
	}

	pub async fn status(&self) -> String {
		self.status.current().await
	}

	// -- Attestation --

	pub async fn set_message(&self, raw_text: impl Into<String>) {
		self.attestor.set_raw_text(raw_text).await;
	}

	pub async fn set_signed_message(&self, hex_encoded_msg: impl Into<String>, sig: impl Into<String>) {
		self.attestor.set_hex_encoded_msg(hex_encoded_msg).await;
		self.attestor.set_signature(sig).await;
	}

	/// Sign the current raw text with the active account and verify it.
	pub async fn sign_message(&self) -> Result<SignatureAttestation> {
		let signer = self.require_active().await?;
		self.attestor.sign_and_verify(&signer).await
	}

	/// Verify the stored message and signature against `claimed`, or the
	/// active account when `claimed` is `None`.
	pub async fn verify_signature(&self, claimed: Option<&str>) -> Result<SignatureAttestation> {
		let sender = match claimed {
			Some(addr) => addr.to_owned(),
			None => self.require_active().await?,
		};
		self.attestor.verify(&sender).await
	}

	pub async fn attestation(&self) -> SignatureAttestation {
		self.attestor.attestation().await
	}

	// -- Private helpers --

	async fn require_active(&self) -> Result<String> {
		self.active_account()
			.await
			.ok_or_else(|| SessionError::NotReady("no active account".into()))
	}

	async fn not_ready<T>(&self, message: &str, reason: &str) -> Result<T> {
		let ticket = self.status.begin();
		self.status.set(ticket, message).await;
		Err(SessionError::NotReady(reason.into()))
	}
}
