//! Scripted in-memory provider.
//!
//! Every capability answers from its own queue of responses.  The last
//! queued response is sticky, so a single `push_*` covers any number of
//! calls.  All calls are recorded in order for later inspection.
//!
//! A gated call takes its response when it starts and hands it back only
//! once the gate opens, so held calls resolve in the order they began.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use alloy_primitives::U256;
use anyhow::{anyhow, Result};
use tokio::sync::oneshot;

use super::{Provider, TransferCall};
use crate::contracts::TokenHandle;

/// One recorded provider request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
	ListAccounts,
	TokenBalance { token: String, account: String },
	SubmitTransfer { token: String, call: TransferCall },
	Sign { message: String, signer: String },
	Recover { message: String, signature: String },
}

struct Script<T> {
	queue: VecDeque<std::result::Result<T, String>>,
}

impl<T> Default for Script<T> {
	fn default() -> Self {
		Self { queue: VecDeque::new() }
	}
}

impl<T: Clone> Script<T> {
	fn push(&mut self, response: std::result::Result<T, String>) {
		self.queue.push_back(response);
	}

	fn next(&mut self, what: &str) -> Result<T> {
		let response = if self.queue.len() > 1 {
			self.queue.pop_front()
		} else {
			self.queue.front().cloned()
		};
		match response {
			Some(Ok(value)) => Ok(value),
			Some(Err(msg)) => Err(anyhow!(msg)),
			None => Err(anyhow!("no {what} response scripted")),
		}
	}
}

#[derive(Default)]
pub struct MockProvider {
	accounts: Mutex<Script<Vec<String>>>,
	balances: Mutex<Script<U256>>,
	transfers: Mutex<Script<bool>>,
	signatures: Mutex<Script<String>>,
	recoveries: Mutex<Script<String>>,
	accounts_gate: Gate,
	transfer_gate: Gate,
	signing_gate: Gate,
	recovery_gate: Gate,
	calls: Mutex<Vec<Call>>,
}

type Gate = Mutex<Option<oneshot::Receiver<()>>>;

fn close(gate: &Gate) -> oneshot::Sender<()> {
	let (tx, rx) = oneshot::channel();
	*guard(gate) = Some(rx);
	tx
}

async fn pass<T>(gate: &Gate, response: T) -> T {
	let held = guard(gate).take();
	if let Some(held) = held {
		let _ = held.await;
	}
	response
}

fn guard<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
	m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn push<T: Clone>(slot: &Mutex<Script<T>>, response: std::result::Result<T, String>) {
	guard(slot).push(response);
}

fn next<T: Clone>(slot: &Mutex<Script<T>>, what: &str) -> Result<T> {
	guard(slot).next(what)
}

impl MockProvider {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push_accounts<S: Into<String>>(&self, accounts: impl IntoIterator<Item = S>) {
		push(
			&self.accounts,
			Ok(accounts.into_iter().map(Into::into).collect()),
		);
	}

	pub fn push_accounts_error(&self, msg: &str) {
		push(&self.accounts, Err(msg.to_owned()));
	}

	pub fn push_balance(&self, raw: U256) {
		push(&self.balances, Ok(raw));
	}

	pub fn push_balance_error(&self, msg: &str) {
		push(&self.balances, Err(msg.to_owned()));
	}

	pub fn push_transfer(&self, success: bool) {
		push(&self.transfers, Ok(success));
	}

	pub fn push_transfer_error(&self, msg: &str) {
		push(&self.transfers, Err(msg.to_owned()));
	}

	pub fn push_signature(&self, sig: &str) {
		push(&self.signatures, Ok(sig.to_owned()));
	}

	pub fn push_signature_error(&self, msg: &str) {
		push(&self.signatures, Err(msg.to_owned()));
	}

	pub fn push_recovery(&self, address: &str) {
		push(&self.recoveries, Ok(address.to_owned()));
	}

	pub fn push_recovery_error(&self, msg: &str) {
		push(&self.recoveries, Err(msg.to_owned()));
	}

	/// Hold the next account fetch until the returned sender fires (or is
	/// dropped).
	pub fn gate_accounts(&self) -> oneshot::Sender<()> {
		close(&self.accounts_gate)
	}

	/// Hold the next transfer submission.
	pub fn gate_transfer(&self) -> oneshot::Sender<()> {
		close(&self.transfer_gate)
	}

	/// Hold the next signing request.
	pub fn gate_signing(&self) -> oneshot::Sender<()> {
		close(&self.signing_gate)
	}

	/// Hold the next recovery request.
	pub fn gate_recovery(&self) -> oneshot::Sender<()> {
		close(&self.recovery_gate)
	}

	/// Every call made so far, oldest first.
	pub fn calls(&self) -> Vec<Call> {
		guard(&self.calls).clone()
	}

	pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
		guard(&self.calls).iter().filter(|c| pred(*c)).count()
	}

	fn record(&self, call: Call) {
		guard(&self.calls).push(call);
	}
}

#[async_trait::async_trait]
impl Provider for MockProvider {
	async fn list_accounts(&self) -> Result<Vec<String>> {
		self.record(Call::ListAccounts);
		let response = next(&self.accounts, "accounts");
		pass(&self.accounts_gate, response).await
	}

	async fn token_balance(&self, token: &TokenHandle, account: &str) -> Result<U256> {
		self.record(Call::TokenBalance {
			token: token.address.clone(),
			account: account.to_owned(),
		});
		next(&self.balances, "balance")
	}

	async fn submit_transfer(&self, token: &TokenHandle, call: &TransferCall) -> Result<bool> {
		self.record(Call::SubmitTransfer {
			token: token.address.clone(),
			call: call.clone(),
		});
		let response = next(&self.transfers, "transfer");
		pass(&self.transfer_gate, response).await
	}

	async fn sign_message(&self, message: &str, signer: &str) -> Result<String> {
		self.record(Call::Sign {
			message: message.to_owned(),
			signer: signer.to_owned(),
		});
		let response = next(&self.signatures, "signature");
		pass(&self.signing_gate, response).await
	}

	async fn recover_signer(&self, message: &str, signature: &str) -> Result<String> {
		self.record(Call::Recover {
			message: message.to_owned(),
			signature: signature.to_owned(),
		});
		let response = next(&self.recoveries, "recovery");
		pass(&self.recovery_gate, response).await
	}
}
