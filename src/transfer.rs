use std::sync::Arc;

use tracing::{info, warn};

use crate::balance::{BalanceLoader, BalanceView};
use crate::contracts::TokenHandle;
use crate::error::{Result, SessionError};
use crate::provider::{Provider, TransferCall};
use crate::status::{self, StatusBoard};
use crate::units;

/// A user-initiated transfer.  Lives for one attempt; never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
	/// Amount in display units, e.g. `"5"` or `"0.25"`.
	pub amount: String,
	pub receiver: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
	/// The wallet reported success.  `balance` is the refreshed view, or
	/// `None` if the follow-up balance query failed.
	Completed { balance: Option<BalanceView> },
	/// The call resolved but the success indicator was false.
	Rejected,
}

pub struct TransferOrchestrator {
	provider: Arc<dyn Provider>,
	balances: Arc<BalanceLoader>,
	status: StatusBoard,
}

impl TransferOrchestrator {
	pub fn new(
		provider: Arc<dyn Provider>,
		balances: Arc<BalanceLoader>,
		status: StatusBoard,
	) -> Self {
		Self {
			provider,
			balances,
			status,
		}
	}

	/// Submit `request` from `sender` and refresh the balance on success.
	///
	/// After the pending status, exactly one terminal status is written:
	/// complete, failed, or error.
	pub async fn send(
		&self,
		token: Option<&TokenHandle>,
		sender: Option<&str>,
		request: TransferRequest,
	) -> Result<TransferOutcome> {
		let ticket = self.status.begin();

		let Some(token) = token else {
			self.status.set(ticket, status::TOKEN_NOT_LOADED).await;
			return Err(SessionError::NotReady("token contract is not loaded".into()));
		};
		let Some(sender) = sender else {
			self.status.set(ticket, status::NO_ACTIVE_ACCOUNT).await;
			return Err(SessionError::NotReady("no active account".into()));
		};

		info!(amount = %request.amount, receiver = %request.receiver, "sending coins");
		let amount = match units::to_minor(&request.amount, token.decimals) {
			Ok(amount) => amount,
			Err(e) => {
				warn!(error = %e, "rejecting transfer amount");
				self.status.set(ticket, status::TRANSFER_ERROR).await;
				return Err(SessionError::Transfer(e.to_string()));
			}
		};
		let call = TransferCall {
			receiver: request.receiver,
			amount,
			from: sender.to_owned(),
		};

		self.status.set(ticket, status::TRANSFER_PENDING).await;

		match self.provider.submit_transfer(token, &call).await {
			Ok(true) => {
				self.status.set(ticket, status::TRANSFER_COMPLETE).await;
				let balance = self
					.balances
					.refresh_with(ticket, sender, token)
					.await
					.ok();
				Ok(TransferOutcome::Completed { balance })
			}
			Ok(false) => {
				warn!("transfer reported failure");
				self.status.set(ticket, status::TRANSFER_FAILED).await;
				Ok(TransferOutcome::Rejected)
			}
			Err(e) => {
				warn!(error = %e, "transfer call errored");
				self.status.set(ticket, status::TRANSFER_ERROR).await;
				Err(SessionError::Transfer(e.to_string()))
			}
		}
	}
}
