use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::contracts::TokenHandle;
use crate::error::{Result, SessionError};
use crate::provider::Provider;
use crate::status::{self, StatusBoard, Ticket};
use crate::units;

/// What the session last learned about the active account's holdings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceView {
	pub contract_address: String,
	pub account: String,
	/// Balance in display units, trailing fractional zeros removed.
	pub balance: String,
}

impl Default for BalanceView {
	fn default() -> Self {
		Self {
			contract_address: "0x".into(),
			account: String::new(),
			balance: "0".into(),
		}
	}
}

pub struct BalanceLoader {
	provider: Arc<dyn Provider>,
	view: RwLock<BalanceView>,
	status: StatusBoard,
}

impl BalanceLoader {
	pub fn new(provider: Arc<dyn Provider>, status: StatusBoard) -> Self {
		Self {
			provider,
			view: RwLock::new(BalanceView::default()),
			status,
		}
	}

	pub async fn view(&self) -> BalanceView {
		self.view.read().await.clone()
	}

	/// Manual refresh, reported under its own status ticket.
	pub async fn refresh(&self, account: &str, token: &TokenHandle) -> Result<BalanceView> {
		let ticket = self.status.begin();
		self.refresh_with(ticket, account, token).await
	}

	/// Refresh as part of an operation that already holds `ticket`.
	///
	/// On success the view is replaced wholesale.  On failure it keeps its
	/// previous value and the status line reports the error.
	pub(crate) async fn refresh_with(
		&self,
		ticket: Ticket,
		account: &str,
		token: &TokenHandle,
	) -> Result<BalanceView> {
		let raw = match self.provider.token_balance(token, account).await {
			Ok(raw) => raw,
			Err(e) => return self.fail(ticket, e.to_string()).await,
		};
		let balance = match units::to_display(raw, token.decimals) {
			Ok(balance) => balance,
			Err(e) => return self.fail(ticket, e.to_string()).await,
		};

		info!(account, %balance, "found balance");
		let fresh = BalanceView {
			contract_address: token.address.clone(),
			account: account.to_owned(),
			balance,
		};
		*self.view.write().await = fresh.clone();
		Ok(fresh)
	}

	async fn fail(&self, ticket: Ticket, reason: String) -> Result<BalanceView> {
		warn!(error = %reason, "balance query failed");
		self.status.set(ticket, status::BALANCE_ERROR).await;
		Err(SessionError::BalanceQuery(reason))
	}
}

#[cfg(test)]
mod tests {
	use alloy_primitives::U256;

	use super::*;
	use crate::provider::mock::{Call, MockProvider};

	const TOKEN: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";

	fn loader(mock: &Arc<MockProvider>) -> (BalanceLoader, StatusBoard) {
		let status = StatusBoard::new();
		(BalanceLoader::new(mock.clone(), status.clone()), status)
	}

	#[tokio::test]
	async fn raw_balance_is_scaled_to_display_units() {
		let mock = Arc::new(MockProvider::new());
		mock.push_balance(U256::from(10u64) * U256::from(10u64).pow(U256::from(18u64)));
		let (loader, _) = loader(&mock);

		let view = loader
			.refresh("0xa", &TokenHandle::new(TOKEN, 18))
			.await
			.unwrap();
		assert_eq!(view.balance, "10");
		assert_eq!(view.contract_address, TOKEN);
		assert_eq!(view.account, "0xa");
		assert_eq!(loader.view().await, view);
		assert_eq!(
			mock.calls(),
			vec![Call::TokenBalance {
				token: TOKEN.into(),
				account: "0xa".into()
			}]
		);
	}

	#[tokio::test]
	async fn failure_keeps_previous_view() {
		let mock = Arc::new(MockProvider::new());
		mock.push_balance(U256::from(3u64));
		mock.push_balance_error("execution reverted");
		let (loader, status) = loader(&mock);
		let token = TokenHandle::new(TOKEN, 0);

		let before = loader.refresh("0xa", &token).await.unwrap();
		let err = loader.refresh("0xb", &token).await.unwrap_err();

		assert!(matches!(err, SessionError::BalanceQuery(_)));
		assert_eq!(loader.view().await, before);
		assert_eq!(status.current().await, status::BALANCE_ERROR);
	}

	#[tokio::test]
	async fn unformattable_decimals_count_as_query_failure() {
		let mock = Arc::new(MockProvider::new());
		mock.push_balance(U256::from(1u64));
		let (loader, _) = loader(&mock);

		let err = loader
			.refresh("0xa", &TokenHandle::new(TOKEN, 200))
			.await
			.unwrap_err();
		assert!(matches!(err, SessionError::BalanceQuery(_)));
		assert_eq!(loader.view().await, BalanceView::default());
	}
}
