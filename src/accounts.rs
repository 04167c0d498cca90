//! Active-account tracking by polling.
//!
//! The wallet offers no push notification for account switches, so the
//! tracker fetches the account list on every tick and diffs it against the
//! last known list.  A change is published once to every subscriber
//! attached at that moment; late subscribers get no replay.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{Result, SessionError};
use crate::provider::Provider;
use crate::status::{self, StatusBoard, Ticket};

/// Accounts the provider exposes and the one currently acting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveAccountState {
	accounts: Option<Vec<String>>,
	active: Option<String>,
	/// Poll generation whose fetch was applied last.
	generation: u64,
}

impl ActiveAccountState {
	/// Last observed account list, `None` before the first successful poll.
	pub fn accounts(&self) -> Option<&[String]> {
		self.accounts.as_deref()
	}

	pub fn active(&self) -> Option<&str> {
		self.active.as_deref()
	}

	fn observe(&mut self, accounts: Vec<String>) {
		self.active = accounts.first().cloned();
		self.accounts = Some(accounts);
	}

	/// Make `address` active if it is one of the known accounts.
	fn select(&mut self, address: &str) -> bool {
		let known = self
			.accounts
			.as_deref()
			.and_then(|list| list.iter().find(|a| a.as_str() == address))
			.cloned();
		match known {
			Some(account) => {
				self.active = Some(account);
				true
			}
			None => false,
		}
	}
}

/// Whether a freshly fetched list counts as a change.
///
/// Only the length and the first element are compared.
pub fn accounts_changed(previous: Option<&[String]>, current: &[String]) -> bool {
	match previous {
		None => true,
		Some(prev) => prev.len() != current.len() || prev.first() != current.first(),
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
	/// The list changed and was published.
	Changed(Vec<String>),
	Unchanged,
}

pub struct AccountTracker {
	provider: Arc<dyn Provider>,
	state: RwLock<ActiveAccountState>,
	sender: broadcast::Sender<Vec<String>>,
	status: StatusBoard,
	polls: AtomicU64,
}

impl AccountTracker {
	pub fn new(provider: Arc<dyn Provider>, status: StatusBoard) -> Self {
		let (sender, _) = broadcast::channel(16);
		Self {
			provider,
			state: RwLock::new(ActiveAccountState::default()),
			sender,
			status,
			polls: AtomicU64::new(0),
		}
	}

	/// Receive every account list published after this call.
	pub fn subscribe(&self) -> broadcast::Receiver<Vec<String>> {
		self.sender.subscribe()
	}

	pub async fn state(&self) -> ActiveAccountState {
		self.state.read().await.clone()
	}

	pub async fn active(&self) -> Option<String> {
		self.state.read().await.active.clone()
	}

	/// Fetch the account list once and publish it if it changed.
	///
	/// On a provider error or an empty list the previous state is kept and
	/// the status line reports the problem.
	pub async fn poll(&self) -> Result<PollOutcome> {
		let ticket = self.status.begin();
		self.poll_with(ticket).await
	}

	/// A poll nobody asked for.  Problems are reported without superseding
	/// the status of an operation still in flight.
	pub(crate) async fn poll_in_background(&self) -> Result<PollOutcome> {
		let ticket = self.status.latest();
		self.poll_with(ticket).await
	}

	async fn poll_with(&self, ticket: Ticket) -> Result<PollOutcome> {
		let generation = self.polls.fetch_add(1, Ordering::SeqCst) + 1;

		let accounts = match self.provider.list_accounts().await {
			Ok(accounts) => accounts,
			Err(e) => {
				warn!(error = %e, "fetching accounts failed");
				self.status.set(ticket, status::ACCOUNTS_ERROR).await;
				return Err(SessionError::Provider(e.to_string()));
			}
		};

		if accounts.is_empty() {
			warn!("provider returned no accounts");
			self.status.set(ticket, status::NO_ACCOUNTS).await;
			return Err(SessionError::NoAccounts);
		}

		let mut state = self.state.write().await;
		if generation < state.generation {
			debug!(generation, applied = state.generation, "dropping stale account list");
			return Ok(PollOutcome::Unchanged);
		}
		state.generation = generation;
		if !accounts_changed(state.accounts(), &accounts) {
			debug!(count = accounts.len(), "accounts unchanged");
			return Ok(PollOutcome::Unchanged);
		}

		info!(active = %accounts[0], count = accounts.len(), "observed new accounts");
		state.observe(accounts.clone());
		// Published under the write lock so concurrent polls cannot reorder.
		if self.sender.send(accounts.clone()).is_err() {
			debug!("no account subscribers");
		}
		Ok(PollOutcome::Changed(accounts))
	}

	/// Switch the active account to another known one.
	pub async fn select(&self, address: &str) -> Result<()> {
		if self.state.write().await.select(address) {
			info!(active = address, "active account selected");
			Ok(())
		} else {
			Err(SessionError::NotReady(format!("{address} is not a known account")))
		}
	}

	/// Poll on a fixed interval until the task is aborted.  Poll failures are
	/// logged and do not stop the loop.
	pub fn watch(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
		tokio::spawn(async move {
			let mut ticker = tokio::time::interval(interval);
			loop {
				ticker.tick().await;
				if let Err(e) = self.poll_in_background().await {
					debug!(error = %e, "account poll failed");
				}
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::provider::mock::{Call, MockProvider};

	fn list(items: &[&str]) -> Vec<String> {
		items.iter().map(|s| s.to_string()).collect()
	}

	fn tracker(mock: &Arc<MockProvider>) -> (AccountTracker, StatusBoard) {
		let status = StatusBoard::new();
		(AccountTracker::new(mock.clone(), status.clone()), status)
	}

	#[test]
	fn first_observation_is_always_a_change() {
		assert!(accounts_changed(None, &list(&["0xa"])));
	}

	#[test]
	fn change_detection_looks_at_length_and_head_only() {
		let prev = list(&["0xa", "0xb"]);
		assert!(!accounts_changed(Some(&prev), &list(&["0xa", "0xb"])));
		// Same head and length, different tail: not a change.
		assert!(!accounts_changed(Some(&prev), &list(&["0xa", "0xc"])));
		assert!(accounts_changed(Some(&prev), &list(&["0xb", "0xa"])));
		assert!(accounts_changed(Some(&prev), &list(&["0xa"])));
		assert!(accounts_changed(Some(&prev), &list(&["0xa", "0xb", "0xc"])));
	}

	#[tokio::test]
	async fn change_is_published_once_and_sets_active() {
		let mock = Arc::new(MockProvider::new());
		mock.push_accounts(["0xa", "0xb"]);
		let (tracker, _) = tracker(&mock);
		let mut rx = tracker.subscribe();

		let outcome = tracker.poll().await.unwrap();
		assert_eq!(outcome, PollOutcome::Changed(list(&["0xa", "0xb"])));
		assert_eq!(tracker.active().await.as_deref(), Some("0xa"));
		assert_eq!(rx.try_recv().unwrap(), list(&["0xa", "0xb"]));

		// Same list again: idempotent.
		assert_eq!(tracker.poll().await.unwrap(), PollOutcome::Unchanged);
		assert!(rx.try_recv().is_err());
	}

	#[tokio::test]
	async fn switching_accounts_publishes_new_head() {
		let mock = Arc::new(MockProvider::new());
		mock.push_accounts(["0xa"]);
		mock.push_accounts(["0xb"]);
		let (tracker, _) = tracker(&mock);
		let mut rx = tracker.subscribe();

		tracker.poll().await.unwrap();
		tracker.poll().await.unwrap();
		assert_eq!(tracker.active().await.as_deref(), Some("0xb"));
		assert_eq!(rx.try_recv().unwrap(), list(&["0xa"]));
		assert_eq!(rx.try_recv().unwrap(), list(&["0xb"]));
	}

	#[tokio::test]
	async fn late_subscribers_get_no_replay() {
		let mock = Arc::new(MockProvider::new());
		mock.push_accounts(["0xa"]);
		let (tracker, _) = tracker(&mock);

		tracker.poll().await.unwrap();
		let mut rx = tracker.subscribe();
		assert!(rx.try_recv().is_err());
	}

	#[tokio::test]
	async fn provider_error_keeps_previous_state() {
		let mock = Arc::new(MockProvider::new());
		mock.push_accounts(["0xa"]);
		mock.push_accounts_error("connection refused");
		let (tracker, status) = tracker(&mock);
		let mut rx = tracker.subscribe();

		tracker.poll().await.unwrap();
		let _ = rx.try_recv();

		let err = tracker.poll().await.unwrap_err();
		assert!(matches!(err, SessionError::Provider(_)));
		assert_eq!(tracker.active().await.as_deref(), Some("0xa"));
		assert_eq!(status.current().await, status::ACCOUNTS_ERROR);
		assert!(rx.try_recv().is_err());
	}

	#[tokio::test]
	async fn empty_list_is_reported() {
		let mock = Arc::new(MockProvider::new());
		mock.push_accounts(Vec::<String>::new());
		let (tracker, status) = tracker(&mock);

		assert_eq!(tracker.poll().await.unwrap_err(), SessionError::NoAccounts);
		assert_eq!(status.current().await, status::NO_ACCOUNTS);
		assert!(tracker.state().await.accounts().is_none());
		assert_eq!(mock.count(|c| *c == Call::ListAccounts), 1);
	}

	#[tokio::test]
	async fn select_only_accepts_known_accounts() {
		let mock = Arc::new(MockProvider::new());
		mock.push_accounts(["0xa", "0xb"]);
		let (tracker, _) = tracker(&mock);
		tracker.poll().await.unwrap();

		tracker.select("0xb").await.unwrap();
		assert_eq!(tracker.active().await.as_deref(), Some("0xb"));

		assert!(tracker.select("0xc").await.is_err());
		assert_eq!(tracker.active().await.as_deref(), Some("0xb"));
	}

	#[tokio::test]
	async fn watch_keeps_polling() {
		let mock = Arc::new(MockProvider::new());
		mock.push_accounts_error("down");
		mock.push_accounts(["0xa"]);
		let (tracker, _) = tracker(&mock);
		let tracker = Arc::new(tracker);
		let mut rx = tracker.subscribe();

		let handle = tracker.clone().watch(Duration::from_millis(10));
		let published = rx.recv().await.unwrap();
		handle.abort();

		assert_eq!(published, list(&["0xa"]));
		assert!(mock.count(|c| *c == Call::ListAccounts) >= 2);
	}

	#[tokio::test]
	async fn older_fetch_cannot_roll_back_newer_list() {
		let mock = Arc::new(MockProvider::new());
		mock.push_accounts(["0xa"]);
		mock.push_accounts(["0xb"]);
		let (tracker, _) = tracker(&mock);
		let tracker = Arc::new(tracker);
		let mut rx = tracker.subscribe();
		let release = mock.gate_accounts();

		let slow = {
			let tracker = tracker.clone();
			tokio::spawn(async move { tracker.poll().await })
		};
		while mock.count(|c| *c == Call::ListAccounts) == 0 {
			tokio::task::yield_now().await;
		}

		assert_eq!(tracker.poll().await.unwrap(), PollOutcome::Changed(list(&["0xb"])));
		release.send(()).unwrap();
		assert_eq!(slow.await.unwrap().unwrap(), PollOutcome::Unchanged);

		assert_eq!(tracker.active().await.as_deref(), Some("0xb"));
		assert_eq!(rx.try_recv().unwrap(), list(&["0xb"]));
		assert!(rx.try_recv().is_err());
	}

	#[tokio::test]
	async fn background_poll_error_leaves_in_flight_status_writable() {
		let mock = Arc::new(MockProvider::new());
		mock.push_accounts_error("connection refused");
		let (tracker, status) = tracker(&mock);

		let transfer = status.begin();
		status.set(transfer, status::TRANSFER_PENDING).await;

		assert!(tracker.poll_in_background().await.is_err());
		assert_eq!(status.current().await, status::ACCOUNTS_ERROR);

		assert!(status.set(transfer, status::TRANSFER_COMPLETE).await);
		assert_eq!(status.current().await, status::TRANSFER_COMPLETE);
	}
}
