use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

pub const TRANSFER_PENDING: &str = "Initiating transaction... (please wait)";
pub const TRANSFER_FAILED: &str = "Transaction failed!";
pub const TRANSFER_COMPLETE: &str = "Transaction complete!";
pub const TRANSFER_ERROR: &str = "Error sending coin; see log.";
pub const TOKEN_NOT_LOADED: &str = "Token contract is not loaded, unable to send transaction";
pub const BALANCE_ERROR: &str = "Error getting balance; see log.";
pub const ACCOUNTS_ERROR: &str = "There was an error fetching your accounts.";
pub const NO_ACCOUNTS: &str =
	"Couldn't get any accounts! Make sure your Ethereum client is configured correctly.";
pub const NO_ACTIVE_ACCOUNT: &str = "No active account; refresh accounts first.";

/// Sequence number of one user-initiated operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Default)]
struct Current {
	message: String,
	applied: u64,
}

/// The single human-readable status line of a session.
///
/// Each operation takes a [`Ticket`] when it starts and tags its updates
/// with it.  An update is applied only if its ticket is not older than the
/// last applied one, so a slow, earlier request can never overwrite the
/// status of a newer request that already resolved.
#[derive(Clone, Default)]
pub struct StatusBoard {
	current: Arc<RwLock<Current>>,
	issued: Arc<AtomicU64>,
}

impl StatusBoard {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn begin(&self) -> Ticket {
		Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
	}

	/// Ticket of the most recently started operation.  Reporting under it
	/// does not supersede an operation that is still in flight.
	pub fn latest(&self) -> Ticket {
		Ticket(self.issued.load(Ordering::SeqCst))
	}

	/// Apply `message` unless a newer operation already reported.
	/// Returns whether the update was applied.
	pub async fn set(&self, ticket: Ticket, message: impl Into<String>) -> bool {
		let message = message.into();
		let mut current = self.current.write().await;
		if ticket.0 < current.applied {
			debug!(ticket = ticket.0, applied = current.applied, %message, "stale status dropped");
			return false;
		}
		debug!(ticket = ticket.0, %message, "status");
		current.applied = ticket.0;
		current.message = message;
		true
	}

	pub async fn current(&self) -> String {
		self.current.read().await.message.clone()
	}
}
