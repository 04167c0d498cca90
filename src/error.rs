use thiserror::Error;

/// Every failure a session component can report.
///
/// None of these escape a workflow as a fault: each is raised at the
/// provider call site, recorded as a status or sentinel, and handed back
/// to the caller as a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
	#[error("provider unreachable: {0}")]
	Provider(String),

	#[error("no accounts available from the provider")]
	NoAccounts,

	#[error("balance query failed: {0}")]
	BalanceQuery(String),

	#[error("not ready: {0}")]
	NotReady(String),

	#[error("transfer failed: {0}")]
	Transfer(String),

	#[error("signing failed: {0}")]
	Signing(String),

	#[error("signer recovery failed: {0}")]
	Recovery(String),

	#[error("attestation was replaced by a newer signing or verification")]
	Superseded,

	#[error("configuration error: {0}")]
	Config(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;
