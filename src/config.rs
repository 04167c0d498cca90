use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::provider::json_rpc::ReceiptPolling;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
	pub network: NetworkConfig,
	pub token: TokenConfig,
	#[serde(default)]
	pub tracker: TrackerConfig,
	#[serde(default)]
	pub transfer: TransferConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
	pub rpc_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
	pub address: Option<String>,
	#[serde(default = "default_decimals")]
	pub decimals: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
	pub poll_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
	pub receipt_poll_interval_ms: u64,
	pub receipt_attempts: u32,
}

fn default_decimals() -> u8 {
	18
}

impl Default for TrackerConfig {
	fn default() -> Self {
		Self { poll_interval_secs: 1 }
	}
}

impl Default for TransferConfig {
	fn default() -> Self {
		Self {
			receipt_poll_interval_ms: 500,
			receipt_attempts: 60,
		}
	}
}

impl Default for Config {
	fn default() -> Self {
		Self {
			network: NetworkConfig {
				rpc_url: "http://127.0.0.1:8545".into(),
			},
			token: TokenConfig {
				address: None,
				decimals: default_decimals(),
			},
			tracker: TrackerConfig::default(),
			transfer: TransferConfig::default(),
		}
	}
}

impl Config {
	/// Directory where CLI state is stored (~/.meta-sender/).
	pub fn dir() -> Result<PathBuf, SessionError> {
		dirs::home_dir()
			.map(|home| home.join(".meta-sender"))
			.ok_or_else(|| SessionError::Config("could not determine home directory".into()))
	}

	/// Path to the config file.
	pub fn path() -> Result<PathBuf, SessionError> {
		Ok(Self::dir()?.join("config.toml"))
	}

	/// Load config from disk, falling back to defaults if no file exists.
	pub fn load() -> anyhow::Result<Self> {
		Self::load_from(&Self::path()?)
	}

	pub fn load_from(path: &Path) -> anyhow::Result<Self> {
		if path.exists() {
			let content = std::fs::read_to_string(path)?;
			Ok(toml::from_str(&content)?)
		} else {
			Ok(Self::default())
		}
	}

	/// Persist the current config to disk, creating the directory if needed.
	pub fn save(&self) -> anyhow::Result<()> {
		self.save_to(&Self::path()?)
	}

	pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(path, toml::to_string_pretty(self)?)?;
		Ok(())
	}

	pub fn poll_interval(&self) -> Duration {
		Duration::from_secs(self.tracker.poll_interval_secs.max(1))
	}

	pub fn receipt_polling(&self) -> ReceiptPolling {
		ReceiptPolling {
			interval: Duration::from_millis(self.transfer.receipt_poll_interval_ms),
			attempts: self.transfer.receipt_attempts,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_are_sensible() {
		let c = Config::default();
		assert_eq!(c.network.rpc_url, "http://127.0.0.1:8545");
		assert!(c.token.address.is_none());
		assert_eq!(c.token.decimals, 18);
		assert_eq!(c.poll_interval(), Duration::from_secs(1));
		assert_eq!(c.receipt_polling().attempts, 60);
	}

	#[test]
	fn save_and_load_through_a_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("nested").join("config.toml");

		let mut c = Config::default();
		c.token.address = Some("0x5fbdb2315678afecb367f032d93f642f64180aa3".into());
		c.token.decimals = 6;
		c.save_to(&path).unwrap();

		let parsed = Config::load_from(&path).unwrap();
		assert_eq!(parsed.token.address, c.token.address);
		assert_eq!(parsed.token.decimals, 6);
	}

	#[test]
	fn missing_file_yields_defaults() {
		let dir = tempfile::tempdir().unwrap();
		let c = Config::load_from(&dir.path().join("absent.toml")).unwrap();
		assert_eq!(c.network.rpc_url, Config::default().network.rpc_url);
	}

	#[test]
	fn optional_sections_may_be_omitted() {
		let c: Config = toml::from_str(
			r#"
			[network]
			rpc_url = "http://localhost:7545"

			[token]
			address = "0x5fbdb2315678afecb367f032d93f642f64180aa3"
			"#,
		)
		.unwrap();
		assert_eq!(c.network.rpc_url, "http://localhost:7545");
		assert_eq!(c.token.decimals, 18);
		assert_eq!(c.tracker.poll_interval_secs, 1);
		assert_eq!(c.transfer.receipt_attempts, 60);
	}
}
