pub mod accounts;
pub mod attestation;
pub mod balance;
pub mod cli;
pub mod commands;
pub mod config;
pub mod contracts;
pub mod error;
pub mod logging;
pub mod message;
pub mod provider;
pub mod rpc;
pub mod session;
pub mod status;
pub mod transfer;
pub mod units;

pub use error::{Result, SessionError};
pub use session::Session;
