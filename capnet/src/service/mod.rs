pub mod local;
pub mod provider;
pub mod remote;

pub use local::LocalSolver;
pub use provider::{ConfigProvider, ProviderInfo};
pub use remote::RemoteSolver;

use thiserror::Error;

use crate::core::CapnetError;

/// Every way a find-config call can fail, as seen by a caller.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP error! status: {status}, body: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("Error from server: {0}")]
    Server(String),
    #[error("Unexpected response status '{0}' from server")]
    UnexpectedStatus(String),
    #[error("Failed to parse response: {0}")]
    Decode(String),
    #[error(transparent)]
    Solver(#[from] CapnetError),
}
