use ipswarm_core::ConfigError;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid host {host:?}: {reason}")]
    InvalidHost { host: String, reason: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} answered with {status}")]
    Status { url: String, status: StatusCode },
}
