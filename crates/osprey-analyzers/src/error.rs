use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Target unreachable over https and http: {0}")]
    Unreachable(String),

    #[error("Unexpected response: {0}")]
    BadResponse(String),
}

pub type Result<T> = std::result::Result<T, Error>;
