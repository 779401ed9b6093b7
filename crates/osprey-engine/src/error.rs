use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] osprey_core::Error),

    /// The scoring/recommendation stage rejected the aggregated results.
    /// Fatal to the run: the audit is marked failed and nothing derived
    /// from the malformed data is kept.
    #[error("Synthesis failed: {0}")]
    Synthesis(String),
}

pub type Result<T> = std::result::Result<T, Error>;
