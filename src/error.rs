use std::io;
use std::path::PathBuf;

/// Failures at the boundary of the engine. The engine itself is total.
#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("horizon of {months} months exceeds the limit of {limit}")]
    HorizonTooLong { months: u32, limit: u32 },

    #[error("{iterations} variance iterations exceeds the limit of {limit}")]
    TooManyIterations { iterations: u32, limit: u32 },

    #[error("failed to read scenario file {}: {source}", path.display())]
    ReadScenario {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed JSON input: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("server error: {0}")]
    Server(#[from] io::Error),
}
