//! Error kinds for the engine.
//!
//! Every fallible engine operation returns `Result<_, EngineError>`
//! rather than panicking; the scheduler collects per-task results and
//! reports the first failure at the phase barrier instead of cancelling
//! sibling tasks.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("store error: {0}")]
    Store(String),

    #[error("fetching {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("fetch of {url} returned status {status}")]
    FetchStatus { url: String, status: u16 },

    #[error("http serve error: {0}")]
    HttpServe(String),

    #[error("split error: {0}")]
    Split(String),

    #[error("map callback error: {0}")]
    MapUser(String),

    #[error("reduce callback error: {0}")]
    ReduceUser(String),

    #[error("writing map output: {0}")]
    MapOutput(String),

    #[error("writing reduce output: {0}")]
    ReduceOutput(String),

    #[error("grouping error: {0}")]
    Grouping(String),

    #[error("merge error: {0}")]
    Merge(String),

    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<rusqlite::Error> for EngineError {
    fn from(e: rusqlite::Error) -> EngineError {
        EngineError::Store(e.to_string())
    }
}

impl EngineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> EngineError {
        EngineError::Io {
            path: path.into(),
            source,
        }
    }
}
