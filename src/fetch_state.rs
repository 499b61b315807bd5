//! Shared fetch state and errors
//!
//! Used by both WASM and native HTTP clients.

/// Lifecycle of one HTTP fetch
#[derive(Clone, Debug, Default, PartialEq)]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

impl FetchState {
    pub fn is_loaded(&self) -> bool {
        matches!(self, FetchState::Loaded)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, FetchState::Idle | FetchState::Loading)
    }

    pub fn label(&self) -> &'static str {
        match self {
            FetchState::Idle => "Idle",
            FetchState::Loading => "Loading...",
            FetchState::Loaded => "Loaded",
            FetchState::Failed(_) => "Failed",
        }
    }

    pub fn from_result<T>(result: &Result<T, FetchError>) -> Self {
        match result {
            Ok(_) => FetchState::Loaded,
            Err(e) => FetchState::Failed(e.to_string()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("could not read body of {url}: {reason}")]
    Body { url: String, reason: String },
}
