use std::path::PathBuf;

use thiserror::Error;

/// Error returned by user hooks and type synthesizers.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T> = std::result::Result<T, GenerateError>;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(
        "conflicting `{setting}` for output file {}: `{first}` vs `{second}`",
        path.display()
    )]
    ConflictingSetting {
        path: PathBuf,
        setting: &'static str,
        first: String,
        second: String,
    },

    /// The backend answered with a non-zero `errcode`.
    #[error("{message} [url: {url}] [query: {query}]")]
    Upstream {
        url: String,
        query: String,
        message: String,
    },

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("hook `{hook}` failed: {source}")]
    Hook {
        hook: &'static str,
        #[source]
        source: HookError,
    },

    #[error("type synthesis failed for `{type_name}`: {source}")]
    Synthesis {
        type_name: String,
        #[source]
        source: HookError,
    },

    #[error("backend adapter for {server_url} failed: {message}")]
    Adapter { server_url: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GenerateError {
    pub fn hook(hook: &'static str, source: HookError) -> Self {
        GenerateError::Hook { hook, source }
    }
}
