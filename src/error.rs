//! # Error Types
//!
//! Errors are split by where they end up:
//!
//! - [`LoadError`] describes why a single asset failed to load. It is stored on the
//!   cache entry for that asset and never propagated further.
//! - [`TransitionError`] is returned when an event does not fit the current state of
//!   a cache entry (a stale or out-of-order loader callback).
//! - [`StageError`] covers setup problems such as bad configuration.

use std::path::PathBuf;

use thiserror::Error;

use crate::assets::{cache::LoadStatus, resolver::ResourceKey};

/// Result type alias for stage setup operations
pub type Result<T> = std::result::Result<T, StageError>;

/// Failure reported by an asset loader for one resource key
#[derive(Error, Debug)]
pub enum LoadError {
    /// The resolved file does not exist under the asset root
    #[error("asset file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Reading the file failed part way
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The key does not name a format any decoder understands
    #[error("unsupported model format for {key}")]
    UnsupportedFormat { key: ResourceKey },

    /// The bytes were read but could not be decoded
    #[error("failed to decode {key}: {reason}")]
    Decode { key: ResourceKey, reason: String },

    /// The loader dropped its completion handle without reporting a result
    #[error("loader for {key} went away before completing")]
    Disconnected { key: ResourceKey },

    /// Free-form failure from a custom loader
    #[error("{0}")]
    Loader(String),
}

impl LoadError {
    /// Create a free-form loader error
    pub fn loader(msg: impl Into<String>) -> Self {
        Self::Loader(msg.into())
    }
}

/// An event that the load state machine refused to apply
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// The event names a key that was never requested
    #[error("no cache entry for {0}")]
    UnknownKey(ResourceKey),

    /// The event is not valid for the entry's current status
    #[error("cannot apply {event} to {key} while {status:?}")]
    InvalidTransition {
        key: ResourceKey,
        status: LoadStatus,
        event: &'static str,
    },
}

/// Setup errors for a stage
#[derive(Error, Debug)]
pub enum StageError {
    /// An environment variable held a value that could not be used
    #[error("invalid configuration in {var}: {reason}")]
    Config { var: &'static str, reason: String },

    /// The loader worker pool could not be started
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StageError {
    /// Create a configuration error
    pub fn config(var: &'static str, reason: impl Into<String>) -> Self {
        Self::Config {
            var,
            reason: reason.into(),
        }
    }
}
