//! Error types for generation and configuration

use thiserror::Error;

use crate::geom::Rect;

/// Failures that abort [`crate::mapgen::Generator::generate`].
/// No partial map is ever returned alongside one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    #[error("failed to place required room #{index} ({width}x{height}) after {attempts} attempts")]
    RequiredRoomPlacement {
        index: usize,
        width: i32,
        height: i32,
        attempts: usize,
    },

    #[error("failed to connect room #{index} at {bounds:?} to the maze")]
    HallwayConnection { index: usize, bounds: Rect },
}

/// Problems loading or validating a [`crate::config::MapConfig`]
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {message}")]
    Invalid { message: String },
}
