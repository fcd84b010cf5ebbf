//! Error types for recordmap-core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("{kind}: identity cannot be nil (missing component `{component}`)")]
    Identity { kind: String, component: String },

    #[error("{kind}: identity component `{component}` must be an int, string or bool, got {got}")]
    InvalidIdentity {
        kind: String,
        component: String,
        got: String,
    },

    #[error("No model definition for kind: {0}")]
    Resolution(String),

    #[error("Cannot coerce {kind}.{attribute}: expected {expected}, got {got}")]
    Coercion {
        kind: String,
        attribute: String,
        expected: String,
        got: String,
    },

    #[error("Duplicate attribute `{name}` on {kind}")]
    DuplicateAttribute { kind: String, name: String },

    #[error("Duplicate definition: {0}")]
    DuplicateDefinition(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
