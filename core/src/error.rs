//! Error types for the deck API client.
//!
//! # Design
//! Two layers. `StructureError` covers turning a normalized JSON value into a
//! typed record and knows nothing about HTTP. `DeckError` is what every client
//! call returns; structuring failures are carried through it unchanged via
//! `#[from]`, so callers can still match on the exact structuring variant.

/// Failures raised while structuring a normalized JSON value into a type.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StructureError {
    /// A field without a default was absent from the input mapping.
    #[error("missing required field `{field}` on {record}")]
    MissingField {
        record: &'static str,
        field: &'static str,
    },

    /// The value had the wrong JSON shape, e.g. a mapping where a sequence
    /// was expected.
    #[error("expected {expected}, found {found}")]
    Type {
        expected: &'static str,
        found: &'static str,
    },

    /// A scalar was the right shape but its content could not be parsed.
    #[error("cannot parse {value:?} as {target}")]
    Parse { target: &'static str, value: String },

    /// The target type is only constructible through a converter hook and the
    /// converter in use has none registered for it.
    #[error("no converter registered for {target}")]
    NoConverter { target: &'static str },
}

/// Errors returned by `DeckClient` operations.
#[derive(Debug, thiserror::Error)]
pub enum DeckError {
    /// The request never produced a response: connection refused, TLS
    /// handshake failure, broken body stream.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status and raise-on-error is on.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The response body was not valid JSON.
    #[error("response body is not valid JSON: {0}")]
    Decode(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The client configuration is incomplete or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The decoded body did not match the expected record shape.
    #[error(transparent)]
    Structure(#[from] StructureError),
}

impl DeckError {
    /// Whether the server reported that the addressed resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DeckError::HttpStatus { status: 404, .. })
    }

    /// Whether this error originated below the JSON layer (network or status).
    pub fn is_transport(&self) -> bool {
        matches!(self, DeckError::Transport(_) | DeckError::HttpStatus { .. })
    }
}
