//! Error types for the gateway protocol library.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Errors raised by the codec layer.
///
/// Inbound lines never produce an error: malformed input is classified as
/// [`crate::Event::Unknown`] instead. Errors only come from the underlying
/// stream or from outbound data that cannot be put on the wire.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// An I/O error occurred on the underlying stream.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// An outbound command contained a character that cannot be sent.
    #[error("illegal control character in outbound command: {0:?}")]
    IllegalControlChar(char),

    /// An outbound command had no verb.
    #[error("outbound command has an empty verb")]
    EmptyVerb,
}
