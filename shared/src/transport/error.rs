use thiserror::Error;

use crate::{messages::error::CodecError, ConnectionKey};

/// Errors a transport can report back from `deliver`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The connection is not (or no longer) part of the set
    #[error("Unknown connection {connection}")]
    UnknownConnection { connection: ConnectionKey },

    /// The message could not be encoded for the wire
    #[error("Failed to encode message for {connection}: {error}")]
    Encode {
        connection: ConnectionKey,
        error: CodecError,
    },

    /// The underlying link is closed
    #[error("Connection {connection} is closed")]
    Closed { connection: ConnectionKey },
}
