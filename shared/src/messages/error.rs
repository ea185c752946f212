use runt_serde::SerdeErr;
use thiserror::Error;

/// Errors raised by the payload registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadKindsError {
    /// The payload type was never registered with the Protocol
    #[error("Payload type {type_name} is not registered. Payload types must be registered with Protocol via add_payload()")]
    UnregisteredPayload { type_name: &'static str },

    /// A kind arrived on the wire that this side does not know about
    #[error("Payload kind {kind} not found in payload registry")]
    UnknownKind { kind: u16 },

    /// The payload bytes could not be decoded as the registered type
    #[error("Malformed {type_name} payload: {error}")]
    Malformed {
        type_name: &'static str,
        error: SerdeErr,
    },

    /// More than u16::MAX payload types were registered
    #[error("Payload registry is full")]
    TooManyKinds,
}

/// Errors raised while encoding or decoding runt wire messages
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// First byte of a packet is not a known RuntMessage tag
    #[error("Unknown runt message tag {tag}. This may indicate a malformed or malicious packet")]
    UnknownMessageTag { tag: u8 },

    /// The envelope itself could not be read (truncated frame or count)
    #[error("Malformed runt envelope: {0}")]
    Serde(#[from] SerdeErr),

    /// A payload could not be encoded
    #[error("Payload error: {0}")]
    PayloadKinds(#[from] PayloadKindsError),

    /// A payload frame is larger than the wire format allows
    #[error("Payload of {size} bytes does not fit in a u32 length prefix")]
    PayloadTooLarge { size: usize },

    /// Bytes were left over after the message was fully read
    #[error("{count} trailing bytes after runt message")]
    TrailingBytes { count: usize },
}
