use thiserror::Error;

/// Errors that can occur while reading values back out of a bit stream
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// The reader ran out of bits before the value was complete
    #[error("Unexpected end of stream: needed more bits than the {bytes_len} byte buffer holds")]
    UnexpectedEnd { bytes_len: usize },

    /// The decoded bits do not form a valid value of the requested type
    #[error("Invalid value while decoding {type_name}")]
    InvalidValue { type_name: &'static str },
}
