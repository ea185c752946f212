use crate::{BitReader, BitWrite, SerdeErr};

/// A type that can be written to and read back from a bit stream
pub trait Serde: Sized + Clone + PartialEq {
    /// Writes the value into the stream
    fn ser(&self, writer: &mut dyn BitWrite);

    /// Parses a value out of the stream
    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr>;

    /// Number of bits `ser` will write for this value
    fn bit_length(&self) -> u32;
}

/// A type whose encoded size does not depend on its value
pub trait ConstBitLength {
    fn const_bit_length() -> u32;
}
