use std::fmt;

use runt_serde::{BitReader, BitWrite, ConstBitLength, Serde, SerdeErr};

/// Routing key between a provider/updater on the sending side and the
/// handler for the same object on the receiving side.
///
/// One is generated per replicated object. 128 random bits are drawn, so two
/// objects sharing an `Identity` is not a practical concern.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(u128);

impl Identity {
    pub fn generate() -> Self {
        Self(fastrand::u128(..))
    }

    pub fn from_u128(value: u128) -> Self {
        Self(value)
    }

    pub fn to_u128(&self) -> u128 {
        self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self)
    }
}

impl Serde for Identity {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.0.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self(u128::de(reader)?))
    }

    fn bit_length(&self) -> u32 {
        <Self as ConstBitLength>::const_bit_length()
    }
}

impl ConstBitLength for Identity {
    fn const_bit_length() -> u32 {
        <u128 as ConstBitLength>::const_bit_length()
    }
}
