use crate::{BitReader, BitWrite, ConstBitLength, Serde, SerdeErr};

// Fixed-width numbers are written as little-endian bytes

macro_rules! impl_serde_for_number {
    ($($ty:ty),*) => {$(
        impl Serde for $ty {
            fn ser(&self, writer: &mut dyn BitWrite) {
                writer.write_bytes(&self.to_le_bytes());
            }

            fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
                let mut bytes = [0u8; std::mem::size_of::<$ty>()];
                for byte in bytes.iter_mut() {
                    *byte = reader.read_byte()?;
                }
                Ok(<$ty>::from_le_bytes(bytes))
            }

            fn bit_length(&self) -> u32 {
                <Self as ConstBitLength>::const_bit_length()
            }
        }

        impl ConstBitLength for $ty {
            fn const_bit_length() -> u32 {
                (std::mem::size_of::<$ty>() as u32) * 8
            }
        }
    )*};
}

impl_serde_for_number!(u8, u16, u32, u64, u128, i16, i32, i64, f32, f64);

// bool

impl Serde for bool {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_bit(*self);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        reader.read_bit()
    }

    fn bit_length(&self) -> u32 {
        1
    }
}

impl ConstBitLength for bool {
    fn const_bit_length() -> u32 {
        1
    }
}

// String

impl Serde for String {
    fn ser(&self, writer: &mut dyn BitWrite) {
        let length = self.len() as u32;
        length.ser(writer);
        writer.write_bytes(self.as_bytes());
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let length = u32::de(reader)? as usize;
        let bytes = reader.read_bytes(length)?;
        String::from_utf8(bytes).map_err(|_| SerdeErr::InvalidValue {
            type_name: "String",
        })
    }

    fn bit_length(&self) -> u32 {
        32 + (self.len() as u32) * 8
    }
}

// Option

impl<T: Serde> Serde for Option<T> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        match self {
            Some(value) => {
                writer.write_bit(true);
                value.ser(writer);
            }
            None => writer.write_bit(false),
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        if reader.read_bit()? {
            Ok(Some(T::de(reader)?))
        } else {
            Ok(None)
        }
    }

    fn bit_length(&self) -> u32 {
        1 + self.as_ref().map_or(0, Serde::bit_length)
    }
}

// Vec

impl<T: Serde> Serde for Vec<T> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        let count = self.len() as u32;
        count.ser(writer);
        for item in self {
            item.ser(writer);
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let count = u32::de(reader)? as usize;
        // every element takes at least one bit, so cap the preallocation
        let mut output = Vec::with_capacity(count.min(reader.bytes_remaining() * 8));
        for _ in 0..count {
            output.push(T::de(reader)?);
        }
        Ok(output)
    }

    fn bit_length(&self) -> u32 {
        32 + self.iter().map(Serde::bit_length).sum::<u32>()
    }
}

// Tuples

impl<A: Serde, B: Serde> Serde for (A, B) {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.0.ser(writer);
        self.1.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok((A::de(reader)?, B::de(reader)?))
    }

    fn bit_length(&self) -> u32 {
        self.0.bit_length() + self.1.bit_length()
    }
}
