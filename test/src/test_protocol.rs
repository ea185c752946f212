//! Payloads shared by the integration tests

use runt_shared::{BitReader, BitWrite, Protocol, Serde, SerdeErr};

#[derive(Clone, Debug, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Serde for Position {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.x.ser(writer);
        self.y.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            x: f32::de(reader)?,
            y: f32::de(reader)?,
        })
    }

    fn bit_length(&self) -> u32 {
        self.x.bit_length() + self.y.bit_length()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Health(pub u32);

impl Serde for Health {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.0.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self(u32::de(reader)?))
    }

    fn bit_length(&self) -> u32 {
        self.0.bit_length()
    }
}

pub fn protocol() -> Protocol {
    Protocol::builder()
        .add_payload::<Position>()
        .add_payload::<Health>()
        .build()
}
