use std::{any::TypeId, collections::HashMap};

use runt_serde::{BitReader, BitWrite, ConstBitLength, Serde, SerdeErr};

use crate::messages::{error::PayloadKindsError, payload::Payload};

type DecodeFn = fn(&mut BitReader) -> Result<Box<dyn Payload>, SerdeErr>;

/// Stable numeric tag written in front of every payload on the wire
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PayloadKind(u16);

impl PayloadKind {
    pub fn to_u16(self) -> u16 {
        self.0
    }
}

impl Serde for PayloadKind {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.0.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self(u16::de(reader)?))
    }

    fn bit_length(&self) -> u32 {
        <Self as ConstBitLength>::const_bit_length()
    }
}

impl ConstBitLength for PayloadKind {
    fn const_bit_length() -> u32 {
        <u16 as ConstBitLength>::const_bit_length()
    }
}

struct PayloadEntry {
    name: &'static str,
    decode: DecodeFn,
}

fn decode_payload<P: Serde + Payload>(reader: &mut BitReader) -> Result<Box<dyn Payload>, SerdeErr> {
    let payload = P::de(reader)?;
    Ok(Box::new(payload))
}

/// Registry resolving payload types to wire kinds and back
pub struct PayloadKinds {
    next_kind: u16,
    kind_map: HashMap<TypeId, PayloadKind>,
    entries: HashMap<PayloadKind, PayloadEntry>,
}

impl PayloadKinds {
    pub fn new() -> Self {
        Self {
            next_kind: 0,
            kind_map: HashMap::new(),
            entries: HashMap::new(),
        }
    }

    /// Registers `P`, assigning it the next free kind. Registering the same
    /// type twice keeps its original kind.
    pub fn add_payload<P: Serde + Payload>(&mut self) -> Result<PayloadKind, PayloadKindsError> {
        let type_id = TypeId::of::<P>();
        if let Some(kind) = self.kind_map.get(&type_id) {
            return Ok(*kind);
        }

        let kind = PayloadKind(self.next_kind);
        self.next_kind = self
            .next_kind
            .checked_add(1)
            .ok_or(PayloadKindsError::TooManyKinds)?;

        self.kind_map.insert(type_id, kind);
        self.entries.insert(
            kind,
            PayloadEntry {
                name: std::any::type_name::<P>(),
                decode: decode_payload::<P>,
            },
        );

        Ok(kind)
    }

    pub fn kind_of(&self, payload: &dyn Payload) -> Result<PayloadKind, PayloadKindsError> {
        self.kind_map
            .get(&payload.as_any().type_id())
            .copied()
            .ok_or(PayloadKindsError::UnregisteredPayload {
                type_name: payload.type_name(),
            })
    }

    pub fn name_of(&self, kind: PayloadKind) -> Option<&'static str> {
        self.entries.get(&kind).map(|entry| entry.name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes `[kind][payload bits]`
    pub fn write(
        &self,
        payload: &dyn Payload,
        writer: &mut dyn BitWrite,
    ) -> Result<(), PayloadKindsError> {
        let kind = self.kind_of(payload)?;
        kind.ser(writer);
        payload.write(writer);
        Ok(())
    }

    /// Decodes the body of a payload whose kind has already been read
    pub fn read_body(
        &self,
        kind: PayloadKind,
        reader: &mut BitReader,
    ) -> Result<Box<dyn Payload>, PayloadKindsError> {
        let entry = self
            .entries
            .get(&kind)
            .ok_or(PayloadKindsError::UnknownKind { kind: kind.0 })?;

        (entry.decode)(reader).map_err(|error| PayloadKindsError::Malformed {
            type_name: entry.name,
            error,
        })
    }

    /// Reads `[kind][payload bits]`
    pub fn read(&self, reader: &mut BitReader) -> Result<Box<dyn Payload>, PayloadKindsError> {
        let kind = PayloadKind::de(reader).map_err(|error| PayloadKindsError::Malformed {
            type_name: "PayloadKind",
            error,
        })?;
        self.read_body(kind, reader)
    }
}

impl Default for PayloadKinds {
    fn default() -> Self {
        Self::new()
    }
}
