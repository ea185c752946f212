use log::warn;

use runt_serde::{BitReader, BitWrite, BitWriter, Serde};

use crate::{
    messages::{
        error::CodecError,
        payload::Payload,
        payload_kinds::{PayloadKind, PayloadKinds},
    },
    Identity,
};

/// A payload addressed to the handler registered under `target`
#[derive(Clone, Debug)]
pub struct UpdateMessage {
    pub target: Identity,
    pub payload: Box<dyn Payload>,
}

impl PartialEq for UpdateMessage {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target && *self.payload == *other.payload
    }
}

impl UpdateMessage {
    pub fn new<P: Payload>(target: Identity, payload: P) -> Self {
        Self {
            target,
            payload: Box::new(payload),
        }
    }

    pub fn from_boxed(target: Identity, payload: Box<dyn Payload>) -> Self {
        Self { target, payload }
    }

    pub fn payload_as<P: Payload>(&self) -> Option<&P> {
        self.payload.downcast_ref::<P>()
    }

    /// Writes `[target][kind][payload length][payload bytes]`
    pub fn write(
        &self,
        payload_kinds: &PayloadKinds,
        writer: &mut dyn BitWrite,
    ) -> Result<(), CodecError> {
        let kind = payload_kinds.kind_of(self.payload.as_ref())?;

        let mut payload_writer = BitWriter::new();
        self.payload.write(&mut payload_writer);
        let payload_bytes = payload_writer.to_bytes();
        let payload_len = u32::try_from(payload_bytes.len()).map_err(|_| {
            CodecError::PayloadTooLarge {
                size: payload_bytes.len(),
            }
        })?;

        self.target.ser(writer);
        kind.ser(writer);
        payload_len.ser(writer);
        writer.write_bytes(&payload_bytes);

        Ok(())
    }

    /// Reads one framed Update Message.
    ///
    /// A payload of unknown kind, or one whose bytes do not decode, comes back
    /// as `Ok(None)`: the frame length has already been consumed, so the rest
    /// of the stream stays readable. Only a truncated frame is an error.
    pub fn read(
        payload_kinds: &PayloadKinds,
        reader: &mut BitReader,
    ) -> Result<Option<Self>, CodecError> {
        let target = Identity::de(reader)?;
        let kind = PayloadKind::de(reader)?;
        let payload_len = u32::de(reader)? as usize;
        let payload_bytes = reader.read_bytes(payload_len)?;

        let mut payload_reader = BitReader::new(&payload_bytes);
        match payload_kinds.read_body(kind, &mut payload_reader) {
            Ok(payload) => Ok(Some(Self { target, payload })),
            Err(error) => {
                warn!(
                    "Dropping {} update for {}: {}",
                    payload_kinds.name_of(kind).unwrap_or("unknown"),
                    target,
                    error
                );
                Ok(None)
            }
        }
    }
}

pub(crate) fn write_messages(
    messages: &[UpdateMessage],
    payload_kinds: &PayloadKinds,
    writer: &mut dyn BitWrite,
) -> Result<(), CodecError> {
    // a payload the registry can't name is left out, the rest still go
    let encodable: Vec<&UpdateMessage> = messages
        .iter()
        .filter(|message| match payload_kinds.kind_of(message.payload.as_ref()) {
            Ok(_) => true,
            Err(error) => {
                warn!("Leaving update for {} out of batch: {}", message.target, error);
                false
            }
        })
        .collect();

    let count = u32::try_from(encodable.len()).map_err(|_| CodecError::PayloadTooLarge {
        size: encodable.len(),
    })?;
    count.ser(writer);
    for message in encodable {
        message.write(payload_kinds, writer)?;
    }
    Ok(())
}

pub(crate) fn read_messages(
    payload_kinds: &PayloadKinds,
    reader: &mut BitReader,
) -> Result<Vec<UpdateMessage>, CodecError> {
    let count = u32::de(reader)? as usize;

    // smallest possible frame is 22 bytes, don't trust `count` beyond that
    let mut messages = Vec::with_capacity(count.min(reader.bytes_remaining() / 22));
    for _ in 0..count {
        if let Some(message) = UpdateMessage::read(payload_kinds, reader)? {
            messages.push(message);
        }
    }
    Ok(messages)
}
