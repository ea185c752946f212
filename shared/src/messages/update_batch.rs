use runt_serde::{BitReader, BitWrite, Serde};

use crate::{
    messages::{
        error::CodecError,
        payload_kinds::PayloadKinds,
        update_message::{read_messages, write_messages, UpdateMessage},
    },
    Sequence,
};

/// Every update a sender has for one receiver at one tick.
///
/// An empty batch is still meaningful: it advances the receiver's sequence,
/// and it is also what a receiver sends back as an acknowledgement.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateBatch {
    pub sequence: Sequence,
    pub messages: Vec<UpdateMessage>,
}

impl UpdateBatch {
    pub fn new(sequence: Sequence, messages: Vec<UpdateMessage>) -> Self {
        Self { sequence, messages }
    }

    pub fn ack(sequence: Sequence) -> Self {
        Self {
            sequence,
            messages: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Writes `[sequence][count][messages]`
    pub fn write(
        &self,
        payload_kinds: &PayloadKinds,
        writer: &mut dyn BitWrite,
    ) -> Result<(), CodecError> {
        self.sequence.ser(writer);
        write_messages(&self.messages, payload_kinds, writer)
    }

    pub fn read(payload_kinds: &PayloadKinds, reader: &mut BitReader) -> Result<Self, CodecError> {
        let sequence = Sequence::de(reader)?;
        let messages = read_messages(payload_kinds, reader)?;
        Ok(Self { sequence, messages })
    }
}
