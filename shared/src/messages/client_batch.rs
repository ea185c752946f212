use runt_serde::{BitReader, BitWrite, Serde};

use crate::{
    messages::{
        error::CodecError,
        payload_kinds::PayloadKinds,
        update_message::{read_messages, write_messages, UpdateMessage},
    },
    ClientId, Sequence,
};

/// A fan-out client's progress report: the last server sequence it accepted,
/// plus any updates it has for objects on the server
#[derive(Clone, Debug, PartialEq)]
pub struct ClientBatch {
    pub client: ClientId,
    pub sequence: Sequence,
    pub messages: Vec<UpdateMessage>,
}

impl ClientBatch {
    pub fn new(client: ClientId, sequence: Sequence, messages: Vec<UpdateMessage>) -> Self {
        Self {
            client,
            sequence,
            messages,
        }
    }

    /// Writes `[client][sequence][count][messages]`
    pub fn write(
        &self,
        payload_kinds: &PayloadKinds,
        writer: &mut dyn BitWrite,
    ) -> Result<(), CodecError> {
        self.client.ser(writer);
        self.sequence.ser(writer);
        write_messages(&self.messages, payload_kinds, writer)
    }

    pub fn read(payload_kinds: &PayloadKinds, reader: &mut BitReader) -> Result<Self, CodecError> {
        let client = ClientId::de(reader)?;
        let sequence = Sequence::de(reader)?;
        let messages = read_messages(payload_kinds, reader)?;
        Ok(Self {
            client,
            sequence,
            messages,
        })
    }
}
