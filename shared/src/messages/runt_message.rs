use runt_serde::{BitReader, BitWriter, Serde};

use crate::{
    messages::{
        client_batch::ClientBatch, error::CodecError, payload_kinds::PayloadKinds,
        update_batch::UpdateBatch,
    },
    ClientId,
};

/// Everything the replication layer puts on a connection
#[derive(Clone, Debug, PartialEq)]
pub enum RuntMessage {
    /// Source -> Target batches and their acknowledgements, and the tailored
    /// batches a fan-out manager sends each client
    Batch(UpdateBatch),
    /// Fan-out client -> manager progress reports
    ClientBatch(ClientBatch),
    /// Manager -> client, tells a new client which id to tag its reports with
    ClientAssigned(ClientId),
}

impl RuntMessage {
    const BATCH_TAG: u8 = 0;
    const CLIENT_BATCH_TAG: u8 = 1;
    const CLIENT_ASSIGNED_TAG: u8 = 2;

    pub fn name(&self) -> &'static str {
        match self {
            RuntMessage::Batch(_) => "Batch",
            RuntMessage::ClientBatch(_) => "ClientBatch",
            RuntMessage::ClientAssigned(_) => "ClientAssigned",
        }
    }
}

/// Turns `RuntMessage`s into bytes and back, resolving payloads through the
/// registry built by the `Protocol`
pub struct RuntCodec {
    payload_kinds: PayloadKinds,
}

impl RuntCodec {
    pub fn new(payload_kinds: PayloadKinds) -> Self {
        Self { payload_kinds }
    }

    pub fn payload_kinds(&self) -> &PayloadKinds {
        &self.payload_kinds
    }

    pub fn encode(&self, message: &RuntMessage) -> Result<Vec<u8>, CodecError> {
        let mut writer = BitWriter::new();

        match message {
            RuntMessage::Batch(batch) => {
                RuntMessage::BATCH_TAG.ser(&mut writer);
                batch.write(&self.payload_kinds, &mut writer)?;
            }
            RuntMessage::ClientBatch(batch) => {
                RuntMessage::CLIENT_BATCH_TAG.ser(&mut writer);
                batch.write(&self.payload_kinds, &mut writer)?;
            }
            RuntMessage::ClientAssigned(client) => {
                RuntMessage::CLIENT_ASSIGNED_TAG.ser(&mut writer);
                client.ser(&mut writer);
            }
        }

        Ok(writer.to_bytes())
    }

    /// Decodes one packet. Payloads that cannot be decoded are dropped from
    /// their batch rather than failing the whole packet.
    pub fn decode(&self, bytes: &[u8]) -> Result<RuntMessage, CodecError> {
        let mut reader = BitReader::new(bytes);

        let tag = u8::de(&mut reader)?;
        let message = match tag {
            RuntMessage::BATCH_TAG => {
                RuntMessage::Batch(UpdateBatch::read(&self.payload_kinds, &mut reader)?)
            }
            RuntMessage::CLIENT_BATCH_TAG => {
                RuntMessage::ClientBatch(ClientBatch::read(&self.payload_kinds, &mut reader)?)
            }
            RuntMessage::CLIENT_ASSIGNED_TAG => {
                RuntMessage::ClientAssigned(ClientId::de(&mut reader)?)
            }
            tag => return Err(CodecError::UnknownMessageTag { tag }),
        };

        let trailing = reader.bytes_remaining();
        if trailing > 0 {
            return Err(CodecError::TrailingBytes { count: trailing });
        }

        Ok(message)
    }
}
