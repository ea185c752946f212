//! # Runt Shared
//! Common functionality shared between runt-server & runt-client crates:
//! the wire envelopes, the payload registry, the retention buffer and the
//! capability traits that replicated objects implement.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use runt_serde::{
    BitCounter, BitReader, BitWrite, BitWriter, ConstBitLength, Serde, SerdeErr,
};

mod clock;
mod host;
mod identity;
mod messages;
mod protocol;
mod retention_buffer;
mod transport;
mod types;
mod update;

pub use clock::{FixedClock, NetworkClock};
pub use host::{AttachError, Host};
pub use identity::Identity;
pub use messages::{
    client_batch::ClientBatch,
    error::{CodecError, PayloadKindsError},
    payload::Payload,
    payload_kinds::{PayloadKind, PayloadKinds},
    runt_message::{RuntCodec, RuntMessage},
    update_batch::UpdateBatch,
    update_message::UpdateMessage,
};
pub use protocol::{Protocol, ProtocolError, ProtocolPlugin};
pub use retention_buffer::RetentionBuffer;
pub use transport::{ConnectionEvent, Connections, TransportError};
pub use types::{ClientId, ConnectionKey, Sequence};
pub use update::{
    handler::UpdateHandler, handlers::UpdateHandlers, provider::UpdateProvider,
    updater::ClientUpdater,
};
