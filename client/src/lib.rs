//! # Runt Client
//! The receiving side of runt state replication. Batches arrive out of
//! order, duplicated or not at all; only those newer than anything already
//! applied are handed to the registered `UpdateHandler`s, and each one is
//! acknowledged so the sender can stop retaining what it carried.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use runt_shared::{
        AttachError, ClientId, ConnectionKey, Host, Identity, Payload, Protocol, RuntCodec,
        RuntMessage, Sequence, UpdateHandler, UpdateMessage,
    };
}

mod accepted_sequence;
mod fan_out;
mod target;

pub use fan_out::ServerUpdateClient;
pub use target::UpdateTarget;
