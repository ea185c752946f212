pub mod error;

use crate::{messages::runt_message::RuntMessage, ConnectionKey};

pub use error::TransportError;

/// Something that happened on the connection set since it was last polled
#[derive(Debug)]
pub enum ConnectionEvent {
    Added(ConnectionKey),
    Removed(ConnectionKey),
    Received(ConnectionKey, RuntMessage),
}

/// The host's connection set, already decoding packets into `RuntMessage`s.
///
/// Connections that exist before a component attaches are reported as
/// `Added` events on the first poll.
pub trait Connections: Send {
    /// Pops the next pending event, if any
    fn receive(&mut self) -> Option<ConnectionEvent>;

    /// Hands a message to the transport. Fire and forget: nothing at the
    /// replication layer waits on or retries a delivery.
    fn deliver(
        &mut self,
        connection: &ConnectionKey,
        message: RuntMessage,
    ) -> Result<(), TransportError>;
}
