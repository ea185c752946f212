use log::{debug, info, trace, warn};

use runt_shared::{
    AttachError, ConnectionEvent, ConnectionKey, Connections, Host, Identity, RuntMessage,
    Sequence, UpdateBatch, UpdateHandler, UpdateHandlers,
};

use crate::accepted_sequence::AcceptedSequence;

/// Applies the batches an `UpdateSource` broadcasts to the handlers registered
/// for their targets, and acknowledges each batch it applies.
///
/// Batches that arrive late are dropped whole: anything they carried is
/// also in the newer batch that overtook them.
pub struct UpdateTarget {
    connections: Box<dyn Connections>,
    handlers: UpdateHandlers,
    accepted: AcceptedSequence,
}

impl UpdateTarget {
    /// Attaches to the host's connection set
    pub fn attach(host: &mut Host) -> Result<Self, AttachError> {
        let connections = host.take_connections("UpdateTarget")?;
        info!("UpdateTarget attached");
        Ok(Self::new(connections))
    }

    pub fn new(connections: Box<dyn Connections>) -> Self {
        Self {
            connections,
            handlers: UpdateHandlers::new(),
            accepted: AcceptedSequence::new(),
        }
    }

    // Handlers

    /// Registers a handler, replacing any handler for the same identity
    pub fn add_handler<H: UpdateHandler + 'static>(&mut self, handler: H) {
        if self.handlers.insert(Box::new(handler)).is_some() {
            debug!("UpdateTarget: replaced an update handler");
        }
    }

    pub fn remove_handler(&mut self, identity: &Identity) -> bool {
        self.handlers.remove(identity).is_some()
    }

    pub fn has_handler(&self, identity: &Identity) -> bool {
        self.handlers.contains(identity)
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Sequence of the newest batch applied, `None` before the first
    pub fn last_accepted_sequence(&self) -> Option<Sequence> {
        self.accepted.last()
    }

    // Driving

    /// Must be called regularly, processes every pending connection event
    pub fn update(&mut self) {
        self.receive_all();
    }

    pub fn receive_all(&mut self) {
        while let Some(event) = self.connections.receive() {
            match event {
                ConnectionEvent::Added(connection) => {
                    info!("UpdateTarget: connected to source on {}", connection);
                }
                ConnectionEvent::Removed(connection) => {
                    info!("UpdateTarget: source on {} disconnected", connection);
                }
                ConnectionEvent::Received(connection, RuntMessage::Batch(batch)) => {
                    self.receive_batch(&connection, batch);
                }
                ConnectionEvent::Received(connection, message) => {
                    warn!(
                        "UpdateTarget: unexpected {} message from {}",
                        message.name(),
                        connection
                    );
                }
            }
        }
    }

    /// Applies `batch` if it is newer than the last one applied, then
    /// acknowledges it on `connection`. Returns whether it was applied.
    pub fn receive_batch(&mut self, connection: &ConnectionKey, batch: UpdateBatch) -> bool {
        if !self.accepted.accept(batch.sequence) {
            debug!(
                "UpdateTarget: discarding batch {} from {}, already at {:?}",
                batch.sequence,
                connection,
                self.accepted.last()
            );
            return false;
        }

        trace!(
            "UpdateTarget: applying batch {} with {} updates",
            batch.sequence,
            batch.messages.len()
        );
        if self.handlers.is_empty() && !batch.messages.is_empty() {
            debug!(
                "UpdateTarget: no handlers registered, {} updates in batch {} go unapplied",
                batch.messages.len(),
                batch.sequence
            );
        }
        self.handlers.dispatch(&batch.messages);

        let ack = UpdateBatch::ack(batch.sequence);
        if let Err(error) = self.connections.deliver(connection, RuntMessage::Batch(ack)) {
            warn!("UpdateTarget failed to acknowledge batch: {}", error);
        }
        true
    }
}
