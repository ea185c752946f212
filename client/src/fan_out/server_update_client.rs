use log::{debug, info, trace, warn};

use runt_shared::{
    AttachError, ClientBatch, ClientId, ConnectionEvent, ConnectionKey, Connections, Host,
    Identity, Payload, RuntMessage, Sequence, UpdateBatch, UpdateHandler, UpdateHandlers,
    UpdateMessage,
};

use crate::accepted_sequence::AcceptedSequence;

/// Client half of the fan-out topology: applies the batches a
/// `ClientUpdateManager` tailors for this client, and answers each applied
/// batch with a `ClientBatch` reporting progress and carrying any updates
/// the game queued for the server.
pub struct ServerUpdateClient {
    connections: Box<dyn Connections>,
    handlers: UpdateHandlers,
    accepted: AcceptedSequence,
    client_id: Option<ClientId>,
    outgoing: Vec<UpdateMessage>,
}

impl ServerUpdateClient {
    /// Attaches to the host's connection set
    pub fn attach(host: &mut Host) -> Result<Self, AttachError> {
        let connections = host.take_connections("ServerUpdateClient")?;
        info!("ServerUpdateClient attached");
        Ok(Self::new(connections))
    }

    pub fn new(connections: Box<dyn Connections>) -> Self {
        Self {
            connections,
            handlers: UpdateHandlers::new(),
            accepted: AcceptedSequence::new(),
            client_id: None,
            outgoing: Vec::new(),
        }
    }

    // Handlers

    pub fn add_handler<H: UpdateHandler + 'static>(&mut self, handler: H) {
        if self.handlers.insert(Box::new(handler)).is_some() {
            debug!("ServerUpdateClient: replaced an update handler");
        }
    }

    pub fn remove_handler(&mut self, identity: &Identity) -> bool {
        self.handlers.remove(identity).is_some()
    }

    pub fn has_handler(&self, identity: &Identity) -> bool {
        self.handlers.contains(identity)
    }

    /// The id the server assigned to this client, once it is known
    pub fn client_id(&self) -> Option<ClientId> {
        self.client_id
    }

    pub fn last_accepted_sequence(&self) -> Option<Sequence> {
        self.accepted.last()
    }

    // Upstream

    /// Queues an update for the server-side updater with `target`'s identity.
    /// It goes out with the reply to the next batch applied.
    pub fn queue_update<P: Payload>(&mut self, target: Identity, payload: P) {
        self.queue_message(UpdateMessage::new(target, payload));
    }

    pub fn queue_message(&mut self, message: UpdateMessage) {
        self.outgoing.push(message);
    }

    pub fn queued_len(&self) -> usize {
        self.outgoing.len()
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
                    info!("ServerUpdateClient: connected to server on {}", connection);
                }
                ConnectionEvent::Removed(connection) => {
                    info!("ServerUpdateClient: server on {} disconnected", connection);
                    self.client_id = None;
                    self.accepted = AcceptedSequence::new();
                }
                ConnectionEvent::Received(_, RuntMessage::ClientAssigned(client_id)) => {
                    self.on_client_assigned(client_id);
                }
                ConnectionEvent::Received(connection, RuntMessage::Batch(batch)) => {
                    self.receive_batch(&connection, batch);
                }
                ConnectionEvent::Received(connection, message) => {
                    warn!(
                        "ServerUpdateClient: unexpected {} message from {}",
                        message.name(),
                        connection
                    );
                }
            }
        }
    }

    /// Applies `batch` if it is newer than the last one applied, then reports
    /// back on `connection`. Returns whether it was applied.
    pub fn receive_batch(&mut self, connection: &ConnectionKey, batch: UpdateBatch) -> bool {
        if !self.accepted.accept(batch.sequence) {
            debug!(
                "ServerUpdateClient: discarding batch {}, already at {:?}",
                batch.sequence,
                self.accepted.last()
            );
            return false;
        }

        trace!(
            "ServerUpdateClient: applying batch {} with {} updates",
            batch.sequence,
            batch.messages.len()
        );
        if self.handlers.is_empty() && !batch.messages.is_empty() {
            debug!(
                "ServerUpdateClient: no handlers registered, {} updates in batch {} go unapplied",
                batch.messages.len(),
                batch.sequence
            );
        }
        self.handlers.dispatch(&batch.messages);

        let Some(client_id) = self.client_id else {
            // can't tag a report yet, the server learns our progress from the
            // first one sent after assignment
            debug!(
                "ServerUpdateClient: applied batch {} before being assigned an id",
                batch.sequence
            );
            return true;
        };

        let report = ClientBatch::new(
            client_id,
            batch.sequence,
            std::mem::take(&mut self.outgoing),
        );
        if let Err(error) = self
            .connections
            .deliver(connection, RuntMessage::ClientBatch(report))
        {
            warn!("ServerUpdateClient failed to report batch: {}", error);
        }
        true
    }

    fn on_client_assigned(&mut self, client_id: ClientId) {
        if self.client_id == Some(client_id) {
            return;
        }
        info!("ServerUpdateClient: assigned {}", client_id);
        self.client_id = Some(client_id);
    }
}
