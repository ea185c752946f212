use log::{debug, info, trace, warn};

use runt_shared::{
    AttachError, ClientBatch, ClientId, ClientUpdater, ConnectionEvent, ConnectionKey,
    Connections, Host, Identity, NetworkClock, RuntMessage, Sequence, UpdateBatch,
};

use crate::{fan_out::client_connection::ClientConnection, ServerConfig};

/// Sends every connected client its own tailored updates each network tick.
///
/// Each `ClientUpdater` is asked separately for each client, given the last
/// server sequence that client reported, so a lagging client can be sent more
/// history (or a full snapshot) than one that is caught up. Clients report
/// their progress, and any updates of their own, in `ClientBatch`es.
pub struct ClientUpdateManager {
    connections: Box<dyn Connections>,
    clock: Box<dyn NetworkClock>,
    sequence: Sequence,
    next_client: u32,
    clients: Vec<ClientConnection>,
    updaters: Vec<Box<dyn ClientUpdater>>,
}

impl ClientUpdateManager {
    /// Attaches to the host's connection set and to the clock named in
    /// `config`. Fails if the host has either missing.
    pub fn attach(config: &ServerConfig, host: &mut Host) -> Result<Self, AttachError> {
        let (connections, clock) =
            host.take_connections_and_clock("ClientUpdateManager", &config.network_clock)?;
        info!("ClientUpdateManager attached to clock \"{}\"", clock.name());
        Ok(Self::new(connections, clock))
    }

    pub fn new(connections: Box<dyn Connections>, clock: Box<dyn NetworkClock>) -> Self {
        Self {
            connections,
            clock,
            sequence: 0,
            next_client: 0,
            clients: Vec::new(),
            updaters: Vec::new(),
        }
    }

    // Updaters

    /// Adds an updater. Clients that are already connected are introduced
    /// to it as new clients.
    pub fn add_updater<U: ClientUpdater + 'static>(&mut self, updater: U) {
        self.add_boxed_updater(Box::new(updater));
    }

    pub fn add_boxed_updater(&mut self, mut updater: Box<dyn ClientUpdater>) {
        for client in &self.clients {
            updater.add_new_client(client.client());
        }
        self.updaters.push(updater);
    }

    pub fn remove_updater(&mut self, identity: &Identity) -> bool {
        let count = self.updaters.len();
        self.updaters.retain(|updater| updater.identity() != *identity);
        self.updaters.len() != count
    }

    pub fn updater_count(&self) -> usize {
        self.updaters.len()
    }

    // Clients

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    pub fn client_id(&self, connection: &ConnectionKey) -> Option<ClientId> {
        self.clients
            .iter()
            .find(|client| client.connection() == connection)
            .map(ClientConnection::client)
    }

    /// Last server sequence `client` reported, if any
    pub fn client_sequence(&self, client: ClientId) -> Option<Sequence> {
        self.clients
            .iter()
            .find(|record| record.client() == client)
            .and_then(ClientConnection::acknowledged)
    }

    /// Sequence the next tick will carry
    pub fn sequence(&self) -> Sequence {
        self.sequence
    }

    // Driving

    /// Must be called regularly. Processes pending connection events, then
    /// runs the tick step if the network clock has fired.
    pub fn update(&mut self) {
        self.receive_all();

        if self.clock.take_tick() {
            self.tick();
        }
    }

    pub fn receive_all(&mut self) {
        while let Some(event) = self.connections.receive() {
            match event {
                ConnectionEvent::Added(connection) => self.on_new_client_connection(connection),
                ConnectionEvent::Removed(connection) => self.on_client_removed(&connection),
                ConnectionEvent::Received(connection, RuntMessage::ClientBatch(batch)) => {
                    self.on_client_batch(&connection, batch)
                }
                ConnectionEvent::Received(connection, message) => {
                    warn!(
                        "ClientUpdateManager: unexpected {} message from {}",
                        message.name(),
                        connection
                    );
                }
            }
        }
    }

    /// Sends every client one batch built from all updaters' output for that
    /// client, then advances the sequence. Does nothing with no clients.
    pub fn tick(&mut self) {
        if self.clients.is_empty() {
            trace!("ClientUpdateManager tick {} skipped, no clients", self.sequence);
            return;
        }

        let oldest = self
            .clients
            .iter()
            .map(ClientConnection::acknowledged)
            .min()
            .flatten();

        // each updater must keep history back to the oldest client sequence
        for updater in self.updaters.iter_mut() {
            updater.set_oldest_client_sequence(oldest);
        }

        for client in &self.clients {
            // the assignment may have been lost, repeat it until the client
            // reports in with its id
            if client.acknowledged().is_none() {
                if let Err(error) = self
                    .connections
                    .deliver(client.connection(), RuntMessage::ClientAssigned(client.client()))
                {
                    warn!("ClientUpdateManager failed to assign {}: {}", client.client(), error);
                }
            }

            let mut messages = Vec::new();
            for updater in self.updaters.iter_mut() {
                messages.extend(updater.create_update_messages(
                    client.client(),
                    client.acknowledged(),
                    self.sequence,
                ));
            }

            // sent even when empty so the client can report progress
            let batch = UpdateBatch::new(self.sequence, messages);
            trace!(
                "Sending batch {} with {} updates to {}",
                batch.sequence,
                batch.messages.len(),
                client.client()
            );
            if let Err(error) = self
                .connections
                .deliver(client.connection(), RuntMessage::Batch(batch))
            {
                warn!("ClientUpdateManager failed to deliver batch: {}", error);
            }
        }

        self.sequence = self.sequence.wrapping_add(1);
    }

    // Connection events

    fn on_new_client_connection(&mut self, connection: ConnectionKey) {
        if self.client_id(&connection).is_some() {
            return;
        }

        // ids are never reused, so a late report from a departed client can't
        // be mistaken for a newcomer's
        let client = ClientId::new(self.next_client);
        self.next_client = self.next_client.wrapping_add(1);
        self.clients.push(ClientConnection::new(connection, client));
        info!("ClientUpdateManager: {} connected on {}", client, connection);

        if let Err(error) = self
            .connections
            .deliver(&connection, RuntMessage::ClientAssigned(client))
        {
            warn!("ClientUpdateManager failed to assign {}: {}", client, error);
        }

        for updater in self.updaters.iter_mut() {
            updater.add_new_client(client);
        }
    }

    fn on_client_removed(&mut self, connection: &ConnectionKey) {
        let Some(index) = self
            .clients
            .iter()
            .position(|client| client.connection() == connection)
        else {
            return;
        };

        let client = self.clients.remove(index).client();
        info!("ClientUpdateManager: {} disconnected", client);
        for updater in self.updaters.iter_mut() {
            updater.remove_client(client);
        }
    }

    fn on_client_batch(&mut self, connection: &ConnectionKey, batch: ClientBatch) {
        let Some(record) = self
            .clients
            .iter_mut()
            .find(|record| record.client() == batch.client)
        else {
            warn!(
                "ClientUpdateManager: report for unknown {} from {}",
                batch.client, connection
            );
            return;
        };

        if !record.acknowledge(batch.sequence) {
            debug!(
                "ClientUpdateManager: stale report {} from {} (already at {:?})",
                batch.sequence,
                batch.client,
                record.acknowledged()
            );
            return;
        }

        for message in &batch.messages {
            match self
                .updaters
                .iter_mut()
                .find(|updater| updater.identity() == message.target)
            {
                Some(updater) => updater.handle_update_message(message),
                None => warn!(
                    "ClientUpdateManager: no updater for {} (from {})",
                    message.target, batch.client
                ),
            }
        }
    }
}
