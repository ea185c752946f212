use log::{debug, info, trace, warn};

use runt_shared::{
    AttachError, ConnectionEvent, ConnectionKey, Connections, Host, Identity, NetworkClock,
    RuntMessage, Sequence, UpdateBatch, UpdateProvider,
};

use crate::{source::target_connection::TargetConnection, ServerConfig};

/// Keeps any number of `UpdateTarget`s current by sending each of them one
/// `UpdateBatch` per network tick.
///
/// Every batch carries everything the target has not acknowledged yet, so a
/// lost batch is never resent: the next one supersedes it. Providers keep
/// history back to the oldest acknowledgement across all targets.
pub struct UpdateSource {
    connections: Box<dyn Connections>,
    clock: Box<dyn NetworkClock>,
    sequence: Sequence,
    providers: Vec<Box<dyn UpdateProvider>>,
    targets: Vec<TargetConnection>,
}

impl UpdateSource {
    /// Attaches to the host's connection set and to the clock named in
    /// `config`. Fails if the host has either missing.
    pub fn attach(config: &ServerConfig, host: &mut Host) -> Result<Self, AttachError> {
        let (connections, clock) =
            host.take_connections_and_clock("UpdateSource", &config.network_clock)?;
        info!("UpdateSource attached to clock \"{}\"", clock.name());
        Ok(Self::new(connections, clock))
    }

    pub fn new(connections: Box<dyn Connections>, clock: Box<dyn NetworkClock>) -> Self {
        Self {
            connections,
            clock,
            sequence: 0,
            providers: Vec::new(),
            targets: Vec::new(),
        }
    }

    // Providers

    pub fn add_provider<P: UpdateProvider + 'static>(&mut self, provider: P) {
        self.providers.push(Box::new(provider));
    }

    pub fn add_boxed_provider(&mut self, provider: Box<dyn UpdateProvider>) {
        self.providers.push(provider);
    }

    /// Stops asking the provider for updates. Messages it already handed out
    /// are not recalled.
    pub fn remove_provider(&mut self, identity: &Identity) -> bool {
        let count = self.providers.len();
        self.providers
            .retain(|provider| provider.identity() != *identity);
        self.providers.len() != count
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    // Targets

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Last sequence the target on `connection` acknowledged, if any
    pub fn acknowledged_sequence(&self, connection: &ConnectionKey) -> Option<Sequence> {
        self.targets
            .iter()
            .find(|target| target.connection() == connection)
            .and_then(TargetConnection::acknowledged)
    }

    /// Sequence the next batch will carry
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

    /// Processes every pending connection event
    pub fn receive_all(&mut self) {
        while let Some(event) = self.connections.receive() {
            match event {
                ConnectionEvent::Added(connection) => self.on_connection_added(connection),
                ConnectionEvent::Removed(connection) => self.on_connection_removed(&connection),
                ConnectionEvent::Received(connection, message) => {
                    self.on_received_message(&connection, message)
                }
            }
        }
    }

    /// Sends one batch to every target and advances the sequence.
    ///
    /// With no targets this does nothing at all, not even advance the
    /// sequence, so providers keep accumulating history until someone
    /// connects.
    pub fn tick(&mut self) {
        if self.targets.is_empty() {
            trace!("UpdateSource tick {} skipped, no targets", self.sequence);
            return;
        }

        // `None` sorts first, so one target that has acknowledged nothing
        // keeps the whole history alive
        let oldest = self
            .targets
            .iter()
            .map(TargetConnection::acknowledged)
            .min()
            .flatten();

        for provider in self.providers.iter_mut() {
            provider.set_oldest_retained_sequence(oldest);
            provider.set_local_sequence(self.sequence);
        }

        let mut messages = Vec::new();
        for target in &self.targets {
            for provider in &self.providers {
                messages.extend(provider.messages_since(target.acknowledged()));
            }

            // always send, even if empty: it tells the target what sequence
            // we're at, and its ack moves the retention floor
            let batch = UpdateBatch::new(self.sequence, std::mem::take(&mut messages));
            trace!(
                "Sending batch {} with {} updates to {}",
                batch.sequence,
                batch.messages.len(),
                target.connection()
            );
            if let Err(error) = self
                .connections
                .deliver(target.connection(), RuntMessage::Batch(batch))
            {
                warn!("UpdateSource failed to deliver batch: {}", error);
            }
        }

        self.sequence = self.sequence.wrapping_add(1);
    }

    // Connection events

    fn on_connection_added(&mut self, connection: ConnectionKey) {
        if self
            .targets
            .iter()
            .any(|target| *target.connection() == connection)
        {
            return;
        }
        info!("UpdateSource: new target on {}", connection);
        self.targets.push(TargetConnection::new(connection));
    }

    fn on_connection_removed(&mut self, connection: &ConnectionKey) {
        let count = self.targets.len();
        self.targets
            .retain(|target| target.connection() != connection);
        if self.targets.len() != count {
            info!("UpdateSource: target on {} removed", connection);
        }
    }

    fn on_received_message(&mut self, connection: &ConnectionKey, message: RuntMessage) {
        let ack = match message {
            RuntMessage::Batch(ack) => ack,
            other => {
                warn!(
                    "UpdateSource: unexpected {} message from {}",
                    other.name(),
                    connection
                );
                return;
            }
        };

        let Some(target) = self
            .targets
            .iter_mut()
            .find(|target| target.connection() == connection)
        else {
            warn!("UpdateSource: ack from unknown connection {}", connection);
            return;
        };

        if !ack.messages.is_empty() {
            debug!(
                "UpdateSource: ignoring {} updates carried by an ack from {}",
                ack.messages.len(),
                connection
            );
        }

        if !target.acknowledge(ack.sequence) {
            debug!(
                "UpdateSource: stale ack {} from {} (already at {:?})",
                ack.sequence,
                connection,
                target.acknowledged()
            );
        }
    }
}
