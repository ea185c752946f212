pub mod error;

use crate::{clock::NetworkClock, transport::Connections};

pub use error::AttachError;

/// The collaborators a replication component is attached to: the transport's
/// connection set and the host's named clocks.
///
/// Attaching a component moves what it needs out of the host.
#[derive(Default)]
pub struct Host {
    connections: Option<Box<dyn Connections>>,
    clocks: Vec<Box<dyn NetworkClock>>,
}

impl Host {
    pub fn new() -> Self {
        Self {
            connections: None,
            clocks: Vec::new(),
        }
    }

    pub fn with_connections<C: Connections + 'static>(mut self, connections: C) -> Self {
        self.connections = Some(Box::new(connections));
        self
    }

    pub fn with_clock<K: NetworkClock + 'static>(mut self, clock: K) -> Self {
        self.add_clock(clock);
        self
    }

    pub fn set_connections(&mut self, connections: Box<dyn Connections>) {
        self.connections = Some(connections);
    }

    pub fn add_clock<K: NetworkClock + 'static>(&mut self, clock: K) {
        self.clocks.push(Box::new(clock));
    }

    pub fn has_connections(&self) -> bool {
        self.connections.is_some()
    }

    pub fn has_clock(&self, name: &str) -> bool {
        self.clocks.iter().any(|clock| clock.name() == name)
    }

    /// Takes the connection set, failing if there is none
    pub fn take_connections(
        &mut self,
        component: &'static str,
    ) -> Result<Box<dyn Connections>, AttachError> {
        self.connections
            .take()
            .ok_or(AttachError::MissingConnections { component })
    }

    /// Takes both the connection set and the named clock. On failure the host
    /// is left as it was.
    pub fn take_connections_and_clock(
        &mut self,
        component: &'static str,
        clock_name: &str,
    ) -> Result<(Box<dyn Connections>, Box<dyn NetworkClock>), AttachError> {
        if self.connections.is_none() {
            return Err(AttachError::MissingConnections { component });
        }
        let Some(index) = self
            .clocks
            .iter()
            .position(|clock| clock.name() == clock_name)
        else {
            return Err(AttachError::MissingClock {
                component,
                name: clock_name.to_string(),
            });
        };

        let clock = self.clocks.remove(index);
        let connections = self.take_connections(component)?;
        Ok((connections, clock))
    }
}
