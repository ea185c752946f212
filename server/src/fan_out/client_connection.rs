use runt_shared::{ClientId, ConnectionKey, Sequence};

/// A connected fan-out client and the last server sequence it reported
pub struct ClientConnection {
    connection: ConnectionKey,
    client: ClientId,
    acknowledged: Option<Sequence>,
}

impl ClientConnection {
    pub fn new(connection: ConnectionKey, client: ClientId) -> Self {
        Self {
            connection,
            client,
            acknowledged: None,
        }
    }

    pub fn connection(&self) -> &ConnectionKey {
        &self.connection
    }

    pub fn client(&self) -> ClientId {
        self.client
    }

    pub fn acknowledged(&self) -> Option<Sequence> {
        self.acknowledged
    }

    /// Returns false, changing nothing, when the report is not newer than
    /// what the client already reported (unreliable delivery order)
    pub fn acknowledge(&mut self, sequence: Sequence) -> bool {
        if self.acknowledged.is_some_and(|current| current >= sequence) {
            return false;
        }
        self.acknowledged = Some(sequence);
        true
    }
}
