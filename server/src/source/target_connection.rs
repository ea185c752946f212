use runt_shared::{ConnectionKey, Sequence};

/// Progress of one connected target, as far as the source knows
pub struct TargetConnection {
    connection: ConnectionKey,
    acknowledged: Option<Sequence>,
}

impl TargetConnection {
    pub fn new(connection: ConnectionKey) -> Self {
        Self {
            connection,
            acknowledged: None,
        }
    }

    pub fn connection(&self) -> &ConnectionKey {
        &self.connection
    }

    pub fn acknowledged(&self) -> Option<Sequence> {
        self.acknowledged
    }

    /// Records an acknowledgement, returning false if it does not advance
    /// what the target has already acknowledged (acks can arrive out of order)
    pub fn acknowledge(&mut self, sequence: Sequence) -> bool {
        if self.acknowledged.is_some_and(|current| sequence <= current) {
            return false;
        }
        self.acknowledged = Some(sequence);
        true
    }
}
