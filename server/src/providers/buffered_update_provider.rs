use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use runt_shared::{
    Identity, Payload, RetentionBuffer, Sequence, UpdateMessage, UpdateProvider,
};

struct ProviderState {
    local_sequence: Option<Sequence>,
    buffer: RetentionBuffer<UpdateMessage>,
}

impl ProviderState {
    // one past the batch the source last assembled: anything pushed now
    // misses that batch and has to go out in the next one
    fn pending_sequence(&self) -> Sequence {
        self.local_sequence
            .map_or(0, |sequence| sequence.wrapping_add(1))
    }
}

/// An `UpdateProvider` that buffers whatever payloads the game pushes into it
/// and replays them to each target until every target has acknowledged them.
///
/// Cloning gives another handle to the same buffer: keep one in the game
/// object and hand another to the `UpdateSource`.
#[derive(Clone)]
pub struct BufferedUpdateProvider {
    identity: Identity,
    state: Arc<Mutex<ProviderState>>,
}

impl BufferedUpdateProvider {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            state: Arc::new(Mutex::new(ProviderState {
                local_sequence: None,
                buffer: RetentionBuffer::new(),
            })),
        }
    }

    /// Queues an update for the object this provider represents
    pub fn push<P: Payload>(&self, payload: P) {
        self.push_boxed(Box::new(payload));
    }

    pub fn push_boxed(&self, payload: Box<dyn Payload>) {
        let mut state = self.lock();
        let sequence = state.pending_sequence();
        state
            .buffer
            .record(UpdateMessage::from_boxed(self.identity, payload), sequence);
    }

    /// Number of updates still held for targets that haven't acknowledged them
    pub fn retained_len(&self) -> usize {
        self.lock().buffer.len()
    }

    fn lock(&self) -> MutexGuard<'_, ProviderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl UpdateProvider for BufferedUpdateProvider {
    fn identity(&self) -> Identity {
        self.identity
    }

    fn set_local_sequence(&mut self, sequence: Sequence) {
        self.lock().local_sequence = Some(sequence);
    }

    fn set_oldest_retained_sequence(&mut self, oldest: Option<Sequence>) {
        self.lock().buffer.set_oldest_retained_sequence(oldest);
    }

    fn messages_since(&self, consumer: Option<Sequence>) -> Vec<UpdateMessage> {
        self.lock().buffer.messages_since(consumer)
    }
}
