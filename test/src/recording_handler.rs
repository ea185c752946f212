use std::sync::{Arc, Mutex};

use runt_shared::{Identity, Payload, UpdateHandler, UpdateMessage};

/// Every update a `RecordingHandler` was handed, in order
#[derive(Clone, Default)]
pub struct UpdateLog {
    messages: Arc<Mutex<Vec<UpdateMessage>>>,
}

impl UpdateLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<UpdateMessage> {
        self.messages.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Payloads of type `P`, skipping any other kind
    pub fn payloads<P: Payload + Clone>(&self) -> Vec<P> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter_map(|message| message.payload.downcast_ref::<P>().cloned())
            .collect()
    }

    pub fn clear(&self) {
        self.messages.lock().unwrap().clear();
    }
}

/// An `UpdateHandler` that records what it is handed into an `UpdateLog`
pub struct RecordingHandler {
    identity: Identity,
    log: UpdateLog,
}

impl RecordingHandler {
    pub fn new(identity: Identity, log: &UpdateLog) -> Self {
        Self {
            identity,
            log: log.clone(),
        }
    }
}

impl UpdateHandler for RecordingHandler {
    fn identity(&self) -> Identity {
        self.identity
    }

    fn handle(&mut self, message: &UpdateMessage) {
        self.log.messages.lock().unwrap().push(message.clone());
    }
}
