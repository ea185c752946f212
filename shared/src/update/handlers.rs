use std::collections::HashMap;

use log::warn;

use crate::{messages::update_message::UpdateMessage, update::handler::UpdateHandler, Identity};

/// Handlers keyed by the identity of the object they apply updates to
#[derive(Default)]
pub struct UpdateHandlers {
    handlers: HashMap<Identity, Box<dyn UpdateHandler>>,
}

impl UpdateHandlers {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registers a handler, returning whichever one it replaced
    pub fn insert(&mut self, handler: Box<dyn UpdateHandler>) -> Option<Box<dyn UpdateHandler>> {
        self.handlers.insert(handler.identity(), handler)
    }

    pub fn remove(&mut self, identity: &Identity) -> Option<Box<dyn UpdateHandler>> {
        self.handlers.remove(identity)
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.handlers.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Hands each message to the handler for its target. A message with no
    /// handler is logged and skipped; the rest are still dispatched.
    ///
    /// Returns how many messages found a handler.
    pub fn dispatch(&mut self, messages: &[UpdateMessage]) -> usize {
        let mut dispatched = 0;
        for message in messages {
            match self.handlers.get_mut(&message.target) {
                Some(handler) => {
                    handler.handle(message);
                    dispatched += 1;
                }
                None => {
                    warn!(
                        "No update handler registered for {}, skipping {} payload",
                        message.target,
                        message.payload.type_name()
                    );
                }
            }
        }
        dispatched
    }
}
