use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use log::debug;

use runt_shared::{
    ClientId, ClientUpdater, Identity, Payload, RetentionBuffer, Sequence, UpdateMessage,
};

struct UpdaterState {
    snapshot: Option<Box<dyn Payload>>,
    changes: RetentionBuffer<UpdateMessage>,
    server_sequence: Option<Sequence>,
    // clients still waiting on a full snapshot, with the first server
    // sequence one was sent at
    seeding: HashMap<ClientId, Option<Sequence>>,
    inbound: Vec<UpdateMessage>,
}

impl UpdaterState {
    fn pending_sequence(&self) -> Sequence {
        self.server_sequence
            .map_or(0, |sequence| sequence.wrapping_add(1))
    }
}

/// A `ClientUpdater` that keeps a full snapshot of its object plus the
/// history of changes made since.
///
/// New clients are sent the snapshot on every tick until they acknowledge a
/// batch that carried it, after which they get only the changes they
/// haven't seen. The game must keep the snapshot current: a snapshot sent at
/// a given tick stands in for every change pushed before it.
///
/// Updates that clients send up are queued and handed back by
/// `drain_inbound`.
#[derive(Clone)]
pub struct HistoryUpdater {
    identity: Identity,
    state: Arc<Mutex<UpdaterState>>,
}

impl HistoryUpdater {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            state: Arc::new(Mutex::new(UpdaterState {
                snapshot: None,
                changes: RetentionBuffer::new(),
                server_sequence: None,
                seeding: HashMap::new(),
                inbound: Vec::new(),
            })),
        }
    }

    /// Replaces the full state sent to clients that are joining
    pub fn set_snapshot<P: Payload>(&self, snapshot: P) {
        self.lock().snapshot = Some(Box::new(snapshot));
    }

    /// Records an incremental change for clients that are already seeded
    pub fn push_change<P: Payload>(&self, change: P) {
        let mut state = self.lock();
        let sequence = state.pending_sequence();
        state
            .changes
            .record(UpdateMessage::new(self.identity, change), sequence);
    }

    /// Takes every update clients have sent for this object since the last
    /// call, in arrival order
    pub fn drain_inbound(&self) -> Vec<UpdateMessage> {
        std::mem::take(&mut self.lock().inbound)
    }

    pub fn retained_len(&self) -> usize {
        self.lock().changes.len()
    }

    pub fn is_seeding(&self, client: ClientId) -> bool {
        self.lock().seeding.contains_key(&client)
    }

    fn lock(&self) -> MutexGuard<'_, UpdaterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ClientUpdater for HistoryUpdater {
    fn identity(&self) -> Identity {
        self.identity
    }

    fn add_new_client(&mut self, client: ClientId) {
        self.lock().seeding.insert(client, None);
    }

    fn remove_client(&mut self, client: ClientId) {
        self.lock().seeding.remove(&client);
    }

    fn set_oldest_client_sequence(&mut self, oldest: Option<Sequence>) {
        self.lock().changes.set_oldest_retained_sequence(oldest);
    }

    fn create_update_messages(
        &mut self,
        client: ClientId,
        client_sequence: Option<Sequence>,
        server_sequence: Sequence,
    ) -> Vec<UpdateMessage> {
        let mut state = self.lock();
        state.server_sequence = Some(server_sequence);

        let seeded_at = match state.seeding.get(&client) {
            Some(sent_at) => Some(*sent_at),
            None if client_sequence.is_none() => Some(None),
            None => None,
        };

        if let Some(sent_at) = seeded_at {
            let acknowledged = matches!(
                (sent_at, client_sequence),
                (Some(sent_at), Some(client_sequence)) if client_sequence >= sent_at
            );

            if acknowledged {
                debug!("{} seeded for {}", client, self.identity);
                state.seeding.remove(&client);
            } else if let Some(snapshot) = state.snapshot.clone() {
                state
                    .seeding
                    .insert(client, Some(sent_at.unwrap_or(server_sequence)));
                return vec![UpdateMessage::from_boxed(self.identity, snapshot)];
            } else {
                // nothing to seed with, the change history is all there is
                state.seeding.remove(&client);
            }
        }

        state.changes.messages_since(client_sequence)
    }

    fn handle_update_message(&mut self, message: &UpdateMessage) {
        self.lock().inbound.push(message.clone());
    }
}
