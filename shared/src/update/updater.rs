use crate::{messages::update_message::UpdateMessage, ClientId, Identity, Sequence};

/// Server-side updater for one replicated object in the fan-out topology.
///
/// Unlike an `UpdateProvider`, an updater is asked separately for every
/// client, so a client that is far behind can be sent something different
/// (a full snapshot, more history) from one that is caught up.
pub trait ClientUpdater: Send {
    fn identity(&self) -> Identity;

    /// A client joined, seed it with full state rather than a delta
    fn add_new_client(&mut self, client: ClientId);

    /// A client left
    fn remove_client(&mut self, _client: ClientId) {}

    fn set_oldest_client_sequence(&mut self, oldest: Option<Sequence>);

    /// The exact messages `client`, last known to be at `client_sequence`,
    /// needs to be current as of `server_sequence`. May be empty.
    fn create_update_messages(
        &mut self,
        client: ClientId,
        client_sequence: Option<Sequence>,
        server_sequence: Sequence,
    ) -> Vec<UpdateMessage>;

    /// An update sent up by a client for this object
    fn handle_update_message(&mut self, message: &UpdateMessage);
}
