use crate::{messages::update_message::UpdateMessage, Identity};

/// Receiver-side component applying incoming updates to one replicated object
pub trait UpdateHandler: Send {
    fn identity(&self) -> Identity;

    fn handle(&mut self, message: &UpdateMessage);
}
