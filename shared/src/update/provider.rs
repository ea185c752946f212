use crate::{messages::update_message::UpdateMessage, Identity, Sequence};

/// Source-side producer of updates for one replicated object, driven by an
/// `UpdateSource` once per tick
pub trait UpdateProvider: Send {
    fn identity(&self) -> Identity;

    /// Sequence of the batch the source is currently assembling
    fn set_local_sequence(&mut self, sequence: Sequence);

    /// Lowest sequence any target has acknowledged. History below it can go.
    fn set_oldest_retained_sequence(&mut self, oldest: Option<Sequence>);

    /// Everything a target that acknowledged `consumer` has not seen yet,
    /// oldest first
    fn messages_since(&self, consumer: Option<Sequence>) -> Vec<UpdateMessage>;
}
