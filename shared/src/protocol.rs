use std::time::Duration;

use crate::messages::{
    error::PayloadKindsError, payload::Payload, payload_kinds::PayloadKinds,
    runt_message::RuntCodec,
};
use runt_serde::Serde;

pub mod error;
pub use error::ProtocolError;

// Protocol Plugin
pub trait ProtocolPlugin {
    fn build(&self, protocol: &mut Protocol);
}

/// Everything both ends of a connection must agree on: which payload types
/// can travel inside Update Messages, and how often the network clock ticks
pub struct Protocol {
    pub payload_kinds: PayloadKinds,
    /// The duration between each network tick
    pub tick_interval: Duration,
    locked: bool,
}

impl Default for Protocol {
    fn default() -> Self {
        Self {
            payload_kinds: PayloadKinds::new(),
            tick_interval: Duration::from_millis(50),
            locked: false,
        }
    }
}

impl Protocol {
    pub fn builder() -> Self {
        Self::default()
    }

    pub fn add_plugin<P: ProtocolPlugin>(&mut self, plugin: P) -> &mut Self {
        self.check_lock();
        plugin.build(self);
        self
    }

    pub fn tick_interval(&mut self, duration: Duration) -> &mut Self {
        self.check_lock();
        self.tick_interval = duration;
        self
    }

    /// Registers a payload type.
    ///
    /// # Panics
    /// Panics if the protocol is locked or the registry is full.
    pub fn add_payload<P: Serde + Payload>(&mut self) -> &mut Self {
        if let Err(error) = self.try_add_payload::<P>() {
            panic!("{}", error);
        }
        self
    }

    pub fn try_add_payload<P: Serde + Payload>(&mut self) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.payload_kinds.add_payload::<P>()?;
        Ok(self)
    }

    pub fn lock(&mut self) {
        self.check_lock();
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    fn try_check_lock(&self) -> Result<(), ProtocolError> {
        if self.locked {
            return Err(ProtocolError::AlreadyLocked);
        }
        Ok(())
    }

    fn check_lock(&self) {
        if let Err(error) = self.try_check_lock() {
            panic!("{}", error);
        }
    }

    pub fn build(&mut self) -> Self {
        std::mem::take(self)
    }

    /// Consumes the protocol, producing the codec a transport uses to
    /// encode and decode `RuntMessage`s
    pub fn into_codec(self) -> RuntCodec {
        RuntCodec::new(self.payload_kinds)
    }
}

impl From<PayloadKindsError> for ProtocolError {
    fn from(error: PayloadKindsError) -> Self {
        ProtocolError::PayloadKinds(error)
    }
}
