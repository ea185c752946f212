use thiserror::Error;

/// Fatal configuration errors raised when a replication component is
/// attached to a `Host` that lacks what it needs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttachError {
    /// The host has no connection set
    #[error("{component} requires a Connections service to be present in the host")]
    MissingConnections { component: &'static str },

    /// The host has no clock with the configured name
    #[error("{component} requires a clock named \"{name}\" to be present in the host")]
    MissingClock {
        component: &'static str,
        name: String,
    },
}
