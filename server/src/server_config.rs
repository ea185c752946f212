use std::default::Default;

/// Contains Config properties which will be used by the server-side
/// aggregators (`UpdateSource` and `ClientUpdateManager`)
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Name of the host clock whose ticks drive the aggregator
    pub network_clock: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            network_clock: "NetworkClock".to_string(),
        }
    }
}
