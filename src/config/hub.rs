//! Hub configuration
//!
//! Queue capacities for hub dispatch loops and client outbound queues,
//! plus the idle room reaping schedule.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Hub configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HubConfig {
    /// Capacity of each hub's command queue
    #[serde(default = "default_command_capacity")]
    pub command_capacity: usize,

    /// Capacity of each client's outbound queue; a client that falls
    /// this far behind is evicted
    #[serde(default = "default_client_queue_capacity")]
    pub client_queue_capacity: usize,

    /// How long a room must stay empty before it can be reaped
    #[serde(default = "default_idle_room_grace_secs")]
    pub idle_room_grace_secs: u64,

    /// How often the reaper looks for idle rooms
    #[serde(default = "default_reap_interval_secs")]
    pub reap_interval_secs: u64,
}

impl HubConfig {
    pub fn idle_room_grace(&self) -> Duration {
        Duration::from_secs(self.idle_room_grace_secs)
    }

    pub fn reap_interval(&self) -> Duration {
        Duration::from_secs(self.reap_interval_secs)
    }

    /// Validate hub configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.command_capacity == 0 {
            return Err(ValidationError::ZeroCapacity("hub.command_capacity"));
        }
        if self.client_queue_capacity == 0 {
            return Err(ValidationError::ZeroCapacity("hub.client_queue_capacity"));
        }
        if self.reap_interval_secs == 0 {
            return Err(ValidationError::InvalidReapInterval);
        }
        Ok(())
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            command_capacity: default_command_capacity(),
            client_queue_capacity: default_client_queue_capacity(),
            idle_room_grace_secs: default_idle_room_grace_secs(),
            reap_interval_secs: default_reap_interval_secs(),
        }
    }
}

fn default_command_capacity() -> usize {
    1024
}

fn default_client_queue_capacity() -> usize {
    256
}

fn default_idle_room_grace_secs() -> u64 {
    300
}

fn default_reap_interval_secs() -> u64 {
    60
}
