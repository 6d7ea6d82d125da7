//! Real-time delivery configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Upper bound for a connection's outbound queue.
pub const MAX_QUEUE_CAPACITY: usize = 4096;

/// Upper bound for a single inbound WebSocket frame.
pub const MAX_FRAME_BYTES: usize = 1024 * 1024;

/// WebSocket connection limits
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeConfig {
    /// Events buffered per connection before new ones are dropped
    #[serde(default = "default_queue_capacity")]
    pub connection_queue_capacity: usize,

    /// Largest inbound frame accepted, in bytes
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

impl RealtimeConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.connection_queue_capacity == 0 || self.connection_queue_capacity > MAX_QUEUE_CAPACITY {
            return Err(ValidationError::InvalidQueueCapacity(MAX_QUEUE_CAPACITY));
        }
        if self.max_frame_bytes < 1024 || self.max_frame_bytes > MAX_FRAME_BYTES {
            return Err(ValidationError::InvalidFrameSize(MAX_FRAME_BYTES));
        }
        Ok(())
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            connection_queue_capacity: default_queue_capacity(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

fn default_queue_capacity() -> usize {
    crate::adapters::websocket::DEFAULT_QUEUE_CAPACITY
}

fn default_max_frame_bytes() -> usize {
    crate::adapters::websocket::DEFAULT_MAX_FRAME_BYTES
}
