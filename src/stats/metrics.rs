//! Statistics for the hub and subscriber sessions

use std::time::Duration;

/// Hub-wide counters, maintained by the control loop
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HubStats {
    /// Subscribers currently registered
    pub active_subscribers: usize,
    /// Registrations since startup
    pub total_registered: u64,
    /// Messages dispatched since startup
    pub messages_published: u64,
    /// Messages handed to subscriber queues since startup
    pub deliveries: u64,
    /// Subscribers removed for not keeping up
    pub slow_disconnects: u64,
}

impl HubStats {
    /// Average number of recipients per published message
    pub fn fan_out(&self) -> f64 {
        if self.messages_published == 0 {
            0.0
        } else {
            self.deliveries as f64 / self.messages_published as f64
        }
    }
}

/// Per-subscriber session statistics
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    /// Frames written to the transport
    pub frames_sent: u64,
    /// Bytes written to the transport
    pub bytes_sent: u64,
    /// Messages skipped because they failed to serialize
    pub serialization_failures: u64,
    /// How long the session stayed open
    pub duration: Duration,
}

impl SessionStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one written frame
    pub fn record_frame(&mut self, len: usize) {
        self.frames_sent += 1;
        self.bytes_sent += len as u64;
    }
}
