//! Hub error types

/// Error type for hub operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HubError {
    /// The control loop has shut down
    #[error("hub is closed")]
    Closed,
}
