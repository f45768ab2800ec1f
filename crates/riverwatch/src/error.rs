//! Error types for the status client.
//!
//! All variants here are fatal to the current connection lifecycle: the
//! supervisor logs them and terminates. Command-sink failures are absorbed
//! in [`crate::control`] and never surface as errors.

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, StatusError>;

/// Fatal errors of a connection lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    /// The compositor socket could not be reached; typically
    /// `$WAYLAND_DISPLAY` / `$XDG_RUNTIME_DIR` are unset or stale.
    #[error("failed to connect to the compositor: {0}")]
    Connect(#[from] wayland_client::ConnectError),

    /// I/O or protocol failure while dispatching events.
    #[error("wayland dispatch failed: {0}")]
    Dispatch(#[from] wayland_client::DispatchError),

    /// A required global is missing from the compositor's registry.
    #[error("compositor does not advertise {interface} (not running river?)")]
    ExtensionUnavailable {
        /// The wayland interface name that was expected.
        interface: &'static str,
    },
}
