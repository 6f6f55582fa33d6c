use thiserror::Error;

/// Fatal conditions. Every variant terminates the daemon with exit code 1
/// after the teardown of whatever was already set up.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DaemonError {
    /// Enumeration returned no multitouch device. Without a touch surface the
    /// gesture is meaningless, so this fails startup.
    #[error("no multitouch devices found")]
    NoDeviceFound,

    /// The IOKit device-arrival notification could not be installed.
    #[error("failed to register device hot-plug notifications")]
    NotificationSetupFailed,

    /// The event tap could not be created within the retry budget. The
    /// dominant real-world cause is a missing accessibility permission.
    #[error(
        "could not create event tap after {attempts} attempts; \
         check accessibility permissions"
    )]
    InterceptionUnavailable { attempts: u32 },

    /// The tap was created but could not be attached to the run loop.
    #[error("failed to attach the event tap to the run loop")]
    DispatchSourceUnavailable,
}
