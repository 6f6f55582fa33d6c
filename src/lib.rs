pub mod common;
pub mod devices;
pub mod error;
pub mod gesture;
pub mod supervisor;

#[cfg(target_os = "macos")]
pub mod daemon;
#[cfg(target_os = "macos")]
pub mod sys;

pub use error::DaemonError;
