//! Process lifecycle helpers used by the service entry point.

pub mod shutdown;

pub use shutdown::{shutdown_gracefully, shutdown_signal};
