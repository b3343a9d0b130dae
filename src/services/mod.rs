pub mod debounce;
pub mod notifications;
pub mod sandbox;
pub mod store;
pub mod time_source;
#[cfg(feature = "runtime")]
pub mod tracing_setup;
