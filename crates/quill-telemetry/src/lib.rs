//! Quill Telemetry - tracing subscriber setup shared by Quill binaries

mod subscriber;

pub use subscriber::{build_filter, init_subscriber, TelemetryConfig};
