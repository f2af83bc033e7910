//! Telemetry model: the sample history, the chart viewport over it, inbound
//! payload decoding and RPM estimation.

mod payload;
mod rpm;
mod store;
mod viewport;

pub use payload::{first_number, Payload, TelemetryFrame};
pub use rpm::RpmTracker;
pub use store::{Sample, SampleStore};
pub use viewport::{ScrollControl, Viewport, ViewportMode};
