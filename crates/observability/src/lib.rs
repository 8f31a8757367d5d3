//! `resortstock-observability` — process-wide logging/tracing setup.

pub mod tracing;

/// Initialize observability for the process.
pub fn init() {
    tracing::init();
}
