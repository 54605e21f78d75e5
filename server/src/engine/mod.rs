//! The chat engine: session state, the shared registry, routing policy, and
//! the counters the server exposes.

pub mod events;
pub mod metrics;
pub mod registry;
pub mod router;
pub mod session;
pub mod validation;
