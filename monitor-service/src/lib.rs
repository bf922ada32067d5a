pub mod api;
pub mod config;
pub mod export;
pub mod metrics_server;
pub mod observability;
pub mod pipeline;
pub mod sinks;
pub mod sources;
pub mod store;
pub mod transform;
pub mod uplink;

pub use pipeline::{Envelope, Pipeline};
