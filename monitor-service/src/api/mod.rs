//! HTTP surface of the energy monitor.
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | POST | `/api/uplink` | Ingest one device uplink |
//! | GET | `/api/readings` | Last N readings, optionally per device |
//! | GET | `/api/readings/latest` | Most recent reading (array of 0 or 1) |
//! | GET | `/api/readings/latest-per-device` | Most recent reading of each device |
//! | GET | `/api/readings/export` | Same rows as `/api/readings`, as CSV |
//! | GET | `/api/blocks` | All blocks |
//! | GET | `/api/blocks/:block_id/units` | Units of one block |
//! | GET | `/api/units` | All units |
//! | GET | `/api/events` | SSE stream of `new-reading` events |
//! | GET | `/health` | Liveness |

mod error;
pub mod events;
pub mod queries;

use std::{sync::Arc, time::Duration};

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::sinks::UplinkArchive;
use crate::sources::http_uplink;
use crate::store::ReadingStore;

pub use error::ApiError;

#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn ReadingStore>,
    /// `None` disables raw uplink archiving.
    pub archive: Option<UplinkArchive>,
    pub poll_interval: Duration,
}

pub fn build_router(state: ApiState) -> Router {
    let api_routes = Router::new()
        .route("/uplink", post(http_uplink::ingest_uplink))
        .route("/readings", get(queries::recent_readings))
        .route("/readings/latest", get(queries::latest_reading))
        .route("/readings/latest-per-device", get(queries::latest_per_device))
        .route("/readings/export", get(queries::export_readings))
        .route("/blocks", get(queries::list_blocks))
        .route("/blocks/:block_id/units", get(queries::list_block_units))
        .route("/units", get(queries::list_units))
        .route("/events", get(events::reading_events));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(queries::health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
