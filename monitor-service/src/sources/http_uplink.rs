use std::time::SystemTime;

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use energy_client::domain::Reading;

use crate::api::{ApiError, ApiState};
use crate::pipeline::Envelope;
use crate::transform::validate_reading;
use crate::uplink::Uplink;

/// `POST /api/uplink`
///
/// The body is taken as raw bytes so the archived copy is exactly what the
/// network server sent.
pub async fn ingest_uplink(
    State(state): State<ApiState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Reading>), ApiError> {
    metrics::counter!("http_uplink_requests_total").increment(1);
    let received_at = SystemTime::now();

    let uplink: Uplink = serde_json::from_slice(&body).map_err(|e| {
        metrics::counter!("http_uplink_rejected_total").increment(1);
        ApiError::BadRequest(format!("invalid uplink JSON: {e}"))
    })?;

    let env = Envelope::new(uplink.into_reading(received_at.into()), received_at);
    let env = validate_reading(env).map_err(|e| {
        metrics::counter!("http_uplink_rejected_total").increment(1);
        ApiError::Unprocessable(e.to_string())
    })?;

    if let Some(archive) = &state.archive {
        let reading = &env.payload;
        if let Err(e) = archive
            .write(&reading.device_name, &reading.device_id, env.received_at_utc(), &body)
            .await
        {
            metrics::counter!("uplink_archive_failures_total").increment(1);
            tracing::warn!(error = %e, device_id = %reading.device_id, "failed to archive raw uplink");
        }
    }

    let reading = state.store.insert_reading(&env.payload).await.inspect_err(|e| {
        metrics::counter!("reading_insert_errors_total").increment(1);
        tracing::error!(error = %e, device_id = %env.payload.device_id, "reading insert failed");
    })?;

    metrics::counter!("readings_inserted_total").increment(1);
    tracing::debug!(id = reading.id, device_id = %reading.device_id, "reading stored");

    Ok((StatusCode::CREATED, Json(reading)))
}
