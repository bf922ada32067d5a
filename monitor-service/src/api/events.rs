//! Polling broadcaster.
//!
//! Every SSE client gets its own timer; dropping the connection drops the
//! stream and with it the timer. Identical consecutive readings are sent
//! again on every tick.

use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use energy_client::domain::Reading;
use futures::{Stream, StreamExt};
use tokio::time::MissedTickBehavior;

use super::ApiState;
use crate::store::ReadingStore;

pub const NEW_READING_EVENT: &str = "new-reading";

/// Re-query the latest reading every `period`, first tick immediately.
/// Ticks with no data or a failed query yield nothing.
pub fn latest_reading_stream(
    store: Arc<dyn ReadingStore>,
    period: Duration,
) -> impl Stream<Item = Reading> + Send + 'static {
    async_stream::stream! {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match store.latest_reading(None).await {
                Ok(Some(reading)) => yield reading,
                Ok(None) => {}
                Err(e) => {
                    metrics::counter!("reading_query_errors_total").increment(1);
                    tracing::warn!(error = %e, "latest reading query failed during broadcast tick");
                }
            }
        }
    }
}

/// `GET /api/events`
pub async fn reading_events(
    State(state): State<ApiState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    metrics::counter!("sse_clients_connected_total").increment(1);
    tracing::debug!("sse client connected");

    let events = latest_reading_stream(state.store.clone(), state.poll_interval).filter_map(|reading| async move {
        match Event::default().event(NEW_READING_EVENT).json_data(&reading) {
            Ok(event) => Some(Ok(event)),
            Err(e) => {
                tracing::warn!(error = %e, id = reading.id, "failed to encode reading event");
                None
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryReadingStore;
    use energy_client::domain::NewReading;
    use time::macros::datetime;

    #[tokio::test]
    async fn repeated_ticks_without_inserts_yield_same_reading() {
        let store = Arc::new(MemoryReadingStore::default());
        store
            .insert_reading(&NewReading {
                device_id: "dev-1".into(),
                device_name: "meter-01".into(),
                ts: datetime!(2026-10-16 10:00 UTC),
                voltage_v: Some(230.0),
                current_a: None,
                active_power_w: None,
                energy_kwh: Some(12.0),
            })
            .await
            .unwrap();

        let ticks: Vec<Reading> = latest_reading_stream(store, Duration::from_millis(5))
            .take(3)
            .collect()
            .await;

        assert_eq!(ticks.len(), 3);
        assert!(ticks.iter().all(|r| r == &ticks[0]));
        assert_eq!(ticks[0].energy_kwh, Some(12.0));
    }

    #[tokio::test]
    async fn stream_picks_up_newer_reading() {
        let store = Arc::new(MemoryReadingStore::default());
        let base = NewReading {
            device_id: "dev-1".into(),
            device_name: "meter-01".into(),
            ts: datetime!(2026-10-16 10:00 UTC),
            voltage_v: None,
            current_a: None,
            active_power_w: None,
            energy_kwh: Some(1.0),
        };
        store.insert_reading(&base).await.unwrap();

        let mut stream = Box::pin(latest_reading_stream(store.clone(), Duration::from_millis(5)));
        assert_eq!(stream.next().await.unwrap().energy_kwh, Some(1.0));

        store
            .insert_reading(&NewReading {
                ts: datetime!(2026-10-16 10:05 UTC),
                energy_kwh: Some(2.0),
                ..base
            })
            .await
            .unwrap();
        assert_eq!(stream.next().await.unwrap().energy_kwh, Some(2.0));
    }
}
