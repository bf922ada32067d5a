use energy_client::domain::NewReading;

use crate::pipeline::{Envelope, PipelineError, Transform};

/// Presence checks on an extracted reading.
///
/// Only identity fields are checked; channel values are stored as sent.
pub fn validate_reading(env: Envelope<NewReading>) -> Result<Envelope<NewReading>, PipelineError> {
    let r = &env.payload;

    if r.device_id.trim().is_empty() {
        return Err(PipelineError::Transform("deviceInfo.devEui is required".to_string()));
    }
    if r.device_name.trim().is_empty() {
        return Err(PipelineError::Transform("device name must not be blank".to_string()));
    }

    Ok(env)
}

#[derive(Clone, Default)]
pub struct ReadingValidation;

#[async_trait::async_trait]
impl Transform<NewReading, NewReading> for ReadingValidation {
    async fn apply(&self, input: Envelope<NewReading>) -> Result<Envelope<NewReading>, PipelineError> {
        validate_reading(input).inspect_err(|_| {
            metrics::counter!("validation_reading_rejected_total").increment(1);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn envelope(device_id: &str, device_name: &str) -> Envelope<NewReading> {
        Envelope::new(
            NewReading {
                device_id: device_id.to_string(),
                device_name: device_name.to_string(),
                ts: datetime!(2026-01-01 00:00:00 UTC),
                voltage_v: Some(230.0),
                current_a: None,
                active_power_w: None,
                energy_kwh: None,
            },
            std::time::SystemTime::now(),
        )
    }

    #[test]
    fn accepts_reading_with_identity() {
        assert!(validate_reading(envelope("dev-1", "meter-01")).is_ok());
    }

    #[test]
    fn rejects_blank_device_id() {
        let res = validate_reading(envelope("  ", "meter-01"));
        assert!(matches!(res, Err(PipelineError::Transform(_))));
    }

    #[test]
    fn rejects_blank_device_name() {
        let res = validate_reading(envelope("dev-1", ""));
        assert!(matches!(res, Err(PipelineError::Transform(_))));
    }

    #[tokio::test]
    async fn transform_passes_valid_reading_through() {
        let out = ReadingValidation.apply(envelope("dev-1", "meter-01")).await.unwrap();
        assert_eq!(out.payload.device_id, "dev-1");
    }
}
