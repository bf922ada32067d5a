use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One persisted measurement from a field device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reading {
    pub id: i64,
    pub device_id: String,
    pub device_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub ts: OffsetDateTime,
    pub voltage_v: Option<f64>,
    pub current_a: Option<f64>,
    pub active_power_w: Option<f64>,
    pub energy_kwh: Option<f64>,
}

/// A reading that has not been assigned a database identity yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReading {
    pub device_id: String,
    pub device_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub ts: OffsetDateTime,
    pub voltage_v: Option<f64>,
    pub current_a: Option<f64>,
    pub active_power_w: Option<f64>,
    pub energy_kwh: Option<f64>,
}

impl NewReading {
    pub fn with_id(self, id: i64) -> Reading {
        Reading {
            id,
            device_id: self.device_id,
            device_name: self.device_name,
            ts: self.ts,
            voltage_v: self.voltage_v,
            current_a: self.current_a,
            active_power_w: self.active_power_w,
            energy_kwh: self.energy_kwh,
        }
    }
}
