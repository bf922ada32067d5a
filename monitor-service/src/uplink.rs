//! Uplink envelope as posted by the network server.
//!
//! Only the fields the dashboard stores are modelled; everything else in the
//! envelope (radio metadata, fPort, raw payload) is ignored on parse.

use energy_client::domain::NewReading;
use serde::Deserialize;
use time::OffsetDateTime;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Uplink {
    #[serde(default)]
    pub device_info: DeviceInfo,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub time: Option<OffsetDateTime>,
    #[serde(default)]
    pub object: Option<Channels>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    #[serde(default)]
    pub dev_eui: Option<String>,
    #[serde(default)]
    pub device_name: Option<String>,
}

/// Decoded measurement channels. Any channel may be absent.
///
/// Decoders disagree on key names, and some emit more than one spelling of
/// the same channel, so every spelling is its own field. The first key in
/// declaration order wins.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Channels {
    #[serde(default)]
    voltage: Option<f64>,
    #[serde(default)]
    voltage_v: Option<f64>,
    #[serde(default)]
    current: Option<f64>,
    #[serde(default)]
    current_a: Option<f64>,
    #[serde(default)]
    active_power: Option<f64>,
    #[serde(default, rename = "activePower")]
    active_power_camel: Option<f64>,
    #[serde(default)]
    power: Option<f64>,
    #[serde(default)]
    energy: Option<f64>,
    #[serde(default)]
    energy_kwh: Option<f64>,
    #[serde(default)]
    kwh: Option<f64>,
}

impl Channels {
    pub fn voltage(&self) -> Option<f64> {
        self.voltage.or(self.voltage_v)
    }

    pub fn current(&self) -> Option<f64> {
        self.current.or(self.current_a)
    }

    pub fn active_power(&self) -> Option<f64> {
        self.active_power.or(self.active_power_camel).or(self.power)
    }

    pub fn energy(&self) -> Option<f64> {
        self.energy.or(self.energy_kwh).or(self.kwh)
    }
}

impl Uplink {
    /// Extract the stored fields. `received_at` stands in for a missing
    /// device timestamp and a missing device name falls back to the id.
    pub fn into_reading(self, received_at: OffsetDateTime) -> NewReading {
        let device_id = self
            .device_info
            .dev_eui
            .map(|id| id.trim().to_string())
            .unwrap_or_default();
        let device_name = self
            .device_info
            .device_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| device_id.clone());
        let channels = self.object.unwrap_or_default();

        NewReading {
            device_id,
            device_name,
            ts: self.time.unwrap_or(received_at),
            voltage_v: channels.voltage(),
            current_a: channels.current(),
            active_power_w: channels.active_power(),
            energy_kwh: channels.energy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const RECEIVED: OffsetDateTime = datetime!(2026-10-16 12:00:00 UTC);

    fn parse(json: &str) -> NewReading {
        let uplink: Uplink = serde_json::from_str(json).unwrap();
        uplink.into_reading(RECEIVED)
    }

    #[test]
    fn extracts_full_envelope() {
        let r = parse(
            r#"{
                "deviceInfo": {"devEui": "a84041000181c61e", "deviceName": "meter-01", "tenantName": "x"},
                "time": "2026-10-16T10:15:00Z",
                "fPort": 2,
                "object": {"voltage": 231.4, "current": 1.92, "active_power": 420.0, "energy": 1834.2}
            }"#,
        );

        assert_eq!(r.device_id, "a84041000181c61e");
        assert_eq!(r.device_name, "meter-01");
        assert_eq!(r.ts, datetime!(2026-10-16 10:15:00 UTC));
        assert_eq!(r.voltage_v, Some(231.4));
        assert_eq!(r.current_a, Some(1.92));
        assert_eq!(r.active_power_w, Some(420.0));
        assert_eq!(r.energy_kwh, Some(1834.2));
    }

    #[test]
    fn omitted_channels_become_none() {
        let r = parse(r#"{"deviceInfo": {"devEui": "dev-1"}, "object": {"voltage": 229.9}}"#);

        assert_eq!(r.voltage_v, Some(229.9));
        assert_eq!(r.current_a, None);
        assert_eq!(r.active_power_w, None);
        assert_eq!(r.energy_kwh, None);
    }

    #[test]
    fn missing_time_and_name_use_fallbacks() {
        let r = parse(r#"{"deviceInfo": {"devEui": "dev-1", "deviceName": " "}, "object": null}"#);

        assert_eq!(r.ts, RECEIVED);
        assert_eq!(r.device_name, "dev-1");
        assert_eq!(r.energy_kwh, None);
    }

    #[test]
    fn channel_aliases_are_accepted() {
        let r = parse(r#"{"deviceInfo": {"devEui": "dev-1"}, "object": {"activePower": 12.5, "kwh": 3.0}}"#);

        assert_eq!(r.active_power_w, Some(12.5));
        assert_eq!(r.energy_kwh, Some(3.0));
    }

    #[test]
    fn several_spellings_of_one_channel_do_not_conflict() {
        let r = parse(
            r#"{"deviceInfo": {"devEui": "dev-1"},
                "object": {"power": 5.0, "active_power": 6.0, "voltage_v": 230.0, "voltage": 231.0, "kwh": 7.0}}"#,
        );

        assert_eq!(r.active_power_w, Some(6.0));
        assert_eq!(r.voltage_v, Some(231.0));
        assert_eq!(r.energy_kwh, Some(7.0));
        assert_eq!(r.current_a, None);
    }

    #[test]
    fn missing_device_info_yields_empty_id() {
        let r = parse(r#"{"object": {"voltage": 230.0}}"#);
        assert!(r.device_id.is_empty());
    }
}
