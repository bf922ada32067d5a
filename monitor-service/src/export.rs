//! Spreadsheet export of reading tables.

use energy_client::domain::Reading;
use time::format_description::well_known::Rfc3339;

pub const EXPORT_HEADER: [&str; 8] = [
    "id",
    "device_id",
    "device_name",
    "ts",
    "voltage_v",
    "current_a",
    "active_power_w",
    "energy_kwh",
];

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Render readings as CSV, one record per reading in the given order.
/// NULL channels become empty cells.
pub fn readings_to_csv(readings: &[Reading]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADER)?;

    for r in readings {
        writer.write_record([
            r.id.to_string(),
            r.device_id.clone(),
            r.device_name.clone(),
            r.ts.format(&Rfc3339)?,
            cell(r.voltage_v),
            cell(r.current_a),
            cell(r.active_power_w),
            cell(r.energy_kwh),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))
}
