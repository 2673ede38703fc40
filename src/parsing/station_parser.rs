use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::path::Path;

use crate::core::domain::{PhysicalConfiguration, Station, StationCatalog};

/// Custom deserializer that accepts either string or integer for station id
fn deserialize_station_id<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrInt {
        String(String),
        Int(u32),
    }

    match StringOrInt::deserialize(deserializer)? {
        StringOrInt::String(s) => s.parse::<u32>().map_err(D::Error::custom),
        StringOrInt::Int(i) => Ok(i),
    }
}

/// Raw JSON structure for one station entry.
///
/// Only the fields the aggregation pipeline needs are deserialized; the
/// presentation fields of the document (name, address, rental methods,
/// groups, obcn, cross street and the rest) are never materialized.
#[derive(Debug, Deserialize)]
struct RawStation {
    #[serde(deserialize_with = "deserialize_station_id")]
    station_id: u32,
    lat: f64,
    lon: f64,
    altitude: Option<f64>,
    capacity: u32,
    physical_configuration: Option<PhysicalConfiguration>,
}

/// Raw JSON structure for the document payload
#[derive(Debug, Deserialize)]
struct StationData {
    stations: Vec<RawStation>,
}

/// Container for the station information document
#[derive(Debug, Deserialize)]
struct StationInformationJson {
    data: StationData,
}

/// Parse a station information document into a [`StationCatalog`]
pub fn parse_station_information(json_path: &Path) -> Result<StationCatalog> {
    let json_content = std::fs::read_to_string(json_path)
        .with_context(|| format!("Failed to read station file: {}", json_path.display()))?;

    parse_station_information_str(&json_content)
}

/// Parse a station information document from a string
pub fn parse_station_information_str(json_str: &str) -> Result<StationCatalog> {
    let json_value: serde_json::Value = serde_json::from_str(json_str).with_context(|| {
        let preview = if json_str.len() > 500 {
            format!("{}...", &json_str[..500])
        } else {
            json_str.to_string()
        };
        format!("Invalid JSON syntax. First 500 chars: {}", preview)
    })?;

    // The document must carry the {"data": {"stations": [...]}} envelope
    let stations_value = json_value
        .get("data")
        .and_then(|d| d.get("stations"))
        .with_context(|| {
            format!(
                "JSON must contain a 'data.stations' key. Found keys: {:?}",
                json_value.as_object().map(|o| o.keys().collect::<Vec<_>>())
            )
        })?;

    if !stations_value.is_array() {
        anyhow::bail!("'data.stations' must be an array");
    }

    let document: StationInformationJson =
        serde_json::from_value(json_value.clone()).map_err(|e| {
            let error_msg = format!("Station deserialization error: {}", e);

            // Deserialize entries one by one to name the offending station
            if let Some(entries) = stations_value.as_array() {
                for (idx, entry) in entries.iter().enumerate() {
                    if let Err(entry_err) = serde_json::from_value::<RawStation>(entry.clone()) {
                        return anyhow::anyhow!(
                            "{}\nError in station at index {}: {}",
                            error_msg,
                            idx,
                            entry_err
                        );
                    }
                }
            }

            anyhow::anyhow!("{}", error_msg)
        })?;

    let stations = document
        .data
        .stations
        .into_iter()
        .map(convert_raw_to_domain)
        .collect();

    Ok(StationCatalog::from_stations(stations))
}

/// Convert a raw feed entry into a domain station
fn convert_raw_to_domain(raw: RawStation) -> Station {
    Station {
        id: raw.station_id,
        lat: raw.lat,
        lon: raw.lon,
        altitude: raw.altitude,
        capacity: raw.capacity,
        configuration: raw
            .physical_configuration
            .unwrap_or(PhysicalConfiguration::Unknown),
    }
}
