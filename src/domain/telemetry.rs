// Telemetry data domain models
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DashboardError;

/// One sampled observation from the weather station.
///
/// Every measurement is optional: the feed may omit a field or send `null`,
/// and consumers have to keep going either way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// Milliseconds since the Unix epoch.
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub pressure: Option<f64>,
    #[serde(default, alias = "windSpeed")]
    pub wind_speed: Option<f64>,
    #[serde(default, alias = "windDirection")]
    pub wind_direction: Option<f64>,
    #[serde(default, alias = "windChill")]
    pub wind_chill: Option<f64>,
    #[serde(default, alias = "heatIndex")]
    pub heat_index: Option<f64>,
    #[serde(default, alias = "dewPoint")]
    pub dew_point: Option<f64>,
    #[serde(default, alias = "uvIndex")]
    pub uv_index: Option<f64>,
    #[serde(default)]
    pub rain: Option<f64>,
}

impl TelemetryRecord {
    pub fn value(&self, metric: Metric) -> Option<f64> {
        let value = match metric {
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
            Metric::Pressure => self.pressure,
            Metric::WindSpeed => self.wind_speed,
            Metric::WindDirection => self.wind_direction,
            Metric::WindChill => self.wind_chill,
            Metric::HeatIndex => self.heat_index,
            Metric::DewPoint => self.dew_point,
            Metric::UvIndex => self.uv_index,
            Metric::Rain => self.rain,
        };
        // NaN cannot travel through JSON, but a hand-built record may carry one
        value.filter(|v| v.is_finite())
    }
}

// The backend encodes timestamps as RFC 3339 strings; other producers send
// epoch milliseconds. Anything unreadable becomes None instead of failing the batch.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        serde_json::Value::String(s) => chrono::DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|t| t.timestamp_millis()),
        _ => None,
    }))
}

/// The numeric fields of a [`TelemetryRecord`] that can be charted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Temperature,
    Humidity,
    Pressure,
    WindSpeed,
    WindDirection,
    WindChill,
    HeatIndex,
    DewPoint,
    UvIndex,
    Rain,
}

impl Metric {
    pub const ALL: [Metric; 10] = [
        Metric::Temperature,
        Metric::Humidity,
        Metric::Pressure,
        Metric::WindSpeed,
        Metric::WindDirection,
        Metric::WindChill,
        Metric::HeatIndex,
        Metric::DewPoint,
        Metric::UvIndex,
        Metric::Rain,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Metric::Temperature => "temperature",
            Metric::Humidity => "humidity",
            Metric::Pressure => "pressure",
            Metric::WindSpeed => "wind_speed",
            Metric::WindDirection => "wind_direction",
            Metric::WindChill => "wind_chill",
            Metric::HeatIndex => "heat_index",
            Metric::DewPoint => "dew_point",
            Metric::UvIndex => "uv_index",
            Metric::Rain => "rain",
        }
    }

    pub fn unit(self) -> Option<&'static str> {
        match self {
            Metric::Temperature | Metric::WindChill | Metric::HeatIndex | Metric::DewPoint => {
                Some("°F")
            }
            Metric::Humidity => Some("%"),
            Metric::Pressure => Some("mbar"),
            Metric::WindSpeed => Some("mph"),
            Metric::WindDirection => Some("°"),
            Metric::Rain => Some("in"),
            Metric::UvIndex => None,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| DashboardError::UnknownMetric(s.to_string()))
    }
}
