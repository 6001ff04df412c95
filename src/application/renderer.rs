// Rendering contracts and current-value formatting
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::domain::compass::direction_to_cardinal;
use crate::domain::series::SeriesSet;
use crate::domain::telemetry::TelemetryRecord;

pub const MISSING_VALUE: &str = "--";

/// Receives each newly applied current snapshot.
pub trait CurrentValuesRenderer: Send + Sync {
    fn render_current_values(&self, record: &TelemetryRecord);
}

/// Receives each newly built series set.
pub trait SeriesRenderer: Send + Sync {
    fn render_series(&self, series: &SeriesSet);
}

/// The on-screen numeric panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Readout {
    Temperature,
    Humidity,
    Pressure,
    Wind,
    WindChill,
    HeatIndex,
    DewPoint,
    UvIndex,
    Rain,
}

impl Readout {
    pub const ALL: [Readout; 9] = [
        Readout::Temperature,
        Readout::Humidity,
        Readout::Pressure,
        Readout::Wind,
        Readout::WindChill,
        Readout::HeatIndex,
        Readout::DewPoint,
        Readout::UvIndex,
        Readout::Rain,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Readout::Temperature => "temperature",
            Readout::Humidity => "humidity",
            Readout::Pressure => "pressure",
            Readout::Wind => "wind",
            Readout::WindChill => "wind_chill",
            Readout::HeatIndex => "heat_index",
            Readout::DewPoint => "dew_point",
            Readout::UvIndex => "uv_index",
            Readout::Rain => "rain",
        }
    }

    pub fn format(self, record: &TelemetryRecord) -> String {
        let text = match self {
            Readout::Temperature => record.temperature.map(fahrenheit),
            Readout::WindChill => record.wind_chill.map(fahrenheit),
            Readout::HeatIndex => record.heat_index.map(fahrenheit),
            Readout::DewPoint => record.dew_point.map(fahrenheit),
            Readout::Humidity => record.humidity.map(|h| format!("{}%", h.round())),
            Readout::Pressure => record.pressure.map(|p| format!("{:.1} mbar", p)),
            Readout::Wind => record.wind_speed.map(|speed| match record.wind_direction {
                Some(dir) => format!("{:.1} mph {}", speed, direction_to_cardinal(dir)),
                None => format!("{:.1} mph", speed),
            }),
            Readout::UvIndex => record.uv_index.map(|uv| format!("{:.1}", uv)),
            Readout::Rain => record.rain.map(|r| format!("{:.2} in", r)),
        };
        text.unwrap_or_else(|| MISSING_VALUE.to_string())
    }
}

impl fmt::Display for Readout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn fahrenheit(v: f64) -> String {
    format!("{:.1}°F", v)
}

/// Explicit readout → display target mapping. Readouts without an entry use
/// their own name as the target id.
#[derive(Debug, Clone, Default)]
pub struct DisplayTargets {
    targets: HashMap<Readout, String>,
}

impl DisplayTargets {
    pub fn new(targets: HashMap<Readout, String>) -> Self {
        Self { targets }
    }

    pub fn target(&self, readout: Readout) -> &str {
        self.targets
            .get(&readout)
            .map(String::as_str)
            .unwrap_or_else(|| readout.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayValue {
    pub target: String,
    pub readout: Readout,
    pub text: String,
}

pub fn format_current_values(record: &TelemetryRecord, targets: &DisplayTargets) -> Vec<DisplayValue> {
    Readout::ALL
        .into_iter()
        .map(|readout| DisplayValue {
            target: targets.target(readout).to_string(),
            readout,
            text: readout.format(record),
        })
        .collect()
}
