// In-memory rendering target served over HTTP
use serde::Serialize;
use std::sync::{PoisonError, RwLock};

use crate::application::renderer::{
    format_current_values, CurrentValuesRenderer, DisplayTargets, DisplayValue, SeriesRenderer,
};
use crate::domain::series::SeriesSet;
use crate::domain::telemetry::TelemetryRecord;

#[derive(Debug, Clone, Serialize)]
pub struct CurrentView {
    pub readouts: Vec<DisplayValue>,
    pub record: TelemetryRecord,
}

/// Holds the last rendered readouts and charts. Each render replaces the
/// previous view wholesale.
#[derive(Debug, Default)]
pub struct DashboardStore {
    targets: DisplayTargets,
    current: RwLock<Option<CurrentView>>,
    series: RwLock<Option<SeriesSet>>,
}

impl DashboardStore {
    pub fn new(targets: DisplayTargets) -> Self {
        Self {
            targets,
            current: RwLock::new(None),
            series: RwLock::new(None),
        }
    }

    pub fn current(&self) -> Option<CurrentView> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn series(&self) -> Option<SeriesSet> {
        self.series
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CurrentValuesRenderer for DashboardStore {
    fn render_current_values(&self, record: &TelemetryRecord) {
        let view = CurrentView {
            readouts: format_current_values(record, &self.targets),
            record: record.clone(),
        };
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(view);
    }
}

impl SeriesRenderer for DashboardStore {
    fn render_series(&self, series: &SeriesSet) {
        if series.is_empty() {
            tracing::debug!("History batch is empty; charts will show no data");
        } else {
            tracing::debug!("Rendering {} chart series over {} points", series.series.len(), series.len());
        }
        *self.series.write().unwrap_or_else(PoisonError::into_inner) = Some(series.clone());
    }
}
