// Chart-ready series derived from a history batch
use serde::Serialize;

use super::compass::CompassAxis;
use super::telemetry::Metric;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MinMax {
    pub min: f64,
    pub max: f64,
}

/// Polar scatter projection of one record's wind reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindVectorPoint {
    pub x: f64,
    pub y: f64,
}

/// One metric over a whole history batch, index-aligned with the batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub metric: Metric,
    pub unit: Option<&'static str>,
    pub points: Vec<ChartPoint>,
    /// `None` when the series has no values at all ("no data").
    pub range: Option<MinMax>,
}

impl ChartSeries {
    #[cfg(test)]
    pub fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.value).collect()
    }
}

/// Everything the chart renderer needs for one refresh.
///
/// Rebuilt from scratch for each history batch; never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSet {
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
    pub wind_vectors: Vec<Option<WindVectorPoint>>,
    pub wind_axis: CompassAxis,
}

impl SeriesSet {
    pub fn get(&self, metric: Metric) -> Option<&ChartSeries> {
        self.series.iter().find(|s| s.metric == metric)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
