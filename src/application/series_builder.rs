// Series builder - turns a history batch into chart-ready series
use chrono::{DateTime, FixedOffset, Local, Utc};

use crate::domain::compass::CompassAxis;
use crate::domain::series::{ChartPoint, ChartSeries, MinMax, SeriesSet, WindVectorPoint};
use crate::domain::telemetry::{Metric, TelemetryRecord};
use crate::domain::weather_calc::fill_derived;
use crate::error::DashboardError;

pub const PLACEHOLDER_LABEL: &str = "--:--";

/// Time zone used for axis labels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LabelZone {
    Local,
    Fixed(FixedOffset),
}

/// Stateless conversion of telemetry records into series. Holds only
/// presentation settings; every call works on the batch it is given.
#[derive(Debug, Clone)]
pub struct SeriesBuilder {
    zone: LabelZone,
    derive_missing: bool,
}

impl Default for SeriesBuilder {
    fn default() -> Self {
        Self::new(LabelZone::Local, false)
    }
}

impl SeriesBuilder {
    pub fn new(zone: LabelZone, derive_missing: bool) -> Self {
        Self {
            zone,
            derive_missing,
        }
    }

    /// Apply the configured derivation to a single record. Used for the
    /// current snapshot so it matches what the history charts show.
    pub fn prepare_record(&self, record: TelemetryRecord) -> TelemetryRecord {
        if self.derive_missing {
            fill_derived(&record)
        } else {
            record
        }
    }

    /// Short hour:minute label per record, in input order.
    pub fn build_labels(&self, records: &[TelemetryRecord]) -> Vec<String> {
        records.iter().map(|r| self.label_for(r.timestamp)).collect()
    }

    fn label_for(&self, timestamp: Option<i64>) -> String {
        let Some(instant) = timestamp.and_then(DateTime::<Utc>::from_timestamp_millis) else {
            return PLACEHOLDER_LABEL.to_string();
        };
        match self.zone {
            LabelZone::Local => instant.with_timezone(&Local).format("%H:%M").to_string(),
            LabelZone::Fixed(offset) => instant.with_timezone(&offset).format("%H:%M").to_string(),
        }
    }

    /// One value per record; missing values stay in place as `None` so the
    /// series lines up with the labels.
    pub fn build_metric_series(&self, records: &[TelemetryRecord], metric: Metric) -> Vec<Option<f64>> {
        records.iter().map(|r| r.value(metric)).collect()
    }

    pub fn build_wind_vectors(&self, records: &[TelemetryRecord]) -> Vec<Option<WindVectorPoint>> {
        records
            .iter()
            .map(|r| {
                let speed = r.value(Metric::WindSpeed)?;
                let theta = r.value(Metric::WindDirection)?.to_radians();
                Some(WindVectorPoint {
                    x: theta.cos() * speed,
                    y: theta.sin() * speed,
                })
            })
            .collect()
    }

    /// Regenerate every series for a history batch.
    pub fn build(&self, records: &[TelemetryRecord]) -> SeriesSet {
        let derived;
        let records = if self.derive_missing {
            derived = records.iter().map(fill_derived).collect::<Vec<_>>();
            derived.as_slice()
        } else {
            records
        };

        let labels = self.build_labels(records);

        let series: Vec<ChartSeries> = Metric::ALL
            .into_iter()
            .map(|metric| {
                let values = self.build_metric_series(records, metric);
                let range = match compute_min_max(&values) {
                    Ok(range) => Some(range),
                    Err(e) => {
                        tracing::debug!("No data for {}: {}", metric, e);
                        None
                    }
                };
                let points = labels
                    .iter()
                    .zip(values)
                    .map(|(label, value)| ChartPoint {
                        label: label.clone(),
                        value,
                    })
                    .collect();
                ChartSeries {
                    metric,
                    unit: metric.unit(),
                    points,
                    range,
                }
            })
            .collect();

        let max_speed = series
            .iter()
            .find(|s| s.metric == Metric::WindSpeed)
            .and_then(|s| s.range)
            .map(|r| r.max)
            .unwrap_or(0.0);

        SeriesSet {
            labels,
            series,
            wind_vectors: self.build_wind_vectors(records),
            wind_axis: CompassAxis::from_max_speed(max_speed),
        }
    }
}

/// Min and max over the non-null values of a series.
pub fn compute_min_max(series: &[Option<f64>]) -> Result<MinMax, DashboardError> {
    series
        .iter()
        .flatten()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc: Option<MinMax>, v| match acc {
            None => Some(MinMax { min: v, max: v }),
            Some(r) => Some(MinMax {
                min: r.min.min(v),
                max: r.max.max(v),
            }),
        })
        .ok_or(DashboardError::EmptySeries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn utc_builder() -> SeriesBuilder {
        SeriesBuilder::new(LabelZone::Fixed(FixedOffset::east_opt(0).unwrap()), false)
    }

    fn record(ts: i64, temperature: f64, humidity: Option<f64>) -> TelemetryRecord {
        TelemetryRecord {
            timestamp: Some(ts),
            temperature: Some(temperature),
            humidity,
            ..Default::default()
        }
    }

    // 2024-03-01T12:30:00Z
    const T0: i64 = 1_709_296_200_000;

    #[test]
    fn test_labels_are_hour_minute_in_configured_zone() {
        let records = vec![record(T0, 50.0, None), record(T0 + 5 * 60_000, 51.0, None)];
        assert_eq!(utc_builder().build_labels(&records), vec!["12:30", "12:35"]);

        let plus_two = SeriesBuilder::new(
            LabelZone::Fixed(FixedOffset::east_opt(2 * 3600).unwrap()),
            false,
        );
        assert_eq!(plus_two.build_labels(&records), vec!["14:30", "14:35"]);
    }

    #[test]
    fn test_missing_timestamp_gets_placeholder_label() {
        let mut records = vec![record(T0, 50.0, None), record(T0, 51.0, None)];
        records[1].timestamp = None;

        assert_eq!(utc_builder().build_labels(&records), vec!["12:30", PLACEHOLDER_LABEL]);
    }

    #[test]
    fn test_labels_and_series_are_index_aligned() {
        let records: Vec<_> = (0..7)
            .map(|i| record(T0 + i * 60_000, 40.0 + i as f64, (i % 2 == 0).then_some(50.0)))
            .collect();
        let builder = utc_builder();

        let labels = builder.build_labels(&records);
        assert_eq!(labels.len(), records.len());
        for metric in Metric::ALL {
            assert_eq!(builder.build_metric_series(&records, metric).len(), records.len());
        }
        assert_eq!(builder.build_wind_vectors(&records).len(), records.len());
    }

    #[test]
    fn test_metric_series_keeps_gaps_as_none() {
        let records = vec![
            record(T0, 70.0, Some(42.0)),
            record(T0 + 60_000, 71.0, None),
            record(T0 + 120_000, 72.0, Some(55.0)),
        ];
        let builder = utc_builder();

        assert_eq!(
            builder.build_metric_series(&records, Metric::Humidity),
            vec![Some(42.0), None, Some(55.0)]
        );
        assert_eq!(
            builder.build_metric_series(&records, Metric::Temperature),
            vec![Some(70.0), Some(71.0), Some(72.0)]
        );
    }

    #[test]
    fn test_wind_vectors_project_direction_and_speed() {
        let records = vec![
            TelemetryRecord {
                wind_speed: Some(10.0),
                wind_direction: Some(0.0),
                ..Default::default()
            },
            TelemetryRecord {
                wind_speed: Some(4.0),
                wind_direction: Some(90.0),
                ..Default::default()
            },
            TelemetryRecord {
                wind_speed: Some(4.0),
                ..Default::default()
            },
        ];
        let vectors = utc_builder().build_wind_vectors(&records);

        let north = vectors[0].unwrap();
        assert!((north.x - 10.0).abs() < 1e-9 && north.y.abs() < 1e-9);
        let east = vectors[1].unwrap();
        assert!(east.x.abs() < 1e-9 && (east.y - 4.0).abs() < 1e-9);
        assert_eq!(vectors[2], None);
    }

    #[test]
    fn test_min_max_skips_nulls() {
        let series = vec![Some(1.0), None, Some(3.0), None, Some(5.0)];
        assert_eq!(compute_min_max(&series), Ok(MinMax { min: 1.0, max: 5.0 }));
        assert_eq!(series.len(), 5);
    }

    #[test]
    fn test_min_max_of_all_null_series_is_empty() {
        assert_eq!(compute_min_max(&[None, None]), Err(DashboardError::EmptySeries));
        assert_eq!(compute_min_max(&[]), Err(DashboardError::EmptySeries));
    }

    #[test]
    fn test_build_three_record_batch_end_to_end() {
        let records = vec![
            record(T0, 70.0, Some(42.0)),
            record(T0 + 60_000, 71.0, None),
            record(T0 + 120_000, 72.0, Some(55.0)),
        ];
        let set = utc_builder().build(&records);

        assert_eq!(set.len(), 3);
        assert_eq!(set.labels, vec!["12:30", "12:31", "12:32"]);

        let humidity = set.get(Metric::Humidity).unwrap();
        assert_eq!(humidity.values(), vec![Some(42.0), None, Some(55.0)]);
        assert_eq!(humidity.range, Some(MinMax { min: 42.0, max: 55.0 }));
        assert_eq!(humidity.points[1].label, "12:31");

        let temperature = set.get(Metric::Temperature).unwrap();
        assert_eq!(temperature.values(), vec![Some(70.0), Some(71.0), Some(72.0)]);

        // no wind data in this batch
        assert_eq!(set.get(Metric::WindSpeed).unwrap().range, None);
        assert_eq!(set.wind_axis.extent, 1.0);
    }

    #[test]
    fn test_build_derives_missing_values_when_enabled() {
        let records = vec![TelemetryRecord {
            timestamp: Some(T0),
            temperature: Some(90.0),
            humidity: Some(50.0),
            ..Default::default()
        }];
        let plain = utc_builder().build(&records);
        assert_eq!(plain.get(Metric::HeatIndex).unwrap().values(), vec![None]);

        let deriving =
            SeriesBuilder::new(LabelZone::Fixed(FixedOffset::east_opt(0).unwrap()), true);
        let set = deriving.build(&records);
        assert!(set.get(Metric::HeatIndex).unwrap().values()[0].is_some());
        assert!(set.get(Metric::DewPoint).unwrap().values()[0].is_some());
    }

    #[test]
    fn test_prepare_record_only_fills_when_enabled() {
        let record = TelemetryRecord {
            temperature: Some(90.0),
            humidity: Some(50.0),
            wind_speed: Some(10.0),
            ..Default::default()
        };
        assert_eq!(utc_builder().prepare_record(record.clone()), record);

        let deriving =
            SeriesBuilder::new(LabelZone::Fixed(FixedOffset::east_opt(0).unwrap()), true);
        let filled = deriving.prepare_record(record);
        assert!(filled.heat_index.unwrap() > 90.0);
        assert!(filled.dew_point.is_some());
        assert_eq!(filled.wind_chill, Some(90.0));
    }

    #[test]
    fn test_wind_axis_follows_max_speed() {
        let records = vec![
            TelemetryRecord {
                wind_speed: Some(3.0),
                wind_direction: Some(45.0),
                ..Default::default()
            },
            TelemetryRecord {
                wind_speed: Some(17.5),
                wind_direction: Some(200.0),
                ..Default::default()
            },
        ];
        let set = utc_builder().build(&records);
        assert_eq!(set.wind_axis.extent, 17.5);
    }
}
