// Derived weather values (dew point, wind chill, heat index), all in °F
use super::telemetry::TelemetryRecord;

const MAGNUS_A: f64 = 17.27;
const MAGNUS_B: f64 = 237.7;

pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

/// Dew point via the Magnus formula. Returns `None` for non-positive humidity,
/// where the logarithm is undefined.
pub fn dew_point_f(temp_f: f64, humidity: f64) -> Option<f64> {
    if humidity <= 0.0 {
        return None;
    }
    let temp_c = fahrenheit_to_celsius(temp_f);
    let alpha = (MAGNUS_A * temp_c) / (MAGNUS_B + temp_c) + (humidity / 100.0).ln();
    let mut dew_c = (MAGNUS_B * alpha) / (MAGNUS_A - alpha);

    // Magnus underestimates badly in very dry air
    if humidity <= 10.0 {
        dew_c = dew_c.max(temp_c - (100.0 - humidity) / 5.0);
    }

    Some(celsius_to_fahrenheit(dew_c))
}

/// NWS (2001) wind chill. Outside its validity range (above 50 °F or below
/// 3 mph) the air temperature is returned unchanged.
pub fn wind_chill_f(temp_f: f64, wind_mph: f64) -> f64 {
    if temp_f > 50.0 || wind_mph < 3.0 {
        return temp_f;
    }
    let v = wind_mph.powf(0.16);
    35.74 + 0.6215 * temp_f - 35.75 * v + 0.4275 * temp_f * v
}

/// Rothfusz heat index regression with the NWS dry/humid adjustments.
/// Below 80 °F the air temperature is returned unchanged.
pub fn heat_index_f(temp_f: f64, humidity: f64) -> f64 {
    if temp_f < 80.0 {
        return temp_f;
    }
    let t = temp_f;
    let rh = humidity;

    let mut hi = -42.379 + 2.04901523 * t + 10.14333127 * rh
        - 0.22475541 * t * rh
        - 0.00683783 * t * t
        - 0.05481717 * rh * rh
        + 0.00122874 * t * t * rh
        + 0.00085282 * t * rh * rh
        - 0.00000199 * t * t * rh * rh;

    if rh < 13.0 && t > 80.0 && t < 112.0 {
        hi -= ((13.0 - rh) / 4.0) * ((17.0 - (t - 95.0).abs()) / 17.0).sqrt();
    } else if rh > 85.0 && t > 80.0 && t < 87.0 {
        hi += ((rh - 85.0) / 10.0) * ((87.0 - t) / 5.0);
    }

    hi
}

/// Fill in dew point, wind chill and heat index when the feed left them out
/// but their inputs are present. Values the feed supplied are kept.
pub fn fill_derived(record: &TelemetryRecord) -> TelemetryRecord {
    let mut filled = record.clone();

    if let Some(temp) = record.temperature {
        if filled.dew_point.is_none() {
            filled.dew_point = record.humidity.and_then(|rh| dew_point_f(temp, rh));
        }
        if filled.wind_chill.is_none() {
            filled.wind_chill = record.wind_speed.map(|w| wind_chill_f(temp, w));
        }
        if filled.heat_index.is_none() {
            filled.heat_index = record.humidity.map(|rh| heat_index_f(temp, rh));
        }
    }

    filled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_dew_point_matches_reference() {
        // 20 °C at 50 % RH has a dew point of about 9.25 °C
        let dp = dew_point_f(68.0, 50.0).unwrap();
        assert!(close(dp, 48.66, 0.05), "got {dp}");
    }

    #[test]
    fn test_dew_point_undefined_for_zero_humidity() {
        assert_eq!(dew_point_f(70.0, 0.0), None);
    }

    #[test]
    fn test_dew_point_dry_air_floor() {
        let temp_f = 95.0;
        let dp = dew_point_f(temp_f, 5.0).unwrap();
        let floor = celsius_to_fahrenheit(fahrenheit_to_celsius(temp_f) - 19.0);
        assert!(dp >= floor - 1e-9);
    }

    #[test]
    fn test_wind_chill_nws_table_value() {
        assert!(close(wind_chill_f(0.0, 15.0), -19.4, 0.05));
    }

    #[test]
    fn test_wind_chill_passthrough_outside_range() {
        assert_eq!(wind_chill_f(60.0, 20.0), 60.0);
        assert_eq!(wind_chill_f(20.0, 2.0), 20.0);
    }

    #[test]
    fn test_heat_index_nws_table_value() {
        assert!(close(heat_index_f(90.0, 50.0), 94.6, 0.05));
        assert_eq!(heat_index_f(75.0, 90.0), 75.0);
    }

    #[test]
    fn test_fill_derived_keeps_supplied_values() {
        let record = TelemetryRecord {
            temperature: Some(40.0),
            humidity: Some(60.0),
            wind_speed: Some(10.0),
            wind_chill: Some(33.3),
            ..Default::default()
        };
        let filled = fill_derived(&record);

        assert_eq!(filled.wind_chill, Some(33.3));
        assert!(filled.dew_point.is_some());
        assert_eq!(filled.heat_index, Some(40.0));
    }

    #[test]
    fn test_fill_derived_without_temperature_is_a_no_op() {
        let record = TelemetryRecord {
            humidity: Some(60.0),
            wind_speed: Some(10.0),
            ..Default::default()
        };
        assert_eq!(fill_derived(&record), record);
    }
}
