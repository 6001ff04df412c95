// Compass helpers for wind direction display
use serde::Serialize;

pub const CARDINALS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

const SECTOR_DEGREES: f64 = 360.0 / 16.0;

/// Smallest axis extent used for the wind vector chart, so a calm batch
/// still gets a drawable plot.
const MIN_AXIS_EXTENT: f64 = 1.0;

/// Map a bearing in degrees to one of the 16 compass points.
///
/// Out-of-range bearings (negative, or 360 and above) are wrapped first;
/// direction sensors jitter across north.
pub fn direction_to_cardinal(degrees: f64) -> &'static str {
    let normalized = degrees.rem_euclid(360.0);
    let index = (normalized / SECTOR_DEGREES).round() as usize % CARDINALS.len();
    CARDINALS[index]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTick {
    pub value: f64,
    pub label: &'static str,
}

/// Axis bounds and compass tick labels for the wind vector scatter plot.
///
/// The projection is `x = cos(θ)·speed`, `y = sin(θ)·speed`, so north lies
/// on +x and east on +y. Ticks sit at the extent of the data, not at a fixed
/// speed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompassAxis {
    pub extent: f64,
    pub x_ticks: Vec<AxisTick>,
    pub y_ticks: Vec<AxisTick>,
}

impl CompassAxis {
    pub fn from_max_speed(max_speed: f64) -> Self {
        let extent = if max_speed.is_finite() {
            max_speed.abs().max(MIN_AXIS_EXTENT)
        } else {
            MIN_AXIS_EXTENT
        };

        Self {
            extent,
            x_ticks: vec![
                AxisTick { value: -extent, label: "S" },
                AxisTick { value: extent, label: "N" },
            ],
            y_ticks: vec![
                AxisTick { value: -extent, label: "W" },
                AxisTick { value: extent, label: "E" },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cardinal_points() {
        assert_eq!(direction_to_cardinal(0.0), "N");
        assert_eq!(direction_to_cardinal(90.0), "E");
        assert_eq!(direction_to_cardinal(180.0), "S");
        assert_eq!(direction_to_cardinal(270.0), "W");
        assert_eq!(direction_to_cardinal(22.5), "NNE");
        assert_eq!(direction_to_cardinal(337.5), "NNW");
    }

    #[test]
    fn test_every_bearing_in_range_maps_to_a_known_label() {
        let mut degrees = 0.0;
        while degrees < 360.0 {
            let label = direction_to_cardinal(degrees);
            assert!(CARDINALS.contains(&label), "{degrees} -> {label}");
            degrees += 0.25;
        }
    }

    #[test]
    fn test_near_north_wraps_to_n() {
        assert_eq!(direction_to_cardinal(355.0), "N");
        assert_eq!(direction_to_cardinal(359.99), "N");
    }

    #[test]
    fn test_out_of_range_bearings_are_normalized() {
        assert_eq!(direction_to_cardinal(-10.0), direction_to_cardinal(350.0));
        assert_eq!(direction_to_cardinal(370.0), direction_to_cardinal(10.0));
        assert_eq!(direction_to_cardinal(-370.0), direction_to_cardinal(350.0));
        assert_eq!(direction_to_cardinal(720.0), "N");
    }

    #[test]
    fn test_compass_axis_scales_with_data() {
        let axis = CompassAxis::from_max_speed(12.5);
        assert_eq!(axis.extent, 12.5);
        assert_eq!(axis.x_ticks[1], AxisTick { value: 12.5, label: "N" });
        assert_eq!(axis.y_ticks[0], AxisTick { value: -12.5, label: "W" });
    }

    #[test]
    fn test_compass_axis_has_floor_for_calm_air() {
        assert_eq!(CompassAxis::from_max_speed(0.0).extent, 1.0);
        assert_eq!(CompassAxis::from_max_speed(f64::NAN).extent, 1.0);
    }
}
