// Domain layer - Telemetry records and the shapes derived from them
pub mod compass;
pub mod series;
pub mod telemetry;
pub mod weather_calc;
