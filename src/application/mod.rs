// Application layer - Series building and the refresh loop
pub mod refresh_scheduler;
pub mod renderer;
pub mod series_builder;
pub mod telemetry_source;
