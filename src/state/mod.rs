// Radar state container and tracking session management

mod engine;
mod ticker;
mod update;

pub use engine::{EngineOptions, RadarEngine, TrackingError};
pub use update::{RadarSnapshot, RadarUpdate, TrackingStatus};

#[cfg(test)]
mod tests;
