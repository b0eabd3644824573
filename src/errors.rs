use crate::core::heating_systems::common::SystemId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Profile has {actual} points but {expected} were expected for a {resolution_minutes}-minute resolution")]
    ProfileLengthMismatch {
        expected: usize,
        actual: usize,
        resolution_minutes: u32,
    },
    #[error("A timeline resolution of {0} minutes does not divide a day evenly")]
    InvalidResolution(u32),
    #[error("Parameter '{name}' must be a positive finite number, but was {value}")]
    NonPositiveParameter { name: &'static str, value: f64 },
    #[error("System '{system_id}' mixes the boiler-efficiency and heat-pump COP tracks; exactly one applies")]
    ConflictingEfficiencyTracks { system_id: SystemId },
    #[error("Water use event must start before it ends within the day, but ran from minute {start_minute} to minute {end_minute}")]
    InvalidEventWindow { start_minute: u32, end_minute: u32 },
    #[error("The 'current system' alias was used but no current system was supplied to resolve it against")]
    UnresolvableCurrentSystem,
    #[error("Request was considered invalid due to error: {0}")]
    InvalidRequest(#[from] anyhow::Error),
}

/// A divergence between the demand timelines of two runs that were meant to
/// share one. Always indicates a bug in a dispatch strategy, never a normal
/// runtime condition.
#[derive(Debug, Error)]
#[error("Demand series '{series}' diverges between compared runs at step {index}: {a} vs {b}")]
pub struct FairnessError {
    pub series: &'static str,
    pub index: usize,
    pub a: f64,
    pub b: f64,
}
