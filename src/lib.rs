#[macro_use]
extern crate is_close;

mod compare_floats;
pub mod comparison;
pub mod core;
pub mod errors;
pub mod input;
pub mod output;
pub mod simulation_time;

pub use crate::comparison::{assert_demand_parity, run_comparison, ComparisonResult};
pub use crate::core::solver::{run_simulation, DemandTimeline};
pub use crate::errors::{CoreError, FairnessError};
pub use crate::input::{ingest_request, BuildingInput, ComparisonRequest, SystemInput};
pub use crate::output::{Disclosure, RunOutcome, SimulationOutput, SkipReason};
