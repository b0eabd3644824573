use crate::core::heating_systems::common::SystemId;
use crate::core::units::kw_to_kwh;
use indexmap::IndexMap;
use serde::Serialize;
use smartstring::alias::String;
use strum_macros::Display;

/// An input the engine assumed rather than measured. Surfaced to callers so
/// presentation layers can disclose the assumption instead of silently
/// substituting it.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize)]
pub enum Disclosure {
    #[strum(to_string = "No hot water usage profile was supplied; a default schedule (morning shower, evening bath, evening dishwasher) was assumed")]
    DefaultScheduleAssumed,
    #[strum(to_string = "No outdoor temperature was supplied; a winter ambient of 5 degrees C was assumed")]
    OutdoorTempAssumed,
    #[strum(to_string = "The thermal time constant was inferred from the insulation slider rather than measured")]
    TimeConstantInferredFromSlider,
}

/// Why a simulation was not run at all. Distinct from a simulation that ran
/// and produced zeroes.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    #[strum(to_string = "No design heat loss figure was available for the building")]
    MissingHeatLoss,
    #[strum(to_string = "No thermal time constant was available for the building")]
    MissingTimeConstant,
}

/// The aligned per-step series one simulated system produces. Populated in a
/// single forward pass and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationOutput {
    pub system_id: SystemId,
    pub label: String,
    pub step_hours: f64,
    pub room_temp_c: Vec<f64>,
    pub space_heat_demand_kw: Vec<f64>,
    pub hot_water_demand_kw: Vec<f64>,
    pub cold_flow_litres_per_minute: Vec<f64>,
    pub delivered_heat_kw: Vec<f64>,
    pub efficiency: Vec<f64>,
    pub input_power_kw: Vec<f64>,
    /// Buffer energy in kWh for buffered systems; hot water service fraction
    /// in percent for a combi.
    pub store_state: Vec<f64>,
    pub shortfall_kw: Vec<f64>,
    /// Cold heat-exchanger flush steps; present for combi systems only.
    pub purge: Option<Vec<bool>>,
}

impl SimulationOutput {
    /// Name-keyed view over the numeric series, in a stable order, for chart
    /// renderers that iterate rather than pick fields.
    pub fn series_map(&self) -> IndexMap<&'static str, &[f64]> {
        IndexMap::from([
            ("room_temp_c", self.room_temp_c.as_slice()),
            ("space_heat_demand_kw", self.space_heat_demand_kw.as_slice()),
            ("hot_water_demand_kw", self.hot_water_demand_kw.as_slice()),
            (
                "cold_flow_litres_per_minute",
                self.cold_flow_litres_per_minute.as_slice(),
            ),
            ("delivered_heat_kw", self.delivered_heat_kw.as_slice()),
            ("efficiency", self.efficiency.as_slice()),
            ("input_power_kw", self.input_power_kw.as_slice()),
            ("store_state", self.store_state.as_slice()),
            ("shortfall_kw", self.shortfall_kw.as_slice()),
        ])
    }

    pub fn summary(&self) -> DaySummary {
        let delivered_kwh = self
            .delivered_heat_kw
            .iter()
            .map(|kw| kw_to_kwh(*kw, self.step_hours))
            .sum();
        let input_kwh = self
            .input_power_kw
            .iter()
            .map(|kw| kw_to_kwh(*kw, self.step_hours))
            .sum();
        let active: Vec<f64> = self
            .delivered_heat_kw
            .iter()
            .zip(&self.efficiency)
            .filter(|(delivered, _)| **delivered > 0.)
            .map(|(_, efficiency)| *efficiency)
            .collect();
        let mean_efficiency = if active.is_empty() {
            None
        } else {
            Some(active.iter().sum::<f64>() / active.len() as f64)
        };
        DaySummary {
            delivered_kwh,
            input_kwh,
            mean_efficiency,
            shortfall_steps: self.shortfall_kw.iter().filter(|kw| **kw > 0.).count(),
            peak_shortfall_kw: self.shortfall_kw.iter().copied().fold(0., f64::max),
            min_room_temp_c: self.room_temp_c.iter().copied().fold(f64::INFINITY, f64::min),
        }
    }
}

/// Whole-day totals for a run, for narrative and dashboard layers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DaySummary {
    pub delivered_kwh: f64,
    pub input_kwh: f64,
    pub mean_efficiency: Option<f64>,
    pub shortfall_steps: usize,
    pub peak_shortfall_kw: f64,
    pub min_room_temp_c: f64,
}

/// The result of asking for one simulation: either it ran, or it was
/// deliberately skipped for a stated reason.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum RunOutcome {
    Completed(Box<SimulationOutput>),
    Skipped { reason: SkipReason },
}

impl RunOutcome {
    pub fn output(&self) -> Option<&SimulationOutput> {
        match self {
            Self::Completed(output) => Some(output),
            Self::Skipped { .. } => None,
        }
    }
}
