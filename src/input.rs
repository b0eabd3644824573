use crate::core::heating_systems::common::{SystemConfig, SystemId};
use crate::core::heating_systems::heat_pump::FlowTempBand;
use crate::core::space_heat_demand::building::BuildingThermalParameters;
use crate::core::space_heat_demand::demand::HeatIntentProfile;
use crate::core::water_heat_demand::events::{
    HotWaterSupplyPath, LifestyleProfile, WaterUseEvent,
};
use crate::errors::CoreError;
use crate::output::{Disclosure, SkipReason};
use anyhow::Context;
use serde::Deserialize;
use serde_valid::Validate;
use std::io::Read;

// Time constant inferred from the 0-10 insulation slider, in hours: a leaky
// uninsulated shell at the bottom of the range, a well-wrapped one at the top.
const SLIDER_TAU_BASE_HOURS: f64 = 15.0;
const SLIDER_TAU_HOURS_PER_POINT: f64 = 6.0;

/// The building as described by the caller. Fields resolved elsewhere from a
/// fabric survey may be absent; a missing or zero heat loss or time constant
/// disables simulation rather than failing it.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Validate)]
pub struct BuildingInput {
    #[serde(default)]
    pub peak_heat_loss_kw: Option<f64>,
    #[serde(default)]
    pub tau_hours: Option<f64>,
    #[serde(default)]
    #[validate(minimum = 0.)]
    #[validate(maximum = 10.)]
    pub insulation_slider: Option<f64>,
    #[serde(default)]
    pub outdoor_temp_c: Option<f64>,
    #[serde(default)]
    pub setpoint_home_c: Option<f64>,
    #[serde(default)]
    pub setpoint_away_c: Option<f64>,
}

impl BuildingInput {
    /// Resolve into solver-ready parameters, or the reason simulation is
    /// disabled for this building. Assumed inputs are disclosed.
    pub(crate) fn resolve(
        &self,
    ) -> Result<(BuildingThermalParameters, Vec<Disclosure>), SkipReason> {
        let mut disclosures = vec![];

        let peak_heat_loss_kw = match self.peak_heat_loss_kw {
            Some(value) if value > 0. => value,
            _ => return Err(SkipReason::MissingHeatLoss),
        };

        let tau_hours = match (self.tau_hours, self.insulation_slider) {
            (Some(value), _) if value > 0. => value,
            (_, Some(slider)) => {
                disclosures.push(Disclosure::TimeConstantInferredFromSlider);
                SLIDER_TAU_BASE_HOURS + slider * SLIDER_TAU_HOURS_PER_POINT
            }
            _ => return Err(SkipReason::MissingTimeConstant),
        };

        let mut params = BuildingThermalParameters::new(peak_heat_loss_kw, tau_hours)
            .unwrap_or_else(|_| unreachable!("positivity checked above"));

        match self.outdoor_temp_c {
            Some(outdoor) => params = params.with_outdoor_temp(outdoor),
            None => disclosures.push(Disclosure::OutdoorTempAssumed),
        }
        if self.setpoint_home_c.is_some() || self.setpoint_away_c.is_some() {
            params = params.with_setpoints(
                self.setpoint_home_c.unwrap_or(params.setpoint_home_c()),
                self.setpoint_away_c.unwrap_or(params.setpoint_away_c()),
            );
        }

        Ok((params, disclosures))
    }
}

/// A heat source as described by the caller. `CurrentSystem` defers to the
/// household's existing installation, supplied separately on the request.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Validate)]
pub struct SystemInput {
    pub system_id: SystemId,
    #[validate(exclusive_minimum = 0.)]
    pub max_kw: f64,
    #[serde(default)]
    pub min_kw: Option<f64>,
    #[serde(default)]
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub base_efficiency: Option<f64>,
    #[serde(default)]
    #[validate(minimum = 0.)]
    pub age_years: Option<f64>,
    #[serde(default)]
    pub design_flow_temp_band: Option<FlowTempBand>,
}

impl SystemInput {
    /// Resolve the `CurrentSystem` alias against the household's existing
    /// installation, leaving a concrete configuration.
    pub(crate) fn resolve(
        &self,
        current_system: Option<&SystemInput>,
    ) -> Result<SystemConfig, CoreError> {
        let source = if self.system_id == SystemId::CurrentSystem {
            current_system.ok_or(CoreError::UnresolvableCurrentSystem)?
        } else {
            self
        };
        Ok(SystemConfig {
            system_id: source.system_id,
            max_kw: source.max_kw,
            min_kw: source.min_kw,
            base_efficiency: source.base_efficiency,
            age_years: source.age_years,
            design_flow_temp_band: source.design_flow_temp_band,
        })
    }
}

/// A full comparison request: one building, one shared usage picture, two
/// systems to compare on it.
#[derive(Clone, Debug, Deserialize, PartialEq, Validate)]
pub struct ComparisonRequest {
    #[validate]
    pub building: BuildingInput,
    #[validate]
    pub system_a: SystemInput,
    #[validate]
    pub system_b: SystemInput,
    #[serde(default)]
    #[validate]
    pub current_system: Option<SystemInput>,
    #[serde(default)]
    pub heat_intent: Option<HeatIntentProfile>,
    /// Explicit water use events; takes precedence over `lifestyle`.
    #[serde(default)]
    pub events: Option<Vec<WaterUseEvent>>,
    #[serde(default)]
    pub lifestyle: Option<LifestyleProfile>,
    #[serde(default)]
    pub supply_path: HotWaterSupplyPath,
    #[serde(default)]
    pub cold_water_temp_c: Option<f64>,
    #[serde(default)]
    pub resolution_minutes: Option<u32>,
}

/// Read and validate a comparison request from JSON.
pub fn ingest_request(input: impl Read) -> anyhow::Result<ComparisonRequest> {
    let request: ComparisonRequest =
        serde_json::from_reader(input).context("parsing comparison request")?;
    request
        .validate()
        .context("validating comparison request")?;
    Ok(request)
}
