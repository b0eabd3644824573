use crate::core::heating_systems::boiler::{Boiler, CombiBoiler};
use crate::core::heating_systems::cylinder::{Cylinder, StoredBoilerSystem, NOMINAL_CAPACITY_KWH};
use crate::core::heating_systems::heat_pump::{FlowTempBand, HeatPump, HeatPumpSystem};
use crate::errors::CoreError;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// The closed set of system identifiers callers can ask for. `CurrentSystem`
/// is an alias resolved against the household's existing installation before
/// a heat source is built.
#[derive(Clone, Copy, Debug, Deserialize, Display, EnumIter, PartialEq, Eq, Serialize)]
pub enum SystemId {
    OnDemandCombi,
    VentedCylinder,
    UnventedCylinder,
    RegularVentedBoiler,
    SealedUnventedBoiler,
    HeatPump,
    CurrentSystem,
}

/// Dispatch family: how a system splits its output between space heating and
/// hot water.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum SystemFamily {
    Combi,
    StoredBoiler,
    HeatPump,
}

impl SystemId {
    pub fn family(&self) -> Option<SystemFamily> {
        match self {
            Self::OnDemandCombi => Some(SystemFamily::Combi),
            Self::VentedCylinder
            | Self::UnventedCylinder
            | Self::RegularVentedBoiler
            | Self::SealedUnventedBoiler => Some(SystemFamily::StoredBoiler),
            Self::HeatPump => Some(SystemFamily::HeatPump),
            Self::CurrentSystem => None,
        }
    }
}

/// A resolved heat source configuration, ready to build a dispatch strategy
/// from. Exactly one of the boiler-efficiency track (`base_efficiency`) and
/// the COP track (`design_flow_temp_band`) may be populated, matching the
/// system's family.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct SystemConfig {
    pub system_id: SystemId,
    pub max_kw: f64,
    #[serde(default)]
    pub min_kw: Option<f64>,
    #[serde(default)]
    pub base_efficiency: Option<f64>,
    #[serde(default)]
    pub age_years: Option<f64>,
    #[serde(default)]
    pub design_flow_temp_band: Option<FlowTempBand>,
}

/// Demand placed on a heat source for one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct StepDemand {
    pub space_required_kw: f64,
    pub dhw_required_kw: f64,
    /// Per-step boiler efficiency from the precomputed series; ignored by
    /// heat pumps, which derive COP from conditions instead.
    pub efficiency: f64,
    pub outdoor_temp_c: f64,
    pub hour_of_day: u32,
    pub step_hours: f64,
}

/// What a heat source did in one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct DispatchResult {
    pub space_delivered_kw: f64,
    pub water_delivered_kw: f64,
    /// Heat leaving the heat source itself (for stores this is burner output,
    /// not tap delivery, so recharge is counted and store draw-off is not).
    pub delivered_heat_kw: f64,
    pub efficiency: f64,
    /// Buffer energy in kWh for buffered families; hot water service
    /// fraction in percent for a combi.
    pub store_state: f64,
    pub shortfall_kw: f64,
}

/// One dispatch strategy per system family, all meeting the same contract:
/// given a step's demand, decide delivered heat, update any store or service
/// state, and report what the space heating side actually received.
#[derive(Clone, Debug, PartialEq)]
pub enum HeatSource {
    Combi(CombiBoiler),
    Stored(StoredBoilerSystem),
    HeatPump(HeatPumpSystem),
}

impl HeatSource {
    /// Build the dispatch strategy for a resolved configuration. The oversize
    /// ratio (rated output over design heat loss) only shapes the boiler
    /// efficiency penalty.
    pub fn from_config(config: &SystemConfig, oversize_ratio: f64) -> Result<Self, CoreError> {
        let family = config
            .system_id
            .family()
            .ok_or(CoreError::UnresolvableCurrentSystem)?;
        let age_years = config.age_years.unwrap_or(0.);

        match family {
            SystemFamily::Combi | SystemFamily::StoredBoiler => {
                if config.design_flow_temp_band.is_some() {
                    return Err(CoreError::ConflictingEfficiencyTracks {
                        system_id: config.system_id,
                    });
                }
                let boiler = Boiler::new(
                    config.max_kw,
                    config.min_kw,
                    config.base_efficiency,
                    age_years,
                    oversize_ratio,
                )?;
                Ok(match family {
                    SystemFamily::Combi => Self::Combi(CombiBoiler::new(boiler)),
                    _ => Self::Stored(StoredBoilerSystem::new(
                        boiler,
                        Cylinder::new(NOMINAL_CAPACITY_KWH),
                    )),
                })
            }
            SystemFamily::HeatPump => {
                if config.base_efficiency.is_some() {
                    return Err(CoreError::ConflictingEfficiencyTracks {
                        system_id: config.system_id,
                    });
                }
                let band = config.design_flow_temp_band.unwrap_or(FlowTempBand::Mid45);
                Ok(Self::HeatPump(HeatPumpSystem::new(
                    HeatPump::new(config.max_kw, band)?,
                    Cylinder::new(NOMINAL_CAPACITY_KWH),
                )))
            }
        }
    }

    pub fn family(&self) -> SystemFamily {
        match self {
            Self::Combi(_) => SystemFamily::Combi,
            Self::Stored(_) => SystemFamily::StoredBoiler,
            Self::HeatPump(_) => SystemFamily::HeatPump,
        }
    }

    /// Whether hot water passes through a store rather than competing for
    /// instantaneous output.
    pub fn is_buffered(&self) -> bool {
        !matches!(self.family(), SystemFamily::Combi)
    }

    /// The precomputed per-step efficiency series for boiler-track systems;
    /// heat pumps derive COP per step instead.
    pub(crate) fn efficiency_series(&self, demand_kw: &[f64]) -> Option<Vec<f64>> {
        match self {
            Self::Combi(combi) => Some(combi.boiler().efficiency_series(demand_kw)),
            Self::Stored(stored) => Some(stored.boiler().efficiency_series(demand_kw)),
            Self::HeatPump(_) => None,
        }
    }

    pub(crate) fn dispatch(&mut self, demand: &StepDemand) -> DispatchResult {
        match self {
            Self::Combi(combi) => combi.dispatch(demand),
            Self::Stored(stored) => stored.dispatch(demand),
            Self::HeatPump(heat_pump) => heat_pump.dispatch(demand),
        }
    }
}
