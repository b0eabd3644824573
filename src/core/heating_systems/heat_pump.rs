use crate::compare_floats::{max_of_2, min_of_2};
use crate::core::heating_systems::common::{DispatchResult, StepDemand};
use crate::core::heating_systems::cylinder::Cylinder;
use crate::core::units::{kw_to_kwh, kwh_to_kw};
use crate::errors::CoreError;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// No plausible air-source installation performs below this.
pub const COP_FLOOR: f64 = 1.5;

// Early-morning defrost and cold-soak conditions pull performance down until
// this hour of the day.
const COLD_MORNING_END_HOUR: u32 = 6;
const COLD_MORNING_COP_DIP: f64 = 0.3;

/// Design flow temperature of the emitter circuit. Lower flow temperatures
/// mean larger emitters and better COP.
#[derive(Clone, Copy, Debug, Deserialize, Display, EnumIter, PartialEq, Eq, Serialize)]
pub enum FlowTempBand {
    Low35,
    Mid45,
    High55,
}

/// Outdoor air condition bucketed for the COP table.
#[derive(Clone, Copy, Debug, Display, EnumIter, PartialEq, Eq)]
pub enum OutdoorBucket {
    Cold,
    Mild,
    Warm,
}

impl OutdoorBucket {
    pub fn from_outdoor_temp(outdoor_temp_c: f64) -> Self {
        match outdoor_temp_c {
            t if t < 2.0 => Self::Cold,
            t if t <= 10.0 => Self::Mild,
            _ => Self::Warm,
        }
    }
}

/// Tabulated COP by design flow temperature band and outdoor condition.
/// Static data, never mutated; both axes raise COP in the expected direction.
pub fn table_cop(band: FlowTempBand, bucket: OutdoorBucket) -> f64 {
    use FlowTempBand::*;
    use OutdoorBucket::*;
    match (band, bucket) {
        (Low35, Cold) => 2.6,
        (Low35, Mild) => 3.4,
        (Low35, Warm) => 4.2,
        (Mid45, Cold) => 2.2,
        (Mid45, Mild) => 2.9,
        (Mid45, Warm) => 3.5,
        (High55, Cold) => 1.7,
        (High55, Mild) => 2.4,
        (High55, Warm) => 2.9,
    }
}

/// An air-source heat pump characterised by its rated output and the design
/// flow temperature band of the emitter circuit it feeds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeatPump {
    max_output_kw: f64,
    flow_temp_band: FlowTempBand,
}

impl HeatPump {
    pub(crate) fn new(max_output_kw: f64, flow_temp_band: FlowTempBand) -> Result<Self, CoreError> {
        if !(max_output_kw.is_finite() && max_output_kw > 0.) {
            return Err(CoreError::NonPositiveParameter {
                name: "max_kw",
                value: max_output_kw,
            });
        }
        Ok(Self {
            max_output_kw,
            flow_temp_band,
        })
    }

    pub fn max_output_kw(&self) -> f64 {
        self.max_output_kw
    }

    /// Instantaneous COP at an outdoor temperature and hour of day.
    pub fn cop(&self, outdoor_temp_c: f64, hour_of_day: u32) -> f64 {
        let mut cop = table_cop(
            self.flow_temp_band,
            OutdoorBucket::from_outdoor_temp(outdoor_temp_c),
        );
        if hour_of_day < COLD_MORNING_END_HOUR {
            cop -= COLD_MORNING_COP_DIP;
        }
        max_of_2(COP_FLOOR, cop)
    }
}

/// A heat pump feeding both the emitters and a hot water store. Space heat
/// and store recharge are summed and served together up to capacity; there is
/// no priority switching, and draws come out of the store.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeatPumpSystem {
    heat_pump: HeatPump,
    cylinder: Cylinder,
}

impl HeatPumpSystem {
    pub(crate) fn new(heat_pump: HeatPump, cylinder: Cylinder) -> Self {
        Self {
            heat_pump,
            cylinder,
        }
    }

    pub(crate) fn dispatch(&mut self, demand: &StepDemand) -> DispatchResult {
        let cop = self
            .heat_pump
            .cop(demand.outdoor_temp_c, demand.hour_of_day);
        let max_kw = self.heat_pump.max_output_kw();

        let requested_kwh = kw_to_kwh(demand.dhw_required_kw, demand.step_hours);
        let served_kwh = self.cylinder.draw(requested_kwh);
        let shortfall_kw = kwh_to_kw(requested_kwh - served_kwh, demand.step_hours);

        let space_delivered_kw = min_of_2(demand.space_required_kw, max_kw);
        let spare_kw = max_kw - space_delivered_kw;
        let recharge_kwh = self.cylinder.charge(kw_to_kwh(spare_kw, demand.step_hours));

        DispatchResult {
            space_delivered_kw,
            water_delivered_kw: kwh_to_kw(served_kwh, demand.step_hours),
            delivered_heat_kw: space_delivered_kw + kwh_to_kw(recharge_kwh, demand.step_hours),
            efficiency: cop,
            store_state: self.cylinder.energy_kwh(),
            shortfall_kw,
        }
    }
}
