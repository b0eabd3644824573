use crate::compare_floats::min_of_2;
use crate::core::heating_systems::boiler::Boiler;
use crate::core::heating_systems::common::{DispatchResult, StepDemand};
use crate::core::units::{kw_to_kwh, kwh_to_kw};

/// Usable stored energy of a domestic hot water cylinder, in kWh. Roughly a
/// 200 litre store raised 40K above the cold feed.
pub const NOMINAL_CAPACITY_KWH: f64 = 10.0;

/// A hot water store reduced to one scalar: usable energy bounded to a
/// nominal capacity. Draws come out first each step, then any surplus heat
/// source output goes back in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cylinder {
    capacity_kwh: f64,
    energy_kwh: f64,
}

impl Cylinder {
    /// A cylinder starts the day fully charged; overnight charging is assumed
    /// to have completed before the simulated day begins.
    pub fn new(capacity_kwh: f64) -> Self {
        Self {
            capacity_kwh,
            energy_kwh: capacity_kwh,
        }
    }

    pub fn capacity_kwh(&self) -> f64 {
        self.capacity_kwh
    }

    pub fn energy_kwh(&self) -> f64 {
        self.energy_kwh
    }

    pub fn state_of_charge(&self) -> f64 {
        self.energy_kwh / self.capacity_kwh
    }

    /// Take energy for a draw, floored at an empty store. Returns the energy
    /// actually served.
    pub(crate) fn draw(&mut self, requested_kwh: f64) -> f64 {
        let served = min_of_2(requested_kwh, self.energy_kwh);
        self.energy_kwh -= served;
        served
    }

    /// Accept charge, capped at capacity. Returns the energy actually taken.
    pub(crate) fn charge(&mut self, offered_kwh: f64) -> f64 {
        let accepted = min_of_2(offered_kwh, self.capacity_kwh - self.energy_kwh);
        self.energy_kwh += accepted;
        accepted
    }
}

/// A regular boiler feeding both the emitters and a hot water cylinder.
/// Space heating is met directly by the burner while draws come out of the
/// store, so neither service interrupts the other; spare burner output
/// recharges the store.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StoredBoilerSystem {
    boiler: Boiler,
    cylinder: Cylinder,
}

impl StoredBoilerSystem {
    pub(crate) fn new(boiler: Boiler, cylinder: Cylinder) -> Self {
        Self { boiler, cylinder }
    }

    pub(crate) fn boiler(&self) -> &Boiler {
        &self.boiler
    }

    pub(crate) fn dispatch(&mut self, demand: &StepDemand) -> DispatchResult {
        let max_kw = self.boiler.rated_power_kw();

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
            efficiency: demand.efficiency,
            store_state: self.cylinder.energy_kwh(),
            shortfall_kw,
        }
    }
}
