use crate::errors::CoreError;

/// Design temperature difference between inside and outside on the coldest
/// expected day, in K. The declared peak heat loss is referenced to this.
pub const DESIGN_DELTA_T_K: f64 = 16.0;

pub const DEFAULT_OUTDOOR_TEMP_C: f64 = 5.0;
pub const DEFAULT_SETPOINT_HOME_C: f64 = 20.0;
pub const DEFAULT_SETPOINT_AWAY_C: f64 = 16.0;

// Hours of day during which the dwelling counts as occupied when no heat
// intent profile is supplied.
const MORNING_OCCUPANCY_HOURS: std::ops::Range<u32> = 6..9;
const EVENING_OCCUPANCY_HOURS: std::ops::Range<u32> = 16..23;

/// The single-node thermal description of a dwelling: a fabric heat loss
/// coefficient and a time constant, from which the lumped heat capacity
/// follows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildingThermalParameters {
    peak_heat_loss_kw: f64,
    tau_hours: f64,
    outdoor_temp_c: f64,
    setpoint_home_c: f64,
    setpoint_away_c: f64,
}

impl BuildingThermalParameters {
    pub fn new(peak_heat_loss_kw: f64, tau_hours: f64) -> Result<Self, CoreError> {
        if !(peak_heat_loss_kw.is_finite() && peak_heat_loss_kw > 0.) {
            return Err(CoreError::NonPositiveParameter {
                name: "peak_heat_loss_kw",
                value: peak_heat_loss_kw,
            });
        }
        if !(tau_hours.is_finite() && tau_hours > 0.) {
            return Err(CoreError::NonPositiveParameter {
                name: "tau_hours",
                value: tau_hours,
            });
        }
        Ok(Self {
            peak_heat_loss_kw,
            tau_hours,
            outdoor_temp_c: DEFAULT_OUTDOOR_TEMP_C,
            setpoint_home_c: DEFAULT_SETPOINT_HOME_C,
            setpoint_away_c: DEFAULT_SETPOINT_AWAY_C,
        })
    }

    pub fn with_outdoor_temp(mut self, outdoor_temp_c: f64) -> Self {
        self.outdoor_temp_c = outdoor_temp_c;
        self
    }

    pub fn with_setpoints(mut self, home_c: f64, away_c: f64) -> Self {
        self.setpoint_home_c = home_c;
        self.setpoint_away_c = away_c;
        self
    }

    pub fn peak_heat_loss_kw(&self) -> f64 {
        self.peak_heat_loss_kw
    }

    pub fn tau_hours(&self) -> f64 {
        self.tau_hours
    }

    pub fn outdoor_temp_c(&self) -> f64 {
        self.outdoor_temp_c
    }

    pub fn setpoint_home_c(&self) -> f64 {
        self.setpoint_home_c
    }

    pub fn setpoint_away_c(&self) -> f64 {
        self.setpoint_away_c
    }

    /// Fabric heat loss coefficient, in kW/K.
    pub fn ua_kw_per_k(&self) -> f64 {
        self.peak_heat_loss_kw / DESIGN_DELTA_T_K
    }

    /// Lumped heat capacity, in kWh/K.
    pub fn heat_capacity_kwh_per_k(&self) -> f64 {
        self.ua_kw_per_k() * self.tau_hours
    }

    /// The fixed occupancy window rule used when no heat intent profile is
    /// supplied: home for the morning and evening windows, away otherwise.
    pub fn occupied_at_hour(&self, hour_of_day: u32) -> bool {
        MORNING_OCCUPANCY_HOURS.contains(&hour_of_day)
            || EVENING_OCCUPANCY_HOURS.contains(&hour_of_day)
    }

    /// Setpoint for a given heat intent fraction: away at zero intent, home
    /// at full intent, linear in between.
    pub fn setpoint_for_intent(&self, intent: f64) -> f64 {
        self.setpoint_away_c + (self.setpoint_home_c - self.setpoint_away_c) * intent
    }
}
