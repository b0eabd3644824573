use crate::compare_floats::clamp_to_band;
use crate::core::space_heat_demand::building::BuildingThermalParameters;
use crate::core::units::{MINUTES_PER_DAY, MINUTES_PER_HOUR};
use crate::errors::CoreError;
use crate::simulation_time::DayTimeline;
use interp::interp;
use serde::Deserialize;
use tracing::debug;

/// A coarse heat intent profile, at most one point per hour. Values are
/// intent fractions; anything above 1 reads as full intent, anything below 0
/// as none.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct HeatIntentProfile {
    values: Vec<f64>,
    resolution_minutes: u32,
}

impl HeatIntentProfile {
    pub fn new(values: Vec<f64>, resolution_minutes: u32) -> Result<Self, CoreError> {
        if resolution_minutes < MINUTES_PER_HOUR || MINUTES_PER_DAY % resolution_minutes != 0 {
            return Err(CoreError::InvalidResolution(resolution_minutes));
        }
        let expected = (MINUTES_PER_DAY / resolution_minutes) as usize;
        if values.len() != expected {
            return Err(CoreError::ProfileLengthMismatch {
                expected,
                actual: values.len(),
                resolution_minutes,
            });
        }
        Ok(Self {
            values,
            resolution_minutes,
        })
    }

    pub(crate) fn validate_shape(&self) -> Result<(), CoreError> {
        Self::new(self.values.clone(), self.resolution_minutes).map(|_| ())
    }

    fn point_hours(&self) -> Vec<f64> {
        (0..self.values.len())
            .map(|i| i as f64 * self.resolution_minutes as f64 / MINUTES_PER_HOUR as f64)
            .collect()
    }
}

/// The per-step space heating demand timeline shared by every compared
/// system: an intent fraction, the setpoint it implies, and the steady-state
/// heat demand at that setpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct SpaceHeatDemand {
    intent: Vec<f64>,
    setpoint_c: Vec<f64>,
    demand_kw: Vec<f64>,
}

impl SpaceHeatDemand {
    /// Expand a coarse profile (or the fixed occupancy-window rule when no
    /// profile is given) onto the timeline. Sub-hourly intent points are
    /// linearly interpolated between adjacent coarse values and clamped to
    /// the unit interval.
    pub fn build(
        profile: Option<&HeatIntentProfile>,
        building: &BuildingThermalParameters,
        timeline: &DayTimeline,
    ) -> Result<Self, CoreError> {
        let intent: Vec<f64> = match profile {
            Some(profile) => {
                profile.validate_shape()?;
                let point_hours = profile.point_hours();
                timeline
                    .iter()
                    .map(|step| {
                        clamp_to_band(
                            interp(&point_hours, &profile.values, step.start_hour()),
                            0.0,
                            1.0,
                        )
                    })
                    .collect()
            }
            None => timeline
                .iter()
                .map(|step| {
                    if building.occupied_at_hour(step.hour_of_day()) {
                        1.0
                    } else {
                        0.0
                    }
                })
                .collect(),
        };

        let setpoint_c: Vec<f64> = intent
            .iter()
            .map(|intent| building.setpoint_for_intent(*intent))
            .collect();

        let ua = building.ua_kw_per_k();
        let outdoor = building.outdoor_temp_c();
        let demand_kw: Vec<f64> = intent
            .iter()
            .zip(&setpoint_c)
            .map(|(intent, setpoint)| {
                (intent * ua * (setpoint - outdoor)).max(0.0)
            })
            .collect();

        debug!(
            steps = demand_kw.len(),
            active_steps = demand_kw.iter().filter(|kw| **kw > 0.0).count(),
            "expanded space heat demand timeline"
        );

        Ok(Self {
            intent,
            setpoint_c,
            demand_kw,
        })
    }

    pub fn intent(&self) -> &[f64] {
        &self.intent
    }

    pub fn setpoint_c(&self) -> &[f64] {
        &self.setpoint_c
    }

    pub fn demand_kw(&self) -> &[f64] {
        &self.demand_kw
    }
}
