use crate::core::water_heat_demand::misc::DEFAULT_COLD_FEED_TEMP_C;
use crate::errors::CoreError;
use crate::simulation_time::DayTimeline;

/// The cold water feed serving the dwelling, as a per-step temperature series.
#[derive(Clone, Debug, PartialEq)]
pub struct ColdWaterSource {
    cold_water_temps: Vec<f64>,
}

impl ColdWaterSource {
    pub fn new(cold_water_temps: Vec<f64>, timeline: &DayTimeline) -> Result<Self, CoreError> {
        let expected = timeline.total_steps();
        if cold_water_temps.len() != expected {
            return Err(CoreError::ProfileLengthMismatch {
                expected,
                actual: cold_water_temps.len(),
                resolution_minutes: timeline.resolution_minutes(),
            });
        }
        Ok(Self { cold_water_temps })
    }

    /// A feed held at one temperature all day, the usual mains assumption.
    pub fn at_constant_temp(temp: f64, timeline: &DayTimeline) -> Self {
        Self {
            cold_water_temps: vec![temp; timeline.total_steps()],
        }
    }

    pub fn default_mains(timeline: &DayTimeline) -> Self {
        Self::at_constant_temp(DEFAULT_COLD_FEED_TEMP_C, timeline)
    }

    pub fn temperature(&self, step_index: usize) -> f64 {
        self.cold_water_temps[step_index]
    }
}
