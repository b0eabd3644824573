use crate::compare_floats::{clamp_to_band, min_of_2};
use crate::core::heating_systems::common::{DispatchResult, StepDemand};
use crate::errors::CoreError;

pub const EFFICIENCY_FLOOR: f64 = 0.55;
pub const EFFICIENCY_CEILING: f64 = 0.95;

/// Nominal seasonal efficiency assumed when none was resolved upstream.
pub const DEFAULT_NOMINAL_EFFICIENCY: f64 = 0.80;

// Modulation floor assumed when the nameplate does not state one.
pub(crate) const DEFAULT_MODULATION_RATIO: f64 = 0.3;

// A step counts as low-load (a cycling proxy) when its demand is positive but
// below this share of rated output.
const LOW_LOAD_RATIO: f64 = 0.2;
// Contribution of the timeline's low-load fraction to the combined penalty.
const LOW_LOAD_FRACTION_COEFF: f64 = 0.05;
// Extra per-step efficiency dip at an individual low-load point.
const LOW_LOAD_STEP_PENALTY: f64 = 0.02;
// Combined age-independent penalty can never exceed this.
const COMBINED_PENALTY_CAP: f64 = 0.12;

/// Efficiency retained at a given appliance age, as a step function over five
/// age bands.
pub fn age_factor(age_years: f64) -> f64 {
    match age_years {
        a if a < 5. => 1.0,
        a if a < 10. => 0.97,
        a if a < 15. => 0.94,
        a if a < 20. => 0.90,
        _ => 0.85,
    }
}

/// Penalty for a heat source rated well above the building's design heat
/// loss, as a step function over the oversize ratio.
pub fn oversize_penalty(oversize_ratio: f64) -> f64 {
    match oversize_ratio {
        r if r <= 1.2 => 0.0,
        r if r <= 1.5 => 0.01,
        r if r <= 2.0 => 0.03,
        r if r <= 3.0 => 0.06,
        _ => 0.09,
    }
}

/// A gas or oil boiler characterised by its rated output, modulation floor
/// and nominal (nameplate-class) efficiency, plus the degradation inputs
/// resolved upstream: appliance age and oversize ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Boiler {
    rated_power_kw: f64,
    min_modulation_kw: f64,
    nominal_efficiency: f64,
    age_years: f64,
    oversize_ratio: f64,
}

impl Boiler {
    pub(crate) fn new(
        rated_power_kw: f64,
        min_modulation_kw: Option<f64>,
        nominal_efficiency: Option<f64>,
        age_years: f64,
        oversize_ratio: f64,
    ) -> Result<Self, CoreError> {
        if !(rated_power_kw.is_finite() && rated_power_kw > 0.) {
            return Err(CoreError::NonPositiveParameter {
                name: "max_kw",
                value: rated_power_kw,
            });
        }
        Ok(Self {
            rated_power_kw,
            min_modulation_kw: min_modulation_kw
                .unwrap_or(rated_power_kw * DEFAULT_MODULATION_RATIO),
            nominal_efficiency: nominal_efficiency.unwrap_or(DEFAULT_NOMINAL_EFFICIENCY),
            age_years,
            oversize_ratio,
        })
    }

    pub fn rated_power_kw(&self) -> f64 {
        self.rated_power_kw
    }

    pub fn min_modulation_kw(&self) -> f64 {
        self.min_modulation_kw
    }

    fn low_load_threshold_kw(&self) -> f64 {
        self.min_modulation_kw.max(LOW_LOAD_RATIO * self.rated_power_kw)
    }

    fn is_low_load_point(&self, demand_kw: f64) -> bool {
        demand_kw > 0. && demand_kw < self.low_load_threshold_kw()
    }

    /// Derive the per-step efficiency series for a demand timeline.
    ///
    /// The whole-day penalty combines the oversize band with the share of
    /// low-load points (short-cycling proxy), capped so degradation cannot
    /// run away; each individual low-load point then dips a little further,
    /// and the series is clamped to the plausible band.
    pub fn efficiency_series(&self, demand_kw: &[f64]) -> Vec<f64> {
        let low_load_points = demand_kw
            .iter()
            .filter(|kw| self.is_low_load_point(**kw))
            .count();
        let low_load_fraction = if demand_kw.is_empty() {
            0.
        } else {
            low_load_points as f64 / demand_kw.len() as f64
        };
        let combined_penalty = min_of_2(
            COMBINED_PENALTY_CAP,
            oversize_penalty(self.oversize_ratio) + low_load_fraction * LOW_LOAD_FRACTION_COEFF,
        );
        let base = self.nominal_efficiency * age_factor(self.age_years) * (1. - combined_penalty);

        demand_kw
            .iter()
            .map(|kw| {
                let stepped = if self.is_low_load_point(*kw) {
                    base - LOW_LOAD_STEP_PENALTY
                } else {
                    base
                };
                clamp_to_band(stepped, EFFICIENCY_FLOOR, EFFICIENCY_CEILING)
            })
            .collect()
    }
}

/// An on-demand combination boiler: no store, and an absolute priority for
/// hot water. While a draw is open the burner turns its whole output to the
/// tap and space heating is interrupted outright.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CombiBoiler {
    boiler: Boiler,
}

impl CombiBoiler {
    pub(crate) fn new(boiler: Boiler) -> Self {
        Self { boiler }
    }

    pub(crate) fn boiler(&self) -> &Boiler {
        &self.boiler
    }

    pub(crate) fn dispatch(&mut self, demand: &StepDemand) -> DispatchResult {
        let max_kw = self.boiler.rated_power_kw();
        let efficiency = demand.efficiency;

        if demand.dhw_required_kw > 0. {
            let water_delivered_kw = min_of_2(max_kw, demand.dhw_required_kw);
            DispatchResult {
                space_delivered_kw: 0.,
                water_delivered_kw,
                delivered_heat_kw: water_delivered_kw,
                efficiency,
                store_state: 100. * water_delivered_kw / demand.dhw_required_kw,
                shortfall_kw: demand.dhw_required_kw - water_delivered_kw,
            }
        } else {
            let space_delivered_kw = min_of_2(max_kw, demand.space_required_kw);
            DispatchResult {
                space_delivered_kw,
                water_delivered_kw: 0.,
                delivered_heat_kw: space_delivered_kw,
                efficiency,
                store_state: 100.,
                shortfall_kw: 0.,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn boiler() -> Boiler {
        Boiler::new(24.0, None, Some(0.90), 2.0, 1.0).unwrap()
    }

    #[rstest]
    fn age_factor_is_monotonically_non_increasing() {
        let ages = [0.0, 4.9, 5.0, 9.9, 10.0, 14.9, 15.0, 19.9, 20.0, 40.0];
        for pair in ages.windows(2) {
            assert!(
                age_factor(pair[1]) <= age_factor(pair[0]),
                "age factor rose between {} and {} years",
                pair[0],
                pair[1]
            );
        }
    }

    #[rstest]
    fn oversize_penalty_strictly_increases_through_band_boundaries() {
        let ratios = [1.0, 1.3, 1.8, 2.5, 3.5];
        for pair in ratios.windows(2) {
            assert!(
                oversize_penalty(pair[1]) > oversize_penalty(pair[0]),
                "penalty did not rise between ratios {} and {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[rstest]
    fn efficiency_decreases_as_oversize_ratio_grows() {
        let demand = vec![6.0; 96];
        let mut previous = f64::MAX;
        for ratio in [1.0, 1.4, 1.9, 2.9, 4.0] {
            let oversized = Boiler::new(24.0, None, Some(0.90), 2.0, ratio).unwrap();
            let series = oversized.efficiency_series(&demand);
            assert!(
                series[0] < previous,
                "efficiency did not fall at oversize ratio {ratio}"
            );
            previous = series[0];
        }
    }

    #[rstest]
    fn series_is_clamped_to_plausible_band() {
        let tired = Boiler::new(24.0, None, Some(0.60), 30.0, 5.0).unwrap();
        let sparkling = Boiler::new(24.0, None, Some(0.99), 0.0, 1.0).unwrap();
        let mut demand = vec![6.0; 48];
        demand.extend(vec![1.0; 48]); // half the day at a cycling load
        for efficiency in tired.efficiency_series(&demand) {
            assert!((EFFICIENCY_FLOOR..=EFFICIENCY_CEILING).contains(&efficiency));
        }
        for efficiency in sparkling.efficiency_series(&demand) {
            assert!((EFFICIENCY_FLOOR..=EFFICIENCY_CEILING).contains(&efficiency));
        }
    }

    #[rstest]
    fn low_load_points_dip_below_steady_points(boiler: Boiler) {
        let demand = vec![12.0, 1.0, 12.0, 1.0];
        let series = boiler.efficiency_series(&demand);
        assert!(series[1] < series[0]);
        assert!(series[3] < series[2]);
        assert_relative_eq!(series[0] - series[1], 0.02, max_relative = 1e-9);
    }

    #[rstest]
    fn identical_inputs_produce_identical_series(boiler: Boiler) {
        let demand: Vec<f64> = (0..96).map(|i| (i % 7) as f64).collect();
        assert_eq!(
            boiler.efficiency_series(&demand),
            boiler.efficiency_series(&demand)
        );
    }

    #[rstest]
    fn combi_interrupts_space_heating_for_hot_water(boiler: Boiler) {
        let mut combi = CombiBoiler::new(boiler);
        let result = combi.dispatch(&StepDemand {
            space_required_kw: 5.0,
            dhw_required_kw: 30.0,
            efficiency: 0.9,
            outdoor_temp_c: 5.0,
            hour_of_day: 19,
            step_hours: 0.25,
        });
        assert_eq!(result.space_delivered_kw, 0.0);
        assert_eq!(result.water_delivered_kw, 24.0);
        assert_relative_eq!(result.shortfall_kw, 6.0, max_relative = 1e-12);
        assert_relative_eq!(result.store_state, 100. * 24.0 / 30.0, max_relative = 1e-12);
    }

    #[rstest]
    fn combi_serves_space_heat_when_no_draw_is_open(boiler: Boiler) {
        let mut combi = CombiBoiler::new(boiler);
        let result = combi.dispatch(&StepDemand {
            space_required_kw: 5.0,
            dhw_required_kw: 0.0,
            efficiency: 0.9,
            outdoor_temp_c: 5.0,
            hour_of_day: 8,
            step_hours: 0.25,
        });
        assert_eq!(result.space_delivered_kw, 5.0);
        assert_eq!(result.water_delivered_kw, 0.0);
        assert_eq!(result.store_state, 100.0);
    }
}
