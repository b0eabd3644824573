use crate::core::solver::{run_simulation, DemandTimeline};
use crate::core::water_heat_demand::cold_water_source::ColdWaterSource;
use crate::core::water_heat_demand::events::{
    default_schedule, synthesize_events, WaterUseEvent,
};
use crate::errors::FairnessError;
use crate::input::ComparisonRequest;
use crate::output::{Disclosure, RunOutcome, SimulationOutput};
use crate::simulation_time::DayTimeline;
use serde::Serialize;
use tracing::{debug, warn};

/// Two systems simulated against one shared demand timeline, plus the event
/// list and assumption disclosures presentation layers need.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub a: RunOutcome,
    pub b: RunOutcome,
    pub events: Vec<WaterUseEvent>,
    pub disclosures: Vec<Disclosure>,
}

/// Simulate systems A and B over the same day.
///
/// The demand timeline and event list are built once and borrowed by both
/// runs; each run owns all of its mutable state, so the two solver calls are
/// independent and safe to execute concurrently.
pub fn run_comparison(request: &ComparisonRequest) -> anyhow::Result<ComparisonResult> {
    let timeline = match request.resolution_minutes {
        Some(minutes) => DayTimeline::new(minutes)?,
        None => DayTimeline::default(),
    };

    let (building, mut disclosures) = match request.building.resolve() {
        Ok(resolved) => resolved,
        Err(reason) => {
            debug!(%reason, "simulation disabled for this building");
            return Ok(ComparisonResult {
                a: RunOutcome::Skipped { reason },
                b: RunOutcome::Skipped { reason },
                events: vec![],
                disclosures: vec![],
            });
        }
    };

    let events = match (&request.events, &request.lifestyle) {
        (Some(explicit), _) => {
            for event in explicit {
                // deserialized events bypass the constructor, so re-check windows
                WaterUseEvent::new(
                    event.kind,
                    event.intensity,
                    event.start_minute,
                    event.end_minute,
                )?;
            }
            explicit.clone()
        }
        (None, Some(profile)) => synthesize_events(profile),
        (None, None) => {
            warn!("no hot water usage supplied, assuming the default schedule");
            disclosures.push(Disclosure::DefaultScheduleAssumed);
            default_schedule()
        }
    };

    let cold_feed = match request.cold_water_temp_c {
        Some(temp) => ColdWaterSource::at_constant_temp(temp, &timeline),
        None => ColdWaterSource::default_mains(&timeline),
    };

    let demand = DemandTimeline::build(
        &building,
        request.heat_intent.as_ref(),
        &events,
        request.supply_path,
        &cold_feed,
        timeline,
    )?;

    let config_a = request.system_a.resolve(request.current_system.as_ref())?;
    let config_b = request.system_b.resolve(request.current_system.as_ref())?;

    let (result_a, result_b) = rayon::join(
        || run_simulation(&building, &demand, &config_a),
        || run_simulation(&building, &demand, &config_b),
    );

    Ok(ComparisonResult {
        a: RunOutcome::Completed(Box::new(result_a?)),
        b: RunOutcome::Completed(Box::new(result_b?)),
        events,
        disclosures,
    })
}

/// Assert that two outputs meant to share a demand timeline really do.
///
/// Demand must match exactly, not approximately: the solver is deterministic,
/// so any divergence means one run influenced the shared demand and the
/// comparison is unfair.
pub fn assert_demand_parity(
    a: &SimulationOutput,
    b: &SimulationOutput,
) -> Result<(), FairnessError> {
    let pairs: [(&'static str, &[f64], &[f64]); 3] = [
        (
            "space_heat_demand_kw",
            &a.space_heat_demand_kw,
            &b.space_heat_demand_kw,
        ),
        (
            "hot_water_demand_kw",
            &a.hot_water_demand_kw,
            &b.hot_water_demand_kw,
        ),
        (
            "cold_flow_litres_per_minute",
            &a.cold_flow_litres_per_minute,
            &b.cold_flow_litres_per_minute,
        ),
    ];
    for (series, left, right) in pairs {
        for (index, (left_value, right_value)) in left.iter().zip(right).enumerate() {
            if left_value != right_value {
                return Err(FairnessError {
                    series,
                    index,
                    a: *left_value,
                    b: *right_value,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::heating_systems::common::SystemId;
    use crate::input::{BuildingInput, SystemInput};
    use crate::output::SkipReason;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn system(system_id: SystemId, max_kw: f64) -> SystemInput {
        SystemInput {
            system_id,
            max_kw,
            min_kw: None,
            base_efficiency: match system_id {
                SystemId::HeatPump => None,
                _ => Some(0.88),
            },
            age_years: Some(4.0),
            design_flow_temp_band: None,
        }
    }

    #[fixture]
    fn request() -> ComparisonRequest {
        ComparisonRequest {
            building: BuildingInput {
                peak_heat_loss_kw: Some(8.0),
                tau_hours: Some(20.0),
                outdoor_temp_c: Some(5.0),
                ..Default::default()
            },
            system_a: system(SystemId::OnDemandCombi, 24.0),
            system_b: system(SystemId::HeatPump, 8.0),
            current_system: None,
            heat_intent: None,
            events: None,
            lifestyle: None,
            supply_path: Default::default(),
            cold_water_temp_c: None,
            resolution_minutes: None,
        }
    }

    fn completed(outcome: &RunOutcome) -> &SimulationOutput {
        outcome.output().expect("run should have completed")
    }

    #[rstest]
    fn demand_parity_holds_in_both_orders(request: ComparisonRequest) {
        tracing_subscriber::fmt().with_test_writer().try_init().ok();

        let forward = run_comparison(&request).unwrap();
        assert_demand_parity(completed(&forward.a), completed(&forward.b)).unwrap();

        let mut reversed_request = request.clone();
        std::mem::swap(
            &mut reversed_request.system_a,
            &mut reversed_request.system_b,
        );
        let reversed = run_comparison(&reversed_request).unwrap();
        assert_demand_parity(completed(&reversed.a), completed(&reversed.b)).unwrap();

        // the shared demand is the same regardless of run order
        assert_eq!(
            completed(&forward.a).space_heat_demand_kw,
            completed(&reversed.b).space_heat_demand_kw
        );
        assert_eq!(
            completed(&forward.a).hot_water_demand_kw,
            completed(&reversed.b).hot_water_demand_kw
        );
    }

    #[rstest]
    fn a_tampered_demand_series_fails_loudly(request: ComparisonRequest) {
        let result = run_comparison(&request).unwrap();
        let a = completed(&result.a);
        let mut tampered = completed(&result.b).clone();
        tampered.hot_water_demand_kw[40] += 0.5;
        let error = assert_demand_parity(a, &tampered).unwrap_err();
        assert_eq!(error.series, "hot_water_demand_kw");
        assert_eq!(error.index, 40);
    }

    #[rstest]
    fn missing_building_parameters_skip_both_runs(mut request: ComparisonRequest) {
        request.building.peak_heat_loss_kw = None;
        let result = run_comparison(&request).unwrap();
        assert_eq!(
            result.a,
            RunOutcome::Skipped {
                reason: SkipReason::MissingHeatLoss
            }
        );
        assert_eq!(result.b, result.a);
        assert!(result.events.is_empty());
    }

    #[rstest]
    fn default_schedule_use_is_disclosed(request: ComparisonRequest) {
        let result = run_comparison(&request).unwrap();
        assert!(result
            .disclosures
            .contains(&Disclosure::DefaultScheduleAssumed));
        assert!(!result.events.is_empty());
    }

    #[rstest]
    fn a_painted_lifestyle_is_not_disclosed_as_assumed(mut request: ComparisonRequest) {
        request.lifestyle = Some(Default::default());
        let result = run_comparison(&request).unwrap();
        assert!(!result
            .disclosures
            .contains(&Disclosure::DefaultScheduleAssumed));
    }

    #[rstest]
    fn explicit_events_take_precedence_and_are_revalidated(mut request: ComparisonRequest) {
        use crate::core::water_heat_demand::events::{DrawIntensity, WaterUseKind};

        let bath =
            WaterUseEvent::new(WaterUseKind::Bath, DrawIntensity::High, 1170, 1190).unwrap();
        request.events = Some(vec![bath]);
        let result = run_comparison(&request).unwrap();
        assert_eq!(result.events, vec![bath]);
        assert!(!result
            .disclosures
            .contains(&Disclosure::DefaultScheduleAssumed));

        // an inverted window smuggled in via deserialization is rejected
        let mut inverted = bath;
        inverted.end_minute = 1000;
        request.events = Some(vec![inverted]);
        assert!(run_comparison(&request).is_err());
    }

    #[rstest]
    fn outputs_are_identical_across_repeated_comparisons(request: ComparisonRequest) {
        let first = run_comparison(&request).unwrap();
        let second = run_comparison(&request).unwrap();
        assert_eq!(first, second);
    }
}
