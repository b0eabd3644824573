use crate::compare_floats::max_of_2;
use crate::core::heating_systems::common::{HeatSource, StepDemand, SystemConfig, SystemFamily};
use crate::core::space_heat_demand::building::BuildingThermalParameters;
use crate::core::space_heat_demand::demand::{HeatIntentProfile, SpaceHeatDemand};
use crate::core::water_heat_demand::cold_water_source::ColdWaterSource;
use crate::core::water_heat_demand::events::{DrawSchedule, HotWaterSupplyPath, WaterUseEvent};
use crate::errors::CoreError;
use crate::output::SimulationOutput;
use crate::simulation_time::DayTimeline;
use tracing::trace;

/// How aggressively a setpoint deficit is recovered: extra output per kelvin
/// of deficit, as a multiple of the fabric loss coefficient. Gives a recovery
/// time constant of tau over this factor.
pub(crate) const RECOVERY_URGENCY_FACTOR: f64 = 4.0;

/// The fully expanded demand side of a day: the space heating timeline and
/// the hot water draw schedule. Built once per request and shared, borrowed,
/// by every system compared against it, so no run can influence another.
#[derive(Clone, Debug, PartialEq)]
pub struct DemandTimeline {
    timeline: DayTimeline,
    space: SpaceHeatDemand,
    draws: DrawSchedule,
}

impl DemandTimeline {
    pub fn build(
        building: &BuildingThermalParameters,
        heat_intent: Option<&HeatIntentProfile>,
        events: &[WaterUseEvent],
        supply_path: HotWaterSupplyPath,
        cold_feed: &ColdWaterSource,
        timeline: DayTimeline,
    ) -> Result<Self, CoreError> {
        let space = SpaceHeatDemand::build(heat_intent, building, &timeline)?;
        let draws = DrawSchedule::build(events, supply_path, cold_feed, &timeline);
        Ok(Self {
            timeline,
            space,
            draws,
        })
    }

    pub fn timeline(&self) -> DayTimeline {
        self.timeline
    }

    pub fn space(&self) -> &SpaceHeatDemand {
        &self.space
    }

    pub fn draws(&self) -> &DrawSchedule {
        &self.draws
    }
}

/// Run one system over one day.
///
/// A pure forward fold over the timeline: all state (room temperature and any
/// store) is local to this call, so concurrent invocations for different
/// systems cannot interfere. Identical inputs give identical output arrays.
pub fn run_simulation(
    building: &BuildingThermalParameters,
    demand: &DemandTimeline,
    config: &SystemConfig,
) -> Result<SimulationOutput, CoreError> {
    let oversize_ratio = config.max_kw / building.peak_heat_loss_kw();
    let mut source = HeatSource::from_config(config, oversize_ratio)?;
    let efficiency_series = source.efficiency_series(demand.space().demand_kw());

    let ua = building.ua_kw_per_k();
    let heat_capacity = building.heat_capacity_kwh_per_k();
    let outdoor = building.outdoor_temp_c();
    let total_steps = demand.timeline().total_steps();

    let mut room_temp_c = building.setpoint_away_c();

    let mut room_temps = Vec::with_capacity(total_steps);
    let mut delivered = Vec::with_capacity(total_steps);
    let mut efficiencies = Vec::with_capacity(total_steps);
    let mut input_powers = Vec::with_capacity(total_steps);
    let mut store_states = Vec::with_capacity(total_steps);
    let mut shortfalls = Vec::with_capacity(total_steps);

    for step in demand.timeline().iter() {
        let setpoint = demand.space().setpoint_c()[step.index];
        let shared_demand_kw = demand.space().demand_kw()[step.index];

        // room temperature never sits below ambient, so loss is never negative
        let heat_loss_kw = ua * (room_temp_c - outdoor);
        let space_required_kw = if shared_demand_kw > 0. {
            let recovery_kw =
                max_of_2(0., setpoint - room_temp_c) * ua * RECOVERY_URGENCY_FACTOR;
            max_of_2(0., heat_loss_kw + recovery_kw)
        } else {
            0.
        };

        let result = source.dispatch(&StepDemand {
            space_required_kw,
            dhw_required_kw: demand.draws().thermal_kw()[step.index],
            efficiency: efficiency_series
                .as_ref()
                .map(|series| series[step.index])
                .unwrap_or(0.),
            outdoor_temp_c: outdoor,
            hour_of_day: step.hour_of_day(),
            step_hours: step.step_hours,
        });

        let input_power_kw = if is_close!(result.efficiency, 0.) {
            0.
        } else {
            result.delivered_heat_kw / result.efficiency
        };

        // only the space heating share warms the room
        let delta_k =
            (result.space_delivered_kw - heat_loss_kw) * step.step_hours / heat_capacity;
        room_temp_c = max_of_2(outdoor, room_temp_c + delta_k);

        if result.shortfall_kw > 0. {
            trace!(
                step = step.index,
                shortfall_kw = result.shortfall_kw,
                "hot water demand exceeded available output"
            );
        }

        room_temps.push(room_temp_c);
        delivered.push(result.delivered_heat_kw);
        efficiencies.push(result.efficiency);
        input_powers.push(input_power_kw);
        store_states.push(result.store_state);
        shortfalls.push(result.shortfall_kw);
    }

    let purge = matches!(source.family(), SystemFamily::Combi)
        .then(|| demand.draws().purge().to_vec());

    Ok(SimulationOutput {
        system_id: config.system_id,
        label: config.system_id.to_string().into(),
        step_hours: demand.timeline().step_hours(),
        room_temp_c: room_temps,
        space_heat_demand_kw: demand.space().demand_kw().to_vec(),
        hot_water_demand_kw: demand.draws().thermal_kw().to_vec(),
        cold_flow_litres_per_minute: demand.draws().cold_flow_litres_per_minute().to_vec(),
        delivered_heat_kw: delivered,
        efficiency: efficiencies,
        input_power_kw: input_powers,
        store_state: store_states,
        shortfall_kw: shortfalls,
        purge,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::heating_systems::boiler::{EFFICIENCY_CEILING, EFFICIENCY_FLOOR};
    use crate::core::heating_systems::common::SystemId;
    use crate::core::heating_systems::cylinder::NOMINAL_CAPACITY_KWH;
    use crate::core::heating_systems::heat_pump::COP_FLOOR;
    use crate::core::water_heat_demand::events::{DrawIntensity, WaterUseKind};
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn building() -> BuildingThermalParameters {
        BuildingThermalParameters::new(8.0, 20.0).unwrap()
    }

    #[fixture]
    fn timeline() -> DayTimeline {
        DayTimeline::default()
    }

    fn evening_bath() -> Vec<WaterUseEvent> {
        vec![WaterUseEvent::new(WaterUseKind::Bath, DrawIntensity::High, 1170, 1190).unwrap()]
    }

    fn demand_for(
        building: &BuildingThermalParameters,
        events: &[WaterUseEvent],
        timeline: DayTimeline,
    ) -> DemandTimeline {
        let cold_feed = ColdWaterSource::default_mains(&timeline);
        DemandTimeline::build(
            building,
            None,
            events,
            HotWaterSupplyPath::Full,
            &cold_feed,
            timeline,
        )
        .unwrap()
    }

    fn config(system_id: SystemId, max_kw: f64) -> SystemConfig {
        SystemConfig {
            system_id,
            max_kw,
            min_kw: None,
            base_efficiency: Some(0.9),
            age_years: Some(3.0),
            design_flow_temp_band: None,
        }
    }

    fn heat_pump_config(max_kw: f64) -> SystemConfig {
        SystemConfig {
            system_id: SystemId::HeatPump,
            max_kw,
            min_kw: None,
            base_efficiency: None,
            age_years: None,
            design_flow_temp_band: None,
        }
    }

    // steps whose minute range intersects the 19:30-19:50 bath
    const BATH_STEPS: [usize; 2] = [78, 79];

    #[rstest]
    fn room_temperature_never_falls_below_outdoor(
        building: BuildingThermalParameters,
        timeline: DayTimeline,
    ) {
        let demand = demand_for(&building, &evening_bath(), timeline);
        for config in [
            config(SystemId::OnDemandCombi, 24.0),
            config(SystemId::VentedCylinder, 18.0),
            heat_pump_config(8.0),
        ] {
            let output = run_simulation(&building, &demand, &config).unwrap();
            for temp in &output.room_temp_c {
                assert!(*temp >= building.outdoor_temp_c());
            }
        }
    }

    #[rstest]
    fn combi_interrupts_space_heating_during_the_bath(
        building: BuildingThermalParameters,
        timeline: DayTimeline,
    ) {
        let demand = demand_for(&building, &evening_bath(), timeline);
        let combi = config(SystemId::OnDemandCombi, 24.0);
        let output = run_simulation(&building, &demand, &combi).unwrap();

        for step in BATH_STEPS {
            let required_kw = output.hot_water_demand_kw[step];
            assert!(required_kw > 24.0, "a high bath draw should exceed the burner");
            // whole burner on the tap: delivered capped at rated output
            assert_relative_eq!(output.delivered_heat_kw[step], 24.0, max_relative = 1e-12);
            assert_relative_eq!(
                output.store_state[step],
                100. * 24.0 / required_kw,
                max_relative = 1e-12
            );
            assert_relative_eq!(
                output.shortfall_kw[step],
                required_kw - 24.0,
                max_relative = 1e-12
            );
        }
        // space heating fully interrupted: room cools through the bath
        assert!(output.room_temp_c[BATH_STEPS[1]] < output.room_temp_c[BATH_STEPS[0] - 1]);
    }

    #[rstest]
    fn stored_system_keeps_heating_the_room_during_the_bath(
        building: BuildingThermalParameters,
        timeline: DayTimeline,
    ) {
        let demand = demand_for(&building, &evening_bath(), timeline);
        let stored = config(SystemId::UnventedCylinder, 18.0);
        let output = run_simulation(&building, &demand, &stored).unwrap();

        for step in BATH_STEPS {
            assert!(
                output.delivered_heat_kw[step] > 0.0,
                "burner output should continue during the draw"
            );
        }
        // space heating was not interrupted, so the room holds its temperature
        assert!(
            output.room_temp_c[BATH_STEPS[1]] >= output.room_temp_c[BATH_STEPS[0] - 1] - 1e-9
        );
        for step in BATH_STEPS {
            assert!(output.store_state[step] >= 0.0);
            assert!(output.store_state[step] <= NOMINAL_CAPACITY_KWH);
        }
    }

    #[rstest]
    fn efficiency_stays_in_the_plausible_band(
        building: BuildingThermalParameters,
        timeline: DayTimeline,
    ) {
        let demand = demand_for(&building, &evening_bath(), timeline);
        let output =
            run_simulation(&building, &demand, &config(SystemId::OnDemandCombi, 24.0)).unwrap();
        for efficiency in &output.efficiency {
            assert!((EFFICIENCY_FLOOR..=EFFICIENCY_CEILING).contains(efficiency));
        }

        let output = run_simulation(&building, &demand, &heat_pump_config(8.0)).unwrap();
        for cop in &output.efficiency {
            assert!(*cop >= COP_FLOOR);
        }
    }

    #[rstest]
    fn store_state_stays_in_bounds_all_day(
        building: BuildingThermalParameters,
        timeline: DayTimeline,
    ) {
        let demand = demand_for(&building, &evening_bath(), timeline);
        let output =
            run_simulation(&building, &demand, &config(SystemId::VentedCylinder, 18.0)).unwrap();
        for state in &output.store_state {
            assert!((0.0..=NOMINAL_CAPACITY_KWH).contains(state));
        }

        let output =
            run_simulation(&building, &demand, &config(SystemId::OnDemandCombi, 24.0)).unwrap();
        for state in &output.store_state {
            assert!((0.0..=100.0).contains(state));
        }
    }

    #[rstest]
    fn identical_calls_produce_identical_outputs(
        building: BuildingThermalParameters,
        timeline: DayTimeline,
    ) {
        let demand = demand_for(&building, &evening_bath(), timeline);
        let combi = config(SystemId::OnDemandCombi, 24.0);
        let first = run_simulation(&building, &demand, &combi).unwrap();
        let second = run_simulation(&building, &demand, &combi).unwrap();
        assert_eq!(first, second);
    }

    #[rstest]
    fn zero_demand_decays_from_the_away_setpoint_and_delivers_nothing(
        building: BuildingThermalParameters,
        timeline: DayTimeline,
    ) {
        let profile = HeatIntentProfile::new(vec![0.0; 24], 60).unwrap();
        let cold_feed = ColdWaterSource::default_mains(&timeline);
        let demand = DemandTimeline::build(
            &building,
            Some(&profile),
            &[],
            HotWaterSupplyPath::Full,
            &cold_feed,
            timeline,
        )
        .unwrap();
        let output =
            run_simulation(&building, &demand, &config(SystemId::OnDemandCombi, 24.0)).unwrap();

        assert!(output.delivered_heat_kw.iter().all(|kw| *kw == 0.0));
        assert!(output.input_power_kw.iter().all(|kw| *kw == 0.0));
        assert!(output.room_temp_c[0] < building.setpoint_away_c());
        for pair in output.room_temp_c.windows(2) {
            assert!(pair[1] <= pair[0], "trace should decay monotonically");
            assert!(pair[1] >= building.outdoor_temp_c());
        }
    }

    #[rstest]
    fn purge_series_is_present_for_combi_only(
        building: BuildingThermalParameters,
        timeline: DayTimeline,
    ) {
        let demand = demand_for(&building, &evening_bath(), timeline);
        let combi =
            run_simulation(&building, &demand, &config(SystemId::OnDemandCombi, 24.0)).unwrap();
        assert!(combi.purge.is_some());
        assert!(combi.purge.as_ref().unwrap()[BATH_STEPS[0]]);

        let stored =
            run_simulation(&building, &demand, &config(SystemId::VentedCylinder, 18.0)).unwrap();
        assert!(stored.purge.is_none());
    }
}
