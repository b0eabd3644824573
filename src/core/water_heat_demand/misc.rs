use crate::core::material_properties::WATER;

/// Mixed-outlet delivery temperature convention for warm draws, in deg C.
/// Every flow-to-heat conversion in the crate goes through this module so the
/// convention cannot drift between subsystems.
pub const MIXED_OUTLET_TEMP_C: f64 = 40.0;

/// Default cold mains feed temperature, in deg C.
pub const DEFAULT_COLD_FEED_TEMP_C: f64 = 10.0;

/// Thermal power, in kW, needed to serve a warm draw at the mixed-outlet
/// convention from a cold feed.
///
/// Arguments:
/// * `flow_litres_per_minute` - warm water flow at the outlet, in litres/minute
/// * `temp_cold` - cold feed temperature, in deg C
pub fn warm_flow_power_kw(flow_litres_per_minute: f64, temp_cold: f64) -> f64 {
    WATER.flow_power_kw(flow_litres_per_minute, MIXED_OUTLET_TEMP_C, temp_cold)
}

/// Calculate the fraction of hot water required when mixing hot and cold
/// water to achieve a target temperature
///
/// Arguments:
/// * `temp_target` -- temperature to be achieved, in any units
/// * `temp_hot`    -- temperature of hot water to be mixed, in same units as temp_target
/// * `temp_cold`   -- temperature of cold water to be mixed, in same units as temp_target
pub fn frac_hot_water(temp_target: f64, temp_hot: f64, temp_cold: f64) -> f64 {
    (temp_target - temp_cold) / (temp_hot - temp_cold)
}

/// Calculates the kWh energy content of a hot water demand.
///
/// Arguments:
/// * `litres_demand` -- hot water demand in litres
/// * `demand_temp`   -- temperature of hot water inside the pipe, in degrees C
/// * `cold_temp`     -- temperature of the cold feed, in degrees C
pub fn water_demand_to_kwh(litres_demand: f64, demand_temp: f64, cold_temp: f64) -> f64 {
    WATER.volumetric_energy_content_kwh_per_litre(demand_temp, cold_temp) * litres_demand
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_calculate_correct_frac_hot_water() {
        assert_eq!(
            frac_hot_water(40.0, 55.0, 5.0),
            0.7,
            "incorrect fraction of hot water returned"
        );
    }

    #[test]
    fn should_calculate_correct_water_demand_to_kwh() {
        assert_relative_eq!(
            water_demand_to_kwh(100.0, 40.0, 10.0),
            3.4866666,
            max_relative = 1e-6
        );
    }

    #[test]
    fn should_agree_with_material_properties_conversion() {
        // the shared conversion and a manual one must be the same function
        let flow = 12.0;
        assert_relative_eq!(
            warm_flow_power_kw(flow, 10.0),
            WATER.flow_power_kw(flow, MIXED_OUTLET_TEMP_C, 10.0),
            max_relative = 1e-12
        );
    }
}
