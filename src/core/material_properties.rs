use crate::core::units::{JOULES_PER_KILOWATT_HOUR, MINUTES_PER_HOUR};
use std::sync::LazyLock;

/// Thermal properties of the fluids the simulation moves heat through.
#[derive(Clone, Copy, Debug)]
pub struct MaterialProperties {
    density: f64,                  // kg/litre
    specific_heat_capacity: f64,   // J/(kg.K)
    volumetric_heat_capacity: f64, // J/(litre.K)
}

impl MaterialProperties {
    pub fn new(density: f64, specific_heat_capacity: f64) -> Self {
        Self {
            density,
            specific_heat_capacity,
            volumetric_heat_capacity: specific_heat_capacity * density,
        }
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    pub fn specific_heat_capacity(&self) -> f64 {
        self.specific_heat_capacity
    }

    pub fn volumetric_heat_capacity(&self) -> f64 {
        self.volumetric_heat_capacity
    }

    /// Return energy content of material, in kWh / litre
    ///
    /// Arguments:
    /// * `temp_high` - temperature for which energy content should be calculated, in deg C or K
    /// * `temp_base` - temperature which defines "zero energy", in same units as temp_high
    pub fn volumetric_energy_content_kwh_per_litre(&self, temp_high: f64, temp_base: f64) -> f64 {
        (temp_high - temp_base) * self.volumetric_heat_capacity
            / JOULES_PER_KILOWATT_HOUR as f64
    }

    /// Thermal power, in kW, carried by a volumetric flow of this material
    /// being raised from `temp_base` to `temp_high`.
    ///
    /// Arguments:
    /// * `flow_litres_per_minute` - volumetric flow rate, in litres/minute
    /// * `temp_high` - delivery temperature, in deg C
    /// * `temp_base` - feed temperature, in deg C
    pub fn flow_power_kw(&self, flow_litres_per_minute: f64, temp_high: f64, temp_base: f64) -> f64 {
        self.volumetric_energy_content_kwh_per_litre(temp_high, temp_base)
            * flow_litres_per_minute
            * MINUTES_PER_HOUR as f64
    }
}

pub static WATER: LazyLock<MaterialProperties> =
    LazyLock::new(|| MaterialProperties::new(1.0, 4184.0));
