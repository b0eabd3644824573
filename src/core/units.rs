pub const JOULES_PER_KILOWATT_HOUR: u32 = 3_600_000;
pub const WATTS_PER_KILOWATT: u32 = 1_000;
pub const LITRES_PER_CUBIC_METRE: u32 = 1_000;
pub const MINUTES_PER_HOUR: u32 = 60;
pub const MINUTES_PER_DAY: u32 = 1_440;
pub const HOURS_PER_DAY: u32 = 24;

pub(crate) fn minutes_to_hours(minutes: f64) -> f64 {
    minutes / MINUTES_PER_HOUR as f64
}

pub(crate) fn kw_to_kwh(power_kw: f64, duration_hours: f64) -> f64 {
    power_kw * duration_hours
}

pub(crate) fn kwh_to_kw(energy_kwh: f64, duration_hours: f64) -> f64 {
    energy_kwh / duration_hours
}
