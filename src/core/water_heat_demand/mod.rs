pub mod cold_water_source;
pub mod events;
pub mod misc;
