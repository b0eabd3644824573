use crate::core::units::{minutes_to_hours, MINUTES_PER_DAY, MINUTES_PER_HOUR};
use crate::errors::CoreError;
use serde::Deserialize;

pub const DEFAULT_RESOLUTION_MINUTES: u32 = 15;

/// One synthetic day divided into equal steps. Every simulation runs over
/// exactly one of these; there is no multi-day mode.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(try_from = "u32")]
pub struct DayTimeline {
    resolution_minutes: u32,
}

impl DayTimeline {
    pub fn new(resolution_minutes: u32) -> Result<Self, CoreError> {
        if resolution_minutes == 0 || MINUTES_PER_DAY % resolution_minutes != 0 {
            return Err(CoreError::InvalidResolution(resolution_minutes));
        }
        Ok(Self { resolution_minutes })
    }

    pub fn resolution_minutes(&self) -> u32 {
        self.resolution_minutes
    }

    pub fn total_steps(&self) -> usize {
        (MINUTES_PER_DAY / self.resolution_minutes) as usize
    }

    pub fn step_hours(&self) -> f64 {
        minutes_to_hours(self.resolution_minutes as f64)
    }

    pub fn iter(&self) -> DayTimelineIterator {
        DayTimelineIterator {
            timeline: *self,
            current_index: 0,
        }
    }
}

impl Default for DayTimeline {
    fn default() -> Self {
        Self {
            resolution_minutes: DEFAULT_RESOLUTION_MINUTES,
        }
    }
}

impl TryFrom<u32> for DayTimeline {
    type Error = CoreError;

    fn try_from(resolution_minutes: u32) -> Result<Self, Self::Error> {
        Self::new(resolution_minutes)
    }
}

#[derive(Clone)]
pub struct DayTimelineIterator {
    timeline: DayTimeline,
    current_index: usize,
}

/// One step of the day, with its half-open minute range.
#[derive(Clone, Copy, Debug)]
pub struct TimelineStep {
    pub index: usize,
    pub start_minute: u32,
    pub end_minute: u32,
    pub step_hours: f64,
}

impl TimelineStep {
    pub fn hour_of_day(&self) -> u32 {
        self.start_minute / MINUTES_PER_HOUR
    }

    pub fn start_hour(&self) -> f64 {
        self.start_minute as f64 / MINUTES_PER_HOUR as f64
    }

    /// Whether a [start, end) minute window intersects this step.
    pub fn intersects(&self, start_minute: u32, end_minute: u32) -> bool {
        start_minute < self.end_minute && end_minute > self.start_minute
    }
}

impl Iterator for DayTimelineIterator {
    type Item = TimelineStep;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_index >= self.timeline.total_steps() {
            return None;
        }
        let index = self.current_index;
        let start_minute = index as u32 * self.timeline.resolution_minutes;
        self.current_index += 1;
        Some(TimelineStep {
            index,
            start_minute,
            end_minute: start_minute + self.timeline.resolution_minutes,
            step_hours: self.timeline.step_hours(),
        })
    }
}
