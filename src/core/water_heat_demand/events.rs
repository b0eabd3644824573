use crate::core::water_heat_demand::cold_water_source::ColdWaterSource;
use crate::core::water_heat_demand::misc::warm_flow_power_kw;
use crate::core::units::MINUTES_PER_DAY;
use crate::errors::CoreError;
use crate::simulation_time::DayTimeline;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};
use tracing::debug;

/// Kinds of water draw-off. Only the warm kinds place a load on the heating
/// system; appliance fills run from the cold mains however long they run.
#[derive(Clone, Copy, Debug, Deserialize, Display, EnumIter, PartialEq, Eq, Serialize)]
pub enum WaterUseKind {
    Bath,
    Shower,
    Sink,
    Dishwasher,
    WashingMachine,
    ColdOnly,
}

impl WaterUseKind {
    pub fn is_thermal(&self) -> bool {
        matches!(self, Self::Bath | Self::Shower | Self::Sink)
    }

    /// Nominal outlet flow at medium intensity, in litres/minute.
    pub(crate) fn base_flow_litres_per_minute(&self) -> f64 {
        match self {
            Self::Bath => 12.0,
            Self::Shower => 8.0,
            Self::Sink => 4.0,
            Self::Dishwasher => 6.0,
            Self::WashingMachine => 6.0,
            Self::ColdOnly => 6.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Display, EnumIter, PartialEq, Eq, Serialize)]
pub enum DrawIntensity {
    Low,
    Medium,
    High,
}

impl DrawIntensity {
    pub(crate) fn flow_multiplier(&self) -> f64 {
        match self {
            Self::Low => 0.75,
            Self::Medium => 1.0,
            Self::High => 1.25,
        }
    }
}

/// A single water use event within the day, as a half-open minute window.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct WaterUseEvent {
    pub kind: WaterUseKind,
    pub intensity: DrawIntensity,
    pub start_minute: u32,
    pub end_minute: u32,
}

impl WaterUseEvent {
    pub fn new(
        kind: WaterUseKind,
        intensity: DrawIntensity,
        start_minute: u32,
        end_minute: u32,
    ) -> Result<Self, CoreError> {
        if start_minute >= end_minute || end_minute > MINUTES_PER_DAY {
            return Err(CoreError::InvalidEventWindow {
                start_minute,
                end_minute,
            });
        }
        Ok(Self {
            kind,
            intensity,
            start_minute,
            end_minute,
        })
    }

    pub fn flow_litres_per_minute(&self) -> f64 {
        self.kind.base_flow_litres_per_minute() * self.intensity.flow_multiplier()
    }
}

/// How warm draws reach (or bypass) the heating system.
///
/// An electric-only shower heats its own water at the point of use, so its
/// draw never reaches the boiler or cylinder while a bath still does.
#[derive(Clone, Copy, Debug, Default, Deserialize, Display, PartialEq, Eq, Serialize)]
pub enum HotWaterSupplyPath {
    #[default]
    Full,
    ColdOnly,
    ElectricShower,
}

impl HotWaterSupplyPath {
    fn thermal_fraction(&self, kind: WaterUseKind) -> f64 {
        if !kind.is_thermal() {
            return 0.0;
        }
        match self {
            Self::Full => 1.0,
            Self::ColdOnly => 0.0,
            Self::ElectricShower => {
                if matches!(kind, WaterUseKind::Shower) {
                    0.0
                } else {
                    1.0
                }
            }
        }
    }
}

/// Painted lifestyle flags from which the day's water use events are placed
/// at fixed clock times.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct LifestyleProfile {
    #[serde(default)]
    pub morning_peak: bool,
    #[serde(default)]
    pub evening_peak: bool,
    #[serde(default)]
    pub prefers_bath: bool,
    #[serde(default)]
    pub second_bathroom: bool,
    #[serde(default)]
    pub dishwasher: bool,
    #[serde(default)]
    pub washing_machine: bool,
}

// Fixed clock times for synthesized events, in minutes from midnight.
const MORNING_DRAW_START: u32 = 420; // 07:00
const MIDDAY_SINK_START: u32 = 780; // 13:00
const EVENING_DRAW_START: u32 = 1170; // 19:30
const DISHWASHER_START: u32 = 1230; // 20:30
const WASHING_MACHINE_START: u32 = 540; // 09:00

/// Place the day's events for a painted lifestyle profile. Deterministic:
/// the same profile always produces the same list, ordered by start time.
pub fn synthesize_events(profile: &LifestyleProfile) -> Vec<WaterUseEvent> {
    let mut events = vec![];
    let push = |events: &mut Vec<WaterUseEvent>, kind, intensity, start: u32, end: u32| {
        events.push(
            WaterUseEvent::new(kind, intensity, start, end)
                .unwrap_or_else(|_| unreachable!("synthesized events use fixed valid windows")),
        );
    };

    if profile.morning_peak {
        if profile.prefers_bath {
            push(
                &mut events,
                WaterUseKind::Bath,
                DrawIntensity::Medium,
                MORNING_DRAW_START,
                MORNING_DRAW_START + 20,
            );
        } else {
            push(
                &mut events,
                WaterUseKind::Shower,
                DrawIntensity::Medium,
                MORNING_DRAW_START,
                MORNING_DRAW_START + 10,
            );
        }
        if profile.second_bathroom {
            // a genuinely simultaneous draw from the second bathroom
            push(
                &mut events,
                WaterUseKind::Shower,
                DrawIntensity::Medium,
                MORNING_DRAW_START + 5,
                MORNING_DRAW_START + 15,
            );
        }
    }

    push(
        &mut events,
        WaterUseKind::Sink,
        DrawIntensity::Low,
        MIDDAY_SINK_START,
        MIDDAY_SINK_START + 5,
    );

    if profile.evening_peak {
        if profile.prefers_bath {
            push(
                &mut events,
                WaterUseKind::Bath,
                DrawIntensity::High,
                EVENING_DRAW_START,
                EVENING_DRAW_START + 20,
            );
        } else {
            push(
                &mut events,
                WaterUseKind::Shower,
                DrawIntensity::High,
                EVENING_DRAW_START,
                EVENING_DRAW_START + 10,
            );
        }
        if profile.second_bathroom {
            push(
                &mut events,
                WaterUseKind::Shower,
                DrawIntensity::Medium,
                EVENING_DRAW_START + 5,
                EVENING_DRAW_START + 15,
            );
        }
    }

    if profile.dishwasher {
        push(
            &mut events,
            WaterUseKind::Dishwasher,
            DrawIntensity::Medium,
            DISHWASHER_START,
            DISHWASHER_START + 45,
        );
    }
    if profile.washing_machine {
        push(
            &mut events,
            WaterUseKind::WashingMachine,
            DrawIntensity::Medium,
            WASHING_MACHINE_START,
            WASHING_MACHINE_START + 60,
        );
    }

    events.sort_by_key(|event| (event.start_minute, event.end_minute));
    events
}

/// The schedule assumed when no lifestyle profile was painted: a morning
/// shower, an evening bath and an evening dishwasher run. Callers using this
/// must disclose the assumption rather than silently substituting it.
pub fn default_schedule() -> Vec<WaterUseEvent> {
    [
        (WaterUseKind::Shower, DrawIntensity::Medium, MORNING_DRAW_START, MORNING_DRAW_START + 10),
        (WaterUseKind::Bath, DrawIntensity::High, EVENING_DRAW_START, EVENING_DRAW_START + 20),
        (WaterUseKind::Dishwasher, DrawIntensity::Medium, DISHWASHER_START, DISHWASHER_START + 45),
    ]
    .into_iter()
    .map(|(kind, intensity, start, end)| {
        WaterUseEvent::new(kind, intensity, start, end)
            .unwrap_or_else(|_| unreachable!("default schedule uses fixed valid windows"))
    })
    .collect()
}

/// Per-step draw series resolved from the event list: the demand side of the
/// hot water calculation, shared verbatim by every compared system.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawSchedule {
    thermal_kw: Vec<f64>,
    warm_flow_litres_per_minute: Vec<f64>,
    cold_flow_litres_per_minute: Vec<f64>,
    purge: Vec<bool>,
}

impl DrawSchedule {
    /// Resolve events onto the timeline. Draws overlapping a step boundary are
    /// attributed to every step their window intersects; simultaneous warm
    /// draws are summed into one equivalent higher-intensity draw.
    pub fn build(
        events: &[WaterUseEvent],
        supply_path: HotWaterSupplyPath,
        cold_feed: &ColdWaterSource,
        timeline: &DayTimeline,
    ) -> Self {
        let total_steps = timeline.total_steps();
        let mut thermal_kw = vec![0.0; total_steps];
        let mut warm_flow = vec![0.0; total_steps];
        let mut cold_flow = vec![0.0; total_steps];

        for step in timeline.iter() {
            for event in events
                .iter()
                .filter(|event| step.intersects(event.start_minute, event.end_minute))
            {
                let flow = event.flow_litres_per_minute();
                let fraction = supply_path.thermal_fraction(event.kind);
                if fraction > 0.0 {
                    warm_flow[step.index] += flow * fraction;
                    thermal_kw[step.index] +=
                        warm_flow_power_kw(flow * fraction, cold_feed.temperature(step.index));
                } else {
                    // cold fills and suppressed warm draws still pull on the mains
                    cold_flow[step.index] += flow;
                }
            }
        }

        // a purge step is one where a draw begins after a step with none
        let purge = std::iter::once(0.0)
            .chain(thermal_kw.iter().copied())
            .tuple_windows()
            .map(|(previous, current)| current > 0.0 && previous == 0.0)
            .collect();

        debug!(
            events = events.len(),
            active_steps = thermal_kw.iter().filter(|kw| **kw > 0.0).count(),
            "resolved draw schedule"
        );

        Self {
            thermal_kw,
            warm_flow_litres_per_minute: warm_flow,
            cold_flow_litres_per_minute: cold_flow,
            purge,
        }
    }

    pub fn thermal_kw(&self) -> &[f64] {
        &self.thermal_kw
    }

    pub fn warm_flow_litres_per_minute(&self) -> &[f64] {
        &self.warm_flow_litres_per_minute
    }

    pub fn cold_flow_litres_per_minute(&self) -> &[f64] {
        &self.cold_flow_litres_per_minute
    }

    pub fn purge(&self) -> &[bool] {
        &self.purge
    }
}
