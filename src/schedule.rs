//! Weekly activity schedules
//!
//! A schedule is a dense 7×24 grid of instance counts (day 0 is Monday).
//! Users rarely edit the grid cell by cell; they describe it with an ordered
//! list of [`ScheduleStep`]s ("Mon-Fri 06:00-23:00, 2 instances") which
//! [`expand_steps`] turns into a grid.

use crate::error::{CostctlError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use tracing::{debug, warn};

pub const DAYS_PER_WEEK: usize = 7;
pub const HOURS_PER_DAY: usize = 24;
pub const SLOTS_PER_WEEK: usize = DAYS_PER_WEEK * HOURS_PER_DAY;

/// Upper bound for a single cell when edited interactively. The cost engine
/// itself accepts any count.
pub const MAX_INSTANCES: u32 = 100;

pub const DAY_NAMES: [&str; DAYS_PER_WEEK] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
pub const DAY_NAMES_FULL: [&str; DAYS_PER_WEEK] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Instance counts for every hour of the week.
///
/// Serialized as an object of objects keyed by day then hour
/// (`{"0": {"9": 2}}`). Missing entries read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "ScheduleRepr", into = "ScheduleRepr")]
pub struct WeeklySchedule {
    cells: [[u32; HOURS_PER_DAY]; DAYS_PER_WEEK],
}

type ScheduleRepr = BTreeMap<u8, BTreeMap<u8, u32>>;

impl From<ScheduleRepr> for WeeklySchedule {
    fn from(repr: ScheduleRepr) -> Self {
        let mut schedule = WeeklySchedule::new();
        for (day, hours) in repr {
            for (hour, instances) in hours {
                if (day as usize) < DAYS_PER_WEEK && (hour as usize) < HOURS_PER_DAY {
                    schedule.cells[day as usize][hour as usize] = instances;
                } else {
                    warn!("Ignoring schedule cell outside the week: day {}, hour {}", day, hour);
                }
            }
        }
        schedule
    }
}

impl From<WeeklySchedule> for ScheduleRepr {
    fn from(schedule: WeeklySchedule) -> Self {
        schedule
            .cells
            .iter()
            .enumerate()
            .map(|(day, hours)| {
                let hours = hours
                    .iter()
                    .enumerate()
                    .map(|(hour, &instances)| (hour as u8, instances))
                    .collect();
                (day as u8, hours)
            })
            .collect()
    }
}

impl WeeklySchedule {
    /// All-zero schedule.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(cells: [[u32; HOURS_PER_DAY]; DAYS_PER_WEEK]) -> Self {
        Self { cells }
    }

    /// Same count in every slot of the week.
    pub fn uniform(instances: u32) -> Self {
        Self {
            cells: [[instances; HOURS_PER_DAY]; DAYS_PER_WEEK],
        }
    }

    pub fn rows(&self) -> &[[u32; HOURS_PER_DAY]; DAYS_PER_WEEK] {
        &self.cells
    }

    /// Instance count for a slot; out-of-range slots read as zero.
    pub fn get(&self, day: usize, hour: usize) -> u32 {
        self.cells
            .get(day)
            .and_then(|hours| hours.get(hour))
            .copied()
            .unwrap_or(0)
    }

    /// Set one slot. Out-of-range slots are ignored.
    pub fn set(&mut self, day: usize, hour: usize, instances: u32) {
        match self.cells.get_mut(day).and_then(|hours| hours.get_mut(hour)) {
            Some(cell) => *cell = instances,
            None => warn!("Ignoring write outside the week: day {}, hour {}", day, hour),
        }
    }

    /// Copy of this schedule with one slot changed.
    pub fn with_cell(mut self, day: usize, hour: usize, instances: u32) -> Self {
        self.set(day, hour, instances);
        self
    }

    fn fill(&mut self, day: usize, hours: Range<usize>, instances: u32) {
        for hour in hours {
            self.set(day, hour, instances);
        }
    }

    /// Iterate over `(day, hour, instances)` for every slot.
    pub fn slots(&self) -> impl Iterator<Item = (usize, usize, u32)> + '_ {
        self.cells.iter().enumerate().flat_map(|(day, hours)| {
            hours
                .iter()
                .enumerate()
                .map(move |(hour, &instances)| (day, hour, instances))
        })
    }

    /// Sum of all instance counts: the instance-hours of one week.
    pub fn total_instance_hours(&self) -> u64 {
        self.slots().map(|(_, _, n)| n as u64).sum()
    }

    /// Number of slots with at least one instance.
    pub fn active_slots(&self) -> usize {
        self.slots().filter(|&(_, _, n)| n > 0).count()
    }

    pub fn max_instances(&self) -> u32 {
        self.slots().map(|(_, _, n)| n).max().unwrap_or(0)
    }

    pub fn is_idle(&self) -> bool {
        self.active_slots() == 0
    }

    /// Instance-hours per day, Monday first.
    pub fn daily_totals(&self) -> [u64; DAYS_PER_WEEK] {
        let mut totals = [0u64; DAYS_PER_WEEK];
        for (day, hours) in self.cells.iter().enumerate() {
            totals[day] = hours.iter().map(|&n| n as u64).sum();
        }
        totals
    }
}

/// A wall-clock time with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
}

impl FromStr for TimeOfDay {
    type Err = CostctlError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || {
            CostctlError::validation("time", format!("Expected HH:MM (00:00-23:59), got: {}", s))
        };
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;
        if hour > 23 || minute > 59 {
            return Err(invalid());
        }
        Ok(Self { hour, minute })
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// A rule that sets `instances` on the given days between two times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleStep {
    pub id: u64,
    pub days: Vec<u8>,
    pub start_time: String,
    pub end_time: String,
    pub instances: u32,
}

impl ScheduleStep {
    /// A new step with the editor defaults: no days, 09:00-18:00, 1 instance.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            days: Vec::new(),
            start_time: "09:00".to_string(),
            end_time: "18:00".to_string(),
            instances: 1,
        }
    }

    /// Short human description, e.g. `Mon,Tue 06:00-23:00 x2`.
    pub fn describe(&self) -> String {
        let days = if self.days.is_empty() {
            "(no days)".to_string()
        } else {
            self.days
                .iter()
                .map(|&d| DAY_NAMES.get(d as usize).copied().unwrap_or("?"))
                .collect::<Vec<_>>()
                .join(",")
        };
        format!("{} {}-{} x{}", days, self.start_time, self.end_time, self.instances)
    }
}

/// Next free step id for a list of steps.
pub fn next_step_id(steps: &[ScheduleStep]) -> u64 {
    steps.iter().map(|s| s.id).max().map_or(1, |max| max + 1)
}

/// The step list a fresh editor is seeded with.
pub fn default_steps() -> Vec<ScheduleStep> {
    vec![
        ScheduleStep {
            id: 1,
            days: vec![0, 1, 2, 3, 4],
            start_time: "06:00".to_string(),
            end_time: "23:00".to_string(),
            instances: 2,
        },
        ScheduleStep {
            id: 2,
            days: vec![5, 6],
            start_time: "06:00".to_string(),
            end_time: "23:00".to_string(),
            instances: 1,
        },
        ScheduleStep {
            id: 3,
            days: vec![0, 1, 2, 3, 4, 5, 6],
            start_time: "23:00".to_string(),
            end_time: "06:00".to_string(),
            instances: 0,
        },
    ]
}

/// Expand an ordered list of steps into a weekly schedule.
///
/// Starts from an all-zero grid. Later steps overwrite earlier ones on the
/// cells they share. An end time with a non-zero minute also claims the end
/// hour (a partial hour counts as a full hour). An end time before the start
/// time spills into the following day, Sunday wrapping to Monday. Identical
/// start and end times run for 24 hours from the start.
pub fn expand_steps(steps: &[ScheduleStep]) -> WeeklySchedule {
    let mut schedule = WeeklySchedule::new();
    for step in steps {
        apply_step(&mut schedule, step);
    }
    schedule
}

fn apply_step(schedule: &mut WeeklySchedule, step: &ScheduleStep) {
    let (start, end) = match (
        step.start_time.parse::<TimeOfDay>(),
        step.end_time.parse::<TimeOfDay>(),
    ) {
        (Ok(start), Ok(end)) => (start, end),
        (Err(e), _) | (_, Err(e)) => {
            warn!("Skipping schedule step {}: {}", step.id, e);
            return;
        }
    };

    let start_hour = start.hour as usize;
    let end_hour = end.hour as usize;
    let wraps = end <= start;

    for &day in &step.days {
        let day = day as usize;
        if day >= DAYS_PER_WEEK {
            warn!("Skipping day {} in schedule step {}", day, step.id);
            continue;
        }

        if wraps {
            schedule.fill(day, start_hour..HOURS_PER_DAY, step.instances);
            let next_day = (day + 1) % DAYS_PER_WEEK;
            schedule.fill(next_day, 0..end_hour, step.instances);
            if end.minute > 0 {
                schedule.set(next_day, end_hour, step.instances);
            }
        } else {
            schedule.fill(day, start_hour..end_hour, step.instances);
            if end.minute > 0 {
                schedule.set(day, end_hour, step.instances);
            }
        }
    }

    debug!("Applied schedule step {}", step.describe());
}

/// Canned schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SchedulePreset {
    /// Mon-Fri 09:00-18:00, 2 instances
    Business,
    /// Mon-Fri 06:00-23:00 with 2 instances, weekends all day with 1
    Extended,
    /// Every hour of the week, 2 instances
    AlwaysOn,
    /// Everything off
    Clear,
}

impl SchedulePreset {
    pub fn to_schedule(self) -> WeeklySchedule {
        let mut schedule = WeeklySchedule::new();
        match self {
            SchedulePreset::Business => {
                for day in 0..5 {
                    schedule.fill(day, 9..18, 2);
                }
            }
            SchedulePreset::Extended => {
                for day in 0..5 {
                    schedule.fill(day, 6..23, 2);
                }
                for day in 5..7 {
                    schedule.fill(day, 0..HOURS_PER_DAY, 1);
                }
            }
            SchedulePreset::AlwaysOn => {
                schedule = WeeklySchedule::uniform(2);
            }
            SchedulePreset::Clear => {}
        }
        schedule
    }
}
