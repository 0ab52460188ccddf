//! Cost calculation engine
//!
//! Turns a weekly schedule, a resource tier and unit prices into a
//! [`CostResult`]. Billing is scale-to-zero: only slots with running
//! instances cost anything, and each instance is billed for the full hour.
//!
//! Every function here is pure. Recompute whenever an input changes.

use crate::catalog::ResourceTier;
use crate::schedule::{WeeklySchedule, DAY_NAMES, HOURS_PER_DAY, SLOTS_PER_WEEK};
use serde::{Deserialize, Serialize};

/// Average number of weeks in a month.
pub const WEEKS_PER_MONTH: f64 = 4.33;
pub const MONTHS_PER_YEAR: f64 = 12.0;
pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Per-second prices in the billing currency plus the region multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitRates {
    pub cpu_price_per_second: f64,
    pub memory_price_per_gib_second: f64,
    pub region_multiplier: f64,
}

/// Monthly allowance billed at zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeTierAllowance {
    pub free_cpu_seconds: f64,
    pub free_memory_gib_seconds: f64,
}

impl Default for FreeTierAllowance {
    fn default() -> Self {
        Self {
            free_cpu_seconds: 180_000.0,
            free_memory_gib_seconds: 360_000.0,
        }
    }
}

/// How the free allowance was applied to one app's projected month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeTierUsage {
    pub monthly_cpu_seconds: f64,
    pub monthly_memory_gib_seconds: f64,
    pub billable_cpu_seconds: f64,
    pub billable_memory_gib_seconds: f64,
    pub cpu_billable_fraction: f64,
    pub memory_billable_fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostResult {
    pub cpu_cost_per_hour: f64,
    pub memory_cost_per_hour: f64,
    pub total_cost_per_instance_per_hour: f64,
    pub total_active_instance_hours: u64,
    /// Slots with no instances; informational only
    pub zero_instance_hours: usize,
    pub weekly_cost: f64,
    pub monthly_cost: f64,
    pub yearly_cost: f64,
    pub avg_instances_per_hour: f64,
    pub avg_active_instances_per_active_hour: f64,
    pub max_instances: u32,
    pub active_slots: usize,
    pub efficiency_percentage: f64,
    pub cpu_cores: f64,
    pub memory_gib: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_tier: Option<FreeTierUsage>,
}

impl CostResult {
    /// Weekly cost of the CPU component alone.
    pub fn weekly_cpu_cost(&self) -> f64 {
        self.total_active_instance_hours as f64 * self.cpu_cost_per_hour
    }

    /// Weekly cost of the memory component alone.
    pub fn weekly_memory_cost(&self) -> f64 {
        self.total_active_instance_hours as f64 * self.memory_cost_per_hour
    }
}

fn billable(monthly: f64, free: f64) -> (f64, f64) {
    let billable = (monthly - free).max(0.0);
    let fraction = if monthly > 0.0 { billable / monthly } else { 1.0 };
    (billable, fraction)
}

/// Compute costs for one app.
///
/// With a free-tier allowance, the month is projected from the weekly
/// instance-hours and the billable share of each resource scales its hourly
/// rate uniformly. Actual month-to-date consumption is not tracked.
pub fn calculate_costs(
    schedule: &WeeklySchedule,
    tier: &ResourceTier,
    rates: &UnitRates,
    free_tier: Option<&FreeTierAllowance>,
) -> CostResult {
    let mut total_active_instance_hours: u64 = 0;
    let mut zero_instance_hours = 0usize;
    let mut active_slots = 0usize;
    let mut max_instances = 0u32;

    for (_, _, instances) in schedule.slots() {
        if instances > 0 {
            total_active_instance_hours += instances as u64;
            active_slots += 1;
            max_instances = max_instances.max(instances);
        } else {
            zero_instance_hours += 1;
        }
    }

    let hours = total_active_instance_hours as f64;
    let cpu_rate =
        tier.cpu_cores * rates.cpu_price_per_second * SECONDS_PER_HOUR * rates.region_multiplier;
    let memory_rate = tier.memory_gib
        * rates.memory_price_per_gib_second
        * SECONDS_PER_HOUR
        * rates.region_multiplier;

    let (cpu_cost_per_hour, memory_cost_per_hour, free_tier) = match free_tier {
        Some(allowance) => {
            let monthly_cpu_seconds = hours * WEEKS_PER_MONTH * tier.cpu_cores * SECONDS_PER_HOUR;
            let monthly_memory_gib_seconds =
                hours * WEEKS_PER_MONTH * tier.memory_gib * SECONDS_PER_HOUR;
            let (billable_cpu_seconds, cpu_fraction) =
                billable(monthly_cpu_seconds, allowance.free_cpu_seconds);
            let (billable_memory_gib_seconds, memory_fraction) =
                billable(monthly_memory_gib_seconds, allowance.free_memory_gib_seconds);
            (
                cpu_rate * cpu_fraction,
                memory_rate * memory_fraction,
                Some(FreeTierUsage {
                    monthly_cpu_seconds,
                    monthly_memory_gib_seconds,
                    billable_cpu_seconds,
                    billable_memory_gib_seconds,
                    cpu_billable_fraction: cpu_fraction,
                    memory_billable_fraction: memory_fraction,
                }),
            )
        }
        None => (cpu_rate, memory_rate, None),
    };

    let total_cost_per_instance_per_hour = cpu_cost_per_hour + memory_cost_per_hour;
    let weekly_cost = hours * total_cost_per_instance_per_hour;
    let monthly_cost = weekly_cost * WEEKS_PER_MONTH;
    let yearly_cost = monthly_cost * MONTHS_PER_YEAR;

    let slots = SLOTS_PER_WEEK as f64;
    CostResult {
        cpu_cost_per_hour,
        memory_cost_per_hour,
        total_cost_per_instance_per_hour,
        total_active_instance_hours,
        zero_instance_hours,
        weekly_cost,
        monthly_cost,
        yearly_cost,
        avg_instances_per_hour: hours / slots,
        avg_active_instances_per_active_hour: if active_slots > 0 {
            hours / active_slots as f64
        } else {
            0.0
        },
        max_instances,
        active_slots,
        efficiency_percentage: active_slots as f64 / slots * 100.0,
        cpu_cores: tier.cpu_cores,
        memory_gib: tier.memory_gib,
        free_tier,
    }
}

/// One day's share of a weekly estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCost {
    pub day: String,
    pub instance_hours: u64,
    /// Hours of the day with at least one instance
    pub active_hours: usize,
    pub avg_instances: f64,
    pub cost: f64,
}

/// Per-day costs and peak-capacity figures derived from a [`CostResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub days: Vec<DailyCost>,
    /// Cost of one hour at the peak instance count
    pub peak_hourly_cost: f64,
    /// Weekly cost of running the peak instance count every hour
    pub always_on_weekly_cost: f64,
    /// What scaling to zero saves per week against always-on at peak
    pub scale_to_zero_savings: f64,
    /// Instance-hours as a share of peak capacity over the week
    pub peak_utilization_percentage: f64,
}

impl CostBreakdown {
    pub fn new(schedule: &WeeklySchedule, result: &CostResult) -> Self {
        let rate = result.total_cost_per_instance_per_hour;
        let days = schedule
            .rows()
            .iter()
            .zip(schedule.daily_totals())
            .zip(DAY_NAMES)
            .map(|((hours, instance_hours), name)| DailyCost {
                day: name.to_string(),
                instance_hours,
                active_hours: hours.iter().filter(|&&n| n > 0).count(),
                avg_instances: instance_hours as f64 / HOURS_PER_DAY as f64,
                cost: instance_hours as f64 * rate,
            })
            .collect();

        let peak_hourly_cost = result.max_instances as f64 * rate;
        let always_on_weekly_cost = peak_hourly_cost * SLOTS_PER_WEEK as f64;
        let peak_capacity = result.max_instances as f64 * SLOTS_PER_WEEK as f64;
        Self {
            days,
            peak_hourly_cost,
            always_on_weekly_cost,
            scale_to_zero_savings: always_on_weekly_cost - result.weekly_cost,
            peak_utilization_percentage: if peak_capacity > 0.0 {
                result.total_active_instance_hours as f64 / peak_capacity * 100.0
            } else {
                0.0
            },
        }
    }
}

/// Costs summed across every app in an estimate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateTotals {
    pub weekly_cost: f64,
    pub monthly_cost: f64,
    pub yearly_cost: f64,
    pub weekly_cpu_cost: f64,
    pub weekly_memory_cost: f64,
    pub total_instance_hours: u64,
    /// vCPU-hours per week
    pub total_cpu_hours: f64,
    /// GiB-hours per week
    pub total_memory_gib_hours: f64,
}

impl EstimateTotals {
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a CostResult>) -> Self {
        results
            .into_iter()
            .fold(EstimateTotals::default(), |mut totals, r| {
                let hours = r.total_active_instance_hours as f64;
                totals.weekly_cost += r.weekly_cost;
                totals.monthly_cost += r.monthly_cost;
                totals.yearly_cost += r.yearly_cost;
                totals.weekly_cpu_cost += r.weekly_cpu_cost();
                totals.weekly_memory_cost += r.weekly_memory_cost();
                totals.total_instance_hours += r.total_active_instance_hours;
                totals.total_cpu_hours += hours * r.cpu_cores;
                totals.total_memory_gib_hours += hours * r.memory_gib;
                totals
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tier;

    fn rates(cpu: f64, memory: f64) -> UnitRates {
        UnitRates {
            cpu_price_per_second: cpu,
            memory_price_per_gib_second: memory,
            region_multiplier: 1.0,
        }
    }

    fn one_day_on() -> WeeklySchedule {
        let mut rows = [[0u32; 24]; 7];
        rows[0] = [1; 24];
        WeeklySchedule::from_rows(rows)
    }

    #[test]
    fn test_idle_schedule_costs_nothing() {
        let result = calculate_costs(
            &WeeklySchedule::new(),
            &tier(3).unwrap(),
            &rates(0.000034, 0.000004),
            None,
        );
        assert_eq!(result.weekly_cost, 0.0);
        assert_eq!(result.monthly_cost, 0.0);
        assert_eq!(result.yearly_cost, 0.0);
        assert_eq!(result.efficiency_percentage, 0.0);
        assert_eq!(result.max_instances, 0);
        assert_eq!(result.zero_instance_hours, 168);
        assert_eq!(result.avg_active_instances_per_active_hour, 0.0);
        // The hourly rate is still reported.
        assert!(result.total_cost_per_instance_per_hour > 0.0);
    }

    #[test]
    fn test_reference_scenario() {
        let result = calculate_costs(
            &one_day_on(),
            &tier(3).unwrap(),
            &rates(0.0000301, 0.0000036),
            None,
        );
        assert_eq!(result.total_active_instance_hours, 24);
        assert!((result.cpu_cost_per_hour - 0.10836).abs() < 1e-12);
        assert!((result.memory_cost_per_hour - 0.02592).abs() < 1e-12);
        assert!((result.total_cost_per_instance_per_hour - 0.13428).abs() < 1e-12);
        assert!((result.weekly_cost - 3.22272).abs() < 1e-10);
        assert_eq!(result.active_slots, 24);
        assert_eq!(result.max_instances, 1);
    }

    #[test]
    fn test_period_projection_identities() {
        let result = calculate_costs(
            &one_day_on().with_cell(3, 10, 7),
            &tier(7).unwrap(),
            &rates(0.000034, 0.000004),
            None,
        );
        assert_eq!(result.monthly_cost, result.weekly_cost * 4.33);
        assert_eq!(result.yearly_cost, result.monthly_cost * 12.0);
    }

    #[test]
    fn test_region_multiplier_scales_rate() {
        let base = calculate_costs(&one_day_on(), &tier(3).unwrap(), &rates(0.00003, 0.000004), None);
        let mut pricier = rates(0.00003, 0.000004);
        pricier.region_multiplier = 1.5;
        let scaled = calculate_costs(&one_day_on(), &tier(3).unwrap(), &pricier, None);
        assert!((scaled.weekly_cost - base.weekly_cost * 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_utilization_stats() {
        let schedule = WeeklySchedule::new()
            .with_cell(0, 9, 3)
            .with_cell(1, 14, 1)
            .with_cell(3, 20, 2)
            .with_cell(6, 6, 1);
        let result = calculate_costs(&schedule, &tier(3).unwrap(), &rates(0.000034, 0.000004), None);
        assert_eq!(result.total_active_instance_hours, 7);
        assert_eq!(result.max_instances, 3);
        assert_eq!(result.active_slots, 4);
        assert_eq!(result.efficiency_percentage, 4.0 / 168.0 * 100.0);
        assert_eq!(result.avg_instances_per_hour, 7.0 / 168.0);
        assert_eq!(result.avg_active_instances_per_active_hour, 7.0 / 4.0);
    }

    #[test]
    fn test_free_tier_covers_small_usage() {
        let schedule = WeeklySchedule::new().with_cell(0, 9, 1);
        let allowance = FreeTierAllowance::default();
        let result = calculate_costs(
            &schedule,
            &tier(3).unwrap(),
            &rates(0.000034, 0.000004),
            Some(&allowance),
        );
        let usage = result.free_tier.unwrap();
        assert_eq!(usage.monthly_cpu_seconds, 1.0 * 4.33 * 1.0 * 3600.0);
        assert_eq!(usage.billable_cpu_seconds, 0.0);
        assert_eq!(usage.billable_memory_gib_seconds, 0.0);
        assert_eq!(result.cpu_cost_per_hour, 0.0);
        assert_eq!(result.weekly_cost, 0.0);
    }

    #[test]
    fn test_free_tier_partial_discount() {
        // 112 instance-hours a week is well above the allowance.
        let mut schedule = WeeklySchedule::new();
        for day in 0..7 {
            for hour in 9..17 {
                schedule.set(day, hour, 2);
            }
        }
        let t = tier(3).unwrap();
        let r = rates(0.000034, 0.000004);
        let without = calculate_costs(&schedule, &t, &r, None);
        let with = calculate_costs(&schedule, &t, &r, Some(&FreeTierAllowance::default()));

        assert!(with.weekly_cost > 0.0);
        assert!(with.weekly_cost < without.weekly_cost);

        let usage = with.free_tier.unwrap();
        let expected_cpu = 112.0 * 4.33 * 3600.0 - 180_000.0;
        assert!((usage.billable_cpu_seconds - expected_cpu).abs() < 1e-6);
        assert!(
            (with.cpu_cost_per_hour - without.cpu_cost_per_hour * usage.cpu_billable_fraction).abs()
                < 1e-15
        );
    }

    #[test]
    fn test_free_tier_with_idle_schedule() {
        let result = calculate_costs(
            &WeeklySchedule::new(),
            &tier(3).unwrap(),
            &rates(0.000034, 0.000004),
            Some(&FreeTierAllowance::default()),
        );
        let usage = result.free_tier.unwrap();
        assert_eq!(usage.cpu_billable_fraction, 1.0);
        assert_eq!(result.weekly_cost, 0.0);
    }

    #[test]
    fn test_totals_sum_results() {
        let t = tier(3).unwrap();
        let r = rates(0.000034, 0.000004);
        let a = calculate_costs(&one_day_on(), &t, &r, None);
        let b = calculate_costs(&WeeklySchedule::uniform(1), &tier(0).unwrap(), &r, None);
        let totals = EstimateTotals::from_results([&a, &b]);
        assert_eq!(totals.total_instance_hours, 24 + 168);
        assert!((totals.weekly_cost - (a.weekly_cost + b.weekly_cost)).abs() < 1e-12);
        assert!((totals.total_cpu_hours - (24.0 * 1.0 + 168.0 * 0.25)).abs() < 1e-12);
        assert!((totals.total_memory_gib_hours - (24.0 * 2.0 + 168.0 * 0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_breakdown_per_day() {
        let schedule = one_day_on().with_cell(2, 10, 4).with_cell(2, 11, 2);
        let result = calculate_costs(&schedule, &tier(3).unwrap(), &rates(0.000034, 0.000004), None);
        let breakdown = CostBreakdown::new(&schedule, &result);

        assert_eq!(breakdown.days.len(), 7);
        assert_eq!(breakdown.days[0].day, "Mon");
        assert_eq!(breakdown.days[0].instance_hours, 24);
        assert_eq!(breakdown.days[0].active_hours, 24);
        assert_eq!(breakdown.days[0].avg_instances, 1.0);
        assert_eq!(breakdown.days[2].instance_hours, 6);
        assert_eq!(breakdown.days[2].active_hours, 2);
        assert_eq!(breakdown.days[2].avg_instances, 0.25);
        assert_eq!(breakdown.days[6].cost, 0.0);

        let daily_sum: f64 = breakdown.days.iter().map(|d| d.cost).sum();
        assert!((daily_sum - result.weekly_cost).abs() < 1e-9);
    }

    #[test]
    fn test_breakdown_peak_figures() {
        let schedule = one_day_on().with_cell(2, 10, 4);
        let result = calculate_costs(&schedule, &tier(3).unwrap(), &rates(0.000034, 0.000004), None);
        let breakdown = CostBreakdown::new(&schedule, &result);
        let rate = result.total_cost_per_instance_per_hour;

        assert!((breakdown.peak_hourly_cost - 4.0 * rate).abs() < 1e-12);
        assert!((breakdown.always_on_weekly_cost - 4.0 * 168.0 * rate).abs() < 1e-9);
        // 28 instance-hours used out of 672 available at peak.
        assert!((breakdown.scale_to_zero_savings - (672.0 - 28.0) * rate).abs() < 1e-9);
        assert!((breakdown.peak_utilization_percentage - 28.0 / 672.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_breakdown_of_idle_schedule() {
        let schedule = WeeklySchedule::new();
        let result = calculate_costs(&schedule, &tier(3).unwrap(), &rates(0.000034, 0.000004), None);
        let breakdown = CostBreakdown::new(&schedule, &result);
        assert_eq!(breakdown.peak_hourly_cost, 0.0);
        assert_eq!(breakdown.scale_to_zero_savings, 0.0);
        assert_eq!(breakdown.peak_utilization_percentage, 0.0);
    }

    #[test]
    fn test_deterministic() {
        let t = tier(5).unwrap();
        let r = rates(0.000034, 0.000004);
        let schedule = one_day_on().with_cell(4, 4, 9);
        let first = calculate_costs(&schedule, &t, &r, Some(&FreeTierAllowance::default()));
        let second = calculate_costs(&schedule, &t, &r, Some(&FreeTierAllowance::default()));
        assert_eq!(first, second);
    }
}
