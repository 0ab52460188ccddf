//! Input validation utilities
//!
//! The engine accepts any schedule it is given; these checks keep
//! user-supplied values inside the ranges the estimator offers.

use crate::catalog;
use crate::error::{CostctlError, Result};
use crate::pricing::PricingCatalog;
use crate::schedule::{TimeOfDay, DAYS_PER_WEEK, DAY_NAMES, DAY_NAMES_FULL, HOURS_PER_DAY, MAX_INSTANCES};

const MAX_NAME_LEN: usize = 100;

/// Accept a tier index (`0`-`15`) or a size preset key (`xs`, `s`, `m`, `l`, `xl`).
pub fn parse_tier(input: &str) -> Result<usize> {
    let input = input.trim();
    if let Some(index) = catalog::size_preset(&input.to_ascii_lowercase()) {
        return Ok(index);
    }
    let index: usize = input.parse().map_err(|_| CostctlError::Validation {
        field: "tier".to_string(),
        reason: format!(
            "Tier must be an index 0-{} or one of xs, s, m, l, xl, got: {}",
            catalog::tiers().len() - 1,
            input
        ),
    })?;
    validate_tier_index(index)?;
    Ok(index)
}

pub fn validate_tier_index(index: usize) -> Result<()> {
    let count = catalog::tiers().len();
    if index >= count {
        return Err(CostctlError::Validation {
            field: "tier".to_string(),
            reason: format!("Tier index must be 0-{}, got: {}", count - 1, index),
        });
    }
    Ok(())
}

pub fn validate_instances(instances: u32) -> Result<()> {
    if instances > MAX_INSTANCES {
        return Err(CostctlError::Validation {
            field: "instances".to_string(),
            reason: format!(
                "Instance count must be 0-{}, got: {}",
                MAX_INSTANCES, instances
            ),
        });
    }
    Ok(())
}

pub fn validate_hour(hour: usize) -> Result<()> {
    if hour >= HOURS_PER_DAY {
        return Err(CostctlError::Validation {
            field: "hour".to_string(),
            reason: format!("Hour must be 0-23, got: {}", hour),
        });
    }
    Ok(())
}

/// `HH:MM` with hour 0-23 and minute 0-59.
pub fn validate_time(time: &str) -> Result<()> {
    time.parse::<TimeOfDay>().map(|_| ())
}

/// Parse one day: an index `0`-`6` (Monday first) or a short/full English name.
pub fn parse_day(input: &str) -> Result<u8> {
    let input = input.trim();
    if let Ok(index) = input.parse::<usize>() {
        if index < DAYS_PER_WEEK {
            return Ok(index as u8);
        }
    }
    DAY_NAMES
        .iter()
        .zip(DAY_NAMES_FULL.iter())
        .position(|(short, full)| {
            input.eq_ignore_ascii_case(short) || input.eq_ignore_ascii_case(full)
        })
        .map(|i| i as u8)
        .ok_or_else(|| CostctlError::Validation {
            field: "day".to_string(),
            reason: format!("Day must be 0-6 or a weekday name, got: {}", input),
        })
}

/// Parse a day list such as `mon,wed`, `mon-fri`, `weekdays`, `weekend` or `all`.
///
/// The result is sorted and deduplicated.
pub fn parse_days(input: &str) -> Result<Vec<u8>> {
    let mut days = Vec::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.to_ascii_lowercase().as_str() {
            "all" | "daily" | "everyday" => days.extend(0..7),
            "weekdays" => days.extend(0..5),
            "weekend" | "weekends" => days.extend(5..7),
            _ => match part.split_once('-') {
                Some((from, to)) => {
                    let (from, to) = (parse_day(from)?, parse_day(to)?);
                    if from > to {
                        return Err(CostctlError::Validation {
                            field: "days".to_string(),
                            reason: format!("Day range must run forward, got: {}", part),
                        });
                    }
                    days.extend(from..=to);
                }
                None => days.push(parse_day(part)?),
            },
        }
    }
    if days.is_empty() {
        return Err(CostctlError::Validation {
            field: "days".to_string(),
            reason: "At least one day is required".to_string(),
        });
    }
    days.sort_unstable();
    days.dedup();
    Ok(days)
}

/// Parse an hour or an inclusive hour range: `9`, `9-17` or `all`.
pub fn parse_hours(input: &str) -> Result<Vec<usize>> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("all") {
        return Ok((0..HOURS_PER_DAY).collect());
    }
    let parse = |s: &str| -> Result<usize> {
        let hour: usize = s.trim().parse().map_err(|_| CostctlError::Validation {
            field: "hour".to_string(),
            reason: format!("Hour must be a number 0-23, got: {}", s.trim()),
        })?;
        validate_hour(hour)?;
        Ok(hour)
    };
    match input.split_once('-') {
        Some((from, to)) => {
            let (from, to) = (parse(from)?, parse(to)?);
            if from > to {
                return Err(CostctlError::Validation {
                    field: "hours".to_string(),
                    reason: format!("Hour range must run forward, got: {}", input),
                });
            }
            Ok((from..=to).collect())
        }
        None => Ok(vec![parse(input)?]),
    }
}

pub fn validate_region(catalog: &PricingCatalog, region: &str) -> Result<()> {
    if catalog.region(region).is_none() {
        return Err(CostctlError::Validation {
            field: "region".to_string(),
            reason: format!("Unknown region: {} (see `costctl regions`)", region),
        });
    }
    Ok(())
}

pub fn validate_currency(catalog: &PricingCatalog, currency: &str) -> Result<()> {
    if catalog.currency(currency).is_none() {
        return Err(CostctlError::Validation {
            field: "currency".to_string(),
            reason: format!("Unknown currency: {} (see `costctl currencies`)", currency),
        });
    }
    Ok(())
}

/// Non-blank, at most 100 characters, no control characters.
pub fn validate_name(field: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(CostctlError::Validation {
            field: field.to_string(),
            reason: "Name cannot be empty".to_string(),
        });
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(CostctlError::Validation {
            field: field.to_string(),
            reason: format!("Name must be at most {} characters", MAX_NAME_LEN),
        });
    }
    if name.chars().any(char::is_control) {
        return Err(CostctlError::Validation {
            field: field.to_string(),
            reason: "Name cannot contain control characters".to_string(),
        });
    }
    Ok(())
}
