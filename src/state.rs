//! Multi-app estimate state
//!
//! An estimate holds one or more container apps plus the settings shared by
//! all of them (region, currency, free tier, estimate name). State is never
//! edited in place: [`EstimateState::apply`] takes a [`StateChange`] and
//! returns the next state, and the caller persists it afterwards with
//! [`StateStore::save`].

use crate::catalog::{self, ResourceTier, DEFAULT_TIER_INDEX};
use crate::cost::{calculate_costs, CostResult, FreeTierAllowance};
use crate::error::{CostctlError, Result};
use crate::pricing::{PricingConfig, DEFAULT_REGION};
use crate::schedule::{expand_steps, next_step_id, SchedulePreset, ScheduleStep, WeeklySchedule};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File stem of the persisted state blob.
pub const STORAGE_KEY: &str = "container-apps-calculator";
pub const DEFAULT_ESTIMATE_NAME: &str = "Container Apps";

pub const APP_COLORS: [&str; 12] = [
    "#3B82F6", // blue
    "#EF4444", // red
    "#10B981", // green
    "#F59E0B", // amber
    "#8B5CF6", // purple
    "#EC4899", // pink
    "#06B6D4", // cyan
    "#84CC16", // lime
    "#F97316", // orange
    "#6366F1", // indigo
    "#14B8A6", // teal
    "#A855F7", // violet
];

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_estimate_name() -> String {
    DEFAULT_ESTIMATE_NAME.to_string()
}

fn default_tier_index() -> usize {
    DEFAULT_TIER_INDEX
}

fn generate_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..9].to_string()
}

/// Pick a palette color nobody uses yet, or a random one once they are all taken.
fn pick_color(used: &[&str]) -> String {
    let available: Vec<&str> = APP_COLORS
        .iter()
        .copied()
        .filter(|c| !used.contains(c))
        .collect();
    if available.is_empty() {
        format!("#{:06x}", fastrand::u32(..0x0100_0000))
    } else {
        available[fastrand::usize(..available.len())].to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerApp {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(rename = "selectedCombination", default = "default_tier_index")]
    pub selected_tier: usize,
    #[serde(default)]
    pub schedule: WeeklySchedule,
    #[serde(rename = "configSteps", default)]
    pub steps: Vec<ScheduleStep>,
}

impl ContainerApp {
    pub fn new(id: String, name: String, color: String) -> Self {
        Self {
            id,
            name,
            color,
            selected_tier: DEFAULT_TIER_INDEX,
            schedule: WeeklySchedule::new(),
            steps: Vec::new(),
        }
    }

    pub fn tier(&self) -> ResourceTier {
        catalog::tier_or_default(self.selected_tier)
    }

    pub fn costs(
        &self,
        pricing: &PricingConfig,
        free_tier: Option<&FreeTierAllowance>,
    ) -> CostResult {
        calculate_costs(&self.schedule, &self.tier(), &pricing.unit_rates(), free_tier)
    }

    pub fn step(&self, step_id: u64) -> Option<&ScheduleStep> {
        self.steps.iter().find(|s| s.id == step_id)
    }
}

/// Partial edit of a schedule step; `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepUpdate {
    pub days: Option<Vec<u8>>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub instances: Option<u32>,
}

impl StepUpdate {
    fn merge_into(self, step: &ScheduleStep) -> ScheduleStep {
        ScheduleStep {
            id: step.id,
            days: self.days.unwrap_or_else(|| step.days.clone()),
            start_time: self.start_time.unwrap_or_else(|| step.start_time.clone()),
            end_time: self.end_time.unwrap_or_else(|| step.end_time.clone()),
            instances: self.instances.unwrap_or(step.instances),
        }
    }
}

/// One described edit to an estimate.
#[derive(Debug, Clone, PartialEq)]
pub enum StateChange {
    AddApp { name: Option<String> },
    RemoveApp { app_id: String },
    SetActiveApp { app_id: String },
    RenameApp { app_id: String, name: String },
    SetTier { app_id: String, tier: usize },
    SetSchedule { app_id: String, schedule: WeeklySchedule },
    SetCell { app_id: String, day: usize, hour: usize, instances: u32 },
    ApplyPreset { app_id: String, preset: SchedulePreset },
    /// Append a step; its id is replaced with the next free one
    AddStep { app_id: String, step: ScheduleStep },
    UpdateStep { app_id: String, step_id: u64, update: StepUpdate },
    RemoveStep { app_id: String, step_id: u64 },
    SetSteps { app_id: String, steps: Vec<ScheduleStep> },
    /// Replace the schedule with the expansion of the app's steps
    ApplySteps { app_id: String },
    SetRegion { region: String },
    SetCurrency { currency: Option<String> },
    SetEstimateName { name: String },
    SetFreeTier { enabled: bool },
}

impl StateChange {
    /// Change that writes `instances` into every listed day/hour cell of an app.
    ///
    /// A single cell becomes a `SetCell`; a block becomes a `SetSchedule`
    /// built on the app's current schedule.
    pub fn set_cells(app: &ContainerApp, days: &[u8], hours: &[usize], instances: u32) -> Self {
        if let ([day], [hour]) = (days, hours) {
            return StateChange::SetCell {
                app_id: app.id.clone(),
                day: *day as usize,
                hour: *hour,
                instances,
            };
        }
        let mut schedule = app.schedule;
        for &day in days {
            for &hour in hours {
                schedule.set(day as usize, hour, instances);
            }
        }
        StateChange::SetSchedule {
            app_id: app.id.clone(),
            schedule,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateState {
    pub apps: Vec<ContainerApp>,
    #[serde(default)]
    pub active_app_id: Option<String>,
    #[serde(default = "default_region")]
    pub selected_region: String,
    /// Billing currency override; the region's currency when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_currency: Option<String>,
    #[serde(default = "default_estimate_name")]
    pub estimate_name: String,
    #[serde(default)]
    pub free_tier_enabled: bool,
}

impl Default for EstimateState {
    fn default() -> Self {
        let id = generate_id();
        Self {
            apps: vec![ContainerApp::new(
                id.clone(),
                "Container App 1".to_string(),
                APP_COLORS[0].to_string(),
            )],
            active_app_id: Some(id),
            selected_region: default_region(),
            selected_currency: None,
            estimate_name: default_estimate_name(),
            free_tier_enabled: false,
        }
    }
}

impl EstimateState {
    pub fn active_app(&self) -> Option<&ContainerApp> {
        let id = self.active_app_id.as_deref()?;
        self.apps.iter().find(|app| app.id == id)
    }

    pub fn app(&self, app_id: &str) -> Option<&ContainerApp> {
        self.apps.iter().find(|app| app.id == app_id)
    }

    /// Find an app by id or, failing that, by case-insensitive name.
    /// Without a selector the active app is returned.
    pub fn find_app(&self, selector: Option<&str>) -> Result<&ContainerApp> {
        match selector {
            Some(sel) => self
                .app(sel)
                .or_else(|| self.apps.iter().find(|app| app.name.eq_ignore_ascii_case(sel)))
                .ok_or_else(|| CostctlError::AppNotFound(sel.to_string())),
            None => self
                .active_app()
                .ok_or_else(|| CostctlError::AppNotFound("(no active app)".to_string())),
        }
    }

    /// Free-tier allowance to apply, if enabled.
    pub fn free_tier_allowance(&self, allowance: FreeTierAllowance) -> Option<FreeTierAllowance> {
        self.free_tier_enabled.then_some(allowance)
    }

    fn update_app<F>(&self, app_id: &str, edit: F) -> Result<EstimateState>
    where
        F: FnOnce(&ContainerApp) -> Result<ContainerApp>,
    {
        let index = self
            .apps
            .iter()
            .position(|app| app.id == app_id)
            .ok_or_else(|| CostctlError::AppNotFound(app_id.to_string()))?;
        let mut next = self.clone();
        next.apps[index] = edit(&self.apps[index])?;
        Ok(next)
    }

    /// Produce the state that results from `change`. `self` is left untouched.
    pub fn apply(&self, change: StateChange) -> Result<EstimateState> {
        debug!("Applying state change: {:?}", change);
        match change {
            StateChange::AddApp { name } => {
                let used: Vec<&str> = self.apps.iter().map(|app| app.color.as_str()).collect();
                let id = generate_id();
                let name = name
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| format!("Container App {}", self.apps.len() + 1));
                let mut next = self.clone();
                next.apps.push(ContainerApp::new(id.clone(), name, pick_color(&used)));
                next.active_app_id = Some(id);
                Ok(next)
            }
            StateChange::RemoveApp { app_id } => {
                if self.app(&app_id).is_none() {
                    return Err(CostctlError::AppNotFound(app_id));
                }
                let mut next = self.clone();
                next.apps.retain(|app| app.id != app_id);
                if self.active_app_id.as_deref() == Some(app_id.as_str()) {
                    next.active_app_id = next.apps.first().map(|app| app.id.clone());
                }
                Ok(next)
            }
            StateChange::SetActiveApp { app_id } => {
                if self.app(&app_id).is_none() {
                    return Err(CostctlError::AppNotFound(app_id));
                }
                Ok(EstimateState {
                    active_app_id: Some(app_id),
                    ..self.clone()
                })
            }
            StateChange::RenameApp { app_id, name } => self.update_app(&app_id, |app| {
                Ok(ContainerApp {
                    name,
                    ..app.clone()
                })
            }),
            StateChange::SetTier { app_id, tier } => {
                if catalog::tier(tier).is_none() {
                    return Err(CostctlError::validation(
                        "tier",
                        format!("Tier index must be 0-15, got: {}", tier),
                    ));
                }
                self.update_app(&app_id, |app| {
                    Ok(ContainerApp {
                        selected_tier: tier,
                        ..app.clone()
                    })
                })
            }
            StateChange::SetSchedule { app_id, schedule } => self.update_app(&app_id, |app| {
                Ok(ContainerApp {
                    schedule,
                    ..app.clone()
                })
            }),
            StateChange::SetCell {
                app_id,
                day,
                hour,
                instances,
            } => self.update_app(&app_id, |app| {
                Ok(ContainerApp {
                    schedule: app.schedule.with_cell(day, hour, instances),
                    ..app.clone()
                })
            }),
            StateChange::ApplyPreset { app_id, preset } => self.update_app(&app_id, |app| {
                Ok(ContainerApp {
                    schedule: preset.to_schedule(),
                    ..app.clone()
                })
            }),
            StateChange::AddStep { app_id, step } => self.update_app(&app_id, |app| {
                let mut steps = app.steps.clone();
                steps.push(ScheduleStep {
                    id: next_step_id(&app.steps),
                    ..step
                });
                Ok(ContainerApp {
                    steps,
                    ..app.clone()
                })
            }),
            StateChange::UpdateStep {
                app_id,
                step_id,
                update,
            } => self.update_app(&app_id, |app| {
                let current = app.step(step_id).ok_or_else(|| CostctlError::StepNotFound {
                    app_id: app.id.clone(),
                    step_id,
                })?;
                let replacement = update.merge_into(current);
                let steps = app
                    .steps
                    .iter()
                    .map(|s| if s.id == step_id { replacement.clone() } else { s.clone() })
                    .collect();
                Ok(ContainerApp {
                    steps,
                    ..app.clone()
                })
            }),
            StateChange::RemoveStep { app_id, step_id } => self.update_app(&app_id, |app| {
                if app.step(step_id).is_none() {
                    return Err(CostctlError::StepNotFound {
                        app_id: app.id.clone(),
                        step_id,
                    });
                }
                Ok(ContainerApp {
                    steps: app.steps.iter().filter(|s| s.id != step_id).cloned().collect(),
                    ..app.clone()
                })
            }),
            StateChange::SetSteps { app_id, steps } => self.update_app(&app_id, |app| {
                Ok(ContainerApp {
                    steps,
                    ..app.clone()
                })
            }),
            StateChange::ApplySteps { app_id } => self.update_app(&app_id, |app| {
                Ok(ContainerApp {
                    schedule: expand_steps(&app.steps),
                    ..app.clone()
                })
            }),
            StateChange::SetRegion { region } => Ok(EstimateState {
                selected_region: region,
                ..self.clone()
            }),
            StateChange::SetCurrency { currency } => Ok(EstimateState {
                selected_currency: currency,
                ..self.clone()
            }),
            StateChange::SetEstimateName { name } => Ok(EstimateState {
                estimate_name: name,
                ..self.clone()
            }),
            StateChange::SetFreeTier { enabled } => Ok(EstimateState {
                free_tier_enabled: enabled,
                ..self.clone()
            }),
        }
    }
}

/// Parse a persisted blob. Returns `None` unless it has an `apps` array and
/// deserializes cleanly.
pub fn parse_state(content: &str) -> Option<EstimateState> {
    let value: serde_json::Value = match serde_json::from_str(content) {
        Ok(v) => v,
        Err(e) => {
            warn!("Failed to parse saved state: {}", e);
            return None;
        }
    };
    if !value.get("apps").is_some_and(|apps| apps.is_array()) {
        warn!("Saved state has no apps array, ignoring it");
        return None;
    }
    match serde_json::from_value::<EstimateState>(value) {
        Ok(mut state) => {
            if state.estimate_name.trim().is_empty() {
                state.estimate_name = default_estimate_name();
            }
            Some(state)
        }
        Err(e) => {
            warn!("Saved state is malformed: {}", e);
            None
        }
    }
}

/// JSON file holding the whole estimate.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `<data dir>/costctl/container-apps-calculator.json`
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .map(|d| d.join("costctl"))
            .unwrap_or_else(|| PathBuf::from(".costctl"))
            .join(format!("{}.json", STORAGE_KEY))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved estimate, or a fresh default one if there is none or
    /// it cannot be used.
    pub fn load(&self) -> EstimateState {
        self.load_or(EstimateState::default)
    }

    /// Like [`StateStore::load`], with `fresh` building the state used when
    /// the file is missing, unreadable or rejected.
    pub fn load_or(&self, fresh: impl FnOnce() -> EstimateState) -> EstimateState {
        if !self.path.exists() {
            debug!("No saved state at {}, starting fresh", self.path.display());
            return fresh();
        }
        match std::fs::read_to_string(&self.path) {
            Ok(content) => parse_state(&content).unwrap_or_else(fresh),
            Err(e) => {
                warn!("Failed to read state from {}: {}", self.path.display(), e);
                fresh()
            }
        }
    }

    pub fn save(&self, state: &EstimateState) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.path, content)?;
        debug!("Saved state to {}", self.path.display());
        Ok(())
    }

    /// Delete the saved blob and hand back a fresh default state.
    pub fn clear(&self) -> Result<EstimateState> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            info!("Removed saved state {}", self.path.display());
        }
        Ok(EstimateState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn active_id(state: &EstimateState) -> String {
        state.active_app_id.clone().unwrap()
    }

    #[test]
    fn test_default_state() {
        let state = EstimateState::default();
        assert_eq!(state.apps.len(), 1);
        assert_eq!(state.apps[0].name, "Container App 1");
        assert_eq!(state.apps[0].selected_tier, 3);
        assert_eq!(state.apps[0].color, APP_COLORS[0]);
        assert_eq!(state.selected_region, "westeurope");
        assert_eq!(state.estimate_name, "Container Apps");
        assert!(!state.free_tier_enabled);
        assert_eq!(state.active_app().unwrap().id, state.apps[0].id);
    }

    #[test]
    fn test_add_app_activates_it_and_keeps_old_state() {
        let state = EstimateState::default();
        let next = state.apply(StateChange::AddApp { name: None }).unwrap();
        assert_eq!(state.apps.len(), 1);
        assert_eq!(next.apps.len(), 2);
        assert_eq!(next.apps[1].name, "Container App 2");
        assert_eq!(active_id(&next), next.apps[1].id);
        assert_ne!(next.apps[1].color, next.apps[0].color);
        assert_ne!(next.apps[1].id, next.apps[0].id);
    }

    #[test]
    fn test_colors_fall_back_to_random_hex() {
        let mut state = EstimateState::default();
        for _ in 0..APP_COLORS.len() {
            state = state.apply(StateChange::AddApp { name: None }).unwrap();
        }
        let last = state.apps.last().unwrap();
        assert!(last.color.starts_with('#'));
        assert_eq!(last.color.len(), 7);
    }

    #[test]
    fn test_remove_active_app_selects_first() {
        let state = EstimateState::default()
            .apply(StateChange::AddApp {
                name: Some("api".to_string()),
            })
            .unwrap();
        let api = active_id(&state);
        let next = state.apply(StateChange::RemoveApp { app_id: api }).unwrap();
        assert_eq!(next.apps.len(), 1);
        assert_eq!(active_id(&next), next.apps[0].id);
    }

    #[test]
    fn test_set_cells_single_cell_and_block() {
        let state = EstimateState::default();
        let app = state.active_app().unwrap();

        let single = StateChange::set_cells(app, &[2], &[14], 5);
        assert!(matches!(single, StateChange::SetCell { day: 2, hour: 14, instances: 5, .. }));
        let next = state.apply(single).unwrap();
        assert_eq!(next.active_app().unwrap().schedule.get(2, 14), 5);
        assert_eq!(next.active_app().unwrap().schedule.total_instance_hours(), 5);

        let block = StateChange::set_cells(next.active_app().unwrap(), &[0, 1], &[9, 10, 11], 2);
        assert!(matches!(block, StateChange::SetSchedule { .. }));
        let after = next.apply(block).unwrap();
        let schedule = after.active_app().unwrap().schedule;
        assert_eq!(schedule.get(1, 11), 2);
        assert_eq!(schedule.get(2, 14), 5);
        assert_eq!(schedule.total_instance_hours(), 5 + 12);
    }

    #[test]
    fn test_remove_unknown_app() {
        let state = EstimateState::default();
        let err = state
            .apply(StateChange::RemoveApp {
                app_id: "nope".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, CostctlError::AppNotFound(_)));
    }

    #[test]
    fn test_set_tier_validates_index() {
        let state = EstimateState::default();
        let id = active_id(&state);
        let next = state
            .apply(StateChange::SetTier {
                app_id: id.clone(),
                tier: 7,
            })
            .unwrap();
        assert_eq!(next.active_app().unwrap().tier().cpu_cores, 2.0);
        assert!(state
            .apply(StateChange::SetTier { app_id: id, tier: 16 })
            .is_err());
    }

    #[test]
    fn test_step_lifecycle() {
        let state = EstimateState::default();
        let id = active_id(&state);
        let state = state
            .apply(StateChange::AddStep {
                app_id: id.clone(),
                step: ScheduleStep {
                    days: vec![0],
                    ..ScheduleStep::new(0)
                },
            })
            .unwrap();
        let step_id = state.active_app().unwrap().steps[0].id;
        assert_eq!(step_id, 1);

        let state = state
            .apply(StateChange::UpdateStep {
                app_id: id.clone(),
                step_id,
                update: StepUpdate {
                    instances: Some(3),
                    ..StepUpdate::default()
                },
            })
            .unwrap();
        let step = &state.active_app().unwrap().steps[0];
        assert_eq!(step.instances, 3);
        assert_eq!(step.start_time, "09:00");

        // Steps do not touch the schedule until applied.
        assert!(state.active_app().unwrap().schedule.is_idle());
        let applied = state
            .apply(StateChange::ApplySteps { app_id: id.clone() })
            .unwrap();
        assert_eq!(applied.active_app().unwrap().schedule.get(0, 9), 3);
        assert_eq!(applied.active_app().unwrap().schedule.total_instance_hours(), 27);

        let removed = applied
            .apply(StateChange::RemoveStep {
                app_id: id.clone(),
                step_id,
            })
            .unwrap();
        assert!(removed.active_app().unwrap().steps.is_empty());

        let err = removed
            .apply(StateChange::RemoveStep { app_id: id, step_id })
            .unwrap_err();
        assert!(matches!(err, CostctlError::StepNotFound { .. }));
    }

    #[test]
    fn test_shared_settings() {
        let state = EstimateState::default()
            .apply(StateChange::SetRegion {
                region: "eastus".to_string(),
            })
            .unwrap()
            .apply(StateChange::SetFreeTier { enabled: true })
            .unwrap()
            .apply(StateChange::SetEstimateName {
                name: "Prod".to_string(),
            })
            .unwrap();
        assert_eq!(state.selected_region, "eastus");
        assert!(state.free_tier_enabled);
        assert_eq!(state.estimate_name, "Prod");
        assert!(state.free_tier_allowance(FreeTierAllowance::default()).is_some());
    }

    #[test]
    fn test_find_app_by_name() {
        let state = EstimateState::default()
            .apply(StateChange::AddApp {
                name: Some("Worker".to_string()),
            })
            .unwrap();
        assert_eq!(state.find_app(Some("worker")).unwrap().name, "Worker");
        assert_eq!(state.find_app(None).unwrap().name, "Worker");
        assert!(state.find_app(Some("missing")).is_err());
    }

    #[test]
    fn test_parse_state_validation() {
        assert!(parse_state("not json").is_none());
        assert!(parse_state(r#"{"apps": {}}"#).is_none());
        assert!(parse_state(r#"{"estimateName": "x"}"#).is_none());

        let state = parse_state(
            r##"{"apps": [{"id": "a1", "name": "Web", "color": "#3B82F6",
                 "selectedCombination": 1, "schedule": {"0": {"9": 2}}, "configSteps": []}],
                 "activeAppId": "a1", "selectedRegion": "eastus"}"##,
        )
        .unwrap();
        assert_eq!(state.estimate_name, "Container Apps");
        assert_eq!(state.apps[0].schedule.get(0, 9), 2);
        assert_eq!(state.apps[0].tier().cpu_cores, 0.5);
        assert!(!state.free_tier_enabled);
    }

    #[test]
    fn test_store_round_trip_and_clear() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("nested").join("state.json"));

        let fresh = store.load();
        assert_eq!(fresh.apps.len(), 1);

        let id = active_id(&fresh);
        let edited = fresh
            .apply(StateChange::ApplyPreset {
                app_id: id,
                preset: SchedulePreset::Business,
            })
            .unwrap();
        store.save(&edited).unwrap();
        assert_eq!(store.load(), edited);

        let cleared = store.clear().unwrap();
        assert!(!store.path().exists());
        assert!(cleared.active_app().unwrap().schedule.is_idle());
    }

    #[test]
    fn test_store_corrupt_file_falls_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, r#"{"apps": "nope"}"#).unwrap();
        let state = StateStore::new(path).load();
        assert_eq!(state.apps.len(), 1);
        assert_eq!(state.apps[0].name, "Container App 1");
    }
}
