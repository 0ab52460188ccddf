//! Integration tests for estimate state updates and persistence

use costctl::schedule::{SchedulePreset, ScheduleStep};
use costctl::state::{parse_state, EstimateState, StateChange, StateStore, APP_COLORS};
use tempfile::TempDir;

fn store_in(dir: &TempDir) -> StateStore {
    StateStore::new(dir.path().join("container-apps-calculator.json"))
}

#[test]
fn test_missing_file_gives_default_state() {
    let dir = TempDir::new().unwrap();
    let state = store_in(&dir).load();
    assert_eq!(state.apps.len(), 1);
    assert_eq!(state.estimate_name, "Container Apps");
    assert_eq!(state.selected_region, "westeurope");
}

#[test]
fn test_corrupt_json_gives_default_state() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    for content in ["{not json", "[]", r#"{"apps": null}"#, r#"{"apps": [{"id": 5}]}"#] {
        std::fs::write(store.path(), content).unwrap();
        let state = store.load();
        assert_eq!(state.apps.len(), 1, "content: {}", content);
        assert_eq!(state.apps[0].name, "Container App 1");
    }
}

#[test]
fn test_load_or_seeds_missing_and_rejected_files() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let seeded = || EstimateState {
        selected_region: "uksouth".to_string(),
        selected_currency: Some("GBP".to_string()),
        ..EstimateState::default()
    };

    let state = store.load_or(seeded);
    assert_eq!(state.selected_region, "uksouth");

    for content in ["{not json", r#"{"apps": "none"}"#] {
        std::fs::write(store.path(), content).unwrap();
        let state = store.load_or(seeded);
        assert_eq!(state.selected_region, "uksouth", "content: {}", content);
        assert_eq!(state.selected_currency.as_deref(), Some("GBP"));
    }

    // A valid file wins over the seed.
    store.save(&EstimateState::default()).unwrap();
    assert_eq!(store.load_or(seeded).selected_region, "westeurope");
}

#[test]
fn test_loads_browser_saved_blob() {
    let blob = r##"{
        "apps": [
            {
                "id": "k3j9x2a1b",
                "name": "API",
                "color": "#EF4444",
                "selectedCombination": 7,
                "schedule": {"0": {"9": 2, "10": 2}, "6": {"23": 1}},
                "configSteps": [
                    {"id": 1, "days": [0], "startTime": "09:00", "endTime": "11:00", "instances": 2}
                ]
            }
        ],
        "activeAppId": "k3j9x2a1b",
        "selectedRegion": "eastus",
        "estimateName": "",
        "freeTierEnabled": true
    }"##;
    let state = parse_state(blob).unwrap();
    assert_eq!(state.estimate_name, "Container Apps");
    assert!(state.free_tier_enabled);
    let app = state.active_app().unwrap();
    assert_eq!(app.tier().cpu_cores, 2.0);
    assert_eq!(app.schedule.total_instance_hours(), 5);
    assert_eq!(app.steps.len(), 1);
    assert_eq!(app.steps[0].end_time, "11:00");
}

#[test]
fn test_save_and_reload_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    let state = EstimateState::default();
    let id = state.active_app_id.clone().unwrap();
    let state = state
        .apply(StateChange::ApplyPreset {
            app_id: id.clone(),
            preset: SchedulePreset::Extended,
        })
        .unwrap()
        .apply(StateChange::AddStep {
            app_id: id,
            step: ScheduleStep::new(0),
        })
        .unwrap()
        .apply(StateChange::SetCurrency {
            currency: Some("GBP".to_string()),
        })
        .unwrap();
    store.save(&state).unwrap();

    let reloaded = store.load();
    assert_eq!(reloaded, state);
    assert_eq!(reloaded.selected_currency.as_deref(), Some("GBP"));

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
    assert!(raw["apps"][0].get("selectedCombination").is_some());
    assert!(raw["apps"][0].get("configSteps").is_some());
    assert!(raw.get("activeAppId").is_some());
}

#[test]
fn test_apply_leaves_previous_state_untouched() {
    let before = EstimateState::default();
    let snapshot = before.clone();
    let id = before.active_app_id.clone().unwrap();

    let _ = before
        .apply(StateChange::SetCell {
            app_id: id.clone(),
            day: 0,
            hour: 0,
            instances: 9,
        })
        .unwrap();
    let _ = before.apply(StateChange::AddApp { name: None }).unwrap();
    let _ = before.apply(StateChange::SetFreeTier { enabled: true }).unwrap();

    assert_eq!(before, snapshot);
}

#[test]
fn test_app_colors_stay_unique_until_palette_runs_out() {
    let mut state = EstimateState::default();
    for _ in 1..APP_COLORS.len() {
        state = state.apply(StateChange::AddApp { name: None }).unwrap();
    }
    let mut colors: Vec<&str> = state.apps.iter().map(|a| a.color.as_str()).collect();
    colors.sort_unstable();
    colors.dedup();
    assert_eq!(colors.len(), APP_COLORS.len());
    assert_eq!(state.apps.last().unwrap().name, "Container App 12");
}

#[test]
fn test_clear_removes_file() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.save(&EstimateState::default()).unwrap();
    assert!(store.path().exists());
    store.clear().unwrap();
    assert!(!store.path().exists());
    // Clearing twice is fine.
    store.clear().unwrap();
}
