//! Tests for region and currency pricing resolution

use costctl::catalog::tier;
use costctl::cost::calculate_costs;
use costctl::pricing::PricingCatalog;
use costctl::schedule::SchedulePreset;
use tempfile::TempDir;

#[test]
fn test_usd_region_uses_base_prices() {
    let catalog = PricingCatalog::builtin();
    let pricing = catalog.resolve_for_region("eastus", None);
    assert_eq!(pricing.currency_code, "USD");
    assert_eq!(pricing.currency_symbol, "$");
    assert_eq!(pricing.cpu_price_per_second, catalog.base_prices.cpu_per_second);
    assert_eq!(
        pricing.memory_price_per_gib_second,
        catalog.base_prices.memory_per_gib_second
    );
}

#[test]
fn test_region_currency_is_default() {
    let catalog = PricingCatalog::builtin();
    let pricing = catalog.resolve_for_region("westeurope", None);
    assert_eq!(pricing.currency_code, "EUR");
    assert_eq!(pricing.currency_symbol, "€");
    // The modern rate wins over the legacy one.
    assert!((pricing.cpu_price_per_second - 0.000034 * 0.885).abs() < 1e-15);
}

#[test]
fn test_currency_override() {
    let catalog = PricingCatalog::builtin();
    let pricing = catalog.resolve_for_region("westeurope", Some("USD"));
    assert_eq!(pricing.currency_code, "USD");
    assert_eq!(pricing.cpu_price_per_second, 0.000034);
}

#[test]
fn test_unknown_currency_falls_back_to_usd() {
    let catalog = PricingCatalog::builtin();
    let pricing = catalog.resolve("eastus", "XYZ");
    assert_eq!(pricing.currency_code, "USD");
    assert_eq!(pricing.currency_symbol, "$");
    assert_eq!(pricing.cpu_price_per_second, 0.000034);
}

#[test]
fn test_unknown_region_uses_neutral_multiplier() {
    let catalog = PricingCatalog::builtin();
    let pricing = catalog.resolve_for_region("moonbase", None);
    assert_eq!(pricing.region_multiplier, 1.0);
    assert_eq!(pricing.currency_code, "USD");
}

#[test]
fn test_region_multiplier_applied_once() {
    let mut catalog = PricingCatalog::builtin();
    catalog.regions.get_mut("eastus").unwrap().multiplier = 1.2;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("catalog.json");
    std::fs::write(&path, serde_json::to_string_pretty(&catalog).unwrap()).unwrap();
    let loaded = PricingCatalog::load(&path).unwrap();

    let pricing = loaded.resolve_for_region("eastus", None);
    assert_eq!(pricing.region_multiplier, 1.2);
    assert!((pricing.effective_cpu_price_per_second() - 0.000034 * 1.2).abs() < 1e-15);

    let schedule = SchedulePreset::Business.to_schedule();
    let t = tier(3).unwrap();
    let base = calculate_costs(
        &schedule,
        &t,
        &PricingCatalog::builtin().resolve_for_region("eastus", None).unit_rates(),
        None,
    );
    let adjusted = calculate_costs(&schedule, &t, &pricing.unit_rates(), None);
    assert!((adjusted.weekly_cost - base.weekly_cost * 1.2).abs() < 1e-9);
}

#[test]
fn test_invalid_catalog_is_rejected() {
    let mut catalog = PricingCatalog::builtin();
    catalog.regions.get_mut("eastus").unwrap().multiplier = 0.0;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("catalog.json");
    std::fs::write(&path, serde_json::to_string(&catalog).unwrap()).unwrap();
    assert!(PricingCatalog::load(&path).is_err());
    assert!(PricingCatalog::load(&dir.path().join("missing.json")).is_err());
}

#[test]
fn test_convert_from_usd() {
    let catalog = PricingCatalog::builtin();
    assert_eq!(catalog.convert_from_usd(10.0, "USD"), 10.0);
    assert!((catalog.convert_from_usd(10.0, "EUR") - 8.85).abs() < 1e-12);
    assert_eq!(catalog.convert_from_usd(10.0, "XYZ"), 10.0);
}
