//! Pricing catalog and region/currency resolution
//!
//! The catalog holds USD base prices for active CPU and memory usage, the
//! monthly free allowances, per-region multipliers and currency conversion
//! rates. A built-in copy ships with the binary; a JSON file with the same
//! shape can replace it (see `pricing.catalog` in the config).
//!
//! Lookups never fail: an unknown region prices at multiplier 1.0 and an
//! unknown currency prices in USD, both with a warning.

use crate::cost::{FreeTierAllowance, UnitRates};
use crate::error::{CostctlError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

pub const BASE_CURRENCY: &str = "USD";
pub const DEFAULT_SYMBOL: &str = "$";
pub const DEFAULT_REGION: &str = "westeurope";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasePrices {
    /// USD per vCPU-second of active usage
    pub cpu_per_second: f64,
    /// USD per GiB-second of active usage
    pub memory_per_gib_second: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeAllowances {
    pub cpu_seconds: f64,
    pub memory_gib_seconds: f64,
    pub requests: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionData {
    pub name: String,
    pub multiplier: f64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyData {
    pub symbol: String,
    pub name: String,
    pub display_name: String,
    /// Static fallback rate, units of this currency per USD
    pub conversion: f64,
    /// Preferred rate when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modern_conversion: Option<f64>,
}

impl CurrencyData {
    /// Rate used for conversion: the modern rate if set and non-zero.
    pub fn rate(&self) -> f64 {
        match self.modern_conversion {
            Some(rate) if rate > 0.0 => rate,
            _ => self.conversion,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingCatalog {
    pub last_updated: String,
    pub source: String,
    pub base_prices: BasePrices,
    pub free_allowances: FreeAllowances,
    pub regions: BTreeMap<String, RegionData>,
    pub currencies: BTreeMap<String, CurrencyData>,
}

/// Effective prices for one region in one currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingConfig {
    pub region: String,
    pub region_multiplier: f64,
    pub currency_code: String,
    pub currency_symbol: String,
    /// Per vCPU-second in `currency_code`, before the region multiplier
    pub cpu_price_per_second: f64,
    /// Per GiB-second in `currency_code`, before the region multiplier
    pub memory_price_per_gib_second: f64,
    pub region_multipliers: BTreeMap<String, f64>,
}

impl PricingConfig {
    /// Region-adjusted per vCPU-second price.
    pub fn effective_cpu_price_per_second(&self) -> f64 {
        self.cpu_price_per_second * self.region_multiplier
    }

    /// Region-adjusted per GiB-second price.
    pub fn effective_memory_price_per_gib_second(&self) -> f64 {
        self.memory_price_per_gib_second * self.region_multiplier
    }

    /// Multiplier for any region in the catalog, 1.0 if unknown.
    pub fn multiplier_for(&self, region: &str) -> f64 {
        self.region_multipliers.get(region).copied().unwrap_or(1.0)
    }

    /// Rates for the cost engine. The engine applies the multiplier.
    pub fn unit_rates(&self) -> UnitRates {
        UnitRates {
            cpu_price_per_second: self.cpu_price_per_second,
            memory_price_per_gib_second: self.memory_price_per_gib_second,
            region_multiplier: self.region_multiplier,
        }
    }

    pub fn format_price(&self, amount: f64, decimals: usize) -> String {
        crate::utils::format_money(&self.currency_symbol, amount, decimals)
    }
}

impl PricingCatalog {
    /// Load a catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalog: PricingCatalog = serde_json::from_str(&content)?;
        catalog.validate()?;
        debug!(
            "Loaded pricing catalog from {} ({} regions, {} currencies)",
            path.display(),
            catalog.regions.len(),
            catalog.currencies.len()
        );
        Ok(catalog)
    }

    /// Load from `path` if given, otherwise the built-in catalog.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::builtin()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_prices.cpu_per_second < 0.0 || self.base_prices.memory_per_gib_second < 0.0 {
            return Err(CostctlError::Catalog(
                "Base prices must not be negative".to_string(),
            ));
        }
        if let Some((key, _)) = self.regions.iter().find(|(_, r)| r.multiplier <= 0.0) {
            return Err(CostctlError::Catalog(format!(
                "Region {} has a non-positive multiplier",
                key
            )));
        }
        if let Some((key, _)) = self.currencies.iter().find(|(_, c)| c.rate() <= 0.0) {
            return Err(CostctlError::Catalog(format!(
                "Currency {} has a non-positive conversion rate",
                key
            )));
        }
        Ok(())
    }

    pub fn region(&self, key: &str) -> Option<&RegionData> {
        self.regions.get(key)
    }

    pub fn currency(&self, code: &str) -> Option<&CurrencyData> {
        self.currencies.get(code)
    }

    /// Multiplier for a region, 1.0 with a warning if the region is unknown.
    pub fn region_multiplier(&self, region: &str) -> f64 {
        match self.regions.get(region) {
            Some(r) => r.multiplier,
            None => {
                warn!("Region {} not found, using multiplier 1.0", region);
                1.0
            }
        }
    }

    /// The currency a region bills in by default, USD if unknown.
    pub fn currency_for_region(&self, region: &str) -> String {
        self.regions
            .get(region)
            .map(|r| r.currency.clone())
            .unwrap_or_else(|| BASE_CURRENCY.to_string())
    }

    /// Display symbol for a region's default currency.
    pub fn currency_symbol_for_region(&self, region: &str) -> String {
        self.regions
            .get(region)
            .and_then(|r| self.currencies.get(&r.currency))
            .map(|c| c.symbol.clone())
            .unwrap_or_else(|| DEFAULT_SYMBOL.to_string())
    }

    /// Convert a USD amount. Unknown currencies return the USD amount.
    pub fn convert_from_usd(&self, amount_usd: f64, currency: &str) -> f64 {
        if currency == BASE_CURRENCY {
            return amount_usd;
        }
        match self.currencies.get(currency) {
            Some(c) => amount_usd * c.rate(),
            None => {
                warn!("Currency {} not found, using USD", currency);
                amount_usd
            }
        }
    }

    /// Resolve effective prices for `region` billed in `currency`.
    pub fn resolve(&self, region: &str, currency: &str) -> PricingConfig {
        let region_multiplier = self.region_multiplier(region);

        let currency_code = if currency == BASE_CURRENCY || self.currencies.contains_key(currency) {
            currency.to_string()
        } else {
            warn!("Currency {} not found, pricing in {}", currency, BASE_CURRENCY);
            BASE_CURRENCY.to_string()
        };

        let currency_symbol = self
            .currencies
            .get(&currency_code)
            .map(|c| c.symbol.clone())
            .unwrap_or_else(|| DEFAULT_SYMBOL.to_string());

        PricingConfig {
            region: region.to_string(),
            region_multiplier,
            cpu_price_per_second: self
                .convert_from_usd(self.base_prices.cpu_per_second, &currency_code),
            memory_price_per_gib_second: self
                .convert_from_usd(self.base_prices.memory_per_gib_second, &currency_code),
            currency_code,
            currency_symbol,
            region_multipliers: self
                .regions
                .iter()
                .map(|(key, r)| (key.clone(), r.multiplier))
                .collect(),
        }
    }

    /// Resolve using the region's own currency unless one is given.
    pub fn resolve_for_region(&self, region: &str, currency: Option<&str>) -> PricingConfig {
        let currency = currency
            .map(str::to_string)
            .unwrap_or_else(|| self.currency_for_region(region));
        self.resolve(region, &currency)
    }

    pub fn free_tier_allowance(&self) -> FreeTierAllowance {
        FreeTierAllowance {
            free_cpu_seconds: self.free_allowances.cpu_seconds,
            free_memory_gib_seconds: self.free_allowances.memory_gib_seconds,
        }
    }

    /// The catalog compiled into the binary.
    pub fn builtin() -> Self {
        let region = |name: &str, currency: &str| RegionData {
            name: name.to_string(),
            multiplier: 1.0,
            currency: currency.to_string(),
        };
        let regions = [
            ("eastus", region("East US", "USD")),
            ("eastus2", region("East US 2", "USD")),
            ("westus", region("West US", "USD")),
            ("westus2", region("West US 2", "USD")),
            ("westus3", region("West US 3", "USD")),
            ("centralus", region("Central US", "USD")),
            ("northcentralus", region("North Central US", "USD")),
            ("southcentralus", region("South Central US", "USD")),
            ("canadacentral", region("Canada Central", "CAD")),
            ("brazilsouth", region("Brazil South", "BRL")),
            ("westeurope", region("West Europe", "EUR")),
            ("northeurope", region("North Europe", "EUR")),
            ("francecentral", region("France Central", "EUR")),
            ("germanywestcentral", region("Germany West Central", "EUR")),
            ("italynorth", region("Italy North", "EUR")),
            ("swedencentral", region("Sweden Central", "SEK")),
            ("norwayeast", region("Norway East", "NOK")),
            ("switzerlandnorth", region("Switzerland North", "CHF")),
            ("uksouth", region("UK South", "GBP")),
            ("ukwest", region("UK West", "GBP")),
            ("japaneast", region("Japan East", "JPY")),
            ("koreacentral", region("Korea Central", "KRW")),
            ("southeastasia", region("Southeast Asia", "USD")),
            ("eastasia", region("East Asia", "USD")),
            ("centralindia", region("Central India", "INR")),
            ("australiaeast", region("Australia East", "AUD")),
        ]
        .into_iter()
        .map(|(key, data)| (key.to_string(), data))
        .collect();

        let currency = |code: &str, symbol: &str, display: &str, conversion: f64, modern: Option<f64>| {
            (
                code.to_string(),
                CurrencyData {
                    symbol: symbol.to_string(),
                    name: code.to_string(),
                    display_name: display.to_string(),
                    conversion,
                    modern_conversion: modern,
                },
            )
        };
        let currencies = [
            currency("USD", "$", "US Dollar", 1.0, Some(1.0)),
            currency("EUR", "€", "Euro", 0.92, Some(0.885)),
            currency("GBP", "£", "British Pound", 0.79, Some(0.74)),
            currency("CHF", "CHF", "Swiss Franc", 0.88, Some(0.8)),
            currency("CAD", "C$", "Canadian Dollar", 1.36, Some(1.37)),
            currency("AUD", "A$", "Australian Dollar", 1.52, Some(1.54)),
            currency("NZD", "NZ$", "New Zealand Dollar", 1.63, Some(1.67)),
            currency("JPY", "¥", "Japanese Yen", 149.5, Some(144.0)),
            currency("KRW", "₩", "Korean Won", 1330.0, Some(1380.0)),
            currency("DKK", "kr", "Danish Krone", 6.86, Some(6.6)),
            currency("NOK", "kr", "Norwegian Krone", 10.6, Some(10.2)),
            currency("SEK", "kr", "Swedish Krona", 10.4, Some(9.6)),
            currency("INR", "₹", "Indian Rupee", 83.0, Some(85.5)),
            currency("BRL", "R$", "Brazilian Real", 5.0, Some(5.5)),
            currency("TWD", "NT$", "Taiwan Dollar", 31.5, None),
            currency("RUB", "₽", "Russian Ruble", 92.0, None),
        ]
        .into_iter()
        .collect();

        Self {
            last_updated: "2025-06-30".to_string(),
            source: "Consumption plan, active usage retail prices".to_string(),
            base_prices: BasePrices {
                cpu_per_second: 0.000034,
                memory_per_gib_second: 0.000004,
            },
            free_allowances: FreeAllowances {
                cpu_seconds: 180_000.0,
                memory_gib_seconds: 360_000.0,
                requests: 2_000_000,
            },
            regions,
            currencies,
        }
    }
}
