//! CSV and printable HTML renderings of an estimate

use crate::catalog::ResourceTier;
use crate::cost::{CostResult, EstimateTotals};
use crate::error::{CostctlError, Result};
use crate::pricing::{PricingCatalog, PricingConfig};
use crate::state::EstimateState;
use crate::utils::{escape_csv_field, escape_html, export_file_name, format_unit_price};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

pub const CSV_HEADER: &str = "App Name,CPU (vCPU),Memory (GiB),Region,Currency,Total Instance Hours,CPU Cost,Memory Cost,Total Cost";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Html,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Html => "html",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = CostctlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "html" | "pdf" => Ok(ExportFormat::Html),
            _ => Err(CostctlError::Validation {
                field: "format".to_string(),
                reason: format!("Unsupported export format: {}. Use 'csv' or 'html'", s),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppCost {
    pub id: String,
    pub name: String,
    pub color: String,
    pub tier: ResourceTier,
    pub costs: CostResult,
}

/// Everything needed to present or export an estimate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateReport {
    pub estimate_name: String,
    pub region: String,
    pub region_name: String,
    pub free_tier_enabled: bool,
    pub pricing: PricingConfig,
    pub apps: Vec<AppCost>,
    pub totals: EstimateTotals,
}

impl EstimateReport {
    pub fn build(state: &EstimateState, catalog: &PricingCatalog) -> Self {
        let pricing =
            catalog.resolve_for_region(&state.selected_region, state.selected_currency.as_deref());
        let allowance = state.free_tier_allowance(catalog.free_tier_allowance());
        let apps: Vec<AppCost> = state
            .apps
            .iter()
            .map(|app| AppCost {
                id: app.id.clone(),
                name: app.name.clone(),
                color: app.color.clone(),
                tier: app.tier(),
                costs: app.costs(&pricing, allowance.as_ref()),
            })
            .collect();
        let totals = EstimateTotals::from_results(apps.iter().map(|a| &a.costs));
        let region_name = catalog
            .region(&state.selected_region)
            .map(|r| r.name.clone())
            .unwrap_or_else(|| state.selected_region.clone());

        Self {
            estimate_name: state.estimate_name.clone(),
            region: state.selected_region.clone(),
            region_name,
            free_tier_enabled: state.free_tier_enabled,
            pricing,
            apps,
            totals,
        }
    }

    fn money(&self, amount: f64) -> String {
        self.pricing.format_price(amount, 2)
    }
}

pub fn generate_csv(report: &EstimateReport) -> String {
    let mut csv = String::from(CSV_HEADER);
    csv.push('\n');

    let region = escape_csv_field(&report.region);
    let currency = escape_csv_field(&report.pricing.currency_code);

    for app in &report.apps {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{:.2},{:.2},{:.2}\n",
            escape_csv_field(&app.name),
            app.tier.cpu_cores,
            app.tier.memory_gib,
            region,
            currency,
            app.costs.total_active_instance_hours,
            app.costs.weekly_cpu_cost(),
            app.costs.weekly_memory_cost(),
            app.costs.weekly_cost,
        ));
    }

    let totals = &report.totals;
    csv.push_str(&format!(
        "TOTAL,{},{},{},{},{},{:.2},{:.2},{:.2}\n",
        totals.total_cpu_hours,
        totals.total_memory_gib_hours,
        region,
        currency,
        totals.total_instance_hours,
        totals.weekly_cpu_cost,
        totals.weekly_memory_cost,
        totals.weekly_cost,
    ));
    csv
}

pub fn generate_html(report: &EstimateReport, generated_on: NaiveDate) -> String {
    let title = escape_html(&report.estimate_name);
    let mut html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>{title} - Cost Estimate</title>
    <style>
        body {{ font-family: -apple-system, "Segoe UI", sans-serif; margin: 32px; color: #111827; }}
        table {{ border-collapse: collapse; width: 100%; margin-top: 16px; }}
        th, td {{ border: 1px solid #e5e7eb; padding: 8px; text-align: left; }}
        th {{ background-color: #f3f4f6; }}
        td.num {{ text-align: right; }}
        .swatch {{ display: inline-block; width: 10px; height: 10px; border-radius: 50%; margin-right: 6px; }}
        .summary {{ display: flex; gap: 32px; margin-top: 16px; }}
        .summary div {{ font-size: 1.1em; }}
        .footnote {{ margin-top: 24px; font-size: 0.85em; color: #6b7280; }}
        tfoot td {{ font-weight: bold; }}
        @media print {{
            body {{ margin: 0; }}
            th {{ -webkit-print-color-adjust: exact; print-color-adjust: exact; }}
        }}
    </style>
</head>
<body>
    <h1>{title}</h1>
    <p>Generated: {date}</p>
    <p>Region: {region} ({region_key}) &middot; Currency: {currency} &middot; Free tier: {free_tier}</p>
    <div class="summary">
        <div>Total Applications: <span class="count">{app_count}</span></div>
        <div>Weekly: <strong>{weekly}</strong></div>
        <div>Monthly: <strong>{monthly}</strong></div>
        <div>Yearly: <strong>{yearly}</strong></div>
    </div>
    <table>
        <thead>
        <tr>
            <th>Application</th>
            <th>Resources</th>
            <th>Instance Hours / Week</th>
            <th>CPU Cost / Week</th>
            <th>Memory Cost / Week</th>
            <th>Weekly Cost</th>
            <th>Monthly Cost</th>
            <th>Yearly Cost</th>
        </tr>
        </thead>
        <tbody>
"#,
        title = title,
        date = generated_on.format("%Y-%m-%d"),
        region = escape_html(&report.region_name),
        region_key = escape_html(&report.region),
        currency = escape_html(&report.pricing.currency_code),
        app_count = report.apps.len(),
        free_tier = if report.free_tier_enabled {
            "enabled"
        } else {
            "disabled"
        },
        weekly = escape_html(&report.money(report.totals.weekly_cost)),
        monthly = escape_html(&report.money(report.totals.monthly_cost)),
        yearly = escape_html(&report.money(report.totals.yearly_cost)),
    );

    for app in &report.apps {
        html.push_str(&format!(
            r#"        <tr>
            <td><span class="swatch" style="background-color: {color}"></span>{name}</td>
            <td>{tier}</td>
            <td class="num">{hours}</td>
            <td class="num">{cpu_cost}</td>
            <td class="num">{memory_cost}</td>
            <td class="num">{weekly}</td>
            <td class="num">{monthly}</td>
            <td class="num">{yearly}</td>
        </tr>
"#,
            cpu_cost = escape_html(&report.money(app.costs.weekly_cpu_cost())),
            memory_cost = escape_html(&report.money(app.costs.weekly_memory_cost())),
            color = escape_html(&app.color),
            name = escape_html(&app.name),
            tier = escape_html(&app.tier.label),
            hours = app.costs.total_active_instance_hours,
            weekly = escape_html(&report.money(app.costs.weekly_cost)),
            monthly = escape_html(&report.money(app.costs.monthly_cost)),
            yearly = escape_html(&report.money(app.costs.yearly_cost)),
        ));
    }

    html.push_str(&format!(
        r#"        </tbody>
        <tfoot>
        <tr>
            <td>Total</td>
            <td>{cpu} vCPU-hours, {mem} GiB-hours</td>
            <td class="num">{hours}</td>
            <td class="num">{cpu_cost}</td>
            <td class="num">{memory_cost}</td>
            <td class="num">{weekly}</td>
            <td class="num">{monthly}</td>
            <td class="num">{yearly}</td>
        </tr>
        </tfoot>
    </table>
    <p class="footnote">Unit prices ({region_key}): {currency} {cpu_price}/vCPU/sec, {currency} {memory_price}/GiB/sec. Monthly assumes 4.33 weeks.</p>
</body>
</html>
"#,
        cpu = report.totals.total_cpu_hours,
        mem = report.totals.total_memory_gib_hours,
        hours = report.totals.total_instance_hours,
        cpu_cost = escape_html(&report.money(report.totals.weekly_cpu_cost)),
        memory_cost = escape_html(&report.money(report.totals.weekly_memory_cost)),
        weekly = escape_html(&report.money(report.totals.weekly_cost)),
        monthly = escape_html(&report.money(report.totals.monthly_cost)),
        yearly = escape_html(&report.money(report.totals.yearly_cost)),
        region_key = escape_html(&report.region),
        currency = escape_html(&report.pricing.currency_code),
        cpu_price = format_unit_price(report.pricing.effective_cpu_price_per_second()),
        memory_price = format_unit_price(report.pricing.effective_memory_price_per_gib_second()),
    ));
    html
}

pub fn render(report: &EstimateReport, format: ExportFormat) -> String {
    match format {
        ExportFormat::Csv => generate_csv(report),
        ExportFormat::Html => generate_html(report, Local::now().date_naive()),
    }
}

/// Write the report into `dir` (or to `file` when given) and return the path written.
pub fn export_report(
    report: &EstimateReport,
    format: ExportFormat,
    dir: &Path,
    file: Option<&Path>,
) -> Result<PathBuf> {
    let path = match file {
        Some(f) => f.to_path_buf(),
        None => dir.join(export_file_name(
            Some(&report.estimate_name),
            Local::now().date_naive(),
            format.extension(),
        )),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            CostctlError::Export(format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }
    std::fs::write(&path, render(report, format))
        .map_err(|e| CostctlError::Export(format!("Failed to write {}: {}", path.display(), e)))?;
    info!("Exported estimate to {}", path.display());
    Ok(path)
}
