//! CLI command handlers
//!
//! Every mutating command follows the same cycle: load state, apply one
//! `StateChange`, save, then print the recomputed estimate.

use anyhow::{Context as _, Result};
use clap::{Subcommand, ValueEnum};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use console::style;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use costctl::catalog;
use costctl::config::Config;
use costctl::cost::{calculate_costs, CostBreakdown, CostResult, FreeTierAllowance};
use costctl::export::{export_report, EstimateReport, ExportFormat};
use costctl::pricing::{PricingCatalog, PricingConfig};
use costctl::schedule::{
    default_steps, SchedulePreset, ScheduleStep, WeeklySchedule, DAY_NAMES, HOURS_PER_DAY,
};
use costctl::state::{ContainerApp, EstimateState, StateChange, StateStore, StepUpdate};
use costctl::utils::format_quantity;
use costctl::validation;

#[derive(Subcommand, Clone)]
pub enum AppCommands {
    /// List apps in the estimate
    List,
    /// Add an app and make it active
    Add {
        /// Name (defaults to "Container App N")
        name: Option<String>,
    },
    /// Remove an app
    Remove {
        /// App id or name
        app: String,
    },
    /// Make an app the active one
    Select {
        /// App id or name
        app: String,
    },
    /// Rename an app
    Rename {
        name: String,
        #[arg(long)]
        app: Option<String>,
    },
    /// Set the CPU/memory tier (index 0-15 or xs, s, m, l, xl)
    Tier {
        tier: String,
        #[arg(long)]
        app: Option<String>,
    },
    /// Replace the schedule with a preset
    Preset {
        #[arg(value_enum)]
        preset: SchedulePreset,
        #[arg(long)]
        app: Option<String>,
    },
    /// Set instance counts for a block of cells
    ///
    /// Examples:
    ///   costctl app set mon-fri 9-17 3
    ///   costctl app set weekend all 0
    Set {
        /// Days: mon,wed | mon-fri | weekdays | weekend | all
        days: String,
        /// Hours: 9 | 9-17 (inclusive) | all
        hours: String,
        instances: u32,
        #[arg(long)]
        app: Option<String>,
    },
    /// Show one app's schedule grid and costs
    Show {
        /// App id or name (defaults to the active app)
        app: Option<String>,
    },
}

#[derive(Subcommand, Clone)]
pub enum StepCommands {
    /// List schedule steps
    List {
        #[arg(long)]
        app: Option<String>,
    },
    /// Add a step
    ///
    /// Example: costctl step add --days mon-fri --start 06:00 --end 23:00 --instances 2
    Add {
        #[arg(long)]
        days: String,
        #[arg(long, default_value = "09:00")]
        start: String,
        #[arg(long, default_value = "18:00")]
        end: String,
        #[arg(long, default_value_t = 1)]
        instances: u32,
        #[arg(long)]
        app: Option<String>,
    },
    /// Change fields of an existing step
    Update {
        id: u64,
        #[arg(long)]
        days: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        instances: Option<u32>,
        #[arg(long)]
        app: Option<String>,
    },
    /// Remove a step
    Remove {
        id: u64,
        #[arg(long)]
        app: Option<String>,
    },
    /// Overwrite the schedule with the expanded steps
    Apply {
        #[arg(long)]
        app: Option<String>,
    },
    /// Replace the steps with the default template
    Defaults {
        #[arg(long)]
        app: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

/// Options for an ad-hoc estimate that never touches saved state.
#[derive(Debug, Clone)]
pub struct QuoteOptions {
    pub tier: String,
    pub preset: Option<SchedulePreset>,
    pub uniform: Option<u32>,
    pub region: Option<String>,
    pub currency: Option<String>,
    pub free_tier: bool,
}

/// Loaded configuration, pricing catalog and state store for one invocation.
pub struct Session {
    config: Config,
    catalog: PricingCatalog,
    store: StateStore,
    json: bool,
}

impl Session {
    pub fn new(config: Config, output_format: &str) -> Result<Self> {
        let catalog = PricingCatalog::load_or_builtin(config.pricing.catalog.as_deref())
            .context("Failed to load pricing catalog")?;
        let store = config.state_store();
        debug!("Using state file {}", store.path().display());
        Ok(Self {
            config,
            catalog,
            store,
            json: output_format == "json",
        })
    }

    /// Saved state, or a fresh one seeded with the configured region and currency.
    fn load_state(&self) -> EstimateState {
        self.store.load_or(|| self.fresh_state())
    }

    fn fresh_state(&self) -> EstimateState {
        EstimateState {
            selected_region: self.config.pricing.default_region.clone(),
            selected_currency: self.config.pricing.default_currency.clone(),
            ..EstimateState::default()
        }
    }

    fn commit(&self, state: &EstimateState, change: StateChange) -> Result<EstimateState> {
        let next = state.apply(change)?;
        self.store
            .save(&next)
            .with_context(|| format!("Failed to save state to {}", self.store.path().display()))?;
        Ok(next)
    }

    fn app_id(&self, state: &EstimateState, selector: Option<&str>) -> Result<String> {
        Ok(state.find_app(selector)?.id.clone())
    }

    fn print_json(&self, value: &impl serde::Serialize) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

pub fn list_tiers(session: &Session) -> Result<()> {
    let tiers = catalog::tiers();
    if session.json {
        return session.print_json(&tiers);
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Index", "vCPU", "Memory (GiB)", "Size"]);
    for (index, tier) in tiers.iter().enumerate() {
        let size = catalog::SIZE_PRESETS
            .iter()
            .find(|p| p.index == index)
            .map(|p| p.key.to_uppercase())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(index),
            Cell::new(format_quantity(tier.cpu_cores)),
            Cell::new(format_quantity(tier.memory_gib)),
            Cell::new(size),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn list_regions(session: &Session) -> Result<()> {
    if session.json {
        return session.print_json(&session.catalog.regions);
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Region", "Name", "Currency", "Multiplier"]);
    for (key, region) in &session.catalog.regions {
        table.add_row(vec![
            Cell::new(key),
            Cell::new(&region.name),
            Cell::new(&region.currency),
            Cell::new(format!("{:.2}", region.multiplier)),
        ]);
    }
    println!("{table}");
    println!(
        "{} {} ({})",
        style("Pricing:").dim(),
        session.catalog.source,
        session.catalog.last_updated
    );
    Ok(())
}

pub fn list_currencies(session: &Session) -> Result<()> {
    if session.json {
        return session.print_json(&session.catalog.currencies);
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Code", "Symbol", "Name", "Rate (per USD)"]);
    for (code, currency) in &session.catalog.currencies {
        table.add_row(vec![
            Cell::new(code),
            Cell::new(&currency.symbol),
            Cell::new(&currency.display_name),
            Cell::new(format!("{:.4}", currency.rate())),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn show_estimate(session: &Session) -> Result<()> {
    let state = session.load_state();
    print_estimate(session, &state)
}

fn print_estimate(session: &Session, state: &EstimateState) -> Result<()> {
    let report = EstimateReport::build(state, &session.catalog);
    if session.json {
        return session.print_json(&report);
    }

    println!(
        "{}  {} {}  {} {}  {} {}",
        style(&report.estimate_name).bold(),
        style("Region:").dim(),
        report.region_name,
        style("Currency:").dim(),
        report.pricing.currency_code,
        style("Free tier:").dim(),
        if report.free_tier_enabled { "on" } else { "off" },
    );

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "", "App", "Resources", "Inst-h/wk", "Weekly", "Monthly", "Yearly",
    ]);
    for app in &report.apps {
        let marker = if state.active_app_id.as_deref() == Some(app.id.as_str()) {
            "*"
        } else {
            ""
        };
        table.add_row(vec![
            Cell::new(marker),
            Cell::new(&app.name),
            Cell::new(&app.tier.label),
            Cell::new(app.costs.total_active_instance_hours),
            Cell::new(report.pricing.format_price(app.costs.weekly_cost, 2)),
            Cell::new(report.pricing.format_price(app.costs.monthly_cost, 2)),
            Cell::new(report.pricing.format_price(app.costs.yearly_cost, 2)),
        ]);
    }
    table.add_row(vec![
        Cell::new(""),
        Cell::new("Total"),
        Cell::new(format!(
            "{} vCPU-h, {} GiB-h",
            format_quantity(report.totals.total_cpu_hours),
            format_quantity(report.totals.total_memory_gib_hours)
        )),
        Cell::new(report.totals.total_instance_hours),
        Cell::new(report.pricing.format_price(report.totals.weekly_cost, 2)),
        Cell::new(report.pricing.format_price(report.totals.monthly_cost, 2)),
        Cell::new(report.pricing.format_price(report.totals.yearly_cost, 2)),
    ]);
    println!("{table}");
    println!(
        "{} {}",
        style("Monthly total:").dim(),
        style(report.pricing.format_price(report.totals.monthly_cost, 2))
            .yellow()
            .bold()
    );
    Ok(())
}

fn print_cost_breakdown(pricing: &PricingConfig, costs: &CostResult) {
    println!(
        "  {} {} (cpu {} + memory {})",
        style("Per instance-hour:").dim(),
        pricing.format_price(costs.total_cost_per_instance_per_hour, 4),
        pricing.format_price(costs.cpu_cost_per_hour, 4),
        pricing.format_price(costs.memory_cost_per_hour, 4),
    );
    println!(
        "  {} {} instance-hours over {} active hours (peak {}, {:.1}% of the week)",
        style("Usage:").dim(),
        costs.total_active_instance_hours,
        costs.active_slots,
        costs.max_instances,
        costs.efficiency_percentage,
    );
    println!(
        "  {} {}  {} {}  {} {}",
        style("Weekly:").dim(),
        pricing.format_price(costs.weekly_cost, 2),
        style("Monthly:").dim(),
        style(pricing.format_price(costs.monthly_cost, 2)).yellow(),
        style("Yearly:").dim(),
        pricing.format_price(costs.yearly_cost, 2),
    );
    if let Some(usage) = &costs.free_tier {
        println!(
            "  {} {:.0}% of CPU and {:.0}% of memory billable after the monthly allowance",
            style("Free tier:").dim(),
            usage.cpu_billable_fraction * 100.0,
            usage.memory_billable_fraction * 100.0,
        );
    }
}

fn print_schedule_grid(schedule: &WeeklySchedule) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    let mut header = vec![Cell::new("")];
    header.extend((0..HOURS_PER_DAY).map(|h| Cell::new(format!("{:02}", h))));
    table.set_header(header);
    for (day, row) in schedule.rows().iter().enumerate() {
        let mut cells = vec![Cell::new(DAY_NAMES[day])];
        cells.extend(row.iter().map(|&n| {
            if n == 0 {
                Cell::new("·")
            } else {
                Cell::new(n)
            }
        }));
        table.add_row(cells);
    }
    println!("{table}");
}

fn print_daily_breakdown(pricing: &PricingConfig, breakdown: &CostBreakdown) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Day", "Instance Hours", "Active Hours", "Avg Instances", "Cost"]);
    for day in &breakdown.days {
        table.add_row(vec![
            Cell::new(&day.day),
            Cell::new(day.instance_hours),
            Cell::new(format!("{}/{}", day.active_hours, HOURS_PER_DAY)),
            Cell::new(format!("{:.2}", day.avg_instances)),
            Cell::new(pricing.format_price(day.cost, 3)),
        ]);
    }
    println!("{table}");
    println!(
        "  {} {}/hour  {} {:.1}%  {} {}/week vs always-on at peak",
        style("Peak:").dim(),
        pricing.format_price(breakdown.peak_hourly_cost, 3),
        style("Utilization of peak:").dim(),
        breakdown.peak_utilization_percentage,
        style("Scale-to-zero savings:").dim(),
        style(pricing.format_price(breakdown.scale_to_zero_savings, 2)).green(),
    );
}

fn print_app(session: &Session, state: &EstimateState, app: &ContainerApp) -> Result<()> {
    let pricing = session
        .catalog
        .resolve_for_region(&state.selected_region, state.selected_currency.as_deref());
    let allowance = state.free_tier_allowance(session.catalog.free_tier_allowance());
    let costs = app.costs(&pricing, allowance.as_ref());
    let breakdown = CostBreakdown::new(&app.schedule, &costs);

    if session.json {
        return session.print_json(&json!({
            "app": app,
            "tier": app.tier(),
            "costs": costs,
            "breakdown": breakdown,
        }));
    }

    println!(
        "{} {}  {}",
        style(&app.name).bold().cyan(),
        style(format!("({})", app.id)).dim(),
        app.tier().label
    );
    print_schedule_grid(&app.schedule);
    print_cost_breakdown(&pricing, &costs);
    print_daily_breakdown(&pricing, &breakdown);
    Ok(())
}

pub fn handle_app_command(cmd: AppCommands, session: &Session) -> Result<()> {
    let state = session.load_state();
    match cmd {
        AppCommands::List => {
            if session.json {
                return session.print_json(&state.apps);
            }
            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec!["", "Id", "Name", "Tier", "Steps", "Inst-h/wk"]);
            for app in &state.apps {
                let active = state.active_app_id.as_deref() == Some(app.id.as_str());
                table.add_row(vec![
                    Cell::new(if active { "*" } else { "" }),
                    Cell::new(&app.id),
                    Cell::new(&app.name),
                    Cell::new(app.tier().label),
                    Cell::new(app.steps.len()),
                    Cell::new(app.schedule.total_instance_hours()),
                ]);
            }
            println!("{table}");
            Ok(())
        }
        AppCommands::Add { name } => {
            if let Some(name) = &name {
                validation::validate_name("name", name)?;
            }
            let next = session.commit(&state, StateChange::AddApp { name })?;
            if let Some(app) = next.active_app() {
                info!("Added app {} ({})", app.name, app.id);
                if !session.json {
                    println!("Added {} ({})", style(&app.name).bold(), app.id);
                }
            }
            print_estimate(session, &next)
        }
        AppCommands::Remove { app } => {
            let app_id = session.app_id(&state, Some(app.as_str()))?;
            let next = session.commit(&state, StateChange::RemoveApp { app_id })?;
            print_estimate(session, &next)
        }
        AppCommands::Select { app } => {
            let app_id = session.app_id(&state, Some(app.as_str()))?;
            let next = session.commit(&state, StateChange::SetActiveApp { app_id })?;
            print_estimate(session, &next)
        }
        AppCommands::Rename { name, app } => {
            validation::validate_name("name", &name)?;
            let app_id = session.app_id(&state, app.as_deref())?;
            let next = session.commit(&state, StateChange::RenameApp { app_id, name })?;
            print_estimate(session, &next)
        }
        AppCommands::Tier { tier, app } => {
            let tier = validation::parse_tier(&tier)?;
            let app_id = session.app_id(&state, app.as_deref())?;
            let next = session.commit(&state, StateChange::SetTier { app_id: app_id.clone(), tier })?;
            show_app_by_id(session, &next, &app_id)
        }
        AppCommands::Preset { preset, app } => {
            let app_id = session.app_id(&state, app.as_deref())?;
            let next = session.commit(
                &state,
                StateChange::ApplyPreset {
                    app_id: app_id.clone(),
                    preset,
                },
            )?;
            show_app_by_id(session, &next, &app_id)
        }
        AppCommands::Set {
            days,
            hours,
            instances,
            app,
        } => {
            let days = validation::parse_days(&days)?;
            let hours = validation::parse_hours(&hours)?;
            validation::validate_instances(instances)?;
            let target = state.find_app(app.as_deref())?;
            let app_id = target.id.clone();
            let change = StateChange::set_cells(target, &days, &hours, instances);
            let next = session.commit(&state, change)?;
            show_app_by_id(session, &next, &app_id)
        }
        AppCommands::Show { app } => {
            let app = state.find_app(app.as_deref())?;
            print_app(session, &state, app)
        }
    }
}

fn show_app_by_id(session: &Session, state: &EstimateState, app_id: &str) -> Result<()> {
    let app = state.find_app(Some(app_id))?;
    print_app(session, state, app)
}

fn print_steps(session: &Session, app: &ContainerApp) -> Result<()> {
    if session.json {
        return session.print_json(&app.steps);
    }
    if app.steps.is_empty() {
        println!(
            "{} has no schedule steps. Add one with 'costctl step add' or load the template with 'costctl step defaults'.",
            app.name
        );
        return Ok(());
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Id", "Days", "Start", "End", "Instances"]);
    for step in &app.steps {
        let days = step
            .days
            .iter()
            .map(|&d| DAY_NAMES.get(d as usize).copied().unwrap_or("?"))
            .collect::<Vec<_>>()
            .join(",");
        table.add_row(vec![
            Cell::new(step.id),
            Cell::new(days),
            Cell::new(&step.start_time),
            Cell::new(&step.end_time),
            Cell::new(step.instances),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn validate_step_times(start: &str, end: &str) -> Result<()> {
    validation::validate_time(start)?;
    validation::validate_time(end)?;
    Ok(())
}

pub fn handle_step_command(cmd: StepCommands, session: &Session) -> Result<()> {
    let state = session.load_state();
    match cmd {
        StepCommands::List { app } => print_steps(session, state.find_app(app.as_deref())?),
        StepCommands::Add {
            days,
            start,
            end,
            instances,
            app,
        } => {
            let days = validation::parse_days(&days)?;
            validate_step_times(&start, &end)?;
            validation::validate_instances(instances)?;
            let app_id = session.app_id(&state, app.as_deref())?;
            let step = ScheduleStep {
                id: 0,
                days,
                start_time: start,
                end_time: end,
                instances,
            };
            let next = session.commit(&state, StateChange::AddStep { app_id: app_id.clone(), step })?;
            print_steps(session, next.find_app(Some(app_id.as_str()))?)
        }
        StepCommands::Update {
            id,
            days,
            start,
            end,
            instances,
            app,
        } => {
            let days = days.as_deref().map(validation::parse_days).transpose()?;
            if let Some(start) = &start {
                validation::validate_time(start)?;
            }
            if let Some(end) = &end {
                validation::validate_time(end)?;
            }
            if let Some(instances) = instances {
                validation::validate_instances(instances)?;
            }
            let app_id = session.app_id(&state, app.as_deref())?;
            let update = StepUpdate {
                days,
                start_time: start,
                end_time: end,
                instances,
            };
            let next = session.commit(
                &state,
                StateChange::UpdateStep {
                    app_id: app_id.clone(),
                    step_id: id,
                    update,
                },
            )?;
            print_steps(session, next.find_app(Some(app_id.as_str()))?)
        }
        StepCommands::Remove { id, app } => {
            let app_id = session.app_id(&state, app.as_deref())?;
            let next = session.commit(
                &state,
                StateChange::RemoveStep {
                    app_id: app_id.clone(),
                    step_id: id,
                },
            )?;
            print_steps(session, next.find_app(Some(app_id.as_str()))?)
        }
        StepCommands::Apply { app } => {
            let app_id = session.app_id(&state, app.as_deref())?;
            let next = session.commit(&state, StateChange::ApplySteps { app_id: app_id.clone() })?;
            show_app_by_id(session, &next, &app_id)
        }
        StepCommands::Defaults { app } => {
            let app_id = session.app_id(&state, app.as_deref())?;
            let next = session.commit(
                &state,
                StateChange::SetSteps {
                    app_id: app_id.clone(),
                    steps: default_steps(),
                },
            )?;
            print_steps(session, next.find_app(Some(app_id.as_str()))?)
        }
    }
}

pub fn handle_region(region: Option<String>, session: &Session) -> Result<()> {
    let state = session.load_state();
    let Some(region) = region else {
        let name = session
            .catalog
            .region(&state.selected_region)
            .map(|r| r.name.as_str())
            .unwrap_or("unknown");
        if session.json {
            return session.print_json(&json!({ "region": state.selected_region, "name": name }));
        }
        println!("{} ({})", state.selected_region, name);
        return Ok(());
    };
    validation::validate_region(&session.catalog, &region)?;
    let next = session.commit(&state, StateChange::SetRegion { region })?;
    print_estimate(session, &next)
}

pub fn handle_currency(currency: Option<String>, auto: bool, session: &Session) -> Result<()> {
    let state = session.load_state();
    if auto {
        let next = session.commit(&state, StateChange::SetCurrency { currency: None })?;
        return print_estimate(session, &next);
    }
    let Some(currency) = currency else {
        let pricing = session
            .catalog
            .resolve_for_region(&state.selected_region, state.selected_currency.as_deref());
        if session.json {
            return session.print_json(&json!({
                "currency": pricing.currency_code,
                "symbol": pricing.currency_symbol,
                "override": state.selected_currency.is_some(),
            }));
        }
        let source = if state.selected_currency.is_some() {
            "selected"
        } else {
            "from region"
        };
        println!("{} ({}, {})", pricing.currency_code, pricing.currency_symbol, source);
        return Ok(());
    };
    let currency = currency.to_uppercase();
    validation::validate_currency(&session.catalog, &currency)?;
    let next = session.commit(
        &state,
        StateChange::SetCurrency {
            currency: Some(currency),
        },
    )?;
    print_estimate(session, &next)
}

pub fn handle_free_tier(toggle: Option<Toggle>, session: &Session) -> Result<()> {
    let state = session.load_state();
    let Some(toggle) = toggle else {
        if session.json {
            return session.print_json(&json!({ "freeTierEnabled": state.free_tier_enabled }));
        }
        println!(
            "Free tier is {}",
            if state.free_tier_enabled { "on" } else { "off" }
        );
        return Ok(());
    };
    let next = session.commit(
        &state,
        StateChange::SetFreeTier {
            enabled: toggle == Toggle::On,
        },
    )?;
    print_estimate(session, &next)
}

pub fn handle_name(name: Option<String>, session: &Session) -> Result<()> {
    let state = session.load_state();
    let Some(name) = name else {
        if session.json {
            return session.print_json(&json!({ "estimateName": state.estimate_name }));
        }
        println!("{}", state.estimate_name);
        return Ok(());
    };
    validation::validate_name("estimate_name", &name)?;
    let next = session.commit(&state, StateChange::SetEstimateName { name })?;
    print_estimate(session, &next)
}

pub fn handle_export(
    format: &str,
    file: Option<&Path>,
    dir: Option<PathBuf>,
    session: &Session,
) -> Result<()> {
    let format: ExportFormat = format.parse()?;
    let state = session.load_state();
    let report = EstimateReport::build(&state, &session.catalog);
    let dir = dir.unwrap_or_else(|| session.config.export.output_dir.clone());
    let path = export_report(&report, format, &dir, file)?;
    if session.json {
        return session.print_json(&json!({ "path": path }));
    }
    println!("Exported to {}", path.display());
    Ok(())
}

pub fn handle_reset(session: &Session) -> Result<()> {
    session
        .store
        .clear()
        .with_context(|| format!("Failed to remove {}", session.store.path().display()))?;
    let state = session.fresh_state();
    if !session.json {
        println!("Estimate reset to defaults");
    }
    print_estimate(session, &state)
}

pub fn handle_quote(options: QuoteOptions, session: &Session) -> Result<()> {
    let tier_index = validation::parse_tier(&options.tier)?;
    let tier = catalog::tier_or_default(tier_index);
    let schedule = match (options.uniform, options.preset) {
        (Some(instances), _) => {
            validation::validate_instances(instances)?;
            WeeklySchedule::uniform(instances)
        }
        (None, Some(preset)) => preset.to_schedule(),
        (None, None) => SchedulePreset::Business.to_schedule(),
    };
    let region = options
        .region
        .unwrap_or_else(|| session.config.pricing.default_region.clone());
    validation::validate_region(&session.catalog, &region)?;
    let currency = options
        .currency
        .or_else(|| session.config.pricing.default_currency.clone())
        .map(|c| c.to_uppercase());
    if let Some(currency) = &currency {
        validation::validate_currency(&session.catalog, currency)?;
    }

    let pricing = session.catalog.resolve_for_region(&region, currency.as_deref());
    let allowance: Option<FreeTierAllowance> = options
        .free_tier
        .then(|| session.catalog.free_tier_allowance());
    let costs = calculate_costs(&schedule, &tier, &pricing.unit_rates(), allowance.as_ref());

    if session.json {
        return session.print_json(&json!({
            "tier": tier,
            "region": region,
            "currency": pricing.currency_code,
            "costs": costs,
        }));
    }
    println!(
        "{}  {} {}  {} {}",
        style(&tier.label).bold(),
        style("Region:").dim(),
        region,
        style("Currency:").dim(),
        pricing.currency_code,
    );
    print_cost_breakdown(&pricing, &costs);
    Ok(())
}
