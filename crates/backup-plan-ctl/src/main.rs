// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Backup Plan Control CLI
//!
//! Offline tool for translating backup plan configuration to and from the
//! backend's plan and trigger payloads. No backend calls are made; instance
//! listings come from an inventory snapshot file.
//!
//! Usage:
//!   backup-plan-ctl <command> [options]
//!
//! Commands:
//!   pattern --dates <Mo,Tu,..> --time <HH:MM±HH> [--incremental]
//!   pattern --every-hours <3|12|24>
//!   expand --config <path> --inventory <path> --provider-id <id> --plan-id <id>
//!   flatten --plan <path> --trigger <path> [--provider <name>] [--prior <path>]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use backup_plan_core::{
    BackupPlanConfig, InventorySnapshot, PlanResponse, ProviderKind, ScheduleInput, ScheduleSpec,
    TranslatorConfig, TriggerResponse, UtcOffset, build_plan_request, build_trigger_request,
    expand_schedule, flatten_plan,
};
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Translate backup plan configuration to and from backend payloads.
#[derive(Parser, Debug)]
#[command(name = "backup-plan-ctl")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Offset in hours used to render times when no prior config is given.
    /// Overrides BACKUP_PLAN_DEFAULT_UTC_OFFSET.
    #[arg(long, global = true, allow_negative_numbers = true)]
    default_offset: Option<i32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the trigger pattern and full-backup day for a schedule
    Pattern(PatternArgs),
    /// Build plan and trigger payloads from a plan configuration
    Expand(ExpandArgs),
    /// Read plan and trigger payloads back into a plan configuration
    Flatten(FlattenArgs),
}

#[derive(Args, Debug)]
struct PatternArgs {
    /// Weekday abbreviations, comma separated (Mo,Tu,We,Th,Fr,Sa,Su)
    #[arg(long, value_delimiter = ',')]
    dates: Vec<String>,

    /// Time of day as HH:MM or HH:MM±HH
    #[arg(long)]
    time: Option<String>,

    /// Run every N hours (3, 12 or 24) instead of on weekdays
    #[arg(long)]
    every_hours: Option<u32>,

    /// Take incremental backups with one full-backup day
    #[arg(long)]
    incremental: bool,
}

#[derive(Args, Debug)]
struct ExpandArgs {
    /// Plan configuration JSON file
    #[arg(long)]
    config: PathBuf,

    /// Inventory snapshot JSON file
    #[arg(long, env = "BACKUP_PLAN_INVENTORY")]
    inventory: PathBuf,

    /// Backend provider ID to put on the plan
    #[arg(long, env = "BACKUP_PLAN_PROVIDER_ID")]
    provider_id: String,

    /// Plan ID the trigger refers to
    #[arg(long)]
    plan_id: String,
}

#[derive(Args, Debug)]
struct FlattenArgs {
    /// Backend plan JSON file
    #[arg(long)]
    plan: PathBuf,

    /// Backend trigger JSON file
    #[arg(long)]
    trigger: PathBuf,

    /// Provider name (cloud_servers, dbaas, OS::Nova, OS::Trove).
    /// Defaults to the provider of the prior configuration.
    #[arg(long)]
    provider: Option<String>,

    /// Previously written plan configuration JSON file
    #[arg(long)]
    prior: Option<PathBuf>,
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {} from {}", what, path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {} from {}", what, path.display()))
}

fn translator_config(cli: &Cli) -> Result<TranslatorConfig> {
    let mut config = TranslatorConfig::from_env()?;
    if let Some(hours) = cli.default_offset {
        let offset = UtcOffset::from_hours(hours)
            .with_context(|| format!("--default-offset {} is outside -12..=14", hours))?;
        config = config.with_default_offset(offset);
    }
    Ok(config)
}

fn run_pattern(args: PatternArgs) -> Result<serde_json::Value> {
    let input = ScheduleInput {
        dates: (!args.dates.is_empty()).then_some(args.dates),
        time: args.time,
        every_hours: args.every_hours,
    };
    let spec = ScheduleSpec::try_from(&input)?;
    let expanded = expand_schedule(&spec, args.incremental)?;

    Ok(json!({
        "pattern": expanded.pattern,
        "full_day": expanded.full_day.map(|d| d.number()),
    }))
}

fn run_expand(args: ExpandArgs, translator: &TranslatorConfig) -> Result<serde_json::Value> {
    let config: BackupPlanConfig = read_json(&args.config, "plan configuration")?;
    let inventory: InventorySnapshot = read_json(&args.inventory, "inventory snapshot")?;
    debug!(
        compute = inventory.compute_instances.len(),
        database = inventory.database_instances.len(),
        clusters = inventory.database_clusters.len(),
        "Loaded inventory snapshot"
    );

    let plan = build_plan_request(&config, &args.provider_id, &inventory, translator)?;
    let trigger = build_trigger_request(&config, &args.plan_id, translator)?;
    info!(plan = %config.name, pattern = %trigger.pattern, "Expanded plan configuration");

    Ok(json!({ "plan": plan, "trigger": trigger }))
}

fn run_flatten(args: FlattenArgs, translator: &TranslatorConfig) -> Result<serde_json::Value> {
    let plan: PlanResponse = read_json(&args.plan, "plan")?;
    let trigger: TriggerResponse = read_json(&args.trigger, "trigger")?;
    let prior: Option<BackupPlanConfig> = args
        .prior
        .as_deref()
        .map(|path| read_json(path, "prior configuration"))
        .transpose()?;

    let provider = match (&args.provider, &prior) {
        (Some(name), _) => name.parse::<ProviderKind>()?,
        (None, Some(prior)) => prior.provider_name,
        (None, None) => bail!("--provider is required when no --prior configuration is given"),
    };

    let config = flatten_plan(&plan, &trigger, provider, prior.as_ref(), translator)?;
    info!(plan = %plan.id, provider = %provider, "Flattened backend plan");

    Ok(serde_json::to_value(config)?)
}

fn run(cli: Cli) -> Result<String> {
    let translator = translator_config(&cli)?;
    let output = match cli.command {
        Command::Pattern(args) => run_pattern(args)?,
        Command::Expand(args) => run_expand(args, &translator)?,
        Command::Flatten(args) => run_flatten(args, &translator)?,
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

fn init_tracing() -> Result<()> {
    // stdout carries the JSON output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("backup_plan=info".parse()?))
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn main() -> ExitCode {
    // Load .env file (from crate directory or parent directories)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = init_tracing() {
        eprintln!("Error: failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use clap::CommandFactory;
    use tempfile::NamedTempFile;

    fn json_file(value: serde_json::Value) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", value).unwrap();
        file
    }

    fn run_args(args: &[&str]) -> Result<serde_json::Value> {
        let cli = Cli::try_parse_from(args.iter().copied())?;
        let output = run(cli)?;
        Ok(serde_json::from_str(&output)?)
    }

    fn path(file: &NamedTempFile) -> &str {
        file.path().to_str().unwrap()
    }

    fn inventory() -> NamedTempFile {
        json_file(json!({
            "compute_instances": [{"id": "vm-1", "name": "web-1"}],
            "database_instances": [{"id": "db-1", "name": "orders"}]
        }))
    }

    fn plan_config() -> serde_json::Value {
        json!({
            "name": "nightly",
            "provider_name": "cloud_servers",
            "instance_ids": ["vm-1"],
            "backup_targets": [{"instance_id": "vm-1", "volume_ids": ["vol-a"]}],
            "schedule": {"dates": ["Tu", "We"], "time": "11:12+03"},
            "retention": {"full": {"max_backups": 7}}
        })
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_pattern_weekly() {
        let output = run_args(&[
            "backup-plan-ctl",
            "pattern",
            "--dates",
            "Tu,We",
            "--time",
            "11:12+03",
        ])
        .unwrap();
        assert_eq!(output, json!({"pattern": "12 8 * * 1,2", "full_day": null}));
    }

    #[test]
    fn test_pattern_incremental() {
        let output = run_args(&[
            "backup-plan-ctl",
            "pattern",
            "--dates",
            "We",
            "--time",
            "16:20",
            "--incremental",
        ])
        .unwrap();
        assert_eq!(output, json!({"pattern": "20 16 * * *", "full_day": 2}));
    }

    #[test]
    fn test_pattern_interval() {
        let output = run_args(&["backup-plan-ctl", "pattern", "--every-hours", "12"]).unwrap();
        assert_eq!(output["pattern"], "0 */12 * * *");
    }

    #[test]
    fn test_pattern_rejects_unsupported_interval() {
        let err = run_args(&["backup-plan-ctl", "pattern", "--every-hours", "5"]).unwrap_err();
        assert!(err.to_string().contains("every_hours"), "error was {}", err);
    }

    #[test]
    fn test_default_offset_flag() {
        let cli = Cli::try_parse_from([
            "backup-plan-ctl",
            "--default-offset",
            "-4",
            "pattern",
            "--every-hours",
            "3",
        ])
        .unwrap();
        assert_eq!(cli.default_offset, Some(-4));

        let cli = Cli::try_parse_from([
            "backup-plan-ctl",
            "--default-offset",
            "20",
            "pattern",
            "--every-hours",
            "3",
        ])
        .unwrap();
        assert!(translator_config(&cli).is_err());
    }

    #[test]
    fn test_expand_and_flatten() {
        let config = json_file(plan_config());
        let inventory = inventory();

        let expanded = run_args(&[
            "backup-plan-ctl",
            "expand",
            "--config",
            path(&config),
            "--inventory",
            path(&inventory),
            "--provider-id",
            "prov-1",
            "--plan-id",
            "plan-1",
        ])
        .unwrap();
        assert_eq!(expanded["plan"]["resources"][0]["children"][0]["id"], "vol-a");
        assert_eq!(expanded["trigger"]["pattern"], "12 8 * * 1,2");
        assert_eq!(expanded["trigger"]["max_backups"], 7);

        let mut plan = expanded["plan"].clone();
        plan["id"] = json!("plan-1");
        let mut trigger = expanded["trigger"].clone();
        trigger["id"] = json!("trigger-1");
        let plan = json_file(plan);
        let trigger = json_file(trigger);

        let flattened = run_args(&[
            "backup-plan-ctl",
            "flatten",
            "--plan",
            path(&plan),
            "--trigger",
            path(&trigger),
            "--prior",
            path(&config),
        ])
        .unwrap();
        let mut expected = plan_config();
        expected["incremental_backup"] = json!(false);
        assert_eq!(flattened, expected);
    }

    #[test]
    fn test_flatten_requires_provider_without_prior() {
        let plan = json_file(json!({
            "id": "plan-1",
            "name": "nightly",
            "provider_id": "prov-1",
            "resources": []
        }));
        let trigger = json_file(json!({
            "id": "trigger-1",
            "name": "nightly",
            "plan_id": "plan-1",
            "pattern": "0 3 * * 0",
            "max_backups": 5
        }));

        let err = run_args(&[
            "backup-plan-ctl",
            "flatten",
            "--plan",
            path(&plan),
            "--trigger",
            path(&trigger),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("--provider"));

        let flattened = run_args(&[
            "backup-plan-ctl",
            "flatten",
            "--plan",
            path(&plan),
            "--trigger",
            path(&trigger),
            "--provider",
            "OS::Trove",
        ])
        .unwrap();
        assert_eq!(flattened["provider_name"], "dbaas");
        assert_eq!(flattened["schedule"], json!({"dates": ["Mo"], "time": "03:00"}));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let inventory = inventory();
        let err = run_args(&[
            "backup-plan-ctl",
            "expand",
            "--config",
            "/nonexistent/plan.json",
            "--inventory",
            path(&inventory),
            "--provider-id",
            "prov-1",
            "--plan-id",
            "plan-1",
        ])
        .unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/plan.json"));
    }
}
