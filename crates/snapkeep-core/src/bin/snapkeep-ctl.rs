// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Snapkeep Control CLI
//!
//! Inspect instances and snapshots, and run snapshot retention.
//!
//! Usage:
//!   snapkeep-ctl <command> [options] [--json]
//!
//! Commands:
//!   list-instances
//!   list-snapshots <instance_id>
//!   create <instance_id> --name <name> [--description <text>]
//!   delete <instance_id> <snapshot_id>
//!   rotate [--instance <id>] [--no-bootstrap]
//!   purge <instance_id> --yes

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use snapkeep_core::{
    Instance, PurgeReport, RetentionOutcome, RetentionPolicy, RunReport, Snapshot,
    SnapshotService,
};
use snapkeep_gateway::ContaboGateway;
use tracing::{error, warn};

fn print_usage() {
    eprintln!(
        r#"Usage: snapkeep-ctl <command> [options] [--json]

Manage compute instance snapshots and enforce single-snapshot retention.

COMMANDS:
    list-instances                      List instances in the fleet
    list-snapshots <instance_id>        List snapshots of an instance
    create <instance_id>                Create a snapshot
    delete <instance_id> <snapshot_id>  Delete a snapshot
    rotate                              Rotate snapshots across the fleet
    purge <instance_id>                 Delete every snapshot of an instance

CREATE OPTIONS:
    --name <name>                       Snapshot name (required)
    --description <text>                Snapshot description (default: empty)

ROTATE OPTIONS:
    --instance <id>                     Rotate a single instance only
    --no-bootstrap                      Leave instances without snapshots untouched

PURGE OPTIONS:
    --yes                               Confirm deletion (required)

GLOBAL OPTIONS:
    --json                              Print results as JSON

ENVIRONMENT:
    CONTABO_CLIENT_ID                   OAuth2 client id (required)
    CONTABO_CLIENT_SECRET               OAuth2 client secret (required)
    CONTABO_API_USER                    API user (required)
    CONTABO_API_PASSWORD                API password (required)
    CONTABO_API_URL                     API base URL (default: https://api.contabo.com)
    SNAPKEEP_REQUEST_TIMEOUT_MS         Request timeout (default: 30000)
    SNAPKEEP_BOOTSTRAP_EMPTY            Bootstrap empty instances (default: true)
    RUST_LOG                            Log filter (default: warn)

    Variables are also read from a .env file in the working directory.

EXAMPLES:
    # Nightly rotation
    snapkeep-ctl rotate

    # Rotate one instance and keep the report
    snapkeep-ctl rotate --instance 201234567 --json > rotation.json

    # Wipe all snapshots of an instance
    snapkeep-ctl purge 201234567 --yes
"#
    );
}

#[derive(Debug)]
enum Command {
    ListInstances,
    ListSnapshots {
        instance_id: i64,
    },
    Create {
        instance_id: i64,
        name: String,
        description: Option<String>,
    },
    Delete {
        instance_id: i64,
        snapshot_id: String,
    },
    Rotate {
        instance_id: Option<i64>,
        no_bootstrap: bool,
    },
    Purge {
        instance_id: i64,
    },
}

#[derive(Debug)]
struct Cli {
    command: Command,
    json: bool,
}

fn parse_args() -> Result<Cli, String> {
    let args: Vec<String> = std::env::args().collect();
    parse_args_from_vec(&args)
}

fn parse_instance_id(value: Option<&String>) -> Result<i64, String> {
    let value = value.ok_or("Instance ID required")?;
    value
        .parse()
        .map_err(|_| format!("Invalid instance ID: {}", value))
}

/// Options whose next argument is a value, never a flag.
const VALUE_OPTIONS: &[&str] = &["--name", "--description", "--instance"];

/// Pull out `--json` wherever it stands in flag position.
fn strip_global_flags(args: &[String]) -> (bool, Vec<String>) {
    let mut json = false;
    let mut rest = Vec::with_capacity(args.len());
    let mut takes_value = false;

    for arg in args {
        if !takes_value && arg == "--json" {
            json = true;
        } else {
            rest.push(arg.clone());
        }
        takes_value = !takes_value && VALUE_OPTIONS.contains(&arg.as_str());
    }

    (json, rest)
}

fn parse_args_from_vec(args: &[String]) -> Result<Cli, String> {
    let (json, args) = strip_global_flags(args);

    if args.len() < 2 {
        return Err("No command specified".to_string());
    }

    let command = match args[1].as_str() {
        "help" | "--help" | "-h" => {
            print_usage();
            std::process::exit(0);
        }
        "list-instances" => Command::ListInstances,
        "list-snapshots" => Command::ListSnapshots {
            instance_id: parse_instance_id(args.get(2))?,
        },
        "create" => {
            let instance_id = parse_instance_id(args.get(2))?;
            let mut name: Option<String> = None;
            let mut description: Option<String> = None;

            let mut i = 3;
            while i < args.len() {
                match args[i].as_str() {
                    "--name" => {
                        i += 1;
                        name = Some(args.get(i).ok_or("--name requires a value")?.clone());
                    }
                    "--description" => {
                        i += 1;
                        description =
                            Some(args.get(i).ok_or("--description requires a value")?.clone());
                    }
                    arg => return Err(format!("Unknown argument: {}", arg)),
                }
                i += 1;
            }

            Command::Create {
                instance_id,
                name: name.ok_or("--name is required")?,
                description,
            }
        }
        "delete" => {
            let instance_id = parse_instance_id(args.get(2))?;
            let snapshot_id = args.get(3).ok_or("Snapshot ID required")?.clone();
            Command::Delete {
                instance_id,
                snapshot_id,
            }
        }
        "rotate" => {
            let mut instance_id: Option<i64> = None;
            let mut no_bootstrap = false;

            let mut i = 2;
            while i < args.len() {
                match args[i].as_str() {
                    "--instance" => {
                        i += 1;
                        instance_id = Some(parse_instance_id(args.get(i))?);
                    }
                    "--no-bootstrap" => no_bootstrap = true,
                    arg => return Err(format!("Unknown argument: {}", arg)),
                }
                i += 1;
            }

            Command::Rotate {
                instance_id,
                no_bootstrap,
            }
        }
        "purge" => {
            let instance_id = parse_instance_id(args.get(2))?;
            let mut confirmed = false;
            for arg in &args[3..] {
                match arg.as_str() {
                    "--yes" => confirmed = true,
                    other => return Err(format!("Unknown argument: {}", other)),
                }
            }
            if !confirmed {
                return Err(
                    "purge deletes every snapshot of the instance; pass --yes to confirm"
                        .to_string(),
                );
            }
            Command::Purge { instance_id }
        }
        cmd => return Err(format!("Unknown command: {}", cmd)),
    };

    Ok(Cli { command, json })
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Failed to load .env: {}", e);
            return ExitCode::FAILURE;
        }
    }

    // Logs go to stderr so reports on stdout stay machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = match parse_args() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    let gateway = match ContaboGateway::from_env() {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let service = SnapshotService::new(Arc::new(gateway), RetentionPolicy::from_env());

    match execute_command(service, cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Run a command. `Ok(false)` means it ran but reported failures.
async fn execute_command(service: SnapshotService, cli: Cli) -> Result<bool, String> {
    let json = cli.json;

    match cli.command {
        Command::ListInstances => {
            let instances = service
                .list_instances_report()
                .await
                .map_err(|e| format!("Failed to list instances: {}", e))?;
            if json {
                print_json(&instances)?;
            } else {
                print_instances(&instances);
            }
        }

        Command::ListSnapshots { instance_id } => {
            let snapshots = service
                .list_snapshots_report(instance_id)
                .await
                .map_err(|e| format!("Failed to list snapshots: {}", e))?;
            if json {
                print_json(&snapshots)?;
            } else {
                print_snapshots(instance_id, &snapshots);
            }
        }

        Command::Create {
            instance_id,
            name,
            description,
        } => {
            let snapshot = service
                .create_snapshot(instance_id, &name, description.as_deref().unwrap_or(""))
                .await
                .map_err(|e| format!("Failed to create snapshot: {}", e))?;
            if json {
                print_json(&snapshot)?;
            } else {
                println!("Created: {}", snapshot.id);
            }
        }

        Command::Delete {
            instance_id,
            snapshot_id,
        } => {
            service
                .delete_snapshot(instance_id, &snapshot_id)
                .await
                .map_err(|e| format!("Failed to delete snapshot: {}", e))?;
            if json {
                print_json(&serde_json::json!({ "deleted": snapshot_id }))?;
            } else {
                println!("Deleted: {}", snapshot_id);
            }
        }

        Command::Rotate {
            instance_id,
            no_bootstrap,
        } => {
            let service = if no_bootstrap {
                let policy = service.policy().with_bootstrap_empty(false);
                service.with_policy(policy)
            } else {
                service
            };

            match instance_id {
                Some(id) => {
                    let instances = service
                        .list_instances_report()
                        .await
                        .map_err(|e| format!("Failed to list instances: {}", e))?;
                    let instance = instances
                        .iter()
                        .find(|i| i.id == id)
                        .ok_or_else(|| format!("Instance not found: {}", id))?;

                    let outcome = service.rotate_instance(instance).await;
                    log_outcome(&outcome);
                    if json {
                        print_json(&outcome)?;
                    } else {
                        print_outcome(&outcome);
                    }
                    return Ok(!outcome.is_failure());
                }
                None => {
                    let report = service.rotate_fleet().await;
                    log_run_report(&report);
                    if json {
                        print_json(&report)?;
                    } else {
                        print_run_report(&report);
                    }
                    return Ok(!report.has_failures());
                }
            }
        }

        Command::Purge { instance_id } => {
            let report = service.purge_instance(instance_id).await;
            log_purge_report(&report);
            if json {
                print_json(&report)?;
            } else {
                print_purge_report(&report);
            }
            return Ok(report.is_success());
        }
    }

    Ok(true)
}

// ============================================================================
// Output
// ============================================================================

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).map_err(|e| e.to_string())?
    );
    Ok(())
}

fn print_instances(instances: &[Instance]) {
    if instances.is_empty() {
        println!("No instances found.");
        return;
    }
    println!("{:<12} {:<28} {:<20} STATUS", "ID", "NAME", "DISPLAY NAME");
    for instance in instances {
        println!(
            "{:<12} {:<28} {:<20} {}",
            instance.id, instance.name, instance.display_name, instance.status
        );
    }
}

fn print_snapshots(instance_id: i64, snapshots: &[Snapshot]) {
    if snapshots.is_empty() {
        println!("No snapshots found for instance {}.", instance_id);
        return;
    }
    println!(
        "{:<38} {:<30} {:<26} DESCRIPTION",
        "ID", "NAME", "CREATED"
    );
    for snapshot in snapshots {
        println!(
            "{:<38} {:<30} {:<26} {}",
            snapshot.id,
            snapshot.name,
            snapshot.created_date.to_rfc3339(),
            snapshot.description
        );
    }
}

fn print_outcome(outcome: &RetentionOutcome) {
    println!(
        "{:<14} {:<12} {:<28} {}",
        outcome.action, outcome.instance_id, outcome.instance_name, outcome.detail
    );
}

fn print_run_report(report: &RunReport) {
    for outcome in &report.outcomes {
        print_outcome(outcome);
    }
    println!("{}", report.summary());
}

fn print_purge_report(report: &PurgeReport) {
    if let Some(err) = &report.fetch_error {
        println!("Instance {}: {}", report.instance_id, err);
        return;
    }
    if report.entries.is_empty() {
        println!("Instance {} has no snapshots; nothing to purge.", report.instance_id);
        return;
    }
    for entry in &report.entries {
        match &entry.error {
            None => println!("deleted  {} ({})", entry.snapshot_id, entry.snapshot_name),
            Some(err) => println!(
                "failed   {} ({}): {}",
                entry.snapshot_id, entry.snapshot_name, err
            ),
        }
    }
    println!(
        "Instance {}: {} deleted, {} failed",
        report.instance_id,
        report.deleted_count(),
        report.failed_count()
    );
}

// ============================================================================
// Logging
// ============================================================================

fn log_outcome(outcome: &RetentionOutcome) {
    if outcome.snapshot_lost {
        error!(
            instance_id = outcome.instance_id,
            deleted = ?outcome.deleted_snapshot_id,
            "{}",
            outcome.detail
        );
    } else if outcome.is_failure() {
        warn!(
            instance_id = outcome.instance_id,
            action = %outcome.action,
            "{}",
            outcome.detail
        );
    }
}

fn log_run_report(report: &RunReport) {
    if let Some(err) = &report.fleet_error {
        error!("{}", err);
    }
    for outcome in &report.outcomes {
        log_outcome(outcome);
    }
}

fn log_purge_report(report: &PurgeReport) {
    if let Some(err) = &report.fetch_error {
        error!(instance_id = report.instance_id, "{}", err);
    }
    for entry in report.entries.iter().filter(|e| !e.is_deleted()) {
        warn!(
            instance_id = report.instance_id,
            snapshot_id = %entry.snapshot_id,
            "failed to delete snapshot: {}",
            entry.error.as_deref().unwrap_or_default()
        );
    }
}
