use crate::config::{parse_date_range, CollectionConfigFile, ResolvedConfig};
use crate::constants::DEFAULT_VARIABLES;
use crate::downloader::{aborts_sub_run, build_intervals, build_plan, load_regions, run_collection, Credential, RunSummary};
use crate::errors::{AppError, AppResult};
use crate::models::{resolve_variables, CollectionType};
use crate::progress::LogReporter;
use crate::status;
use crate::ui::BarReporter;
use chrono::NaiveDate;
use clap::{Arg, ArgAction, Command};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

// CLI metadata constants
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const APP_ABOUT: &str = env!("CARGO_PKG_DESCRIPTION");

/// Parses command-line arguments and executes the requested command.
///
/// Three subcommands:
/// - `cli`: one collection type with credentials and date range as flags
/// - `toml`: full multi-type run driven by a TOML configuration file
/// - `status`: read-only scan of the output tree
pub async fn cli() -> AppResult<()> {
    let cmd = Command::new("kma-cli")
        .version(APP_VERSION)
        .about(APP_ABOUT)
        .subcommand(
            Command::new("cli")
                .about("Download one collection type for a date range")
                .after_help(
                    "Example:\n  kma-cli cli -i user -p pass -t 단기예보 -s 2021-01-01 -e 2021-03-01 -v 1시간기온",
                )
                .arg(
                    Arg::new("id")
                        .short('i')
                        .long("id")
                        .help("Portal login id")
                        .required(true)
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("password")
                        .short('p')
                        .long("password")
                        .help("Portal password")
                        .required(true)
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("type")
                        .short('t')
                        .long("type")
                        .help("Collection type: '단기예보' (stf), '초단기실황' (nowcast) or '초단기예보' (ustf)")
                        .default_value("단기예보")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("start")
                        .short('s')
                        .long("start")
                        .help("First day to collect (YYYY-MM-DD)")
                        .required(true)
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("end")
                        .short('e')
                        .long("end")
                        .help("Last day to collect (YYYY-MM-DD)")
                        .required(true)
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("variables")
                        .short('v')
                        .long("variable")
                        .help("Variable name to collect; repeatable (defaults to the standard set)")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("regions")
                        .short('r')
                        .long("regions")
                        .help("Path to the region list CSV")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("base_dir")
                        .short('b')
                        .long("base-dir")
                        .help("Root of the output tree")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(
            Command::new("toml")
                .about("Run using a TOML configuration file")
                .arg(
                    Arg::new("config")
                        .help("Path to the TOML config file")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("status")
                .about("Summarize the collected data on disk")
                .arg(
                    Arg::new("base_dir")
                        .short('b')
                        .long("base-dir")
                        .help("Root of the output tree")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                ),
        );

    let mut cmd_for_help = cmd.clone();
    let matches = cmd.get_matches();

    match matches.subcommand() {
        Some(("cli", sub)) => {
            let credential = Credential {
                login_id: sub.get_one::<String>("id").expect("id is required").clone(),
                password: sub
                    .get_one::<String>("password")
                    .expect("password is required")
                    .clone(),
            };
            let type_name = sub
                .get_one::<String>("type")
                .expect("type has default_value")
                .clone();
            let (start, end) = parse_date_range(
                sub.get_one::<String>("start").expect("start is required"),
                sub.get_one::<String>("end").expect("end is required"),
            )?;

            let mut resolved = ResolvedConfig::default();
            if let Some(regions) = sub.get_one::<PathBuf>("regions") {
                resolved.region_file = regions.clone();
            }
            if let Some(base_dir) = sub.get_one::<PathBuf>("base_dir") {
                resolved.base_dir = base_dir.clone();
            }

            let mut variables_by_type = BTreeMap::new();
            if let Some(names) = sub.get_many::<String>("variables") {
                variables_by_type.insert(type_name.clone(), names.cloned().collect());
            }

            run_workflow(
                &credential,
                &[type_name],
                &variables_by_type,
                start,
                end,
                &resolved,
                true,
            )
            .await?;
        }
        Some(("toml", sub)) => {
            let config_path = sub
                .get_one::<PathBuf>("config")
                .expect("config is required");

            let file_config = CollectionConfigFile::from_toml_file(config_path)?;
            let credential = Credential {
                login_id: file_config.login.id.clone(),
                password: file_config.login.password.clone(),
            };
            let (start, end) = file_config.date_range()?;

            run_workflow(
                &credential,
                &file_config.collection_types,
                &file_config.variables_by_type,
                start,
                end,
                &file_config.resolved,
                false,
            )
            .await?;
        }
        Some(("status", sub)) => {
            let base_dir = sub
                .get_one::<PathBuf>("base_dir")
                .cloned()
                .unwrap_or_else(|| ResolvedConfig::default().base_dir);
            let stats = status::scan_tree(&base_dir)?;
            status::log_stats(&stats);
        }
        _ => {
            cmd_for_help
                .print_help()
                .map_err(|e| AppError::IoError(format!("Failed to print help: {e}")))?;
        }
    }

    Ok(())
}

/// Runs the configured collection types as independent sequential sub-runs.
///
/// A `ConfigError` or `AuthError` aborts only the affected collection type;
/// the remaining types still run. A graceful stop (Ctrl-C) ends the current
/// sub-run between units and skips the rest.
pub async fn run_workflow(
    credential: &Credential,
    collection_types: &[String],
    variables_by_type: &BTreeMap<String, Vec<String>>,
    start: NaiveDate,
    end: NaiveDate,
    config: &ResolvedConfig,
    interactive: bool,
) -> AppResult<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()?;

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Stop requested, finishing the current unit");
                stop.store(true, Ordering::Relaxed);
            }
        });
    }

    info!(
        start = %start,
        end = %end,
        collection_types = collection_types.join(", "),
        "Starting collection"
    );

    for type_name in collection_types {
        if stop.load(Ordering::Relaxed) {
            break;
        }
        match run_one_type(
            &client,
            credential,
            type_name,
            variables_by_type,
            start,
            end,
            config,
            interactive,
            &stop,
        )
        .await
        {
            Ok(summary) => {
                if summary.stopped {
                    break;
                }
            }
            Err(e) if aborts_sub_run(&e) => {
                warn!(
                    collection_type = %type_name,
                    error = %e,
                    "Sub-run aborted, continuing with the next collection type"
                );
            }
            Err(e) => return Err(e),
        }
    }

    info!("All collection runs finished");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run_one_type(
    client: &reqwest::Client,
    credential: &Credential,
    type_name: &str,
    variables_by_type: &BTreeMap<String, Vec<String>>,
    start: NaiveDate,
    end: NaiveDate,
    config: &ResolvedConfig,
    interactive: bool,
    stop: &AtomicBool,
) -> AppResult<RunSummary> {
    let collection_type = CollectionType::from_name(type_name).ok_or_else(|| {
        AppError::ConfigError(format!("Unknown collection type: {type_name}"))
    })?;
    let profile = collection_type.profile();

    let names: Vec<String> = variables_by_type
        .get(type_name)
        .or_else(|| variables_by_type.get(collection_type.display_name()))
        .cloned()
        .unwrap_or_else(|| DEFAULT_VARIABLES.iter().map(|v| v.to_string()).collect());
    let variables = resolve_variables(&names);
    if variables.is_empty() {
        return Err(AppError::ConfigError(format!(
            "No known variables configured for {type_name}"
        )));
    }

    let regions = load_regions(&config.region_file)?;
    let intervals = build_intervals(start, end, profile.interval_mode);
    let plan = build_plan(&regions, &intervals, &variables)?;

    info!(
        collection_type = collection_type.display_name(),
        regions = regions.len(),
        intervals = intervals.len(),
        variables = variables.len(),
        units = plan.len(),
        "Work plan built"
    );

    if interactive {
        let reporter = BarReporter::new(plan.len() as u64)?;
        let summary = run_collection(
            client,
            credential,
            collection_type,
            &plan,
            config,
            &reporter,
            stop,
        )
        .await?;
        reporter.finish(format!(
            "{}: {} succeeded, {} skipped, {} failed",
            collection_type.display_name(),
            summary.succeeded,
            summary.skipped,
            summary.failed
        ));
        Ok(summary)
    } else {
        run_collection(
            client,
            credential,
            collection_type,
            &plan,
            config,
            &LogReporter,
            stop,
        )
        .await
    }
}
