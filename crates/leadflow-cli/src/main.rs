mod commands;
mod error;
mod util;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crate::commands::{follow_ups, interactions, leads, members, tasks, Context};
use crate::error::{exit_code_for, report_error};
use leadflow_config as config;
use leadflow_store::{paths, Store};

#[derive(Debug, Parser)]
#[command(name = "leadflow", version, about = "leadflow CLI")]
struct Cli {
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Member(members::MemberCommand),
    #[command(subcommand)]
    Lead(leads::LeadCommand),
    /// Record an interaction and rescore the lead
    Log(interactions::LogArgs),
    /// Plan the next follow-up for a lead
    Plan(follow_ups::PlanArgs),
    /// Plan follow-ups for every open lead of an organization
    Sweep(follow_ups::SweepArgs),
    #[command(subcommand)]
    Task(tasks::TaskCommand),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, verbose);
            exit_code_for(&err)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        db_path,
        config: config_path,
        json,
        verbose,
        command,
    } = cli;

    let app_config = config::load(config_path.clone()).with_context(|| "load config")?;
    if verbose {
        match config::resolve_config_path(config_path) {
            Ok(path) => {
                if path.exists() {
                    debug!(path = %path.display(), "config resolved");
                } else {
                    debug!(path = %path.display(), "config missing, using defaults");
                }
            }
            Err(err) => {
                debug!(error = %err, "config unavailable");
            }
        }
    }
    let db_path = paths::resolve_db_path(db_path).with_context(|| "resolve database path")?;
    debug!(path = %db_path.display(), "database path resolved");

    let store =
        Store::open(&db_path).with_context(|| format!("open database {}", db_path.display()))?;
    store.migrate().with_context(|| "run migrations")?;

    let ctx = Context {
        store: &store,
        json,
        config: &app_config,
    };

    match command {
        Command::Member(cmd) => match cmd {
            members::MemberCommand::Add(args) => members::add_member(&ctx, args),
            members::MemberCommand::Ls(args) => members::list_members(&ctx, args),
        },
        Command::Lead(cmd) => match cmd {
            leads::LeadCommand::Add(args) => leads::add_lead(&ctx, args),
            leads::LeadCommand::Show(args) => leads::show_lead(&ctx, args),
            leads::LeadCommand::Ls(args) => leads::list_leads(&ctx, args),
            leads::LeadCommand::Status(args) => leads::change_status(&ctx, args),
            leads::LeadCommand::Assign(args) => leads::assign_lead(&ctx, args),
        },
        Command::Log(args) => interactions::log_interaction(&ctx, args),
        Command::Plan(args) => follow_ups::plan(&ctx, args),
        Command::Sweep(args) => follow_ups::sweep(&ctx, args),
        Command::Task(cmd) => match cmd {
            tasks::TaskCommand::Ls(args) => tasks::list_tasks(&ctx, args),
            tasks::TaskCommand::Done(args) => tasks::complete_task(&ctx, args),
            tasks::TaskCommand::Cancel(args) => tasks::cancel_task(&ctx, args),
        },
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}
