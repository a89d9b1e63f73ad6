use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use rust_dotenv::dotenv::DotEnv;
use tracing_subscriber::EnvFilter;

mod config;
mod core;
mod db;
mod error;
mod executor;
mod orchestrator;
mod probe;
mod prompt;
mod report;
mod splitter;

use config::{DbCfg, ProcessEnv};
use db::PgConnector;
use orchestrator::{BootstrapPlan, RunOutcome, run_bootstrap};
use prompt::ConsoleGate;

const EXIT_ABORTED: u8 = 3;

#[derive(Parser, Debug)]
#[command(version, about = "Interactive PostgreSQL schema bootstrap")]
pub struct Cli {
	/// Increase output
	#[arg(short, long)]
	verbose: bool,

	/// Schema script to apply
	#[arg(long, default_value = "database/schema.sql")]
	schema: PathBuf,

	/// Optional seed data script
	#[arg(long, default_value = "database/seed.sql")]
	seed: PathBuf,

	/// Table whose presence means the schema was already applied
	#[arg(long, default_value = "users")]
	marker_table: String,

	/// Write a JSON run report to this path
	#[arg(long)]
	report: Option<PathBuf>,
}

fn load_env() -> DotEnv {
	// Load .env in CWD if present, ignore missing
	DotEnv::new("")
}

fn init_tracing(verbose: bool) {
	let default = if verbose {
		"pgstrap=debug,sqlx=warn"
	} else {
		"pgstrap=info,sqlx=warn"
	};
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

	tracing_subscriber::fmt()
		.with_writer(std::io::stdout)
		.without_time()
		.with_target(false)
		.with_env_filter(filter)
		.init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
	let args = Cli::parse();
	init_tracing(args.verbose);

	let exported = ProcessEnv::capture();
	let cfg = DbCfg::resolve(&(exported, load_env()));
	let plan = BootstrapPlan {
		schema_path: args.schema,
		seed_path: args.seed,
		marker_table: args.marker_table,
	};
	let mut gate = ConsoleGate::stdio();

	match run_bootstrap(&cfg, &plan, &PgConnector, &mut gate).await {
		Ok(RunOutcome::Done(summary)) => {
			report::print_human_report(&summary);
			if let Some(path) = &args.report {
				if let Err(e) = report::write_json_report(path, &summary) {
					eprintln!("error: {e:#}");
					return ExitCode::FAILURE;
				}
			}
			ExitCode::SUCCESS
		}
		Ok(RunOutcome::Aborted) => {
			println!("Bootstrap cancelled, nothing was changed.");
			ExitCode::from(EXIT_ABORTED)
		}
		Err(e) => {
			eprintln!("bootstrap failed: {:#}", anyhow::Error::from(e));
			eprintln!("Fix the problem above and run the bootstrap again.");
			ExitCode::FAILURE
		}
	}
}
