use std::{
	fs,
	path::{Path, PathBuf},
};

use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::{
	config::DbCfg,
	core::{display, sha256_hex},
	db::{Connector, Session},
	error::BootstrapError,
	executor::{ScriptOutcome, run_script},
	probe,
	prompt::Confirm,
	splitter,
};

/// Where the scripts live and which table marks a completed bootstrap.
#[derive(Debug, Clone)]
pub struct BootstrapPlan {
	pub schema_path: PathBuf,
	pub seed_path: PathBuf,
	pub marker_table: String,
}

/// What to do with the schema script once the marker table has been probed.
/// `Abort` skips the schema script only; the seed step still follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapDecision {
	ProceedFresh,
	ProceedRecreate,
	Abort,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SeedStep {
	Declined,
	Missing { path: PathBuf },
	Applied(ScriptOutcome),
}

#[derive(Debug, Clone, Serialize)]
pub struct BootstrapReport {
	#[serde(with = "time::serde::rfc3339")]
	pub started_at: OffsetDateTime,
	#[serde(with = "time::serde::rfc3339")]
	pub finished_at: OffsetDateTime,
	pub target: String,
	pub decision: BootstrapDecision,
	pub schema: Option<ScriptOutcome>,
	pub seed: SeedStep,
}

#[derive(Debug)]
pub enum RunOutcome {
	Done(BootstrapReport),
	Aborted,
}

struct Steps {
	decision: BootstrapDecision,
	schema: Option<ScriptOutcome>,
	seed: SeedStep,
}

/// Drives one interactive bootstrap run.
///
/// Nothing touches the database until the operator accepts the displayed
/// settings. Once opened, the connection is closed on every exit path,
/// fatal errors included.
pub async fn run_bootstrap<C: Connector>(
	cfg: &DbCfg,
	plan: &BootstrapPlan,
	connector: &C,
	gate: &mut impl Confirm,
) -> Result<RunOutcome, BootstrapError> {
	let started_at = OffsetDateTime::now_utc();
	print_settings(cfg, plan);

	if !gate.ask("Proceed with these settings?") {
		info!("bootstrap cancelled by operator");
		return Ok(RunOutcome::Aborted);
	}

	let mut session = connector
		.open(cfg)
		.await
		.map_err(|source| BootstrapError::Connect {
			target: cfg.to_string(),
			source,
		})?;
	info!("connected to {cfg}");

	let result = drive(&mut session, plan, gate).await;
	match session.close().await {
		Ok(()) => debug!("connection closed"),
		Err(err) => warn!("closing connection failed: {err}"),
	}
	let steps = result?;

	Ok(RunOutcome::Done(BootstrapReport {
		started_at,
		finished_at: OffsetDateTime::now_utc(),
		target: cfg.to_string(),
		decision: steps.decision,
		schema: steps.schema,
		seed: steps.seed,
	}))
}

async fn drive(
	session: &mut impl Session,
	plan: &BootstrapPlan,
	gate: &mut impl Confirm,
) -> Result<Steps, BootstrapError> {
	probe::check_connectivity(session).await?;

	let decision = if probe::table_exists(session, &plan.marker_table).await? {
		warn!(
			"table {:?} already exists, the schema has probably been applied before",
			plan.marker_table
		);
		if gate.ask("Recreating the schema can destroy existing data. Run the schema script anyway?") {
			BootstrapDecision::ProceedRecreate
		} else {
			BootstrapDecision::Abort
		}
	} else {
		BootstrapDecision::ProceedFresh
	};

	let schema = match decision {
		BootstrapDecision::Abort => {
			info!("schema script skipped");
			None
		}
		BootstrapDecision::ProceedFresh | BootstrapDecision::ProceedRecreate => {
			Some(apply_script(session, "schema", &plan.schema_path).await?)
		}
	};

	let seed = if !gate.ask("Import seed data?") {
		info!("seed import skipped");
		SeedStep::Declined
	} else if !seed_present(&plan.seed_path)? {
		let shown = display(&plan.seed_path);
		warn!("seed script not found at {shown}, skipping");
		SeedStep::Missing {
			path: plan.seed_path.clone(),
		}
	} else {
		SeedStep::Applied(apply_script(session, "seed", &plan.seed_path).await?)
	};

	Ok(Steps {
		decision,
		schema,
		seed,
	})
}

async fn apply_script(
	session: &mut impl Session,
	label: &str,
	path: &Path,
) -> Result<ScriptOutcome, BootstrapError> {
	let sql = fs::read_to_string(path).map_err(|source| BootstrapError::ScriptRead {
		path: path.to_path_buf(),
		source,
	})?;
	let statements = splitter::split(&sql);
	let shown = display(path);
	let digest = sha256_hex(sql.as_bytes());
	info!("{label} script {shown} sha256={digest}");
	Ok(run_script(session, label, &statements).await)
}

/// Only a path that is definitely absent counts as missing; a path whose
/// metadata cannot be read is a fatal read error.
fn seed_present(path: &Path) -> Result<bool, BootstrapError> {
	path.try_exists()
		.map_err(|source| BootstrapError::ScriptRead {
			path: path.to_path_buf(),
			source,
		})
}

fn print_settings(cfg: &DbCfg, plan: &BootstrapPlan) {
	println!("Database bootstrap settings:");
	println!("  host:          {}", cfg.host());
	println!("  port:          {}", cfg.port());
	println!("  database:      {}", cfg.database());
	println!("  user:          {}", cfg.user());
	println!("  schema script: {}", display(&plan.schema_path));
	println!("  seed script:   {}", display(&plan.seed_path));
	println!("  marker table:  {}", plan.marker_table);
}
