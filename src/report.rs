use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::core::display;
use crate::executor::ScriptOutcome;
use crate::orchestrator::{BootstrapDecision, BootstrapReport, SeedStep};

pub fn print_human_report(report: &BootstrapReport) {
	println!("Bootstrap summary for {}:", report.target);

	match (&report.schema, report.decision) {
		(Some(outcome), _) => print_outcome("schema", outcome),
		(None, BootstrapDecision::Abort) => println!("  schema: skipped (existing schema kept)"),
		(None, _) => println!("  schema: not run"),
	}

	match &report.seed {
		SeedStep::Declined => println!("  seed: skipped"),
		SeedStep::Missing { path } => println!("  seed: skipped, {} not found", display(path)),
		SeedStep::Applied(outcome) => print_outcome("seed", outcome),
	}

	let elapsed = report.finished_at - report.started_at;
	println!("  duration_ms: {}", elapsed.whole_milliseconds());
}

fn print_outcome(label: &str, outcome: &ScriptOutcome) {
	println!(
		"  {label}: {} attempted, {} succeeded, {} failed",
		outcome.statements_attempted,
		outcome.statements_succeeded,
		outcome.failures.len()
	);
	for failure in &outcome.failures {
		println!(
			"    - #{} {}: {}",
			failure.index, failure.statement_excerpt, failure.error_message
		);
	}
}

pub fn write_json_report(path: &Path, report: &BootstrapReport) -> Result<()> {
	if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
		fs::create_dir_all(parent)
			.with_context(|| format!("creating report directory {}", parent.display()))?;
	}
	let raw = serde_json::to_string_pretty(report).context("serializing report json")?;
	fs::write(path, format!("{raw}\n"))
		.with_context(|| format!("writing report file {}", path.display()))?;
	Ok(())
}
