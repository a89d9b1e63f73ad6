use serde::Serialize;
use tracing::{error, info, warn};

use crate::db::Session;

const EXCERPT_CHARS: usize = 120;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementFailure {
	/// 1-based position of the statement in its script.
	pub index: usize,
	pub statement_excerpt: String,
	pub error_message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScriptOutcome {
	pub statements_attempted: usize,
	pub statements_succeeded: usize,
	pub failures: Vec<StatementFailure>,
}

impl ScriptOutcome {
	pub fn is_clean(&self) -> bool {
		self.failures.is_empty()
	}
}

/// Runs every statement in order on one session. A failing statement is
/// recorded and skipped; it never stops the statements after it.
pub async fn run_script(
	session: &mut impl Session,
	label: &str,
	statements: &[String],
) -> ScriptOutcome {
	info!("running {label} script ({} statements)", statements.len());

	let mut outcome = ScriptOutcome::default();
	for (idx, sql) in statements.iter().enumerate() {
		outcome.statements_attempted += 1;
		match session.execute(sql).await {
			Ok(()) => outcome.statements_succeeded += 1,
			Err(err) => {
				let failure = StatementFailure {
					index: idx + 1,
					statement_excerpt: excerpt(sql),
					error_message: err.to_string(),
				};
				error!(
					"{label} statement #{} failed: {}\n  {}",
					failure.index, failure.error_message, failure.statement_excerpt
				);
				outcome.failures.push(failure);
			}
		}
	}

	if outcome.is_clean() {
		info!(
			"{label} script finished: {} statements succeeded",
			outcome.statements_succeeded
		);
	} else {
		warn!(
			"{label} script finished: {} attempted, {} succeeded, {} failed",
			outcome.statements_attempted,
			outcome.statements_succeeded,
			outcome.failures.len()
		);
	}
	outcome
}

/// First `EXCERPT_CHARS` characters with runs of whitespace collapsed.
pub fn excerpt(sql: &str) -> String {
	let flat = sql.split_whitespace().collect::<Vec<_>>().join(" ");
	match flat.char_indices().nth(EXCERPT_CHARS) {
		Some((cut, _)) => format!("{}...", &flat[..cut]),
		None => flat,
	}
}
