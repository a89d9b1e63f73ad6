use std::path::PathBuf;

use thiserror::Error;

/// Failures that end a bootstrap run. Per-statement errors are not here:
/// they are recorded in the script outcome and the run continues.
#[derive(Debug, Error)]
pub enum BootstrapError {
	#[error("failed connecting to {target}")]
	Connect {
		target: String,
		#[source]
		source: sqlx::Error,
	},

	#[error("database did not answer the connectivity check")]
	Ping(#[source] sqlx::Error),

	#[error("failed probing for table {table:?}")]
	Probe {
		table: String,
		#[source]
		source: sqlx::Error,
	},

	#[error("reading {}", path.display())]
	ScriptRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}
