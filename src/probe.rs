use tracing::debug;

use crate::{db::Session, error::BootstrapError};

/// User tables named `$1` in the connection's default schema.
pub const TABLE_COUNT_SQL: &str = "SELECT COUNT(*) FROM information_schema.tables \
	WHERE table_schema = current_schema() AND table_name = $1";

pub async fn check_connectivity(session: &mut impl Session) -> Result<(), BootstrapError> {
	session.ping().await.map_err(BootstrapError::Ping)
}

/// Whether the marker table exists. Errors are fatal and never retried:
/// guessing either way could wipe data or skip a needed bootstrap.
pub async fn table_exists(session: &mut impl Session, table: &str) -> Result<bool, BootstrapError> {
	let count = session
		.table_count(table)
		.await
		.map_err(|source| BootstrapError::Probe {
			table: table.to_string(),
			source,
		})?;
	debug!("probe {table}: {count} match(es)");
	Ok(count > 0)
}
