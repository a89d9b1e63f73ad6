use sqlx::{Connection, PgConnection};

use crate::{config::DbCfg, probe::TABLE_COUNT_SQL};

/// One live database connection, used strictly sequentially.
pub trait Session {
	async fn ping(&mut self) -> Result<(), sqlx::Error>;

	async fn table_count(&mut self, table: &str) -> Result<i64, sqlx::Error>;

	async fn execute(&mut self, sql: &str) -> Result<(), sqlx::Error>;

	async fn close(self) -> Result<(), sqlx::Error>
	where
		Self: Sized;
}

pub trait Connector {
	type Session: Session;

	async fn open(&self, cfg: &DbCfg) -> Result<Self::Session, sqlx::Error>;
}

pub struct PgConnector;

impl Connector for PgConnector {
	type Session = PgSession;

	async fn open(&self, cfg: &DbCfg) -> Result<PgSession, sqlx::Error> {
		let conn = PgConnection::connect_with(&cfg.connect_options()).await?;
		Ok(PgSession { conn })
	}
}

pub struct PgSession {
	conn: PgConnection,
}

impl Session for PgSession {
	async fn ping(&mut self) -> Result<(), sqlx::Error> {
		sqlx::query("SELECT 1").execute(&mut self.conn).await?;
		Ok(())
	}

	async fn table_count(&mut self, table: &str) -> Result<i64, sqlx::Error> {
		sqlx::query_scalar::<_, i64>(TABLE_COUNT_SQL)
			.bind(table)
			.fetch_one(&mut self.conn)
			.await
	}

	async fn execute(&mut self, sql: &str) -> Result<(), sqlx::Error> {
		sqlx::raw_sql(sql).execute(&mut self.conn).await?;
		Ok(())
	}

	async fn close(self) -> Result<(), sqlx::Error> {
		self.conn.close().await
	}
}

#[cfg(test)]
pub mod fake {
	use std::{
		collections::BTreeSet,
		sync::{Arc, Mutex},
	};

	use super::*;

	#[derive(Debug, Default)]
	pub struct FakeState {
		pub opened: usize,
		pub closed: usize,
		pub executed: Vec<String>,
		pub tables: BTreeSet<String>,
		pub fail_ping: bool,
	}

	/// In-memory stand-in for Postgres. Any statement containing `FAIL` errors;
	/// `CREATE TABLE [IF NOT EXISTS] name` registers `name` for the probe.
	#[derive(Debug, Clone, Default)]
	pub struct FakeDb {
		pub state: Arc<Mutex<FakeState>>,
		pub refuse_connect: bool,
	}

	impl FakeDb {
		pub fn with_table(self, table: &str) -> Self {
			self.state.lock().unwrap().tables.insert(table.to_string());
			self
		}

		pub fn snapshot<T>(&self, f: impl FnOnce(&FakeState) -> T) -> T {
			f(&self.state.lock().unwrap())
		}
	}

	pub struct FakeSession {
		state: Arc<Mutex<FakeState>>,
	}

	impl FakeSession {
		pub fn new(db: &FakeDb) -> Self {
			Self {
				state: Arc::clone(&db.state),
			}
		}
	}

	impl Connector for FakeDb {
		type Session = FakeSession;

		async fn open(&self, _cfg: &DbCfg) -> Result<FakeSession, sqlx::Error> {
			if self.refuse_connect {
				return Err(sqlx::Error::Protocol("connection refused".into()));
			}
			self.state.lock().unwrap().opened += 1;
			Ok(FakeSession::new(self))
		}
	}

	impl Session for FakeSession {
		async fn ping(&mut self) -> Result<(), sqlx::Error> {
			if self.state.lock().unwrap().fail_ping {
				return Err(sqlx::Error::Protocol("server closed the connection".into()));
			}
			Ok(())
		}

		async fn table_count(&mut self, table: &str) -> Result<i64, sqlx::Error> {
			Ok(i64::from(self.state.lock().unwrap().tables.contains(table)))
		}

		async fn execute(&mut self, sql: &str) -> Result<(), sqlx::Error> {
			let mut state = self.state.lock().unwrap();
			state.executed.push(sql.to_string());
			if sql.contains("FAIL") {
				return Err(sqlx::Error::Protocol(format!("syntax error near {sql:?}")));
			}
			if let Some(table) = created_table(sql) {
				state.tables.insert(table);
			}
			Ok(())
		}

		async fn close(self) -> Result<(), sqlx::Error> {
			self.state.lock().unwrap().closed += 1;
			Ok(())
		}
	}

	fn created_table(sql: &str) -> Option<String> {
		let words: Vec<&str> = sql.split_whitespace().collect();
		let rest = match words.as_slice() {
			["CREATE", "TABLE", "IF", "NOT", "EXISTS", rest @ ..] => rest,
			["CREATE", "TABLE", rest @ ..] => rest,
			_ => return None,
		};
		rest.first()
			.map(|name| name.trim_end_matches('(').to_string())
	}
}
