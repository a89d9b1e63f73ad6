use std::{collections::BTreeMap, fmt};

use rust_dotenv::dotenv::DotEnv;
use sqlx::postgres::PgConnectOptions;
use tracing::{info, warn};

const DEFAULT_USER: &str = "postgres";
const DEFAULT_PASSWORD: &str = "postgres";
const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5432;
const DEFAULT_DATABASE: &str = "app_development";

const KEYS: [&str; 5] = ["DB_USER", "DB_PASSWORD", "DB_HOST", "DB_PORT", "DB_NAME"];

/// Key/value source consulted for connection overrides.
pub trait EnvSource {
	fn get(&self, key: &str) -> Option<String>;
}

impl EnvSource for DotEnv {
	fn get(&self, key: &str) -> Option<String> {
		self.get_var(key.to_string())
	}
}

impl EnvSource for BTreeMap<String, String> {
	fn get(&self, key: &str) -> Option<String> {
		BTreeMap::get(self, key).cloned()
	}
}

/// Looks in the first source, then the second.
impl<A: EnvSource, B: EnvSource> EnvSource for (A, B) {
	fn get(&self, key: &str) -> Option<String> {
		non_empty(&self.0, key).or_else(|| self.1.get(key))
	}
}

/// The `DB_*` variables exported by the caller's shell.
///
/// Captured before `.env` is loaded, since loading it may write into the
/// process environment and an exported variable must win over the file.
#[derive(Debug, Clone)]
pub struct ProcessEnv(BTreeMap<String, String>);

impl ProcessEnv {
	pub fn capture() -> Self {
		Self(
			KEYS.iter()
				.filter_map(|key| std::env::var(key).ok().map(|v| (key.to_string(), v)))
				.collect(),
		)
	}
}

impl EnvSource for ProcessEnv {
	fn get(&self, key: &str) -> Option<String> {
		self.0.get(key).cloned()
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbCfg {
	user: String,
	password: String,
	host: String,
	port: u16,
	database: String,
}

impl Default for DbCfg {
	fn default() -> Self {
		Self {
			user: DEFAULT_USER.to_string(),
			password: DEFAULT_PASSWORD.to_string(),
			host: DEFAULT_HOST.to_string(),
			port: DEFAULT_PORT,
			database: DEFAULT_DATABASE.to_string(),
		}
	}
}

impl DbCfg {
	/// Overlays `DB_USER`, `DB_PASSWORD`, `DB_HOST`, `DB_PORT` and `DB_NAME`
	/// on the compiled-in defaults. Never fails: unusable values keep the default.
	pub fn resolve(env: &impl EnvSource) -> Self {
		let mut cfg = Self::default();
		let mut applied = Vec::new();

		if let Some(user) = non_empty(env, "DB_USER") {
			cfg.user = user;
			applied.push("DB_USER");
		}

		if let Some(password) = non_empty(env, "DB_PASSWORD") {
			cfg.password = password;
			applied.push("DB_PASSWORD");
		}

		if let Some(host) = non_empty(env, "DB_HOST") {
			cfg.host = host;
			applied.push("DB_HOST");
		}

		if let Some(raw) = non_empty(env, "DB_PORT") {
			match raw.trim().parse::<u16>() {
				Ok(port) => {
					cfg.port = port;
					applied.push("DB_PORT");
				}
				Err(_) => warn!(
					"DB_PORT={raw:?} is not a valid port, keeping default {}",
					DEFAULT_PORT
				),
			}
		}

		if let Some(database) = non_empty(env, "DB_NAME") {
			cfg.database = database;
			applied.push("DB_NAME");
		}

		if !applied.is_empty() {
			info!("environment overrides applied: {}", applied.join(", "));
		}

		cfg
	}

	pub fn user(&self) -> &str {
		&self.user
	}

	pub fn password(&self) -> &str {
		&self.password
	}

	pub fn host(&self) -> &str {
		&self.host
	}

	pub fn port(&self) -> u16 {
		self.port
	}

	pub fn database(&self) -> &str {
		&self.database
	}

	pub fn connect_options(&self) -> PgConnectOptions {
		PgConnectOptions::new()
			.host(&self.host)
			.port(self.port)
			.username(self.user())
			.password(self.password())
			.database(&self.database)
	}
}

impl fmt::Display for DbCfg {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}@{}:{}/{}",
			self.user, self.host, self.port, self.database
		)
	}
}

fn non_empty(env: &impl EnvSource, key: &str) -> Option<String> {
	env.get(key).filter(|v| !v.trim().is_empty())
}
