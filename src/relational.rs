//! Connection details for the application's relational database.
//!
//! Only application managers can reach this MySQL-compatible database. The
//! platform injects the details into the manager's environment as `ADB_*`
//! variables; this module just reports them. Values are read verbatim
//! (passwords may look numeric), so they bypass the layered config loader.

use std::env;

/// Port used when `ADB_PORT` is unset or not a number.
pub const DEFAULT_DATABASE_PORT: u16 = 3306;

/// Relational database details injected by the platform.
#[derive(Clone, Default, Eq, PartialEq)]
pub struct DatabaseDetails {
    /// DSN of the form `mysql://<user>:<password>@<host>:<port>/<db>`.
    pub dsn: String,
    /// Database user.
    pub username: String,
    /// Database password.
    pub password: String,
    /// Database name.
    pub db_name: String,
    /// Database host.
    pub host: String,
    /// Database port.
    pub port: u16,
}

impl std::fmt::Debug for DatabaseDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseDetails")
            .field("dsn", &"<redacted>")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("db_name", &self.db_name)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

impl DatabaseDetails {
    /// Reads the `ADB_*` variables from the process environment. Unset
    /// variables read as empty strings.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the details from an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).unwrap_or_default();
        Self {
            dsn: read("ADB_DSN"),
            username: read("ADB_USERNAME"),
            password: read("ADB_PASSWORD"),
            db_name: read("ADB_DB_NAME"),
            host: read("ADB_HOST"),
            port: lookup("ADB_PORT")
                .and_then(|raw| raw.trim().parse().ok())
                .unwrap_or(DEFAULT_DATABASE_PORT),
        }
    }
}

/// Returns the DSN injected in `ADB_DSN`, or an empty string.
#[must_use]
pub fn dsn() -> String {
    env::var("ADB_DSN").unwrap_or_default()
}
