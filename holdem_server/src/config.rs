//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use holdem_table::{
    Chips,
    db::DatabaseConfig,
    table::{TableConfig, TableSpeed},
};
use std::net::{Ipv4Addr, SocketAddr};

/// Balance handed to unknown addresses when no database is configured
pub const DEFAULT_STARTING_BALANCE: i64 = 1_000;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Database configuration; `None` keeps balances in memory
    pub database: Option<DatabaseConfig>,
    /// Starting balance for addresses the in-memory store has not seen
    pub default_balance: i64,
    /// Table defaults configuration
    pub table_defaults: TableDefaultsConfig,
    /// Number of tables to create on startup
    pub num_tables: usize,
}

/// Default table configuration
#[derive(Debug, Clone)]
pub struct TableDefaultsConfig {
    /// Small blind amount
    pub small_blind: Chips,
    /// Big blind amount
    pub big_blind: Chips,
    /// Minimum buy-in in chips
    pub min_buy_in: Chips,
    /// Maximum buy-in in chips
    pub max_buy_in: Chips,
    /// Turn timer speed
    pub speed: TableSpeed,
}

impl Default for TableDefaultsConfig {
    fn default() -> Self {
        let table = TableConfig::default();
        Self {
            small_blind: table.small_blind,
            big_blind: table.big_blind,
            min_buy_in: table.min_buy_in,
            max_buy_in: table.max_buy_in,
            speed: table.speed,
        }
    }
}

impl TableDefaultsConfig {
    /// Table configuration for the `index`-th startup table (zero based)
    pub fn table_config(&self, index: usize) -> TableConfig {
        TableConfig {
            name: format!("Table {}", index + 1),
            small_blind: self.small_blind,
            big_blind: self.big_blind,
            min_buy_in: self.min_buy_in,
            max_buy_in: self.max_buy_in,
            speed: self.speed,
            deck_seed: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args)
    /// * `num_tables_override` - Optional number of tables override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but cannot be parsed
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
        num_tables_override: Option<usize>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_env_strict(
                "SERVER_BIND",
                SocketAddr::from((Ipv4Addr::LOCALHOST, 6969)),
            )?,
        };

        let database = match database_url_override {
            Some(url) => Some(DatabaseConfig::with_url(url)),
            None => DatabaseConfig::from_env(),
        };

        let defaults = TableDefaultsConfig::default();
        let table_defaults = TableDefaultsConfig {
            small_blind: parse_env_strict("TABLE_SMALL_BLIND", defaults.small_blind)?,
            big_blind: parse_env_strict("TABLE_BIG_BLIND", defaults.big_blind)?,
            min_buy_in: parse_env_strict("TABLE_MIN_BUY_IN", defaults.min_buy_in)?,
            max_buy_in: parse_env_strict("TABLE_MAX_BUY_IN", defaults.max_buy_in)?,
            speed: parse_env_strict("TABLE_SPEED", defaults.speed)?,
        };

        let num_tables = match num_tables_override {
            Some(n) => n,
            None => parse_env_strict("MAX_TABLES", 1)?,
        };

        Ok(ServerConfig {
            bind,
            database,
            default_balance: parse_env_strict("DEFAULT_BALANCE", DEFAULT_STARTING_BALANCE)?,
            table_defaults,
            num_tables,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_tables == 0 {
            return Err(ConfigError::Invalid {
                var: "MAX_TABLES".to_string(),
                reason: "Must be at least 1".to_string(),
            });
        }

        if self.default_balance < 0 {
            return Err(ConfigError::Invalid {
                var: "DEFAULT_BALANCE".to_string(),
                reason: "Must not be negative".to_string(),
            });
        }

        if let Some(database) = &self.database
            && database.database_url.trim().is_empty()
        {
            return Err(ConfigError::MissingRequired {
                var: "DATABASE_URL".to_string(),
                hint: "Unset it to keep balances in memory".to_string(),
            });
        }

        // Blind and buy-in rules live with the table config.
        self.table_defaults
            .table_config(0)
            .validate()
            .map_err(|reason| ConfigError::Invalid {
                var: "TABLE_*".to_string(),
                reason,
            })
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Parse an environment variable, falling back to `default` when unset
fn parse_env_strict<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("Cannot parse {:?}", raw),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 10] = [
        "SERVER_BIND",
        "DATABASE_URL",
        "DEFAULT_BALANCE",
        "MAX_TABLES",
        "TABLE_SMALL_BLIND",
        "TABLE_BIG_BLIND",
        "TABLE_MIN_BUY_IN",
        "TABLE_MAX_BUY_IN",
        "TABLE_SPEED",
        "DB_MAX_CONNECTIONS",
    ];

    fn clear_env() {
        for var in VARS {
            unsafe { std::env::remove_var(var) };
        }
    }

    fn base_config() -> ServerConfig {
        ServerConfig {
            bind: "127.0.0.1:8080".parse().unwrap(),
            database: None,
            default_balance: 1_000,
            table_defaults: TableDefaultsConfig::default(),
            num_tables: 1,
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingRequired {
            var: "DATABASE_URL".to_string(),
            hint: "Unset it".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("DATABASE_URL"));
        assert!(msg.contains("Unset it"));
    }

    #[test]
    #[serial]
    fn test_defaults_without_env() {
        clear_env();
        let config = ServerConfig::from_env(None, None, None).unwrap();
        assert_eq!(config.bind, "127.0.0.1:6969".parse().unwrap());
        assert!(config.database.is_none());
        assert_eq!(config.default_balance, DEFAULT_STARTING_BALANCE);
        assert_eq!(config.num_tables, 1);
        assert_eq!(config.table_defaults.big_blind, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_env_values_are_read() {
        clear_env();
        unsafe {
            std::env::set_var("TABLE_SMALL_BLIND", "5");
            std::env::set_var("TABLE_BIG_BLIND", "10");
            std::env::set_var("TABLE_MIN_BUY_IN", "100");
            std::env::set_var("TABLE_MAX_BUY_IN", "1000");
            std::env::set_var("TABLE_SPEED", "turbo");
            std::env::set_var("MAX_TABLES", "3");
            std::env::set_var("DATABASE_URL", "postgres://localhost/holdem_test");
        }

        let config = ServerConfig::from_env(None, None, None).unwrap();
        assert_eq!(config.table_defaults.small_blind, 5);
        assert_eq!(config.table_defaults.max_buy_in, 1000);
        assert_eq!(config.table_defaults.speed, TableSpeed::Turbo);
        assert_eq!(config.num_tables, 3);
        assert_eq!(
            config.database.map(|db| db.database_url),
            Some("postgres://localhost/holdem_test".to_string())
        );
        assert_eq!(config.table_defaults.table_config(2).name, "Table 3");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_cli_overrides_win() {
        clear_env();
        unsafe { std::env::set_var("MAX_TABLES", "4") };
        let config = ServerConfig::from_env(
            Some("0.0.0.0:9000".parse().unwrap()),
            Some("postgres://cli/holdem".to_string()),
            Some(2),
        )
        .unwrap();
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.num_tables, 2);
        assert!(config.database.is_some());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_unparsable_value_is_an_error() {
        clear_env();
        unsafe { std::env::set_var("TABLE_BIG_BLIND", "lots") };
        let err = ServerConfig::from_env(None, None, None).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "TABLE_BIG_BLIND"));
        clear_env();
    }

    #[test]
    fn test_config_validation_big_blind_too_small() {
        let mut config = base_config();
        config.table_defaults.small_blind = 20;
        config.table_defaults.big_blind = 10;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_config_validation_zero_tables() {
        let mut config = base_config();
        config.num_tables = 0;
        assert!(config.validate().is_err());
    }
}
