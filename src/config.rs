// src/config.rs

use std::env;
use std::str::FromStr;
use dotenvy::dotenv;
use log::LevelFilter;
use sqlx::ConnectOptions;
use sqlx::sqlite::SqliteConnectOptions;

/// Placeholder shown for users who did not provide a picture.
pub const DEFAULT_IMAGE_URL: &str = "https://via.placeholder.com/200?text=Blogly";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    pub host: String,
    pub port: u16,

    /// Image URL stored for users who leave the field blank.
    pub default_image_url: String,

    /// Log every SQL statement at info level (the "echo" switch).
    pub sql_echo: bool,

    /// Directory for the daily rolling log file.
    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://blogly.db?mode=rwc".to_string());

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let default_image_url = env::var("DEFAULT_IMAGE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string());

        let sql_echo = env::var("SQL_ECHO")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());

        Self {
            database_url,
            rust_log,
            host,
            port,
            default_image_url,
            sql_echo,
            log_dir,
        }
    }

    /// Level sqlx logs executed statements at. `Off` unless echo is on.
    pub fn statement_log_level(&self) -> LevelFilter {
        if self.sql_echo {
            LevelFilter::Info
        } else {
            LevelFilter::Off
        }
    }

    /// Connection options for `database_url`: file created on demand,
    /// foreign keys enforced, statement logging per `sql_echo`.
    pub fn connect_options(&self) -> Result<SqliteConnectOptions, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(&self.database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        Ok(match self.statement_log_level() {
            LevelFilter::Off => options.disable_statement_logging(),
            level => options.log_statements(level),
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(database_url: &str, sql_echo: bool) -> Config {
        Config {
            database_url: database_url.to_string(),
            rust_log: "info".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            default_image_url: DEFAULT_IMAGE_URL.to_string(),
            sql_echo,
            log_dir: "logs".to_string(),
        }
    }

    #[test]
    fn sql_echo_flag_accepts_common_truthy_values() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" 1 "));
        assert!(parse_flag("ON"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn sql_echo_logs_statements_at_info() {
        // Visible under the default `RUST_LOG=info` filter.
        assert_eq!(config("sqlite::memory:", true).statement_log_level(), LevelFilter::Info);
        assert_eq!(config("sqlite::memory:", false).statement_log_level(), LevelFilter::Off);
    }

    #[test]
    fn connect_options_carry_the_echo_level() {
        let options = config("sqlite::memory:", true).connect_options().unwrap();
        assert!(format!("{:?}", options).contains("statements_level: Info"));

        let options = config("sqlite::memory:", false).connect_options().unwrap();
        assert!(format!("{:?}", options).contains("statements_level: Off"));
    }

    #[test]
    fn connect_options_reject_a_bad_mode() {
        assert!(config("sqlite://blogly.db?mode=bogus", false).connect_options().is_err());
    }
}
