use std::env;
use std::str::FromStr;

use chrono::Duration;
use eyre::{eyre, ContextCompat, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub api_version: String,
    pub mysql_host: String,
    pub mysql_port: u16,
    pub mysql_user: String,
    pub mysql_password: String,
    pub mysql_database: String,
    pub mysql_max_connections: u32,
    pub session_ttl: Duration,
}

impl Config {
    /// Reads the process environment, after loading `.env` if there is one.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).wrap_err_with(|| format!("{} is not set", key))
        };

        Ok(Config {
            port: parse_or(&lookup, "PORT", 8080)?,
            api_version: lookup("API_VERSION").unwrap_or_else(|| "v1".to_string()),
            mysql_host: lookup("MYSQL_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            mysql_port: parse_or(&lookup, "MYSQL_PORT", 3306)?,
            mysql_user: required("MYSQL_USER")?,
            mysql_password: required("MYSQL_PASSWORD")?,
            mysql_database: required("MYSQL_DATABASE")?,
            mysql_max_connections: parse_or(&lookup, "MYSQL_MAX_CONNECTIONS", 10)?,
            session_ttl: Duration::seconds(parse_or(&lookup, "SESSION_TTL_SECS", 86400)?),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .parse()
            .map_err(|_| eyre!("{} has an invalid value: {}", key, value)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("MYSQL_USER", "root"),
        ("MYSQL_PASSWORD", "secret"),
        ("MYSQL_DATABASE", "midash"),
    ];

    #[test]
    fn test_defaults() -> Result<()> {
        let config = Config::from_lookup(lookup(&REQUIRED))?;
        assert_eq!(config.port, 8080);
        assert_eq!(config.api_version, "v1");
        assert_eq!(config.mysql_host, "127.0.0.1");
        assert_eq!(config.mysql_port, 3306);
        assert_eq!(config.mysql_max_connections, 10);
        assert_eq!(config.session_ttl, Duration::days(1));
        Ok(())
    }

    #[test]
    fn test_overrides() -> Result<()> {
        let mut vars = REQUIRED.to_vec();
        vars.extend([("PORT", "9000"), ("API_VERSION", "v2"), ("SESSION_TTL_SECS", "60")]);
        let config = Config::from_lookup(lookup(&vars))?;
        assert_eq!(config.port, 9000);
        assert_eq!(config.api_version, "v2");
        assert_eq!(config.session_ttl, Duration::minutes(1));
        Ok(())
    }

    #[test]
    fn test_missing_required() {
        let err = Config::from_lookup(lookup(&REQUIRED[..2])).unwrap_err();
        assert_eq!(err.to_string(), "MYSQL_DATABASE is not set");
    }

    #[test]
    fn test_bad_number() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("MYSQL_PORT", "many"));
        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert_eq!(err.to_string(), "MYSQL_PORT has an invalid value: many");
    }
}
