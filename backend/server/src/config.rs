use std::{env, fmt::Display, fs::read_to_string, str::FromStr};

use tracing::{info, warn};

use crate::error::ConfigError;

const SECRETS_DIR: &str = "/run/secrets";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub admin_email: String,
    pub admin_email_password: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub frontend_origins: Vec<String>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, environment variables in production.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            port: try_load(&lookup, "PORT", "3001")?,
            database_url: try_load(&lookup, "DATABASE_URL", "redis://127.0.0.1:6379")?,
            admin_email: require(&lookup, "ADMIN_EMAIL")?,
            admin_email_password: read_secret(&lookup, "ADMIN_EMAIL_PASSWORD")?,
            smtp_host: try_load(&lookup, "SMTP_HOST", "smtp.gmail.com")?,
            smtp_port: try_load(&lookup, "SMTP_PORT", "465")?,
            frontend_origins: parse_origins(&try_load::<String, _>(
                &lookup,
                "FRONTEND_URL",
                "http://localhost:3000",
            )?),
        })
    }

    /// Origin the landing page links to.
    pub fn frontend_url(&self) -> &str {
        self.frontend_origins
            .first()
            .map(String::as_str)
            .unwrap_or_default()
    }
}

pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

fn try_load<T, F>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            ConfigError::Invalid {
                key,
                reason: e.to_string(),
            }
        })
}

fn require<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::Missing(key))
}

/// Docker secret first, plain environment variable as fallback.
fn read_secret<F>(lookup: &F, secret_name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let path = format!("{SECRETS_DIR}/{secret_name}");

    match read_to_string(&path) {
        Ok(secret) => Ok(secret.trim().to_string()),
        Err(e) => {
            info!("Failed to read {secret_name} from file ({e}), checking environment");
            require(lookup, secret_name)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        move |key| vars.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("ADMIN_EMAIL", "admin@example.com"),
        ("ADMIN_EMAIL_PASSWORD", "hunter2"),
    ];

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(config.port, 3001);
        assert_eq!(config.database_url, "redis://127.0.0.1:6379");
        assert_eq!(config.smtp_host, "smtp.gmail.com");
        assert_eq!(config.smtp_port, 465);
        assert_eq!(config.frontend_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.frontend_url(), "http://localhost:3000");
    }

    #[test]
    fn missing_admin_email_is_an_error() {
        let err = Config::from_lookup(lookup(&[("ADMIN_EMAIL_PASSWORD", "x")])).unwrap_err();

        assert!(matches!(err, ConfigError::Missing("ADMIN_EMAIL")));
    }

    #[test]
    fn invalid_port_is_an_error() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PORT", "not-a-port"));

        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();

        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }

    #[test]
    fn origins_are_split_and_normalized() {
        assert_eq!(
            parse_origins(" https://jobs.example.com/ ,http://localhost:5173,, "),
            vec!["https://jobs.example.com", "http://localhost:5173"]
        );
        assert!(parse_origins("").is_empty());
    }
}
