//! Runtime configuration and secret resolution.
//!
//! This is the **single source of truth** for environment-variable access in
//! the protection engine. Every other crate receives an already-resolved
//! [`Config`] rather than calling `std::env::var` itself.
//!
//! `Debug` on [`Config`] and [`Secrets`] redacts every secret value — logs
//! and panics must never leak an API key or SMTP password.

use std::path::PathBuf;

use anyhow::Result;

pub const ENV_DB_PATH: &str = "DIGITAL_FOOTPRINT_DB_PATH";
pub const ENV_HIBP_API_KEY: &str = "HIBP_API_KEY";
pub const ENV_DEHASHED_API_KEY: &str = "DEHASHED_API_KEY";
pub const ENV_DEHASHED_EMAIL: &str = "DEHASHED_EMAIL";
pub const ENV_CAPTCHA_API_KEY: &str = "CAPTCHA_API_KEY";
pub const ENV_SMTP_HOST: &str = "SMTP_HOST";
pub const ENV_SMTP_PORT: &str = "SMTP_PORT";
pub const ENV_SMTP_USER: &str = "SMTP_USER";
pub const ENV_SMTP_PASSWORD: &str = "SMTP_PASSWORD";
pub const ENV_ALERT_EMAIL: &str = "ALERT_EMAIL";

const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_DB_PATH: &str = "digital_footprint.db";

/// Secret values resolved once from the environment at startup.
///
/// Pass this struct into constructors; do not scatter `std::env::var` calls
/// elsewhere. **Values are redacted in `Debug` output.**
#[derive(Clone)]
pub struct Secrets {
    pub hibp_api_key: Option<String>,
    pub dehashed_api_key: Option<String>,
    pub dehashed_email: Option<String>,
    pub captcha_api_key: Option<String>,
    pub smtp_password: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("hibp_api_key", &redacted(&self.hibp_api_key))
            .field("dehashed_api_key", &redacted(&self.dehashed_api_key))
            .field("dehashed_email", &redacted(&self.dehashed_email))
            .field("captcha_api_key", &redacted(&self.captcha_api_key))
            .field("smtp_password", &redacted(&self.smtp_password))
            .finish()
    }
}

fn redacted(v: &Option<String>) -> &'static str {
    if v.is_some() {
        "<REDACTED>"
    } else {
        "<UNSET>"
    }
}

/// SMTP transport settings. The password lives in [`Secrets`], not here.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
}

/// Fully resolved runtime configuration for one process invocation.
#[derive(Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub smtp: Option<SmtpConfig>,
    pub alert_email: Option<String>,
    pub secrets: Secrets,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("db_path", &self.db_path)
            .field("smtp", &self.smtp)
            .field("alert_email", &self.alert_email)
            .field("secrets", &self.secrets)
            .finish()
    }
}

impl Config {
    /// Directory the db file lives in — report/log output is written beside it.
    pub fn db_dir(&self) -> PathBuf {
        self.db_path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn broker_registry_dir(&self) -> PathBuf {
        self.db_dir().join("brokers")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.db_dir().join("reports")
    }

    pub fn scheduler_log_path(&self) -> PathBuf {
        self.db_dir().join("scheduler.log")
    }
}

/// Read a named environment variable, treating blank values as unset.
fn resolve_env(var_name: &str) -> Option<String> {
    match std::env::var(var_name) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

/// Resolve all configuration from the environment.
///
/// `SMTP_PORT` defaults to 587 when unset or unparsable. `DIGITAL_FOOTPRINT_DB_PATH`
/// defaults to `digital_footprint.db` in the current directory when unset.
pub fn resolve_from_env() -> Result<Config> {
    let db_path = resolve_env(ENV_DB_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

    let smtp_host = resolve_env(ENV_SMTP_HOST);
    let smtp = smtp_host.map(|host| SmtpConfig {
        host,
        port: resolve_env(ENV_SMTP_PORT)
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_SMTP_PORT),
        user: resolve_env(ENV_SMTP_USER),
    });

    let secrets = Secrets {
        hibp_api_key: resolve_env(ENV_HIBP_API_KEY),
        dehashed_api_key: resolve_env(ENV_DEHASHED_API_KEY),
        dehashed_email: resolve_env(ENV_DEHASHED_EMAIL),
        captcha_api_key: resolve_env(ENV_CAPTCHA_API_KEY),
        smtp_password: resolve_env(ENV_SMTP_PASSWORD),
    };

    Ok(Config {
        db_path,
        smtp,
        alert_email: resolve_env(ENV_ALERT_EMAIL),
        secrets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secrets() {
        let secrets = Secrets {
            hibp_api_key: Some("super-secret".to_string()),
            dehashed_api_key: None,
            dehashed_email: Some("a@b.com".to_string()),
            captcha_api_key: None,
            smtp_password: Some("hunter2".to_string()),
        };
        let rendered = format!("{secrets:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<REDACTED>"));
        assert!(rendered.contains("<UNSET>"));
    }

    #[test]
    fn db_dir_derives_from_db_path() {
        let cfg = Config {
            db_path: PathBuf::from("/var/data/digital_footprint.db"),
            smtp: None,
            alert_email: None,
            secrets: Secrets {
                hibp_api_key: None,
                dehashed_api_key: None,
                dehashed_email: None,
                captcha_api_key: None,
                smtp_password: None,
            },
        };
        assert_eq!(cfg.db_dir(), PathBuf::from("/var/data"));
        assert_eq!(
            cfg.reports_dir(),
            PathBuf::from("/var/data/reports")
        );
    }
}
