use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;
use server_api::AccountConfig;
use shared::domain::Role;

const CONFIG_FILE: &str = "server.toml";
const MAX_SESSION_TTL_SECONDS: i64 = 30 * 24 * 3600;

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_bind: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub session_ttl_seconds: i64,
    pub seed_demo_data: bool,
    pub accounts: Vec<AccountConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8080".into(),
            database_url: "sqlite://./data/mentoring.db".into(),
            jwt_secret: "dev-mentoring-secret".into(),
            session_ttl_seconds: 8 * 3600,
            seed_demo_data: true,
            accounts: default_accounts(),
        }
    }
}

/// Demo accounts, one per role, all with the password `password123`.
fn default_accounts() -> Vec<AccountConfig> {
    [
        ("SuhaniReddy@student.nitandhra.ac.in", Role::Student, "Suhani Reddy"),
        ("student2@student.nitandhra.ac.in", Role::Student, "Rahul Sharma"),
        ("faculty1@faculty.nitandhra.ac.in", Role::Faculty, "Dr. Ramesh Kumar"),
        ("faculty2@faculty.nitandhra.ac.in", Role::Faculty, "Prof. Sunita Mishra"),
        ("hod@hod.nitandhra.ac.in", Role::Hod, "Dr. Venkat Rao"),
    ]
    .into_iter()
    .map(|(email, role, name)| AccountConfig::plain(email, "password123", role, Some(name)))
    .collect()
}

/// Shape of `server.toml`. Every key is optional and overrides the default.
#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    database_url: Option<String>,
    jwt_secret: Option<String>,
    session_ttl_seconds: Option<i64>,
    seed_demo_data: Option<bool>,
    accounts: Option<Vec<AccountConfig>>,
}

pub fn load_settings() -> anyhow::Result<Settings> {
    load_settings_from(Path::new(CONFIG_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the config file when it exists, then environment variables.
pub fn load_settings_from(
    config_path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if config_path.exists() {
        let raw = fs::read_to_string(config_path)
            .with_context(|| format!("failed to read '{}'", config_path.display()))?;
        let file_cfg: FileSettings = toml::from_str(&raw)
            .with_context(|| format!("failed to parse '{}'", config_path.display()))?;
        if let Some(v) = file_cfg.bind_addr {
            settings.server_bind = v;
        }
        if let Some(v) = file_cfg.database_url {
            settings.database_url = v;
        }
        if let Some(v) = file_cfg.jwt_secret {
            settings.jwt_secret = v;
        }
        if let Some(v) = file_cfg.session_ttl_seconds {
            settings.session_ttl_seconds = v;
        }
        if let Some(v) = file_cfg.seed_demo_data {
            settings.seed_demo_data = v;
        }
        if let Some(v) = file_cfg.accounts {
            settings.accounts = v;
        }
    }

    if let Some(v) = env("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = env("DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = env("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = env("APP__JWT_SECRET") {
        settings.jwt_secret = v;
    }

    if let Some(v) = env("APP__SESSION_TTL_SECONDS") {
        settings.session_ttl_seconds = v
            .parse()
            .with_context(|| format!("APP__SESSION_TTL_SECONDS is not an integer: '{v}'"))?;
    }

    if let Some(v) = env("APP__SEED_DEMO_DATA") {
        settings.seed_demo_data = parse_flag(&v)
            .with_context(|| format!("APP__SEED_DEMO_DATA is not a boolean: '{v}'"))?;
    }

    if settings.session_ttl_seconds <= 0 {
        anyhow::bail!("session_ttl_seconds must be positive");
    }
    if settings.session_ttl_seconds > MAX_SESSION_TTL_SECONDS {
        anyhow::bail!("session_ttl_seconds must be at most {MAX_SESSION_TTL_SECONDS}");
    }

    Ok(settings)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn prepare_database_url(raw_database_url: &str) -> anyhow::Result<String> {
    let database_url = normalize_database_url(raw_database_url);
    ensure_parent_dir_exists(&database_url)?;
    Ok(database_url)
}

fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:") {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite://") {
        if has_drive_letter(path) {
            return format!("sqlite:{}", path.replace('\\', "/"));
        }
        return raw_database_url.to_string();
    }

    if raw_database_url.contains("://") {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        let path = path.replace('\\', "/");
        if has_drive_letter(&path) {
            return format!("sqlite:{path}");
        }
        return format!("sqlite://{path}");
    }

    let path = raw_database_url.replace('\\', "/");
    if has_drive_letter(&path) {
        return format!("sqlite:{path}");
    }
    format!("sqlite://{path}")
}

fn has_drive_letter(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

fn ensure_parent_dir_exists(database_url: &str) -> anyhow::Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with("sqlite::memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
