use std::{collections::HashMap, fs, io::ErrorKind, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "register.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub server_bind: String,
    pub submit_delay_ms: u64,
    pub seed_members: bool,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8080".into(),
            submit_delay_ms: 2000,
            seed_members: true,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }
}

/// Runs before tracing is installed, so a rejected config file is reported on
/// stderr.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();
    match read_file_config(Path::new(DEFAULT_CONFIG_PATH)) {
        Ok(Some(file_cfg)) => apply_file_config(&mut settings, &file_cfg),
        Ok(None) => {}
        Err(err) => eprintln!("warning: ignoring {DEFAULT_CONFIG_PATH}: {err:#}"),
    }
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

/// Reads a flat table of scalars. Strings, integers, floats and booleans are
/// all accepted and kept as text; nested values are skipped. A missing file
/// is `Ok(None)`.
fn read_file_config(path: &Path) -> anyhow::Result<Option<HashMap<String, String>>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    };
    let table: HashMap<String, toml::Value> = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
    let file_cfg = table
        .into_iter()
        .filter_map(|(key, value)| {
            let text = match value {
                toml::Value::String(s) => s,
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                _ => return None,
            };
            Some((key, text))
        })
        .collect();
    Ok(Some(file_cfg))
}

fn apply_file_config(settings: &mut Settings, file_cfg: &HashMap<String, String>) {
    if let Some(v) = file_cfg.get("bind_addr") {
        settings.server_bind = v.clone();
    }
    if let Some(v) = file_cfg.get("submit_delay_ms").and_then(|v| v.parse().ok()) {
        settings.submit_delay_ms = v;
    }
    if let Some(v) = file_cfg.get("seed_members").and_then(|v| parse_bool(v)) {
        settings.seed_members = v;
    }
    if let Some(v) = file_cfg.get("log_filter") {
        settings.log_filter = v.clone();
    }
}

/// Later keys win, so `APP__BIND_ADDR` overrides `SERVER_BIND`.
fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = var("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = var("APP__SUBMIT_DELAY_MS").and_then(|v| v.parse().ok()) {
        settings.submit_delay_ms = v;
    }
    if let Some(v) = var("APP__SEED_MEMBERS").and_then(|v| parse_bool(&v)) {
        settings.seed_members = v;
    }
    if let Some(v) = var("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
