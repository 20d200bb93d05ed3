use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::OutputFormat;

pub const DEFAULT_SERVER: &str = "http://localhost:8000";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ProfileConfig {
    pub server: Option<String>,
    pub format: Option<String>,
}

impl ProfileConfig {
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "server" => self.server = Some(value.to_string()),
            "format" => {
                parse_format(value)?;
                self.format = Some(value.to_string());
            }
            other => anyhow::bail!("Unknown config key: {other}. Valid keys: server, format"),
        }
        Ok(())
    }
}

pub type ConfigFile = BTreeMap<String, ProfileConfig>;

fn config_dir() -> Result<PathBuf> {
    let dir = dirs::home_dir()
        .context("Cannot determine home directory")?
        .join(".vetanemia");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Where the session for `profile` (token, user snapshot, last prediction)
/// is persisted.
pub fn session_path(profile: &str) -> Result<PathBuf> {
    Ok(config_dir()?.join(format!("session.{profile}.json")))
}

fn load_all_from(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::new());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Invalid config file {}", path.display()))
}

fn save_profile_to(path: &Path, profile: &str, config: &ProfileConfig) -> Result<()> {
    let mut all = load_all_from(path)?;
    all.insert(profile.to_string(), config.clone());
    fs::write(path, toml::to_string_pretty(&all)?)?;
    Ok(())
}

pub fn load_profile(profile: &str) -> Result<ProfileConfig> {
    let mut all = load_all_from(&config_path()?)?;
    Ok(all.remove(profile).unwrap_or_default())
}

pub fn save_profile(profile: &str, config: &ProfileConfig) -> Result<()> {
    save_profile_to(&config_path()?, profile, config)
}

/// `--server` / `VETANEMIA_URL`, then the profile, then the local default.
pub fn resolve_server(cli_server: Option<&str>, config: &ProfileConfig) -> String {
    cli_server
        .or(config.server.as_deref())
        .unwrap_or(DEFAULT_SERVER)
        .to_string()
}

/// `--format`, then the profile, then table output.
pub fn resolve_format(cli_format: Option<OutputFormat>, config: &ProfileConfig) -> Result<OutputFormat> {
    match (cli_format, config.format.as_deref()) {
        (Some(format), _) => Ok(format),
        (None, Some(saved)) => parse_format(saved),
        (None, None) => Ok(OutputFormat::default()),
    }
}

fn parse_format(value: &str) -> Result<OutputFormat> {
    match value.to_ascii_lowercase().as_str() {
        "table" => Ok(OutputFormat::Table),
        "json" => Ok(OutputFormat::Json),
        other => anyhow::bail!("Unknown output format: {other}. Valid formats: table, json"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_profiles_are_stored_side_by_side() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut clinic = ProfileConfig::default();
        clinic.set("server", "https://api.clinic.test").unwrap();
        save_profile_to(&path, "clinic", &clinic).unwrap();

        let mut local = ProfileConfig::default();
        local.set("format", "json").unwrap();
        save_profile_to(&path, "default", &local).unwrap();

        let all = load_all_from(&path).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all["clinic"].server.as_deref(), Some("https://api.clinic.test"));
        assert_eq!(all["default"].format.as_deref(), Some("json"));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(load_all_from(&dir.path().join("config.toml")).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_keys_and_formats_are_rejected() {
        let mut cfg = ProfileConfig::default();
        assert!(cfg.set("colour", "red").is_err());
        assert!(cfg.set("format", "yaml").is_err());
        assert_eq!(cfg, ProfileConfig::default());
    }

    #[test]
    fn test_server_resolution_order() {
        let cfg = ProfileConfig {
            server: Some("https://saved.test".to_string()),
            format: None,
        };
        assert_eq!(resolve_server(Some("https://flag.test"), &cfg), "https://flag.test");
        assert_eq!(resolve_server(None, &cfg), "https://saved.test");
        assert_eq!(resolve_server(None, &ProfileConfig::default()), DEFAULT_SERVER);
    }

    #[test]
    fn test_format_resolution_order() {
        let cfg = ProfileConfig {
            server: None,
            format: Some("JSON".to_string()),
        };
        assert_eq!(resolve_format(Some(OutputFormat::Table), &cfg).unwrap(), OutputFormat::Table);
        assert_eq!(resolve_format(None, &cfg).unwrap(), OutputFormat::Json);
        assert_eq!(
            resolve_format(None, &ProfileConfig::default()).unwrap(),
            OutputFormat::Table
        );
    }
}
