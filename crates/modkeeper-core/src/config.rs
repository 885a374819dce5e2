use config::{Config, ConfigError, File as ConfigFile};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_mods_dir")]
    pub mods_dir: PathBuf,
    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,
    #[serde(default = "default_quarantine_dir")]
    pub quarantine_dir: PathBuf,
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    #[serde(default)]
    pub known_versions_path: Option<PathBuf>,
    #[serde(default)]
    pub known_versions_url: Option<String>,
    #[serde(default = "default_resource_cfg_depth")]
    pub resource_cfg_depth: usize,
}

fn home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn default_mods_dir() -> PathBuf {
    home().join("Documents/Electronic Arts/The Sims 4/Mods")
}

fn default_backup_dir() -> PathBuf {
    home().join("Desktop")
}

fn default_quarantine_dir() -> PathBuf {
    home().join("Desktop/Sims4_Mod_Quarantine")
}

fn default_report_dir() -> PathBuf {
    home().join("Desktop")
}

fn default_resource_cfg_depth() -> usize {
    5
}

pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Modkeeper").required(false))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.resource_cfg_depth, 5);
        assert!(config.ignore_patterns.is_empty());
        assert!(config.known_versions_path.is_none());
        assert!(config.mods_dir.ends_with("Mods"));
    }

    #[test]
    fn test_explicit_values_win() {
        let config: AppConfig = serde_json::from_str(
            r#"{"mods_dir": "/tmp/mods", "resource_cfg_depth": 3, "ignore_patterns": ["**/.git/**"]}"#,
        )
        .unwrap();
        assert_eq!(config.mods_dir, PathBuf::from("/tmp/mods"));
        assert_eq!(config.resource_cfg_depth, 3);
        assert_eq!(config.ignore_patterns.len(), 1);
    }
}
