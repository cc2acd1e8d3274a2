//! Wizard settings file handling
//!
//! Everything the provisioning workflow treats as fixed — system file
//! locations, the skeleton template, the privileged group names — lives in
//! [`WizardConfig`]. The defaults match a stock Linux install; a JSON
//! settings file can override them for testing or unusual layouts.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Wizard settings, loadable from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    /// Template for new home directories.
    pub skel_dir: PathBuf,
    /// Parent of per-user home directories.
    pub home_root: PathBuf,
    /// Minimum-UID policy file (login.defs format).
    pub login_defs: PathBuf,
    /// Valid login shells list.
    pub shells_file: PathBuf,
    pub passwd_file: PathBuf,
    pub group_file: PathBuf,
    pub shadow_file: PathBuf,
    /// Login shell given to the new account.
    pub default_shell: String,
    /// Privileged groups the admin checkbox joins, in order.
    pub admin_groups: Vec<String>,
    /// Command line of the external network-auth setup helper.
    pub auth_helper: Vec<String>,
}

impl Default for WizardConfig {
    fn default() -> Self {
        WizardConfig {
            skel_dir: PathBuf::from("/etc/skel"),
            home_root: PathBuf::from("/home"),
            login_defs: PathBuf::from("/etc/login.defs"),
            shells_file: PathBuf::from("/etc/shells"),
            passwd_file: PathBuf::from("/etc/passwd"),
            group_file: PathBuf::from("/etc/group"),
            shadow_file: PathBuf::from("/etc/shadow"),
            default_shell: "/bin/bash".to_string(),
            admin_groups: vec!["wheel".to_string(), "dialout".to_string()],
            auth_helper: vec!["authconfig-tui".to_string(), "--firstboot".to_string()],
        }
    }
}

impl WizardConfig {
    /// Save settings to a JSON file.
    #[allow(dead_code)] // API: used by deployments that pre-seed settings
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize wizard settings")?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write settings to {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Load settings from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings from {:?}", path.as_ref()))?;
        let config: Self =
            serde_json::from_str(&content).context("Failed to parse wizard settings JSON")?;
        Ok(config)
    }

    /// Validate the settings.
    pub fn validate(&self) -> Result<()> {
        for (label, path) in [
            ("skel_dir", &self.skel_dir),
            ("home_root", &self.home_root),
            ("login_defs", &self.login_defs),
            ("shells_file", &self.shells_file),
            ("passwd_file", &self.passwd_file),
            ("group_file", &self.group_file),
            ("shadow_file", &self.shadow_file),
        ] {
            if !path.is_absolute() {
                anyhow::bail!("{} must be an absolute path", label);
            }
        }

        if self.default_shell.trim().is_empty() {
            anyhow::bail!("default_shell must be specified");
        }
        if !self.default_shell.starts_with('/') {
            anyhow::bail!("default_shell must be an absolute path");
        }

        if self.admin_groups.is_empty() {
            anyhow::bail!("At least one privileged group must be configured");
        }
        if self.admin_groups.iter().any(|g| g.trim().is_empty()) {
            anyhow::bail!("Privileged group names must not be empty");
        }

        if self.auth_helper.is_empty() {
            anyhow::bail!("auth_helper command must not be empty");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(WizardConfig::default().validate().is_ok());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wizard.json");

        let mut config = WizardConfig::default();
        config.admin_groups = vec!["sudo".to_string()];
        config.save_to_file(&path).unwrap();

        let loaded = WizardConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.admin_groups, vec!["sudo"]);
        assert_eq!(loaded.home_root, PathBuf::from("/home"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wizard.json");
        fs::write(&path, r#"{"default_shell": "/bin/zsh"}"#).unwrap();

        let loaded = WizardConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.default_shell, "/bin/zsh");
        assert_eq!(loaded.skel_dir, PathBuf::from("/etc/skel"));
    }

    #[test]
    fn test_rejects_relative_paths() {
        let mut config = WizardConfig::default();
        config.home_root = PathBuf::from("home");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_admin_groups() {
        let mut config = WizardConfig::default();
        config.admin_groups.clear();
        assert!(config.validate().is_err());

        config.admin_groups = vec!["  ".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_relative_shell() {
        let mut config = WizardConfig::default();
        config.default_shell = "bash".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_auth_helper() {
        let mut config = WizardConfig::default();
        config.auth_helper.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(WizardConfig::load_from_file("/nonexistent/wizard.json").is_err());
    }
}
