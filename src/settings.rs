use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::error::SettingsError;

/// Bag label that always exists and cannot be removed
pub const DEFAULT_BAG_TYPE: &str = "Default";

/// Flat key/value settings for labelling sessions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(rename = "CornholeBagTypes", default)]
    pub bag_types: Vec<String>,
    #[serde(rename = "DefaultBagType", default = "default_bag_type")]
    pub default_bag_type: String,
    #[serde(rename = "ThrowingStyles", default)]
    pub throwing_styles: Vec<String>,
    #[serde(rename = "DefaultThrowingStyle", default)]
    pub default_throwing_style: Option<String>,
}

fn default_bag_type() -> String {
    DEFAULT_BAG_TYPE.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bag_types: vec![default_bag_type()],
            default_bag_type: default_bag_type(),
            throwing_styles: Vec::new(),
            default_throwing_style: None,
        }
    }
}

/// Adds `label` to `labels` unless it is blank or already present
fn add_label(labels: &mut Vec<String>, label: &str) -> bool {
    let label = label.trim();
    if label.is_empty() || labels.iter().any(|l| l == label) {
        return false;
    }
    labels.push(label.to_string());
    true
}

fn remove_label(labels: &mut Vec<String>, label: &str) -> Result<(), SettingsError> {
    let before = labels.len();
    labels.retain(|l| l != label);
    if labels.len() == before {
        return Err(SettingsError::UnknownLabel(label.to_string()));
    }
    Ok(())
}

impl Settings {
    /// Guarantees the protected bag label exists and the default bag is a known label
    pub fn normalized(mut self) -> Self {
        if !self.bag_types.iter().any(|b| b == DEFAULT_BAG_TYPE) {
            self.bag_types.insert(0, default_bag_type());
        }
        if !self.bag_types.contains(&self.default_bag_type) {
            self.default_bag_type = default_bag_type();
        }
        if let Some(style) = &self.default_throwing_style {
            if !self.throwing_styles.contains(style) {
                self.default_throwing_style = None;
            }
        }
        self
    }

    pub fn add_bag_type(&mut self, label: &str) -> bool {
        add_label(&mut self.bag_types, label)
    }

    pub fn remove_bag_type(&mut self, label: &str) -> Result<(), SettingsError> {
        if label == DEFAULT_BAG_TYPE {
            return Err(SettingsError::ProtectedLabel(label.to_string()));
        }
        remove_label(&mut self.bag_types, label)?;
        if self.default_bag_type == label {
            self.default_bag_type = default_bag_type();
        }
        Ok(())
    }

    pub fn set_default_bag_type(&mut self, label: &str) -> Result<(), SettingsError> {
        if !self.bag_types.iter().any(|b| b == label) {
            return Err(SettingsError::UnknownLabel(label.to_string()));
        }
        self.default_bag_type = label.to_string();
        Ok(())
    }

    pub fn add_throwing_style(&mut self, label: &str) -> bool {
        add_label(&mut self.throwing_styles, label)
    }

    pub fn remove_throwing_style(&mut self, label: &str) -> Result<(), SettingsError> {
        remove_label(&mut self.throwing_styles, label)?;
        if self.default_throwing_style.as_deref() == Some(label) {
            self.default_throwing_style = None;
        }
        Ok(())
    }

    pub fn set_default_throwing_style(&mut self, label: &str) -> Result<(), SettingsError> {
        if !self.throwing_styles.iter().any(|s| s == label) {
            return Err(SettingsError::UnknownLabel(label.to_string()));
        }
        self.default_throwing_style = Some(label.to_string());
        Ok(())
    }
}

/// Source of settings handed to the tracker and the CLI
pub trait SettingsStore {
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings) -> Result<(), SettingsError>;
}

/// Settings persisted as pretty JSON
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::settings_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileSettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> Settings {
        let Ok(bytes) = fs::read(&self.path) else {
            return Settings::default();
        };
        match serde_json::from_slice::<Settings>(&bytes) {
            Ok(settings) => settings.normalized(),
            Err(e) => {
                warn!(
                    "ignoring malformed settings at {}: {e}",
                    self.path.display()
                );
                Settings::default()
            }
        }
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let data = serde_json::to_vec_pretty(settings).map_err(std::io::Error::from)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

/// Fixed settings, for tests and scripted runs
#[derive(Debug, Clone, Default)]
pub struct StaticSettings(pub Settings);

impl SettingsStore for StaticSettings {
    fn load(&self) -> Settings {
        self.0.clone()
    }

    fn save(&self, _settings: &Settings) -> Result<(), SettingsError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_settings() {
        let dir = tempdir().unwrap();
        let store = FileSettingsStore::with_path(dir.path().join("settings.json"));
        let settings = Settings::default();
        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn save_and_load_custom_settings() {
        let dir = tempdir().unwrap();
        let store = FileSettingsStore::with_path(dir.path().join("cfg").join("settings.json"));
        let settings = Settings {
            bag_types: vec!["Default".into(), "Reactor".into(), "Onyx".into()],
            default_bag_type: "Onyx".into(),
            throwing_styles: vec!["Flat".into(), "Spin".into()],
            default_throwing_style: Some("Spin".into()),
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn uses_flat_string_keys() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(json["CornholeBagTypes"][0], "Default");
        assert_eq!(json["DefaultBagType"], "Default");
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let store = FileSettingsStore::with_path(dir.path().join("nope.json"));
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn malformed_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, b"{not json").unwrap();
        assert_eq!(FileSettingsStore::with_path(&path).load(), Settings::default());
    }

    #[test]
    fn partial_file_is_normalized() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, br#"{"CornholeBagTypes": ["Reactor"], "DefaultBagType": "Gone"}"#).unwrap();
        let settings = FileSettingsStore::with_path(&path).load();
        assert_eq!(settings.bag_types, vec!["Default", "Reactor"]);
        assert_eq!(settings.default_bag_type, "Default");
        assert!(settings.throwing_styles.is_empty());
    }

    #[test]
    fn add_bag_type_ignores_blank_and_duplicates() {
        let mut settings = Settings::default();
        assert!(settings.add_bag_type(" Reactor "));
        assert!(!settings.add_bag_type("Reactor"));
        assert!(!settings.add_bag_type("   "));
        assert_eq!(settings.bag_types, vec!["Default", "Reactor"]);
    }

    #[test]
    fn default_bag_type_cannot_be_removed() {
        let mut settings = Settings::default();
        assert_matches!(
            settings.remove_bag_type(DEFAULT_BAG_TYPE),
            Err(SettingsError::ProtectedLabel(_))
        );
    }

    #[test]
    fn removing_current_default_resets_it() {
        let mut settings = Settings::default();
        settings.add_bag_type("Onyx");
        settings.set_default_bag_type("Onyx").unwrap();
        settings.remove_bag_type("Onyx").unwrap();
        assert_eq!(settings.default_bag_type, DEFAULT_BAG_TYPE);
        assert_matches!(
            settings.remove_bag_type("Onyx"),
            Err(SettingsError::UnknownLabel(_))
        );
    }

    #[test]
    fn default_must_be_known() {
        let mut settings = Settings::default();
        assert_matches!(
            settings.set_default_bag_type("Mystery"),
            Err(SettingsError::UnknownLabel(_))
        );
        assert_matches!(
            settings.set_default_throwing_style("Spin"),
            Err(SettingsError::UnknownLabel(_))
        );
    }

    #[test]
    fn throwing_style_management() {
        let mut settings = Settings::default();
        assert!(settings.add_throwing_style("Spin"));
        settings.set_default_throwing_style("Spin").unwrap();
        assert_eq!(settings.default_throwing_style.as_deref(), Some("Spin"));
        settings.remove_throwing_style("Spin").unwrap();
        assert_eq!(settings.default_throwing_style, None);
        assert!(settings.throwing_styles.is_empty());
    }
}
