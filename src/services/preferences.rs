use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::PreferenceError;

pub const THEME_KEY: &str = "theme";
pub const SUPPRESS_DOWNSCALE_KEY: &str = "suppressDownscaleWarning";

/// String key-value preference storage.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, PreferenceError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

/// In-memory preferences, lost on exit.
#[derive(Clone, Default)]
pub struct MemoryPreferences {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(entries: &[(&str, &str)]) -> Self {
        let values = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            values: Arc::new(RwLock::new(values)),
        }
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferences {
    async fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences persisted as a flat JSON object. The file is created on the
/// first write; a missing file reads as empty.
pub struct JsonFilePreferences {
    path: PathBuf,
    lock: RwLock<()>,
}

impl JsonFilePreferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> Result<Map<String, Value>, PreferenceError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(Map::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl PreferenceStore for JsonFilePreferences {
    async fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        let _guard = self.lock.read().await;
        let map = self.read_map().await?;
        Ok(map.get(key).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let _guard = self.lock.write().await;
        let mut map = self.read_map().await?;
        map.insert(key.to_string(), Value::String(value.to_string()));
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let content = serde_json::to_string_pretty(&Value::Object(map))?;
        tokio::fs::write(&self.path, content).await?;
        tracing::debug!(key, path = %self.path.display(), "Saved preference");
        Ok(())
    }
}

/// Colour theme stored under [`THEME_KEY`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Unknown values read as light.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("dark") {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub async fn load(prefs: &dyn PreferenceStore) -> Result<Self, PreferenceError> {
        Ok(prefs
            .get(THEME_KEY)
            .await?
            .map(|v| Theme::parse(&v))
            .unwrap_or_default())
    }

    /// Flip the stored theme and return the new one.
    pub async fn toggle(prefs: &dyn PreferenceStore) -> Result<Self, PreferenceError> {
        let theme = Self::load(prefs).await?.toggled();
        prefs.set(THEME_KEY, theme.as_str()).await?;
        Ok(theme)
    }
}

/// Whether the standing "don't ask about downscaling" flag is set.
pub async fn downscale_suppressed(prefs: &dyn PreferenceStore) -> Result<bool, PreferenceError> {
    Ok(prefs.get(SUPPRESS_DOWNSCALE_KEY).await?.as_deref() == Some("true"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_get_set() {
        let prefs = MemoryPreferences::new();
        assert_eq!(prefs.get(THEME_KEY).await.unwrap(), None);
        prefs.set(THEME_KEY, "dark").await.unwrap();
        assert_eq!(prefs.get(THEME_KEY).await.unwrap().as_deref(), Some("dark"));
    }

    #[tokio::test]
    async fn test_json_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");
        let prefs = JsonFilePreferences::new(&path);

        assert_eq!(prefs.get(THEME_KEY).await.unwrap(), None);
        prefs.set(THEME_KEY, "dark").await.unwrap();
        prefs.set(SUPPRESS_DOWNSCALE_KEY, "true").await.unwrap();

        let reopened = JsonFilePreferences::new(&path);
        assert_eq!(reopened.get(THEME_KEY).await.unwrap().as_deref(), Some("dark"));
        assert!(downscale_suppressed(&reopened).await.unwrap());
    }

    #[tokio::test]
    async fn test_json_file_not_an_object() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "[1, 2]").unwrap();
        let prefs = JsonFilePreferences::new(file.path());
        assert!(matches!(
            prefs.get(THEME_KEY).await,
            Err(PreferenceError::Format(_))
        ));
    }

    #[tokio::test]
    async fn test_suppress_requires_true_string() {
        let prefs = MemoryPreferences::with(&[(SUPPRESS_DOWNSCALE_KEY, "yes")]);
        assert!(!downscale_suppressed(&prefs).await.unwrap());
        prefs.set(SUPPRESS_DOWNSCALE_KEY, "true").await.unwrap();
        assert!(downscale_suppressed(&prefs).await.unwrap());
    }

    #[tokio::test]
    async fn test_theme_toggle_persists() {
        let prefs = MemoryPreferences::new();
        assert_eq!(Theme::load(&prefs).await.unwrap(), Theme::Light);
        assert_eq!(Theme::toggle(&prefs).await.unwrap(), Theme::Dark);
        assert_eq!(prefs.get(THEME_KEY).await.unwrap().as_deref(), Some("dark"));
        assert_eq!(Theme::toggle(&prefs).await.unwrap(), Theme::Light);
    }
}
