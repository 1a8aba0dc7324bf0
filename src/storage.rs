use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Small string key/value store for user preferences.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn put(&self, key: &str, value: &str) -> Result<()>;
}

/// Preferences kept as a flat TOML table on disk.
pub struct FilePreferenceStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: tokio::sync::Mutex::new(()) }
    }

    /// `<data dir>/preferences.toml`.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(crate::config::default_preferences_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_raw(&self) -> Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading preferences: {}", self.path.display())),
        }
    }

    async fn read_all(&self) -> Result<BTreeMap<String, String>> {
        match self.read_raw().await? {
            Some(raw) => toml::from_str(&raw).with_context(|| format!("parsing preferences: {}", self.path.display())),
            None => Ok(BTreeMap::new()),
        }
    }
}

#[async_trait]
impl PreferenceStore for FilePreferenceStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all().await?.remove(key))
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut prefs: BTreeMap<String, String> = match self.read_raw().await? {
            Some(raw) => toml::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(path = %self.path.display(), error = %e, "replacing malformed preferences file");
                BTreeMap::new()
            }),
            None => BTreeMap::new(),
        };
        prefs.insert(key.to_string(), value.to_string());
        let body = toml::to_string(&prefs).context("serializing preferences")?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating preferences dir: {}", parent.display()))?;
        }
        let tmp = self.path.with_extension("toml.tmp");
        tokio::fs::write(&tmp, body).await.with_context(|| format!("writing preferences: {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("replacing preferences: {}", self.path.display()))?;
        tracing::debug!(%key, path = %self.path.display(), "preference saved");
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().unwrap_or_else(PoisonError::into_inner).get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner).insert(key.to_string(), value.to_string());
        Ok(())
    }
}
