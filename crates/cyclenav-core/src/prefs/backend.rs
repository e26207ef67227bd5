//! Storage backends for the preference store.
//!
//! A backend is a flat string-to-string map, the same model as browser
//! cookies. Typing and validation live one level up in
//! [`PreferenceStore`](crate::prefs::store::PreferenceStore).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};

/// Raw key/value persistence.
pub trait PreferenceBackend {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&mut self, key: &str, value: String) -> CoreResult<()>;
    fn remove(&mut self, key: &str) -> CoreResult<()>;
}

/// Volatile backend, lost when dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    values: BTreeMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PreferenceBackend for MemoryBackend {
    fn read(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: String) -> CoreResult<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> CoreResult<()> {
        self.values.remove(key);
        Ok(())
    }
}

impl<B: PreferenceBackend + ?Sized> PreferenceBackend for Box<B> {
    fn read(&self, key: &str) -> Option<String> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: String) -> CoreResult<()> {
        (**self).write(key, value)
    }

    fn remove(&mut self, key: &str) -> CoreResult<()> {
        (**self).remove(key)
    }
}

/// Backend persisted as a single JSON object on disk.
///
/// The whole file is rewritten on every change.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileBackend {
    /// Opens the store at `path`.
    ///
    /// A missing file yields an empty store. A file that is not a JSON
    /// object of strings is logged and treated as empty; it is replaced on
    /// the next write.
    ///
    /// # Errors
    ///
    /// - [`CoreError::PermissionDenied`] if the file exists but is not readable.
    /// - [`CoreError::Io`] for other read failures.
    pub fn open(path: impl Into<PathBuf>) -> CoreResult<Self> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(values) => values,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring malformed preferences file");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(CoreError::from_io(&path, e)),
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CoreError::from_io(parent, e))?;
        }
        let content = serde_json::to_string_pretty(&self.values)
            .map_err(|e| CoreError::Preference(e.to_string()))?;
        std::fs::write(&self.path, content).map_err(|e| CoreError::from_io(&self.path, e))
    }
}

impl PreferenceBackend for FileBackend {
    fn read(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: String) -> CoreResult<()> {
        self.values.insert(key.to_string(), value);
        self.persist()
    }

    fn remove(&mut self, key: &str) -> CoreResult<()> {
        if self.values.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}
