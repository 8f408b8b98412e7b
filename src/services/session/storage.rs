use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::models::user::User;

/// What survives a restart: the bearer token and the cached profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub user: User,
}

/// Where the session is persisted between runs
pub trait SessionStorage: Send {
    /// `Ok(None)` when nothing is stored; `Err` when stored data is unreadable
    fn load(&self) -> Result<Option<StoredSession>>;
    fn save(&self, session: &StoredSession) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// JSON file in the platform data directory
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/session.json` for this application
    pub fn default_location() -> Result<Self> {
        let dirs = ProjectDirs::from("cl", "BAK", "BAK Clinic")
            .ok_or_else(|| anyhow!("Could not determine data directory"))?;
        Ok(Self::new(dirs.data_dir().join("session.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self) -> Result<Option<StoredSession>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session file {}", self.path.display()))?;
        let session = serde_json::from_str(&contents)
            .with_context(|| format!("Session file {} is corrupt", self.path.display()))?;
        Ok(Some(session))
    }

    fn save(&self, session: &StoredSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create session directory")?;
        }

        let contents = serde_json::to_string(session).context("Failed to serialize session")?;
        fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write session file {}", self.path.display()))?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove session file {}", self.path.display()))?;
        }
        Ok(())
    }
}

/// Process-local storage holding the raw serialized form
#[derive(Default)]
pub struct MemorySessionStorage {
    raw: Mutex<Option<String>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with arbitrary stored text, valid or not
    pub fn with_raw(raw: &str) -> Self {
        Self {
            raw: Mutex::new(Some(raw.to_string())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.raw.lock().ok().and_then(|guard| guard.clone())
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> Result<Option<StoredSession>> {
        let raw = self.raw();
        raw.map(|text| serde_json::from_str(&text).context("Stored session is corrupt"))
            .transpose()
    }

    fn save(&self, session: &StoredSession) -> Result<()> {
        let text = serde_json::to_string(session).context("Failed to serialize session")?;
        let mut guard = self
            .raw
            .lock()
            .map_err(|_| anyhow!("Session storage lock poisoned"))?;
        *guard = Some(text);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self
            .raw
            .lock()
            .map_err(|_| anyhow!("Session storage lock poisoned"))?;
        *guard = None;
        Ok(())
    }
}
