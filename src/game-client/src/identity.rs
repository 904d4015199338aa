use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use common::{
    error::{ClientError, Result},
    model::messages::PlayerId,
};
use tracing::{debug, info};
use uuid::Uuid;

pub const PLAYER_ID_KEY: &str = "ghPlayerId";

/// Persisted string settings.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// Key/value pairs kept in a JSON object on disk, rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl FileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let text = fs::read_to_string(&path).map_err(|e| storage_error(&path, e))?;
            serde_json::from_str(&text).map_err(|e| storage_error(&path, e))?
        } else {
            HashMap::new()
        };
        debug!("Opened identity store {}", path.display());
        Ok(FileStore { path, values })
    }

    fn flush(&self) -> Result<()> {
        let text =
            serde_json::to_string_pretty(&self.values).map_err(|e| storage_error(&self.path, e))?;
        fs::write(&self.path, text).map_err(|e| storage_error(&self.path, e))
    }
}

fn storage_error(path: &Path, error: impl std::fmt::Display) -> ClientError {
    ClientError::Storage(format!("{}: {}", path.display(), error))
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_owned(), value.to_owned());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Who the local player is. Knows nothing about the protocol.
pub struct IdentityProvider {
    store: Box<dyn KeyValueStore>,
}

impl IdentityProvider {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        IdentityProvider {
            store: Box::new(store),
        }
    }

    pub fn player_id(&self) -> Option<PlayerId> {
        self.store.get(PLAYER_ID_KEY)
    }

    pub fn require(&self) -> Result<PlayerId> {
        self.player_id().ok_or(ClientError::NotLoggedIn)
    }

    pub fn login(&mut self, player_id: &str) -> Result<PlayerId> {
        let trimmed = player_id.trim();
        if trimmed.is_empty() {
            return Err(ClientError::InvalidCommand("player id cannot be empty".into()));
        }
        self.store.set(PLAYER_ID_KEY, trimmed)?;
        info!("Logged in as {}", trimmed);
        Ok(trimmed.to_owned())
    }

    pub fn logout(&mut self) -> Result<()> {
        self.store.remove(PLAYER_ID_KEY)
    }

    /// The persisted id, or else whatever `prompt` answers (trimmed, persisted). `None` when
    /// nothing is stored and the prompt gives no usable answer.
    pub fn resolve<F>(&mut self, prompt: F) -> Result<Option<PlayerId>>
    where
        F: FnOnce() -> Option<String>,
    {
        if let Some(player_id) = self.player_id() {
            return Ok(Some(player_id));
        }
        match prompt() {
            Some(answer) if !answer.trim().is_empty() => self.login(&answer).map(Some),
            _ => Ok(None),
        }
    }

    /// Log in under a generated name, for unattended clients.
    pub fn guest(&mut self) -> Result<PlayerId> {
        let id = Uuid::new_v4().simple().to_string();
        self.login(&format!("guest-{}", &id[..8]))
    }
}
