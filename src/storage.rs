use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use rand::{rngs::OsRng, RngCore};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{auth::repo_types::UserCollection, error::AppError};

/// File-backed user store. Every call reads the file fresh; there is no cache.
///
/// All access goes through one async mutex so a load → mutate → save cycle
/// can't interleave with another one and drop its write.
#[derive(Clone)]
pub struct UserStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl UserStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the collection. A missing or unparseable file yields an empty one.
    pub async fn load(&self) -> UserCollection {
        self.load_strict().await.unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = ?e, "failed to load users file; using empty collection");
            UserCollection::default()
        })
    }

    /// Like `load`, but only a missing or blank file counts as empty. Anything
    /// else that can't be read or parsed is an error, so a write never
    /// replaces records it couldn't see.
    async fn load_strict(&self) -> anyhow::Result<UserCollection> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "users file not found; starting empty");
                return Ok(UserCollection::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("read {}", self.path.display()));
            }
        };
        if raw.trim().is_empty() {
            return Ok(UserCollection::default());
        }

        serde_json::from_str(&raw).with_context(|| format!("parse {}", self.path.display()))
    }

    /// Overwrites the file with the whole collection, pretty-printed.
    pub async fn save(&self, collection: &UserCollection) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create dir {}", parent.display()))?;
        }

        let payload = serde_json::to_vec_pretty(collection).context("encode users")?;

        let mut suffix = [0u8; 4];
        OsRng.fill_bytes(&mut suffix);
        let tmp = self
            .path
            .with_extension(format!("{}.tmp", hex::encode(suffix)));

        tokio::fs::write(&tmp, payload)
            .await
            .with_context(|| format!("write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("rename {} -> {}", tmp.display(), self.path.display()))?;
        Ok(())
    }

    /// Runs `f` against a freshly loaded collection.
    pub async fn read<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&UserCollection) -> T,
    {
        let _guard = self.lock.lock().await;
        let collection = self.load().await;
        f(&collection)
    }

    /// Load, apply `f`, and save if `f` succeeded, all under the store lock.
    /// Fails without touching the file when the current contents are unreadable.
    pub async fn mutate<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut UserCollection) -> Result<T, AppError>,
    {
        let _guard = self.lock.lock().await;
        let mut collection = self.load_strict().await?;
        let out = f(&mut collection)?;
        self.save(&collection).await?;
        Ok(out)
    }
}
