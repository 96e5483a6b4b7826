//! Filesystem store: one file per key in a flat directory.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::Store;
use crate::key::StoreKey;
use crate::{Error, Result};

#[cfg(unix)]
const DIR_MODE: u32 = 0o700;
#[cfg(unix)]
const FILE_MODE: u32 = 0o600;

/// Records stored as files named by the base32 key.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Opens the store at `root`, creating the directory (mode 0700) if it
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the directory cannot be created.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(DIR_MODE);
        builder.create(&root).await.map_err(|source| Error::Io {
            op: "create store",
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    /// Returns the store directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the path a record for `key` is stored at.
    #[must_use]
    pub fn path_for(&self, key: &StoreKey) -> PathBuf {
        self.root.join(key.to_string())
    }

    async fn write_new(path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(FILE_MODE);
        let mut file = options.open(path).await?;
        file.write_all(contents).await?;
        file.sync_all().await
    }
}

#[async_trait]
impl Store for FsStore {
    async fn exists(&self, key: &StoreKey) -> Result<bool> {
        let path = self.path_for(key);
        fs::try_exists(&path).await.map_err(|source| Error::Io {
            op: "stat record",
            path,
            source,
        })
    }

    async fn write(&self, key: &StoreKey, contents: &[u8]) -> Result<()> {
        let path = self.path_for(key);
        let temp = self.root.join(format!(".{key}.tmp"));

        if let Err(source) = Self::write_new(&temp, contents).await {
            let _ = fs::remove_file(&temp).await;
            return Err(Error::Io {
                op: "write record",
                path: temp,
                source,
            });
        }
        if let Err(source) = fs::rename(&temp, &path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(Error::Io {
                op: "rename record",
                path,
                source,
            });
        }

        tracing::trace!(path = %path.display(), bytes = contents.len(), "record written");
        Ok(())
    }
}
