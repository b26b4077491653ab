//! The configured storage root and the batch directories below it.

use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::utils::{ConverterError, ConverterResult, RetrievalError, is_strictly_within, resolve_lexically};

/// Directory that owns every batch directory.
///
/// Holds the canonical form of the configured root so that containment
/// checks compare like with like.
#[derive(Debug, Clone)]
pub struct StorageRoot {
    root: PathBuf,
}

/// A freshly allocated, uniquely named directory for one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchDir {
    pub id: String,
    pub path: PathBuf,
}

impl BatchDir {
    /// Whether `name` has the shape `allocate_batch` gives directories:
    /// a UUID in its 32-digit lowercase simple form.
    pub fn is_batch_name(name: &str) -> bool {
        name.len() == 32
            && name.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
            && Uuid::try_parse(name).is_ok()
    }
}

/// Owns a batch directory until it is handed over to expiry.
///
/// Dropping an armed guard removes the directory, so a request that is
/// cancelled mid-batch does not leave its files behind.
#[derive(Debug)]
pub struct BatchGuard {
    batch: BatchDir,
    armed: bool,
}

impl BatchGuard {
    pub fn new(batch: BatchDir) -> Self {
        Self { batch, armed: true }
    }

    /// Releases the directory to the caller, who becomes responsible for it.
    pub fn disarm(mut self) -> BatchDir {
        self.armed = false;
        BatchDir {
            id: std::mem::take(&mut self.batch.id),
            path: std::mem::take(&mut self.batch.path),
        }
    }
}

impl Deref for BatchGuard {
    type Target = BatchDir;

    fn deref(&self) -> &BatchDir {
        &self.batch
    }
}

impl Drop for BatchGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let path = std::mem::take(&mut self.batch.path);
        warn!("Batch {} abandoned, removing {}", self.batch.id, path.display());

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = fs::remove_dir_all(&path).await {
                        warn!("Error removing abandoned batch directory {}: {}", path.display(), e);
                    }
                });
            }
            Err(_) => {
                if let Err(e) = std::fs::remove_dir_all(&path) {
                    warn!("Error removing abandoned batch directory {}: {}", path.display(), e);
                }
            }
        }
    }
}

impl StorageRoot {
    /// Creates the root if needed and canonicalizes it.
    pub async fn open(configured: impl AsRef<Path>) -> ConverterResult<Self> {
        let configured = configured.as_ref();
        fs::create_dir_all(configured).await.map_err(|e| {
            ConverterError::storage(format!(
                "Cannot create storage root {}: {e}",
                configured.display()
            ))
        })?;
        let root = fs::canonicalize(configured).await.map_err(|e| {
            ConverterError::storage(format!(
                "Cannot resolve storage root {}: {e}",
                configured.display()
            ))
        })?;
        debug!("Storage root ready at {}", root.display());
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Allocates a new batch directory named by a random identifier.
    ///
    /// `create_dir` (not `create_dir_all`) fails if the name already exists,
    /// so two batches can never share a directory.
    pub async fn allocate_batch(&self) -> ConverterResult<BatchDir> {
        let id = Uuid::new_v4().simple().to_string();
        let path = self.root.join(&id);
        fs::create_dir(&path).await.map_err(|e| {
            ConverterError::storage(format!("Cannot create batch directory: {e}"))
        })?;
        debug!("Allocated batch directory {}", path.display());
        Ok(BatchDir { id, path })
    }

    /// Maps a client-supplied path to a readable file path inside the root.
    ///
    /// The lexical check runs first and never touches the filesystem, so an
    /// outside path is refused whether or not it exists. The canonical path is
    /// then checked again so symlinks cannot point out of the root.
    pub async fn resolve_download(&self, requested: &str) -> Result<PathBuf, RetrievalError> {
        let base = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        let resolved = resolve_lexically(Path::new(requested), &base);
        if !is_strictly_within(&self.root, &resolved) {
            return Err(RetrievalError::Forbidden);
        }

        let canonical = fs::canonicalize(&resolved).await?;
        if !is_strictly_within(&self.root, &canonical) {
            return Err(RetrievalError::Forbidden);
        }
        Ok(canonical)
    }

    /// Removes batch directories whose modification time is older than
    /// `retention`, returning how many were removed.
    ///
    /// Expiry timers do not survive a restart; this catches what they missed.
    /// Entries not named like a batch are left alone, since the root may be
    /// shared with other programs.
    pub async fn sweep_expired(&self, retention: Duration) -> usize {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot scan storage root {}: {}", self.root.display(), e);
                return 0;
            }
        };

        let now = SystemTime::now();
        let mut removed = 0;
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if !entry.file_name().to_str().is_some_and(BatchDir::is_batch_name) {
                continue;
            }
            let Ok(metadata) = entry.metadata().await else {
                continue;
            };
            if !metadata.is_dir() {
                continue;
            }
            let age = metadata
                .modified()
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .unwrap_or_default();
            if age < retention {
                continue;
            }
            match fs::remove_dir_all(&path).await {
                Ok(()) => removed += 1,
                Err(e) => warn!("Error removing stale batch directory {}: {}", path.display(), e),
            }
        }

        if removed > 0 {
            info!("Swept {} stale batch directories", removed);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn batch_directories_are_unique() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let storage = StorageRoot::open(temp.path().join("root")).await?;

        let first = storage.allocate_batch().await?;
        let second = storage.allocate_batch().await?;
        assert_ne!(first.path, second.path);
        assert!(first.path.is_dir() && second.path.is_dir());
        assert!(first.path.starts_with(storage.path()));
        Ok(())
    }

    #[tokio::test]
    async fn outside_paths_are_forbidden_even_if_missing() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let storage = StorageRoot::open(temp.path()).await?;
        let root = storage.path().display().to_string();

        for requested in [
            "/etc/passwd".to_string(),
            "/definitely/not/here.zip".to_string(),
            format!("{root}/../escape.zip"),
            format!("{root}-sibling/a.zip"),
            root.clone(),
        ] {
            assert!(
                matches!(storage.resolve_download(&requested).await, Err(RetrievalError::Forbidden)),
                "expected 403 for {requested}"
            );
        }
        Ok(())
    }

    #[tokio::test]
    async fn inside_paths_resolve_or_report_unreadable() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let storage = StorageRoot::open(temp.path()).await?;
        let batch = storage.allocate_batch().await?;
        let archive = batch.path.join("desktop_images.zip");
        fs::write(&archive, b"zip").await?;

        let resolved = storage.resolve_download(&archive.display().to_string()).await?;
        assert_eq!(resolved, archive);

        let missing = batch.path.join("mobile_images.zip");
        assert!(matches!(
            storage.resolve_download(&missing.display().to_string()).await,
            Err(RetrievalError::Unreadable { .. })
        ));
        Ok(())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlinks_cannot_escape_the_root() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let outside = temp.path().join("secret.txt");
        fs::write(&outside, b"secret").await?;
        let storage = StorageRoot::open(temp.path().join("root")).await?;
        let link = storage.path().join("link.zip");
        std::os::unix::fs::symlink(&outside, &link)?;

        assert!(matches!(
            storage.resolve_download(&link.display().to_string()).await,
            Err(RetrievalError::Forbidden)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn sweep_keeps_fresh_directories() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let storage = StorageRoot::open(temp.path()).await?;
        let batch = storage.allocate_batch().await?;

        assert_eq!(storage.sweep_expired(Duration::from_secs(3600)).await, 0);
        assert!(batch.path.exists());

        assert_eq!(storage.sweep_expired(Duration::ZERO).await, 1);
        assert!(!batch.path.exists());
        Ok(())
    }

    #[tokio::test]
    async fn sweep_leaves_foreign_directories_alone() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let storage = StorageRoot::open(temp.path()).await?;
        let foreign = storage.path().join("postgres-data");
        fs::create_dir(&foreign).await?;
        fs::write(foreign.join("important.db"), b"rows").await?;
        let uppercase = storage.path().join(Uuid::new_v4().simple().to_string().to_uppercase());
        fs::create_dir(&uppercase).await?;
        let batch = storage.allocate_batch().await?;

        assert_eq!(storage.sweep_expired(Duration::ZERO).await, 1);
        assert!(!batch.path.exists());
        assert!(foreign.join("important.db").exists());
        assert!(uppercase.exists());
        Ok(())
    }

    #[test]
    fn batch_names_are_simple_uuids() {
        assert!(BatchDir::is_batch_name(&Uuid::new_v4().simple().to_string()));
        assert!(!BatchDir::is_batch_name(&Uuid::new_v4().hyphenated().to_string()));
        assert!(!BatchDir::is_batch_name("postgres-data"));
        assert!(!BatchDir::is_batch_name("g0000000000000000000000000000000"));
        assert!(!BatchDir::is_batch_name(""));
    }

    #[tokio::test]
    async fn dropped_guard_removes_the_directory() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let storage = StorageRoot::open(temp.path()).await?;

        let kept = BatchGuard::new(storage.allocate_batch().await?).disarm();
        let abandoned = storage.allocate_batch().await?;
        drop(BatchGuard::new(abandoned.clone()));

        for _ in 0..100 {
            if !abandoned.path.exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(!abandoned.path.exists());
        assert!(kept.path.is_dir());
        Ok(())
    }
}
