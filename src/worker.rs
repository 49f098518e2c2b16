//! Async front for the repository.
//!
//! Every repository call blocks on disk I/O. [`RepositoryHandle`] moves
//! each call onto tokio's blocking pool so an async caller (a UI event
//! loop, a server task) never stalls on SQLite. Calls are serialised by a
//! mutex around the single repository instance.

use std::sync::{Arc, Mutex, PoisonError};
use tracing::warn;

use crate::error::{Error, Result};
use crate::model::{SheetRecord, WordEntry};
use crate::repository::{ImportSummary, Repository, SaveOutcome, SheetData};
use crate::storage::deletion::DeletionReport;

/// Cloneable, thread-safe handle to a [`Repository`].
#[derive(Debug, Clone)]
pub struct RepositoryHandle {
    inner: Arc<Mutex<Repository>>,
}

impl RepositoryHandle {
    /// Wrap an open repository.
    #[must_use]
    pub fn new(repository: Repository) -> Self {
        Self {
            inner: Arc::new(Mutex::new(repository)),
        }
    }

    /// Run `f` against the repository on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns an error only if the blocking task panicked or was cancelled.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Repository) -> T + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let mut repository = inner.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut repository)
        })
        .await
        .map_err(|e| Error::Other(format!("Repository task failed: {e}")))
    }

    /// See [`Repository::save`].
    ///
    /// # Errors
    ///
    /// Propagates save errors and worker failures.
    pub async fn save(&self, name: String, entries: Vec<WordEntry>) -> Result<SaveOutcome> {
        self.run(move |repo| repo.save(&name, &entries)).await?
    }

    /// See [`Repository::import`].
    ///
    /// # Errors
    ///
    /// Propagates the first failed save and worker failures.
    pub async fn import(&self, batch: Vec<SheetData>) -> Result<ImportSummary> {
        self.run(move |repo| repo.import(batch)).await?
    }

    /// See [`Repository::list_sheets`].
    pub async fn list_sheets(&self) -> Vec<SheetRecord> {
        self.read(Repository::list_sheets).await
    }

    /// See [`Repository::sheet_exists`].
    pub async fn sheet_exists(&self, name: String) -> bool {
        self.read(move |repo| repo.sheet_exists(&name)).await
    }

    /// See [`Repository::words_for`].
    pub async fn words_for(&self, name: String) -> Vec<WordEntry> {
        self.read(move |repo| repo.words_for(&name)).await
    }

    /// See [`Repository::has_any_sheets`].
    pub async fn has_any_sheets(&self) -> bool {
        self.read(Repository::has_any_sheets).await
    }

    /// See [`Repository::first_word`].
    pub async fn first_word(&self) -> Option<WordEntry> {
        self.read(Repository::first_word).await
    }

    /// See [`Repository::refresh`].
    pub async fn refresh(&self) -> Vec<SheetRecord> {
        self.read(Repository::refresh).await
    }

    /// See [`Repository::clear_cache`].
    pub async fn clear_cache(&self) {
        self.read(Repository::clear_cache).await;
    }

    /// See [`Repository::delete_all`].
    pub async fn delete_all(&self) -> DeletionReport {
        self.read(Repository::delete_all).await
    }

    /// Read paths never fail outward; a failed worker yields the default.
    async fn read<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&mut Repository) -> T + Send + 'static,
        T: Default + Send + 'static,
    {
        self.run(f).await.unwrap_or_else(|e| {
            warn!(error = %e, "Repository task failed");
            T::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use tempfile::TempDir;

    fn handle(temp_dir: &TempDir) -> RepositoryHandle {
        let config = StoreConfig::without_delays(temp_dir.path().join("WordTables"));
        RepositoryHandle::new(Repository::open(config).unwrap())
    }

    fn entry(jp: &str) -> WordEntry {
        WordEntry::new(jp, "中文", "")
    }

    #[tokio::test]
    async fn test_save_and_read_through_handle() {
        let temp_dir = TempDir::new().unwrap();
        let handle = handle(&temp_dir);

        let outcome = handle
            .save("N5".to_string(), vec![entry("猫"), entry("犬")])
            .await
            .unwrap();

        assert_eq!(outcome.word_count, 2);
        assert!(handle.sheet_exists("N5".to_string()).await);
        assert_eq!(handle.words_for("N5".to_string()).await.len(), 2);
        assert_eq!(handle.first_word().await, Some(entry("猫")));
    }

    #[tokio::test]
    async fn test_invalid_name_error_crosses_worker() {
        let temp_dir = TempDir::new().unwrap();
        let handle = handle(&temp_dir);

        let err = handle.save("..".to_string(), vec![entry("猫")]).await.unwrap_err();

        assert!(matches!(err, Error::InvalidSheetName { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_saves_are_serialised() {
        let temp_dir = TempDir::new().unwrap();
        let handle = handle(&temp_dir);

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let handle = handle.clone();
                tokio::spawn(async move {
                    handle
                        .save(format!("Sheet{i}"), vec![entry("語"); i + 1])
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let sheets = handle.list_sheets().await;
        let counts: Vec<_> = sheets.iter().map(|s| s.word_count).collect();
        assert_eq!(counts, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[tokio::test]
    async fn test_delete_all_through_handle() {
        let temp_dir = TempDir::new().unwrap();
        let handle = handle(&temp_dir);
        handle.save("A".to_string(), vec![entry("猫")]).await.unwrap();

        let report = handle.delete_all().await;

        assert!(report.is_complete());
        assert!(!handle.has_any_sheets().await);
    }
}
