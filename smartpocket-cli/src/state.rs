use anyhow::{Context, Result};
use smartpocket_core::{
    BudgetRecord, DashboardRecord, Error, MemoryStore, ProgressRecord, RecordStore,
};
use std::fs;
use std::path::{Path, PathBuf};

/// Overrides `~/.smartpocket` when set.
pub const HOME_ENV: &str = "SMARTPOCKET_HOME";

pub fn smartpocket_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(HOME_ENV) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".smartpocket"))
}

pub fn ensure_smartpocket_home() -> Result<PathBuf> {
    let dir = smartpocket_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Record store kept as a single JSON document. Every mutation rewrites the
/// file through a temp file + rename, so a crash never leaves it half written.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonFileStore {
    /// Open the store at `path`; a missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let inner = if path.exists() {
            let s = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
            serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))?
        } else {
            MemoryStore::new()
        };
        log::debug!("opened record store {}", path.display());
        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> smartpocket_core::Result<()> {
        let json = serde_json::to_string_pretty(&self.inner).map_err(|e| Error::store(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::store(format!("create {}: {e}", parent.display())))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| Error::store(format!("write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| Error::store(format!("rename {}: {e}", self.path.display())))
    }
}

impl RecordStore for JsonFileStore {
    fn insert_dashboard(&mut self, record: DashboardRecord) -> smartpocket_core::Result<DashboardRecord> {
        let saved = self.inner.insert_dashboard(record)?;
        self.persist()?;
        Ok(saved)
    }

    fn dashboards(&self, user_id: &str) -> smartpocket_core::Result<Vec<DashboardRecord>> {
        self.inner.dashboards(user_id)
    }

    fn dashboard(&self, id: &str) -> smartpocket_core::Result<Option<DashboardRecord>> {
        self.inner.dashboard(id)
    }

    fn upsert_budget(&mut self, budget: BudgetRecord) -> smartpocket_core::Result<()> {
        self.inner.upsert_budget(budget)?;
        self.persist()
    }

    fn budgets(&self, user_id: &str) -> smartpocket_core::Result<Vec<BudgetRecord>> {
        self.inner.budgets(user_id)
    }

    fn insert_progress(&mut self, record: ProgressRecord) -> smartpocket_core::Result<ProgressRecord> {
        let saved = self.inner.insert_progress(record)?;
        self.persist()?;
        Ok(saved)
    }

    fn progress_records(&self, user_id: &str) -> smartpocket_core::Result<Vec<ProgressRecord>> {
        self.inner.progress_records(user_id)
    }
}
