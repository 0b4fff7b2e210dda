use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fs4::fs_std::FileExt;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

use crate::audit::OverrideRecord;
use crate::hearing::{CaseId, Hearing};
use crate::util::{blocking, blocking_with_timeout};
use crate::{dlog_debug, dlog_error, dlog_trace, Error, Result};

use super::{HearingStore, ScheduleDocument, ScheduleGuard};

const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(5);

/// Schedule persisted as one JSON document.
///
/// Every commit is read-modify-write of the whole document, replaced with a
/// temp-file rename so a crash mid-write leaves the previous document (plus a
/// `.bak` copy) intact. Processes sharing the document serialise on an
/// advisory lock over `<name>.lock` next to it.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    io_timeout: Duration,
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            io_timeout: DEFAULT_IO_TIMEOUT,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Deadline for reads and for waiting on the schedule lock. Commits are
    /// never cut short.
    pub fn with_io_timeout(mut self, io_timeout: Duration) -> Self {
        self.io_timeout = io_timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lock_path(&self) -> PathBuf {
        self.path.with_extension("json.lock")
    }

    async fn load(&self) -> Result<ScheduleDocument> {
        let path = self.path.clone();
        blocking_with_timeout(self.io_timeout, move || load_document(&path))
            .await
            .map_err(unavailable)
    }
}

/// Raw I/O failures become `StoreUnavailable`; parse errors stay as they are
/// because retrying will not fix a corrupt document.
fn unavailable(err: Error) -> Error {
    match err {
        Error::Io(io) => {
            dlog_error!("JsonFileStore I/O failure: {}", io);
            Error::StoreUnavailable(io.to_string())
        }
        other => other,
    }
}

fn ensure_parent(path: &Path) -> Result<PathBuf> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
            Ok(dir.to_path_buf())
        }
        _ => Ok(PathBuf::from(".")),
    }
}

fn lock_file(path: &Path) -> Result<fs::File> {
    ensure_parent(path)?;
    let file = fs::OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(path)?;
    FileExt::lock_exclusive(&file)?;
    dlog_trace!("Schedule lock held: {}", path.display());
    Ok(file)
}

fn load_document(path: &Path) -> Result<ScheduleDocument> {
    dlog_debug!("JsonFileStore::load path={}", path.display());
    if !path.exists() {
        dlog_debug!("Schedule file not found, starting empty");
        return Ok(ScheduleDocument::new());
    }
    let contents = fs::read_to_string(path)?;
    let document: ScheduleDocument = serde_json::from_str(&contents)?;
    dlog_debug!(
        "Schedule loaded: {} hearings, {} overrides",
        document.hearings.len(),
        document.overrides.len()
    );
    Ok(document)
}

fn save_document(path: &Path, document: &ScheduleDocument) -> Result<()> {
    let dir = ensure_parent(path)?;

    if path.exists() {
        fs::copy(path, path.with_extension("json.bak"))?;
    }

    let mut temp = NamedTempFile::new_in(&dir)?;
    temp.write_all(serde_json::to_string_pretty(document)?.as_bytes())?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    dlog_debug!("Schedule saved: {}", path.display());
    Ok(())
}

#[async_trait]
impl HearingStore for JsonFileStore {
    fn backend_tag(&self) -> &'static str {
        "json-file"
    }

    async fn lock_schedule(&self) -> Result<ScheduleGuard> {
        let path = self.lock_path();
        // A lock granted after the deadline closes with the abandoned task.
        let file = blocking_with_timeout(self.io_timeout, move || lock_file(&path))
            .await
            .map_err(unavailable)?;
        Ok(ScheduleGuard::holding(file))
    }

    async fn schedule(&self) -> Result<Vec<Hearing>> {
        Ok(self.load().await?.hearings)
    }

    async fn find(&self, case_id: &CaseId) -> Result<Option<Hearing>> {
        Ok(self.load().await?.find(case_id).cloned())
    }

    /// Cross-process callers hold `lock_schedule` around this; the gateway
    /// does.
    async fn commit(&self, hearing: Hearing, record: Option<OverrideRecord>) -> Result<()> {
        let guard = Arc::clone(&self.write_lock).lock_owned().await;
        let path = self.path.clone();
        blocking(move || {
            let _guard = guard;
            let mut document = load_document(&path)?;
            document.apply_commit(hearing, record)?;
            save_document(&path, &document)
        })
        .await
        .map_err(unavailable)
    }

    async fn override_records(&self, case_id: Option<&CaseId>) -> Result<Vec<OverrideRecord>> {
        Ok(self.load().await?.overrides_for(case_id))
    }
}
