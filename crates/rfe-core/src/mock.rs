//! Scriptable in-memory remote that records every call.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::entry::Entry;
use crate::error::{RemoteError, RemoteResult};
use crate::path;
use crate::remote::{
    MetaUpdate, MoveReceipt, ProgressFn, RemoteFs, ShareRequest, ShareResponse, StatInfo,
    SystemStats, UploadFile,
};

/// Which remote method a recorded call went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    List,
    Search,
    Read,
    Save,
    Mkdir,
    Rename,
    Delete,
    Move,
    Copy,
    Undo,
    Upload,
    Stat,
    UpdateMeta,
    Download,
    Zip,
    ZipMultiple,
    Pins,
    Pin,
    Unpin,
    Roots,
    Share,
    Stats,
}

/// A recorded remote call.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCall {
    pub kind: CallKind,
    /// Primary path argument (empty for path-less calls).
    pub path: String,
    /// Secondary argument: destination, new name, query, token or relative path.
    pub arg: Option<String>,
}

#[derive(Debug, Default)]
struct MockState {
    listings: HashMap<String, Vec<Entry>>,
    search_results: HashMap<String, Vec<Entry>>,
    files: HashMap<String, String>,
    roots: Vec<String>,
    pins: Vec<String>,
    failures: HashSet<(CallKind, String)>,
    fail_all: HashSet<CallKind>,
    issue_tokens: bool,
    next_token: u64,
    calls: Vec<RemoteCall>,
}

/// In-memory [`RemoteFs`] for tests.
#[derive(Debug)]
pub struct MockRemote {
    state: Mutex<MockState>,
}

impl Default for MockRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRemote {
    /// Create an empty mock that issues undo tokens for moves.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                issue_tokens: true,
                ..Default::default()
            }),
        }
    }

    /// Script the listing of a directory.
    pub fn with_listing(self, dir: &str, entries: Vec<Entry>) -> Self {
        self.set_listing(dir, entries);
        self
    }

    /// Replace the listing of a directory.
    pub fn set_listing(&self, dir: &str, entries: Vec<Entry>) {
        self.state.lock().listings.insert(path::normalize(dir), entries);
    }

    /// Script deep-search results for a directory.
    pub fn with_search(self, dir: &str, results: Vec<Entry>) -> Self {
        self.state
            .lock()
            .search_results
            .insert(path::normalize(dir), results);
        self
    }

    /// Script the text content of a file.
    pub fn with_file(self, file: &str, content: &str) -> Self {
        self.state
            .lock()
            .files
            .insert(path::normalize(file), content.to_string());
        self
    }

    /// Script the drive roots.
    pub fn with_roots(self, roots: &[&str]) -> Self {
        self.state.lock().roots = roots.iter().map(|r| r.to_string()).collect();
        self
    }

    /// Make calls of `kind` on `target` fail.
    pub fn fail(self, kind: CallKind, target: &str) -> Self {
        self.fail_now(kind, target);
        self
    }

    /// Make calls of `kind` on `target` fail from now on.
    pub fn fail_now(&self, kind: CallKind, target: &str) {
        self.state
            .lock()
            .failures
            .insert((kind, path::normalize(target)));
    }

    /// Make every call of `kind` fail.
    pub fn fail_every(self, kind: CallKind) -> Self {
        self.state.lock().fail_all.insert(kind);
        self
    }

    /// Stop issuing undo tokens for moves.
    pub fn without_undo_tokens(self) -> Self {
        self.state.lock().issue_tokens = false;
        self
    }

    /// All recorded calls in order.
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.state.lock().calls.clone()
    }

    /// Recorded calls of one kind in order.
    pub fn calls_of(&self, kind: CallKind) -> Vec<RemoteCall> {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.kind == kind)
            .cloned()
            .collect()
    }

    /// Number of recorded calls of one kind.
    pub fn count(&self, kind: CallKind) -> usize {
        self.state.lock().calls.iter().filter(|c| c.kind == kind).count()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Current pins.
    pub fn pinned(&self) -> Vec<String> {
        self.state.lock().pins.clone()
    }

    /// Saved text content of a file.
    pub fn content_of(&self, file: &str) -> Option<String> {
        self.state.lock().files.get(&path::normalize(file)).cloned()
    }

    fn record(&self, kind: CallKind, target: &str, arg: Option<&str>) -> RemoteResult<()> {
        let mut state = self.state.lock();
        state.calls.push(RemoteCall {
            kind,
            path: target.to_string(),
            arg: arg.map(str::to_string),
        });
        if state.fail_all.contains(&kind)
            || state.failures.contains(&(kind, path::normalize(target)))
        {
            return Err(RemoteError::http(
                500,
                Some(format!("{kind:?} failed for {target}")),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteFs for MockRemote {
    async fn list(&self, dir: &str, only_dirs: bool) -> RemoteResult<Vec<Entry>> {
        self.record(CallKind::List, dir, only_dirs.then_some("only_dirs"))?;
        let state = self.state.lock();
        let entries = state
            .listings
            .get(&path::normalize(dir))
            .ok_or_else(|| RemoteError::NotFound {
                path: dir.to_string(),
            })?;
        Ok(entries
            .iter()
            .filter(|e| !only_dirs || e.is_dir)
            .cloned()
            .collect())
    }

    async fn search(&self, dir: &str, query: &str) -> RemoteResult<Vec<Entry>> {
        self.record(CallKind::Search, dir, Some(query))?;
        Ok(self
            .state
            .lock()
            .search_results
            .get(&path::normalize(dir))
            .cloned()
            .unwrap_or_default())
    }

    async fn read(&self, file: &str) -> RemoteResult<String> {
        self.record(CallKind::Read, file, None)?;
        self.state
            .lock()
            .files
            .get(&path::normalize(file))
            .cloned()
            .ok_or_else(|| RemoteError::NotFound {
                path: file.to_string(),
            })
    }

    async fn save(&self, file: &str, content: &str) -> RemoteResult<()> {
        self.record(CallKind::Save, file, None)?;
        self.state
            .lock()
            .files
            .insert(path::normalize(file), content.to_string());
        Ok(())
    }

    async fn mkdir(&self, dir: &str) -> RemoteResult<()> {
        self.record(CallKind::Mkdir, dir, None)
    }

    async fn rename(&self, target: &str, new_name: &str) -> RemoteResult<()> {
        self.record(CallKind::Rename, target, Some(new_name))
    }

    async fn delete(&self, target: &str) -> RemoteResult<()> {
        self.record(CallKind::Delete, target, None)
    }

    async fn move_to(&self, source: &str, destination: &str) -> RemoteResult<MoveReceipt> {
        self.record(CallKind::Move, source, Some(destination))?;
        let mut state = self.state.lock();
        let undo_token = if state.issue_tokens {
            state.next_token += 1;
            Some(format!("undo-{}", state.next_token))
        } else {
            None
        };
        Ok(MoveReceipt {
            path: Some(path::join(destination, path::file_name(source))),
            undo_token,
            skipped: false,
        })
    }

    async fn copy_to(&self, source: &str, destination: &str) -> RemoteResult<()> {
        self.record(CallKind::Copy, source, Some(destination))
    }

    async fn undo(&self, token: &str) -> RemoteResult<()> {
        self.record(CallKind::Undo, token, None)
    }

    async fn upload(
        &self,
        dest: &str,
        file: &UploadFile,
        progress: &ProgressFn,
    ) -> RemoteResult<()> {
        let target = path::join(dest, &file.name);
        self.record(CallKind::Upload, &target, file.rel_path.as_deref())?;
        let total = file.len();
        progress(0, total);
        progress(total / 2, total);
        progress(total, total);
        Ok(())
    }

    async fn stat(&self, target: &str) -> RemoteResult<StatInfo> {
        self.record(CallKind::Stat, target, None)?;
        Ok(StatInfo {
            name: path::file_name(target).to_string(),
            path: target.to_string(),
            modified: Some(1_700_000_000.0),
            ..Default::default()
        })
    }

    async fn update_meta(&self, update: &MetaUpdate) -> RemoteResult<()> {
        let arg = update.readonly.map(|r| format!("readonly={r}"));
        self.record(CallKind::UpdateMeta, &update.path, arg.as_deref())
    }

    async fn download(&self, file: &str) -> RemoteResult<Vec<u8>> {
        self.record(CallKind::Download, file, None)?;
        Ok(self
            .state
            .lock()
            .files
            .get(&path::normalize(file))
            .map(|c| c.clone().into_bytes())
            .unwrap_or_default())
    }

    async fn zip(&self, dir: &str, fast: bool) -> RemoteResult<Vec<u8>> {
        self.record(CallKind::Zip, dir, fast.then_some("fast"))?;
        Ok(b"PK".to_vec())
    }

    async fn zip_multiple(&self, paths: &[String]) -> RemoteResult<Vec<u8>> {
        let joined = paths.join("|");
        self.record(CallKind::ZipMultiple, &joined, None)?;
        Ok(b"PK".to_vec())
    }

    async fn pins(&self) -> RemoteResult<Vec<String>> {
        self.record(CallKind::Pins, "", None)?;
        Ok(self.state.lock().pins.clone())
    }

    async fn pin(&self, target: &str) -> RemoteResult<()> {
        self.record(CallKind::Pin, target, None)?;
        let mut state = self.state.lock();
        if !state.pins.iter().any(|p| path::same_path(p, target)) {
            state.pins.push(target.to_string());
        }
        Ok(())
    }

    async fn unpin(&self, target: &str) -> RemoteResult<()> {
        self.record(CallKind::Unpin, target, None)?;
        self.state
            .lock()
            .pins
            .retain(|p| !path::same_path(p, target));
        Ok(())
    }

    async fn roots(&self) -> RemoteResult<Vec<String>> {
        self.record(CallKind::Roots, "", None)?;
        Ok(self.state.lock().roots.clone())
    }

    async fn create_share(&self, request: &ShareRequest) -> RemoteResult<ShareResponse> {
        self.record(CallKind::Share, &request.path, None)?;
        Ok(ShareResponse {
            url: format!("http://mock/shared.html?token=share-{}", request.path.len()),
            expires_at: request
                .expires_hours
                .map(|hours| 1_700_000_000.0 + hours * 3600.0),
        })
    }

    async fn monitor_stats(&self, target: &str) -> RemoteResult<SystemStats> {
        self.record(CallKind::Stats, target, None)?;
        Ok(SystemStats {
            cpu_percent: 12.5,
            memory_percent: 40.0,
            memory_used: 4 * 1024 * 1024 * 1024,
            memory_total: 16 * 1024 * 1024 * 1024,
            disk_percent: 70.0,
            disk_free: 100 * 1024 * 1024 * 1024,
            disk_total: 500 * 1024 * 1024 * 1024,
        })
    }

    fn resource_url(&self, target: &str) -> String {
        format!("http://mock/api/open?path={target}")
    }
}
