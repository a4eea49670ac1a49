//! Tree sync engine
//!
//! The [`TreeSyncEngine`] mirrors a remote container tree onto a local
//! directory, downloading only what is stale.
//!
//! ## Traversal
//!
//! Containers are drained from a [`TraversalQueue`] in discovery order, which
//! makes the walk level-order over the whole tree. For each container:
//!
//! 1. **Listing**: fetch the complete child set
//! 2. **Splitting**: sanitize names, classify children into leaves and
//!    sub-containers, resolve local name collisions
//! 3. **DownloadingLeaves**: stat, classify and write every leaf, bounded by
//!    the run-wide [`ConcurrencyLimiter`]
//! 4. **MaterializingChildDirs**: create a local directory per sub-container
//! 5. **Queued**: append the sub-containers to the traversal queue
//!
//! ## Failure isolation
//!
//! A failed leaf is logged and counted; its siblings carry on. A failed
//! listing abandons that container's subtree. Only an unsupported remote
//! item type aborts the whole run.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use boxmirror_core::config::Config;
use boxmirror_core::domain::{
    classify, disambiguate, leaf_kind_for, sanitize, ItemKind, LeafKind, RemoteId, RemoteItem,
};
use boxmirror_core::ports::{ILocalFileSystem, IRemoteTree};

use crate::limiter::ConcurrencyLimiter;
use crate::queue::{PendingContainer, TraversalQueue};
use crate::writer::ItemWriter;
use crate::SyncError;

// ============================================================================
// Phases and outcomes
// ============================================================================

/// Stage a container is in while the engine works on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerPhase {
    Pending,
    Listing,
    Splitting,
    DownloadingLeaves,
    MaterializingChildDirs,
    Queued,
}

impl fmt::Display for ContainerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Listing => "listing",
            Self::Splitting => "splitting",
            Self::DownloadingLeaves => "downloading-leaves",
            Self::MaterializingChildDirs => "materializing-child-dirs",
            Self::Queued => "queued",
        };
        f.write_str(name)
    }
}

/// What happened to one leaf item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafOutcome {
    /// Written locally; carries the number of bytes written
    Downloaded { bytes: u64 },
    /// Local copy already current
    UpToDate,
    /// Locked on the remote and lock override is off
    SkippedLocked,
}

// ============================================================================
// SyncReport
// ============================================================================

/// Summary of a completed run
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    /// Containers whose listing succeeded
    pub containers_listed: u32,
    /// Containers whose listing failed; their subtrees were not visited
    pub listing_failures: u32,
    /// Leaf items written locally
    pub files_downloaded: u32,
    /// Leaf items whose local copy was already current
    pub up_to_date: u32,
    /// Locked files left alone
    pub skipped_locked: u32,
    /// Leaf items or directories that failed
    pub failed: u32,
    /// One message per failure
    pub errors: Vec<String>,
    /// The run was stopped before the queue drained
    pub cancelled: bool,
    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: u64,
}

impl SyncReport {
    /// True when nothing failed and the run was not cancelled
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.listing_failures == 0 && !self.cancelled
    }

    fn record_failure(&mut self, message: String) {
        self.failed += 1;
        self.errors.push(message);
    }
}

/// A leaf item paired with its local target
struct LeafTask {
    item: RemoteItem,
    leaf: LeafKind,
    target: PathBuf,
}

/// Claims a disambiguated variant of `local_name` that no sibling holds yet
///
/// Tries `_<id>` first, then `_<id>_2`, `_<id>_3` and so on.
fn unclaimed_name(claimed: &mut HashSet<String>, local_name: &str, id: &str) -> String {
    let mut candidate = disambiguate(local_name, id);
    let mut attempt: u32 = 2;
    while !claimed.insert(candidate.clone()) {
        candidate = disambiguate(local_name, &format!("{id}_{attempt}"));
        attempt += 1;
    }
    candidate
}

// ============================================================================
// TreeSyncEngine
// ============================================================================

/// Mirrors a remote container tree onto a local directory
pub struct TreeSyncEngine {
    remote: Arc<dyn IRemoteTree>,
    local: Arc<dyn ILocalFileSystem>,
    writer: ItemWriter,
    limiter: ConcurrencyLimiter,
    unlock_locked_files: bool,
    note_extension: String,
    cancel: CancellationToken,
}

impl TreeSyncEngine {
    /// Creates an engine over the given remote tree and local filesystem
    ///
    /// Uses the `sync` and `notes` sections of `config`.
    pub fn new(
        remote: Arc<dyn IRemoteTree>,
        local: Arc<dyn ILocalFileSystem>,
        config: &Config,
    ) -> Self {
        let writer = ItemWriter::new(
            Arc::clone(&remote),
            Arc::clone(&local),
            config.notes.text_pointer.clone(),
        );
        Self {
            remote,
            local,
            writer,
            limiter: ConcurrencyLimiter::new(config.sync.max_concurrent_downloads),
            unlock_locked_files: config.sync.unlock_locked_files,
            note_extension: config.notes.extension.clone(),
            cancel: CancellationToken::new(),
        }
    }

    /// Replaces the cancellation token, e.g. with one wired to Ctrl+C
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that stops the run before the next container is listed
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Mirrors the tree rooted at `root_id` into `local_root`
    ///
    /// # Errors
    /// Returns an error only for whole-run failures: the local root cannot
    /// be created, or a listing contains an unsupported item type. Item and
    /// listing failures are recorded in the returned [`SyncReport`].
    #[tracing::instrument(skip(self, root_id, local_root), fields(root = %root_id, dest = %local_root.display()))]
    pub async fn run(&self, root_id: &RemoteId, local_root: &Path) -> Result<SyncReport, SyncError> {
        let start = Instant::now();
        let mut report = SyncReport::default();

        info!(
            max_concurrent = self.limiter.max_concurrent(),
            unlock = self.unlock_locked_files,
            "Starting tree sync"
        );

        self.local.create_directory(local_root).await?;

        let mut queue = TraversalQueue::new(root_id.clone(), local_root.to_path_buf());
        let mut visited: HashSet<RemoteId> = HashSet::new();

        while !queue.is_drained() {
            if self.cancel.is_cancelled() {
                warn!(remaining = queue.remaining(), "Sync cancelled");
                report.cancelled = true;
                break;
            }

            let Some((index, container)) = queue.take_next() else {
                break;
            };

            if !visited.insert(container.id.clone()) {
                warn!(id = %container.id, path = %container.local_path.display(), "Container already visited, skipping");
                continue;
            }

            self.process_container(index, &container, &mut queue, &mut report)
                .await?;
        }

        report.duration_ms = start.elapsed().as_millis() as u64;

        if !report.cancelled {
            trace!(containers = queue.len(), "Traversal queue drained");
        }

        info!(
            containers = report.containers_listed,
            downloaded = report.files_downloaded,
            up_to_date = report.up_to_date,
            skipped_locked = report.skipped_locked,
            failed = report.failed,
            listing_failures = report.listing_failures,
            duration_ms = report.duration_ms,
            "Tree sync complete"
        );

        Ok(report)
    }

    async fn process_container(
        &self,
        index: usize,
        container: &PendingContainer,
        queue: &mut TraversalQueue,
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        let id = &container.id;
        let transition = |phase: ContainerPhase| {
            trace!(%id, depth = container.depth, %phase, "Container phase");
        };

        transition(ContainerPhase::Listing);
        let children = match self.remote.list_children(id).await {
            Ok(children) => children,
            Err(source) => {
                let err = SyncError::Listing {
                    container_id: id.to_string(),
                    source,
                };
                error!(path = %container.local_path.display(), error = %err, "Listing failed, skipping subtree");
                report.listing_failures += 1;
                report.errors.push(err.to_string());
                return Ok(());
            }
        };
        report.containers_listed += 1;
        debug!(%id, children = children.len(), "Container listed");

        transition(ContainerPhase::Splitting);
        let (leaves, sub_containers) = self.split(&container.local_path, children)?;

        transition(ContainerPhase::DownloadingLeaves);
        let outcomes = self
            .limiter
            .run_all(leaves, |task| self.sync_leaf_task(task))
            .await;
        for (task, outcome) in outcomes {
            match outcome {
                Ok(LeafOutcome::Downloaded { .. }) => report.files_downloaded += 1,
                Ok(LeafOutcome::UpToDate) => report.up_to_date += 1,
                Ok(LeafOutcome::SkippedLocked) => report.skipped_locked += 1,
                Err(err) => {
                    warn!(id = %task.item.id, path = %task.target.display(), error = %err, "Item failed");
                    report.record_failure(format!("{}: {err}", task.target.display()));
                }
            }
        }

        transition(ContainerPhase::MaterializingChildDirs);
        let mut ready = Vec::with_capacity(sub_containers.len());
        for (child_id, path) in sub_containers {
            match self.local.create_directory(&path).await {
                Ok(()) => ready.push((child_id, path)),
                Err(err) => {
                    error!(id = %child_id, path = %path.display(), error = %err, "Could not create directory, skipping subtree");
                    report.record_failure(format!("{}: {err}", path.display()));
                }
            }
        }

        transition(ContainerPhase::Queued);
        for (child_id, path) in ready {
            trace!(id = %child_id, phase = %ContainerPhase::Pending, "Container discovered");
            queue.push(child_id, path, index);
        }

        Ok(())
    }

    /// Partitions children into leaf tasks and sub-container targets
    fn split(
        &self,
        parent_path: &Path,
        children: Vec<RemoteItem>,
    ) -> Result<(Vec<LeafTask>, Vec<(RemoteId, PathBuf)>), SyncError> {
        let mut claimed: HashSet<String> = HashSet::with_capacity(children.len());
        let mut leaves = Vec::new();
        let mut sub_containers = Vec::new();

        for item in children {
            if let ItemKind::Unsupported(item_type) = &item.kind {
                return Err(SyncError::UnsupportedItemType {
                    item_id: item.id.to_string(),
                    name: item.name.clone(),
                    item_type: item_type.clone(),
                });
            }

            let base = sanitize(&item.name);
            let leaf = leaf_kind_for(&item.kind, &base, &self.note_extension);
            let mut local_name = match leaf {
                Some(kind) => format!("{base}{}", kind.local_suffix()),
                None => base,
            };

            if !claimed.insert(local_name.clone()) {
                let renamed = unclaimed_name(&mut claimed, &local_name, item.id.as_str());
                warn!(
                    id = %item.id,
                    name = %item.name,
                    taken = %local_name,
                    renamed = %renamed,
                    "Local name collision"
                );
                local_name = renamed;
            }

            let target = parent_path.join(&local_name);
            match leaf {
                Some(leaf) => leaves.push(LeafTask { item, leaf, target }),
                None => sub_containers.push((item.id, target)),
            }
        }

        Ok((leaves, sub_containers))
    }

    async fn sync_leaf_task(&self, task: LeafTask) -> (LeafTask, Result<LeafOutcome, SyncError>) {
        let outcome = self.sync_leaf(&task).await;
        (task, outcome)
    }

    async fn sync_leaf(&self, task: &LeafTask) -> Result<LeafOutcome, SyncError> {
        let item = &task.item;
        let local = self.local.stat(&task.target).await?;

        let staleness = classify(&local, item, task.leaf);
        if !staleness.is_stale() {
            debug!(id = %item.id, path = %task.target.display(), "Up to date");
            return Ok(LeafOutcome::UpToDate);
        }

        if task.leaf.has_stream() && item.is_locked() {
            if !self.unlock_locked_files {
                info!(id = %item.id, path = %task.target.display(), "Skipping locked file");
                return Ok(LeafOutcome::SkippedLocked);
            }
            self.remote
                .unlock_file(&item.id)
                .await
                .map_err(|source| SyncError::Remote {
                    item_id: item.id.to_string(),
                    source,
                })?;
            info!(id = %item.id, "Unlocked file");
        }

        let bytes = self.writer.write(item, task.leaf, &task.target).await?;
        info!(
            id = %item.id,
            path = %task.target.display(),
            bytes,
            reason = %staleness,
            "Downloaded"
        );
        Ok(LeafOutcome::Downloaded { bytes })
    }
}
