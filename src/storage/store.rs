//! Index store with explicit commit visibility.
//!
//! Writers stage documents in a pending set. Nothing they write is visible to
//! queries until the session commits, which happens when the last concurrent
//! writer finishes (see [`super::coordination`]). A commit applies only the
//! staged documents to the committed segment. Deletes and clears commit on
//! their own and never publish documents that are still staged.
//!
//! Readers are snapshots of one committed generation and are reopened lazily
//! after each commit. The committed segment is shared with live readers; a
//! commit copies it only while a reader of the previous generation is still
//! held.
//!
//! Lock order: writer coordinator, pending set, reader cache, committed
//! generation. The persistence lock is taken last and held alone.

use super::commit_log::CommitLog;
use super::coordination::{Commit, WriteGuard, WriterCoordinator};
use super::document::Document;
use super::filter::Filter;
use super::segment::{Change, Segment};
use super::snapshot::SegmentFile;
use crate::error::{Result, TierGridError};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Log size below which the log is never folded into a new snapshot.
const MIN_COMPACTION_BYTES: u64 = 1 << 20;

/// Read-only view of one committed generation.
#[derive(Debug)]
pub struct IndexReader {
    generation: u64,
    segment: Arc<Segment>,
}

impl IndexReader {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.segment.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segment.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.segment.get(id)
    }

    pub fn search(&self, filter: &Filter, limit: usize) -> Vec<&Document> {
        self.segment.search(filter, limit)
    }

    pub fn count(&self, filter: &Filter) -> usize {
        self.segment.count(filter)
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.segment.documents()
    }
}

/// Point-in-time counters for an [`IndexStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    /// Documents in the committed generation.
    pub document_count: usize,
    pub generation: u64,
    /// Commits performed since the store was opened.
    pub commits: u64,
    pub active_writers: usize,
}

#[derive(Debug)]
struct Committed {
    generation: u64,
    segment: Arc<Segment>,
}

/// Snapshot file plus the commit log that extends it.
#[derive(Debug)]
struct Persistence {
    snapshot: SegmentFile,
    log: CommitLog,
    snapshot_bytes: u64,
    min_compaction_bytes: u64,
}

impl Persistence {
    /// The log has outgrown the snapshot it extends.
    fn should_compact(&self) -> bool {
        self.log.size() >= self.min_compaction_bytes.max(self.snapshot_bytes)
    }

    /// Write `segment` as the new snapshot and empty the log.
    fn compact(&mut self, segment: &Segment, generation: u64) -> Result<()> {
        let log_bytes = self.log.size();
        self.snapshot_bytes = self.snapshot.save(segment, generation)?;
        self.log.reset()?;
        log::debug!(
            "Folded {} log bytes into snapshot generation {} ({} bytes)",
            log_bytes,
            generation,
            self.snapshot_bytes
        );
        Ok(())
    }
}

/// Document store shared by all writers and readers of one index.
///
/// `IndexStore` is `Send + Sync`; share it behind an `Arc` or by reference.
#[derive(Debug)]
pub struct IndexStore {
    dir: Option<PathBuf>,
    persistence: Option<Mutex<Persistence>>,
    pending: Mutex<BTreeMap<String, Document>>,
    committed: RwLock<Committed>,
    reader: Mutex<Option<Arc<IndexReader>>>,
    closed: AtomicBool,
    commits: AtomicU64,
    writers: WriterCoordinator,
}

impl IndexStore {
    /// Open or create a store in directory `path`, loading its last committed generation.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_compaction(path.as_ref(), MIN_COMPACTION_BYTES)
    }

    fn open_with_compaction(dir: &Path, min_compaction_bytes: u64) -> Result<Self> {
        if dir.exists() && !dir.is_dir() {
            return Err(TierGridError::InvalidInput(format!(
                "storage path {} exists and is not a directory",
                dir.display()
            )));
        }
        std::fs::create_dir_all(dir)?;

        let snapshot = SegmentFile::in_dir(dir);
        let (mut generation, mut segment) = match snapshot.load()? {
            Some(loaded) => {
                log::debug!(
                    "Loaded snapshot generation {} written at {:?}",
                    loaded.generation,
                    loaded.committed_at
                );
                (loaded.generation, Segment::from_documents(loaded.documents))
            }
            None => (0, Segment::new()),
        };
        let snapshot_bytes = snapshot.size()?;

        let mut log = CommitLog::open(dir)?;
        let mut replayed = 0usize;
        for (record_generation, change) in log.replay()? {
            if record_generation <= generation {
                continue;
            }
            if record_generation != generation + 1 {
                return Err(TierGridError::InvalidFormat(format!(
                    "{} skips from generation {} to {}",
                    log.path().display(),
                    generation,
                    record_generation
                )));
            }
            segment.apply(change);
            generation = record_generation;
            replayed += 1;
        }

        log::info!(
            "Opened index store at {} (generation {}, {} documents, {} log records replayed)",
            dir.display(),
            generation,
            segment.len(),
            replayed
        );

        let persistence = Persistence {
            snapshot,
            log,
            snapshot_bytes,
            min_compaction_bytes,
        };
        Ok(Self::with_state(
            Some(dir.to_path_buf()),
            Some(persistence),
            generation,
            segment,
        ))
    }

    /// Store that lives only in memory.
    pub fn memory() -> Self {
        Self::with_state(None, None, 0, Segment::new())
    }

    fn with_state(
        dir: Option<PathBuf>,
        persistence: Option<Persistence>,
        generation: u64,
        segment: Segment,
    ) -> Self {
        Self {
            dir,
            persistence: persistence.map(Mutex::new),
            pending: Mutex::new(BTreeMap::new()),
            committed: RwLock::new(Committed {
                generation,
                segment: Arc::new(segment),
            }),
            reader: Mutex::new(None),
            closed: AtomicBool::new(false),
            commits: AtomicU64::new(0),
            writers: WriterCoordinator::new(),
        }
    }

    /// Storage directory, if the store is disk-backed.
    pub fn path(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Insert or replace one document. It becomes visible when the write session commits.
    pub fn upsert(&self, doc: Document) -> Result<()> {
        self.ensure_open()?;
        let guard = self.writers.acquire(self);
        self.stage(doc);
        guard.finish()
    }

    /// Insert or replace a batch of documents as a single writer.
    pub fn upsert_all(&self, docs: impl IntoIterator<Item = Document>) -> Result<()> {
        self.ensure_open()?;
        let guard = self.writers.acquire(self);
        for doc in docs {
            self.stage(doc);
        }
        guard.finish()
    }

    /// Open a writer that stays registered until [`IndexWriter::finish`] or drop.
    pub fn writer(&self) -> Result<IndexWriter<'_>> {
        self.ensure_open()?;
        Ok(IndexWriter {
            store: self,
            guard: self.writers.acquire(self),
        })
    }

    /// Delete a document by id.
    ///
    /// A committed document is deleted in a commit of its own, which publishes
    /// nothing else. A staged write for the same id is dropped, so an open
    /// writer's later commit does not bring the document back. Returns whether
    /// a committed or staged document was removed.
    pub fn remove(&self, id: &str) -> Result<bool> {
        self.ensure_open()?;
        self.writers.exclusive(|| {
            let committed = self.committed.read().segment.get(id).is_some();
            if committed {
                self.publish(Change::Remove(id.to_string()))?;
            }
            let staged = self.pending.lock().remove(id).is_some();
            Ok(committed || staged)
        })
    }

    /// Delete every committed document in a commit of its own.
    ///
    /// Documents staged by open writers are kept and become visible when
    /// their session commits.
    pub fn clear_all(&self) -> Result<()> {
        self.ensure_open()?;
        self.writers.exclusive(|| self.publish(Change::Clear))?;
        log::info!("Cleared index store");
        Ok(())
    }

    /// Current reader, reopened if a commit happened since it was last opened.
    pub fn reader(&self) -> Result<Arc<IndexReader>> {
        self.ensure_open()?;
        let mut cache = self.reader.lock();
        if let Some(reader) = cache.as_ref() {
            return Ok(Arc::clone(reader));
        }

        let committed = self.committed.read();
        let reader = Arc::new(IndexReader {
            generation: committed.generation,
            segment: Arc::clone(&committed.segment),
        });
        *cache = Some(Arc::clone(&reader));
        Ok(reader)
    }

    /// Committed documents matching `filter`, at most `limit`, in id order.
    pub fn query(&self, filter: &Filter, limit: usize) -> Result<Vec<Document>> {
        let reader = self.reader()?;
        Ok(reader.search(filter, limit).into_iter().cloned().collect())
    }

    /// Number of committed documents matching `filter`, without a limit.
    pub fn count(&self, filter: &Filter) -> Result<usize> {
        Ok(self.reader()?.count(filter))
    }

    pub fn get(&self, id: &str) -> Result<Option<Document>> {
        Ok(self.reader()?.get(id).cloned())
    }

    /// Number of committed documents.
    pub fn len(&self) -> usize {
        self.committed.read().segment.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Generation of the last commit. Starts at 0 for a new store.
    pub fn generation(&self) -> u64 {
        self.committed.read().generation
    }

    pub fn stats(&self) -> StoreStats {
        let active_writers = self.writers.active_writers();
        let committed = self.committed.read();
        StoreStats {
            document_count: committed.segment.len(),
            generation: committed.generation,
            commits: self.commits.load(Ordering::Relaxed),
            active_writers,
        }
    }

    /// Block until every open writer has finished and its session has committed.
    pub fn wait_for_writers(&self) {
        self.writers.wait_idle();
    }

    /// Wait for writers, commit anything pending, and refuse further operations.
    ///
    /// A disk-backed store also folds its commit log into a fresh snapshot.
    pub fn close(&self) -> Result<()> {
        if self.is_closed() {
            return Ok(());
        }
        self.writers.when_idle(|| {
            self.commit_pending()?;
            if let Some(persistence) = &self.persistence {
                let (generation, segment) = self.committed_segment();
                let mut persistence = persistence.lock();
                if persistence.log.size() > 0 {
                    persistence.compact(&segment, generation)?;
                }
            }
            self.closed.store(true, Ordering::Release);
            Ok::<(), TierGridError>(())
        })?;
        *self.reader.lock() = None;
        log::debug!("Closed index store at generation {}", self.generation());
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(TierGridError::StoreClosed);
        }
        Ok(())
    }

    fn stage(&self, doc: Document) {
        self.pending.lock().insert(doc.id().to_string(), doc);
    }

    fn committed_segment(&self) -> (u64, Arc<Segment>) {
        let committed = self.committed.read();
        (committed.generation, Arc::clone(&committed.segment))
    }

    /// Publish everything staged as one generation.
    ///
    /// On failure the staged documents are put back for the next commit.
    fn commit_pending(&self) -> Result<()> {
        let staged = std::mem::take(&mut *self.pending.lock());
        if staged.is_empty() {
            return Ok(());
        }

        let change = Change::Upsert(staged.into_values().collect());
        let generation = self.generation() + 1;
        if let Err(e) = self.log_change(generation, &change) {
            if let Change::Upsert(docs) = change {
                let mut pending = self.pending.lock();
                for doc in docs {
                    pending.entry(doc.id().to_string()).or_insert(doc);
                }
            }
            return Err(e);
        }

        self.install(generation, change);
        Ok(())
    }

    /// Publish a change that bypasses the pending set (delete, clear).
    fn publish(&self, change: Change) -> Result<()> {
        let generation = self.generation() + 1;
        self.log_change(generation, &change)?;
        self.install(generation, change);
        Ok(())
    }

    fn log_change(&self, generation: u64, change: &Change) -> Result<()> {
        match &self.persistence {
            Some(persistence) => persistence.lock().log.append(generation, change),
            None => Ok(()),
        }
    }

    /// Apply a durable change to the committed segment as `generation`.
    ///
    /// Callers hold the writer coordinator lock, so installs never overlap.
    fn install(&self, generation: u64, change: Change) {
        // The cached reader goes first: make_mut copies only while some
        // other reader still holds the segment.
        let mut cache = self.reader.lock();
        *cache = None;
        let mut committed = self.committed.write();
        Arc::make_mut(&mut committed.segment).apply(change);
        committed.generation = generation;
        let document_count = committed.segment.len();
        drop(committed);
        drop(cache);

        self.commits.fetch_add(1, Ordering::Relaxed);
        log::debug!(
            "Committed generation {} ({} documents)",
            generation,
            document_count
        );

        self.compact_if_needed();
    }

    fn compact_if_needed(&self) {
        let Some(persistence) = &self.persistence else {
            return;
        };
        let (generation, segment) = self.committed_segment();
        let mut persistence = persistence.lock();
        if !persistence.should_compact() {
            return;
        }
        if let Err(e) = persistence.compact(&segment, generation) {
            log::warn!("Failed to fold commit log into a snapshot: {}", e);
        }
    }
}

impl Commit for IndexStore {
    fn commit(&self) -> Result<()> {
        self.commit_pending()
    }
}

impl Drop for IndexStore {
    fn drop(&mut self) {
        if self.is_closed() {
            return;
        }
        if let Err(e) = self.commit_pending() {
            log::warn!("Failed to commit pending writes on drop: {}", e);
        }
    }
}

/// A registered writer. Its documents are committed once it and every other
/// concurrent writer have finished.
pub struct IndexWriter<'a> {
    store: &'a IndexStore,
    guard: WriteGuard<'a, IndexStore>,
}

impl IndexWriter<'_> {
    pub fn upsert(&self, doc: Document) {
        self.store.stage(doc);
    }

    /// Release the writer, committing if it was the last one open.
    pub fn finish(self) -> Result<()> {
        self.guard.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::tier::BoxId;
    use crate::storage::{COMMIT_LOG_FILE_NAME, SEGMENT_FILE_NAME};
    use tempfile::TempDir;

    fn doc(id: &str) -> Document {
        Document::new(id)
            .with_keyword("metafile", "doc")
            .with_box("_localTier11", BoxId::new(1, 1))
    }

    #[test]
    fn test_upsert_is_visible_after_commit() {
        let store = IndexStore::memory();
        assert_eq!(store.generation(), 0);

        store.upsert(doc("a")).unwrap();

        assert_eq!(store.generation(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("a").unwrap().is_some());
    }

    #[test]
    fn test_open_writer_hides_pending_documents() {
        let store = IndexStore::memory();
        store.upsert(doc("a")).unwrap();

        let writer = store.writer().unwrap();
        writer.upsert(doc("b"));

        // Another writer finishing does not commit while `writer` is open.
        store.upsert(doc("c")).unwrap();
        let reader = store.reader().unwrap();
        assert_eq!(reader.generation(), 1);
        assert!(reader.get("b").is_none());
        assert!(reader.get("c").is_none());

        writer.finish().unwrap();
        assert_eq!(store.generation(), 2);
        assert!(store.get("b").unwrap().is_some());
        assert!(store.get("c").unwrap().is_some());

        // The old reader still sees its own generation.
        assert_eq!(reader.len(), 1);
    }

    #[test]
    fn test_reader_is_cached_until_commit() {
        let store = IndexStore::memory();
        store.upsert(doc("a")).unwrap();

        let first = store.reader().unwrap();
        let second = store.reader().unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        store.upsert(doc("b")).unwrap();
        let third = store.reader().unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.len(), 2);
    }

    #[test]
    fn test_commit_updates_segment_in_place() {
        let store = IndexStore::memory();
        store.upsert(doc("a")).unwrap();
        let before = Arc::as_ptr(&store.reader().unwrap().segment);

        store.upsert(doc("b")).unwrap();
        let after = store.reader().unwrap();
        assert!(std::ptr::eq(before, Arc::as_ptr(&after.segment)));
        assert_eq!(after.len(), 2);

        // A reader still in use keeps its generation; the commit works on a copy.
        store.upsert(doc("c")).unwrap();
        let latest = store.reader().unwrap();
        assert!(!Arc::ptr_eq(&after.segment, &latest.segment));
        assert_eq!(after.len(), 2);
        assert_eq!(latest.len(), 3);
    }

    #[test]
    fn test_remove_commits_and_is_idempotent() {
        let store = IndexStore::memory();
        store.upsert_all([doc("a"), doc("b")]).unwrap();
        assert_eq!(store.generation(), 1);

        assert!(store.remove("a").unwrap());
        assert_eq!(store.generation(), 2);
        assert!(store.get("a").unwrap().is_none());

        assert!(!store.remove("a").unwrap());
        assert_eq!(store.generation(), 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_does_not_publish_staged_documents() {
        let store = IndexStore::memory();
        store.upsert(doc("old")).unwrap();

        let writer = store.writer().unwrap();
        writer.upsert(doc("b1"));
        assert!(store.remove("old").unwrap());

        let reader = store.reader().unwrap();
        assert_eq!(reader.generation(), 2);
        assert!(reader.is_empty());
        assert!(reader.get("b1").is_none());

        writer.upsert(doc("b2"));
        writer.finish().unwrap();
        assert_eq!(store.generation(), 3);
        let ids: Vec<String> = store
            .query(&Filter::All, 10)
            .unwrap()
            .iter()
            .map(|d| d.id().to_string())
            .collect();
        assert_eq!(ids, vec!["b1", "b2"]);
    }

    #[test]
    fn test_remove_drops_staged_write_for_the_same_id() {
        let store = IndexStore::memory();

        let writer = store.writer().unwrap();
        writer.upsert(doc("x"));
        assert!(store.remove("x").unwrap());
        assert_eq!(store.generation(), 0);

        writer.finish().unwrap();
        assert_eq!(store.generation(), 0);
        assert!(store.get("x").unwrap().is_none());
    }

    #[test]
    fn test_clear_keeps_staged_documents() {
        let store = IndexStore::memory();
        store.upsert(doc("a")).unwrap();

        let writer = store.writer().unwrap();
        writer.upsert(doc("b"));
        store.clear_all().unwrap();
        assert!(store.is_empty());
        assert!(store.get("b").unwrap().is_none());

        writer.finish().unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.get("b").unwrap().is_some());
    }

    #[test]
    fn test_clear_all() {
        let store = IndexStore::memory();
        store.upsert_all([doc("a"), doc("b")]).unwrap();

        store.clear_all().unwrap();
        assert!(store.is_empty());
        assert!(store.query(&Filter::All, 10).unwrap().is_empty());
    }

    #[test]
    fn test_query_respects_limit() {
        let store = IndexStore::memory();
        store.upsert_all((0..10).map(|i| doc(&i.to_string()))).unwrap();

        let marker = Filter::term("metafile", "doc");
        assert_eq!(store.query(&marker, 3).unwrap().len(), 3);
        assert_eq!(store.count(&marker).unwrap(), 10);
    }

    #[test]
    fn test_closed_store_rejects_operations() {
        let store = IndexStore::memory();
        store.upsert(doc("a")).unwrap();
        store.close().unwrap();

        assert!(store.is_closed());
        assert!(matches!(store.upsert(doc("b")), Err(TierGridError::StoreClosed)));
        assert!(matches!(store.reader(), Err(TierGridError::StoreClosed)));
        assert!(matches!(store.remove("a"), Err(TierGridError::StoreClosed)));
        assert!(store.close().is_ok());
    }

    #[test]
    fn test_persistence_across_reopen() {
        let dir = TempDir::new().unwrap();

        {
            let store = IndexStore::open(dir.path()).unwrap();
            store.upsert_all([doc("a"), doc("b")]).unwrap();
            store.remove("b").unwrap();
            store.close().unwrap();
        }

        let store = IndexStore::open(dir.path()).unwrap();
        assert_eq!(store.generation(), 2);
        assert_eq!(store.len(), 1);
        let hits = store
            .query(
                &Filter::box_range("_localTier11", crate::compute::tier::BoxRange::new(1..=1, 1..=1)),
                10,
            )
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id(), "a");
    }

    #[test]
    fn test_reopen_replays_commit_log() {
        let dir = TempDir::new().unwrap();

        {
            let store = IndexStore::open(dir.path()).unwrap();
            store.upsert(doc("a")).unwrap();
            store.upsert(doc("b")).unwrap();
            store.remove("a").unwrap();
            // dropped without close: no snapshot, only log records
        }
        assert!(!dir.path().join(SEGMENT_FILE_NAME).exists());

        let store = IndexStore::open(dir.path()).unwrap();
        assert_eq!(store.generation(), 3);
        assert_eq!(store.len(), 1);
        assert!(store.get("b").unwrap().is_some());

        store.upsert(doc("c")).unwrap();
        store.close().unwrap();
        assert_eq!(std::fs::metadata(dir.path().join(COMMIT_LOG_FILE_NAME)).unwrap().len(), 0);
        drop(store);

        let store = IndexStore::open(dir.path()).unwrap();
        assert_eq!(store.generation(), 4);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_commit_log_is_folded_into_snapshot() {
        let dir = TempDir::new().unwrap();

        {
            let store = IndexStore::open_with_compaction(dir.path(), 256).unwrap();
            for i in 0..100 {
                store.upsert(doc(&format!("{:03}", i))).unwrap();
            }

            let snapshot = std::fs::metadata(dir.path().join(SEGMENT_FILE_NAME)).unwrap();
            let log = std::fs::metadata(dir.path().join(COMMIT_LOG_FILE_NAME)).unwrap();
            assert!(log.len() < snapshot.len());
        }

        let store = IndexStore::open(dir.path()).unwrap();
        assert_eq!(store.generation(), 100);
        assert_eq!(store.len(), 100);
    }

    #[test]
    fn test_open_rejects_file_path() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("not_a_dir");
        std::fs::write(&file_path, b"x").unwrap();

        assert!(matches!(
            IndexStore::open(&file_path),
            Err(TierGridError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_stats() {
        let store = IndexStore::memory();
        store.upsert(doc("a")).unwrap();
        store.upsert(doc("b")).unwrap();

        let writer = store.writer().unwrap();
        let stats = store.stats();
        assert_eq!(stats.document_count, 2);
        assert_eq!(stats.generation, 2);
        assert_eq!(stats.commits, 2);
        assert_eq!(stats.active_writers, 1);
        writer.finish().unwrap();
    }

    #[test]
    fn test_stats_while_writers_commit() {
        let store = IndexStore::memory();

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for i in 0..300 {
                    store.upsert(doc(&i.to_string())).unwrap();
                }
            });
            for _ in 0..3 {
                scope.spawn(|| {
                    let mut last = 0;
                    for _ in 0..300 {
                        let stats = store.stats();
                        assert!(stats.generation >= last);
                        assert!(stats.document_count <= 300);
                        last = stats.generation;
                    }
                });
            }
        });

        assert_eq!(store.stats().document_count, 300);
    }

    #[test]
    fn test_concurrent_upserts_all_visible_after_wait() {
        let store = IndexStore::memory();

        std::thread::scope(|scope| {
            for t in 0..4 {
                let store = &store;
                scope.spawn(move || {
                    for i in 0..50 {
                        store.upsert(doc(&format!("{}-{}", t, i))).unwrap();
                    }
                });
            }
        });

        store.wait_for_writers();
        assert_eq!(store.len(), 200);
        assert!(store.generation() >= 1);
    }
}
