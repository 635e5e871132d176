//! Writer coordination.
//!
//! Concurrent writers share one logical write session. Each writer holds a
//! [`WriteGuard`]; the session is committed when the last guard is released,
//! so a burst of small concurrent writes turns into a single commit.
//!
//! ```text
//! IDLE ──acquire──> WRITING(n) ──release (n > 1)──> WRITING(n - 1)
//!                        │
//!                        └──release (n == 1)──> commit ──> IDLE
//! ```
//!
//! The cost is visibility latency: a fast writer's data is not committed until
//! the slowest concurrent writer finishes.

use crate::error::Result;
use parking_lot::{Condvar, Mutex};

/// Something that can publish the pending writes of a session.
pub trait Commit {
    fn commit(&self) -> Result<()>;
}

/// Counts active writers and commits when the count drops to zero.
#[derive(Debug, Default)]
pub struct WriterCoordinator {
    active: Mutex<usize>,
    idle: Condvar,
}

impl WriterCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_writers(&self) -> usize {
        *self.active.lock()
    }

    /// Register a writer. The session stays open until the returned guard is released.
    pub fn acquire<'a, C: Commit + ?Sized>(&'a self, committer: &'a C) -> WriteGuard<'a, C> {
        *self.active.lock() += 1;
        WriteGuard {
            coordinator: self,
            committer,
            released: false,
        }
    }

    /// Run `f` with writer registration blocked.
    ///
    /// Used for operations that commit on their own (delete, clear) so their
    /// commit cannot interleave with a session commit.
    pub fn exclusive<R>(&self, f: impl FnOnce() -> R) -> R {
        let _active = self.active.lock();
        f()
    }

    /// Block until no writer is active.
    pub fn wait_idle(&self) {
        let mut active = self.active.lock();
        while *active > 0 {
            self.idle.wait(&mut active);
        }
    }

    /// Wait until no writer is active, then run `f` with registration blocked.
    pub fn when_idle<R>(&self, f: impl FnOnce() -> R) -> R {
        let mut active = self.active.lock();
        while *active > 0 {
            self.idle.wait(&mut active);
        }
        f()
    }

    fn release<C: Commit + ?Sized>(&self, committer: &C) -> Result<()> {
        let mut active = self.active.lock();
        *active = active.saturating_sub(1);
        if *active > 0 {
            return Ok(());
        }

        // Commit while still holding the counter so no new writer joins a
        // session that is being published.
        let result = committer.commit();
        self.idle.notify_all();
        result
    }
}

/// Scoped registration of one writer.
///
/// Call [`WriteGuard::finish`] to release and observe the commit result. A
/// guard dropped without `finish` (an early return or a panic) still releases
/// its slot; a failed commit is then only logged.
#[must_use = "dropping the guard releases the writer immediately"]
pub struct WriteGuard<'a, C: Commit + ?Sized> {
    coordinator: &'a WriterCoordinator,
    committer: &'a C,
    released: bool,
}

impl<C: Commit + ?Sized> WriteGuard<'_, C> {
    /// Release this writer, committing if it was the last one.
    pub fn finish(mut self) -> Result<()> {
        self.released = true;
        self.coordinator.release(self.committer)
    }
}

impl<C: Commit + ?Sized> Drop for WriteGuard<'_, C> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.coordinator.release(self.committer) {
            log::warn!("Commit after abandoned write failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TierGridError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[derive(Default)]
    struct CountingCommitter {
        commits: AtomicUsize,
        fail: AtomicBool,
    }

    impl Commit for CountingCommitter {
        fn commit(&self) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(TierGridError::Io(std::io::Error::other("disk full")));
            }
            self.commits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_single_writer_commits_on_finish() {
        let coordinator = WriterCoordinator::new();
        let committer = CountingCommitter::default();

        let guard = coordinator.acquire(&committer);
        assert_eq!(coordinator.active_writers(), 1);
        guard.finish().unwrap();

        assert_eq!(coordinator.active_writers(), 0);
        assert_eq!(committer.commits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_only_last_writer_commits() {
        let coordinator = WriterCoordinator::new();
        let committer = CountingCommitter::default();

        let first = coordinator.acquire(&committer);
        let second = coordinator.acquire(&committer);
        let third = coordinator.acquire(&committer);

        second.finish().unwrap();
        first.finish().unwrap();
        assert_eq!(committer.commits.load(Ordering::SeqCst), 0);

        third.finish().unwrap();
        assert_eq!(committer.commits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dropped_guard_still_releases_and_commits() {
        let coordinator = WriterCoordinator::new();
        let committer = CountingCommitter::default();

        {
            let _guard = coordinator.acquire(&committer);
        }

        assert_eq!(coordinator.active_writers(), 0);
        assert_eq!(committer.commits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_commit_failure_is_returned_and_releases() {
        let coordinator = WriterCoordinator::new();
        let committer = CountingCommitter::default();
        committer.fail.store(true, Ordering::SeqCst);

        let guard = coordinator.acquire(&committer);
        assert!(guard.finish().is_err());
        assert_eq!(coordinator.active_writers(), 0);
    }

    #[test]
    fn test_wait_idle_blocks_until_release() {
        let coordinator = Arc::new(WriterCoordinator::new());
        let committer = Arc::new(CountingCommitter::default());
        let released = Arc::new(AtomicBool::new(false));

        let guard_holder = {
            let coordinator = Arc::clone(&coordinator);
            let committer = Arc::clone(&committer);
            let released = Arc::clone(&released);
            let (tx, rx) = std::sync::mpsc::channel();
            let handle = thread::spawn(move || {
                let guard = coordinator.acquire(committer.as_ref());
                tx.send(()).unwrap();
                thread::sleep(Duration::from_millis(50));
                released.store(true, Ordering::SeqCst);
                guard.finish().unwrap();
            });
            rx.recv().unwrap();
            handle
        };

        coordinator.wait_idle();
        assert!(released.load(Ordering::SeqCst));
        assert_eq!(committer.commits.load(Ordering::SeqCst), 1);
        guard_holder.join().unwrap();
    }

    #[test]
    fn test_when_idle_runs_after_last_release() {
        let coordinator = WriterCoordinator::new();
        let committer = CountingCommitter::default();
        let (tx, rx) = std::sync::mpsc::channel();

        thread::scope(|scope| {
            let guard = coordinator.acquire(&committer);
            scope.spawn(|| {
                let seen = coordinator.when_idle(|| committer.commits.load(Ordering::SeqCst));
                tx.send(seen).unwrap();
            });

            thread::sleep(Duration::from_millis(50));
            assert!(rx.try_recv().is_err());
            guard.finish().unwrap();
        });

        assert_eq!(rx.recv().unwrap(), 1);
    }

    #[test]
    fn test_concurrent_writers_batch_commits() {
        let coordinator = WriterCoordinator::new();
        let committer = CountingCommitter::default();

        thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..100 {
                        coordinator.acquire(&committer).finish().unwrap();
                    }
                });
            }
        });

        let commits = committer.commits.load(Ordering::SeqCst);
        assert!(commits >= 1 && commits <= 800);
        assert_eq!(coordinator.active_writers(), 0);
    }
}
