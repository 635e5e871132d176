//! Append-only commit log.
//!
//! Commits between two snapshots append one record each to `segments.log`,
//! synced before the change becomes visible. Opening a store replays the
//! records newer than its snapshot; the log is emptied once a fresh snapshot
//! covers it.
//!
//! ```text
//! record: generation u64 LE | body_len u32 LE | body: bincode Change
//! ```
//!
//! A record cut short by a crash was never committed and is dropped on replay.

use super::segment::Change;
use crate::error::{Result, TierGridError};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Name of the commit log inside the storage directory.
pub const COMMIT_LOG_FILE_NAME: &str = "segments.log";

const RECORD_HEADER_LEN: u64 = 12;

#[derive(Debug)]
pub struct CommitLog {
    file: File,
    path: PathBuf,
    size: u64,
}

impl CommitLog {
    /// Open or create the log inside `dir`.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let path = dir.as_ref().join(COMMIT_LOG_FILE_NAME);
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;
        let size = file.metadata()?.len();

        Ok(Self { file, path, size })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes of complete records in the log.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Append `change` as `generation` and sync it.
    ///
    /// On failure the log is truncated back to its last complete record.
    pub fn append(&mut self, generation: u64, change: &Change) -> Result<()> {
        let body = bincode::serialize(change)?;
        let body_len = u32::try_from(body.len()).map_err(|_| {
            TierGridError::InvalidInput(format!(
                "commit of {} bytes exceeds the log record limit",
                body.len()
            ))
        })?;

        let mut record = Vec::with_capacity(RECORD_HEADER_LEN as usize + body.len());
        record.extend_from_slice(&generation.to_le_bytes());
        record.extend_from_slice(&body_len.to_le_bytes());
        record.extend_from_slice(&body);

        if let Err(e) = self.write_record(&record) {
            if let Err(rollback) = self.file.set_len(self.size) {
                log::warn!(
                    "Failed to truncate partial record in {}: {}",
                    self.path.display(),
                    rollback
                );
            }
            return Err(e);
        }

        self.size += record.len() as u64;
        Ok(())
    }

    /// Every complete record in append order, as `(generation, change)`.
    ///
    /// A torn record at the tail is cut off so later appends follow the last
    /// complete one.
    pub fn replay(&mut self) -> Result<Vec<(u64, Change)>> {
        let file_len = self.file.metadata()?.len();
        self.file.seek(SeekFrom::Start(0))?;

        let mut records = Vec::new();
        let mut valid_len = 0u64;
        {
            let mut reader = BufReader::new(&mut self.file);
            loop {
                let mut header = [0u8; RECORD_HEADER_LEN as usize];
                if !read_or_eof(&mut reader, &mut header)? {
                    break;
                }

                let mut generation = [0u8; 8];
                generation.copy_from_slice(&header[..8]);
                let mut body_len = [0u8; 4];
                body_len.copy_from_slice(&header[8..]);
                let body_len = u32::from_le_bytes(body_len) as u64;

                if valid_len + RECORD_HEADER_LEN + body_len > file_len {
                    break;
                }

                let mut body = vec![0u8; body_len as usize];
                if !read_or_eof(&mut reader, &mut body)? {
                    break;
                }

                let change: Change = bincode::deserialize(&body)?;
                records.push((u64::from_le_bytes(generation), change));
                valid_len += RECORD_HEADER_LEN + body_len;
            }
        }

        if valid_len < file_len {
            log::warn!(
                "Dropping {} bytes of incomplete commit record from {}",
                file_len - valid_len,
                self.path.display()
            );
            self.file.set_len(valid_len)?;
            self.file.sync_all()?;
        }
        self.size = valid_len;

        Ok(records)
    }

    /// Empty the log once a snapshot covers every record in it.
    pub fn reset(&mut self) -> Result<()> {
        self.file.set_len(0)?;
        self.file.sync_all()?;
        self.size = 0;
        Ok(())
    }

    fn write_record(&mut self, record: &[u8]) -> Result<()> {
        self.file.write_all(record)?;
        self.file.sync_data()?;
        Ok(())
    }
}

/// Fill `buf`, or return `false` if the reader ends first.
fn read_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<bool> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::document::Document;
    use tempfile::TempDir;

    fn upsert(ids: &[&str]) -> Change {
        Change::Upsert(
            ids.iter()
                .map(|id| Document::new(*id).with_keyword("metafile", "doc"))
                .collect(),
        )
    }

    #[test]
    fn test_append_and_replay() {
        let dir = TempDir::new().unwrap();
        let mut log = CommitLog::open(dir.path()).unwrap();
        assert_eq!(log.size(), 0);

        log.append(1, &upsert(&["a", "b"])).unwrap();
        log.append(2, &Change::Remove("a".into())).unwrap();
        log.append(3, &Change::Clear).unwrap();
        drop(log);

        let mut log = CommitLog::open(dir.path()).unwrap();
        let records = log.replay().unwrap();
        assert_eq!(
            records,
            vec![
                (1, upsert(&["a", "b"])),
                (2, Change::Remove("a".into())),
                (3, Change::Clear),
            ]
        );
    }

    #[test]
    fn test_torn_tail_is_dropped() {
        let dir = TempDir::new().unwrap();
        let mut log = CommitLog::open(dir.path()).unwrap();
        log.append(1, &upsert(&["a"])).unwrap();
        let complete = log.size();
        drop(log);

        // Header announcing 100 body bytes, followed by only 3 of them.
        let mut raw = OpenOptions::new()
            .append(true)
            .open(dir.path().join(COMMIT_LOG_FILE_NAME))
            .unwrap();
        raw.write_all(&2u64.to_le_bytes()).unwrap();
        raw.write_all(&100u32.to_le_bytes()).unwrap();
        raw.write_all(&[1, 2, 3]).unwrap();
        drop(raw);

        let mut log = CommitLog::open(dir.path()).unwrap();
        assert_eq!(log.replay().unwrap().len(), 1);
        assert_eq!(log.size(), complete);

        log.append(2, &Change::Clear).unwrap();
        let records = log.replay().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], (2, Change::Clear));
    }

    #[test]
    fn test_reset_empties_log() {
        let dir = TempDir::new().unwrap();
        let mut log = CommitLog::open(dir.path()).unwrap();
        log.append(1, &upsert(&["a"])).unwrap();

        log.reset().unwrap();
        assert_eq!(log.size(), 0);
        assert!(log.replay().unwrap().is_empty());
        assert_eq!(std::fs::metadata(log.path()).unwrap().len(), 0);
    }
}
