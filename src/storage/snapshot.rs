//! Segment snapshot persistence.
//!
//! `segments.tgs` holds the full committed segment as of one generation.
//! Commits after it live in the commit log until the next snapshot replaces
//! the file. The file is written to a temporary sibling, synced, and renamed
//! over the previous one, so a reader of the directory always sees one
//! complete snapshot.
//!
//! ```text
//! magic: "TIERGRID_SEGMENTS" (17B)
//! version: u8
//! committed_at: secs u64 LE | nanos u32 LE | reserved u32
//! generation: u64 LE
//! document_count: u64 LE
//! body: bincode Vec<Document>
//! ```

use super::document::Document;
use super::segment::Segment;
use crate::error::{Result, TierGridError};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const SEGMENT_MAGIC: &[u8] = b"TIERGRID_SEGMENTS";
const SEGMENT_VERSION: u8 = 1;

/// Name of the segment file inside the storage directory.
pub const SEGMENT_FILE_NAME: &str = "segments.tgs";

/// Contents of a segment file.
#[derive(Debug)]
pub struct LoadedSegment {
    pub generation: u64,
    pub committed_at: SystemTime,
    pub documents: Vec<Document>,
}

#[derive(Debug)]
pub struct SegmentFile {
    path: PathBuf,
}

impl SegmentFile {
    /// Segment file inside `dir`. The directory is not touched.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            path: dir.as_ref().join(SEGMENT_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Size of the file in bytes, 0 if there is none.
    pub fn size(&self) -> Result<u64> {
        match std::fs::metadata(&self.path) {
            Ok(metadata) => Ok(metadata.len()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    /// Read the last committed generation. A missing or empty file is an empty index.
    pub fn load(&self) -> Result<Option<LoadedSegment>> {
        if !self.exists() {
            return Ok(None);
        }

        let file = File::open(&self.path)?;
        if file.metadata()?.len() == 0 {
            return Ok(None);
        }

        let mut reader = BufReader::new(file);

        let mut magic = vec![0u8; SEGMENT_MAGIC.len()];
        reader.read_exact(&mut magic)?;
        if magic != SEGMENT_MAGIC {
            return Err(TierGridError::InvalidFormat(format!(
                "{} does not start with the segment magic",
                self.path.display()
            )));
        }

        let version = read_u8(&mut reader)?;
        if version != SEGMENT_VERSION {
            return Err(TierGridError::InvalidFormat(format!(
                "unsupported segment version {} (expected {})",
                version, SEGMENT_VERSION
            )));
        }

        let secs = read_u64(&mut reader)?;
        let nanos = read_u32(&mut reader)?;
        let _reserved = read_u32(&mut reader)?;
        let committed_at = UNIX_EPOCH + Duration::new(secs, nanos);

        let generation = read_u64(&mut reader)?;
        let document_count = read_u64(&mut reader)?;

        let documents: Vec<Document> = bincode::deserialize_from(&mut reader)?;
        if documents.len() as u64 != document_count {
            return Err(TierGridError::InvalidFormat(format!(
                "header announces {} documents but body holds {}",
                document_count,
                documents.len()
            )));
        }

        Ok(Some(LoadedSegment {
            generation,
            committed_at,
            documents,
        }))
    }

    /// Atomically replace the file with `segment`. Returns the bytes written.
    pub fn save(&self, segment: &Segment, generation: u64) -> Result<u64> {
        let temp_path = self.temp_path();

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;

        let mut writer = BufWriter::new(file);

        writer.write_all(SEGMENT_MAGIC)?;
        write_u8(&mut writer, SEGMENT_VERSION)?;

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        write_u64(&mut writer, now.as_secs())?;
        write_u32(&mut writer, now.subsec_nanos())?;
        write_u32(&mut writer, 0)?;

        write_u64(&mut writer, generation)?;
        write_u64(&mut writer, segment.len() as u64)?;

        let documents: Vec<&Document> = segment.documents().collect();
        bincode::serialize_into(&mut writer, &documents)?;

        writer.flush()?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        let written = file.metadata()?.len();
        drop(file);

        std::fs::rename(&temp_path, &self.path)?;
        self.sync_parent_dir()?;

        Ok(written)
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        if let Some(name) = temp.file_name() {
            let mut new_name = name.to_string_lossy().into_owned();
            new_name.push_str(".tmp");
            temp.set_file_name(new_name);
        }
        temp
    }

    #[cfg(unix)]
    fn sync_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            let dir = File::open(parent)?;
            dir.sync_all()?;
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_parent_dir(&self) -> Result<()> {
        Ok(())
    }
}

fn write_u8<W: Write>(writer: &mut W, value: u8) -> Result<()> {
    writer.write_all(&[value])?;
    Ok(())
}

fn write_u32<W: Write>(writer: &mut W, value: u32) -> Result<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn write_u64<W: Write>(writer: &mut W, value: u64) -> Result<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn read_u8<R: Read>(reader: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64<R: Read>(reader: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}
