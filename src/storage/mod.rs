//! Document storage for the proximity index.
//!
//! Documents carry keyword, box, text and float fields. Keyword and box
//! fields are indexed into postings; a [`Filter`] over them is evaluated
//! against the committed generation of an [`IndexStore`]. Disk-backed stores
//! keep a snapshot plus a commit log of the [`Change`]s made since.

mod commit_log;
mod coordination;
mod document;
mod filter;
mod segment;
mod snapshot;
mod store;

pub use commit_log::{COMMIT_LOG_FILE_NAME, CommitLog};
pub use coordination::{Commit, WriteGuard, WriterCoordinator};
pub use document::{Document, FieldValue, ID_FIELD};
pub use filter::Filter;
pub use segment::{Change, Segment};
pub use snapshot::{LoadedSegment, SEGMENT_FILE_NAME, SegmentFile};
pub use store::{IndexReader, IndexStore, IndexWriter, StoreStats};
