//! Index builder for flexible configuration
//!
//! This module provides a builder for opening proximity indexes with a
//! custom storage directory and search settings.

use crate::config::Config;
use crate::db::ProximityIndex;
use crate::error::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use tiergrid_types::entity::Locatable;

/// Builder for a [`ProximityIndex`].
///
/// ```rust
/// use tiergrid::{Config, IndexBuilder, ProximityIndex};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let index: ProximityIndex = IndexBuilder::new()
///     .config(Config::default().with_search_radii(2.0, 50.0))
///     .in_memory()
///     .build()?;
///
/// assert_eq!(index.start_tier(), 8);
/// assert_eq!(index.end_tier(), 13);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct IndexBuilder {
    path: Option<PathBuf>,
    config: Config,
    in_memory: bool,
}

impl IndexBuilder {
    /// Create a new builder with default in-memory configuration.
    pub fn new() -> Self {
        Self {
            path: None,
            config: Config::default(),
            in_memory: true,
        }
    }

    /// Store the index in this directory. It is created if needed and loaded on build.
    pub fn path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.path = Some(path.into());
        self.in_memory = false;
        self
    }

    /// Keep the index in memory only.
    pub fn in_memory(mut self) -> Self {
        self.in_memory = true;
        self.path = None;
        self
    }

    /// Set the index configuration. A storage path in `config` is used unless
    /// [`path`](Self::path) or [`in_memory`](Self::in_memory) overrides it.
    pub fn config(mut self, config: Config) -> Self {
        if let Some(path) = &config.storage_path
            && self.path.is_none()
        {
            self.path = Some(path.clone());
            self.in_memory = false;
        }
        self.config = config;
        self
    }

    /// Open the index.
    pub fn build<E>(self) -> Result<ProximityIndex<E>>
    where
        E: Locatable + Serialize + DeserializeOwned,
    {
        let config = if self.in_memory {
            self.config.in_memory()
        } else {
            match self.path {
                Some(path) => self.config.with_storage_path(path),
                None => self.config,
            }
        };
        ProximityIndex::open_with_config(config)
    }
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}
