//! Flat-file JSON cache for raw API data
//!
//! Each cached value lives in its own file inside the report month's
//! directory. A present file is read back instead of fetching again, so a
//! report can be re-run against the same snapshot.

use std::fs::File;
use std::future::Future;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::PrettyFormatter;
use tracing::{debug, info};

use crate::error::{CacheError, SourceError};

pub struct JsonCache {
    dir: PathBuf,
}

impl JsonCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Read a cached value, `None` when it has not been stored yet
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, CacheError> {
        let path = self.path(name);
        if !path.exists() {
            return Ok(None);
        }
        debug!("Reading cached {:?}", path);
        let reader = BufReader::new(File::open(&path)?);
        Ok(Some(serde_json::from_reader(reader)?))
    }

    /// Write a value as tab-indented JSON
    pub fn store<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<(), CacheError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path(name);
        let mut writer = BufWriter::new(File::create(&path)?);
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"\t"));
        value.serialize(&mut serializer)?;
        writer.flush()?;
        debug!("Stored {:?}", path);
        Ok(())
    }

    /// Return the cached value, or run `fetch` and store its result
    pub async fn load_or_fetch<T, F, Fut>(&self, name: &str, fetch: F) -> Result<T, CacheError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, SourceError>>,
    {
        if let Some(value) = self.load(name)? {
            info!("Using cached {}", name);
            return Ok(value);
        }

        let started = std::time::Instant::now();
        let value = fetch().await?;
        info!("Downloaded {} in {:?}", name, started.elapsed());

        self.store(name, &value)?;
        Ok(value)
    }

    /// Last modification time of a cached file
    pub fn modified(&self, name: &str) -> Result<Option<DateTime<Utc>>, CacheError> {
        let path = self.path(name);
        if !path.exists() {
            return Ok(None);
        }
        let modified = std::fs::metadata(&path)?.modified()?;
        Ok(Some(DateTime::<Utc>::from(modified)))
    }
}
