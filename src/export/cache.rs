//! Memoized export of merged datasets.
//!
//! An [`ExportCache`] is created once by the caller and passed by reference to every export
//! request. It serializes each distinct dataset at most once and hands out the same
//! [`ExportBlob`] afterwards. Entries are never evicted.

use std::collections::HashMap;
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info};

use crate::error::MergeResult;
use crate::types::{DataSet, Value};

use super::xlsx::{write_xlsx, ExportBlob, ExportOptions};

/// Serializer used by an [`ExportCache`] to turn a dataset into workbook bytes.
pub type ExportFn = dyn Fn(&DataSet, &ExportOptions) -> MergeResult<Vec<u8>> + Send + Sync;

/// Counters describing cache activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Requests answered from the cache.
    pub hits: u64,
    /// Requests that had to serialize.
    pub misses: u64,
    /// Serializations attempted (successful or not).
    pub serializations: u64,
}

struct Entry {
    dataset: DataSet,
    blob: Arc<ExportBlob>,
}

#[derive(Default)]
struct CacheState {
    // Buckets by content hash; entries within a bucket are compared cell by cell.
    entries: HashMap<u64, Vec<Entry>>,
    len: usize,
    stats: CacheStats,
}

impl CacheState {
    fn lookup(&self, hash: u64, dataset: &DataSet) -> Option<Arc<ExportBlob>> {
        self.entries
            .get(&hash)?
            .iter()
            .find(|e| same_content(&e.dataset, dataset))
            .map(|e| Arc::clone(&e.blob))
    }
}

/// Process-lifetime memo of serialized datasets.
///
/// The whole check/serialize/insert sequence runs under one lock, so concurrent requests
/// for the same dataset serialize it only once.
pub struct ExportCache {
    options: ExportOptions,
    export: Box<ExportFn>,
    state: Mutex<CacheState>,
}

impl ExportCache {
    /// Create a cache that writes `.xlsx` workbooks with `options`.
    pub fn new(options: ExportOptions) -> Self {
        Self::with_serializer(options, write_xlsx)
    }

    /// Create a cache with a custom serializer.
    pub fn with_serializer<F>(options: ExportOptions, export: F) -> Self
    where
        F: Fn(&DataSet, &ExportOptions) -> MergeResult<Vec<u8>> + Send + Sync + 'static,
    {
        Self {
            options,
            export: Box::new(export),
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Export options applied to every blob.
    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Return the blob for `dataset`, serializing it on first request.
    ///
    /// A failed serialization is returned to the caller and nothing is cached, so a later
    /// request for the same dataset tries again.
    pub fn get_or_export(&self, dataset: &DataSet) -> MergeResult<Arc<ExportBlob>> {
        let hash = content_hash(dataset);
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(blob) = state.lookup(hash, dataset) {
            state.stats.hits += 1;
            debug!(rows = dataset.row_count(), "export cache hit");
            return Ok(blob);
        }

        state.stats.misses += 1;
        state.stats.serializations += 1;
        let bytes = (self.export)(dataset, &self.options)?;
        let blob = Arc::new(ExportBlob {
            file_name: self.options.file_name.clone(),
            bytes,
        });
        info!(
            rows = dataset.row_count(),
            bytes = blob.len(),
            file = self.options.file_name.as_str(),
            "serialized dataset"
        );

        state.entries.entry(hash).or_default().push(Entry {
            dataset: dataset.clone(),
            blob: Arc::clone(&blob),
        });
        state.len += 1;
        Ok(blob)
    }

    /// Number of cached blobs.
    pub fn len(&self) -> usize {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).len
    }

    /// Returns `true` if nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).stats
    }
}

impl Default for ExportCache {
    fn default() -> Self {
        Self::new(ExportOptions::default())
    }
}

impl fmt::Debug for ExportCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportCache")
            .field("options", &self.options)
            .field("len", &self.len())
            .field("stats", &self.stats())
            .finish()
    }
}

/// Content identity: same schema and same cells, floats compared by bit pattern.
fn same_content(a: &DataSet, b: &DataSet) -> bool {
    a.schema == b.schema
        && a.rows.len() == b.rows.len()
        && a.rows.iter().zip(&b.rows).all(|(ra, rb)| {
            ra.len() == rb.len() && ra.iter().zip(rb).all(|(va, vb)| same_value(va, vb))
        })
}

fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Float64(x), Value::Float64(y)) => x.to_bits() == y.to_bits(),
        _ => a == b,
    }
}

fn content_hash(dataset: &DataSet) -> u64 {
    let mut h = DefaultHasher::new();
    dataset.schema.hash(&mut h);
    dataset.rows.len().hash(&mut h);
    for row in &dataset.rows {
        row.len().hash(&mut h);
        for value in row {
            std::mem::discriminant(value).hash(&mut h);
            match value {
                Value::Null => {}
                Value::Int64(v) => v.hash(&mut h),
                Value::Float64(v) => v.to_bits().hash(&mut h),
                Value::Date(d) => d.hash(&mut h),
                Value::Utf8(s) => s.hash(&mut h),
            }
        }
    }
    h.finish()
}
