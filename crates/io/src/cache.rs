//! Loaded pricelists, cached per file and schema.
//!
//! Entries are keyed by the full schema, not its name, so two schemas that
//! share a name but differ in columns or key rules never share an index.
//! Each lookup re-reads the file and compares a BLAKE3 signature of its
//! bytes, so an edited pricelist is reloaded on the next request while an
//! unchanged one reuses the built index.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};

use pricefill_pricing::{LoadedPricelist, PriceError, PriceSchema};

use crate::pricelist::{load_pricelist_bytes, read_pricelist_bytes};

struct CacheEntry {
    signature: blake3::Hash,
    pricelist: Arc<LoadedPricelist>,
}

#[derive(Default)]
pub struct PricelistCache {
    entries: HashMap<(PathBuf, PriceSchema), CacheEntry>,
}

impl PricelistCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached pricelist for `(path, schema)`, loading it
    /// when absent or when the file content changed since the last load.
    pub fn get_or_load(
        &mut self,
        path: &Path,
        schema: &PriceSchema,
    ) -> Result<Arc<LoadedPricelist>, PriceError> {
        let canonical = path.canonicalize().map_err(|_| PriceError::PricelistNotFound {
            path: path.display().to_string(),
        })?;
        let bytes = read_pricelist_bytes(&canonical)?;
        let signature = blake3::hash(&bytes);
        let key = (canonical, schema.clone());

        if let Some(entry) = self.entries.get(&key) {
            if entry.signature == signature {
                debug!("pricelist cache hit: {} ({})", key.0.display(), key.1.name);
                return Ok(Arc::clone(&entry.pricelist));
            }
            info!("pricelist {} changed on disk; reloading", key.0.display());
        }

        let pricelist = Arc::new(load_pricelist_bytes(bytes, schema)?);
        self.entries.insert(
            key,
            CacheEntry {
                signature,
                pricelist: Arc::clone(&pricelist),
            },
        );
        Ok(pricelist)
    }

    /// Drop every cached load of `path`. Returns how many were removed.
    pub fn invalidate(&mut self, path: &Path) -> usize {
        let target = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let before = self.entries.len();
        self.entries.retain(|(p, _), _| *p != target);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
