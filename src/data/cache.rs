//! On-disk dataset cache
//!
//! Read-through cache of season tensors keyed by `(year, mode)`. A key is
//! a hit iff both artifact files exist; there is no staleness check, so
//! invalidation is the operator deleting the artifacts. Writes are atomic
//! (temporary file plus rename, renamed only after both artifacts are
//! fully written) so a crash can never leave a false hit behind.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::data::dataset::{FeatureTensor, LabelTensor, SeasonDataset};
use crate::{PredictionMode, Result};

/// Typed cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub year: u16,
    pub mode: PredictionMode,
}

impl CacheKey {
    pub fn new(year: u16, mode: PredictionMode) -> Self {
        CacheKey { year, mode }
    }

    fn features_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("features_{}_{}.bin", self.year, self.mode.tag()))
    }

    fn labels_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("labels_{}_{}.bin", self.year, self.mode.tag()))
    }
}

/// Read-through cache over a directory of tensor artifacts
pub struct DatasetCache {
    dir: PathBuf,
    /// Per-key build locks: two concurrent builds of the same key collapse
    /// into one compute and one artifact write.
    in_flight: Mutex<HashMap<CacheKey, Arc<Mutex<()>>>>,
}

impl DatasetCache {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        DatasetCache {
            dir: dir.into(),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Are both artifacts present for this key?
    pub fn contains(&self, key: CacheKey) -> bool {
        key.features_path(&self.dir).exists() && key.labels_path(&self.dir).exists()
    }

    /// Return the cached dataset for `key`, building and persisting it via
    /// `build` on a miss.
    pub fn load_or_build<F>(&self, key: CacheKey, build: F) -> Result<SeasonDataset>
    where
        F: FnOnce() -> Result<SeasonDataset>,
    {
        if self.contains(key) {
            log::debug!("Cache hit for {} {}", key.year, key.mode);
            return self.load(key);
        }

        let lock = {
            let mut map = self.in_flight.lock().unwrap();
            map.entry(key).or_default().clone()
        };
        let guard = lock.lock().unwrap();

        // Another caller may have finished the build while we waited
        let result = if self.contains(key) {
            self.load(key)
        } else {
            build().and_then(|dataset| {
                self.store(key, &dataset)?;
                Ok(dataset)
            })
        };

        // Once the build settles the artifacts serve latecomers, so the
        // lock entry would only accumulate
        drop(guard);
        self.in_flight.lock().unwrap().remove(&key);
        result
    }

    fn load(&self, key: CacheKey) -> Result<SeasonDataset> {
        let features: FeatureTensor =
            bincode::deserialize(&fs::read(key.features_path(&self.dir))?)?;
        let labels: LabelTensor = bincode::deserialize(&fs::read(key.labels_path(&self.dir))?)?;
        Ok(SeasonDataset {
            year: key.year,
            mode: key.mode,
            features,
            labels,
        })
    }

    fn store(&self, key: CacheKey, dataset: &SeasonDataset) -> Result<()> {
        // Idempotent: the directory existing already is fine
        fs::create_dir_all(&self.dir)?;

        let features_path = key.features_path(&self.dir);
        let labels_path = key.labels_path(&self.dir);
        let features_tmp = features_path.with_extension("bin.tmp");
        let labels_tmp = labels_path.with_extension("bin.tmp");

        fs::write(&features_tmp, bincode::serialize(&dataset.features)?)?;
        fs::write(&labels_tmp, bincode::serialize(&dataset.labels)?)?;

        // Both artifacts are complete on disk; only now make them visible
        fs::rename(&features_tmp, &features_path)?;
        fs::rename(&labels_tmp, &labels_path)?;

        log::info!(
            "Cached {} {} dataset ({} games) in {}",
            key.year,
            key.mode,
            dataset.num_games(),
            self.dir.display()
        );
        Ok(())
    }
}
