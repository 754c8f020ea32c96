//! Data storage, dataset assembly, and caching
//!
//! SQLite record source, per-season tensor construction, the on-disk
//! dataset cache, and the multi-season aggregator.

pub mod aggregate;
pub mod cache;
pub mod database;
pub mod dataset;

pub use aggregate::{build_corpus, CancelToken, TrainingCorpus};
pub use cache::{CacheKey, DatasetCache};
pub use database::Database;
pub use dataset::{FeatureTensor, LabelTensor, SeasonDataset};
