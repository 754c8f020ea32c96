//! Multi-season corpus aggregation
//!
//! Builds (or loads) one season dataset per requested year on a bounded
//! worker pool and concatenates the results along the game axis. Results
//! are collected in submission order regardless of completion order, so a
//! multi-year corpus is byte-identical across runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use crate::data::cache::{CacheKey, DatasetCache};
use crate::data::dataset::{FeatureTensor, LabelTensor, SeasonDataset};
use crate::{PredictionMode, Result};

/// Cooperative cancellation flag shared between a caller and in-flight
/// season builds.
///
/// Seasons check the token before building; once it is set, remaining
/// seasons are skipped but everything already built is still returned.
/// The cache is never corrupted by cancellation because artifact writes
/// are atomic.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Concatenated multi-season training data
#[derive(Debug, Clone)]
pub struct TrainingCorpus {
    pub mode: PredictionMode,
    pub features: FeatureTensor,
    pub labels: LabelTensor,
    /// Years that made it into the corpus, in input order
    pub years: Vec<u16>,
    /// Years skipped because cancellation arrived first
    pub skipped: usize,
}

impl TrainingCorpus {
    pub fn num_games(&self) -> usize {
        self.features.num_games()
    }
}

/// Build a training corpus for `years` in input order.
///
/// Each year is one task on a pool of `workers` threads (0 = one per
/// core); a task owns its season end to end, so there is no shared
/// mutable state beyond the cache. `build_season` is invoked only on
/// cache misses. The first fatal build error propagates; cancellation is
/// not an error.
pub fn build_corpus<F>(
    cache: &DatasetCache,
    years: &[u16],
    mode: PredictionMode,
    workers: usize,
    cancel: &CancelToken,
    build_season: F,
) -> Result<TrainingCorpus>
where
    F: Fn(u16) -> Result<SeasonDataset> + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()?;

    // Ordered collect re-imposes submission order on whatever order the
    // workers actually finished in.
    let results: Vec<Option<SeasonDataset>> = pool.install(|| {
        years
            .par_iter()
            .map(|&year| {
                if cancel.is_cancelled() {
                    log::warn!("Skipping {} {}: build cancelled", year, mode);
                    return Ok(None);
                }
                cache
                    .load_or_build(CacheKey::new(year, mode), || build_season(year))
                    .map(Some)
            })
            .collect::<Result<Vec<_>>>()
    })?;

    let mut features = FeatureTensor::empty();
    let mut labels = LabelTensor::empty(mode.label_width());
    let mut completed = Vec::with_capacity(results.len());
    let mut skipped = 0usize;

    for (year, dataset) in years.iter().zip(results) {
        match dataset {
            Some(ds) => {
                features.append(&ds.features);
                labels.append(&ds.labels);
                completed.push(*year);
            }
            None => skipped += 1,
        }
    }

    // Internal consistency, not user-recoverable
    assert_eq!(
        features.num_games(),
        labels.num_games(),
        "corpus feature/label row counts diverged"
    );

    log::info!(
        "Aggregated {} seasons into {} games ({} skipped)",
        completed.len(),
        features.num_games(),
        skipped
    );

    Ok(TrainingCorpus {
        mode,
        features,
        labels,
        years: completed,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::TeamIndex;
    use crate::features::{ClassYear, Position};
    use crate::{GameRecord, HoopsError, PlayerRecord, SchoolId};

    fn make_player(school: i64, games: f32) -> PlayerRecord {
        PlayerRecord {
            school: SchoolId(school),
            games,
            height: 76.0,
            field_goals_made: 50.0,
            field_goals_attempted: 100.0,
            three_pointers_made: 10.0,
            three_pointers_attempted: 40.0,
            free_throws_made: 30.0,
            free_throws_attempted: 40.0,
            rebounds: 80.0,
            assists: 40.0,
            blocks: 10.0,
            steals: 20.0,
            points: 300.0,
            turnovers: 30.0,
            double_doubles: 1.0,
            triple_doubles: 0.0,
            position: Position::Center,
            class_year: ClassYear::Sophomore,
        }
    }

    /// One-game season whose total-score label equals the year, so the
    /// concatenation order is visible in the labels.
    fn marked_season(year: u16) -> SeasonDataset {
        let index = TeamIndex::build(vec![make_player(1, 20.0), make_player(2, 18.0)]);
        let games = vec![GameRecord {
            year,
            school: SchoolId(1),
            opponent: SchoolId(2),
            score: year as u32,
            opponent_score: 0,
        }];
        SeasonDataset::build(year, &games, &index, PredictionMode::TotalScore)
    }

    #[test]
    fn test_submission_order_under_random_delays() {
        use rand::Rng;

        let years = [2014u16, 2015, 2016, 2017, 2018, 2019];
        let run = |dir: &std::path::Path| {
            let cache = DatasetCache::new(dir);
            build_corpus(
                &cache,
                &years,
                PredictionMode::TotalScore,
                4,
                &CancelToken::new(),
                |year| {
                    let delay = rand::thread_rng().gen_range(0..25);
                    std::thread::sleep(std::time::Duration::from_millis(delay));
                    Ok(marked_season(year))
                },
            )
            .unwrap()
        };

        let dir = tempfile::tempdir().unwrap();
        let first = run(&dir.path().join("a"));
        let second = run(&dir.path().join("b"));

        // Labels read back in input year order, both runs identical
        for (i, &year) in years.iter().enumerate() {
            assert_eq!(first.labels.row(i), &[year as f32]);
        }
        assert_eq!(first.features.as_slice(), second.features.as_slice());
        assert_eq!(first.labels.as_slice(), second.labels.as_slice());
        assert_eq!(first.years, years);
    }

    #[test]
    fn test_lengths_equal_after_concatenation() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DatasetCache::new(dir.path());
        let corpus = build_corpus(
            &cache,
            &[2016, 2017],
            PredictionMode::TotalScore,
            2,
            &CancelToken::new(),
            |year| Ok(marked_season(year)),
        )
        .unwrap();

        assert_eq!(corpus.num_games(), 2);
        assert_eq!(corpus.features.num_games(), corpus.labels.num_games());
        assert_eq!(corpus.skipped, 0);
    }

    #[test]
    fn test_cancelled_before_start_builds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DatasetCache::new(dir.path());
        let cancel = CancelToken::new();
        cancel.cancel();

        let corpus = build_corpus(
            &cache,
            &[2016, 2017, 2018],
            PredictionMode::Winner,
            2,
            &cancel,
            |_| panic!("cancelled build must not run"),
        )
        .unwrap();

        assert_eq!(corpus.num_games(), 0);
        assert_eq!(corpus.skipped, 3);
        assert!(corpus.years.is_empty());
    }

    #[test]
    fn test_build_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DatasetCache::new(dir.path());

        let result = build_corpus(
            &cache,
            &[2016, 2017],
            PredictionMode::Winner,
            2,
            &CancelToken::new(),
            |year| {
                if year == 2017 {
                    Err(HoopsError::UnknownCategory {
                        field: "position",
                        value: "XX".to_string(),
                    })
                } else {
                    Ok(marked_season(year))
                }
            },
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_second_run_served_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DatasetCache::new(dir.path());
        let years = [2016u16, 2017];

        let first = build_corpus(
            &cache,
            &years,
            PredictionMode::TotalScore,
            2,
            &CancelToken::new(),
            |year| Ok(marked_season(year)),
        )
        .unwrap();

        let second = build_corpus(
            &cache,
            &years,
            PredictionMode::TotalScore,
            2,
            &CancelToken::new(),
            |_| panic!("should be served from cache"),
        )
        .unwrap();

        assert_eq!(first.features.as_slice(), second.features.as_slice());
        assert_eq!(first.labels.as_slice(), second.labels.as_slice());
    }
}
