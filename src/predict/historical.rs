//! Historical score heuristic
//!
//! Estimates a matchup score with no trained model: each school's mean
//! score, adjusted by how much worse other schools do against the
//! opponent than against everyone else.

use std::collections::HashSet;

use crate::{GameRecord, SchoolId};

/// A school's baseline score and opponent-strength differential for one
/// season.
#[derive(Debug, Clone, Copy)]
pub struct HistoricalScore {
    /// Mean of the school's own scores across its games
    pub normal_score: f32,
    /// Mean over opponents of (their overall mean score minus their mean
    /// score against this school). NaN when no opponent ever played the
    /// school; that means "heuristic unavailable", never zero.
    pub differential: f32,
}

impl HistoricalScore {
    /// Is the differential backed by any comparable opponent?
    pub fn has_differential(&self) -> bool {
        !self.differential.is_nan()
    }
}

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return f32::NAN;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

/// Compute a school's historical score profile from one season's game
/// rows.
///
/// For every other school that actually played the target, the
/// differential sample is its overall mean score minus its mean score in
/// games against the target. Opponents that never met the target are
/// skipped, not counted as zero.
pub fn historical_score(games: &[GameRecord], school: SchoolId) -> HistoricalScore {
    let own_scores: Vec<f32> = games
        .iter()
        .filter(|g| g.school == school)
        .map(|g| g.score as f32)
        .collect();
    let normal_score = mean(&own_scores);

    let mut seen = HashSet::new();
    let mut diffs = Vec::new();
    for other in games.iter().map(|g| g.school) {
        if other == school || !seen.insert(other) {
            continue;
        }

        let mut all_scores = Vec::new();
        let mut against_target = Vec::new();
        for g in games.iter().filter(|g| g.school == other) {
            all_scores.push(g.score as f32);
            if g.opponent == school {
                against_target.push(g.score as f32);
            }
        }
        if against_target.is_empty() {
            continue;
        }
        diffs.push(mean(&all_scores) - mean(&against_target));
    }

    HistoricalScore {
        normal_score,
        differential: mean(&diffs),
    }
}

/// Predicted final score for one matchup
#[derive(Debug, Clone, Copy)]
pub struct MatchupScore {
    pub school_score: f32,
    pub opponent_score: f32,
}

impl MatchupScore {
    /// Combined predicted total
    pub fn total(&self) -> f32 {
        self.school_score + self.opponent_score
    }

    /// False when either side's heuristic was unavailable
    pub fn is_available(&self) -> bool {
        !self.school_score.is_nan() && !self.opponent_score.is_nan()
    }
}

/// Each school's baseline, discounted by how much the other school
/// typically suppresses its opponents.
pub fn predict_matchup(school: &HistoricalScore, opponent: &HistoricalScore) -> MatchupScore {
    MatchupScore {
        school_score: school.normal_score - opponent.differential,
        opponent_score: opponent.normal_score - school.differential,
    }
}
