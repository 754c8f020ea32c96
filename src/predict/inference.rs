//! Estimator boundary and matchup inference
//!
//! The trained model is an opaque collaborator: anything that maps a
//! `[batch, 2, N_PLAYERS, N_FEATURES]` tensor to per-example outputs can
//! drive predictions. This module only assembles inputs and decodes
//! outputs.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::data::dataset::FeatureTensor;
use crate::features::TeamIndex;
use crate::{HoopsError, Result, SchoolId};

/// An opaque trained model.
///
/// Input is a game feature tensor; output rows are either a 2-way
/// win-probability vector or a single predicted total score, depending on
/// the mode the model was trained for.
pub trait Estimator<B: Backend> {
    fn predict(&self, features: Tensor<B, 4>) -> Tensor<B, 2>;
}

/// Assemble the `[1, 2, N_PLAYERS, N_FEATURES]` feature tensor for one
/// matchup.
///
/// Unlike dataset construction, a missing roster here is an error: the
/// caller asked about these two specific schools, so there is nothing to
/// silently filter.
pub fn matchup_features(
    index: &TeamIndex,
    school: SchoolId,
    opponent: SchoolId,
    year: u16,
) -> Result<FeatureTensor> {
    let roster = index
        .get(school)
        .ok_or(HoopsError::RosterMissing { school, year })?;
    let opponent_roster = index.get(opponent).ok_or(HoopsError::RosterMissing {
        school: opponent,
        year,
    })?;

    let mut features = FeatureTensor::empty();
    features.push_game(roster, opponent_roster);
    Ok(features)
}

/// Outcome prediction for one matchup
#[derive(Debug, Clone, Copy)]
pub struct WinPrediction {
    pub school: SchoolId,
    pub opponent: SchoolId,
    /// Probability that the first-listed school wins
    pub school_win_prob: f32,
}

impl WinPrediction {
    pub fn winner(&self) -> SchoolId {
        if self.school_win_prob >= 0.5 {
            self.school
        } else {
            self.opponent
        }
    }
}

/// Runs an estimator over assembled matchup features
pub struct Predictor<B: Backend, E: Estimator<B>> {
    estimator: E,
    device: B::Device,
}

impl<B: Backend, E: Estimator<B>> Predictor<B, E> {
    pub fn new(estimator: E, device: B::Device) -> Self {
        Predictor { estimator, device }
    }

    /// Predict the winner of one matchup
    pub fn predict_winner(
        &self,
        index: &TeamIndex,
        school: SchoolId,
        opponent: SchoolId,
        year: u16,
    ) -> Result<WinPrediction> {
        let features = matchup_features(index, school, opponent, year)?;
        let output = self.run(&features)?;
        // Row 0 is [school_wins, opponent_wins]; normalize in case the
        // model emits scores rather than probabilities
        let (wins, losses) = (output[0], output[1]);
        let total = wins + losses;
        let school_win_prob = if total > 0.0 { wins / total } else { 0.5 };

        Ok(WinPrediction {
            school,
            opponent,
            school_win_prob,
        })
    }

    /// Predict the combined final score of one matchup
    pub fn predict_total(
        &self,
        index: &TeamIndex,
        school: SchoolId,
        opponent: SchoolId,
        year: u16,
    ) -> Result<f32> {
        let features = matchup_features(index, school, opponent, year)?;
        let output = self.run(&features)?;
        Ok(output[0])
    }

    /// Run the estimator and flatten the single-example output row
    fn run(&self, features: &FeatureTensor) -> Result<Vec<f32>> {
        let input = features.to_tensor::<B>(&self.device);
        let output = self.estimator.predict(input);
        output
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| HoopsError::Estimator(format!("{:?}", e)))
    }
}

/// Format a win prediction for display
pub fn format_prediction(pred: &WinPrediction, school: &str, opponent: &str) -> String {
    let (winner, prob) = if pred.school_win_prob >= 0.5 {
        (school, pred.school_win_prob)
    } else {
        (opponent, 1.0 - pred.school_win_prob)
    };
    format!(
        "{} vs {}: {} wins (p={:.2})",
        school, opponent, winner, prob
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{ClassYear, Position, N_FEATURES, N_PLAYERS};
    use crate::PlayerRecord;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    /// Always predicts [0.7, 0.3] for every example
    struct FixedEstimator;

    impl Estimator<TestBackend> for FixedEstimator {
        fn predict(
            &self,
            features: Tensor<TestBackend, 4>,
        ) -> Tensor<TestBackend, 2> {
            let [batch, _, _, _] = features.dims();
            let device = features.device();
            Tensor::<TestBackend, 1>::from_floats([0.7, 0.3], &device)
                .reshape([1, 2])
                .repeat_dim(0, batch)
        }
    }

    fn make_player(school: i64) -> PlayerRecord {
        PlayerRecord {
            school: SchoolId(school),
            games: 25.0,
            height: 78.0,
            field_goals_made: 90.0,
            field_goals_attempted: 180.0,
            three_pointers_made: 25.0,
            three_pointers_attempted: 70.0,
            free_throws_made: 55.0,
            free_throws_attempted: 70.0,
            rebounds: 120.0,
            assists: 60.0,
            blocks: 18.0,
            steals: 28.0,
            points: 350.0,
            turnovers: 45.0,
            double_doubles: 4.0,
            triple_doubles: 1.0,
            position: Position::Forward,
            class_year: ClassYear::Senior,
        }
    }

    fn make_index() -> TeamIndex {
        TeamIndex::build(vec![make_player(1), make_player(2)])
    }

    #[test]
    fn test_matchup_features_shape() {
        let index = make_index();
        let features = matchup_features(&index, SchoolId(1), SchoolId(2), 2017).unwrap();
        assert_eq!(features.shape(), [1, 2, N_PLAYERS, N_FEATURES]);
    }

    #[test]
    fn test_matchup_missing_roster_is_error() {
        let index = make_index();
        let err = matchup_features(&index, SchoolId(1), SchoolId(99), 2017).unwrap_err();
        assert!(matches!(
            err,
            HoopsError::RosterMissing {
                school: SchoolId(99),
                year: 2017
            }
        ));
    }

    #[test]
    fn test_predict_winner() {
        let index = make_index();
        let predictor = Predictor::new(FixedEstimator, Default::default());
        let pred = predictor
            .predict_winner(&index, SchoolId(1), SchoolId(2), 2017)
            .unwrap();

        assert!((pred.school_win_prob - 0.7).abs() < 1e-6);
        assert_eq!(pred.winner(), SchoolId(1));
    }

    #[test]
    fn test_format_prediction_picks_favorite() {
        let pred = WinPrediction {
            school: SchoolId(1),
            opponent: SchoolId(2),
            school_win_prob: 0.3,
        };
        let text = format_prediction(&pred, "Duke", "Kansas");
        assert!(text.contains("Kansas wins"));
        assert!(text.contains("p=0.70"));
    }
}
