//! Per-season dataset assembly
//!
//! Pairs each qualifying game's two rosters into one feature slice and
//! derives the matching label. Tensors are stored as flat `f32` buffers
//! with explicit shape and reshaped into `burn` tensors only at the
//! estimator boundary.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use serde::{Deserialize, Serialize};

use crate::features::{TeamIndex, TeamRoster, N_FEATURES, N_PLAYERS};
use crate::{GameRecord, PredictionMode};

/// Game feature tensor, shape `[num_games, 2, N_PLAYERS, N_FEATURES]`.
///
/// Axis 1 is "this team" then "opposing team", in the order the raw game
/// record lists them; home and away are not distinguished further.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTensor {
    num_games: usize,
    data: Vec<f32>,
}

impl FeatureTensor {
    /// Values per game slice
    pub const GAME_STRIDE: usize = 2 * N_PLAYERS * N_FEATURES;

    pub fn empty() -> Self {
        FeatureTensor {
            num_games: 0,
            data: Vec::new(),
        }
    }

    pub fn shape(&self) -> [usize; 4] {
        [self.num_games, 2, N_PLAYERS, N_FEATURES]
    }

    pub fn num_games(&self) -> usize {
        self.num_games
    }

    pub fn is_empty(&self) -> bool {
        self.num_games == 0
    }

    /// Stack `[roster, opponent_roster]` as one new game slice
    pub fn push_game(&mut self, roster: &TeamRoster, opponent: &TeamRoster) {
        self.data.extend(roster.to_vec());
        self.data.extend(opponent.to_vec());
        self.num_games += 1;
    }

    /// Append another tensor's games after this one's, preserving order
    pub fn append(&mut self, other: &FeatureTensor) {
        self.data.extend_from_slice(&other.data);
        self.num_games += other.num_games;
    }

    /// One game slice, `2 * N_PLAYERS * N_FEATURES` values
    pub fn game(&self, index: usize) -> &[f32] {
        let start = index * Self::GAME_STRIDE;
        &self.data[start..start + Self::GAME_STRIDE]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Reshape into a `[num_games, 2, N_PLAYERS, N_FEATURES]` tensor for
    /// the estimator
    pub fn to_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 4> {
        Tensor::<B, 1>::from_floats(self.data.as_slice(), device).reshape([
            self.num_games,
            2,
            N_PLAYERS,
            N_FEATURES,
        ])
    }
}

/// Label tensor, shape `[num_games, width]` where width depends on the
/// prediction mode (2 for one-hot win/loss, 1 for combined score).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelTensor {
    num_games: usize,
    width: usize,
    data: Vec<f32>,
}

impl LabelTensor {
    pub fn empty(width: usize) -> Self {
        LabelTensor {
            num_games: 0,
            width,
            data: Vec::new(),
        }
    }

    pub fn shape(&self) -> [usize; 2] {
        [self.num_games, self.width]
    }

    pub fn num_games(&self) -> usize {
        self.num_games
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn push_row(&mut self, row: &[f32]) {
        debug_assert_eq!(row.len(), self.width);
        self.data.extend_from_slice(row);
        self.num_games += 1;
    }

    pub fn append(&mut self, other: &LabelTensor) {
        debug_assert_eq!(self.width, other.width);
        self.data.extend_from_slice(&other.data);
        self.num_games += other.num_games;
    }

    /// One label row
    pub fn row(&self, index: usize) -> &[f32] {
        let start = index * self.width;
        &self.data[start..start + self.width]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn to_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        Tensor::<B, 1>::from_floats(self.data.as_slice(), device)
            .reshape([self.num_games, self.width])
    }
}

/// The feature/label pair for one season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonDataset {
    pub year: u16,
    pub mode: PredictionMode,
    pub features: FeatureTensor,
    pub labels: LabelTensor,
}

impl SeasonDataset {
    /// Assemble one season's tensors from its game records and roster
    /// index.
    ///
    /// Games whose school or opponent has no indexed roster are dropped;
    /// that is filtering, not an error. Games are visited in input order
    /// so repeated builds are bit-identical.
    pub fn build(
        year: u16,
        games: &[GameRecord],
        index: &TeamIndex,
        mode: PredictionMode,
    ) -> Self {
        let mut features = FeatureTensor::empty();
        let mut labels = LabelTensor::empty(mode.label_width());
        let mut dropped = 0usize;

        for (i, game) in games.iter().enumerate() {
            match (index.get(game.school), index.get(game.opponent)) {
                (Some(roster), Some(opponent)) => {
                    features.push_game(roster, opponent);
                    match mode {
                        PredictionMode::Winner => {
                            let label = if game.school_won() {
                                [1.0, 0.0]
                            } else {
                                [0.0, 1.0]
                            };
                            labels.push_row(&label);
                        }
                        PredictionMode::TotalScore => {
                            labels.push_row(&[game.total() as f32]);
                        }
                    }
                }
                _ => dropped += 1,
            }

            if (i + 1) % 1000 == 0 {
                log::debug!("Handled {} game rows for {}", i + 1, year);
            }
        }

        assert_eq!(
            features.num_games(),
            labels.num_games(),
            "feature/label row counts diverged for {}",
            year
        );

        log::info!(
            "Built {} {} dataset: {} games ({} dropped without rosters)",
            year,
            mode,
            features.num_games(),
            dropped
        );

        SeasonDataset {
            year,
            mode,
            features,
            labels,
        }
    }

    pub fn num_games(&self) -> usize {
        self.features.num_games()
    }
}
