//! Fixed-shape roster encoding
//!
//! Every team must present the same shape to the estimator, so rosters are
//! truncated or zero-padded to exactly [`N_PLAYERS`] rows of
//! [`N_FEATURES`] columns.

use serde::{Deserialize, Serialize};

use crate::features::{ClassYear, Position};
use crate::PlayerRecord;

/// Roster rows per team after normalization
pub const N_PLAYERS: usize = 10;

/// Feature columns per player: 24 numeric stats plus both one-hot blocks
pub const N_FEATURES: usize = 24 + Position::WIDTH + ClassYear::WIDTH;

/// Divide, treating an empty denominator as "did not contribute" rather
/// than an error. 0/0 players exist in real rosters.
fn per(numerator: f32, denominator: f32) -> f32 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// One player's encoded feature row.
///
/// Rate and average columns are recomputed from the raw counting stats:
/// the source mixes 0-1 and 0-100 percentage scales across seasons, so the
/// stored values cannot be trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerFeatures {
    values: Vec<f32>,
}

impl PlayerFeatures {
    /// Dimension of the feature row
    pub const DIM: usize = N_FEATURES;

    /// Encode a raw stat line. Column order is fixed and identical across
    /// all teams and seasons; it is part of the tensor contract.
    pub fn from_record(record: &PlayerRecord) -> Self {
        let mut values = Vec::with_capacity(Self::DIM);
        values.extend([
            record.games,
            record.height,
            record.field_goals_made,
            record.field_goals_attempted,
            per(record.field_goals_made, record.field_goals_attempted),
            record.three_pointers_made,
            record.three_pointers_attempted,
            per(record.three_pointers_made, record.three_pointers_attempted),
            record.free_throws_made,
            record.free_throws_attempted,
            per(record.free_throws_made, record.free_throws_attempted),
            record.rebounds,
            per(record.rebounds, record.games),
            record.assists,
            per(record.assists, record.games),
            record.blocks,
            per(record.blocks, record.games),
            record.steals,
            per(record.steals, record.games),
            record.points,
            per(record.points, record.games),
            record.turnovers,
            record.double_doubles,
            record.triple_doubles,
        ]);
        values.extend(record.position.one_hot());
        values.extend(record.class_year.one_hot());
        debug_assert_eq!(values.len(), Self::DIM);
        PlayerFeatures { values }
    }

    /// All-zero row used to pad short rosters
    pub fn padding() -> Self {
        PlayerFeatures {
            values: vec![0.0; Self::DIM],
        }
    }

    pub fn is_padding(&self) -> bool {
        self.values.iter().all(|&v| v == 0.0)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}

/// A normalized roster: exactly [`N_PLAYERS`] feature rows, most active
/// players first. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRoster {
    players: Vec<PlayerFeatures>,
}

impl TeamRoster {
    /// Normalize a variable-length set of player records into a fixed
    /// roster.
    ///
    /// Players are stably sorted by games played descending before
    /// truncation, so when a roster is cut down the players who actually
    /// appeared in more games are the ones kept. Short rosters are padded
    /// with zero rows; padding never resamples real players, so the same
    /// input always yields the same roster.
    pub fn from_records(mut records: Vec<PlayerRecord>) -> Self {
        records.sort_by(|a, b| b.games.total_cmp(&a.games));
        records.truncate(N_PLAYERS);

        let mut players: Vec<PlayerFeatures> =
            records.iter().map(PlayerFeatures::from_record).collect();
        while players.len() < N_PLAYERS {
            players.push(PlayerFeatures::padding());
        }

        TeamRoster { players }
    }

    /// Roster rows, always exactly [`N_PLAYERS`] of them
    pub fn players(&self) -> &[PlayerFeatures] {
        &self.players
    }

    /// Flatten to `N_PLAYERS * N_FEATURES` values in row order
    pub fn to_vec(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(N_PLAYERS * N_FEATURES);
        for p in &self.players {
            out.extend_from_slice(p.as_slice());
        }
        out
    }
}
