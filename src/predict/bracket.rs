//! Tournament bracket resolution
//!
//! A bracket is a binary tree of school names; resolving it predicts every
//! pairing bottom-up and advances each winner until a champion remains.

use burn::tensor::backend::Backend;

use crate::data::Database;
use crate::features::TeamIndex;
use crate::predict::inference::{Estimator, Predictor};
use crate::Result;

/// A single-elimination bracket: either a school or a pairing of two
/// sub-brackets whose winners meet.
#[derive(Debug, Clone)]
pub enum Bracket {
    Team(String),
    Round(Box<Bracket>, Box<Bracket>),
}

impl Bracket {
    pub fn team(name: impl Into<String>) -> Self {
        Bracket::Team(name.into())
    }

    pub fn round(left: Bracket, right: Bracket) -> Self {
        Bracket::Round(Box::new(left), Box::new(right))
    }

    /// Build a balanced bracket from seeded order (first plays second,
    /// third plays fourth, and so on). The team count must be a power of
    /// two.
    pub fn from_seeds(names: &[&str]) -> Self {
        assert!(
            !names.is_empty() && names.len().is_power_of_two(),
            "bracket needs a power-of-two team count"
        );
        if names.len() == 1 {
            return Bracket::team(names[0]);
        }
        let (left, right) = names.split_at(names.len() / 2);
        Bracket::round(Bracket::from_seeds(left), Bracket::from_seeds(right))
    }
}

/// One predicted pairing inside a resolved bracket
#[derive(Debug, Clone)]
pub struct BracketGame {
    pub school: String,
    pub opponent: String,
    pub winner: String,
    /// Probability the predicted winner advances
    pub win_prob: f32,
}

/// Every predicted pairing plus the school left standing
#[derive(Debug, Clone)]
pub struct BracketOutcome {
    pub games: Vec<BracketGame>,
    pub champion: String,
}

impl<B: Backend, E: Estimator<B>> Predictor<B, E> {
    /// Resolve a whole bracket by predicting each pairing bottom-up.
    ///
    /// Games are recorded in resolution order, so earlier rounds appear
    /// before the rounds they feed.
    pub fn resolve_bracket(
        &self,
        db: &Database,
        index: &TeamIndex,
        year: u16,
        bracket: &Bracket,
    ) -> Result<BracketOutcome> {
        let mut games = Vec::new();
        let champion = self.resolve(db, index, year, bracket, &mut games)?;
        Ok(BracketOutcome { games, champion })
    }

    fn resolve(
        &self,
        db: &Database,
        index: &TeamIndex,
        year: u16,
        bracket: &Bracket,
        games: &mut Vec<BracketGame>,
    ) -> Result<String> {
        match bracket {
            Bracket::Team(name) => Ok(name.clone()),
            Bracket::Round(left, right) => {
                let school = self.resolve(db, index, year, left, games)?;
                let opponent = self.resolve(db, index, year, right, games)?;

                let school_id = db.school_id_for_name(&school)?;
                let opponent_id = db.school_id_for_name(&opponent)?;
                let pred = self.predict_winner(index, school_id, opponent_id, year)?;

                let (winner, win_prob) = if pred.winner() == school_id {
                    (school.clone(), pred.school_win_prob)
                } else {
                    (opponent.clone(), 1.0 - pred.school_win_prob)
                };
                log::debug!("{} vs {}: {} advances", school, opponent, winner);

                games.push(BracketGame {
                    school,
                    opponent,
                    winner: winner.clone(),
                    win_prob,
                });
                Ok(winner)
            }
        }
    }
}
