//! Prediction entry points
//!
//! The estimator-backed matchup predictor and the historical score
//! heuristic that needs no trained model.

pub mod bracket;
pub mod historical;
pub mod inference;

pub use bracket::{Bracket, BracketGame, BracketOutcome};
pub use historical::{historical_score, predict_matchup, HistoricalScore, MatchupScore};
pub use inference::{matchup_features, Estimator, Predictor, WinPrediction};
