//! Feature extraction and encoding
//!
//! Converts raw player records into fixed-shape roster matrices.

pub mod encoding;
pub mod roster;
pub mod team_index;

pub use encoding::{ClassYear, Position};
pub use roster::{PlayerFeatures, TeamRoster, N_FEATURES, N_PLAYERS};
pub use team_index::TeamIndex;
