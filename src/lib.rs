//! NCAA basketball prediction data pipeline
//!
//! Turns per-season player and game records into fixed-shape training
//! tensors, and provides a historical score heuristic that needs no
//! trained model.

pub mod data;
pub mod features;
pub mod predict;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::features::{ClassYear, Position};

/// Unique identifier for a school
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchoolId(pub i64);

impl fmt::Display for SchoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "School({})", self.0)
    }
}

/// A school known to the directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct School {
    pub id: SchoolId,
    pub name: String,
    pub aliases: Vec<String>,
}

impl School {
    pub fn matches_name(&self, name: &str) -> bool {
        let name_lower = name.to_lowercase();
        self.name.to_lowercase() == name_lower
            || self.aliases.iter().any(|a| a.to_lowercase() == name_lower)
    }
}

/// One game from a single school's perspective, as the source lists it.
///
/// Every physical game appears twice in a season's records, once per
/// participating school.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub year: u16,
    pub school: SchoolId,
    pub opponent: SchoolId,
    pub score: u32,
    pub opponent_score: u32,
}

impl GameRecord {
    /// Did the listed school win? Ties count as a loss (strict greater-than).
    pub fn school_won(&self) -> bool {
        self.score > self.opponent_score
    }

    /// Score margin (positive = the listed school won)
    pub fn margin(&self) -> i32 {
        self.score as i32 - self.opponent_score as i32
    }

    /// Combined final score of both schools
    pub fn total(&self) -> u32 {
        self.score + self.opponent_score
    }
}

/// Raw per-season stat line for one player.
///
/// Counting stats only; percentages and per-game averages are recomputed
/// from these during feature encoding because the source expresses them
/// inconsistently. Any stat the source omits is zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub school: SchoolId,
    pub games: f32,
    pub height: f32,
    pub field_goals_made: f32,
    pub field_goals_attempted: f32,
    pub three_pointers_made: f32,
    pub three_pointers_attempted: f32,
    pub free_throws_made: f32,
    pub free_throws_attempted: f32,
    pub rebounds: f32,
    pub assists: f32,
    pub blocks: f32,
    pub steals: f32,
    pub points: f32,
    pub turnovers: f32,
    pub double_doubles: f32,
    pub triple_doubles: f32,
    pub position: Position,
    pub class_year: ClassYear,
}

/// What the labels of a dataset predict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredictionMode {
    /// One-hot `[school_wins, opponent_wins]` labels
    Winner,
    /// Single combined-final-score label
    TotalScore,
}

impl PredictionMode {
    /// Width of one label row
    pub fn label_width(self) -> usize {
        match self {
            PredictionMode::Winner => 2,
            PredictionMode::TotalScore => 1,
        }
    }

    /// Stable tag used in cache artifact file names
    pub fn tag(self) -> &'static str {
        match self {
            PredictionMode::Winner => "winner",
            PredictionMode::TotalScore => "score",
        }
    }
}

impl fmt::Display for PredictionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl std::str::FromStr for PredictionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "winner" => Ok(PredictionMode::Winner),
            "score" | "total-score" => Ok(PredictionMode::TotalScore),
            _ => Err(format!("Unknown mode: {}. Use winner or score.", s)),
        }
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum HoopsError {
    /// A categorical code outside every known mapping. This is a schema
    /// change upstream, not missing data, and must not be masked.
    #[error("Unrecognized {field} code: [{value}]")]
    UnknownCategory { field: &'static str, value: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Unknown school: {0}")]
    UnknownSchool(String),

    #[error("School not found with ID: {0}")]
    SchoolNotFound(SchoolId),

    #[error("No roster for {school} in {year}")]
    RosterMissing { school: SchoolId, year: u16 },

    #[error("Cache artifact error: {0}")]
    Cache(#[from] bincode::Error),

    #[error("Worker pool error: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("Estimator error: {0}")]
    Estimator(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HoopsError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    pub build: BuildConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub database_path: String,
    pub cache_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Worker threads for multi-season builds (0 = one per core)
    pub workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data: DataConfig {
                database_path: "data/hoops.db".to_string(),
                cache_dir: "data/cache".to_string(),
            },
            build: BuildConfig { workers: 0 },
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HoopsError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| HoopsError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| HoopsError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
