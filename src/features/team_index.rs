//! Per-season roster index
//!
//! Groups one season's player records by school and normalizes each group
//! once, so game iteration gets O(1) roster lookups.

use std::collections::HashMap;

use crate::features::TeamRoster;
use crate::{PlayerRecord, SchoolId};

/// Normalized rosters for every school with at least one player record in
/// a season. Schools with no tracked players are simply absent; lookup
/// returns `None` rather than an empty roster.
#[derive(Debug, Clone)]
pub struct TeamIndex {
    rosters: HashMap<SchoolId, TeamRoster>,
}

impl TeamIndex {
    /// Build the index from a season's player records.
    ///
    /// Input order is preserved within each school's group, which keeps
    /// the roster sort's tie-breaking deterministic.
    pub fn build(records: Vec<PlayerRecord>) -> Self {
        let mut grouped: HashMap<SchoolId, Vec<PlayerRecord>> = HashMap::new();
        for record in records {
            grouped.entry(record.school).or_default().push(record);
        }

        let rosters = grouped
            .into_iter()
            .map(|(school, players)| (school, TeamRoster::from_records(players)))
            .collect();

        TeamIndex { rosters }
    }

    /// Look up a school's normalized roster
    pub fn get(&self, school: SchoolId) -> Option<&TeamRoster> {
        self.rosters.get(&school)
    }

    pub fn contains(&self, school: SchoolId) -> bool {
        self.rosters.contains_key(&school)
    }

    /// Number of schools with a roster this season
    pub fn len(&self) -> usize {
        self.rosters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rosters.is_empty()
    }
}
