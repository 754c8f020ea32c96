//! One-hot encoding for categorical player fields
//!
//! Both enumerations are closed: every code the source site has ever used
//! maps to a variant, absent values map to the explicit unknown/none
//! variant, and anything else is a fatal data error because it means the
//! source schema changed.

use serde::{Deserialize, Serialize};

use crate::{HoopsError, Result};

/// Court position, as listed on the roster page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    None,
    Guard,
    Forward,
    Center,
}

impl Position {
    /// Width of the one-hot encoding
    pub const WIDTH: usize = 4;

    const ONE_HOT: [[f32; Self::WIDTH]; 4] = [
        [1.0, 0.0, 0.0, 0.0], // None
        [0.0, 1.0, 0.0, 0.0], // Guard
        [0.0, 0.0, 1.0, 0.0], // Forward
        [0.0, 0.0, 0.0, 1.0], // Center
    ];

    /// Parse a free-text position code. Absent means the roster page left
    /// the column blank, which is fine; an unrecognized code is not.
    pub fn from_code(code: Option<&str>) -> Result<Self> {
        match code {
            None => Ok(Position::None),
            Some("G") | Some("Guard") => Ok(Position::Guard),
            Some("F") | Some("Forward") => Ok(Position::Forward),
            Some("C") => Ok(Position::Center),
            Some(other) => Err(HoopsError::UnknownCategory {
                field: "position",
                value: other.to_string(),
            }),
        }
    }

    pub fn one_hot(self) -> [f32; Self::WIDTH] {
        Self::ONE_HOT[self as usize]
    }

    pub fn code(self) -> &'static str {
        match self {
            Position::None => "",
            Position::Guard => "G",
            Position::Forward => "F",
            Position::Center => "C",
        }
    }
}

/// Academic class year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassYear {
    Freshman,
    Junior,
    Sophomore,
    Senior,
    Unknown,
}

impl ClassYear {
    /// Width of the one-hot encoding
    pub const WIDTH: usize = 5;

    // Column order matches the historical feature layout (junior before
    // sophomore); changing it would silently invalidate cached tensors.
    const ONE_HOT: [[f32; Self::WIDTH]; 5] = [
        [1.0, 0.0, 0.0, 0.0, 0.0], // Freshman
        [0.0, 1.0, 0.0, 0.0, 0.0], // Junior
        [0.0, 0.0, 1.0, 0.0, 0.0], // Sophomore
        [0.0, 0.0, 0.0, 1.0, 0.0], // Senior
        [0.0, 0.0, 0.0, 0.0, 1.0], // Unknown
    ];

    /// Parse a free-text class code. `"---"` is the source's explicit
    /// "unknown" marker.
    pub fn from_code(code: Option<&str>) -> Result<Self> {
        match code {
            Some("Fr.") => Ok(ClassYear::Freshman),
            Some("So.") => Ok(ClassYear::Sophomore),
            Some("Jr.") => Ok(ClassYear::Junior),
            Some("Sr.") => Ok(ClassYear::Senior),
            Some("---") | None => Ok(ClassYear::Unknown),
            Some(other) => Err(HoopsError::UnknownCategory {
                field: "class",
                value: other.to_string(),
            }),
        }
    }

    pub fn one_hot(self) -> [f32; Self::WIDTH] {
        Self::ONE_HOT[self as usize]
    }

    pub fn code(self) -> &'static str {
        match self {
            ClassYear::Freshman => "Fr.",
            ClassYear::Junior => "Jr.",
            ClassYear::Sophomore => "So.",
            ClassYear::Senior => "Sr.",
            ClassYear::Unknown => "---",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_codes() {
        assert_eq!(Position::from_code(Some("G")).unwrap(), Position::Guard);
        assert_eq!(Position::from_code(Some("Guard")).unwrap(), Position::Guard);
        assert_eq!(Position::from_code(Some("F")).unwrap(), Position::Forward);
        assert_eq!(Position::from_code(Some("C")).unwrap(), Position::Center);
        assert_eq!(Position::from_code(None).unwrap(), Position::None);
    }

    #[test]
    fn test_unknown_position_is_fatal() {
        let err = Position::from_code(Some("PG")).unwrap_err();
        match err {
            HoopsError::UnknownCategory { field, value } => {
                assert_eq!(field, "position");
                assert_eq!(value, "PG");
            }
            other => panic!("expected UnknownCategory, got {:?}", other),
        }
    }

    #[test]
    fn test_class_codes() {
        assert_eq!(ClassYear::from_code(Some("Fr.")).unwrap(), ClassYear::Freshman);
        assert_eq!(ClassYear::from_code(Some("Sr.")).unwrap(), ClassYear::Senior);
        assert_eq!(ClassYear::from_code(Some("---")).unwrap(), ClassYear::Unknown);
        assert_eq!(ClassYear::from_code(None).unwrap(), ClassYear::Unknown);
        assert!(ClassYear::from_code(Some("Freshman")).is_err());
    }

    #[test]
    fn test_one_hot_is_exactly_one() {
        for pos in [Position::None, Position::Guard, Position::Forward, Position::Center] {
            let v = pos.one_hot();
            assert_eq!(v.iter().sum::<f32>(), 1.0);
        }
        for class in [
            ClassYear::Freshman,
            ClassYear::Junior,
            ClassYear::Sophomore,
            ClassYear::Senior,
            ClassYear::Unknown,
        ] {
            let v = class.one_hot();
            assert_eq!(v.iter().sum::<f32>(), 1.0);
        }
    }

    #[test]
    fn test_codes_round_trip() {
        for pos in [Position::Guard, Position::Forward, Position::Center] {
            assert_eq!(Position::from_code(Some(pos.code())).unwrap(), pos);
        }
    }
}
