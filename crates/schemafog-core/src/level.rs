use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Ordinal degree of name obfuscation, from `L0` (none) to `L3` (heaviest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AmbiguityLevel {
    L0,
    L1,
    L2,
    L3,
}

impl AmbiguityLevel {
    /// All levels in ascending order.
    pub const ALL: [AmbiguityLevel; 4] = [
        AmbiguityLevel::L0,
        AmbiguityLevel::L1,
        AmbiguityLevel::L2,
        AmbiguityLevel::L3,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AmbiguityLevel::L0 => "L0",
            AmbiguityLevel::L1 => "L1",
            AmbiguityLevel::L2 => "L2",
            AmbiguityLevel::L3 => "L3",
        }
    }
}

impl fmt::Display for AmbiguityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AmbiguityLevel {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "L0" => Ok(AmbiguityLevel::L0),
            "L1" => Ok(AmbiguityLevel::L1),
            "L2" => Ok(AmbiguityLevel::L2),
            "L3" => Ok(AmbiguityLevel::L3),
            _ => Err(Error::Configuration(format!(
                "unknown ambiguity level: {value}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("l2".parse::<AmbiguityLevel>().unwrap(), AmbiguityLevel::L2);
        assert_eq!(" L3 ".parse::<AmbiguityLevel>().unwrap(), AmbiguityLevel::L3);
    }

    #[test]
    fn rejects_unknown_level() {
        let err = "L4".parse::<AmbiguityLevel>().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn levels_are_ordered() {
        assert!(AmbiguityLevel::L0 < AmbiguityLevel::L1);
        assert!(AmbiguityLevel::L2 < AmbiguityLevel::L3);
        assert_eq!(AmbiguityLevel::ALL.len(), 4);
    }
}
