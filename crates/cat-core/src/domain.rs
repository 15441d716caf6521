//! The six cognitive domains an item can belong to.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A cognitive domain tag, drawn from a closed set of six.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Pattern,
    Logic,
    Verbal,
    Spatial,
    Math,
    Memory,
}

impl Domain {
    /// All six domains, in the canonical order used wherever a full domain
    /// map must be built (`domain_coverage`, `DOMAIN_WEIGHTS`).
    pub const ALL: [Domain; 6] = [
        Domain::Pattern,
        Domain::Logic,
        Domain::Verbal,
        Domain::Spatial,
        Domain::Math,
        Domain::Memory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Pattern => "pattern",
            Domain::Logic => "logic",
            Domain::Verbal => "verbal",
            Domain::Spatial => "spatial",
            Domain::Math => "math",
            Domain::Memory => "memory",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pattern" => Ok(Domain::Pattern),
            "logic" => Ok(Domain::Logic),
            "verbal" => Ok(Domain::Verbal),
            "spatial" => Ok(Domain::Spatial),
            "math" => Ok(Domain::Math),
            "memory" => Ok(Domain::Memory),
            other => Err(format!("unknown domain: {other}")),
        }
    }
}

/// A zero-initialized coverage map over all six domains, in canonical order.
pub fn empty_coverage() -> HashMap<Domain, u32> {
    Domain::ALL.iter().map(|d| (*d, 0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_str() {
        for domain in Domain::ALL {
            let parsed: Domain = domain.as_str().parse().unwrap();
            assert_eq!(parsed, domain);
        }
    }

    #[test]
    fn rejects_unknown_domain() {
        assert!("astrology".parse::<Domain>().is_err());
    }

    #[test]
    fn empty_coverage_has_all_six_domains_at_zero() {
        let coverage = empty_coverage();
        assert_eq!(coverage.len(), 6);
        assert!(coverage.values().all(|&v| v == 0));
    }

    #[test]
    fn serde_uses_snake_case_tokens() {
        let json = serde_json::to_string(&Domain::Spatial).unwrap();
        assert_eq!(json, "\"spatial\"");
    }
}
