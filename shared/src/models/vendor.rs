//! Vendor (seller) profile inputs to priority scoring

use serde::{Deserialize, Serialize};

/// Vendor revenue-size bucket used as a priority input
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum GmvTier {
    Platinum,
    Gold,
    Silver,
    #[default]
    Bronze,
}

impl GmvTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            GmvTier::Platinum => "platinum",
            GmvTier::Gold => "gold",
            GmvTier::Silver => "silver",
            GmvTier::Bronze => "bronze",
        }
    }

    /// Parse a tier name; the directory service also reports size aliases
    /// (XL/L/M/S). Unknown values fall back to Bronze.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "platinum" | "xl" => GmvTier::Platinum,
            "gold" | "l" => GmvTier::Gold,
            "silver" | "m" => GmvTier::Silver,
            _ => GmvTier::Bronze,
        }
    }
}

/// A vendor as reported by the vendor directory service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vendor {
    pub handle: String,
    pub gmv_tier: GmvTier,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tier_names_and_size_aliases() {
        assert_eq!(GmvTier::parse("Platinum"), GmvTier::Platinum);
        assert_eq!(GmvTier::parse("XL"), GmvTier::Platinum);
        assert_eq!(GmvTier::parse("L"), GmvTier::Gold);
        assert_eq!(GmvTier::parse("m"), GmvTier::Silver);
        assert_eq!(GmvTier::parse("S"), GmvTier::Bronze);
    }

    #[test]
    fn unknown_tier_defaults_to_bronze() {
        assert_eq!(GmvTier::parse("unrated"), GmvTier::Bronze);
    }
}
