use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// A listing source this system polls.
///
/// Closed set; the lowercase name is the durable partition key for the
/// seen-state file, so variants must never be renamed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKey {
    Prada,
    Karo,
    Kinoformat,
}

impl SourceKey {
    pub const ALL: [SourceKey; 3] = [SourceKey::Prada, SourceKey::Karo, SourceKey::Kinoformat];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKey::Prada => "prada",
            SourceKey::Karo => "karo",
            SourceKey::Kinoformat => "kinoformat",
        }
    }

    /// Human label used when rendering digests and alerts.
    pub fn label(&self) -> &'static str {
        match self {
            SourceKey::Prada => "Prada 3D",
            SourceKey::Karo => "Karo 10 Реутов",
            SourceKey::Kinoformat => "Киноцентр (Kino-Format)",
        }
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "prada" => Ok(SourceKey::Prada),
            "karo" => Ok(SourceKey::Karo),
            "kinoformat" => Ok(SourceKey::Kinoformat),
            other => Err(Error::Config(format!(
                "unknown source: {other} (expected prada, karo or kinoformat)"
            ))),
        }
    }
}

/// How eager a fetch should be.
///
/// `Quick` prefers the direct HTTP path and only escalates when blocked;
/// `Full` lets sources that support it go straight to the browser renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchMode {
    Quick,
    Full,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_key_round_trips_through_str() {
        for key in SourceKey::ALL {
            assert_eq!(key.as_str().parse::<SourceKey>().unwrap(), key);
        }
    }

    #[test]
    fn source_key_parse_is_case_insensitive() {
        assert_eq!("Prada".parse::<SourceKey>().unwrap(), SourceKey::Prada);
        assert_eq!(" KARO ".parse::<SourceKey>().unwrap(), SourceKey::Karo);
        assert!("imax".parse::<SourceKey>().is_err());
    }

    #[test]
    fn source_key_serializes_as_lowercase_string() {
        let json = serde_json::to_string(&SourceKey::Kinoformat).unwrap();
        assert_eq!(json, "\"kinoformat\"");
    }
}
