//! Localized descriptions and dynamic market parameterization.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Synthetic description key carrying the dynamic-market discriminator.
pub const KEY_DYNAMIC: &str = "_dynamic";
/// Synthetic keys carrying the handicap pair.
pub const KEY_HANDICAP_HOME: &str = "_hch";
pub const KEY_HANDICAP_AWAY: &str = "_hca";
/// Synthetic key carrying the over/under line.
pub const KEY_OVER_UNDER: &str = "_ou";

/// An ordered collection of `(key, text)` pairs: languages plus the
/// synthetic `_dynamic` keys that disambiguate parameterized markets.
///
/// On the ledger this is carried as a list of two-element arrays; authored
/// files may also use a plain map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Description {
    pairs: Vec<(String, String)>,
}

impl Description {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pair, replacing any existing entry for the same key.
    pub fn push(&mut self, key: impl Into<String>, text: impl Into<String>) {
        let key = key.into();
        let text = text.into();
        if let Some(entry) = self.pairs.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = text;
        } else {
            self.pairs.push((key, text));
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_pair(&self, key: &str, text: &str) -> bool {
        self.pairs.iter().any(|(k, v)| k == key && v == text)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Set-equality over unordered `(key, text)` pairs: both collections
    /// must be mutual subsets of each other.
    pub fn set_eq(&self, other: &Description) -> bool {
        self.pairs.iter().all(|p| other.pairs.contains(p))
            && other.pairs.iter().all(|p| self.pairs.contains(p))
    }

    /// A copy restricted to the keys accepted by `keep`.
    pub fn filtered(&self, keep: impl Fn(&str) -> bool) -> Description {
        Description {
            pairs: self
                .pairs
                .iter()
                .filter(|(k, _)| keep(k))
                .cloned()
                .collect(),
        }
    }

    /// The dynamic-market discriminator, when present.
    pub fn dynamic_kind(&self) -> Option<&str> {
        self.get(KEY_DYNAMIC)
    }
}

impl FromIterator<(String, String)> for Description {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut descr = Description::new();
        for (k, v) in iter {
            descr.push(k, v);
        }
        descr
    }
}

impl Serialize for Description {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.pairs.iter())
    }
}

impl<'de> Deserialize<'de> for Description {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Pairs(Vec<(String, String)>),
            Map(BTreeMap<String, String>),
        }
        Ok(match Repr::deserialize(deserializer)? {
            Repr::Pairs(pairs) => pairs.into_iter().collect(),
            Repr::Map(map) => map.into_iter().collect(),
        })
    }
}

/// The numeric parameterization of a dynamic market group: either a
/// handicap pair or an over/under line, never both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DynamicParams {
    Handicap { home: i64, away: i64 },
    OverUnder(f64),
}

impl DynamicParams {
    /// Build a handicap pair. When only one side is given, the other side
    /// is its negation.
    pub fn handicap(home: Option<i64>, away: Option<i64>) -> Result<Self> {
        let (home, away) = match (home, away) {
            (Some(h), Some(a)) => (h, a),
            (Some(h), None) => (h, -h),
            (None, Some(a)) => (-a, a),
            (None, None) => {
                return Err(Error::Config {
                    message: "handicap requires at least one side".to_string(),
                })
            }
        };
        Ok(Self::Handicap { home, away })
    }

    /// Build an over/under line. The effective line is the requested
    /// threshold rounded down to the next half-integer: `floor(t) + 0.5`.
    /// Half-integer lines can never be hit exactly, so draws on the line
    /// are impossible.
    pub fn over_under(line: f64) -> Self {
        Self::OverUnder(line.floor() + 0.5)
    }

    /// The `_dynamic` discriminator carried in descriptions.
    pub fn discriminator(&self) -> &'static str {
        match self {
            DynamicParams::Handicap { .. } => "hc",
            DynamicParams::OverUnder(_) => "ou",
        }
    }
}
