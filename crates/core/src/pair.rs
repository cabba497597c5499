//! Trading pair symbols and the configured allow-list.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A trading pair symbol as the upstream API spells it (e.g. "btcidr").
/// Always stored trimmed and lowercased so user input, config entries and
/// cache keys compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pair(CompactString);

impl Pair {
    /// Normalize a raw symbol into a pair.
    pub fn new(symbol: &str) -> Self {
        Self(CompactString::new(symbol.trim().to_ascii_lowercase()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Base asset of the pair, obtained by stripping the quote suffix
    /// (e.g. "btcidr" with quote "idr" -> "btc"). Falls back to the full
    /// symbol when the suffix does not match or would leave nothing.
    pub fn base<'a>(&'a self, quote: &str) -> &'a str {
        self.0
            .strip_suffix(quote)
            .filter(|base| !base.is_empty())
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Pair {
    fn from(symbol: &str) -> Self {
        Self::new(symbol)
    }
}

/// The fixed allow-list of pairs the bot is willing to serve.
/// Symbols outside this list are rejected before any network I/O.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairList(Vec<Pair>);

impl PairList {
    pub fn from_symbols<S: AsRef<str>>(symbols: &[S]) -> Self {
        let mut pairs: Vec<Pair> = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let pair = Pair::new(symbol.as_ref());
            if !pairs.contains(&pair) {
                pairs.push(pair);
            }
        }
        Self(pairs)
    }

    pub fn contains(&self, pair: &Pair) -> bool {
        self.0.contains(pair)
    }

    /// Reference pair used when probing endpoint health.
    pub fn reference(&self) -> Option<&Pair> {
        self.0.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pair> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
