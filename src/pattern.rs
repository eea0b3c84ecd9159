//! Regex filter sets used for exclude/include filtering and content markers.

use anyhow::{Context, Result};
use regex::Regex;

/// A set of regular expressions, compiled once up front.
///
/// Matching is a search: a pattern matches if it is found anywhere in the
/// text. Anchor with `^`/`$` to require a full match.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Regex>,
}

impl PatternSet {
    /// Compile every pattern, failing on the first invalid one.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                Regex::new(p).with_context(|| format!("invalid pattern: {}", p))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Build a set matching `literal` verbatim.
    pub fn literal(literal: &str) -> Result<Self> {
        Self::new([regex::escape(literal)])
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// True iff at least one pattern matches anywhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(text))
    }
}

/// Returns `false` for an absent or empty set, otherwise whether any
/// pattern matches `text`.
pub fn matches_any(text: &str, patterns: Option<&PatternSet>) -> bool {
    patterns.is_some_and(|set| set.is_match(text))
}
