//! Post-processing of candidate URLs returned by a search backend.

use serde::{Deserialize, Serialize};

/// A prefix rewrite applied to the first occurrence of `from`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rewrite {
    pub from: String,
    pub to: String,
}

impl Rewrite {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// Which candidate URLs to drop and which to rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRules {
    /// URLs starting with any of these are dropped.
    pub blocked_prefixes: Vec<String>,
    pub rewrites: Vec<Rewrite>,
}

impl Default for LinkRules {
    fn default() -> Self {
        Self {
            // Abstract indexes, never a readable copy of the paper.
            blocked_prefixes: vec![
                "https://scholar.google.com/".to_string(),
                "https://dl.acm.org/".to_string(),
            ],
            rewrites: vec![
                Rewrite::new("https://arxiv.org/abs", "https://arxiv.org/pdf"),
                Rewrite::new("https://openreview.net/forum", "https://openreview.net/pdf"),
            ],
        }
    }
}

impl LinkRules {
    /// Drop blocked URLs and rewrite abstract pages to their PDF, preserving
    /// order.
    pub fn apply<I>(&self, links: I) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        links
            .into_iter()
            .filter(|link| {
                !self
                    .blocked_prefixes
                    .iter()
                    .any(|prefix| link.starts_with(prefix.as_str()))
            })
            .map(|link| {
                self.rewrites.iter().fold(link, |link, rewrite| {
                    link.replacen(rewrite.from.as_str(), &rewrite.to, 1)
                })
            })
            .collect()
    }

    /// Append `other`'s rules after these.
    pub fn extend(&mut self, other: LinkRules) {
        self.blocked_prefixes.extend(other.blocked_prefixes);
        self.rewrites.extend(other.rewrites);
    }
}
