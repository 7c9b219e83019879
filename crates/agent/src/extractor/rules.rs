//! Lazily compiled pattern tables
//!
//! Every rule family is an ordered table; the first entry that matches
//! wins. Patterns are compiled on first use. A pattern that fails to
//! compile is logged and skipped.

use once_cell::sync::OnceCell;
use regex::Regex;

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            tracing::error!(pattern, error = %e, "Invalid extraction pattern");
            None
        }
    }
}

/// A single alternation of keywords
pub struct Keywords {
    pattern: &'static str,
    regex: OnceCell<Option<Regex>>,
}

impl Keywords {
    pub const fn new(pattern: &'static str) -> Self {
        Self {
            pattern,
            regex: OnceCell::new(),
        }
    }

    fn regex(&self) -> Option<&Regex> {
        self.regex.get_or_init(|| compile(self.pattern)).as_ref()
    }

    pub fn matches(&self, text: &str) -> bool {
        self.regex().is_some_and(|r| r.is_match(text))
    }

    /// First capture group of the first match
    pub fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.regex()?
            .captures(text)?
            .get(1)
            .map(|m| m.as_str())
    }

    pub fn captures_iter<'r, 't>(&'r self, text: &'t str) -> impl Iterator<Item = regex::Captures<'t>> + 'r
    where
        't: 'r,
    {
        self.regex().into_iter().flat_map(move |r| r.captures_iter(text))
    }
}

/// Ordered (pattern, value) table
pub struct Rules<T: 'static> {
    entries: &'static [(&'static str, T)],
    compiled: OnceCell<Vec<(Regex, T)>>,
}

impl<T: Copy + Send + Sync + 'static> Rules<T> {
    pub const fn new(entries: &'static [(&'static str, T)]) -> Self {
        Self {
            entries,
            compiled: OnceCell::new(),
        }
    }

    fn compiled(&self) -> &[(Regex, T)] {
        self.compiled.get_or_init(|| {
            self.entries
                .iter()
                .filter_map(|(pattern, value)| compile(pattern).map(|r| (r, *value)))
                .collect()
        })
    }

    pub fn first(&self, text: &str) -> Option<T> {
        self.compiled()
            .iter()
            .find(|(regex, _)| regex.is_match(text))
            .map(|(_, value)| *value)
    }

    pub fn all(&self, text: &str) -> Vec<T> {
        self.compiled()
            .iter()
            .filter(|(regex, _)| regex.is_match(text))
            .map(|(_, value)| *value)
            .collect()
    }
}

/// Ordered list of patterns whose first capture group is the value
pub struct Patterns {
    entries: &'static [&'static str],
    compiled: OnceCell<Vec<Regex>>,
}

impl Patterns {
    pub const fn new(entries: &'static [&'static str]) -> Self {
        Self {
            entries,
            compiled: OnceCell::new(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Regex> {
        self.compiled
            .get_or_init(|| self.entries.iter().filter_map(|p| compile(p)).collect())
            .iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static SAMPLE: Rules<u8> = Rules::new(&[(r"\bsuv\b", 1), (r"sedan", 2)]);
    static BROKEN: Keywords = Keywords::new(r"(unclosed");

    #[test]
    fn test_first_match_wins() {
        assert_eq!(SAMPLE.first("um sedan ou suv"), Some(1));
        assert_eq!(SAMPLE.first("hatch"), None);
        assert_eq!(SAMPLE.all("sedan ou suv"), vec![1, 2]);
    }

    #[test]
    fn test_invalid_pattern_never_matches() {
        assert!(!BROKEN.matches("(unclosed"));
        assert_eq!(BROKEN.capture("anything"), None);
    }
}
