//! Ordered sets of markup patterns that must survive machine translation
//!
//! A [`PatternSet`] is evaluated in order by the markup guard: every span a pattern matches is
//! swapped for a placeholder before the next pattern scans, so later patterns only see what
//! earlier ones left behind. Reordering a set changes what gets protected.
//!
//! The `regex` crate has no look-around. A pattern that needs trailing context (e.g. "a `*`
//! not followed by another `*`") names the protected part `span`; whatever follows the group is
//! checked but not consumed, and scanning resumes at the end of `span`.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::PoResult;

/// Name of the capture group holding the protected text, when a pattern has one
pub const SPAN_GROUP: &str = "span";

/// Sphinx directives/roles, bold, italic, inline literals, interpreted text and
/// reST link tails, in evaluation order.
pub const DEFAULT_EXCLUDE_PATTERNS: [&str; 7] = [
    r":\w+(?::\w+)?:`[^`]+`",
    r"\*\*[^\*]+\*\*",
    r"(?P<span>\*[^\*]+\*)(?:[^\*]|$)",
    r"``[^`]+``",
    r"(?P<span>`[^`]+`)(?:[^`]|$)",
    r"(?P<span>.*?[^\w]_)(?:[^_]|$)",
    r".*?[^\w]__",
];

/// Characters at least one of which must appear for the default set to match anything
pub const DEFAULT_TRIGGER_CHARS: [char; 3] = ['`', '*', '_'];

static SPHINX: LazyLock<PatternSet> = LazyLock::new(|| {
    PatternSet::from_patterns(&DEFAULT_EXCLUDE_PATTERNS)
        .expect("default exclude patterns compile")
        .with_triggers(&DEFAULT_TRIGGER_CHARS)
});

/// A single compiled markup rule
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    pub fn new(expr: &str) -> PoResult<Self> {
        Ok(Self {
            regex: Regex::new(expr)?,
        })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Find every non-overlapping protected span in `text`, left to right
    ///
    /// Spans are returned by value, duplicates included. Empty spans are never returned.
    pub fn find_spans<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let mut spans = Vec::new();
        let mut pos = 0;

        while pos <= text.len() {
            let Some(caps) = self.regex.captures_at(text, pos) else {
                break;
            };
            let Some(span) = caps.name(SPAN_GROUP).or_else(|| caps.get(0)) else {
                break;
            };

            if span.is_empty() {
                // Step over one character so an empty match cannot stall the scan
                match text[span.end()..].chars().next() {
                    Some(c) => pos = span.end() + c.len_utf8(),
                    None => break,
                }
                continue;
            }

            spans.push(span.as_str());
            pos = span.end();
        }

        spans
    }
}

/// An immutable, ordered collection of [`Pattern`]s
///
/// Cheap to clone and safe to share between tasks.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
    /// When set, text containing none of these characters is assumed markup-free
    triggers: Option<Vec<char>>,
}

impl PatternSet {
    /// The default set for Sphinx/reStructuredText catalogs
    pub fn sphinx() -> Self {
        SPHINX.clone()
    }

    /// A set that protects nothing; the guard becomes the identity
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Compile a custom, ordered set
    ///
    /// Custom sets carry no trigger characters, so every text is scanned.
    pub fn from_patterns<S: AsRef<str>>(exprs: &[S]) -> PoResult<Self> {
        let patterns = exprs
            .iter()
            .map(|expr| Pattern::new(expr.as_ref()))
            .collect::<PoResult<Vec<_>>>()?;

        Ok(Self {
            patterns,
            triggers: None,
        })
    }

    /// Attach fast-path trigger characters
    pub fn with_triggers(mut self, chars: &[char]) -> Self {
        self.triggers = Some(chars.to_vec());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    /// Whether `text` is worth scanning at all
    pub fn may_match(&self, text: &str) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        match &self.triggers {
            Some(chars) => text.contains(chars.as_slice()),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(pattern_index: usize, text: &str) -> Vec<String> {
        let set = PatternSet::sphinx();
        let pattern = set.iter().nth(pattern_index).unwrap();
        pattern
            .find_spans(text)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_default_set_shape() {
        let set = PatternSet::sphinx();
        assert_eq!(set.len(), 7);
        assert!(!set.is_empty());
        assert_eq!(set.iter().next().unwrap().as_str(), DEFAULT_EXCLUDE_PATTERNS[0]);
    }

    #[test]
    fn test_directive_role() {
        assert_eq!(
            spans(0, "See :ref:`intro` and :py:func:`len`."),
            vec![":ref:`intro`", ":py:func:`len`"]
        );
    }

    #[test]
    fn test_bold() {
        assert_eq!(spans(1, "a **b** c **d e**"), vec!["**b**", "**d e**"]);
    }

    #[test]
    fn test_italic_not_followed_by_star() {
        assert_eq!(spans(2, "an *italic* word"), vec!["*italic*"]);
        assert_eq!(spans(2, "*end*"), vec!["*end*"]);
        // "*a*" is directly followed by another star
        assert!(spans(2, "*a**").is_empty());
    }

    #[test]
    fn test_italic_does_not_consume_trailing_context() {
        assert_eq!(spans(2, "*a* *b*"), vec!["*a*", "*b*"]);
    }

    #[test]
    fn test_inline_literal() {
        assert_eq!(spans(3, "use ``len()`` here"), vec!["``len()``"]);
    }

    #[test]
    fn test_interpreted_text() {
        assert_eq!(spans(4, "call `foo` now"), vec!["`foo`"]);
        // inline literals are left for the literal pattern
        assert!(spans(4, "``lit``").is_empty());
    }

    #[test]
    fn test_link_tail_single_underscore() {
        assert_eq!(spans(5, "see (docs) _ here"), vec!["see (docs) _"]);
        assert!(spans(5, "snake_case").is_empty());
    }

    #[test]
    fn test_link_tail_double_underscore() {
        assert_eq!(spans(6, "read this) __ now"), vec!["read this) __"]);
        // single-underscore pattern must not claim a double underscore
        assert!(spans(5, "x) __").is_empty());
    }

    #[test]
    fn test_custom_pattern_whole_match() {
        let set = PatternSet::from_patterns(&[r"\{\w+\}"]).unwrap();
        let pattern = set.iter().next().unwrap();
        assert_eq!(pattern.find_spans("Hi {name}, {count}"), vec!["{name}", "{count}"]);
    }

    #[test]
    fn test_empty_matches_are_skipped() {
        let set = PatternSet::from_patterns(&["x*"]).unwrap();
        let pattern = set.iter().next().unwrap();
        assert_eq!(pattern.find_spans("ab xx é"), vec!["xx"]);
    }

    #[test]
    fn test_invalid_pattern() {
        let result = PatternSet::from_patterns(&["(unclosed"]);
        assert!(matches!(result, Err(crate::error::PoError::InvalidPattern(_))));
    }

    #[test]
    fn test_may_match_default_triggers() {
        let set = PatternSet::sphinx();
        assert!(!set.may_match("plain text"));
        assert!(set.may_match("some *text*"));
        assert!(set.may_match("a_b"));
        assert!(set.may_match("`x`"));
    }

    #[test]
    fn test_may_match_custom_and_disabled() {
        let custom = PatternSet::from_patterns(&[r"\d+"]).unwrap();
        assert!(custom.may_match("plain text"));
        assert!(!PatternSet::disabled().may_match("**bold**"));
        assert!(!PatternSet::from_patterns::<&str>(&[]).unwrap().may_match("*x*"));
    }
}
