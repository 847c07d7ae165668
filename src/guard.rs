//! Markup guard: mask markup spans before translation and put them back afterwards
//!
//! Translation backends only see plain text. Anything a [`PatternSet`] matches is replaced by an
//! opaque placeholder token, and the token is swapped back for the original span once the
//! translated text comes back.
//!
//! Token format: `XASDF{pattern:02}{ordinal:02}`, where `ordinal` counts the distinct substrings
//! a single pattern matched. Masking is by value, not by position: every occurrence of a matched
//! substring gets the same token, so repeated markup collapses consistently.
//!
//! ```ignore
//! let (map, masked) = protect("Click **here** to continue.", &PatternSet::sphinx());
//! assert_eq!(masked, "Click XASDF0100 to continue.");
//! let translated = "Cliquez XASDF0100 pour continuer.";
//! assert_eq!(restore(map.as_ref(), translated), "Cliquez **here** pour continuer.");
//! ```

use std::collections::BTreeMap;

use tracing::warn;

use crate::patterns::PatternSet;

/// Improbable prefix shared by all placeholder tokens
pub const PLACEHOLDER_PREFIX: &str = "XASDF";

/// Build the placeholder token for the `ordinal`-th distinct span of pattern `pattern_index`
pub fn placeholder_token(pattern_index: usize, ordinal: usize) -> String {
    format!("{PLACEHOLDER_PREFIX}{pattern_index:02}{ordinal:02}")
}

/// Placeholder token → original markup, valid for a single text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderMap {
    spans: BTreeMap<String, String>,
}

impl PlaceholderMap {
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.spans.get(token).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.spans.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn insert(&mut self, token: String, original: String) {
        self.spans.insert(token, original);
    }
}

/// Replace every markup span in `text` with a placeholder
///
/// Returns `None` for the map when the set is disabled or the text cannot contain markup
/// (fast path); the text is then returned untouched. Otherwise the map may still be empty.
pub fn protect(text: &str, patterns: &PatternSet) -> (Option<PlaceholderMap>, String) {
    if !patterns.may_match(text) {
        return (None, text.to_string());
    }

    let mut map = PlaceholderMap::default();
    let mut working = text.to_string();

    for (index, pattern) in patterns.iter().enumerate() {
        // Matches are collected on the text as it stood before this pattern's replacements
        let found: Vec<String> = pattern
            .find_spans(&working)
            .into_iter()
            .map(str::to_owned)
            .collect();

        let mut distinct: Vec<String> = Vec::new();
        for span in found {
            if distinct.contains(&span) {
                continue;
            }
            let token = placeholder_token(index, distinct.len());
            working = working.replace(&span, &token);
            map.insert(token, span.clone());
            distinct.push(span);
        }
    }

    (Some(map), working)
}

/// Put the original markup back into `translated`
///
/// When the first occurrence of a placeholder is fused with a following letter or digit
/// (`XASDF0100ly`), every occurrence of it is restored with a trailing space. Placeholders the
/// backend dropped are skipped; their markup is lost.
pub fn restore(map: Option<&PlaceholderMap>, translated: &str) -> String {
    let Some(map) = map else {
        return translated.to_string();
    };

    let mut text = translated.to_string();

    // Reverse order: longer tokens before their prefixes, later patterns (whose spans may
    // hold earlier tokens) before earlier ones.
    for (token, original) in map.spans.iter().rev() {
        let Some(pos) = text.find(token.as_str()) else {
            warn!(placeholder = %token, markup = %original, "placeholder missing from translation");
            continue;
        };

        let fused = text[pos + token.len()..]
            .chars()
            .next()
            .is_some_and(char::is_alphanumeric);
        text = if fused {
            text.replace(token.as_str(), &format!("{original} "))
        } else {
            text.replace(token.as_str(), original)
        };
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(text: &str) -> String {
        let (map, masked) = protect(text, &PatternSet::sphinx());
        restore(map.as_ref(), &masked)
    }

    #[test]
    fn test_placeholder_token_format() {
        assert_eq!(placeholder_token(0, 0), "XASDF0000");
        assert_eq!(placeholder_token(4, 12), "XASDF0412");
    }

    #[test]
    fn test_disabled_set_is_identity() {
        for text in ["", "plain", "**bold** and `code`", "a_b *c*"] {
            let (map, masked) = protect(text, &PatternSet::disabled());
            assert!(map.is_none());
            assert_eq!(masked, text);
        }
    }

    #[test]
    fn test_fast_path_without_trigger_chars() {
        let (map, masked) = protect("Nothing to see here.", &PatternSet::sphinx());
        assert!(map.is_none());
        assert_eq!(masked, "Nothing to see here.");
    }

    #[test]
    fn test_trigger_present_but_no_match() {
        let (map, masked) = protect("snake_case", &PatternSet::sphinx());
        assert_eq!(map, Some(PlaceholderMap::default()));
        assert_eq!(masked, "snake_case");
    }

    #[test]
    fn test_mask_bold() {
        let (map, masked) = protect("Click **here** to continue.", &PatternSet::sphinx());
        let map = map.unwrap();
        assert_eq!(masked, "Click XASDF0100 to continue.");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("XASDF0100"), Some("**here**"));
    }

    #[test]
    fn test_roundtrip_one_of_each() {
        let text = "Use :ref:`intro` with **bold**, *italic*, ``lit`` and `code` now.";
        let (map, masked) = protect(text, &PatternSet::sphinx());
        assert_eq!(
            masked,
            "Use XASDF0000 with XASDF0100, XASDF0200, XASDF0300 and XASDF0400 now."
        );
        assert_eq!(map.unwrap().len(), 5);
        assert_eq!(roundtrip(text), text);
    }

    #[test]
    fn test_roundtrip_link() {
        let text = "See `the docs <https://docs.python.org>`_ for more.";
        assert_eq!(roundtrip(text), text);
    }

    #[test]
    fn test_repeated_span_shares_placeholder() {
        let text = "`code` and `code` again";
        let (map, masked) = protect(text, &PatternSet::sphinx());
        let map = map.unwrap();
        assert_eq!(masked, "XASDF0400 and XASDF0400 again");
        assert_eq!(map.len(), 1);
        assert_eq!(restore(Some(&map), &masked), text);
    }

    #[test]
    fn test_distinct_spans_of_one_pattern_stay_distinct() {
        let text = "**a** and **b**";
        let (map, masked) = protect(text, &PatternSet::sphinx());
        assert_eq!(masked, "XASDF0100 and XASDF0101");
        assert_eq!(restore(map.as_ref(), &masked), text);
    }

    #[test]
    fn test_boundary_repair_inserts_space() {
        let (map, masked) = protect("**bold** text", &PatternSet::sphinx());
        assert_eq!(masked, "XASDF0100 text");
        let restored = restore(map.as_ref(), "XASDF0100ly text");
        assert!(restored.contains("**bold** ly"));
        assert!(!restored.contains("**bold**ly"));
    }

    #[test]
    fn test_boundary_repair_follows_first_occurrence() {
        let (map, _) = protect("`x` or `x`", &PatternSet::sphinx());

        let restored = restore(map.as_ref(), "XASDF0400é, XASDF0400.");
        assert_eq!(restored, "`x` é, `x` .");

        let restored = restore(map.as_ref(), "XASDF0400, XASDF0400é");
        assert_eq!(restored, "`x`, `x`é");
    }

    #[test]
    fn test_no_space_before_punctuation_or_end() {
        let (map, _) = protect("**a**", &PatternSet::sphinx());
        assert_eq!(restore(map.as_ref(), "XASDF0100."), "**a**.");
        assert_eq!(restore(map.as_ref(), "XASDF0100"), "**a**");
    }

    #[test]
    fn test_missing_placeholder_is_silently_dropped() {
        let (map, _) = protect("**a** b", &PatternSet::sphinx());
        assert_eq!(restore(map.as_ref(), "b"), "b");
    }

    #[test]
    fn test_restore_without_map_is_identity() {
        assert_eq!(restore(None, "XASDF0100 stays"), "XASDF0100 stays");
    }

    #[test]
    fn test_nested_placeholder_is_expanded() {
        // the link-tail span swallows the interpreted-text placeholder
        let text = "(see `a`) _ done";
        let (map, masked) = protect(text, &PatternSet::sphinx());
        assert_eq!(masked, "XASDF0500 done");
        assert_eq!(
            map.as_ref().unwrap().get("XASDF0500"),
            Some("(see XASDF0400) _")
        );
        assert_eq!(restore(map.as_ref(), &masked), text);
    }

    #[test]
    fn test_pattern_order_is_observable() {
        let bold_first = PatternSet::from_patterns(&[r"\*\*[^\*]+\*\*", r"\*[^\*]+\*"]).unwrap();
        let italic_first = PatternSet::from_patterns(&[r"\*[^\*]+\*", r"\*\*[^\*]+\*\*"]).unwrap();

        let (_, masked) = protect("**x**", &bold_first);
        assert_eq!(masked, "XASDF0000");

        let (map, masked) = protect("**x**", &italic_first);
        assert_eq!(masked, "*XASDF0000*");
        assert_eq!(map.unwrap().len(), 1);
    }

    #[test]
    fn test_ordinal_prefix_tokens_do_not_clash() {
        let exprs = [r"\[\d+\]"];
        let set = PatternSet::from_patterns(&exprs).unwrap();
        let text: String = (0..101).map(|i| format!("[{i}] ")).collect();
        let (map, masked) = protect(&text, &set);
        assert_eq!(map.as_ref().unwrap().len(), 101);
        assert!(masked.contains("XASDF00100"));
        assert_eq!(restore(map.as_ref(), &masked), text);
    }
}
