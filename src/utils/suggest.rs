use crate::intent::OperatorKind;
use crate::keywords::Lexicon;
use serde::Serialize;
use strsim::levenshtein;

/// Max edit distance accepted by default
pub const DEFAULT_THRESHOLD: usize = 2;

/// A known operator word close to what the user typed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub keyword: String,
    pub distance: usize,
    pub operator: OperatorKind,
}

/// Edit-distance lookup over the lexicon's operator words.
///
/// Diagnostic only: the parser never calls this on its own. A candidate must
/// be within the threshold and strictly closer than the typed word is long,
/// so two-character words never match unrelated two-character operators.
pub struct OperatorSuggester<'a> {
    lexicon: &'a dyn Lexicon,
    threshold: usize,
}

impl<'a> OperatorSuggester<'a> {
    pub fn new(lexicon: &'a dyn Lexicon) -> Self {
        Self {
            lexicon,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    /// Closest operator word, if any is close enough
    pub fn find_most_similar(&self, word: &str) -> Option<String> {
        self.suggest(word, 1).into_iter().next().map(|s| s.keyword)
    }

    /// Up to `k` operator words ranked by distance, ties alphabetically
    pub fn suggest(&self, word: &str, k: usize) -> Vec<Suggestion> {
        let word = word.trim().to_lowercase();
        let len = word.chars().count();
        if len == 0 || k == 0 {
            return Vec::new();
        }

        let mut found: Vec<Suggestion> = self
            .lexicon
            .keywords()
            .filter_map(|(keyword, entry)| {
                let operator = entry.operator?;
                let distance = levenshtein(&word, keyword);
                (distance <= self.threshold && distance < len).then(|| Suggestion {
                    keyword: keyword.to_string(),
                    distance,
                    operator,
                })
            })
            .collect();

        found.sort_by(|a, b| a.distance.cmp(&b.distance).then_with(|| a.keyword.cmp(&b.keyword)));
        found.truncate(k);
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::KeywordTables;

    fn suggester() -> OperatorSuggester<'static> {
        OperatorSuggester::new(KeywordTables::builtin())
    }

    #[test]
    fn test_typo_recovers_operator() {
        assert_eq!(suggester().find_most_similar("大雨"), Some("大于".to_string()));
    }

    #[test]
    fn test_far_word_has_no_match() {
        assert_eq!(suggester().find_most_similar("根本不是操作符"), None);
        assert_eq!(suggester().find_most_similar(""), None);
    }

    #[test]
    fn test_english_typo() {
        let s = suggester().suggest("contians", 3);
        assert_eq!(s[0].keyword, "contains");
        assert_eq!(s[0].operator, OperatorKind::Like);
        assert_eq!(s[0].distance, 2);
    }

    #[test]
    fn test_ranked_and_truncated() {
        let s = suggester().suggest("小于等", 5);
        assert!(!s.is_empty() && s.len() <= 5);
        // 小于 and 小于等于 are both one edit away; ties sort by keyword
        assert_eq!(s[0].keyword, "小于");
        assert_eq!(s[1].keyword, "小于等于");
        assert_eq!(s[1].distance, 1);
        assert!(s.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn test_threshold_is_configurable() {
        assert_eq!(suggester().with_threshold(0).find_most_similar("大雨"), None);
        assert_eq!(suggester().with_threshold(0).find_most_similar("大于"), Some("大于".to_string()));
    }
}
