//! Keyword dictionary consumed by the tokenizer and every extraction pass.
//!
//! A surface form may belong to several categories at once (从 is both a
//! locative prefix and a pagination word), so each word maps to one
//! [`KeywordEntry`] holding all of them. Passes only ever see the
//! [`Lexicon`] trait, which keeps them testable against small fake tables.

mod builtin;

use crate::intent::{AggregationType, LogicKind, OperatorKind, SortOrder};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// When the tokenizer may recognize a word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchContext {
    #[default]
    Always,
    /// Only when a digit follows (前10, 第3)
    BeforeNumber,
    /// Only directly after a number token (10条, 3页)
    AfterNumber,
    /// Only directly after an index indicator (索引中)
    AfterIndexIndicator,
}

/// Sort marker words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortWord {
    Order(SortOrder),
    /// 排序 / sort with no direction; ascending unless an order word is adjacent
    Generic,
}

/// Pagination vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationWord {
    Limit,
    Offset,
    Page,
    /// 第, introduces either a page number or a record position
    Ordinal,
    /// 页
    PageUnit,
    PageSize,
    From,
    Continue,
    /// 条 / 个 / 行
    RecordUnit,
    /// 开始
    Start,
}

/// Where a locative word sits relative to an index name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locative {
    Prefix,
    Suffix,
}

/// Every category one surface form belongs to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordEntry {
    pub context: MatchContext,
    pub operator: Option<OperatorKind>,
    pub logic: Option<LogicKind>,
    pub delimiter: bool,
    pub aggregation: Option<AggregationType>,
    pub interval: Option<String>,
    pub sort: Option<SortWord>,
    pub sort_boundary: bool,
    pub aggregation_helper: bool,
    pub aggregation_size_prefix: bool,
    pub pagination: Option<PaginationWord>,
    pub range_separator: bool,
    pub range_close: bool,
    pub index_indicator: bool,
    pub demonstrative: bool,
    pub locative: Option<Locative>,
    pub stop_word: bool,
    pub date_range_label: bool,
}

impl KeywordEntry {
    /// Categories that do not give the token a kind of its own. Words with
    /// any of these stay UNKNOWN tokens but must not be merged into fields.
    pub fn is_reserved(&self) -> bool {
        self.sort_boundary
            || self.aggregation_helper
            || self.aggregation_size_prefix
            || self.pagination.is_some()
            || self.range_separator
            || self.range_close
            || self.index_indicator
            || self.demonstrative
            || self.locative.is_some()
            || self.stop_word
            || self.date_range_label
    }
}

/// Read-only keyword lookup.
///
/// Implementors only provide [`Lexicon::entry`], [`Lexicon::keywords`] and
/// [`Lexicon::longest_keyword_chars`]; the category helpers are derived.
pub trait Lexicon: Send + Sync {
    /// Look a word up, ASCII case-insensitively
    fn entry(&self, word: &str) -> Option<&KeywordEntry>;

    /// Longest keyword length in characters, bounding the tokenizer's match window
    fn longest_keyword_chars(&self) -> usize;

    /// All known words with their entries
    fn keywords(&self) -> Box<dyn Iterator<Item = (&str, &KeywordEntry)> + '_>;

    fn operator(&self, word: &str) -> Option<OperatorKind> {
        self.entry(word).and_then(|e| e.operator)
    }

    fn logic(&self, word: &str) -> Option<LogicKind> {
        self.entry(word).and_then(|e| e.logic)
    }

    fn aggregation(&self, word: &str) -> Option<AggregationType> {
        self.entry(word).and_then(|e| e.aggregation)
    }

    fn interval(&self, word: &str) -> Option<&str> {
        self.entry(word).and_then(|e| e.interval.as_deref())
    }

    fn sort(&self, word: &str) -> Option<SortWord> {
        self.entry(word).and_then(|e| e.sort)
    }

    fn pagination(&self, word: &str) -> Option<PaginationWord> {
        self.entry(word).and_then(|e| e.pagination)
    }

    fn locative(&self, word: &str) -> Option<Locative> {
        self.entry(word).and_then(|e| e.locative)
    }

    fn is_delimiter(&self, word: &str) -> bool {
        self.entry(word).is_some_and(|e| e.delimiter)
    }

    fn is_stop_word(&self, word: &str) -> bool {
        self.entry(word).is_some_and(|e| e.stop_word)
    }

    fn is_index_indicator(&self, word: &str) -> bool {
        self.entry(word).is_some_and(|e| e.index_indicator)
    }

    fn is_demonstrative(&self, word: &str) -> bool {
        self.entry(word).is_some_and(|e| e.demonstrative)
    }

    fn is_sort_boundary(&self, word: &str) -> bool {
        self.entry(word).is_some_and(|e| e.sort_boundary)
    }

    fn is_aggregation_helper(&self, word: &str) -> bool {
        self.entry(word).is_some_and(|e| e.aggregation_helper)
    }

    fn is_aggregation_size_prefix(&self, word: &str) -> bool {
        self.entry(word).is_some_and(|e| e.aggregation_size_prefix)
    }

    fn is_range_separator(&self, word: &str) -> bool {
        self.entry(word).is_some_and(|e| e.range_separator)
    }

    fn is_range_close(&self, word: &str) -> bool {
        self.entry(word).is_some_and(|e| e.range_close)
    }

    fn is_date_range_label(&self, word: &str) -> bool {
        self.entry(word).is_some_and(|e| e.date_range_label)
    }

    fn is_reserved(&self, word: &str) -> bool {
        self.entry(word).is_some_and(KeywordEntry::is_reserved)
    }
}

/// Extra words layered over the builtin tables, read from configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionaryExtension {
    pub operators: BTreeMap<String, OperatorKind>,
    pub logic: BTreeMap<String, LogicKind>,
    pub aggregations: BTreeMap<String, AggregationType>,
    pub sort_orders: BTreeMap<String, SortOrder>,
    pub pagination: BTreeMap<String, PaginationWord>,
    pub stop_words: Vec<String>,
    pub index_indicators: Vec<String>,
    pub demonstratives: Vec<String>,
    pub date_range_labels: Vec<String>,
}

impl DictionaryExtension {
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
            && self.logic.is_empty()
            && self.aggregations.is_empty()
            && self.sort_orders.is_empty()
            && self.pagination.is_empty()
            && self.stop_words.is_empty()
            && self.index_indicators.is_empty()
            && self.demonstratives.is_empty()
            && self.date_range_labels.is_empty()
    }
}

/// Hash-table backed [`Lexicon`]
#[derive(Debug, Clone, Default)]
pub struct KeywordTables {
    words: AHashMap<String, KeywordEntry>,
    longest: usize,
}

static BUILTIN: OnceLock<KeywordTables> = OnceLock::new();

impl KeywordTables {
    /// Tables with no words at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// Process-wide builtin Chinese/English tables, built on first use
    pub fn builtin() -> &'static KeywordTables {
        BUILTIN.get_or_init(builtin::build)
    }

    /// Builtin tables plus user words
    pub fn extended(extension: &DictionaryExtension) -> Self {
        let mut tables = Self::builtin().clone();
        tables.extend(extension);
        tables
    }

    pub fn extend(&mut self, ext: &DictionaryExtension) {
        for (word, op) in &ext.operators {
            self.add_operator(word, *op);
        }
        for (word, logic) in &ext.logic {
            self.add_logic(word, *logic);
        }
        for (word, agg) in &ext.aggregations {
            self.add_aggregation(word, *agg, None);
        }
        for (word, order) in &ext.sort_orders {
            self.add_sort(word, SortWord::Order(*order));
        }
        for (word, kind) in &ext.pagination {
            self.entry_mut(word).pagination = Some(*kind);
        }
        for word in &ext.stop_words {
            self.entry_mut(word).stop_word = true;
        }
        for word in &ext.index_indicators {
            self.entry_mut(word).index_indicator = true;
        }
        for word in &ext.demonstratives {
            self.entry_mut(word).demonstrative = true;
        }
        for word in &ext.date_range_labels {
            self.entry_mut(word).date_range_label = true;
        }
    }

    /// Get or create the entry for a word
    pub fn entry_mut(&mut self, word: &str) -> &mut KeywordEntry {
        let key = word.to_lowercase();
        self.longest = self.longest.max(key.chars().count());
        self.words.entry(key).or_default()
    }

    pub fn add_operator(&mut self, word: &str, op: OperatorKind) -> &mut Self {
        self.entry_mut(word).operator = Some(op);
        self
    }

    pub fn add_logic(&mut self, word: &str, logic: LogicKind) -> &mut Self {
        self.entry_mut(word).logic = Some(logic);
        self
    }

    pub fn add_delimiter(&mut self, word: &str) -> &mut Self {
        self.entry_mut(word).delimiter = true;
        self
    }

    pub fn add_aggregation(
        &mut self,
        word: &str,
        agg: AggregationType,
        interval: Option<&str>,
    ) -> &mut Self {
        let entry = self.entry_mut(word);
        entry.aggregation = Some(agg);
        entry.interval = interval.map(str::to_string);
        self
    }

    pub fn add_sort(&mut self, word: &str, sort: SortWord) -> &mut Self {
        self.entry_mut(word).sort = Some(sort);
        self
    }

    pub fn add_stop_word(&mut self, word: &str) -> &mut Self {
        self.entry_mut(word).stop_word = true;
        self
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Lexicon for KeywordTables {
    fn entry(&self, word: &str) -> Option<&KeywordEntry> {
        if word.bytes().any(|b| b.is_ascii_uppercase()) {
            self.words.get(&word.to_ascii_lowercase())
        } else {
            self.words.get(word)
        }
    }

    fn longest_keyword_chars(&self) -> usize {
        self.longest
    }

    fn keywords(&self) -> Box<dyn Iterator<Item = (&str, &KeywordEntry)> + '_> {
        Box::new(self.words.iter().map(|(k, v)| (k.as_str(), v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_categories() {
        let lex = KeywordTables::builtin();
        assert_eq!(lex.operator("大于等于"), Some(OperatorKind::Gte));
        assert_eq!(lex.operator(">="), Some(OperatorKind::Gte));
        assert_eq!(lex.logic("并且"), Some(LogicKind::And));
        assert_eq!(lex.logic("OR"), Some(LogicKind::Or));
        assert_eq!(lex.aggregation("每天"), Some(AggregationType::DateHistogram));
        assert_eq!(lex.interval("每小时"), Some("1h"));
        assert_eq!(lex.sort("降序"), Some(SortWord::Order(SortOrder::Desc)));
        assert!(lex.is_delimiter("、"));
        assert!(lex.is_stop_word("查一下"));
        assert!(lex.is_index_indicator("索引"));
    }

    #[test]
    fn test_word_in_several_categories() {
        let lex = KeywordTables::builtin();
        assert_eq!(lex.operator("在"), Some(OperatorKind::In));
        assert_eq!(lex.locative("在"), Some(Locative::Prefix));
        assert_eq!(lex.pagination("从"), Some(PaginationWord::From));
        assert_eq!(lex.locative("从"), Some(Locative::Prefix));
    }

    #[test]
    fn test_reserved_words() {
        let lex = KeywordTables::builtin();
        assert!(lex.is_reserved("按"));
        assert!(lex.is_reserved("限制"));
        assert!(!lex.is_reserved("年龄"));
        assert!(!lex.is_reserved("大于"));
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let lex = KeywordTables::builtin();
        assert_eq!(lex.operator("LIKE"), Some(OperatorKind::Like));
        assert_eq!(lex.sort("Desc"), Some(SortWord::Order(SortOrder::Desc)));
    }

    #[test]
    fn test_extension_layers_over_builtin() {
        let mut ext = DictionaryExtension::default();
        ext.operators.insert("超出".to_string(), OperatorKind::Gt);
        ext.index_indicators.push("仓".to_string());
        let lex = KeywordTables::extended(&ext);
        assert_eq!(lex.operator("超出"), Some(OperatorKind::Gt));
        assert!(lex.is_index_indicator("仓"));
        assert_eq!(lex.operator("大于"), Some(OperatorKind::Gt));
        assert!(KeywordTables::builtin().operator("超出").is_none());
    }

    #[test]
    fn test_fake_tables() {
        let mut lex = KeywordTables::empty();
        lex.add_operator("gt", OperatorKind::Gt).add_logic("und", LogicKind::And);
        assert_eq!(lex.len(), 2);
        assert_eq!(lex.longest_keyword_chars(), 3);
        assert!(lex.operator("大于").is_none());
    }
}
