use crate::error::{ParseError, Result};
use crate::intent::{AnalyticsIntent, Intent, QueryIntent};
use crate::keywords::{KeywordTables, Lexicon};
use crate::query::aggregation::parse_aggregations;
use crate::query::condition::parse_condition;
use crate::query::date_range::extract_date_range;
use crate::query::index::extract_index;
use crate::query::pagination::parse_pagination;
use crate::query::sort::parse_sorts;
use crate::query::token::Token;
use crate::query::tokenizer::tokenize;
use tracing::debug;

/// Parse query text with the builtin keyword tables
pub fn parse(text: &str) -> Result<Intent> {
    NlParser::default().parse(text)
}

/// Natural language query parser.
///
/// Holds nothing but a lexicon reference, so one parser can serve any number
/// of threads; every call works on its own token list.
#[derive(Clone, Copy)]
pub struct NlParser<'a> {
    lexicon: &'a dyn Lexicon,
}

impl Default for NlParser<'static> {
    fn default() -> Self {
        Self::new(KeywordTables::builtin())
    }
}

impl<'a> NlParser<'a> {
    pub fn new(lexicon: &'a dyn Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &'a dyn Lexicon {
        self.lexicon
    }

    /// The token stream the passes start from
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        tokenize(text, self.lexicon)
    }

    /// Parse text into an intent.
    ///
    /// Passes run in a fixed order: index and date range remove their
    /// tokens first, aggregation, sort and paging read what is left, and the
    /// condition parser consumes the rest.
    pub fn parse(&self, text: &str) -> Result<Intent> {
        if text.trim().is_empty() {
            return Err(ParseError::EmptyInput);
        }

        let tokens = self.tokenize(text);
        if tokens.is_empty() {
            return Err(ParseError::OnlyStopWords);
        }

        let (tokens, index_hint) = extract_index(tokens, self.lexicon);
        let (tokens, date_range) = extract_date_range(tokens, self.lexicon)?;

        let aggregations = parse_aggregations(&tokens, self.lexicon);
        let sorts = parse_sorts(&tokens, self.lexicon);
        let pagination = parse_pagination(&tokens, self.lexicon);
        let condition = parse_condition(&tokens, self.lexicon)?;

        let recognized = condition.is_some()
            || date_range.is_some()
            || index_hint.is_some()
            || !aggregations.is_empty()
            || !sorts.is_empty()
            || pagination.is_some();
        if !recognized {
            return Err(ParseError::NoIntentRecognized);
        }

        debug!(
            index = ?index_hint,
            aggregations = aggregations.len(),
            sorts = sorts.len(),
            paged = pagination.is_some(),
            "parsed"
        );

        if aggregations.is_empty() {
            return Ok(Intent::Query(QueryIntent {
                index_hint,
                condition,
                date_range,
                sorts,
                pagination,
            }));
        }

        if !sorts.is_empty() || pagination.is_some() {
            debug!("sort and paging ignored for an aggregation request");
        }
        Ok(Intent::Analytics(AnalyticsIntent {
            index_hint,
            condition,
            date_range,
            aggregations,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use crate::intent::{AggregationType, Literal, LogicKind, OperatorKind, SortOrder};

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(parse(""), Err(ParseError::EmptyInput));
        assert_eq!(parse("   \t"), Err(ParseError::EmptyInput));
    }

    #[test]
    fn test_only_stop_words() {
        let err = parse("查一下").unwrap_err();
        assert_eq!(err, ParseError::OnlyStopWords);
        assert_eq!(err.category(), ErrorCategory::Input);
    }

    #[test]
    fn test_nothing_recognized() {
        assert_eq!(parse("你好世界"), Err(ParseError::NoIntentRecognized));
    }

    #[test]
    fn test_query_intent() {
        let intent = parse("年龄大于18按年龄降序限制5条").unwrap();
        let q = intent.as_query().unwrap();
        let c = q.condition.as_ref().unwrap();
        assert_eq!(c.operator, Some(OperatorKind::Gt));
        assert_eq!(c.value, Some(Literal::Integer(18)));
        assert_eq!(q.sorts[0].order, SortOrder::Desc);
        assert_eq!(q.pagination.as_ref().unwrap().limit, Some(5));
    }

    #[test]
    fn test_analytics_intent() {
        let intent = parse("城市是北京并且按性别分组统计平均年龄").unwrap();
        assert!(intent.is_analytics());
        let a = intent.as_analytics().unwrap();
        assert_eq!(a.aggregations[0].agg_type, AggregationType::Terms);
        assert_eq!(a.condition.as_ref().unwrap().field_hint.as_deref(), Some("城市"));
    }

    #[test]
    fn test_index_and_date_range() {
        let intent = parse("在orders索引中时间范围2024-01-01到2024-02-01状态是已支付").unwrap();
        assert_eq!(intent.index_hint(), Some("orders"));
        assert_eq!(intent.date_range().unwrap().to_iso(), "2024-02-01T00:00:00");
        assert_eq!(intent.condition().unwrap().value, Some("已支付".into()));
    }

    #[test]
    fn test_english_where_clause() {
        let intent = parse("from users this table where age > 3").unwrap();
        assert_eq!(intent.index_hint(), Some("users"));
        let c = intent.condition().unwrap();
        assert_eq!(c.field_hint.as_deref(), Some("age"));
        assert_eq!(c.value, Some(Literal::Integer(3)));
    }

    #[test]
    fn test_index_alone_is_recognized() {
        let intent = parse("查询users表").unwrap();
        assert_eq!(intent.index_hint(), Some("users"));
        assert!(intent.condition().is_none());
    }

    #[test]
    fn test_custom_lexicon() {
        let mut lex = KeywordTables::empty();
        lex.add_operator("gt", OperatorKind::Gt).add_logic("und", LogicKind::And);
        let parser = NlParser::new(&lex);
        let c = parser.parse("a gt 1 und b gt 2").unwrap();
        let c = c.condition().unwrap();
        assert_eq!(c.logic, Some(LogicKind::And));
        assert_eq!(c.member_count(), 2);
    }
}
