//! Structured parse results.
//!
//! Everything here is plain data: the parser builds these records once per
//! call and hands them to whatever executes the search. Field hints are the
//! user's own words and carry no schema binding.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical date-time rendering used for range bounds
pub const ISO_LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A literal taken from the query text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Literal {
    /// Best-effort coercion: integer, then float, then plain text
    pub fn coerce(raw: &str) -> Self {
        let raw = raw.trim();
        if let Ok(n) = raw.parse::<i64>() {
            return Literal::Integer(n);
        }
        if let Ok(f) = raw.parse::<f64>() {
            if f.is_finite() {
                return Literal::Float(f);
            }
        }
        let unquoted = raw
            .trim_matches(|c| c == '"' || c == '\'' || c == '“' || c == '”' || c == '‘' || c == '’');
        Literal::Text(unquoted.to_string())
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Literal::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Literal::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(n) => write!(f, "{}", n),
            Literal::Float(x) => write!(f, "{}", x),
            Literal::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<i64> for Literal {
    fn from(n: i64) -> Self {
        Literal::Integer(n)
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::Text(s.to_string())
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperatorKind {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    NotLike,
    Prefix,
    In,
    NotIn,
    Between,
    Exists,
    NotExists,
}

impl OperatorKind {
    /// EXISTS / NOT_EXISTS stand alone
    pub fn takes_value(self) -> bool {
        !matches!(self, OperatorKind::Exists | OperatorKind::NotExists)
    }

    /// Operators that collect a list of values
    pub fn is_multi_value(self) -> bool {
        matches!(self, OperatorKind::In | OperatorKind::NotIn | OperatorKind::Between)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OperatorKind::Eq => "EQ",
            OperatorKind::Ne => "NE",
            OperatorKind::Gt => "GT",
            OperatorKind::Gte => "GTE",
            OperatorKind::Lt => "LT",
            OperatorKind::Lte => "LTE",
            OperatorKind::Like => "LIKE",
            OperatorKind::NotLike => "NOT_LIKE",
            OperatorKind::Prefix => "PREFIX",
            OperatorKind::In => "IN",
            OperatorKind::NotIn => "NOT_IN",
            OperatorKind::Between => "BETWEEN",
            OperatorKind::Exists => "EXISTS",
            OperatorKind::NotExists => "NOT_EXISTS",
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical connective shared by a condition group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogicKind {
    And,
    Or,
}

impl fmt::Display for LogicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicKind::And => f.write_str("AND"),
            LogicKind::Or => f.write_str("OR"),
        }
    }
}

/// Aggregation kinds, metric and bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AggregationType {
    Sum,
    Avg,
    Min,
    Max,
    Count,
    Cardinality,
    Terms,
    DateHistogram,
}

impl AggregationType {
    /// Bucket aggregations produce groups and may nest metrics
    pub fn is_bucket(self) -> bool {
        matches!(self, AggregationType::Terms | AggregationType::DateHistogram)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AggregationType::Sum => "sum",
            AggregationType::Avg => "avg",
            AggregationType::Min => "min",
            AggregationType::Max => "max",
            AggregationType::Count => "count",
            AggregationType::Cardinality => "cardinality",
            AggregationType::Terms => "terms",
            AggregationType::DateHistogram => "date_histogram",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// A filter predicate, or a flat group of them.
///
/// A group is the first leaf carrying `logic` with the remaining members in
/// `children`; there is no deeper precedence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConditionIntent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<OperatorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Literal>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<Literal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logic: Option<LogicKind>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ConditionIntent>,
}

impl ConditionIntent {
    /// Build a leaf; a single value lands in `value`, several in `values`
    pub fn leaf(field: impl Into<String>, operator: OperatorKind, mut values: Vec<Literal>) -> Self {
        let (value, values) = if values.len() == 1 {
            (values.pop(), Vec::new())
        } else {
            (None, values)
        };
        Self {
            field_hint: Some(field.into()),
            operator: Some(operator),
            value,
            values,
            logic: None,
            children: Vec::new(),
        }
    }

    /// Fold an ordered list of members into one flat group.
    ///
    /// Returns `None` for an empty list and the lone member unchanged for a
    /// list of one.
    pub fn group(logic: LogicKind, members: Vec<ConditionIntent>) -> Option<Self> {
        let mut members = members.into_iter();
        let mut root = members.next()?;
        let rest: Vec<_> = members.collect();
        if !rest.is_empty() {
            if root.children.is_empty() {
                root.logic = Some(logic);
                root.children = rest;
            } else {
                // The first member is already a group of its own
                let nested = std::mem::take(&mut root);
                root = ConditionIntent {
                    logic: Some(logic),
                    children: std::iter::once(nested).chain(rest).collect(),
                    ..Default::default()
                };
            }
        }
        Some(root)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// All values of this node, scalar or list
    pub fn all_values(&self) -> Vec<&Literal> {
        self.value.iter().chain(self.values.iter()).collect()
    }

    /// Number of group members including the root
    pub fn member_count(&self) -> usize {
        1 + self.children.len()
    }

    /// The root followed by its children, in order
    pub fn members(&self) -> impl Iterator<Item = &ConditionIntent> {
        std::iter::once(self).chain(self.children.iter())
    }
}

/// One aggregation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationIntent {
    pub name: String,
    #[serde(rename = "type")]
    pub agg_type: AggregationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_by_field_hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AggregationIntent>,
}

/// One sort key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortIntent {
    pub field_hint: String,
    pub order: SortOrder,
}

/// Resolved paging request
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PaginationIntent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub continue_search: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_after: Option<Vec<Literal>>,
}

/// An explicitly labelled time range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRangeIntent {
    pub field_hint: String,
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

impl DateRangeIntent {
    pub fn from_iso(&self) -> String {
        self.from.format(ISO_LOCAL_FORMAT).to_string()
    }

    pub fn to_iso(&self) -> String {
        self.to.format(ISO_LOCAL_FORMAT).to_string()
    }
}

/// Filter, sort and page request
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryIntent {
    pub index_hint: Option<String>,
    pub condition: Option<ConditionIntent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRangeIntent>,
    #[serde(default)]
    pub sorts: Vec<SortIntent>,
    pub pagination: Option<PaginationIntent>,
}

/// Aggregation request
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalyticsIntent {
    pub index_hint: Option<String>,
    pub condition: Option<ConditionIntent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRangeIntent>,
    pub aggregations: Vec<AggregationIntent>,
}

/// Parse result root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Intent {
    Query(QueryIntent),
    Analytics(AnalyticsIntent),
}

impl Intent {
    pub fn index_hint(&self) -> Option<&str> {
        match self {
            Intent::Query(q) => q.index_hint.as_deref(),
            Intent::Analytics(a) => a.index_hint.as_deref(),
        }
    }

    pub fn condition(&self) -> Option<&ConditionIntent> {
        match self {
            Intent::Query(q) => q.condition.as_ref(),
            Intent::Analytics(a) => a.condition.as_ref(),
        }
    }

    pub fn date_range(&self) -> Option<&DateRangeIntent> {
        match self {
            Intent::Query(q) => q.date_range.as_ref(),
            Intent::Analytics(a) => a.date_range.as_ref(),
        }
    }

    pub fn is_analytics(&self) -> bool {
        matches!(self, Intent::Analytics(_))
    }

    pub fn as_query(&self) -> Option<&QueryIntent> {
        match self {
            Intent::Query(q) => Some(q),
            Intent::Analytics(_) => None,
        }
    }

    pub fn as_analytics(&self) -> Option<&AnalyticsIntent> {
        match self {
            Intent::Analytics(a) => Some(a),
            Intent::Query(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_scalar_vs_list() {
        let one = ConditionIntent::leaf("age", OperatorKind::Gt, vec![Literal::Integer(18)]);
        assert_eq!(one.value, Some(Literal::Integer(18)));
        assert!(one.values.is_empty());

        let many = ConditionIntent::leaf("city", OperatorKind::In, vec!["a".into(), "b".into()]);
        assert!(many.value.is_none());
        assert_eq!(many.values.len(), 2);
    }

    #[test]
    fn test_group_is_flat() {
        let leaves = vec![
            ConditionIntent::leaf("a", OperatorKind::Eq, vec![1.into()]),
            ConditionIntent::leaf("b", OperatorKind::Eq, vec![2.into()]),
            ConditionIntent::leaf("c", OperatorKind::Eq, vec![3.into()]),
        ];
        let root = ConditionIntent::group(LogicKind::And, leaves).unwrap();
        assert_eq!(root.logic, Some(LogicKind::And));
        assert_eq!(root.field_hint.as_deref(), Some("a"));
        assert_eq!(root.children.len(), 2);
        assert!(root.children.iter().all(|c| c.is_leaf()));
    }

    #[test]
    fn test_group_keeps_nested_first_member() {
        let alt = ConditionIntent::group(
            LogicKind::Or,
            vec![
                ConditionIntent::leaf("name", OperatorKind::Like, vec!["zhang".into()]),
                ConditionIntent::leaf("name", OperatorKind::Like, vec!["li".into()]),
            ],
        )
        .unwrap();
        let root = ConditionIntent::group(
            LogicKind::And,
            vec![alt, ConditionIntent::leaf("age", OperatorKind::Gt, vec![1.into()])],
        )
        .unwrap();
        assert_eq!(root.logic, Some(LogicKind::And));
        assert!(root.field_hint.is_none());
        assert_eq!(root.children[0].logic, Some(LogicKind::Or));
    }

    #[test]
    fn test_literal_coerce() {
        assert_eq!(Literal::coerce("42"), Literal::Integer(42));
        assert_eq!(Literal::coerce("1.5"), Literal::Float(1.5));
        assert_eq!(Literal::coerce(" 'abc' "), Literal::Text("abc".into()));
    }

    #[test]
    fn test_intent_serializes_with_kind_tag() {
        let intent = Intent::Query(QueryIntent {
            index_hint: Some("orders".into()),
            ..Default::default()
        });
        let json = serde_json::to_value(&intent).unwrap();
        assert_eq!(json["kind"], "query");
        assert_eq!(json["index_hint"], "orders");
    }
}
