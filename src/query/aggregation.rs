use crate::intent::{AggregationIntent, AggregationType, LogicKind};
use crate::keywords::Lexicon;
use crate::query::token::{Token, TokenKind};
use tracing::debug;

/// Max field fragments collected on either side of an aggregation word
const FIELD_WINDOW: usize = 4;
/// How far past a bucket word to look for its size
const SIZE_LOOKAHEAD: usize = 4;

/// Build aggregation requests from the aggregation words in the stream.
///
/// Bucket words (分组, 每天 ...) pick up a group-by field, a size and an
/// interval. A metric word following a bucket nests under it until a
/// connector (同时, 并且 ...) starts the next clause; clauses end up as
/// siblings in the order written. The token stream is not modified.
pub fn parse_aggregations(tokens: &[Token], lexicon: &dyn Lexicon) -> Vec<AggregationIntent> {
    let mut out: Vec<AggregationIntent> = Vec::new();
    let mut bucket: Option<usize> = None;

    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::Logic(LogicKind::And) => bucket = None,
            TokenKind::Aggregation(agg) if agg.is_bucket() => {
                let field = bucket_field(tokens, i, lexicon);
                let size = bucket_size(tokens, i, lexicon);
                let interval = match agg {
                    AggregationType::DateHistogram => lexicon.interval(&token.text).map(str::to_string),
                    _ => None,
                };
                debug!(agg = agg.as_str(), field = ?field, size = ?size, "bucket aggregation");
                out.push(AggregationIntent {
                    name: name_for(agg, field.as_deref()),
                    agg_type: agg,
                    field_hint: field.clone(),
                    group_by_field_hint: field,
                    size,
                    interval,
                    children: Vec::new(),
                });
                bucket = Some(out.len() - 1);
            }
            TokenKind::Aggregation(agg) => {
                let field = forward_run(tokens, i, lexicon).or_else(|| backward_run(tokens, i, lexicon));
                let metric = AggregationIntent {
                    name: name_for(agg, field.as_deref()),
                    agg_type: agg,
                    field_hint: field,
                    group_by_field_hint: None,
                    size: None,
                    interval: None,
                    children: Vec::new(),
                };
                match bucket {
                    Some(b) => out[b].children.push(metric),
                    None => out.push(metric),
                }
            }
            _ => {}
        }
    }

    out
}

fn name_for(agg: AggregationType, field: Option<&str>) -> String {
    match field {
        Some(f) => format!("{}_{}", agg.as_str(), f),
        None => agg.as_str().to_string(),
    }
}

fn is_fragment(t: &Token, lexicon: &dyn Lexicon) -> bool {
    t.is_unknown() && !lexicon.is_reserved(&t.text)
}

/// 按城市分组 reads the field before the bucket word, 分组城市 after it
fn bucket_field(tokens: &[Token], i: usize, lexicon: &dyn Lexicon) -> Option<String> {
    let start = backward_start(tokens, i, lexicon);
    let after_boundary = start > 0
        && start < i
        && tokens[start - 1].is_unknown()
        && lexicon.is_sort_boundary(&tokens[start - 1].text);
    if after_boundary {
        return join(&tokens[start..i]);
    }
    forward_run(tokens, i, lexicon).or_else(|| join(&tokens[start..i]))
}

fn backward_start(tokens: &[Token], i: usize, lexicon: &dyn Lexicon) -> usize {
    let mut start = i;
    while start > 0 && i - start < FIELD_WINDOW && is_fragment(&tokens[start - 1], lexicon) {
        start -= 1;
    }
    start
}

fn backward_run(tokens: &[Token], i: usize, lexicon: &dyn Lexicon) -> Option<String> {
    join(&tokens[backward_start(tokens, i, lexicon)..i])
}

fn forward_run(tokens: &[Token], i: usize, lexicon: &dyn Lexicon) -> Option<String> {
    let mut start = i + 1;
    // 分组按城市, 每天统计创建时间
    while tokens.get(start).is_some_and(|t| {
        t.is_unknown() && (lexicon.is_sort_boundary(&t.text) || lexicon.is_aggregation_helper(&t.text))
    }) {
        start += 1;
    }
    let mut end = start;
    while end < tokens.len() && end - start < FIELD_WINDOW && is_fragment(&tokens[end], lexicon) {
        end += 1;
    }
    join(&tokens[start..end])
}

fn join(run: &[Token]) -> Option<String> {
    if run.is_empty() {
        return None;
    }
    Some(run.iter().map(|t| t.text.as_str()).collect())
}

/// 前10个, 取前10个, 限制10个, top 10
fn bucket_size(tokens: &[Token], i: usize, lexicon: &dyn Lexicon) -> Option<u64> {
    for t in tokens.iter().skip(i + 1).take(SIZE_LOOKAHEAD) {
        if t.is_number() {
            return t.as_count();
        }
        let skippable = t.is_unknown()
            && (lexicon.is_aggregation_size_prefix(&t.text) || !lexicon.is_reserved(&t.text));
        if !skippable {
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::KeywordTables;
    use crate::query::tokenizer::tokenize;

    fn aggs(input: &str) -> Vec<AggregationIntent> {
        let lex = KeywordTables::builtin();
        parse_aggregations(&tokenize(input, lex), lex)
    }

    #[test]
    fn test_terms_with_size_and_nested_metric() {
        let out = aggs("按城市分组前10个统计平均年龄");
        assert_eq!(out.len(), 1);
        let terms = &out[0];
        assert_eq!(terms.agg_type, AggregationType::Terms);
        assert_eq!(terms.name, "terms_城市");
        assert_eq!(terms.group_by_field_hint.as_deref(), Some("城市"));
        assert_eq!(terms.size, Some(10));
        assert_eq!(terms.children.len(), 1);
        assert_eq!(terms.children[0].agg_type, AggregationType::Avg);
        assert_eq!(terms.children[0].field_hint.as_deref(), Some("年龄"));
    }

    #[test]
    fn test_connector_starts_sibling() {
        let out = aggs("按城市分组，同时按创建时间每天统计");
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].agg_type, AggregationType::DateHistogram);
        assert_eq!(out[1].interval.as_deref(), Some("1d"));
        assert_eq!(out[1].field_hint.as_deref(), Some("创建时间"));
        assert!(out[1].size.is_none());
    }

    #[test]
    fn test_intervals() {
        for (word, interval) in [("每小时", "1h"), ("每周", "1w"), ("每月", "1M"), ("每年", "1y")] {
            let out = aggs(&format!("按时间{word}统计"));
            assert_eq!(out[0].interval.as_deref(), Some(interval), "{word}");
        }
    }

    #[test]
    fn test_metric_field_before_word() {
        let out = aggs("年龄的平均值");
        assert_eq!(out[0].name, "avg_年龄");
    }

    #[test]
    fn test_metric_without_field() {
        let out = aggs("统计数量");
        assert_eq!(out[0].agg_type, AggregationType::Count);
        assert_eq!(out[0].name, "count");
        assert!(out[0].field_hint.is_none());
    }

    #[test]
    fn test_english_group_by() {
        let out = aggs("group by city top 5 average price");
        assert_eq!(out[0].group_by_field_hint.as_deref(), Some("city"));
        assert_eq!(out[0].size, Some(5));
        assert_eq!(out[0].children[0].name, "avg_price");
    }
}
