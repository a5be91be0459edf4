//! Terminal rendering of parse results

use crate::intent::{
    AggregationIntent, ConditionIntent, Intent, Literal, PaginationIntent, SortOrder,
};
use crate::query::token::{Token, TokenKind};
use crate::utils::suggest::Suggestion;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

fn stdout(color: bool) -> StandardStream {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

/// Print an intent as an indented tree
pub fn print_intent(intent: &Intent, color: bool) -> io::Result<()> {
    write_intent(&mut stdout(color), intent)
}

/// Print one line per token: offset, kind and text
pub fn print_tokens(tokens: &[Token], color: bool) -> io::Result<()> {
    write_tokens(&mut stdout(color), tokens)
}

/// Print ranked operator suggestions for a word
pub fn print_suggestions(word: &str, suggestions: &[Suggestion], color: bool) -> io::Result<()> {
    write_suggestions(&mut stdout(color), word, suggestions)
}

pub fn write_intent<W: WriteColor>(w: &mut W, intent: &Intent) -> io::Result<()> {
    let kind = if intent.is_analytics() { "analytics" } else { "query" };
    w.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
    writeln!(w, "{}", kind)?;
    w.reset()?;

    if let Some(index) = intent.index_hint() {
        label(w, "index")?;
        writeln!(w, "{}", index)?;
    }

    if let Some(range) = intent.date_range() {
        label(w, "date range")?;
        writeln!(w, "{} {} .. {}", range.field_hint, range.from_iso(), range.to_iso())?;
    }

    if let Some(condition) = intent.condition() {
        label(w, "condition")?;
        writeln!(w)?;
        write_condition(w, condition, 2)?;
    }

    match intent {
        Intent::Query(q) => {
            for sort in &q.sorts {
                label(w, "sort")?;
                let order = match sort.order {
                    SortOrder::Asc => "ASC",
                    SortOrder::Desc => "DESC",
                };
                writeln!(w, "{} {}", sort.field_hint, order)?;
            }
            if let Some(p) = &q.pagination {
                label(w, "pagination")?;
                writeln!(w, "{}", describe_pagination(p))?;
            }
        }
        Intent::Analytics(a) => {
            label(w, "aggregations")?;
            writeln!(w)?;
            for agg in &a.aggregations {
                write_aggregation(w, agg, 2)?;
            }
        }
    }

    Ok(())
}

fn label<W: WriteColor>(w: &mut W, name: &str) -> io::Result<()> {
    w.set_color(ColorSpec::new().set_fg(Some(Color::Blue)))?;
    write!(w, "  {}: ", name)?;
    w.reset()
}

fn indent<W: Write>(w: &mut W, depth: usize) -> io::Result<()> {
    write!(w, "{:width$}", "", width = depth * 2)
}

fn write_condition<W: WriteColor>(w: &mut W, node: &ConditionIntent, depth: usize) -> io::Result<()> {
    if node.is_leaf() {
        return write_leaf(w, node, depth);
    }

    indent(w, depth)?;
    w.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
    writeln!(w, "{}", node.logic.map(|l| l.to_string()).unwrap_or_default())?;
    w.reset()?;

    // A group root may carry its own predicate
    if node.operator.is_some() {
        write_leaf(w, node, depth + 1)?;
    }
    for child in &node.children {
        write_condition(w, child, depth + 1)?;
    }
    Ok(())
}

fn write_leaf<W: WriteColor>(w: &mut W, node: &ConditionIntent, depth: usize) -> io::Result<()> {
    indent(w, depth)?;
    write!(w, "{} ", node.field_hint.as_deref().unwrap_or("?"))?;

    w.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
    write!(w, "{}", node.operator.map(|o| o.as_str()).unwrap_or("?"))?;
    w.reset()?;

    w.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    if let Some(value) = &node.value {
        write!(w, " {}", value)?;
    } else if !node.values.is_empty() {
        write!(w, " [{}]", join_literals(&node.values))?;
    }
    w.reset()?;
    writeln!(w)
}

fn join_literals(values: &[Literal]) -> String {
    values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
}

fn write_aggregation<W: WriteColor>(w: &mut W, agg: &AggregationIntent, depth: usize) -> io::Result<()> {
    indent(w, depth)?;
    w.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)).set_bold(true))?;
    write!(w, "{}", agg.name)?;
    w.reset()?;
    write!(w, " {}", agg.agg_type.as_str().to_uppercase())?;

    if let Some(field) = &agg.field_hint {
        write!(w, " field={}", field)?;
    }
    if let Some(size) = agg.size {
        write!(w, " size={}", size)?;
    }
    if let Some(interval) = &agg.interval {
        write!(w, " interval={}", interval)?;
    }
    writeln!(w)?;

    for child in &agg.children {
        write_aggregation(w, child, depth + 1)?;
    }
    Ok(())
}

/// `limit=10 offset=20`, fields in a fixed order
pub fn describe_pagination(p: &PaginationIntent) -> String {
    let mut parts = Vec::new();
    if let Some(limit) = p.limit {
        parts.push(format!("limit={}", limit));
    }
    if let Some(offset) = p.offset {
        parts.push(format!("offset={}", offset));
    }
    if let Some(page) = p.page {
        parts.push(format!("page={}", page));
    }
    if let Some(size) = p.size {
        parts.push(format!("size={}", size));
    }
    if p.continue_search {
        parts.push("continue".to_string());
    }
    if let Some(cursor) = &p.search_after {
        parts.push(format!("search_after=[{}]", join_literals(cursor)));
    }
    parts.join(" ")
}

pub fn write_tokens<W: WriteColor>(w: &mut W, tokens: &[Token]) -> io::Result<()> {
    for token in tokens {
        let (kind, color) = match &token.kind {
            TokenKind::Unknown => ("unknown".to_string(), Color::White),
            TokenKind::Operator(op) => (format!("operator {}", op), Color::Yellow),
            TokenKind::Logic(l) => (format!("logic {}", l), Color::Cyan),
            TokenKind::Number(lit) => (format!("number {}", lit), Color::Green),
            TokenKind::Value(lit) => (format!("value {}", lit), Color::Green),
            TokenKind::Delimiter => ("delimiter".to_string(), Color::White),
            TokenKind::Aggregation(a) => (format!("aggregation {}", a.as_str()), Color::Magenta),
            TokenKind::Sort { order, explicit } => {
                let order = match order {
                    SortOrder::Asc => "asc",
                    SortOrder::Desc => "desc",
                };
                let kind = if *explicit {
                    format!("sort {}", order)
                } else {
                    format!("sort {} (implied)", order)
                };
                (kind, Color::Blue)
            }
        };

        w.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(w, "{:>4}", token.offset)?;
        w.reset()?;
        write!(w, "  {}  ", token.text)?;
        w.set_color(ColorSpec::new().set_fg(Some(color)))?;
        writeln!(w, "{}", kind)?;
        w.reset()?;
    }
    Ok(())
}

pub fn write_suggestions<W: WriteColor>(w: &mut W, word: &str, suggestions: &[Suggestion]) -> io::Result<()> {
    if suggestions.is_empty() {
        writeln!(w, "no operator close to '{}'", word)?;
        return Ok(());
    }

    writeln!(w, "did you mean:")?;
    for s in suggestions {
        write!(w, "  ")?;
        w.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
        write!(w, "{}", s.keyword)?;
        w.reset()?;
        writeln!(w, "  ({}, distance {})", s.operator, s.distance)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::parse;
    use termcolor::NoColor;

    fn render(f: impl FnOnce(&mut NoColor<Vec<u8>>) -> io::Result<()>) -> String {
        let mut w = NoColor::new(Vec::new());
        f(&mut w).unwrap();
        String::from_utf8(w.into_inner()).unwrap()
    }

    #[test]
    fn test_render_query_tree() {
        let intent = parse("年龄大于等于18并且名字包含张或李按创建时间降序限制10条").unwrap();
        let out = render(|w| write_intent(w, &intent));
        assert!(out.starts_with("query\n"));
        assert!(out.contains("    AND\n"));
        assert!(out.contains("      年龄 GTE 18\n"));
        assert!(out.contains("        名字 LIKE \"李\"\n"));
        assert!(out.contains("  sort: 创建时间 DESC\n"));
        assert!(out.contains("  pagination: limit=10\n"));
    }

    #[test]
    fn test_render_analytics() {
        let intent = parse("按城市分组前10个统计平均年龄").unwrap();
        let out = render(|w| write_intent(w, &intent));
        assert!(out.starts_with("analytics\n"));
        assert!(out.contains("    terms_城市 TERMS field=城市 size=10\n"));
        assert!(out.contains("      avg_年龄 AVG field=年龄\n"));
    }

    #[test]
    fn test_describe_pagination() {
        let p = PaginationIntent {
            limit: Some(10),
            offset: Some(20),
            page: Some(3),
            size: Some(10),
            ..Default::default()
        };
        assert_eq!(describe_pagination(&p), "limit=10 offset=20 page=3 size=10");
    }

    #[test]
    fn test_render_tokens_and_suggestions() {
        let lex = crate::keywords::KeywordTables::builtin();
        let tokens = crate::query::tokenize("年龄>18", lex);
        let out = render(|w| write_tokens(w, &tokens));
        assert!(out.contains("operator GT"));

        let out = render(|w| write_suggestions(w, "xyz", &[]));
        assert_eq!(out, "no operator close to 'xyz'\n");
    }
}
