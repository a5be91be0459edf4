use crate::error::{ParseError, Result};
use crate::intent::DateRangeIntent;
use crate::keywords::Lexicon;
use crate::query::date_formats::{self, DateMatch};
use crate::query::token::{reconstruct, Token};
use tracing::debug;

/// Separators accepted between the two bounds besides the lexicon's own
const EXTRA_SEPARATORS: &[&str] = &["to", "until", "—", "--"];

/// Pull an explicitly labelled time range (时间范围 2024-01-01 到 2024-02-01)
/// out of the token stream.
///
/// Only labelled ranges are handled here; a bare date compared against a
/// field stays in the stream for the condition parser. Everything from the
/// label to the end of the second date is removed. A date-shaped bound that
/// names no real day is an error.
pub fn extract_date_range(
    mut tokens: Vec<Token>,
    lexicon: &dyn Lexicon,
) -> Result<(Vec<Token>, Option<DateRangeIntent>)> {
    let Some(label) = tokens
        .iter()
        .position(|t| t.is_unknown() && lexicon.is_date_range_label(&t.text))
    else {
        return Ok((tokens, None));
    };

    let (text, spans) = reconstruct(&tokens);
    let (label_start, label_end) = spans[label];

    let found: Vec<DateMatch> = date_formats::find_all(&text[label_end..])
        .into_iter()
        .map(|m| DateMatch { start: m.start + label_end, end: m.end + label_end, ..m })
        .take(2)
        .collect();

    let [first, second] = found.as_slice() else {
        debug!(label = %tokens[label].text, dates = found.len(), "range label without two dates");
        return Ok((tokens, None));
    };

    let gap = text[first.end..second.start].trim();
    if !is_separator(gap, lexicon) {
        debug!(gap, "dates not joined by a range separator");
        return Ok((tokens, None));
    }

    let from = bound(first, &text)?;
    let to = bound(second, &text)?;

    let field_hint = tokens[label].text.clone();
    let span_end = second.end;
    let mut idx = 0;
    tokens.retain(|_| {
        let (start, _) = spans[idx];
        idx += 1;
        !(start >= label_start && start < span_end)
    });

    debug!(field = %field_hint, %from, %to, "date range extracted");
    Ok((tokens, Some(DateRangeIntent { field_hint, from, to })))
}

fn is_separator(gap: &str, lexicon: &dyn Lexicon) -> bool {
    !gap.is_empty()
        && (lexicon.is_range_separator(gap)
            || EXTRA_SEPARATORS.iter().any(|s| s.eq_ignore_ascii_case(gap)))
}

fn bound(m: &DateMatch, text: &str) -> Result<chrono::NaiveDateTime> {
    m.value.ok_or_else(|| ParseError::MalformedDate { text: text[m.start..m.end].to_string() })
}
