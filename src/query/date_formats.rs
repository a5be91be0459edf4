//! Literal date/time formats understood in query text.
//!
//! Patterns are listed most specific first. Each one captures any of the
//! named groups `y`, `mo`, `d`, `h`, `mi`, `s`; missing parts default to the
//! first day of the period at midnight.

use chrono::{NaiveDate, NaiveDateTime};
use regex::{Captures, Regex};
use std::sync::OnceLock;

const YMD_DASH: &str = r"(?P<y>\d{4})-(?P<mo>\d{1,2})-(?P<d>\d{1,2})";
const YMD_SLASH: &str = r"(?P<y>\d{4})/(?P<mo>\d{1,2})/(?P<d>\d{1,2})";
const YMD_CN: &str = r"(?P<y>\d{4})年(?P<mo>\d{1,2})月(?P<d>\d{1,2})[日号]";
const HMS: &str = r"(?P<h>\d{1,2}):(?P<mi>\d{2}):(?P<s>\d{2})";
const HM: &str = r"(?P<h>\d{1,2}):(?P<mi>\d{2})";

/// (name, pattern, compact). Compact forms are plain digit runs, which the
/// tokenizer keeps as numbers.
fn sources() -> Vec<(&'static str, String, bool)> {
    vec![
        ("iso_datetime", format!(r"{YMD_DASH}[Tt]{HMS}(?:\.\d{{1,9}})?(?:Z|[+-]\d{{2}}:?\d{{2}})?"), false),
        ("iso_datetime_minutes", format!(r"{YMD_DASH}[Tt]{HM}"), false),
        ("dash_datetime", format!(r"{YMD_DASH} {HMS}"), false),
        ("dash_datetime_minutes", format!(r"{YMD_DASH} {HM}"), false),
        ("dash_date", YMD_DASH.to_string(), false),
        ("slash_datetime", format!(r"{YMD_SLASH} {HMS}"), false),
        ("slash_datetime_minutes", format!(r"{YMD_SLASH} {HM}"), false),
        ("slash_date", YMD_SLASH.to_string(), false),
        ("dot_date", r"(?P<y>\d{4})\.(?P<mo>\d{1,2})\.(?P<d>\d{1,2})".to_string(), false),
        (
            "cn_datetime",
            format!(r"{YMD_CN}\s*(?P<h>\d{{1,2}})[时点](?P<mi>\d{{1,2}})分(?P<s>\d{{1,2}})秒"),
            false,
        ),
        ("cn_datetime_minutes", format!(r"{YMD_CN}\s*(?P<h>\d{{1,2}})[时点](?P<mi>\d{{1,2}})分"), false),
        ("cn_date_clock", format!(r"{YMD_CN}\s*{HM}(?::(?P<s>\d{{2}}))?"), false),
        ("cn_datetime_hour", format!(r"{YMD_CN}\s*(?P<h>\d{{1,2}})[时点]"), false),
        ("cn_date", YMD_CN.to_string(), false),
        ("cn_month", r"(?P<y>\d{4})年(?P<mo>\d{1,2})月".to_string(), false),
        (
            "compact_datetime",
            r"(?P<y>\d{4})(?P<mo>\d{2})(?P<d>\d{2})(?P<h>\d{2})(?P<mi>\d{2})(?P<s>\d{2})".to_string(),
            true,
        ),
        (
            "compact_datetime_minutes",
            r"(?P<y>\d{4})(?P<mo>\d{2})(?P<d>\d{2})(?P<h>\d{2})(?P<mi>\d{2})".to_string(),
            true,
        ),
        ("compact_date", r"(?P<y>\d{4})(?P<mo>\d{2})(?P<d>\d{2})".to_string(), true),
        ("dash_month", r"(?P<y>\d{4})-(?P<mo>\d{1,2})".to_string(), false),
        ("slash_month", r"(?P<y>\d{4})/(?P<mo>\d{1,2})".to_string(), false),
    ]
}

pub struct DatePattern {
    pub name: &'static str,
    pub compact: bool,
    regex: Regex,
    anchored: Regex,
}

/// A date-like substring found in text
#[derive(Debug, Clone, PartialEq)]
pub struct DateMatch {
    pub start: usize,
    pub end: usize,
    /// Index into [`patterns`], lower is more specific
    pub pattern: usize,
    /// `None` when the text looks like a date but names no real day
    pub value: Option<NaiveDateTime>,
}

static PATTERNS: OnceLock<Vec<DatePattern>> = OnceLock::new();

/// The compiled format list, most specific first
pub fn patterns() -> &'static [DatePattern] {
    PATTERNS.get_or_init(|| {
        sources()
            .into_iter()
            .map(|(name, src, compact)| DatePattern {
                name,
                compact,
                // Sources are fixed strings; failure here is a programming error
                regex: Regex::new(&src).expect("invalid date pattern"),
                anchored: Regex::new(&format!("^(?:{src})")).expect("invalid date pattern"),
            })
            .collect()
    })
}

fn group(caps: &Captures, name: &str) -> Option<u32> {
    caps.name(name).and_then(|m| m.as_str().parse().ok())
}

fn to_datetime(caps: &Captures) -> Option<NaiveDateTime> {
    let year: i32 = caps.name("y")?.as_str().parse().ok()?;
    let month = group(caps, "mo").unwrap_or(1);
    let day = group(caps, "d").unwrap_or(1);
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(
        group(caps, "h").unwrap_or(0),
        group(caps, "mi").unwrap_or(0),
        group(caps, "s").unwrap_or(0),
    )
}

fn digit_before(text: &str, at: usize) -> bool {
    text[..at].chars().next_back().is_some_and(|c| c.is_ascii_digit())
}

fn digit_after(text: &str, at: usize) -> bool {
    text[at..].chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Match a valid, non-compact date at the very start of `text`.
///
/// Returns the matched byte length and the value. Used by the tokenizer so
/// dates survive as single tokens.
pub fn match_at(text: &str) -> Option<(usize, NaiveDateTime)> {
    for pattern in patterns().iter().filter(|p| !p.compact) {
        let Some(caps) = pattern.anchored.captures(text) else {
            continue;
        };
        let whole = caps.get(0)?;
        if digit_after(text, whole.end()) {
            continue;
        }
        // An invalid day must not fall back to a shorter pattern (2024-02-30
        // is not 2024-02)
        return to_datetime(&caps).map(|value| (whole.end(), value));
    }
    None
}

/// All date-like substrings, left to right, without overlaps.
///
/// At equal start the most specific pattern wins; a match touching another
/// digit on either side is not a date.
pub fn find_all(text: &str) -> Vec<DateMatch> {
    let mut candidates = Vec::new();
    for (idx, pattern) in patterns().iter().enumerate() {
        for caps in pattern.regex.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            if digit_before(text, whole.start()) || digit_after(text, whole.end()) {
                continue;
            }
            candidates.push(DateMatch {
                start: whole.start(),
                end: whole.end(),
                pattern: idx,
                value: to_datetime(&caps),
            });
        }
    }

    candidates.sort_by_key(|m| (m.start, m.pattern));

    let mut chosen: Vec<DateMatch> = Vec::new();
    for candidate in candidates {
        if chosen.last().is_some_and(|last| candidate.start < last.end) {
            continue;
        }
        chosen.push(candidate);
    }
    chosen
}
