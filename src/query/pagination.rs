use crate::intent::{AggregationType, Literal, OperatorKind, PaginationIntent};
use crate::keywords::{Lexicon, PaginationWord};
use crate::query::token::{Token, TokenKind};
use tracing::debug;

/// Tokens searched after a continue word for its cursor
const CURSOR_LOOKAHEAD: usize = 4;
/// A limit word this close after a bucket aggregation is its size instead
const AGG_SIZE_LOOKBEHIND: usize = 3;

/// Raw paging signals before reconciliation
#[derive(Debug, Default)]
struct Signals {
    limit: Option<u64>,
    offset: Option<u64>,
    page: Option<u64>,
    size: Option<u64>,
    /// 1-based start position (从第21条开始)
    from: Option<u64>,
    /// Inclusive 1-based record range (21到30)
    range: Option<(u64, u64)>,
    continue_search: bool,
    search_after: Option<Vec<Literal>>,
}

impl Signals {
    fn is_empty(&self) -> bool {
        self.limit.is_none()
            && self.offset.is_none()
            && self.page.is_none()
            && self.size.is_none()
            && self.from.is_none()
            && self.range.is_none()
            && !self.continue_search
    }
}

/// Collect paging forms and resolve them into one request.
///
/// Forms: limit (限制10条), offset (跳过20), page and size (第3页每页10条,
/// page=3,size=10), start position (从第21条开始), record range (21到30条)
/// and cursor continuation (继续 [..]). Returns `None` when nothing paging
/// related was written.
pub fn parse_pagination(tokens: &[Token], lexicon: &dyn Lexicon) -> Option<PaginationIntent> {
    let scanner = Scanner { tokens, lexicon };
    let signals = scanner.scan();
    if signals.is_empty() {
        return None;
    }
    debug!(?signals, "pagination signals");
    Some(reconcile(signals))
}

/// Precedence: continuation, range, page and size, start position, then
/// plain limit and offset. Only the winning form fills offset and limit.
fn reconcile(s: Signals) -> PaginationIntent {
    let mut out = PaginationIntent::default();

    if s.continue_search {
        out.continue_search = true;
        out.search_after = s.search_after;
        out.limit = s.limit.or(s.size);
        return out;
    }

    if let Some((a, b)) = s.range {
        out.offset = Some(a.saturating_sub(1));
        out.limit = Some(b - a + 1);
        return out;
    }

    if let Some(page) = s.page {
        let size = s.size.or(s.limit);
        out.page = Some(page);
        out.size = size;
        if let Some(size) = size {
            out.offset = page.saturating_sub(1).checked_mul(size);
            if out.offset.is_none() {
                debug!(page, size, "page offset overflows, left unset");
            }
            out.limit = Some(size);
        }
        return out;
    }

    if let Some(from) = s.from {
        out.offset = Some(from.saturating_sub(1));
        out.limit = s.limit.or(s.size);
        return out;
    }

    out.limit = s.limit.or(s.size);
    out.offset = s.offset;
    out
}

struct Scanner<'a> {
    tokens: &'a [Token],
    lexicon: &'a dyn Lexicon,
}

impl Scanner<'_> {
    fn scan(&self) -> Signals {
        let mut s = Signals::default();
        let mut i = 0;

        while i < self.tokens.len() {
            if let Some((a, b, end)) = self.accepted_range(i) {
                s.range = Some((a, b));
                i = end;
                continue;
            }

            let Some(word) = self.word(i) else {
                i += 1;
                continue;
            };

            match word {
                PaginationWord::Limit => {
                    if let Some((n, j)) = self.number_after(i) {
                        if self.after_bucket_aggregation(i) {
                            debug!(size = n, "limit word belongs to an aggregation");
                        } else if self.range_at(j).is_none() {
                            s.limit = Some(n);
                            i = j;
                        }
                    }
                }
                PaginationWord::Offset => {
                    if let Some((n, j)) = self.number_after(i) {
                        s.offset = Some(n);
                        i = j;
                    }
                }
                PaginationWord::Page => {
                    if let Some((n, j)) = self.number_after(i) {
                        s.page = Some(n);
                        i = j;
                    }
                }
                PaginationWord::PageSize => {
                    if let Some((n, j)) = self.number_after(i) {
                        s.size = Some(n);
                        i = j;
                    }
                }
                PaginationWord::Ordinal => {
                    // 第3页
                    if let Some(n) = self.tokens.get(i + 1).and_then(Token::as_count) {
                        if self.word(i + 2) == Some(PaginationWord::PageUnit) {
                            s.page = Some(n);
                            i += 2;
                        }
                    }
                }
                PaginationWord::From => {
                    if let Some((n, j)) = self.start_position(i) {
                        s.from = Some(n);
                        i = j;
                    }
                }
                PaginationWord::Continue => {
                    s.continue_search = true;
                    if let Some(cursor) = self.cursor_after(i) {
                        s.search_after = Some(cursor);
                    }
                }
                PaginationWord::PageUnit | PaginationWord::RecordUnit | PaginationWord::Start => {}
            }
            i += 1;
        }

        s
    }

    fn word(&self, i: usize) -> Option<PaginationWord> {
        let t = self.tokens.get(i)?;
        if !t.is_unknown() {
            return None;
        }
        self.lexicon.pagination(&t.text)
    }

    /// NUMBER right after `i`, optionally behind `=`
    fn number_after(&self, i: usize) -> Option<(u64, usize)> {
        let mut j = i + 1;
        if self.tokens.get(j).and_then(Token::operator) == Some(OperatorKind::Eq) {
            j += 1;
        }
        let n = self.tokens.get(j)?.as_count()?;
        Some((n, j))
    }

    fn after_bucket_aggregation(&self, i: usize) -> bool {
        self.tokens[i.saturating_sub(AGG_SIZE_LOOKBEHIND)..i]
            .iter()
            .any(|t| matches!(t.aggregation(), Some(AggregationType::Terms | AggregationType::DateHistogram)))
    }

    /// 从[第]N[条][开始]
    fn start_position(&self, i: usize) -> Option<(u64, usize)> {
        let mut j = i + 1;
        if self.word(j) == Some(PaginationWord::Ordinal) {
            j += 1;
        }
        let n = self.tokens.get(j)?.as_count()?;
        if self.range_at(j).is_some() {
            return None;
        }
        if self.word(j + 1) == Some(PaginationWord::RecordUnit) {
            j += 1;
        }
        if self.word(j + 1) == Some(PaginationWord::Start) {
            j += 1;
        }
        Some((n, j))
    }

    /// Shape of `A 到 [第]B [条]` starting at a NUMBER. Returns both bounds,
    /// the index just past the shape and whether a unit closed it.
    fn range_at(&self, i: usize) -> Option<(u64, u64, usize, bool)> {
        let a = self.tokens.get(i)?.as_count()?;
        let sep = self.tokens.get(i + 1)?;
        if !(sep.is_unknown() && self.lexicon.is_range_separator(&sep.text)) {
            return None;
        }
        let mut j = i + 2;
        if self.word(j) == Some(PaginationWord::Ordinal) {
            j += 1;
        }
        let b = self.tokens.get(j)?.as_count()?;
        j += 1;
        let unit = self.word(j) == Some(PaginationWord::RecordUnit);
        if unit {
            j += 1;
        }
        Some((a, b, j, unit))
    }

    /// A record range in a paging position: after a paging word, at a clause
    /// start, or closed by a unit. Never a value range of a condition.
    fn accepted_range(&self, i: usize) -> Option<(u64, u64, usize)> {
        let (a, b, end, unit) = self.range_at(i)?;

        let closes = self
            .tokens
            .get(end)
            .is_some_and(|t| t.is_unknown() && self.lexicon.is_range_close(&t.text));
        let prev = i.checked_sub(1).map(|p| &self.tokens[p]);
        if closes || prev.is_some_and(|t| t.operator().is_some()) {
            return None;
        }

        let paging_context = match prev {
            None => true,
            Some(t) => {
                matches!(t.kind, TokenKind::Delimiter | TokenKind::Logic(_))
                    || self.word(i - 1).is_some()
            }
        };
        if !(paging_context || unit) {
            return None;
        }
        if b < a {
            debug!(a, b, "descending record range ignored");
            return None;
        }
        Some((a, b, end))
    }

    /// Bracketed cursor shortly after a continue word
    fn cursor_after(&self, i: usize) -> Option<Vec<Literal>> {
        self.tokens
            .iter()
            .skip(i + 1)
            .take(CURSOR_LOOKAHEAD)
            .find(|t| matches!(t.kind, TokenKind::Value(_)) && t.text.starts_with('['))
            .and_then(|t| t.literal())
            .and_then(Literal::as_text)
            .map(parse_cursor)
    }
}

/// `1, 2.5, abc` -> [1, 2.5, "abc"]
fn parse_cursor(inner: &str) -> Vec<Literal> {
    inner
        .split([',', '，'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(Literal::coerce)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::KeywordTables;
    use crate::query::tokenizer::tokenize;

    fn paging(input: &str) -> Option<PaginationIntent> {
        let lex = KeywordTables::builtin();
        parse_pagination(&tokenize(input, lex), lex)
    }

    fn offset_limit(input: &str) -> (Option<u64>, Option<u64>) {
        let p = paging(input).unwrap_or_else(|| panic!("no pagination in {input}"));
        (p.offset, p.limit)
    }

    #[test]
    fn test_plain_limit() {
        let p = paging("按创建时间降序限制10条").unwrap();
        assert_eq!(p.limit, Some(10));
        assert_eq!(p.offset, None);
        assert_eq!(p.page, None);
    }

    #[test]
    fn test_three_forms_agree() {
        assert_eq!(offset_limit("page=3,size=10"), (Some(20), Some(10)));
        assert_eq!(offset_limit("21到30"), (Some(20), Some(10)));
        assert_eq!(offset_limit("从第21条开始返回10条"), (Some(20), Some(10)));
    }

    #[test]
    fn test_page_inherits_limit() {
        let p = paging("第3页，显示20条").unwrap();
        assert_eq!(p.page, Some(3));
        assert_eq!(p.size, Some(20));
        assert_eq!(p.offset, Some(40));
        assert_eq!(p.limit, Some(20));
    }

    #[test]
    fn test_huge_page_leaves_offset_unset() {
        let p = paging("page=4294967296,size=4294967296").unwrap();
        assert_eq!(p.page, Some(4294967296));
        assert_eq!(p.limit, Some(4294967296));
        assert_eq!(p.offset, None);

        let p = paging("第9999999999页每页9999999999条").unwrap();
        assert_eq!(p.offset, None);
        assert_eq!(p.size, Some(9999999999));
    }

    #[test]
    fn test_range_with_ordinal_and_unit() {
        assert_eq!(offset_limit("返回第11到20条"), (Some(10), Some(10)));
    }

    #[test]
    fn test_condition_ranges_are_not_paging() {
        assert!(paging("年龄在18到30之间").is_none());
        assert!(paging("年龄18到30").is_none());
    }

    #[test]
    fn test_offset_and_limit_english() {
        assert_eq!(offset_limit("limit 5 offset 15"), (Some(15), Some(5)));
        assert_eq!(offset_limit("skip 10 top 3"), (Some(10), Some(3)));
    }

    #[test]
    fn test_continuation_never_sets_offset() {
        let p = paging("继续查询 search_after [1700000000, 2.5, abc] 限制20条 跳过5").unwrap();
        assert!(p.continue_search);
        assert_eq!(p.offset, None);
        assert_eq!(p.limit, Some(20));
        assert_eq!(
            p.search_after,
            Some(vec![Literal::Integer(1700000000), Literal::Float(2.5), Literal::Text("abc".into())])
        );
    }

    #[test]
    fn test_aggregation_size_not_limit() {
        assert!(paging("按城市分组前10个").is_none());
    }

    #[test]
    fn test_no_signal() {
        assert!(paging("年龄大于18").is_none());
    }
}
