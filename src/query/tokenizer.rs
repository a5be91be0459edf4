use crate::intent::{Literal, SortOrder};
use crate::keywords::{KeywordEntry, Lexicon, MatchContext, SortWord};
use crate::query::date_formats;
use crate::query::token::{Token, TokenKind};
use tracing::trace;

/// Split query text into classified tokens.
///
/// Stop words are dropped; every other fragment of the input, including
/// unclassified runs that may later merge into field names, becomes a token
/// carrying its byte offset.
pub fn tokenize(input: &str, lexicon: &dyn Lexicon) -> Vec<Token> {
    let mut tokenizer = Tokenizer::new(input, lexicon);
    tokenizer.run();
    trace!(count = tokenizer.tokens.len(), "tokenized");
    tokenizer.tokens
}

/// Characters that carry no meaning of their own
fn is_noise(ch: char) -> bool {
    matches!(
        ch,
        '(' | ')' | '（' | '）' | '{' | '}' | '?' | '？' | '!' | '！' | '。' | '…'
    )
}

fn closing_quote(ch: char) -> Option<char> {
    match ch {
        '"' => Some('"'),
        '\'' => Some('\''),
        '“' => Some('”'),
        '‘' => Some('’'),
        '「' => Some('」'),
        '『' => Some('』'),
        _ => None,
    }
}

fn is_word_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Characters that may continue an unclassified CJK run
fn is_run_char(ch: char) -> bool {
    !ch.is_whitespace() && !ch.is_ascii() && !is_noise(ch) && closing_quote(ch).is_none()
}

struct Tokenizer<'a> {
    input: &'a str,
    lexicon: &'a dyn Lexicon,
    pos: usize,
    /// Start of the pending unclassified run
    run_start: Option<usize>,
    tokens: Vec<Token>,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str, lexicon: &'a dyn Lexicon) -> Self {
        Self {
            input,
            lexicon,
            pos: 0,
            run_start: None,
            tokens: Vec::new(),
        }
    }

    fn run(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.flush_run();
                self.advance();
                continue;
            }

            if let Some(close) = closing_quote(ch) {
                self.flush_run();
                self.scan_quoted(close);
                continue;
            }

            if ch == '[' {
                self.flush_run();
                self.scan_bracketed();
                continue;
            }

            if ch.is_ascii_digit() || self.at_signed_number(ch) {
                self.flush_run();
                if !self.scan_date() {
                    self.scan_number();
                }
                continue;
            }

            if let Some((len, entry)) = self.match_keyword() {
                self.flush_run();
                self.emit_keyword(len, entry);
                continue;
            }

            if is_noise(ch) {
                self.flush_run();
                self.advance();
                continue;
            }

            if is_word_start(ch) {
                self.flush_run();
                self.scan_word();
                continue;
            }

            if self.run_start.is_none() {
                self.run_start = Some(self.pos);
            }
            self.advance();
        }
        self.flush_run();
    }

    fn flush_run(&mut self) {
        if let Some(start) = self.run_start.take() {
            if start < self.pos {
                self.tokens.push(Token::unknown(&self.input[start..self.pos], start));
            }
        }
    }

    /// '-' directly before a digit is a sign where a value is expected
    fn at_signed_number(&self, ch: char) -> bool {
        if ch != '-' || self.run_start.is_some() {
            return false;
        }
        let next_is_digit = self.input[self.pos + 1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit());
        let expects_value = match self.tokens.last() {
            None => true,
            Some(t) => matches!(
                t.kind,
                TokenKind::Operator(_) | TokenKind::Delimiter | TokenKind::Logic(_)
            ),
        };
        next_is_digit && expects_value
    }

    fn scan_quoted(&mut self, close: char) {
        let start = self.pos;
        self.advance();
        let inner_start = self.pos;
        while let Some(ch) = self.peek_char() {
            if ch == close {
                break;
            }
            self.advance();
        }
        let inner = self.input[inner_start..self.pos].to_string();
        if self.peek_char() == Some(close) {
            self.advance();
        }
        let text = &self.input[start..self.pos];
        self.tokens
            .push(Token::new(TokenKind::Value(Literal::Text(inner)), text, start));
    }

    fn scan_bracketed(&mut self) {
        let start = self.pos;
        self.advance();
        let inner_start = self.pos;
        while let Some(ch) = self.peek_char() {
            if ch == ']' {
                break;
            }
            self.advance();
        }
        let inner = self.input[inner_start..self.pos].trim().to_string();
        if self.peek_char() == Some(']') {
            self.advance();
        }
        let text = &self.input[start..self.pos];
        self.tokens
            .push(Token::new(TokenKind::Value(Literal::Text(inner)), text, start));
    }

    fn scan_date(&mut self) -> bool {
        let Some((len, _)) = date_formats::match_at(self.remaining()) else {
            return false;
        };
        let start = self.pos;
        let text = &self.input[start..start + len];
        self.tokens.push(Token::new(
            TokenKind::Value(Literal::Text(text.to_string())),
            text,
            start,
        ));
        self.pos += len;
        true
    }

    fn scan_number(&mut self) {
        let start = self.pos;
        if self.peek_char() == Some('-') {
            self.advance();
        }
        self.skip_digits();

        let mut dots = 0;
        while self.peek_char() == Some('.') && self.digit_at(self.pos + 1) {
            dots += 1;
            self.advance();
            self.skip_digits();
        }

        // Digit-led words such as "3d" or "10abc" are values, not numbers
        let mut wordish = false;
        while let Some(ch) = self.peek_char() {
            if is_word_char(ch) {
                wordish = true;
                self.advance();
            } else {
                break;
            }
        }

        let text = &self.input[start..self.pos];
        let kind = if wordish || dots > 1 {
            TokenKind::Value(Literal::Text(text.to_string()))
        } else if dots == 1 {
            match text.parse::<f64>() {
                Ok(f) => TokenKind::Number(Literal::Float(f)),
                Err(_) => TokenKind::Value(Literal::Text(text.to_string())),
            }
        } else {
            match text.parse::<i64>() {
                Ok(n) => TokenKind::Number(Literal::Integer(n)),
                Err(_) => TokenKind::Value(Literal::Text(text.to_string())),
            }
        };
        self.tokens.push(Token::new(kind, text, start));
    }

    fn scan_word(&mut self) {
        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            let joins = matches!(ch, '.' | '-' | '@')
                && self.input[self.pos + 1..]
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_alphanumeric());
            if is_word_char(ch) || joins {
                self.advance();
            } else {
                break;
            }
        }
        let text = &self.input[start..self.pos];
        let kind = if text.contains('@') {
            TokenKind::Value(Literal::Text(text.to_string()))
        } else {
            TokenKind::Unknown
        };
        self.tokens.push(Token::new(kind, text, start));
    }

    /// Longest dictionary word starting here that its context allows
    fn match_keyword(&self) -> Option<(usize, &'a KeywordEntry)> {
        let lexicon = self.lexicon;
        let rest = self.remaining();
        let ends: Vec<usize> = rest
            .char_indices()
            .map(|(i, c)| i + c.len_utf8())
            .take(lexicon.longest_keyword_chars())
            .collect();

        for &end in ends.iter().rev() {
            let candidate = &rest[..end];
            let Some(entry) = lexicon.entry(candidate) else {
                continue;
            };
            if !self.word_boundaries_ok(candidate, end)
                || !self.context_ok(entry, end)
                || self.absorbed(candidate, entry, end)
            {
                continue;
            }
            return Some((end, entry));
        }
        None
    }

    /// ASCII keywords must not be glued to surrounding letters
    fn word_boundaries_ok(&self, candidate: &str, len: usize) -> bool {
        let first = candidate.chars().next();
        let last = candidate.chars().next_back();

        if first.is_some_and(|c| c.is_ascii_alphanumeric()) {
            let before = self.input[..self.pos].chars().next_back();
            if before.is_some_and(is_word_char) {
                return false;
            }
        }
        if last.is_some_and(|c| c.is_ascii_alphabetic()) {
            let mut after = self.input[self.pos + len..].chars();
            match after.next() {
                Some(c) if is_word_start(c) || c == '@' => return false,
                Some('-') | Some('.') if after.next().is_some_and(|c| c.is_ascii_alphabetic()) => {
                    return false;
                }
                _ => {}
            }
        }
        true
    }

    fn context_ok(&self, entry: &KeywordEntry, len: usize) -> bool {
        match entry.context {
            MatchContext::Always => true,
            MatchContext::BeforeNumber => self.input[self.pos + len..]
                .trim_start()
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_digit()),
            MatchContext::AfterNumber => {
                self.run_start.is_none() && self.tokens.last().is_some_and(Token::is_number)
            }
            MatchContext::AfterIndexIndicator => {
                self.run_start.is_none()
                    && self
                        .tokens
                        .last()
                        .is_some_and(|t| t.is_unknown() && self.lexicon.is_index_indicator(&t.text))
            }
        }
    }

    /// Single-character soft words wedged inside an unclassified run stay
    /// part of it (目的地, 报表格)
    fn absorbed(&self, candidate: &str, entry: &KeywordEntry, len: usize) -> bool {
        let soft = entry.stop_word || entry.index_indicator || entry.demonstrative;
        let has_kind = entry.operator.is_some()
            || entry.logic.is_some()
            || entry.delimiter
            || entry.aggregation.is_some()
            || entry.sort.is_some();
        if !soft || has_kind || candidate.chars().count() != 1 || self.run_start.is_none() {
            return false;
        }
        let after = self.pos + len;
        let continues_run = self.input[after..].chars().next().is_some_and(is_run_char);
        continues_run && !self.keyword_starts_at(after)
    }

    /// Whether any unconditional or prefix word begins at `at`
    fn keyword_starts_at(&self, at: usize) -> bool {
        let rest = &self.input[at..];
        rest.char_indices()
            .map(|(i, c)| i + c.len_utf8())
            .take(self.lexicon.longest_keyword_chars())
            .any(|end| {
                self.lexicon
                    .entry(&rest[..end])
                    .is_some_and(|e| e.context != MatchContext::AfterNumber)
            })
    }

    fn emit_keyword(&mut self, len: usize, entry: &KeywordEntry) {
        let start = self.pos;
        let text = &self.input[start..start + len];
        self.pos += len;

        let kind = if let Some(op) = entry.operator {
            TokenKind::Operator(op)
        } else if let Some(logic) = entry.logic {
            TokenKind::Logic(logic)
        } else if entry.delimiter {
            TokenKind::Delimiter
        } else if let Some(agg) = entry.aggregation {
            TokenKind::Aggregation(agg)
        } else if let Some(sort) = entry.sort {
            match sort {
                SortWord::Order(order) => TokenKind::Sort { order, explicit: true },
                SortWord::Generic => TokenKind::Sort { order: SortOrder::Asc, explicit: false },
            }
        } else if entry.stop_word {
            trace!(word = text, "dropping stop word");
            return;
        } else {
            TokenKind::Unknown
        };

        self.tokens.push(Token::new(kind, text, start));
    }

    fn skip_digits(&mut self) {
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn digit_at(&self, at: usize) -> bool {
        self.input[at..].chars().next().is_some_and(|c| c.is_ascii_digit())
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.peek_char() {
            self.pos += ch.len_utf8();
        }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::{AggregationType, LogicKind, OperatorKind};
    use crate::keywords::KeywordTables;

    fn lex(input: &str) -> Vec<Token> {
        tokenize(input, KeywordTables::builtin())
    }

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_chinese_condition() {
        let tokens = lex("年龄大于等于18并且城市在北京");
        assert_eq!(texts(&tokens), vec!["年龄", "大于等于", "18", "并且", "城市", "在", "北京"]);
        assert!(tokens[0].is_unknown());
        assert_eq!(tokens[1].operator(), Some(OperatorKind::Gte));
        assert_eq!(tokens[2].kind, TokenKind::Number(Literal::Integer(18)));
        assert_eq!(tokens[3].logic(), Some(LogicKind::And));
        assert_eq!(tokens[5].operator(), Some(OperatorKind::In));
    }

    #[test]
    fn test_offsets_are_byte_positions() {
        let input = "名字包含张";
        let tokens = lex(input);
        for t in &tokens {
            assert_eq!(&input[t.offset..t.end()], t.text);
        }
        assert_eq!(tokens[2].offset, 12);
    }

    #[test]
    fn test_symbolic_operators_split_ascii_words() {
        let tokens = lex("age>=18<60");
        assert_eq!(texts(&tokens), vec!["age", ">=", "18", "<", "60"]);
        assert_eq!(tokens[3].operator(), Some(OperatorKind::Lt));
    }

    #[test]
    fn test_english_keywords_respect_word_boundaries() {
        let tokens = lex("gender in a, b or android");
        assert_eq!(texts(&tokens), vec!["gender", "in", "a", ",", "b", "or", "android"]);
        assert!(tokens[0].is_unknown());
        assert_eq!(tokens[5].logic(), Some(LogicKind::Or));
        assert!(tokens[6].is_unknown());
    }

    #[test]
    fn test_multi_word_english_operator() {
        let tokens = lex("price greater than 10");
        assert_eq!(texts(&tokens), vec!["price", "greater than", "10"]);
        assert_eq!(tokens[1].operator(), Some(OperatorKind::Gt));
    }

    #[test]
    fn test_delimiter_variants() {
        let tokens = lex("a,b，c、d");
        let delims = tokens.iter().filter(|t| t.is_delimiter()).count();
        assert_eq!(delims, 3);
    }

    #[test]
    fn test_script_change_splits_field_fragments() {
        let tokens = lex("目标IP是1.2.3.4");
        assert_eq!(texts(&tokens), vec!["目标", "IP", "是", "1.2.3.4"]);
        assert!(matches!(tokens[3].kind, TokenKind::Value(_)));
    }

    #[test]
    fn test_numbers_and_decimals() {
        let tokens = lex("价格小于9.5");
        assert_eq!(tokens[2].kind, TokenKind::Number(Literal::Float(9.5)));
        let tokens = lex("温度大于-3");
        assert_eq!(tokens[2].kind, TokenKind::Number(Literal::Integer(-3)));
    }

    #[test]
    fn test_quoted_and_bracketed_values() {
        let tokens = lex("名字是\"张 三\" search_after [1, 'a']");
        assert_eq!(tokens[2].kind, TokenKind::Value(Literal::Text("张 三".into())));
        assert_eq!(tokens[2].text, "\"张 三\"");
        let last = tokens.last().unwrap();
        assert_eq!(last.kind, TokenKind::Value(Literal::Text("1, 'a'".into())));
    }

    #[test]
    fn test_dates_stay_whole() {
        let tokens = lex("时间范围2024-01-01 10:00到2024年2月1日");
        assert_eq!(texts(&tokens), vec!["时间范围", "2024-01-01 10:00", "到", "2024年2月1日"]);
    }

    #[test]
    fn test_context_rules() {
        // 前 and 条 only around numbers
        let tokens = lex("前端条件");
        assert_eq!(texts(&tokens), vec!["前端条件"]);
        let tokens = lex("前10条");
        assert_eq!(texts(&tokens), vec!["前", "10", "条"]);
    }

    #[test]
    fn test_soft_words_absorbed_inside_runs() {
        let tokens = lex("目的地是上海");
        assert_eq!(texts(&tokens), vec!["目的地", "是", "上海"]);
        // but stripped next to keywords
        let tokens = lex("年龄的平均值");
        assert_eq!(texts(&tokens), vec!["年龄", "平均值"]);
    }

    #[test]
    fn test_stop_words_dropped() {
        assert!(lex("查一下").is_empty());
        let tokens = lex("帮我查询年龄大于1");
        assert_eq!(texts(&tokens), vec!["年龄", "大于", "1"]);
    }

    #[test]
    fn test_aggregation_and_sort_tokens() {
        let tokens = lex("按创建时间每天统计，按年龄降序排序");
        assert_eq!(tokens[2].aggregation(), Some(AggregationType::DateHistogram));
        let sorts: Vec<_> = tokens
            .iter()
            .filter_map(|t| match t.kind {
                TokenKind::Sort { order, explicit } => Some((order, explicit)),
                _ => None,
            })
            .collect();
        assert_eq!(sorts, vec![(SortOrder::Desc, true), (SortOrder::Asc, false)]);
    }

    #[test]
    fn test_index_suffix_only_after_indicator() {
        let tokens = lex("orders索引中年龄大于1");
        assert_eq!(texts(&tokens), vec!["orders", "索引", "中", "年龄", "大于", "1"]);
        let tokens = lex("中年人数");
        assert_eq!(texts(&tokens), vec!["中年人数"]);
    }
}
