//! Filter condition state machine.
//!
//! The parser walks the tokens left by the removal passes through four
//! states:
//!
//! ```text
//! ExpectField -> ExpectOperator -> ExpectValue -> ExpectLogicOrEnd
//!      ^                                               |
//!      +-----------------------------------------------+
//! ```
//!
//! Leaves are collected into one flat group sharing a single logic
//! operator. Ambiguities (is this comma a list separator or the end of the
//! clause? is this 或 an alternate value or a new predicate?) are decided by
//! fixed lookahead, never by backtracking.

use crate::error::{ParseError, Result};
use crate::intent::{ConditionIntent, Literal, LogicKind, OperatorKind};
use crate::keywords::{Lexicon, PaginationWord};
use crate::query::token::{Token, TokenKind};
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ExpectField,
    ExpectOperator,
    ExpectValue,
    ExpectLogicOrEnd,
}

/// Turn the remaining tokens into a condition tree.
///
/// Returns `Ok(None)` when no complete predicate was found. An operator that
/// never receives a value is an error.
pub fn parse_condition(tokens: &[Token], lexicon: &dyn Lexicon) -> Result<Option<ConditionIntent>> {
    let mut parser = ConditionParser::new(tokens, lexicon);
    parser.run()?;
    Ok(parser.finish())
}

struct ConditionParser<'a> {
    tokens: &'a [Token],
    lexicon: &'a dyn Lexicon,
    pos: usize,
    state: State,
    field: Option<String>,
    /// Operator awaiting its value, with its token index
    operator: Option<(OperatorKind, usize)>,
    leaves: Vec<ConditionIntent>,
    logic: Option<LogicKind>,
}

impl<'a> ConditionParser<'a> {
    fn new(tokens: &'a [Token], lexicon: &'a dyn Lexicon) -> Self {
        Self {
            tokens,
            lexicon,
            pos: 0,
            state: State::ExpectField,
            field: None,
            operator: None,
            leaves: Vec::new(),
            logic: None,
        }
    }

    fn run(&mut self) -> Result<()> {
        while self.pos < self.tokens.len() {
            match self.state {
                State::ExpectField => self.expect_field(),
                State::ExpectOperator => self.expect_operator(),
                State::ExpectValue => self.expect_value()?,
                State::ExpectLogicOrEnd => self.expect_logic_or_end(),
            }
        }

        match self.state {
            State::ExpectValue => Err(self.missing_value()),
            State::ExpectOperator => {
                trace!(field = ?self.field, "input ended before an operator");
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn finish(self) -> Option<ConditionIntent> {
        let logic = self.logic.unwrap_or(LogicKind::And);
        debug!(leaves = self.leaves.len(), %logic, "condition assembled");
        ConditionIntent::group(logic, self.leaves)
    }

    fn expect_field(&mut self) {
        let tokens = self.tokens;
        let token = &tokens[self.pos];

        match &token.kind {
            TokenKind::Unknown if self.is_fragment(self.pos) => {
                let end = self.fragment_run_end(self.pos);
                let field: String = tokens[self.pos..end].iter().map(|t| t.text.as_str()).collect();
                self.field = Some(field);
                self.pos = end;
                self.state = State::ExpectOperator;
            }
            TokenKind::Unknown => {
                let paging = self.lexicon.pagination(&token.text).is_some();
                trace!(word = %token.text, "skipping clause word");
                self.pos += 1;
                if paging {
                    self.skip_paging_tail();
                }
            }
            TokenKind::Logic(logic) => {
                if !self.leaves.is_empty() {
                    self.logic = Some(*logic);
                }
                self.pos += 1;
            }
            TokenKind::Operator(_) => match self.last_field() {
                // 年龄大于18，小于60
                Some(field) => {
                    self.field = Some(field);
                    self.state = State::ExpectOperator;
                }
                None => self.pos += 1,
            },
            TokenKind::Number(_)
            | TokenKind::Value(_)
            | TokenKind::Delimiter
            | TokenKind::Aggregation(_)
            | TokenKind::Sort { .. } => self.pos += 1,
        }
    }

    fn expect_operator(&mut self) {
        let tokens = self.tokens;
        let token = &tokens[self.pos];
        let Some(op) = token.operator() else {
            trace!(field = ?self.field, next = %token.text, "discarding field candidate");
            self.field = None;
            self.state = State::ExpectField;
            return;
        };

        self.pos += 1;
        if op.takes_value() {
            self.operator = Some((op, self.pos - 1));
            self.state = State::ExpectValue;
        } else {
            let field = self.field.take().unwrap_or_default();
            self.leaves.push(ConditionIntent::leaf(field, op, Vec::new()));
            self.state = State::ExpectLogicOrEnd;
        }
    }

    fn expect_value(&mut self) -> Result<()> {
        let Some((op, _)) = self.operator else {
            self.state = State::ExpectField;
            return Ok(());
        };

        let Some((first, next)) = self.value_at(self.pos) else {
            return Err(self.missing_value());
        };
        self.pos = next;

        let field = self.field.take().unwrap_or_default();
        let leaf = if op.is_multi_value() {
            self.collect_list(field, op, first)
        } else {
            self.collect_alternates(field, op, first)
        };

        self.leaves.push(leaf);
        self.operator = None;
        self.state = State::ExpectLogicOrEnd;
        Ok(())
    }

    /// 名字包含张或李: 或 before a bare value repeats field and operator
    fn collect_alternates(&mut self, field: String, op: OperatorKind, first: Literal) -> ConditionIntent {
        let mut alternates = Vec::new();
        while self.tokens.get(self.pos).and_then(Token::logic) == Some(LogicKind::Or)
            && !self.starts_field_clause(self.pos + 1)
        {
            let Some((value, next)) = self.value_at(self.pos + 1) else {
                break;
            };
            alternates.push(value);
            self.pos = next;
        }

        let mut leaf = ConditionIntent::leaf(field.clone(), op, vec![first]);
        if !alternates.is_empty() {
            leaf.logic = Some(LogicKind::Or);
            leaf.children = alternates
                .into_iter()
                .map(|v| ConditionIntent::leaf(field.clone(), op, vec![v]))
                .collect();
        }
        leaf
    }

    /// Values for IN / NOT_IN / BETWEEN, separated by commas, 到, 或
    fn collect_list(&mut self, field: String, mut op: OperatorKind, first: Literal) -> ConditionIntent {
        let tokens = self.tokens;
        let mut values = vec![first];

        while let Some(token) = tokens.get(self.pos) {
            if token.is_delimiter() {
                if self.delimiter_is_boundary(self.pos) {
                    trace!(offset = token.offset, "delimiter ends the value list");
                    break;
                }
                self.pos += 1;
                continue;
            }

            if token.is_unknown() && self.lexicon.is_range_close(&token.text) {
                // 在18到30之间
                if op == OperatorKind::In {
                    op = OperatorKind::Between;
                }
                self.pos += 1;
                break;
            }

            let separator = match token.kind {
                TokenKind::Unknown => self.lexicon.is_range_separator(&token.text),
                TokenKind::Logic(LogicKind::Or) => true,
                TokenKind::Logic(LogicKind::And) => op == OperatorKind::Between && values.len() < 2,
                _ => false,
            };
            if separator {
                if !self.list_continues(self.pos + 1) {
                    break;
                }
                if op == OperatorKind::In && token.is_unknown() {
                    op = OperatorKind::Between;
                }
                self.pos += 1;
                continue;
            }

            if !self.list_continues(self.pos) {
                break;
            }
            let Some((value, next)) = self.value_at(self.pos) else {
                break;
            };
            values.push(value);
            self.pos = next;
        }

        if op == OperatorKind::Between && values.len() != 2 {
            debug!(count = values.len(), "between with other than two values");
        }
        ConditionIntent::leaf(field, op, values)
    }

    fn expect_logic_or_end(&mut self) {
        let tokens = self.tokens;
        let token = &tokens[self.pos];
        match token.kind {
            TokenKind::Logic(logic) => {
                self.logic = Some(logic);
                self.pos += 1;
                self.state = State::ExpectField;
            }
            TokenKind::Delimiter => {
                self.pos += 1;
                self.state = State::ExpectField;
            }
            TokenKind::Operator(_) => {
                // age>=18<60
                self.field = self.last_field();
                self.state = State::ExpectOperator;
            }
            _ => self.state = State::ExpectField,
        }
    }

    /// A literal starting at `i` and the index after it.
    ///
    /// Adjacent unclassified tokens form one value unless the tail starts a
    /// new predicate.
    fn value_at(&self, i: usize) -> Option<(Literal, usize)> {
        let token = self.tokens.get(i)?;
        match &token.kind {
            TokenKind::Number(lit) | TokenKind::Value(lit) => Some((lit.clone(), i + 1)),
            TokenKind::Unknown if !self.is_clause_word(token) => {
                let mut end = i + 1;
                while self.is_fragment(end) && !self.starts_field_clause(end) {
                    end += 1;
                }
                Some((Literal::Text(join_adjacent(&self.tokens[i..end])), end))
            }
            _ => None,
        }
    }

    fn list_continues(&self, i: usize) -> bool {
        self.value_at(i).is_some() && !self.starts_field_clause(i)
    }

    /// A comma ends the clause when what follows (past more commas) is
    /// another clause: sort, aggregation, paging, a connector, the end, or
    /// a field followed by an operator.
    fn delimiter_is_boundary(&self, i: usize) -> bool {
        let mut j = i;
        while self.tokens.get(j).is_some_and(Token::is_delimiter) {
            j += 1;
        }
        let Some(next) = self.tokens.get(j) else {
            return true;
        };
        match next.kind {
            TokenKind::Sort { .. } | TokenKind::Aggregation(_) | TokenKind::Logic(_) => true,
            TokenKind::Unknown if self.is_clause_word(next) => true,
            _ => self.starts_field_clause(j),
        }
    }

    fn is_fragment(&self, i: usize) -> bool {
        self.tokens
            .get(i)
            .is_some_and(|t| t.is_unknown() && !self.lexicon.is_reserved(&t.text))
    }

    fn fragment_run_end(&self, i: usize) -> usize {
        let mut end = i;
        while self.is_fragment(end) {
            end += 1;
        }
        end
    }

    /// Fragments at `i` followed directly by an operator
    fn starts_field_clause(&self, i: usize) -> bool {
        self.is_fragment(i)
            && self
                .tokens
                .get(self.fragment_run_end(i))
                .is_some_and(|t| t.operator().is_some())
    }

    /// Words opening a sort, aggregation or paging clause
    fn is_clause_word(&self, token: &Token) -> bool {
        if !token.is_unknown() {
            return false;
        }
        let lex = self.lexicon;
        lex.is_sort_boundary(&token.text)
            || lex.is_aggregation_helper(&token.text)
            || matches!(
                lex.pagination(&token.text),
                Some(
                    PaginationWord::Limit
                        | PaginationWord::Offset
                        | PaginationWord::Page
                        | PaginationWord::PageSize
                        | PaginationWord::Continue
                )
            )
    }

    /// 限制10条, page=3: the number and unit after a paging word belong to it
    fn skip_paging_tail(&mut self) {
        while let Some(t) = self.tokens.get(self.pos) {
            let tail = t.operator() == Some(OperatorKind::Eq)
                || t.is_number()
                || (t.is_unknown()
                    && matches!(
                        self.lexicon.pagination(&t.text),
                        Some(
                            PaginationWord::RecordUnit
                                | PaginationWord::PageUnit
                                | PaginationWord::Ordinal
                                | PaginationWord::Start
                        )
                    ));
            if !tail {
                break;
            }
            self.pos += 1;
        }
    }

    fn last_field(&self) -> Option<String> {
        self.leaves.last().and_then(|leaf| leaf.field_hint.clone())
    }

    fn missing_value(&self) -> ParseError {
        let (operator, offset) = match self.operator {
            Some((_, idx)) => (self.tokens[idx].text.clone(), self.tokens[idx].offset),
            None => (String::new(), 0),
        };
        ParseError::MissingValue { operator, offset }
    }
}

/// Join tokens the way they were written: touching tokens directly,
/// separated ones with a space
fn join_adjacent(tokens: &[Token]) -> String {
    let mut out = String::new();
    for (i, t) in tokens.iter().enumerate() {
        if i > 0 && !tokens[i - 1].touches(t) {
            out.push(' ');
        }
        out.push_str(&t.text);
    }
    out
}
