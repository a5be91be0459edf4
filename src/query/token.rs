use crate::intent::{AggregationType, Literal, LogicKind, OperatorKind, SortOrder};
use serde::Serialize;

/// Token classification with its payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum TokenKind {
    /// Unclassified text; a field-name fragment or a bare value
    Unknown,
    Operator(OperatorKind),
    Logic(LogicKind),
    /// Integer or decimal literal
    Number(Literal),
    /// Quoted text, dates, bracketed lists and other literal-only forms
    Value(Literal),
    Delimiter,
    Aggregation(AggregationType),
    /// `explicit` is false for bare 排序/sort words
    Sort { order: SortOrder, explicit: bool },
}

/// One token of the input.
///
/// Tokens never change after the tokenizer emits them; passes only remove
/// whole tokens from the sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    #[serde(flatten)]
    pub kind: TokenKind,
    /// Source text exactly as written
    pub text: String,
    /// Byte offset of `text` in the original input
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, offset: usize) -> Self {
        Self { kind, text: text.into(), offset }
    }

    pub fn unknown(text: impl Into<String>, offset: usize) -> Self {
        Self::new(TokenKind::Unknown, text, offset)
    }

    /// Byte offset just past the token
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self.kind, TokenKind::Unknown)
    }

    pub fn is_number(&self) -> bool {
        matches!(self.kind, TokenKind::Number(_))
    }

    pub fn is_delimiter(&self) -> bool {
        matches!(self.kind, TokenKind::Delimiter)
    }

    pub fn operator(&self) -> Option<OperatorKind> {
        match self.kind {
            TokenKind::Operator(op) => Some(op),
            _ => None,
        }
    }

    pub fn logic(&self) -> Option<LogicKind> {
        match self.kind {
            TokenKind::Logic(l) => Some(l),
            _ => None,
        }
    }

    pub fn aggregation(&self) -> Option<AggregationType> {
        match self.kind {
            TokenKind::Aggregation(a) => Some(a),
            _ => None,
        }
    }

    /// Literal carried by NUMBER and VALUE tokens
    pub fn literal(&self) -> Option<&Literal> {
        match &self.kind {
            TokenKind::Number(lit) | TokenKind::Value(lit) => Some(lit),
            _ => None,
        }
    }

    /// Non-negative integer value of a NUMBER token
    pub fn as_count(&self) -> Option<u64> {
        match &self.kind {
            TokenKind::Number(Literal::Integer(n)) => u64::try_from(*n).ok(),
            _ => None,
        }
    }

    /// True when `next` starts exactly where this token ends
    pub fn touches(&self, next: &Token) -> bool {
        self.end() == next.offset
    }
}

/// Render a token sequence back into text, preserving original adjacency.
///
/// Tokens that were contiguous in the input are joined directly, anything
/// else is separated by one space. Returns the text and each token's byte
/// span in it.
pub fn reconstruct(tokens: &[Token]) -> (String, Vec<(usize, usize)>) {
    let mut text = String::new();
    let mut spans = Vec::with_capacity(tokens.len());
    let mut prev: Option<&Token> = None;

    for token in tokens {
        if let Some(p) = prev {
            if !p.touches(token) {
                text.push(' ');
            }
        }
        let start = text.len();
        text.push_str(&token.text);
        spans.push((start, text.len()));
        prev = Some(token);
    }

    (text, spans)
}
