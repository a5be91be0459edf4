//! Natural language query parsing.
//!
//! Text flows through [`tokenizer`] into a token list, then through the
//! extraction passes ([`index`], [`date_range`], [`aggregation`], [`sort`],
//! [`pagination`]) and finally the [`condition`] state machine. [`parser`]
//! wires them together.

pub mod aggregation;
pub mod condition;
pub mod date_formats;
pub mod date_range;
pub mod index;
pub mod pagination;
pub mod parser;
pub mod sort;
pub mod token;
pub mod tokenizer;

pub use parser::{parse, NlParser};
pub use token::{Token, TokenKind};
pub use tokenizer::tokenize;
