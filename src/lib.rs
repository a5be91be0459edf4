//! # nlq - Natural Language Query Parser
//!
//! nlq turns free-form search requests written in Chinese, English or a mix
//! of both into a structured [`Intent`]: an optional index name, a filter
//! condition tree, a labelled date range, sort keys, paging, and
//! aggregations. Field names are kept as the user wrote them; binding them
//! to a schema is left to whatever executes the search.
//!
//! ## Architecture
//!
//! - [`keywords`] - Keyword tables (operators, connectives, stop words, ...)
//! - [`query`] - Tokenizer, extraction passes and the condition state machine
//! - [`intent`] - Parse result records
//! - [`error`] - Parse failures
//! - [`output`] - Terminal rendering
//! - [`utils`] - Operator suggestions and on-disk configuration
//!
//! ## Quick Start
//!
//! ```
//! use nlq::intent::OperatorKind;
//!
//! let intent = nlq::parse("年龄大于18并且城市是北京").unwrap();
//! let condition = intent.condition().unwrap();
//! assert_eq!(condition.operator, Some(OperatorKind::Gt));
//! assert_eq!(condition.member_count(), 2);
//! ```
//!
//! Custom vocabularies go through [`NlParser::new`] with any [`keywords::Lexicon`].

pub mod error;
pub mod intent;
pub mod keywords;
pub mod output;
pub mod query;
pub mod utils;

pub use error::{ParseError, Result};
pub use intent::Intent;
pub use query::{parse, NlParser};
