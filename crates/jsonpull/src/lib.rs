//! Streaming pull parser and generator for JSON documents that can be
//! larger than available memory.
//!
//! The consumer drives [`PullParser`] one token at a time and receives the
//! structural skeleton and scalar values of the document in depth-first
//! order, together with the live key path from the root to each token.
//! Memory use is bounded by the pull buffer, the per-lexeme scratch
//! buffers, and the container depth, regardless of document size.
//! [`JsonWriter`] is the symmetric half: context-guarded write calls
//! emitting compact, well-formed JSON to any byte sink.
//!
//! # Examples
//!
//! ```
//! use jsonpull::{Number, PullParser, Token, path};
//!
//! let mut parser = PullParser::from_slice(br#"{"a":{"b":[10,20]}}"#);
//! let mut sum = 0;
//! while let Some(token) = parser.read().unwrap() {
//!     if let Token::Number { value: Number::Int(n), .. } = token {
//!         assert!(parser.path_match(&path!["a", "b"]));
//!         sum += n;
//!     }
//! }
//! assert_eq!(sum, 30);
//! ```

mod error;
mod escape;
mod key;
mod options;
mod parser;
mod path;
mod reader;
mod token;
mod writer;

pub use error::{ErrorKind, ParseError};
pub use key::Key;
pub use options::{NumberMode, ParserOptions};
pub use parser::PullParser;
pub use path::Path;
pub use token::{Decimal, InvalidDecimal, Number, Token};
pub use writer::{JsonWriter, ToJson};

#[cfg(test)]
mod tests;
