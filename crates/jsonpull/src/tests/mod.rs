mod paths;

use crate::{ParseError, ParserOptions, PullParser, Token};

/// Parses `input` to completion with default options, panicking on error.
pub(crate) fn tokens(input: &str) -> Vec<Token> {
    tokens_with(input, ParserOptions::default())
}

pub(crate) fn tokens_with(input: &str, options: ParserOptions) -> Vec<Token> {
    PullParser::from_slice_with_options(input.as_bytes(), options)
        .map(|result| result.expect("parse failed"))
        .collect()
}

/// Drives the parser until it fails and returns the error.
pub(crate) fn first_error(input: &[u8]) -> ParseError {
    first_error_with(input, ParserOptions::default())
}

pub(crate) fn first_error_with(input: &[u8], options: ParserOptions) -> ParseError {
    let mut parser = PullParser::from_slice_with_options(input, options);
    loop {
        match parser.read() {
            Ok(Some(_)) => {}
            Ok(None) => panic!("input parsed without error"),
            Err(err) => return err,
        }
    }
}
