//! The pull parser: lexeme scanners and the structural driver.
//!
//! Each call to [`PullParser::read`] consumes zero or more whitespace
//! bytes, at most one structural byte, and at most one value lexeme, and
//! produces exactly one token or signals end-of-input. The parser never
//! builds a tree; memory use is bounded by the pull buffer, the per-lexeme
//! scratch buffers, and the depth of the open-container stack.

use std::fs::File;
use std::io::{self, Read};

use crate::{
    error::{ErrorKind, ParseError},
    escape,
    key::Key,
    options::{NumberMode, ParserOptions},
    path,
    reader::ByteReader,
    token::{Decimal, Number, Token},
};

/// Bytes of following input captured in error snippets.
const CONTEXT_LEN: usize = 20;

/// One entry of the parse stack. The bottom frame is always `Root`;
/// container frames count the children already entered, which also names
/// the next array slot.
#[derive(Debug, Clone, Copy)]
enum Frame {
    Root { seen: bool },
    Object { children: usize },
    Array { children: usize },
}

/// A streaming pull parser over a byte source.
///
/// The consumer drives the parser one token at a time with
/// [`read`](Self::read) and can inspect the live key path between calls.
/// The parser is single-use: it advances monotonically, and after
/// end-of-input or the first error every further `read` reports
/// end-of-input.
///
/// # Examples
///
/// ```
/// use jsonpull::{PullParser, Token};
///
/// let mut parser = PullParser::from_slice(br#"{"user":"ada","tags":["ops"]}"#);
/// while let Some(token) = parser.read().unwrap() {
///     if let Token::String { value, .. } = &token {
///         println!("{} = {value}", parser.path_string());
///     }
/// }
/// ```
pub struct PullParser<R> {
    reader: ByteReader<R>,
    frames: Vec<Frame>,
    path: Vec<Key>,
    /// Scratch for string lexemes; truncated, never freed, between tokens.
    scratch: Vec<u8>,
    /// Scratch for number lexemes.
    number: String,
    max_value_length: usize,
    number_mode: NumberMode,
    multiple_values: bool,
    done: bool,
}

impl<R: Read> PullParser<R> {
    /// Creates a parser over `source` with default options.
    pub fn new(source: R) -> Self {
        Self::with_options(source, ParserOptions::default())
    }

    /// Creates a parser over `source` with the given options.
    pub fn with_options(source: R, options: ParserOptions) -> Self {
        Self {
            reader: ByteReader::new(source, options.buffer_capacity),
            frames: vec![Frame::Root { seen: false }],
            path: Vec::new(),
            scratch: Vec::new(),
            number: String::new(),
            max_value_length: options.max_value_length,
            number_mode: options.number_mode,
            multiple_values: options.allow_multiple_values,
            done: false,
        }
    }

    /// Consumes the parser and returns the byte source.
    pub fn into_inner(self) -> R {
        self.reader.into_source()
    }

    /// 1-based line of the current read position. Non-decreasing across
    /// successive `read` calls.
    #[must_use]
    pub fn line(&self) -> usize {
        self.reader.line()
    }

    /// The key path from the root to the most recent token's slot.
    #[must_use]
    pub fn path(&self) -> &[Key] {
        &self.path
    }

    /// The path in dotted form, indices bracketed: `a.b[0].c`.
    #[must_use]
    pub fn path_string(&self) -> String {
        path::dotted(&self.path)
    }

    /// True iff `pattern` occurs as an in-order subsequence of the current
    /// path. Unmatched leading, trailing, and intervening keys are
    /// permitted.
    ///
    /// ```
    /// use jsonpull::{PullParser, path};
    ///
    /// let mut parser = PullParser::from_slice(br#"{"a":{"b":[7]}}"#);
    /// for _ in 0..4 {
    ///     parser.read().unwrap();
    /// }
    /// assert!(parser.path_match(&path!["a", "b", 0]));
    /// assert!(parser.path_match(&path!["a", 0]));
    /// assert!(!parser.path_match(&path!["b", "a"]));
    /// ```
    #[must_use]
    pub fn path_match(&self, pattern: &[Key]) -> bool {
        path::matches(&self.path, pattern)
    }

    /// Reads the next token.
    ///
    /// Returns `Ok(Some(token))` for each JSON construct in depth-first
    /// document order, `Ok(None)` at end-of-input, or an error. After
    /// either end-of-input or an error the parser no longer advances and
    /// every further call returns `Ok(None)`.
    pub fn read(&mut self) -> Result<Option<Token>, ParseError> {
        if self.done {
            return Ok(None);
        }
        match self.read_token() {
            Ok(Some(token)) => Ok(Some(token)),
            Ok(None) => {
                self.done = true;
                Ok(None)
            }
            Err(err) => {
                self.done = true;
                Err(err)
            }
        }
    }

    fn read_token(&mut self) -> Result<Option<Token>, ParseError> {
        let Some(byte) = self.skip_whitespace()? else {
            return match self.frames.last().copied() {
                Some(Frame::Root { seen }) if seen || self.multiple_values => Ok(None),
                _ => Err(self.error(ErrorKind::UnexpectedEof)),
            };
        };

        let top = self
            .frames
            .last()
            .copied()
            .ok_or_else(|| self.error(ErrorKind::Unexpected))?;

        match top {
            Frame::Root { seen } => {
                if seen && !self.multiple_values {
                    return Err(self.error_at(ErrorKind::UnexpectedInput));
                }
                if let Some(Frame::Root { seen }) = self.frames.last_mut() {
                    *seen = true;
                }
                self.read_value(byte, None).map(Some)
            }
            Frame::Object { children } => self.object_step(byte, children).map(Some),
            Frame::Array { children } => self.array_step(byte, children).map(Some),
        }
    }

    /// One step inside an object: close, or read the next property.
    fn object_step(&mut self, byte: u8, children: usize) -> Result<Token, ParseError> {
        if byte == b'}' {
            return Ok(self.close(children, true));
        }

        let byte = if byte == b',' {
            if children == 0 {
                return Err(self.error_at(ErrorKind::UnexpectedInput));
            }
            self.path.pop();
            self.skip_whitespace()?
                .ok_or_else(|| self.error(ErrorKind::UnexpectedEof))?
        } else {
            if children > 0 {
                return Err(self.error_at(ErrorKind::UnexpectedInput));
            }
            byte
        };

        if byte != b'"' {
            return Err(self.error_at(ErrorKind::UnexpectedInput));
        }
        let name = self.scan_string()?;
        self.expect_colon()?;
        self.path.push(Key::Name(name.into()));
        if let Some(Frame::Object { children }) = self.frames.last_mut() {
            *children += 1;
        }

        let byte = self
            .skip_whitespace()?
            .ok_or_else(|| self.error(ErrorKind::UnexpectedEof))?;
        let key = self.path.last().cloned();
        self.read_value(byte, key)
    }

    /// One step inside an array: close, or read the next element.
    fn array_step(&mut self, byte: u8, children: usize) -> Result<Token, ParseError> {
        if byte == b']' {
            return Ok(self.close(children, false));
        }

        let byte = if byte == b',' {
            if children == 0 {
                return Err(self.error_at(ErrorKind::UnexpectedInput));
            }
            debug_assert!(matches!(self.path.last(), Some(Key::Index(_))));
            self.path.pop();
            self.skip_whitespace()?
                .ok_or_else(|| self.error(ErrorKind::UnexpectedEof))?
        } else {
            if children > 0 {
                return Err(self.error_at(ErrorKind::UnexpectedInput));
            }
            byte
        };

        self.path.push(Key::Index(children));
        if let Some(Frame::Array { children }) = self.frames.last_mut() {
            *children += 1;
        }
        let key = self.path.last().cloned();
        self.read_value(byte, key)
    }

    /// Pops the closing container. Its last child's path key goes with it;
    /// what remains on top of the path is the container's own key in its
    /// parent, which is the key the end token carries.
    fn close(&mut self, children: usize, object: bool) -> Token {
        self.frames.pop();
        if children > 0 {
            self.path.pop();
        }
        let key = self.path.last().cloned();
        if object {
            Token::EndObject { key }
        } else {
            Token::EndArray { key }
        }
    }

    /// Reads one value whose first non-whitespace byte is `byte`.
    /// Containers return their start token with the body left for
    /// subsequent calls.
    fn read_value(&mut self, byte: u8, key: Option<Key>) -> Result<Token, ParseError> {
        match byte {
            b'"' => {
                let value = self.scan_string()?;
                Ok(Token::String { key, value })
            }
            b'{' => {
                self.frames.push(Frame::Object { children: 0 });
                Ok(Token::StartObject { key })
            }
            b'[' => {
                self.frames.push(Frame::Array { children: 0 });
                Ok(Token::StartArray { key })
            }
            b't' => {
                self.scan_literal(b"rue")?;
                Ok(Token::Bool { key, value: true })
            }
            b'f' => {
                self.scan_literal(b"alse")?;
                Ok(Token::Bool { key, value: false })
            }
            b'n' => {
                self.scan_literal(b"ull")?;
                Ok(Token::Null { key })
            }
            b'-' | b'0'..=b'9' => {
                self.reader.push_back();
                let value = self.scan_number()?;
                Ok(Token::Number { key, value })
            }
            _ => Err(self.error_at(ErrorKind::UnexpectedInput)),
        }
    }

    // ------------------------------------------------------------------
    // Lexeme scanners
    // ------------------------------------------------------------------

    /// Scans a string whose opening quote is already consumed. Bytes are
    /// accumulated raw and the whole lexeme is UTF-8 validated at the
    /// closing quote; the returned value is an independent allocation.
    fn scan_string(&mut self) -> Result<String, ParseError> {
        self.scratch.clear();
        loop {
            let Some(byte) = self.next_byte()? else {
                return Err(self.error(ErrorKind::UnexpectedEof));
            };
            match byte {
                b'"' => break,
                b'\\' => self.scan_escape()?,
                // Includes NUL and unescaped carriage returns: the strict
                // reading of RFC 8259.
                0x00..=0x1F => {
                    return Err(self.error_at(ErrorKind::UnescapedControlCharacter));
                }
                _ => {
                    self.check_value_length(1)?;
                    self.scratch.push(byte);
                }
            }
        }
        match std::str::from_utf8(&self.scratch) {
            Ok(s) => Ok(s.to_owned()),
            Err(_) => Err(self.error(ErrorKind::InvalidUtf8)),
        }
    }

    /// Scans one escape sequence, backslash already consumed.
    fn scan_escape(&mut self) -> Result<(), ParseError> {
        let Some(byte) = self.next_byte()? else {
            return Err(self.error(ErrorKind::UnexpectedEof));
        };
        let decoded = match byte {
            b'"' | b'\\' | b'/' => byte,
            b'b' => 0x08,
            b'f' => 0x0C,
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'u' => return self.scan_unicode_escape(),
            _ => return Err(self.error_at(ErrorKind::InvalidEscapeSequence)),
        };
        self.check_value_length(1)?;
        self.scratch.push(decoded);
        Ok(())
    }

    /// Scans the four hex digits of a `\u` escape, pairing surrogates.
    fn scan_unicode_escape(&mut self) -> Result<(), ParseError> {
        let first = self.scan_hex4()?;
        let decoded = if escape::is_high_surrogate(first) {
            match self.next_byte()? {
                Some(b'\\') => {}
                Some(_) => return Err(self.error_at(ErrorKind::InvalidEscapeSequence)),
                None => return Err(self.error(ErrorKind::UnexpectedEof)),
            }
            match self.next_byte()? {
                Some(b'u') => {}
                Some(_) => return Err(self.error_at(ErrorKind::InvalidEscapeSequence)),
                None => return Err(self.error(ErrorKind::UnexpectedEof)),
            }
            let second = self.scan_hex4()?;
            escape::combine_surrogates(first, second)
                .ok_or_else(|| self.error(ErrorKind::InvalidEscapeSequence))?
        } else {
            // Rejects unpaired low surrogates.
            escape::scalar(first).ok_or_else(|| self.error(ErrorKind::InvalidEscapeSequence))?
        };

        let mut utf8 = [0u8; 4];
        let encoded = decoded.encode_utf8(&mut utf8);
        self.check_value_length(encoded.len())?;
        self.scratch.extend_from_slice(encoded.as_bytes());
        Ok(())
    }

    fn scan_hex4(&mut self) -> Result<u32, ParseError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let Some(byte) = self.next_byte()? else {
                return Err(self.error(ErrorKind::UnexpectedEof));
            };
            let Some(digit) = escape::hex_digit(byte) else {
                return Err(self.error_at(ErrorKind::InvalidEscapeSequence));
            };
            code = (code << 4) | digit;
        }
        Ok(code)
    }

    /// Consumes `rest` exactly, completing a `true`/`false`/`null` literal.
    fn scan_literal(&mut self, rest: &'static [u8]) -> Result<(), ParseError> {
        for &expected in rest {
            match self.next_byte()? {
                Some(byte) if byte == expected => {}
                Some(_) => return Err(self.error_at(ErrorKind::UnexpectedInput)),
                None => return Err(self.error(ErrorKind::UnexpectedEof)),
            }
        }
        Ok(())
    }

    /// Scans a number, first byte pushed back. The terminating lookahead
    /// byte is returned to the stream; that single rewind is the only
    /// backtracking in the design.
    fn scan_number(&mut self) -> Result<Number, ParseError> {
        self.number.clear();
        let mut integral = true;
        let mut int_digits = 0usize;

        let mut next = self.next_byte()?;
        if next == Some(b'-') {
            self.push_number(b'-')?;
            next = self.next_byte()?;
        }

        match next {
            Some(b'0') => {
                self.push_number(b'0')?;
                int_digits = 1;
                next = self.next_byte()?;
                if matches!(next, Some(b'0'..=b'9')) {
                    // Leading zero.
                    return Err(self.error_at(ErrorKind::UnexpectedInput));
                }
            }
            Some(byte @ b'1'..=b'9') => {
                self.push_number(byte)?;
                int_digits = 1;
                next = self.next_byte()?;
                while let Some(digit @ b'0'..=b'9') = next {
                    self.push_number(digit)?;
                    int_digits += 1;
                    next = self.next_byte()?;
                }
            }
            Some(_) => return Err(self.error_at(ErrorKind::UnexpectedInput)),
            // Lone minus sign.
            None => return Err(self.error(ErrorKind::UnexpectedInput)),
        }

        if next == Some(b'.') {
            integral = false;
            self.push_number(b'.')?;
            next = self.next_byte()?;
            let mut digits = 0usize;
            while let Some(digit @ b'0'..=b'9') = next {
                self.push_number(digit)?;
                digits += 1;
                next = self.next_byte()?;
            }
            if digits == 0 {
                return Err(match next {
                    Some(_) => self.error_at(ErrorKind::UnexpectedInput),
                    None => self.error(ErrorKind::UnexpectedInput),
                });
            }
        }

        if let Some(exp @ (b'e' | b'E')) = next {
            integral = false;
            self.push_number(exp)?;
            next = self.next_byte()?;
            if let Some(sign @ (b'+' | b'-')) = next {
                self.push_number(sign)?;
                next = self.next_byte()?;
            }
            let mut digits = 0usize;
            while let Some(digit @ b'0'..=b'9') = next {
                self.push_number(digit)?;
                digits += 1;
                next = self.next_byte()?;
            }
            if digits == 0 {
                return Err(match next {
                    Some(_) => self.error_at(ErrorKind::UnexpectedInput),
                    None => self.error(ErrorKind::UnexpectedInput),
                });
            }
        }

        if next.is_some() {
            self.reader.push_back();
        }

        self.materialize(integral, int_digits)
    }

    fn materialize(&mut self, integral: bool, int_digits: usize) -> Result<Number, ParseError> {
        match self.number_mode {
            NumberMode::IntDouble => {
                // 18 decimal digits always fit in an i64; anything longer,
                // or with a fraction or exponent, takes the double path.
                if integral && int_digits <= 18 {
                    let value = self
                        .number
                        .parse::<i64>()
                        .map_err(|_| self.error(ErrorKind::Unexpected))?;
                    Ok(Number::Int(value))
                } else {
                    let value = self
                        .number
                        .parse::<f64>()
                        .map_err(|_| self.error(ErrorKind::Unexpected))?;
                    Ok(Number::Double(value))
                }
            }
            NumberMode::AllDecimal => {
                let value = self
                    .number
                    .parse::<Decimal>()
                    .map_err(|_| self.error(ErrorKind::UnexpectedInput))?;
                Ok(Number::Decimal(value))
            }
        }
    }

    // ------------------------------------------------------------------
    // Byte-level helpers
    // ------------------------------------------------------------------

    fn skip_whitespace(&mut self) -> Result<Option<u8>, ParseError> {
        loop {
            match self.next_byte()? {
                Some(b'\t' | b'\n' | b'\r' | b' ') => {}
                other => return Ok(other),
            }
        }
    }

    fn expect_colon(&mut self) -> Result<(), ParseError> {
        match self.skip_whitespace()? {
            Some(b':') => Ok(()),
            Some(_) => Err(self.error_at(ErrorKind::UnexpectedInput)),
            None => Err(self.error(ErrorKind::UnexpectedEof)),
        }
    }

    fn next_byte(&mut self) -> Result<Option<u8>, ParseError> {
        let line = self.reader.line();
        self.reader.next().map_err(|err| ParseError::io(err, line))
    }

    fn check_value_length(&mut self, appended: usize) -> Result<(), ParseError> {
        if self.scratch.len() + appended >= self.max_value_length {
            return Err(self.error(ErrorKind::ValueTooLong));
        }
        Ok(())
    }

    fn push_number(&mut self, byte: u8) -> Result<(), ParseError> {
        if self.number.len() + 1 >= self.max_value_length {
            return Err(self.error(ErrorKind::ValueTooLong));
        }
        self.number.push(byte as char);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Errors
    // ------------------------------------------------------------------

    fn error(&mut self, kind: ErrorKind) -> ParseError {
        let line = self.reader.line();
        let snippet = self.reader.read_raw(CONTEXT_LEN);
        let context = if snippet.is_empty() {
            None
        } else {
            Some(snippet)
        };
        ParseError::new(kind, line, context)
    }

    /// Like [`error`](Self::error), but first returns the offending byte to
    /// the stream so the snippet starts with it.
    fn error_at(&mut self, kind: ErrorKind) -> ParseError {
        self.reader.push_back();
        self.error(kind)
    }
}

impl PullParser<File> {
    /// Opens `path` and parses the file. The parser owns the handle, which
    /// closes when the parser drops; [`into_inner`](Self::into_inner)
    /// recovers it open.
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> io::Result<Self> {
        Ok(Self::new(File::open(path)?))
    }

    /// Opens `path` with the given options.
    pub fn open_with_options<P: AsRef<std::path::Path>>(
        path: P,
        options: ParserOptions,
    ) -> io::Result<Self> {
        Ok(Self::with_options(File::open(path)?, options))
    }
}

impl<'a> PullParser<&'a [u8]> {
    /// Parses an in-memory byte slice.
    #[must_use]
    pub fn from_slice(bytes: &'a [u8]) -> Self {
        Self::new(bytes)
    }

    /// Parses an in-memory byte slice with the given options.
    #[must_use]
    pub fn from_slice_with_options(bytes: &'a [u8], options: ParserOptions) -> Self {
        Self::with_options(bytes, options)
    }
}

/// The pull API as a lazy sequence. The sequence ends at end-of-input or
/// after yielding the first error.
impl<R: Read> Iterator for PullParser<R> {
    type Item = Result<Token, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read().transpose()
    }
}
