//! Module for parsing JSON text into a [`Value`] tree
//!
//! The entry points are [`parse`] and [`parse_with`], plus the typed variants
//! [`parse_object`] and [`parse_array`] for callers which require a specific
//! root kind. Parsing is all-or-nothing: on failure a [`ParseError`] carrying
//! the error kind, line and byte offset is returned and no partial tree
//! escapes.
//!
//! ```
//! use domson::parser::{parse_with, ParseSettings};
//!
//! let settings = ParseSettings {
//!     allow_trailing_comma: true,
//!     // For all other settings use the default
//!     ..Default::default()
//! };
//! let value = parse_with(b"[1, 2, 3,]", &settings)?;
//! assert_eq!(3, value.array_len());
//! # Ok::<(), domson::parser::ParseError>(())
//! ```

use std::str::FromStr;

use thiserror::Error;

use crate::value::{Array, Object, Value};

/// Longest accepted number token, in bytes
///
/// The JSON specification places no bound on number length, but numbers beyond
/// this length cannot affect the parsed `f64` and in practice only occur in
/// hostile input.
const MAX_NUMBER_LEN: usize = 255;

/// Settings to customize the parser behavior
///
/// These settings are used by [`parse_with`] and the other `_with` entry
/// points. To avoid repeating the default values for unchanged settings
/// `..Default::default()` can be used:
/// ```
/// # use domson::parser::ParseSettings;
/// ParseSettings {
///     allow_cpp_comments: true,
///     // For all other settings use the default
///     ..Default::default()
/// }
/// # ;
/// ```
#[derive(Clone, Debug)]
pub struct ParseSettings {
    /// Whether to allow a trailing comma before the closing bracket of objects
    /// and arrays, for example `[1, 2,]`
    ///
    /// The JSON specification does not allow trailing commas, but they are a
    /// common artifact of hand-edited and machine-appended documents.
    pub allow_trailing_comma: bool,

    /// Whether to allow end of line comments (`// ...`) wherever the JSON
    /// specification allows whitespace
    ///
    /// The JSON specification does not allow comments. Block comments
    /// (`/* ... */`) are not supported either way.
    pub allow_cpp_comments: bool,
}

impl Default for ParseSettings {
    /// Creates the default parser settings
    ///
    /// - trailing comma: disallowed
    /// - comments: disallowed
    ///
    /// These defaults are compliant with the JSON specification.
    fn default() -> Self {
        ParseSettings {
            allow_trailing_comma: false,
            allow_cpp_comments: false,
        }
    }
}

/// Describes why a syntax error occurred
#[non_exhaustive]
#[derive(PartialEq, Eq, Clone, Copy, strum::Display, Debug)]
pub enum SyntaxErrorKind {
    /// The document ended where more input was required
    UnexpectedEndOfInput,
    /// A byte was encountered which cannot start any JSON value
    ///
    /// This is also reported for malformed literals, for example `tru`
    /// instead of `true`.
    InvalidValueStart,
    /// A `"` was expected to begin an object key
    ExpectedObjectKey,
    /// A `:` was expected between an object key and its value
    ExpectedColon,
    /// A `,` or `}` was expected after an object member
    ExpectedCommaOrObjectEnd,
    /// A `,` or `]` was expected after an array element
    ExpectedCommaOrArrayEnd,
    /// A trailing comma (for example in `[1,]`) was used, but trailing commas
    /// are not enabled in the [`ParseSettings`]
    TrailingCommaNotEnabled,

    /// A string is missing its closing `"`
    UnterminatedString,
    /// A raw newline was encountered inside a string, commonly a missing
    /// closing quote
    NewlineInString,
    /// A raw control character (`< 0x20`) was encountered inside a string
    ControlCharacterInString,
    /// An unknown escape sequence (`\...`) was encountered
    InvalidEscapeSequence,
    /// The document ended inside a `\uXXXX` escape sequence
    TruncatedUnicodeEscape,
    /// A `\uXXXX` escape sequence contains a character which is not a hex digit
    InvalidHexDigit,
    /// A `\uXXXX` escape sequence encodes an unpaired UTF-16 surrogate
    ///
    /// Rust strings consist of valid UTF-8 data and cannot hold surrogate
    /// code units. Surrogate *pairs* are not combined either; escapes only
    /// cover the Basic Multilingual Plane, and characters above U+FFFF must
    /// appear in raw UTF-8 form.
    UnpairedSurrogateEscape,
    /// String content is not valid UTF-8
    InvalidUtf8,

    /// A digit was expected after `-` in a number
    ExpectedDigitAfterMinus,
    /// A digit was expected after `.` in a number
    ExpectedFractionDigit,
    /// A digit was expected after the exponent marker (and optional sign) in
    /// a number
    ExpectedExponentDigit,
    /// A number has leading zeros (octal format is not allowed in JSON)
    LeadingZero,
    /// A number token is longer than the supported maximum of 255 bytes
    NumberTooLong,

    /// Unexpected trailing data was detected after the top-level value
    TrailingData,
    /// The top-level value is not an object, but [`parse_object`] was used
    RootNotObject,
    /// The top-level value is not an array, but [`parse_array`] was used
    RootNotArray,
}

/// JSON syntax error, reported with the position of the offending input
#[derive(Error, PartialEq, Eq, Clone, Copy, Debug)]
#[error("JSON syntax error {kind} at line {line}, byte offset {offset}")]
pub struct ParseError {
    /// Kind of the error
    pub kind: SyntaxErrorKind,
    /// 1-based line number where the error occurred
    ///
    /// `\n`, `\r`, `\r\n` and `\n\r` each count as a single line break.
    pub line: u64,
    /// 0-based byte offset into the parsed input where the error occurred
    pub offset: usize,
}

/// Parses a JSON document with the default [`ParseSettings`]
///
/// The input must contain exactly one JSON value of any kind, optionally
/// surrounded by whitespace; trailing `0x00` bytes are ignored (buffers
/// produced by C APIs are often NUL-padded). All numbers are parsed as `f64`.
///
/// # Errors
/// A [`ParseError`] if the input is not a well-formed JSON document.
pub fn parse(bytes: &[u8]) -> Result<Value, ParseError> {
    parse_with(bytes, &ParseSettings::default())
}

/// Parses a JSON document with the given settings, see [`parse`]
pub fn parse_with(bytes: &[u8], settings: &ParseSettings) -> Result<Value, ParseError> {
    let mut bytes = bytes;
    // Trim trailing NULs
    while let [rest @ .., 0] = bytes {
        bytes = rest;
    }

    let mut parser = Parser {
        bytes,
        pos: 0,
        line: 1,
        settings,
    };
    let value = parser.parse_required_value()?;

    // Check for any extra characters
    parser.skip_whitespace_and_comments();
    if parser.pos < parser.bytes.len() {
        return Err(parser.error(SyntaxErrorKind::TrailingData));
    }
    Ok(value)
}

/// Parses a JSON document whose top-level value must be an object
///
/// # Errors
/// Any [`parse`] error; additionally, if the document is well-formed but its
/// top-level value is not an object, an error of kind
/// [`SyntaxErrorKind::RootNotObject`] located at line 1, offset 0.
pub fn parse_object(bytes: &[u8]) -> Result<Object, ParseError> {
    parse_object_with(bytes, &ParseSettings::default())
}

/// Parses a JSON document whose top-level value must be an object, with the
/// given settings, see [`parse_object`]
pub fn parse_object_with(bytes: &[u8], settings: &ParseSettings) -> Result<Object, ParseError> {
    match parse_with(bytes, settings)? {
        Value::Object(map) => Ok(map),
        _ => Err(ParseError {
            kind: SyntaxErrorKind::RootNotObject,
            line: 1,
            offset: 0,
        }),
    }
}

/// Parses a JSON document whose top-level value must be an array
///
/// # Errors
/// Any [`parse`] error; additionally, if the document is well-formed but its
/// top-level value is not an array, an error of kind
/// [`SyntaxErrorKind::RootNotArray`] located at line 1, offset 0.
pub fn parse_array(bytes: &[u8]) -> Result<Array, ParseError> {
    parse_array_with(bytes, &ParseSettings::default())
}

/// Parses a JSON document whose top-level value must be an array, with the
/// given settings, see [`parse_array`]
pub fn parse_array_with(bytes: &[u8], settings: &ParseSettings) -> Result<Array, ParseError> {
    match parse_with(bytes, settings)? {
        Value::Array(items) => Ok(items),
        _ => Err(ParseError {
            kind: SyntaxErrorKind::RootNotArray,
            line: 1,
            offset: 0,
        }),
    }
}

/// Decodes the 4 hex digit bytes of a `\uXXXX` escape which the validation
/// pass has already accepted
fn hex_escape_value(digits: &[u8]) -> u32 {
    digits.iter().fold(0, |x, &b| {
        let digit = match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 0xa,
            _ => b - b'A' + 0xa,
        };
        x << 4 | u32::from(digit)
    })
}

/// Single-pass recursive descent parser over a byte slice
struct Parser<'a> {
    bytes: &'a [u8],
    /// Current cursor, as byte offset into `bytes`
    pos: usize,
    /// 1-based line number at the cursor
    line: u64,
    settings: &'a ParseSettings,
}

impl Parser<'_> {
    fn error(&self, kind: SyntaxErrorKind) -> ParseError {
        self.error_at(kind, self.pos)
    }

    /// Creates an error located at `offset` instead of the cursor, for errors
    /// which are detected after the offending input was passed
    fn error_at(&self, kind: SyntaxErrorKind, offset: usize) -> ParseError {
        ParseError {
            kind,
            line: self.line,
            offset,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    /// Returns the byte at the cursor, or an `UnexpectedEndOfInput` error
    fn require_byte(&self) -> Result<u8, ParseError> {
        self.peek()
            .ok_or_else(|| self.error(SyntaxErrorKind::UnexpectedEndOfInput))
    }

    /// Advances the cursor past whitespace, maintaining the line number for
    /// the different kinds of newlines (`\n`, `\r` and the two-byte pairs
    /// each count once). If comments are enabled, also skips `//` comments.
    fn skip_whitespace_and_comments(&mut self) {
        while let Some(b) = self.peek() {
            match b {
                b'\n' => {
                    self.pos += 1;
                    self.line += 1;
                    if self.peek() == Some(b'\r') {
                        self.pos += 1;
                    }
                }
                b'\r' => {
                    self.pos += 1;
                    self.line += 1;
                    if self.peek() == Some(b'\n') {
                        self.pos += 1;
                    }
                }
                b' ' | b'\t' => self.pos += 1,
                b'/' if self.settings.allow_cpp_comments
                    && self.bytes.get(self.pos + 1) == Some(&b'/') =>
                {
                    // Skip to past the newline, then keep eating whitespace
                    // and comments in the outer loop
                    loop {
                        match self.peek() {
                            None => return,
                            Some(b'\n') => {
                                self.pos += 1;
                                self.line += 1;
                                if self.peek() == Some(b'\r') {
                                    self.pos += 1;
                                }
                                break;
                            }
                            Some(b'\r') => {
                                self.pos += 1;
                                self.line += 1;
                                if self.peek() == Some(b'\n') {
                                    self.pos += 1;
                                }
                                break;
                            }
                            Some(_) => self.pos += 1,
                        }
                    }
                }
                _ => return,
            }
        }
    }

    /// Skips to the next value and parses it
    fn parse_required_value(&mut self) -> Result<Value, ParseError> {
        self.skip_whitespace_and_comments();
        match self.require_byte()? {
            b'"' => Ok(Value::String(self.parse_quoted_string()?)),
            b'0'..=b'9' | b'-' => self.parse_number(),
            b'{' => {
                self.pos += 1;
                self.parse_object_body().map(Value::Object)
            }
            b'[' => {
                self.pos += 1;
                self.parse_array_body().map(Value::Array)
            }
            b't' => self.parse_literal(b"true", Value::Bool(true)),
            b'f' => self.parse_literal(b"false", Value::Bool(false)),
            b'n' => self.parse_literal(b"null", Value::Null),
            _ => Err(self.error(SyntaxErrorKind::InvalidValueStart)),
        }
    }

    fn parse_literal(&mut self, text: &'static [u8], value: Value) -> Result<Value, ParseError> {
        if self.bytes[self.pos..].starts_with(text) {
            self.pos += text.len();
            Ok(value)
        } else {
            Err(self.error(SyntaxErrorKind::InvalidValueStart))
        }
    }

    /// Parses the members of an object; the cursor is past the `{`
    fn parse_object_body(&mut self) -> Result<Object, ParseError> {
        let mut map = Object::new();

        // Special case for the empty object
        self.skip_whitespace_and_comments();
        if self.require_byte()? == b'}' {
            self.pos += 1;
            return Ok(map);
        }

        loop {
            if self.require_byte()? != b'"' {
                return Err(self.error(SyntaxErrorKind::ExpectedObjectKey));
            }
            let key = self.parse_quoted_string()?;

            // Locate and eat the colon
            self.skip_whitespace_and_comments();
            if self.require_byte()? != b':' {
                return Err(self.error(SyntaxErrorKind::ExpectedColon));
            }
            self.pos += 1;

            // The JSON specification does not say what to do for duplicate
            // keys; the last one wins here
            let value = self.parse_required_value()?;
            map.insert(key, value);

            // Next thing must be a comma, or a bracket to end the object
            self.skip_whitespace_and_comments();
            match self.require_byte()? {
                b'}' => {
                    self.pos += 1;
                    return Ok(map);
                }
                b',' => self.pos += 1,
                _ => return Err(self.error(SyntaxErrorKind::ExpectedCommaOrObjectEnd)),
            }

            // End of object directly after the comma?
            self.skip_whitespace_and_comments();
            if self.require_byte()? == b'}' {
                if !self.settings.allow_trailing_comma {
                    return Err(self.error(SyntaxErrorKind::TrailingCommaNotEnabled));
                }
                self.pos += 1;
                return Ok(map);
            }
        }
    }

    /// Parses the elements of an array; the cursor is past the `[`
    fn parse_array_body(&mut self) -> Result<Array, ParseError> {
        let mut items = Array::new();

        // Special case for the empty array
        self.skip_whitespace_and_comments();
        if self.require_byte()? == b']' {
            self.pos += 1;
            return Ok(items);
        }

        loop {
            items.push(self.parse_required_value()?);

            // Next thing must be a comma, or a bracket to end the array
            self.skip_whitespace_and_comments();
            match self.require_byte()? {
                b']' => {
                    self.pos += 1;
                    return Ok(items);
                }
                b',' => self.pos += 1,
                _ => return Err(self.error(SyntaxErrorKind::ExpectedCommaOrArrayEnd)),
            }

            // End of array directly after the comma?
            self.skip_whitespace_and_comments();
            if self.require_byte()? == b']' {
                if !self.settings.allow_trailing_comma {
                    return Err(self.error(SyntaxErrorKind::TrailingCommaNotEnabled));
                }
                self.pos += 1;
                return Ok(items);
            }
        }
    }

    /// Parses the 4 hex digits of a `\uXXXX` escape starting at `digits_at`
    fn parse_unicode_escape(&self, digits_at: usize) -> Result<u32, ParseError> {
        if digits_at + 4 > self.bytes.len() {
            // Report the location of the `u` rather than the end of input
            return Err(self.error_at(SyntaxErrorKind::TruncatedUnicodeEscape, digits_at - 1));
        }
        let mut x = 0;
        for i in 0..4 {
            let b = self.bytes[digits_at + i];
            let digit = match b {
                b'0'..=b'9' => b - b'0',
                b'a'..=b'f' => b - b'a' + 0xa,
                b'A'..=b'F' => b - b'A' + 0xa,
                _ => return Err(self.error_at(SyntaxErrorKind::InvalidHexDigit, digits_at + i)),
            };
            x = x << 4 | u32::from(digit);
        }
        Ok(x)
    }

    /// Parses a string; the cursor is on the opening `"`
    ///
    /// Two passes: the first scans to the closing quote, validating escapes
    /// and computing how many bytes shorter the decoded form is, so the
    /// output allocation is exact. Strings without escapes (including the
    /// empty string) take a fast path which copies the raw bytes.
    fn parse_quoted_string(&mut self) -> Result<String, ParseError> {
        self.pos += 1;
        let content_start = self.pos;

        let mut escape_overhead = 0;
        let mut s = content_start;
        loop {
            let Some(&b) = self.bytes.get(s) else {
                // Report the start of the string; the end of input is usually
                // useless for finding a stray opening quote
                return Err(self.error_at(SyntaxErrorKind::UnterminatedString, content_start));
            };
            if b == b'"' {
                break;
            }
            // Control characters are illegal inside strings; newlines get a
            // more specific error since "control character" is overly
            // technical for this common mistake
            if b < 0x20 {
                let kind = if b == b'\n' || b == b'\r' {
                    SyntaxErrorKind::NewlineInString
                } else {
                    SyntaxErrorKind::ControlCharacterInString
                };
                return Err(self.error_at(kind, s));
            }
            if b == b'\\' {
                s += 1;
                let Some(&e) = self.bytes.get(s) else {
                    return Err(self.error_at(SyntaxErrorKind::UnterminatedString, content_start));
                };
                match e {
                    b'u' => {
                        s += 1;
                        let x = self.parse_unicode_escape(s)?;
                        if (0xD800..=0xDFFF).contains(&x) {
                            return Err(
                                self.error_at(SyntaxErrorKind::UnpairedSurrogateEscape, s - 2)
                            );
                        }
                        // 6 bytes of input become 1 to 3 bytes of output
                        escape_overhead += match x {
                            0..=0x7F => 5,
                            0x80..=0x7FF => 4,
                            _ => 3,
                        };
                        s += 4;
                    }
                    b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't' => {
                        // Two bytes of input become one byte of output
                        s += 1;
                        escape_overhead += 1;
                    }
                    _ => return Err(self.error_at(SyntaxErrorKind::InvalidEscapeSequence, s)),
                }
            } else {
                s += 1;
            }
        }

        let raw = &self.bytes[content_start..s];
        let out = if escape_overhead == 0 {
            self.validated_str(raw, content_start)?.to_owned()
        } else {
            self.decode_escaped_string(raw, content_start, escape_overhead)?
        };

        // Eat the final closing quote
        self.pos = s + 1;
        Ok(out)
    }

    /// Second string pass: decodes the escape sequences which the first pass
    /// already validated. `raw` is the string content without the quotes.
    fn decode_escaped_string(
        &self,
        raw: &[u8],
        content_start: usize,
        escape_overhead: usize,
    ) -> Result<String, ParseError> {
        let mut out = String::with_capacity(raw.len() - escape_overhead);
        let mut i = 0;
        while i < raw.len() {
            if raw[i] != b'\\' {
                // Copy the whole run up to the next escape
                let run_start = i;
                while i < raw.len() && raw[i] != b'\\' {
                    i += 1;
                }
                out.push_str(self.validated_str(&raw[run_start..i], content_start + run_start)?);
                continue;
            }

            i += 1;
            match raw[i] {
                b'u' => {
                    let x = hex_escape_value(&raw[i + 1..i + 5]);
                    // The first pass rejected surrogates, so this is always
                    // a valid BMP scalar
                    match char::from_u32(x) {
                        Some(c) => out.push(c),
                        None => unreachable!("escape validation should have rejected {x:#x}"),
                    }
                    i += 5;
                }
                b'"' => {
                    out.push('"');
                    i += 1;
                }
                b'\\' => {
                    out.push('\\');
                    i += 1;
                }
                b'/' => {
                    out.push('/');
                    i += 1;
                }
                b'b' => {
                    out.push('\u{0008}');
                    i += 1;
                }
                b'f' => {
                    out.push('\u{000C}');
                    i += 1;
                }
                b'n' => {
                    out.push('\n');
                    i += 1;
                }
                b'r' => {
                    out.push('\r');
                    i += 1;
                }
                b't' => {
                    out.push('\t');
                    i += 1;
                }
                other => unreachable!("escape validation should have rejected '\\{other}'"),
            }
        }
        Ok(out)
    }

    /// Checks that a run of raw string content is valid UTF-8, reporting the
    /// exact offset of the first invalid byte otherwise
    fn validated_str<'b>(&self, raw: &'b [u8], raw_offset: usize) -> Result<&'b str, ParseError> {
        std::str::from_utf8(raw).map_err(|e| {
            self.error_at(SyntaxErrorKind::InvalidUtf8, raw_offset + e.valid_up_to())
        })
    }

    /// Parses a number; the cursor is on the first byte (`-` or a digit)
    ///
    /// The grammar is validated in place over the input, then the token is
    /// handed to `f64::from_str`, which is independent of the process locale.
    fn parse_number(&mut self) -> Result<Value, ParseError> {
        // Save, so that errors spanning the token can point at its start
        let start = self.pos;
        self.pos += 1;

        // If negative, the next byte must be a digit
        if self.bytes[start] == b'-' {
            if !self.require_byte()?.is_ascii_digit() {
                return Err(self.error(SyntaxErrorKind::ExpectedDigitAfterMinus));
            }
            self.pos += 1;
        }

        // Remaining digits of the integer part. The JSON specification does
        // not allow numbers with leading zeros.
        if self.bytes[self.pos - 1] == b'0' {
            if self.peek().is_some_and(|b| b.is_ascii_digit()) {
                return Err(self.error_at(SyntaxErrorKind::LeadingZero, start));
            }
        } else {
            while self.peek().is_some_and(|b| b.is_ascii_digit()) {
                self.pos += 1;
            }
        }

        // Fraction?
        if self.peek() == Some(b'.') {
            self.pos += 1;
            if !self.peek().is_some_and(|b| b.is_ascii_digit()) {
                return Err(self.error(SyntaxErrorKind::ExpectedFractionDigit));
            }
            while self.peek().is_some_and(|b| b.is_ascii_digit()) {
                self.pos += 1;
            }
        }

        // Exponent?
        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.pos += 1;
            let mut b = self.require_byte()?;
            if b == b'+' || b == b'-' {
                self.pos += 1;
                b = self.require_byte()?;
            }
            if !b.is_ascii_digit() {
                return Err(self.error(SyntaxErrorKind::ExpectedExponentDigit));
            }
            while self.peek().is_some_and(|b| b.is_ascii_digit()) {
                self.pos += 1;
            }
        }

        let token = &self.bytes[start..self.pos];
        if token.len() > MAX_NUMBER_LEN {
            return Err(self.error_at(SyntaxErrorKind::NumberTooLong, start));
        }

        // The grammar above only admits ASCII bytes
        let token = std::str::from_utf8(token).expect("number token is ASCII");
        match f64::from_str(token) {
            Ok(number) => Ok(Value::Number(number)),
            // The grammar validation above should have made this impossible
            Err(e) => panic!(
                "grammar-validated number '{token}' was rejected by f64 conversion ({e}); this indicates a bug in this crate"
            ),
        }
    }
}
