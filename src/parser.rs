//! Recursive-descent TOML parser.
//!
//! This module provides [`Parser`], which consumes a [`CodepointReader`] and
//! builds the document tree in a single forward pass. There is no separate
//! lexer: every grammar rule reads codepoints directly.
//!
//! ## Overview
//!
//! - **Unambiguous values** are recognised from their first character:
//!   strings, booleans, arrays, inline tables, `inf` and `nan`.
//! - **Ambiguous values** (digits and signs) are classified by scanning up to
//!   [`MAX_LOOKAHEAD`] codepoints ahead and rewinding, then dispatched to the
//!   integer, float or date/time routine.
//! - **Structure** is validated as it is built: keys, tables and table arrays
//!   can only be defined once, and inline tables are closed to extension.
//!
//! Most callers should use [`crate::parse`] and friends rather than driving a
//! `Parser` directly.

use crate::array::{Array, TableArray};
use crate::datetime::{days_in_month, Date, DateTime, Time, TimeOffset};
use crate::error::{Error, Result};
use crate::options::STRICT;
use crate::reader::{ByteSource, Codepoint, CodepointReader, MAX_LOOKAHEAD};
use crate::region::{Position, Region};
use crate::table::Table;
use crate::value::{Node, NodeType, Value};
use indexmap::map::Entry;
use std::iter;
use std::sync::Arc;
use tracing::trace;
use unicode_xid::UnicodeXID;

#[inline]
fn is_whitespace(c: char) -> bool {
    match c {
        ' ' | '\t' => true,
        '\u{00A0}' | '\u{1680}' | '\u{2000}'..='\u{200A}' | '\u{202F}' | '\u{205F}' | '\u{3000}' => {
            !STRICT
        }
        _ => false,
    }
}

#[inline]
fn is_line_break(c: char) -> bool {
    c == '\n' || c == '\r'
}

#[inline]
fn is_value_terminator(c: char) -> bool {
    is_whitespace(c) || is_line_break(c) || matches!(c, ']' | '}' | ',' | '#')
}

#[inline]
fn is_bare_key_character(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c == '-'
        || c == '_'
        || (!STRICT && !c.is_ascii() && (c.is_alphanumeric() || c.is_xid_continue()))
}

/// Non-ASCII characters that may continue a bare key but never start one.
#[inline]
fn is_combining_mark(c: char) -> bool {
    !c.is_ascii() && c.is_xid_continue() && !c.is_xid_start() && !c.is_numeric()
}

#[inline]
fn is_string_delimiter(c: char) -> bool {
    c == '"' || c == '\''
}

/// Control characters that may not appear unescaped in strings or comments.
/// Tab is allowed.
#[inline]
fn is_forbidden_control(c: char) -> bool {
    matches!(c, '\u{0000}'..='\u{0008}' | '\u{000A}'..='\u{001F}' | '\u{007F}')
}

/// Rounds `mantissa * 2^exponent` to the nearest `f64`, ties to even.
///
/// A hexadecimal float's mantissa has at most 23 digits, so it fits without
/// loss and is rounded exactly once.
fn scale_to_f64(mantissa: u128, exponent: i64) -> f64 {
    if mantissa == 0 {
        return 0.0;
    }
    let bits = i64::from(128 - mantissa.leading_zeros());
    let top = bits - 1 + exponent;
    if top > 1023 {
        return f64::INFINITY;
    }
    // Subnormals lose one bit of precision per binade below 2^-1022.
    let precision = if top < -1022 { 53 - (-1022 - top) } else { 53 };
    let shift = bits - precision;

    let (significand, mut scale) = if shift <= 0 {
        (mantissa, exponent)
    } else if shift > bits {
        return 0.0;
    } else {
        let shift = shift as u32;
        let quotient = mantissa >> shift;
        let remainder = mantissa & ((1u128 << shift) - 1);
        let half = 1u128 << (shift - 1);
        let round_up = remainder > half || (remainder == half && quotient & 1 == 1);
        (quotient + u128::from(round_up), exponent + i64::from(shift))
    };

    // At most 2^53, so the conversion is exact.
    let mut value = significand as f64;
    while scale > 1023 {
        value *= f64::from_bits(0x7FE0_0000_0000_0000);
        scale -= 1023;
    }
    while scale < -1022 {
        value *= f64::from_bits(0x0010_0000_0000_0000);
        scale += 1022;
    }
    value * f64::from_bits(((scale + 1023) as u64) << 52)
}

/// A parsed key and the text it was written as.
struct Key {
    /// Segments before the final dot; empty for a simple key.
    parents: Vec<String>,
    last: String,
    text: String,
    region: Region,
}

impl Key {
    fn into_path(self) -> Vec<String> {
        let mut path = self.parents;
        path.push(self.last);
        path
    }
}

/// A scalar before its region is attached.
enum Literal {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Date(Date),
    Time(Time),
    DateTime(DateTime),
}

/// Which literal kinds an ambiguous value could still be.
struct Candidates {
    integer: bool,
    float: bool,
    datetime: bool,
}

/// The TOML parser.
///
/// Holds the current codepoint, the position of the previous one (used for
/// diagnostics at end of input) and the key-recording buffer that lets
/// redefinition errors quote a key exactly as written.
pub struct Parser<S> {
    reader: CodepointReader<S>,
    cp: Option<Codepoint>,
    prev_pos: Position,
    recording: bool,
    recording_buffer: String,
}

impl<S: ByteSource> Parser<S> {
    pub fn new(reader: CodepointReader<S>) -> Self {
        Parser {
            reader,
            cp: None,
            prev_pos: Position::START,
            recording: false,
            recording_buffer: String::new(),
        }
    }

    /// Parses the whole input into its root table.
    pub fn parse(mut self) -> Result<Table> {
        let mut root = Table::with_region(Region::at(Position::START, self.source_path()));
        let mut current_path: Vec<String> = Vec::new();

        self.advance()?;
        while let Some(cp) = self.cp {
            if self.consume_whitespace()? || self.consume_line_break()? || self.consume_comment()? {
                continue;
            }

            match cp.value {
                '[' => current_path = self.parse_table_header(&mut root)?,
                c if is_bare_key_character(c) || is_string_delimiter(c) => {
                    let table = Self::resolve_path(&mut root, &current_path).ok_or_else(|| {
                        Error::structural(self.here(), "Could not locate the table for this key-value pair")
                    })?;
                    self.parse_key_value_pair_and_insert(table)?;

                    self.consume_whitespace()?;
                    if self.cp.is_some() && !self.consume_comment()? && !self.consume_line_break()? {
                        return Err(self.unexpected_after("key-value pair"));
                    }
                }
                _ => {
                    return Err(self.unexpected(
                        "top level of document",
                        "keys, tables, whitespace or comments",
                    ))
                }
            }
        }

        root.region.end = self.reader.end_position();
        Ok(root)
    }

    // ---------------------------------------------------------------------
    // cursor

    fn advance(&mut self) -> Result<()> {
        if let Some(cp) = self.cp {
            self.prev_pos = cp.position;
        }
        let fresh = !self.reader.replaying();
        self.cp = self.reader.read_next()?;
        if self.recording && fresh {
            if let Some(cp) = self.cp {
                self.recording_buffer.push(cp.value);
            }
        }
        Ok(())
    }

    fn go_back(&mut self, count: usize) {
        let cp = self.reader.step_back(count);
        self.prev_pos = cp.position;
        self.cp = Some(cp);
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.cp.map(|cp| cp.value)
    }

    /// The current character if it belongs to a value (not a terminator).
    #[inline]
    fn peek_value_char(&self) -> Option<char> {
        self.peek().filter(|c| !is_value_terminator(*c))
    }

    /// The current character, or an EOF error naming `context`.
    fn current(&self, context: &str) -> Result<char> {
        self.peek()
            .ok_or_else(|| Error::lexical(self.here(), format!("Encountered EOF while parsing {}", context)))
    }

    fn start_recording(&mut self) {
        self.recording = true;
        self.recording_buffer.clear();
        if let Some(cp) = self.cp {
            self.recording_buffer.push(cp.value);
        }
    }

    /// Stops recording and returns the text read so far, minus the current
    /// character and trailing whitespace.
    fn stop_recording(&mut self) -> String {
        self.recording = false;
        if self.cp.is_some() {
            self.recording_buffer.pop();
        }
        let len = self.recording_buffer.trim_end().len();
        self.recording_buffer.truncate(len);
        std::mem::take(&mut self.recording_buffer)
    }

    // ---------------------------------------------------------------------
    // positions and errors

    fn source_path(&self) -> Option<Arc<str>> {
        self.reader.source_path().clone()
    }

    /// Where the parser is: the current character, or the last one read.
    fn position(&self) -> Position {
        self.cp.map_or(self.prev_pos, |cp| cp.position)
    }

    /// The exclusive end of whatever was just parsed.
    fn end_position(&self) -> Position {
        match self.cp {
            Some(cp) => cp.position,
            None => self.reader.end_position(),
        }
    }

    fn here(&self) -> Region {
        Region::at(self.position(), self.source_path())
    }

    fn region_from(&self, begin: Position) -> Region {
        Region::new(begin, self.end_position(), self.source_path())
    }

    fn lexical(&self, message: impl Into<String>) -> Error {
        Error::lexical(self.here(), message)
    }

    fn range(&self, message: impl Into<String>) -> Error {
        Error::range(self.here(), message)
    }

    fn unexpected(&self, context: &str, expected: &str) -> Error {
        match self.cp {
            None => self.lexical(format!("Encountered EOF while parsing {}", context)),
            Some(cp) => self.lexical(format!(
                "Encountered unexpected character while parsing {}; expected {}, saw '{}'",
                context,
                expected,
                cp.value.escape_debug()
            )),
        }
    }

    fn unexpected_after(&self, context: &str) -> Error {
        let saw = self.peek().map(|c| c.escape_debug().to_string()).unwrap_or_default();
        self.lexical(format!(
            "Encountered unexpected character after {}; expected a comment or whitespace, saw '{}'",
            context, saw
        ))
    }

    fn require_terminator(&self, context: &str) -> Result<()> {
        match self.peek() {
            Some(c) if !is_value_terminator(c) => Err(self.unexpected(context, "value-terminator")),
            _ => Ok(()),
        }
    }

    fn expect(&mut self, expected: char, context: &str) -> Result<()> {
        if self.peek() != Some(expected) {
            return Err(self.unexpected(context, &format!("'{}'", expected)));
        }
        self.advance()
    }

    // ---------------------------------------------------------------------
    // trivia

    fn consume_whitespace(&mut self) -> Result<bool> {
        let mut consumed = false;
        while self.peek().map_or(false, is_whitespace) {
            consumed = true;
            self.advance()?;
        }
        Ok(consumed)
    }

    fn consume_line_break(&mut self) -> Result<bool> {
        match self.peek() {
            Some(c) if is_line_break(c) => {
                if c == '\r' {
                    self.advance()?;
                    match self.peek() {
                        Some('\n') => {}
                        _ if !STRICT => return Ok(true),
                        None => return Err(self.lexical("Encountered EOF while consuming CRLF")),
                        Some(_) => {
                            return Err(self.lexical("Encountered unexpected character while consuming CRLF"))
                        }
                    }
                }
                self.advance()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn consume_comment(&mut self) -> Result<bool> {
        if self.peek() != Some('#') {
            return Ok(false);
        }
        self.advance()?;

        while let Some(c) = self.peek() {
            if self.consume_line_break()? {
                return Ok(true);
            }
            if is_forbidden_control(c) {
                return Err(self.lexical(
                    "Encountered unexpected character while parsing comment; control characters U+0000-U+0008, U+000A-U+001F and U+007F are not allowed in comments",
                ));
            }
            self.advance()?;
        }
        Ok(true)
    }

    fn consume_digits(&mut self, count: usize) -> Result<Option<u32>> {
        let mut value = 0;
        for _ in 0..count {
            match self.peek().and_then(|c| c.to_digit(10)) {
                Some(digit) => {
                    value = value * 10 + digit;
                    self.advance()?;
                }
                None => return Ok(None),
            }
        }
        Ok(Some(value))
    }

    // ---------------------------------------------------------------------
    // strings

    /// Parses any of the four string forms. Multi-line forms are rejected
    /// when `allow_multi_line` is false (quoted keys).
    fn parse_string(&mut self, allow_multi_line: bool) -> Result<String> {
        let delimiter = self.current("string")?;
        self.advance()?;

        if self.current("string")? == delimiter {
            self.advance()?;
            if self.peek() != Some(delimiter) {
                return Ok(String::new());
            }
            if !allow_multi_line {
                return Err(self.lexical(
                    "Encountered unexpected character while parsing key; multi-line strings are not allowed in keys",
                ));
            }
            self.advance()?;
            // Only the first line break after the opening delimiter is trimmed.
            self.consume_line_break()?;
            return if delimiter == '"' {
                self.parse_basic_string(true)
            } else {
                self.parse_literal_string(true)
            };
        }

        if delimiter == '"' {
            self.parse_basic_string(false)
        } else {
            self.parse_literal_string(false)
        }
    }

    /// Consumes a run of `delimiter`s inside a multi-line string. Returns
    /// `true` if the run closed the string; up to two delimiters before the
    /// closing three belong to the content.
    fn consume_closing_delimiters(&mut self, delimiter: char, out: &mut String) -> Result<bool> {
        let mut run = 0;
        while run < 5 && self.peek() == Some(delimiter) {
            run += 1;
            self.advance()?;
        }
        if run >= 3 {
            out.extend(iter::repeat(delimiter).take(run - 3));
            return Ok(true);
        }
        out.extend(iter::repeat(delimiter).take(run));
        Ok(false)
    }

    fn parse_basic_string(&mut self, multi_line: bool) -> Result<String> {
        let context = if multi_line { "multi-line string" } else { "string" };
        let mut out = String::new();
        let mut skipping_whitespace = false;

        loop {
            let c = self.current(context)?;

            if skipping_whitespace {
                if is_whitespace(c) {
                    self.advance()?;
                    continue;
                }
                if self.consume_line_break()? {
                    continue;
                }
                skipping_whitespace = false;
            }

            match c {
                '"' if !multi_line => {
                    self.advance()?;
                    return Ok(out);
                }
                '"' => {
                    if self.consume_closing_delimiters('"', &mut out)? {
                        return Ok(out);
                    }
                }
                '\\' => {
                    self.advance()?;
                    match self.parse_escape(multi_line, context)? {
                        Some(ch) => out.push(ch),
                        None => skipping_whitespace = true,
                    }
                }
                c if multi_line && is_line_break(c) => {
                    self.consume_line_break()?;
                    out.push('\n');
                }
                c if is_forbidden_control(c) => {
                    return Err(self.lexical(format!(
                        "Encountered unexpected character while parsing {}; control characters must be escaped with back-slashes",
                        context
                    )));
                }
                c => {
                    out.push(c);
                    self.advance()?;
                }
            }
        }
    }

    /// Parses the character after a backslash. Returns `None` for a
    /// line-ending backslash, after which whitespace and line breaks are
    /// skipped.
    fn parse_escape(&mut self, multi_line: bool, context: &str) -> Result<Option<char>> {
        let c = self.current(context)?;

        if multi_line && (is_whitespace(c) || is_line_break(c)) {
            self.consume_whitespace()?;
            if !self.consume_line_break()? {
                return Err(self.unexpected(context, "line break after line-ending back-slash"));
            }
            return Ok(None);
        }

        let simple = match c {
            'b' => Some('\u{0008}'),
            'f' => Some('\u{000C}'),
            'n' => Some('\n'),
            'r' => Some('\r'),
            't' => Some('\t'),
            '"' => Some('"'),
            '\\' => Some('\\'),
            's' if !STRICT => Some(' '),
            'u' | 'U' => None,
            other => {
                return Err(self.lexical(format!(
                    "Encountered unexpected character while parsing {}; unknown escape sequence '\\{}'",
                    context,
                    other.escape_debug()
                )))
            }
        };
        self.advance()?;

        match simple {
            Some(ch) => Ok(Some(ch)),
            None => {
                let digits = if c == 'u' { 4 } else { 8 };
                self.parse_unicode_escape(digits, context).map(Some)
            }
        }
    }

    fn parse_unicode_escape(&mut self, digits: usize, context: &str) -> Result<char> {
        let mut value: u32 = 0;
        for _ in 0..digits {
            let c = self.current(context)?;
            let digit = c.to_digit(16).ok_or_else(|| {
                self.lexical(format!(
                    "Encountered unexpected character while parsing {}; expected hex digit, saw '{}'",
                    context,
                    c.escape_debug()
                ))
            })?;
            value = value * 16 + digit;
            self.advance()?;
        }
        char::from_u32(value).ok_or_else(|| self.lexical("Unknown Unicode scalar sequence"))
    }

    fn parse_literal_string(&mut self, multi_line: bool) -> Result<String> {
        let context = if multi_line {
            "multi-line literal string"
        } else {
            "literal string"
        };
        let mut out = String::new();

        loop {
            match self.current(context)? {
                '\'' if !multi_line => {
                    self.advance()?;
                    return Ok(out);
                }
                '\'' => {
                    if self.consume_closing_delimiters('\'', &mut out)? {
                        return Ok(out);
                    }
                }
                c if multi_line && is_line_break(c) => {
                    self.consume_line_break()?;
                    out.push('\n');
                }
                c if is_forbidden_control(c) => {
                    return Err(self.lexical(format!(
                        "Encountered unexpected character while parsing {}; control characters may not appear in literal strings",
                        context
                    )));
                }
                c => {
                    out.push(c);
                    self.advance()?;
                }
            }
        }
    }

    // ---------------------------------------------------------------------
    // booleans and numbers

    fn parse_bool(&mut self) -> Result<bool> {
        let value = self.peek() == Some('t');
        let word = if value { "true" } else { "false" };
        for expected in word.chars() {
            if self.peek() != Some(expected) {
                return Err(self.unexpected("boolean", "'true' or 'false'"));
            }
            self.advance()?;
        }
        self.require_terminator("boolean")?;
        Ok(value)
    }

    fn parse_inf_or_nan(&mut self) -> Result<f64> {
        let negative = self.peek() == Some('-');
        if matches!(self.peek(), Some('+' | '-')) {
            self.advance()?;
        }

        let (word, value) = match self.current("floating-point")? {
            'i' => ("inf", f64::INFINITY),
            'n' => ("nan", f64::NAN),
            _ => return Err(self.unexpected("floating-point", "'inf' or 'nan'")),
        };
        for expected in word.chars() {
            if self.peek() != Some(expected) {
                return Err(self.unexpected("floating-point", &format!("'{}'", word)));
            }
            self.advance()?;
        }
        self.require_terminator("floating-point")?;
        Ok(if negative { -value } else { value })
    }

    fn parse_decimal_integer(&mut self) -> Result<i64> {
        const CONTEXT: &str = "integer";
        let negative = self.peek() == Some('-');
        if matches!(self.peek(), Some('+' | '-')) {
            self.advance()?;
        }

        // 19 == "9223372036854775807".len()
        let mut buf = [0u8; 19];
        let mut len = 0;
        let mut prev = None;
        while let Some(c) = self.peek_value_char() {
            if c == '_' {
                if !prev.map_or(false, |p: char| p.is_ascii_digit()) {
                    return Err(self.lexical(
                        "Encountered unexpected character while parsing integer; underscores may only follow digits",
                    ));
                }
            } else {
                if !c.is_ascii_digit() {
                    return Err(self.unexpected(CONTEXT, "decimal digit"));
                }
                if len == buf.len() {
                    return Err(self.range(format!(
                        "Integer value out-of-range; exceeds maximum length of {} characters",
                        buf.len()
                    )));
                }
                buf[len] = c as u8;
                len += 1;
            }
            prev = Some(c);
            self.advance()?;
        }
        if len == 0 || prev == Some('_') {
            return Err(self.unexpected(CONTEXT, "decimal digit"));
        }
        if buf[0] == b'0' && len > 1 {
            return Err(self.lexical(
                "Encountered unexpected character while parsing integer; leading zeroes are not allowed",
            ));
        }

        let overflow = || {
            self.range("Error parsing integer; the character sequence contained a value not representable by a signed 64-bit integer")
        };
        let magnitude: u64 = std::str::from_utf8(&buf[..len])
            .ok()
            .and_then(|digits| digits.parse().ok())
            .ok_or_else(overflow)?;

        let value = if negative && magnitude == i64::MIN.unsigned_abs() {
            Some(i64::MIN)
        } else {
            i64::try_from(magnitude)
                .ok()
                .map(|v| if negative { -v } else { v })
        };
        value.ok_or_else(overflow)
    }

    /// Parses `0b`, `0o` and `0x` integers. The cursor is on the leading `0`.
    fn parse_radix_integer(&mut self, radix: u32) -> Result<i64> {
        let (name, title, digit_name, max_len) = match radix {
            2 => ("binary integer", "Binary integer", "binary digit", 64),
            8 => ("octal integer", "Octal integer", "octal digit", 21),
            _ => ("hexadecimal integer", "Hexadecimal integer", "hexadecimal digit", 16),
        };

        // '0' and the radix letter
        self.advance()?;
        self.advance()?;

        let mut buf = [0u8; 64];
        let mut len = 0;
        let mut prev = None;
        while let Some(c) = self.peek_value_char() {
            if c == '_' {
                if !prev.map_or(false, |p: char| p.is_digit(radix)) {
                    return Err(self.lexical(format!(
                        "Encountered unexpected character while parsing {}; underscores may only follow digits",
                        name
                    )));
                }
            } else {
                if !c.is_digit(radix) {
                    return Err(self.unexpected(name, digit_name));
                }
                if len == max_len {
                    return Err(self.range(format!(
                        "{} value out-of-range; exceeds maximum length of {} characters",
                        title, max_len
                    )));
                }
                buf[len] = c as u8;
                len += 1;
            }
            prev = Some(c);
            self.advance()?;
        }
        if len == 0 || prev == Some('_') {
            return Err(self.unexpected(name, digit_name));
        }

        std::str::from_utf8(&buf[..len])
            .ok()
            .and_then(|digits| i64::from_str_radix(digits, radix).ok())
            .ok_or_else(|| {
                self.range(format!(
                    "Error parsing {}; the character sequence contained a value not representable by a signed 64-bit integer",
                    name
                ))
            })
    }

    fn parse_float(&mut self) -> Result<f64> {
        const CONTEXT: &str = "floating-point";
        let negative = self.peek() == Some('-');
        if matches!(self.peek(), Some('+' | '-')) {
            self.advance()?;
        }

        let mut buf = [0u8; 64];
        let mut len = 0;
        let mut prev: Option<char> = None;
        let mut seen_decimal = false;
        let mut seen_exponent = false;
        let mut seen_exponent_sign = false;
        while let Some(c) = self.peek_value_char() {
            let after_digit = prev.map_or(false, |p| p.is_ascii_digit());
            match c {
                '_' => {
                    if !after_digit {
                        return Err(self.lexical(
                            "Encountered unexpected character while parsing floating-point; underscores may only follow digits",
                        ));
                    }
                    prev = Some(c);
                    self.advance()?;
                    continue;
                }
                '.' => {
                    if seen_decimal {
                        return Err(self.lexical(
                            "Encountered unexpected character while parsing floating-point; decimal points may appear only once",
                        ));
                    }
                    if seen_exponent {
                        return Err(self.lexical(
                            "Encountered unexpected character while parsing floating-point; decimal points may not appear after exponents",
                        ));
                    }
                    if !after_digit {
                        return Err(self.unexpected(CONTEXT, "decimal digit"));
                    }
                    seen_decimal = true;
                }
                'e' | 'E' => {
                    if seen_exponent {
                        return Err(self.lexical(
                            "Encountered unexpected character while parsing floating-point; exponents may appear only once",
                        ));
                    }
                    if !after_digit {
                        return Err(self.unexpected(CONTEXT, "decimal digit"));
                    }
                    seen_exponent = true;
                }
                '+' | '-' => {
                    if !matches!(prev, Some('e' | 'E')) {
                        return Err(self.lexical(
                            "Encountered unexpected character while parsing floating-point; exponent signs must immediately follow 'e'",
                        ));
                    }
                    if seen_exponent_sign {
                        return Err(self.lexical(
                            "Encountered unexpected character while parsing floating-point; exponent signs may appear only once",
                        ));
                    }
                    seen_exponent_sign = true;
                }
                c if c.is_ascii_digit() => {}
                _ => return Err(self.unexpected(CONTEXT, "decimal digit")),
            }

            if len == buf.len() {
                return Err(self.range(format!(
                    "Floating-point value out-of-range; exceeds maximum length of {} characters",
                    buf.len()
                )));
            }
            buf[len] = c as u8;
            len += 1;
            prev = Some(c);
            self.advance()?;
        }
        if !prev.map_or(false, |p| p.is_ascii_digit()) {
            return Err(self.unexpected(CONTEXT, "decimal digit"));
        }
        if buf[0] == b'0' && len > 1 && buf[1].is_ascii_digit() {
            return Err(self.lexical(
                "Encountered unexpected character while parsing floating-point; leading zeroes are not allowed",
            ));
        }

        let value: f64 = std::str::from_utf8(&buf[..len])
            .ok()
            .and_then(|text| text.parse().ok())
            .ok_or_else(|| {
                self.lexical("Error parsing floating-point; the character sequence could not be interpreted as a floating-point value")
            })?;
        if !value.is_finite() {
            return Err(self.range(
                "Error parsing floating-point; the character sequence contained a value not representable by a 64-bit floating-point",
            ));
        }
        Ok(if negative { -value } else { value })
    }

    /// Parses `0x1.8p3` style floats. The cursor is on the leading `0`.
    fn parse_hex_float(&mut self) -> Result<f64> {
        const CONTEXT: &str = "hexadecimal floating-point";
        // 23 == "1.0123456789ABCDEFp+999".len()
        const MAX_LEN: usize = 23;

        self.advance()?;
        self.advance()?;

        let mut len = 0;
        let mut prev: Option<char> = None;
        let mut seen_decimal = false;
        let mut seen_exponent = false;
        let mut seen_exponent_sign = false;
        let mut mantissa: u128 = 0;
        let mut mantissa_digits = 0;
        let mut fraction_digits: i32 = 0;
        let mut exponent: i32 = 0;
        let mut exponent_digits = 0;
        let mut exponent_negative = false;

        while let Some(c) = self.peek_value_char() {
            match c {
                '_' => {
                    if !prev.map_or(false, |p| p.is_ascii_hexdigit()) {
                        return Err(self.lexical(
                            "Encountered unexpected character while parsing hexadecimal floating-point; underscores may only follow digits",
                        ));
                    }
                    prev = Some(c);
                    self.advance()?;
                    continue;
                }
                '.' => {
                    if seen_decimal {
                        return Err(self.lexical(
                            "Encountered unexpected character while parsing hexadecimal floating-point; decimal points may appear only once",
                        ));
                    }
                    if seen_exponent {
                        return Err(self.lexical(
                            "Encountered unexpected character while parsing hexadecimal floating-point; decimal points may not appear after exponents",
                        ));
                    }
                    seen_decimal = true;
                }
                'p' | 'P' => {
                    if seen_exponent {
                        return Err(self.lexical(
                            "Encountered unexpected character while parsing hexadecimal floating-point; exponents may appear only once",
                        ));
                    }
                    if !seen_decimal {
                        return Err(self.lexical(
                            "Encountered unexpected character while parsing hexadecimal floating-point; exponents may not appear before decimal points",
                        ));
                    }
                    seen_exponent = true;
                }
                '+' | '-' => {
                    if !matches!(prev, Some('p' | 'P')) {
                        return Err(self.lexical(
                            "Encountered unexpected character while parsing hexadecimal floating-point; exponent signs must immediately follow 'p'",
                        ));
                    }
                    if seen_exponent_sign {
                        return Err(self.lexical(
                            "Encountered unexpected character while parsing hexadecimal floating-point; exponent signs may appear only once",
                        ));
                    }
                    seen_exponent_sign = true;
                    exponent_negative = c == '-';
                }
                c if !seen_exponent => {
                    let digit = c
                        .to_digit(16)
                        .ok_or_else(|| self.unexpected(CONTEXT, "hexadecimal digit"))?;
                    mantissa = (mantissa << 4) | u128::from(digit);
                    mantissa_digits += 1;
                    if seen_decimal {
                        fraction_digits += 1;
                    }
                }
                c => {
                    let digit = c
                        .to_digit(10)
                        .ok_or_else(|| self.unexpected("hexadecimal floating-point exponent", "decimal digit"))?;
                    exponent = exponent.saturating_mul(10).saturating_add(digit as i32);
                    exponent_digits += 1;
                }
            }

            if len == MAX_LEN {
                return Err(self.range(format!(
                    "Hexadecimal floating-point value out-of-range; exceeds maximum length of {} characters",
                    MAX_LEN
                )));
            }
            len += 1;
            prev = Some(c);
            self.advance()?;
        }

        if prev == Some('_') || mantissa_digits == 0 || exponent_digits == 0 {
            return Err(self.unexpected(CONTEXT, "hexadecimal floating-point value"));
        }

        let exponent = if exponent_negative { -exponent } else { exponent };
        let value = scale_to_f64(mantissa, i64::from(exponent) - 4 * i64::from(fraction_digits));
        if !value.is_finite() {
            return Err(self.range(
                "Error parsing hexadecimal floating-point; the character sequence contained a value not representable by a 64-bit floating-point",
            ));
        }
        Ok(value)
    }

    // ---------------------------------------------------------------------
    // dates and times

    fn parse_date(&mut self, time_may_follow: bool) -> Result<Date> {
        const CONTEXT: &str = "date";

        let year = self
            .consume_digits(4)?
            .ok_or_else(|| self.unexpected(CONTEXT, "4-digit year"))?;
        self.expect('-', CONTEXT)?;

        let month = self
            .consume_digits(2)?
            .ok_or_else(|| self.unexpected(CONTEXT, "2-digit month"))?;
        if !(1..=12).contains(&month) {
            return Err(self.range(format!(
                "Month value out-of-range; expected 1-12 (inclusive), saw {}",
                month
            )));
        }
        self.expect('-', CONTEXT)?;

        let day = self
            .consume_digits(2)?
            .ok_or_else(|| self.unexpected(CONTEXT, "2-digit day"))?;
        let max_day = days_in_month(year as u16, month as u8);
        if day == 0 || day > u32::from(max_day) {
            return Err(self.range(format!(
                "Day value out-of-range; expected 1-{} (inclusive), saw {}",
                max_day, day
            )));
        }

        if !time_may_follow {
            self.require_terminator(CONTEXT)?;
        }

        Ok(Date {
            year: year as u16,
            month: month as u8,
            day: day as u8,
        })
    }

    fn parse_time(&mut self, offset_may_follow: bool) -> Result<Time> {
        const CONTEXT: &str = "time";
        let may_end_here = |c: Option<char>| match c {
            None => true,
            Some(c) if is_value_terminator(c) => true,
            Some('+' | '-' | 'Z' | 'z') => offset_may_follow,
            _ => false,
        };

        let hour = self
            .consume_digits(2)?
            .ok_or_else(|| self.unexpected(CONTEXT, "2-digit hour"))?;
        if hour > 23 {
            return Err(self.range(format!(
                "Hour value out-of-range; expected 0-23 (inclusive), saw {}",
                hour
            )));
        }
        self.expect(':', CONTEXT)?;

        let minute = self
            .consume_digits(2)?
            .ok_or_else(|| self.unexpected(CONTEXT, "2-digit minute"))?;
        if minute > 59 {
            return Err(self.range(format!(
                "Minute value out-of-range; expected 0-59 (inclusive), saw {}",
                minute
            )));
        }

        let mut time = Time {
            hour: hour as u8,
            minute: minute as u8,
            second: 0,
            nanosecond: 0,
        };

        if STRICT {
            self.expect(':', CONTEXT)?;
        } else {
            // Seconds may be omitted.
            if self.peek() != Some(':') {
                if !may_end_here(self.peek()) {
                    return Err(self.unexpected(CONTEXT, "':' or value-terminator"));
                }
                return self.finish_time(time, offset_may_follow);
            }
            self.advance()?;
        }

        let second = self
            .consume_digits(2)?
            .ok_or_else(|| self.unexpected(CONTEXT, "2-digit second"))?;
        if second > 59 {
            return Err(self.range(format!(
                "Second value out-of-range; expected 0-59 (inclusive), saw {}",
                second
            )));
        }
        time.second = second as u8;

        if self.peek() != Some('.') {
            if !may_end_here(self.peek()) {
                return Err(self.unexpected(CONTEXT, "fractional seconds or value-terminator"));
            }
            return self.finish_time(time, offset_may_follow);
        }
        self.advance()?;

        let mut nanosecond = 0u32;
        let mut digits = 0;
        while let Some(digit) = self.peek().and_then(|c| c.to_digit(10)) {
            if digits == 24 {
                return Err(self.range("Fractional value out-of-range; exceeds maximum precision of 24"));
            }
            // Digits past nanosecond precision are truncated.
            if digits < 9 {
                nanosecond += digit * 10u32.pow(8 - digits);
            }
            digits += 1;
            self.advance()?;
        }
        if digits == 0 {
            return Err(self.unexpected(CONTEXT, "fractional digits"));
        }
        time.nanosecond = nanosecond;

        if !may_end_here(self.peek()) {
            return Err(self.unexpected(CONTEXT, "value-terminator"));
        }
        self.finish_time(time, offset_may_follow)
    }

    fn finish_time(&self, time: Time, offset_may_follow: bool) -> Result<Time> {
        if !offset_may_follow {
            self.require_terminator("time")?;
        }
        Ok(time)
    }

    fn parse_offset(&mut self) -> Result<Option<TimeOffset>> {
        const CONTEXT: &str = "date-time offset";
        match self.peek() {
            Some('Z' | 'z') => {
                self.advance()?;
                Ok(Some(TimeOffset::UTC))
            }
            Some(sign @ ('+' | '-')) => {
                self.advance()?;
                let hour = self
                    .consume_digits(2)?
                    .ok_or_else(|| self.unexpected(CONTEXT, "2-digit hour"))?;
                if hour > 23 {
                    return Err(self.range(format!(
                        "Hour value out-of-range; expected 0-23 (inclusive), saw {}",
                        hour
                    )));
                }
                self.expect(':', CONTEXT)?;
                let minute = self
                    .consume_digits(2)?
                    .ok_or_else(|| self.unexpected(CONTEXT, "2-digit minute"))?;
                if minute > 59 {
                    return Err(self.range(format!(
                        "Minute value out-of-range; expected 0-59 (inclusive), saw {}",
                        minute
                    )));
                }
                let minutes = (hour * 60 + minute) as i16;
                let minutes = if sign == '-' { -minutes } else { minutes };
                TimeOffset::from_minutes(minutes)
                    .map(Some)
                    .ok_or_else(|| self.range("Offset value out-of-range"))
            }
            _ => Ok(None),
        }
    }

    /// Parses the time and offset of a date-time whose date and separator
    /// have been consumed.
    fn parse_datetime_tail(&mut self, date: Date) -> Result<DateTime> {
        let time = self.parse_time(true)?;
        let offset = self.parse_offset()?;
        self.require_terminator("date-time")?;
        Ok(DateTime { date, time, offset })
    }

    fn parse_datetime(&mut self) -> Result<DateTime> {
        let date = self.parse_date(true)?;
        match self.current("date-time")? {
            ' ' | 'T' | 't' => self.advance()?,
            _ => return Err(self.unexpected("date-time", "space or 'T'")),
        }
        self.parse_datetime_tail(date)
    }

    /// Parses a date, or a date-time whose date and time are separated by a
    /// single space (the value scan stops at the space).
    fn parse_date_or_datetime(&mut self) -> Result<Literal> {
        let date = self.parse_date(true)?;
        if self.peek() == Some(' ') && self.time_follows_space()? {
            self.advance()?;
            return Ok(Literal::DateTime(self.parse_datetime_tail(date)?));
        }
        self.require_terminator("date")?;
        Ok(Literal::Date(date))
    }

    /// With the cursor on a space, looks for `HH:` after it and rewinds.
    fn time_follows_space(&mut self) -> Result<bool> {
        let mut advances = 0;
        let mut matched = true;
        for slot in 0..3 {
            self.advance()?;
            advances += 1;
            let ok = match self.peek() {
                Some(c) if slot < 2 => c.is_ascii_digit(),
                Some(c) => c == ':',
                None => false,
            };
            if !ok {
                matched = false;
                break;
            }
        }
        self.go_back(advances);
        Ok(matched)
    }

    // ---------------------------------------------------------------------
    // values

    fn literal_node(&self, begin: Position, literal: Literal) -> Node {
        let region = self.region_from(begin);
        match literal {
            Literal::String(v) => Node::String(Value::with_region(v, region)),
            Literal::Integer(v) => Node::Integer(Value::with_region(v, region)),
            Literal::Float(v) => Node::Float(Value::with_region(v, region)),
            Literal::Boolean(v) => Node::Boolean(Value::with_region(v, region)),
            Literal::Date(v) => Node::Date(Value::with_region(v, region)),
            Literal::Time(v) => Node::Time(Value::with_region(v, region)),
            Literal::DateTime(v) => Node::DateTime(Value::with_region(v, region)),
        }
    }

    fn parse_value(&mut self) -> Result<Node> {
        let c = self.current("value")?;
        if is_value_terminator(c) {
            return Err(self.unexpected("value", "a value"));
        }
        let begin = self.position();

        let literal = match c {
            '[' => return self.parse_array().map(Node::Array),
            '{' => return self.parse_inline_table().map(Node::Table),
            '"' | '\'' => Literal::String(self.parse_string(true)?),
            't' | 'f' => Literal::Boolean(self.parse_bool()?),
            'i' | 'n' => Literal::Float(self.parse_inf_or_nan()?),
            _ => self.parse_ambiguous_value()?,
        };
        Ok(self.literal_node(begin, literal))
    }

    /// Classifies and parses a value starting with a digit or sign.
    fn parse_ambiguous_value(&mut self) -> Result<Literal> {
        let first = self.current("value")?;

        let mut chars = ['\0'; MAX_LOOKAHEAD];
        chars[0] = first;
        let mut count = 1;
        let mut advances = 0;
        let mut eof_while_scanning = false;
        while count < MAX_LOOKAHEAD {
            self.advance()?;
            advances += 1;
            match self.peek() {
                None => {
                    eof_while_scanning = true;
                    break;
                }
                Some(c) if is_value_terminator(c) => break,
                Some(c) => {
                    chars[count] = c;
                    count += 1;
                }
            }
        }
        self.go_back(advances);
        let scanned = &chars[..count];

        if count == 1 {
            if let Some(digit) = first.to_digit(10) {
                self.advance()?;
                return Ok(Literal::Integer(i64::from(digit)));
            }
            return Err(if eof_while_scanning {
                self.lexical("Encountered EOF while parsing value")
            } else {
                Error::ambiguity(self.here(), "Could not determine value type")
            });
        }

        let begins_with_sign = matches!(first, '+' | '-');
        let begins_with_digit = first.is_ascii_digit();

        if begins_with_sign {
            if count == 2 {
                if let Some(digit) = chars[1].to_digit(10) {
                    self.advance()?;
                    self.advance()?;
                    let digit = i64::from(digit);
                    return Ok(Literal::Integer(if first == '-' { -digit } else { digit }));
                }
            }
            if matches!(chars[1], 'i' | 'n') {
                return Ok(Literal::Float(self.parse_inf_or_nan()?));
            }
            if chars[1].is_ascii_digit() && matches!(chars[2], '.' | 'e' | 'E') {
                return Ok(Literal::Float(self.parse_float()?));
            }
        } else if first == '0' {
            match chars[1] {
                '.' | 'e' | 'E' => return Ok(Literal::Float(self.parse_float()?)),
                'b' => return Ok(Literal::Integer(self.parse_radix_integer(2)?)),
                'o' => return Ok(Literal::Integer(self.parse_radix_integer(8)?)),
                'x' | 'X' => {
                    if !STRICT && scanned[2..].iter().any(|c| matches!(c, 'p' | 'P')) {
                        return Ok(Literal::Float(self.parse_hex_float()?));
                    }
                    return Ok(Literal::Integer(self.parse_radix_integer(16)?));
                }
                _ => {}
            }
        } else if begins_with_digit && matches!(chars[1], '.' | 'e' | 'E') {
            return Ok(Literal::Float(self.parse_float()?));
        }

        if !(begins_with_sign || begins_with_digit) {
            return Err(Error::ambiguity(self.here(), "Could not determine value type"));
        }

        // Deeper dive: rule out each kind by the characters it cannot contain.
        // The selected routine reports malformed values with a precise message.
        let mut candidates = Candidates {
            integer: true,
            float: true,
            // "HH:MM:SS".len() == 8
            datetime: begins_with_digit && count >= 8,
        };
        let mut first_colon = None;
        let mut first_minus = None;
        for (i, &c) in scanned.iter().enumerate() {
            let digit = c.is_ascii_digit();
            let colon = c == ':';
            let minus = c == '-';
            let sign = minus || c == '+';

            if colon && first_colon.is_none() {
                first_colon = Some(i);
            }
            if minus && first_minus.is_none() {
                first_minus = Some(i);
            }

            if candidates.integer && (colon || !(digit || (i == 0 && sign) || c == '_')) {
                candidates.integer = false;
            }
            if candidates.float {
                let exponent_sign = sign && (i == 0 || matches!(scanned[i - 1], 'e' | 'E'));
                if colon || !(digit || exponent_sign || matches!(c, '_' | '.' | 'e' | 'E')) {
                    candidates.float = false;
                }
            }
            if candidates.datetime
                && !(digit || (i >= 4 && sign) || matches!(c, 'T' | 't' | 'Z' | 'z' | ':' | '.'))
            {
                candidates.datetime = false;
            }

            if !(candidates.integer || candidates.float || candidates.datetime) {
                break;
            }
        }

        if candidates.integer && candidates.datetime {
            if first_colon.is_some() || first_minus.map_or(false, |i| i > 0) {
                candidates.integer = false;
            } else {
                candidates.datetime = false;
            }
        }
        if candidates.integer && candidates.float {
            candidates.float = false;
        }
        if candidates.float && candidates.datetime {
            // A date or time always has a ':' or an interior '-'.
            if first_colon.is_none() && first_minus.is_none() {
                candidates.datetime = false;
            } else {
                candidates.float = false;
            }
        }

        match (candidates.integer, candidates.float, candidates.datetime) {
            (true, false, false) => Ok(Literal::Integer(self.parse_decimal_integer()?)),
            (false, true, false) => Ok(Literal::Float(self.parse_float()?)),
            (false, false, true) => match (first_colon.is_some(), first_minus.is_some()) {
                (true, false) => Ok(Literal::Time(self.parse_time(false)?)),
                (false, true) => self.parse_date_or_datetime(),
                _ => Ok(Literal::DateTime(self.parse_datetime()?)),
            },
            _ => Err(Error::ambiguity(self.here(), "Could not determine value type")),
        }
    }

    fn parse_array(&mut self) -> Result<Array> {
        const CONTEXT: &str = "array";
        let begin = self.position();
        self.advance()?;

        let mut array = Array::new();
        let mut expecting_value = true;
        loop {
            while self.consume_whitespace()? || self.consume_line_break()? || self.consume_comment()? {}

            match self.current(CONTEXT)? {
                ']' => {
                    self.advance()?;
                    break;
                }
                ',' => {
                    if expecting_value {
                        return Err(self.unexpected(CONTEXT, "value or closing ']'"));
                    }
                    expecting_value = true;
                    self.advance()?;
                }
                _ => {
                    if !expecting_value {
                        return Err(self.unexpected(CONTEXT, "',' or closing ']'"));
                    }
                    array.values.push(self.parse_value()?);
                    expecting_value = false;
                }
            }
        }
        array.region = self.region_from(begin);

        if STRICT && !array.is_homogeneous() {
            return Err(Error::structural(
                array.region.clone(),
                "Arrays cannot contain values of different types",
            ));
        }
        Ok(array)
    }

    fn parse_inline_table(&mut self) -> Result<Table> {
        const CONTEXT: &str = "inline table";
        let begin = self.position();
        self.advance()?;

        let mut table = Table::new();
        table.inline = true;
        let mut expecting_pair = true;
        loop {
            if STRICT {
                self.consume_whitespace()?;
            } else {
                while self.consume_whitespace()? || self.consume_line_break()? || self.consume_comment()? {}
            }

            match self.current(CONTEXT)? {
                '}' => {
                    if STRICT && expecting_pair && !table.is_empty() {
                        return Err(self.lexical(
                            "Encountered unexpected character while parsing inline table; trailing commas are not allowed",
                        ));
                    }
                    self.advance()?;
                    break;
                }
                ',' => {
                    if expecting_pair {
                        return Err(self.unexpected(CONTEXT, "key-value pair or closing '}'"));
                    }
                    expecting_pair = true;
                    self.advance()?;
                }
                c if is_bare_key_character(c) || is_string_delimiter(c) => {
                    if !expecting_pair {
                        return Err(self.unexpected(CONTEXT, "',' or closing '}'"));
                    }
                    self.parse_key_value_pair_and_insert(&mut table)?;
                    expecting_pair = false;
                }
                _ => return Err(self.unexpected(CONTEXT, "key-value pair, ',' or closing '}'")),
            }
        }
        table.region = self.region_from(begin);
        Ok(table)
    }

    // ---------------------------------------------------------------------
    // keys and structure

    fn parse_bare_key_segment(&mut self) -> Result<String> {
        let mut segment = String::new();
        while let Some(c) = self.peek().filter(|c| is_bare_key_character(*c)) {
            segment.push(c);
            self.advance()?;
        }
        Ok(segment)
    }

    fn parse_key_segment(&mut self) -> Result<String> {
        match self.current("key")? {
            c if !STRICT && is_combining_mark(c) => Err(self.lexical(format!(
                "Encountered unexpected character while parsing key; expected bare key starting character or string delimiter, saw combining mark '{}'",
                c
            ))),
            c if is_bare_key_character(c) => self.parse_bare_key_segment(),
            c if is_string_delimiter(c) => self.parse_string(false),
            _ => Err(self.unexpected("key", "bare key character or string delimiter")),
        }
    }

    fn parse_key(&mut self) -> Result<Key> {
        let begin = self.position();
        let mut parents = Vec::new();
        self.start_recording();

        let mut last = self.parse_key_segment()?;
        let mut end = self.end_position();
        loop {
            self.consume_whitespace()?;
            if self.peek() != Some('.') {
                break;
            }
            self.advance()?;
            self.consume_whitespace()?;

            let next = self.parse_key_segment()?;
            parents.push(std::mem::replace(&mut last, next));
            end = self.end_position();
        }

        let text = self.stop_recording();
        Ok(Key {
            parents,
            last,
            text,
            region: Region::new(begin, end, self.source_path()),
        })
    }

    fn parse_key_value_pair(&mut self) -> Result<(Key, Node)> {
        const CONTEXT: &str = "key-value pair";
        let key = self.parse_key()?;

        self.consume_whitespace()?;
        self.expect('=', CONTEXT)?;
        self.consume_whitespace()?;
        self.current(CONTEXT)?;

        let value = self.parse_value()?;
        Ok((key, value))
    }

    fn parse_key_value_pair_and_insert(&mut self, table: &mut Table) -> Result<()> {
        let (key, value) = self.parse_key_value_pair()?;

        let mut table = table;
        for segment in &key.parents {
            let value_region = value.region();
            let child = table
                .entries
                .entry(segment.clone())
                .or_insert_with(|| Node::Table(Table::dotted(value_region.clone())));
            let child_type = child.node_type();
            table = match child {
                Node::Table(child) if child.dotted => {
                    child.region.end = value_region.end;
                    child
                }
                _ => {
                    return Err(Error::structural(
                        key.region.clone(),
                        format!("Attempt to redefine {} as dotted key-value pair", child_type),
                    ))
                }
            };
        }

        match table.entries.entry(key.last.clone()) {
            Entry::Occupied(existing) => {
                let existing = existing.get().node_type();
                let message = if existing == value.node_type() {
                    format!("Attempt to redefine {} '{}'", existing, key.text)
                } else {
                    format!(
                        "Attempt to redefine {} '{}' as {}",
                        existing,
                        key.text,
                        value.node_type()
                    )
                };
                Err(Error::structural(key.region, message))
            }
            Entry::Vacant(slot) => {
                slot.insert(value);
                Ok(())
            }
        }
    }

    /// Parses `[a.b]` or `[[a.b]]`, creating or extending the tables it
    /// names, and returns the header's key path.
    fn parse_table_header(&mut self, root: &mut Table) -> Result<Vec<String>> {
        let begin = self.position();
        self.advance()?;

        let is_array = self.current("table header")? == '[';
        if is_array {
            self.advance()?;
        }
        let context = if is_array { "table array header" } else { "table header" };

        self.consume_whitespace()?;
        self.current(context)?;
        let key = self.parse_key()?;

        self.consume_whitespace()?;
        self.expect(']', context)?;
        if is_array {
            self.expect(']', context)?;
        }
        let region = self.region_from(begin);

        self.consume_whitespace()?;
        if self.cp.is_some() && !self.consume_comment()? && !self.consume_line_break()? {
            return Err(self.unexpected_after(context));
        }

        self.declare_table(root, &key, is_array, region)?;
        Ok(key.into_path())
    }

    fn header_redefinition(&self, existing: NodeType, key: &Key, is_array: bool, region: Region) -> Error {
        let message = if !is_array && existing == NodeType::Table {
            format!("Attempt to redefine existing table '{}'", key.text)
        } else {
            format!(
                "Attempt to redefine existing {} '{}' as {}",
                existing,
                key.text,
                if is_array { NodeType::TableArray } else { NodeType::Table }
            )
        };
        Error::structural(region, message)
    }

    fn declare_table(&self, root: &mut Table, key: &Key, is_array: bool, region: Region) -> Result<()> {
        let mut parent = root;
        for segment in &key.parents {
            let child = parent
                .entries
                .entry(segment.clone())
                .or_insert_with(|| Node::Table(Table::implicit(region.clone())));
            parent = match child {
                Node::Table(table) if table.inline && !table.dotted => {
                    return Err(Error::structural(
                        region,
                        format!("Attempt to extend inline table '{}' with a table header", segment),
                    ))
                }
                Node::Table(table) => table,
                Node::TableArray(array) => match array.last_mut() {
                    Some(table) => table,
                    None => return Err(self.header_redefinition(NodeType::TableArray, key, is_array, region)),
                },
                other => return Err(self.header_redefinition(other.node_type(), key, is_array, region)),
            };
        }

        match parent.entries.entry(key.last.clone()) {
            Entry::Vacant(slot) => {
                let node = if is_array {
                    let mut array = TableArray::with_region(region.clone());
                    array.push(Table::with_region(region));
                    Node::TableArray(array)
                } else {
                    Node::Table(Table::with_region(region))
                };
                slot.insert(node);
                trace!(path = %key.text, array = is_array, "created table");
                Ok(())
            }
            Entry::Occupied(mut slot) => match slot.get_mut() {
                Node::TableArray(array) if is_array => {
                    array.push(Table::with_region(region));
                    trace!(path = %key.text, index = array.len() - 1, "appended table array element");
                    Ok(())
                }
                Node::Table(table) if !is_array && table.implicit => {
                    table.implicit = false;
                    table.region = region;
                    trace!(path = %key.text, "promoted implicit table");
                    Ok(())
                }
                existing => Err(self.header_redefinition(existing.node_type(), key, is_array, region)),
            },
        }
    }

    /// Follows a header path from the root, entering the last table of any
    /// table array on the way.
    fn resolve_path<'t>(root: &'t mut Table, path: &[String]) -> Option<&'t mut Table> {
        let mut table = root;
        for segment in path {
            table = match table.entries.get_mut(segment)? {
                Node::Table(child) => child,
                Node::TableArray(array) => array.last_mut()?,
                _ => return None,
            };
        }
        Some(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::reader::SliceSource;

    fn parse(input: &str) -> Result<Table> {
        Parser::new(CodepointReader::new(SliceSource::new(input.as_bytes()), None)).parse()
    }

    fn value(text: &str) -> Node {
        let root = parse(&format!("v = {}\n", text)).unwrap();
        root.get("v").cloned().unwrap()
    }

    #[test]
    fn test_character_classes() {
        assert!(is_whitespace(' '));
        assert!(is_whitespace('\t'));
        assert!(!is_whitespace('\n'));
        assert_eq!(is_whitespace('\u{3000}'), !STRICT);
        assert!(is_value_terminator('#'));
        assert!(is_value_terminator('}'));
        assert!(!is_value_terminator('.'));
        assert!(is_bare_key_character('-'));
        assert!(!is_bare_key_character('.'));
        assert_eq!(is_bare_key_character('ж'), !STRICT);
        assert_eq!(is_bare_key_character('\u{301}'), !STRICT);
        assert!(!is_bare_key_character('\u{3000}'));
        assert!(is_combining_mark('\u{301}'));
        assert!(!is_combining_mark('ж'));
        assert!(!is_combining_mark('\u{661}'));
        assert!(!is_combining_mark('a'));
        assert!(is_forbidden_control('\u{7F}'));
        assert!(!is_forbidden_control('\t'));
    }

    #[test]
    fn test_single_digit_values() {
        assert_eq!(value("7").as_integer(), Some(7));
        assert_eq!(value("-7").as_integer(), Some(-7));
        assert_eq!(value("+7").as_integer(), Some(7));
    }

    #[test]
    fn test_classification() {
        assert!(value("12345678").is_integer());
        assert!(value("1_000").is_integer());
        assert!(value("12345678.5").is_float());
        assert!(value("-12.5").is_float());
        assert!(value("1979-05-27").is_date());
        assert!(value("07:32:00").is_time());
        assert!(value("1979-05-27T07:32:00Z").is_datetime());
        assert!(value("1979-05-27 07:32:00").is_datetime());
    }

    #[test]
    fn test_value_longer_than_lookahead() {
        let text = "1979-05-27T00:32:00.999999999999999999999";
        assert!(text.chars().count() > MAX_LOOKAHEAD);
        let dt = value(text).as_datetime().unwrap();
        assert_eq!(dt.time.nanosecond, 999_999_999);

        let text = "1_000_000_000_000_000_000_000_0";
        assert_eq!(text.chars().count(), MAX_LOOKAHEAD - 1);
        let err = parse(&format!("v = {}\n", text)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
    }

    #[test]
    fn test_unclassifiable_values() {
        let err = parse("v = 1:2\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Ambiguity);
        assert_eq!(err.message(), "Could not determine value type");

        let err = parse("v = +").unwrap_err();
        assert_eq!(err.message(), "Encountered EOF while parsing value");
    }

    #[test]
    fn test_recorded_key_text_in_errors() {
        let err = parse("a . \"b\" = 1\na.b = 2\n").unwrap_err();
        assert_eq!(err.message(), "Attempt to redefine integer 'a.b'");

        let err = parse("a . \"b\" = 1\na . b = 'x'\n").unwrap_err();
        assert_eq!(err.message(), "Attempt to redefine integer 'a . b' as string");
    }

    #[test]
    fn test_key_segments() {
        let mut parser = Parser::new(CodepointReader::new(SliceSource::new(b"a . 'b c'.d = 1"), None));
        parser.advance().unwrap();
        let key = parser.parse_key().unwrap();
        assert_eq!(key.parents, ["a", "b c"]);
        assert_eq!(key.last, "d");
        assert_eq!(key.text, "a . 'b c'.d");
        assert_eq!(key.into_path(), ["a", "b c", "d"]);

        let mut parser = Parser::new(CodepointReader::new(SliceSource::new(b"a. = 1"), None));
        parser.advance().unwrap();
        assert!(parser.parse_key().is_err());
    }

    #[test]
    fn test_hex_mantissa_rounding() {
        assert_eq!(scale_to_f64(0, 5), 0.0);
        assert_eq!(scale_to_f64(3, -1), 1.5);
        assert_eq!(scale_to_f64((1 << 60) + 129, -60).to_bits(), 0x3FF0_0000_0000_0001);
        assert_eq!(scale_to_f64((1 << 60) + 128, -60), 1.0);
        assert_eq!(scale_to_f64(1, 1024), f64::INFINITY);
        assert_eq!(scale_to_f64(1, -1074).to_bits(), 1);
        assert_eq!(scale_to_f64(1, -2000), 0.0);
    }

    #[test]
    fn test_resolve_path_enters_last_table_array_element() {
        let mut root = parse("[[a]]\nx = 1\n[[a]]\ny = 2\n").unwrap();
        let table = Parser::<SliceSource<'_>>::resolve_path(&mut root, &["a".to_string()]).unwrap();
        assert!(table.contains_key("y"));
        assert!(!table.contains_key("x"));
    }
}
