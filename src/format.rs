//! The accepted grammar
//!
//! This module documents the TOML dialect accepted by this library. It has no
//! items; it exists so the rules live next to the code in rustdoc.
//!
//! # Document
//!
//! A document is UTF-8 text. A leading byte-order mark is skipped. Lines are
//! separated by `\n` or `\r\n`; outside strict mode a lone `\r` also ends a
//! line. Each line holds at most one of:
//!
//! - a key-value pair: `key = value`
//! - a table header: `[a.b]`
//! - a table array header: `[[a.b]]`
//!
//! followed by optional whitespace and an optional comment. Whitespace is space
//! and tab (outside strict mode, also the Unicode space separators such as
//! U+00A0 and U+3000).
//!
//! ## Comments
//!
//! ```text
//! # a full-line comment
//! key = "value"  # a trailing comment
//! ```
//!
//! A comment runs from `#` to the end of the line. It may contain tabs but no
//! other control characters (U+0000-U+0008, U+000A-U+001F, U+007F).
//!
//! # Keys
//!
//! | Form | Example | Notes |
//! |------|---------|-------|
//! | Bare | `server-name_2`, `ключ` | ASCII letters, digits, `-` and `_`; outside strict mode also Unicode letters, digits and marks |
//! | Basic quoted | `"key with spaces"` | escapes allowed, single line |
//! | Literal quoted | `'C:\path'` | no escapes, single line |
//! | Dotted | `a . "b" . c` | whitespace around `.` is ignored |
//!
//! A bare key segment may not begin with a combining mark such as U+0301.
//!
//! A dotted key creates intermediate tables as needed. Those tables may be
//! extended by later dotted keys in the same scope, but never by a header.
//!
//! # Values
//!
//! ## Strings
//!
//! | Form | Delimiter | Escapes | Line breaks |
//! |------|-----------|---------|-------------|
//! | Basic | `"` | yes | no |
//! | Multi-line basic | `"""` | yes | yes |
//! | Literal | `'` | no | no |
//! | Multi-line literal | `'''` | no | yes |
//!
//! Escapes: `\b \t \n \f \r \" \\ \uXXXX \UXXXXXXXX`, plus `\s` (space) outside
//! strict mode. `\u` and `\U` must name a Unicode scalar value.
//!
//! In multi-line strings, a line break directly after the opening delimiter
//! is dropped, and a backslash at the end of a line removes the line break and
//! all whitespace up to the next visible character. Up to two quote characters
//! may sit directly before the closing delimiter:
//!
//! ```text
//! quote = """Here are two quotation marks: "". Simple enough."""
//! trimmed = """\
//!     The quick brown \
//!     fox."""
//! ```
//!
//! Control characters other than tab must be escaped in basic strings and
//! cannot appear in literal strings.
//!
//! ## Integers
//!
//! ```text
//! decimal = +99
//! grouped = 1_000_000
//! hex     = 0xDEAD_beef
//! octal   = 0o755
//! binary  = 0b1101
//! ```
//!
//! Values are signed 64-bit. `_` must sit between two digits. Decimal
//! integers cannot have leading zeroes; only decimal integers take a sign.
//!
//! ## Floats
//!
//! ```text
//! fraction = 3.1415
//! exponent = -2e-2
//! both     = 6.626e-34
//! special  = [inf, +inf, -inf, nan, -nan]
//! hex      = 0x1.8p1   # 3.0, outside strict mode only
//! ```
//!
//! A decimal point must have digits on both sides. Values that overflow a
//! 64-bit float are range errors.
//!
//! ## Booleans
//!
//! `true` and `false`, lowercase.
//!
//! ## Dates and times
//!
//! | Kind | Example |
//! |------|---------|
//! | Offset date-time | `1979-05-27T07:32:00Z`, `1979-05-27T00:32:00.999999-07:00` |
//! | Local date-time | `1979-05-27T07:32:00`, `1979-05-27 07:32:00` |
//! | Local date | `1979-05-27` |
//! | Local time | `07:32:00`, `00:32:00.999999` |
//!
//! The date/time separator is `T`, `t` or a single space. Fractional seconds
//! keep nanosecond precision; extra digits (up to 24 in total) are truncated.
//! Outside strict mode the seconds may be omitted (`1979-05-27T07:32`).
//!
//! ## Arrays
//!
//! ```text
//! ports = [ 8000, 8001, 8002 ]
//! nested = [ [ 1, 2 ], ["a", "b"] ]
//! multi = [
//!     "one",   # comments and line breaks are allowed
//!     "two",   # and so is a trailing comma
//! ]
//! ```
//!
//! In strict mode every element must have the same kind (all nested arrays
//! count as one kind).
//!
//! ## Inline tables
//!
//! ```text
//! point = { x = 1, y = 2 }
//! ```
//!
//! An inline table is complete once closed: no header or dotted key may add
//! to it later. In strict mode it must fit on one line and cannot end with a
//! trailing comma.
//!
//! # Tables
//!
//! ```text
//! [dog."tater.man"]
//! type.name = "pug"
//!
//! [[fruit]]
//! name = "apple"
//!
//! [[fruit]]
//! name = "banana"
//! ```
//!
//! - A header defines a table once. Defining a table that an earlier header
//!   only created implicitly (`a` in `[a.b]`) is allowed.
//! - `[[name]]` appends a new table to the table array `name`. Later headers
//!   and keys that pass through `name` refer to its most recent element.
//! - Any other redefinition of a key, table or table array is an error.
//!
//! # Errors
//!
//! The first violation stops the parse. See [`ErrorKind`](crate::ErrorKind)
//! for the categories.
