//! UTF-8 decoding with position tracking and bounded step-back.
//!
//! [`CodepointReader`] pulls bytes from a [`ByteSource`], decodes them into
//! [`Codepoint`]s annotated with their 1-based position and byte offset, and
//! keeps a short history so the parser can rewind after scanning ahead.
//!
//! Line breaks are `\n`, `\r\n` (one break), and a lone `\r` (one break,
//! lenient grammar only). A leading byte-order mark is skipped.

use crate::error::{Error, Result};
use crate::options::STRICT;
use crate::region::{Position, Region};
use std::collections::VecDeque;
use std::io::{self, Read};
use std::ops::Range;
use std::sync::Arc;

/// Maximum number of codepoints the parser scans ahead before rewinding.
pub const MAX_LOOKAHEAD: usize = 32;

/// Number of already-consumed codepoints retained for [`CodepointReader::step_back`].
const HISTORY_CAPACITY: usize = MAX_LOOKAHEAD;

/// One decoded Unicode scalar value and where it came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Codepoint {
    pub value: char,
    pub position: Position,
    /// Byte offset of the first byte of this codepoint in the input.
    pub offset: usize,
}

impl Codepoint {
    /// Number of bytes this codepoint occupied in the input (1-4).
    #[inline]
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.value.len_utf8()
    }

    /// Byte range of this codepoint in the input.
    #[inline]
    #[must_use]
    pub fn span(&self) -> Range<usize> {
        self.offset..self.offset + self.byte_len()
    }
}

/// A supplier of raw input bytes.
pub trait ByteSource {
    /// Returns the next byte, or `None` at end of input.
    fn next_byte(&mut self) -> io::Result<Option<u8>>;
}

/// Bytes from an in-memory slice.
pub struct SliceSource<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> SliceSource<'a> {
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        SliceSource { bytes, position: 0 }
    }
}

impl ByteSource for SliceSource<'_> {
    #[inline]
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let byte = self.bytes.get(self.position).copied();
        if byte.is_some() {
            self.position += 1;
        }
        Ok(byte)
    }
}

/// Bytes from any [`io::Read`], buffered internally.
pub struct StreamSource<R> {
    bytes: io::Bytes<io::BufReader<R>>,
}

impl<R: io::Read> StreamSource<R> {
    pub fn new(reader: R) -> Self {
        StreamSource {
            bytes: io::BufReader::new(reader).bytes(),
        }
    }
}

impl<R: io::Read> ByteSource for StreamSource<R> {
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        self.bytes.next().transpose()
    }
}

/// Decodes a byte source into positioned codepoints.
///
/// The codepoint most recently returned by [`read_next`](Self::read_next) is
/// the *head*. Up to [`MAX_LOOKAHEAD`] codepoints before the head are kept in
/// a history buffer; [`step_back`](Self::step_back) moves the cursor into that
/// history and subsequent reads replay it before decoding new input.
pub struct CodepointReader<S> {
    source: S,
    source_path: Option<Arc<str>>,
    head: Option<Codepoint>,
    history: VecDeque<Codepoint>,
    negative_offset: usize,
    exhausted: bool,
    next_position: Position,
    next_offset: usize,
    last_char: Option<char>,
}

impl<S: ByteSource> CodepointReader<S> {
    pub fn new(source: S, source_path: Option<Arc<str>>) -> Self {
        CodepointReader {
            source,
            source_path,
            head: None,
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
            negative_offset: 0,
            exhausted: false,
            next_position: Position::START,
            next_offset: 0,
            last_char: None,
        }
    }

    /// The label shared by every region built from this input.
    #[must_use]
    pub fn source_path(&self) -> &Option<Arc<str>> {
        &self.source_path
    }

    /// `true` while the reader is replaying codepoints after a step-back.
    #[inline]
    #[must_use]
    pub fn replaying(&self) -> bool {
        self.negative_offset > 0
    }

    /// The position immediately after the last decoded codepoint.
    #[must_use]
    pub fn end_position(&self) -> Position {
        self.next_position
    }

    /// Advances the cursor and returns the codepoint now under it, or `None`
    /// at end of input.
    pub fn read_next(&mut self) -> Result<Option<Codepoint>> {
        if self.negative_offset > 0 {
            self.negative_offset -= 1;
            if self.negative_offset == 0 {
                return Ok(self.head);
            }
            return Ok(Some(self.history[self.history.len() - self.negative_offset]));
        }

        if let Some(head) = self.head.take() {
            if self.history.len() == HISTORY_CAPACITY {
                self.history.pop_front();
            }
            self.history.push_back(head);
        }
        if !self.exhausted {
            self.head = self.decode()?;
            self.exhausted = self.head.is_none();
        }
        Ok(self.head)
    }

    /// Rewinds the cursor by `count` codepoints and returns the codepoint now
    /// under it.
    ///
    /// # Panics
    ///
    /// Panics if `count` is zero or exceeds the retained history; both are
    /// parser logic errors, not input errors.
    pub fn step_back(&mut self, count: usize) -> Codepoint {
        assert!(count > 0, "step_back requires a non-zero count");
        assert!(
            self.negative_offset + count <= self.history.len(),
            "step_back beyond retained history"
        );
        self.negative_offset += count;
        self.history[self.history.len() - self.negative_offset]
    }

    fn region_here(&self) -> Region {
        Region::at(self.next_position, self.source_path.clone())
    }

    fn next_byte(&mut self) -> Result<Option<u8>> {
        let byte = self
            .source
            .next_byte()
            .map_err(|e| Error::io(self.region_here(), &e))?;
        if byte.is_some() {
            self.next_offset += 1;
        }
        Ok(byte)
    }

    fn decode(&mut self) -> Result<Option<Codepoint>> {
        loop {
            let offset = self.next_offset;
            let Some(lead) = self.next_byte()? else {
                return Ok(None);
            };

            let len = match lead {
                0x00..=0x7F => 1,
                0xC2..=0xDF => 2,
                0xE0..=0xEF => 3,
                0xF0..=0xF4 => 4,
                _ => {
                    return Err(Error::encoding(
                        self.region_here(),
                        format!(
                            "Encountered invalid UTF-8 lead byte 0x{:02X} at byte offset {}",
                            lead, offset
                        ),
                    ))
                }
            };

            let mut buf = [lead, 0, 0, 0];
            for slot in buf.iter_mut().take(len).skip(1) {
                match self.next_byte()? {
                    Some(byte) if byte & 0xC0 == 0x80 => *slot = byte,
                    Some(byte) => {
                        return Err(Error::encoding(
                            self.region_here(),
                            format!(
                                "Encountered invalid UTF-8 continuation byte 0x{:02X} in sequence starting at byte offset {}",
                                byte, offset
                            ),
                        ))
                    }
                    None => {
                        return Err(Error::encoding(
                            self.region_here(),
                            format!(
                                "Encountered EOF inside a UTF-8 sequence starting at byte offset {}",
                                offset
                            ),
                        ))
                    }
                }
            }

            // Rejects overlong encodings and surrogates the lead-byte table lets through.
            let value = std::str::from_utf8(&buf[..len])
                .ok()
                .and_then(|s| s.chars().next())
                .ok_or_else(|| {
                    Error::encoding(
                        self.region_here(),
                        format!(
                            "Encountered invalid UTF-8 sequence at byte offset {}",
                            offset
                        ),
                    )
                })?;

            if offset == 0 && value == '\u{FEFF}' {
                continue;
            }

            let mut position = self.next_position;
            if !STRICT && self.last_char == Some('\r') && value != '\n' {
                position = position.next_line();
            }
            self.next_position = if value == '\n' {
                position.next_line()
            } else {
                position.next_column()
            };
            self.last_char = Some(value);

            return Ok(Some(Codepoint {
                value,
                position,
                offset,
            }));
        }
    }
}
