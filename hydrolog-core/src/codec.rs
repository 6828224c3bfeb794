//! Word-level reading for packed records.
//!
//! Records are sequences of 16-bit words. Fluid records are variable length
//! and concatenated without separators, so decoding walks a cursor over the
//! buffer instead of slicing text.

use thiserror::Error;

/// Errors raised when a buffer cannot be parsed at all.
///
/// Malformed domain values never produce these; they are clamped instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unexpected end of data at word {offset}: needed {needed} more word(s), {available} left")]
    UnexpectedEnd {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("malformed {record} record: {len} word(s) is not a valid length")]
    MalformedLength { record: &'static str, len: usize },
}

/// Cursor over a word buffer.
#[derive(Debug, Clone)]
pub struct WordReader<'a> {
    words: &'a [u16],
    position: usize,
}

impl<'a> WordReader<'a> {
    pub fn new(words: &'a [u16]) -> Self {
        Self { words, position: 0 }
    }

    /// Starts reading at `offset` instead of the front of the buffer.
    pub fn at(words: &'a [u16], offset: usize) -> Self {
        Self {
            words,
            position: offset.min(words.len()),
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.words.len() - self.position
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_word(&mut self) -> Result<u16, DecodeError> {
        Ok(self.read_words(1)?[0])
    }

    /// Consumes exactly `n` words or fails without moving the cursor.
    pub fn read_words(&mut self, n: usize) -> Result<&'a [u16], DecodeError> {
        if n > self.remaining() {
            return Err(DecodeError::UnexpectedEnd {
                offset: self.position,
                needed: n,
                available: self.remaining(),
            });
        }
        let start = self.position;
        self.position += n;
        Ok(&self.words[start..self.position])
    }
}

/// Extracts `width` bits starting at bit `shift`.
pub(crate) fn bits(word: u16, shift: u32, width: u32) -> u16 {
    (word >> shift) & ((1u16 << width) - 1)
}

pub(crate) fn flag(word: u16, bit: u32) -> bool {
    bits(word, bit, 1) == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_words_in_order() {
        let buf = [1, 2, 3, 4];
        let mut reader = WordReader::new(&buf);
        assert_eq!(reader.read_word().unwrap(), 1);
        assert_eq!(reader.read_words(2).unwrap(), &[2, 3]);
        assert_eq!(reader.position(), 3);
        assert_eq!(reader.remaining(), 1);
        assert!(!reader.is_empty());
    }

    #[test]
    fn test_short_read_fails_without_consuming() {
        let buf = [7, 8];
        let mut reader = WordReader::new(&buf);
        let err = reader.read_words(3).unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnexpectedEnd {
                offset: 0,
                needed: 3,
                available: 2
            }
        );
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_reader_at_offset() {
        let buf = [1, 2, 3];
        let mut reader = WordReader::at(&buf, 2);
        assert_eq!(reader.read_word().unwrap(), 3);
        assert!(reader.is_empty());
        assert!(reader.read_word().is_err());
    }

    #[test]
    fn test_bits() {
        let word = 0b1_0110010_000_10101u16;
        assert!(flag(word, 15));
        assert_eq!(bits(word, 8, 7), 0b0110010);
        assert_eq!(bits(word, 0, 5), 0b10101);
    }

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::MalformedLength {
            record: "daily log",
            len: 9,
        };
        assert_eq!(
            err.to_string(),
            "malformed daily log record: 9 word(s) is not a valid length"
        );
    }
}
