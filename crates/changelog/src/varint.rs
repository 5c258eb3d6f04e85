//! Tag-byte variable-width integers and strings.
//!
//! Every change-set blob is a sequence of values in this encoding. The first
//! byte `b` of an integer selects its width:
//!
//! ```text
//! b in 0..=30     value = b                                  (1 byte)
//! b == 31         value = next 4 bytes, big-endian            (5 bytes)
//! b in 32..=63    value = (b - 32) << 16 | next 2 bytes BE    (3 bytes)
//! b in 64..=127   value = (b - 64) << 24 | next 3 bytes BE    (4 bytes)
//! b in 128..=191  value = b - 128                             (1 byte)
//! b in 192..=255  value = (b - 192) << 8 | next byte          (2 bytes)
//! ```
//!
//! A string is a varint length followed by that many UTF-8 bytes. An
//! optional string is a flag byte (non-zero = present) followed by a string
//! when present.
//!
//! Long values use the integer encoding and are widened after decoding, so a
//! long never carries more than 32 bits.

use crate::error::VarIntError;

/// Sequential decoder over one blob.
#[derive(Debug, Clone)]
pub struct VarIntReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> VarIntReader<'a> {
    /// Decode from the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        VarIntReader { data, offset: 0 }
    }

    /// Current read position
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Whether unread bytes remain
    pub fn has_more(&self) -> bool {
        self.offset < self.data.len()
    }

    /// Consume `n` bytes, leaving the position unchanged on failure.
    fn take(&mut self, n: usize) -> Result<&'a [u8], VarIntError> {
        let available = self.data.len().saturating_sub(self.offset);
        if n > available {
            return Err(VarIntError::UnexpectedEof {
                offset: self.offset,
                needed: n,
                available,
            });
        }
        let bytes = &self.data[self.offset..self.offset + n];
        self.offset += n;
        Ok(bytes)
    }

    /// Decode one integer.
    pub fn read_varint(&mut self) -> Result<i32, VarIntError> {
        let start = self.offset;
        let b = self.take(1)?[0] as i32;

        let rest = match b {
            0..=30 => return Ok(b),
            31 => 4,
            32..=63 => 2,
            64..=127 => 3,
            128..=191 => return Ok(b - 128),
            _ => 1,
        };

        let tail = match self.take(rest) {
            Ok(tail) => tail,
            Err(e) => {
                self.offset = start;
                return Err(e);
            }
        };
        let low = tail.iter().fold(0u32, |acc, &byte| (acc << 8) | byte as u32) as i32;

        Ok(match b {
            31 => low,
            32..=63 => ((b - 32) << 16) | low,
            64..=127 => ((b - 64) << 24) | low,
            _ => ((b - 192) << 8) | low,
        })
    }

    /// Decode one long, stored as an integer.
    pub fn read_varlong(&mut self) -> Result<i64, VarIntError> {
        self.read_varint().map(i64::from)
    }

    /// Decode a length-prefixed string, replacing invalid UTF-8.
    pub fn read_string(&mut self) -> Result<String, VarIntError> {
        let offset = self.offset;
        let length = self.read_varint()?;
        if length < 0 {
            return Err(VarIntError::NegativeLength { offset, length });
        }
        let bytes = self.take(length as usize)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Decode a flag byte and, when set, a string.
    pub fn read_optional_string(&mut self) -> Result<Option<String>, VarIntError> {
        if self.read_bool()? {
            self.read_string().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Decode a single flag byte.
    pub fn read_bool(&mut self) -> Result<bool, VarIntError> {
        Ok(self.take(1)?[0] != 0)
    }
}

/// Encoder producing bytes [`VarIntReader`] decodes.
#[derive(Debug, Clone, Default)]
pub struct VarIntWriter {
    buf: Vec<u8>,
}

impl VarIntWriter {
    /// Empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode `value` in the shortest form.
    pub fn write_varint(&mut self, value: i32) -> &mut Self {
        let v = value as u32;
        if (0..64).contains(&value) {
            self.buf.push(128 + v as u8);
        } else if (0..1 << 14).contains(&value) {
            self.buf.extend_from_slice(&[192 + (v >> 8) as u8, v as u8]);
        } else if (0..1 << 21).contains(&value) {
            self.buf
                .extend_from_slice(&[32 + (v >> 16) as u8, (v >> 8) as u8, v as u8]);
        } else if (0..1 << 30).contains(&value) {
            self.buf.extend_from_slice(&[
                64 + (v >> 24) as u8,
                (v >> 16) as u8,
                (v >> 8) as u8,
                v as u8,
            ]);
        } else {
            self.buf.push(31);
            self.buf.extend_from_slice(&v.to_be_bytes());
        }
        self
    }

    /// Encode a length-prefixed string.
    pub fn write_string(&mut self, s: &str) -> &mut Self {
        self.write_varint(s.len() as i32);
        self.buf.extend_from_slice(s.as_bytes());
        self
    }

    /// Encode a flag byte and, when present, a string.
    pub fn write_optional_string(&mut self, s: Option<&str>) -> &mut Self {
        match s {
            Some(s) => {
                self.write_bool(true);
                self.write_string(s)
            }
            None => self.write_bool(false),
        }
    }

    /// Encode a flag byte.
    pub fn write_bool(&mut self, value: bool) -> &mut Self {
        self.buf.push(value as u8);
        self
    }

    /// Append bytes verbatim.
    pub fn write_raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Bytes written so far
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the writer
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}
