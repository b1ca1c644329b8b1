//! Schema-less MessagePack decoding.
//!
//! The game server packs every frame as one MessagePack value. Decoding is a
//! single recursive pass driven by the tag byte at the cursor; trailing bytes
//! after the first complete value are ignored.

use itertools::Itertools;
use tracing::warn;

mod value;

pub use value::Value;

const MAX_DEPTH: usize = 64;
const PREVIEW_BYTES: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("unexpected end of data at offset {offset}: needed {needed} more bytes")]
    UnexpectedEof { offset: usize, needed: usize },
    #[error("reserved tag 0x{tag:02x} at offset {offset}")]
    ReservedTag { offset: usize, tag: u8 },
    #[error("nesting too deep at offset {offset}")]
    DepthLimit { offset: usize },
}

impl DecodeError {
    pub fn offset(&self) -> usize {
        match self {
            DecodeError::UnexpectedEof { offset, .. }
            | DecodeError::ReservedTag { offset, .. }
            | DecodeError::DepthLimit { offset } => *offset,
        }
    }
}

/// Decodes one frame, logging and swallowing any failure.
pub fn decode(bytes: &[u8]) -> Option<Value> {
    match try_decode(bytes) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(
                offset = err.offset(),
                size = bytes.len(),
                preview = %hex_preview(bytes, PREVIEW_BYTES),
                "messagepack decode failed: {err}"
            );
            None
        }
    }
}

pub fn try_decode(bytes: &[u8]) -> Result<Value, DecodeError> {
    Reader::new(bytes).read_value(0)
}

/// Space separated lowercase hex of the first `limit` bytes.
pub fn hex_preview(bytes: &[u8], limit: usize) -> String {
    bytes
        .iter()
        .take(limit)
        .map(|b| format!("{b:02x}"))
        .join(" ")
}

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < len {
            return Err(DecodeError::UnexpectedEof {
                offset: self.offset,
                needed: len - self.remaining(),
            });
        }
        let slice = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.array::<1>()?[0])
    }

    fn u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_be_bytes(self.array()?))
    }

    fn u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_be_bytes(self.array()?))
    }

    fn u64(&mut self) -> Result<u64, DecodeError> {
        let high = u64::from(self.u32()?);
        let low = u64::from(self.u32()?);
        Ok((high << 32) | low)
    }

    fn read_value(&mut self, depth: usize) -> Result<Value, DecodeError> {
        if depth > MAX_DEPTH {
            return Err(DecodeError::DepthLimit {
                offset: self.offset,
            });
        }
        let tag_offset = self.offset;
        let tag = self.u8()?;
        let value = match tag {
            0x00..=0x7f => Value::Int(i64::from(tag)),
            0x80..=0x8f => self.read_map(usize::from(tag & 0x0f), depth)?,
            0x90..=0x9f => self.read_array(usize::from(tag & 0x0f), depth)?,
            0xa0..=0xbf => self.read_string(usize::from(tag & 0x1f))?,
            0xc0 => Value::Nil,
            0xc1 => {
                return Err(DecodeError::ReservedTag {
                    offset: tag_offset,
                    tag,
                });
            }
            0xc2 => Value::Bool(false),
            0xc3 => Value::Bool(true),
            0xc4 => {
                let len = usize::from(self.u8()?);
                Value::Binary(self.take(len)?.to_vec())
            }
            0xc5 => {
                let len = usize::from(self.u16()?);
                Value::Binary(self.take(len)?.to_vec())
            }
            0xc6 => {
                let len = self.u32()? as usize;
                Value::Binary(self.take(len)?.to_vec())
            }
            0xc7 => {
                let len = u32::from(self.u8()?);
                self.skip_ext(len)?
            }
            0xc8 => {
                let len = u32::from(self.u16()?);
                self.skip_ext(len)?
            }
            0xc9 => {
                let len = self.u32()?;
                self.skip_ext(len)?
            }
            0xca => Value::Float(f64::from(f32::from_bits(self.u32()?))),
            0xcb => Value::Float(f64::from_bits(self.u64()?)),
            0xcc => Value::Int(i64::from(self.u8()?)),
            0xcd => Value::Int(i64::from(self.u16()?)),
            0xce => Value::Int(i64::from(self.u32()?)),
            0xcf => {
                let raw = self.u64()?;
                i64::try_from(raw).map_or(Value::UInt(raw), Value::Int)
            }
            0xd0 => Value::Int(i64::from(self.u8()? as i8)),
            0xd1 => Value::Int(i64::from(self.u16()? as i16)),
            0xd2 => Value::Int(i64::from(self.u32()? as i32)),
            0xd3 => Value::Int(self.u64()? as i64),
            0xd4 => self.skip_ext(1)?,
            0xd5 => self.skip_ext(2)?,
            0xd6 => self.skip_ext(4)?,
            0xd7 => self.skip_ext(8)?,
            0xd8 => self.skip_ext(16)?,
            0xd9 => {
                let len = usize::from(self.u8()?);
                self.read_string(len)?
            }
            0xda => {
                let len = usize::from(self.u16()?);
                self.read_string(len)?
            }
            0xdb => {
                let len = self.u32()? as usize;
                self.read_string(len)?
            }
            0xdc => {
                let len = usize::from(self.u16()?);
                self.read_array(len, depth)?
            }
            0xdd => {
                let len = self.u32()? as usize;
                self.read_array(len, depth)?
            }
            0xde => {
                let len = usize::from(self.u16()?);
                self.read_map(len, depth)?
            }
            0xdf => {
                let len = self.u32()? as usize;
                self.read_map(len, depth)?
            }
            0xe0..=0xff => Value::Int(i64::from(tag as i8)),
        };
        Ok(value)
    }

    fn read_string(&mut self, len: usize) -> Result<Value, DecodeError> {
        let raw = self.take(len)?;
        Ok(Value::String(String::from_utf8_lossy(raw).into_owned()))
    }

    fn read_array(&mut self, len: usize, depth: usize) -> Result<Value, DecodeError> {
        // every element needs at least one byte, so never reserve past the input
        let mut items = Vec::with_capacity(len.min(self.remaining()));
        for _ in 0..len {
            items.push(self.read_value(depth + 1)?);
        }
        Ok(Value::Array(items))
    }

    fn read_map(&mut self, len: usize, depth: usize) -> Result<Value, DecodeError> {
        let mut entries = Vec::with_capacity(len.min(self.remaining() / 2));
        for _ in 0..len {
            let key = self.read_value(depth + 1)?;
            let value = self.read_value(depth + 1)?;
            entries.push((key, value));
        }
        Ok(Value::Map(entries))
    }

    fn skip_ext(&mut self, len: u32) -> Result<Value, DecodeError> {
        let type_id = self.u8()? as i8;
        self.take(len as usize)?;
        Ok(Value::Ext { type_id, len })
    }
}
