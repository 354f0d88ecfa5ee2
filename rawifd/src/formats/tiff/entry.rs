// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use log::debug;
use serde::Serialize;

use super::{ENTRY_SIZE, EndianReader, Result, TiffError, Value, value::PrimitiveType, value::convert};
use crate::bits::Endian;

/// One directory entry, its value bytes borrowed from the container buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RawEntry<'a> {
  pub tag: u16,
  pub typ: PrimitiveType,
  pub count: u32,
  /// Absolute position of the value bytes, either inside the
  /// entry record itself or somewhere else in the buffer.
  pub data_offset: usize,
  #[serde(skip)]
  pub data: &'a [u8],
  #[serde(skip)]
  pub endian: Endian,
}

/// Outcome of decoding one 12-byte entry record
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecodedEntry<'a> {
  Known(RawEntry<'a>),
  /// Type code outside 1..=12, the value can not be located.
  UnknownType { tag: u16, type_code: u16, count: u32 },
}

impl<'a> RawEntry<'a> {
  /// Decode the entry record at `offset`.
  ///
  /// Returns the entry and the position of the next record, which is
  /// always `offset + 12` no matter where the value lives.
  pub fn parse(reader: &EndianReader<'a>, offset: usize) -> Result<(DecodedEntry<'a>, usize)> {
    // Make sure the full record is there before looking at any field
    reader.subview(offset, ENTRY_SIZE)?;
    let next = offset + ENTRY_SIZE;

    let tag = reader.read_u16(offset)?;
    let type_code = reader.read_u16(offset + 2)?;
    let count = reader.read_u32(offset + 4)?;

    debug!("Tag: {:#x}, Typ: {:#x}, count: {}", tag, type_code, count);

    let typ = match PrimitiveType::try_from(type_code) {
      Ok(typ) => typ,
      Err(err) => {
        debug!("Tag {:#x}: {}", tag, err);
        return Ok((DecodedEntry::UnknownType { tag, type_code, count }, next));
      }
    };

    let bytesize = (count as usize).checked_mul(typ.width()).ok_or(TiffError::Truncated {
      offset,
      len: usize::MAX,
      size: reader.len(),
    })?;
    let data_offset = if bytesize <= 4 {
      offset + 8
    } else {
      reader.read_u32(offset + 8)? as usize
    };
    let data = reader.subview(data_offset, bytesize)?;

    Ok((
      DecodedEntry::Known(RawEntry {
        tag,
        typ,
        count,
        data_offset,
        data,
        endian: reader.endian(),
      }),
      next,
    ))
  }

  /// Value stored inline in the entry record
  pub fn is_inline(&self) -> bool {
    self.byte_size() <= 4
  }

  pub fn byte_size(&self) -> usize {
    self.data.len()
  }

  pub fn type_name(&self) -> &'static str {
    self.typ.name()
  }

  /// First value of the entry, see [`convert`].
  pub fn value(&self) -> Result<Value<'a>> {
    convert(self.typ, self.data, self.endian)
  }

  /// All values of the entry. Text and byte types yield a single value
  /// covering all bytes.
  pub fn values(&self) -> Result<Vec<Value<'a>>> {
    match self.typ {
      PrimitiveType::Ascii | PrimitiveType::Byte | PrimitiveType::SByte | PrimitiveType::Undefined => Ok(vec![self.value()?]),
      typ => self.data.chunks_exact(typ.width()).map(|chunk| convert(typ, chunk, self.endian)).collect(),
    }
  }

  /// SHORT or LONG array as `u32`, e.g. StripOffsets.
  pub fn u32_values(&self) -> Result<Vec<u32>> {
    match self.typ {
      PrimitiveType::Short => Ok(self.data.chunks_exact(2).map(|c| self.endian.read_u16(c, 0) as u32).collect()),
      PrimitiveType::Long => Ok(self.data.chunks_exact(4).map(|c| self.endian.read_u32(c, 0)).collect()),
      _ => Err(TiffError::TypeMismatch {
        tag: crate::tags::tag_label(self.tag).unwrap_or("unknown"),
        expected: "SHORT or LONG",
      }),
    }
  }

  /// Short textual representation of at most `limit` values.
  pub fn visual_rep(&self, limit: usize) -> String {
    match self.values() {
      Ok(values) => {
        let mut out: Vec<String> = values.iter().take(limit).map(ToString::to_string).collect();
        if values.len() > limit {
          out.push("...".into());
        }
        out.join(" ")
      }
      Err(err) => format!("<{}>", err),
    }
  }
}
