// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use super::{Result, TiffError};
use crate::bits::Endian;

/// Bounds checked, endian aware random access over the container buffer.
///
/// Every read is positioned by an absolute offset, there is no cursor.
/// Reads past the end of the buffer fail with [`TiffError::Truncated`].
#[derive(Debug, Clone, Copy)]
pub struct EndianReader<'a> {
  endian: Endian,
  buf: &'a [u8],
}

impl<'a> EndianReader<'a> {
  pub fn new(buf: &'a [u8], endian: Endian) -> Self {
    Self { endian, buf }
  }

  pub fn endian(&self) -> Endian {
    self.endian
  }

  pub fn buf(&self) -> &'a [u8] {
    self.buf
  }

  pub fn len(&self) -> usize {
    self.buf.len()
  }

  pub fn is_empty(&self) -> bool {
    self.buf.is_empty()
  }

  /// Borrow `len` bytes at `offset`.
  pub fn subview(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
    offset
      .checked_add(len)
      .and_then(|end| self.buf.get(offset..end))
      .ok_or(TiffError::Truncated {
        offset,
        len,
        size: self.buf.len(),
      })
  }

  pub fn read_u16(&self, offset: usize) -> Result<u16> {
    let data = self.subview(offset, 2)?;
    Ok(self.endian.read_u16(data, 0))
  }

  pub fn read_u32(&self, offset: usize) -> Result<u32> {
    let data = self.subview(offset, 4)?;
    Ok(self.endian.read_u32(data, 0))
  }
}
