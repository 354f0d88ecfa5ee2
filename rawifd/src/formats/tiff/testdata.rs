// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

//! In-memory TIFF construction for unit tests.

use super::{MARKER_BIG, MARKER_LITTLE, TIFF_MAGIC};
use crate::bits::Endian;

/// Value field of an entry record
#[derive(Debug, Clone, Copy)]
pub(crate) enum Val {
  Short(u16),
  Long(u32),
  Raw([u8; 4]),
}

pub(crate) struct TiffBuilder {
  endian: Endian,
  buf: Vec<u8>,
}

impl TiffBuilder {
  pub(crate) fn new(endian: Endian) -> Self {
    let marker = if endian.little() { MARKER_LITTLE } else { MARKER_BIG };
    let mut b = Self { endian, buf: Vec::new() };
    b.put_u16(marker);
    b.put_u16(TIFF_MAGIC);
    b.put_u32(0);
    b
  }

  fn put_u16(&mut self, v: u16) {
    let mut tmp = [0; 2];
    self.endian.write_u16(&mut tmp, v);
    self.buf.extend_from_slice(&tmp);
  }

  fn put_u32(&mut self, v: u32) {
    let mut tmp = [0; 4];
    self.endian.write_u32(&mut tmp, v);
    self.buf.extend_from_slice(&tmp);
  }

  fn align(&mut self) {
    if self.buf.len() % 2 == 1 {
      self.buf.push(0);
    }
  }

  /// Append out-of-line value bytes, returns their offset.
  pub(crate) fn add_data(&mut self, data: &[u8]) -> u32 {
    self.align();
    let offset = self.buf.len() as u32;
    self.buf.extend_from_slice(data);
    offset
  }

  /// Append a directory of `(tag, type code, count, value)` records.
  pub(crate) fn add_ifd(&mut self, entries: &[(u16, u16, u32, Val)], next: u32) -> u32 {
    self.align();
    let offset = self.buf.len() as u32;
    self.put_u16(entries.len() as u16);
    for (tag, typ, count, val) in entries {
      self.put_u16(*tag);
      self.put_u16(*typ);
      self.put_u32(*count);
      match val {
        Val::Short(v) => {
          self.put_u16(*v);
          self.put_u16(0);
        }
        Val::Long(v) => self.put_u32(*v),
        Val::Raw(v) => self.buf.extend_from_slice(v),
      }
    }
    self.put_u32(next);
    offset
  }

  /// Patch the header's first directory offset and return the buffer.
  pub(crate) fn finish(mut self, first_ifd: u32) -> Vec<u8> {
    let mut tmp = [0; 4];
    self.endian.write_u32(&mut tmp, first_ifd);
    self.buf[4..8].copy_from_slice(&tmp);
    self.buf
  }
}
