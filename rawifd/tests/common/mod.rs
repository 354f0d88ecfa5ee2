// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use rawifd::bits::Endian;

pub(crate) fn init_test_logger() {
  let _ = env_logger::builder().is_test(true).try_init();
}

/// One 12 byte entry record, `value` holds the 4 raw value/offset bytes.
pub(crate) struct Entry {
  pub tag: u16,
  pub typ: u16,
  pub count: u32,
  pub value: [u8; 4],
}

/// Builds TIFF files in memory, directories and data blobs are appended
/// in call order.
pub(crate) struct TiffWriter {
  pub endian: Endian,
  buf: Vec<u8>,
}

impl TiffWriter {
  pub fn new(endian: Endian) -> Self {
    let mut w = Self { endian, buf: Vec::new() };
    w.buf.extend_from_slice(if endian.little() { b"II" } else { b"MM" });
    w.put_u16(42);
    w.put_u32(0);
    w
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

  pub fn short(&self, tag: u16, v: u16) -> Entry {
    let mut value = [0; 4];
    self.endian.write_u16(&mut value[..2], v);
    Entry { tag, typ: 3, count: 1, value }
  }

  pub fn long(&self, tag: u16, v: u32) -> Entry {
    self.with_offset(tag, 4, 1, v)
  }

  pub fn with_offset(&self, tag: u16, typ: u16, count: u32, offset: u32) -> Entry {
    let mut value = [0; 4];
    self.endian.write_u32(&mut value, offset);
    Entry { tag, typ, count, value }
  }

  pub fn data(&mut self, data: &[u8]) -> u32 {
    if self.buf.len() % 2 == 1 {
      self.buf.push(0);
    }
    let offset = self.buf.len() as u32;
    self.buf.extend_from_slice(data);
    offset
  }

  pub fn ascii(&mut self, tag: u16, text: &str) -> Entry {
    let mut bytes = text.as_bytes().to_vec();
    bytes.push(0);
    if bytes.len() <= 4 {
      let mut value = [0; 4];
      value[..bytes.len()].copy_from_slice(&bytes);
      return Entry {
        tag,
        typ: 2,
        count: bytes.len() as u32,
        value,
      };
    }
    let offset = self.data(&bytes);
    self.with_offset(tag, 2, bytes.len() as u32, offset)
  }

  pub fn ifd(&mut self, entries: &[Entry], next: u32) -> u32 {
    if self.buf.len() % 2 == 1 {
      self.buf.push(0);
    }
    let offset = self.buf.len() as u32;
    self.put_u16(entries.len() as u16);
    for e in entries {
      self.put_u16(e.tag);
      self.put_u16(e.typ);
      self.put_u32(e.count);
      self.buf.extend_from_slice(&e.value);
    }
    self.put_u32(next);
    offset
  }

  pub fn finish(mut self, first_ifd: u32) -> Vec<u8> {
    let mut tmp = [0; 4];
    self.endian.write_u32(&mut tmp, first_ifd);
    self.buf[4..8].copy_from_slice(&tmp);
    self.buf
  }
}

/// A small ARW like file: a JPEG preview IFD0 with one raw SubIFD and a
/// thumbnail IFD1.
pub(crate) fn arw_like(endian: Endian) -> Vec<u8> {
  let mut w = TiffWriter::new(endian);

  let raw_entries = [
    w.long(256, 6048),
    w.long(257, 4024),
    w.short(258, 14),
    w.short(259, 32767),
    w.short(262, 32803),
    w.short(277, 1),
  ];
  let raw = w.ifd(&raw_entries, 0);

  let thumb_entries = [w.short(256, 160), w.short(257, 120), w.short(259, 6)];
  let thumb = w.ifd(&thumb_entries, 0);

  let double_off = w.data(&to_endian_f64(endian, 2.5));

  let make = w.ascii(271, "SONY");
  let model = w.ascii(272, "ILCE-7M3");
  let date = w.ascii(306, "2021:07:14 18:03:59");
  let preview_entries = [
    w.short(254, 1),
    w.short(259, 6),
    make,
    model,
    w.short(274, 1),
    date,
    w.long(330, raw),
    // Unknown type code, must be skipped
    w.with_offset(0x7777, 99, 1, 0),
    w.with_offset(0xA500, 12, 1, double_off),
  ];
  let ifd0 = w.ifd(&preview_entries, thumb);
  w.finish(ifd0)
}

pub(crate) fn to_endian_f64(endian: Endian, v: f64) -> [u8; 8] {
  if endian.little() { v.to_le_bytes() } else { v.to_be_bytes() }
}
