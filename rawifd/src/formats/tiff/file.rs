// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use log::debug;
use serde::Serialize;

use super::{
  DecodeOptions, Directory, EndianReader, ImageKind, MARKER_BIG, MARKER_LITTLE, Result, TIFF_MAGIC, TiffError, ifd::ChainGuard,
};
use crate::bits::Endian;

/// The 8 byte file header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TiffHeader {
  pub endian: Endian,
  pub first_ifd: u32,
}

impl TiffHeader {
  pub fn parse(buf: &[u8]) -> Result<Self> {
    // The marker is symmetric, reading it in either order gives the same value
    let marker = EndianReader::new(buf, Endian::Little).read_u16(0)?;
    let endian = match marker {
      MARKER_LITTLE => Endian::Little,
      MARKER_BIG => Endian::Big,
      _ => return Err(TiffError::InvalidByteOrder(marker)),
    };
    let reader = EndianReader::new(buf, endian);
    let magic = reader.read_u16(2)?;
    if magic != TIFF_MAGIC {
      return Err(TiffError::NotATiff(magic));
    }
    Ok(Self {
      endian,
      first_ifd: reader.read_u32(4)?,
    })
  }
}

/// Check if the buffer starts with a valid TIFF header.
pub fn is_tiff(buf: &[u8]) -> bool {
  TiffHeader::parse(buf).is_ok()
}

/// A decoded container, every directory borrowing from `buf`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Container<'a> {
  #[serde(skip)]
  buf: &'a [u8],
  pub endian: Endian,
  pub first_ifd: u32,
  pub directories: Vec<Directory<'a>>,
}

impl<'a> Container<'a> {
  pub fn decode(buf: &'a [u8]) -> Result<Self> {
    Self::decode_with_options(buf, &DecodeOptions::default())
  }

  /// Validate the header and follow the directory chain until a zero
  /// next offset. Directories appear in chain order.
  pub fn decode_with_options(buf: &'a [u8], options: &DecodeOptions) -> Result<Self> {
    let header = TiffHeader::parse(buf)?;
    debug!("TIFF header: {:?}, buffer size {}", header, buf.len());

    let reader = EndianReader::new(buf, header.endian);
    let mut guard = ChainGuard::new(options);
    let directories = Directory::decode_chain(&reader, header.first_ifd, &mut guard, 0)?;
    debug!("Decoded {} top-level directories", directories.len());

    Ok(Self {
      buf,
      endian: header.endian,
      first_ifd: header.first_ifd,
      directories,
    })
  }

  pub fn buffer(&self) -> &'a [u8] {
    self.buf
  }

  pub fn endian(&self) -> Endian {
    self.endian
  }

  pub fn directories(&self) -> &[Directory<'a>] {
    &self.directories
  }

  /// First directory of the chain, usually the main image or a preview.
  pub fn root_ifd(&self) -> Option<&Directory<'a>> {
    self.directories.first()
  }

  /// All directories, each followed by its sub-directories, depth first.
  pub fn walk(&self) -> Vec<&Directory<'a>> {
    fn visit<'d, 'a>(ifd: &'d Directory<'a>, out: &mut Vec<&'d Directory<'a>>) {
      out.push(ifd);
      for sub in ifd.sub_ifds() {
        visit(sub, out);
      }
    }
    let mut out = Vec::new();
    for ifd in &self.directories {
      visit(ifd, &mut out);
    }
    out
  }

  pub fn find_directories(&self, kind: ImageKind) -> Vec<&Directory<'a>> {
    self.walk().into_iter().filter(|ifd| ifd.classify() == kind).collect()
  }

  pub fn dump(&self, limit: usize) -> Vec<String> {
    let mut out = Vec::new();
    out.push(format!("Byte order: {:?}, first IFD at {:#x}", self.endian, self.first_ifd));
    for (i, ifd) in self.directories.iter().enumerate() {
      out.push(format!("IFD({}) at {:#x}, next {:#x}", i, ifd.offset(), ifd.next_offset()));
      out.extend(ifd.dump(limit));
    }
    out
  }
}
