// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

// This module contains only basic TIFF directory decoding. Everything works on
// borrowed views into one in-memory buffer: directories and entries never copy
// value bytes, so they can not outlive the buffer they were decoded from.

use thiserror::Error;

pub mod classify;
pub mod entry;
pub mod file;
pub mod ifd;
pub mod reader;
pub mod value;

#[cfg(test)]
pub(crate) mod testdata;

pub use classify::ImageKind;
pub use entry::{DecodedEntry, RawEntry};
pub use file::{Container, TiffHeader, is_tiff};
pub use ifd::{Directory, SkipReason, SkippedEntry, decode_directory};
pub use reader::EndianReader;
pub use value::{DoubleValue, PrimitiveType, Rational, SRational, Value, convert};

pub(crate) const TIFF_MAGIC: u16 = 42;

/// Byte order marker for little endian files ("II")
pub(crate) const MARKER_LITTLE: u16 = 0x4949;

/// Byte order marker for big endian files ("MM")
pub(crate) const MARKER_BIG: u16 = 0x4d4d;

/// Size of one directory entry record
pub(crate) const ENTRY_SIZE: usize = 12;

pub const DEFAULT_MAX_DIRECTORIES: usize = 1024;
pub const DEFAULT_MAX_SUB_DEPTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, enumn::N)]
#[repr(u16)]
#[allow(clippy::upper_case_acronyms)]
pub enum CompressionMethod {
  None = 1,
  Huffman = 2,
  Fax3 = 3,
  Fax4 = 4,
  LZW = 5,
  JPEG = 6,
  // "Extended JPEG" or "new JPEG" style
  ModernJPEG = 7,
  Deflate = 8,
  // Sony ARW compressed raw
  SonyARW = 32767,
  PackBits = 0x8005,
  OldDeflate = 0x80B2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, enumn::N)]
#[repr(u16)]
#[allow(clippy::upper_case_acronyms)]
pub enum PhotometricInterpretation {
  WhiteIsZero = 0,
  BlackIsZero = 1,
  RGB = 2,
  RGBPalette = 3,
  TransparencyMask = 4,
  CMYK = 5,
  YCbCr = 6,
  CIELab = 8,
  // Defined by DNG
  CFA = 32803,
  LinearRaw = 34892,
}

/// Error variants for TIFF decoding
#[derive(Debug, Error)]
pub enum TiffError {
  #[error("Invalid byte order marker: 0x{:04x}", _0)]
  InvalidByteOrder(u16),

  #[error("Not a TIFF file, magic number is {}", _0)]
  NotATiff(u16),

  /// A read would run past the end of the buffer
  #[error("Truncated buffer: {len} bytes at offset {offset}, buffer size is {size}")]
  Truncated { offset: usize, len: usize, size: usize },

  /// A value slice is shorter than its type requires
  #[error("Value too short: need {expected} bytes, got {actual}")]
  ValueTooShort { expected: usize, actual: usize },

  #[error("Unknown field type: {}", _0)]
  UnknownType(u16),

  #[error("Missing required field: {}", _0)]
  MissingRequiredField(&'static str),

  #[error("Malformed directory chain at offset {offset}: {reason}")]
  MalformedChain { offset: u32, reason: String },

  #[error("Invalid date/time value: {}", _0)]
  InvalidDateTime(String),

  #[error("Field {tag} has wrong type, expected {expected}")]
  TypeMismatch { tag: &'static str, expected: &'static str },
}

/// Result type for TIFF decoding
pub type Result<T> = std::result::Result<T, TiffError>;

/// Limits and switches for a decode run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
  /// Upper bound for all directories decoded from one buffer,
  /// top-level chain and sub-directories together.
  pub max_directories: usize,
  /// Upper bound for SubIFDs nesting.
  pub max_sub_depth: usize,
  /// Follow every offset of a SubIFDs entry instead of the first one.
  pub follow_all_sub_ifds: bool,
}

impl Default for DecodeOptions {
  fn default() -> Self {
    Self {
      max_directories: DEFAULT_MAX_DIRECTORIES,
      max_sub_depth: DEFAULT_MAX_SUB_DEPTH,
      follow_all_sub_ifds: false,
    }
  }
}

impl DecodeOptions {
  /// Defaults, overridden by `RAWIFD_*` environment variables.
  pub fn from_env() -> Self {
    let defaults = Self::default();
    Self {
      max_directories: crate::envparams::rawifd_max_directories().unwrap_or(defaults.max_directories),
      max_sub_depth: crate::envparams::rawifd_max_sub_depth().unwrap_or(defaults.max_sub_depth),
      follow_all_sub_ifds: crate::envparams::rawifd_follow_all_subifds(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn enums_from_field_values() {
    assert_eq!(CompressionMethod::n(7), Some(CompressionMethod::ModernJPEG));
    assert_eq!(CompressionMethod::n(32767), Some(CompressionMethod::SonyARW));
    assert_eq!(PhotometricInterpretation::n(32803), Some(PhotometricInterpretation::CFA));
    assert_eq!(PhotometricInterpretation::n(7), None);
  }

  #[test]
  fn error_messages() {
    assert_eq!(TiffError::InvalidByteOrder(0x1234).to_string(), "Invalid byte order marker: 0x1234");
    assert_eq!(TiffError::NotATiff(43).to_string(), "Not a TIFF file, magic number is 43");
  }
}
