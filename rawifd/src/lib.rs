// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

//! Decoder for the directory structure of TIFF files and camera raw
//! formats built on TIFF, like Sony ARW. Given a file you get every
//! image file directory, its entries and typed fields, but no pixel data.
//!
//! # Example
//! ```rust,no_run
//! use rawifd::formats::tiff::{DecodeOptions, ImageKind};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!   let source = rawifd::load_file("sample.arw")?;
//!   let container = source.container(&DecodeOptions::from_env())?;
//!   for ifd in container.find_directories(ImageKind::Raw) {
//!     println!("raw image {:?}x{:?}", ifd.image_width(), ifd.image_length());
//!   }
//!   Ok(())
//! }
//! ```

#![deny(unstable_features)]

use std::path::Path;

use thiserror::Error;

pub mod bits;
pub mod formats;
pub mod rawsource;
pub mod tags;

mod envparams;

pub use formats::tiff::{Container, DecodeOptions, Directory, ImageKind, TiffError, Value};
pub use rawsource::RawSource;
pub use tags::TiffCommonTag;

#[derive(Error, Debug)]
pub enum RawIfdError {
  #[error("I/O error on file {path:?}: {source}")]
  Io {
    path: std::path::PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error(transparent)]
  Tiff(#[from] TiffError),
}

pub type Result<T> = std::result::Result<T, RawIfdError>;

impl RawIfdError {
  pub fn with_io_error(path: impl AsRef<Path>, error: std::io::Error) -> Self {
    Self::Io {
      path: path.as_ref().to_owned(),
      source: error,
    }
  }
}

/// Memory map a file and check for a TIFF header.
///
/// The returned source owns the bytes, decode it with
/// [`RawSource::container`].
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<RawSource> {
  let path = path.as_ref();
  let source = RawSource::new(path).map_err(|err| RawIfdError::with_io_error(path, err))?;
  formats::tiff::TiffHeader::parse(source.buf())?;
  Ok(source)
}

/// Load a file, only returning the number of top-level directories.
pub fn directory_count_file<P: AsRef<Path>>(path: P) -> Result<usize> {
  let source = load_file(path)?;
  let container = source.container(&DecodeOptions::from_env())?;
  Ok(container.directories().len())
}
