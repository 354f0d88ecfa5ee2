// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use std::{
  fmt::Debug,
  fs::File,
  ops::Deref,
  path::{Path, PathBuf},
  sync::Arc,
};

use memmap2::MmapOptions;

use crate::formats::tiff::{Container, DecodeOptions, Result};

/// Owner of the bytes a [`Container`] borrows from, either a memory
/// mapped file or an in-memory copy.
pub struct RawSource {
  path: PathBuf,
  inner: RawSourceImpl,
}

enum RawSourceImpl {
  Memmap(memmap2::Mmap),
  Memory(Arc<Vec<u8>>),
}

impl RawSource {
  pub fn new(path: &Path) -> std::io::Result<Self> {
    let file = File::open(path)?;
    // SAFETY: the mapping is read only, the file is expected to stay unmodified while decoding
    let mmap = unsafe { MmapOptions::new().map(&file)? };
    #[cfg(unix)]
    mmap.advise(memmap2::Advice::WillNeed)?;
    Ok(Self {
      path: path.canonicalize().unwrap_or_else(|_| path.to_owned()),
      inner: RawSourceImpl::Memmap(mmap),
    })
  }

  pub fn new_from_shared_vec(buf: Arc<Vec<u8>>) -> Self {
    Self {
      path: PathBuf::default(),
      inner: RawSourceImpl::Memory(buf),
    }
  }

  pub fn new_from_slice(buf: &[u8]) -> Self {
    Self::new_from_shared_vec(Arc::new(Vec::from(buf)))
  }

  pub fn with_path(self, path: impl AsRef<Path>) -> Self {
    Self {
      path: path.as_ref().to_owned(),
      inner: self.inner,
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn buf(&self) -> &[u8] {
    self.deref()
  }

  /// Decode the directory structure of this source.
  pub fn container(&self, options: &DecodeOptions) -> Result<Container<'_>> {
    Container::decode_with_options(self.buf(), options)
  }
}

impl Deref for RawSource {
  type Target = [u8];

  fn deref(&self) -> &Self::Target {
    match &self.inner {
      RawSourceImpl::Memmap(mmap) => mmap.deref(),
      RawSourceImpl::Memory(mem) => mem.deref(),
    }
  }
}

impl Debug for RawSource {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("RawSource").field("path", &self.path).field("len", &self.len()).finish()
  }
}
