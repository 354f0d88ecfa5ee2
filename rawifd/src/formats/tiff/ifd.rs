// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDateTime;
use log::{debug, info, warn};
use serde::Serialize;

use super::{DecodeOptions, ENTRY_SIZE, EndianReader, RawEntry, Result, TiffError, Value, entry::DecodedEntry};
use crate::{
  bits::Endian,
  tags::{TiffCommonTag, TiffTag, tag_label},
};

const DATE_TIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Why an entry did not make it into a directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
  /// Type code outside 1..=12, entry dropped from `entries`
  UnknownType,
  /// Entry kept in `entries`, but its value could not be projected into `fields`
  UndecodableField(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
  pub tag: u16,
  pub type_code: u16,
  pub reason: SkipReason,
}

/// Limits one decode run. Each chain keeps its own set of visited
/// offsets and the guard keeps the directories a SubIFDs entry was reached
/// through, so only a pointer looping back into its own chain or into an
/// ancestor is a cycle. Directories shared by several parents are fine.
pub(crate) struct ChainGuard<'o> {
  options: &'o DecodeOptions,
  decoded: usize,
  ancestors: Vec<u32>,
}

impl<'o> ChainGuard<'o> {
  pub(crate) fn new(options: &'o DecodeOptions) -> Self {
    Self {
      options,
      decoded: 0,
      ancestors: Vec::new(),
    }
  }

  fn enter(&mut self, offset: u32, chain: &mut HashSet<u32>) -> Result<()> {
    if self.ancestors.contains(&offset) || !chain.insert(offset) {
      return Err(TiffError::MalformedChain {
        offset,
        reason: "directory offset already visited".to_string(),
      });
    }
    self.decoded += 1;
    if self.decoded > self.options.max_directories {
      return Err(TiffError::MalformedChain {
        offset,
        reason: format!("more than {} directories", self.options.max_directories),
      });
    }
    Ok(())
  }
}

/// Image File Directory
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Directory<'a> {
  pub offset: u32,
  pub next_ifd: u32,
  /// Number of entry records as stored in the file
  pub entry_count: u16,
  pub endian: Endian,
  pub entries: BTreeMap<u16, RawEntry<'a>>,
  pub fields: BTreeMap<TiffCommonTag, Value<'a>>,
  pub sub: Vec<Directory<'a>>,
  pub skipped: Vec<SkippedEntry>,
}

/// Decode a single directory at `offset` with default limits.
///
/// Returns the directory and its next-directory offset.
pub fn decode_directory(buf: &[u8], offset: u32, endian: Endian) -> Result<(Directory<'_>, u32)> {
  let options = DecodeOptions::default();
  let mut guard = ChainGuard::new(&options);
  guard.enter(offset, &mut HashSet::new())?;
  let ifd = Directory::new(&EndianReader::new(buf, endian), offset, &mut guard, 0)?;
  let next = ifd.next_ifd;
  Ok((ifd, next))
}

impl<'a> Directory<'a> {
  /// Decode the chain starting at `start` until a zero next offset.
  pub(crate) fn decode_chain(reader: &EndianReader<'a>, start: u32, guard: &mut ChainGuard<'_>, depth: usize) -> Result<Vec<Directory<'a>>> {
    let mut chain = HashSet::new();
    let mut ifds = Vec::new();
    let mut next = start;
    while next != 0 {
      guard.enter(next, &mut chain)?;
      let ifd = Directory::new(reader, next, guard, depth)?;
      next = ifd.next_ifd;
      ifds.push(ifd);
    }
    Ok(ifds)
  }

  /// Decode the directory at `offset`. Cycle checks for `offset` itself
  /// are up to the caller, see [`Directory::decode_chain`].
  pub(crate) fn new(reader: &EndianReader<'a>, offset: u32, guard: &mut ChainGuard<'_>, depth: usize) -> Result<Directory<'a>> {
    let entry_count = reader.read_u16(offset as usize)?;
    debug!("IFD at {:#x}: {} entries", offset, entry_count);

    let mut entries = BTreeMap::new();
    let mut skipped = Vec::new();
    let mut next_pos = offset as usize + 2;
    for _ in 0..entry_count {
      let (decoded, next) = RawEntry::parse(reader, next_pos)?;
      next_pos = next;
      match decoded {
        DecodedEntry::Known(entry) => {
          entries.insert(entry.tag, entry);
        }
        DecodedEntry::UnknownType { tag, type_code, .. } => {
          info!("Unknown field type {} for TIFF tag 0x{:X}, skipping", type_code, tag);
          skipped.push(SkippedEntry {
            tag,
            type_code,
            reason: SkipReason::UnknownType,
          });
        }
      }
    }
    debug_assert_eq!(next_pos, offset as usize + 2 + ENTRY_SIZE * entry_count as usize);
    let next_ifd = reader.read_u32(next_pos)?;

    let mut fields = BTreeMap::new();
    for tag in TiffCommonTag::ALL {
      if let Some(entry) = entries.get(&u16::from(*tag)) {
        match entry.value() {
          Ok(value) => {
            fields.insert(*tag, value);
          }
          Err(err) => {
            info!("Failed to decode TIFF field {}, skipping: {}", tag.label(), err);
            skipped.push(SkippedEntry {
              tag: entry.tag,
              type_code: entry.typ.code(),
              reason: SkipReason::UndecodableField(err.to_string()),
            });
          }
        }
      }
    }

    let mut ifd = Directory {
      offset,
      next_ifd,
      entry_count,
      endian: reader.endian(),
      entries,
      fields,
      sub: Vec::new(),
      skipped,
    };
    guard.ancestors.push(offset);
    ifd.sub = ifd.decode_sub_ifds(reader, guard, depth)?;
    guard.ancestors.pop();
    Ok(ifd)
  }

  fn sub_ifd_offsets(&self, follow_all: bool) -> Vec<u32> {
    let Some(entry) = self.get_entry(TiffCommonTag::SubIFDs) else {
      return Vec::new();
    };
    match entry.u32_values() {
      Ok(offsets) if follow_all => offsets.into_iter().filter(|off| *off != 0).collect(),
      Ok(offsets) => offsets.into_iter().take(1).filter(|off| *off != 0).collect(),
      Err(err) => {
        warn!("Found SubIFDs tag, but can not use it as offset: {}. Ignoring SubIFD parsing", err);
        Vec::new()
      }
    }
  }

  /// Each SubIFDs offset starts a chain of its own, terminated by a zero
  /// next-directory offset like the top-level chain.
  fn decode_sub_ifds(&self, reader: &EndianReader<'a>, guard: &mut ChainGuard<'_>, depth: usize) -> Result<Vec<Directory<'a>>> {
    let offsets = self.sub_ifd_offsets(guard.options.follow_all_sub_ifds);
    if offsets.is_empty() {
      return Ok(Vec::new());
    }
    if depth >= guard.options.max_sub_depth {
      return Err(TiffError::MalformedChain {
        offset: offsets[0],
        reason: format!("SubIFDs nested deeper than {}", guard.options.max_sub_depth),
      });
    }
    let mut subs = Vec::new();
    for start in offsets {
      debug!("Decode SubIFD chain at {:#x} for parent IFD at {:#x}", start, self.offset);
      subs.append(&mut Directory::decode_chain(reader, start, guard, depth + 1)?);
    }
    Ok(subs)
  }

  /// Number of entry records as stored in the file, including
  /// records dropped for an unknown type.
  pub fn entry_count(&self) -> u16 {
    self.entry_count
  }

  /// Number of entries kept in `entries`. Less than [`Directory::entry_count`]
  /// when records were dropped or a tag was repeated.
  pub fn retained_entries(&self) -> usize {
    self.entries.len()
  }

  /// Position of this directory in the buffer
  pub fn offset(&self) -> u32 {
    self.offset
  }

  /// Position of the next directory in the chain, 0 for the last one
  pub fn next_offset(&self) -> u32 {
    self.next_ifd
  }

  pub fn entries(&self) -> &BTreeMap<u16, RawEntry<'a>> {
    &self.entries
  }

  pub fn fields(&self) -> &BTreeMap<TiffCommonTag, Value<'a>> {
    &self.fields
  }

  pub fn sub_ifds(&self) -> &Vec<Directory<'a>> {
    &self.sub
  }

  /// Entries dropped or not projected during decoding
  pub fn skipped(&self) -> &[SkippedEntry] {
    &self.skipped
  }

  pub fn get_entry<T: TiffTag>(&self, tag: T) -> Option<&RawEntry<'a>> {
    let tag: u16 = tag.into();
    self.entries.get(&tag)
  }

  pub fn has_entry<T: TiffTag>(&self, tag: T) -> bool {
    self.get_entry(tag).is_some()
  }

  pub fn field(&self, tag: TiffCommonTag) -> Option<&Value<'a>> {
    self.fields.get(&tag)
  }

  /// Field as integer, for SHORT and LONG typed fields.
  pub fn field_u32(&self, tag: TiffCommonTag) -> Option<u32> {
    self.field(tag).and_then(Value::as_u32)
  }

  pub fn field_str(&self, tag: TiffCommonTag) -> Option<&str> {
    self.field(tag).and_then(Value::as_str)
  }

  /// Every retained entry decoded, keyed by numeric tag.
  /// Unlike `fields`, this includes tags missing from the dictionary.
  pub fn all_fields(&self) -> BTreeMap<u16, Value<'a>> {
    self.entries.iter().filter_map(|(tag, entry)| entry.value().ok().map(|v| (*tag, v))).collect()
  }

  pub fn image_width(&self) -> Option<u32> {
    self.field_u32(TiffCommonTag::ImageWidth)
  }

  pub fn image_length(&self) -> Option<u32> {
    self.field_u32(TiffCommonTag::ImageLength)
  }

  /// Pixel count, if both dimensions are known
  pub fn size(&self) -> Option<u64> {
    Some(self.image_width()? as u64 * self.image_length()? as u64)
  }

  pub fn bits_per_sample(&self) -> Option<u32> {
    self.field_u32(TiffCommonTag::BitsPerSample)
  }

  pub fn compression(&self) -> Option<u32> {
    self.field_u32(TiffCommonTag::Compression)
  }

  pub fn photometric_interpretation(&self) -> Option<u32> {
    self.field_u32(TiffCommonTag::PhotometricInterpretation)
  }

  pub fn samples_per_pixel(&self) -> Option<u32> {
    self.field_u32(TiffCommonTag::SamplesPerPixel)
  }

  pub fn new_subfile_type(&self) -> Option<u32> {
    self.field_u32(TiffCommonTag::NewSubFileType)
  }

  pub fn fill_order(&self) -> u32 {
    self.field_u32(TiffCommonTag::FillOrder).unwrap_or(1)
  }

  pub fn min_sample_value(&self) -> u32 {
    self.field_u32(TiffCommonTag::MinSampleValue).unwrap_or(0)
  }

  /// Defaults to `2^BitsPerSample - 1`, `None` without BitsPerSample.
  pub fn max_sample_value(&self) -> Option<u64> {
    match self.field_u32(TiffCommonTag::MaxSampleValue) {
      Some(v) => Some(v as u64),
      None => self.bits_per_sample().and_then(|bps| 1_u64.checked_shl(bps)).map(|v| v - 1),
    }
  }

  pub fn planar_configuration(&self) -> u32 {
    self.field_u32(TiffCommonTag::PlanarConfiguration).unwrap_or(1)
  }

  pub fn resolution_unit(&self) -> u32 {
    self.field_u32(TiffCommonTag::ResolutionUnit).unwrap_or(2)
  }

  pub fn predictor(&self) -> u32 {
    self.field_u32(TiffCommonTag::Predictor).unwrap_or(1)
  }

  pub fn sample_format(&self) -> u32 {
    self.field_u32(TiffCommonTag::SampleFormat).unwrap_or(1)
  }

  pub fn s_min_sample_value(&self) -> f64 {
    self
      .field(TiffCommonTag::SMinSampleValue)
      .and_then(Value::as_f64)
      .unwrap_or(self.min_sample_value() as f64)
  }

  pub fn s_max_sample_value(&self) -> Option<f64> {
    self
      .field(TiffCommonTag::SMaxSampleValue)
      .and_then(Value::as_f64)
      .or(self.max_sample_value().map(|v| v as f64))
  }

  /// Parse the DateTime field (`YYYY:MM:DD HH:MM:SS`).
  ///
  /// Text following the timestamp is ignored.
  pub fn date_time(&self) -> Result<NaiveDateTime> {
    let text = match self.field(TiffCommonTag::DateTime) {
      Some(value) => value.as_str().ok_or(TiffError::TypeMismatch {
        tag: TiffCommonTag::DateTime.label(),
        expected: "ASCII",
      })?,
      None => return Err(TiffError::MissingRequiredField(TiffCommonTag::DateTime.label())),
    };
    NaiveDateTime::parse_and_remainder(text, DATE_TIME_FORMAT)
      .map(|(date, _)| date)
      .map_err(|err| TiffError::InvalidDateTime(format!("{:?}: {}", text, err)))
  }

  /// Find this directory or any sub-directory having `tag`, depth first.
  pub fn find_ifds_with_tag<T: TiffTag>(&self, tag: T) -> Vec<&Directory<'a>> {
    let mut ifds = Vec::new();
    if self.has_entry(tag) {
      ifds.push(self);
    }
    for sub in &self.sub {
      ifds.append(&mut sub.find_ifds_with_tag(tag));
    }
    ifds
  }

  pub fn dump(&self, limit: usize) -> Vec<String> {
    let mut out = Vec::new();
    out.push(format!("IFD entries: {}", self.entries.len()));
    out.push(format!("{0:<34}  | {1:<10} | {2:<6} | {3}", "Tag", "Type", "Count", "Data"));
    for (tag, entry) in &self.entries {
      let tag_name = tag_label(*tag).map(String::from).unwrap_or_else(|| format!("<?{}>", tag));
      out.push(format!(
        "{0:#06x} : {0:<6} {1:<20}| {2:<10} | {3:<6} | {4}",
        tag,
        tag_name,
        entry.type_name(),
        entry.count,
        entry.visual_rep(limit)
      ));
    }
    for skipped in &self.skipped {
      out.push(format!("skipped 0x{:04x} (type {}): {:?}", skipped.tag, skipped.type_code, skipped.reason));
    }
    for (i, sub) in self.sub.iter().enumerate() {
      out.push(format!("SubIFD({})", i));
      for line in sub.dump(limit) {
        out.push(format!("   {}", line));
      }
    }
    out
  }
}
