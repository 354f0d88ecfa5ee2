// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

//! Tag dictionary: numeric tag ids and the field names they stand for.

use serde::Serialize;
use std::fmt::Debug;

/// Anything usable as a tag id for directory lookups.
pub trait TiffTag: Into<u16> + Copy + Debug {}

impl TiffTag for u16 {}

macro_rules! tiff_tag_enum {
  ($e:ty) => {
    impl From<$e> for u16 {
      fn from(tag: $e) -> Self {
        tag as u16
      }
    }

    impl TryFrom<u16> for $e {
      type Error = String;

      fn try_from(value: u16) -> std::result::Result<Self, Self::Error> {
        Self::n(value).ok_or(format!("Unable to convert tag: {}, not defined in enum", value))
      }
    }

    impl crate::tags::TiffTag for $e {}
  };
}

/// Declares a tag enum together with its label table, so the
/// dictionary can never get out of sync with the enum.
macro_rules! tag_dictionary {
  (
    $(#[$meta:meta])*
    pub enum $name:ident {
      $($variant:ident = $value:expr),+ $(,)?
    }
  ) => {
    $(#[$meta])*
    pub enum $name {
      $($variant = $value),+
    }

    impl $name {
      /// Every tag known to the dictionary, in ascending id order.
      pub const ALL: &'static [$name] = &[$($name::$variant),+];

      /// Field name of this tag.
      pub fn label(self) -> &'static str {
        match self {
          $($name::$variant => stringify!($variant)),+
        }
      }
    }
  };
}

tag_dictionary! {
  /// Baseline and extended TIFF tags that get a semantic field.
  #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, enumn::N)]
  #[repr(u16)]
  pub enum TiffCommonTag {
    NewSubFileType = 0x00FE,
    SubFileType = 0x00FF,
    ImageWidth = 0x0100,
    ImageLength = 0x0101,
    BitsPerSample = 0x0102,
    Compression = 0x0103,
    PhotometricInterpretation = 0x0106,
    Threshholding = 0x0107,
    FillOrder = 0x010A,
    DocumentName = 0x010D,
    ImageDescription = 0x010E,
    Make = 0x010F,
    Model = 0x0110,
    StripOffsets = 0x0111,
    Orientation = 0x0112,
    SamplesPerPixel = 0x0115,
    RowsPerStrip = 0x0116,
    StripByteCounts = 0x0117,
    MinSampleValue = 0x0118,
    MaxSampleValue = 0x0119,
    XResolution = 0x011A,
    YResolution = 0x011B,
    PlanarConfiguration = 0x011C,
    PageName = 0x011D,
    ResolutionUnit = 0x0128,
    PageNumber = 0x0129,
    Software = 0x0131,
    DateTime = 0x0132,
    Artist = 0x013B,
    HostComputer = 0x013C,
    Predictor = 0x013D,
    TileWidth = 0x0142,
    TileLength = 0x0143,
    TileOffsets = 0x0144,
    TileByteCounts = 0x0145,
    SubIFDs = 0x014A,
    ExtraSamples = 0x0152,
    SampleFormat = 0x0153,
    SMinSampleValue = 0x0154,
    SMaxSampleValue = 0x0155,
    JPEGInterchangeFormat = 0x0201,
    JPEGInterchangeFormatLength = 0x0202,
    YCbCrSubSampling = 0x0212,
    YCbCrPositioning = 0x0213,
    ReferenceBlackWhite = 0x0214,
    Xmp = 0x02BC,
    SonyRawFileType = 0x7000,
    SonyToneCurve = 0x7010,
    CFARepeatPatternDim = 0x828D,
    CFAPattern = 0x828E,
    Copyright = 0x8298,
    ExifIFDPointer = 0x8769,
    GPSInfo = 0x8825,
    DNGVersion = 0xC612,
    SR2Private = 0xC634,
  }
}

tiff_tag_enum!(TiffCommonTag);

/// Looks up the field name for a numeric tag id.
pub fn tag_label(tag: u16) -> Option<&'static str> {
  TiffCommonTag::n(tag).map(TiffCommonTag::label)
}
