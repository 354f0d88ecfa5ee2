// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use serde::Serialize;

use super::{CompressionMethod, Directory, PhotometricInterpretation};

/// Kind of image data a directory describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ImageKind {
  /// JPEG compressed, typically a preview or thumbnail
  Jpeg,
  /// Uncompressed 3 sample RGB
  Rgb,
  /// Uncompressed 4 sample RGB with alpha
  Rgba,
  /// Sensor data, either Sony compressed or CFA/LinearRaw
  Raw,
  /// Some other combination of compression and photometric interpretation
  Other,
  /// Required fields are missing, no decision possible
  Indeterminate,
}

impl<'a> Directory<'a> {
  /// Classify the image data this directory describes.
  ///
  /// Rules are checked in order: JPEG compression, raw sensor data,
  /// uncompressed RGB(A). A directory missing Compression or
  /// PhotometricInterpretation is [`ImageKind::Indeterminate`] unless its
  /// compression alone decides the kind.
  pub fn classify(&self) -> ImageKind {
    let compression = self.compression().and_then(|c| u16::try_from(c).ok()).and_then(CompressionMethod::n);
    let photometric = self
      .photometric_interpretation()
      .and_then(|p| u16::try_from(p).ok())
      .and_then(PhotometricInterpretation::n);

    match compression {
      Some(CompressionMethod::JPEG | CompressionMethod::ModernJPEG) => return ImageKind::Jpeg,
      Some(CompressionMethod::SonyARW) => return ImageKind::Raw,
      _ => {}
    }
    if matches!(photometric, Some(PhotometricInterpretation::CFA | PhotometricInterpretation::LinearRaw)) {
      return ImageKind::Raw;
    }
    if self.compression().is_none() || self.photometric_interpretation().is_none() {
      return ImageKind::Indeterminate;
    }
    match (compression, photometric) {
      (Some(CompressionMethod::None), Some(PhotometricInterpretation::RGB)) => match self.samples_per_pixel() {
        Some(3) => ImageKind::Rgb,
        Some(4) => ImageKind::Rgba,
        Some(_) => ImageKind::Other,
        None => ImageKind::Indeterminate,
      },
      _ => ImageKind::Other,
    }
  }
}
