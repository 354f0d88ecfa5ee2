// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use std::{borrow::Cow, fmt::Display};

use serde::{Serialize, Serializer};

use super::{Result, TiffError};
use crate::bits::Endian;

/// The twelve field types of TIFF 6.0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, enumn::N)]
#[repr(u16)]
pub enum PrimitiveType {
  /// 8-bit unsigned integer
  Byte = 1,
  /// 8-bit byte that contains a 7-bit ASCII code; the last byte must be zero
  Ascii = 2,
  /// 16-bit unsigned integer
  Short = 3,
  /// 32-bit unsigned integer
  Long = 4,
  /// Fraction stored as two 32-bit unsigned integers
  Rational = 5,
  /// 8-bit signed integer
  SByte = 6,
  /// 8-bit byte that may contain anything, depending on the field
  Undefined = 7,
  /// 16-bit signed integer
  SShort = 8,
  /// 32-bit signed integer
  SLong = 9,
  /// Fraction stored as two 32-bit signed integers
  SRational = 10,
  /// 32-bit IEEE floating point
  Float = 11,
  /// 64-bit IEEE floating point
  Double = 12,
}

// 0-1-2-3-4-5-6-7-8-9-10-11-12
const TYPE_WIDTHS: [usize; 13] = [0, 1, 1, 2, 4, 8, 1, 1, 2, 4, 8, 4, 8];

impl PrimitiveType {
  /// Type for a numeric type code, `None` for 0 and codes above 12.
  pub fn from_code(code: u16) -> Option<Self> {
    Self::n(code)
  }

  pub fn code(self) -> u16 {
    self as u16
  }

  /// Byte width of a single element
  pub fn width(self) -> usize {
    TYPE_WIDTHS[self as usize]
  }

  pub fn name(self) -> &'static str {
    match self {
      Self::Byte => "BYTE",
      Self::Ascii => "ASCII",
      Self::Short => "SHORT",
      Self::Long => "LONG",
      Self::Rational => "RATIONAL",
      Self::SByte => "SBYTE",
      Self::Undefined => "UNDEFINED",
      Self::SShort => "SSHORT",
      Self::SLong => "SLONG",
      Self::SRational => "SRATIONAL",
      Self::Float => "FLOAT",
      Self::Double => "DOUBLE",
    }
  }

  /// Bytes `convert()` consumes for one value of this type.
  fn min_len(self) -> usize {
    match self {
      Self::Byte | Self::Ascii | Self::SByte | Self::Undefined => 0,
      _ => self.width(),
    }
  }
}

impl TryFrom<u16> for PrimitiveType {
  type Error = TiffError;

  fn try_from(code: u16) -> Result<Self> {
    Self::from_code(code).ok_or(TiffError::UnknownType(code))
  }
}

/// Type to represent tiff values of type `RATIONAL`
#[derive(Clone, Debug, Default, PartialEq, Eq, Copy)]
pub struct Rational {
  pub n: u32,
  pub d: u32,
}

impl Rational {
  pub fn new(n: u32, d: u32) -> Self {
    Self { n, d }
  }

  /// Quotient, or `None` for a zero denominator.
  pub fn as_f64(&self) -> Option<f64> {
    if self.d == 0 { None } else { Some(self.n as f64 / self.d as f64) }
  }
}

impl Display for Rational {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_fmt(format_args!("{}/{}", self.n, self.d))
  }
}

impl Serialize for Rational {
  fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// Type to represent tiff values of type `SRATIONAL`
#[derive(Clone, Debug, Default, PartialEq, Eq, Copy)]
pub struct SRational {
  pub n: i32,
  pub d: i32,
}

impl SRational {
  pub fn new(n: i32, d: i32) -> Self {
    Self { n, d }
  }

  pub fn as_f64(&self) -> Option<f64> {
    if self.d == 0 { None } else { Some(self.n as f64 / self.d as f64) }
  }
}

impl Display for SRational {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_fmt(format_args!("{}/{}", self.n, self.d))
  }
}

impl Serialize for SRational {
  fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// A `DOUBLE` value.
///
/// Older decoders read the 8 bytes as two 32-bit floats. The raw bytes
/// are kept so both readings stay available: [`DoubleValue::value`] is the
/// IEEE-754 double, [`DoubleValue::legacy_pair`] the two-float reading.
#[derive(Clone, Debug, PartialEq, Copy)]
pub struct DoubleValue {
  raw: [u8; 8],
  endian: Endian,
}

impl DoubleValue {
  pub fn new(raw: [u8; 8], endian: Endian) -> Self {
    Self { raw, endian }
  }

  pub fn raw(&self) -> &[u8; 8] {
    &self.raw
  }

  pub fn value(&self) -> f64 {
    self.endian.read_f64(&self.raw, 0)
  }

  pub fn legacy_pair(&self) -> (f32, f32) {
    (self.endian.read_f32(&self.raw, 0), self.endian.read_f32(&self.raw, 4))
  }
}

impl Serialize for DoubleValue {
  fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.serialize_f64(self.value())
  }
}

/// A single decoded field value, borrowing from the container buffer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value<'a> {
  /// Text, including any NUL terminator present in the file
  Ascii(Cow<'a, str>),
  Short(u16),
  SShort(i16),
  Long(u32),
  SLong(i32),
  /// Numerator and denominator, unreduced
  Rational(Rational),
  SRational(SRational),
  Float(f32),
  Double(DoubleValue),
  /// BYTE, SBYTE and UNDEFINED data, uninterpreted
  Bytes(&'a [u8]),
}

impl<'a> Value<'a> {
  pub fn as_u32(&self) -> Option<u32> {
    match self {
      Self::Short(v) => Some(*v as u32),
      Self::Long(v) => Some(*v),
      Self::SShort(v) => u32::try_from(*v).ok(),
      Self::SLong(v) => u32::try_from(*v).ok(),
      _ => None,
    }
  }

  pub fn as_f64(&self) -> Option<f64> {
    match self {
      Self::Short(v) => Some(*v as f64),
      Self::SShort(v) => Some(*v as f64),
      Self::Long(v) => Some(*v as f64),
      Self::SLong(v) => Some(*v as f64),
      Self::Rational(v) => v.as_f64(),
      Self::SRational(v) => v.as_f64(),
      Self::Float(v) => Some(*v as f64),
      Self::Double(v) => Some(v.value()),
      _ => None,
    }
  }

  /// Text up to the first NUL byte.
  pub fn as_str(&self) -> Option<&str> {
    match self {
      Self::Ascii(v) => Some(v.split('\0').next().unwrap_or_default()),
      _ => None,
    }
  }

  pub fn as_bytes(&self) -> Option<&'a [u8]> {
    match self {
      Self::Bytes(v) => Some(v),
      _ => None,
    }
  }
}

impl<'a> Display for Value<'a> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Ascii(_) => write!(f, "{:?}", self.as_str().unwrap_or_default()),
      Self::Short(v) => write!(f, "{}", v),
      Self::SShort(v) => write!(f, "{}", v),
      Self::Long(v) => write!(f, "{}", v),
      Self::SLong(v) => write!(f, "{}", v),
      Self::Rational(v) => write!(f, "{}", v),
      Self::SRational(v) => write!(f, "{}", v),
      Self::Float(v) => write!(f, "{}", v),
      Self::Double(v) => write!(f, "{}", v.value()),
      Self::Bytes(v) => {
        for (i, b) in v.iter().take(16).enumerate() {
          if i > 0 {
            f.write_str(" ")?;
          }
          write!(f, "{:02x}", b)?;
        }
        if v.len() > 16 {
          f.write_str(" ...")?;
        }
        Ok(())
      }
    }
  }
}

/// Decode the first value of `typ` from `bytes`.
///
/// Integer, float and rational types read one element at offset 0,
/// text and byte types take the whole slice.
pub fn convert<'a>(typ: PrimitiveType, bytes: &'a [u8], endian: Endian) -> Result<Value<'a>> {
  let expected = typ.min_len();
  if bytes.len() < expected {
    return Err(TiffError::ValueTooShort {
      expected,
      actual: bytes.len(),
    });
  }
  Ok(match typ {
    PrimitiveType::Ascii => Value::Ascii(String::from_utf8_lossy(bytes)),
    PrimitiveType::Byte | PrimitiveType::SByte | PrimitiveType::Undefined => Value::Bytes(bytes),
    PrimitiveType::Short => Value::Short(endian.read_u16(bytes, 0)),
    PrimitiveType::SShort => Value::SShort(endian.read_i16(bytes, 0)),
    PrimitiveType::Long => Value::Long(endian.read_u32(bytes, 0)),
    PrimitiveType::SLong => Value::SLong(endian.read_i32(bytes, 0)),
    PrimitiveType::Rational => Value::Rational(Rational::new(endian.read_u32(bytes, 0), endian.read_u32(bytes, 4))),
    PrimitiveType::SRational => Value::SRational(SRational::new(endian.read_i32(bytes, 0), endian.read_i32(bytes, 4))),
    PrimitiveType::Float => Value::Float(endian.read_f32(bytes, 0)),
    PrimitiveType::Double => {
      let mut raw = [0; 8];
      raw.copy_from_slice(&bytes[..8]);
      Value::Double(DoubleValue::new(raw, endian))
    }
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn type_table() {
    let widths: Vec<usize> = (1..=12).map(|c| PrimitiveType::from_code(c).map(PrimitiveType::width).unwrap_or(0)).collect();
    assert_eq!(widths, vec![1, 1, 2, 4, 8, 1, 1, 2, 4, 8, 4, 8]);
    assert_eq!(PrimitiveType::from_code(0), None);
    assert_eq!(PrimitiveType::from_code(13), None);
    assert_eq!(PrimitiveType::from_code(3), Some(PrimitiveType::Short));
    assert_eq!(PrimitiveType::SRational.name(), "SRATIONAL");
    assert!(matches!(PrimitiveType::try_from(13_u16), Err(TiffError::UnknownType(13))));
    assert!(matches!(PrimitiveType::try_from(0_u16), Err(TiffError::UnknownType(0))));
    assert!(matches!(PrimitiveType::try_from(12_u16), Ok(PrimitiveType::Double)));
  }

  #[test]
  fn short_in_both_orders() -> std::result::Result<(), Box<dyn std::error::Error>> {
    assert_eq!(convert(PrimitiveType::Short, &[0x00, 0x05], Endian::Big)?, Value::Short(5));
    assert_eq!(convert(PrimitiveType::Short, &[0x05, 0x00], Endian::Little)?, Value::Short(5));
    Ok(())
  }

  #[test]
  fn signed_integers() -> std::result::Result<(), Box<dyn std::error::Error>> {
    assert_eq!(convert(PrimitiveType::SShort, &[0xff, 0xfe], Endian::Big)?, Value::SShort(-2));
    assert_eq!(convert(PrimitiveType::SLong, &[0xff, 0xff, 0xff, 0xff], Endian::Little)?, Value::SLong(-1));
    assert_eq!(convert(PrimitiveType::Long, &[0x01, 0x00, 0x00, 0x00], Endian::Little)?, Value::Long(1));
    Ok(())
  }

  #[test]
  fn rationals_stay_unreduced() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let data = [0, 0, 0, 72, 0, 0, 0, 2];
    let value = convert(PrimitiveType::Rational, &data, Endian::Big)?;
    assert_eq!(value, Value::Rational(Rational::new(72, 2)));
    assert_eq!(value.as_f64(), Some(36.0));

    let data = [0xff, 0xff, 0xff, 0xff, 3, 0, 0, 0];
    let value = convert(PrimitiveType::SRational, &data, Endian::Little)?;
    assert_eq!(value, Value::SRational(SRational::new(-1, 3)));
    assert_eq!(Rational::new(1, 0).as_f64(), None);
    Ok(())
  }

  #[test]
  fn ascii_keeps_terminator() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let value = convert(PrimitiveType::Ascii, b"SONY\0", Endian::Little)?;
    assert_eq!(value, Value::Ascii(Cow::Borrowed("SONY\0")));
    assert_eq!(value.as_str(), Some("SONY"));
    Ok(())
  }

  #[test]
  fn bytes_are_opaque() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let data = [1, 2, 3];
    for typ in [PrimitiveType::Byte, PrimitiveType::SByte, PrimitiveType::Undefined] {
      assert_eq!(convert(typ, &data, Endian::Big)?.as_bytes(), Some(&data[..]));
    }
    Ok(())
  }

  #[test]
  fn float_and_double() -> std::result::Result<(), Box<dyn std::error::Error>> {
    assert_eq!(convert(PrimitiveType::Float, &1.5f32.to_be_bytes(), Endian::Big)?, Value::Float(1.5));

    let raw = 2.25f64.to_le_bytes();
    match convert(PrimitiveType::Double, &raw, Endian::Little)? {
      Value::Double(v) => {
        assert_eq!(v.value(), 2.25);
        assert_eq!(v.raw(), &raw);
        let lo = f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
        let hi = f32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]);
        assert_eq!(v.legacy_pair(), (lo, hi));
      }
      other => panic!("unexpected value {:?}", other),
    }
    Ok(())
  }

  #[test]
  fn short_slices_are_rejected() {
    assert!(matches!(
      convert(PrimitiveType::Long, &[1, 2], Endian::Big),
      Err(TiffError::ValueTooShort { expected: 4, actual: 2 })
    ));
    assert!(convert(PrimitiveType::Short, &[], Endian::Big).is_err());
    assert!(convert(PrimitiveType::Ascii, &[], Endian::Big).is_ok());
  }

  #[test]
  fn display() {
    assert_eq!(Value::Rational(Rational::new(1, 250)).to_string(), "1/250");
    assert_eq!(Value::Ascii(Cow::Borrowed("ILCE-7M3\0")).to_string(), "\"ILCE-7M3\"");
    assert_eq!(Value::Bytes(&[0xde, 0xad]).to_string(), "de ad");
  }
}
