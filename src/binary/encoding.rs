// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Scalar encoding primitives: little-endian fixed-width values.
//!
//! Every fixed-width thing in a buffer (fields, vector elements, offsets,
//! length prefixes) is a little-endian scalar. Reads never assume alignment
//! and never panic: a read past the end returns `None`, and callers decide
//! whether that means "default" or "malformed".
//!
//! `Scalar` is the compile-time view (`i32`, `u8`, ...), `ScalarType` plus
//! `Value` the runtime view used by schemas and reflection. Both agree on
//! widths and wire spelling.

use std::fmt;

// ============================================================================
// SCALAR TYPES
// ============================================================================

/// Runtime tag for a fixed-width scalar, spelled the way `.fbs` files spell it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Bool,
    Byte,
    UByte,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
}

impl ScalarType {
    pub const ALL: [ScalarType; 11] = [
        ScalarType::Bool,
        ScalarType::Byte,
        ScalarType::UByte,
        ScalarType::Short,
        ScalarType::UShort,
        ScalarType::Int,
        ScalarType::UInt,
        ScalarType::Long,
        ScalarType::ULong,
        ScalarType::Float,
        ScalarType::Double,
    ];

    /// Width in bytes on the wire (also the alignment).
    pub const fn width(self) -> usize {
        match self {
            ScalarType::Bool | ScalarType::Byte | ScalarType::UByte => 1,
            ScalarType::Short | ScalarType::UShort => 2,
            ScalarType::Int | ScalarType::UInt | ScalarType::Float => 4,
            ScalarType::Long | ScalarType::ULong | ScalarType::Double => 8,
        }
    }

    pub const fn is_integer(self) -> bool {
        !matches!(
            self,
            ScalarType::Bool | ScalarType::Float | ScalarType::Double
        )
    }

    /// Canonical `.fbs` name.
    pub const fn fbs_name(self) -> &'static str {
        match self {
            ScalarType::Bool => "bool",
            ScalarType::Byte => "byte",
            ScalarType::UByte => "ubyte",
            ScalarType::Short => "short",
            ScalarType::UShort => "ushort",
            ScalarType::Int => "int",
            ScalarType::UInt => "uint",
            ScalarType::Long => "long",
            ScalarType::ULong => "ulong",
            ScalarType::Float => "float",
            ScalarType::Double => "double",
        }
    }

    /// Parse a canonical name or one of the sized aliases (`int32`, `uint8`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        let ty = match name.trim().to_ascii_lowercase().as_str() {
            "bool" => ScalarType::Bool,
            "byte" | "int8" => ScalarType::Byte,
            "ubyte" | "uint8" => ScalarType::UByte,
            "short" | "int16" => ScalarType::Short,
            "ushort" | "uint16" => ScalarType::UShort,
            "int" | "int32" => ScalarType::Int,
            "uint" | "uint32" => ScalarType::UInt,
            "long" | "int64" => ScalarType::Long,
            "ulong" | "uint64" => ScalarType::ULong,
            "float" | "float32" => ScalarType::Float,
            "double" | "float64" => ScalarType::Double,
            _ => return None,
        };
        Some(ty)
    }

    /// The all-zero value of this type (the implicit default).
    pub const fn zero(self) -> Value {
        match self {
            ScalarType::Bool => Value::Bool(false),
            ScalarType::Byte => Value::Byte(0),
            ScalarType::UByte => Value::UByte(0),
            ScalarType::Short => Value::Short(0),
            ScalarType::UShort => Value::UShort(0),
            ScalarType::Int => Value::Int(0),
            ScalarType::UInt => Value::UInt(0),
            ScalarType::Long => Value::Long(0),
            ScalarType::ULong => Value::ULong(0),
            ScalarType::Float => Value::Float(0.0),
            ScalarType::Double => Value::Double(0.0),
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.fbs_name())
    }
}

// ============================================================================
// RUNTIME VALUES
// ============================================================================

/// A scalar value tagged with its wire type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Bool(bool),
    Byte(i8),
    UByte(u8),
    Short(i16),
    UShort(u16),
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    Float(f32),
    Double(f64),
}

impl Value {
    pub const fn scalar_type(&self) -> ScalarType {
        match self {
            Value::Bool(_) => ScalarType::Bool,
            Value::Byte(_) => ScalarType::Byte,
            Value::UByte(_) => ScalarType::UByte,
            Value::Short(_) => ScalarType::Short,
            Value::UShort(_) => ScalarType::UShort,
            Value::Int(_) => ScalarType::Int,
            Value::UInt(_) => ScalarType::UInt,
            Value::Long(_) => ScalarType::Long,
            Value::ULong(_) => ScalarType::ULong,
            Value::Float(_) => ScalarType::Float,
            Value::Double(_) => ScalarType::Double,
        }
    }

    pub const fn width(&self) -> usize {
        self.scalar_type().width()
    }

    /// Convert an integer into `ty`, rejecting values that do not fit.
    pub fn from_i64(ty: ScalarType, v: i64) -> Option<Value> {
        let value = match ty {
            ScalarType::Bool => match v {
                0 => Value::Bool(false),
                1 => Value::Bool(true),
                _ => return None,
            },
            ScalarType::Byte => Value::Byte(i8::try_from(v).ok()?),
            ScalarType::UByte => Value::UByte(u8::try_from(v).ok()?),
            ScalarType::Short => Value::Short(i16::try_from(v).ok()?),
            ScalarType::UShort => Value::UShort(u16::try_from(v).ok()?),
            ScalarType::Int => Value::Int(i32::try_from(v).ok()?),
            ScalarType::UInt => Value::UInt(u32::try_from(v).ok()?),
            ScalarType::Long => Value::Long(v),
            ScalarType::ULong => Value::ULong(u64::try_from(v).ok()?),
            ScalarType::Float => Value::Float(v as f32),
            ScalarType::Double => Value::Double(v as f64),
        };
        Some(value)
    }

    /// Convert an unsigned integer into `ty` (needed for `ulong` above `i64::MAX`).
    pub fn from_u64(ty: ScalarType, v: u64) -> Option<Value> {
        match ty {
            ScalarType::ULong => Some(Value::ULong(v)),
            _ => Value::from_i64(ty, i64::try_from(v).ok()?),
        }
    }

    /// Convert a float into `ty`. Integer targets only accept integral values.
    pub fn from_f64(ty: ScalarType, v: f64) -> Option<Value> {
        match ty {
            ScalarType::Float => Some(Value::Float(v as f32)),
            ScalarType::Double => Some(Value::Double(v)),
            _ if v.fract() == 0.0 && v.is_finite() => {
                if v >= 0.0 && v > i64::MAX as f64 {
                    Value::from_u64(ty, v as u64)
                } else {
                    Value::from_i64(ty, v as i64)
                }
            }
            _ => None,
        }
    }

    /// Parse the textual spelling used in schema defaults ("150", "true", "0.5").
    pub fn parse(ty: ScalarType, text: &str) -> Option<Value> {
        let text = text.trim();
        match ty {
            ScalarType::Bool => match text {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => Value::from_i64(ty, text.parse().ok()?),
            },
            ScalarType::Float | ScalarType::Double => Value::from_f64(ty, text.parse().ok()?),
            ScalarType::ULong => Value::from_u64(ty, text.parse().ok()?),
            _ => Value::from_i64(ty, text.parse().ok()?),
        }
    }

    /// Integer view (bools count as 0/1, floats are rejected).
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Bool(b) => Some(i64::from(b)),
            Value::Byte(v) => Some(i64::from(v)),
            Value::UByte(v) => Some(i64::from(v)),
            Value::Short(v) => Some(i64::from(v)),
            Value::UShort(v) => Some(i64::from(v)),
            Value::Int(v) => Some(i64::from(v)),
            Value::UInt(v) => Some(i64::from(v)),
            Value::Long(v) => Some(v),
            Value::ULong(v) => i64::try_from(v).ok(),
            Value::Float(_) | Value::Double(_) => None,
        }
    }

    /// Write the little-endian bytes into `out`, which must be exactly `width()` long.
    pub fn write_le(&self, out: &mut [u8]) {
        match *self {
            Value::Bool(v) => v.write_le(out),
            Value::Byte(v) => v.write_le(out),
            Value::UByte(v) => v.write_le(out),
            Value::Short(v) => v.write_le(out),
            Value::UShort(v) => v.write_le(out),
            Value::Int(v) => v.write_le(out),
            Value::UInt(v) => v.write_le(out),
            Value::Long(v) => v.write_le(out),
            Value::ULong(v) => v.write_le(out),
            Value::Float(v) => v.write_le(out),
            Value::Double(v) => v.write_le(out),
        }
    }

    /// Read a value of type `ty` at `pos`.
    pub fn read_at(ty: ScalarType, buf: &[u8], pos: usize) -> Option<Value> {
        let value = match ty {
            ScalarType::Bool => Value::Bool(read_scalar_at(buf, pos)?),
            ScalarType::Byte => Value::Byte(read_scalar_at(buf, pos)?),
            ScalarType::UByte => Value::UByte(read_scalar_at(buf, pos)?),
            ScalarType::Short => Value::Short(read_scalar_at(buf, pos)?),
            ScalarType::UShort => Value::UShort(read_scalar_at(buf, pos)?),
            ScalarType::Int => Value::Int(read_scalar_at(buf, pos)?),
            ScalarType::UInt => Value::UInt(read_scalar_at(buf, pos)?),
            ScalarType::Long => Value::Long(read_scalar_at(buf, pos)?),
            ScalarType::ULong => Value::ULong(read_scalar_at(buf, pos)?),
            ScalarType::Float => Value::Float(read_scalar_at(buf, pos)?),
            ScalarType::Double => Value::Double(read_scalar_at(buf, pos)?),
        };
        Some(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Byte(v) => write!(f, "{}", v),
            Value::UByte(v) => write!(f, "{}", v),
            Value::Short(v) => write!(f, "{}", v),
            Value::UShort(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::UInt(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::ULong(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
        }
    }
}

// ============================================================================
// COMPILE-TIME SCALARS
// ============================================================================

/// A Rust type with a fixed little-endian wire representation.
pub trait Scalar: Copy + PartialEq + Default + fmt::Debug + Send + Sync + 'static {
    const WIDTH: usize;
    const TYPE: ScalarType;

    /// Decode from exactly `WIDTH` bytes.
    fn read_le(bytes: &[u8]) -> Self;

    /// Encode into exactly `WIDTH` bytes.
    fn write_le(self, out: &mut [u8]);

    fn to_value(self) -> Value;

    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! impl_scalar {
    ($ty:ty, $tag:ident) => {
        impl Scalar for $ty {
            const WIDTH: usize = std::mem::size_of::<$ty>();
            const TYPE: ScalarType = ScalarType::$tag;

            #[inline]
            fn read_le(bytes: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(&bytes[..Self::WIDTH]);
                <$ty>::from_le_bytes(raw)
            }

            #[inline]
            fn write_le(self, out: &mut [u8]) {
                out[..Self::WIDTH].copy_from_slice(&self.to_le_bytes());
            }

            fn to_value(self) -> Value {
                Value::$tag(self)
            }

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$tag(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

impl_scalar!(i8, Byte);
impl_scalar!(u8, UByte);
impl_scalar!(i16, Short);
impl_scalar!(u16, UShort);
impl_scalar!(i32, Int);
impl_scalar!(u32, UInt);
impl_scalar!(i64, Long);
impl_scalar!(u64, ULong);
impl_scalar!(f32, Float);
impl_scalar!(f64, Double);

impl Scalar for bool {
    const WIDTH: usize = 1;
    const TYPE: ScalarType = ScalarType::Bool;

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }

    #[inline]
    fn write_le(self, out: &mut [u8]) {
        out[0] = u8::from(self);
    }

    fn to_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }
}

// ============================================================================
// BOUNDS-CHECKED ACCESS
// ============================================================================

/// Read a scalar at `pos`, or `None` if it would run past the end.
#[inline]
pub fn read_scalar_at<T: Scalar>(buf: &[u8], pos: usize) -> Option<T> {
    let end = pos.checked_add(T::WIDTH)?;
    buf.get(pos..end).map(T::read_le)
}

/// Write a scalar at `pos`. Returns `false` (and writes nothing) if out of range.
#[inline]
pub fn write_scalar_at<T: Scalar>(buf: &mut [u8], pos: usize, value: T) -> bool {
    let Some(end) = pos.checked_add(T::WIDTH) else {
        return false;
    };
    match buf.get_mut(pos..end) {
        Some(dst) => {
            value.write_le(dst);
            true
        }
        None => false,
    }
}

/// Padding needed so that `buf_size` becomes a multiple of `alignment` (a power of two).
#[inline]
pub fn padding_bytes(buf_size: usize, alignment: usize) -> usize {
    (!buf_size).wrapping_add(1) & alignment.wrapping_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_widths_match_types() {
        for ty in ScalarType::ALL {
            assert_eq!(ty.zero().width(), ty.width());
            assert_eq!(ScalarType::from_name(ty.fbs_name()), Some(ty));
        }
        assert_eq!(<i32 as Scalar>::WIDTH, ScalarType::Int.width());
        assert_eq!(<bool as Scalar>::WIDTH, 1);
    }

    #[test]
    fn test_sized_aliases() {
        assert_eq!(ScalarType::from_name("uint8"), Some(ScalarType::UByte));
        assert_eq!(ScalarType::from_name("Int32"), Some(ScalarType::Int));
        assert_eq!(ScalarType::from_name("float64"), Some(ScalarType::Double));
        assert_eq!(ScalarType::from_name("string"), None);
    }

    #[test]
    fn test_read_past_end_is_none() {
        let buf = [1u8, 2, 3];
        assert_eq!(read_scalar_at::<u16>(&buf, 1), Some(0x0302));
        assert_eq!(read_scalar_at::<u16>(&buf, 2), None);
        assert_eq!(read_scalar_at::<u32>(&buf, usize::MAX), None);
    }

    #[test]
    fn test_write_out_of_range_leaves_buffer() {
        let mut buf = [0u8; 4];
        assert!(!write_scalar_at(&mut buf, 2, 0xAABB_CCDDu32));
        assert_eq!(buf, [0; 4]);
        assert!(write_scalar_at(&mut buf, 0, 0xAABB_CCDDu32));
        assert_eq!(buf, [0xDD, 0xCC, 0xBB, 0xAA]);
    }

    #[test]
    fn test_value_range_checks() {
        assert_eq!(Value::from_i64(ScalarType::UByte, 255), Some(Value::UByte(255)));
        assert_eq!(Value::from_i64(ScalarType::UByte, 256), None);
        assert_eq!(Value::from_i64(ScalarType::Byte, -129), None);
        assert_eq!(Value::from_f64(ScalarType::Int, 1.5), None);
        assert_eq!(Value::parse(ScalarType::Int, "150"), Some(Value::Int(150)));
        assert_eq!(Value::parse(ScalarType::Bool, "true"), Some(Value::Bool(true)));
        assert_eq!(
            Value::parse(ScalarType::ULong, "18446744073709551615"),
            Some(Value::ULong(u64::MAX))
        );
    }

    #[test]
    fn test_padding_bytes() {
        assert_eq!(padding_bytes(0, 4), 0);
        assert_eq!(padding_bytes(1, 4), 3);
        assert_eq!(padding_bytes(6, 4), 2);
        assert_eq!(padding_bytes(8, 8), 0);
        assert_eq!(padding_bytes(5, 1), 0);
    }
}
