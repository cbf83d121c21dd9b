//! Element representations for the backing store.
//!
//! Every value crosses the arena API as `f64` and is converted to the
//! store's [`ElementType`] on write, following typed-array rules: integer
//! types truncate toward zero and wrap, the clamped byte type saturates
//! and rounds half to even, and non-finite values become zero for every
//! integer type. Elements are stored little-endian, the byte order of the
//! computation module's memory.

use std::fmt;
use std::str::FromStr;

use crate::config::ConfigError;

/// Numeric representation of one element in the backing store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// Signed 8-bit integer.
    I8,
    /// Signed 16-bit integer.
    I16,
    /// Signed 32-bit integer.
    I32,
    /// Unsigned 8-bit integer, wrapping.
    U8,
    /// Unsigned 8-bit integer, saturating with round-half-to-even.
    U8Clamped,
    /// Unsigned 16-bit integer.
    U16,
    /// Unsigned 32-bit integer.
    U32,
    /// 32-bit float.
    F32,
    /// 64-bit float.
    F64,
}

impl ElementType {
    /// All element types, in declaration order.
    pub const ALL: [ElementType; 9] = [
        Self::I8,
        Self::I16,
        Self::I32,
        Self::U8,
        Self::U8Clamped,
        Self::U16,
        Self::U32,
        Self::F32,
        Self::F64,
    ];

    /// Width of one element in bytes.
    pub const fn width(self) -> usize {
        match self {
            Self::I8 | Self::U8 | Self::U8Clamped => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }

    /// Whether the type stores floating point values.
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Typed-array name of this element type (e.g. `"Float32Array"`).
    pub const fn array_name(self) -> &'static str {
        match self {
            Self::I8 => "Int8Array",
            Self::I16 => "Int16Array",
            Self::I32 => "Int32Array",
            Self::U8 => "Uint8Array",
            Self::U8Clamped => "Uint8ClampedArray",
            Self::U16 => "Uint16Array",
            Self::U32 => "Uint32Array",
            Self::F32 => "Float32Array",
            Self::F64 => "Float64Array",
        }
    }

    /// Convert `value` to this representation and write it into `out`.
    ///
    /// # Panics
    ///
    /// Panics if `out.len() != self.width()`.
    pub fn encode(self, value: f64, out: &mut [u8]) {
        match self {
            Self::I8 => out.copy_from_slice(&(wrap(value, 8) as u8 as i8).to_le_bytes()),
            Self::I16 => out.copy_from_slice(&(wrap(value, 16) as u16 as i16).to_le_bytes()),
            Self::I32 => out.copy_from_slice(&(wrap(value, 32) as u32 as i32).to_le_bytes()),
            Self::U8 => out.copy_from_slice(&(wrap(value, 8) as u8).to_le_bytes()),
            Self::U8Clamped => out.copy_from_slice(&[clamp_byte(value)]),
            Self::U16 => out.copy_from_slice(&(wrap(value, 16) as u16).to_le_bytes()),
            Self::U32 => out.copy_from_slice(&(wrap(value, 32) as u32).to_le_bytes()),
            Self::F32 => out.copy_from_slice(&(value as f32).to_le_bytes()),
            Self::F64 => out.copy_from_slice(&value.to_le_bytes()),
        }
    }

    /// Read one element of this representation from `bytes`.
    ///
    /// # Panics
    ///
    /// Panics if `bytes.len() != self.width()`.
    pub fn decode(self, bytes: &[u8]) -> f64 {
        match self {
            Self::I8 => f64::from(i8::from_le_bytes([bytes[0]])),
            Self::I16 => f64::from(i16::from_le_bytes([bytes[0], bytes[1]])),
            Self::I32 => f64::from(i32::from_le_bytes(word(bytes))),
            Self::U8 | Self::U8Clamped => f64::from(bytes[0]),
            Self::U16 => f64::from(u16::from_le_bytes([bytes[0], bytes[1]])),
            Self::U32 => f64::from(u32::from_le_bytes(word(bytes))),
            Self::F32 => f64::from(f32::from_le_bytes(word(bytes))),
            Self::F64 => {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(bytes);
                f64::from_le_bytes(buf)
            }
        }
    }

    /// The value a round trip through this representation produces.
    pub fn coerce(self, value: f64) -> f64 {
        let mut buf = [0u8; 8];
        let slot = &mut buf[..self.width()];
        self.encode(value, slot);
        self.decode(slot)
    }
}

/// Truncate toward zero and reduce modulo `2^bits`. Non-finite values map to 0.
fn wrap(value: f64, bits: u32) -> u64 {
    if !value.is_finite() {
        return 0;
    }
    let modulus = (1u64 << bits) as f64;
    value.trunc().rem_euclid(modulus) as u64
}

fn clamp_byte(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 255.0).round_ties_even() as u8
}

fn word(bytes: &[u8]) -> [u8; 4] {
    [bytes[0], bytes[1], bytes[2], bytes[3]]
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.array_name())
    }
}

impl FromStr for ElementType {
    type Err = ConfigError;

    /// Accepts typed-array names (`"Float32Array"`) and short names (`"f32"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = match s {
            "Int8Array" | "i8" => Self::I8,
            "Int16Array" | "i16" => Self::I16,
            "Int32Array" | "i32" => Self::I32,
            "Uint8Array" | "u8" => Self::U8,
            "Uint8ClampedArray" | "u8_clamped" => Self::U8Clamped,
            "Uint16Array" | "u16" => Self::U16,
            "Uint32Array" | "u32" => Self::U32,
            "Float32Array" | "f32" => Self::F32,
            "Float64Array" | "f64" => Self::F64,
            other => {
                return Err(ConfigError::UnknownElementType {
                    name: other.to_string(),
                })
            }
        };
        Ok(parsed)
    }
}
