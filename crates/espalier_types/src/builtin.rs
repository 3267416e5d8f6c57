//! Built-in primitive types.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A built-in primitive type at the root of every derived-type chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Builtin {
    /// 8-bit signed integer.
    Int8,
    /// 16-bit signed integer.
    Int16,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 8-bit unsigned integer.
    Uint8,
    /// 16-bit unsigned integer.
    Uint16,
    /// 32-bit unsigned integer.
    Uint32,
    /// 64-bit unsigned integer.
    Uint64,
    /// Character string.
    Str,
    /// `true` or `false`.
    Boolean,
    /// A leaf with no value; presence is the information.
    Empty,
    /// Arbitrary binary data.
    Binary,
    /// A closed set of named values.
    Enumeration,
    /// A set of named bit positions.
    Bits,
    /// A reference to another leaf instance by path.
    Leafref,
    /// A reference to a globally defined identity.
    Identityref,
}

impl Builtin {
    /// Maps a type name to its builtin, if it is one.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int8" => Some(Self::Int8),
            "int16" => Some(Self::Int16),
            "int32" => Some(Self::Int32),
            "int64" => Some(Self::Int64),
            "uint8" => Some(Self::Uint8),
            "uint16" => Some(Self::Uint16),
            "uint32" => Some(Self::Uint32),
            "uint64" => Some(Self::Uint64),
            "string" => Some(Self::Str),
            "boolean" => Some(Self::Boolean),
            "empty" => Some(Self::Empty),
            "binary" => Some(Self::Binary),
            "enumeration" => Some(Self::Enumeration),
            "bits" => Some(Self::Bits),
            "leafref" => Some(Self::Leafref),
            "identityref" => Some(Self::Identityref),
            _ => None,
        }
    }

    /// Returns the type name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Str => "string",
            Self::Boolean => "boolean",
            Self::Empty => "empty",
            Self::Binary => "binary",
            Self::Enumeration => "enumeration",
            Self::Bits => "bits",
            Self::Leafref => "leafref",
            Self::Identityref => "identityref",
        }
    }

    /// Intrinsic value bounds for integer types; `None` otherwise.
    #[must_use]
    pub const fn value_bounds(self) -> Option<(i128, i128)> {
        match self {
            Self::Int8 => Some((i8::MIN as i128, i8::MAX as i128)),
            Self::Int16 => Some((i16::MIN as i128, i16::MAX as i128)),
            Self::Int32 => Some((i32::MIN as i128, i32::MAX as i128)),
            Self::Int64 => Some((i64::MIN as i128, i64::MAX as i128)),
            Self::Uint8 => Some((0, u8::MAX as i128)),
            Self::Uint16 => Some((0, u16::MAX as i128)),
            Self::Uint32 => Some((0, u32::MAX as i128)),
            Self::Uint64 => Some((0, u64::MAX as i128)),
            _ => None,
        }
    }

    /// Intrinsic length bounds for string/binary; `None` otherwise.
    #[must_use]
    pub const fn length_bounds(self) -> Option<(i128, i128)> {
        match self {
            Self::Str | Self::Binary => Some((0, u64::MAX as i128)),
            _ => None,
        }
    }

    /// Returns true if `range` restrictions apply to this builtin.
    #[must_use]
    pub const fn rangeable(self) -> bool {
        self.value_bounds().is_some()
    }

    /// Returns true if `pattern` restrictions apply to this builtin.
    #[must_use]
    pub const fn patternable(self) -> bool {
        matches!(self, Self::Str)
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
