//! Shape descriptors for custom-call kernels.
//!
//! A kernel declares one [`TensorSpec`] per output and per input: an element
//! type plus ordered dimension sizes. Element types are whatever spelling the
//! caller hands over; known scalar spellings are recognised so that byte
//! sizes can be computed, everything else is carried through verbatim.

pub mod shape;

#[cfg(any(test, feature = "proptest"))]
pub mod proptest_gen;


use std::fmt;

use strum::IntoEnumIterator;

pub use shape::TensorSpec;

/// Scalar element kinds with a fixed C++ spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::EnumCount, strum::EnumIter, strum::FromRepr)]
#[cfg_attr(any(test, feature = "proptest"), derive(proptest_derive::Arbitrary))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScalarKind {
    Bool = 0,

    Int8 = 1,
    UInt8 = 2,
    Int16 = 3,
    UInt16 = 4,
    Int32 = 5,
    UInt32 = 6,
    Int64 = 7,
    UInt64 = 8,

    Float16 = 9,
    BFloat16 = 10,
    Float32 = 11,
    Float64 = 12,
}

impl ScalarKind {
    pub const fn bytes(&self) -> usize {
        match self {
            Self::Bool => 1,
            Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 => 4,
            Self::Int64 | Self::UInt64 => 8,
            Self::Float16 | Self::BFloat16 => 2,
            Self::Float32 => 4,
            Self::Float64 => 8,
        }
    }

    pub const fn is_signed(&self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }

    pub const fn is_unsigned(&self) -> bool {
        matches!(self, Self::UInt8 | Self::UInt16 | Self::UInt32 | Self::UInt64)
    }

    pub const fn is_float(&self) -> bool {
        matches!(self, Self::Float16 | Self::BFloat16 | Self::Float32 | Self::Float64)
    }

    /// C++ spelling used inside the synthesized translation unit.
    ///
    /// Integer kinds use the `<cstdint>` fixed-width names so the generated
    /// code does not depend on the target's `int`/`long` widths.
    pub const fn cpp_name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "int8_t",
            Self::UInt8 => "uint8_t",
            Self::Int16 => "int16_t",
            Self::UInt16 => "uint16_t",
            Self::Int32 => "int32_t",
            Self::UInt32 => "uint32_t",
            Self::Int64 => "int64_t",
            Self::UInt64 => "uint64_t",
            Self::Float16 => "_Float16",
            Self::BFloat16 => "__bf16",
            Self::Float32 => "float",
            Self::Float64 => "double",
        }
    }

    /// Inverse of [`ScalarKind::cpp_name`]. Only exact spellings match.
    pub fn from_cpp_name(name: &str) -> Option<Self> {
        Self::iter().find(|kind| kind.cpp_name() == name)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cpp_name())
    }
}

/// Element type of a tensor buffer.
///
/// `Named` keeps a caller-supplied type name exactly as given. No validation
/// happens here: a bad name only shows up once the compiler rejects it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ElementType {
    Scalar(ScalarKind),
    Named(String),
}

impl ElementType {
    /// Spelling inserted into generated source.
    pub fn cpp_name(&self) -> &str {
        match self {
            Self::Scalar(kind) => kind.cpp_name(),
            Self::Named(name) => name,
        }
    }

    pub fn scalar(&self) -> Option<ScalarKind> {
        match self {
            Self::Scalar(kind) => Some(*kind),
            Self::Named(_) => None,
        }
    }

    /// Element size in bytes, when the element type is a known scalar.
    pub fn bytes(&self) -> Option<usize> {
        self.scalar().map(|kind| kind.bytes())
    }
}

impl From<ScalarKind> for ElementType {
    fn from(kind: ScalarKind) -> Self {
        Self::Scalar(kind)
    }
}

impl From<&str> for ElementType {
    fn from(name: &str) -> Self {
        match ScalarKind::from_cpp_name(name) {
            Some(kind) => Self::Scalar(kind),
            None => Self::Named(name.to_string()),
        }
    }
}

impl From<String> for ElementType {
    fn from(name: String) -> Self {
        match ScalarKind::from_cpp_name(&name) {
            Some(kind) => Self::Scalar(kind),
            None => Self::Named(name),
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cpp_name())
    }
}
