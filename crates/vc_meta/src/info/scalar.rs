use alloc::format;
use alloc::string::String;
use core::any::{Any, type_name};
use core::fmt;

use crate::ReflectError;

// -----------------------------------------------------------------------------
// ScalarKind

/// The leaf encodings a [`Scalar`] can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Int,
    UInt,
    Float,
    Char,
    Str,
}

impl ScalarKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "boolean",
            Self::Int => "integer",
            Self::UInt => "unsigned integer",
            Self::Float => "number",
            Self::Char => "character",
            Self::Str => "string",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// -----------------------------------------------------------------------------
// ScalarRef / ScalarValue

/// A borrowed leaf value handed to a [`Writer`](crate::serde::Writer).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarRef<'a> {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    /// Kept apart from [`ScalarRef::Float`] so it prints at its own precision.
    Float32(f32),
    Char(char),
    Str(&'a str),
}

/// An owned leaf value produced by a [`Reader`](crate::serde::Reader).
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Char(char),
    Str(String),
}

impl ScalarValue {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Self::Bool(_) => ScalarKind::Bool,
            Self::Int(_) => ScalarKind::Int,
            Self::UInt(_) => ScalarKind::UInt,
            Self::Float(_) => ScalarKind::Float,
            Self::Char(_) => ScalarKind::Char,
            Self::Str(_) => ScalarKind::Str,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => fmt::Display::fmt(v, f),
            Self::Int(v) => fmt::Display::fmt(v, f),
            Self::UInt(v) => fmt::Display::fmt(v, f),
            Self::Float(v) => fmt::Display::fmt(v, f),
            Self::Char(v) => fmt::Debug::fmt(v, f),
            Self::Str(v) => fmt::Debug::fmt(v, f),
        }
    }
}

// -----------------------------------------------------------------------------
// Scalar

/// A leaf type with a direct textual codec.
///
/// Implemented for `bool`, `char`, the integer and float primitives and
/// `String`. Out-of-range or wrongly typed input fails with
/// [`ReflectError::TypeMismatch`].
///
/// # Examples
///
/// ```
/// use vc_meta::info::{Scalar, ScalarRef, ScalarValue};
///
/// assert_eq!(7_u8.to_scalar(), ScalarRef::UInt(7));
/// assert_eq!(u8::from_scalar(ScalarValue::Int(7)).unwrap(), 7);
/// assert!(u8::from_scalar(ScalarValue::Int(300)).is_err());
/// assert!(u8::from_scalar(ScalarValue::Str("7".into())).is_err());
/// ```
pub trait Scalar: Any + Default + Send + Sync {
    const KIND: ScalarKind;

    fn to_scalar(&self) -> ScalarRef<'_>;

    fn from_scalar(value: ScalarValue) -> Result<Self, ReflectError>;
}

#[cold]
fn unexpected<T>(value: &ScalarValue) -> ReflectError {
    ReflectError::mismatch(type_name::<T>(), format!("{} `{value}`", value.kind()))
}

macro_rules! impl_signed {
    ($($ty:ty),*) => {$(
        impl Scalar for $ty {
            const KIND: ScalarKind = ScalarKind::Int;

            #[inline]
            fn to_scalar(&self) -> ScalarRef<'_> {
                ScalarRef::Int(i64::try_from(*self).unwrap_or(i64::MAX))
            }

            fn from_scalar(value: ScalarValue) -> Result<Self, ReflectError> {
                let narrowed = match &value {
                    ScalarValue::Int(v) => <$ty>::try_from(*v).ok(),
                    ScalarValue::UInt(v) => <$ty>::try_from(*v).ok(),
                    _ => None,
                };
                narrowed.ok_or_else(|| unexpected::<$ty>(&value))
            }
        }
    )*};
}

macro_rules! impl_unsigned {
    ($($ty:ty),*) => {$(
        impl Scalar for $ty {
            const KIND: ScalarKind = ScalarKind::UInt;

            #[inline]
            fn to_scalar(&self) -> ScalarRef<'_> {
                ScalarRef::UInt(u64::try_from(*self).unwrap_or(u64::MAX))
            }

            fn from_scalar(value: ScalarValue) -> Result<Self, ReflectError> {
                let narrowed = match &value {
                    ScalarValue::Int(v) => <$ty>::try_from(*v).ok(),
                    ScalarValue::UInt(v) => <$ty>::try_from(*v).ok(),
                    _ => None,
                };
                narrowed.ok_or_else(|| unexpected::<$ty>(&value))
            }
        }
    )*};
}

impl_signed!(i8, i16, i32, i64, isize);
impl_unsigned!(u8, u16, u32, u64, usize);

impl Scalar for f64 {
    const KIND: ScalarKind = ScalarKind::Float;

    #[inline]
    fn to_scalar(&self) -> ScalarRef<'_> {
        ScalarRef::Float(*self)
    }

    fn from_scalar(value: ScalarValue) -> Result<Self, ReflectError> {
        match value {
            ScalarValue::Float(v) => Ok(v),
            ScalarValue::Int(v) => Ok(v as f64),
            ScalarValue::UInt(v) => Ok(v as f64),
            other => Err(unexpected::<f64>(&other)),
        }
    }
}

impl Scalar for f32 {
    const KIND: ScalarKind = ScalarKind::Float;

    #[inline]
    fn to_scalar(&self) -> ScalarRef<'_> {
        ScalarRef::Float32(*self)
    }

    fn from_scalar(value: ScalarValue) -> Result<Self, ReflectError> {
        f64::from_scalar(value).map(|v| v as f32)
    }
}

impl Scalar for bool {
    const KIND: ScalarKind = ScalarKind::Bool;

    #[inline]
    fn to_scalar(&self) -> ScalarRef<'_> {
        ScalarRef::Bool(*self)
    }

    fn from_scalar(value: ScalarValue) -> Result<Self, ReflectError> {
        match value {
            ScalarValue::Bool(v) => Ok(v),
            other => Err(unexpected::<bool>(&other)),
        }
    }
}

impl Scalar for char {
    const KIND: ScalarKind = ScalarKind::Char;

    #[inline]
    fn to_scalar(&self) -> ScalarRef<'_> {
        ScalarRef::Char(*self)
    }

    fn from_scalar(value: ScalarValue) -> Result<Self, ReflectError> {
        match value {
            ScalarValue::Char(v) => Ok(v),
            ScalarValue::Str(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(unexpected::<char>(&ScalarValue::Str(s))),
                }
            }
            other => Err(unexpected::<char>(&other)),
        }
    }
}

impl Scalar for String {
    const KIND: ScalarKind = ScalarKind::Str;

    #[inline]
    fn to_scalar(&self) -> ScalarRef<'_> {
        ScalarRef::Str(self)
    }

    fn from_scalar(value: ScalarValue) -> Result<Self, ReflectError> {
        match value {
            ScalarValue::Str(v) => Ok(v),
            ScalarValue::Char(c) => Ok(String::from(c)),
            other => Err(unexpected::<String>(&other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrowing_is_checked() {
        assert_eq!(i8::from_scalar(ScalarValue::Int(-128)).unwrap(), -128);
        assert!(i8::from_scalar(ScalarValue::Int(-129)).is_err());
        assert!(u32::from_scalar(ScalarValue::Int(-1)).is_err());
        assert_eq!(i64::from_scalar(ScalarValue::UInt(5)).unwrap(), 5);

        let err = u8::from_scalar(ScalarValue::Float(1.5)).unwrap_err();
        assert!(matches!(err, ReflectError::TypeMismatch { .. }));
    }

    #[test]
    fn floats_and_text() {
        assert_eq!(f64::from_scalar(ScalarValue::Int(-2)).unwrap(), -2.0);
        assert_eq!(f32::from_scalar(ScalarValue::Float(1.5)).unwrap(), 1.5);
        assert_eq!((-2.0_f32).to_scalar(), ScalarRef::Float32(-2.0));

        assert_eq!(char::from_scalar(ScalarValue::Str("é".into())).unwrap(), 'é');
        assert!(char::from_scalar(ScalarValue::Str("ab".into())).is_err());
        assert_eq!(
            String::from_scalar(ScalarValue::Str("text".into())).unwrap(),
            "text"
        );
        assert!(bool::from_scalar(ScalarValue::Int(1)).is_err());
    }
}
