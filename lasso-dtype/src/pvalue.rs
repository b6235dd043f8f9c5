use std::fmt::{Display, Formatter};

use lasso_error::{LassoError, lasso_err};
use num_traits::NumCast;
use paste::paste;

use crate::{NativePType, PType, match_each_native_ptype};

/// A single dimension value whose primitive type is only known at runtime.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PValue {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

macro_rules! as_primitive {
    ($T:ty) => {
        paste! {
            #[doc = "Access PValue as `" $T "`, returning `None` if the value does not fit"]
            pub fn [<as_ $T>](self) -> Option<$T> {
                match self {
                    PValue::U8(v) => <$T as NumCast>::from(v),
                    PValue::U16(v) => <$T as NumCast>::from(v),
                    PValue::U32(v) => <$T as NumCast>::from(v),
                    PValue::U64(v) => <$T as NumCast>::from(v),
                    PValue::I8(v) => <$T as NumCast>::from(v),
                    PValue::I16(v) => <$T as NumCast>::from(v),
                    PValue::I32(v) => <$T as NumCast>::from(v),
                    PValue::I64(v) => <$T as NumCast>::from(v),
                    PValue::F32(v) => <$T as NumCast>::from(v),
                    PValue::F64(v) => <$T as NumCast>::from(v),
                }
            }
        }
    };
}

impl PValue {
    pub fn ptype(&self) -> PType {
        match self {
            Self::U8(_) => PType::U8,
            Self::U16(_) => PType::U16,
            Self::U32(_) => PType::U32,
            Self::U64(_) => PType::U64,
            Self::I8(_) => PType::I8,
            Self::I16(_) => PType::I16,
            Self::I32(_) => PType::I32,
            Self::I64(_) => PType::I64,
            Self::F32(_) => PType::F32,
            Self::F64(_) => PType::F64,
        }
    }

    #[inline]
    pub fn as_primitive<T: NativePType + TryFrom<PValue, Error = LassoError>>(
        &self,
    ) -> Result<T, LassoError> {
        T::try_from(*self)
    }

    /// Numerically convert this value into the given [`PType`].
    ///
    /// Fails if the value cannot be represented, e.g. a negative value cast to an unsigned type.
    pub fn cast(&self, ptype: PType) -> Result<PValue, LassoError> {
        if self.ptype() == ptype {
            return Ok(*self);
        }
        match_each_native_ptype!(ptype, |$T| {
            Ok(PValue::from(self.as_primitive::<$T>()?))
        })
    }

    as_primitive!(i8);
    as_primitive!(i16);
    as_primitive!(i32);
    as_primitive!(i64);
    as_primitive!(u8);
    as_primitive!(u16);
    as_primitive!(u32);
    as_primitive!(u64);
    as_primitive!(f32);
    as_primitive!(f64);
}

macro_rules! int_pvalue {
    ($T:ty, $PT:tt) => {
        impl TryFrom<PValue> for $T {
            type Error = LassoError;

            fn try_from(value: PValue) -> Result<Self, Self::Error> {
                match value {
                    PValue::U8(v) => <$T as NumCast>::from(v),
                    PValue::U16(v) => <$T as NumCast>::from(v),
                    PValue::U32(v) => <$T as NumCast>::from(v),
                    PValue::U64(v) => <$T as NumCast>::from(v),
                    PValue::I8(v) => <$T as NumCast>::from(v),
                    PValue::I16(v) => <$T as NumCast>::from(v),
                    PValue::I32(v) => <$T as NumCast>::from(v),
                    PValue::I64(v) => <$T as NumCast>::from(v),
                    _ => None,
                }
                .ok_or_else(|| {
                    lasso_err!(MismatchedTypes: PType::$PT, value)
                })
            }
        }
    };
}

int_pvalue!(u8, U8);
int_pvalue!(u16, U16);
int_pvalue!(u32, U32);
int_pvalue!(u64, U64);
int_pvalue!(i8, I8);
int_pvalue!(i16, I16);
int_pvalue!(i32, I32);
int_pvalue!(i64, I64);

macro_rules! float_pvalue {
    ($T:ty, $PT:tt) => {
        impl TryFrom<PValue> for $T {
            type Error = LassoError;

            fn try_from(value: PValue) -> Result<Self, Self::Error> {
                match value {
                    PValue::F32(f) => <$T as NumCast>::from(f),
                    PValue::F64(f) => <$T as NumCast>::from(f),
                    PValue::U8(v) => <$T as NumCast>::from(v),
                    PValue::U16(v) => <$T as NumCast>::from(v),
                    PValue::U32(v) => <$T as NumCast>::from(v),
                    PValue::U64(v) => <$T as NumCast>::from(v),
                    PValue::I8(v) => <$T as NumCast>::from(v),
                    PValue::I16(v) => <$T as NumCast>::from(v),
                    PValue::I32(v) => <$T as NumCast>::from(v),
                    PValue::I64(v) => <$T as NumCast>::from(v),
                }
                .ok_or_else(|| {
                    lasso_err!(MismatchedTypes: PType::$PT, value)
                })
            }
        }
    };
}

float_pvalue!(f32, F32);
float_pvalue!(f64, F64);

macro_rules! impl_pvalue {
    ($T:ty, $PT:tt) => {
        impl From<$T> for PValue {
            fn from(value: $T) -> Self {
                PValue::$PT(value)
            }
        }
    };
}

impl_pvalue!(u8, U8);
impl_pvalue!(u16, U16);
impl_pvalue!(u32, U32);
impl_pvalue!(u64, U64);
impl_pvalue!(i8, I8);
impl_pvalue!(i16, I16);
impl_pvalue!(i32, I32);
impl_pvalue!(i64, I64);
impl_pvalue!(f32, F32);
impl_pvalue!(f64, F64);

impl Display for PValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::U8(v) => write!(f, "{v}u8"),
            Self::U16(v) => write!(f, "{v}u16"),
            Self::U32(v) => write!(f, "{v}u32"),
            Self::U64(v) => write!(f, "{v}u64"),
            Self::I8(v) => write!(f, "{v}i8"),
            Self::I16(v) => write!(f, "{v}i16"),
            Self::I32(v) => write!(f, "{v}i32"),
            Self::I64(v) => write!(f, "{v}i64"),
            Self::F32(v) => write!(f, "{v}f32"),
            Self::F64(v) => write!(f, "{v}f64"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cast_within_range() {
        assert_eq!(PValue::I32(7).cast(PType::U8).unwrap(), PValue::U8(7));
        assert_eq!(PValue::U16(300).cast(PType::F64).unwrap(), PValue::F64(300.0));
    }

    #[test]
    fn cast_out_of_range_fails() {
        assert!(PValue::I32(-1).cast(PType::U32).is_err());
        assert!(PValue::U16(300).cast(PType::U8).is_err());
        assert!(PValue::F64(1.5).cast(PType::I32).is_err());
    }

    #[test]
    fn accessors_check_range() {
        assert_eq!(PValue::F32(2.0).as_u8(), Some(2));
        assert_eq!(PValue::I8(-3).as_u64(), None);
    }
}
