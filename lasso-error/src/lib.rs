#![deny(missing_docs)]
#![feature(error_generic_member_access)]

//! Error handling for Lasso.
//!
//! Every fallible operation in the workspace returns a [`LassoResult`]. Errors are raised with
//! the [`lasso_err!`] and [`lasso_bail!`] macros, which capture a backtrace at the point the
//! condition was detected.

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;
use std::{env, fmt, io};

/// A string that can be used as an error message.
#[derive(Debug)]
pub struct ErrString(Cow<'static, str>);

#[allow(clippy::fallible_impl_from)]
impl<T> From<T> for ErrString
where
    T: Into<Cow<'static, str>>,
{
    #[allow(clippy::panic)]
    fn from(msg: T) -> Self {
        if env::var("LASSO_PANIC_ON_ERR").as_deref().unwrap_or("") == "1" {
            panic!("{}\nBacktrace:\n{}", msg.into(), Backtrace::capture());
        } else {
            Self(msg.into())
        }
    }
}

impl AsRef<str> for ErrString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ErrString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for ErrString {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// The top-level error type for Lasso.
#[derive(thiserror::Error)]
#[non_exhaustive]
pub enum LassoError {
    /// An index is out of bounds.
    #[error("index {0} out of bounds from {1} to {2}\nBacktrace:\n{3}")]
    OutOfBounds(usize, usize, usize, Backtrace),
    /// An argument or configuration value is invalid.
    #[error("{0}\nBacktrace:\n{1}")]
    InvalidArgument(ErrString, Backtrace),
    /// A feature is known but not supported.
    #[error("{0} not implemented for {1}\nBacktrace:\n{2}")]
    NotImplemented(ErrString, ErrString, Backtrace),
    /// A dimension with the same field identifier already exists in a schema.
    #[error("duplicate field {0}\nBacktrace:\n{1}")]
    DuplicateField(ErrString, Backtrace),
    /// A value was accessed through the wrong primitive type.
    #[error("expected type: {0} but instead got {1}\nBacktrace:\n{2}")]
    MismatchedTypes(ErrString, ErrString, Backtrace),
    /// An internal assertion failed.
    #[error("{0}\nBacktrace:\n{1}")]
    AssertionFailed(ErrString, Backtrace),
    /// An error wrapped with additional context.
    #[error("{0}: {1}")]
    Context(ErrString, Box<LassoError>),
    /// An I/O error raised while opening or reading a source.
    #[error(transparent)]
    IOError(
        #[from]
        #[backtrace]
        io::Error,
    ),
}

impl LassoError {
    /// Adds additional context to an error.
    pub fn with_context<T: Into<ErrString>>(self, msg: T) -> Self {
        LassoError::Context(msg.into(), Box::new(self))
    }

    /// Returns the innermost error, skipping any [`LassoError::Context`] wrappers.
    pub fn root_cause(&self) -> &LassoError {
        match self {
            LassoError::Context(_, inner) => inner.root_cause(),
            other => other,
        }
    }
}

impl Debug for LassoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

/// A type alias for Results that return [`LassoError`]s as their error type.
pub type LassoResult<T> = Result<T, LassoError>;

/// A trait for unwrapping a value, panicking with a [`LassoError`] if the value is not present.
pub trait LassoUnwrap {
    /// The type of the value being unwrapped.
    type Output;

    /// Returns the value of the result if it is Ok, otherwise panics with the error.
    /// Should be called only in contexts where the error condition represents a bug (programmer error).
    fn lasso_unwrap(self) -> Self::Output;
}

impl<T, E> LassoUnwrap for Result<T, E>
where
    E: Into<LassoError>,
{
    type Output = T;

    #[inline(always)]
    fn lasso_unwrap(self) -> Self::Output {
        self.map_err(|err| err.into())
            .unwrap_or_else(|err| lasso_panic!(err))
    }
}

/// A trait for expecting a value, panicking with a [`LassoError`] if the value is not present.
pub trait LassoExpect {
    /// The type of the value being expected.
    type Output;

    /// Returns the value of the result if it is Ok, otherwise panics with the error.
    /// Should be called only in contexts where the error condition represents a bug (programmer error).
    fn lasso_expect(self, msg: &str) -> Self::Output;
}

impl<T, E> LassoExpect for Result<T, E>
where
    E: Into<LassoError>,
{
    type Output = T;

    #[inline(always)]
    fn lasso_expect(self, msg: &str) -> Self::Output {
        self.map_err(|err| err.into())
            .unwrap_or_else(|e| lasso_panic!(e.with_context(msg.to_string())))
    }
}

impl<T> LassoExpect for Option<T> {
    type Output = T;

    #[inline(always)]
    fn lasso_expect(self, msg: &str) -> Self::Output {
        self.unwrap_or_else(|| {
            let err = LassoError::AssertionFailed(msg.to_string().into(), Backtrace::capture());
            lasso_panic!(err)
        })
    }
}

/// Construct a new [`LassoError`] with a backtrace.
///
/// The variant is selected with a `Variant:` prefix; without one the error is an
/// [`LassoError::InvalidArgument`].
#[macro_export]
macro_rules! lasso_err {
    (OutOfBounds: $idx:expr, $start:expr, $stop:expr) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use(
            $crate::LassoError::OutOfBounds($idx, $start, $stop, Backtrace::capture())
        )
    }};
    (NotImplemented: $func:expr, $by_whom:expr) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use(
            $crate::LassoError::NotImplemented($func.into(), format!("{}", $by_whom).into(), Backtrace::capture())
        )
    }};
    (DuplicateField: $field:expr) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use(
            $crate::LassoError::DuplicateField(format!("{}", $field).into(), Backtrace::capture())
        )
    }};
    (MismatchedTypes: $expected:expr, $actual:expr) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use(
            $crate::LassoError::MismatchedTypes(
                format!("{}", $expected).into(),
                format!("{}", $actual).into(),
                Backtrace::capture(),
            )
        )
    }};
    (Context: $msg:literal, $err:expr) => {{
        $crate::__private::must_use(
            $crate::LassoError::Context($msg.into(), Box::new($err))
        )
    }};
    ($variant:ident: $fmt:literal $(, $arg:expr)* $(,)?) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use(
            $crate::LassoError::$variant(format!($fmt, $($arg),*).into(), Backtrace::capture())
        )
    }};
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::lasso_err!(InvalidArgument: $fmt, $($arg),*)
    };
}

/// Return early with a [`LassoError`], see [`lasso_err!`] for the accepted forms.
#[macro_export]
macro_rules! lasso_bail {
    ($($tt:tt)+) => {
        return Err($crate::lasso_err!($($tt)+))
    };
}

/// Panic with a [`LassoError`].
#[macro_export]
macro_rules! lasso_panic {
    (OutOfBounds: $idx:expr, $start:expr, $stop:expr) => {{
        $crate::lasso_panic!($crate::lasso_err!(OutOfBounds: $idx, $start, $stop))
    }};
    ($variant:ident: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::lasso_panic!($crate::lasso_err!($variant: $fmt, $($arg),*))
    };
    ($err:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        let err: $crate::LassoError = $err;
        panic!("{}", err.with_context(format!($fmt, $($arg),*)))
    }};
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::lasso_panic!($crate::lasso_err!($fmt, $($arg),*))
    };
    ($err:expr) => {{
        let err: $crate::LassoError = $err;
        panic!("{}", err)
    }};
}

#[doc(hidden)]
pub mod __private {
    #[doc(hidden)]
    #[inline]
    #[cold]
    #[must_use]
    pub const fn must_use(error: crate::LassoError) -> crate::LassoError {
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fails_out_of_bounds() -> LassoResult<()> {
        lasso_bail!(OutOfBounds: 10, 0, 10)
    }

    #[test]
    fn bail_returns_variant() {
        let err = fails_out_of_bounds().unwrap_err();
        assert!(matches!(err, LassoError::OutOfBounds(10, 0, 10, _)));
        assert!(err.to_string().starts_with("index 10 out of bounds from 0 to 10"));
    }

    #[test]
    fn default_variant_is_invalid_argument() {
        let err = lasso_err!("capacity must be positive, got {}", 0);
        assert!(matches!(err, LassoError::InvalidArgument(..)));
        assert!(err.to_string().starts_with("capacity must be positive, got 0"));
    }

    #[test]
    fn context_is_transparent_to_root_cause() {
        let err = lasso_err!(DuplicateField: "X").with_context("registering fields");
        assert!(err.to_string().starts_with("registering fields: duplicate field X"));
        assert!(matches!(err.root_cause(), LassoError::DuplicateField(..)));
    }

    #[test]
    fn not_implemented_names_the_feature() {
        let err = lasso_err!(NotImplemented: "waveform data", "drivers.las.reader");
        assert!(
            err.to_string()
                .starts_with("waveform data not implemented for drivers.las.reader")
        );
    }

    #[test]
    fn io_errors_convert() {
        let err: LassoError = io::Error::new(io::ErrorKind::NotFound, "missing.las").into();
        assert!(matches!(err, LassoError::IOError(_)));
    }

    #[test]
    #[should_panic(expected = "cache entry must exist")]
    fn expect_on_none_panics() {
        let value: Option<u32> = None;
        value.lasso_expect("cache entry must exist");
    }
}
