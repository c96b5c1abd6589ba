//! Error types for text/value conversion.
//!
//! Every fallible operation in this crate returns [`Result`]. The non-throwing
//! families (`try_parse`, `try_parse_nullable`, ...) never produce an [`Error`]
//! for malformed input; they report failure through `Option` instead. The
//! throwing families wrap them and turn a failure into [`Error::Conversion`].
//!
//! ## Error Categories
//!
//! - **Conversion failures**: the input cannot be interpreted as the target type
//! - **Unsupported types**: the target type is outside the closed set of kinds
//! - **Invalid arguments**: a missing type/value, or a non-enumeration type where one is required
//! - **Invalid format specifiers**: a format string that does not apply to the value
//!
//! ## Examples
//!
//! ```rust
//! use textconv::{Error, ParseOptions, Primitive};
//!
//! let err = i32::parse("twelve", &ParseOptions::default()).unwrap_err();
//! assert!(err.is_conversion());
//! assert!(err.to_string().contains("twelve"));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors raised by the conversion engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The input text could not be converted to the target type.
    #[error("Cannot convert {input:?} to {target}")]
    Conversion { input: String, target: String },

    /// The target type is not one of the supported kinds.
    #[error("Conversion from {from} to {to} is not supported")]
    NotSupported { from: String, to: String },

    /// A required argument was absent.
    #[error("Value cannot be null (parameter '{0}')")]
    ArgumentNull(String),

    /// An enumeration type was required.
    #[error("Type {0} is not an enumeration")]
    NotAnEnum(String),

    /// A value failed an allow-list, range or mask check.
    #[error("Value {value} is out of range (parameter '{param}')")]
    ArgumentOutOfRange { param: String, value: String },

    /// The format specifier is malformed or does not apply to the value.
    #[error("Invalid format specifier {spec:?}: {msg}")]
    InvalidFormat { spec: String, msg: String },
}

impl Error {
    /// Creates a conversion error carrying the original input and the target type name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use textconv::Error;
    ///
    /// let err = Error::conversion("abc", "i32");
    /// assert_eq!(err.to_string(), "Cannot convert \"abc\" to i32");
    /// ```
    pub fn conversion(input: &str, target: &str) -> Self {
        Error::Conversion {
            input: input.to_string(),
            target: target.to_string(),
        }
    }

    /// Creates an unsupported-type error naming the source and target types.
    pub fn not_supported(from: &str, to: &str) -> Self {
        Error::NotSupported {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Creates a null-argument error for the named parameter.
    pub fn argument_null(param: &str) -> Self {
        Error::ArgumentNull(param.to_string())
    }

    /// Creates an error for a type that is not an enumeration.
    pub fn not_an_enum(type_name: &str) -> Self {
        Error::NotAnEnum(type_name.to_string())
    }

    /// Creates an out-of-range error for a rejected value.
    pub fn out_of_range<T: fmt::Display>(param: &str, value: T) -> Self {
        Error::ArgumentOutOfRange {
            param: param.to_string(),
            value: value.to_string(),
        }
    }

    /// Creates an invalid format specifier error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use textconv::Error;
    ///
    /// let err = Error::invalid_format("Q", "unknown specifier");
    /// assert!(err.to_string().contains("\"Q\""));
    /// ```
    pub fn invalid_format(spec: &str, msg: &str) -> Self {
        Error::InvalidFormat {
            spec: spec.to_string(),
            msg: msg.to_string(),
        }
    }

    /// Returns `true` for conversion failures.
    #[inline]
    #[must_use]
    pub const fn is_conversion(&self) -> bool {
        matches!(self, Error::Conversion { .. })
    }

    /// Returns `true` for unsupported-type errors.
    #[inline]
    #[must_use]
    pub const fn is_not_supported(&self) -> bool {
        matches!(self, Error::NotSupported { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
