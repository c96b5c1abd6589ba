//! # textconv
//!
//! Culture-aware conversion between text and typed values.
//!
//! ## What does it do?
//!
//! `textconv` parses loosely formatted input (form fields, CSV cells, query
//! strings, JavaScript `Date` renderings) into integers, floats, decimals,
//! booleans, GUIDs, dates, times, durations and enumerations, and formats
//! those values back with .NET-style standard and custom format specifiers.
//!
//! ## Key Features
//!
//! - **Culture Aware**: Separators, symbols, month names and date order come
//!   from a [`Culture`]
//! - **Forgiving Dates**: Configured exact formats, then the ISO round-trip
//!   pattern, then a culture-general free-form reader
//! - **Enumerations**: Name, numeric and comma-separated flag parsing with a
//!   process-wide metadata cache
//! - **Runtime Targets**: [`dispatch`] converts to a [`TargetType`] chosen at
//!   runtime and reports default-vs-parsed outcomes
//! - **Global Configuration**: Number styles and date formats live in an
//!   atomically swapped [`ConversionConfig`]
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! textconv = "0.1"
//! ```
//!
//! ### Parsing
//!
//! ```rust
//! use textconv::{ParseOptions, Primitive};
//!
//! let options = ParseOptions::new().with_culture("de-DE");
//! assert_eq!(i32::try_parse(" 67.500 ", &options), Some(67500));
//! assert_eq!(i32::parse_or("(67)", -1, &options), -1);
//!
//! let date: chrono::NaiveDate = textconv::parse("20241231").unwrap();
//! assert_eq!(date.to_string(), "2024-12-31");
//! ```
//!
//! ### Formatting
//!
//! ```rust
//! use textconv::{Culture, Primitive};
//!
//! assert_eq!(textconv::format(&1.5e-5f64, None).unwrap(), "1.5E-05");
//! assert_eq!(1.5e-5f64.format_with(Some("N10"), Culture::invariant()).unwrap(), "0.0000150000");
//!
//! let us = Culture::resolve(Some("en-US"));
//! assert_eq!(1234.5f64.format_with(Some("C"), us).unwrap(), "$1,234.50");
//! ```
//!
//! ### Enumerations
//!
//! ```rust
//! use textconv::{enumeration, enums, ParseOptions};
//!
//! enumeration! {
//!     pub struct Sizes: u8 {
//!         const B2 = 2;
//!         const B4 = 4;
//!         const B8 = 8;
//!         const BT = 16;
//!         const BA = 30;
//!     }
//! }
//!
//! let options = ParseOptions::default();
//! assert_eq!(enums::parse::<Sizes>("ba", &options).unwrap(), Sizes::BA);
//! assert!(enums::parse::<Sizes>("ba", &options.clone().with_ignore_case(false)).is_err());
//! ```
//!
//! ## Modules
//!
//! - [`primitive`]: the [`Primitive`] trait and its scalar implementations
//! - [`enums`]: enumeration metadata, parsing, formatting and range checks
//! - [`dispatch`]: parsing to a runtime [`TargetType`]
//! - [`format`]: value formatting and composite templates
//! - [`config`]: the global [`ConversionConfig`]
//! - [`culture`]: built-in [`Culture`] tables
//! - [`options`]: [`ParseOptions`] and [`TrimmingOptions`]
//! - [`value`]: the dynamic [`Value`]
//! - [`error`]: [`Error`] and [`Result`]

pub mod config;
pub mod culture;
mod datetime;
pub mod dispatch;
mod duration;
pub mod enums;
pub mod error;
pub mod format;
pub mod macros;
mod number_format;
mod number_parse;
pub mod options;
mod pattern;
pub mod primitive;
pub mod value;

pub use config::{ConversionConfig, NumberStyles};
pub use culture::{Culture, DateOrder};
pub use dispatch::Outcome;
pub use enums::{EnumMetadata, EnumType, EnumValue, Enumeration, Underlying, UnderlyingInt};
pub use error::{Error, Result};
pub use options::{ParseContext, ParseOptions, TrimmingOptions};
pub use primitive::Primitive;
pub use value::{Kind, Opaque, TargetType, Value};

#[doc(hidden)]
pub use bitflags;

/// Parse `text` as `T` with default options.
///
/// # Examples
///
/// ```rust
/// let n: u16 = textconv::parse("1,024").unwrap();
/// assert_eq!(n, 1024);
/// assert!(textconv::parse::<u16>("-1").is_err());
/// ```
///
/// # Errors
///
/// Returns [`Error::Conversion`] when the text is absent, blank or not a `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse<'a, T: Primitive>(text: impl Into<Option<&'a str>>) -> Result<T> {
    T::parse(text, &ParseOptions::default())
}

/// Parse `text` as `T` with default options, returning `None` on failure.
///
/// # Examples
///
/// ```rust
/// assert_eq!(textconv::try_parse::<bool>("TRUE"), Some(true));
/// assert_eq!(textconv::try_parse::<bool>(None), None);
/// ```
#[must_use]
pub fn try_parse<'a, T: Primitive>(text: impl Into<Option<&'a str>>) -> Option<T> {
    T::try_parse(text, &ParseOptions::default())
}

/// Format `value` under the invariant culture.
///
/// # Examples
///
/// ```rust
/// assert_eq!(textconv::format(&255u8, Some("X4")).unwrap(), "00FF");
/// ```
///
/// # Errors
///
/// Returns [`Error::InvalidFormat`] when `spec` does not apply to `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn format<T: Primitive>(value: &T, spec: Option<&str>) -> Result<String> {
    value.to_text(spec)
}
