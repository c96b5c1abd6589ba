//! Runtime-typed parsing: convert text into a [`Value`] of a [`TargetType`].
//!
//! ## Examples
//!
//! ```rust
//! use textconv::dispatch::{self, Outcome};
//! use textconv::{ParseOptions, TargetType, Value};
//!
//! let options = ParseOptions::default();
//! let outcome = dispatch::try_parse("42", &TargetType::of::<i64>(), None, &options).unwrap();
//! assert_eq!(outcome, Outcome::Parsed(Value::I64(42)));
//!
//! let value = dispatch::parse("  ", &TargetType::nullable::<i64>(), None, &options).unwrap();
//! assert!(value.is_null());
//! ```

use crate::enums::EnumValue;
use crate::error::{Error, Result};
use crate::options::{ParseContext, ParseOptions};
use crate::primitive::Primitive;
use crate::value::{Kind, TargetType, Value};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

/// Result of a non-throwing parse.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Parsed(Value),
    /// Parsing failed or the input was blank; holds the default.
    Defaulted(Value),
}

impl Outcome {
    #[must_use]
    pub fn is_parsed(&self) -> bool {
        matches!(self, Outcome::Parsed(_))
    }

    #[must_use]
    pub fn value(&self) -> &Value {
        match self {
            Outcome::Parsed(v) | Outcome::Defaulted(v) => v,
        }
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Outcome::Parsed(v) | Outcome::Defaulted(v) => v,
        }
    }
}

fn via<T: Primitive>(text: &str, ctx: &ParseContext<'_>) -> Option<Value> {
    T::parse_trimmed(text, ctx).map(Primitive::into_value)
}

/// Arms are ordered by how often each kind is requested.
fn parse_kind(text: &str, kind: &Kind, ctx: &ParseContext<'_>) -> Option<Value> {
    match kind {
        Kind::String => Some(Value::String(text.to_string())),
        Kind::Enum(ty) => ty
            .metadata()
            .parse_bits(text, ctx.ignore_case)
            .map(|bits| Value::Enum(EnumValue::new(*ty, bits))),
        Kind::Guid => via::<Uuid>(text, ctx),
        Kind::Date => via::<NaiveDate>(text, ctx),
        Kind::Time => via::<NaiveTime>(text, ctx),
        Kind::DateTimeOffset => via::<DateTime<FixedOffset>>(text, ctx),
        Kind::Duration => via::<TimeDelta>(text, ctx),
        Kind::I32 => via::<i32>(text, ctx),
        Kind::I64 => via::<i64>(text, ctx),
        Kind::F64 => via::<f64>(text, ctx),
        Kind::Decimal => via::<Decimal>(text, ctx),
        Kind::DateTime => via::<NaiveDateTime>(text, ctx),
        Kind::Bool => via::<bool>(text, ctx),
        Kind::F32 => via::<f32>(text, ctx),
        Kind::I16 => via::<i16>(text, ctx),
        Kind::U8 => via::<u8>(text, ctx),
        Kind::I8 => via::<i8>(text, ctx),
        Kind::U16 => via::<u16>(text, ctx),
        Kind::U32 => via::<u32>(text, ctx),
        Kind::U64 => via::<u64>(text, ctx),
        Kind::Char => via::<char>(text, ctx),
        Kind::Unsupported(_) => None,
    }
}

/// Parses `text` as `target` without raising conversion failures.
///
/// On failure the outcome carries `default`, or `Null` for nullable targets,
/// or the zero value of the kind.
///
/// # Errors
///
/// [`Error::NotSupported`] when `target` has no text codec, checked before
/// the input is looked at.
pub fn try_parse<'a>(
    text: impl Into<Option<&'a str>>,
    target: &TargetType,
    default: Option<Value>,
    options: &ParseOptions,
) -> Result<Outcome> {
    if let Kind::Unsupported(name) = target.kind {
        debug!(target_type = name, "no text conversion for target");
        return Err(Error::not_supported("String", &target.name()));
    }

    let fallback = || match default {
        Some(value) => value,
        None if target.nullable => Value::Null,
        None => Value::zero(&target.kind),
    };

    let Some(text) = text
        .into()
        .map(|t| options.trimming.apply(t))
        .filter(|t| !t.is_empty())
    else {
        return Ok(Outcome::Defaulted(fallback()));
    };

    let config = options.snapshot();
    let ctx = ParseContext {
        culture: options.culture,
        config: &config,
        ignore_case: options.ignore_case,
    };
    Ok(match parse_kind(text, &target.kind, &ctx) {
        Some(value) => Outcome::Parsed(value),
        None => {
            debug!(target_type = %target.name(), "conversion failed, using default");
            Outcome::Defaulted(fallback())
        }
    })
}

/// Parses `text` as `target`.
///
/// Blank input for a nullable target yields `Null`. Any other failure yields
/// `default` when one is given.
///
/// # Errors
///
/// [`Error::NotSupported`] for targets without a codec and
/// [`Error::Conversion`] when parsing fails with no default.
pub fn parse<'a>(
    text: impl Into<Option<&'a str>>,
    target: &TargetType,
    default: Option<Value>,
    options: &ParseOptions,
) -> Result<Value> {
    let text = text.into();
    let has_default = default.is_some();
    let blank = text.map_or(true, |t| options.trimming.apply(t).is_empty());
    match try_parse(text, target, default, options)? {
        Outcome::Parsed(value) => Ok(value),
        Outcome::Defaulted(value) if has_default => Ok(value),
        Outcome::Defaulted(_) if target.nullable && blank => Ok(Value::Null),
        Outcome::Defaulted(_) => Err(Error::conversion(text.unwrap_or_default(), &target.name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn options() -> ParseOptions {
        ParseOptions::default()
    }

    #[test]
    fn test_unsupported_checked_first() {
        let target = TargetType::unsupported("Vec<u8>");
        let err = try_parse(None, &target, None, &options()).unwrap_err();
        assert!(err.is_not_supported());
        assert!(parse("1", &target, None, &options()).unwrap_err().is_not_supported());
    }

    #[test]
    fn test_fallbacks() {
        let target = TargetType::of::<i32>();
        assert_eq!(
            try_parse("x", &target, None, &options()).unwrap(),
            Outcome::Defaulted(Value::I32(0))
        );
        assert_eq!(
            try_parse("x", &target, Some(Value::I32(-1)), &options()).unwrap(),
            Outcome::Defaulted(Value::I32(-1))
        );
        let nullable = TargetType::nullable::<i32>();
        assert_eq!(
            try_parse("x", &nullable, None, &options()).unwrap(),
            Outcome::Defaulted(Value::Null)
        );
    }

    #[test]
    fn test_parse_errors_and_defaults() {
        let target = TargetType::of::<u8>();
        assert_eq!(parse("7", &target, None, &options()).unwrap(), Value::U8(7));
        assert!(parse("300", &target, None, &options()).unwrap_err().is_conversion());
        assert!(parse(None, &target, None, &options()).unwrap_err().is_conversion());
        assert_eq!(
            parse("300", &target, Some(Value::U8(1)), &options()).unwrap(),
            Value::U8(1)
        );
        let nullable = TargetType::nullable::<u8>();
        assert_eq!(parse(None, &nullable, None, &options()).unwrap(), Value::Null);
        assert!(parse("300", &nullable, None, &options()).unwrap_err().is_conversion());
    }

    #[test]
    fn test_every_kind_dispatches() {
        let cases: Vec<(TargetType, &str)> = vec![
            (TargetType::string(), " keep "),
            (TargetType::of::<bool>(), "false"),
            (TargetType::of::<char>(), "z"),
            (TargetType::of::<i8>(), "-8"),
            (TargetType::of::<u16>(), "16"),
            (TargetType::of::<u32>(), "32"),
            (TargetType::of::<u64>(), "64"),
            (TargetType::of::<f32>(), "0.5"),
            (TargetType::of::<Decimal>(), "1.10"),
            (TargetType::of::<Uuid>(), "00000000-0000-0000-0000-000000000001"),
            (TargetType::of::<NaiveDate>(), "2024-02-29"),
            (TargetType::of::<NaiveDateTime>(), "2024-02-29 10:00"),
            (TargetType::of::<TimeDelta>(), "00:01:00"),
        ];
        for (target, text) in cases {
            let outcome = try_parse(text, &target, None, &options()).unwrap();
            assert!(outcome.is_parsed(), "{} from {text:?}", target.name());
            assert_eq!(outcome.value().kind(), Some(target.kind));
        }
    }

    #[test]
    fn test_string_is_trimmed() {
        let value = parse(" keep ", &TargetType::string(), None, &options()).unwrap();
        assert_eq!(value, Value::from("keep"));
    }

    #[test]
    fn test_date_value() {
        let value = parse("2024-12-31", &TargetType::of::<NaiveDate>(), None, &options()).unwrap();
        let Value::Date(date) = value else {
            panic!("expected a date");
        };
        assert_eq!((date.year(), date.month(), date.day()), (2024, 12, 31));
    }
}
