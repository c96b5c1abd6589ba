//! The [`Primitive`] trait: typed text conversion for every supported kind.
//!
//! Every method that takes text accepts `&str`, `Option<&str>` or `None`.
//! Absent or blank input is a failure for plain targets and "no value" for
//! the `*_nullable` variants.
//!
//! ## Examples
//!
//! ```rust
//! use textconv::{ParseOptions, Primitive};
//!
//! let de = ParseOptions::new().with_culture("de-DE");
//! assert_eq!(i32::try_parse(" 67.500 ", &de), Some(67500));
//! assert_eq!(i32::parse_or("(67)", -1, &ParseOptions::default()), -1);
//! assert_eq!(f64::try_parse("1,5", &de), Some(1.5));
//! assert_eq!(i32::try_parse_nullable("  ", &de), Some(None));
//! ```

use crate::culture::Culture;
use crate::datetime::{self, format_moment};
use crate::duration::{format_duration, parse_duration};
use crate::error::{Error, Result};
use crate::number_format::{format_number, NumberValue};
use crate::number_parse::{self, Scanned};
use crate::options::{ParseContext, ParseOptions};
use crate::pattern::Moment;
use crate::value::{Kind, Value};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use rust_decimal::Decimal;
use uuid::Uuid;

/// A type with a culture-aware text codec.
pub trait Primitive: Sized {
    fn kind() -> Kind;

    /// Parses input that is already trimmed and non-empty.
    fn parse_trimmed(text: &str, ctx: &ParseContext<'_>) -> Option<Self>;

    /// Formats with a standard or custom specifier; `None` or `""` picks the
    /// type's default.
    fn format_with(&self, spec: Option<&str>, culture: &Culture) -> Result<String>;

    fn into_value(self) -> Value;

    fn from_value(value: &Value) -> Option<Self>;

    /// Trims per `options`, then parses. Never fails loudly.
    fn try_parse<'a>(text: impl Into<Option<&'a str>>, options: &ParseOptions) -> Option<Self> {
        let text = options.trimming.apply(text.into()?);
        if text.is_empty() {
            return None;
        }
        let config = options.snapshot();
        let ctx = ParseContext {
            culture: options.culture,
            config: &config,
            ignore_case: options.ignore_case,
        };
        Self::parse_trimmed(text, &ctx)
    }

    fn parse_or<'a>(text: impl Into<Option<&'a str>>, default: Self, options: &ParseOptions) -> Self {
        Self::try_parse(text, options).unwrap_or(default)
    }

    /// # Errors
    ///
    /// [`Error::Conversion`] naming the input and the target type.
    fn parse<'a>(text: impl Into<Option<&'a str>>, options: &ParseOptions) -> Result<Self> {
        let text = text.into();
        Self::try_parse(text, options)
            .ok_or_else(|| Error::conversion(text.unwrap_or_default(), Self::kind().name()))
    }

    /// `Some(None)` for absent or blank input, `None` on a parse failure.
    fn try_parse_nullable<'a>(
        text: impl Into<Option<&'a str>>,
        options: &ParseOptions,
    ) -> Option<Option<Self>> {
        match text.into() {
            Some(text) if !text.trim().is_empty() => Self::try_parse(text, options).map(Some),
            _ => Some(None),
        }
    }

    fn parse_nullable<'a>(text: impl Into<Option<&'a str>>, options: &ParseOptions) -> Result<Option<Self>> {
        let text = text.into();
        Self::try_parse_nullable(text, options).ok_or_else(|| {
            Error::conversion(
                text.unwrap_or_default(),
                &format!("Option<{}>", Self::kind().name()),
            )
        })
    }

    /// Formats under the invariant culture.
    fn to_text(&self, spec: Option<&str>) -> Result<String> {
        self.format_with(spec, Culture::invariant())
    }
}

fn parse_integer(text: &str, ctx: &ParseContext<'_>, min: i128, max: i128, bits: u32) -> Option<i128> {
    match number_parse::scan(text, ctx.config.integer_styles, &ctx.culture.number)? {
        Scanned::Number(number) => number_parse::to_integer(&number, min, max),
        Scanned::Hex(digits) => number_parse::hex_to_integer(&digits, bits, min < 0),
    }
}

macro_rules! integer_primitive {
    ($($ty:ident => $kind:ident),* $(,)?) => {
        $(
            impl Primitive for $ty {
                fn kind() -> Kind {
                    Kind::$kind
                }

                fn parse_trimmed(text: &str, ctx: &ParseContext<'_>) -> Option<Self> {
                    let value = parse_integer(
                        text,
                        ctx,
                        $ty::MIN as i128,
                        $ty::MAX as i128,
                        $ty::BITS,
                    )?;
                    $ty::try_from(value).ok()
                }

                fn format_with(&self, spec: Option<&str>, culture: &Culture) -> Result<String> {
                    let value = NumberValue::Integer {
                        value: *self as i128,
                        bits: $ty::BITS,
                    };
                    format_number(value, spec, culture)
                }

                fn into_value(self) -> Value {
                    Value::$kind(self)
                }

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$kind(v) => Some(*v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

integer_primitive! {
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
}

fn scan_float(text: &str, ctx: &ParseContext<'_>) -> Option<number_parse::ParsedNumber> {
    match number_parse::scan(text, ctx.config.float_styles, &ctx.culture.number)? {
        Scanned::Number(number) => Some(number),
        Scanned::Hex(_) => None,
    }
}

impl Primitive for f64 {
    fn kind() -> Kind {
        Kind::F64
    }

    fn parse_trimmed(text: &str, ctx: &ParseContext<'_>) -> Option<Self> {
        if let Some(special) = number_parse::scan_special(text, &ctx.culture.number) {
            return Some(special);
        }
        number_parse::to_f64(&scan_float(text, ctx)?)
    }

    fn format_with(&self, spec: Option<&str>, culture: &Culture) -> Result<String> {
        let value = NumberValue::Float {
            value: *self,
            single: false,
        };
        format_number(value, spec, culture)
    }

    fn into_value(self) -> Value {
        Value::F64(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::F64(v) => Some(*v),
            _ => None,
        }
    }
}

impl Primitive for f32 {
    fn kind() -> Kind {
        Kind::F32
    }

    fn parse_trimmed(text: &str, ctx: &ParseContext<'_>) -> Option<Self> {
        if let Some(special) = number_parse::scan_special(text, &ctx.culture.number) {
            return Some(special as f32);
        }
        number_parse::to_f32(&scan_float(text, ctx)?)
    }

    fn format_with(&self, spec: Option<&str>, culture: &Culture) -> Result<String> {
        let value = NumberValue::Float {
            value: f64::from(*self),
            single: true,
        };
        format_number(value, spec, culture)
    }

    fn into_value(self) -> Value {
        Value::F32(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::F32(v) => Some(*v),
            _ => None,
        }
    }
}

/// Decimals parse under the floating-point style policy.
impl Primitive for Decimal {
    fn kind() -> Kind {
        Kind::Decimal
    }

    fn parse_trimmed(text: &str, ctx: &ParseContext<'_>) -> Option<Self> {
        number_parse::to_decimal(&scan_float(text, ctx)?)
    }

    fn format_with(&self, spec: Option<&str>, culture: &Culture) -> Result<String> {
        format_number(NumberValue::Decimal(*self), spec, culture)
    }

    fn into_value(self) -> Value {
        Value::Decimal(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Decimal(v) => Some(*v),
            _ => None,
        }
    }
}

impl Primitive for bool {
    fn kind() -> Kind {
        Kind::Bool
    }

    fn parse_trimmed(text: &str, _ctx: &ParseContext<'_>) -> Option<Self> {
        if text.eq_ignore_ascii_case("true") {
            Some(true)
        } else if text.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }

    fn format_with(&self, _spec: Option<&str>, _culture: &Culture) -> Result<String> {
        Ok(if *self { "True" } else { "False" }.to_string())
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl Primitive for char {
    fn kind() -> Kind {
        Kind::Char
    }

    fn parse_trimmed(text: &str, _ctx: &ParseContext<'_>) -> Option<Self> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }

    fn format_with(&self, _spec: Option<&str>, _culture: &Culture) -> Result<String> {
        Ok(self.to_string())
    }

    fn into_value(self) -> Value {
        Value::Char(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Char(c) => Some(*c),
            _ => None,
        }
    }
}

impl Primitive for String {
    fn kind() -> Kind {
        Kind::String
    }

    fn parse_trimmed(text: &str, _ctx: &ParseContext<'_>) -> Option<Self> {
        Some(text.to_string())
    }

    fn format_with(&self, _spec: Option<&str>, _culture: &Culture) -> Result<String> {
        Ok(self.clone())
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

fn format_guid_x(uuid: &Uuid) -> String {
    let (d1, d2, d3, d4) = uuid.as_fields();
    let tail: Vec<String> = d4.iter().map(|b| format!("0x{b:02x}")).collect();
    format!("{{0x{d1:08x},0x{d2:04x},0x{d3:04x},{{{}}}}}", tail.join(","))
}

/// Accepts the `N`, `D`, `B` and `P` layouts and `urn:uuid:` URNs.
impl Primitive for Uuid {
    fn kind() -> Kind {
        Kind::Guid
    }

    fn parse_trimmed(text: &str, _ctx: &ParseContext<'_>) -> Option<Self> {
        let text = match text.strip_prefix('(') {
            Some(inner) => inner.strip_suffix(')').filter(|s| s.len() == 36)?,
            None => text,
        };
        Uuid::parse_str(text).ok()
    }

    fn format_with(&self, spec: Option<&str>, _culture: &Culture) -> Result<String> {
        let spec = spec.unwrap_or("");
        Ok(match spec {
            "" | "D" | "d" => self.hyphenated().to_string(),
            "N" | "n" => self.simple().to_string(),
            "B" | "b" => self.braced().to_string(),
            "P" | "p" => format!("({})", self.hyphenated()),
            "X" | "x" => format_guid_x(self),
            _ => return Err(Error::invalid_format(spec, "GUIDs accept N, D, B, P or X")),
        })
    }

    fn into_value(self) -> Value {
        Value::Guid(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Guid(g) => Some(*g),
            _ => None,
        }
    }
}

impl Primitive for NaiveDate {
    fn kind() -> Kind {
        Kind::Date
    }

    fn parse_trimmed(text: &str, ctx: &ParseContext<'_>) -> Option<Self> {
        datetime::parse_date(text, ctx)
    }

    fn format_with(&self, spec: Option<&str>, culture: &Culture) -> Result<String> {
        let moment = Moment {
            date: Some(*self),
            time: None,
            offset: None,
        };
        format_moment(moment, spec, "d", culture)
    }

    fn into_value(self) -> Value {
        Value::Date(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl Primitive for NaiveTime {
    fn kind() -> Kind {
        Kind::Time
    }

    fn parse_trimmed(text: &str, ctx: &ParseContext<'_>) -> Option<Self> {
        datetime::parse_time(text, ctx)
    }

    fn format_with(&self, spec: Option<&str>, culture: &Culture) -> Result<String> {
        let moment = Moment {
            date: None,
            time: Some(*self),
            offset: None,
        };
        format_moment(moment, spec, "t", culture)
    }

    fn into_value(self) -> Value {
        Value::Time(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Time(t) => Some(*t),
            _ => None,
        }
    }
}

/// Offset-bearing input is converted to UTC.
impl Primitive for NaiveDateTime {
    fn kind() -> Kind {
        Kind::DateTime
    }

    fn parse_trimmed(text: &str, ctx: &ParseContext<'_>) -> Option<Self> {
        datetime::parse_date_time(text, ctx)
    }

    fn format_with(&self, spec: Option<&str>, culture: &Culture) -> Result<String> {
        let moment = Moment {
            date: Some(self.date()),
            time: Some(self.time()),
            offset: None,
        };
        format_moment(moment, spec, "G", culture)
    }

    fn into_value(self) -> Value {
        Value::DateTime(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }
}

/// Input without an offset is taken as UTC. The default rendering is the
/// culture's `G` pattern followed by the offset.
impl Primitive for DateTime<FixedOffset> {
    fn kind() -> Kind {
        Kind::DateTimeOffset
    }

    fn parse_trimmed(text: &str, ctx: &ParseContext<'_>) -> Option<Self> {
        datetime::parse_date_time_offset(text, ctx)
    }

    fn format_with(&self, spec: Option<&str>, culture: &Culture) -> Result<String> {
        let local = self.naive_local();
        let moment = Moment {
            date: Some(local.date()),
            time: Some(local.time()),
            offset: Some(*self.offset()),
        };
        match spec.filter(|s| !s.is_empty()) {
            Some(spec) => format_moment(moment, Some(spec), "G", culture),
            None => {
                let general = format_moment(moment, Some("G"), "G", culture)?;
                let zone = format_moment(moment, Some("zzz"), "zzz", culture)?;
                Ok(format!("{general} {zone}"))
            }
        }
    }

    fn into_value(self) -> Value {
        Value::DateTimeOffset(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::DateTimeOffset(dt) => Some(*dt),
            _ => None,
        }
    }
}

impl Primitive for TimeDelta {
    fn kind() -> Kind {
        Kind::Duration
    }

    fn parse_trimmed(text: &str, ctx: &ParseContext<'_>) -> Option<Self> {
        parse_duration(text, ctx.culture)
    }

    fn format_with(&self, spec: Option<&str>, culture: &Culture) -> Result<String> {
        format_duration(*self, spec, culture)
    }

    fn into_value(self) -> Value {
        Value::Duration(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Duration(d) => Some(*d),
            _ => None,
        }
    }
}
