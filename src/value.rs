//! Dynamic value and target type representation.
//!
//! The dispatcher in [`crate::dispatch`] converts text into a [`Value`] for a
//! [`TargetType`] chosen at runtime, and [`crate::format`] renders any
//! [`Value`] back to text.
//!
//! ## Examples
//!
//! ```rust
//! use textconv::{Kind, TargetType, Value};
//!
//! let target = TargetType::nullable::<i32>();
//! assert_eq!(target.kind, Kind::I32);
//! assert_eq!(target.name(), "Option<i32>");
//!
//! let value = Value::from(42);
//! assert_eq!(value.kind(), Some(Kind::I32));
//! assert_eq!(value.as_i64(), Some(42));
//! ```

use crate::culture::Culture;
use crate::enums::{EnumType, EnumValue, Enumeration};
use crate::primitive::Primitive;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, Utc};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// The kinds of value a conversion can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    String,
    Bool,
    Char,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Decimal,
    Guid,
    Date,
    Time,
    DateTime,
    DateTimeOffset,
    Duration,
    Enum(EnumType),
    /// A type with no text codec; the name is used in errors.
    Unsupported(&'static str),
}

impl Kind {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Kind::String => "String",
            Kind::Bool => "bool",
            Kind::Char => "char",
            Kind::I8 => "i8",
            Kind::U8 => "u8",
            Kind::I16 => "i16",
            Kind::U16 => "u16",
            Kind::I32 => "i32",
            Kind::U32 => "u32",
            Kind::I64 => "i64",
            Kind::U64 => "u64",
            Kind::F32 => "f32",
            Kind::F64 => "f64",
            Kind::Decimal => "Decimal",
            Kind::Guid => "Uuid",
            Kind::Date => "NaiveDate",
            Kind::Time => "NaiveTime",
            Kind::DateTime => "NaiveDateTime",
            Kind::DateTimeOffset => "DateTime<FixedOffset>",
            Kind::Duration => "TimeDelta",
            Kind::Enum(ty) => ty.name(),
            Kind::Unsupported(name) => name,
        }
    }
}

/// A conversion target: a kind, optionally nullable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetType {
    pub kind: Kind,
    pub nullable: bool,
}

impl TargetType {
    #[must_use]
    pub fn of<T: Primitive>() -> Self {
        TargetType {
            kind: T::kind(),
            nullable: false,
        }
    }

    /// `Option<T>`: blank input converts to [`Value::Null`].
    #[must_use]
    pub fn nullable<T: Primitive>() -> Self {
        TargetType {
            kind: T::kind(),
            nullable: true,
        }
    }

    #[must_use]
    pub fn string() -> Self {
        TargetType {
            kind: Kind::String,
            nullable: false,
        }
    }

    #[must_use]
    pub fn enumeration<E: Enumeration>() -> Self {
        TargetType {
            kind: Kind::Enum(EnumType::of::<E>()),
            nullable: false,
        }
    }

    #[must_use]
    pub fn unsupported(name: &'static str) -> Self {
        TargetType {
            kind: Kind::Unsupported(name),
            nullable: false,
        }
    }

    #[must_use]
    pub fn name(&self) -> String {
        if self.nullable {
            format!("Option<{}>", self.kind.name())
        } else {
            self.kind.name().to_string()
        }
    }
}

type Render = dyn Fn(&str, &Culture) -> crate::Result<String> + Send + Sync;

/// A value without a built-in text codec.
///
/// Rendered through its [`fmt::Display`] unless it was built with
/// [`Opaque::formattable`] and a format specifier is given.
#[derive(Clone)]
pub struct Opaque {
    display: Arc<dyn fmt::Display + Send + Sync>,
    render: Option<Arc<Render>>,
}

impl Opaque {
    pub fn new<T: fmt::Display + Send + Sync + 'static>(value: T) -> Self {
        Opaque {
            display: Arc::new(value),
            render: None,
        }
    }

    /// Wraps `value` with a renderer that receives non-empty format specifiers.
    ///
    /// ```rust
    /// use textconv::{Opaque, Primitive};
    ///
    /// let price = Opaque::formattable(3.75f64, |v, spec, culture| v.format_with(Some(spec), culture));
    /// assert_eq!(price.format(Some("F1"), textconv::Culture::invariant()).unwrap(), "3.8");
    /// assert_eq!(price.to_string(), "3.75");
    /// ```
    pub fn formattable<T>(value: T, render: fn(&T, &str, &Culture) -> crate::Result<String>) -> Self
    where
        T: fmt::Display + Send + Sync + 'static,
    {
        let value = Arc::new(value);
        let shared = Arc::clone(&value);
        Opaque {
            display: value,
            render: Some(Arc::new(move |spec: &str, culture: &Culture| render(&shared, spec, culture))),
        }
    }

    /// Renders with `spec` when a renderer is present, otherwise via `Display`.
    pub fn format(&self, spec: Option<&str>, culture: &Culture) -> crate::Result<String> {
        match (spec.filter(|s| !s.is_empty()), &self.render) {
            (Some(spec), Some(render)) => render(spec, culture),
            _ => Ok(self.display.to_string()),
        }
    }
}

impl fmt::Display for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.display.fmt(f)
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Opaque").field(&self.display.to_string()).finish()
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.display, &other.display) || self.display.to_string() == other.display.to_string()
    }
}

/// A dynamically-typed converted value.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    String(String),
    Bool(bool),
    Char(char),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    Guid(Uuid),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    DateTimeOffset(DateTime<FixedOffset>),
    Duration(TimeDelta),
    Enum(EnumValue),
    Other(Opaque),
}

fn epoch_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or_default()
}

impl Value {
    /// The zero value of a kind; `Null` for strings and unsupported kinds.
    #[must_use]
    pub fn zero(kind: &Kind) -> Value {
        match kind {
            Kind::String | Kind::Unsupported(_) => Value::Null,
            Kind::Bool => Value::Bool(false),
            Kind::Char => Value::Char('\0'),
            Kind::I8 => Value::I8(0),
            Kind::U8 => Value::U8(0),
            Kind::I16 => Value::I16(0),
            Kind::U16 => Value::U16(0),
            Kind::I32 => Value::I32(0),
            Kind::U32 => Value::U32(0),
            Kind::I64 => Value::I64(0),
            Kind::U64 => Value::U64(0),
            Kind::F32 => Value::F32(0.0),
            Kind::F64 => Value::F64(0.0),
            Kind::Decimal => Value::Decimal(Decimal::ZERO),
            Kind::Guid => Value::Guid(Uuid::nil()),
            Kind::Date => Value::Date(epoch_date()),
            Kind::Time => Value::Time(NaiveTime::MIN),
            Kind::DateTime => Value::DateTime(epoch_date().and_time(NaiveTime::MIN)),
            Kind::DateTimeOffset => Value::DateTimeOffset(DateTime::from_naive_utc_and_offset(
                epoch_date().and_time(NaiveTime::MIN),
                Utc.fix(),
            )),
            Kind::Duration => Value::Duration(TimeDelta::zero()),
            Kind::Enum(ty) => Value::Enum(EnumValue::new(*ty, 0)),
        }
    }

    /// Kind of the value; `None` for `Null` and `Other`.
    #[must_use]
    pub fn kind(&self) -> Option<Kind> {
        Some(match self {
            Value::Null | Value::Other(_) => return None,
            Value::String(_) => Kind::String,
            Value::Bool(_) => Kind::Bool,
            Value::Char(_) => Kind::Char,
            Value::I8(_) => Kind::I8,
            Value::U8(_) => Kind::U8,
            Value::I16(_) => Kind::I16,
            Value::U16(_) => Kind::U16,
            Value::I32(_) => Kind::I32,
            Value::U32(_) => Kind::U32,
            Value::I64(_) => Kind::I64,
            Value::U64(_) => Kind::U64,
            Value::F32(_) => Kind::F32,
            Value::F64(_) => Kind::F64,
            Value::Decimal(_) => Kind::Decimal,
            Value::Guid(_) => Kind::Guid,
            Value::Date(_) => Kind::Date,
            Value::Time(_) => Kind::Time,
            Value::DateTime(_) => Kind::DateTime,
            Value::DateTimeOffset(_) => Kind::DateTimeOffset,
            Value::Duration(_) => Kind::Duration,
            Value::Enum(v) => Kind::Enum(v.ty),
        })
    }

    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Any integer value that fits in `i64`.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::I8(v) => Some(v.into()),
            Value::U8(v) => Some(v.into()),
            Value::I16(v) => Some(v.into()),
            Value::U16(v) => Some(v.into()),
            Value::I32(v) => Some(v.into()),
            Value::U32(v) => Some(v.into()),
            Value::I64(v) => Some(v),
            Value::U64(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    /// Any numeric value, widened to `f64`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::F32(v) => Some(v.into()),
            Value::F64(v) => Some(v),
            Value::U64(v) => Some(v as f64),
            Value::Decimal(d) => d.to_string().parse().ok(),
            _ => self.as_i64().map(|v| v as f64),
        }
    }

    /// The typed payload, when the value holds a `T`.
    #[must_use]
    pub fn get<T: Primitive>(&self) -> Option<T> {
        T::from_value(self)
    }
}

/// Invariant-culture rendering with default specifiers.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = crate::format::format(Some(self), None, "", Culture::invariant())
            .map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

/// Scalars map to their serde counterparts; everything else serializes as
/// its round-trip text.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let round_trip = |value: &Value, spec: &str| {
            crate::format::format(Some(value), Some(spec), "", Culture::invariant())
                .map_err(serde::ser::Error::custom)
        };
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::String(s) => serializer.serialize_str(s),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Char(c) => serializer.serialize_char(*c),
            Value::I8(v) => serializer.serialize_i8(*v),
            Value::U8(v) => serializer.serialize_u8(*v),
            Value::I16(v) => serializer.serialize_i16(*v),
            Value::U16(v) => serializer.serialize_u16(*v),
            Value::I32(v) => serializer.serialize_i32(*v),
            Value::U32(v) => serializer.serialize_u32(*v),
            Value::I64(v) => serializer.serialize_i64(*v),
            Value::U64(v) => serializer.serialize_u64(*v),
            Value::F32(v) => serializer.serialize_f32(*v),
            Value::F64(v) => serializer.serialize_f64(*v),
            Value::Date(_) | Value::Time(_) | Value::DateTime(_) | Value::DateTimeOffset(_) => {
                serializer.serialize_str(&round_trip(self, "o")?)
            }
            Value::Guid(_) | Value::Decimal(_) | Value::Duration(_) | Value::Enum(_) => {
                serializer.serialize_str(&round_trip(self, "")?)
            }
            Value::Other(o) => serializer.collect_str(o),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

value_from! {
    String => String,
    bool => Bool,
    char => Char,
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    Decimal => Decimal,
    Uuid => Guid,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => DateTime,
    DateTime<FixedOffset> => DateTimeOffset,
    TimeDelta => Duration,
    EnumValue => Enum,
    Opaque => Other,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
