//! Enumeration metadata, parsing and formatting.
//!
//! Types declared with [`enumeration!`](crate::enumeration) implement
//! [`Enumeration`]. The first lookup for a type reflects its members into an
//! [`EnumMetadata`] table sorted by bit pattern; the table is cached for the
//! life of the process, keyed by [`TypeId`].
//!
//! Member values are stored as 64-bit patterns: signed underlying values are
//! sign-extended, so `-2` and `-5` sort, mask and combine exactly like their
//! two's-complement bits do.
//!
//! ## Examples
//!
//! ```rust
//! use textconv::{enumeration, enums, ParseOptions};
//!
//! enumeration! {
//!     pub struct Access: u8 {
//!         const READ = 1;
//!         const WRITE = 2;
//!         const EXECUTE = 4;
//!     }
//! }
//!
//! let options = ParseOptions::default();
//! let access: Access = enums::parse("write, read", &options).unwrap();
//! assert_eq!(access, Access::READ | Access::WRITE);
//! assert_eq!(enums::format(access, None).unwrap(), "READ, WRITE");
//! assert_eq!(enums::format(access, Some("X")).unwrap(), "03");
//! ```

use crate::error::{Error, Result};
use crate::options::ParseOptions;
use crate::value::{Kind, TargetType};
use dashmap::DashMap;
use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock};

/// Integer kind backing an enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Underlying {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
}

impl Underlying {
    /// Width in bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Underlying::I8 | Underlying::U8 => 8,
            Underlying::I16 | Underlying::U16 => 16,
            Underlying::I32 | Underlying::U32 => 32,
            Underlying::I64 | Underlying::U64 => 64,
        }
    }

    #[must_use]
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            Underlying::I8 | Underlying::I16 | Underlying::I32 | Underlying::I64
        )
    }

    /// Mask selecting the low `bits()` bits.
    #[must_use]
    pub const fn mask(self) -> u64 {
        match self.bits() {
            64 => u64::MAX,
            n => (1u64 << n) - 1,
        }
    }

    /// Range of values representable by this kind.
    #[must_use]
    pub const fn range(self) -> (i128, i128) {
        match self {
            Underlying::I8 => (i8::MIN as i128, i8::MAX as i128),
            Underlying::U8 => (0, u8::MAX as i128),
            Underlying::I16 => (i16::MIN as i128, i16::MAX as i128),
            Underlying::U16 => (0, u16::MAX as i128),
            Underlying::I32 => (i32::MIN as i128, i32::MAX as i128),
            Underlying::U32 => (0, u32::MAX as i128),
            Underlying::I64 => (i64::MIN as i128, i64::MAX as i128),
            Underlying::U64 => (0, u64::MAX as i128),
        }
    }

    /// The numeric value a bit pattern denotes under this kind's signedness.
    #[must_use]
    pub const fn to_numeric(self, bits: u64) -> i128 {
        let shift = 64 - self.bits();
        if self.is_signed() {
            ((bits << shift) as i64 >> shift) as i128
        } else {
            (bits & self.mask()) as i128
        }
    }

    /// The bit pattern of an in-range numeric value.
    #[must_use]
    pub const fn to_bits(self, value: i128) -> u64 {
        if self.is_signed() {
            value as i64 as u64
        } else {
            value as u64
        }
    }
}

/// Integer types that can back an enumeration.
pub trait UnderlyingInt: Copy {
    const UNDERLYING: Underlying;

    /// Bit pattern, sign-extended for signed types.
    fn to_bits(self) -> u64;

    /// Truncates a bit pattern to this width.
    fn from_bits(bits: u64) -> Self;
}

macro_rules! underlying_int {
    ($($ty:ty => $kind:ident, $signed:ty);* $(;)?) => {
        $(
            impl UnderlyingInt for $ty {
                const UNDERLYING: Underlying = Underlying::$kind;

                #[inline]
                fn to_bits(self) -> u64 {
                    self as $signed as u64
                }

                #[inline]
                fn from_bits(bits: u64) -> Self {
                    bits as $ty
                }
            }
        )*
    };
}

underlying_int! {
    i8 => I8, i64;
    u8 => U8, u64;
    i16 => I16, i64;
    u16 => U16, u64;
    i32 => I32, i64;
    u32 => U32, u64;
    i64 => I64, i64;
    u64 => U64, u64;
}

/// A type with named integer members.
///
/// Implemented by [`enumeration!`](crate::enumeration); hand-written impls
/// must list every member in [`members`](Enumeration::members).
pub trait Enumeration: Copy + Send + Sync + 'static {
    const NAME: &'static str;
    const UNDERLYING: Underlying;
    /// Members are bit flags meant to be combined.
    const FLAGS: bool = false;

    fn members() -> &'static [(&'static str, Self)];

    fn to_bits(self) -> u64;

    /// `None` when the pattern is not representable by the type.
    fn from_bits(bits: u64) -> Option<Self>;
}

/// Runtime handle for an enumeration type.
#[derive(Clone, Copy)]
pub struct EnumType {
    type_id: TypeId,
    name: &'static str,
    build: fn() -> EnumMetadata,
}

impl EnumType {
    #[must_use]
    pub fn of<E: Enumeration>() -> Self {
        EnumType {
            type_id: TypeId::of::<E>(),
            name: E::NAME,
            build: build_metadata::<E>,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Cached metadata, built on first use.
    #[must_use]
    pub fn metadata(&self) -> Arc<EnumMetadata> {
        cached(self)
    }
}

impl PartialEq for EnumType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for EnumType {}

impl Hash for EnumType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for EnumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EnumType").field(&self.name).finish()
    }
}

/// Immutable, value-sorted member table of one enumeration type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMetadata {
    name: &'static str,
    underlying: Underlying,
    names: Vec<&'static str>,
    values: Vec<u64>,
    is_flags: bool,
    all_flags_mask: u64,
}

fn build_metadata<E: Enumeration>() -> EnumMetadata {
    let mut members: Vec<(&'static str, u64)> = E::members()
        .iter()
        .map(|&(name, member)| (name, member.to_bits()))
        .collect();

    // Insertion sort; member lists are short and equal values keep declaration order.
    for i in 1..members.len() {
        let mut j = i;
        while j > 0 && members[j - 1].1 > members[j].1 {
            members.swap(j - 1, j);
            j -= 1;
        }
    }

    let (names, values): (Vec<_>, Vec<_>) = members.into_iter().unzip();
    let all_flags_mask = if E::FLAGS {
        values.iter().fold(0, |mask, v| mask | v)
    } else {
        0
    };
    tracing::trace!(
        r#type = E::NAME,
        members = names.len(),
        flags = E::FLAGS,
        "built enumeration metadata"
    );
    EnumMetadata {
        name: E::NAME,
        underlying: E::UNDERLYING,
        names,
        values,
        is_flags: E::FLAGS,
        all_flags_mask,
    }
}

static CACHE: LazyLock<DashMap<TypeId, Arc<EnumMetadata>>> = LazyLock::new(DashMap::new);

fn cached(ty: &EnumType) -> Arc<EnumMetadata> {
    if let Some(found) = CACHE.get(&ty.type_id) {
        return Arc::clone(found.value());
    }
    // Built outside the shard lock; a concurrent duplicate build is equivalent.
    let built = Arc::new((ty.build)());
    Arc::clone(CACHE.entry(ty.type_id).or_insert(built).value())
}

fn names_equal(a: &str, b: &str, ignore_case: bool) -> bool {
    if ignore_case {
        a.chars()
            .flat_map(char::to_lowercase)
            .eq(b.chars().flat_map(char::to_lowercase))
    } else {
        a == b
    }
}

impl EnumMetadata {
    /// Type name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn underlying(&self) -> Underlying {
        self.underlying
    }

    /// Member names, ordered by value.
    #[must_use]
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    /// Member bit patterns, ascending.
    #[must_use]
    pub fn values(&self) -> &[u64] {
        &self.values
    }

    #[must_use]
    pub fn is_flags(&self) -> bool {
        self.is_flags
    }

    /// OR of every member; zero for non-flags types.
    #[must_use]
    pub fn all_flags_mask(&self) -> u64 {
        self.all_flags_mask
    }

    /// Declared name of an exact member value.
    #[must_use]
    pub fn name_of(&self, bits: u64) -> Option<&'static str> {
        self.values
            .binary_search(&bits)
            .ok()
            .map(|index| self.names[index])
    }

    /// A declared value, or for flags types any subset of the declared bits.
    #[must_use]
    pub fn is_defined(&self, bits: u64) -> bool {
        self.values.binary_search(&bits).is_ok()
            || (self.is_flags && bits & self.all_flags_mask == bits)
    }

    fn resolve(&self, token: &str, ignore_case: bool) -> Option<u64> {
        let exact = self.names.iter().position(|name| *name == token);
        let index = match exact {
            Some(index) => Some(index),
            None if ignore_case => self
                .names
                .iter()
                .position(|name| names_equal(name, token, true)),
            None => None,
        };
        index.map(|i| self.values[i])
    }

    /// Parses a numeric literal, a member name or, for flags types, a
    /// comma-separated list of member names. `text` must already be trimmed.
    #[must_use]
    pub fn parse_bits(&self, text: &str, ignore_case: bool) -> Option<u64> {
        let first = text.chars().next()?;
        if first.is_ascii_digit() || first == '-' || first == '+' {
            let literal = text.strip_prefix('+').unwrap_or(text);
            let value: i128 = literal.parse().ok()?;
            let (min, max) = self.underlying.range();
            if value < min || value > max {
                return None;
            }
            let bits = self.underlying.to_bits(value);
            return self.is_defined(bits).then_some(bits);
        }

        if self.is_flags {
            text.split(',').try_fold(0u64, |acc, token| {
                let token = token.trim();
                if token.is_empty() {
                    return None;
                }
                Some(acc | self.resolve(token, ignore_case)?)
            })
        } else {
            self.resolve(text, ignore_case)
        }
    }

    /// Names of the members whose bits make up `bits`, ascending by value.
    fn decompose(&self, bits: u64) -> Option<Vec<&'static str>> {
        if bits == 0 {
            return self.name_of(0).map(|name| vec![name]);
        }
        let mut remaining = bits;
        let mut found = Vec::new();
        for (index, &value) in self.values.iter().enumerate().rev() {
            if value != 0 && remaining & value == value {
                remaining &= !value;
                found.push(self.names[index]);
            }
        }
        if remaining != 0 {
            return None;
        }
        found.reverse();
        Some(found)
    }

    fn numeric(&self, bits: u64) -> String {
        self.underlying.to_numeric(bits).to_string()
    }

    /// Formats with `G` (default), `F`, `D` or `X`.
    pub fn format_bits(&self, bits: u64, spec: Option<&str>) -> Result<String> {
        let spec = spec.unwrap_or("");
        match spec {
            "" | "G" | "g" => Ok(match self.name_of(bits) {
                Some(name) => name.to_string(),
                None if self.is_flags => self
                    .decompose(bits)
                    .map_or_else(|| self.numeric(bits), |names| names.join(", ")),
                None => self.numeric(bits),
            }),
            "F" | "f" => Ok(self
                .decompose(bits)
                .map_or_else(|| self.numeric(bits), |names| names.join(", "))),
            "D" | "d" => Ok(self.numeric(bits)),
            "X" | "x" => {
                let width = (self.underlying.bits() / 4) as usize;
                let raw = bits & self.underlying.mask();
                Ok(if spec == "x" {
                    format!("{raw:0width$x}")
                } else {
                    format!("{raw:0width$X}")
                })
            }
            _ => Err(Error::invalid_format(spec, "enumerations accept G, F, D or X")),
        }
    }
}

/// An enumeration value of a type known only at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumValue {
    pub ty: EnumType,
    pub bits: u64,
}

impl EnumValue {
    #[must_use]
    pub fn new(ty: EnumType, bits: u64) -> Self {
        EnumValue { ty, bits }
    }

    #[must_use]
    pub fn of<E: Enumeration>(value: E) -> Self {
        EnumValue::new(EnumType::of::<E>(), value.to_bits())
    }

    /// The typed value, when this value belongs to `E`.
    #[must_use]
    pub fn get<E: Enumeration>(&self) -> Option<E> {
        if self.ty == EnumType::of::<E>() {
            E::from_bits(self.bits)
        } else {
            None
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&'static str> {
        self.ty.metadata().name_of(self.bits)
    }

    pub fn format(&self, spec: Option<&str>) -> Result<String> {
        self.ty.metadata().format_bits(self.bits, spec)
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.format(None).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

/// Metadata for an enumeration target.
///
/// # Errors
///
/// [`Error::ArgumentNull`] when `target` is absent and [`Error::NotAnEnum`]
/// when it names a non-enumeration kind.
pub fn metadata(target: Option<&TargetType>) -> Result<Arc<EnumMetadata>> {
    let target = target.ok_or_else(|| Error::argument_null("type"))?;
    match target.kind {
        Kind::Enum(ty) => Ok(ty.metadata()),
        _ => Err(Error::not_an_enum(&target.name())),
    }
}

fn metadata_of<E: Enumeration>() -> Arc<EnumMetadata> {
    EnumType::of::<E>().metadata()
}

/// Declared name of `value`.
#[must_use]
pub fn name<E: Enumeration>(value: E) -> Option<&'static str> {
    metadata_of::<E>().name_of(value.to_bits())
}

#[must_use]
pub fn is_defined<E: Enumeration>(value: E) -> bool {
    metadata_of::<E>().is_defined(value.to_bits())
}

#[doc(hidden)]
pub fn parse_trimmed<E: Enumeration>(text: &str, ignore_case: bool) -> Option<E> {
    let bits = metadata_of::<E>().parse_bits(text, ignore_case)?;
    E::from_bits(bits)
}

/// Parses `text` after trimming per `options`; case follows `options.ignore_case`.
pub fn try_parse<'a, E: Enumeration>(
    text: impl Into<Option<&'a str>>,
    options: &ParseOptions,
) -> Option<E> {
    let text = options.trimming.apply(text.into()?);
    parse_trimmed(text, options.ignore_case)
}

/// Like [`try_parse`], raising [`Error::Conversion`] on failure.
pub fn parse<'a, E: Enumeration>(
    text: impl Into<Option<&'a str>>,
    options: &ParseOptions,
) -> Result<E> {
    let text = text.into();
    try_parse(text, options).ok_or_else(|| Error::conversion(text.unwrap_or_default(), E::NAME))
}

#[must_use]
pub fn parse_or<'a, E: Enumeration>(
    text: impl Into<Option<&'a str>>,
    default: E,
    options: &ParseOptions,
) -> E {
    try_parse(text, options).unwrap_or(default)
}

/// Formats `value` with `G`, `F`, `D` or `X`.
pub fn format<E: Enumeration>(value: E, spec: Option<&str>) -> Result<String> {
    metadata_of::<E>().format_bits(value.to_bits(), spec)
}

fn reject<E: Enumeration>(value: E, throw_on_error: bool) -> Result<bool> {
    if throw_on_error {
        let shown = format(value, None)?;
        Err(Error::out_of_range("value", shown))
    } else {
        Ok(false)
    }
}

fn require<E>(value: Option<E>, throw_on_error: bool) -> Result<Option<E>> {
    match value {
        Some(value) => Ok(Some(value)),
        None if throw_on_error => Err(Error::argument_null("value")),
        None => Ok(None),
    }
}

/// Checks `value` against an allow-list.
pub fn check_value<E: Enumeration>(value: Option<E>, allowed: &[E], throw_on_error: bool) -> Result<bool> {
    let Some(value) = require(value, throw_on_error)? else {
        return Ok(false);
    };
    if allowed.iter().any(|a| a.to_bits() == value.to_bits()) {
        Ok(true)
    } else {
        reject(value, throw_on_error)
    }
}

/// Checks `min <= value <= max`, comparing under the underlying signedness.
pub fn check_value_by_range<E: Enumeration>(
    value: Option<E>,
    min: E,
    max: E,
    throw_on_error: bool,
) -> Result<bool> {
    let Some(value) = require(value, throw_on_error)? else {
        return Ok(false);
    };
    let numeric = |e: E| E::UNDERLYING.to_numeric(e.to_bits());
    if (numeric(min)..=numeric(max)).contains(&numeric(value)) {
        Ok(true)
    } else {
        reject(value, throw_on_error)
    }
}

/// Checks that `value` sets no bit outside `mask`.
pub fn check_value_by_mask<E: Enumeration>(value: Option<E>, mask: E, throw_on_error: bool) -> Result<bool> {
    let Some(value) = require(value, throw_on_error)? else {
        return Ok(false);
    };
    if value.to_bits() & mask.to_bits() == value.to_bits() {
        Ok(true)
    } else {
        reject(value, throw_on_error)
    }
}
