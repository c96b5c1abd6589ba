//! Parse configuration: accepted date/time formats and numeric style policies.
//!
//! A [`ConversionConfig`] is an immutable snapshot. The process-wide instance
//! lives behind an [`ArcSwap`]; every update builds a fresh snapshot (copy,
//! append, de-duplicate) and swaps it in atomically, so a parse in flight sees
//! either the old list or the new one, never a partial list.
//!
//! Callers that want no hidden coupling can build their own snapshot and pass
//! it through [`ParseOptions::with_config`](crate::ParseOptions::with_config).
//!
//! ## Examples
//!
//! ```rust
//! use textconv::{ConversionConfig, NumberStyles};
//!
//! let config = ConversionConfig::default()
//!     .with_date_time_formats(["dd.MM.yyyy HH:mm"])
//!     .with_integer_styles(NumberStyles::INTEGER | NumberStyles::ALLOW_PARENTHESES);
//!
//! assert!(config.date_time_formats.iter().any(|f| f == "dd.MM.yyyy HH:mm"));
//! ```

use arc_swap::ArcSwap;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};

bitflags! {
    /// Elements permitted in numeric input text.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct NumberStyles: u32 {
        const ALLOW_LEADING_WHITE = 0x0001;
        const ALLOW_TRAILING_WHITE = 0x0002;
        const ALLOW_LEADING_SIGN = 0x0004;
        const ALLOW_TRAILING_SIGN = 0x0008;
        const ALLOW_PARENTHESES = 0x0010;
        const ALLOW_DECIMAL_POINT = 0x0020;
        const ALLOW_THOUSANDS = 0x0040;
        const ALLOW_EXPONENT = 0x0080;
        const ALLOW_CURRENCY_SYMBOL = 0x0100;
        const ALLOW_HEX_SPECIFIER = 0x0200;

        const INTEGER = Self::ALLOW_LEADING_WHITE.bits()
            | Self::ALLOW_TRAILING_WHITE.bits()
            | Self::ALLOW_LEADING_SIGN.bits();
        const HEX_NUMBER = Self::ALLOW_LEADING_WHITE.bits()
            | Self::ALLOW_TRAILING_WHITE.bits()
            | Self::ALLOW_HEX_SPECIFIER.bits();
        const NUMBER = Self::INTEGER.bits()
            | Self::ALLOW_TRAILING_SIGN.bits()
            | Self::ALLOW_DECIMAL_POINT.bits()
            | Self::ALLOW_THOUSANDS.bits();
        const FLOAT = Self::INTEGER.bits()
            | Self::ALLOW_DECIMAL_POINT.bits()
            | Self::ALLOW_EXPONENT.bits();
        const CURRENCY = Self::NUMBER.bits()
            | Self::ALLOW_PARENTHESES.bits()
            | Self::ALLOW_CURRENCY_SYMBOL.bits();
        const ANY = Self::CURRENCY.bits() | Self::ALLOW_EXPONENT.bits();
    }
}

impl NumberStyles {
    /// No elements permitted beyond digits.
    pub const NONE: Self = Self::empty();
}

/// Exact date/time formats tried before the round-trip and free-form stages.
///
/// JavaScript `Date` renderings first, then compact numeric timestamps.
pub const DEFAULT_DATE_TIME_FORMATS: &[&str] = &[
    "ddd MMM dd yyyy HH:mm:ss 'GMT'zzz",
    "ddd MMM dd yyyy HH:mm:ss 'UTC'zzz",
    "ddd MMM dd yyyy HH:mm:ss zzz",
    "ddd, dd MMM yyyy HH:mm:ss 'GMT'",
    "ddd, dd MMM yyyy HH:mm:ss 'UTC'",
    "yyyyMMddHHmmss",
    "yyyyMMddHHmm",
    "yyyyMMdd",
];

/// Exact time-of-day formats tried before the round-trip and free-form stages.
pub const DEFAULT_TIME_FORMATS: &[&str] = &["HHmmss", "HHmm"];

/// Immutable snapshot of the parse configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    pub date_time_formats: Vec<String>,
    pub time_formats: Vec<String>,
    pub integer_styles: NumberStyles,
    pub float_styles: NumberStyles,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        ConversionConfig {
            date_time_formats: DEFAULT_DATE_TIME_FORMATS
                .iter()
                .map(|f| f.to_string())
                .collect(),
            time_formats: DEFAULT_TIME_FORMATS.iter().map(|f| f.to_string()).collect(),
            integer_styles: NumberStyles::INTEGER | NumberStyles::ALLOW_THOUSANDS,
            float_styles: NumberStyles::FLOAT | NumberStyles::ALLOW_THOUSANDS,
        }
    }
}

impl ConversionConfig {
    /// Creates the built-in configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy with `formats` appended to the date/time format list.
    ///
    /// Duplicates are discarded; the first occurrence keeps its priority.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use textconv::ConversionConfig;
    ///
    /// let base = ConversionConfig::default();
    /// let count = base.date_time_formats.len();
    /// let config = base.with_date_time_formats(["yyyyMMdd", "dd.MM.yyyy", "dd.MM.yyyy"]);
    /// assert_eq!(config.date_time_formats.len(), count + 1);
    /// ```
    #[must_use]
    pub fn with_date_time_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        append_unique(&mut self.date_time_formats, formats);
        self
    }

    /// Returns a copy with `formats` appended to the time-of-day format list.
    #[must_use]
    pub fn with_time_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        append_unique(&mut self.time_formats, formats);
        self
    }

    /// Sets the style policy used by the integer codecs.
    #[must_use]
    pub fn with_integer_styles(mut self, styles: NumberStyles) -> Self {
        self.integer_styles = styles;
        self
    }

    /// Sets the style policy used by the floating-point and decimal codecs.
    #[must_use]
    pub fn with_float_styles(mut self, styles: NumberStyles) -> Self {
        self.float_styles = styles;
        self
    }
}

fn append_unique<I, S>(list: &mut Vec<String>, formats: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    for format in formats {
        let format = format.into();
        if !format.is_empty() && !list.contains(&format) {
            list.push(format);
        }
    }
}

static GLOBAL: LazyLock<ArcSwap<ConversionConfig>> =
    LazyLock::new(|| ArcSwap::from_pointee(ConversionConfig::default()));

/// Returns the current process-wide snapshot.
#[must_use]
pub fn current() -> Arc<ConversionConfig> {
    GLOBAL.load_full()
}

/// Registers additional date/time formats process-wide.
pub fn add_date_time_formats<I, S>(formats: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let formats: Vec<String> = formats.into_iter().map(Into::into).collect();
    let previous = GLOBAL.rcu(|cur| {
        ConversionConfig::clone(cur).with_date_time_formats(formats.iter().cloned())
    });
    tracing::debug!(
        requested = formats.len(),
        previous = previous.date_time_formats.len(),
        "registered date/time formats"
    );
}

/// Registers additional time-of-day formats process-wide.
pub fn add_time_formats<I, S>(formats: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let formats: Vec<String> = formats.into_iter().map(Into::into).collect();
    let previous =
        GLOBAL.rcu(|cur| ConversionConfig::clone(cur).with_time_formats(formats.iter().cloned()));
    tracing::debug!(
        requested = formats.len(),
        previous = previous.time_formats.len(),
        "registered time formats"
    );
}

/// Replaces the process-wide integer style policy.
pub fn set_integer_styles(styles: NumberStyles) {
    GLOBAL.rcu(|cur| ConversionConfig::clone(cur).with_integer_styles(styles));
}

/// Replaces the process-wide floating-point style policy.
pub fn set_float_styles(styles: NumberStyles) {
    GLOBAL.rcu(|cur| ConversionConfig::clone(cur).with_float_styles(styles));
}

/// Replaces the whole process-wide snapshot.
pub fn replace(config: ConversionConfig) {
    tracing::debug!("replaced process-wide conversion config");
    GLOBAL.store(Arc::new(config));
}

/// Restores the built-in process-wide snapshot.
pub fn reset() {
    replace(ConversionConfig::default());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConversionConfig::default();
        assert_eq!(config.date_time_formats.len(), 8);
        assert_eq!(config.date_time_formats[7], "yyyyMMdd");
        assert_eq!(config.time_formats, vec!["HHmmss", "HHmm"]);
        assert!(config.integer_styles.contains(NumberStyles::ALLOW_THOUSANDS));
        assert!(config.integer_styles.contains(NumberStyles::ALLOW_LEADING_SIGN));
        assert!(!config.integer_styles.contains(NumberStyles::ALLOW_PARENTHESES));
        assert!(config.float_styles.contains(NumberStyles::ALLOW_EXPONENT));
    }

    #[test]
    fn test_append_discards_duplicates_and_empties() {
        let config = ConversionConfig::default().with_time_formats(["HHmm", "", "HH.mm", "HH.mm"]);
        assert_eq!(config.time_formats, vec!["HHmmss", "HHmm", "HH.mm"]);
    }

    #[test]
    fn test_builders_leave_original_untouched() {
        let base = ConversionConfig::default();
        let derived = base.clone().with_date_time_formats(["yyyy/MM/dd"]);
        assert_ne!(base, derived);
        assert_eq!(base, ConversionConfig::default());
    }

    #[test]
    fn test_composite_styles() {
        assert!(NumberStyles::CURRENCY.contains(NumberStyles::ALLOW_PARENTHESES));
        assert!(NumberStyles::ANY.contains(NumberStyles::ALLOW_EXPONENT));
        assert!(!NumberStyles::FLOAT.contains(NumberStyles::ALLOW_THOUSANDS));
        assert!(NumberStyles::NONE.is_empty());
    }
}
