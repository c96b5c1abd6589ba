//! Options shared by every parse operation.
//!
//! - [`TrimmingOptions`]: which ends of the input are trimmed before parsing
//! - [`ParseOptions`]: culture, trimming, enumeration case rule and an optional
//!   injected [`ConversionConfig`]
//!
//! ## Examples
//!
//! ```rust
//! use textconv::{ParseOptions, TrimmingOptions};
//!
//! let options = ParseOptions::new()
//!     .with_culture("de-DE")
//!     .with_trimming(TrimmingOptions::START);
//!
//! assert_eq!(options.culture.name, "de-DE");
//! assert_eq!(options.trimming.apply("  42  "), "42  ");
//! ```

use crate::config::{self, ConversionConfig};
use crate::Culture;
use bitflags::bitflags;
use std::sync::Arc;

bitflags! {
    /// Which ends of the input text are trimmed before any parse attempt.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use textconv::TrimmingOptions;
    ///
    /// assert_eq!(TrimmingOptions::BOTH.apply("\t7 "), "7");
    /// assert_eq!(TrimmingOptions::END.apply(" 7 "), " 7");
    /// assert_eq!(TrimmingOptions::NONE.apply(" 7 "), " 7 ");
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TrimmingOptions: u8 {
        const START = 0b01;
        const END = 0b10;
        const BOTH = Self::START.bits() | Self::END.bits();
    }
}

impl TrimmingOptions {
    /// Leave the input untouched.
    pub const NONE: Self = Self::empty();

    /// Trims `text` according to the selected ends.
    #[must_use]
    pub fn apply(self, text: &str) -> &str {
        let text = if self.contains(Self::START) {
            text.trim_start()
        } else {
            text
        };
        if self.contains(Self::END) {
            text.trim_end()
        } else {
            text
        }
    }
}

impl Default for TrimmingOptions {
    fn default() -> Self {
        TrimmingOptions::BOTH
    }
}

/// Options for parse operations.
///
/// The default is the invariant culture, trimming both ends, case-insensitive
/// enumeration names and the process-wide configuration snapshot.
#[derive(Clone, Debug)]
pub struct ParseOptions {
    pub culture: &'static Culture,
    pub trimming: TrimmingOptions,
    pub ignore_case: bool,
    pub config: Option<Arc<ConversionConfig>>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            culture: Culture::invariant(),
            trimming: TrimmingOptions::default(),
            ignore_case: true,
            config: None,
        }
    }
}

impl ParseOptions {
    /// Creates default options.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use textconv::{ParseOptions, TrimmingOptions};
    ///
    /// let options = ParseOptions::new();
    /// assert!(options.culture.is_invariant());
    /// assert_eq!(options.trimming, TrimmingOptions::BOTH);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects a culture by name; unknown names fall back to invariant.
    #[must_use]
    pub fn with_culture(mut self, name: &str) -> Self {
        self.culture = Culture::resolve(Some(name));
        self
    }

    /// Selects a culture directly.
    #[must_use]
    pub fn with_culture_ref(mut self, culture: &'static Culture) -> Self {
        self.culture = culture;
        self
    }

    /// Sets the trimming policy.
    #[must_use]
    pub fn with_trimming(mut self, trimming: TrimmingOptions) -> Self {
        self.trimming = trimming;
        self
    }

    /// Sets whether enumeration names match case-insensitively.
    #[must_use]
    pub fn with_ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    /// Uses `config` instead of the process-wide snapshot.
    #[must_use]
    pub fn with_config(mut self, config: Arc<ConversionConfig>) -> Self {
        self.config = Some(config);
        self
    }

    /// The configuration snapshot this parse observes.
    #[must_use]
    pub fn snapshot(&self) -> Arc<ConversionConfig> {
        match &self.config {
            Some(config) => Arc::clone(config),
            None => config::current(),
        }
    }
}

/// Per-call parse context handed to the codecs once the input is trimmed.
#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    pub culture: &'static Culture,
    pub config: &'a ConversionConfig,
    pub ignore_case: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trimming_variants() {
        let text = " \t x \n";
        assert_eq!(TrimmingOptions::NONE.apply(text), text);
        assert_eq!(TrimmingOptions::START.apply(text), "x \n");
        assert_eq!(TrimmingOptions::END.apply(text), " \t x");
        assert_eq!(TrimmingOptions::BOTH.apply(text), "x");
    }

    #[test]
    fn test_trimming_unicode_whitespace() {
        assert_eq!(TrimmingOptions::BOTH.apply("\u{a0}5\u{2003}"), "5");
    }

    #[test]
    fn test_builder_chain() {
        let options = ParseOptions::new()
            .with_culture("fr")
            .with_trimming(TrimmingOptions::END)
            .with_ignore_case(false);
        assert_eq!(options.culture.name, "fr-FR");
        assert_eq!(options.trimming, TrimmingOptions::END);
        assert!(!options.ignore_case);
    }

    #[test]
    fn test_injected_config_wins() {
        let config = Arc::new(ConversionConfig::default().with_time_formats(["HH.mm"]));
        let options = ParseOptions::new().with_config(Arc::clone(&config));
        assert!(Arc::ptr_eq(&options.snapshot(), &config));
    }
}
