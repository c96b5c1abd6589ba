//! Named numeric and date/time conventions.
//!
//! A [`Culture`] bundles the separators, symbols, patterns and names used when
//! parsing and formatting values. The crate ships a small fixed table; it is not
//! a locale database. Unknown names resolve to the invariant culture.
//!
//! ## Examples
//!
//! ```rust
//! use textconv::Culture;
//!
//! let de = Culture::resolve(Some("de-DE"));
//! assert_eq!(de.number.decimal_separator, ",");
//! assert_eq!(de.number.group_separator, ".");
//!
//! // Unknown names fall back without an error
//! assert_eq!(Culture::resolve(Some("xx-YY")).name, "");
//! ```

use indexmap::IndexMap;
use std::sync::LazyLock;

/// Numeric conventions of a culture.
///
/// Currency and percent patterns are templates: `n` is the formatted number,
/// `$` the currency symbol, `%` the percent symbol and `-` the negative sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFormat {
    pub decimal_separator: &'static str,
    pub group_separator: &'static str,
    pub group_sizes: &'static [usize],
    pub negative_sign: &'static str,
    pub positive_sign: &'static str,
    pub number_decimal_digits: usize,
    pub currency_symbol: &'static str,
    pub currency_decimal_digits: usize,
    pub currency_positive_pattern: &'static str,
    pub currency_negative_pattern: &'static str,
    pub percent_symbol: &'static str,
    pub per_mille_symbol: &'static str,
    pub percent_positive_pattern: &'static str,
    pub percent_negative_pattern: &'static str,
    pub nan_symbol: &'static str,
    pub positive_infinity_symbol: &'static str,
    pub negative_infinity_symbol: &'static str,
}

/// Date and time conventions of a culture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    pub date_separator: &'static str,
    pub time_separator: &'static str,
    pub short_date: &'static str,
    pub long_date: &'static str,
    pub short_time: &'static str,
    pub long_time: &'static str,
    pub month_day: &'static str,
    pub year_month: &'static str,
    pub am_designator: &'static str,
    pub pm_designator: &'static str,
    pub month_names: [&'static str; 12],
    pub abbreviated_month_names: [&'static str; 12],
    /// Sunday first.
    pub day_names: [&'static str; 7],
    /// Sunday first.
    pub abbreviated_day_names: [&'static str; 7],
}

/// Order of the day, month and year fields in a culture's short date pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    Mdy,
    Dmy,
    Ymd,
}

/// A named set of formatting conventions.
#[derive(Debug, PartialEq, Eq)]
pub struct Culture {
    /// Culture name such as `"de-DE"`; the invariant culture is `""`.
    pub name: &'static str,
    pub number: NumberFormat,
    pub date: DateFormat,
}

const ENGLISH_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];
const ENGLISH_MONTHS_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const ENGLISH_DAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];
const ENGLISH_DAYS_ABBR: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

const GROUP_3: &[usize] = &[3];

const INVARIANT: Culture = Culture {
    name: "",
    number: NumberFormat {
        decimal_separator: ".",
        group_separator: ",",
        group_sizes: GROUP_3,
        negative_sign: "-",
        positive_sign: "+",
        number_decimal_digits: 2,
        currency_symbol: "\u{a4}",
        currency_decimal_digits: 2,
        currency_positive_pattern: "$n",
        currency_negative_pattern: "($n)",
        percent_symbol: "%",
        per_mille_symbol: "\u{2030}",
        percent_positive_pattern: "n %",
        percent_negative_pattern: "-n %",
        nan_symbol: "NaN",
        positive_infinity_symbol: "Infinity",
        negative_infinity_symbol: "-Infinity",
    },
    date: DateFormat {
        date_separator: "/",
        time_separator: ":",
        short_date: "MM/dd/yyyy",
        long_date: "dddd, dd MMMM yyyy",
        short_time: "HH:mm",
        long_time: "HH:mm:ss",
        month_day: "MMMM dd",
        year_month: "yyyy MMMM",
        am_designator: "AM",
        pm_designator: "PM",
        month_names: ENGLISH_MONTHS,
        abbreviated_month_names: ENGLISH_MONTHS_ABBR,
        day_names: ENGLISH_DAYS,
        abbreviated_day_names: ENGLISH_DAYS_ABBR,
    },
};

const EN_US: Culture = Culture {
    name: "en-US",
    number: NumberFormat {
        currency_symbol: "$",
        currency_positive_pattern: "$n",
        currency_negative_pattern: "-$n",
        percent_positive_pattern: "n%",
        percent_negative_pattern: "-n%",
        positive_infinity_symbol: "\u{221e}",
        negative_infinity_symbol: "-\u{221e}",
        ..INVARIANT.number
    },
    date: DateFormat {
        short_date: "M/d/yyyy",
        long_date: "dddd, MMMM d, yyyy",
        short_time: "h:mm tt",
        long_time: "h:mm:ss tt",
        month_day: "MMMM d",
        year_month: "MMMM yyyy",
        ..INVARIANT.date
    },
};

const EN_GB: Culture = Culture {
    name: "en-GB",
    number: NumberFormat {
        currency_symbol: "\u{a3}",
        ..EN_US.number
    },
    date: DateFormat {
        short_date: "dd/MM/yyyy",
        long_date: "dddd, d MMMM yyyy",
        short_time: "HH:mm",
        long_time: "HH:mm:ss",
        month_day: "d MMMM",
        year_month: "MMMM yyyy",
        am_designator: "am",
        pm_designator: "pm",
        ..INVARIANT.date
    },
};

const DE_DE: Culture = Culture {
    name: "de-DE",
    number: NumberFormat {
        decimal_separator: ",",
        group_separator: ".",
        currency_symbol: "\u{20ac}",
        currency_positive_pattern: "n $",
        currency_negative_pattern: "-n $",
        percent_positive_pattern: "n %",
        percent_negative_pattern: "-n %",
        ..EN_US.number
    },
    date: DateFormat {
        date_separator: ".",
        time_separator: ":",
        short_date: "dd.MM.yyyy",
        long_date: "dddd, d. MMMM yyyy",
        short_time: "HH:mm",
        long_time: "HH:mm:ss",
        month_day: "d. MMMM",
        year_month: "MMMM yyyy",
        am_designator: "AM",
        pm_designator: "PM",
        month_names: [
            "Januar",
            "Februar",
            "M\u{e4}rz",
            "April",
            "Mai",
            "Juni",
            "Juli",
            "August",
            "September",
            "Oktober",
            "November",
            "Dezember",
        ],
        abbreviated_month_names: [
            "Jan", "Feb", "M\u{e4}r", "Apr", "Mai", "Jun", "Jul", "Aug", "Sep", "Okt", "Nov", "Dez",
        ],
        day_names: [
            "Sonntag",
            "Montag",
            "Dienstag",
            "Mittwoch",
            "Donnerstag",
            "Freitag",
            "Samstag",
        ],
        abbreviated_day_names: ["So", "Mo", "Di", "Mi", "Do", "Fr", "Sa"],
    },
};

const FR_FR: Culture = Culture {
    name: "fr-FR",
    number: NumberFormat {
        group_separator: "\u{202f}",
        ..DE_DE.number
    },
    date: DateFormat {
        date_separator: "/",
        short_date: "dd/MM/yyyy",
        long_date: "dddd d MMMM yyyy",
        month_day: "d MMMM",
        year_month: "MMMM yyyy",
        month_names: [
            "janvier",
            "f\u{e9}vrier",
            "mars",
            "avril",
            "mai",
            "juin",
            "juillet",
            "ao\u{fb}t",
            "septembre",
            "octobre",
            "novembre",
            "d\u{e9}cembre",
        ],
        abbreviated_month_names: [
            "janv.",
            "f\u{e9}vr.",
            "mars",
            "avr.",
            "mai",
            "juin",
            "juil.",
            "ao\u{fb}t",
            "sept.",
            "oct.",
            "nov.",
            "d\u{e9}c.",
        ],
        day_names: [
            "dimanche", "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi",
        ],
        abbreviated_day_names: ["dim.", "lun.", "mar.", "mer.", "jeu.", "ven.", "sam."],
        ..DE_DE.date
    },
};

const ES_ES: Culture = Culture {
    name: "es-ES",
    number: NumberFormat { ..DE_DE.number },
    date: DateFormat {
        date_separator: "/",
        short_date: "dd/MM/yyyy",
        long_date: "dddd, d 'de' MMMM 'de' yyyy",
        short_time: "H:mm",
        long_time: "H:mm:ss",
        month_day: "d 'de' MMMM",
        year_month: "MMMM 'de' yyyy",
        month_names: [
            "enero",
            "febrero",
            "marzo",
            "abril",
            "mayo",
            "junio",
            "julio",
            "agosto",
            "septiembre",
            "octubre",
            "noviembre",
            "diciembre",
        ],
        abbreviated_month_names: [
            "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
        ],
        day_names: [
            "domingo",
            "lunes",
            "martes",
            "mi\u{e9}rcoles",
            "jueves",
            "viernes",
            "s\u{e1}bado",
        ],
        abbreviated_day_names: ["dom", "lun", "mar", "mi\u{e9}", "jue", "vie", "s\u{e1}b"],
        ..DE_DE.date
    },
};

const IT_IT: Culture = Culture {
    name: "it-IT",
    number: NumberFormat { ..DE_DE.number },
    date: DateFormat {
        date_separator: "/",
        short_date: "dd/MM/yyyy",
        long_date: "dddd d MMMM yyyy",
        month_day: "d MMMM",
        year_month: "MMMM yyyy",
        month_names: [
            "gennaio",
            "febbraio",
            "marzo",
            "aprile",
            "maggio",
            "giugno",
            "luglio",
            "agosto",
            "settembre",
            "ottobre",
            "novembre",
            "dicembre",
        ],
        abbreviated_month_names: [
            "gen", "feb", "mar", "apr", "mag", "giu", "lug", "ago", "set", "ott", "nov", "dic",
        ],
        day_names: [
            "domenica",
            "luned\u{ec}",
            "marted\u{ec}",
            "mercoled\u{ec}",
            "gioved\u{ec}",
            "venerd\u{ec}",
            "sabato",
        ],
        abbreviated_day_names: ["dom", "lun", "mar", "mer", "gio", "ven", "sab"],
        ..DE_DE.date
    },
};

static CULTURES: [Culture; 7] = [INVARIANT, EN_US, EN_GB, DE_DE, FR_FR, ES_ES, IT_IT];

// Keyed by lowercase name.
static REGISTRY: LazyLock<IndexMap<String, &'static Culture>> = LazyLock::new(|| {
    CULTURES
        .iter()
        .map(|c| (c.name.to_ascii_lowercase(), c))
        .collect()
});

impl Culture {
    /// The invariant culture: `.` decimal point, `,` grouping, English names.
    #[inline]
    #[must_use]
    pub fn invariant() -> &'static Culture {
        &CULTURES[0]
    }

    /// Looks up a culture by name.
    ///
    /// Matching is case-insensitive. When there is no exact match the language
    /// part alone is tried, so `"de"` and `"de-AT"` both find `de-DE`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use textconv::Culture;
    ///
    /// assert_eq!(Culture::get("EN-gb").map(|c| c.name), Some("en-GB"));
    /// assert_eq!(Culture::get("fr-CA").map(|c| c.name), Some("fr-FR"));
    /// assert!(Culture::get("tlh").is_none());
    /// ```
    #[must_use]
    pub fn get(name: &str) -> Option<&'static Culture> {
        let key = name.trim().to_ascii_lowercase();
        if let Some(culture) = REGISTRY.get(&key) {
            return Some(*culture);
        }
        let language = key.split(['-', '_']).next().unwrap_or_default();
        if language.is_empty() {
            return None;
        }
        REGISTRY
            .iter()
            .find(|(k, _)| k.split('-').next() == Some(language))
            .map(|(_, c)| *c)
    }

    /// Resolves an optional culture name, falling back to the invariant culture.
    #[must_use]
    pub fn resolve(name: Option<&str>) -> &'static Culture {
        match name {
            None => Culture::invariant(),
            Some(name) => Culture::get(name).unwrap_or_else(|| {
                tracing::debug!(culture = name, "unknown culture, using invariant");
                Culture::invariant()
            }),
        }
    }

    /// All built-in cultures, invariant first.
    pub fn all() -> impl Iterator<Item = &'static Culture> {
        REGISTRY.values().copied()
    }

    /// Field order of the short date pattern.
    #[must_use]
    pub fn date_order(&self) -> DateOrder {
        let pattern = self.date.short_date;
        let y = pattern.find('y');
        let m = pattern.find('M');
        let d = pattern.find('d');
        match (y, m, d) {
            (Some(y), Some(m), _) if y < m => DateOrder::Ymd,
            (_, Some(m), Some(d)) if d < m => DateOrder::Dmy,
            _ => DateOrder::Mdy,
        }
    }

    /// Returns `true` for the invariant culture.
    #[inline]
    #[must_use]
    pub fn is_invariant(&self) -> bool {
        self.name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_lookup_is_case_insensitive() {
        assert_eq!(Culture::get("de-de").map(|c| c.name), Some("de-DE"));
        assert_eq!(Culture::get("IT-it").map(|c| c.name), Some("it-IT"));
    }

    #[test]
    fn test_language_fallback() {
        assert_eq!(Culture::get("de").map(|c| c.name), Some("de-DE"));
        assert_eq!(Culture::get("es_MX").map(|c| c.name), Some("es-ES"));
        assert_eq!(Culture::get("en").map(|c| c.name), Some("en-US"));
    }

    #[test]
    fn test_resolve_unknown_is_invariant() {
        assert!(Culture::resolve(Some("zz-ZZ")).is_invariant());
        assert!(Culture::resolve(None).is_invariant());
        assert!(Culture::resolve(Some("")).is_invariant());
    }

    #[test]
    fn test_date_order() {
        assert_eq!(Culture::resolve(Some("en-US")).date_order(), DateOrder::Mdy);
        assert_eq!(Culture::resolve(Some("de-DE")).date_order(), DateOrder::Dmy);
        assert_eq!(Culture::invariant().date_order(), DateOrder::Mdy);
    }

    #[test]
    fn test_all_lists_every_culture_once() {
        let names: Vec<_> = Culture::all().map(|c| c.name).collect();
        assert_eq!(names.len(), 7);
        assert_eq!(names[0], "");
    }
}
