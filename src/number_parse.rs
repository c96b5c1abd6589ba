//! Style-driven numeric text scanning.
//!
//! [`scan`] walks the input once, honouring each [`NumberStyles`] flag and the
//! culture's separators and signs, and produces a normalized [`Scanned`] form.
//! The typed converters (`to_integer`, `to_f64`, `to_decimal`) finish the job.

use crate::config::NumberStyles;
use crate::culture::NumberFormat;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Sign, digits and exponent extracted from decimal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedNumber {
    pub negative: bool,
    /// Integer digits, ASCII.
    pub integer: String,
    /// Fraction digits, ASCII.
    pub fraction: String,
    pub exponent: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Scanned {
    Number(ParsedNumber),
    Hex(String),
}

struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn eat(&mut self, token: &str) -> bool {
        if !token.is_empty() && self.rest.starts_with(token) {
            self.rest = &self.rest[token.len()..];
            true
        } else {
            false
        }
    }

    fn eat_whitespace(&mut self) -> bool {
        let trimmed = self.rest.trim_start();
        let moved = trimmed.len() != self.rest.len();
        self.rest = trimmed;
        moved
    }

    fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.rest = &self.rest[ch.len_utf8()..];
        Some(ch)
    }
}

fn is_space_like(separator: &str) -> bool {
    matches!(separator, "\u{a0}" | "\u{202f}" | " ")
}

fn eat_group_separator(cursor: &mut Cursor<'_>, format: &NumberFormat) -> bool {
    if cursor.eat(format.group_separator) {
        return true;
    }
    // Cultures grouping with a (narrow) no-break space also take a plain space.
    is_space_like(format.group_separator)
        && (cursor.eat(" ") || cursor.eat("\u{a0}") || cursor.eat("\u{202f}"))
}

/// Signs are matched longest-first so a culture sign like `"-"` never shadows a
/// longer one.
fn eat_sign(cursor: &mut Cursor<'_>, format: &NumberFormat) -> Option<bool> {
    if cursor.eat(format.negative_sign) {
        Some(true)
    } else if cursor.eat(format.positive_sign) {
        Some(false)
    } else {
        None
    }
}

/// Scans `text` under `styles`. Returns `None` when the text is not a number.
pub(crate) fn scan(text: &str, styles: NumberStyles, format: &NumberFormat) -> Option<Scanned> {
    let mut cursor = Cursor { rest: text };

    if styles.contains(NumberStyles::ALLOW_HEX_SPECIFIER) {
        if styles.contains(NumberStyles::ALLOW_LEADING_WHITE) {
            cursor.eat_whitespace();
        }
        let digits: String = cursor
            .rest
            .chars()
            .take_while(|c| c.is_ascii_hexdigit())
            .collect();
        if digits.is_empty() {
            return None;
        }
        cursor.rest = &cursor.rest[digits.len()..];
        if styles.contains(NumberStyles::ALLOW_TRAILING_WHITE) {
            cursor.eat_whitespace();
        }
        return cursor.rest.is_empty().then_some(Scanned::Hex(digits));
    }

    let mut negative = false;
    let mut signed = false;
    let mut paren = false;
    let mut currency = false;

    loop {
        if styles.contains(NumberStyles::ALLOW_LEADING_WHITE) && cursor.eat_whitespace() {
            continue;
        }
        if styles.contains(NumberStyles::ALLOW_LEADING_SIGN) && !signed && !paren {
            if let Some(neg) = eat_sign(&mut cursor, format) {
                negative = neg;
                signed = true;
                continue;
            }
        }
        if styles.contains(NumberStyles::ALLOW_PARENTHESES) && !signed && !paren && cursor.eat("(")
        {
            paren = true;
            negative = true;
            continue;
        }
        if styles.contains(NumberStyles::ALLOW_CURRENCY_SYMBOL)
            && !currency
            && cursor.eat(format.currency_symbol)
        {
            currency = true;
            continue;
        }
        break;
    }

    let mut integer = String::new();
    let mut fraction = String::new();
    let mut point = false;
    loop {
        match cursor.peek() {
            Some(c) if c.is_ascii_digit() => {
                cursor.bump();
                if point {
                    fraction.push(c);
                } else {
                    integer.push(c);
                }
            }
            _ => {
                if styles.contains(NumberStyles::ALLOW_DECIMAL_POINT)
                    && !point
                    && cursor.eat(format.decimal_separator)
                {
                    point = true;
                    continue;
                }
                if styles.contains(NumberStyles::ALLOW_THOUSANDS)
                    && !point
                    && !integer.is_empty()
                    && eat_group_separator(&mut cursor, format)
                {
                    continue;
                }
                break;
            }
        }
    }
    if integer.is_empty() && fraction.is_empty() {
        return None;
    }

    let mut exponent = 0i32;
    if styles.contains(NumberStyles::ALLOW_EXPONENT) {
        if let Some('e' | 'E') = cursor.peek() {
            let saved = cursor.rest;
            cursor.bump();
            let exp_negative = if cursor.eat("+") {
                false
            } else if cursor.eat("-") {
                true
            } else {
                eat_sign(&mut cursor, format).unwrap_or(false)
            };
            let digits: String = cursor
                .rest
                .chars()
                .take_while(char::is_ascii_digit)
                .collect();
            if digits.is_empty() {
                cursor.rest = saved;
            } else {
                cursor.rest = &cursor.rest[digits.len()..];
                // Saturate; anything this large overflows every target anyway.
                let magnitude = digits.parse::<i32>().unwrap_or(i32::MAX / 2);
                exponent = if exp_negative { -magnitude } else { magnitude };
            }
        }
    }

    loop {
        if styles.contains(NumberStyles::ALLOW_TRAILING_WHITE) && cursor.eat_whitespace() {
            continue;
        }
        if styles.contains(NumberStyles::ALLOW_TRAILING_SIGN) && !signed && !paren {
            if let Some(neg) = eat_sign(&mut cursor, format) {
                negative = neg;
                signed = true;
                continue;
            }
        }
        if paren && cursor.eat(")") {
            paren = false;
            continue;
        }
        if styles.contains(NumberStyles::ALLOW_CURRENCY_SYMBOL)
            && !currency
            && cursor.eat(format.currency_symbol)
        {
            currency = true;
            continue;
        }
        break;
    }

    if paren || !cursor.rest.is_empty() {
        return None;
    }

    Some(Scanned::Number(ParsedNumber {
        negative,
        integer,
        fraction,
        exponent,
    }))
}

/// Float special values: NaN and the infinities, culture symbols first.
pub(crate) fn scan_special(text: &str, format: &NumberFormat) -> Option<f64> {
    let text = text.trim();
    let matches = |symbol: &str| !symbol.is_empty() && text.eq_ignore_ascii_case(symbol);
    if matches(format.nan_symbol) || matches("NaN") {
        Some(f64::NAN)
    } else if matches(format.negative_infinity_symbol)
        || matches("-Infinity")
        || matches("-\u{221e}")
    {
        Some(f64::NEG_INFINITY)
    } else if matches(format.positive_infinity_symbol)
        || matches("Infinity")
        || matches("+Infinity")
        || matches("\u{221e}")
    {
        Some(f64::INFINITY)
    } else {
        None
    }
}

/// Converts a scanned number to an integer within `[min, max]`.
///
/// Exponents shift digits between the integer and fraction parts; any
/// remaining non-zero fraction digit fails the conversion.
pub(crate) fn to_integer(number: &ParsedNumber, min: i128, max: i128) -> Option<i128> {
    let mut digits = String::with_capacity(number.integer.len() + number.fraction.len());
    digits.push_str(&number.integer);
    digits.push_str(&number.fraction);
    let point = number.integer.len() as i64 + number.exponent as i64;

    let (whole, rest): (&str, &str) = if point <= 0 {
        ("", digits.as_str())
    } else if point as usize >= digits.len() {
        (digits.as_str(), "")
    } else {
        digits.split_at(point as usize)
    };
    if rest.bytes().any(|b| b != b'0') {
        return None;
    }
    let padding = if point > digits.len() as i64 {
        (point - digits.len() as i64) as usize
    } else {
        0
    };
    let whole = whole.trim_start_matches('0');
    if whole.is_empty() {
        return Some(0);
    }
    if whole.len() + padding > 39 {
        return None;
    }
    let mut magnitude = whole.parse::<i128>().ok()?;
    for _ in 0..padding {
        magnitude = magnitude.checked_mul(10)?;
    }
    let value = if number.negative {
        -magnitude
    } else {
        magnitude
    };
    (min..=max).contains(&value).then_some(value)
}

/// Reinterprets hex digits at the given bit width.
pub(crate) fn hex_to_integer(digits: &str, bits: u32, signed: bool) -> Option<i128> {
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Some(0);
    }
    if digits.len() as u32 > bits / 4 {
        return None;
    }
    let raw = u128::from_str_radix(digits, 16).ok()?;
    let value = raw as i128;
    if signed && raw >> (bits - 1) & 1 == 1 {
        Some(value - (1i128 << bits))
    } else {
        Some(value)
    }
}

fn normalized(number: &ParsedNumber) -> String {
    let mut text = String::with_capacity(number.integer.len() + number.fraction.len() + 8);
    if number.negative {
        text.push('-');
    }
    if number.integer.is_empty() {
        text.push('0');
    } else {
        text.push_str(&number.integer);
    }
    if !number.fraction.is_empty() {
        text.push('.');
        text.push_str(&number.fraction);
    }
    if number.exponent != 0 {
        text.push('e');
        text.push_str(&number.exponent.to_string());
    }
    text
}

pub(crate) fn to_f64(number: &ParsedNumber) -> Option<f64> {
    f64::from_str(&normalized(number)).ok()
}

pub(crate) fn to_f32(number: &ParsedNumber) -> Option<f32> {
    f32::from_str(&normalized(number)).ok()
}

/// Integer digits a `Decimal` can hold.
const DECIMAL_DIGITS: i64 = 29;

/// Moves the decimal point by the exponent so `Decimal::from_str` rounds
/// excess fraction digits instead of rejecting them.
fn positional(number: &ParsedNumber) -> Option<String> {
    let integer = number.integer.trim_start_matches('0');
    let digits = format!("{integer}{}", number.fraction);
    let point = integer.len() as i64 + i64::from(number.exponent);
    if digits.bytes().all(|b| b == b'0') || point < -DECIMAL_DIGITS {
        return Some("0".to_string());
    }
    if point > DECIMAL_DIGITS {
        return None;
    }

    let mut text = String::with_capacity(digits.len() + DECIMAL_DIGITS as usize + 3);
    if number.negative {
        text.push('-');
    }
    if point <= 0 {
        text.push_str("0.");
        text.extend(std::iter::repeat('0').take(point.unsigned_abs() as usize));
        text.push_str(&digits);
    } else if point as usize >= digits.len() {
        text.push_str(&digits);
        text.extend(std::iter::repeat('0').take(point as usize - digits.len()));
    } else {
        let (whole, fraction) = digits.split_at(point as usize);
        text.push_str(whole);
        text.push('.');
        text.push_str(fraction);
    }
    Some(text)
}

pub(crate) fn to_decimal(number: &ParsedNumber) -> Option<Decimal> {
    if number.exponent == 0 {
        Decimal::from_str(&normalized(number)).ok()
    } else {
        Decimal::from_str(&positional(number)?).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Culture;

    fn invariant() -> &'static NumberFormat {
        &Culture::invariant().number
    }

    fn number(text: &str, styles: NumberStyles, format: &NumberFormat) -> Option<ParsedNumber> {
        match scan(text, styles, format)? {
            Scanned::Number(n) => Some(n),
            Scanned::Hex(_) => None,
        }
    }

    #[test]
    fn test_plain_integer() {
        let n = number("-1234", NumberStyles::INTEGER, invariant()).unwrap();
        assert!(n.negative);
        assert_eq!(n.integer, "1234");
        assert_eq!(to_integer(&n, i32::MIN as i128, i32::MAX as i128), Some(-1234));
    }

    #[test]
    fn test_thousands_in_german() {
        let de = &Culture::resolve(Some("de-DE")).number;
        let styles = NumberStyles::INTEGER | NumberStyles::ALLOW_THOUSANDS;
        let n = number("67.500", styles, de).unwrap();
        assert_eq!(to_integer(&n, i128::MIN, i128::MAX), Some(67500));
        assert!(number(".500", styles, de).is_none());
    }

    #[test]
    fn test_parentheses_need_the_flag() {
        assert!(scan("(67)", NumberStyles::INTEGER, invariant()).is_none());
        let n = number("(67)", NumberStyles::CURRENCY, invariant()).unwrap();
        assert!(n.negative);
        assert!(scan("(67", NumberStyles::CURRENCY, invariant()).is_none());
    }

    #[test]
    fn test_trailing_sign() {
        let n = number("12-", NumberStyles::NUMBER, invariant()).unwrap();
        assert!(n.negative);
        assert!(scan("12-", NumberStyles::INTEGER, invariant()).is_none());
    }

    #[test]
    fn test_whitespace_flags() {
        assert!(scan(" 5", NumberStyles::NONE, invariant()).is_none());
        assert!(scan(" 5 ", NumberStyles::INTEGER, invariant()).is_some());
    }

    #[test]
    fn test_exponent_shifts_integer() {
        let n = number("1.5e3", NumberStyles::FLOAT, invariant()).unwrap();
        assert_eq!(to_integer(&n, i128::MIN, i128::MAX), Some(1500));
        let n = number("1.5e0", NumberStyles::FLOAT, invariant()).unwrap();
        assert_eq!(to_integer(&n, i128::MIN, i128::MAX), None);
        let n = number("2500e-2", NumberStyles::FLOAT, invariant()).unwrap();
        assert_eq!(to_integer(&n, i128::MIN, i128::MAX), Some(25));
    }

    #[test]
    fn test_exponent_without_digits_is_not_consumed() {
        assert!(scan("5e", NumberStyles::FLOAT, invariant()).is_none());
    }

    #[test]
    fn test_integer_range() {
        let n = number("300", NumberStyles::INTEGER, invariant()).unwrap();
        assert_eq!(to_integer(&n, 0, 255), None);
        let n = number("-0", NumberStyles::INTEGER, invariant()).unwrap();
        assert_eq!(to_integer(&n, 0, 255), Some(0));
    }

    #[test]
    fn test_hex_reinterpretation() {
        assert_eq!(hex_to_integer("FF", 8, true), Some(-1));
        assert_eq!(hex_to_integer("FF", 8, false), Some(255));
        assert_eq!(hex_to_integer("1FF", 8, false), None);
        assert_eq!(hex_to_integer("0000ff", 16, true), Some(255));
        assert_eq!(hex_to_integer("FFFFFFFFFFFFFFFF", 64, true), Some(-1));
    }

    #[test]
    fn test_french_space_grouping() {
        let fr = &Culture::resolve(Some("fr-FR")).number;
        let styles = NumberStyles::NUMBER;
        let n = number("1 234,5", styles, fr).unwrap();
        assert_eq!(n.integer, "1234");
        assert_eq!(n.fraction, "5");
    }

    #[test]
    fn test_float_and_decimal_conversion() {
        let n = number("-1,234.5e-1", NumberStyles::FLOAT | NumberStyles::ALLOW_THOUSANDS, invariant()).unwrap();
        assert_eq!(to_f64(&n), Some(-123.45));
        assert_eq!(to_decimal(&n), Some(Decimal::new(-12345, 2)));
    }

    #[test]
    fn test_decimal_exponent_rounds_to_scale() {
        let parse = |text: &str| {
            let n = number(text, NumberStyles::FLOAT, invariant()).unwrap();
            to_decimal(&n)
        };
        assert_eq!(parse("1e-30"), Some(Decimal::ZERO));
        assert_eq!(parse("1.5e-28"), Some(Decimal::new(2, 28)));
        assert_eq!(parse("-1.2345e2"), Some(Decimal::new(-12345, 2)));
        assert_eq!(parse("0.00125e3"), Some(Decimal::new(125, 2)));
        assert_eq!(parse("7.9e28"), Decimal::from_str("79000000000000000000000000000").ok());
        assert_eq!(parse("1e29"), None);
        assert_eq!(parse("1e-100000"), Some(Decimal::ZERO));
    }

    #[test]
    fn test_special_values() {
        assert!(scan_special("NaN", invariant()).unwrap().is_nan());
        assert_eq!(scan_special("-infinity", invariant()), Some(f64::NEG_INFINITY));
        assert_eq!(
            scan_special("\u{221e}", &Culture::resolve(Some("de-DE")).number),
            Some(f64::INFINITY)
        );
        assert_eq!(scan_special("12", invariant()), None);
    }
}
