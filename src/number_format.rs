//! Standard and custom numeric format specifiers.
//!
//! Every value is first turned into a [`Digits`] (sign, decimal digits and the
//! position of the decimal point). All rounding happens on those digits, half
//! away from zero, so the same rules apply to integers, floats and decimals.

use crate::culture::{Culture, NumberFormat};
use crate::error::{Error, Result};
use rust_decimal::Decimal;

/// A number handed to the formatter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum NumberValue {
    Integer { value: i128, bits: u32 },
    Float { value: f64, single: bool },
    Decimal(Decimal),
}

/// Decimal digits of a number: `0.d1 d2 d3 ... × 10^scale`.
///
/// `digits` never has trailing zeros; an empty list is zero.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Digits {
    negative: bool,
    digits: Vec<u8>,
    scale: i32,
    /// Floats keep the sign of a value that rounds to zero.
    keep_sign: bool,
}

impl Digits {
    fn from_integer(value: i128) -> Self {
        let text = value.unsigned_abs().to_string();
        let mut d = Digits {
            negative: value < 0,
            digits: text.bytes().map(|b| b - b'0').collect(),
            scale: text.len() as i32,
            keep_sign: false,
        };
        d.trim();
        d
    }

    fn from_decimal(value: Decimal) -> Self {
        let text = value.mantissa().unsigned_abs().to_string();
        let mut d = Digits {
            negative: value.is_sign_negative(),
            digits: text.bytes().map(|b| b - b'0').collect(),
            scale: text.len() as i32 - value.scale() as i32,
            keep_sign: false,
        };
        d.trim();
        d
    }

    /// Parses Rust's `{:e}` rendering, e.g. `1.5e-5`.
    fn from_exponential(text: &str, negative: bool) -> Self {
        let (mantissa, exponent) = text.split_once('e').unwrap_or((text, "0"));
        let exponent: i32 = exponent.parse().unwrap_or(0);
        let mut d = Digits {
            negative,
            digits: mantissa
                .bytes()
                .filter(u8::is_ascii_digit)
                .map(|b| b - b'0')
                .collect(),
            scale: exponent + 1,
            keep_sign: true,
        };
        d.trim();
        d
    }

    /// Shortest digits that round-trip through `f64` (or `f32`).
    fn shortest(value: f64, single: bool) -> Self {
        let text = if single {
            format!("{:e}", (value as f32).abs())
        } else {
            format!("{:e}", value.abs())
        };
        Digits::from_exponential(&text, value.is_sign_negative())
    }

    /// At least `significant` digits of the exact binary value.
    ///
    /// Rounding half away from zero only inspects the first dropped digit, so
    /// the extra digits requested here keep Rust's own rounding out of the way.
    fn exact(value: f64, significant: usize) -> Self {
        let text = format!("{:.*e}", significant.min(800) + 24, value.abs());
        Digits::from_exponential(&text, value.is_sign_negative())
    }

    fn is_zero(&self) -> bool {
        self.digits.is_empty()
    }

    fn shows_sign(&self) -> bool {
        self.negative && (self.keep_sign || !self.is_zero())
    }

    fn trim(&mut self) {
        while self.digits.last() == Some(&0) {
            self.digits.pop();
        }
        if let Some(lead) = self.digits.iter().position(|&d| d != 0) {
            self.digits.drain(..lead);
            self.scale -= lead as i32;
        }
        if self.digits.is_empty() {
            self.scale = 0;
        }
    }

    /// Keeps the first `keep` digits, rounding half away from zero.
    fn round_at(&mut self, keep: i32) {
        if keep < 0 {
            self.digits.clear();
            self.scale = 0;
            return;
        }
        let keep = keep as usize;
        if keep >= self.digits.len() {
            return;
        }
        let round_up = self.digits[keep] >= 5;
        self.digits.truncate(keep);
        if round_up {
            let mut i = keep;
            loop {
                if i == 0 {
                    self.digits.insert(0, 1);
                    self.scale += 1;
                    break;
                }
                i -= 1;
                if self.digits[i] == 9 {
                    self.digits[i] = 0;
                } else {
                    self.digits[i] += 1;
                    break;
                }
            }
        }
        self.trim();
    }

    fn round_fraction(&mut self, decimals: usize) {
        self.round_at(self.scale + decimals as i32);
    }

    fn round_significant(&mut self, count: usize) {
        self.round_at(count as i32);
    }

    fn digit(&self, index: i32) -> char {
        if index < 0 {
            return '0';
        }
        match self.digits.get(index as usize) {
            Some(d) => (b'0' + d) as char,
            None => '0',
        }
    }

    /// Integer part without leading zeros; empty below one.
    fn integer_digits(&self) -> String {
        (0..self.scale.max(0)).map(|i| self.digit(i)).collect()
    }

    /// Exactly `count` fraction digits.
    fn fraction_digits(&self, count: usize) -> String {
        (0..count as i32).map(|k| self.digit(self.scale + k)).collect()
    }

    /// Every fraction digit present.
    fn all_fraction_digits(&self) -> String {
        let count = (self.digits.len() as i32 - self.scale).max(0) as usize;
        self.fraction_digits(count)
    }
}

fn group(integer: &str, format: &NumberFormat) -> String {
    if format.group_sizes.is_empty() || integer.len() <= format.group_sizes[0] {
        return integer.to_string();
    }
    let mut groups: Vec<&str> = Vec::new();
    let mut end = integer.len();
    let mut sizes = format.group_sizes.iter();
    let mut size = sizes.next().copied().unwrap_or(0);
    while end > 0 {
        if size == 0 || size >= end {
            groups.push(&integer[..end]);
            break;
        }
        groups.push(&integer[end - size..end]);
        end -= size;
        // The last size repeats.
        if let Some(next) = sizes.next() {
            size = *next;
        }
    }
    groups.reverse();
    groups.join(format.group_separator)
}

fn fixed(digits: &Digits, decimals: usize, grouped: bool, format: &NumberFormat) -> String {
    let mut integer = digits.integer_digits();
    if integer.is_empty() {
        integer.push('0');
    }
    let mut out = if grouped {
        group(&integer, format)
    } else {
        integer
    };
    if decimals > 0 {
        out.push_str(format.decimal_separator);
        out.push_str(&digits.fraction_digits(decimals));
    }
    out
}

fn exponent_text(exponent: i32, min_digits: usize, always_sign: bool, format: &NumberFormat) -> String {
    let sign = if exponent < 0 {
        format.negative_sign
    } else if always_sign {
        format.positive_sign
    } else {
        ""
    };
    format!("{sign}{:0width$}", exponent.unsigned_abs(), width = min_digits)
}

fn scientific(
    digits: &Digits,
    decimals: usize,
    letter: char,
    exp_digits: usize,
    format: &NumberFormat,
) -> String {
    let exponent = if digits.is_zero() { 0 } else { digits.scale - 1 };
    let mut out = String::new();
    out.push(digits.digit(0));
    if decimals > 0 {
        out.push_str(format.decimal_separator);
        for i in 1..=decimals as i32 {
            out.push(digits.digit(i));
        }
    }
    out.push(letter);
    out.push_str(&exponent_text(exponent, exp_digits, true, format));
    out
}

/// Expands a currency or percent template.
fn apply_pattern(pattern: &str, number: &str, format: &NumberFormat) -> String {
    let mut out = String::with_capacity(number.len() + 4);
    for ch in pattern.chars() {
        match ch {
            'n' => out.push_str(number),
            '$' => out.push_str(format.currency_symbol),
            '%' => out.push_str(format.percent_symbol),
            '-' => out.push_str(format.negative_sign),
            other => out.push(other),
        }
    }
    out
}

fn with_sign(digits: &Digits, body: String, format: &NumberFormat) -> String {
    if digits.shows_sign() {
        format!("{}{body}", format.negative_sign)
    } else {
        body
    }
}

/// Splits `"N2"` into `('N', Some(2))`. `None` means a custom pattern.
fn standard_spec(spec: &str) -> Option<(char, Option<usize>)> {
    let mut chars = spec.chars();
    let letter = chars.next().filter(char::is_ascii_alphabetic)?;
    let rest = chars.as_str();
    if rest.len() > 9 || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let precision = if rest.is_empty() {
        None
    } else {
        rest.parse().ok()
    };
    Some((letter, precision))
}

impl NumberValue {
    fn digits_for_fixed(&self, decimals: usize) -> Digits {
        let mut d = match *self {
            NumberValue::Integer { value, .. } => Digits::from_integer(value),
            NumberValue::Decimal(value) => Digits::from_decimal(value),
            NumberValue::Float { value, single } => {
                let scale = Digits::shortest(value, single).scale;
                let needed = (scale + decimals as i32 + 2).max(1) as usize;
                Digits::exact(value, needed)
            }
        };
        d.round_fraction(decimals);
        d
    }

    fn digits_for_significant(&self, count: usize) -> Digits {
        let mut d = match *self {
            NumberValue::Integer { value, .. } => Digits::from_integer(value),
            NumberValue::Decimal(value) => Digits::from_decimal(value),
            NumberValue::Float { value, .. } => Digits::exact(value, count),
        };
        d.round_significant(count);
        d
    }

    /// Digits for `G` without precision and for `R`.
    fn digits_general(&self) -> Digits {
        match *self {
            NumberValue::Integer { value, .. } => Digits::from_integer(value),
            NumberValue::Decimal(value) => Digits::from_decimal(value),
            NumberValue::Float { value, single } => Digits::shortest(value, single),
        }
    }

    /// Float digits reduced to the type's meaningful precision.
    fn digits_for_custom(&self) -> Digits {
        match *self {
            NumberValue::Float { value, single } => {
                let precision = if single { 7 } else { 15 };
                let mut d = Digits::exact(value, precision);
                d.round_significant(precision);
                d.keep_sign = false;
                d
            }
            _ => self.digits_general(),
        }
    }

    fn general_threshold(&self) -> i32 {
        match self {
            NumberValue::Float { single: true, .. } => 7,
            NumberValue::Float { single: false, .. } => 15,
            _ => i32::MAX,
        }
    }
}

fn general(digits: &Digits, threshold: i32, letter: char, format: &NumberFormat) -> String {
    let exponent = if digits.is_zero() { 0 } else { digits.scale - 1 };
    let body = if exponent < -4 || exponent >= threshold {
        let mut out = String::new();
        out.push(digits.digit(0));
        if digits.digits.len() > 1 {
            out.push_str(format.decimal_separator);
            for i in 1..digits.digits.len() as i32 {
                out.push(digits.digit(i));
            }
        }
        out.push(if letter == 'g' { 'e' } else { 'E' });
        out.push_str(&exponent_text(exponent, 2, true, format));
        out
    } else {
        let mut out = digits.integer_digits();
        if out.is_empty() {
            out.push('0');
        }
        let fraction = digits.all_fraction_digits();
        if !fraction.is_empty() {
            out.push_str(format.decimal_separator);
            out.push_str(&fraction);
        }
        out
    };
    with_sign(digits, body, format)
}

fn decimal_with_scale(value: Decimal, format: &NumberFormat) -> String {
    let text = value.to_string();
    let (sign, body) = match text.strip_prefix('-') {
        Some(body) => (format.negative_sign, body),
        None => ("", text.as_str()),
    };
    format!("{sign}{}", body.replacen('.', format.decimal_separator, 1))
}

/// Formats `value` with a standard or custom specifier under `culture`.
pub(crate) fn format_number(value: NumberValue, spec: Option<&str>, culture: &Culture) -> Result<String> {
    let nf = &culture.number;

    if let NumberValue::Float { value: v, .. } = value {
        if v.is_nan() {
            return Ok(nf.nan_symbol.to_string());
        }
        if v.is_infinite() {
            let symbol = if v > 0.0 {
                nf.positive_infinity_symbol
            } else {
                nf.negative_infinity_symbol
            };
            return Ok(symbol.to_string());
        }
    }

    let spec = spec.unwrap_or("");
    if spec.is_empty() {
        if let NumberValue::Decimal(d) = value {
            return Ok(decimal_with_scale(d, nf));
        }
        return Ok(general(&value.digits_general(), value.general_threshold(), 'G', nf));
    }

    let Some((letter, precision)) = standard_spec(spec) else {
        return Ok(custom(&value, spec, nf));
    };

    match letter.to_ascii_uppercase() {
        'C' => {
            let decimals = precision.unwrap_or(nf.currency_decimal_digits);
            let d = value.digits_for_fixed(decimals);
            let number = fixed(&d, decimals, true, nf);
            let pattern = if d.shows_sign() {
                nf.currency_negative_pattern
            } else {
                nf.currency_positive_pattern
            };
            Ok(apply_pattern(pattern, &number, nf))
        }
        'D' => {
            let NumberValue::Integer { value: v, .. } = value else {
                return Err(Error::invalid_format(spec, "D requires an integral value"));
            };
            let width = precision.unwrap_or(0);
            let body = format!("{:0width$}", v.unsigned_abs());
            let d = Digits::from_integer(v);
            Ok(with_sign(&d, body, nf))
        }
        'E' => {
            let decimals = precision.unwrap_or(6);
            let d = value.digits_for_significant(decimals + 1);
            let body = scientific(&d, decimals, letter, 3, nf);
            Ok(with_sign(&d, body, nf))
        }
        'F' => {
            let decimals = precision.unwrap_or(nf.number_decimal_digits);
            let d = value.digits_for_fixed(decimals);
            Ok(with_sign(&d, fixed(&d, decimals, false, nf), nf))
        }
        'G' => match (precision, value) {
            (None | Some(0), NumberValue::Decimal(d)) => Ok(decimal_with_scale(d, nf)),
            (None | Some(0), _) => Ok(general(
                &value.digits_general(),
                value.general_threshold(),
                letter,
                nf,
            )),
            (Some(p), _) => Ok(general(
                &value.digits_for_significant(p),
                p as i32,
                letter,
                nf,
            )),
        },
        'N' => {
            let decimals = precision.unwrap_or(nf.number_decimal_digits);
            let d = value.digits_for_fixed(decimals);
            Ok(with_sign(&d, fixed(&d, decimals, true, nf), nf))
        }
        'P' => {
            let decimals = precision.unwrap_or(nf.number_decimal_digits);
            let mut d = match value {
                NumberValue::Float { value: v, .. } => {
                    let scale = Digits::shortest(v, false).scale + 2;
                    Digits::exact(v, (scale + decimals as i32 + 2).max(1) as usize)
                }
                _ => value.digits_general(),
            };
            if !d.is_zero() {
                d.scale += 2;
            }
            d.round_fraction(decimals);
            let number = fixed(&d, decimals, true, nf);
            let pattern = if d.shows_sign() {
                nf.percent_negative_pattern
            } else {
                nf.percent_positive_pattern
            };
            Ok(apply_pattern(pattern, &number, nf))
        }
        'R' => match value {
            NumberValue::Decimal(_) => {
                Err(Error::invalid_format(spec, "R does not apply to decimal values"))
            }
            _ => Ok(general(&value.digits_general(), value.general_threshold(), 'E', nf)),
        },
        'X' => {
            let NumberValue::Integer { value: v, bits, .. } = value else {
                return Err(Error::invalid_format(spec, "X requires an integral value"));
            };
            let mask = if bits >= 128 {
                u128::MAX
            } else {
                (1u128 << bits) - 1
            };
            let raw = (v as u128) & mask;
            let width = precision.unwrap_or(0);
            Ok(if letter == 'x' {
                format!("{raw:0width$x}")
            } else {
                format!("{raw:0width$X}")
            })
        }
        _ => Err(Error::invalid_format(spec, "unknown standard numeric specifier")),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Zero,
    Hash,
    Point,
    Comma,
    Percent,
    PerMille,
    Exponent {
        letter: char,
        always_sign: bool,
        digits: usize,
    },
    Literal(String),
}

/// Splits on `;` outside quotes and escapes.
fn sections(pattern: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, ch) in pattern.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\\') => escaped = true,
            (None, '\'' | '"') => quote = Some(ch),
            (None, ';') => {
                parts.push(&pattern[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&pattern[start..]);
    parts
}

fn tokenize(section: &str) -> Vec<Token> {
    let chars: Vec<char> = section.chars().collect();
    let mut tokens = Vec::new();
    let mut seen_exponent = false;
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        i += 1;
        let token = match ch {
            '0' => Token::Zero,
            '#' => Token::Hash,
            '.' => Token::Point,
            ',' => Token::Comma,
            '%' => Token::Percent,
            '\u{2030}' => Token::PerMille,
            '\\' => match chars.get(i) {
                Some(&next) => {
                    i += 1;
                    Token::Literal(next.to_string())
                }
                None => continue,
            },
            '\'' | '"' => {
                let start = i;
                while i < chars.len() && chars[i] != ch {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                i += 1;
                Token::Literal(literal)
            }
            'E' | 'e' if !seen_exponent => {
                let mut j = i;
                let always_sign = chars.get(j) == Some(&'+');
                if matches!(chars.get(j), Some('+' | '-')) {
                    j += 1;
                }
                let zeros = chars[j.min(chars.len())..]
                    .iter()
                    .take_while(|&&c| c == '0')
                    .count();
                if zeros == 0 {
                    Token::Literal(ch.to_string())
                } else {
                    seen_exponent = true;
                    i = j + zeros;
                    Token::Exponent {
                        letter: ch,
                        always_sign,
                        digits: zeros,
                    }
                }
            }
            other => Token::Literal(other.to_string()),
        };
        tokens.push(token);
    }
    tokens
}

fn custom(value: &NumberValue, pattern: &str, nf: &NumberFormat) -> String {
    let source = value.digits_for_custom();
    let parts = sections(pattern);
    let negative = source.negative && !source.is_zero();

    let (section, signed) = match parts.len() {
        1 => (parts[0], true),
        _ if source.is_zero() && parts.len() >= 3 && !parts[2].is_empty() => (parts[2], false),
        _ if negative && !parts[1].is_empty() => (parts[1], false),
        _ => (parts[0], true),
    };
    let tokens = tokenize(section);

    let point = tokens.iter().position(|t| *t == Token::Point);
    let exponent_at = tokens
        .iter()
        .position(|t| matches!(t, Token::Exponent { .. }));
    let number_end = exponent_at.unwrap_or(tokens.len());
    let integer_end = point.unwrap_or(number_end).min(number_end);
    let is_placeholder = |t: &Token| matches!(t, Token::Zero | Token::Hash);

    let int_positions: Vec<usize> = (0..integer_end)
        .filter(|&i| is_placeholder(&tokens[i]))
        .collect();
    let frac_tokens: Vec<&Token> = match point {
        Some(p) if p < number_end => tokens[p + 1..number_end]
            .iter()
            .filter(|t| is_placeholder(t))
            .collect(),
        _ => Vec::new(),
    };
    let max_frac = frac_tokens.len();
    let min_frac = frac_tokens
        .iter()
        .rposition(|t| **t == Token::Zero)
        .map_or(0, |p| p + 1);
    let min_int = int_positions
        .iter()
        .position(|&i| tokens[i] == Token::Zero)
        .map_or(0, |first| int_positions.len() - first);

    let last_int = int_positions.last().copied();
    let grouping = match (int_positions.first(), last_int) {
        (Some(&first), Some(last)) => (first..last).any(|i| tokens[i] == Token::Comma),
        _ => false,
    };
    let scaling = match last_int {
        Some(last) => tokens[last + 1..integer_end]
            .iter()
            .take_while(|t| **t == Token::Comma)
            .count(),
        None => 0,
    };
    let percents = tokens.iter().filter(|t| **t == Token::Percent).count();
    let per_milles = tokens.iter().filter(|t| **t == Token::PerMille).count();

    let mut digits = source.clone();
    if !digits.is_zero() {
        digits.scale += 2 * percents as i32 + 3 * per_milles as i32 - 3 * scaling as i32;
    }

    let mut exponent = 0i32;
    if exponent_at.is_some() {
        let int_count = int_positions.len() as i32;
        if !digits.is_zero() {
            exponent = digits.scale - int_count;
            digits.scale = int_count;
        }
        digits.round_fraction(max_frac);
        if !digits.is_zero() && digits.scale > int_count {
            exponent += digits.scale - int_count;
            digits.scale = int_count;
        }
    } else {
        digits.round_fraction(max_frac);
    }

    let mut integer = digits.integer_digits();
    while integer.len() < min_int {
        integer.insert(0, '0');
    }
    if grouping {
        integer = group(&integer, nf);
    }
    let mut fraction = digits.fraction_digits(max_frac);
    while fraction.len() > min_frac && fraction.ends_with('0') {
        fraction.pop();
    }

    let mut out = String::new();
    if signed && !digits.is_zero() && negative {
        out.push_str(nf.negative_sign);
    }

    let int_count = int_positions.len() as isize;
    let offset = integer.len() as isize - int_count;
    let mut int_index = 0isize;
    let mut frac_index = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Zero | Token::Hash if i < integer_end => {
                if grouping {
                    if int_index == 0 {
                        out.push_str(&integer);
                    }
                } else {
                    let start = if int_index == 0 { 0 } else { offset + int_index };
                    let end = offset + int_index + 1;
                    let start = start.clamp(0, integer.len() as isize) as usize;
                    let end = end.clamp(0, integer.len() as isize) as usize;
                    if start < end {
                        out.push_str(&integer[start..end]);
                    }
                }
                int_index += 1;
            }
            Token::Zero | Token::Hash => {
                if i < number_end {
                    if let Some(ch) = fraction.chars().nth(frac_index) {
                        out.push(ch);
                    }
                    frac_index += 1;
                }
            }
            Token::Point => {
                if Some(i) == point {
                    if int_count == 0 {
                        out.push_str(&integer);
                    }
                    if !fraction.is_empty() {
                        out.push_str(nf.decimal_separator);
                    }
                }
            }
            Token::Comma => {}
            Token::Percent => out.push_str(nf.percent_symbol),
            Token::PerMille => out.push_str(nf.per_mille_symbol),
            Token::Exponent {
                letter,
                always_sign,
                digits,
            } => {
                out.push(*letter);
                out.push_str(&exponent_text(exponent, *digits, *always_sign, nf));
            }
            Token::Literal(text) => out.push_str(text),
        }
    }
    out
}
