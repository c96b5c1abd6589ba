//! Custom date/time pattern language shared by formatting and exact parsing.
//!
//! A pattern such as `"ddd, dd MMM yyyy HH':'mm"` is tokenized once into
//! [`Field`]s. Formatting walks the fields over a [`Moment`]; exact parsing
//! walks them over the input and fills a [`ParsedParts`].

use crate::culture::{Culture, DateFormat};
use crate::error::{Error, Result};
use chrono::{Datelike, FixedOffset, NaiveDate, NaiveTime, Timelike, Weekday};

/// Round-trip date-time pattern (`"o"`).
pub(crate) const ROUND_TRIP: &str = "yyyy'-'MM'-'dd'T'HH':'mm':'ss'.'fffffffK";
/// Round-trip date-only pattern.
pub(crate) const ROUND_TRIP_DATE: &str = "yyyy'-'MM'-'dd";
/// Round-trip time-only pattern.
pub(crate) const ROUND_TRIP_TIME: &str = "HH':'mm':'ss'.'fffffff";

const SORTABLE: &str = "yyyy'-'MM'-'dd'T'HH':'mm':'ss";
const UNIVERSAL_SORTABLE: &str = "yyyy'-'MM'-'dd HH':'mm':'ss'Z'";
const RFC1123: &str = "ddd, dd MMM yyyy HH':'mm':'ss 'GMT'";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Field {
    Year(usize),
    Month(usize),
    Day(usize),
    Hour12(usize),
    Hour24(usize),
    Minute(usize),
    Second(usize),
    /// `f` (fixed) or `F` (trailing zeros trimmed), up to seven digits.
    Fraction { digits: usize, trimmed: bool },
    Designator(usize),
    Offset(usize),
    Kind,
    Era,
    DateSeparator,
    TimeSeparator,
    Literal(String),
}

/// A tokenized custom pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Pattern {
    fields: Vec<Field>,
}

impl Pattern {
    /// Tokenizes a custom pattern.
    pub fn parse(pattern: &str) -> Result<Self> {
        let chars: Vec<char> = pattern.chars().collect();
        let mut fields = Vec::new();
        let mut i = 0;
        while i < chars.len() {
            let ch = chars[i];
            let run = chars[i..].iter().take_while(|&&c| c == ch).count();
            let field = match ch {
                'y' => Field::Year(run),
                'M' => Field::Month(run),
                'd' => Field::Day(run),
                'h' => Field::Hour12(run),
                'H' => Field::Hour24(run),
                'm' => Field::Minute(run),
                's' => Field::Second(run),
                'f' | 'F' => {
                    if run > 7 {
                        return Err(Error::invalid_format(pattern, "at most seven fraction digits"));
                    }
                    Field::Fraction {
                        digits: run,
                        trimmed: ch == 'F',
                    }
                }
                't' => Field::Designator(run),
                'z' => Field::Offset(run),
                'K' => Field::Kind,
                'g' => Field::Era,
                '/' => Field::DateSeparator,
                ':' => Field::TimeSeparator,
                '%' => {
                    i += 1;
                    continue;
                }
                '\\' => {
                    i += 1;
                    match chars.get(i) {
                        Some(&next) => {
                            push_literal(&mut fields, next);
                            i += 1;
                            continue;
                        }
                        None => {
                            return Err(Error::invalid_format(pattern, "dangling escape"));
                        }
                    }
                }
                '\'' | '"' => {
                    let close = chars[i + 1..]
                        .iter()
                        .position(|&c| c == ch)
                        .ok_or_else(|| Error::invalid_format(pattern, "unterminated quote"))?;
                    for &c in &chars[i + 1..i + 1 + close] {
                        push_literal(&mut fields, c);
                    }
                    i += close + 2;
                    continue;
                }
                other => {
                    push_literal(&mut fields, other);
                    i += 1;
                    continue;
                }
            };
            // Separators and `K` never group into runs.
            let consumed = match field {
                Field::DateSeparator | Field::TimeSeparator | Field::Kind => 1,
                _ => run,
            };
            fields.push(field);
            i += consumed;
        }
        Ok(Pattern { fields })
    }
}

fn push_literal(fields: &mut Vec<Field>, ch: char) {
    if let Some(Field::Literal(text)) = fields.last_mut() {
        text.push(ch);
    } else {
        fields.push(Field::Literal(ch.to_string()));
    }
}

/// How a standard specifier renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Expanded {
    pub pattern: String,
    /// Use the invariant culture regardless of the caller's culture.
    pub invariant: bool,
    /// Convert offset-bearing values to UTC first.
    pub universal: bool,
}

/// Expands a one-letter standard specifier; `None` for custom patterns.
pub(crate) fn expand_standard(spec: &str, culture: &Culture) -> Result<Option<Expanded>> {
    let mut chars = spec.chars();
    let (Some(letter), None) = (chars.next(), chars.next()) else {
        return Ok(None);
    };
    let date = &culture.date;
    let local = |pattern: String| Expanded {
        pattern,
        invariant: false,
        universal: false,
    };
    let fixed = |pattern: &str, universal: bool| Expanded {
        pattern: pattern.to_string(),
        invariant: true,
        universal,
    };
    let expanded = match letter {
        'd' => local(date.short_date.to_string()),
        'D' => local(date.long_date.to_string()),
        'f' => local(format!("{} {}", date.long_date, date.short_time)),
        'F' => local(format!("{} {}", date.long_date, date.long_time)),
        'g' => local(format!("{} {}", date.short_date, date.short_time)),
        'G' => local(format!("{} {}", date.short_date, date.long_time)),
        'M' | 'm' => local(date.month_day.to_string()),
        'Y' | 'y' => local(date.year_month.to_string()),
        't' => local(date.short_time.to_string()),
        'T' => local(date.long_time.to_string()),
        'o' | 'O' => fixed(ROUND_TRIP, false),
        's' => fixed(SORTABLE, false),
        'u' => fixed(UNIVERSAL_SORTABLE, true),
        'r' | 'R' => fixed(RFC1123, true),
        'U' => Expanded {
            pattern: format!("{} {}", date.long_date, date.long_time),
            invariant: false,
            universal: true,
        },
        _ => {
            return Err(Error::invalid_format(
                spec,
                "unknown standard date/time specifier",
            ))
        }
    };
    Ok(Some(expanded))
}

/// A value being formatted; absent parts are rejected by fields needing them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Moment {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub offset: Option<FixedOffset>,
}

fn offset_text(seconds: i32, count: usize) -> String {
    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.unsigned_abs() / 60;
    let (hours, minutes) = (minutes / 60, minutes % 60);
    match count {
        1 => format!("{sign}{hours}"),
        2 => format!("{sign}{hours:02}"),
        _ => format!("{sign}{hours:02}:{minutes:02}"),
    }
}

fn number(out: &mut String, value: u32, count: usize) {
    if count >= 2 {
        out.push_str(&format!("{value:02}"));
    } else {
        out.push_str(&value.to_string());
    }
}

impl Pattern {
    /// Renders `moment`, failing when a field needs a part the value lacks.
    pub fn format(&self, moment: &Moment, culture: &Culture, spec: &str) -> Result<String> {
        let names = &culture.date;
        let missing = |what: &str| Error::invalid_format(spec, &format!("value has no {what} part"));
        let date = || moment.date.ok_or_else(|| missing("date"));
        let time = || moment.time.ok_or_else(|| missing("time"));

        let mut out = String::new();
        for field in &self.fields {
            match *field {
                Field::Year(count) => {
                    let year = date()?.year();
                    match count {
                        1 => out.push_str(&(year % 100).to_string()),
                        2 => out.push_str(&format!("{:02}", year % 100)),
                        n => out.push_str(&format!("{year:0n$}")),
                    }
                }
                Field::Month(count) => {
                    let month = date()?.month();
                    match count {
                        1 | 2 => number(&mut out, month, count),
                        3 => out.push_str(names.abbreviated_month_names[month as usize - 1]),
                        _ => out.push_str(names.month_names[month as usize - 1]),
                    }
                }
                Field::Day(count) => {
                    let d = date()?;
                    let weekday = d.weekday().num_days_from_sunday() as usize;
                    match count {
                        1 | 2 => number(&mut out, d.day(), count),
                        3 => out.push_str(names.abbreviated_day_names[weekday]),
                        _ => out.push_str(names.day_names[weekday]),
                    }
                }
                Field::Hour12(count) => {
                    let hour = time()?.hour() % 12;
                    number(&mut out, if hour == 0 { 12 } else { hour }, count);
                }
                Field::Hour24(count) => number(&mut out, time()?.hour(), count),
                Field::Minute(count) => number(&mut out, time()?.minute(), count),
                Field::Second(count) => number(&mut out, time()?.second(), count),
                Field::Fraction { digits, trimmed } => {
                    let ticks = time()?.nanosecond().min(999_999_999) / 100;
                    let text = format!("{ticks:07}");
                    let text = &text[..digits];
                    if trimmed {
                        let text = text.trim_end_matches('0');
                        if text.is_empty() {
                            if out.ends_with('.') {
                                out.pop();
                            } else if out.ends_with(culture.number.decimal_separator) {
                                out.truncate(out.len() - culture.number.decimal_separator.len());
                            }
                        } else {
                            out.push_str(text);
                        }
                    } else {
                        out.push_str(text);
                    }
                }
                Field::Designator(count) => {
                    let designator = if time()?.hour() < 12 {
                        names.am_designator
                    } else {
                        names.pm_designator
                    };
                    if count == 1 {
                        out.extend(designator.chars().next());
                    } else {
                        out.push_str(designator);
                    }
                }
                Field::Offset(count) => {
                    let seconds = moment.offset.map_or(0, |o| o.local_minus_utc());
                    out.push_str(&offset_text(seconds, count));
                }
                Field::Kind => {
                    if let Some(offset) = moment.offset {
                        out.push_str(&offset_text(offset.local_minus_utc(), 3));
                    }
                }
                Field::Era => out.push_str("A.D."),
                Field::DateSeparator => out.push_str(names.date_separator),
                Field::TimeSeparator => out.push_str(names.time_separator),
                Field::Literal(ref text) => out.push_str(text),
            }
        }
        Ok(out)
    }
}

/// Fields recovered by exact or free-form parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ParsedParts {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
    pub second: Option<u32>,
    pub nanos: Option<u32>,
    pub pm: Option<bool>,
    /// Seconds east of UTC.
    pub offset: Option<i32>,
    pub weekday: Option<Weekday>,
}

impl ParsedParts {
    pub fn has_date(&self) -> bool {
        self.year.is_some() || self.month.is_some() || self.day.is_some() || self.weekday.is_some()
    }

    pub fn has_time(&self) -> bool {
        self.hour.is_some()
            || self.minute.is_some()
            || self.second.is_some()
            || self.nanos.is_some()
            || self.pm.is_some()
            || self.offset.is_some()
    }

    /// Builds the date, validating the day name when one was given.
    pub fn date(&self, default_year: i32) -> Option<NaiveDate> {
        let date = NaiveDate::from_ymd_opt(
            self.year.unwrap_or(default_year),
            self.month.unwrap_or(1),
            self.day.unwrap_or(1),
        )?;
        match self.weekday {
            Some(weekday) if weekday != date.weekday() => None,
            _ => Some(date),
        }
    }

    /// Builds the time of day, applying the AM/PM designator.
    pub fn time(&self) -> Option<NaiveTime> {
        let mut hour = self.hour.unwrap_or(0);
        match self.pm {
            Some(true) if hour < 12 => hour += 12,
            Some(false) if hour == 12 => hour = 0,
            Some(_) if hour > 12 => return None,
            _ => {}
        }
        NaiveTime::from_hms_nano_opt(
            hour,
            self.minute.unwrap_or(0),
            self.second.unwrap_or(0),
            self.nanos.unwrap_or(0),
        )
    }

    pub fn fixed_offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.offset.unwrap_or(0))
    }
}

/// Maps a two-digit year into 1950..=2049.
pub(crate) fn expand_two_digit_year(year: i32) -> i32 {
    if year < 50 {
        2000 + year
    } else {
        1900 + year
    }
}

/// Case-insensitive prefix strip over Unicode scalar values.
pub(crate) fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return None;
    }
    let mut chars = text.char_indices();
    let mut end = 0;
    for expected in prefix.chars() {
        let (i, actual) = chars.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
        end = i + actual.len_utf8();
    }
    Some(&text[end..])
}

/// Matches the longest name in `lists` at the start of `text`.
///
/// Returns the zero-based index within a list and the remaining input.
pub(crate) fn match_name<'a>(text: &'a str, lists: &[&[&'static str]]) -> Option<(usize, &'a str)> {
    let mut best: Option<(usize, usize, &'a str)> = None;
    for list in lists {
        for (index, name) in list.iter().enumerate() {
            if let Some(rest) = strip_prefix_ci(text, name) {
                let length = name.chars().count();
                if best.map_or(true, |(len, _, _)| length > len) {
                    best = Some((length, index, rest));
                }
            }
        }
    }
    best.map(|(_, index, rest)| (index, rest))
}

pub(crate) fn month_name<'a>(text: &'a str, full: bool, culture: &DateFormat) -> Option<(u32, &'a str)> {
    let invariant = &Culture::invariant().date;
    let lists: [&[&'static str]; 2] = if full {
        [&culture.month_names, &invariant.month_names]
    } else {
        [&culture.abbreviated_month_names, &invariant.abbreviated_month_names]
    };
    match_name(text, &lists).map(|(i, rest)| (i as u32 + 1, rest))
}

pub(crate) fn day_name<'a>(text: &'a str, full: bool, culture: &DateFormat) -> Option<(Weekday, &'a str)> {
    let invariant = &Culture::invariant().date;
    let lists: [&[&'static str]; 2] = if full {
        [&culture.day_names, &invariant.day_names]
    } else {
        [&culture.abbreviated_day_names, &invariant.abbreviated_day_names]
    };
    let (index, rest) = match_name(text, &lists)?;
    Some((SUNDAY_FIRST[index], rest))
}

const SUNDAY_FIRST: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Reads `min..=max` ASCII digits.
fn digits(text: &str, min: usize, max: usize) -> Option<(u32, &str)> {
    let count = text.bytes().take(max).take_while(u8::is_ascii_digit).count();
    if count < min {
        return None;
    }
    let value = text[..count].parse().ok()?;
    Some((value, &text[count..]))
}

/// Reads `+hh:mm`, `+hhmm`, `+hh` or `+h`; returns seconds east of UTC.
pub(crate) fn offset_prefix(text: &str) -> Option<(i32, &str)> {
    let sign = match text.chars().next()? {
        '+' => 1,
        '-' | '\u{2212}' => -1,
        _ => return None,
    };
    let rest = &text[text.chars().next()?.len_utf8()..];
    let (hours, rest) = digits(rest, 1, 2)?;
    let (minutes, rest) = if let Some(after) = rest.strip_prefix(':') {
        digits(after, 2, 2)?
    } else {
        match digits(rest, 2, 2) {
            Some(found) => found,
            None => (0, rest),
        }
    };
    if hours > 14 || minutes > 59 {
        return None;
    }
    Some((sign * (hours as i32 * 3600 + minutes as i32 * 60), rest))
}

fn designator<'a>(text: &'a str, count: usize, date: &DateFormat) -> Option<(bool, &'a str)> {
    let invariant = &Culture::invariant().date;
    let candidates = [
        (date.am_designator, false),
        (date.pm_designator, true),
        (invariant.am_designator, false),
        (invariant.pm_designator, true),
    ];
    for (name, pm) in candidates {
        let name = if count == 1 {
            match name.char_indices().nth(1) {
                Some((end, _)) => &name[..end],
                None => name,
            }
        } else {
            name
        };
        if let Some(rest) = strip_prefix_ci(text, name) {
            return Some((pm, rest));
        }
    }
    None
}

fn literal<'a>(mut text: &'a str, expected: &str) -> Option<&'a str> {
    let mut chars = expected.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch.is_whitespace() {
            while chars.peek().is_some_and(|c| c.is_whitespace()) {
                chars.next();
            }
            let trimmed = text.trim_start();
            if trimmed.len() == text.len() {
                return None;
            }
            text = trimmed;
        } else {
            let mut buf = [0u8; 4];
            text = strip_prefix_ci(text, ch.encode_utf8(&mut buf))?;
        }
    }
    Some(text)
}

impl Pattern {
    /// Parses `text` exactly against the pattern.
    pub fn parse_exact(&self, text: &str, culture: &Culture) -> Option<ParsedParts> {
        let names = &culture.date;
        let mut parts = ParsedParts::default();
        let mut rest = text;
        for field in &self.fields {
            rest = match *field {
                Field::Year(count) => {
                    let (min, max) = match count {
                        1 => (1, 2),
                        2 => (2, 2),
                        3 => (3, 4),
                        n => (n, n),
                    };
                    let (year, after) = digits(rest, min, max)?;
                    let year = i32::try_from(year).ok()?;
                    parts.year = Some(if count <= 2 {
                        expand_two_digit_year(year)
                    } else {
                        year
                    });
                    after
                }
                Field::Month(count) if count >= 3 => {
                    let (month, after) = month_name(rest, count >= 4, names)?;
                    parts.month = Some(month);
                    after
                }
                Field::Day(count) if count >= 3 => {
                    let (weekday, after) = day_name(rest, count >= 4, names)?;
                    parts.weekday = Some(weekday);
                    after
                }
                Field::Month(count)
                | Field::Day(count)
                | Field::Hour12(count)
                | Field::Hour24(count)
                | Field::Minute(count)
                | Field::Second(count) => {
                    let min = if count >= 2 { 2 } else { 1 };
                    let (value, after) = digits(rest, min, 2)?;
                    let slot = match field {
                        Field::Month(_) => &mut parts.month,
                        Field::Day(_) => &mut parts.day,
                        Field::Hour12(_) | Field::Hour24(_) => &mut parts.hour,
                        Field::Minute(_) => &mut parts.minute,
                        _ => &mut parts.second,
                    };
                    *slot = Some(value);
                    if matches!(field, Field::Hour12(_)) && !(1..=12).contains(&value) {
                        return None;
                    }
                    after
                }
                Field::Fraction { digits: count, trimmed } => {
                    let min = if trimmed { 0 } else { count };
                    let (_, after) = digits(rest, min, count).unwrap_or((0, rest));
                    let taken = &rest[..rest.len() - after.len()];
                    if taken.len() < min {
                        return None;
                    }
                    let mut padded = taken.to_string();
                    while padded.len() < 9 {
                        padded.push('0');
                    }
                    parts.nanos = Some(padded.parse().ok()?);
                    after
                }
                Field::Designator(count) => {
                    let (pm, after) = designator(rest, count, names)?;
                    parts.pm = Some(pm);
                    after
                }
                Field::Offset(_) => {
                    let (offset, after) = offset_prefix(rest)?;
                    parts.offset = Some(offset);
                    after
                }
                Field::Kind => {
                    if let Some(after) = rest.strip_prefix(['Z', 'z']) {
                        parts.offset = Some(0);
                        after
                    } else if let Some((offset, after)) = offset_prefix(rest) {
                        parts.offset = Some(offset);
                        after
                    } else {
                        rest
                    }
                }
                Field::Era => strip_prefix_ci(rest, "A.D.")
                    .or_else(|| strip_prefix_ci(rest, "AD"))
                    .unwrap_or(rest),
                Field::DateSeparator => literal(rest, names.date_separator)?,
                Field::TimeSeparator => literal(rest, names.time_separator)?,
                Field::Literal(ref expected) => literal(rest, expected)?,
            };
        }
        rest.is_empty().then_some(parts)
    }
}
