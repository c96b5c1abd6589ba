//! Date and time codecs.
//!
//! Parsing tries three stages in order and the first success wins:
//!
//! 1. every configured exact format ([`ConversionConfig::date_time_formats`]
//!    or [`ConversionConfig::time_formats`]),
//! 2. the round-trip format of the target,
//! 3. a free-form parser driven by the culture's names and date order.
//!
//! [`ConversionConfig::date_time_formats`]: crate::ConversionConfig::date_time_formats
//! [`ConversionConfig::time_formats`]: crate::ConversionConfig::time_formats

use crate::culture::{Culture, DateOrder};
use crate::error::Result;
use crate::options::ParseContext;
use crate::pattern::{
    self, day_name, expand_two_digit_year, month_name, offset_prefix, strip_prefix_ci, Moment,
    ParsedParts, Pattern,
};
use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc,
};

/// Which date/time kind a parse produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    Date,
    Time,
    DateTime,
    Offset,
}

impl Target {
    fn accepts(self, parts: &ParsedParts) -> bool {
        match self {
            Target::Date => parts.has_date() && !parts.has_time(),
            Target::Time => parts.has_time() && !parts.has_date(),
            Target::DateTime | Target::Offset => parts.has_date() || parts.has_time(),
        }
    }

    fn round_trip(self) -> &'static str {
        match self {
            Target::Date => pattern::ROUND_TRIP_DATE,
            Target::Time => pattern::ROUND_TRIP_TIME,
            Target::DateTime | Target::Offset => pattern::ROUND_TRIP,
        }
    }
}

/// Drops a trailing JavaScript zone comment such as `" (Central European Standard Time)"`.
fn strip_zone_comment(text: &str) -> &str {
    if text.ends_with(')') {
        if let Some(open) = text.rfind(" (") {
            return text[..open].trim_end();
        }
    }
    text
}

fn exact(text: &str, format: &str, culture: &Culture) -> Option<ParsedParts> {
    let expanded;
    let (format, culture) = match pattern::expand_standard(format, culture) {
        Ok(Some(standard)) => {
            expanded = standard.pattern;
            let culture = if standard.invariant {
                Culture::invariant()
            } else {
                culture
            };
            (expanded.as_str(), culture)
        }
        Ok(None) => (format, culture),
        Err(_) => return None,
    };
    Pattern::parse(format).ok()?.parse_exact(text, culture)
}

/// Runs the three parse stages for `target`.
pub(crate) fn parse_parts(text: &str, target: Target, ctx: &ParseContext<'_>) -> Option<ParsedParts> {
    let text = strip_zone_comment(text);
    if text.is_empty() {
        return None;
    }

    let formats = match target {
        Target::Time => &ctx.config.time_formats,
        _ => &ctx.config.date_time_formats,
    };
    for format in formats {
        if let Some(parts) = exact(text, format, ctx.culture).filter(|p| target.accepts(p)) {
            tracing::trace!(stage = "custom", format = %format, "date/time input matched");
            return Some(parts);
        }
    }

    if let Some(parts) = exact(text, target.round_trip(), Culture::invariant()) {
        tracing::trace!(stage = "round-trip", "date/time input matched");
        return Some(parts);
    }

    let parts = free_form(text, ctx.culture).filter(|p| target.accepts(p))?;
    tracing::trace!(stage = "free-form", "date/time input matched");
    Some(parts)
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn build_local(parts: &ParsedParts) -> Option<NaiveDateTime> {
    let date = if parts.has_date() {
        parts.date(today().year())?
    } else {
        today()
    };
    Some(date.and_time(parts.time()?))
}

pub(crate) fn parse_date(text: &str, ctx: &ParseContext<'_>) -> Option<NaiveDate> {
    parse_parts(text, Target::Date, ctx)?.date(today().year())
}

pub(crate) fn parse_time(text: &str, ctx: &ParseContext<'_>) -> Option<NaiveTime> {
    parse_parts(text, Target::Time, ctx)?.time()
}

/// Offset-bearing input is converted to UTC.
pub(crate) fn parse_date_time(text: &str, ctx: &ParseContext<'_>) -> Option<NaiveDateTime> {
    let parts = parse_parts(text, Target::DateTime, ctx)?;
    let local = build_local(&parts)?;
    match parts.offset {
        Some(seconds) => local.checked_sub_signed(TimeDelta::seconds(seconds as i64)),
        None => Some(local),
    }
}

/// Input without an offset is taken as UTC.
pub(crate) fn parse_date_time_offset(
    text: &str,
    ctx: &ParseContext<'_>,
) -> Option<DateTime<FixedOffset>> {
    let parts = parse_parts(text, Target::Offset, ctx)?;
    let local = build_local(&parts)?;
    local.and_local_timezone(parts.fixed_offset()?).single()
}

/// Formats a date/time value; `default_spec` applies when `spec` is empty.
pub(crate) fn format_moment(
    moment: Moment,
    spec: Option<&str>,
    default_spec: &str,
    culture: &Culture,
) -> Result<String> {
    let spec = spec.filter(|s| !s.is_empty()).unwrap_or(default_spec);
    let spec = match (spec, moment.date, moment.time) {
        ("o" | "O", Some(_), None) => pattern::ROUND_TRIP_DATE,
        ("o" | "O", None, Some(_)) => pattern::ROUND_TRIP_TIME,
        _ => spec,
    };
    match pattern::expand_standard(spec, culture)? {
        Some(standard) => {
            let culture = if standard.invariant {
                Culture::invariant()
            } else {
                culture
            };
            let moment = if standard.universal {
                to_universal(moment)
            } else {
                moment
            };
            Pattern::parse(&standard.pattern)?.format(&moment, culture, spec)
        }
        None => Pattern::parse(spec)?.format(&moment, culture, spec),
    }
}

fn to_universal(moment: Moment) -> Moment {
    match (moment.date, moment.time, moment.offset) {
        (Some(date), Some(time), Some(offset)) => {
            let utc = date.and_time(time) - TimeDelta::seconds(offset.local_minus_utc() as i64);
            Moment {
                date: Some(utc.date()),
                time: Some(utc.time()),
                offset: FixedOffset::east_opt(0),
            }
        }
        _ => moment,
    }
}

/// Culture-general parsing of loosely formatted input.
///
/// Bare numbers are collected as date fields and ordered by the culture's
/// date order; `h:mm[:ss[.fffffff]]` runs become the time of day.
fn free_form(text: &str, culture: &Culture) -> Option<ParsedParts> {
    let names = &culture.date;
    let mut parts = ParsedParts::default();
    let mut numbers: Vec<(u32, usize)> = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let ch = rest.chars().next()?;

        if ch.is_ascii_digit() {
            let len = rest.bytes().take_while(u8::is_ascii_digit).count();
            let value: u32 = rest[..len].parse().ok()?;
            let after = &rest[len..];
            if let Some(minutes) = after
                .strip_prefix(':')
                .or_else(|| after.strip_prefix(names.time_separator))
            {
                if parts.hour.is_some() || len > 2 {
                    return None;
                }
                rest = free_time(value, minutes, culture, &mut parts)?;
            } else {
                numbers.push((value, len));
                rest = after;
            }
            continue;
        }

        if matches!(ch, '+' | '-' | '\u{2212}')
            && parts.hour.is_some()
            && rest[ch.len_utf8()..].starts_with(|c: char| c.is_ascii_digit())
        {
            let (offset, after) = offset_prefix(rest)?;
            parts.offset = Some(offset);
            rest = after;
            continue;
        }

        if ch.is_whitespace() || matches!(ch, ',' | '/' | '-' | '.') {
            rest = &rest[ch.len_utf8()..];
            continue;
        }
        if let Some(after) = rest.strip_prefix(names.date_separator) {
            rest = after;
            continue;
        }

        if ch.is_alphabetic() {
            if let Some((month, after)) =
                month_name(rest, true, names).or_else(|| month_name(rest, false, names))
            {
                if parts.month.is_some() {
                    return None;
                }
                parts.month = Some(month);
                rest = after;
                continue;
            }
            if let Some((weekday, after)) =
                day_name(rest, true, names).or_else(|| day_name(rest, false, names))
            {
                parts.weekday = Some(weekday);
                rest = after;
                continue;
            }
            if let Some((pm, after)) = free_designator(rest, culture) {
                parts.pm = Some(pm);
                rest = after;
                continue;
            }
            if let Some(after) = strip_prefix_ci(rest, "GMT").or_else(|| strip_prefix_ci(rest, "UTC")) {
                let (offset, after) = offset_prefix(after).unwrap_or((0, after));
                parts.offset = Some(offset);
                rest = after;
                continue;
            }
            if ch == 'Z' || ch == 'z' {
                parts.offset = Some(0);
                rest = &rest[1..];
                continue;
            }
            if ch == 'T' && rest[1..].starts_with(|c: char| c.is_ascii_digit()) {
                rest = &rest[1..];
                continue;
            }
        }
        return None;
    }

    assign_date_numbers(&numbers, culture, &mut parts)?;
    (parts.has_date() || parts.has_time()).then_some(parts)
}

fn free_designator<'a>(text: &'a str, culture: &Culture) -> Option<(bool, &'a str)> {
    let invariant = &Culture::invariant().date;
    [
        (culture.date.am_designator, false),
        (culture.date.pm_designator, true),
        (invariant.am_designator, false),
        (invariant.pm_designator, true),
    ]
    .into_iter()
    .find_map(|(name, pm)| strip_prefix_ci(text, name).map(|rest| (pm, rest)))
}

/// Reads the remainder of `h:mm[:ss[.fffffff]]` after the hour.
fn free_time<'a>(hour: u32, text: &'a str, culture: &Culture, parts: &mut ParsedParts) -> Option<&'a str> {
    let two = |text: &'a str| -> Option<(u32, &'a str)> {
        let len = text.bytes().take(2).take_while(u8::is_ascii_digit).count();
        if len == 0 {
            return None;
        }
        Some((text[..len].parse().ok()?, &text[len..]))
    };
    let (minute, mut rest) = two(text)?;
    parts.hour = Some(hour);
    parts.minute = Some(minute);
    if let Some(after) = rest
        .strip_prefix(':')
        .or_else(|| rest.strip_prefix(culture.date.time_separator))
    {
        let (second, after) = two(after)?;
        parts.second = Some(second);
        rest = after;
        let fraction = rest
            .strip_prefix('.')
            .or_else(|| rest.strip_prefix(culture.number.decimal_separator));
        if let Some(after) = fraction {
            let len = after.bytes().take_while(u8::is_ascii_digit).count();
            if len == 0 {
                return None;
            }
            let mut digits: String = after[..len.min(9)].to_string();
            while digits.len() < 9 {
                digits.push('0');
            }
            parts.nanos = Some(digits.parse().ok()?);
            rest = &after[len..];
        }
    }
    Some(rest)
}

fn year_of(value: u32, len: usize) -> Option<i32> {
    let year = i32::try_from(value).ok()?;
    Some(if len <= 2 { expand_two_digit_year(year) } else { year })
}

fn assign_date_numbers(numbers: &[(u32, usize)], culture: &Culture, parts: &mut ParsedParts) -> Option<()> {
    let is_year = |&(value, len): &(u32, usize)| len >= 3 || value > 31;
    match (numbers, parts.month) {
        ([], _) => {}
        ([only], Some(_)) => {
            if is_year(only) {
                parts.year = Some(year_of(only.0, only.1)?);
            } else {
                parts.day = Some(only.0);
            }
        }
        ([first, second], Some(_)) => {
            let (day, year) = if is_year(first) {
                (second, first)
            } else {
                (first, second)
            };
            parts.day = Some(day.0);
            parts.year = Some(year_of(year.0, year.1)?);
        }
        ([first, second], None) => {
            if is_year(first) {
                parts.year = Some(year_of(first.0, first.1)?);
                parts.month = Some(second.0);
            } else if culture.date_order() == DateOrder::Dmy {
                parts.day = Some(first.0);
                parts.month = Some(second.0);
            } else {
                parts.month = Some(first.0);
                parts.day = Some(second.0);
            }
        }
        ([a, b, c], None) => {
            let (year, month, day) = if a.1 >= 3 {
                (a, b, c)
            } else {
                match culture.date_order() {
                    DateOrder::Mdy => (c, a, b),
                    DateOrder::Dmy => (c, b, a),
                    DateOrder::Ymd => (a, b, c),
                }
            };
            parts.year = Some(year_of(year.0, year.1)?);
            parts.month = Some(month.0);
            parts.day = Some(day.0);
        }
        _ => return None,
    }
    Some(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionConfig;

    fn ctx<'a>(config: &'a ConversionConfig, culture: &str) -> ParseContext<'a> {
        ParseContext {
            culture: Culture::resolve(Some(culture)),
            config,
            ignore_case: true,
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_compact_format_wins() {
        let config = ConversionConfig::default();
        let c = ctx(&config, "");
        assert_eq!(parse_date("20241231", &c), Some(ymd(2024, 12, 31)));
        assert_eq!(
            parse_date_time("20241231", &c),
            Some(ymd(2024, 12, 31).and_hms_opt(0, 0, 0).unwrap())
        );
        assert_eq!(
            parse_date_time("202412311530", &c),
            Some(ymd(2024, 12, 31).and_hms_opt(15, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_date_target_rejects_time_fields() {
        let config = ConversionConfig::default();
        let c = ctx(&config, "");
        assert_eq!(parse_date("20241231153000", &c), None);
        assert_eq!(parse_date("2024-12-31 10:00", &c), None);
    }

    #[test]
    fn test_time_formats() {
        let config = ConversionConfig::default();
        let c = ctx(&config, "");
        assert_eq!(parse_time("1530", &c), NaiveTime::from_hms_opt(15, 30, 0));
        assert_eq!(parse_time("153045", &c), NaiveTime::from_hms_opt(15, 30, 45));
        assert_eq!(parse_time("3:05 PM", &c), NaiveTime::from_hms_opt(15, 5, 0));
        assert_eq!(parse_time("2024-01-01", &c), None);
    }

    #[test]
    fn test_javascript_date_with_zone_comment() {
        let config = ConversionConfig::default();
        let c = ctx(&config, "");
        let parsed = parse_date_time_offset(
            "Tue Dec 31 2024 10:20:30 GMT+0100 (Central European Standard Time)",
            &c,
        )
        .unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 3600);
        assert_eq!(parsed.naive_utc(), ymd(2024, 12, 31).and_hms_opt(9, 20, 30).unwrap());
    }

    #[test]
    fn test_offset_converted_to_utc_for_naive_target() {
        let config = ConversionConfig::default();
        let c = ctx(&config, "");
        assert_eq!(
            parse_date_time("2024-12-31T23:30:00.0000000+02:00", &c),
            Some(ymd(2024, 12, 31).and_hms_opt(21, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_offset_target_assumes_utc() {
        let config = ConversionConfig::default();
        let c = ctx(&config, "");
        let parsed = parse_date_time_offset("2024-06-01 08:00", &c).unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_year_beyond_i32_is_rejected() {
        let config = ConversionConfig::default().with_date_time_formats(["yyyyyyyyyy-MM-dd"]);
        let c = ctx(&config, "");
        assert_eq!(parse_date("Jan 5 4294967295", &c), None);
        assert_eq!(parse_date("4294967295-01-05", &c), None);
        assert_eq!(parse_date("Jan 5 2024", &c), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date("0000002024-01-05", &c), Some(ymd(2024, 1, 5)));
    }

    #[test]
    fn test_free_form_culture_order() {
        let config = ConversionConfig::default();
        assert_eq!(parse_date("3/4/2024", &ctx(&config, "en-US")), Some(ymd(2024, 3, 4)));
        assert_eq!(parse_date("3.4.2024", &ctx(&config, "de-DE")), Some(ymd(2024, 4, 3)));
        assert_eq!(parse_date("2024/4/3", &ctx(&config, "en-US")), Some(ymd(2024, 4, 3)));
    }

    #[test]
    fn test_free_form_names() {
        let config = ConversionConfig::default();
        assert_eq!(
            parse_date("31 December 2024", &ctx(&config, "")),
            Some(ymd(2024, 12, 31))
        );
        assert_eq!(
            parse_date("31. Dezember 2024", &ctx(&config, "de-DE")),
            Some(ymd(2024, 12, 31))
        );
        assert_eq!(parse_date("Dec 2024", &ctx(&config, "")), Some(ymd(2024, 12, 1)));
    }

    #[test]
    fn test_free_form_rejects_garbage() {
        let config = ConversionConfig::default();
        let c = ctx(&config, "");
        assert_eq!(parse_date_time("not a date", &c), None);
        assert_eq!(parse_date("2024-13-01", &c), None);
        assert_eq!(parse_date("1 2 3 4", &c), None);
    }

    #[test]
    fn test_registered_format() {
        let config = ConversionConfig::default().with_date_time_formats(["dd|MM|yyyy"]);
        let c = ctx(&config, "");
        assert_eq!(parse_date("05|06|2024", &c), Some(ymd(2024, 6, 5)));
    }

    #[test]
    fn test_format_standard_and_custom() {
        let moment = Moment {
            date: Some(ymd(2024, 12, 31)),
            time: NaiveTime::from_hms_opt(13, 5, 0),
            offset: FixedOffset::east_opt(3600),
        };
        let us = Culture::resolve(Some("en-US"));
        assert_eq!(format_moment(moment, Some("d"), "G", us).unwrap(), "12/31/2024");
        assert_eq!(
            format_moment(moment, Some("u"), "G", us).unwrap(),
            "2024-12-31 12:05:00Z"
        );
        assert_eq!(
            format_moment(moment, None, "o", us).unwrap(),
            "2024-12-31T13:05:00.0000000+01:00"
        );
        assert_eq!(
            format_moment(moment, Some("yyyy-MMM-dd"), "G", us).unwrap(),
            "2024-Dec-31"
        );
        assert!(format_moment(moment, Some("Q"), "G", us).is_err());
    }
}
