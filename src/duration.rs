//! Duration codec over [`chrono::TimeDelta`].

use crate::culture::Culture;
use crate::error::{Error, Result};
use chrono::TimeDelta;

fn all_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

fn component(text: &str, limit: Option<u64>) -> Option<u64> {
    if !all_digits(text) {
        return None;
    }
    let value: u64 = text.parse().ok()?;
    match limit {
        Some(limit) if value >= limit => None,
        _ => Some(value),
    }
}

/// Parses `[-]d`, `[-][d.]hh:mm[:ss[.fffffff]]` or `[-]d:hh:mm:ss[.fffffff]`.
pub(crate) fn parse_duration(text: &str, culture: &Culture) -> Option<TimeDelta> {
    let (negative, body) = match text
        .strip_prefix('-')
        .or_else(|| text.strip_prefix(culture.number.negative_sign))
    {
        Some(body) => (true, body),
        None => (false, text),
    };

    let (days, seconds, nanos) = if all_digits(body) {
        (body.parse::<u64>().ok()?, 0, 0)
    } else {
        let (days, clock) = match (body.find('.'), body.find(':')) {
            (Some(dot), Some(colon)) if dot < colon => (Some(&body[..dot]), &body[dot + 1..]),
            _ => (None, body),
        };
        let mut fields: Vec<&str> = clock.split(':').collect();
        let mut nanos = 0u32;
        if fields.len() >= 3 {
            let last = fields.len() - 1;
            let seconds = fields[last];
            let split = seconds
                .split_once('.')
                .or_else(|| seconds.split_once(culture.number.decimal_separator));
            if let Some((whole, fraction)) = split {
                if !all_digits(fraction) || fraction.len() > 7 {
                    return None;
                }
                let mut padded = fraction.to_string();
                while padded.len() < 9 {
                    padded.push('0');
                }
                nanos = padded.parse().ok()?;
                fields[last] = whole;
            }
        }
        let (days, hours, minutes, secs) = match (days, fields.as_slice()) {
            (Some(d), [h, m]) => (component(d, None)?, *h, *m, "0"),
            (Some(d), [h, m, s]) => (component(d, None)?, *h, *m, *s),
            (None, [h, m]) => (0, *h, *m, "0"),
            (None, [h, m, s]) => (0, *h, *m, *s),
            (None, [d, h, m, s]) => (component(d, None)?, *h, *m, *s),
            _ => return None,
        };
        let seconds = component(hours, Some(24))? * 3600
            + component(minutes, Some(60))? * 60
            + component(secs, Some(60))?;
        (days, seconds, nanos)
    };

    let total = i64::try_from(days.checked_mul(86_400)?.checked_add(seconds)?).ok()?;
    let delta = TimeDelta::try_seconds(total)?.checked_add(&TimeDelta::nanoseconds(nanos as i64))?;
    Some(if negative { -delta } else { delta })
}

struct Parts {
    negative: bool,
    days: i64,
    hours: i64,
    minutes: i64,
    seconds: i64,
    ticks: u32,
}

impl Parts {
    fn of(delta: TimeDelta) -> Self {
        let negative = delta < TimeDelta::zero();
        let abs = delta.abs();
        let total = abs.num_seconds();
        Parts {
            negative,
            days: total / 86_400,
            hours: total / 3600 % 24,
            minutes: total / 60 % 60,
            seconds: total % 60,
            ticks: abs.subsec_nanos().unsigned_abs() / 100,
        }
    }

    fn sign(&self) -> &'static str {
        if self.negative {
            "-"
        } else {
            ""
        }
    }
}

/// Formats with `c` (default), `g`, `G` or a custom pattern.
pub(crate) fn format_duration(delta: TimeDelta, spec: Option<&str>, culture: &Culture) -> Result<String> {
    let p = Parts::of(delta);
    let separator = culture.number.decimal_separator;
    match spec.filter(|s| !s.is_empty()).unwrap_or("c") {
        "c" | "t" | "T" => {
            let mut out = String::from(p.sign());
            if p.days > 0 {
                out.push_str(&format!("{}.", p.days));
            }
            out.push_str(&format!("{:02}:{:02}:{:02}", p.hours, p.minutes, p.seconds));
            if p.ticks > 0 {
                out.push_str(&format!(".{:07}", p.ticks));
            }
            Ok(out)
        }
        "g" => {
            let mut out = String::from(p.sign());
            if p.days > 0 {
                out.push_str(&format!("{}:", p.days));
            }
            out.push_str(&format!("{}:{:02}:{:02}", p.hours, p.minutes, p.seconds));
            if p.ticks > 0 {
                let fraction = format!("{:07}", p.ticks);
                out.push_str(separator);
                out.push_str(fraction.trim_end_matches('0'));
            }
            Ok(out)
        }
        "G" => Ok(format!(
            "{}{}:{:02}:{:02}:{:02}{}{:07}",
            p.sign(),
            p.days,
            p.hours,
            p.minutes,
            p.seconds,
            separator,
            p.ticks
        )),
        custom => format_custom(&p, custom),
    }
}

fn format_custom(p: &Parts, spec: &str) -> Result<String> {
    let chars: Vec<char> = spec.chars().collect();
    let mut out = String::new();
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        let run = chars[i..].iter().take_while(|&&c| c == ch).count();
        match ch {
            'd' => {
                if run > 8 {
                    return Err(Error::invalid_format(spec, "at most eight day digits"));
                }
                out.push_str(&format!("{:0run$}", p.days));
            }
            'h' | 'm' | 's' => {
                if run > 2 {
                    return Err(Error::invalid_format(spec, "field repeated more than twice"));
                }
                let value = match ch {
                    'h' => p.hours,
                    'm' => p.minutes,
                    _ => p.seconds,
                };
                out.push_str(&format!("{:0run$}", value));
            }
            'f' | 'F' => {
                if run > 7 {
                    return Err(Error::invalid_format(spec, "at most seven fraction digits"));
                }
                let fraction = format!("{:07}", p.ticks);
                let fraction = &fraction[..run];
                if ch == 'F' {
                    out.push_str(fraction.trim_end_matches('0'));
                } else {
                    out.push_str(fraction);
                }
            }
            '\\' => {
                let next = chars
                    .get(i + 1)
                    .ok_or_else(|| Error::invalid_format(spec, "dangling escape"))?;
                out.push(*next);
                i += 2;
                continue;
            }
            '\'' | '"' => {
                let close = chars[i + 1..]
                    .iter()
                    .position(|&c| c == ch)
                    .ok_or_else(|| Error::invalid_format(spec, "unterminated quote"))?;
                out.extend(&chars[i + 1..i + 1 + close]);
                i += close + 2;
                continue;
            }
            '%' => {
                i += 1;
                continue;
            }
            other => {
                return Err(Error::invalid_format(
                    spec,
                    &format!("literal {other:?} must be quoted or escaped"),
                ))
            }
        }
        i += run;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inv() -> &'static Culture {
        Culture::invariant()
    }

    fn hms(h: i64, m: i64, s: i64) -> TimeDelta {
        TimeDelta::hours(h) + TimeDelta::minutes(m) + TimeDelta::seconds(s)
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(parse_duration("3", inv()), Some(TimeDelta::days(3)));
        assert_eq!(parse_duration("01:02", inv()), Some(hms(1, 2, 0)));
        assert_eq!(parse_duration("01:02:03", inv()), Some(hms(1, 2, 3)));
        assert_eq!(
            parse_duration("2.01:02:03", inv()),
            Some(TimeDelta::days(2) + hms(1, 2, 3))
        );
        assert_eq!(
            parse_duration("2:01:02:03.5", inv()),
            Some(TimeDelta::days(2) + hms(1, 2, 3) + TimeDelta::milliseconds(500))
        );
        assert_eq!(parse_duration("-00:00:01", inv()), Some(TimeDelta::seconds(-1)));
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert_eq!(parse_duration("24:00", inv()), None);
        assert_eq!(parse_duration("00:60", inv()), None);
        assert_eq!(parse_duration("1:2:3:4:5", inv()), None);
        assert_eq!(parse_duration("00:00:01.12345678", inv()), None);
        assert_eq!(parse_duration("abc", inv()), None);
    }

    #[test]
    fn test_culture_fraction_separator() {
        let de = Culture::resolve(Some("de-DE"));
        assert_eq!(
            parse_duration("00:00:01,25", de),
            Some(TimeDelta::milliseconds(1250))
        );
    }

    #[test]
    fn test_standard_formats() {
        let delta = TimeDelta::days(1) + hms(2, 3, 4) + TimeDelta::milliseconds(500);
        assert_eq!(format_duration(delta, None, inv()).unwrap(), "1.02:03:04.5000000");
        assert_eq!(format_duration(delta, Some("g"), inv()).unwrap(), "1:2:03:04.5");
        assert_eq!(
            format_duration(-delta, Some("G"), inv()).unwrap(),
            "-1:02:03:04.5000000"
        );
        assert_eq!(format_duration(hms(0, 5, 0), None, inv()).unwrap(), "00:05:00");
    }

    #[test]
    fn test_custom_format() {
        let delta = TimeDelta::days(3) + hms(4, 5, 6);
        assert_eq!(
            format_duration(delta, Some("dd\\.hh\\:mm"), inv()).unwrap(),
            "03.04:05"
        );
        assert_eq!(
            format_duration(delta, Some("h' hours'"), inv()).unwrap(),
            "4 hours"
        );
        assert!(format_duration(delta, Some("hh:mm"), inv()).is_err());
    }
}
