//! Property-based tests for the format/parse round-trip and the input policies.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use proptest::prelude::*;
use rust_decimal::Decimal;
use textconv::{enumeration, enums, Culture, ParseOptions, Primitive, TrimmingOptions};
use uuid::Uuid;

enumeration! {
    pub struct Letters: u16 {
        const A = 1;
        const B = 2;
        const C = 4;
        const D = 8;
    }
}

const CULTURES: &[&str] = &["", "en-US", "en-GB", "de-DE", "fr-FR", "es-ES", "it-IT"];

fn roundtrip<T: Primitive + PartialEq + std::fmt::Debug>(value: &T, spec: Option<&str>, culture: &str) -> bool {
    let options = ParseOptions::new().with_culture(culture);
    let text = match value.format_with(spec, options.culture) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Format failed: {}", e);
            return false;
        }
    };
    match T::try_parse(text.as_str(), &options) {
        Some(back) if back == *value => true,
        other => {
            eprintln!("Parse of {:?} gave {:?}", text, other);
            false
        }
    }
}

fn culture() -> impl Strategy<Value = &'static str> {
    prop::sample::select(CULTURES)
}

fn date() -> impl Strategy<Value = NaiveDate> {
    (1900i32..2100, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn time() -> impl Strategy<Value = NaiveTime> {
    (0u32..24, 0u32..60, 0u32..60).prop_map(|(h, m, s)| NaiveTime::from_hms_opt(h, m, s).unwrap())
}

proptest! {
    #[test]
    fn prop_i32(n in any::<i32>(), culture in culture()) {
        prop_assert!(roundtrip(&n, None, culture));
        prop_assert!(roundtrip(&n, Some("N0"), culture));
    }

    #[test]
    fn prop_u64(n in any::<u64>(), culture in culture()) {
        prop_assert!(roundtrip(&n, None, culture));
    }

    #[test]
    fn prop_i8(n in any::<i8>()) {
        prop_assert!(roundtrip(&n, Some("D4"), ""));
    }

    #[test]
    fn prop_f64(x in any::<f64>().prop_filter("finite", |x| x.is_finite()), culture in culture()) {
        prop_assert!(roundtrip(&x, None, culture));
        prop_assert!(roundtrip(&x, Some("R"), culture));
    }

    #[test]
    fn prop_f32(x in any::<f32>().prop_filter("finite", |x| x.is_finite())) {
        prop_assert!(roundtrip(&x, None, ""));
    }

    #[test]
    fn prop_decimal(mantissa in any::<i64>(), scale in 0u32..10, culture in culture()) {
        let d = Decimal::new(mantissa, scale);
        prop_assert!(roundtrip(&d, None, culture));
    }

    #[test]
    fn prop_bool(b in any::<bool>()) {
        prop_assert!(roundtrip(&b, None, ""));
    }

    #[test]
    fn prop_guid(bytes in any::<[u8; 16]>(), spec in prop::sample::select(&["N", "D", "B", "P"][..])) {
        prop_assert!(roundtrip(&Uuid::from_bytes(bytes), Some(spec), ""));
    }

    #[test]
    fn prop_date(d in date(), culture in culture()) {
        prop_assert!(roundtrip(&d, None, culture));
        prop_assert!(roundtrip(&d, Some("o"), culture));
    }

    #[test]
    fn prop_time(t in time()) {
        prop_assert!(roundtrip(&t, Some("HH:mm:ss"), ""));
    }

    #[test]
    fn prop_date_time(d in date(), t in time(), culture in culture()) {
        let value = NaiveDateTime::new(d, t);
        prop_assert!(roundtrip(&value, Some("s"), culture));
        prop_assert!(roundtrip(&value, Some("o"), culture));
    }

    #[test]
    fn prop_duration(seconds in -10_000_000i64..10_000_000, ticks in 0i64..10_000_000) {
        let delta = TimeDelta::seconds(seconds) + TimeDelta::nanoseconds(ticks * 100);
        prop_assert!(roundtrip(&delta, None, ""));
    }

    #[test]
    fn prop_flag_order_independent(picks in prop::sample::subsequence(vec!["A", "B", "C", "D"], 1..=4)) {
        let options = ParseOptions::default();
        let forward = picks.join(", ");
        let backward = picks.iter().rev().copied().collect::<Vec<_>>().join(",");
        let a: Letters = enums::parse(forward.as_str(), &options).unwrap();
        let b: Letters = enums::parse(backward.as_str(), &options).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_trimming_both(n in any::<i32>(), lead in "[ \t\n]{0,3}", trail in "[ \t\n]{0,3}") {
        let text = format!("{lead}{n}{trail}");
        prop_assert_eq!(i32::try_parse(text.as_str(), &ParseOptions::default()), Some(n));
    }

    #[test]
    fn prop_blank_input_defaults(blank in "[ \t\r\n]{0,4}", default in any::<i32>()) {
        let options = ParseOptions::default();
        prop_assert_eq!(i32::parse_or(blank.as_str(), default, &options), default);
        prop_assert_eq!(bool::try_parse(blank.as_str(), &options), None);
        prop_assert_eq!(Letters::try_parse(blank.as_str(), &options), None);
        prop_assert_eq!(i32::try_parse_nullable(blank.as_str(), &options), Some(None));
    }
}

#[test]
fn test_trimming_none_passes_whitespace_through() {
    let options = ParseOptions::new().with_trimming(TrimmingOptions::NONE);
    assert_eq!(char::try_parse(" x", &options), None);
    assert_eq!(Culture::invariant().name, "");
}
