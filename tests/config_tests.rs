//! Process-wide configuration tests.
//!
//! Everything touching the global snapshot runs inside one test so parallel
//! test threads never observe each other's changes.

use std::sync::Arc;
use textconv::{config, ConversionConfig, NumberStyles, ParseOptions, Primitive};

#[test]
fn test_global_config_lifecycle() {
    config::reset();
    let options = ParseOptions::default();

    assert_eq!(i32::try_parse("(67)", &options), None);
    config::set_integer_styles(NumberStyles::INTEGER | NumberStyles::ALLOW_PARENTHESES);
    assert_eq!(i32::try_parse("(67)", &options), Some(-67));

    assert_eq!(f64::try_parse("1,5", &options), Some(15.0));
    config::set_float_styles(NumberStyles::FLOAT);
    assert_eq!(f64::try_parse("1,5", &options), None);

    let date = chrono::NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
    assert_ne!(chrono::NaiveDate::try_parse("31|12|2024", &options), Some(date));
    config::add_date_time_formats(["dd'|'MM'|'yyyy"]);
    assert_eq!(chrono::NaiveDate::try_parse("31|12|2024", &options), Some(date));

    let time = chrono::NaiveTime::from_hms_opt(7, 45, 0).unwrap();
    config::add_time_formats(["HH'h'mm"]);
    assert_eq!(chrono::NaiveTime::try_parse("07h45", &options), Some(time));

    let snapshot = config::current();
    assert!(snapshot.time_formats.iter().any(|f| f == "HH'h'mm"));

    // An injected config ignores the global one.
    let isolated = ParseOptions::new().with_config(Arc::new(ConversionConfig::default()));
    assert_eq!(i32::try_parse("(67)", &isolated), None);

    config::reset();
    assert_eq!(*config::current(), ConversionConfig::default());
    assert_eq!(i32::try_parse("(67)", &options), None);
}

#[test]
fn test_config_serde_round_trip() {
    let config = ConversionConfig::default()
        .with_date_time_formats(["dd.MM.yyyy"])
        .with_integer_styles(NumberStyles::NUMBER);
    let json = serde_json::to_string(&config).unwrap();
    let back: ConversionConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);

    let partial: ConversionConfig = serde_json::from_str(r#"{"time_formats": ["HH.mm"]}"#).unwrap();
    assert_eq!(partial.time_formats, vec!["HH.mm"]);
    assert_eq!(partial.date_time_formats, ConversionConfig::default().date_time_formats);
}
