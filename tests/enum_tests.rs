use textconv::{enumeration, enums, EnumType, Error, ParseOptions, Primitive, TargetType, TrimmingOptions};

enumeration! {
    /// Order lifecycle.
    pub enum Status: u8 {
        Pending = 1,
        Shipped = 2,
        Delivered = 3,
        Returned = 9,
    }
}

enumeration! {
    pub struct Style: u32 {
        const NONE = 0;
        const BOLD = 1;
        const ITALIC = 2;
        const UNDERLINE = 4;
        const EMPHASIS = Self::BOLD.bits() | Self::ITALIC.bits();
    }
}

fn options() -> ParseOptions {
    ParseOptions::default()
}

#[test]
fn test_name_and_is_defined_agree() {
    for &(name, member) in <Status as textconv::Enumeration>::members() {
        assert_eq!(enums::name(member), Some(name));
        assert!(enums::is_defined(member));
    }
    let meta = EnumType::of::<Status>().metadata();
    for bits in [0u64, 4, 8, 10, 255] {
        assert_eq!(meta.name_of(bits), None);
        assert!(!meta.is_defined(bits));
    }
}

#[test]
fn test_flags_definedness() {
    let meta = EnumType::of::<Style>().metadata();
    assert!(meta.is_flags());
    assert_eq!(meta.all_flags_mask(), 7);
    assert!(meta.is_defined(5));
    assert!(!meta.is_defined(8));
    assert_eq!(meta.name_of(3), Some("EMPHASIS"));
}

#[test]
fn test_parse_names_and_numbers() {
    assert_eq!(enums::try_parse::<Status>("Shipped", &options()), Some(Status::Shipped));
    assert_eq!(enums::try_parse::<Status>("  returned ", &options()), Some(Status::Returned));
    assert_eq!(enums::try_parse::<Status>("3", &options()), Some(Status::Delivered));
    assert_eq!(enums::try_parse::<Status>("4", &options()), None);
    assert_eq!(enums::try_parse::<Status>("-1", &options()), None);
    assert_eq!(enums::try_parse::<Status>("Lost", &options()), None);
    assert_eq!(enums::try_parse::<Status>("Pending,Shipped", &options()), None);
    assert_eq!(enums::parse_or::<Status>(None, Status::Pending, &options()), Status::Pending);
}

#[test]
fn test_flag_order_independence() {
    let a: Style = enums::parse("BOLD, ITALIC, UNDERLINE", &options()).unwrap();
    let b: Style = enums::parse("underline,italic,bold", &options()).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.bits(), 7);
    assert_eq!(enums::try_parse::<Style>("BOLD,,ITALIC", &options()), None);
    assert_eq!(enums::try_parse::<Style>("8", &options()), None);
    assert_eq!(enums::try_parse::<Style>("6", &options()), Some(Style::ITALIC | Style::UNDERLINE));
}

#[test]
fn test_trimming_applies_to_enums() {
    let none = ParseOptions::new().with_trimming(TrimmingOptions::NONE);
    assert_eq!(enums::try_parse::<Status>(" Shipped", &none), None);
    assert_eq!(Status::try_parse(" Shipped", &none), None);
    assert_eq!(Status::try_parse(" Shipped", &options()), Some(Status::Shipped));
}

#[test]
fn test_format_specifiers() {
    let value = Style::BOLD | Style::ITALIC | Style::UNDERLINE;
    assert_eq!(enums::format(value, None).unwrap(), "EMPHASIS, UNDERLINE");
    assert_eq!(enums::format(value, Some("F")).unwrap(), "EMPHASIS, UNDERLINE");
    assert_eq!(enums::format(value, Some("D")).unwrap(), "7");
    assert_eq!(enums::format(value, Some("x")).unwrap(), "00000007");
    assert_eq!(enums::format(Style::NONE, None).unwrap(), "NONE");
    assert_eq!(enums::format(Style::from_bits_retain(9), None).unwrap(), "9");

    assert_eq!(enums::format(Status::Returned, Some("G")).unwrap(), "Returned");
    assert_eq!(enums::format(Status::Returned, Some("X")).unwrap(), "09");
    assert!(matches!(
        enums::format(Status::Returned, Some("N")),
        Err(Error::InvalidFormat { .. })
    ));
}

#[test]
fn test_check_value_variants() {
    let allowed = [Status::Pending, Status::Shipped];
    assert!(enums::check_value(Some(Status::Shipped), &allowed, true).unwrap());
    assert!(!enums::check_value(Some(Status::Returned), &allowed, false).unwrap());
    let err = enums::check_value(Some(Status::Returned), &allowed, true).unwrap_err();
    assert_eq!(
        err,
        Error::ArgumentOutOfRange {
            param: "value".to_string(),
            value: "Returned".to_string()
        }
    );

    assert!(enums::check_value_by_range(Some(Status::Delivered), Status::Pending, Status::Delivered, true).unwrap());
    assert!(!enums::check_value_by_range(Some(Status::Returned), Status::Pending, Status::Delivered, false).unwrap());

    assert!(enums::check_value_by_mask(Some(Style::EMPHASIS), Style::EMPHASIS, true).unwrap());
    assert!(!enums::check_value_by_mask(Some(Style::UNDERLINE), Style::EMPHASIS, false).unwrap());
    assert!(matches!(
        enums::check_value_by_mask::<Style>(None, Style::EMPHASIS, true),
        Err(Error::ArgumentNull(_))
    ));
}

#[test]
fn test_metadata_lookup_by_target() {
    let meta = enums::metadata(Some(&TargetType::enumeration::<Status>())).unwrap();
    assert_eq!(meta.name(), "Status");
    assert_eq!(meta.names(), &["Pending", "Shipped", "Delivered", "Returned"]);
    assert_eq!(meta.values(), &[1, 2, 3, 9]);

    let err = enums::metadata(Some(&TargetType::of::<u8>())).unwrap_err();
    assert_eq!(err, Error::NotAnEnum("u8".to_string()));
}

#[test]
fn test_concurrent_metadata_access() {
    let handles: Vec<_> = (0..8)
        .map(|_| std::thread::spawn(|| EnumType::of::<Style>().metadata().all_flags_mask()))
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 7);
    }
}
