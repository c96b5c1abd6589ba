/// Declares an enumeration type with text conversion support.
///
/// Two forms are accepted:
///
/// - `enum Name: repr { A = 1, B = 2 }` declares a plain `#[repr(repr)]` enum.
/// - `struct Name: repr { const A = 1; const B = 2; }` declares a flags type
///   through [`bitflags`], so the full set algebra (`|`, `&`, `!`, `-`,
///   `insert`, `iter_names`, ...) is available.
///
/// Both implement [`Enumeration`](crate::Enumeration),
/// [`Primitive`](crate::Primitive) and [`Display`](std::fmt::Display).
///
/// # Examples
///
/// ```rust
/// use textconv::{enumeration, ParseOptions, Primitive};
///
/// enumeration! {
///     #[doc = "Traffic light colours."]
///     pub enum Light: u8 {
///         Red = 1,
///         Amber = 2,
///         Green = 3,
///     }
/// }
///
/// enumeration! {
///     pub struct Days: u8 {
///         const MON = 1;
///         const TUE = 2;
///         const WEEKDAYS = Self::MON.bits() | Self::TUE.bits();
///     }
/// }
///
/// let options = ParseOptions::default();
/// assert_eq!(Light::try_parse("green", &options), Some(Light::Green));
/// assert_eq!(Light::Amber.to_string(), "Amber");
/// assert_eq!(Days::try_parse("MON, TUE", &options), Some(Days::WEEKDAYS));
/// assert!(Days::WEEKDAYS.contains(Days::TUE));
/// ```
#[macro_export]
macro_rules! enumeration {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $repr:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr($repr)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant = $value ),+
        }

        impl $crate::Enumeration for $name {
            const NAME: &'static str = stringify!($name);
            const UNDERLYING: $crate::Underlying = <$repr as $crate::UnderlyingInt>::UNDERLYING;

            fn members() -> &'static [(&'static str, Self)] {
                &[ $( (stringify!($variant), $name::$variant) ),+ ]
            }

            fn to_bits(self) -> u64 {
                <$repr as $crate::UnderlyingInt>::to_bits(self as $repr)
            }

            fn from_bits(bits: u64) -> ::core::option::Option<Self> {
                <Self as $crate::Enumeration>::members()
                    .iter()
                    .find(|(_, member)| $crate::Enumeration::to_bits(*member) == bits)
                    .map(|(_, member)| *member)
            }
        }

        $crate::__impl_enum_primitive!($name);
    };

    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident : $repr:ident {
            $( $(#[$vinner:ident $($vargs:tt)*])* const $flag:ident = $value:expr; )*
        }
    ) => {
        $crate::bitflags::bitflags! {
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
            $vis struct $name: $repr {
                $( $(#[$vinner $($vargs)*])* const $flag = $value; )*
            }
        }

        impl $crate::Enumeration for $name {
            const NAME: &'static str = stringify!($name);
            const UNDERLYING: $crate::Underlying = <$repr as $crate::UnderlyingInt>::UNDERLYING;
            const FLAGS: bool = true;

            fn members() -> &'static [(&'static str, Self)] {
                static MEMBERS: ::std::sync::LazyLock<::std::vec::Vec<(&'static str, $name)>> =
                    ::std::sync::LazyLock::new(|| {
                        <$name as $crate::bitflags::Flags>::FLAGS
                            .iter()
                            .filter(|flag| flag.is_named())
                            .map(|flag| (flag.name(), *flag.value()))
                            .collect()
                    });
                &MEMBERS
            }

            fn to_bits(self) -> u64 {
                <$repr as $crate::UnderlyingInt>::to_bits(self.bits())
            }

            fn from_bits(bits: u64) -> ::core::option::Option<Self> {
                ::core::option::Option::Some(Self::from_bits_retain(
                    <$repr as $crate::UnderlyingInt>::from_bits(bits),
                ))
            }
        }

        $crate::__impl_enum_primitive!($name);
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __impl_enum_primitive {
    ($name:ident) => {
        impl $crate::Primitive for $name {
            fn kind() -> $crate::Kind {
                $crate::Kind::Enum($crate::EnumType::of::<$name>())
            }

            fn parse_trimmed(text: &str, ctx: &$crate::ParseContext<'_>) -> ::core::option::Option<Self> {
                $crate::enums::parse_trimmed(text, ctx.ignore_case)
            }

            fn format_with(
                &self,
                spec: ::core::option::Option<&str>,
                _culture: &$crate::Culture,
            ) -> $crate::Result<::std::string::String> {
                $crate::enums::format(*self, spec)
            }

            fn into_value(self) -> $crate::Value {
                $crate::Value::Enum($crate::EnumValue::of(self))
            }

            fn from_value(value: &$crate::Value) -> ::core::option::Option<Self> {
                match value {
                    $crate::Value::Enum(v) => v.get::<Self>(),
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                let text = $crate::enums::format(*self, None).map_err(|_| ::core::fmt::Error)?;
                f.write_str(&text)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{Enumeration, ParseOptions, Primitive, Underlying, Value};

    enumeration! {
        enum Shade: i64 {
            Dark = -10,
            Light = 10,
        }
    }

    enumeration! {
        struct Perm: u16 {
            const R = 4;
            const W = 2;
            const X = 1;
        }
    }

    #[test]
    fn test_plain_enum_impl() {
        assert_eq!(Shade::NAME, "Shade");
        assert_eq!(Shade::UNDERLYING, Underlying::I64);
        assert!(!Shade::FLAGS);
        assert_eq!(Shade::Dark.to_bits(), (-10i64) as u64);
        assert_eq!(Shade::from_bits(10), Some(Shade::Light));
        assert_eq!(Shade::from_bits(11), None);
    }

    #[test]
    fn test_flags_impl() {
        assert!(Perm::FLAGS);
        let rw = Perm::R | Perm::W;
        assert_eq!(rw.bits(), 6);
        assert!(rw.contains(Perm::W));
        assert!(!rw.contains(Perm::X));
        assert_eq!((rw & Perm::W), Perm::W);
        assert_eq!(<Perm as Enumeration>::from_bits(7), Some(Perm::all()));
        assert_eq!(<Perm as Enumeration>::from_bits(8), Some(Perm::from_bits_retain(8)));
        assert_eq!(Perm::default(), Perm::empty());
        assert_eq!(Perm::all() - Perm::W, Perm::R | Perm::X);
        assert_eq!(!Perm::R & Perm::all(), Perm::W | Perm::X);
    }

    #[test]
    fn test_primitive_and_display() {
        let options = ParseOptions::default();
        assert_eq!(Shade::try_parse(" dark ", &options), Some(Shade::Dark));
        assert_eq!(Shade::try_parse("-10", &options), Some(Shade::Dark));
        assert_eq!(Perm::try_parse("w,r", &options), Some(Perm::R | Perm::W));
        assert_eq!((Perm::R | Perm::X).to_string(), "X, R");
        assert_eq!(Shade::Light.to_text(Some("D")).unwrap(), "10");

        let value = Perm::W.into_value();
        assert!(matches!(value, Value::Enum(_)));
        assert_eq!(Perm::from_value(&value), Some(Perm::W));
        assert_eq!(Shade::from_value(&value), None);
    }
}
