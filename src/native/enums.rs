//! Closed enumerations over native integer constants.
//!
//! Each enum is declared from a native prefix and a table of
//! `Variant = value` rows, one row per constant sharing that prefix. The
//! prefix-stripped constant name is the variant in SCREAMING_SNAKE_CASE
//! (override with `#[strum(serialize = "...")]`). Integers without a row
//! decode to `Unrecognized(raw)` instead of failing.

macro_rules! native_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident: $prefix:literal {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::strum_macros::EnumString,
            ::strum_macros::IntoStaticStr,
            ::strum_macros::EnumIter,
        )]
        #[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
        $vis enum $name {
            $($(#[$vmeta])* $variant,)+
            /// A raw value with no named case.
            #[strum(disabled)]
            Unrecognized(i32),
        }

        impl $name {
            /// Common prefix of the native constant names.
            pub const PREFIX: &'static str = $prefix;

            pub fn from_raw(raw: i32) -> Self {
                match raw {
                    $($value => $name::$variant,)+
                    other => $name::Unrecognized(other),
                }
            }

            pub fn raw(self) -> i32 {
                match self {
                    $($name::$variant => $value,)+
                    $name::Unrecognized(raw) => raw,
                }
            }

            /// Name with the prefix stripped, e.g. `AVAILABLE`.
            pub fn name(self) -> Option<&'static str> {
                match self {
                    $name::Unrecognized(_) => None,
                    named => Some(named.into()),
                }
            }

            /// Full native constant name, e.g. `SP_TRACK_AVAILABILITY_AVAILABLE`.
            pub fn native_name(self) -> Option<String> {
                self.name().map(|name| format!("{}{name}", Self::PREFIX))
            }

            /// Looks a case up by its full native constant name.
            pub fn from_native_name(native: &str) -> Option<Self> {
                native.strip_prefix(Self::PREFIX)?.parse::<Self>().ok()
            }
        }

        impl From<i32> for $name {
            fn from(raw: i32) -> Self {
                Self::from_raw(raw)
            }
        }

        // strum's Display panics on disabled variants
        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self.name() {
                    Some(name) => write!(f, "{name}"),
                    None => write!(f, "UNRECOGNIZED({})", self.raw()),
                }
            }
        }
    };
}

pub(crate) use native_enum;

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    native_enum! {
        enum Fruit: "FRUIT_" {
            Apple = 0,
            BloodOrange = 4,
            #[strum(serialize = "KIWIFRUIT")]
            Kiwi = 5,
        }
    }

    #[test]
    fn one_case_per_constant_with_prefix_stripped() {
        assert_eq!(
            Fruit::iter().collect::<Vec<_>>(),
            vec![Fruit::Apple, Fruit::BloodOrange, Fruit::Kiwi]
        );
        assert_eq!(Fruit::BloodOrange.name(), Some("BLOOD_ORANGE"));
        assert_eq!(
            Fruit::BloodOrange.native_name().as_deref(),
            Some("FRUIT_BLOOD_ORANGE")
        );
        assert_eq!(
            Fruit::from_native_name("FRUIT_BLOOD_ORANGE"),
            Some(Fruit::BloodOrange)
        );
        assert_eq!(Fruit::from_native_name("BLOOD_ORANGE"), None);
    }

    #[test]
    fn explicit_native_names() {
        assert_eq!(Fruit::Kiwi.name(), Some("KIWIFRUIT"));
        assert_eq!(Fruit::from_native_name("FRUIT_KIWIFRUIT"), Some(Fruit::Kiwi));
        assert_eq!(Fruit::from_native_name("FRUIT_KIWI"), None);
    }

    #[test]
    fn unknown_values_are_kept() {
        assert_eq!(Fruit::from_raw(4), Fruit::BloodOrange);
        assert_eq!(Fruit::from_raw(2), Fruit::Unrecognized(2));
        assert_eq!(Fruit::Unrecognized(2).raw(), 2);
        assert_eq!(Fruit::Unrecognized(2).name(), None);
        assert_eq!(Fruit::Unrecognized(2).native_name(), None);
        assert_eq!(Fruit::Unrecognized(2).to_string(), "UNRECOGNIZED(2)");
        assert_eq!(Fruit::Apple.to_string(), "APPLE");
        assert_eq!(Fruit::from_native_name("FRUIT_UNRECOGNIZED"), None);
    }
}
