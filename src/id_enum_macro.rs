/// Declares a closed identifier enum with a stable wire name, a display name
/// and optional wire aliases accepted on deserialization.
#[macro_export]
macro_rules! define_id_enum {
    (
        $(#[$enum_meta:meta])*
        $enum_name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $serde_name:literal : $display_name:literal
                $( | $alias:literal )*
            ),* $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $enum_name {
            $(
                $(#[$variant_meta])*
                $variant,
            )*
        }

        impl serde::Serialize for $enum_name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $enum_name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                const VARIANTS: &[&str] = &[$($serde_name),*];
                let s = String::deserialize(deserializer)?;
                Self::parse(&s).ok_or_else(|| serde::de::Error::unknown_variant(&s, VARIANTS))
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $enum_name {
            /// Stable wire identifier
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(
                        Self::$variant => $serde_name,
                    )*
                }
            }

            /// Human readable name
            pub fn name(&self) -> &'static str {
                match self {
                    $(
                        Self::$variant => $display_name,
                    )*
                }
            }

            /// Parses a wire identifier or one of its aliases
            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $(
                        $serde_name $(| $alias)* => Some(Self::$variant),
                    )*
                    _ => None,
                }
            }

            pub fn all_variants() -> &'static [Self] {
                &[
                    $(
                        Self::$variant,
                    )*
                ]
            }
        }
    };
}

#[cfg(test)]
mod tests {
    crate::define_id_enum! {
        Flavor {
            Plain => "plain" : "Plain",
            Spicy => "spicy" : "Spicy" | "hot",
        }
    }

    #[test]
    fn test_wire_names_round_trip() {
        assert_eq!(serde_json::to_string(&Flavor::Spicy).unwrap(), "\"spicy\"");
        let parsed: Flavor = serde_json::from_str("\"plain\"").unwrap();
        assert_eq!(parsed, Flavor::Plain);
    }

    #[test]
    fn test_alias_is_accepted() {
        let parsed: Flavor = serde_json::from_str("\"hot\"").unwrap();
        assert_eq!(parsed, Flavor::Spicy);
        assert_eq!(Flavor::parse("hot"), Some(Flavor::Spicy));
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        assert!(serde_json::from_str::<Flavor>("\"bland\"").is_err());
        assert_eq!(Flavor::parse("bland"), None);
    }

    #[test]
    fn test_ordering_follows_declaration() {
        assert!(Flavor::Plain < Flavor::Spicy);
        assert_eq!(Flavor::all_variants(), &[Flavor::Plain, Flavor::Spicy]);
        assert_eq!(Flavor::Spicy.to_string(), "spicy");
        assert_eq!(Flavor::Spicy.name(), "Spicy");
    }
}
