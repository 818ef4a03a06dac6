//! Macro for defining strongly-typed SQL identifier newtypes.
//!
//! Keyspace and table names are interpolated into DDL, so every newtype
//! enforces the same invariant: an ASCII letter or underscore followed by
//! ASCII letters, digits or underscores. Deserialization rejects anything
//! else, which surfaces bad identifiers while the config file is loaded.

/// Returns true when `s` is usable as an unquoted SQL identifier.
pub(crate) fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Define a strongly-typed identifier newtype.
///
/// Generates:
/// - The struct with `Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize`
/// - Custom `Deserialize` (rejects invalid identifiers)
/// - `new()` (panics on invalid input), `try_new()` (returns Option), `as_str()`
/// - `Display`, `AsRef<str>`, `Deref<Target=str>`
/// - `TryFrom<&str>`, `PartialEq<&str>`
macro_rules! define_identifier {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
        $vis struct $Name(String);

        impl<'de> serde::Deserialize<'de> for $Name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                $Name::try_new(s.clone()).ok_or_else(|| {
                    serde::de::Error::custom(format!(
                        concat!("'{}' is not a valid ", stringify!($Name), " (expected [A-Za-z_][A-Za-z0-9_]*)"),
                        s
                    ))
                })
            }
        }

        impl $Name {
            /// Create a new instance, panicking if the name is not a valid identifier.
            ///
            /// Prefer [`try_new`](Self::try_new) when handling untrusted input.
            pub fn new(name: impl Into<String>) -> Self {
                let s = name.into();
                assert!(
                    $crate::newtype_string::is_valid_identifier(&s),
                    concat!(stringify!($Name), " must be a valid identifier")
                );
                Self(s)
            }

            /// Try to create a new instance, returning `None` for invalid identifiers.
            pub fn try_new(name: impl Into<String>) -> Option<Self> {
                let s = name.into();
                if $crate::newtype_string::is_valid_identifier(&s) {
                    Some(Self(s))
                } else {
                    None
                }
            }

            /// Return the underlying name as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $Name {
            fn as_ref(&self) -> &str { &self.0 }
        }

        impl std::ops::Deref for $Name {
            type Target = str;
            fn deref(&self) -> &str { &self.0 }
        }

        impl TryFrom<&str> for $Name {
            type Error = &'static str;
            fn try_from(s: &str) -> Result<Self, Self::Error> {
                $Name::try_new(s).ok_or(concat!(stringify!($Name), " must be a valid identifier"))
            }
        }

        impl PartialEq<&str> for $Name {
            fn eq(&self, other: &&str) -> bool { self.0 == *other }
        }
    };
}

pub(crate) use define_identifier;

#[cfg(test)]
mod tests {
    use super::is_valid_identifier;

    #[test]
    fn test_valid_identifiers() {
        assert!(is_valid_identifier("app"));
        assert!(is_valid_identifier("_private"));
        assert!(is_valid_identifier("database_migrations_v2"));
    }

    #[test]
    fn test_invalid_identifiers() {
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("2fast"));
        assert!(!is_valid_identifier("my-keyspace"));
        assert!(!is_valid_identifier("a.b"));
        assert!(!is_valid_identifier("drop\"table"));
    }
}
