//! Macro for string conversions on closed domain enums.
//!
//! # Example
//!
//! ```rust
//! use dashsync_domain::impl_domain_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Density {
//!     Compact,
//!     Comfortable,
//! }
//!
//! impl_domain_enum_conversions!(Density {
//!     Compact => "compact",
//!     Comfortable => "comfortable",
//! });
//!
//! assert_eq!(Density::ALL.len(), 2);
//! assert_eq!("COMPACT".parse::<Density>(), Ok(Density::Compact));
//! assert_eq!(Density::Comfortable.as_str(), "comfortable");
//! ```

/// Implements `as_str`, `ALL`, `Display` and `FromStr` for a unit enum.
///
/// Parsing is case-insensitive; the canonical string is the one given in
/// the mapping, which is also what `Display` writes.
#[macro_export]
macro_rules! impl_domain_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$enum_name] = &[$(Self::$variant),+];

            /// Canonical wire string.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(if s.eq_ignore_ascii_case($str) {
                    return Ok(Self::$variant);
                })+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}
