use std::fmt;

/// Seat at the table. Matches are always two-player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerId(pub u8);

impl PlayerId {
    pub const FIRST: Self = Self(0);
    pub const SECOND: Self = Self(1);

    /// Returns the other seat.
    #[inline]
    pub const fn opponent(self) -> Self {
        Self(1 - (self.0 & 1))
    }

    #[inline]
    pub const fn index(self) -> usize {
        (self.0 & 1) as usize
    }

    pub const fn all() -> [PlayerId; 2] {
        [Self::FIRST, Self::SECOND]
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player#{}", self.0)
    }
}

/// Declares a transparent string identifier used to reference definition tables.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifies a hero (character) definition.
    HeroId
);
string_id!(
    /// Identifies an ability inside a hero's ability table.
    AbilityId
);
string_id!(
    /// Identifies a token or status definition. Tokens are global so heroes can
    /// inflict each other's statuses.
    TokenId
);
string_id!(
    /// Identifies a card inside a hero's deck list.
    CardId
);
string_id!(
    /// Identifies a handler in the custom action registry.
    CustomActionId
);
string_id!(
    /// A die face symbol (e.g. `sword`, `fist`, `lotus`).
    Symbol
);
