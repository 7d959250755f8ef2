//! Numeric addresses used by the mutators.
//!
//! Character and monster numbers are 1-based roster slots, dense per entity
//! kind and only meaningful within one reconciliation. Standee numbers come
//! straight from the document and are unique within their parent monster.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

macro_rules! define_number {
    ($name:ident, $label:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            pub const fn get(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u32>()
                    .map(Self)
                    .map_err(|_| DomainError::parse(format!("Invalid {}: {:?}", $label, s)))
            }
        }
    };
}

define_number!(CharacterNumber, "character number");
define_number!(MonsterNumber, "monster number");
define_number!(StandeeNumber, "standee number");

impl CharacterNumber {
    /// Zero-based position among the characters, `None` for slot 0.
    pub(crate) fn position(self) -> Option<usize> {
        (self.0 as usize).checked_sub(1)
    }
}

impl MonsterNumber {
    /// Zero-based position among the monsters, `None` for slot 0.
    pub(crate) fn position(self) -> Option<usize> {
        (self.0 as usize).checked_sub(1)
    }
}
