use std::fmt;

use serde::{Deserialize, Serialize};

/// Sex byte of a character record. The game only writes the two tile-font
/// glyph codes; anything else is kept so the record re-encodes unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
    Unknown(u8),
}

impl Sex {
    pub const MALE_RAW: u8 = 0x0B;
    pub const FEMALE_RAW: u8 = 0x0C;

    pub fn from_raw(raw: u8) -> Self {
        if raw == Self::MALE_RAW {
            Self::Male
        } else if raw == Self::FEMALE_RAW {
            Self::Female
        } else {
            Self::Unknown(raw)
        }
    }

    pub fn raw(self) -> u8 {
        match self {
            Self::Male => Self::MALE_RAW,
            Self::Female => Self::FEMALE_RAW,
            Self::Unknown(raw) => raw,
        }
    }

    pub fn is_known(self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Male => f.write_str("Male"),
            Self::Female => f.write_str("Female"),
            Self::Unknown(raw) => write!(f, "Unknown ({raw:#04x})"),
        }
    }
}
