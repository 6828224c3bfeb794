use serde::Serialize;

use crate::codec::{flag, DecodeError};
use crate::units::Unit;

/// Display conventions chosen by the user.
///
/// Stored as one word: bit 0 is the prefer-ounces flag, bit 1 the 12-hour
/// clock flag. Records written before the clock flag existed read as 24-hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Preferences {
    pub unit: Unit,
    pub use_meridiem: bool,
}

impl Preferences {
    pub fn new(unit: Unit, use_meridiem: bool) -> Self {
        Self { unit, use_meridiem }
    }

    pub fn encode(&self) -> [u16; 1] {
        [u16::from(self.unit.is_oz()) | (u16::from(self.use_meridiem) << 1)]
    }

    pub fn decode(words: &[u16]) -> Result<Self, DecodeError> {
        match words {
            [word] => Ok(Self {
                unit: Unit::from_oz_flag(flag(*word, 0)),
                use_meridiem: flag(*word, 1),
            }),
            _ => Err(DecodeError::MalformedLength {
                record: "preferences",
                len: words.len(),
            }),
        }
    }
}
