//! LED identifiers and on/off levels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two indicator LEDs on the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedId {
    Red,
    Green,
}

impl LedId {
    pub const ALL: [LedId; 2] = [LedId::Red, LedId::Green];

    /// Name used for button labels.
    pub fn name(self) -> &'static str {
        match self {
            LedId::Red => "Red",
            LedId::Green => "Green",
        }
    }

    pub fn other(self) -> LedId {
        match self {
            LedId::Red => LedId::Green,
            LedId::Green => LedId::Red,
        }
    }
}

impl fmt::Display for LedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Binary LED level. Travels as the integer `0` or `1`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Level {
    #[default]
    Off,
    On,
}

impl Level {
    pub fn toggled(self) -> Level {
        match self {
            Level::Off => Level::On,
            Level::On => Level::Off,
        }
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        match level {
            Level::Off => 0,
            Level::On => 1,
        }
    }
}

/// Rejected wire value for a [`Level`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelError(pub u8);

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LED level must be 0 or 1, got {}", self.0)
    }
}

impl std::error::Error for LevelError {}

impl TryFrom<u8> for Level {
    type Error = LevelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Level::Off),
            1 => Ok(Level::On),
            other => Err(LevelError(other)),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// Levels of both LEDs.
///
/// This is the body of every `/control-led` request, the payload of
/// `led_update` events and the initial state injected into the page.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedState {
    pub led_red: Level,
    pub led_green: Level,
}

impl LedState {
    pub fn new(led_red: Level, led_green: Level) -> Self {
        Self { led_red, led_green }
    }

    pub fn get(&self, id: LedId) -> Level {
        match id {
            LedId::Red => self.led_red,
            LedId::Green => self.led_green,
        }
    }

    pub fn set(&mut self, id: LedId, level: Level) {
        match id {
            LedId::Red => self.led_red = level,
            LedId::Green => self.led_green = level,
        }
    }

    /// Copy of `self` with only `id` flipped.
    pub fn toggled(mut self, id: LedId) -> Self {
        self.set(id, self.get(id).toggled());
        self
    }
}
