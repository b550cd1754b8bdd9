//! USB HID Consumer page (0x0C) usages for the supported system buttons.
//!
//! Reference: USB HID Usage Tables 1.3, Section 15 (Consumer page 0x0C).
//!
//! # What is the Consumer page? (for beginners)
//!
//! Ordinary keys (letters, Enter, arrows) are reported on the
//! Keyboard/Keypad page.  Media and system buttons such as "volume up" or
//! "browser back" have their own page, the *Consumer* page, and a device
//! reports them through a separate consumer-control collection.  Android
//! and iOS both map the usages below to their hardware-button actions.
//!
//! | Button       | Usage ID | Usage name          |
//! |--------------|----------|---------------------|
//! | Power        | 0x0030   | Power               |
//! | Volume Up    | 0x00E9   | Volume Increment    |
//! | Volume Down  | 0x00EA   | Volume Decrement    |
//! | Home         | 0x0223   | AC Home             |
//! | Back         | 0x0224   | AC Back             |

use std::str::FromStr;

use thiserror::Error;

/// A named system button that can be pressed through the consumer-control
/// collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsumerKey {
    VolumeUp,
    VolumeDown,
    Home,
    Back,
    Power,
}

/// Returned when a button name does not match any [`ConsumerKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown key name: {0:?}")]
pub struct ParseKeyError(pub String);

impl ConsumerKey {
    /// Every supported button, in route-registration order.
    pub const ALL: [ConsumerKey; 5] = [
        ConsumerKey::VolumeUp,
        ConsumerKey::VolumeDown,
        ConsumerKey::Home,
        ConsumerKey::Back,
        ConsumerKey::Power,
    ];

    /// Returns the Consumer page usage ID sent on the wire.
    pub fn usage(self) -> u16 {
        match self {
            ConsumerKey::Power => 0x0030,
            ConsumerKey::VolumeUp => 0x00E9,
            ConsumerKey::VolumeDown => 0x00EA,
            ConsumerKey::Home => 0x0223,
            ConsumerKey::Back => 0x0224,
        }
    }

    /// Returns the snake_case name used in command paths (`/key/<name>`).
    pub fn name(self) -> &'static str {
        match self {
            ConsumerKey::VolumeUp => "volume_up",
            ConsumerKey::VolumeDown => "volume_down",
            ConsumerKey::Home => "home",
            ConsumerKey::Back => "back",
            ConsumerKey::Power => "power",
        }
    }
}

impl FromStr for ConsumerKey {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.name() == s)
            .ok_or_else(|| ParseKeyError(s.to_string()))
    }
}

impl std::fmt::Display for ConsumerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
