// ── Device settings ──
//
// Enumerations for the writable device fields: music mode, clock
// format, the two RGB light channels and the 0-100 number settings.

use remi_api::{Remi, Rgb};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

// ── Music mode ───────────────────────────────────────────────────────

/// Sound played by the device (`musicMode` code 0-2).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum MusicMode {
    #[strum(to_string = "Off")]
    Off,
    #[strum(to_string = "Music")]
    Music,
    #[strum(to_string = "White Noise", serialize = "white-noise", serialize = "whitenoise")]
    WhiteNoise,
}

impl MusicMode {
    pub fn code(self) -> i64 {
        match self {
            Self::Off => 0,
            Self::Music => 1,
            Self::WhiteNoise => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::iter().find(|m| m.code() == code)
    }

    /// Current mode of a device; a missing field means code 0.
    pub fn of(remi: &Remi) -> Option<Self> {
        Self::from_code(remi.music_mode.unwrap_or(0))
    }

    pub fn labels() -> Vec<String> {
        Self::iter().map(|m| m.to_string()).collect()
    }
}

// ── Clock format ─────────────────────────────────────────────────────

/// 12h or 24h display (`hourFormat24`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
pub enum ClockFormat {
    #[strum(to_string = "12h")]
    H12,
    #[strum(to_string = "24h")]
    H24,
}

impl ClockFormat {
    /// Current format of a device; a missing field means 24h.
    pub fn of(remi: &Remi) -> Self {
        if remi.hour_format_24.unwrap_or(true) {
            Self::H24
        } else {
            Self::H12
        }
    }

    pub fn is_24h(self) -> bool {
        self == Self::H24
    }
}

// ── RGB lights ───────────────────────────────────────────────────────

pub const BLACK: Rgb = [0, 0, 0];
pub const WHITE: Rgb = [255, 255, 255];

/// One of the two independent RGB channels.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[strum(serialize_all = "kebab-case")]
pub enum LightChannel {
    /// Night light (`lightnight`).
    NightLight,
    /// Screen background colour (`background_color`).
    Background,
}

impl LightChannel {
    /// Wire field name on the device record.
    pub fn field(self) -> &'static str {
        match self {
            Self::NightLight => "lightnight",
            Self::Background => "background_color",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::NightLight => "Night Light",
            Self::Background => "Background Color",
        }
    }

    /// Current colour of this channel. A missing field reads as white.
    pub fn color(self, remi: &Remi) -> Rgb {
        let value = match self {
            Self::NightLight => remi.lightnight,
            Self::Background => remi.background_color,
        };
        value.unwrap_or(WHITE)
    }

    /// A channel is lit when any component is non-zero.
    pub fn is_on(self, remi: &Remi) -> bool {
        self.color(remi).iter().any(|&c| c > 0)
    }

    /// Colour to write when switching on: the requested one, else the
    /// current colour, else white when currently black.
    pub fn turn_on_color(self, remi: &Remi, requested: Option<Rgb>) -> Rgb {
        requested.unwrap_or_else(|| {
            let current = self.color(remi);
            if current == BLACK { WHITE } else { current }
        })
    }
}

// ── Number settings ──────────────────────────────────────────────────

/// Writable 0-100 integer fields.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[strum(serialize_all = "kebab-case")]
pub enum NumberSetting {
    Volume,
    /// Screen brightness.
    Luminosity,
    /// Noise alert threshold.
    NoiseThreshold,
}

impl NumberSetting {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 100;

    pub fn field(self) -> &'static str {
        match self {
            Self::Volume => "volume",
            Self::Luminosity => "luminosity",
            Self::NoiseThreshold => "noise_notification_threshold",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Volume => "Volume",
            Self::Luminosity => "Screen Brightness",
            Self::NoiseThreshold => "Noise Alert Threshold",
        }
    }

    /// Current value, with the device's documented fallbacks.
    pub fn value(self, remi: &Remi) -> i64 {
        match self {
            Self::Volume => remi.volume.unwrap_or(50),
            Self::Luminosity => remi.luminosity.unwrap_or(50),
            Self::NoiseThreshold => remi.noise_notification_threshold.unwrap_or(0),
        }
    }
}
