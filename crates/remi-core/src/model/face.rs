// ── Clock faces ──
//
// The server stores faces as `Face` records; devices and alarms embed a
// pointer to one. Five faces exist and their object ids never change, so
// resolution is a static two-way table rather than a catalog lookup.

use remi_api::Pointer;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

/// One of the five fixed clock faces.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum ClockFace {
    #[strum(to_string = "Off")]
    Off,
    #[strum(to_string = "Awake")]
    Awake,
    #[strum(to_string = "Sleepy")]
    Sleepy,
    #[strum(to_string = "Semi-Awake")]
    SemiAwake,
    #[strum(to_string = "Smiley")]
    Smiley,
}

impl ClockFace {
    /// Server object id of the `Face` record.
    pub fn object_id(self) -> &'static str {
        match self {
            Self::Off => "GDaZOVdRqj",
            Self::Awake => "fIjF0yWRxX",
            Self::Sleepy => "rnAltoFwYC",
            Self::SemiAwake => "9faiiPGBVv",
            Self::Smiley => "d712mdpZ0v",
        }
    }

    /// Firmware symbol (`define` column of the catalog).
    pub fn define(self) -> &'static str {
        match self {
            Self::Off => "FACE_OFF",
            Self::Awake => "FACE_DAY",
            Self::Sleepy => "FACE_NIGHT",
            Self::SemiAwake => "FACE_SEMI_AWAKE",
            Self::Smiley => "FACE_SMILY",
        }
    }

    pub fn from_object_id(object_id: &str) -> Option<Self> {
        Self::iter().find(|f| f.object_id() == object_id)
    }

    pub fn from_define(define: &str) -> Option<Self> {
        Self::iter().find(|f| f.define() == define)
    }

    /// Accepts a display name (`"Semi-Awake"`, case-insensitive) or a
    /// firmware symbol (`"FACE_SEMI_AWAKE"`).
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        Self::from_define(input)
            .or_else(|| Self::iter().find(|f| f.to_string().eq_ignore_ascii_case(input)))
    }

    /// Resolve an embedded face pointer. Unknown ids and missing
    /// pointers yield `None`.
    pub fn from_pointer(pointer: Option<&Pointer>) -> Option<Self> {
        pointer.and_then(|p| Self::from_object_id(&p.object_id))
    }

    pub fn pointer(self) -> Pointer {
        Pointer::face(self.object_id())
    }

    /// Display names in catalog order.
    pub fn names() -> Vec<String> {
        Self::iter().map(|f| f.to_string()).collect()
    }
}
