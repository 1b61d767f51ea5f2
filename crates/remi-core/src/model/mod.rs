// ── Domain lookup tables and conversions ──
//
// Fixed value sets the device understands (clock faces, music modes,
// clock formats, weekdays) and the pure conversions entities apply to
// raw snapshot fields.

pub mod alarm;
pub mod device;
pub mod face;
pub mod setting;

pub use alarm::{DAYS_OF_WEEK, format_time, recurrence_days};
pub use device::{firmware_update_available, temperature_celsius};
pub use face::ClockFace;
pub use setting::{ClockFormat, LightChannel, MusicMode, NumberSetting};
