//! Polling and state layer between `remi-api` and its consumers.
//!
//! - **[`Coordinator`]**: owns the poll loop for one device.
//!   [`start()`](Coordinator::start) fetches the face catalog and server
//!   config, runs a first refresh, then polls on a fixed interval. Each
//!   cycle fetches the device record and alarm list concurrently and
//!   publishes them together as one [`Snapshot`]. Overlapping refresh
//!   requests share the cycle already in flight.
//!
//! - **[`Command`]**: typed writes routed through
//!   [`Coordinator::execute`], each followed by a refresh.
//!
//! - **Entity views** ([`entity`]): sensors, selects, numbers, lights and
//!   alarm switches derived from a snapshot, with stable unique ids.
//!
//! - **[`AlarmReconciler`]**: keeps an [`AlarmRegistry`] in sync with the
//!   alarm ids of the latest snapshot. [`SwitchRegistry`] is the
//!   in-memory registry.

pub mod command;
pub mod config;
pub mod coordinator;
pub mod entity;
pub mod error;
pub mod model;
pub mod reconcile;
pub mod registry;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::requests::*;
pub use command::{Command, CommandResult};
pub use config::{CoordinatorConfig, DEFAULT_SCAN_INTERVAL_SECS};
pub use coordinator::{Coordinator, PollState, PollStatus, Snapshot};
pub use entity::{AlarmSwitch, DeviceInfo, EntityKind, EntityState};
pub use error::{CoreError, SetupFailure};
pub use reconcile::{AlarmDiff, AlarmReconciler, diff_alarm_ids};
pub use registry::{AlarmRegistry, RegisteredSwitch, SwitchRegistry};

pub use model::{ClockFace, ClockFormat, LightChannel, MusicMode, NumberSetting};
