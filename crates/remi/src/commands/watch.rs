//! `watch`: poll continuously and print entity changes until Ctrl-C.
//!
//! Alarm switches are kept in a `SwitchRegistry` by an `AlarmReconciler`
//! driven from the coordinator's snapshot channel, the same way a host
//! platform would register and retire them.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::{Value, json};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;
use tracing::debug;

use remi_core::entity::{alarm_switches, device_entities};
use remi_core::{
    AlarmReconciler, Coordinator, CoordinatorConfig, PollState, RegisteredSwitch, Snapshot,
    SwitchRegistry,
};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::config;
use crate::error::CliError;
use crate::output::{self, Painter};

use super::util;

/// One line of watch output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum WatchEvent {
    Changed {
        unique_id: String,
        name: String,
        from: Value,
        to: Value,
    },
    SwitchAdded {
        unique_id: String,
        name: String,
    },
    SwitchRemoved {
        unique_id: String,
    },
    PollFailed {
        error: String,
    },
}

type EntityMap = BTreeMap<String, (String, Value)>;

/// Flatten a snapshot into `unique_id -> (name, state)`.
fn entity_map(snapshot: &Snapshot, device_id: &str, latest_firmware: Option<i64>) -> EntityMap {
    let mut map: EntityMap = device_entities(&snapshot.remi, latest_firmware)
        .into_iter()
        .map(|e| (e.unique_id, (e.name, e.state)))
        .collect();
    for alarm in alarm_switches(device_id, &snapshot.events) {
        map.insert(alarm.unique_id, (alarm.name, json!(alarm.is_on)));
    }
    map
}

/// State changes between two entity maps. Entities that appear or
/// vanish are reported through the registry instead.
fn entity_changes(before: &EntityMap, after: &EntityMap) -> Vec<WatchEvent> {
    after
        .iter()
        .filter_map(|(id, (name, state))| {
            let (_, old) = before.get(id)?;
            (old != state).then(|| WatchEvent::Changed {
                unique_id: id.clone(),
                name: name.clone(),
                from: old.clone(),
                to: state.clone(),
            })
        })
        .collect()
}

fn switch_changes(before: &[Arc<RegisteredSwitch>], after: &[Arc<RegisteredSwitch>]) -> Vec<WatchEvent> {
    let old: BTreeSet<&str> = before.iter().map(|s| s.unique_id.as_str()).collect();
    let new: BTreeSet<&str> = after.iter().map(|s| s.unique_id.as_str()).collect();

    let added = after
        .iter()
        .filter(|s| !old.contains(s.unique_id.as_str()))
        .map(|s| WatchEvent::SwitchAdded {
            unique_id: s.unique_id.clone(),
            name: s.name.clone(),
        });
    let removed = before
        .iter()
        .filter(|s| !new.contains(s.unique_id.as_str()))
        .map(|s| WatchEvent::SwitchRemoved {
            unique_id: s.unique_id.clone(),
        });
    added.chain(removed).collect()
}

fn render_event(event: &WatchEvent, format: &OutputFormat, painter: Painter) -> String {
    match format {
        OutputFormat::Table | OutputFormat::Plain => match event {
            WatchEvent::Changed { name, from, to, .. } => format!("{name}: {from} -> {to}"),
            WatchEvent::SwitchAdded { name, unique_id } => {
                painter.added(&format!("{name} ({unique_id})"))
            }
            WatchEvent::SwitchRemoved { unique_id } => painter.removed(unique_id),
            WatchEvent::PollFailed { error } => painter.warn(&format!("poll failed: {error}")),
        },
        // One compact object per line so the stream stays parseable.
        _ => serde_json::to_string(event).unwrap_or_default(),
    }
}

pub async fn handle(
    config: CoordinatorConfig,
    profile_name: &str,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let config = match args.interval {
        Some(secs) => config.with_scan_interval(Duration::from_secs(secs.max(1))),
        None => config,
    };
    let coordinator = Coordinator::new(config)?;
    coordinator.start().await?;
    if let Err(e) = config::persist_session(profile_name, coordinator.client()) {
        tracing::warn!(error = %e, "could not save session");
    }

    let device_id = util::device_id(&coordinator)?;
    let painter = Painter::new(&global.color);
    let emit = |event: &WatchEvent| {
        output::print_output(&render_event(event, &global.output, painter), global.quiet);
    };

    // Subscribe before the reconciler starts so its first batch is seen.
    let registry = Arc::new(SwitchRegistry::new());
    let mut switches = WatchStream::from_changes(registry.subscribe());
    let reconciler = AlarmReconciler::new(device_id.clone(), Arc::clone(&registry));
    let cancel = coordinator.cancellation_token();
    let reconcile_task = tokio::spawn(reconciler.run(coordinator.subscribe(), cancel));

    let mut snapshots = WatchStream::from_changes(coordinator.subscribe());
    let mut statuses = WatchStream::from_changes(coordinator.status());

    let mut entities = coordinator
        .snapshot()
        .map(|s| entity_map(&s, &device_id, coordinator.latest_firmware_version()))
        .unwrap_or_default();
    let mut known_switches = registry.snapshot();

    if !global.quiet && matches!(global.output, OutputFormat::Table) {
        eprintln!(
            "Watching {device_id} every {}s (Ctrl-C to stop)",
            coordinator.config().scan_interval.as_secs()
        );
    }

    loop {
        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => break,
            Some(current) = switches.next() => {
                for event in switch_changes(&known_switches, &current) {
                    emit(&event);
                }
                known_switches = current;
            }
            Some(Some(snapshot)) = snapshots.next() => {
                let next = entity_map(&snapshot, &device_id, coordinator.latest_firmware_version());
                for event in entity_changes(&entities, &next) {
                    emit(&event);
                }
                entities = next;
            }
            Some(status) = statuses.next() => {
                if status.state == PollState::Idle && !status.last_update_success {
                    if let Some(error) = status.last_error {
                        emit(&WatchEvent::PollFailed { error });
                    }
                }
            }
        }
    }

    debug!("stopping watch");
    coordinator.shutdown().await;
    let _ = reconcile_task.await;
    Ok(())
}
