// ── Alarm reconciliation ──
//
// Keeps the registered alarm switches in 1:1 correspondence with the
// alarm ids of the latest snapshot. Existing switches are never torn
// down and recreated: only ids that appeared are registered and only
// ids that vanished are removed.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use remi_api::Event;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::coordinator::Snapshot;
use crate::entity::{AlarmSwitch, alarm_unique_id};
use crate::registry::{AlarmRegistry, RegisteredSwitch};

/// Alarm ids to register and to remove.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlarmDiff {
    pub added: BTreeSet<String>,
    pub removed: BTreeSet<String>,
}

impl AlarmDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// `(current - known, known - current)`.
pub fn diff_alarm_ids(known: &BTreeSet<String>, current: &BTreeSet<String>) -> AlarmDiff {
    AlarmDiff {
        added: current.difference(known).cloned().collect(),
        removed: known.difference(current).cloned().collect(),
    }
}

/// Tracks which alarm ids have switches and syncs the registry to each
/// new alarm list.
pub struct AlarmReconciler<R: AlarmRegistry> {
    device_id: String,
    known: BTreeSet<String>,
    registry: Arc<R>,
}

impl<R: AlarmRegistry> AlarmReconciler<R> {
    /// The device id is fixed here: every unique id this reconciler
    /// builds or removes uses it.
    pub fn new(device_id: impl Into<String>, registry: Arc<R>) -> Self {
        Self {
            device_id: device_id.into(),
            known: BTreeSet::new(),
            registry,
        }
    }

    /// Alarm ids that currently have a registered switch.
    pub fn known_ids(&self) -> &BTreeSet<String> {
        &self.known
    }

    /// Sync the registry to `events` and return what changed.
    pub fn reconcile(&mut self, events: &[Event]) -> AlarmDiff {
        let by_id: HashMap<&str, &Event> = events
            .iter()
            .filter(|e| !e.object_id.is_empty())
            .map(|e| (e.object_id.as_str(), e))
            .collect();
        let current: BTreeSet<String> = by_id.keys().map(|&id| id.to_owned()).collect();

        let diff = diff_alarm_ids(&self.known, &current);
        if diff.is_empty() {
            return diff;
        }

        if !diff.added.is_empty() {
            let switches = diff
                .added
                .iter()
                .filter_map(|id| by_id.get(id.as_str()))
                .map(|event| {
                    let switch = AlarmSwitch::from_event(&self.device_id, event);
                    RegisteredSwitch {
                        unique_id: switch.unique_id,
                        event_id: switch.event_id,
                        name: switch.name,
                    }
                })
                .collect();
            self.registry.register(switches);
            self.known.extend(diff.added.iter().cloned());
        }

        for id in &diff.removed {
            let unique_id = alarm_unique_id(&self.device_id, id);
            if !self.registry.deregister(&unique_id) {
                debug!(%unique_id, "stale alarm switch was not registered");
            }
            self.known.remove(id);
        }

        info!(
            added = diff.added.len(),
            removed = diff.removed.len(),
            "alarm switches reconciled"
        );
        diff
    }

    /// Reconcile against the current snapshot, then again on every
    /// snapshot notification, until cancelled or the coordinator goes
    /// away.
    pub async fn run(
        mut self,
        mut updates: watch::Receiver<Option<Arc<Snapshot>>>,
        cancel: CancellationToken,
    ) {
        let initial = updates.borrow_and_update().clone();
        if let Some(snapshot) = initial {
            self.reconcile(&snapshot.events);
        }

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let latest = updates.borrow_and_update().clone();
                    if let Some(snapshot) = latest {
                        self.reconcile(&snapshot.events);
                    }
                }
            }
        }
        debug!("alarm reconciler stopped");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;

    use super::*;

    fn ids(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    fn event(id: &str) -> Event {
        serde_json::from_value(serde_json::json!({ "objectId": id, "name": format!("wake {id}") }))
            .unwrap()
    }

    #[derive(Default)]
    struct RecordingRegistry {
        registered: Mutex<Vec<String>>,
        deregistered: Mutex<Vec<String>>,
    }

    impl AlarmRegistry for RecordingRegistry {
        fn register(&self, switches: Vec<RegisteredSwitch>) {
            self.registered
                .lock()
                .unwrap()
                .extend(switches.into_iter().map(|s| s.unique_id));
        }

        fn deregister(&self, unique_id: &str) -> bool {
            self.deregistered.lock().unwrap().push(unique_id.to_owned());
            true
        }
    }

    #[test]
    fn diff_adds_new_and_removes_stale() {
        let diff = diff_alarm_ids(&ids(&["A", "B"]), &ids(&["B", "C"]));
        assert_eq!(diff.added, ids(&["C"]));
        assert_eq!(diff.removed, ids(&["A"]));
    }

    #[test]
    fn diff_of_equal_sets_is_empty() {
        assert!(diff_alarm_ids(&ids(&["A"]), &ids(&["A"])).is_empty());
    }

    #[test]
    fn reconcile_registers_then_removes() {
        let registry = Arc::new(RecordingRegistry::default());
        let mut reconciler = AlarmReconciler::new("dev1", Arc::clone(&registry));

        reconciler.reconcile(&[event("A"), event("B")]);
        let diff = reconciler.reconcile(&[event("B"), event("C")]);

        assert_eq!(diff.added, ids(&["C"]));
        assert_eq!(diff.removed, ids(&["A"]));
        assert_eq!(reconciler.known_ids(), &ids(&["B", "C"]));
        assert_eq!(
            *registry.registered.lock().unwrap(),
            vec!["dev1_alarm_A", "dev1_alarm_B", "dev1_alarm_C"]
        );
        assert_eq!(*registry.deregistered.lock().unwrap(), vec!["dev1_alarm_A"]);
    }

    #[test]
    fn second_run_on_same_list_changes_nothing() {
        let registry = Arc::new(RecordingRegistry::default());
        let mut reconciler = AlarmReconciler::new("dev1", Arc::clone(&registry));

        reconciler.reconcile(&[event("A"), event("B")]);
        let second = reconciler.reconcile(&[event("B"), event("A")]);

        assert!(second.is_empty());
        assert_eq!(registry.registered.lock().unwrap().len(), 2);
        assert!(registry.deregistered.lock().unwrap().is_empty());
    }

    #[test]
    fn events_without_id_are_ignored() {
        let registry = Arc::new(RecordingRegistry::default());
        let mut reconciler = AlarmReconciler::new("dev1", registry);

        let diff = reconciler.reconcile(&[event("")]);
        assert!(diff.is_empty());
    }

    #[tokio::test]
    async fn run_reconciles_initial_and_updates_until_cancelled() {
        let registry = Arc::new(crate::registry::SwitchRegistry::new());
        let reconciler = AlarmReconciler::new("dev1", Arc::clone(&registry));

        let snapshot = |events: Vec<Event>| {
            Some(Arc::new(Snapshot {
                remi: remi_api::Remi::default(),
                events,
                fetched_at: chrono::Utc::now(),
            }))
        };

        let (tx, rx) = watch::channel(snapshot(vec![event("A")]));
        let mut versions = registry.subscribe();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(reconciler.run(rx, cancel.clone()));

        versions.changed().await.unwrap();
        assert!(registry.contains("dev1_alarm_A"));

        tx.send_replace(snapshot(vec![event("B")]));
        // one register + one deregister
        versions.changed().await.unwrap();
        while registry.contains("dev1_alarm_A") || !registry.contains("dev1_alarm_B") {
            versions.changed().await.unwrap();
        }
        assert_eq!(registry.len(), 1);

        cancel.cancel();
        task.await.unwrap();
    }
}
