// ── Alarm switch registry ──
//
// The host-side set of alarm switches. Reconciliation only talks to the
// `AlarmRegistry` trait; `SwitchRegistry` is the in-memory implementation
// with O(1) lookups and push-based change notification.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

/// Identity of a registered alarm switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredSwitch {
    pub unique_id: String,
    pub event_id: String,
    /// Name at registration time.
    pub name: String,
}

/// Where reconciliation registers and removes alarm switches.
pub trait AlarmRegistry: Send + Sync {
    /// Register a batch of new switches.
    fn register(&self, switches: Vec<RegisteredSwitch>);

    /// Remove the switch with this unique id. Returns `true` if it was
    /// registered.
    fn deregister(&self, unique_id: &str) -> bool;
}

/// Concurrent in-memory switch registry.
///
/// Every mutation bumps a version counter and rebuilds the snapshot that
/// subscribers receive.
pub struct SwitchRegistry {
    by_id: DashMap<String, Arc<RegisteredSwitch>>,
    version: watch::Sender<u64>,
    snapshot: watch::Sender<Arc<Vec<Arc<RegisteredSwitch>>>>,
}

impl Default for SwitchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SwitchRegistry {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            by_id: DashMap::new(),
            version,
            snapshot,
        }
    }

    pub fn get(&self, unique_id: &str) -> Option<Arc<RegisteredSwitch>> {
        self.by_id.get(unique_id).map(|r| Arc::clone(r.value()))
    }

    pub fn contains(&self, unique_id: &str) -> bool {
        self.by_id.contains_key(unique_id)
    }

    /// Current switches, sorted by unique id (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<Vec<Arc<RegisteredSwitch>>> {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<RegisteredSwitch>>>> {
        self.snapshot.subscribe()
    }

    /// Number of mutations applied so far.
    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn rebuild_snapshot(&self) {
        let mut values: Vec<Arc<RegisteredSwitch>> =
            self.by_id.iter().map(|r| Arc::clone(r.value())).collect();
        values.sort_by(|a, b| a.unique_id.cmp(&b.unique_id));
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }

    fn bump_version(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}

impl AlarmRegistry for SwitchRegistry {
    fn register(&self, switches: Vec<RegisteredSwitch>) {
        if switches.is_empty() {
            return;
        }
        for switch in switches {
            self.by_id.insert(switch.unique_id.clone(), Arc::new(switch));
        }
        self.rebuild_snapshot();
        self.bump_version();
    }

    fn deregister(&self, unique_id: &str) -> bool {
        let removed = self.by_id.remove(unique_id).is_some();
        if removed {
            self.rebuild_snapshot();
            self.bump_version();
        }
        removed
    }
}
