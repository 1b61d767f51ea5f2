// ── Update coordinator ──
//
// Owns the polling loop for one device. Each cycle fetches the device
// record and the alarm list concurrently and installs the pair as one
// immutable snapshot, or nothing at all. The face catalog and server
// params are fetched once at setup. Writes go through `execute` and are
// followed by an on-demand refresh.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use futures_util::future::{BoxFuture, FutureExt, Shared};
use remi_api::{Event, Face, Remi, RemiClient, ServerConfig, TransportConfig};
use serde_json::{Value, json};
use strum::Display;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::{Command, CommandResult};
use crate::config::CoordinatorConfig;
use crate::error::CoreError;

type SharedPoll = Shared<BoxFuture<'static, Result<(), CoreError>>>;

// ── Observable state ─────────────────────────────────────────────

/// Whether a poll cycle is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PollState {
    Idle,
    Polling,
}

/// Outcome of the most recent poll cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollStatus {
    pub state: PollState,
    /// `false` until a cycle succeeds, and after any failed cycle.
    pub last_update_success: bool,
    pub last_error: Option<String>,
    pub last_success_at: Option<DateTime<Utc>>,
}

impl Default for PollStatus {
    fn default() -> Self {
        Self {
            state: PollState::Idle,
            last_update_success: false,
            last_error: None,
            last_success_at: None,
        }
    }
}

/// Device record and alarm list from the same poll cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub remi: Remi,
    pub events: Vec<Event>,
    pub fetched_at: DateTime<Utc>,
}

// ── Coordinator ──────────────────────────────────────────────────

/// Polling coordinator for a single Remi.
///
/// Cheaply cloneable via `Arc<CoordinatorInner>`. At most one poll runs
/// at a time: concurrent `refresh` calls await the cycle already in
/// flight instead of starting another.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    config: CoordinatorConfig,
    client: RemiClient,
    snapshot: watch::Sender<Option<Arc<Snapshot>>>,
    status: watch::Sender<PollStatus>,
    faces: ArcSwap<Vec<Face>>,
    server_config: ArcSwap<ServerConfig>,
    in_flight: Mutex<Option<SharedPoll>>,
    cancel: CancellationToken,
    task_handles: tokio::sync::Mutex<Vec<JoinHandle<()>>>,
}

impl Coordinator {
    /// Build the API client from configuration. Does NOT touch the
    /// network; call [`start()`](Self::start) to set up and poll.
    ///
    /// A persisted session token and device id are restored onto the
    /// client so no login is needed until the server rejects the token.
    pub fn new(config: CoordinatorConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig::default().with_timeout(config.timeout);
        let client = RemiClient::new(
            config.base_url.clone(),
            config.credentials.clone(),
            &transport,
        )?;

        if let Some(ref remi_id) = config.remi_id {
            client.set_remi_id(remi_id.clone());
        }
        if let (Some(token), Some(remi_id)) = (&config.session_token, &config.remi_id) {
            client.restore_session(token.clone(), remi_id.clone());
        }

        let (snapshot, _) = watch::channel(None);
        let (status, _) = watch::channel(PollStatus::default());

        Ok(Self {
            inner: Arc::new(CoordinatorInner {
                config,
                client,
                snapshot,
                status,
                faces: ArcSwap::from_pointee(Vec::new()),
                server_config: ArcSwap::from_pointee(ServerConfig::default()),
                in_flight: Mutex::new(None),
                cancel: CancellationToken::new(),
                task_handles: tokio::sync::Mutex::new(Vec::new()),
            }),
        })
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    /// The API client (session state, direct endpoint access).
    pub fn client(&self) -> &RemiClient {
        &self.inner.client
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Set up and start polling.
    ///
    /// Logs in first when no device is selected yet, fetches the
    /// semi-static data, runs a first refresh (whose failure is
    /// returned: the device is not ready), then spawns the periodic
    /// refresh task.
    pub async fn start(&self) -> Result<(), CoreError> {
        if self.inner.client.remi_id().is_none() {
            self.inner.client.login().await?;
        }

        self.setup().await;
        self.refresh().await?;

        let interval = self.inner.config.scan_interval;
        if !interval.is_zero() {
            let coordinator = self.clone();
            let cancel = self.inner.cancel.child_token();
            self.inner
                .task_handles
                .lock()
                .await
                .push(tokio::spawn(refresh_task(coordinator, interval, cancel)));
        }

        info!(
            remi_id = self.device_id().as_deref().unwrap_or("<none>"),
            interval_secs = interval.as_secs(),
            "coordinator started"
        );
        Ok(())
    }

    /// Cancel background tasks and wait for them to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("coordinator stopped");
    }

    /// One-shot: start without background polling, run closure, shut down.
    pub async fn oneshot<F, Fut, T>(config: CoordinatorConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Coordinator) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let config = config.with_scan_interval(Duration::ZERO);
        let coordinator = Coordinator::new(config)?;
        coordinator.start().await?;
        let result = f(coordinator.clone()).await;
        coordinator.shutdown().await;
        result
    }

    /// A token cancelled on shutdown, for tasks tied to this coordinator.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.inner.cancel.child_token()
    }

    /// Fetch the face catalog and server config.
    ///
    /// Failures are logged and leave the caches at their empty defaults:
    /// the features they gate (face catalog listing, firmware-update
    /// detection) degrade, polling does not.
    pub async fn setup(&self) {
        let client = &self.inner.client;
        let (faces, server_config) = tokio::join!(client.get_faces(), client.get_config());

        match faces {
            Ok(faces) => {
                debug!(count = faces.len(), "face catalog loaded");
                self.inner.faces.store(Arc::new(faces));
            }
            Err(e) => warn!(error = %e, "could not fetch face catalog"),
        }

        match server_config {
            Ok(server_config) => {
                debug!(
                    latest_firmware = ?server_config.latest_firmware_version(),
                    "server config loaded"
                );
                self.inner.server_config.store(Arc::new(server_config));
            }
            Err(e) => warn!(error = %e, "could not fetch server config"),
        }
    }

    // ── Polling ──────────────────────────────────────────────────

    /// Run a poll cycle, or join the one already in flight, and return
    /// its result.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        let poll = {
            let mut slot = self.inner.in_flight.lock().expect("poll lock poisoned");
            if let Some(poll) = slot.as_ref() {
                debug!("joining in-flight poll");
                poll.clone()
            } else {
                let coordinator = self.clone();
                let poll = async move {
                    let result = coordinator.poll_cycle().await;
                    *coordinator
                        .inner
                        .in_flight
                        .lock()
                        .expect("poll lock poisoned") = None;
                    result
                }
                .boxed()
                .shared();
                *slot = Some(poll.clone());
                poll
            }
        };
        poll.await
    }

    /// Request an out-of-cycle refresh. Never fails; the outcome is
    /// visible through [`status()`](Self::status).
    pub async fn request_refresh(&self) {
        if let Err(e) = self.refresh().await {
            debug!(error = %e, "requested refresh failed");
        }
    }

    /// One poll cycle: device record and alarms, concurrently. Only a
    /// fully successful pair replaces the snapshot.
    async fn poll_cycle(&self) -> Result<(), CoreError> {
        self.inner
            .status
            .send_modify(|s| s.state = PollState::Polling);

        let client = &self.inner.client;
        let (remi, events) = tokio::join!(client.get_remi(), client.get_events());

        let result = match (remi, events) {
            (Ok(remi), Ok(events)) => {
                debug!(events = events.len(), "poll cycle complete");
                let snapshot = Snapshot {
                    remi,
                    events,
                    fetched_at: Utc::now(),
                };
                let fetched_at = snapshot.fetched_at;
                self.inner.snapshot.send_replace(Some(Arc::new(snapshot)));
                Ok(fetched_at)
            }
            (Err(e), _) | (_, Err(e)) => Err(CoreError::from(e)),
        };

        match result {
            Ok(fetched_at) => {
                self.inner.status.send_modify(|s| {
                    s.state = PollState::Idle;
                    s.last_update_success = true;
                    s.last_error = None;
                    s.last_success_at = Some(fetched_at);
                });
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "error communicating with Remi API");
                self.inner.status.send_modify(|s| {
                    s.state = PollState::Idle;
                    s.last_update_success = false;
                    s.last_error = Some(e.to_string());
                });
                Err(e)
            }
        }
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to snapshot changes. Fires only on successful cycles.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.inner.snapshot.subscribe()
    }

    /// Subscribe to poll status changes.
    pub fn status(&self) -> watch::Receiver<PollStatus> {
        self.inner.status.subscribe()
    }

    // ── Snapshot accessors ───────────────────────────────────────

    /// The latest snapshot, if any cycle has succeeded.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.inner.snapshot.borrow().clone()
    }

    /// Current device record, or an empty one before the first success.
    pub fn remi(&self) -> Remi {
        self.snapshot().map(|s| s.remi.clone()).unwrap_or_default()
    }

    /// Current alarm list, or empty before the first success.
    pub fn events(&self) -> Vec<Event> {
        self.snapshot().map(|s| s.events.clone()).unwrap_or_default()
    }

    /// Latest firmware advertised by the server, when known.
    pub fn latest_firmware_version(&self) -> Option<i64> {
        self.inner.server_config.load().latest_firmware_version()
    }

    /// Face catalog fetched at setup (empty if that fetch failed).
    pub fn faces(&self) -> Arc<Vec<Face>> {
        self.inner.faces.load_full()
    }

    /// Server params fetched at setup (empty if that fetch failed).
    pub fn server_config(&self) -> Arc<ServerConfig> {
        self.inner.server_config.load_full()
    }

    /// The device being polled.
    pub fn device_id(&self) -> Option<String> {
        self.inner.client.remi_id()
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a write, then refresh so the change is picked up.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        let result = route_command(self, cmd).await?;
        self.request_refresh().await;
        Ok(result)
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Poll on a fixed interval until cancelled.
async fn refresh_task(coordinator: Coordinator, interval: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = coordinator.refresh().await {
                    debug!(error = %e, "periodic refresh failed");
                }
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────

async fn route_command(
    coordinator: &Coordinator,
    cmd: Command,
) -> Result<CommandResult, CoreError> {
    let client = coordinator.client();

    match cmd {
        // ── Device settings ──────────────────────────────────────

        Command::SetNumber { setting, value } => {
            if value > crate::model::NumberSetting::MAX {
                return Err(CoreError::validation(format!(
                    "{} must be between 0 and 100, got {value}",
                    setting.label()
                )));
            }
            update_device(client, setting.field(), json!(value)).await
        }

        Command::SetFace { face } => update_device(client, "face", json!(face.pointer())).await,

        Command::SetClockFormat { format } => {
            update_device(client, "hourFormat24", json!(format.is_24h())).await
        }

        Command::SetMusicMode { mode } => {
            update_device(client, "musicMode", json!(mode.code())).await
        }

        // ── Lights ───────────────────────────────────────────────

        Command::LightOn { channel, rgb } => {
            let color = channel.turn_on_color(&coordinator.remi(), rgb);
            update_device(client, channel.field(), json!(color)).await
        }

        Command::LightOff { channel } => {
            update_device(client, channel.field(), json!(crate::model::setting::BLACK)).await
        }

        // ── Alarms ───────────────────────────────────────────────

        Command::SetAlarmEnabled { event_id, enabled } => {
            client
                .update_event(&event_id, &json!({ "enabled": enabled }))
                .await?;
            Ok(CommandResult::Ok)
        }

        Command::CreateAlarm(req) => {
            let fields = req.into_fields()?;
            let created = client.create_event(fields).await?;
            info!(event_id = %created.object_id, "alarm created");
            Ok(CommandResult::Created {
                id: created.object_id,
            })
        }

        Command::UpdateAlarm { event_id, update } => {
            if update.is_empty() {
                return Err(CoreError::validation("nothing to update"));
            }
            let fields = update.into_fields()?;
            client.update_event(&event_id, &Value::Object(fields)).await?;
            Ok(CommandResult::Ok)
        }

        Command::DeleteAlarm { event_id } => {
            client.delete_event(&event_id).await?;
            info!(%event_id, "alarm deleted");
            Ok(CommandResult::Ok)
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────

async fn update_device(
    client: &RemiClient,
    field: &str,
    value: Value,
) -> Result<CommandResult, CoreError> {
    let mut fields = serde_json::Map::new();
    fields.insert(field.to_owned(), value);
    client.update_remi(&Value::Object(fields)).await?;
    Ok(CommandResult::Ok)
}
