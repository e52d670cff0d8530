//! Telemetry store: the single source of truth consumers read from.
//!
//! Writes come only from the connection manager's event loop, so updates are
//! applied in arrival order and listeners see them in that same order.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use chrono::{DateTime, Utc};
use skylink_core::{AlertView, ConnectivityPhase, MissionPhase, TelemetrySnapshot};
use tokio::sync::watch;

/// Everything the store knows at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StoreState {
    /// Latest accepted snapshot, absent until the first valid frame
    pub snapshot: Option<TelemetrySnapshot>,
    /// When `snapshot` was accepted
    pub last_update: Option<DateTime<Utc>>,
    pub connectivity: ConnectivityPhase,
    pub mission: MissionPhase,
    /// Frames dropped as malformed since start
    pub rejected_frames: u64,
    /// Connect attempts made since start
    pub connect_attempts: u64,
}

impl StoreState {
    pub fn alerts(&self) -> AlertView {
        AlertView::derive(self.mission, self.connectivity)
    }

    pub fn signal_lost(&self) -> bool {
        self.alerts().signal_lost
    }
}

type Listener = Arc<dyn Fn(&StoreState) + Send + Sync>;

struct Inner {
    state: StoreState,
    listeners: Vec<(u64, Listener)>,
    next_listener_id: u64,
}

/// Cloneable handle to the shared store.
#[derive(Clone)]
pub struct TelemetryStore {
    inner: Arc<Mutex<Inner>>,
    watch_tx: Arc<watch::Sender<StoreState>>,
}

impl Default for TelemetryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TelemetryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryStore")
            .field("state", &self.state())
            .finish()
    }
}

impl TelemetryStore {
    pub fn new() -> Self {
        let (watch_tx, _) = watch::channel(StoreState::default());
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: StoreState::default(),
                listeners: Vec::new(),
                next_listener_id: 0,
            })),
            watch_tx: Arc::new(watch_tx),
        }
    }

    pub fn snapshot(&self) -> Option<TelemetrySnapshot> {
        self.lock().state.snapshot
    }

    pub fn connectivity(&self) -> ConnectivityPhase {
        self.lock().state.connectivity
    }

    pub fn mission_phase(&self) -> MissionPhase {
        self.lock().state.mission
    }

    pub fn state(&self) -> StoreState {
        self.lock().state
    }

    /// Register a listener called synchronously after every accepted change.
    ///
    /// Listeners run in subscription order. The listener is removed when the
    /// returned [`Subscription`] is dropped or unsubscribed.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&StoreState) + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        let id = inner.next_listener_id;
        inner.next_listener_id += 1;
        inner.listeners.push((id, Arc::new(listener)));
        Subscription {
            store: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Async view of the store; the receiver always holds the latest state.
    pub fn watch(&self) -> watch::Receiver<StoreState> {
        self.watch_tx.subscribe()
    }

    pub(crate) fn apply_snapshot(&self, snapshot: TelemetrySnapshot) {
        self.update(|state| {
            state.snapshot = Some(snapshot);
            state.last_update = Some(Utc::now());
            true
        });
    }

    pub(crate) fn record_rejected_frame(&self) {
        self.update(|state| {
            state.rejected_frames += 1;
            true
        });
    }

    pub(crate) fn record_connect_attempt(&self) {
        self.update(|state| {
            state.connect_attempts += 1;
            true
        });
    }

    pub(crate) fn set_connectivity(&self, connectivity: ConnectivityPhase) {
        self.update(|state| {
            let changed = state.connectivity != connectivity;
            state.connectivity = connectivity;
            changed
        });
    }

    /// One-shot `Lobby -> Active`. Returns false if the mission was already active.
    pub(crate) fn activate_mission(&self) -> bool {
        let mut activated = false;
        self.update(|state| {
            activated = state.mission == MissionPhase::Lobby;
            state.mission = MissionPhase::Active;
            activated
        });
        activated
    }

    fn update(&self, mutate: impl FnOnce(&mut StoreState) -> bool) {
        let (state, listeners) = {
            let mut inner = self.lock();
            if !mutate(&mut inner.state) {
                return;
            }
            let listeners: Vec<Listener> =
                inner.listeners.iter().map(|(_, l)| Arc::clone(l)).collect();
            (inner.state, listeners)
        };

        // Lock released: listeners may read the store.
        for listener in &listeners {
            listener(&state);
        }
        self.watch_tx.send_replace(state);
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle returned by [`TelemetryStore::subscribe`].
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    store: Weak<Mutex<Inner>>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
            inner.listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skylink_core::decode;

    fn frame(lat: f64) -> TelemetrySnapshot {
        decode(&format!(
            r#"{{"latitude":{lat},"longitude":-74.0,"altitude":120,"speed":40,"battery_level":87,"status":"FLYING"}}"#
        ))
        .unwrap()
    }

    #[test]
    fn starts_empty_disconnected_in_lobby() {
        let store = TelemetryStore::new();
        assert!(store.snapshot().is_none());
        assert_eq!(store.connectivity(), ConnectivityPhase::Disconnected);
        assert_eq!(store.mission_phase(), MissionPhase::Lobby);
    }

    #[test]
    fn last_applied_snapshot_wins() {
        let store = TelemetryStore::new();
        for lat in [40.0, 41.0, 39.5] {
            store.apply_snapshot(frame(lat));
        }
        assert_eq!(store.snapshot().unwrap().latitude(), 39.5);
        assert!(store.state().last_update.is_some());
    }

    #[test]
    fn listeners_run_in_subscription_order() {
        let store = TelemetryStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = {
            let seen = seen.clone();
            store.subscribe(move |_| seen.lock().unwrap().push("first"))
        };
        let second = {
            let seen = seen.clone();
            store.subscribe(move |_| seen.lock().unwrap().push("second"))
        };

        store.set_connectivity(ConnectivityPhase::Connecting);
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);

        drop(first);
        store.set_connectivity(ConnectivityPhase::Connected);
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "second"]);
        second.unsubscribe();
    }

    #[test]
    fn unchanged_connectivity_does_not_notify() {
        let store = TelemetryStore::new();
        let calls = Arc::new(Mutex::new(0));
        let _sub = {
            let calls = calls.clone();
            store.subscribe(move |_| *calls.lock().unwrap() += 1)
        };

        store.set_connectivity(ConnectivityPhase::Disconnected);
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn listener_can_read_store() {
        let store = TelemetryStore::new();
        let observed = Arc::new(Mutex::new(None));
        let _sub = {
            let reader = store.clone();
            let observed = observed.clone();
            store.subscribe(move |_| *observed.lock().unwrap() = Some(reader.connectivity()))
        };

        store.set_connectivity(ConnectivityPhase::Connected);
        assert_eq!(*observed.lock().unwrap(), Some(ConnectivityPhase::Connected));
    }

    #[test]
    fn mission_activation_is_one_shot() {
        let store = TelemetryStore::new();
        assert!(store.activate_mission());
        assert!(!store.activate_mission());
        assert_eq!(store.mission_phase(), MissionPhase::Active);
    }

    #[test]
    fn watch_receiver_tracks_latest_state() {
        let store = TelemetryStore::new();
        let rx = store.watch();
        store.apply_snapshot(frame(40.71));
        store.set_connectivity(ConnectivityPhase::Connected);

        let state = *rx.borrow();
        assert_eq!(state.connectivity, ConnectivityPhase::Connected);
        assert_eq!(state.snapshot.unwrap().latitude(), 40.71);
    }
}
