//! A scripted wallet library for tests.

use crate::{
    SessionController, SessionStatus,
    connector::{ConnectOptions, NetworkProvider, WalletConnector, WalletEvent, WalletHandle},
    error::{ConnectorError, ProviderError, StorageError},
    storage::{KeyValueStore, MemoryStore},
};
use alloy_primitives::ChainId;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::sync::{Notify, broadcast};

pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Gives spawned tasks a chance to run to completion.
pub(crate) async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

/// Waits until the controller reaches `status`.
pub(crate) async fn wait_for_status(controller: &SessionController, status: SessionStatus) {
    let mut snapshots = controller.watch();
    tokio::time::timeout(Duration::from_secs(5), snapshots.wait_for(|s| s.status == status))
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {status}"))
        .expect("snapshot channel closed");
}

/// A provider reporting a configurable chain id, optionally holding every query until released.
#[derive(Debug)]
pub(crate) struct MockProvider {
    chain_id: Mutex<Option<ChainId>>,
    gate: Option<Arc<Notify>>,
}

impl MockProvider {
    pub(crate) fn on_chain(chain_id: ChainId) -> Arc<Self> {
        Arc::new(Self { chain_id: Mutex::new(Some(chain_id)), gate: None })
    }

    /// A provider whose queries wait for one `notify_one` on the returned gate each.
    pub(crate) fn gated(chain_id: ChainId) -> (Arc<Self>, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let provider =
            Arc::new(Self { chain_id: Mutex::new(Some(chain_id)), gate: Some(gate.clone()) });
        (provider, gate)
    }

    /// A provider whose queries always fail.
    pub(crate) fn failing() -> Arc<Self> {
        Arc::new(Self { chain_id: Mutex::new(None), gate: None })
    }

    pub(crate) fn switch_chain(&self, chain_id: ChainId) {
        *self.chain_id.lock() = Some(chain_id);
    }
}

#[async_trait]
impl NetworkProvider for MockProvider {
    async fn chain_id(&self) -> Result<ChainId, ProviderError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let chain_id = *self.chain_id.lock();
        chain_id.ok_or(ProviderError::Disconnected)
    }
}

/// An in-memory wallet library.
pub(crate) struct MockConnector {
    available: Mutex<Vec<WalletHandle>>,
    connected: Mutex<Vec<WalletHandle>>,
    /// The wallet the user picks in the selection flow, `None` to cancel.
    selection: Mutex<Option<String>>,
    fail_connect: AtomicBool,
    connect_calls: Mutex<Vec<ConnectOptions>>,
    disconnect_calls: Mutex<Vec<String>>,
    events: broadcast::Sender<WalletEvent>,
}

impl MockConnector {
    pub(crate) fn new() -> Arc<Self> {
        Self::with_capacity(16)
    }

    /// A connector buffering at most `capacity` undelivered events per subscriber.
    pub(crate) fn with_capacity(capacity: usize) -> Arc<Self> {
        let (events, _) = broadcast::channel(capacity);
        Arc::new(Self {
            available: Mutex::default(),
            connected: Mutex::default(),
            selection: Mutex::default(),
            fail_connect: AtomicBool::new(false),
            connect_calls: Mutex::default(),
            disconnect_calls: Mutex::default(),
            events,
        })
    }

    /// Makes a wallet available for connection.
    pub(crate) fn add_wallet(&self, label: &str, provider: Arc<MockProvider>) -> WalletHandle {
        let handle = WalletHandle::new(label, provider);
        self.available.lock().push(handle.clone());
        handle
    }

    pub(crate) fn select(&self, label: Option<&str>) {
        *self.selection.lock() = label.map(ToString::to_string);
    }

    pub(crate) fn fail_connect(&self) {
        self.fail_connect.store(true, Ordering::SeqCst);
    }

    /// Simulates the user disconnecting a wallet from the wallet itself.
    pub(crate) fn remove_externally(&self, label: &str) {
        self.connected.lock().retain(|w| w.label() != label);
        self.emit(WalletEvent::WalletsChanged);
    }

    /// Simulates the wallet's provider switching networks.
    pub(crate) fn switch_network(&self, label: &str) {
        self.emit(WalletEvent::NetworkChanged { label: label.to_string() });
    }

    pub(crate) fn connect_calls(&self) -> Vec<ConnectOptions> {
        self.connect_calls.lock().clone()
    }

    pub(crate) fn disconnect_calls(&self) -> Vec<String> {
        self.disconnect_calls.lock().clone()
    }

    fn emit(&self, event: WalletEvent) {
        // no receivers before the controller is initialized
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl WalletConnector for MockConnector {
    async fn connect(&self, options: ConnectOptions) -> Result<Option<WalletHandle>, ConnectorError> {
        self.connect_calls.lock().push(options.clone());
        let label = options.auto_select.or_else(|| self.selection.lock().clone());
        if self.fail_connect.load(Ordering::SeqCst) {
            return Err(ConnectorError::Rejected {
                label: label.unwrap_or_default(),
                reason: "permission revoked".to_string(),
            });
        }
        let Some(label) = label else { return Ok(None) };
        let Some(handle) = self.available.lock().iter().find(|w| w.label() == label).cloned()
        else {
            return Ok(None);
        };
        {
            let mut connected = self.connected.lock();
            if !connected.iter().any(|w| w.label() == label) {
                connected.push(handle.clone());
            }
        }
        self.emit(WalletEvent::WalletsChanged);
        Ok(Some(handle))
    }

    async fn disconnect(&self, label: &str) -> Result<(), ConnectorError> {
        self.disconnect_calls.lock().push(label.to_string());
        self.connected.lock().retain(|w| w.label() != label);
        self.emit(WalletEvent::WalletsChanged);
        Ok(())
    }

    fn connected_wallets(&self) -> Vec<WalletHandle> {
        self.connected.lock().clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }
}

/// Memory storage that records every write.
#[derive(Debug, Default)]
pub(crate) struct RecordingStore {
    inner: MemoryStore,
    writes: Mutex<Vec<String>>,
}

impl RecordingStore {
    pub(crate) fn seeded(key: &str, value: &str) -> Arc<Self> {
        Arc::new(Self { inner: MemoryStore::with_entries([(key, value)]), writes: Mutex::default() })
    }

    /// Every value written so far, oldest first.
    pub(crate) fn writes(&self) -> Vec<String> {
        self.writes.lock().clone()
    }
}

impl KeyValueStore for RecordingStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.writes.lock().push(value.to_string());
        self.inner.set(key, value)
    }
}
