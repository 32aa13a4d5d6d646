//! The wallet session controller.
//!
//! [`SessionController`] is the single source of truth for which wallet is connected, which chain
//! it is on, and what the swap widget should be handed. It is constructed once, shared as an
//! [`Arc`], and driven by three inputs:
//!
//! - explicit [`connect`](SessionController::connect) /
//!   [`disconnect`](SessionController::disconnect) calls from the presentation layer,
//! - [`WalletEvent`]s pushed by the wallet-connection library,
//! - chain id queries it issues itself whenever a wallet becomes active.
//!
//! Chain id queries run as detached tasks. Every activation bumps an epoch and a query result is
//! only applied if its epoch is still current, so the most recently issued query always wins.

use crate::{
    connector::{ConnectOptions, WalletConnector, WalletEvent, WalletHandle},
    error::{ProviderError, SessionError},
    registry::ChainRegistry,
    storage::{KeyValueStore, LabelStore},
    widget::WidgetProps,
};
use alloy_chains::Chain;
use alloy_primitives::{Address, ChainId};
use parking_lot::Mutex;
use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};
use swap_config::{NetworkConfig, SwapConfig, WalletLibraryOptions};
use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
};

mod snapshot;
pub use snapshot::{SessionSnapshot, SessionStatus};

/// A callback invoked with every new [`SessionSnapshot`].
pub type Listener = Arc<dyn Fn(&SessionSnapshot) + Send + Sync>;

/// Identifies a listener registered with [`SessionController::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(SubscriptionId, Listener)>,
}

#[derive(Debug)]
struct ActiveWallet {
    handle: WalletHandle,
    /// The epoch the wallet was activated in.
    epoch: u64,
}

#[derive(Debug)]
struct SessionState {
    status: SessionStatus,
    chain_id: ChainId,
    active: Option<ActiveWallet>,
    /// Bumped on every activation and deactivation.
    epoch: u64,
    /// The labels most recently persisted.
    last_written: Option<Vec<String>>,
}

impl SessionState {
    fn active_epoch(&self) -> Option<u64> {
        self.active.as_ref().map(|active| active.epoch)
    }

    fn active_label(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.handle.label())
    }
}

/// What a change of the connected wallet set means for the session.
enum Transition {
    /// No wallet is active and none is connected.
    Idle,
    /// The active wallet is still connected.
    Keep,
    /// The active wallet is gone, continue with this one.
    Activate(WalletHandle),
    /// No wallet is left.
    Deactivate,
}

/// Builder for a [`SessionController`].
pub struct SessionControllerBuilder {
    connector: Arc<dyn WalletConnector>,
    store: Arc<dyn KeyValueStore>,
    storage_key: String,
    registry: ChainRegistry,
    default_chain_id: ChainId,
    library: WalletLibraryOptions,
    widget_client: String,
}

impl SessionControllerBuilder {
    fn new(connector: Arc<dyn WalletConnector>, store: Arc<dyn KeyValueStore>) -> Self {
        let config = SwapConfig::default();
        let library = config.wallet_library_options();
        Self {
            connector,
            store,
            storage_key: config.storage_key,
            registry: ChainRegistry::default(),
            default_chain_id: config.default_chain_id,
            library,
            widget_client: config.widget_client,
        }
    }

    /// Applies all session settings of `config`.
    pub fn config(mut self, config: &SwapConfig) -> Self {
        self.storage_key = config.storage_key.clone();
        self.registry = ChainRegistry::from_config(config);
        self.default_chain_id = config.default_chain_id;
        self.library = config.wallet_library_options();
        self.widget_client = config.widget_client.clone();
        self
    }

    pub fn registry(mut self, registry: ChainRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Sets the chain id reported before any provider resolved its network.
    pub fn default_chain_id(mut self, chain_id: ChainId) -> Self {
        self.default_chain_id = chain_id;
        self
    }

    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Sets the networks used to name chain ids in snapshots.
    pub fn networks(mut self, networks: Vec<NetworkConfig>) -> Self {
        self.library.chains = networks;
        self
    }

    pub fn widget_client(mut self, client: impl Into<String>) -> Self {
        self.widget_client = client.into();
        self
    }

    pub fn build(self) -> Arc<SessionController> {
        let Self {
            connector,
            store,
            storage_key,
            registry,
            default_chain_id,
            library,
            widget_client,
        } = self;

        let state = SessionState {
            status: SessionStatus::Disconnected,
            chain_id: default_chain_id,
            active: None,
            epoch: 0,
            last_written: None,
        };
        let initial = SessionSnapshot {
            status: SessionStatus::Disconnected,
            chain_id: default_chain_id,
            network: None,
            active_wallet: None,
            wallets: Vec::new(),
            default_token_out: None,
        };
        let (snapshots, _) = watch::channel(initial);

        let controller = Arc::new(SessionController {
            connector,
            labels: LabelStore::with_key(store, storage_key),
            registry,
            default_chain_id,
            library,
            widget_client,
            state: Mutex::new(state),
            listeners: Mutex::new(Listeners::default()),
            snapshots,
            tasks: Mutex::new(Vec::new()),
            initialized: AtomicBool::new(false),
        });
        controller.snapshots.send_replace(controller.snapshot());
        controller
    }
}

/// Owns the wallet session: active wallet, chain id, persistence and subscribers.
pub struct SessionController {
    connector: Arc<dyn WalletConnector>,
    labels: LabelStore,
    registry: ChainRegistry,
    default_chain_id: ChainId,
    library: WalletLibraryOptions,
    widget_client: String,
    state: Mutex<SessionState>,
    listeners: Mutex<Listeners>,
    snapshots: watch::Sender<SessionSnapshot>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    initialized: AtomicBool,
}

impl SessionController {
    /// Returns a builder with the default configuration.
    pub fn builder(
        connector: Arc<dyn WalletConnector>,
        store: Arc<dyn KeyValueStore>,
    ) -> SessionControllerBuilder {
        SessionControllerBuilder::new(connector, store)
    }

    /// Creates a controller configured from `config`.
    pub fn from_config(
        config: &SwapConfig,
        connector: Arc<dyn WalletConnector>,
        store: Arc<dyn KeyValueStore>,
    ) -> Arc<Self> {
        Self::builder(connector, store).config(config).build()
    }

    /// Starts the session.
    ///
    /// Subscribes to wallet library events and, if a wallet was connected in a previous session,
    /// tries to silently reconnect the first one remembered. Neither is awaited: this returns
    /// immediately and a failed reconnect leaves the session disconnected.
    ///
    /// Must be called from within a tokio runtime. Calling it twice has no effect.
    pub fn init(self: &Arc<Self>) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            warn!("session controller is already initialized");
            return;
        }

        let mut events = self.connector.subscribe();
        let weak = Arc::downgrade(self);
        self.track(tokio::spawn(async move {
            loop {
                let event = match events.recv().await {
                    Ok(event) => Some(event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "missed wallet events, resyncing");
                        None
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                let Some(this) = weak.upgrade() else { break };
                match event {
                    Some(event) => this.handle_event(event),
                    None => this.sync_wallets(),
                }
            }
            trace!("wallet event stream closed");
        }));

        let Some(label) = self.labels.load().into_iter().next() else {
            debug!("no previously connected wallet to restore");
            return;
        };

        let issued_at = self.state.lock().epoch;
        let this = Arc::clone(self);
        self.track(tokio::spawn(async move {
            debug!(%label, "restoring previously connected wallet");
            let options = ConnectOptions::auto_select(label.clone());
            match this.connect_with(options, Some(issued_at)).await {
                Ok(Some(_)) => debug!(%label, "restored previously connected wallet"),
                Ok(None) => debug!(%label, "previously connected wallet is unavailable"),
                Err(err) => debug!(%label, %err, "failed to restore previously connected wallet"),
            }
        }));
    }

    /// Stops all background work and drops every listener.
    pub fn teardown(&self) {
        let tasks = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            task.abort();
        }
        self.listeners.lock().entries.clear();
        self.initialized.store(false, Ordering::SeqCst);
        debug!("session controller torn down");
    }

    /// Connects a wallet through the wallet-connection library.
    ///
    /// Opens the library's selection flow, or silently reconnects `options.auto_select`. Returns
    /// `Ok(None)` if the user cancelled or the requested wallet is unavailable; the session is
    /// left as it was.
    pub async fn connect(
        self: &Arc<Self>,
        options: ConnectOptions,
    ) -> Result<Option<WalletHandle>, SessionError> {
        self.connect_with(options, None).await
    }

    /// Connects a wallet. If `issued_at` is set and the session changed since that epoch, the
    /// result does not replace the active wallet.
    async fn connect_with(
        self: &Arc<Self>,
        options: ConnectOptions,
        issued_at: Option<u64>,
    ) -> Result<Option<WalletHandle>, SessionError> {
        let requested = options.auto_select.clone();
        let Some(handle) = self.connector.connect(options).await? else {
            debug!(?requested, "no wallet connected");
            return Ok(None);
        };

        let (epoch, already_active) = {
            let state = self.state.lock();
            (state.epoch, state.active_label() == Some(handle.label()))
        };
        if issued_at.is_some_and(|issued_at| issued_at != epoch) {
            debug!(label = %handle.label(), "session changed while connecting, not switching wallets");
            self.sync_wallets();
        } else if already_active {
            trace!(label = %handle.label(), "wallet is already active");
        } else {
            self.activate(handle.clone());
        }
        Ok(Some(handle))
    }

    /// Disconnects `handle` through the wallet-connection library.
    ///
    /// Disconnecting a wallet that is not connected is a no-op.
    pub async fn disconnect(self: &Arc<Self>, handle: &WalletHandle) -> Result<(), SessionError> {
        let label = handle.label();
        let connected = self.connector.connected_wallets().iter().any(|w| w.label() == label);
        if !connected {
            trace!(%label, "wallet is not connected");
            return Ok(());
        }
        self.connector.disconnect(label).await?;
        debug!(%label, "wallet disconnected");
        self.sync_wallets();
        Ok(())
    }

    /// Disconnects the active wallet if there is one, otherwise opens the selection flow.
    ///
    /// Returns the newly connected wallet, if any.
    pub async fn toggle(self: &Arc<Self>) -> Result<Option<WalletHandle>, SessionError> {
        match self.active_wallet() {
            Some(handle) => {
                self.disconnect(&handle).await?;
                Ok(None)
            }
            None => self.connect(ConnectOptions::default()).await,
        }
    }

    /// Returns the last resolved chain id, or the default chain id if none was resolved yet.
    ///
    /// While [`Connecting`](SessionStatus::Connecting) this is the previous value.
    pub fn current_chain_id(&self) -> ChainId {
        self.state.lock().chain_id
    }

    /// Returns the default output token for [`current_chain_id`](Self::current_chain_id).
    pub fn default_output_token(&self) -> Option<Address> {
        self.registry.lookup(self.current_chain_id())
    }

    pub fn status(&self) -> SessionStatus {
        self.state.lock().status
    }

    /// Returns the wallet whose provider is handed to the widget.
    pub fn active_wallet(&self) -> Option<WalletHandle> {
        self.state.lock().active.as_ref().map(|active| active.handle.clone())
    }

    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    /// Returns the current state of the session.
    pub fn snapshot(&self) -> SessionSnapshot {
        let wallets = self.live_labels();
        let state = self.state.lock();
        SessionSnapshot {
            status: state.status,
            chain_id: state.chain_id,
            network: self.network_name(state.chain_id),
            active_wallet: state.active_label().map(ToString::to_string),
            wallets,
            default_token_out: self.registry.lookup(state.chain_id),
        }
    }

    /// Returns the props the embedded swap widget is rendered with.
    pub fn widget_props(&self) -> WidgetProps {
        let state = self.state.lock();
        WidgetProps {
            client: self.widget_client.clone(),
            provider: state.active.as_ref().map(|active| Arc::clone(active.handle.provider())),
            token_list: Vec::new(),
            default_token_out: self.registry.lookup(state.chain_id),
        }
    }

    /// Registers `listener` to be called with a snapshot after every change to the session.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&SessionSnapshot) + Send + Sync + 'static,
    {
        let mut listeners = self.listeners.lock();
        let id = SubscriptionId(listeners.next_id);
        listeners.next_id += 1;
        listeners.entries.push((id, Arc::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.entries.len();
        listeners.entries.retain(|(entry, _)| *entry != id);
        listeners.entries.len() != before
    }

    /// Returns a receiver that always holds the latest snapshot.
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.subscribe()
    }

    fn handle_event(self: &Arc<Self>, event: WalletEvent) {
        trace!(?event, "wallet event");
        match event {
            WalletEvent::WalletsChanged => self.sync_wallets(),
            WalletEvent::NetworkChanged { label } => {
                let active = self
                    .state
                    .lock()
                    .active
                    .as_ref()
                    .filter(|active| active.handle.label() == label)
                    .map(|active| active.handle.clone());
                match active {
                    Some(handle) => {
                        debug!(%label, "active wallet switched networks");
                        self.activate(handle);
                    }
                    None => trace!(%label, "ignoring network change of an inactive wallet"),
                }
            }
        }
    }

    /// Reconciles the session with the live set of connected wallets.
    fn sync_wallets(self: &Arc<Self>) {
        let wallets = self.connector.connected_wallets();
        let transition = {
            let state = self.state.lock();
            match state.active_label() {
                Some(label) if wallets.iter().any(|w| w.label() == label) => Transition::Keep,
                active => match wallets.first() {
                    Some(wallet) => Transition::Activate(wallet.clone()),
                    None if active.is_some() => Transition::Deactivate,
                    None => Transition::Idle,
                },
            }
        };
        match transition {
            // no wallet is live, the remembered labels stay as they are
            Transition::Idle => self.notify(),
            Transition::Keep => {
                self.write_labels(false);
                self.notify();
            }
            Transition::Activate(wallet) => {
                self.write_labels(false);
                self.activate(wallet);
            }
            Transition::Deactivate => self.deactivate(),
        }
    }

    /// Makes `handle` the active wallet and resolves its chain id in the background.
    fn activate(self: &Arc<Self>, handle: WalletHandle) {
        let epoch = {
            let mut state = self.state.lock();
            state.epoch += 1;
            state.active = Some(ActiveWallet { handle: handle.clone(), epoch: state.epoch });
            state.status = SessionStatus::Connecting;
            state.epoch
        };
        debug!(label = %handle.label(), epoch, "wallet active, resolving chain id");
        self.notify();

        let this = Arc::clone(self);
        self.track(tokio::spawn(async move {
            let result = handle.provider().chain_id().await;
            this.apply_chain_id(epoch, handle.label(), result);
        }));
    }

    fn apply_chain_id(&self, epoch: u64, label: &str, result: Result<ChainId, ProviderError>) {
        let chain_id = match result {
            Ok(chain_id) => chain_id,
            Err(err) => {
                warn!(%label, %err, "failed to resolve chain id");
                return;
            }
        };
        {
            let mut state = self.state.lock();
            if state.active_epoch() != Some(epoch) {
                debug!(%label, chain_id, epoch, current = state.epoch, "discarding stale chain id");
                return;
            }
            state.chain_id = chain_id;
            state.status = SessionStatus::Connected(chain_id);
        }
        debug!(
            %label,
            chain_id,
            network = self.network_name(chain_id).as_deref().unwrap_or("unknown"),
            "wallet connected"
        );
        self.write_labels(true);
        self.notify();
    }

    fn deactivate(&self) {
        {
            let mut state = self.state.lock();
            state.epoch += 1;
            state.active = None;
            state.status = SessionStatus::Disconnected;
            state.chain_id = self.default_chain_id;
        }
        debug!("session disconnected");
        self.write_labels(true);
        self.notify();
    }

    /// Persists the live wallet labels.
    ///
    /// Unless `force` is set, nothing is written if the labels equal the last written ones.
    fn write_labels(&self, force: bool) {
        let labels = self.live_labels();
        if !force && self.state.lock().last_written.as_ref() == Some(&labels) {
            return;
        }
        match self.labels.save(&labels) {
            Ok(()) => self.state.lock().last_written = Some(labels),
            Err(err) => warn!(%err, key = %self.labels.key(), "failed to persist connected wallets"),
        }
    }

    /// Publishes the current snapshot if it differs from the last published one.
    ///
    /// The snapshot is taken while the channel is locked, so concurrent publishers can't
    /// overwrite a newer snapshot with an older one.
    fn notify(&self) {
        let mut published = None;
        self.snapshots.send_if_modified(|current| {
            let snapshot = self.snapshot();
            if *current == snapshot {
                return false;
            }
            *current = snapshot.clone();
            published = Some(snapshot);
            true
        });
        let Some(snapshot) = published else { return };
        let listeners: Vec<Listener> =
            self.listeners.lock().entries.iter().map(|(_, listener)| Arc::clone(listener)).collect();
        for listener in listeners {
            listener(&snapshot);
        }
    }

    fn live_labels(&self) -> Vec<String> {
        self.connector.connected_wallets().iter().map(|w| w.label().to_string()).collect()
    }

    fn network_name(&self, chain_id: ChainId) -> Option<String> {
        self.library
            .network(chain_id)
            .map(|network| network.label.clone())
            .or_else(|| Chain::from_id(chain_id).named().map(|named| named.to_string()))
    }

    fn track(&self, task: JoinHandle<()>) {
        let mut tasks = self.tasks.lock();
        tasks.retain(|task| !task.is_finished());
        tasks.push(task);
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        for task in self.tasks.get_mut().drain(..) {
            task.abort();
        }
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SessionController")
            .field("status", &state.status)
            .field("chain_id", &state.chain_id)
            .field("active", &state.active_label())
            .field("epoch", &state.epoch)
            .finish_non_exhaustive()
    }
}
