use alloy_primitives::ChainId;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::{sync::Arc, time::Duration};
use swap_wallets::{
    ConnectOptions, ConnectorError, NetworkProvider, ProviderError, SessionController,
    SessionStatus, WalletConnector, WalletEvent, WalletHandle,
};
use tokio::sync::broadcast;

pub fn init_tracing() {
    let _ = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub async fn wait_for_status(controller: &SessionController, status: SessionStatus) {
    let mut snapshots = controller.watch();
    tokio::time::timeout(Duration::from_secs(5), snapshots.wait_for(|s| s.status == status))
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {status}"))
        .expect("snapshot channel closed");
}

#[derive(Debug)]
pub struct Extension {
    chain_id: Mutex<ChainId>,
}

impl Extension {
    pub fn on_chain(chain_id: ChainId) -> Arc<Self> {
        Arc::new(Self { chain_id: Mutex::new(chain_id) })
    }
}

#[async_trait]
impl NetworkProvider for Extension {
    async fn chain_id(&self) -> Result<ChainId, ProviderError> {
        Ok(*self.chain_id.lock())
    }
}

/// A browser with a set of installed wallet extensions, none connected.
pub struct Browser {
    installed: Vec<WalletHandle>,
    connected: Mutex<Vec<WalletHandle>>,
    events: broadcast::Sender<WalletEvent>,
}

impl Browser {
    pub fn with_wallets(wallets: &[(&str, ChainId)]) -> Arc<Self> {
        let installed = wallets
            .iter()
            .map(|(label, chain_id)| WalletHandle::new(*label, Extension::on_chain(*chain_id)))
            .collect();
        let (events, _) = broadcast::channel(16);
        Arc::new(Self { installed, connected: Mutex::default(), events })
    }
}

#[async_trait]
impl WalletConnector for Browser {
    async fn connect(&self, options: ConnectOptions) -> Result<Option<WalletHandle>, ConnectorError> {
        // the selection flow always picks the first installed wallet
        let handle = match options.auto_select {
            Some(label) => self.installed.iter().find(|w| w.label() == label).cloned(),
            None => self.installed.first().cloned(),
        };
        let Some(handle) = handle else { return Ok(None) };
        self.connected.lock().push(handle.clone());
        let _ = self.events.send(WalletEvent::WalletsChanged);
        Ok(Some(handle))
    }

    async fn disconnect(&self, label: &str) -> Result<(), ConnectorError> {
        self.connected.lock().retain(|w| w.label() != label);
        let _ = self.events.send(WalletEvent::WalletsChanged);
        Ok(())
    }

    fn connected_wallets(&self) -> Vec<WalletHandle> {
        self.connected.lock().clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }
}
