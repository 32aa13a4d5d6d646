//! What the presentation layer needs to render the connect button and the swap widget.

use crate::connector::NetworkProvider;
use alloy_primitives::Address;
use std::{fmt, sync::Arc};

/// Props for the embedded swap widget.
///
/// The widget discovers tokens on its own, so `token_list` is always empty.
#[derive(Clone, Debug)]
pub struct WidgetProps {
    /// Client identifier reported to the widget's backend.
    pub client: String,
    /// Provider of the active wallet, if any.
    pub provider: Option<Arc<dyn NetworkProvider>>,
    pub token_list: Vec<Address>,
    /// Token pre-selected on the "buy" side. `None` for chains without a default.
    pub default_token_out: Option<Address>,
}

impl WidgetProps {
    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }
}

/// What the single connect button does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectAction {
    Connect,
    Disconnect,
}

impl ConnectAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::Connect => "Connect Wallet",
            Self::Disconnect => "Disconnect",
        }
    }
}

impl fmt::Display for ConnectAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
