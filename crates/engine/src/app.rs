//! Application state and composition.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::infrastructure::config::AppConfig;
use crate::infrastructure::outbound::ChannelSink;
use crate::stores::StateStore;
use crate::use_cases::ExecuteCommand;

/// Main application state.
///
/// Owns the one [`StateStore`] of the process. The transport and the REPL
/// both receive it from here.
pub struct App {
    pub store: Arc<StateStore>,
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub commands: ExecuteCommand,
}

impl App {
    /// Builds the store around a bounded outbound queue and returns the
    /// queue's receiving end for the transport.
    pub fn new(config: &AppConfig) -> (Self, mpsc::Receiver<Bytes>) {
        let (sink, outbound) = ChannelSink::channel(config.outbound_queue);
        let store = Arc::new(StateStore::new(
            Arc::new(sink),
            config.names.clone(),
            config.store_policy,
        ));

        let use_cases = UseCases {
            commands: ExecuteCommand::new(store.clone()),
        };

        (Self { store, use_cases }, outbound)
    }
}
