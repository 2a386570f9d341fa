use std::sync::Arc;

use {zaprelay_common::ChatClient, zaprelay_dispatch::Dispatcher};

/// Shared handles cloned into every request handler.
#[derive(Clone)]
pub struct GatewayState {
    pub client: Arc<dyn ChatClient>,
    pub dispatcher: Arc<Dispatcher>,
}

impl GatewayState {
    #[must_use]
    pub fn new(client: Arc<dyn ChatClient>, dispatcher: Arc<Dispatcher>) -> Self {
        Self { client, dispatcher }
    }
}
