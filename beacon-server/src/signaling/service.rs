use tokio::sync::mpsc;
use tracing::error;

use crate::gateway::{Gateway, GatewayEvent};

/// Cloneable handle the transport layer uses to feed the gateway.
///
/// Spawning the service starts the one task that owns all room state;
/// socket handlers push events into its queue and never touch state
/// directly.
#[derive(Clone)]
pub struct SignalingService {
    events: mpsc::Sender<GatewayEvent>,
}

impl SignalingService {
    /// Spawn the gateway event loop and return the handle used as router
    /// state.
    pub fn spawn() -> Self {
        let (events, event_rx) = mpsc::channel(256);
        let gateway = Gateway::new(event_rx);
        tokio::spawn(gateway.run());

        Self { events }
    }

    pub(crate) async fn emit(&self, event: GatewayEvent) {
        if self.events.send(event).await.is_err() {
            error!("gateway task is gone, dropping transport event");
        }
    }
}
