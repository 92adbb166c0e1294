use axum::extract::ws::Message;
use beacon_core::ConnId;
use bytes::Bytes;
use tokio::sync::mpsc;

/// Events the transport layer feeds into the gateway queue.
#[derive(Debug)]
pub enum GatewayEvent {
    /// A socket finished upgrading; `sender` is the connection's outbound queue.
    Connected {
        conn: ConnId,
        sender: mpsc::UnboundedSender<Message>,
    },

    /// One inbound binary frame from an established connection.
    Frame { conn: ConnId, data: Bytes },

    /// The transport observed a close or error on the socket.
    Disconnected { conn: ConnId },
}
