use std::collections::HashMap;

use axum::extract::ws::Message;
use beacon_core::{ConnId, ProtocolError, SignalMessage};
use bytes::Bytes;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::gateway::{GatewayEvent, RoomDirectory};

/// The single owner of all signaling state.
///
/// Runs as one task consuming transport events in arrival order. No two
/// events are ever handled concurrently, so the room directory and the
/// outbound senders need no locking, and a membership mutation can never
/// interleave with a broadcast enumeration.
pub struct Gateway {
    directory: RoomDirectory,
    peers: HashMap<ConnId, mpsc::UnboundedSender<Message>>,
    event_rx: mpsc::Receiver<GatewayEvent>,
}

impl Gateway {
    pub fn new(event_rx: mpsc::Receiver<GatewayEvent>) -> Self {
        Self {
            directory: RoomDirectory::new(),
            peers: HashMap::new(),
            event_rx,
        }
    }

    /// Event loop; finishes once every handle to the event queue is gone.
    pub async fn run(mut self) {
        info!("Gateway event loop started");

        while let Some(event) = self.event_rx.recv().await {
            self.handle_event(event);
        }

        info!("Gateway event loop finished");
    }

    /// Process one transport event to completion.
    ///
    /// Every failure inside is logged and contained here; nothing a single
    /// frame does may close the sender's connection or end the loop. Only a
    /// transport-level disconnect ends a connection's lifecycle.
    pub fn handle_event(&mut self, event: GatewayEvent) {
        match event {
            GatewayEvent::Connected { conn, sender } => {
                info!("client {} connected", conn);
                self.peers.insert(conn, sender);
                self.directory.register(conn);
            }

            GatewayEvent::Frame { conn, data } => {
                if !self.peers.contains_key(&conn) {
                    // Frame raced past a disconnect; tolerated by dropping.
                    debug!("dropping frame from unknown connection {}", conn);
                    return;
                }
                self.handle_frame(conn, &data);
            }

            GatewayEvent::Disconnected { conn } => {
                info!("client {} disconnected", conn);
                self.directory.unregister(conn);
                self.peers.remove(&conn);
            }
        }
    }

    fn handle_frame(&mut self, conn: ConnId, data: &[u8]) {
        match SignalMessage::decode(data) {
            Ok(message) => self.dispatch(conn, message),
            Err(ProtocolError::UnknownType(tag)) => {
                warn!("unknown message type \"{}\" from client {}", tag, conn);
            }
            Err(err) => {
                warn!("dropping bad frame from client {}: {}", conn, err);
            }
        }
    }

    fn dispatch(&mut self, conn: ConnId, message: SignalMessage) {
        match message {
            SignalMessage::Subscribe { topics } => {
                for topic in &topics {
                    self.directory.join(conn, topic);
                }
            }

            SignalMessage::Unsubscribe { topics } => {
                for topic in &topics {
                    self.directory.leave(conn, topic);
                }
            }

            SignalMessage::Publish { topic, data } => self.publish(conn, topic, data),

            SignalMessage::Ping { data } => self.pong(conn, data),

            SignalMessage::Pong { .. } => {
                // Keepalive echo from a client; nothing to do.
                debug!("pong from client {}", conn);
            }
        }
    }

    /// Fan a publish out to every other open member of `topic`.
    fn publish(&mut self, sender: ConnId, topic: String, data: Option<Value>) {
        debug!("publish from client {} to room \"{}\"", sender, topic);

        let Some(members) = self.directory.members(&topic) else {
            warn!("publish to unknown room \"{}\"", topic);
            return;
        };

        let envelope = SignalMessage::Publish { topic, data };
        let Some(frame) = encode(&envelope) else {
            return;
        };

        for member in members {
            if member != sender {
                self.send(member, frame.clone());
            }
        }
    }

    /// Answer a ping with a pong to the sender only.
    fn pong(&mut self, conn: ConnId, data: Option<Value>) {
        debug!("ping from client {}", conn);

        let reply = SignalMessage::Pong { data };
        if let Some(frame) = encode(&reply) {
            self.send(conn, frame);
        }
    }

    /// Hand one frame to a connection's outbound queue. Best effort: a
    /// closed or failing recipient is skipped, never retried, and never
    /// aborts delivery to anyone else.
    fn send(&self, conn: ConnId, frame: Bytes) {
        let Some(tx) = self.peers.get(&conn) else {
            debug!("no transport for client {}", conn);
            return;
        };
        if tx.is_closed() {
            debug!("skipping send to closing client {}", conn);
            return;
        }
        if tx.send(Message::Binary(frame)).is_err() {
            warn!("failed to deliver frame to client {}", conn);
        }
    }
}

fn encode(message: &SignalMessage) -> Option<Bytes> {
    match message.encode() {
        Ok(frame) => Some(frame),
        Err(err) => {
            error!("failed to serialize outbound message: {}", err);
            None
        }
    }
}
