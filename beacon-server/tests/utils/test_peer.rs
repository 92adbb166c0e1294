use std::time::Duration;

use anyhow::{Context, Result, bail};
use axum::extract::ws::Message;
use beacon_core::ConnId;
use bytes::Bytes;
use serde_json::{Value, json};
use tokio::sync::mpsc;

use beacon_server::GatewayEvent;

/// A fake connected client: pushes frames into the gateway queue the way the
/// socket task would, and captures everything the gateway sends back.
pub struct TestPeer {
    /// The connection id this peer was registered under.
    pub conn: ConnId,
    events: mpsc::Sender<GatewayEvent>,
    outbound: mpsc::UnboundedReceiver<Message>,
}

impl TestPeer {
    /// Register a new connection with the gateway.
    pub async fn connect(events: &mpsc::Sender<GatewayEvent>) -> Self {
        let conn = ConnId::new();
        let (tx, rx) = mpsc::unbounded_channel();

        events
            .send(GatewayEvent::Connected { conn, sender: tx })
            .await
            .expect("gateway is not running");

        Self {
            conn,
            events: events.clone(),
            outbound: rx,
        }
    }

    /// Push one raw binary frame at the gateway.
    pub async fn send_frame(&self, frame: impl Into<Bytes>) {
        self.events
            .send(GatewayEvent::Frame {
                conn: self.conn,
                data: frame.into(),
            })
            .await
            .expect("gateway is not running");
    }

    pub async fn send_json(&self, value: Value) {
        let frame = serde_json::to_vec(&value).expect("serializable test frame");
        self.send_frame(frame).await;
    }

    pub async fn subscribe(&self, topics: &[&str]) {
        self.send_json(json!({"type": "subscribe", "topics": topics}))
            .await;
    }

    pub async fn unsubscribe(&self, topics: &[&str]) {
        self.send_json(json!({"type": "unsubscribe", "topics": topics}))
            .await;
    }

    pub async fn publish(&self, topic: &str, data: Value) {
        self.send_json(json!({"type": "publish", "topic": topic, "data": data}))
            .await;
    }

    pub async fn ping(&self, data: Value) {
        self.send_json(json!({"type": "ping", "data": data})).await;
    }

    /// Simulate the transport-level disconnect event for this peer.
    pub async fn disconnect(&self) {
        self.events
            .send(GatewayEvent::Disconnected { conn: self.conn })
            .await
            .expect("gateway is not running");
    }

    /// Next frame the gateway delivered to this peer, decoded as JSON.
    pub async fn recv_json(&mut self) -> Result<Value> {
        let msg = tokio::time::timeout(Duration::from_secs(1), self.outbound.recv())
            .await
            .context("timed out waiting for a frame")?
            .context("outbound channel closed")?;

        match msg {
            Message::Binary(data) => Ok(serde_json::from_slice(&data)?),
            other => bail!("expected a binary frame, got {other:?}"),
        }
    }

    /// Everything currently buffered for this peer, without waiting.
    pub fn drain(&mut self) -> Vec<Message> {
        let mut frames = Vec::new();
        while let Ok(msg) = self.outbound.try_recv() {
            frames.push(msg);
        }
        frames
    }

    /// Prove the gateway delivered nothing to this peer so far.
    ///
    /// Round-trips a ping: events are handled strictly in order, so once the
    /// pong arrives every earlier frame has been fully processed, and any
    /// delivery meant for this peer would have arrived before it.
    pub async fn expect_silence(&mut self) -> Result<()> {
        let marker = json!({"sync": self.conn.to_string()});
        self.ping(marker.clone()).await;

        let reply = self.recv_json().await?;
        if reply != json!({"type": "pong", "data": marker}) {
            bail!("received an unexpected frame before the pong: {reply}");
        }
        Ok(())
    }
}
