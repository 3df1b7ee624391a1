// src/publish/mqtt.rs
//! `rumqttc`-backed publisher: connects once at startup with a short
//! timeout, then hands the event loop off to a background task that
//! reconnects on its own. `publish` never blocks waiting on the broker;
//! it checks a connected flag and drops the event if the broker is down
//! (§4.5).

use super::{EventPublisher, ImportedEvent};
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct MqttPublisher {
    client: AsyncClient,
    topic: String,
    qos: QoS,
    connected: Arc<AtomicBool>,
}

/// Maps the configured QoS level (0, 1 or 2) to `rumqttc`'s enum,
/// defaulting to `AtMostOnce` for any other value.
fn qos_from_level(level: u8) -> QoS {
    match level {
        1 => QoS::AtLeastOnce,
        2 => QoS::ExactlyOnce,
        _ => QoS::AtMostOnce,
    }
}

impl MqttPublisher {
    /// Connects to `host:port` as `client_id`, waiting up to
    /// `connect_timeout` for the broker's CONNACK. Spawns a background
    /// task that drives the event loop (and therefore reconnection) for
    /// the lifetime of the process. `username`/`password` authenticate the
    /// connection when provided; `qos` governs every subsequent publish.
    #[allow(clippy::too_many_arguments)]
    pub async fn connect(
        host: &str,
        port: u16,
        client_id: &str,
        topic: &str,
        username: Option<&str>,
        password: Option<&str>,
        qos: u8,
        connect_timeout: Duration,
    ) -> Result<Self, MqttConnectError> {
        let mut options = MqttOptions::new(client_id, host, port);
        options.set_keep_alive(Duration::from_secs(30));
        if let (Some(username), Some(password)) = (username, password) {
            options.set_credentials(username, password);
        }

        let (client, mut event_loop) = AsyncClient::new(options, 16);
        let connected = Arc::new(AtomicBool::new(false));

        tokio::time::timeout(connect_timeout, async {
            loop {
                match event_loop.poll().await {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => return Ok(()),
                    Ok(_) => continue,
                    Err(e) => return Err(MqttConnectError::Connection(e.to_string())),
                }
            }
        })
        .await
        .map_err(|_| MqttConnectError::Timeout)??;

        connected.store(true, Ordering::SeqCst);
        info!(host, port, "connected to mqtt broker");

        let background_connected = connected.clone();
        tokio::spawn(async move {
            loop {
                match event_loop.poll().await {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        background_connected.store(true, Ordering::SeqCst);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        background_connected.store(false, Ordering::SeqCst);
                        warn!(error = %e, "mqtt event loop error, will retry");
                        tokio::time::sleep(Duration::from_secs(2)).await;
                    }
                }
            }
        });

        Ok(Self {
            client,
            topic: topic.to_string(),
            qos: qos_from_level(qos),
            connected,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MqttConnectError {
    #[error("timed out waiting for broker connack")]
    Timeout,
    #[error("connection error: {0}")]
    Connection(String),
}

#[async_trait::async_trait]
impl EventPublisher for MqttPublisher {
    async fn publish(&self, event: &ImportedEvent) {
        if !self.connected.load(Ordering::SeqCst) {
            debug!("mqtt not connected, dropping event");
            return;
        }

        let payload = match serde_json::to_vec(event) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "failed to serialize ingest event");
                return;
            }
        };

        if let Err(e) = self
            .client
            .publish(&self.topic, self.qos, false, payload)
            .await
        {
            warn!(error = %e, "failed to publish ingest event");
        }
    }
}
