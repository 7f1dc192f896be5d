// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/wardwatch

//! MQTT listener feeding the ingestion mailbox
//!
//! The event loop task does nothing but turn publish payloads into strings and
//! post them. Parsing and state live on the engine side.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::{bed_from_topic, ward_filter, StreamingConfig};
use crate::core::MailboxSender;

const MIN_KEEP_ALIVE: Duration = Duration::from_secs(5);

/// Subscribed MQTT client running on its own task
pub struct MqttListener {
    client: AsyncClient,
    client_id: String,
    filter: String,
    received: Arc<AtomicU64>,
    handle: JoinHandle<()>,
}

impl MqttListener {
    /// Connect, subscribe to every bed under the configured prefix and start
    /// forwarding payloads. Must be called from inside a tokio runtime.
    pub fn spawn(config: &StreamingConfig, mailbox: MailboxSender) -> Result<Self> {
        let client_id = format!("{}-{}", config.mqtt_client_id_prefix, uuid::Uuid::new_v4().simple());
        let filter = ward_filter(&config.topic_prefix);

        let mut options = MqttOptions::new(&client_id, &config.mqtt_broker, config.mqtt_port);
        options.set_keep_alive(Duration::from_secs(config.mqtt_keep_alive_secs).max(MIN_KEEP_ALIVE));

        if let (Some(username), Some(password)) = (&config.mqtt_username, &config.mqtt_password) {
            options.set_credentials(username, password);
        }

        let (client, mut eventloop) = AsyncClient::new(options, 100);
        let received = Arc::new(AtomicU64::new(0));
        let reconnect = Duration::from_millis(config.mqtt_reconnect_interval_ms);

        let task_client = client.clone();
        let task_filter = filter.clone();
        let task_prefix = config.topic_prefix.clone();
        let task_received = received.clone();

        let handle = tokio::spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        info!("MQTT connected, subscribing to {}", task_filter);
                        // clean sessions forget subscriptions, so renew on every connect
                        if let Err(e) = task_client.try_subscribe(task_filter.as_str(), QoS::AtLeastOnce) {
                            warn!("MQTT subscribe failed: {}", e);
                        }
                    }
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        trace!(
                            "MQTT received on {} (bed {:?})",
                            publish.topic,
                            bed_from_topic(&task_prefix, &publish.topic)
                        );
                        task_received.fetch_add(1, Ordering::Relaxed);
                        if !forward(&publish.payload, &mailbox) {
                            info!("Mailbox closed, stopping MQTT listener");
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("MQTT error: {}; retrying in {:?}", e, reconnect);
                        tokio::time::sleep(reconnect).await;
                    }
                }
            }
        });

        info!(
            "MQTT listener {} started for {}:{}",
            client_id, config.mqtt_broker, config.mqtt_port
        );

        Ok(Self {
            client,
            client_id,
            filter,
            received,
            handle,
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Publish messages received so far
    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    pub async fn shutdown(self) -> Result<()> {
        let result = self
            .client
            .disconnect()
            .await
            .map_err(|e| anyhow!("MQTT disconnect failed: {}", e));
        self.handle.abort();
        debug!("MQTT listener {} stopped", self.client_id);
        result
    }
}

/// Post one raw payload. Returns `false` once the engine has gone away.
pub fn forward(payload: &[u8], mailbox: &MailboxSender) -> bool {
    mailbox.post(String::from_utf8_lossy(payload).into_owned())
}
