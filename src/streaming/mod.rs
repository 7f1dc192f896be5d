// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/wardwatch

//! Streaming module - transport listeners feeding the mailbox

mod mqtt;

pub use mqtt::*;

use serde::{Deserialize, Serialize};

/// Transport configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    pub mqtt_broker: String,
    pub mqtt_port: u16,
    /// A random suffix is appended so several dashboards can share a broker
    pub mqtt_client_id_prefix: String,
    pub mqtt_username: Option<String>,
    pub mqtt_password: Option<String>,
    pub mqtt_keep_alive_secs: u64,
    pub mqtt_reconnect_interval_ms: u64,

    /// Common prefix of every bed topic, e.g. `ward1/bed`
    pub topic_prefix: String,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            mqtt_broker: "localhost".to_string(),
            mqtt_port: 1883,
            mqtt_client_id_prefix: "wardwatch".to_string(),
            mqtt_username: None,
            mqtt_password: None,
            mqtt_keep_alive_secs: 60,
            mqtt_reconnect_interval_ms: 5_000,
            topic_prefix: "ward1/bed".to_string(),
        }
    }
}

/// Topic a single bed publishes on
pub fn bed_topic(prefix: &str, bed_id: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), bed_id)
}

/// Wildcard filter matching every bed under `prefix`
pub fn ward_filter(prefix: &str) -> String {
    format!("{}/#", prefix.trim_end_matches('/'))
}

/// Bed id encoded in a topic, if it sits directly under `prefix`
pub fn bed_from_topic<'a>(prefix: &str, topic: &'a str) -> Option<&'a str> {
    let rest = topic.strip_prefix(prefix.trim_end_matches('/'))?;
    let id = rest.strip_prefix('/')?;
    (!id.is_empty() && !id.contains('/')).then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topics() {
        assert_eq!(bed_topic("ward1/bed", "BED-001"), "ward1/bed/BED-001");
        assert_eq!(bed_topic("ward1/bed/", "BED-001"), "ward1/bed/BED-001");
        assert_eq!(ward_filter("ward1/bed"), "ward1/bed/#");
    }

    #[test]
    fn test_bed_from_topic() {
        assert_eq!(bed_from_topic("ward1/bed", "ward1/bed/BED-007"), Some("BED-007"));
        assert_eq!(bed_from_topic("ward1/bed", "ward1/bed"), None);
        assert_eq!(bed_from_topic("ward1/bed", "ward1/bed/BED-007/extra"), None);
        assert_eq!(bed_from_topic("ward1/bed", "ward2/bed/BED-007"), None);
    }
}
