//! Serde helpers for human-readable durations in configuration.

use serde::{Deserialize, Deserializer, Serializer, de};
use std::time::Duration;

/// Duration as whole seconds or a humantime string such as `"30s"` or `"1m30s"`
pub mod duration {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDuration {
        Seconds(u64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&humantime::format_duration(*duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        match RawDuration::deserialize(deserializer) {
            Ok(RawDuration::Seconds(seconds)) => Ok(Duration::from_secs(seconds)),
            Ok(RawDuration::Text(text)) => humantime::parse_duration(text.trim())
                .map_err(|e| de::Error::custom(format!("invalid duration '{text}': {e}"))),
            Err(_) => Err(de::Error::custom(
                "expected whole seconds or a duration string such as \"30s\"",
            )),
        }
    }
}
