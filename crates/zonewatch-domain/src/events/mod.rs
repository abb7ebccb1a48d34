//! Message bus payloads
//!
//! Everything the service publishes goes through [`OutboundMessage`].
//! Topics are derived from a configurable prefix by [`BusTopics`]:
//!
//! | Topic | Payload |
//! |-------|---------|
//! | `<prefix>/status` | [`ServiceStatusPayload`] |
//! | `<prefix>/discovery/<zone>` | [`ZoneDiscoveryPayload`] |
//! | `<prefix>/zone/<zone>/state` | [`ZoneStatePayload`] |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_TOPIC_PREFIX;
use crate::error::Result;
use crate::value_objects::{AnalysisDetail, AnalysisResult, ScheduleSpec, ZoneConfig};

/// Topic naming scheme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusTopics {
    prefix: String,
}

impl BusTopics {
    /// Topics under `prefix` (trailing slashes trimmed)
    pub fn new<S: Into<String>>(prefix: S) -> Self {
        let prefix = prefix.into();
        Self {
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    /// Service availability topic
    pub fn status(&self) -> String {
        format!("{}/status", self.prefix)
    }

    /// Discovery topic for a zone
    pub fn zone_discovery(&self, zone: &str) -> String {
        format!("{}/discovery/{}", self.prefix, slug(zone))
    }

    /// State topic for a zone
    pub fn zone_state(&self, zone: &str) -> String {
        format!("{}/zone/{}/state", self.prefix, slug(zone))
    }
}

impl Default for BusTopics {
    fn default() -> Self {
        Self::new(DEFAULT_TOPIC_PREFIX)
    }
}

fn slug(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Serialized message ready for the bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Destination topic
    pub topic: String,
    /// JSON payload bytes
    pub payload: Vec<u8>,
}

impl OutboundMessage {
    /// Serialize `payload` as JSON for `topic`
    pub fn json<T: Serialize>(topic: String, payload: &T) -> Result<Self> {
        Ok(Self {
            topic,
            payload: serde_json::to_vec(payload)?,
        })
    }
}

/// Service availability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatusPayload {
    /// `online` or `offline`
    pub status: String,
    /// Number of configured zones
    pub zones: usize,
    /// Emission time
    pub timestamp: DateTime<Utc>,
}

impl ServiceStatusPayload {
    /// Online announcement
    pub fn online(zones: usize) -> Self {
        Self {
            status: "online".to_string(),
            zones,
            timestamp: Utc::now(),
        }
    }

    /// Offline announcement
    pub fn offline() -> Self {
        Self {
            status: "offline".to_string(),
            zones: 0,
            timestamp: Utc::now(),
        }
    }
}

/// Registration of a zone so consumers can create entities for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneDiscoveryPayload {
    /// Zone name
    pub zone: String,
    /// Source camera
    pub camera_entity: String,
    /// Destination task list
    pub todo_list_entity: Option<String>,
    /// Zone purpose
    pub purpose: String,
    /// Topic carrying this zone's state
    pub state_topic: String,
    /// Trigger schedule
    pub schedule: ScheduleSpec,
}

impl ZoneDiscoveryPayload {
    /// Discovery payload for `zone`
    pub fn from_zone(zone: &ZoneConfig, topics: &BusTopics) -> Self {
        Self {
            zone: zone.name.clone(),
            camera_entity: zone.camera_entity.clone(),
            todo_list_entity: zone.todo_list_entity.clone(),
            purpose: zone.purpose.clone(),
            state_topic: topics.zone_state(&zone.name),
            schedule: zone.schedule.clone(),
        }
    }
}

/// Latest analysis outcome of a zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneStatePayload {
    /// Zone name
    pub zone: String,
    /// Destination task list
    pub todo_list_entity: Option<String>,
    /// Whether a provider answered
    pub success: bool,
    /// Provider that answered
    pub provider: Option<String>,
    /// Scene summary
    pub summary: Option<String>,
    /// Tasks found
    pub tasks: Vec<String>,
    /// Error text when unsuccessful
    pub error: Option<String>,
    /// Total dispatch latency in milliseconds
    pub latency_ms: f64,
    /// Summed cost estimate
    pub cost_estimate: f64,
    /// Completion time
    pub timestamp: DateTime<Utc>,
}

impl ZoneStatePayload {
    /// State payload for a finished dispatch
    pub fn from_result(result: &AnalysisResult, todo_list_entity: Option<String>) -> Self {
        let (summary, tasks, error) = match &result.detail {
            AnalysisDetail::Completed { output, .. } => {
                (Some(output.summary.clone()), output.tasks.clone(), None)
            }
            AnalysisDetail::Exhausted { marker, .. } => (None, Vec::new(), Some(marker.clone())),
        };
        Self {
            zone: result.zone.clone(),
            todo_list_entity,
            success: result.success,
            provider: result.provider_id.clone(),
            summary,
            tasks,
            error,
            latency_ms: result.latency.as_secs_f64() * 1000.0,
            cost_estimate: result.cost_estimate,
            timestamp: result.completed_at,
        }
    }
}
