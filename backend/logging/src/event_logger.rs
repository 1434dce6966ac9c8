//! Render Event Logger
//!
//! Structured events (validated, rejected, emitted) for every render call,
//! emitted on the `render_events` target so they can be routed to NDJSON files.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum RenderEvent {
    Validated {
        root: String,
    },
    Rejected {
        error: String,
        path: String,
    },
    Emitted {
        root: String,
        blocks: usize,
    },
}

#[derive(Debug, Serialize)]
pub struct RenderEventEntry {
    pub render_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: RenderEvent,
}

impl RenderEventEntry {
    pub fn new(render_id: &str, event: RenderEvent) -> Self {
        Self {
            render_id: render_id.into(),
            timestamp: Utc::now(),
            event,
        }
    }
}

pub struct RenderEventLogger;

impl RenderEventLogger {
    /// Logs one stage of a render call.
    pub fn log_event(render_id: &str, event: RenderEvent) {
        let rejected = matches!(event, RenderEvent::Rejected { .. });
        let entry = RenderEventEntry::new(render_id, event);
        let payload = serde_json::to_string(&entry).unwrap_or_else(|_| format!("{entry:?}"));

        if rejected {
            warn!(target: "render_events", render_id, event = %payload, "Render event");
        } else {
            info!(target: "render_events", render_id, event = %payload, "Render event");
        }
    }
}
