//! Telemetry and structured logging for blockforge.
//!
//! Subscriber setup (console, JSON, rolling files) and structured render events.

pub mod event_logger;
pub mod logger;

pub use event_logger::{RenderEvent, RenderEventEntry, RenderEventLogger};
pub use logger::{init_logger, LoggerOptions};
