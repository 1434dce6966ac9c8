//! `blockforge-layout` — approximate text layout for mrkdwn.
//!
//! Measures strings against a font metrics table and synthesizes indentation
//! of a requested width out of whitespace glyphs.

pub mod cache;
pub mod engine;
pub mod metrics;

pub use cache::LayoutCache;
pub use engine::{LayoutEngine, DEFAULT_WIDTH};
pub use metrics::{FontMetrics, GlyphTable};
