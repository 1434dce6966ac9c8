//! mrkdwn rendering for Block Kit text payloads
//!
//! Markup children (`b`, `a`, `ul`, `time`, ...) are lifted into a small IR
//! and rendered to Slack's mrkdwn dialect, with list indentation synthesized
//! from whitespace glyphs by the layout engine.

pub mod escape;
pub mod ir;
pub mod list;
pub mod renderer;

pub use ir::{IrParser, List, ListItem, ListKind, MarkupNode, Numbering};
pub use renderer::{DEFAULT_TIME_FORMAT, Renderer};
