//! `blockforge-blocks` — compiles node trees into Slack Block Kit JSON.
//!
//! [`Renderer`] is the entry point: it validates a tree against the schema
//! registry and, on success, emits the surface's JSON.

pub mod composition;
pub mod elements;
pub mod emitter;
pub mod kind;

pub use composition::{mrkdwn_text, plain_text, Object};
pub use emitter::BlockEmitter;
pub use kind::BlockKind;

use anyhow::{Context, Result};
use blockforge_core::{Element, ValidationError};
use blockforge_layout::LayoutEngine;
use logging::{RenderEvent, RenderEventLogger};
use serde_json::Value;
use std::sync::Arc;
use tracing::info_span;

/// Validate-then-emit pipeline over one layout engine.
///
/// Cheap to clone; clones share the engine and its caches.
#[derive(Clone)]
pub struct Renderer {
    layout: Arc<LayoutEngine>,
}

impl Renderer {
    pub fn new(layout: Arc<LayoutEngine>) -> Self {
        Self { layout }
    }

    /// Renderer over the process-wide engine and bundled metrics.
    pub fn shared() -> Self {
        Self::new(LayoutEngine::shared())
    }

    pub fn layout(&self) -> &LayoutEngine {
        &self.layout
    }

    /// Validate `root` and emit its Block Kit JSON. The first grammar
    /// violation aborts the render; nothing is emitted.
    pub fn render(&self, root: &Element) -> Result<Value, ValidationError> {
        let render_id = uuid::Uuid::new_v4().to_string();
        let span = info_span!("render", render_id = %render_id, root = %root.kind);
        let _enter = span.enter();

        let tree = match blockforge_schema::validate(root) {
            Ok(tree) => tree,
            Err(err) => {
                RenderEventLogger::log_event(
                    &render_id,
                    RenderEvent::Rejected {
                        error: err.to_string(),
                        path: err.path().to_string(),
                    },
                );
                return Err(err);
            }
        };
        RenderEventLogger::log_event(
            &render_id,
            RenderEvent::Validated {
                root: root.kind.clone(),
            },
        );

        let output = BlockEmitter::new(&self.layout).emit(&tree);
        RenderEventLogger::log_event(
            &render_id,
            RenderEvent::Emitted {
                root: root.kind.clone(),
                blocks: block_count(&output),
            },
        );
        Ok(output)
    }

    /// Render a JSON-encoded `{type, attrs, children}` tree.
    pub fn render_json(&self, json: &str) -> Result<Value> {
        let root: Element = serde_json::from_str(json).context("Failed to parse node tree JSON")?;
        Ok(self.render(&root)?)
    }
}

fn block_count(output: &Value) -> usize {
    match output {
        Value::Array(blocks) => blocks.len(),
        view => view
            .get("blocks")
            .and_then(Value::as_array)
            .map_or(0, Vec::len),
    }
}
