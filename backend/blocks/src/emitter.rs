//! Block Kit emitter
//!
//! Shapes a validated tree into Block Kit JSON: surfaces, layout blocks and
//! the text payloads rendered from their markup children. Emission is total;
//! anything the grammar let through has a shape.

use crate::composition::{block_id, children_of, mrkdwn_text, plain_text, Object};
use crate::kind::BlockKind;
use blockforge_core::{Element, Node};
use blockforge_layout::LayoutEngine;
use blockforge_schema::ValidatedTree;
use serde_json::Value;
use tracing::debug;

pub struct BlockEmitter<'a> {
    pub(crate) mrkdwn: mrkdwn::Renderer<'a>,
}

impl<'a> BlockEmitter<'a> {
    pub fn new(layout: &'a LayoutEngine) -> Self {
        Self {
            mrkdwn: mrkdwn::Renderer::new(layout),
        }
    }

    /// JSON for a validated tree: an array of blocks for `Blocks`, a view
    /// object for `Modal` and `Home`.
    pub fn emit(&self, tree: &ValidatedTree<'_>) -> Value {
        let root = tree.root();
        match BlockKind::from_tag(&root.kind) {
            Some(BlockKind::Modal) => self.modal(root),
            Some(BlockKind::Home) => self.home(root),
            _ => Value::Array(self.blocks(root)),
        }
    }

    /// Layout blocks of a surface, in document order.
    pub fn blocks(&self, surface: &Element) -> Vec<Value> {
        surface.elements().filter_map(|el| self.block(el)).collect()
    }

    pub fn block(&self, el: &Element) -> Option<Value> {
        let block = match BlockKind::from_tag(&el.kind) {
            Some(BlockKind::Section) => self.section(el),
            Some(BlockKind::Divider) => Object::typed("divider")
                .set_opt("block_id", block_id(el))
                .build(),
            Some(BlockKind::Image) => self.image_block(el),
            Some(BlockKind::Header) => Object::typed("header")
                .set("text", plain_text(self.text_of(el)))
                .set_opt("block_id", block_id(el))
                .build(),
            Some(BlockKind::Actions) => self.actions(el),
            Some(BlockKind::Context) => self.context(el),
            Some(BlockKind::Input) => self.input(el),
            Some(BlockKind::File) => Object::typed("file")
                .set("external_id", el.get_str("externalId").unwrap_or_default())
                .set("source", el.get_str("source").unwrap_or("remote".into()))
                .set_opt("block_id", block_id(el))
                .build(),
            _ => {
                debug!(kind = %el.kind, "Not a layout block; skipped");
                return None;
            }
        };
        Some(block)
    }

    fn modal(&self, root: &Element) -> Value {
        Object::typed("modal")
            .set("title", plain_text(root.get_str("title").unwrap_or_default()))
            .set("blocks", self.blocks(root))
            .set_opt("submit", root.get_str("submit").map(plain_text))
            .set_opt("close", root.get_str("close").map(plain_text))
            .set_opt("callback_id", root.get_str("callbackId"))
            .set_opt("private_metadata", root.get_str("privateMetadata"))
            .set_opt("clear_on_close", root.get_bool("clearOnClose"))
            .set_opt("notify_on_close", root.get_bool("notifyOnClose"))
            .set_opt("external_id", root.get_str("externalId"))
            .build()
    }

    fn home(&self, root: &Element) -> Value {
        Object::typed("home")
            .set("blocks", self.blocks(root))
            .set_opt("callback_id", root.get_str("callbackId"))
            .set_opt("private_metadata", root.get_str("privateMetadata"))
            .set_opt("external_id", root.get_str("externalId"))
            .build()
    }

    fn section(&self, el: &Element) -> Value {
        let text = match children_of(el, BlockKind::Mrkdwn).next() {
            Some(explicit) => {
                if el.children.iter().any(is_markup) {
                    debug!("Section has a Mrkdwn child; loose markup ignored");
                }
                Some(self.mrkdwn_object(explicit))
            }
            None => {
                let text = self.mrkdwn_of(el);
                (!text.is_empty()).then(|| mrkdwn_text(text, None))
            }
        };

        let fields: Vec<Value> = children_of(el, BlockKind::Field)
            .map(|field| mrkdwn_text(self.mrkdwn_of(field), None))
            .collect();

        let accessory = el.elements().find_map(|child| {
            match BlockKind::from_tag(&child.kind)? {
                BlockKind::Image => Some(image_element(child)),
                kind if kind.is_interactive() => self.element(child),
                _ => None,
            }
        });

        Object::typed("section")
            .set_opt("text", text)
            .set_opt("fields", (!fields.is_empty()).then_some(fields))
            .set_opt("accessory", accessory)
            .set_opt("block_id", block_id(el))
            .build()
    }

    fn image_block(&self, el: &Element) -> Value {
        Object::typed("image")
            .set("image_url", el.get_str("src").unwrap_or_default())
            .set("alt_text", el.get_str("alt").unwrap_or_default())
            .set_opt("title", el.get_str("title").map(plain_text))
            .set_opt("block_id", block_id(el))
            .build()
    }

    fn actions(&self, el: &Element) -> Value {
        let elements: Vec<Value> = el.elements().filter_map(|c| self.element(c)).collect();
        Object::typed("actions")
            .set("elements", elements)
            .set_opt("block_id", block_id(el))
            .build()
    }

    /// Runs of consecutive markup become one mrkdwn element; images and
    /// explicit `Mrkdwn` nodes become elements of their own.
    fn context(&self, el: &Element) -> Value {
        let mut elements = Vec::new();
        let mut run: Vec<Node> = Vec::new();

        for child in &el.children {
            let kind = match child {
                Node::Text(_) => Some(BlockKind::Markup),
                Node::Element(nested) => BlockKind::from_tag(&nested.kind),
            };
            match (kind, child) {
                (Some(BlockKind::Image), Node::Element(image)) => {
                    self.flush_run(&mut run, &mut elements);
                    elements.push(image_element(image));
                }
                (Some(BlockKind::Mrkdwn), Node::Element(explicit)) => {
                    self.flush_run(&mut run, &mut elements);
                    elements.push(self.mrkdwn_object(explicit));
                }
                _ => run.push(child.clone()),
            }
        }
        self.flush_run(&mut run, &mut elements);

        Object::typed("context")
            .set("elements", elements)
            .set_opt("block_id", block_id(el))
            .build()
    }

    fn flush_run(&self, run: &mut Vec<Node>, elements: &mut Vec<Value>) {
        let nodes = std::mem::take(run);
        let text = self.mrkdwn.render_nodes(&nodes);
        if !text.is_empty() {
            elements.push(mrkdwn_text(text, None));
        }
    }

    fn input(&self, el: &Element) -> Value {
        let element = el.elements().find_map(|c| self.element(c));
        Object::typed("input")
            .set("label", plain_text(el.get_str("label").unwrap_or_default()))
            .set_opt("element", element)
            .set_opt("hint", el.get_str("hint").map(plain_text))
            .set_opt("optional", el.get_bool("optional"))
            .set_opt("dispatch_action", el.get_bool("dispatchAction"))
            .set_opt("block_id", block_id(el))
            .build()
    }
}

/// Image as a section accessory or context element.
fn image_element(el: &Element) -> Value {
    Object::typed("image")
        .set("image_url", el.get_str("src").unwrap_or_default())
        .set("alt_text", el.get_str("alt").unwrap_or_default())
        .build()
}

fn is_markup(node: &Node) -> bool {
    !node.is_blank_text() && BlockKind::from_tag(node.kind()).is_some_and(BlockKind::is_markup)
}
