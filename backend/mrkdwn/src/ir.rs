//! Markup Intermediate Representation
//!
//! Markup children of text-bearing containers are lifted out of the generic
//! node tree into a typed AST before rendering, so HTML aliases (`b` and
//! `strong`, `s` and `del`, ...) collapse into one variant each.

use blockforge_core::{Element, Node};
use chrono::DateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum MarkupNode {
    Text(String),
    Bold(Vec<MarkupNode>),
    Italic(Vec<MarkupNode>),
    Strike(Vec<MarkupNode>),
    Code(Vec<MarkupNode>),
    Link {
        href: Option<String>,
        children: Vec<MarkupNode>,
    },
    Time {
        timestamp: Option<i64>,
        fallback: Option<String>,
        format: Vec<MarkupNode>,
    },
    LineBreak,
    Paragraph(Vec<MarkupNode>),
    Blockquote(Vec<MarkupNode>),
    Preformatted(Vec<MarkupNode>),
    List(List),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct List {
    pub kind: ListKind,
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ListKind {
    Unordered,
    Ordered { numbering: Numbering, start: i64 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListItem {
    /// Explicit number for this item; following items count on from it.
    pub value: Option<i64>,
    pub children: Vec<MarkupNode>,
}

/// Ordered-list numbering styles (`<ol type>`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Numbering {
    #[default]
    Decimal,
    LowerAlpha,
    UpperAlpha,
    LowerRoman,
    UpperRoman,
}

impl Numbering {
    pub fn from_type_attr(value: &str) -> Self {
        match value {
            "a" => Numbering::LowerAlpha,
            "A" => Numbering::UpperAlpha,
            "i" => Numbering::LowerRoman,
            "I" => Numbering::UpperRoman,
            _ => Numbering::Decimal,
        }
    }
}

impl MarkupNode {
    /// Block-level nodes start on their own line.
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            MarkupNode::Paragraph(_)
                | MarkupNode::Blockquote(_)
                | MarkupNode::Preformatted(_)
                | MarkupNode::List(_)
        )
    }
}

pub struct IrParser;

impl IrParser {
    /// Lift markup nodes into the IR. Elements that are not markup (fields,
    /// accessories, images sharing a container with text) are skipped.
    pub fn parse(nodes: &[Node]) -> Vec<MarkupNode> {
        nodes.iter().filter_map(Self::parse_node).collect()
    }

    fn parse_node(node: &Node) -> Option<MarkupNode> {
        let el = match node {
            Node::Text(text) => return Some(MarkupNode::Text(text.clone())),
            Node::Element(el) => el,
        };
        let children = || Self::parse(&el.children);

        let parsed = match el.kind.as_str() {
            "b" | "strong" => MarkupNode::Bold(children()),
            "i" | "em" => MarkupNode::Italic(children()),
            "s" | "strike" | "del" => MarkupNode::Strike(children()),
            "code" => MarkupNode::Code(children()),
            "a" => MarkupNode::Link {
                href: el.get_str("href").map(|h| h.trim().to_string()),
                children: children(),
            },
            "time" => MarkupNode::Time {
                timestamp: el.get("datetime").and_then(|v| parse_timestamp(&v.literal())),
                fallback: el.get_str("fallback").map(|f| f.into_owned()),
                format: children(),
            },
            "br" => MarkupNode::LineBreak,
            "p" => MarkupNode::Paragraph(children()),
            "blockquote" => MarkupNode::Blockquote(children()),
            "pre" => MarkupNode::Preformatted(children()),
            "ul" => MarkupNode::List(List {
                kind: ListKind::Unordered,
                items: Self::parse_items(el),
            }),
            "ol" => MarkupNode::List(List {
                kind: ListKind::Ordered {
                    numbering: el
                        .get_str("type")
                        .map(|t| Numbering::from_type_attr(&t))
                        .unwrap_or_default(),
                    start: el.get_f64("start").and_then(list_number).unwrap_or(1),
                },
                items: Self::parse_items(el),
            }),
            _ => return None,
        };
        Some(parsed)
    }

    fn parse_items(list: &Element) -> Vec<ListItem> {
        list.elements()
            .filter(|el| el.kind == "li")
            .map(|li| ListItem {
                value: li.get_f64("value").and_then(list_number),
                children: Self::parse(&li.children),
            })
            .collect()
    }
}

/// Item number from an attribute. Fractions are truncated; values with no
/// `i64` representation are ignored.
fn list_number(value: f64) -> Option<i64> {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0; // 2^63
    let value = value.trunc();
    (value.is_finite() && (-LIMIT..LIMIT).contains(&value)).then_some(value as i64)
}

/// Unix seconds from either a numeric value or an RFC 3339 timestamp.
fn parse_timestamp(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(seconds) = raw.parse::<f64>() {
        return seconds.is_finite().then_some(seconds.floor() as i64);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.timestamp())
}
