//! Input node tree.
//!
//! Trees arrive from a templating front-end as `{type, attrs, children}`
//! objects. Text leaves are bare strings and take part in the schema under
//! the pseudo-type [`TEXT_KIND`].

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// Pseudo node type used for text leaves when checking child membership.
pub const TEXT_KIND: &str = "#text";

// ---------------------------------------------------------------------------
// Attribute values
// ---------------------------------------------------------------------------

/// A scalar attribute value as supplied by the front-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl AttrValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean reading; the strings `"true"` and `"false"` are accepted too.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            AttrValue::String(s) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) => Some(*n),
            AttrValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Textual form used for enumerated-value checks and for output fields.
    ///
    /// Integral numbers print without a fractional part (`1`, not `1.0`).
    pub fn literal(&self) -> Cow<'_, str> {
        match self {
            AttrValue::Null => Cow::Borrowed(""),
            AttrValue::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            AttrValue::Number(n) if n.fract() == 0.0 && (-I64_LIMIT..I64_LIMIT).contains(n) => {
                Cow::Owned(format!("{}", *n as i64))
            }
            AttrValue::Number(n) => Cow::Owned(n.to_string()),
            AttrValue::String(s) => Cow::Borrowed(s),
        }
    }
}

/// 2^63; integral numbers below this in magnitude print through `i64`.
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal())
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::String(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::String(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Number(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Number(value as f64)
    }
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

/// One element of the declarative tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, AttrValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

/// A child slot: either a nested element or a text leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Text(String),
    Element(Element),
}

impl Node {
    /// Node type used for schema lookups.
    pub fn kind(&self) -> &str {
        match self {
            Node::Text(_) => TEXT_KIND,
            Node::Element(el) => &el.kind,
        }
    }

    /// Whitespace-only text carries no content; front-ends leave it behind
    /// when indenting markup.
    pub fn is_blank_text(&self) -> bool {
        matches!(self, Node::Text(s) if s.trim().is_empty())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }
}

impl Element {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Builder: set an attribute.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Builder: append a child element or text leaf.
    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    /// Builder: append several children.
    pub fn children<I, N>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        self.children.extend(nodes.into_iter().map(Into::into));
        self
    }

    /// Attribute lookup; `null` values read as absent.
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name).filter(|v| !v.is_null())
    }

    pub fn get_str(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(AttrValue::literal)
    }

    /// First present attribute among `names` (canonical name, then aliases).
    pub fn get_any(&self, names: &[&str]) -> Option<Cow<'_, str>> {
        names.iter().find_map(|name| self.get_str(name))
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(AttrValue::as_bool)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(AttrValue::as_f64)
    }

    /// Child elements, skipping text leaves.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }
}

impl From<Element> for Node {
    fn from(value: Element) -> Self {
        Node::Element(value)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::Text(value.to_string())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::Text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_front_end_trees() {
        let tree: Element = serde_json::from_value(json!({
            "type": "Blocks",
            "children": [
                { "type": "Divider", "attrs": { "blockId": "hoge" } },
                { "type": "Section", "children": ["hello ", { "type": "b", "children": ["world"] }] }
            ]
        }))
        .unwrap();

        assert_eq!(tree.kind, "Blocks");
        assert_eq!(tree.children.len(), 2);
        let divider = tree.children[0].as_element().unwrap();
        assert_eq!(divider.get_str("blockId").as_deref(), Some("hoge"));
        let section = tree.children[1].as_element().unwrap();
        assert_eq!(section.children[0], Node::Text("hello ".into()));
        assert_eq!(section.children[1].kind(), "b");
    }

    #[test]
    fn null_attributes_read_as_absent() {
        let el: Element = serde_json::from_value(json!({
            "type": "Button",
            "attrs": { "style": null, "value": 3 }
        }))
        .unwrap();
        assert!(el.attrs.contains_key("style"));
        assert!(el.get("style").is_none());
        assert_eq!(el.get_str("value").as_deref(), Some("3"));
    }

    #[test]
    fn literal_forms() {
        assert_eq!(AttrValue::Number(1.0).literal(), "1");
        assert_eq!(AttrValue::Number(1.5).literal(), "1.5");
        assert_eq!(AttrValue::Number(-4.0).literal(), "-4");
        assert_eq!(AttrValue::Number(1e20).literal(), "100000000000000000000");
        assert_eq!(AttrValue::Number(-1e20).literal(), "-100000000000000000000");
        assert_eq!(AttrValue::Bool(true).literal(), "true");
        assert_eq!(AttrValue::from("a").as_bool(), None);
        assert_eq!(AttrValue::from("true").as_bool(), Some(true));
    }

    #[test]
    fn text_leaves_use_pseudo_kind() {
        assert_eq!(Node::from("x").kind(), TEXT_KIND);
        assert!(Node::from(" \n ").is_blank_text());
        assert!(!Node::from(" a ").is_blank_text());
    }

    #[test]
    fn builder_collects_children() {
        let el = Element::new("ul")
            .children([Element::new("li").child("a"), Element::new("li").child("b")]);
        assert_eq!(el.elements().count(), 2);
    }
}
