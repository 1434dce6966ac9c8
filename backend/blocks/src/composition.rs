//! Composition objects: text payloads, confirmation dialogs and options.

use crate::emitter::BlockEmitter;
use crate::kind::BlockKind;
use blockforge_core::Element;
use serde_json::{Map, Value};

/// JSON object under construction. Absent optional fields are left out.
#[derive(Debug, Default)]
pub struct Object(Map<String, Value>);

impl Object {
    /// Object with a `type` discriminator.
    pub fn typed(kind: &str) -> Self {
        Self::default().set("type", kind)
    }

    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn set_opt<V: Into<Value>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.set(key, value),
            None => self,
        }
    }

    pub fn build(self) -> Value {
        Value::Object(self.0)
    }
}

pub fn plain_text(text: impl Into<String>) -> Value {
    Object::typed("plain_text").set("text", text.into()).build()
}

pub fn mrkdwn_text(text: impl Into<String>, verbatim: Option<bool>) -> Value {
    Object::typed("mrkdwn")
        .set("text", text.into())
        .set_opt("verbatim", verbatim)
        .build()
}

/// `blockId`, or the HTML-style `id`.
pub fn block_id(el: &Element) -> Option<String> {
    el.get_any(&["blockId", "id"]).map(|id| id.into_owned())
}

/// `actionId`, or the form-style `name`.
pub fn action_id(el: &Element) -> Option<String> {
    el.get_any(&["actionId", "name"]).map(|id| id.into_owned())
}

/// Comma-separated attribute values (`values="a,b"`), trimmed, empties dropped.
pub fn list_attr(el: &Element, name: &str) -> Vec<String> {
    el.get_str(name)
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn children_of(el: &Element, kind: BlockKind) -> impl Iterator<Item = &Element> {
    el.elements()
        .filter(move |child| BlockKind::from_tag(&child.kind) == Some(kind))
}

impl BlockEmitter<'_> {
    /// Plain text of an element's markup children.
    pub(crate) fn text_of(&self, el: &Element) -> String {
        mrkdwn::Renderer::plain_text(&el.children)
    }

    /// mrkdwn rendering of an element's markup children.
    pub(crate) fn mrkdwn_of(&self, el: &Element) -> String {
        self.mrkdwn.render_nodes(&el.children)
    }

    /// Text payload of a `Mrkdwn` node.
    pub(crate) fn mrkdwn_object(&self, el: &Element) -> Value {
        let text = if el.get_bool("raw").unwrap_or(false) {
            mrkdwn::Renderer::raw_text(&el.children)
        } else {
            self.mrkdwn_of(el)
        };
        mrkdwn_text(text, el.get_bool("verbatim"))
    }

    /// Confirmation dialog attached to an interactive component.
    pub(crate) fn confirm(&self, parent: &Element) -> Option<Value> {
        let el = children_of(parent, BlockKind::Confirm).next()?;
        let confirm = Object::default()
            .set_opt("title", el.get_str("title").map(plain_text))
            .set("text", mrkdwn_text(self.mrkdwn_of(el), None))
            .set_opt("confirm", el.get_str("confirm").map(plain_text))
            .set_opt("deny", el.get_str("deny").map(plain_text))
            .set_opt("style", el.get_str("style"))
            .build();
        Some(confirm)
    }

    /// Value of an option-like element; defaults to its text.
    pub(crate) fn option_value(&self, el: &Element) -> String {
        el.get_str("value")
            .map(|v| v.into_owned())
            .unwrap_or_else(|| self.text_of(el))
    }

    pub(crate) fn option(&self, el: &Element) -> Value {
        Object::default()
            .set("text", plain_text(self.text_of(el)))
            .set("value", self.option_value(el))
            .set_opt("description", el.get_str("description").map(plain_text))
            .build()
    }

    pub(crate) fn option_group(&self, el: &Element) -> Value {
        let options: Vec<Value> = children_of(el, BlockKind::OptionItem)
            .map(|option| self.option(option))
            .collect();
        Object::default()
            .set("label", plain_text(el.get_str("label").unwrap_or_default()))
            .set("options", options)
            .build()
    }

    pub(crate) fn overflow_option(&self, el: &Element) -> Value {
        Object::default()
            .set("text", plain_text(self.text_of(el)))
            .set("value", self.option_value(el))
            .set_opt("url", el.get_str("url"))
            .build()
    }

    /// Checkbox and radio button options, whose labels may carry markup.
    pub(crate) fn choice(&self, el: &Element) -> Value {
        Object::default()
            .set("text", mrkdwn_text(self.mrkdwn_of(el), None))
            .set("value", self.option_value(el))
            .set_opt("description", el.get_str("description").map(plain_text))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockforge_layout::LayoutEngine;
    use serde_json::json;

    #[test]
    fn optional_fields_are_skipped() {
        let value = Object::typed("button")
            .set("text", plain_text("Go"))
            .set_opt("url", None::<String>)
            .set_opt("style", Some("primary"))
            .build();
        assert_eq!(
            value,
            json!({
                "type": "button",
                "text": { "type": "plain_text", "text": "Go" },
                "style": "primary"
            })
        );
    }

    #[test]
    fn ids_fall_back_to_html_names() {
        let el = Element::new("Button").attr("name", "submit").attr("id", "b1");
        assert_eq!(action_id(&el).as_deref(), Some("submit"));
        assert_eq!(block_id(&el).as_deref(), Some("b1"));
        let both = el.attr("actionId", "go");
        assert_eq!(action_id(&both).as_deref(), Some("go"));
    }

    #[test]
    fn list_attributes_split_on_commas() {
        let el = Element::new("CheckboxGroup").attr("values", " a, ,b ");
        assert_eq!(list_attr(&el, "values"), vec!["a", "b"]);
        assert!(list_attr(&el, "missing").is_empty());
    }

    #[test]
    fn option_value_defaults_to_text() {
        let engine = LayoutEngine::bundled().unwrap();
        let emitter = BlockEmitter::new(&engine);
        let option = Element::new("option").child("  Red  ");
        assert_eq!(
            emitter.option(&option),
            json!({ "text": { "type": "plain_text", "text": "Red" }, "value": "Red" })
        );
    }

    #[test]
    fn confirm_renders_markup_body() {
        let engine = LayoutEngine::bundled().unwrap();
        let emitter = BlockEmitter::new(&engine);
        let button = Element::new("Button").child("Delete").child(
            Element::new("Confirm")
                .attr("title", "Sure?")
                .attr("confirm", "Yes")
                .attr("deny", "No")
                .attr("style", "danger")
                .child(Element::new("b").child("Cannot")).child(" be undone"),
        );
        assert_eq!(
            emitter.confirm(&button),
            Some(json!({
                "title": { "type": "plain_text", "text": "Sure?" },
                "text": { "type": "mrkdwn", "text": "*Cannot* be undone" },
                "confirm": { "type": "plain_text", "text": "Yes" },
                "deny": { "type": "plain_text", "text": "No" },
                "style": "danger"
            }))
        );
        assert_eq!(emitter.confirm(&Element::new("Button")), None);
    }
}
