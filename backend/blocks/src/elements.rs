//! Interactive block elements: buttons, menus, pickers and inputs.

use crate::composition::{action_id, children_of, list_attr, plain_text, Object};
use crate::emitter::BlockEmitter;
use crate::kind::BlockKind;
use blockforge_core::Element;
use serde_json::Value;
use tracing::debug;

fn placeholder(el: &Element) -> Option<Value> {
    el.get_str("placeholder").map(plain_text)
}

fn is_multiple(el: &Element) -> bool {
    el.get_bool("multiple").unwrap_or(false)
}

fn int_attr(el: &Element, name: &str) -> Option<i64> {
    el.get_f64(name).map(|n| n as i64)
}

/// `initial_option` for single selection, `initial_options` otherwise.
fn with_initial(object: Object, multiple: bool, initial: Vec<Value>) -> Object {
    if multiple {
        if initial.is_empty() {
            object
        } else {
            object.set("initial_options", initial)
        }
    } else {
        object.set_opt("initial_option", initial.into_iter().next())
    }
}

/// Base object for the select menu family, `multi_` prefixed when
/// `multiple` is set.
fn select_menu(el: &Element, kind: &str) -> Object {
    let multiple = is_multiple(el);
    let kind = if multiple {
        format!("multi_{kind}")
    } else {
        kind.to_string()
    };
    Object::typed(&kind)
        .set_opt("action_id", action_id(el))
        .set_opt("placeholder", placeholder(el))
        .set_opt(
            "max_selected_items",
            int_attr(el, "maxSelectedItems").filter(|_| multiple),
        )
}

impl BlockEmitter<'_> {
    /// Block element for an interactive component; `None` for anything else.
    pub fn element(&self, el: &Element) -> Option<Value> {
        let object = match BlockKind::from_tag(&el.kind)? {
            BlockKind::Button => self.button(el),
            BlockKind::Select => self.static_select(el),
            BlockKind::ExternalSelect => self.external_select(el),
            BlockKind::UsersSelect => self.entity_select(el, "users_select", "initialUser", "user"),
            BlockKind::ConversationsSelect => self
                .entity_select(el, "conversations_select", "initialConversation", "conversation")
                .set_opt(
                    "default_to_current_conversation",
                    el.get_bool("defaultToCurrentConversation"),
                ),
            BlockKind::ChannelsSelect => {
                self.entity_select(el, "channels_select", "initialChannel", "channel")
            }
            BlockKind::Overflow => self.overflow(el),
            BlockKind::DatePicker => Object::typed("datepicker")
                .set_opt("action_id", action_id(el))
                .set_opt("placeholder", placeholder(el))
                .set_opt("initial_date", el.get_any(&["initialDate", "value"])),
            BlockKind::TimePicker => Object::typed("timepicker")
                .set_opt("action_id", action_id(el))
                .set_opt("placeholder", placeholder(el))
                .set_opt("initial_time", el.get_any(&["initialTime", "value"])),
            BlockKind::CheckboxGroup => self.checkboxes(el),
            BlockKind::RadioButtonGroup => self.radio_buttons(el),
            BlockKind::Textarea => self.text_input(el),
            _ => return None,
        };
        Some(object.set_opt("confirm", self.confirm(el)).build())
    }

    fn button(&self, el: &Element) -> Object {
        Object::typed("button")
            .set("text", plain_text(self.text_of(el)))
            .set_opt("action_id", action_id(el))
            .set_opt("value", el.get_str("value"))
            .set_opt("url", el.get_str("url"))
            .set_opt("style", el.get_str("style"))
            .set_opt("accessibility_label", el.get_str("accessibilityLabel"))
    }

    fn static_select(&self, el: &Element) -> Object {
        let multiple = is_multiple(el);
        let groups: Vec<&Element> = children_of(el, BlockKind::OptionGroup).collect();
        let loose: Vec<&Element> = children_of(el, BlockKind::OptionItem).collect();

        let options: Vec<&Element> = if groups.is_empty() {
            loose
        } else {
            if !loose.is_empty() {
                debug!(
                    dropped = loose.len(),
                    "Select mixes options and option groups; using the groups"
                );
            }
            groups
                .iter()
                .flat_map(|group| children_of(group, BlockKind::OptionItem))
                .collect()
        };

        let values = if multiple {
            list_attr(el, "value")
        } else {
            el.get_str("value").map(|v| v.into_owned()).into_iter().collect()
        };
        let initial: Vec<Value> = options
            .iter()
            .filter(|option| {
                option.get_bool("selected").unwrap_or(false)
                    || values.contains(&self.option_value(option))
            })
            .map(|option| self.option(option))
            .collect();

        let menu = select_menu(el, "static_select");
        let menu = if groups.is_empty() {
            let options: Vec<Value> = options.iter().map(|o| self.option(o)).collect();
            menu.set("options", options)
        } else {
            let groups: Vec<Value> = groups.iter().map(|g| self.option_group(g)).collect();
            menu.set("option_groups", groups)
        };
        with_initial(menu, multiple, initial)
    }

    /// Options of an external select are its initial selection.
    fn external_select(&self, el: &Element) -> Object {
        let initial: Vec<Value> = children_of(el, BlockKind::OptionItem)
            .map(|option| self.option(option))
            .collect();
        let menu = select_menu(el, "external_select")
            .set_opt("min_query_length", int_attr(el, "minQueryLength"));
        with_initial(menu, is_multiple(el), initial)
    }

    /// Users, conversations and channels menus; their initial selection is a
    /// list of IDs when `multiple` is set.
    fn entity_select(&self, el: &Element, kind: &str, attr: &str, entity: &str) -> Object {
        let menu = select_menu(el, kind);
        if is_multiple(el) {
            let ids = list_attr(el, attr);
            if ids.is_empty() {
                menu
            } else {
                menu.set(&format!("initial_{entity}s"), ids)
            }
        } else {
            menu.set_opt(&format!("initial_{entity}"), el.get_str(attr))
        }
    }

    fn overflow(&self, el: &Element) -> Object {
        let options: Vec<Value> = children_of(el, BlockKind::OverflowItem)
            .map(|item| self.overflow_option(item))
            .collect();
        Object::typed("overflow")
            .set_opt("action_id", action_id(el))
            .set("options", options)
    }

    fn checkboxes(&self, el: &Element) -> Object {
        let values = list_attr(el, "values");
        let boxes: Vec<&Element> = children_of(el, BlockKind::Checkbox).collect();
        let initial: Vec<Value> = boxes
            .iter()
            .filter(|b| b.get_bool("checked").unwrap_or(false) || values.contains(&self.option_value(b)))
            .map(|b| self.choice(b))
            .collect();
        let object = Object::typed("checkboxes")
            .set_opt("action_id", action_id(el))
            .set("options", boxes.iter().map(|b| self.choice(b)).collect::<Vec<_>>());
        with_initial(object, true, initial)
    }

    fn radio_buttons(&self, el: &Element) -> Object {
        let value = el.get_str("value").map(|v| v.into_owned());
        let radios: Vec<&Element> = children_of(el, BlockKind::RadioButton).collect();
        let initial: Vec<Value> = radios
            .iter()
            .filter(|r| {
                r.get_bool("checked").unwrap_or(false)
                    || value.as_deref() == Some(self.option_value(r).as_str())
            })
            .map(|r| self.choice(r))
            .collect();
        let object = Object::typed("radio_buttons")
            .set_opt("action_id", action_id(el))
            .set("options", radios.iter().map(|r| self.choice(r)).collect::<Vec<_>>());
        with_initial(object, false, initial)
    }

    fn text_input(&self, el: &Element) -> Object {
        let text = self.text_of(el);
        let initial = el
            .get_str("value")
            .map(|v| v.into_owned())
            .or_else(|| (!text.is_empty()).then_some(text));
        Object::typed("plain_text_input")
            .set_opt("action_id", action_id(el))
            .set_opt("placeholder", placeholder(el))
            .set_opt("initial_value", initial)
            .set("multiline", true)
            .set_opt("max_length", int_attr(el, "maxLength"))
            .set_opt("min_length", int_attr(el, "minLength"))
    }
}
