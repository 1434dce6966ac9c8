//! Static nesting grammar for Block Kit trees.
//!
//! Every node type maps to a [`SchemaEntry`]: the attributes it accepts and
//! the node types it may contain. Groups of types that are legal in many
//! places (interactive components, markup, layout blocks) are declared once
//! below and referenced by every rule that uses them, so adding a component
//! to a group makes it legal everywhere the group is.
//!
//! Canonical component names (`Section`) and their HTML-compatible aliases
//! (`section`) share one rule.

use blockforge_core::{AttrValue, TEXT_KIND};
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use thiserror::Error;

/// Key of the virtual root entry listing legal top-level types.
pub const ROOT: &str = "!top";

// ---------------------------------------------------------------------------
// Shared type groups
// ---------------------------------------------------------------------------

pub const SURFACES: &[&str] = &["Blocks", "Modal", "Home"];

pub const LAYOUT_BLOCKS: &[&str] = &[
    "Section", "section", "Divider", "hr", "Image", "img", "Header", "header", "Actions",
    "Context", "Input", "File",
];

pub const INTERACTIVE_COMPONENTS: &[&str] = &[
    "Button",
    "button",
    "Select",
    "select",
    "ExternalSelect",
    "UsersSelect",
    "ConversationsSelect",
    "ChannelsSelect",
    "Overflow",
    "DatePicker",
    "TimePicker",
    "CheckboxGroup",
    "RadioButtonGroup",
];

/// Components that only make sense inside an `Input` block.
pub const TEXT_INPUTS: &[&str] = &["Textarea", "textarea"];

/// Interactive components that cannot be the element of an `Input` block.
pub const NON_INPUT_COMPONENTS: &[&str] = &["Button", "button", "Overflow"];

pub const IMAGES: &[&str] = &["Image", "img"];
pub const SECTION_PARTS: &[&str] = &["Field", "Mrkdwn"];
pub const CONFIRM: &[&str] = &["Confirm"];
pub const OPTIONS: &[&str] = &["Option", "option"];
pub const OPTION_GROUPS: &[&str] = &["Optgroup", "optgroup"];
pub const TEXT: &[&str] = &[TEXT_KIND];

pub const INLINE_MARKUP: &[&str] = &[
    TEXT_KIND, "a", "b", "strong", "i", "em", "s", "strike", "del", "code", "br", "time",
];
pub const BLOCK_MARKUP: &[&str] = &["p", "blockquote", "pre", "ul", "ol"];

/// Everything a text-bearing container may hold.
pub const MARKUP: &[&[&str]] = &[INLINE_MARKUP, BLOCK_MARKUP];

// ---------------------------------------------------------------------------
// Attribute rules
// ---------------------------------------------------------------------------

/// Values an attribute may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowedValues {
    Unconstrained,
    OneOf(&'static [&'static str]),
}

impl AllowedValues {
    pub fn permits(&self, value: &AttrValue) -> bool {
        match self {
            AllowedValues::Unconstrained => true,
            AllowedValues::OneOf(allowed) => {
                let literal = value.literal();
                allowed.iter().any(|a| *a == literal)
            }
        }
    }
}

use AllowedValues::{OneOf, Unconstrained as Any};

type AttrGroup = &'static [(&'static str, AllowedValues)];

pub const BUTTON_STYLES: &[&str] = &["primary", "danger"];
pub const LIST_NUMBERING: &[&str] = &["1", "a", "A", "i", "I"];

const BLOCK_ATTRS: AttrGroup = &[("blockId", Any), ("id", Any)];
const ACTION_ATTRS: AttrGroup = &[("actionId", Any), ("name", Any)];
const PLACEHOLDER_ATTRS: AttrGroup = &[("placeholder", Any)];
const MULTI_SELECT_ATTRS: AttrGroup = &[("multiple", Any), ("maxSelectedItems", Any)];
const VIEW_ATTRS: AttrGroup = &[
    ("callbackId", Any),
    ("privateMetadata", Any),
    ("externalId", Any),
];

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Grammar rule shared by one or more node type names.
struct Rule {
    names: &'static [&'static str],
    attrs: &'static [AttrGroup],
    children: &'static [&'static [&'static str]],
    /// Removed from the union of `children`.
    exclude: &'static [&'static str],
}

const fn rule(
    names: &'static [&'static str],
    attrs: &'static [AttrGroup],
    children: &'static [&'static [&'static str]],
) -> Rule {
    Rule {
        names,
        attrs,
        children,
        exclude: &[],
    }
}

const fn rule_without(
    names: &'static [&'static str],
    attrs: &'static [AttrGroup],
    children: &'static [&'static [&'static str]],
    exclude: &'static [&'static str],
) -> Rule {
    Rule {
        names,
        attrs,
        children,
        exclude,
    }
}

const RULES: &[Rule] = &[
    rule(&[ROOT], &[], &[SURFACES]),
    // Surfaces
    rule(&["Blocks"], &[], &[LAYOUT_BLOCKS]),
    rule_without(
        &["Modal"],
        &[
            VIEW_ATTRS,
            &[
                ("title", Any),
                ("submit", Any),
                ("close", Any),
                ("clearOnClose", Any),
                ("notifyOnClose", Any),
            ],
        ],
        &[LAYOUT_BLOCKS],
        &["File"],
    ),
    rule_without(&["Home"], &[VIEW_ATTRS], &[LAYOUT_BLOCKS], &["File"]),
    // Layout blocks
    rule(
        &["Section", "section"],
        &[BLOCK_ATTRS],
        &[INLINE_MARKUP, BLOCK_MARKUP, SECTION_PARTS, INTERACTIVE_COMPONENTS, IMAGES],
    ),
    rule(&["Field"], &[], MARKUP),
    rule(&["Mrkdwn"], &[&[("verbatim", Any), ("raw", Any)]], MARKUP),
    rule(&["Divider", "hr"], &[BLOCK_ATTRS], &[]),
    rule(
        &["Image", "img"],
        &[BLOCK_ATTRS, &[("src", Any), ("alt", Any), ("title", Any)]],
        &[],
    ),
    rule(&["Header", "header"], &[BLOCK_ATTRS], &[TEXT]),
    rule(&["Actions"], &[BLOCK_ATTRS], &[INTERACTIVE_COMPONENTS]),
    rule(
        &["Context"],
        &[BLOCK_ATTRS],
        &[INLINE_MARKUP, BLOCK_MARKUP, IMAGES, &["Mrkdwn"]],
    ),
    rule_without(
        &["Input"],
        &[
            BLOCK_ATTRS,
            &[
                ("label", Any),
                ("hint", Any),
                ("optional", Any),
                ("dispatchAction", Any),
            ],
        ],
        &[INTERACTIVE_COMPONENTS, TEXT_INPUTS],
        NON_INPUT_COMPONENTS,
    ),
    rule(
        &["File"],
        &[BLOCK_ATTRS, &[("externalId", Any), ("source", OneOf(&["remote"]))]],
        &[],
    ),
    // Interactive components
    rule(
        &["Button", "button"],
        &[
            ACTION_ATTRS,
            &[
                ("value", Any),
                ("url", Any),
                ("style", OneOf(BUTTON_STYLES)),
                ("accessibilityLabel", Any),
            ],
        ],
        &[TEXT, CONFIRM],
    ),
    rule(
        &["Select", "select"],
        &[ACTION_ATTRS, PLACEHOLDER_ATTRS, MULTI_SELECT_ATTRS, &[("value", Any)]],
        &[OPTIONS, OPTION_GROUPS, CONFIRM],
    ),
    rule(
        &["ExternalSelect"],
        &[
            ACTION_ATTRS,
            PLACEHOLDER_ATTRS,
            MULTI_SELECT_ATTRS,
            &[("minQueryLength", Any)],
        ],
        &[OPTIONS, CONFIRM],
    ),
    rule(
        &["UsersSelect"],
        &[
            ACTION_ATTRS,
            PLACEHOLDER_ATTRS,
            MULTI_SELECT_ATTRS,
            &[("initialUser", Any)],
        ],
        &[CONFIRM],
    ),
    rule(
        &["ConversationsSelect"],
        &[
            ACTION_ATTRS,
            PLACEHOLDER_ATTRS,
            MULTI_SELECT_ATTRS,
            &[
                ("initialConversation", Any),
                ("defaultToCurrentConversation", Any),
            ],
        ],
        &[CONFIRM],
    ),
    rule(
        &["ChannelsSelect"],
        &[
            ACTION_ATTRS,
            PLACEHOLDER_ATTRS,
            MULTI_SELECT_ATTRS,
            &[("initialChannel", Any)],
        ],
        &[CONFIRM],
    ),
    rule(&["Overflow"], &[ACTION_ATTRS], &[&["OverflowItem"], CONFIRM]),
    rule(
        &["DatePicker"],
        &[ACTION_ATTRS, PLACEHOLDER_ATTRS, &[("initialDate", Any), ("value", Any)]],
        &[CONFIRM],
    ),
    rule(
        &["TimePicker"],
        &[ACTION_ATTRS, PLACEHOLDER_ATTRS, &[("initialTime", Any), ("value", Any)]],
        &[CONFIRM],
    ),
    rule(
        &["CheckboxGroup"],
        &[ACTION_ATTRS, &[("values", Any)]],
        &[&["Checkbox"], CONFIRM],
    ),
    rule(
        &["RadioButtonGroup"],
        &[ACTION_ATTRS, &[("value", Any)]],
        &[&["RadioButton"], CONFIRM],
    ),
    rule(
        &["Textarea", "textarea"],
        &[
            ACTION_ATTRS,
            PLACEHOLDER_ATTRS,
            &[("value", Any), ("maxLength", Any), ("minLength", Any)],
        ],
        &[TEXT],
    ),
    // Composition parts
    rule(
        &["Confirm"],
        &[&[
            ("title", Any),
            ("confirm", Any),
            ("deny", Any),
            ("style", OneOf(BUTTON_STYLES)),
        ]],
        MARKUP,
    ),
    rule(
        &["Option", "option"],
        &[&[("value", Any), ("selected", Any), ("description", Any)]],
        &[TEXT],
    ),
    rule(&["Optgroup", "optgroup"], &[&[("label", Any)]], &[OPTIONS]),
    rule(&["OverflowItem"], &[&[("value", Any), ("url", Any)]], &[TEXT]),
    rule(
        &["Checkbox", "RadioButton"],
        &[&[("value", Any), ("checked", Any), ("description", Any)]],
        &[INLINE_MARKUP],
    ),
    // Markup
    rule_without(&["b", "strong"], &[], &[INLINE_MARKUP], &["b", "strong"]),
    rule_without(&["i", "em"], &[], &[INLINE_MARKUP], &["i", "em"]),
    rule_without(
        &["s", "strike", "del"],
        &[],
        &[INLINE_MARKUP],
        &["s", "strike", "del"],
    ),
    rule_without(&["code"], &[], &[INLINE_MARKUP], &["code"]),
    rule_without(&["a"], &[&[("href", Any)]], &[INLINE_MARKUP], &["a"]),
    rule(&["time"], &[&[("datetime", Any), ("fallback", Any)]], &[TEXT]),
    rule(&["br"], &[], &[]),
    rule(&["p"], &[], &[INLINE_MARKUP]),
    rule_without(&["blockquote"], &[], MARKUP, &["blockquote"]),
    rule(&["pre"], &[], &[&[TEXT_KIND, "a", "br"]]),
    rule(&["ul"], &[], &[&["li"]]),
    rule(
        &["ol"],
        &[&[("start", Any), ("type", OneOf(LIST_NUMBERING))]],
        &[&["li"]],
    ),
    rule(&["li"], &[&[("value", Any)]], MARKUP),
];

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Inconsistencies in the static grammar, caught while building it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("<{parent}> lists unknown child type <{child}>")]
    UnknownChild { parent: String, child: String },

    #[error("node type <{0}> is declared more than once")]
    DuplicateType(String),
}

/// Grammar rule for one node type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaEntry {
    attrs: BTreeMap<&'static str, AllowedValues>,
    children: BTreeSet<&'static str>,
}

impl SchemaEntry {
    /// Declared rule for attribute `name`, if the type accepts it.
    pub fn attr(&self, name: &str) -> Option<&AllowedValues> {
        self.attrs.get(name)
    }

    pub fn allows_child(&self, kind: &str) -> bool {
        self.children.contains(kind)
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&'static str, &AllowedValues)> {
        self.attrs.iter().map(|(name, allowed)| (*name, allowed))
    }

    pub fn children(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.children.iter().copied()
    }

    fn from_rule(rule: &Rule) -> Self {
        let attrs = rule
            .attrs
            .iter()
            .flat_map(|group| group.iter().copied())
            .collect();
        let children = rule
            .children
            .iter()
            .flat_map(|group| group.iter().copied())
            .filter(|kind| !rule.exclude.contains(kind))
            .collect();
        Self { attrs, children }
    }
}

static GLOBAL: Lazy<SchemaRegistry> =
    Lazy::new(|| SchemaRegistry::build().expect("static schema is consistent"));

/// Immutable table from node type to its grammar rule.
#[derive(Debug)]
pub struct SchemaRegistry {
    entries: HashMap<&'static str, SchemaEntry>,
}

impl SchemaRegistry {
    /// Build and check the registry from the static rules.
    pub fn build() -> Result<Self, RegistryError> {
        Self::from_rules(RULES)
    }

    /// Process-wide registry, built on first use.
    pub fn global() -> &'static SchemaRegistry {
        &GLOBAL
    }

    fn from_rules(rules: &[Rule]) -> Result<Self, RegistryError> {
        let mut entries = HashMap::new();
        for rule in rules {
            let entry = SchemaEntry::from_rule(rule);
            for name in rule.names {
                if entries.insert(*name, entry.clone()).is_some() {
                    return Err(RegistryError::DuplicateType(name.to_string()));
                }
            }
        }

        for (parent, entry) in &entries {
            if let Some(child) = entry
                .children()
                .find(|child| *child != TEXT_KIND && !entries.contains_key(child))
            {
                return Err(RegistryError::UnknownChild {
                    parent: parent.to_string(),
                    child: child.to_string(),
                });
            }
        }

        Ok(Self { entries })
    }

    pub fn lookup(&self, kind: &str) -> Option<&SchemaEntry> {
        self.entries.get(kind)
    }

    /// Entry of the virtual root.
    pub fn root(&self) -> &SchemaEntry {
        // Present by construction: RULES declares ROOT.
        &self.entries[ROOT]
    }

    /// All declared node types, excluding the virtual root.
    pub fn kinds(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied().filter(|kind| *kind != ROOT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> &'static SchemaRegistry {
        SchemaRegistry::global()
    }

    #[test]
    fn static_rules_are_consistent() {
        assert!(SchemaRegistry::build().is_ok());
    }

    #[test]
    fn root_lists_surfaces() {
        let root = registry().root();
        let mut tops: Vec<_> = root.children().collect();
        tops.sort_unstable();
        assert_eq!(tops, vec!["Blocks", "Home", "Modal"]);
    }

    #[test]
    fn aliases_share_rules() {
        for (canonical, alias) in [
            ("Section", "section"),
            ("Divider", "hr"),
            ("Image", "img"),
            ("Button", "button"),
            ("Select", "select"),
        ] {
            assert_eq!(registry().lookup(canonical), registry().lookup(alias));
        }
    }

    #[test]
    fn emphasis_cannot_nest_equivalents() {
        let bold = registry().lookup("b").unwrap();
        assert!(!bold.allows_child("b"));
        assert!(!bold.allows_child("strong"));
        assert!(bold.allows_child("i"));
        assert!(bold.allows_child(TEXT_KIND));

        let strike = registry().lookup("del").unwrap();
        for equivalent in ["s", "strike", "del"] {
            assert!(!strike.allows_child(equivalent));
        }
    }

    #[test]
    fn interactive_group_is_shared() {
        let section = registry().lookup("Section").unwrap();
        let actions = registry().lookup("Actions").unwrap();
        let input = registry().lookup("Input").unwrap();
        for component in INTERACTIVE_COMPONENTS {
            assert!(section.allows_child(component), "{component} in Section");
            assert!(actions.allows_child(component), "{component} in Actions");
            assert_eq!(
                input.allows_child(component),
                !NON_INPUT_COMPONENTS.contains(component),
                "{component} in Input"
            );
        }
        assert!(input.allows_child("Textarea"));
        assert!(!actions.allows_child("Textarea"));
    }

    #[test]
    fn divider_has_no_children() {
        assert_eq!(registry().lookup("Divider").unwrap().children().count(), 0);
    }

    #[test]
    fn enumerated_attributes() {
        let button = registry().lookup("Button").unwrap();
        let style = button.attr("style").unwrap();
        assert!(style.permits(&AttrValue::from("danger")));
        assert!(!style.permits(&AttrValue::from("warning")));
        assert_eq!(button.attr("actionId"), Some(&AllowedValues::Unconstrained));
        assert!(button.attr("href").is_none());

        let numbering = registry().lookup("ol").unwrap().attr("type").unwrap();
        assert!(numbering.permits(&AttrValue::Number(1.0)));
        assert!(numbering.permits(&AttrValue::from("I")));
        assert!(!numbering.permits(&AttrValue::from("x")));
    }

    #[test]
    fn every_listed_child_is_declared() {
        let reg = registry();
        for kind in reg.kinds() {
            for child in reg.lookup(kind).unwrap().children() {
                assert!(child == TEXT_KIND || reg.lookup(child).is_some(), "{kind} -> {child}");
            }
        }
    }

    #[test]
    fn dangling_child_is_rejected() {
        const BROKEN: &[Rule] = &[rule(&[ROOT], &[], &[&["Nowhere"]])];
        assert_eq!(
            SchemaRegistry::from_rules(BROKEN).unwrap_err(),
            RegistryError::UnknownChild {
                parent: ROOT.into(),
                child: "Nowhere".into()
            }
        );
    }

    #[test]
    fn duplicate_type_is_rejected() {
        const DUPLICATED: &[Rule] = &[rule(&["br"], &[], &[]), rule(&["br"], &[], &[])];
        assert_eq!(
            SchemaRegistry::from_rules(DUPLICATED).unwrap_err(),
            RegistryError::DuplicateType("br".into())
        );
    }
}
