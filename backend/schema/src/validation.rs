//! Tree validation against the schema registry.
//!
//! Depth-first, pre-order, fail-fast: the first violation aborts the walk
//! and is returned with the path of the offending node.

use crate::registry::{AllowedValues, SchemaEntry, SchemaRegistry, ROOT};
use blockforge_core::{Element, Node, ValidationError, TEXT_KIND};
use tracing::debug;

/// A tree that passed validation. Only [`Validator`] can construct one, so
/// holding it proves the tree's shape matches the grammar.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedTree<'a> {
    root: &'a Element,
}

impl<'a> ValidatedTree<'a> {
    pub fn root(&self) -> &'a Element {
        self.root
    }
}

/// Validate `root` against the process-wide registry.
pub fn validate(root: &Element) -> Result<ValidatedTree<'_>, ValidationError> {
    Validator::new(SchemaRegistry::global()).validate(root)
}

pub struct Validator<'r> {
    registry: &'r SchemaRegistry,
}

impl<'r> Validator<'r> {
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self { registry }
    }

    pub fn validate<'a>(&self, root: &'a Element) -> Result<ValidatedTree<'a>, ValidationError> {
        let mut visited = 0usize;
        self.check_element(ROOT, self.registry.root(), root, &root.kind, &mut visited)?;
        debug!(root = %root.kind, nodes = visited, "Validated tree");
        Ok(ValidatedTree { root })
    }

    fn check_element(
        &self,
        parent: &str,
        parent_entry: &SchemaEntry,
        element: &Element,
        path: &str,
        visited: &mut usize,
    ) -> Result<(), ValidationError> {
        *visited += 1;

        let entry = self
            .registry
            .lookup(&element.kind)
            .ok_or_else(|| ValidationError::UnknownType {
                kind: element.kind.clone(),
                path: path.to_string(),
            })?;

        if !parent_entry.allows_child(&element.kind) {
            return Err(ValidationError::InvalidChild {
                parent: parent.to_string(),
                child: element.kind.clone(),
                path: path.to_string(),
            });
        }

        for (name, value) in &element.attrs {
            let allowed = entry
                .attr(name)
                .ok_or_else(|| ValidationError::InvalidAttribute {
                    kind: element.kind.clone(),
                    attr: name.clone(),
                    path: path.to_string(),
                })?;

            if value.is_null() {
                continue;
            }
            if let AllowedValues::OneOf(literals) = allowed {
                if !allowed.permits(value) {
                    return Err(ValidationError::InvalidAttributeValue {
                        kind: element.kind.clone(),
                        attr: name.clone(),
                        value: value.literal().into_owned(),
                        allowed: literals.iter().map(|l| l.to_string()).collect(),
                        path: path.to_string(),
                    });
                }
            }
        }

        for (index, child) in element.children.iter().enumerate() {
            match child {
                Node::Element(nested) => {
                    let child_path = format!("{path} > {}[{index}]", nested.kind);
                    self.check_element(&element.kind, entry, nested, &child_path, visited)?;
                }
                Node::Text(_) if child.is_blank_text() => {}
                Node::Text(_) => {
                    *visited += 1;
                    if !entry.allows_child(TEXT_KIND) {
                        return Err(ValidationError::InvalidChild {
                            parent: element.kind.clone(),
                            child: TEXT_KIND.to_string(),
                            path: format!("{path} > {TEXT_KIND}[{index}]"),
                        });
                    }
                }
            }
        }

        Ok(())
    }
}
