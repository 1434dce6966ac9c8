use thiserror::Error;

/// Structural violations found while checking a node tree against the schema.
///
/// Every variant carries the `path` of the offending node, e.g.
/// `Blocks > Section[0] > b[1]`, so the message can be shown to the tree
/// author as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown node type <{kind}> at {path}")]
    UnknownType { kind: String, path: String },

    #[error("<{child}> is not allowed as a child of <{parent}> at {path}")]
    InvalidChild {
        parent: String,
        child: String,
        path: String,
    },

    #[error("<{kind}> does not accept attribute \"{attr}\" at {path}")]
    InvalidAttribute {
        kind: String,
        attr: String,
        path: String,
    },

    #[error(
        "<{kind}> attribute \"{attr}\" cannot be \"{value}\" (expected one of: {allowed}) at {path}",
        allowed = .allowed.join(", ")
    )]
    InvalidAttributeValue {
        kind: String,
        attr: String,
        value: String,
        allowed: Vec<String>,
        path: String,
    },
}

impl ValidationError {
    /// Location of the offending node within the input tree.
    pub fn path(&self) -> &str {
        match self {
            Self::UnknownType { path, .. }
            | Self::InvalidChild { path, .. }
            | Self::InvalidAttribute { path, .. }
            | Self::InvalidAttributeValue { path, .. } => path,
        }
    }
}
