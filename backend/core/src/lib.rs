//! `blockforge-core` — the node tree handed to the compiler and the errors it
//! can raise.

pub mod error;
pub mod node;

pub use error::ValidationError;
pub use node::{AttrValue, Element, Node, TEXT_KIND};
