//! Editor documents stored as JSON node trees, and the mentions inside them.

mod mentions;
mod node;

pub use mentions::extract_mentions;
pub use node::{Document, MENTION_NODE, Node, ParseError, TEXT_NODE, Visitor};
