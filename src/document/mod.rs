//! XML document model
//!
//! A small mutable tree that the normalizer edits in place. Only element
//! attributes are decoded; all other markup is carried through as raw text so
//! that untouched content is written back exactly as it was read.

mod reader;
mod tree;
mod writer;

pub use tree::{Attribute, Document, Element, Node};
pub use writer::XML_DECLARATION;
