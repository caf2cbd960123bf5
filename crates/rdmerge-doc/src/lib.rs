//! Document model for rdmerge.
//!
//! A [`DocumentTree`] is a mutable element tree that keeps qualified names
//! exactly as written (`x:Key`, `local:Brush`), so namespace prefixes can be
//! rewritten in place when documents are combined. Parsing and serialization
//! sit on top of `quick-xml`; attribute values and character data are kept
//! in their escaped form and written back verbatim.
//!
//! # Key Types
//!
//! - [`DocumentTree`]: a parsed document with a single root element
//! - [`Element`] / [`Node`] / [`Attribute`]: tree navigation and mutation
//! - [`WriteOptions`]: serializer settings

pub mod error;
pub mod names;
pub mod parse;
pub mod serialize;
pub mod tree;

pub use error::{DocError, DocResult};
pub use parse::{parse, parse_str};
pub use serialize::{serialize, WriteOptions};
pub use tree::{Attribute, Descendants, DocumentTree, Element, Node};
