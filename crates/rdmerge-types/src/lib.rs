//! Foundation types for rdmerge.
//!
//! This crate provides the small value types shared by every stage of a
//! merge run. Every other rdmerge crate depends on `rdmerge-types`.
//!
//! # Key Types
//!
//! - [`Priority`]: Merge priority of a document in the reference graph
//! - [`ElementKey`]: Identity of a keyed resource entry
//! - [`NamespaceBinding`]: A prefix-to-URI association
//! - [`ErrorCode`]: Closed set of fatal conditions with stable numeric codes

pub mod code;
pub mod key;
pub mod namespace;
pub mod priority;
pub mod xaml;

pub use code::ErrorCode;
pub use key::ElementKey;
pub use namespace::NamespaceBinding;
pub use priority::Priority;
