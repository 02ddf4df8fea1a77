//! # dccv-core — Foundational Types for DCC Schema Tooling
//!
//! This crate is the leaf of the workspace. It defines the typed model that
//! every other crate shares: the schema node sum type, the controlled-value
//! list keywords, the untyped data record, and the error hierarchy.
//!
//! ## Key Design Principles
//!
//! 1. **Schema nodes are a sum type.** A property definition is either a
//!    `$ref` ([`SchemaNode::Reference`]) or a concrete [`PropertyNode`].
//!    Consumers match on variants instead of probing keys on a raw map.
//!
//! 2. **Explicit keyword precedence.** [`PropertyNode::value_source`] encodes
//!    the one place where `pattern` and the value-list keywords compete.
//!    Declaring both `anyOf` and `enum` on one property is rejected at parse
//!    time with [`SchemaError::AmbiguousValueList`].
//!
//! 3. **Records stay untyped.** A [`DataRecord`] is a JSON object map. Type
//!    reconciliation happens in `dccv-schema`, never here.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `dccv-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod node;
pub mod record;

// Re-export primary types for ergonomic imports.
pub use error::{DataLoadError, DccvError, SchemaError};
pub use node::{
    type_label, PropertyNode, SchemaNode, ValueEntry, ValueList, ValueListKeyword, ValueSource,
    VALUE_LIST_KEYWORDS,
};
pub use record::{strip_nulls, DataRecord};
