//! Wire-protocol types for dynaquery.
//!
//! These types mirror the document store's JSON protocol (`awsJson1_0`) so the
//! requests produced by the query builder can be handed to any client that
//! speaks it. Only the operations the builder emits are modeled: `Query`,
//! `Scan`, `UpdateItem` and `DeleteItem`.
// "DynamoDB" and wire field names appear in most doc comments in this crate.
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]

pub mod attribute_value;
pub mod document;
pub mod error;
pub mod input;
pub mod output;
pub mod types;

pub use attribute_value::AttributeValue;
pub use document::{Item, item_from_document, item_to_document};
pub use error::{ServiceError, ServiceErrorCode};
pub use input::AttributeNames;
