//! Compilers from MongoDB-style documents to store expressions.
//!
//! - [`namer`]: placeholder tokens and the shared [`ExpressionAttributes`]
//!   accumulator.
//! - [`condition`]: query documents to key-condition, filter and condition
//!   expressions.
//! - [`update`]: update documents to update expressions.
//! - [`projection`]: field lists to projection expressions.
//!
//! Every compiler writes into the accumulator it is handed, so expressions
//! compiled for the same request never disagree about what a token means.

pub mod condition;
pub mod error;
pub mod namer;
pub mod projection;
pub mod update;

pub use condition::{ConditionResult, compile_condition};
pub use error::CompileError;
pub use namer::{
    EMPTY_LIST_PLACEHOLDER, ExpressionAttributes, KeyName, NameMap, ValueBinding, ValueMap,
    ValueName, generate_key_name, generate_value_name,
};
pub use projection::compile_projection;
pub use update::{UpdateResult, compile_update};
