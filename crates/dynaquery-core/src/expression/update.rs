//! Update compiler: MongoDB-style update documents to update expressions.
//!
//! Each top-level operator contributes actions to one of the four clauses,
//! which are rendered in the fixed order `SET`, `REMOVE`, `ADD`, `DELETE`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{trace, warn};

use dynaquery_model::AttributeValue;

use super::error::CompileError;
use super::namer::{ExpressionAttributes, NameMap, ValueMap};

/// A compiled update, serialized under the wire field names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateResult {
    /// The update expression; empty when nothing is updated.
    pub update_expression: String,
    /// Name tokens used by the expression.
    pub expression_attribute_names: NameMap,
    /// Value tokens used by the expression, plus any pre-existing ones.
    pub expression_attribute_values: ValueMap,
}

impl UpdateResult {
    /// Compile `update`, registering values alongside `existing_values`.
    ///
    /// # Errors
    ///
    /// Returns a [`CompileError`] when the document is malformed.
    pub fn parse(update: &Value, existing_values: Option<&ValueMap>) -> Result<Self, CompileError> {
        let mut attributes = existing_values
            .cloned()
            .map(ExpressionAttributes::with_values)
            .unwrap_or_default();
        let update_expression = compile_update(update, &mut attributes)?;
        let (names, values) = attributes.into_parts();
        Ok(Self {
            update_expression,
            expression_attribute_names: names,
            expression_attribute_values: values,
        })
    }

    /// Returns `true` if the update produced no actions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.update_expression.is_empty()
    }
}

/// Top-level update operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpdateOperator {
    Set,
    Unset,
    Inc,
    Push,
    Unshift,
    AddToSet,
    RemoveFromSet,
}

impl UpdateOperator {
    fn parse(key: &str) -> Option<Self> {
        match key {
            "$set" => Some(Self::Set),
            "$unset" => Some(Self::Unset),
            "$inc" => Some(Self::Inc),
            "$push" => Some(Self::Push),
            "$unshift" => Some(Self::Unshift),
            "$addToSet" => Some(Self::AddToSet),
            "$removeFromSet" => Some(Self::RemoveFromSet),
            _ => None,
        }
    }
}

/// Actions collected per clause.
#[derive(Debug, Default)]
struct Clauses {
    set: Vec<String>,
    remove: Vec<String>,
    add: Vec<String>,
    delete: Vec<String>,
}

impl Clauses {
    fn render(&self) -> String {
        [
            ("SET", &self.set),
            ("REMOVE", &self.remove),
            ("ADD", &self.add),
            ("DELETE", &self.delete),
        ]
        .into_iter()
        .filter(|(_, actions)| !actions.is_empty())
        .map(|(keyword, actions)| format!("{keyword} {}", actions.join(", ")))
        .collect::<Vec<_>>()
        .join(" ")
    }
}

/// Compile an update document into `attributes`, returning the expression.
///
/// Unrecognized top-level keys are skipped with a warning.
///
/// # Errors
///
/// Returns a [`CompileError`] when the document is malformed.
pub fn compile_update(
    update: &Value,
    attributes: &mut ExpressionAttributes,
) -> Result<String, CompileError> {
    let Value::Object(document) = update else {
        return Err(CompileError::InvalidUpdate(
            "an update must be a document".to_owned(),
        ));
    };

    let mut clauses = Clauses::default();
    for (key, argument) in document {
        let Some(operator) = UpdateOperator::parse(key) else {
            warn!(operator = %key, "ignoring unrecognized update operator");
            continue;
        };
        let Value::Object(fields) = argument else {
            return Err(CompileError::InvalidUpdate(format!(
                "{key} requires a document of fields"
            )));
        };
        for (path, value) in fields {
            compile_action(operator, path, value, attributes, &mut clauses)?;
        }
    }

    let expression = clauses.render();
    trace!(expression = %expression, "compiled update");
    Ok(expression)
}

fn compile_action(
    operator: UpdateOperator,
    path: &str,
    value: &Value,
    attributes: &mut ExpressionAttributes,
    clauses: &mut Clauses,
) -> Result<(), CompileError> {
    let name = attributes.key_name(path);
    match operator {
        UpdateOperator::Set => {
            let action = match if_not_exists_operand(value) {
                Some(fallback) => {
                    let token = attributes.bind_value(path, fallback);
                    format!("{name}=if_not_exists({name}, {token})")
                }
                None => {
                    let token = attributes.bind_value(path, value);
                    format!("{name}={token}")
                }
            };
            clauses.set.push(action);
        }
        UpdateOperator::Unset => clauses.remove.push(name),
        UpdateOperator::Inc => {
            if !value.is_number() {
                return Err(CompileError::InvalidUpdate(format!(
                    "$inc on '{path}' requires a number"
                )));
            }
            let token = attributes.bind_value(path, value);
            clauses.add.push(format!("{name} {token}"));
        }
        UpdateOperator::Push | UpdateOperator::Unshift => {
            let elements = list_elements(path, value)?;
            let token = attributes.bind_attribute(path, elements);
            let existing = format!("if_not_exists({name}, {})", attributes.bind_empty_list());
            let action = if operator == UpdateOperator::Push {
                format!("{name}=list_append({existing}, {token})")
            } else {
                format!("{name}=list_append({token}, {existing})")
            };
            clauses.set.push(action);
        }
        UpdateOperator::AddToSet | UpdateOperator::RemoveFromSet => {
            let set = native_set(path, value)?;
            let token = attributes.bind_attribute(path, set);
            let action = format!("{name} {token}");
            if operator == UpdateOperator::AddToSet {
                clauses.add.push(action);
            } else {
                clauses.delete.push(action);
            }
        }
    }
    Ok(())
}

/// Returns the operand of a `{ "$ifNotExists": v }` document.
fn if_not_exists_operand(value: &Value) -> Option<&Value> {
    single_key(value, "$ifNotExists")
}

/// Returns the operand of a `{ "$each": [...] }` document.
fn each_operand<'a>(path: &str, value: &'a Value) -> Result<Option<&'a [Value]>, CompileError> {
    let Some(each) = single_key(value, "$each") else {
        return Ok(None);
    };
    match each {
        Value::Array(items) => Ok(Some(items.as_slice())),
        _ => Err(CompileError::InvalidUpdate(format!(
            "$each on '{path}' requires an array"
        ))),
    }
}

fn single_key<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) if map.len() == 1 => map.get(key),
        _ => None,
    }
}

/// The list appended by `$push`/`$unshift`.
fn list_elements(path: &str, value: &Value) -> Result<AttributeValue, CompileError> {
    let elements = match each_operand(path, value)? {
        Some(items) => items.iter().map(AttributeValue::from_json).collect(),
        None => vec![AttributeValue::from_json(value)],
    };
    Ok(AttributeValue::L(elements))
}

/// The string or number set added or deleted by `$addToSet`/`$removeFromSet`.
fn native_set(path: &str, value: &Value) -> Result<AttributeValue, CompileError> {
    let members: &[Value] = match each_operand(path, value)? {
        Some(items) => items,
        None => match value {
            Value::Array(items) => items.as_slice(),
            scalar => std::slice::from_ref(scalar),
        },
    };

    let invalid = || {
        CompileError::InvalidUpdate(format!(
            "set members for '{path}' must be all strings or all numbers"
        ))
    };
    let Some(first) = members.first() else {
        return Err(CompileError::InvalidUpdate(format!(
            "set for '{path}' must not be empty"
        )));
    };

    match first {
        Value::String(_) => {
            let mut set = Vec::with_capacity(members.len());
            for member in members {
                let Value::String(s) = member else {
                    return Err(invalid());
                };
                push_unique(&mut set, s.clone());
            }
            Ok(AttributeValue::Ss(set))
        }
        Value::Number(_) => {
            let mut set = Vec::with_capacity(members.len());
            for member in members {
                let Value::Number(n) = member else {
                    return Err(invalid());
                };
                push_unique(&mut set, n.to_string());
            }
            Ok(AttributeValue::Ns(set))
        }
        _ => Err(invalid()),
    }
}

fn push_unique(set: &mut Vec<String>, member: String) {
    if !set.contains(&member) {
        set.push(member);
    }
}
