//! Condition compiler: MongoDB-style query documents to condition expressions.
//!
//! A query document maps field paths to either a literal (equality) or an
//! operator-document such as `{"$gt": 5}`, and may carry `$and` / `$or`
//! arrays of nested documents. The result is a key-condition, filter or
//! condition expression plus the placeholders it references.
//!
//! An operator-document is a JSON object with exactly one key starting with
//! `$`. Any other value, including multi-key objects, is a literal compared
//! for equality. A `$` key outside the vocabulary is rejected rather than
//! treated as a literal.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::trace;

use super::error::CompileError;
use super::namer::{ExpressionAttributes, NameMap, ValueMap};

/// A compiled condition, serialized under the wire field names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConditionResult {
    /// The boolean expression; empty for an empty query.
    pub condition_expression: String,
    /// Name tokens used by the expression.
    pub expression_attribute_names: NameMap,
    /// Value tokens used by the expression, plus any pre-existing ones.
    pub expression_attribute_values: ValueMap,
}

impl ConditionResult {
    /// Compile `query`, registering values alongside `existing_values`.
    ///
    /// Pass the values of a previous result to layer a second condition on
    /// the same request without placeholder collisions.
    ///
    /// # Errors
    ///
    /// Returns a [`CompileError`] when the document is malformed.
    pub fn parse(query: &Value, existing_values: Option<&ValueMap>) -> Result<Self, CompileError> {
        let mut attributes = existing_values
            .cloned()
            .map(ExpressionAttributes::with_values)
            .unwrap_or_default();
        let condition_expression = compile_condition(query, &mut attributes)?;
        let (names, values) = attributes.into_parts();
        Ok(Self {
            condition_expression,
            expression_attribute_names: names,
            expression_attribute_values: values,
        })
    }

    /// Returns `true` if the query produced no condition.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.condition_expression.is_empty()
    }
}

/// Compile a query document into `attributes`, returning the expression.
///
/// # Errors
///
/// Returns a [`CompileError`] when the document is malformed.
pub fn compile_condition(
    query: &Value,
    attributes: &mut ExpressionAttributes,
) -> Result<String, CompileError> {
    let Value::Object(document) = query else {
        return Err(CompileError::InvalidQuery(
            "a query must be a document".to_owned(),
        ));
    };
    let compiled = compile_document(document, attributes)?;
    trace!(expression = %compiled.expression, "compiled condition");
    Ok(compiled.expression)
}

// ---------------------------------------------------------------------------
// Documents and logical groups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Logical {
    And,
    Or,
}

impl Logical {
    fn keyword(self) -> &'static str {
        match self {
            Self::And => " AND ",
            Self::Or => " OR ",
        }
    }

    fn operator(self) -> &'static str {
        match self {
            Self::And => "$and",
            Self::Or => "$or",
        }
    }
}

/// How a compiled fragment binds when placed beside others.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Binding {
    /// A single predicate or a parenthesized group.
    Atom,
    /// A bare chain joined by the given keyword.
    Chain(Logical),
}

#[derive(Debug)]
struct Compiled {
    expression: String,
    binding: Binding,
}

impl Compiled {
    fn atom(expression: String) -> Self {
        Self {
            expression,
            binding: Binding::Atom,
        }
    }

    fn parenthesized(self) -> Self {
        Self::atom(format!("({})", self.expression))
    }
}

/// Join non-empty parts with `logical`; a single part keeps its own binding.
fn join(mut parts: Vec<Compiled>, logical: Logical) -> Compiled {
    match parts.len() {
        0 => Compiled::atom(String::new()),
        1 => parts.remove(0),
        _ => Compiled {
            expression: parts
                .into_iter()
                .map(|p| p.expression)
                .collect::<Vec<_>>()
                .join(logical.keyword()),
            binding: Binding::Chain(logical),
        },
    }
}

fn compile_document(
    document: &Map<String, Value>,
    attributes: &mut ExpressionAttributes,
) -> Result<Compiled, CompileError> {
    // A logical group is only parenthesized when it sits beside siblings.
    let grouped = document.len() > 1;
    let mut parts = Vec::with_capacity(document.len());

    for (key, value) in document {
        let part = match key.as_str() {
            "$and" => compile_logical(Logical::And, value, attributes)?,
            "$or" => compile_logical(Logical::Or, value, attributes)?,
            operator if operator.starts_with('$') => {
                return Err(CompileError::UnknownOperator {
                    operator: operator.to_owned(),
                });
            }
            path => Compiled::atom(compile_field(path, value, attributes)?),
        };
        if part.expression.is_empty() {
            continue;
        }
        let part = if grouped && part.binding != Binding::Atom {
            part.parenthesized()
        } else {
            part
        };
        parts.push(part);
    }

    Ok(join(parts, Logical::And))
}

fn compile_logical(
    logical: Logical,
    value: &Value,
    attributes: &mut ExpressionAttributes,
) -> Result<Compiled, CompileError> {
    let operator = logical.operator();
    let Value::Array(items) = value else {
        return Err(CompileError::InvalidQuery(format!(
            "{operator} requires an array of documents"
        )));
    };
    if items.is_empty() {
        return Err(CompileError::InvalidQuery(format!(
            "{operator} requires at least one document"
        )));
    }

    let mut parts = Vec::with_capacity(items.len());
    for item in items {
        let Value::Object(document) = item else {
            return Err(CompileError::InvalidQuery(format!(
                "{operator} elements must be documents"
            )));
        };
        let part = compile_document(document, attributes)?;
        if part.expression.is_empty() {
            continue;
        }
        // AND binds tighter than OR, so an OR chain inside AND needs parens.
        let part = if logical == Logical::And && part.binding == Binding::Chain(Logical::Or) {
            part.parenthesized()
        } else {
            part
        };
        parts.push(part);
    }

    Ok(join(parts, logical))
}

// ---------------------------------------------------------------------------
// Field predicates
// ---------------------------------------------------------------------------

/// Field-level operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    Between,
    Not,
    In,
    Nin,
    Contains,
    Exists,
    BeginsWith,
}

impl Operator {
    fn parse(key: &str) -> Result<Self, CompileError> {
        let operator = match key {
            "$eq" => Self::Eq,
            "$ne" => Self::Ne,
            "$lt" => Self::Lt,
            "$lte" => Self::Lte,
            "$gt" => Self::Gt,
            "$gte" => Self::Gte,
            "$between" => Self::Between,
            "$not" => Self::Not,
            "$in" => Self::In,
            "$nin" => Self::Nin,
            "$contains" => Self::Contains,
            "$exists" => Self::Exists,
            "$beginsWith" => Self::BeginsWith,
            _ => {
                return Err(CompileError::UnknownOperator {
                    operator: key.to_owned(),
                });
            }
        };
        Ok(operator)
    }

    fn comparator(self) -> &'static str {
        match self {
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            _ => "=",
        }
    }
}

/// Returns the operator and its operand if `value` is an operator-document.
fn operator_document(value: &Value) -> Result<Option<(Operator, &Value)>, CompileError> {
    let Value::Object(map) = value else {
        return Ok(None);
    };
    if map.len() != 1 {
        return Ok(None);
    }
    match map.iter().next() {
        Some((key, operand)) if key.starts_with('$') => {
            Operator::parse(key).map(|operator| Some((operator, operand)))
        }
        _ => Ok(None),
    }
}

fn compile_field(
    path: &str,
    value: &Value,
    attributes: &mut ExpressionAttributes,
) -> Result<String, CompileError> {
    let name = attributes.key_name(path);
    compile_predicate(path, &name, value, attributes)
}

fn compile_predicate(
    path: &str,
    name: &str,
    value: &Value,
    attributes: &mut ExpressionAttributes,
) -> Result<String, CompileError> {
    let Some((operator, operand)) = operator_document(value)? else {
        let token = attributes.bind_value(path, value);
        return Ok(format!("{name}={token}"));
    };

    let expression = match operator {
        Operator::Eq
        | Operator::Ne
        | Operator::Lt
        | Operator::Lte
        | Operator::Gt
        | Operator::Gte => {
            let token = attributes.bind_value(path, operand);
            format!("{name}{}{token}", operator.comparator())
        }
        Operator::Between => {
            let bounds = match operand {
                Value::Array(bounds) if bounds.len() == 2 => bounds,
                _ => {
                    return Err(CompileError::InvalidQuery(format!(
                        "$between on '{path}' requires an array of exactly two values"
                    )));
                }
            };
            let tokens = attributes.bind_list(path, bounds);
            format!("{name} BETWEEN {} AND {}", tokens[0], tokens[1])
        }
        Operator::Not => format!(
            "NOT {}",
            compile_predicate(path, name, operand, attributes)?
        ),
        Operator::In | Operator::Nin => {
            let candidates = match operand {
                Value::Array(candidates) if !candidates.is_empty() => candidates,
                _ => {
                    return Err(CompileError::InvalidQuery(format!(
                        "$in/$nin on '{path}' requires a non-empty array"
                    )));
                }
            };
            let tokens = attributes.bind_list(path, candidates);
            let negation = if operator == Operator::Nin { "NOT " } else { "" };
            format!("{negation}{name} IN ({})", tokens.join(","))
        }
        Operator::Contains => {
            let token = attributes.bind_value(path, operand);
            format!("contains({name}, {token})")
        }
        Operator::Exists => {
            if is_truthy(operand) {
                format!("attribute_exists({name})")
            } else {
                format!("attribute_not_exists({name})")
            }
        }
        Operator::BeginsWith => {
            let prefix = Value::String(coerce_to_string(operand));
            let token = attributes.bind_value(path, &prefix);
            format!("begins_with({name}, {token})")
        }
    };
    Ok(expression)
}

/// JavaScript-style truthiness, as used by `$exists`.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
