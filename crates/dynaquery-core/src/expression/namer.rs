//! Placeholder generation for expression attribute names and values.
//!
//! Every attribute path in a compiled expression is written as `#k_<field>`
//! name tokens and every literal as a `:v_<key>` value token. The tokens and
//! what they stand for are collected in an [`ExpressionAttributes`]
//! accumulator that lives for one request-building session, so that
//! successive compile calls share a single, collision-free namespace:
//!
//! - the same token bound to the same value is reused;
//! - a token already bound to something else gets a numeric suffix
//!   (`:v_a`, `:v_a_1`, `:v_a_2`, ...).

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use dynaquery_model::AttributeValue;
use serde_json::Value;

use super::error::CompileError;

/// Name token to field name (`ExpressionAttributeNames`).
pub type NameMap = HashMap<String, String>;

/// Value token to literal (`ExpressionAttributeValues`).
pub type ValueMap = HashMap<String, AttributeValue>;

const NAME_PREFIX: &str = "#k_";
const VALUE_PREFIX: &str = ":v_";

/// Value token bound to `[]`, the fallback operand for `list_append`.
pub const EMPTY_LIST_PLACEHOLDER: &str = ":_v_empty_list";

/// Expression fragment and name entries produced for one attribute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyName {
    /// Dot-joined name tokens, array indices preserved (`#k_foo.#k_bar[0]`).
    pub expression: String,
    /// The name entries this path registered.
    pub names: NameMap,
}

/// Value placeholder(s) produced for one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueName {
    /// A single token bound to the whole value.
    Single(String),
    /// One token per array element, in element order.
    List(Vec<String>),
}

/// Value placeholder(s) together with the value map they were registered in.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueBinding {
    /// The generated placeholder(s).
    pub expression: ValueName,
    /// The existing entries plus any newly registered ones.
    pub values: ValueMap,
}

/// Accumulated `ExpressionAttributeNames` and `ExpressionAttributeValues`.
///
/// Entries are only ever added. Compile functions take this by `&mut` so a
/// key condition, its filters and a projection can be built into one request
/// without placeholder collisions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpressionAttributes {
    names: NameMap,
    values: ValueMap,
}

impl ExpressionAttributes {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an accumulator seeded with previously registered values.
    #[must_use]
    pub fn with_values(values: ValueMap) -> Self {
        Self {
            names: NameMap::new(),
            values,
        }
    }

    /// The registered name tokens.
    #[must_use]
    pub fn names(&self) -> &NameMap {
        &self.names
    }

    /// The registered value tokens.
    #[must_use]
    pub fn values(&self) -> &ValueMap {
        &self.values
    }

    /// Returns `true` if nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.values.is_empty()
    }

    /// Split into the name and value maps.
    #[must_use]
    pub fn into_parts(self) -> (NameMap, ValueMap) {
        (self.names, self.values)
    }

    /// Register the name tokens for a dotted attribute path and return the
    /// expression fragment that refers to it.
    ///
    /// `foo.bar[0]` becomes `#k_foo.#k_bar[0]` with `#k_foo -> foo` and
    /// `#k_bar -> bar`.
    pub fn key_name(&mut self, path: &str) -> String {
        path.split('.')
            .map(|segment| {
                let (field, index) = split_index_suffix(segment);
                let token = claim(
                    &mut self.names,
                    format!("{NAME_PREFIX}{}", sanitize(field)),
                    field.to_owned(),
                );
                format!("{token}{index}")
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Register a top-level attribute name as a single token.
    ///
    /// Unlike [`key_name`](Self::key_name) the name is never split, so a key
    /// attribute called `a.b` becomes `#k_a_b -> a.b`.
    pub fn key_attribute_name(&mut self, attribute: &str) -> String {
        claim(
            &mut self.names,
            format!("{NAME_PREFIX}{}", sanitize(attribute)),
            attribute.to_owned(),
        )
    }

    /// Register value placeholder(s) for `value` under `key`.
    ///
    /// Arrays are exploded into one token per element unless `raw_array` is
    /// set, in which case the array is bound as a single list value.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::InvalidValue`] when `value` is `None`.
    pub fn value_name(
        &mut self,
        key: &str,
        value: Option<&Value>,
        raw_array: bool,
    ) -> Result<ValueName, CompileError> {
        let value = value.ok_or_else(|| CompileError::InvalidValue {
            key: key.to_owned(),
        })?;
        match value {
            Value::Array(items) if !raw_array => Ok(ValueName::List(self.bind_list(key, items))),
            _ => Ok(ValueName::Single(self.bind_value(key, value))),
        }
    }

    /// Bind a JSON value as a single placeholder.
    pub fn bind_value(&mut self, key: &str, value: &Value) -> String {
        self.bind_attribute(key, AttributeValue::from_json(value))
    }

    /// Bind each element of `items` to its own placeholder (`<key>_0`, ...).
    pub fn bind_list(&mut self, key: &str, items: &[Value]) -> Vec<String> {
        items
            .iter()
            .enumerate()
            .map(|(i, item)| self.bind_value(&format!("{key}_{i}"), item))
            .collect()
    }

    /// Bind an already-typed value (lists, native sets) as a single placeholder.
    pub fn bind_attribute(&mut self, key: &str, value: AttributeValue) -> String {
        claim(
            &mut self.values,
            format!("{VALUE_PREFIX}{}", sanitize(key)),
            value,
        )
    }

    /// Bind the `[]` sentinel used to guard `list_append` against a missing
    /// attribute, returning its token.
    pub fn bind_empty_list(&mut self) -> &'static str {
        self.values
            .entry(EMPTY_LIST_PLACEHOLDER.to_owned())
            .or_insert_with(AttributeValue::empty_list);
        EMPTY_LIST_PLACEHOLDER
    }
}

/// Generate the name tokens for a single path, independent of any session.
///
/// ```
/// use dynaquery_core::expression::generate_key_name;
///
/// let key = generate_key_name("foo.bar");
/// assert_eq!(key.expression, "#k_foo.#k_bar");
/// assert_eq!(key.names["#k_bar"], "bar");
/// ```
#[must_use]
pub fn generate_key_name(path: &str) -> KeyName {
    let mut attributes = ExpressionAttributes::new();
    let expression = attributes.key_name(path);
    KeyName {
        expression,
        names: attributes.names,
    }
}

/// Generate value placeholder(s) against an existing value map.
///
/// # Errors
///
/// Returns [`CompileError::InvalidValue`] when `value` is `None`.
#[allow(clippy::implicit_hasher)]
pub fn generate_value_name(
    key: &str,
    value: Option<&Value>,
    existing_values: &ValueMap,
    raw_array: bool,
) -> Result<ValueBinding, CompileError> {
    let mut attributes = ExpressionAttributes::with_values(existing_values.clone());
    let expression = attributes.value_name(key, value, raw_array)?;
    Ok(ValueBinding {
        expression,
        values: attributes.values,
    })
}

/// Find the first token at or after `base` that is free or already bound to
/// `value`, binding it if free.
fn claim<V: PartialEq>(map: &mut HashMap<String, V>, base: String, value: V) -> String {
    let mut token = base.clone();
    let mut suffix = 0_usize;
    loop {
        match map.entry(token) {
            Entry::Vacant(slot) => {
                let token = slot.key().clone();
                slot.insert(value);
                return token;
            }
            Entry::Occupied(slot) if *slot.get() == value => return slot.key().clone(),
            Entry::Occupied(_) => {
                suffix += 1;
                token = format!("{base}_{suffix}");
            }
        }
    }
}

/// Split `foo[0][1]` into (`foo`, `[0][1]`).
fn split_index_suffix(segment: &str) -> (&str, &str) {
    match segment.find('[') {
        Some(pos) => segment.split_at(pos),
        None => (segment, ""),
    }
}

/// Replace everything outside `[A-Za-z0-9_]` with `_`.
fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
