//! Requests the builders produce.
//!
//! Field names follow the wire protocol (`PascalCase`). Expressions that were
//! not used are `None` and placeholder maps that stayed empty are left out
//! entirely, since the store rejects requests that define placeholders no
//! expression references.

use serde::{Deserialize, Serialize};

use crate::document::Item;
use crate::types::{ReturnValue, Select};

/// Token to attribute name (`ExpressionAttributeNames`).
pub type AttributeNames = std::collections::HashMap<String, String>;

/// `UpdateItem` request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateItemInput {
    /// Target table.
    pub table_name: String,
    /// Primary key of the item.
    pub key: Item,
    /// `SET`/`REMOVE`/`ADD`/`DELETE` clauses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_expression: Option<String>,
    /// Must hold for the write to happen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_expression: Option<String>,
    /// Name placeholders used by the expressions.
    #[serde(default, skip_serializing_if = "AttributeNames::is_empty")]
    pub expression_attribute_names: AttributeNames,
    /// Value placeholders used by the expressions.
    #[serde(default, skip_serializing_if = "Item::is_empty")]
    pub expression_attribute_values: Item,
    /// Attributes to send back.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_values: Option<ReturnValue>,
}

/// `DeleteItem` request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteItemInput {
    /// Target table.
    pub table_name: String,
    /// Primary key of the item.
    pub key: Item,
    /// Must hold for the delete to happen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_expression: Option<String>,
    /// Name placeholders used by the condition.
    #[serde(default, skip_serializing_if = "AttributeNames::is_empty")]
    pub expression_attribute_names: AttributeNames,
    /// Value placeholders used by the condition.
    #[serde(default, skip_serializing_if = "Item::is_empty")]
    pub expression_attribute_values: Item,
    /// `ALL_OLD` to get the deleted item back.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_values: Option<ReturnValue>,
}

/// `Query` request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryInput {
    /// Target table.
    pub table_name: String,
    /// Secondary index to read instead of the table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,
    /// Partition (and optionally sort) key condition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_condition_expression: Option<String>,
    /// Applied to items after the key condition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_expression: Option<String>,
    /// Attributes to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection_expression: Option<String>,
    /// Name placeholders used by the expressions.
    #[serde(default, skip_serializing_if = "AttributeNames::is_empty")]
    pub expression_attribute_names: AttributeNames,
    /// Value placeholders used by the expressions.
    #[serde(default, skip_serializing_if = "Item::is_empty")]
    pub expression_attribute_values: Item,
    /// `false` walks the sort key in descending order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_index_forward: Option<bool>,
    /// Maximum number of items to read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
    /// What to return per item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select: Option<Select>,
    /// Strongly consistent read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistent_read: Option<bool>,
}

/// `Scan` request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScanInput {
    /// Target table.
    pub table_name: String,
    /// Secondary index to read instead of the table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,
    /// Applied to every item read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_expression: Option<String>,
    /// Attributes to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection_expression: Option<String>,
    /// Name placeholders used by the expressions.
    #[serde(default, skip_serializing_if = "AttributeNames::is_empty")]
    pub expression_attribute_names: AttributeNames,
    /// Value placeholders used by the expressions.
    #[serde(default, skip_serializing_if = "Item::is_empty")]
    pub expression_attribute_values: Item,
    /// Maximum number of items to read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
    /// What to return per item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select: Option<Select>,
    /// Strongly consistent read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistent_read: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AttributeValue;

    #[test]
    fn test_should_omit_empty_expression_maps() {
        let input = ScanInput {
            table_name: "users".to_owned(),
            ..ScanInput::default()
        };
        let json = serde_json::to_string(&input).unwrap();
        assert_eq!(json, r#"{"TableName":"users"}"#);
    }

    #[test]
    fn test_should_use_wire_field_names() {
        let mut input = QueryInput {
            table_name: "users".to_owned(),
            key_condition_expression: Some("#k_id=:v_id".to_owned()),
            select: Some(Select::Count),
            ..QueryInput::default()
        };
        input
            .expression_attribute_names
            .insert("#k_id".to_owned(), "id".to_owned());
        input
            .expression_attribute_values
            .insert(":v_id".to_owned(), AttributeValue::N("5".to_owned()));

        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["KeyConditionExpression"], "#k_id=:v_id");
        assert_eq!(json["ExpressionAttributeNames"]["#k_id"], "id");
        assert_eq!(json["ExpressionAttributeValues"][":v_id"]["N"], "5");
        assert_eq!(json["Select"], "COUNT");
    }

    #[test]
    fn test_should_serialize_return_values() {
        let input = UpdateItemInput {
            table_name: "users".to_owned(),
            return_values: Some(ReturnValue::AllNew),
            ..UpdateItemInput::default()
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["ReturnValues"], "ALL_NEW");
        assert!(json.get("UpdateExpression").is_none());
    }
}
