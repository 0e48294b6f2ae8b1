//! Store responses the builders read back.

use serde::{Deserialize, Serialize};

use crate::document::Item;

/// Response to `UpdateItem`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateItemOutput {
    /// Item attributes selected by `ReturnValues`; empty when none were asked for.
    #[serde(default, skip_serializing_if = "Item::is_empty")]
    pub attributes: Item,
}

/// Response to `DeleteItem`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteItemOutput {
    /// The deleted item, when `ReturnValues` was `ALL_OLD`.
    #[serde(default, skip_serializing_if = "Item::is_empty")]
    pub attributes: Item,
}

/// Response to `Query`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryOutput {
    /// Matching items; absent for a count.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Item>,
    /// Items returned (or counted) after filtering.
    #[serde(default)]
    pub count: i32,
    /// Items read before filtering.
    #[serde(default)]
    pub scanned_count: i32,
    /// Where to resume; empty on the last page.
    #[serde(default, skip_serializing_if = "Item::is_empty")]
    pub last_evaluated_key: Item,
}

/// Response to `Scan`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScanOutput {
    /// Matching items; absent for a count.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Item>,
    /// Items returned (or counted) after filtering.
    #[serde(default)]
    pub count: i32,
    /// Items read before filtering.
    #[serde(default)]
    pub scanned_count: i32,
    /// Where to resume; empty on the last page.
    #[serde(default, skip_serializing_if = "Item::is_empty")]
    pub last_evaluated_key: Item,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AttributeValue;

    #[test]
    fn test_should_deserialize_count_only_query_output() {
        let output: QueryOutput =
            serde_json::from_str(r#"{"Count":3,"ScannedCount":10}"#).unwrap();
        assert!(output.items.is_empty());
        assert_eq!(output.count, 3);
        assert_eq!(output.scanned_count, 10);
    }

    #[test]
    fn test_should_deserialize_items_and_resume_key() {
        let output: ScanOutput = serde_json::from_str(
            r#"{"Items":[{"id":{"S":"a"}}],"Count":1,"ScannedCount":1,"LastEvaluatedKey":{"id":{"S":"a"}}}"#,
        )
        .unwrap();
        assert_eq!(output.items[0]["id"], AttributeValue::S("a".to_owned()));
        assert_eq!(output.last_evaluated_key.len(), 1);
    }

    #[test]
    fn test_should_deserialize_update_attributes() {
        let output: UpdateItemOutput =
            serde_json::from_str(r#"{"Attributes":{"id":{"N":"1"}}}"#).unwrap();
        assert_eq!(output.attributes["id"], AttributeValue::N("1".to_owned()));

        let output: DeleteItemOutput = serde_json::from_str("{}").unwrap();
        assert!(output.attributes.is_empty());
    }
}
