//! Enumerations shared by requests.

use serde::{Deserialize, Serialize};

/// Which item attributes a write returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReturnValue {
    /// Nothing.
    #[default]
    None,
    /// The whole item before the write.
    AllOld,
    /// The written attributes, before the write.
    UpdatedOld,
    /// The whole item after the write.
    AllNew,
    /// The written attributes, after the write.
    UpdatedNew,
}

/// What a read returns for each matching item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Select {
    /// Every attribute.
    #[default]
    AllAttributes,
    /// The attributes projected into the index.
    AllProjectedAttributes,
    /// The attributes named by the projection expression.
    SpecificAttributes,
    /// No items, only how many matched.
    Count,
}
