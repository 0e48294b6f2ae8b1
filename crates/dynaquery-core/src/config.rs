//! Query builder configuration.
//!
//! All configuration is driven by environment variables.

/// Configuration shared by every table handle of a [`Database`](crate::Database).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConfig {
    /// Prefix prepended to table names; `None` leaves names untouched.
    pub table_prefix: Option<String>,
    /// Separator placed between the prefix and the table name.
    pub prefix_delimiter: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            table_prefix: None,
            prefix_delimiter: ".".to_owned(),
        }
    }
}

impl DatabaseConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads `DYNAQUERY_TABLE_PREFIX` and `DYNAQUERY_PREFIX_DELIMITER`. An
    /// empty prefix is treated as unset.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = var("DYNAQUERY_TABLE_PREFIX") {
            if !v.is_empty() {
                config.table_prefix = Some(v);
            }
        }
        if let Some(v) = var("DYNAQUERY_PREFIX_DELIMITER") {
            config.prefix_delimiter = v;
        }

        config
    }

    /// Set the table name prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = Some(prefix.into());
        self
    }

    /// Set the separator between prefix and table name.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.prefix_delimiter = delimiter.into();
        self
    }

    /// Resolve the physical table name for `name`.
    #[must_use]
    pub fn table_name(&self, name: &str) -> String {
        match &self.table_prefix {
            Some(prefix) => format!("{prefix}{}{name}", self.prefix_delimiter),
            None => name.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> DatabaseConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        DatabaseConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_should_default_when_env_is_unset() {
        assert_eq!(from_pairs(&[]), DatabaseConfig::default());
    }

    #[test]
    fn test_should_treat_empty_env_prefix_as_unset() {
        let config = from_pairs(&[("DYNAQUERY_TABLE_PREFIX", "")]);
        assert_eq!(config.table_prefix, None);
        assert_eq!(config.table_name("users"), "users");
    }

    #[test]
    fn test_should_read_prefix_and_delimiter_from_env() {
        let config = from_pairs(&[("DYNAQUERY_TABLE_PREFIX", "prod")]);
        assert_eq!(config.table_name("users"), "prod.users");

        let config = from_pairs(&[
            ("DYNAQUERY_TABLE_PREFIX", "prod"),
            ("DYNAQUERY_PREFIX_DELIMITER", "__"),
        ]);
        assert_eq!(config.prefix_delimiter, "__");
        assert_eq!(config.table_name("users"), "prod__users");
    }

    #[test]
    fn test_should_leave_name_untouched_without_prefix() {
        let config = DatabaseConfig::default();
        assert_eq!(config.table_name("users"), "users");
    }

    #[test]
    fn test_should_prefix_table_name() {
        let config = DatabaseConfig::default().with_prefix("staging");
        assert_eq!(config.table_name("users"), "staging.users");

        let config = config.with_delimiter("-");
        assert_eq!(config.table_name("users"), "staging-users");
    }

    #[test]
    fn test_should_deserialize_camel_case() {
        let config: DatabaseConfig =
            serde_json::from_str(r#"{"tablePrefix":"dev","prefixDelimiter":"_"}"#).unwrap();
        assert_eq!(config.table_name("orders"), "dev_orders");
    }
}
