//! Strongly-typed keyspace and table names.

use crate::newtype_string::define_identifier;

define_identifier! {
    /// Name of the keyspace (DuckDB schema) that holds the version history.
    pub struct KeyspaceName;
}

define_identifier! {
    /// Name of the version-history table.
    pub struct TableName;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_new_accepts_identifier() {
        let ks = KeyspaceName::try_new("analytics").unwrap();
        assert_eq!(ks, "analytics");
        assert_eq!(ks.to_string(), "analytics");
    }

    #[test]
    fn test_try_new_rejects_non_identifier() {
        assert!(KeyspaceName::try_new("bad name").is_none());
        assert!(TableName::try_from("1table").is_err());
    }

    #[test]
    fn test_deserialize_rejects_invalid_identifier() {
        let result: Result<TableName, _> = serde_yaml::from_str("\"has-dash\"");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("has-dash"), "unexpected error: {err}");
    }
}
