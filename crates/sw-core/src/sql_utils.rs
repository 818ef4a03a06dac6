//! SQL identifier quoting and DDL literal rendering
//!
//! Provides safe quoting for identifiers interpolated into bootstrap
//! statements, and the CQL-style map literal used to describe a profile's
//! replication settings.

use crate::profile::DdlValue;
use std::collections::BTreeMap;

/// Quote a SQL identifier to prevent injection.
///
/// Wraps the identifier in double quotes and escapes any embedded double quotes
/// by doubling them, following the SQL standard.
///
/// # Examples
/// ```
/// use sw_core::sql_utils::quote_ident;
/// assert_eq!(quote_ident("users"), r#""users""#);
/// assert_eq!(quote_ident(r#"my"table"#), r#""my""table""#);
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Escape a SQL string literal value by doubling single quotes.
///
/// This is for use inside single-quoted SQL string literals, not identifiers.
pub fn escape_sql_string(value: &str) -> String {
    value.replace('\'', "''")
}

/// Render a value as a DDL literal.
///
/// Strings are single-quoted with embedded quotes doubled, booleans are
/// `true`/`false`, and maps are rendered as `{'k': v, ...}` with keys sorted.
///
/// # Examples
/// ```
/// use sw_core::profile::DdlValue;
/// use sw_core::sql_utils::ddl_repr;
/// assert_eq!(ddl_repr(&DdlValue::String("it's".into())), "'it''s'");
/// assert_eq!(ddl_repr(&DdlValue::Bool(true)), "true");
/// ```
pub fn ddl_repr(value: &DdlValue) -> String {
    match value {
        DdlValue::Bool(true) => "true".to_string(),
        DdlValue::Bool(false) => "false".to_string(),
        DdlValue::Int(n) => n.to_string(),
        DdlValue::String(s) => format!("'{}'", escape_sql_string(s)),
        DdlValue::Map(map) => ddl_map_repr(map),
    }
}

/// Render a map as a DDL literal. Keys are emitted in sorted order.
pub fn ddl_map_repr(map: &BTreeMap<String, DdlValue>) -> String {
    let pairs: Vec<String> = map
        .iter()
        .map(|(k, v)| format!("'{}': {}", escape_sql_string(k), ddl_repr(v)))
        .collect();
    format!("{{{}}}", pairs.join(", "))
}

#[cfg(test)]
#[path = "sql_utils_test.rs"]
mod tests;
