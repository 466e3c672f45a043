//! Two-part `schema.table` identifiers

use once_cell::sync::Lazy;
use regex::Regex;

use crate::upload::error::UploadError;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^.\s]+)\.([^.\s]+)$").expect("identifier pattern is valid"));

/// Destination table, e.g. `pricing.daily_prices`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableIdentifier {
    schema: String,
    table: String,
}

impl TableIdentifier {
    /// Parse `"<schema>.<table>"`, requiring exactly one separator
    pub fn parse(input: &str) -> Result<Self, UploadError> {
        let caps = IDENTIFIER
            .captures(input.trim())
            .ok_or_else(|| UploadError::InvalidIdentifier {
                input: input.to_string(),
            })?;

        Ok(Self {
            schema: caps[1].to_string(),
            table: caps[2].to_string(),
        })
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Bracket-quoted form for SQL text, e.g. `[pricing].[daily_prices]`
    pub fn quoted(&self) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(&self.table))
    }
}

impl std::str::FromStr for TableIdentifier {
    type Err = UploadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for TableIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

/// Quote an identifier with brackets, escaping embedded `]`
pub fn quote_ident(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_identifier() {
        let id = TableIdentifier::parse("pricing.daily_prices").unwrap();
        assert_eq!(id.schema(), "pricing");
        assert_eq!(id.table(), "daily_prices");
        assert_eq!(id.to_string(), "pricing.daily_prices");
        assert_eq!(id.quoted(), "[pricing].[daily_prices]");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for input in ["daily_prices", "a.b.c", ".table", "schema.", "", "my schema.t"] {
            assert!(
                matches!(
                    TableIdentifier::parse(input),
                    Err(UploadError::InvalidIdentifier { .. })
                ),
                "expected '{}' to be rejected",
                input
            );
        }
    }

    #[test]
    fn test_quote_escapes_brackets() {
        assert_eq!(quote_ident("odd]name"), "[odd]]name]");
    }
}
