//! Descriptions of warehouse mutations
//!
//! Statements are plain data until a `WarehouseConnection` executes them,
//! which keeps the upload decisions testable without a live store.

use crate::upload::types::{TableIdentifier, quote_ident};

/// A column in a `CREATE TABLE` description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub name: String,
    pub storage_type: &'static str,
    pub nullable: bool,
}

/// Table definition derived from a dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTable {
    pub table: TableIdentifier,
    pub columns: Vec<ColumnDefinition>,
    pub primary_key: Option<Vec<String>>,
}

impl CreateTable {
    pub fn to_sql(&self) -> String {
        let mut parts: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                let null = if c.nullable { "" } else { " NOT NULL" };
                format!("{} {}{}", quote_ident(&c.name), c.storage_type, null)
            })
            .collect();

        if let Some(pk) = &self.primary_key {
            let cols: Vec<String> = pk.iter().map(|c| quote_ident(c)).collect();
            parts.push(format!("PRIMARY KEY ({})", cols.join(", ")));
        }

        format!("CREATE TABLE {} ({})", self.table.quoted(), parts.join(", "))
    }
}

/// Positional insert into a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertRows {
    pub table: TableIdentifier,
    pub columns: Vec<String>,
}

impl InsertRows {
    pub fn to_sql(&self) -> String {
        let cols: Vec<String> = self.columns.iter().map(|c| quote_ident(c)).collect();
        let placeholders = vec!["?"; self.columns.len()].join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table.quoted(),
            cols.join(", "),
            placeholders
        )
    }
}

/// Parameterless mutation executed once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    CreateTable(CreateTable),
    DeleteAll(TableIdentifier),
    DropTable(TableIdentifier),
}

impl Statement {
    pub fn table(&self) -> &TableIdentifier {
        match self {
            Statement::CreateTable(create) => &create.table,
            Statement::DeleteAll(table) | Statement::DropTable(table) => table,
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            Statement::CreateTable(create) => create.to_sql(),
            Statement::DeleteAll(table) => format!("DELETE FROM {}", table.quoted()),
            Statement::DropTable(table) => format!("DROP TABLE {}", table.quoted()),
        }
    }
}
