//! In-memory warehouse that records every statement it is asked to run

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{Warehouse, WarehouseConnection, WarehouseError};
use crate::upload::statement::{InsertRows, Statement};
use crate::upload::types::{
    Column, Dataset, ExistingColumn, ExistingTableMetadata, TableIdentifier, Value,
};

/// Something the warehouse was asked to do
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Execute(Statement),
    Insert { insert: InsertRows, rows: usize },
}

#[derive(Debug, Default)]
struct State {
    tables: HashMap<TableIdentifier, (Vec<ExistingColumn>, Vec<Vec<Value>>)>,
    log: Vec<Recorded>,
    open_connections: usize,
    refuse_connections: bool,
}

/// Shared-state fake; clones observe the same tables
#[derive(Debug, Clone, Default)]
pub struct MemoryWarehouse {
    state: Arc<Mutex<State>>,
}

impl MemoryWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing table
    pub fn with_table(self, table: &str, columns: &[(&str, &str)]) -> Self {
        let id = TableIdentifier::parse(table).expect("valid test identifier");
        let columns = columns
            .iter()
            .map(|(name, ty)| ExistingColumn::new(*name, *ty))
            .collect();
        self.state.lock().unwrap().tables.insert(id, (columns, Vec::new()));
        self
    }

    /// Make every `connect` call fail
    pub fn unreachable(self) -> Self {
        self.state.lock().unwrap().refuse_connections = true;
        self
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().log.clone()
    }

    pub fn executed(&self) -> Vec<Statement> {
        self.recorded()
            .into_iter()
            .filter_map(|r| match r {
                Recorded::Execute(statement) => Some(statement),
                Recorded::Insert { .. } => None,
            })
            .collect()
    }

    pub fn rows(&self, table: &str) -> Vec<Vec<Value>> {
        let id = TableIdentifier::parse(table).expect("valid test identifier");
        self.state
            .lock()
            .unwrap()
            .tables
            .get(&id)
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default()
    }

    pub fn open_connections(&self) -> usize {
        self.state.lock().unwrap().open_connections
    }
}

#[async_trait]
impl Warehouse for MemoryWarehouse {
    async fn connect(&self) -> Result<Box<dyn WarehouseConnection>, WarehouseError> {
        let mut state = self.state.lock().unwrap();
        if state.refuse_connections {
            return Err(WarehouseError::new("connection refused"));
        }
        state.open_connections += 1;
        Ok(Box::new(MemoryConnection {
            state: Arc::clone(&self.state),
        }))
    }
}

struct MemoryConnection {
    state: Arc<Mutex<State>>,
}

#[async_trait]
impl WarehouseConnection for MemoryConnection {
    async fn table_columns(
        &mut self,
        table: &TableIdentifier,
    ) -> Result<ExistingTableMetadata, WarehouseError> {
        let state = self.state.lock().unwrap();
        let columns = state
            .tables
            .get(table)
            .map(|(columns, _)| columns.clone())
            .unwrap_or_default();
        Ok(ExistingTableMetadata::new(columns))
    }

    async fn execute(&mut self, statement: &Statement) -> Result<u64, WarehouseError> {
        let mut state = self.state.lock().unwrap();
        state.log.push(Recorded::Execute(statement.clone()));

        match statement {
            Statement::CreateTable(create) => {
                if state.tables.contains_key(&create.table) {
                    return Err(WarehouseError::new(format!("{} already exists", create.table)));
                }
                let columns = create
                    .columns
                    .iter()
                    .map(|c| ExistingColumn::new(c.name.clone(), c.storage_type))
                    .collect();
                state.tables.insert(create.table.clone(), (columns, Vec::new()));
                Ok(0)
            }
            Statement::DeleteAll(table) => match state.tables.get_mut(table) {
                Some((_, rows)) => {
                    let count = rows.len() as u64;
                    rows.clear();
                    Ok(count)
                }
                None => Err(WarehouseError::new(format!("no such table: {}", table))),
            },
            Statement::DropTable(table) => match state.tables.remove(table) {
                Some(_) => Ok(0),
                None => Err(WarehouseError::new(format!("no such table: {}", table))),
            },
        }
    }

    async fn insert_rows(
        &mut self,
        insert: &InsertRows,
        rows: Vec<Vec<Value>>,
    ) -> Result<u64, WarehouseError> {
        let mut state = self.state.lock().unwrap();
        state.log.push(Recorded::Insert {
            insert: insert.clone(),
            rows: rows.len(),
        });

        let count = rows.len() as u64;
        match state.tables.get_mut(&insert.table) {
            Some((_, existing)) => {
                existing.extend(rows);
                Ok(count)
            }
            None => Err(WarehouseError::new(format!("no such table: {}", insert.table))),
        }
    }

    async fn query(&mut self, sql: &str) -> Result<Dataset, WarehouseError> {
        // Only `SELECT * FROM schema.table` is understood
        let table = sql
            .trim()
            .strip_prefix("SELECT * FROM ")
            .and_then(|t| TableIdentifier::parse(t).ok())
            .ok_or_else(|| WarehouseError::new(format!("unsupported query: {}", sql)))?;

        let state = self.state.lock().unwrap();
        let (columns, rows) = state
            .tables
            .get(&table)
            .ok_or_else(|| WarehouseError::new(format!("no such table: {}", table)))?;

        let columns = columns
            .iter()
            .enumerate()
            .map(|(i, c)| Column::inferred(c.name.clone(), rows.iter().map(|r| r[i].clone()).collect()))
            .collect();
        Dataset::new(columns).map_err(|e| WarehouseError::with_source("bad result", e))
    }

    async fn close(self: Box<Self>) {
        self.state.lock().unwrap().open_connections -= 1;
    }
}
