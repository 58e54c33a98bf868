//! Database handle, transactions and query execution.

use crate::{DbError, QueryResult, Row};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

type Table = BTreeMap<String, Row>;

/// Table storage shared by the database handle and its transactions.
///
/// Tables are copy-on-write: cloning `Tables` only bumps reference counts,
/// and a table is copied the first time a transaction writes to it.
#[derive(Debug, Clone, Default)]
struct Tables {
    tables: BTreeMap<String, Arc<Table>>,
}

impl Tables {
    fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name).map(|t| t.as_ref())
    }

    fn table_mut(&mut self, name: &str) -> &mut Table {
        Arc::make_mut(self.tables.entry(name.to_string()).or_default())
    }

    fn get(&self, table: &str, key: &str) -> Option<&Row> {
        self.table(table).and_then(|t| t.get(key))
    }

    fn select<F>(&self, table: &str, predicate: F) -> QueryResult
    where
        F: Fn(&Row) -> bool,
    {
        let rows = self
            .table(table)
            .map(|t| t.values().filter(|row| predicate(row)).cloned().collect())
            .unwrap_or_default();
        QueryResult::new(rows)
    }

    fn count<F>(&self, table: &str, predicate: F) -> usize
    where
        F: Fn(&Row) -> bool,
    {
        self.table(table)
            .map(|t| t.values().filter(|row| predicate(row)).count())
            .unwrap_or(0)
    }

    fn insert(&mut self, table: &str, key: &str, row: Row) -> Result<(), DbError> {
        if self.get(table, key).is_some() {
            return Err(DbError::Conflict {
                table: table.to_string(),
                key: key.to_string(),
            });
        }
        self.table_mut(table).insert(key.to_string(), row);
        Ok(())
    }

    fn upsert(&mut self, table: &str, key: &str, row: Row) {
        self.table_mut(table).insert(key.to_string(), row);
    }

    fn delete(&mut self, table: &str, key: &str) -> bool {
        if self.get(table, key).is_none() {
            return false;
        }
        self.table_mut(table).remove(key).is_some()
    }
}

/// In-process row store.
///
/// Rows are grouped into named tables and addressed by a string key. Values
/// are stored column-wise and deserialized back into typed records on read.
/// All writes go through [`Db::transaction`], which applies them atomically.
#[derive(Debug, Default)]
pub struct Db {
    inner: RwLock<Tables>,
}

impl Db {
    /// Open an empty in-memory database.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let db = Db::open_in_memory();
    /// ```
    pub fn open_in_memory() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, DbError> {
        self.inner
            .read()
            .map_err(|_| DbError::TransactionAborted("store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, DbError> {
        self.inner
            .write()
            .map_err(|_| DbError::TransactionAborted("store lock poisoned".to_string()))
    }

    /// Run a closure inside a transaction.
    ///
    /// The closure works on a private copy-on-write view of the tables, so
    /// only tables it writes to are copied. Its writes become
    /// visible only if it returns `Ok`; on `Err` the copy is dropped and the
    /// database is left exactly as it was. Transactions are serialized.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// db.transaction(|tx| {
    ///     tx.insert("ads", "ad-1", &ad)?;
    ///     tx.upsert("categories", "cat-1", &category)?;
    ///     Ok::<_, DbError>(())
    /// })?;
    /// ```
    pub fn transaction<F, R, E>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut Transaction) -> Result<R, E>,
        E: From<DbError>,
    {
        let mut guard = self.write()?;
        let mut tx = Transaction {
            tables: (*guard).clone(),
        };
        let result = f(&mut tx)?;
        *guard = tx.tables;
        Ok(result)
    }

    /// Insert a single row, failing if the key is taken.
    pub fn insert<T: Serialize>(&self, table: &str, key: &str, value: &T) -> Result<(), DbError> {
        self.transaction(|tx| tx.insert(table, key, value))
    }

    /// Insert or replace a single row.
    pub fn upsert<T: Serialize>(&self, table: &str, key: &str, value: &T) -> Result<(), DbError> {
        self.transaction(|tx| tx.upsert(table, key, value))
    }

    /// Delete a row. Returns whether it existed.
    pub fn delete(&self, table: &str, key: &str) -> Result<bool, DbError> {
        self.transaction(|tx| Ok(tx.delete(table, key)))
    }

    /// Fetch a row by key and deserialize it.
    ///
    /// Returns `None` if no row has that key.
    pub fn get<T: DeserializeOwned>(&self, table: &str, key: &str) -> Result<Option<T>, DbError> {
        self.read()?
            .get(table, key)
            .map(|row| row.deserialize())
            .transpose()
    }

    /// Fetch a row by key, failing with [`DbError::NotFound`] if absent.
    pub fn get_one<T: DeserializeOwned>(&self, table: &str, key: &str) -> Result<T, DbError> {
        self.get(table, key)?.ok_or(DbError::NotFound)
    }

    /// Select the raw rows of a table matching a predicate.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let result = db.select("ads", |row| row.text("category_id") == Some("cat-1"))?;
    /// ```
    pub fn select<F>(&self, table: &str, predicate: F) -> Result<QueryResult, DbError>
    where
        F: Fn(&Row) -> bool,
    {
        Ok(self.read()?.select(table, predicate))
    }

    /// Select rows matching a predicate and deserialize them.
    pub fn select_as<T, F>(&self, table: &str, predicate: F) -> Result<Vec<T>, DbError>
    where
        T: DeserializeOwned,
        F: Fn(&Row) -> bool,
    {
        self.select(table, predicate)?.deserialize_all()
    }

    /// Deserialize every row of a table.
    pub fn all<T: DeserializeOwned>(&self, table: &str) -> Result<Vec<T>, DbError> {
        self.select_as(table, |_| true)
    }

    /// Count the rows of a table matching a predicate.
    pub fn count<F>(&self, table: &str, predicate: F) -> Result<usize, DbError>
    where
        F: Fn(&Row) -> bool,
    {
        Ok(self.read()?.count(table, predicate))
    }

    /// Check whether a row exists.
    pub fn exists(&self, table: &str, key: &str) -> Result<bool, DbError> {
        Ok(self.read()?.get(table, key).is_some())
    }
}

/// A set of pending writes produced inside [`Db::transaction`].
#[derive(Debug)]
pub struct Transaction {
    tables: Tables,
}

impl Transaction {
    /// Insert a row, failing with [`DbError::Conflict`] if the key is taken.
    pub fn insert<T: Serialize>(&mut self, table: &str, key: &str, value: &T) -> Result<(), DbError> {
        let row = Row::from_serialize(value)?;
        self.tables.insert(table, key, row)
    }

    /// Insert or replace a row.
    pub fn upsert<T: Serialize>(&mut self, table: &str, key: &str, value: &T) -> Result<(), DbError> {
        let row = Row::from_serialize(value)?;
        self.tables.upsert(table, key, row);
        Ok(())
    }

    /// Delete a row. Returns whether it existed.
    pub fn delete(&mut self, table: &str, key: &str) -> bool {
        self.tables.delete(table, key)
    }

    /// Read a row as seen by this transaction.
    pub fn get<T: DeserializeOwned>(&self, table: &str, key: &str) -> Result<Option<T>, DbError> {
        self.tables.get(table, key).map(|row| row.deserialize()).transpose()
    }

    /// Select rows as seen by this transaction.
    pub fn select_as<T, F>(&self, table: &str, predicate: F) -> Result<Vec<T>, DbError>
    where
        T: DeserializeOwned,
        F: Fn(&Row) -> bool,
    {
        self.tables.select(table, predicate).deserialize_all()
    }

    /// Count rows as seen by this transaction.
    pub fn count<F>(&self, table: &str, predicate: F) -> usize
    where
        F: Fn(&Row) -> bool,
    {
        self.tables.count(table, predicate)
    }
}
