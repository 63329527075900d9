//! Store Adapter: translates logical row operations into SQL against the
//! configured SQLite database.
//!
//! Callers supply a list of column→value pairs with no coercion applied here
//! (dates must already be ISO strings). Errors propagate raw; classification
//! is the façade's job, and nothing is retried.

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use tracing::debug;

/// Column→value pairs for one insert or update statement.
///
/// Optional fields that are absent are simply never added, so the backend
/// applies its own default (the column is omitted, not set to NULL).
#[derive(Debug, Default)]
pub struct RowData {
    cols: Vec<(&'static str, Value)>,
}

impl RowData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.cols.push((column, value.into()));
        self
    }

    /// Adds the column only when a value is present.
    pub fn set_opt(self, column: &'static str, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(v) => self.set(column, v),
            None => self,
        }
    }

    /// Adds the column only when the text is present and non-empty.
    pub fn set_text_opt(self, column: &'static str, value: Option<String>) -> Self {
        match value {
            Some(v) if !v.trim().is_empty() => self.set(column, v),
            _ => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cols.is_empty()
    }

    fn columns(&self) -> Vec<&'static str> {
        self.cols.iter().map(|(c, _)| *c).collect()
    }

    fn values(&self) -> impl Iterator<Item = &Value> {
        self.cols.iter().map(|(_, v)| v)
    }
}

/// Inserts one row and returns the generated identifier.
pub fn insert(conn: &Connection, table: &str, row: &RowData) -> rusqlite::Result<i64> {
    let columns = row.columns();
    let placeholders = (1..=columns.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO {}({}) VALUES({})",
        table,
        columns.join(", "),
        placeholders
    );
    conn.execute(&sql, params_from_iter(row.values()))?;
    let id = conn.last_insert_rowid();
    debug!(table, id, "inserted row");
    Ok(id)
}

/// Updates one row by id. Returns the number of rows affected (0 when the
/// target row is already gone).
pub fn update_by_id(
    conn: &Connection,
    table: &str,
    id: i64,
    row: &RowData,
) -> rusqlite::Result<usize> {
    let assignments = row
        .columns()
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = ?{}", c, i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE {} SET {} WHERE id = ?{}",
        table,
        assignments,
        row.cols.len() + 1
    );
    let mut params: Vec<Value> = row.values().cloned().collect();
    params.push(Value::Integer(id));
    let affected = conn.execute(&sql, params_from_iter(params.iter()))?;
    debug!(table, id, affected, "updated row");
    Ok(affected)
}

/// Updates every row of a table (used by the branding singleton).
pub fn update_all(conn: &Connection, table: &str, row: &RowData) -> rusqlite::Result<usize> {
    let assignments = row
        .columns()
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = ?{}", c, i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!("UPDATE {} SET {}", table, assignments);
    conn.execute(&sql, params_from_iter(row.values()))
}

pub fn delete_by_id(conn: &Connection, table: &str, id: i64) -> rusqlite::Result<usize> {
    let sql = format!("DELETE FROM {} WHERE id = ?1", table);
    let affected = conn.execute(&sql, [id])?;
    debug!(table, id, affected, "deleted row");
    Ok(affected)
}

/// Deletes every row whose column equals the given value.
pub fn delete_where_eq(
    conn: &Connection,
    table: &str,
    column: &str,
    value: impl Into<Value>,
) -> rusqlite::Result<usize> {
    let sql = format!("DELETE FROM {} WHERE {} = ?1", table, column);
    let affected = conn.execute(&sql, [value.into()])?;
    debug!(table, column, affected, "deleted rows");
    Ok(affected)
}

pub fn count(conn: &Connection, table: &str) -> rusqlite::Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", table);
    conn.query_row(&sql, [], |r| r.get(0))
}

pub fn exists_where_eq(
    conn: &Connection,
    table: &str,
    column: &str,
    value: impl Into<Value>,
) -> rusqlite::Result<bool> {
    let sql = format!("SELECT COUNT(*) FROM {} WHERE {} = ?1", table, column);
    let n: i64 = conn.query_row(&sql, [value.into()], |r| r.get(0))?;
    Ok(n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    #[test]
    fn insert_returns_generated_id_and_omits_absent_columns() {
        let conn = open_in_memory().unwrap();
        let id = insert(
            &conn,
            "libreria",
            &RowData::new()
                .set("titolo", "Unità 1".to_string())
                .set("url", "https://example.com".to_string())
                .set("categoria", "Esercizi".to_string())
                .set("livello", "A1".to_string())
                .set_text_opt("libro", None)
                .set_text_opt("descrizione", Some("  ".to_string())),
        )
        .unwrap();
        assert!(id > 0);

        let libro: Option<String> = conn
            .query_row("SELECT libro FROM libreria WHERE id = ?1", [id], |r| {
                r.get(0)
            })
            .unwrap();
        assert!(libro.is_none());
    }

    #[test]
    fn update_and_delete_report_affected_rows() {
        let conn = open_in_memory().unwrap();
        let id = insert(
            &conn,
            "libri_disponibili",
            &RowData::new().set("nome", "Espresso 1".to_string()),
        )
        .unwrap();

        let affected = update_by_id(
            &conn,
            "libri_disponibili",
            id,
            &RowData::new().set("nome", "Espresso 2".to_string()),
        )
        .unwrap();
        assert_eq!(affected, 1);

        assert_eq!(delete_by_id(&conn, "libri_disponibili", id).unwrap(), 1);
        // Deleting an absent row is not an error.
        assert_eq!(delete_by_id(&conn, "libri_disponibili", id).unwrap(), 0);
    }

    #[test]
    fn unique_violation_propagates_raw() {
        let conn = open_in_memory().unwrap();
        let row = RowData::new().set("nome", "Nuovo Espresso".to_string());
        insert(&conn, "libri_disponibili", &row).unwrap();
        let err = insert(&conn, "libri_disponibili", &row).unwrap_err();
        assert!(matches!(err, rusqlite::Error::SqliteFailure(_, _)));
    }
}
