//! One-row-per-table dumps of a collection database.
//!
//! Handy for eyeballing a collection produced by another tool: every table is
//! listed with its first row, and the JSON columns of `col` are expanded in
//! place.

use rusqlite::Connection;
use rusqlite::types::ValueRef;
use serde_json::{Map, Value};

use crate::error::Result;

/// First row of every table, keyed by table name.
///
/// Tables without rows map to `null`. Text columns of `col` that hold valid
/// JSON are decoded; everything else is kept as stored.
pub fn sample_tables(conn: &Connection) -> Result<Map<String, Value>> {
    let table_names: Vec<String> = {
        let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table'")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<_>>()?;
        names
    };

    let mut out = Map::new();
    for table in table_names {
        let sample = first_row(conn, &table)?;
        out.insert(table, sample.map_or(Value::Null, Value::Object));
    }
    Ok(out)
}

fn first_row(conn: &Connection, table: &str) -> Result<Option<Map<String, Value>>> {
    let sql = format!("SELECT * FROM \"{}\" LIMIT 1", table.replace('"', "\"\""));
    let mut stmt = conn.prepare(&sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let expand_json = table == "col";

    let mut rows = stmt.query([])?;
    let Some(row) = rows.next()? else {
        return Ok(None);
    };

    let mut map = Map::new();
    for (idx, column) in columns.into_iter().enumerate() {
        let value = to_json(row.get_ref(idx)?, expand_json);
        map.insert(column, value);
    }
    Ok(Some(map))
}

fn to_json(value: ValueRef<'_>, expand_json: bool) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes);
            if expand_json {
                if let Ok(parsed) = serde_json::from_str(&text) {
                    return parsed;
                }
            }
            Value::String(text.into_owned())
        }
        ValueRef::Blob(bytes) => Value::String(hex::encode(bytes)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SCHEMA;

    #[test]
    fn test_empty_tables_are_null() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        let sample = sample_tables(&conn).unwrap();
        assert_eq!(sample["notes"], Value::Null);
        assert_eq!(sample.len(), 5);
    }

    #[test]
    fn test_col_json_is_expanded() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn.execute(
            "INSERT INTO col VALUES \
             (1, 0, 0, 0, 11, 0, 0, 0, '{\"curDeck\": 1}', '{}', '{}', '{}', 'not json')",
            [],
        )
        .unwrap();
        conn.execute("INSERT INTO graves VALUES (-1, 42, 1)", [])
            .unwrap();

        let sample = sample_tables(&conn).unwrap();
        assert_eq!(sample["col"]["conf"]["curDeck"], 1);
        assert_eq!(sample["col"]["tags"], "not json");
        assert_eq!(sample["graves"]["oid"], 42);
    }

    #[test]
    fn test_other_tables_keep_text() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE t (a TEXT, b BLOB); INSERT INTO t VALUES ('[1]', x'ff00');",
        )
        .unwrap();
        let sample = sample_tables(&conn).unwrap();
        assert_eq!(sample["t"]["a"], "[1]");
        assert_eq!(sample["t"]["b"], "ff00");
    }
}
