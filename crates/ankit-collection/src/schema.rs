//! SQLite schema for collection files.
//!
//! Uses schema version 11, the layout shared by `collection.anki2` and the
//! database inside `.apkg` packages.

/// SQL to create the database schema.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS col (
    id              INTEGER PRIMARY KEY,
    crt             INTEGER NOT NULL,
    mod             INTEGER NOT NULL,
    scm             INTEGER NOT NULL,
    ver             INTEGER NOT NULL,
    dty             INTEGER NOT NULL,
    usn             INTEGER NOT NULL,
    ls              INTEGER NOT NULL,
    conf            TEXT NOT NULL,
    models          TEXT NOT NULL,
    decks           TEXT NOT NULL,
    dconf           TEXT NOT NULL,
    tags            TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS notes (
    id              INTEGER PRIMARY KEY,
    guid            TEXT NOT NULL,
    mid             INTEGER NOT NULL,
    mod             INTEGER NOT NULL,
    usn             INTEGER NOT NULL,
    tags            TEXT NOT NULL,
    flds            TEXT NOT NULL,
    sfld            TEXT NOT NULL,
    csum            INTEGER NOT NULL,
    flags           INTEGER NOT NULL,
    data            TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS cards (
    id              INTEGER PRIMARY KEY,
    nid             INTEGER NOT NULL,
    did             INTEGER NOT NULL,
    ord             INTEGER NOT NULL,
    mod             INTEGER NOT NULL,
    usn             INTEGER NOT NULL,
    type            INTEGER NOT NULL,
    queue           INTEGER NOT NULL,
    due             INTEGER NOT NULL,
    ivl             INTEGER NOT NULL,
    factor          INTEGER NOT NULL,
    reps            INTEGER NOT NULL,
    lapses          INTEGER NOT NULL,
    left            INTEGER NOT NULL,
    odue            INTEGER NOT NULL,
    odid            INTEGER NOT NULL,
    flags           INTEGER NOT NULL,
    data            TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS revlog (
    id              INTEGER PRIMARY KEY,
    cid             INTEGER NOT NULL,
    usn             INTEGER NOT NULL,
    ease            INTEGER NOT NULL,
    ivl             INTEGER NOT NULL,
    lastIvl         INTEGER NOT NULL,
    factor          INTEGER NOT NULL,
    time            INTEGER NOT NULL,
    type            INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS graves (
    usn             INTEGER NOT NULL,
    oid             INTEGER NOT NULL,
    type            INTEGER NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS ix_notes_guid ON notes (guid);
CREATE INDEX IF NOT EXISTS ix_notes_usn ON notes (usn);
CREATE INDEX IF NOT EXISTS ix_cards_usn ON cards (usn);
CREATE INDEX IF NOT EXISTS ix_revlog_usn ON revlog (usn);
CREATE INDEX IF NOT EXISTS ix_cards_nid ON cards (nid);
CREATE INDEX IF NOT EXISTS ix_cards_sched ON cards (did, queue, due);
CREATE INDEX IF NOT EXISTS ix_revlog_cid ON revlog (cid);
CREATE INDEX IF NOT EXISTS ix_notes_csum ON notes (csum);
"#;

/// The tables of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// `col`: the collection singleton.
    Collection,
    /// `notes`.
    Notes,
    /// `cards`.
    Cards,
    /// `revlog`.
    Revlog,
    /// `graves`.
    Graves,
}

impl Table {
    /// All tables, in creation order.
    pub const ALL: [Table; 5] = [
        Table::Collection,
        Table::Notes,
        Table::Cards,
        Table::Revlog,
        Table::Graves,
    ];

    /// SQL table name.
    pub fn name(self) -> &'static str {
        match self {
            Table::Collection => "col",
            Table::Notes => "notes",
            Table::Cards => "cards",
            Table::Revlog => "revlog",
            Table::Graves => "graves",
        }
    }

    /// Whether rows are keyed by an `id` primary key.
    pub fn has_id(self) -> bool {
        !matches!(self, Table::Graves)
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_creates_tables_and_indexes() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        // Idempotent.
        conn.execute_batch(SCHEMA).unwrap();

        for table in Table::ALL {
            let count: i64 = conn
                .query_row(
                    "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
                    [table.name()],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "missing table {table}");
        }

        let indexes: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'index' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        for expected in [
            "ix_cards_nid",
            "ix_cards_sched",
            "ix_cards_usn",
            "ix_notes_csum",
            "ix_notes_guid",
            "ix_notes_usn",
            "ix_revlog_cid",
            "ix_revlog_usn",
        ] {
            assert!(indexes.iter().any(|i| i == expected), "missing {expected}");
        }
    }

    #[test]
    fn test_graves_have_no_id() {
        assert!(!Table::Graves.has_id());
        assert!(Table::Notes.has_id());
        assert_eq!(Table::Revlog.to_string(), "revlog");
    }
}
