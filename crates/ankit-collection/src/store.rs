//! SQLite-backed collection store.
//!
//! [`CollectionStore`] owns one connection to a collection file. Every write
//! method takes `&mut self` and runs its save hook and its SQL inside one
//! transaction, so a hook or codec failure leaves no partial row behind and a
//! single handle never races itself during id allocation.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, info};

use crate::allocator::{GuidLookup, IdLookup};
use crate::clock::{Clock, SystemClock};
use crate::codec::{
    decode_collection, decode_fields, decode_tag_cache, decode_tags, encode_collection,
    encode_fields, encode_tag_cache, encode_tags,
};
use crate::error::{Error, Result};
use crate::fingerprint::fingerprint;
use crate::guid::{GuidSource, RandomGuid};
use crate::hooks::{
    SaveContext, WriteMode, prepare_card, prepare_collection, prepare_note, prepare_review,
};
use crate::records::{
    COLLECTION_ID, Card, CardQueue, CardType, Collection, Grave, GraveKind, Note, ReviewKind,
    ReviewLogEntry,
};
use crate::sample::sample_tables;
use crate::schema::{SCHEMA, Table};

const NOTE_COLUMNS: &str = "id, guid, mid, mod, usn, tags, flds, sfld, csum, flags, data";
const CARD_COLUMNS: &str = "id, nid, did, ord, mod, usn, type, queue, due, ivl, factor, reps, \
                            lapses, left, odue, odid, flags, data";
const REVLOG_COLUMNS: &str = "id, cid, usn, ease, ivl, lastIvl, factor, time, type";
const COL_COLUMNS: &str = "id, crt, mod, scm, ver, dty, usn, ls, conf, models, decks, dconf, tags";

// ============================================================================
// Builder
// ============================================================================

/// Builder for opening a [`CollectionStore`].
///
/// # Example
///
/// ```no_run
/// use ankit_collection::CollectionStore;
///
/// # fn main() -> ankit_collection::Result<()> {
/// let store = CollectionStore::builder()
///     .path("collection.anki2")
///     .create_collection(true)
///     .open()?;
/// # Ok(())
/// # }
/// ```
pub struct StoreBuilder {
    path: Option<PathBuf>,
    clock: Box<dyn Clock>,
    guids: Box<dyn GuidSource>,
    create_collection: bool,
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreBuilder {
    /// An in-memory store on the system clock with random GUIDs.
    pub fn new() -> Self {
        Self {
            path: None,
            clock: Box::new(SystemClock),
            guids: Box::new(RandomGuid),
            create_collection: false,
        }
    }

    /// Open (or create) the collection file at `path`.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use a private in-memory database.
    pub fn in_memory(mut self) -> Self {
        self.path = None;
        self
    }

    /// Time source for modification stamps and new collections.
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Source of replacement GUIDs on collision.
    pub fn guid_source(mut self, source: impl GuidSource + 'static) -> Self {
        self.guids = Box::new(source);
        self
    }

    /// Create the schema and a default collection row if the file has none.
    pub fn create_collection(mut self, create: bool) -> Self {
        self.create_collection = create;
        self
    }

    /// Open the database.
    ///
    /// An existing collection is opened as is, without schema changes. The
    /// schema is created when the database is empty, or when it has no `col`
    /// table and [`create_collection`](Self::create_collection) is set.
    pub fn open(self) -> Result<CollectionStore> {
        let conn = match &self.path {
            Some(path) => Connection::open(path)?,
            None => Connection::open_in_memory()?,
        };
        let has_col = has_table(&conn, Table::Collection.name())?;
        if !has_col && (self.create_collection || table_count(&conn)? == 0) {
            conn.execute_batch(SCHEMA).map_err(|e| Error::on_write("notes", e))?;
            info!(path = ?self.path, "created collection schema");
        }
        info!(path = ?self.path, "opened collection store");

        let mut store = CollectionStore {
            conn,
            clock: self.clock,
            guids: self.guids,
        };
        if self.create_collection && store.collection()?.is_none() {
            let col = Collection::new(store.clock.as_ref());
            store.save_collection(col)?;
            info!("created collection row");
        }
        Ok(store)
    }
}

// ============================================================================
// Lookups
// ============================================================================

/// Id lookups against one table of a connection.
pub struct TableIds<'c> {
    conn: &'c Connection,
    table: Table,
}

impl<'c> TableIds<'c> {
    /// Lookups against `table` through `conn`.
    pub fn new(conn: &'c Connection, table: Table) -> Self {
        Self { conn, table }
    }
}

impl IdLookup for TableIds<'_> {
    fn contains_id(&self, id: i64) -> Result<bool> {
        let sql = format!("SELECT 1 FROM {} WHERE id = ?", self.table);
        let found: Option<i64> = self
            .conn
            .query_row(&sql, [id], |row| row.get(0))
            .optional()?;
        Ok(found.is_some())
    }

    fn max_id(&self) -> Result<Option<i64>> {
        let sql = format!("SELECT max(id) FROM {}", self.table);
        Ok(self.conn.query_row(&sql, [], |row| row.get(0))?)
    }
}

/// GUID lookups against the `notes` table of a connection.
pub struct NoteGuids<'c>(pub &'c Connection);

impl GuidLookup for NoteGuids<'_> {
    fn guid_taken(&self, guid: &str, except_id: Option<i64>) -> Result<bool> {
        let owner: Option<i64> = self
            .0
            .query_row("SELECT id FROM notes WHERE guid = ?", [guid], |row| row.get(0))
            .optional()?;
        Ok(owner.is_some_and(|id| Some(id) != except_id))
    }
}

// ============================================================================
// Store
// ============================================================================

/// A collection file opened for reading and writing.
pub struct CollectionStore {
    conn: Connection,
    clock: Box<dyn Clock>,
    guids: Box<dyn GuidSource>,
}

impl CollectionStore {
    /// Create a builder for custom store configuration.
    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }

    /// Open the collection file at `path` with default settings.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder().path(path).open()
    }

    /// Open an in-memory store with a default collection row.
    pub fn open_in_memory() -> Result<Self> {
        Self::builder().in_memory().create_collection(true).open()
    }

    /// The underlying connection, for read-only queries.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Number of rows in `table`.
    pub fn count(&self, table: Table) -> Result<i64> {
        let sql = format!("SELECT count(*) FROM {table}");
        Ok(self.conn.query_row(&sql, [], |row| row.get(0))?)
    }

    /// Largest id in `table`, if it has rows.
    pub fn max_id(&self, table: Table) -> Result<Option<i64>> {
        if !table.has_id() {
            return Ok(None);
        }
        TableIds::new(&self.conn, table).max_id()
    }

    /// First row of every table. See [`sample_tables`].
    pub fn sample(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
        sample_tables(&self.conn)
    }

    // ------------------------------------------------------------------------
    // Collection
    // ------------------------------------------------------------------------

    /// The collection row, if one has been written.
    pub fn collection(&self) -> Result<Option<Collection>> {
        let sql = format!("SELECT {COL_COLUMNS} FROM col WHERE id = ?");
        self.query_one(&sql, [COLLECTION_ID], collection_from_row)
    }

    /// Write the collection row, stamping `mod`.
    ///
    /// Fails with [`Error::DuplicateName`] if two note types, decks or option
    /// groups share a name; nothing is written in that case.
    pub fn save_collection(&mut self, col: Collection) -> Result<Collection> {
        let col = prepare_collection(col, self.clock.as_ref());
        let conf = encode_collection(&col.conf)?;
        let models = encode_collection(&col.models)?;
        let decks = encode_collection(&col.decks)?;
        let dconf = encode_collection(&col.dconf)?;
        let tags = encode_tag_cache(&col.tags)?;

        let tx = self.conn.transaction()?;
        tx.execute(
            &format!(
                "INSERT OR REPLACE INTO col ({COL_COLUMNS})
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
            ),
            params![
                col.id, col.crt, col.mtime, col.scm, col.ver, col.dty, col.usn, col.ls, conf,
                models, decks, dconf, tags
            ],
        )
        .map_err(|e| Error::on_write("col", e))?;
        tx.commit()?;

        debug!(mtime = col.mtime, "saved collection");
        Ok(col)
    }

    // ------------------------------------------------------------------------
    // Notes
    // ------------------------------------------------------------------------

    /// Insert a new note.
    ///
    /// The id and GUID are made unique and `mod`, `sfld` and `csum` are
    /// recomputed. Returns the note as stored.
    pub fn insert_note(&mut self, note: Note) -> Result<Note> {
        let tx = self.conn.transaction()?;
        let note = {
            let ids = TableIds::new(&tx, Table::Notes);
            let guids = NoteGuids(&tx);
            let mut ctx = SaveContext::new(self.clock.as_ref(), self.guids.as_mut());
            prepare_note(note, WriteMode::Insert, &ids, &guids, &mut ctx)?
        };
        tx.execute(
            &format!("INSERT INTO notes ({NOTE_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"),
            params![
                note.id,
                note.guid,
                note.mid,
                note.mtime,
                note.usn,
                encode_tags(&note.tags),
                encode_fields(&note.flds),
                note.sfld,
                note.csum,
                note.flags,
                note.data
            ],
        )
        .map_err(|e| Error::on_write("notes", e))?;
        tx.commit()?;

        debug!(id = note.id, mid = note.mid, "inserted note");
        Ok(note)
    }

    /// Overwrite an existing note, keeping its id.
    pub fn update_note(&mut self, note: Note) -> Result<Note> {
        let tx = self.conn.transaction()?;
        let ids = TableIds::new(&tx, Table::Notes);
        if !ids.contains_id(note.id)? {
            return Err(Error::NotFound {
                table: "notes",
                id: note.id,
            });
        }
        let note = {
            let guids = NoteGuids(&tx);
            let mut ctx = SaveContext::new(self.clock.as_ref(), self.guids.as_mut());
            prepare_note(note, WriteMode::Update, &ids, &guids, &mut ctx)?
        };
        tx.execute(
            "UPDATE notes SET guid = ?, mid = ?, mod = ?, usn = ?, tags = ?, flds = ?, sfld = ?,
             csum = ?, flags = ?, data = ? WHERE id = ?",
            params![
                note.guid,
                note.mid,
                note.mtime,
                note.usn,
                encode_tags(&note.tags),
                encode_fields(&note.flds),
                note.sfld,
                note.csum,
                note.flags,
                note.data,
                note.id
            ],
        )
        .map_err(|e| Error::on_write("notes", e))?;
        tx.commit()?;

        debug!(id = note.id, "updated note");
        Ok(note)
    }

    /// Get a note by id.
    pub fn note(&self, id: i64) -> Result<Option<Note>> {
        let sql = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?");
        self.query_one(&sql, [id], note_from_row)
    }

    /// Notes whose checksum equals `csum`.
    pub fn notes_by_checksum(&self, csum: i64) -> Result<Vec<Note>> {
        let sql = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE csum = ? ORDER BY id");
        self.query_all(&sql, [csum], note_from_row)
    }

    /// Other notes of the same type whose first field matches `note`'s.
    ///
    /// The first field is fingerprinted afresh, so `note` need not have been
    /// saved.
    pub fn find_duplicates(&self, note: &Note) -> Result<Vec<Note>> {
        let Some(first) = note.first_field() else {
            return Ok(Vec::new());
        };
        let (sfld, csum) = fingerprint(first);
        let sql = format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE csum = ? AND mid = ? AND id != ? ORDER BY id"
        );
        let candidates = self.query_all(&sql, params![csum, note.mid, note.id], note_from_row)?;
        Ok(candidates.into_iter().filter(|n| n.sfld == sfld).collect())
    }

    /// Groups of notes sharing a note type and sort field, oldest first.
    pub fn duplicate_groups(&self) -> Result<Vec<Vec<Note>>> {
        let sql = format!("SELECT {NOTE_COLUMNS} FROM notes ORDER BY mid, csum, sfld, id");
        let notes = self.query_all(&sql, [], note_from_row)?;

        let mut groups: Vec<Vec<Note>> = Vec::new();
        for note in notes {
            match groups.last_mut() {
                Some(group)
                    if group[0].mid == note.mid
                        && group[0].csum == note.csum
                        && group[0].sfld == note.sfld =>
                {
                    group.push(note)
                }
                _ => groups.push(vec![note]),
            }
        }
        groups.retain(|g| g.len() > 1);
        Ok(groups)
    }

    /// Notes tagged with `tag` (ASCII case-insensitive).
    pub fn notes_with_tag(&self, tag: &str) -> Result<Vec<Note>> {
        let escaped = tag
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let pattern = format!("% {escaped} %");
        let sql = format!(
            "SELECT {NOTE_COLUMNS} FROM notes \
             WHERE ' ' || tags || ' ' LIKE ? ESCAPE '\\' ORDER BY id"
        );
        self.query_all(&sql, [pattern], note_from_row)
    }

    /// Delete a note and its cards, leaving graves for each.
    ///
    /// Returns the number of cards removed.
    pub fn remove_note(&mut self, id: i64) -> Result<usize> {
        let tx = self.conn.transaction()?;
        if !TableIds::new(&tx, Table::Notes).contains_id(id)? {
            return Err(Error::NotFound { table: "notes", id });
        }

        let card_ids: Vec<i64> = {
            let mut stmt = tx.prepare("SELECT id FROM cards WHERE nid = ? ORDER BY id")?;
            let ids = stmt
                .query_map([id], |row| row.get(0))?
                .collect::<rusqlite::Result<_>>()?;
            ids
        };
        for cid in &card_ids {
            insert_grave(&tx, Grave::new(*cid, GraveKind::Card))?;
        }
        tx.execute("DELETE FROM cards WHERE nid = ?", [id])?;
        insert_grave(&tx, Grave::new(id, GraveKind::Note))?;
        tx.execute("DELETE FROM notes WHERE id = ?", [id])?;
        tx.commit()?;

        info!(id, cards = card_ids.len(), "removed note");
        Ok(card_ids.len())
    }

    // ------------------------------------------------------------------------
    // Cards
    // ------------------------------------------------------------------------

    /// Insert a new card. The id is made unique and `due` defaults to the
    /// note id.
    pub fn insert_card(&mut self, card: Card) -> Result<Card> {
        let tx = self.conn.transaction()?;
        let card = prepare_card(
            card,
            WriteMode::Insert,
            &TableIds::new(&tx, Table::Cards),
            self.clock.as_ref(),
        )?;
        tx.execute(
            &format!(
                "INSERT INTO cards ({CARD_COLUMNS})
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
            ),
            params![
                card.id,
                card.nid,
                card.did,
                card.ord,
                card.mtime,
                card.usn,
                card.card_type.as_i64(),
                card.queue.as_i64(),
                card.due,
                card.ivl,
                card.factor,
                card.reps,
                card.lapses,
                card.left,
                card.odue,
                card.odid,
                card.flags,
                card.data
            ],
        )
        .map_err(|e| Error::on_write("cards", e))?;
        tx.commit()?;

        debug!(id = card.id, nid = card.nid, ord = card.ord, "inserted card");
        Ok(card)
    }

    /// Overwrite an existing card, keeping its id.
    pub fn update_card(&mut self, card: Card) -> Result<Card> {
        let tx = self.conn.transaction()?;
        let ids = TableIds::new(&tx, Table::Cards);
        if !ids.contains_id(card.id)? {
            return Err(Error::NotFound {
                table: "cards",
                id: card.id,
            });
        }
        let card = prepare_card(card, WriteMode::Update, &ids, self.clock.as_ref())?;
        tx.execute(
            "UPDATE cards SET nid = ?, did = ?, ord = ?, mod = ?, usn = ?, type = ?, queue = ?,
             due = ?, ivl = ?, factor = ?, reps = ?, lapses = ?, left = ?, odue = ?, odid = ?,
             flags = ?, data = ? WHERE id = ?",
            params![
                card.nid,
                card.did,
                card.ord,
                card.mtime,
                card.usn,
                card.card_type.as_i64(),
                card.queue.as_i64(),
                card.due,
                card.ivl,
                card.factor,
                card.reps,
                card.lapses,
                card.left,
                card.odue,
                card.odid,
                card.flags,
                card.data,
                card.id
            ],
        )
        .map_err(|e| Error::on_write("cards", e))?;
        tx.commit()?;

        debug!(id = card.id, "updated card");
        Ok(card)
    }

    /// Get a card by id.
    pub fn card(&self, id: i64) -> Result<Option<Card>> {
        let sql = format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = ?");
        self.query_one(&sql, [id], card_from_row)
    }

    /// Cards generated from note `nid`, by template ordinal.
    pub fn cards_for_note(&self, nid: i64) -> Result<Vec<Card>> {
        let sql = format!("SELECT {CARD_COLUMNS} FROM cards WHERE nid = ? ORDER BY ord, id");
        self.query_all(&sql, [nid], card_from_row)
    }

    /// Delete a card, leaving a grave.
    pub fn remove_card(&mut self, id: i64) -> Result<()> {
        let tx = self.conn.transaction()?;
        let deleted = tx.execute("DELETE FROM cards WHERE id = ?", [id])?;
        if deleted == 0 {
            return Err(Error::NotFound { table: "cards", id });
        }
        insert_grave(&tx, Grave::new(id, GraveKind::Card))?;
        tx.commit()?;

        debug!(id, "removed card");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Review log
    // ------------------------------------------------------------------------

    /// Append a review log entry. The id is made unique.
    pub fn insert_review(&mut self, entry: ReviewLogEntry) -> Result<ReviewLogEntry> {
        let tx = self.conn.transaction()?;
        let entry = prepare_review(entry, &TableIds::new(&tx, Table::Revlog))?;
        tx.execute(
            &format!("INSERT INTO revlog ({REVLOG_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"),
            params![
                entry.id,
                entry.cid,
                entry.usn,
                entry.ease,
                entry.ivl,
                entry.last_ivl,
                entry.factor,
                entry.time,
                entry.kind.as_i64()
            ],
        )
        .map_err(|e| Error::on_write("revlog", e))?;
        tx.commit()?;

        debug!(id = entry.id, cid = entry.cid, "inserted review");
        Ok(entry)
    }

    /// Reviews of card `cid`, oldest first.
    pub fn reviews_for_card(&self, cid: i64) -> Result<Vec<ReviewLogEntry>> {
        let sql = format!("SELECT {REVLOG_COLUMNS} FROM revlog WHERE cid = ? ORDER BY id");
        self.query_all(&sql, [cid], review_from_row)
    }

    // ------------------------------------------------------------------------
    // Graves
    // ------------------------------------------------------------------------

    /// Record a deletion.
    pub fn add_grave(&mut self, grave: Grave) -> Result<()> {
        insert_grave(&self.conn, grave)
    }

    /// All recorded deletions, in insertion order.
    pub fn graves(&self) -> Result<Vec<Grave>> {
        self.query_all(
            "SELECT usn, oid, type FROM graves ORDER BY rowid",
            [],
            grave_from_row,
        )
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn query_one<T, P, F>(&self, sql: &str, params: P, decode: F) -> Result<Option<T>>
    where
        P: rusqlite::Params,
        F: Fn(&Row<'_>) -> Result<T>,
    {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        match rows.next()? {
            Some(row) => Ok(Some(decode(row)?)),
            None => Ok(None),
        }
    }

    fn query_all<T, P, F>(&self, sql: &str, params: P, decode: F) -> Result<Vec<T>>
    where
        P: rusqlite::Params,
        F: Fn(&Row<'_>) -> Result<T>,
    {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(decode(row)?);
        }
        Ok(out)
    }
}

// ============================================================================
// Row encoding and decoding
// ============================================================================

fn has_table(conn: &Connection, name: &str) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?",
            [name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn table_count(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT count(*) FROM sqlite_master WHERE type = 'table'",
        [],
        |row| row.get(0),
    )?)
}

fn insert_grave(conn: &Connection, grave: Grave) -> Result<()> {
    conn.execute(
        "INSERT INTO graves (usn, oid, type) VALUES (?, ?, ?)",
        params![grave.usn, grave.oid, grave.kind.as_i64()],
    )
    .map_err(|e| Error::on_write("graves", e))?;
    Ok(())
}

/// Read a text column that older files may have stored with numeric affinity.
fn loose_text(row: &Row<'_>, idx: usize, column: &'static str) -> Result<String> {
    use rusqlite::types::ValueRef;

    match row.get_ref(idx)? {
        ValueRef::Text(bytes) => String::from_utf8(bytes.to_vec())
            .map_err(|e| Error::decode(column, e.to_string())),
        ValueRef::Integer(i) => Ok(i.to_string()),
        ValueRef::Real(f) => Ok(f.to_string()),
        ValueRef::Null => Ok(String::new()),
        ValueRef::Blob(_) => Err(Error::decode(column, "unexpected blob")),
    }
}

fn collection_from_row(row: &Row<'_>) -> Result<Collection> {
    let conf: String = row.get(8)?;
    let models: String = row.get(9)?;
    let decks: String = row.get(10)?;
    let dconf: String = row.get(11)?;
    let tags: String = row.get(12)?;
    Ok(Collection {
        id: row.get(0)?,
        crt: row.get(1)?,
        mtime: row.get(2)?,
        scm: row.get(3)?,
        ver: row.get(4)?,
        dty: row.get(5)?,
        usn: row.get(6)?,
        ls: row.get(7)?,
        conf: decode_collection("conf", &conf)?,
        models: decode_collection("models", &models)?,
        decks: decode_collection("decks", &decks)?,
        dconf: decode_collection("dconf", &dconf)?,
        tags: decode_tag_cache(&tags)?,
    })
}

fn note_from_row(row: &Row<'_>) -> Result<Note> {
    let tags: String = row.get(5)?;
    let flds: String = row.get(6)?;
    Ok(Note {
        id: row.get(0)?,
        guid: row.get(1)?,
        mid: row.get(2)?,
        mtime: row.get(3)?,
        usn: row.get(4)?,
        tags: decode_tags(&tags),
        flds: decode_fields(&flds),
        sfld: loose_text(row, 7, "sfld")?,
        csum: row.get(8)?,
        flags: row.get(9)?,
        data: loose_text(row, 10, "data")?,
    })
}

fn card_from_row(row: &Row<'_>) -> Result<Card> {
    Ok(Card {
        id: row.get(0)?,
        nid: row.get(1)?,
        did: row.get(2)?,
        ord: row.get(3)?,
        mtime: row.get(4)?,
        usn: row.get(5)?,
        card_type: CardType::try_from(row.get::<_, i64>(6)?)?,
        queue: CardQueue::try_from(row.get::<_, i64>(7)?)?,
        due: row.get(8)?,
        ivl: row.get(9)?,
        factor: row.get(10)?,
        reps: row.get(11)?,
        lapses: row.get(12)?,
        left: row.get(13)?,
        odue: row.get(14)?,
        odid: row.get(15)?,
        flags: row.get(16)?,
        data: loose_text(row, 17, "data")?,
    })
}

fn review_from_row(row: &Row<'_>) -> Result<ReviewLogEntry> {
    Ok(ReviewLogEntry {
        id: row.get(0)?,
        cid: row.get(1)?,
        usn: row.get(2)?,
        ease: row.get(3)?,
        ivl: row.get(4)?,
        last_ivl: row.get(5)?,
        factor: row.get(6)?,
        time: row.get(7)?,
        kind: ReviewKind::try_from(row.get::<_, i64>(8)?)?,
    })
}

fn grave_from_row(row: &Row<'_>) -> Result<Grave> {
    Ok(Grave {
        usn: row.get(0)?,
        oid: row.get(1)?,
        kind: GraveKind::try_from(row.get::<_, i64>(2)?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::records::Deck;

    fn store() -> CollectionStore {
        CollectionStore::builder()
            .clock(FixedClock::from_secs(1_700_000_000))
            .create_collection(true)
            .open()
            .unwrap()
    }

    #[test]
    fn test_open_in_memory_creates_collection() {
        let store = store();
        let col = store.collection().unwrap().unwrap();
        assert_eq!(col.id, COLLECTION_ID);
        assert_eq!(col.mtime, 1_700_000_000);
        assert_eq!(store.count(Table::Collection).unwrap(), 1);
    }

    #[test]
    fn test_table_ids_lookup() {
        let mut store = store();
        store.insert_note(Note::new(1, ["a"]).with_id(5)).unwrap();
        store.insert_note(Note::new(1, ["b"]).with_id(9)).unwrap();

        let ids = TableIds::new(store.connection(), Table::Notes);
        assert!(ids.contains_id(5).unwrap());
        assert!(!ids.contains_id(6).unwrap());
        assert_eq!(ids.max_id().unwrap(), Some(9));
        assert_eq!(store.max_id(Table::Cards).unwrap(), None);
        assert_eq!(store.max_id(Table::Graves).unwrap(), None);
    }

    #[test]
    fn test_duplicate_deck_name_aborts_save() {
        let mut store = store();
        let before = store.collection().unwrap().unwrap();

        let mut col = before.clone();
        col.add_deck(Deck {
            id: 2,
            name: "Default".to_string(),
            extra: Default::default(),
        });
        let result = store.save_collection(col);
        assert!(matches!(result, Err(Error::DuplicateName(_))));
        assert_eq!(store.collection().unwrap().unwrap(), before);
    }

    #[test]
    fn test_loose_text_reads_numbers() {
        let conn = Connection::open_in_memory().unwrap();
        let value = conn
            .query_row("SELECT 123", [], |row| Ok(loose_text(row, 0, "sfld").ok()))
            .unwrap();
        assert_eq!(value.as_deref(), Some("123"));
    }

    #[test]
    fn test_unknown_queue_is_decode_error() {
        let mut store = store();
        let card = store.insert_card(Card::new(1, 1, 0)).unwrap();
        store
            .connection()
            .execute("UPDATE cards SET queue = 9 WHERE id = ?", [card.id])
            .unwrap();
        assert!(matches!(
            store.card(card.id),
            Err(Error::Decode { column: "queue", .. })
        ));
    }
}
