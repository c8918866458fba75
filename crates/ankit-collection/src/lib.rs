//! Record model, field codecs and save hooks for Anki `collection.anki2` files.
//!
//! This crate reads and writes the SQLite database at the heart of an Anki
//! collection (schema version 11, also found inside `.apkg` packages). It
//! provides:
//!
//! - Typed records for the five tables: [`Collection`], [`Note`], [`Card`],
//!   [`ReviewLogEntry`] and [`Grave`]
//! - Column codecs for tag lists, `0x1F`-separated field lists and the JSON
//!   collection columns of `col` ([`codec`])
//! - Save hooks that allocate unique ids and GUIDs, stamp modification times
//!   and derive the sort field and checksum of notes ([`hooks`])
//! - A SQLite-backed [`CollectionStore`] that runs every write inside a
//!   transaction
//!
//! # Features
//!
//! - `package` (default): Extract `.apkg` files and open the collection inside
//!
//! # Example
//!
//! ```
//! use ankit_collection::defaults::{DEFAULT_DECK_ID, basic_note_type};
//! use ankit_collection::{Card, CollectionStore, Note};
//!
//! # fn main() -> ankit_collection::Result<()> {
//! let mut store = CollectionStore::open_in_memory()?;
//!
//! let mut col = store.collection()?.expect("collection row");
//! col.add_note_type(basic_note_type(1_700_000_000_000, col.crt));
//! store.save_collection(col)?;
//!
//! let note = store.insert_note(
//!     Note::new(1_700_000_000_000, ["Hello<b>World</b>", "Bonjour"]).with_tags(["greeting"]),
//! )?;
//! assert_eq!(note.sfld, "HelloWorld");
//!
//! let card = store.insert_card(Card::new(note.id, DEFAULT_DECK_ID, 0))?;
//! assert_eq!(card.due, Some(note.id));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod allocator;
pub mod clock;
pub mod codec;
pub mod defaults;
pub mod error;
pub mod fingerprint;
pub mod guid;
pub mod hooks;
pub mod records;
pub mod sample;
pub mod schema;
pub mod store;
pub mod text;

#[cfg(feature = "package")]
pub mod package;

pub use error::{Error, Result};
pub use records::{
    Card, CardQueue, CardTemplate, CardType, Collection, Deck, DeckConfig, Grave, GraveKind, Note,
    NoteType, NoteTypeField, ReviewKind, ReviewLogEntry,
};
pub use schema::Table;
pub use store::{CollectionStore, StoreBuilder};

#[cfg(feature = "package")]
pub use package::{OpenedPackage, extract_package, open_package};
